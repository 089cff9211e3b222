//! Capture store: content-addressed filenames on a throwaway directory.

use card_lens_lib::card::Side;
use card_lens_lib::storage::CaptureStore;

#[test]
fn identical_bytes_land_on_the_same_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CaptureStore::new(dir.path());

    let a = store.save(Side::Front, b"jpegbytes", "image/jpeg").expect("save");
    let b = store.save(Side::Front, b"jpegbytes", "image/jpeg").expect("save again");
    assert_eq!(a, b);
    assert!(a.exists());
}

#[test]
fn different_content_and_sides_get_distinct_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CaptureStore::new(dir.path());

    let front = store.save(Side::Front, b"one", "image/jpeg").expect("save");
    let other = store.save(Side::Front, b"two", "image/jpeg").expect("save");
    let back = store.save(Side::Back, b"one", "image/jpeg").expect("save");

    assert_ne!(front, other);
    assert_ne!(front, back);
    assert!(front.file_name().unwrap().to_string_lossy().starts_with("front_"));
    assert!(back.file_name().unwrap().to_string_lossy().starts_with("back_"));
}

#[test]
fn extension_follows_the_mime_type() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CaptureStore::new(dir.path());

    let png = store.save(Side::Front, b"p", "image/png").expect("save");
    let jpeg = store.save(Side::Front, b"j", "image/jpeg").expect("save");
    let odd = store.save(Side::Front, b"o", "application/octet-stream").expect("save");

    assert_eq!(png.extension().unwrap(), "png");
    assert_eq!(jpeg.extension().unwrap(), "jpg");
    assert_eq!(odd.extension().unwrap(), "jpg");
}
