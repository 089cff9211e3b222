//! Classifier and merger behavior, including the idempotence guarantee the
//! manual-parse path depends on.

use card_lens_lib::card::{
    classify_fields, classify_fields_with, contains_cjk, merge_fields, CardRecord, ParsedFields,
    Side,
};
use card_lens_lib::ocr;

fn fields(pairs: &[(&str, &str)]) -> ParsedFields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ── Script predicate ─────────────────────────────────────────────────

#[test]
fn cjk_detection() {
    assert!(contains_cjk("王小明"));
    assert!(contains_cjk("台灣 ACME 分公司"));
    assert!(!contains_cjk("John Smith"));
    assert!(!contains_cjk("O'Brien-Smith Jr."));
}

// ── Classification ───────────────────────────────────────────────────

#[test]
fn latin_name_in_zh_slot_moves_to_en() {
    let mut f = fields(&[("name", "John Smith")]);
    classify_fields(&mut f);
    assert_eq!(f.get("name_en").map(String::as_str), Some("John Smith"));
    assert_eq!(f.get("name").map(String::as_str), Some(""));
}

#[test]
fn cjk_name_in_en_slot_moves_to_zh() {
    let mut f = fields(&[("name_en", "王小明")]);
    classify_fields(&mut f);
    assert_eq!(f.get("name").map(String::as_str), Some("王小明"));
    assert_eq!(f.get("name_en").map(String::as_str), Some(""));
}

#[test]
fn correctly_placed_values_are_untouched() {
    let mut f = fields(&[("name", "王小明"), ("company_name_en", "ACME Co., Ltd.")]);
    let before = f.clone();
    classify_fields(&mut f);
    assert_eq!(f, before);
}

#[test]
fn mixed_script_value_stays_on_the_zh_side() {
    let mut f = fields(&[("company_name", "台灣ACME股份有限公司")]);
    classify_fields(&mut f);
    assert_eq!(
        f.get("company_name").map(String::as_str),
        Some("台灣ACME股份有限公司")
    );
    assert!(f.get("company_name_en").is_none());
}

#[test]
fn value_outside_the_latin_class_does_not_move() {
    // No CJK, but the name character class rejects digits — so it stays.
    let mut f = fields(&[("name", "Agent 007")]);
    classify_fields(&mut f);
    assert_eq!(f.get("name").map(String::as_str), Some("Agent 007"));
    assert!(f.get("name_en").is_none());
}

#[test]
fn general_pairs_admit_digits_and_company_punctuation() {
    let mut f = fields(&[
        ("company_name", "ACME Holdings (Taiwan) Co., Ltd."),
        ("company_address1", "No. 7, Sec. 2, Xinyi Rd."),
        ("position", "R&D Manager"),
    ]);
    classify_fields(&mut f);
    assert_eq!(
        f.get("company_name_en").map(String::as_str),
        Some("ACME Holdings (Taiwan) Co., Ltd.")
    );
    assert_eq!(
        f.get("company_address1_en").map(String::as_str),
        Some("No. 7, Sec. 2, Xinyi Rd.")
    );
    assert_eq!(f.get("position_en").map(String::as_str), Some("R&D Manager"));
    assert_eq!(f.get("company_name").map(String::as_str), Some(""));
}

#[test]
fn populated_pair_is_never_reshuffled() {
    // Both sides already hold data (possibly stray) — nothing moves.
    let mut f = fields(&[("name", "Smith"), ("name_en", "王小明")]);
    let before = f.clone();
    classify_fields(&mut f);
    assert_eq!(f, before);
}

#[test]
fn predicate_is_pluggable() {
    // A detector that calls everything CJK pins every value to the zh side.
    let mut f = fields(&[("name", "John Smith")]);
    classify_fields_with(&mut f, |_| true);
    assert_eq!(f.get("name").map(String::as_str), Some("John Smith"));
    assert!(f.get("name_en").is_none());
}

// ── Merge ────────────────────────────────────────────────────────────

#[test]
fn existing_values_are_never_overwritten() {
    let mut record = CardRecord::default();
    record.name = "Alice".to_string();

    let incoming = fields(&[("name", "Bob"), ("email", "b@x.com")]);
    let outcome = merge_fields(&mut record, &incoming);

    assert_eq!(record.name, "Alice");
    assert_eq!(record.email, "b@x.com");
    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.retained, vec!["name".to_string()]);
}

#[test]
fn whitespace_only_slots_count_as_empty() {
    let mut record = CardRecord::default();
    record.position = "   ".to_string();

    merge_fields(&mut record, &fields(&[("position", "經理")]));
    assert_eq!(record.position, "經理");
}

#[test]
fn merge_never_clears_a_slot() {
    let mut record = CardRecord::default();
    record.email = "a@b.c".to_string();

    merge_fields(&mut record, &fields(&[("email", ""), ("note1", "   ")]));
    assert_eq!(record.email, "a@b.c");
    assert_eq!(record.note1, "");
}

#[test]
fn unknown_keys_are_dropped() {
    let mut record = CardRecord::default();
    let outcome = merge_fields(&mut record, &fields(&[("fax_number", "02-1234")]));
    assert_eq!(outcome.applied, 0);
    assert!(outcome.retained.is_empty());
}

// ── Idempotence ──────────────────────────────────────────────────────

#[test]
fn reparsing_identical_text_changes_nothing() {
    let text = "{\"姓名\": \"王小明\", \"Company\": \"ACME Co., Ltd.\", \"Email\": \"ming@acme.tw\"}";

    let run = |record: &mut CardRecord| {
        let outcome = ocr::parse_fields(text, Side::Front);
        let mut parsed = outcome.fields;
        classify_fields(&mut parsed);
        merge_fields(record, &parsed);
    };

    let mut once = CardRecord::default();
    run(&mut once);

    let mut twice = CardRecord::default();
    run(&mut twice);
    run(&mut twice);

    assert_eq!(once, twice);
    assert_eq!(once.name, "王小明");
    assert_eq!(once.company_name_en, "ACME Co., Ltd.");
    assert_eq!(once.email, "ming@acme.tw");
}

#[test]
fn user_edits_survive_a_later_ocr_pass() {
    let mut record = CardRecord::default();

    // First pass fills from OCR
    let mut first = fields(&[("name", "王小明"), ("mobile_phone", "0912345678")]);
    classify_fields(&mut first);
    merge_fields(&mut record, &first);

    // User fixes a misread digit by hand
    record.mobile_phone = "0912345679".to_string();

    // Back side (or a re-scan) arrives with the old value again
    let mut second = fields(&[("mobile_phone", "0912345678"), ("line_id", "ming_tw")]);
    classify_fields(&mut second);
    merge_fields(&mut record, &second);

    assert_eq!(record.mobile_phone, "0912345679", "manual edit preserved");
    assert_eq!(record.line_id, "ming_tw");
}
