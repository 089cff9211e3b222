//! Field segmentation tests — the JSON / key-value / text-scan ladder and
//! the key alias map.

use card_lens_lib::card::Side;
use card_lens_lib::ocr::keymap;
use card_lens_lib::ocr::{parse_fields, ParseMethod};

fn get<'a>(outcome: &'a card_lens_lib::ocr::ParseOutcome, key: &str) -> Option<&'a str> {
    outcome.fields.get(key).map(String::as_str)
}

// ── Key mapping ──────────────────────────────────────────────────────

#[test]
fn exact_aliases_map_to_canonical_keys() {
    assert_eq!(keymap::map_key("姓名"), Some("name"));
    assert_eq!(keymap::map_key("公司名稱"), Some("company_name"));
    assert_eq!(keymap::map_key("E-mail"), Some("email"));
    assert_eq!(keymap::map_key("行動電話"), Some("mobile_phone"));
    assert_eq!(keymap::map_key("Department2"), Some("department2_en"));
    // Canonical keys pass through
    assert_eq!(keymap::map_key("company_address1_en"), Some("company_address1_en"));
    // Quoting and whitespace are tolerated
    assert_eq!(keymap::map_key(" \"姓名\" "), Some("name"));
}

#[test]
fn fuzzy_mapping_accepts_decorated_keys() {
    assert_eq!(keymap::fuzzy_map_key("姓名(中文)"), Some("name"));
    assert_eq!(keymap::fuzzy_map_key("聯絡電話1"), Some("company_phone1"));
    assert_eq!(keymap::fuzzy_map_key("totally-unrelated"), None);
}

// ── JSON rung ────────────────────────────────────────────────────────

#[test]
fn json_payload_maps_to_canonical_fields() {
    let text = r#"{
        "姓名": "王小明",
        "公司名稱": "宏達科技股份有限公司",
        "職稱": "資深經理",
        "Email": "ming@acme.tw",
        "手機": "0912-345-678"
    }"#;
    let outcome = parse_fields(text, Side::Front);
    assert_eq!(outcome.method, ParseMethod::Json);
    assert_eq!(get(&outcome, "name"), Some("王小明"));
    assert_eq!(get(&outcome, "company_name"), Some("宏達科技股份有限公司"));
    assert_eq!(get(&outcome, "position"), Some("資深經理"));
    assert_eq!(get(&outcome, "email"), Some("ming@acme.tw"));
    assert_eq!(get(&outcome, "mobile_phone"), Some("0912-345-678"));
}

#[test]
fn single_quoted_json_is_normalized() {
    let text = "{'姓名': '王小明', '公司': '宏達科技',}";
    let outcome = parse_fields(text, Side::Front);
    assert_eq!(outcome.method, ParseMethod::Json);
    assert_eq!(get(&outcome, "name"), Some("王小明"));
    assert_eq!(get(&outcome, "company_name"), Some("宏達科技"));
}

#[test]
fn empty_json_values_are_skipped() {
    let text = r#"{"姓名": "王小明", "Email": "", "手機": "   "}"#;
    let outcome = parse_fields(text, Side::Front);
    assert_eq!(get(&outcome, "name"), Some("王小明"));
    assert!(!outcome.fields.contains_key("email"));
}

// ── Key:value rung ───────────────────────────────────────────────────

#[test]
fn key_value_lines_parse_without_braces() {
    let text = "姓名: 陳大文\n職稱: 業務經理\nEmail: tawen@corp.tw";
    let outcome = parse_fields(text, Side::Front);
    assert_eq!(outcome.method, ParseMethod::KeyValue);
    assert_eq!(get(&outcome, "name"), Some("陳大文"));
    assert_eq!(get(&outcome, "position"), Some("業務經理"));
    assert_eq!(get(&outcome, "email"), Some("tawen@corp.tw"));
}

#[test]
fn fullwidth_colons_are_accepted() {
    let text = "姓名：林小華\n公司：大同電子";
    let outcome = parse_fields(text, Side::Front);
    assert_eq!(get(&outcome, "name"), Some("林小華"));
    assert_eq!(get(&outcome, "company_name"), Some("大同電子"));
}

// ── Text-scan rung ───────────────────────────────────────────────────

#[test]
fn free_text_extraction_finds_contact_fields() {
    let text = "\
王小明
宏達科技股份有限公司
0912345678
02-2345-6789
ming@acme.tw
台北市信義區信義路五段7號";
    let outcome = parse_fields(text, Side::Front);
    assert_eq!(outcome.method, ParseMethod::TextScan);
    assert_eq!(get(&outcome, "name"), Some("王小明"));
    assert_eq!(get(&outcome, "mobile_phone"), Some("0912345678"));
    assert_eq!(get(&outcome, "company_phone1"), Some("02-2345-6789"));
    assert_eq!(get(&outcome, "email"), Some("ming@acme.tw"));
    assert_eq!(
        get(&outcome, "company_address1"),
        Some("台北市信義區信義路五段7號")
    );
    assert_eq!(get(&outcome, "company_name"), Some("宏達科技股份有限公司"));
}

#[test]
fn back_side_collects_leftovers_into_note1() {
    let text = "營業時間 週一至週五\n歡迎來電預約參觀";
    let outcome = parse_fields(text, Side::Back);
    assert_eq!(outcome.method, ParseMethod::TextScan);
    let note = outcome.fields.get("note1").expect("note1");
    assert!(note.contains("營業時間 週一至週五"));
    assert!(note.contains("歡迎來電預約參觀"));
}

#[test]
fn front_side_does_not_fabricate_notes() {
    let text = "某種無法歸類的文字行";
    let outcome = parse_fields(text, Side::Front);
    assert!(!outcome.fields.contains_key("note1"));
}

// ── Phone semantics ──────────────────────────────────────────────────

#[test]
fn mobile_and_office_numbers_route_to_their_slots() {
    let text = "電話: 02-27001234\n0987654321\n07-1234567";
    let outcome = parse_fields(text, Side::Front);
    assert_eq!(get(&outcome, "company_phone1"), Some("02-27001234"));
    assert_eq!(get(&outcome, "mobile_phone"), Some("0987654321"));
    assert_eq!(get(&outcome, "company_phone2"), Some("07-1234567"));
}

// ── Multi-line slot splitting ────────────────────────────────────────

#[test]
fn stacked_departments_spread_over_three_levels() {
    let text = r#"{"部門1": "智慧製造事業群\n研發處\n軟體開發課"}"#;
    let outcome = parse_fields(text, Side::Front);
    assert_eq!(get(&outcome, "department1"), Some("智慧製造事業群"));
    assert_eq!(get(&outcome, "department2"), Some("研發處"));
    assert_eq!(get(&outcome, "department3"), Some("軟體開發課"));
}

#[test]
fn stacked_addresses_split_into_two_slots() {
    let text = "{\"地址\": \"台北市信義區信義路五段7號\\n新北市板橋區文化路100號\"}";
    let outcome = parse_fields(text, Side::Front);
    assert_eq!(
        get(&outcome, "company_address1"),
        Some("台北市信義區信義路五段7號")
    );
    assert_eq!(
        get(&outcome, "company_address2"),
        Some("新北市板橋區文化路100號")
    );
}

#[test]
fn splitting_never_overwrites_an_existing_slot() {
    let text = r#"{"部門1": "第一層\n第二層", "部門2": "既有部門"}"#;
    let outcome = parse_fields(text, Side::Front);
    assert_eq!(get(&outcome, "department1"), Some("第一層"));
    assert_eq!(get(&outcome, "department2"), Some("既有部門"));
}

// ── Edge cases ───────────────────────────────────────────────────────

#[test]
fn empty_text_yields_an_empty_outcome() {
    let outcome = parse_fields("   \n  ", Side::Front);
    assert_eq!(outcome.method, ParseMethod::Empty);
    assert!(outcome.fields.is_empty());
}
