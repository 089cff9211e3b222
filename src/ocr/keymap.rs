//! OCR key normalization — engine field names onto canonical slots.
//!
//! The engine labels fields with whatever the card printed ("姓名", "行動",
//! "E-mail", "Department2"…), so nothing guarantees its keys match the
//! record schema. This table collects the spellings seen in practice; exact
//! match first, then a substring pass for keys the engine decorated
//! ("姓名(中文)" still maps through "姓名").

use crate::card::schema::CardRecord;

/// Alias → canonical key. Order matters for the substring pass: earlier
/// entries win, so the more specific spellings come first within a group.
const FIELD_ALIASES: &[(&str, &str)] = &[
    // Basic info (zh/en)
    ("姓名", "name"),
    ("名字", "name"),
    ("名稱", "name"),
    ("英文姓名", "name_en"),
    ("公司名稱", "company_name"),
    ("企業名稱", "company_name"),
    ("公司", "company_name"),
    ("企業", "company_name"),
    ("英文公司名稱", "company_name_en"),
    ("英文公司", "company_name_en"),
    ("Company", "company_name_en"),
    ("職位", "position"),
    ("職稱", "position"),
    ("崗位", "position"),
    ("英文職位", "position_en"),
    ("英文職稱", "position_en"),
    ("Position", "position_en"),
    // Department hierarchy, three levels
    ("部門1(單位1)", "department1"),
    ("部門1", "department1"),
    ("單位1", "department1"),
    ("部門2(單位2)", "department2"),
    ("部門2", "department2"),
    ("單位2", "department2"),
    ("部門3(單位3)", "department3"),
    ("部門3", "department3"),
    ("單位3", "department3"),
    ("Department1", "department1_en"),
    ("Department2", "department2_en"),
    ("Department3", "department3_en"),
    // Contact info
    ("手機號碼", "mobile_phone"),
    ("手機號", "mobile_phone"),
    ("手機(mobile)", "mobile_phone"),
    ("手機", "mobile_phone"),
    ("行動電話", "mobile_phone"),
    ("行動", "mobile_phone"),
    ("公司電話1", "company_phone1"),
    ("公司電話2", "company_phone2"),
    ("電話1", "company_phone1"),
    ("電話2", "company_phone2"),
    ("公司電話", "company_phone1"),
    ("辦公電話", "company_phone1"),
    ("固話", "company_phone1"),
    ("市話", "company_phone1"),
    ("電話", "company_phone1"),
    ("E-mail", "email"),
    ("Email", "email"),
    ("郵箱", "email"),
    ("電子郵件", "email"),
    ("信箱", "email"),
    ("Line ID", "line_id"),
    ("LINE ID", "line_id"),
    ("LINE", "line_id"),
    ("Line", "line_id"),
    ("賴", "line_id"),
    // Addresses (zh/en)
    ("公司地址一", "company_address1"),
    ("公司地址二", "company_address2"),
    ("地址一", "company_address1"),
    ("地址二", "company_address2"),
    ("公司地址", "company_address1"),
    ("英文地址一", "company_address1_en"),
    ("英文地址二", "company_address2_en"),
    ("地址", "company_address1"),
    ("住址", "company_address1"),
    // Notes
    ("備註1", "note1"),
    ("備註一", "note1"),
    ("備註2", "note2"),
    ("備註二", "note2"),
    ("備註", "note1"),
    ("備注", "note1"),
    ("說明", "note1"),
    ("其他", "note1"),
    ("註", "note1"),
];

/// Strip surrounding whitespace and stray quotes an LLM-style engine tends
/// to leave on keys.
fn clean_key(key: &str) -> &str {
    key.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

/// Map an engine key onto a canonical field key, exact aliases only.
/// Canonical keys pass through unchanged. The pass-through is
/// case-sensitive on purpose: capitalized English labels ("Position",
/// "Department2") mean the card printed an English field and belong to the
/// `_en` slots via the alias table.
pub fn map_key(key: &str) -> Option<&'static str> {
    let key = clean_key(key);
    if let Some(canonical) = CardRecord::content_keys().find(|k| *k == key) {
        return Some(canonical);
    }
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key || alias.eq_ignore_ascii_case(key))
        .map(|(_, canonical)| *canonical)
}

/// Exact mapping first, then a permissive pass that accepts any key
/// containing a known alias.
pub fn fuzzy_map_key(key: &str) -> Option<&'static str> {
    if let Some(canonical) = map_key(key) {
        return Some(canonical);
    }
    let key = clean_key(key);
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| key.contains(alias))
        .map(|(_, canonical)| *canonical)
}
