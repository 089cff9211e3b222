//! Bilingual field classification.
//!
//! The segmentation layer maps OCR keys onto canonical slots, but the engine
//! frequently puts an English value in the zh slot (or vice versa) because
//! the card itself only labels one variant. Classification fixes that:
//! per pair, a value that is script-inconsistent with its slot is moved to
//! the other slot and the original is cleared, so a value ends up in exactly
//! one side of its pair. Values already consistent are never touched, and a
//! pair with both slots populated is left alone entirely.

use super::schema::{FieldPair, PairKind, ParsedFields, FIELD_PAIRS};
use regex::Regex;
use std::sync::OnceLock;

/// Script test used to decide the zh side of a pair. Kept as a plain
/// function pointer so a different detector can be swapped in without
/// touching the merge layer.
pub type ScriptPredicate = fn(&str) -> bool;

/// True if the value contains at least one CJK ideograph.
///
/// Mixed-script lines (e.g. "台灣 ACME 分公司") count as CJK — business-card
/// lines that mix scripts are almost always primarily local-language.
pub fn contains_cjk(value: &str) -> bool {
    static CJK: OnceLock<Regex> = OnceLock::new();
    CJK.get_or_init(|| Regex::new(r"[\u{4e00}-\u{9fff}]").unwrap())
        .is_match(value)
}

fn latin_pattern(kind: PairKind) -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    static GENERAL: OnceLock<Regex> = OnceLock::new();
    match kind {
        // Person names: letters plus the punctuation seen in Western names.
        PairKind::PersonName => {
            NAME.get_or_init(|| Regex::new(r"^[A-Za-z .'\-]+$").unwrap())
        }
        // Company names, positions, departments, addresses: also digits and
        // the suffix/address punctuation ("Co., Ltd.", "7F-2", "R&D").
        PairKind::General => {
            GENERAL.get_or_init(|| Regex::new(r"^[A-Za-z0-9 .,'&()\-]+$").unwrap())
        }
    }
}

/// Classify every zh/en pair in place, using the default CJK predicate.
pub fn classify_fields(fields: &mut ParsedFields) {
    classify_fields_with(fields, contains_cjk)
}

/// Classify every zh/en pair in place with a caller-supplied script test.
///
/// Pairs are independent: no rule reads another pair's slots, so the result
/// does not depend on iteration order.
pub fn classify_fields_with(fields: &mut ParsedFields, is_cjk: ScriptPredicate) {
    for pair in &FIELD_PAIRS {
        classify_pair(fields, pair, is_cjk);
    }
}

fn classify_pair(fields: &mut ParsedFields, pair: &FieldPair, is_cjk: ScriptPredicate) {
    let zh_value = non_empty(fields, pair.zh);
    let en_value = non_empty(fields, pair.en);

    match (zh_value, en_value) {
        // zh slot holds a pure-Latin value and the en slot is free: move it.
        (Some(value), None) => {
            if !is_cjk(&value) && latin_pattern(pair.kind).is_match(&value) {
                log::debug!("[CLASSIFY] {} → {}: {:?}", pair.zh, pair.en, value);
                fields.insert(pair.en.to_string(), value);
                fields.insert(pair.zh.to_string(), String::new());
            }
        }
        // en slot holds CJK and the zh slot is free: move it back.
        (None, Some(value)) => {
            if is_cjk(&value) {
                log::debug!("[CLASSIFY] {} → {}: {:?}", pair.en, pair.zh, value);
                fields.insert(pair.zh.to_string(), value);
                fields.insert(pair.en.to_string(), String::new());
            }
        }
        // Both populated (nothing safe to move) or both empty: leave as is.
        _ => {}
    }
}

fn non_empty(fields: &ParsedFields, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}
