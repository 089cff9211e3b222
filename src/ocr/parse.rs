//! Field segmentation — raw OCR text into canonical fields.
//!
//! The engine's output varies wildly: sometimes a JSON object (it is an LLM
//! behind the curtain), sometimes loose `key: value` lines, sometimes plain
//! prose. The ladder here tries the structured forms first and falls back
//! to free-text analysis:
//!
//!   1. JSON object parse, after normalizing single quotes / trailing commas
//!   2. key:value regex scan
//!   3. keyword + regex text analysis (extract.rs)
//!
//! Stages 1–2 feed the key alias map; all stages end with phone enrichment
//! and multi-line slot splitting.

use super::{extract, keymap};
use crate::card::schema::{ParsedFields, Side};
use regex::Regex;
use std::sync::OnceLock;

/// Which rung of the ladder produced the fields. Logged, and useful in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMethod {
    Json,
    KeyValue,
    TextScan,
    Empty,
}

#[derive(Debug)]
pub struct ParseOutcome {
    pub fields: ParsedFields,
    pub method: ParseMethod,
}

/// Segment raw OCR text into canonical fields.
///
/// Empty input yields an empty outcome, not an error — a blank card side is
/// a normal result.
pub fn parse_fields(text: &str, side: Side) -> ParseOutcome {
    if text.trim().is_empty() {
        return ParseOutcome {
            fields: ParsedFields::new(),
            method: ParseMethod::Empty,
        };
    }

    let (mut fields, method) = if let Some(fields) = try_parse_json(text) {
        (fields, ParseMethod::Json)
    } else if let Some(fields) = try_parse_key_values(text) {
        (fields, ParseMethod::KeyValue)
    } else {
        (extract::analyze_text(text, side), ParseMethod::TextScan)
    };

    enrich_with_phones(&mut fields, text);
    split_multiline_slots(&mut fields);

    log::info!(
        "[PARSE] {:?} via {:?} — {} field(s)",
        side,
        method,
        fields.len()
    );
    ParseOutcome { fields, method }
}

// ── Stage 1: JSON ────────────────────────────────────────────────────

/// Fix the JSON-ish output LLM engines produce: single-quoted keys/values
/// and trailing commas. Valid JSON passes through untouched.
fn normalize_json_text(text: &str) -> String {
    let text = text.trim();
    if serde_json::from_str::<serde_json::Value>(text).is_ok() {
        return text.to_string();
    }

    static SINGLE_KEY: OnceLock<Regex> = OnceLock::new();
    static SINGLE_VALUE: OnceLock<Regex> = OnceLock::new();
    static TRAILING_OBJ: OnceLock<Regex> = OnceLock::new();
    static TRAILING_ARR: OnceLock<Regex> = OnceLock::new();

    let mut fixed = text.to_string();
    fixed = SINGLE_KEY
        .get_or_init(|| Regex::new(r"'([^']*)'\s*:").unwrap())
        .replace_all(&fixed, "\"$1\":")
        .into_owned();
    fixed = SINGLE_VALUE
        .get_or_init(|| Regex::new(r":\s*'([^']*)'").unwrap())
        .replace_all(&fixed, ": \"$1\"")
        .into_owned();
    fixed = TRAILING_OBJ
        .get_or_init(|| Regex::new(r",\s*\}").unwrap())
        .replace_all(&fixed, "}")
        .into_owned();
    fixed = TRAILING_ARR
        .get_or_init(|| Regex::new(r",\s*\]").unwrap())
        .replace_all(&fixed, "]")
        .into_owned();
    fixed
}

fn try_parse_json(text: &str) -> Option<ParsedFields> {
    let normalized = normalize_json_text(text);
    let trimmed = normalized.trim();
    if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
        return None;
    }

    let object: serde_json::Map<String, serde_json::Value> =
        match serde_json::from_str(trimmed) {
            Ok(map) => map,
            Err(e) => {
                log::debug!("[PARSE] JSON rung rejected: {}", e);
                return None;
            }
        };

    let mut fields = ParsedFields::new();
    for (key, value) in &object {
        let value = match value {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => continue,
        };
        if value.is_empty() {
            continue;
        }
        if let Some(canonical) = keymap::fuzzy_map_key(key) {
            fields.insert(canonical.to_string(), value);
        }
    }

    (!fields.is_empty()).then_some(fields)
}

// ── Stage 2: key:value lines ─────────────────────────────────────────

fn key_value_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r#""([^"]+)"\s*[:：]\s*"([^"]*)""#,
            r"'([^']+)'\s*[:：]\s*'([^']*)'",
            r#""([^"]+)"\s*[:：]\s*([^",}\n]+)"#,
            r#"([^":：\n]+?)\s*[:：]\s*"([^"]*)""#,
            r#"(?m)([^":：\n]+?)\s*[:：]\s*([^",}\n]+)"#,
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn try_parse_key_values(text: &str) -> Option<ParsedFields> {
    let mut fields = ParsedFields::new();
    for pattern in key_value_patterns() {
        for caps in pattern.captures_iter(text) {
            let key = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let value = caps
                .get(2)
                .map(|m| m.as_str().trim().trim_matches(|c| c == '"' || c == '\''))
                .unwrap_or("");
            if key.is_empty() || value.is_empty() {
                continue;
            }
            if let Some(canonical) = keymap::fuzzy_map_key(key) {
                // First pattern to claim a slot wins — the quoted forms run
                // before the loose ones and are more trustworthy.
                fields
                    .entry(canonical.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
    }
    (!fields.is_empty()).then_some(fields)
}

// ── Enrichment ───────────────────────────────────────────────────────

/// Fill phone slots from anywhere in the raw text when the structured rungs
/// left them empty. Mobiles and office lines route to their own slots.
fn enrich_with_phones(fields: &mut ParsedFields, text: &str) {
    let phones = extract::extract_phones(text);
    if phones.is_empty() {
        return;
    }

    let mut office: Vec<&String> = Vec::new();
    for phone in &phones {
        match extract::classify_phone(phone) {
            extract::PhoneKind::Mobile => {
                if !fields.contains_key("mobile_phone") {
                    fields.insert("mobile_phone".to_string(), phone.clone());
                }
            }
            extract::PhoneKind::Office => office.push(phone),
        }
    }
    for (slot, phone) in ["company_phone1", "company_phone2"].iter().zip(office) {
        if !fields.contains_key(*slot) {
            fields.insert(slot.to_string(), phone.clone());
        }
    }
}

/// A single slot sometimes arrives holding several newline-separated values
/// (three department levels in one cell, two address lines). Spread them
/// over the numbered slots that exist for exactly this reason.
fn split_multiline_slots(fields: &mut ParsedFields) {
    spread(fields, &["department1", "department2", "department3"]);
    spread(fields, &["company_address1", "company_address2"]);
    spread(fields, &["note1", "note2"]);

    // Phones need per-line reclassification rather than a plain spread.
    for slot in ["mobile_phone", "company_phone1"] {
        let Some(raw) = fields.get(slot).cloned() else { continue };
        if !raw.contains('\n') {
            continue;
        }
        let mut parts = raw.lines().map(str::trim).filter(|l| !l.is_empty());
        if let Some(first) = parts.next() {
            fields.insert(slot.to_string(), first.to_string());
        }
        if let Some(second) = parts.next() {
            let target = match extract::classify_phone(second) {
                extract::PhoneKind::Mobile => "mobile_phone",
                extract::PhoneKind::Office => {
                    if slot == "company_phone1" || fields.contains_key("company_phone1") {
                        "company_phone2"
                    } else {
                        "company_phone1"
                    }
                }
            };
            if !fields.contains_key(target) {
                fields.insert(target.to_string(), second.to_string());
            }
        }
    }
}

fn spread(fields: &mut ParsedFields, slots: &[&str]) {
    let first = slots[0];
    let Some(raw) = fields.get(first).cloned() else { return };
    if !raw.contains('\n') {
        return;
    }
    let parts: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect();
    for (slot, part) in slots.iter().zip(parts) {
        if *slot == first || !fields.contains_key(*slot) {
            fields.insert(slot.to_string(), part);
        }
    }
}
