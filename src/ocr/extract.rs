//! Free-text field extraction.
//!
//! Fallback for when the engine returns plain prose instead of structured
//! key/value output: deterministic regex + keyword scans tuned for Taiwanese
//! business cards (09-prefixed mobiles, 0[2-8] office lines, 市/區/路/號
//! address grammar, 部/處/課 department suffixes).

use crate::card::schema::{ParsedFields, Side};
use regex::Regex;
use std::sync::OnceLock;

/// Whether a phone string is a mobile or an office number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneKind {
    Mobile,
    Office,
}

fn phone_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // Mobile: 09 prefix, plain or dash/space grouped, optional +886
            r"\+886\s?9\d{8}",
            r"09\d{2}[-\s]\d{3}[-\s]\d{3}",
            r"09\d{8}",
            // Office lines: 0[2-8] area codes in common groupings
            r"\(0[2-8]\)\s?\d{7,8}",
            r"0[2-8][-\s]?\d{4}[-\s]?\d{4}",
            r"0[2-8][-\s]?\d{7,8}",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap()
    })
}

fn line_id_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)Line\s*ID\s*[:：\s]\s*([A-Za-z0-9._\-]+)",
            r"(?i)LINE\s*[:：]\s*([A-Za-z0-9._\-]+)",
            r"賴\s*[:：]\s*([A-Za-z0-9._\-]+)",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Keep only digits (and a leading +) for phone-shape tests.
fn digits_of(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// True if the string as a whole looks like a Taiwanese phone number.
pub fn is_phone_number(text: &str) -> bool {
    let digits = digits_of(text);
    if digits.len() < 9 || digits.len() > 11 {
        return false;
    }
    if digits.starts_with("09") && digits.len() == 10 {
        return true;
    }
    // Area codes 02–08
    matches!(digits.as_bytes().first(), Some(b'0'))
        && matches!(digits.as_bytes().get(1), Some(b'2'..=b'8'))
}

/// Mobile (09…) vs office (area-code) classification. Unrecognized shapes
/// default to office, matching how cards list their switchboard first.
pub fn classify_phone(phone: &str) -> PhoneKind {
    let digits = digits_of(phone);
    if (digits.starts_with("09") && digits.len() == 10)
        || (digits.starts_with("8869") && digits.len() == 12)
    {
        PhoneKind::Mobile
    } else {
        PhoneKind::Office
    }
}

/// Pull up to three distinct phone numbers out of the text, line by line.
pub fn extract_phones(text: &str) -> Vec<String> {
    let mut phones: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // A line that is nothing but a number (possibly formatted)
        if is_phone_number(line) {
            phones.push(line.to_string());
            continue;
        }
        for pattern in phone_patterns() {
            for m in pattern.find_iter(line) {
                let candidate = m.as_str().trim();
                if is_phone_number(candidate) {
                    phones.push(candidate.to_string());
                }
            }
        }
    }
    let mut seen = std::collections::HashSet::new();
    phones.retain(|p| seen.insert(p.clone()));
    phones.truncate(3);
    phones
}

pub fn extract_email(text: &str) -> Option<String> {
    email_pattern().find(text).map(|m| m.as_str().to_string())
}

pub fn extract_line_id(text: &str) -> Option<String> {
    line_id_patterns()
        .iter()
        .find_map(|p| p.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

const DEPT_KEYWORDS: &[&str] = &[
    "事業群", "事業部", "營業部", "業務部", "技術部", "研發部", "行政部",
    "人事部", "財務部", "會計部", "資訊部", "企劃部", "中心", "部", "處",
    "課", "組",
];

/// Short line carrying a department suffix, with no contact-info characters.
pub fn is_department_name(text: &str) -> bool {
    let chars = text.chars().count();
    if !(2..=20).contains(&chars) {
        return false;
    }
    if text.chars().any(|c| c.is_ascii_digit() || "@./-".contains(c)) {
        return false;
    }
    DEPT_KEYWORDS.iter().any(|kw| text.contains(kw)) && !is_phone_number(text)
}

const ADDRESS_KEYWORDS: &[&str] = &[
    "市", "區", "鄉", "鎮", "路", "街", "巷", "弄", "號", "樓", "縣", "村", "里",
];

const CITY_KEYWORDS: &[&str] = &[
    "台北", "新北", "桃園", "台中", "台南", "高雄", "基隆", "新竹", "苗栗",
    "彰化", "南投", "雲林", "嘉義", "屏東", "宜蘭", "花蓮", "台東", "澎湖",
    "金門", "連江",
];

pub fn is_address(text: &str) -> bool {
    if text.chars().count() <= 5 {
        return false;
    }
    let has_marker = ADDRESS_KEYWORDS.iter().any(|kw| text.contains(kw))
        || CITY_KEYWORDS.iter().any(|city| text.contains(city));
    if !has_marker {
        return false;
    }
    // Rule out things that merely contain 市/號 but are really numbers or
    // departments ("新生南路" vs "02-2345-6789 分機 100").
    !is_phone_number(text) && !is_department_name(text)
}

/// Up to two address lines, in reading order.
pub fn extract_addresses<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut found: Vec<String> = lines
        .map(str::trim)
        .filter(|l| is_address(l))
        .map(|l| l.to_string())
        .collect();
    found.truncate(2);
    found
}

const POSITION_KEYWORDS: &[&str] = &[
    "總經理", "執行長", "經理", "總監", "主任", "課長", "部長", "董事",
    "協理", "專員", "組長", "副理",
];

const COMPANY_KEYWORDS: &[&str] = &[
    "公司", "企業", "集團", "股份", "有限", "Co.", "Ltd", "Inc", "Corp",
];

/// Name heuristic: an early, short line with no digits or contact symbols.
/// Only applied to the front side — the back rarely repeats the name.
pub fn extract_name<'a>(lines: impl Iterator<Item = &'a str>) -> Option<String> {
    lines
        .take(3)
        .map(str::trim)
        .find(|l| {
            let chars = l.chars().count();
            (2..=8).contains(&chars)
                && !l.chars().any(|c| c.is_ascii_digit() || "@./-".contains(c))
        })
        .map(|l| l.to_string())
}

pub fn extract_position<'a>(mut lines: impl Iterator<Item = &'a str>) -> Option<String> {
    lines
        .find(|l| POSITION_KEYWORDS.iter().any(|kw| l.contains(kw)))
        .map(|l| l.trim().to_string())
}

pub fn extract_company<'a>(mut lines: impl Iterator<Item = &'a str>) -> Option<String> {
    lines
        .find(|l| COMPANY_KEYWORDS.iter().any(|kw| l.contains(kw)))
        .map(|l| l.trim().to_string())
}

/// Analyze free text into canonical fields. Back sides collect every line
/// not claimed by another field into note1.
pub fn analyze_text(text: &str, side: Side) -> ParsedFields {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let full_text = lines.join(" ");
    let mut fields = ParsedFields::new();

    let phones = extract_phones(text);
    let mut office_slot = ["company_phone1", "company_phone2"].iter();
    for phone in &phones {
        match classify_phone(phone) {
            PhoneKind::Mobile => {
                fields
                    .entry("mobile_phone".to_string())
                    .or_insert_with(|| phone.clone());
            }
            PhoneKind::Office => {
                if let Some(slot) = office_slot.next() {
                    fields.insert(slot.to_string(), phone.clone());
                }
            }
        }
    }

    if let Some(email) = extract_email(&full_text) {
        fields.insert("email".to_string(), email);
    }
    if let Some(line_id) = extract_line_id(&full_text) {
        fields.insert("line_id".to_string(), line_id);
    }

    for (i, addr) in extract_addresses(lines.iter().copied()).into_iter().enumerate() {
        fields.insert(format!("company_address{}", i + 1), addr);
    }

    for (i, dept) in lines
        .iter()
        .filter(|l| is_department_name(l))
        .take(3)
        .enumerate()
    {
        fields.insert(format!("department{}", i + 1), dept.to_string());
    }

    if side == Side::Front {
        if let Some(name) = extract_name(lines.iter().copied()) {
            fields.insert("name".to_string(), name);
        }
    }
    if let Some(position) = extract_position(lines.iter().copied()) {
        fields.insert("position".to_string(), position);
    }
    if let Some(company) = extract_company(lines.iter().copied()) {
        fields.insert("company_name".to_string(), company);
    }

    if side == Side::Back {
        let leftovers: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| !fields.values().any(|v| v == l))
            .collect();
        if !leftovers.is_empty() {
            fields.insert("note1".to_string(), leftovers.join("\n"));
        }
    }

    fields
}
