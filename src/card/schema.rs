//! Canonical card schema — the bilingual contact record.
//!
//! A CardRecord carries 23 content slots: eight zh/en field pairs plus seven
//! language-neutral slots. Slots are addressed by their canonical string key
//! (the same keys the segmentation layer emits), so the classifier and merger
//! can operate generically without knowing the struct layout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical field key → value, as produced by field segmentation.
/// BTreeMap so iteration order (and thus log output) is stable.
pub type ParsedFields = BTreeMap<String, String>;

/// One face of a physical business card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Front => write!(f, "front"),
            Side::Back => write!(f, "back"),
        }
    }
}

/// Character class a pair's English slot is allowed to hold.
///
/// Person names admit a narrower set than company names, positions and
/// addresses (which need digits, ampersands, parentheses).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    PersonName,
    General,
}

/// A zh/en slot pair in the canonical schema.
pub struct FieldPair {
    pub zh: &'static str,
    pub en: &'static str,
    pub kind: PairKind,
}

/// All zh/en pairs, in schema order.
pub static FIELD_PAIRS: [FieldPair; 8] = [
    FieldPair { zh: "name", en: "name_en", kind: PairKind::PersonName },
    FieldPair { zh: "company_name", en: "company_name_en", kind: PairKind::General },
    FieldPair { zh: "position", en: "position_en", kind: PairKind::General },
    FieldPair { zh: "department1", en: "department1_en", kind: PairKind::General },
    FieldPair { zh: "department2", en: "department2_en", kind: PairKind::General },
    FieldPair { zh: "department3", en: "department3_en", kind: PairKind::General },
    FieldPair { zh: "company_address1", en: "company_address1_en", kind: PairKind::General },
    FieldPair { zh: "company_address2", en: "company_address2_en", kind: PairKind::General },
];

/// Language-neutral slots (no zh/en variant).
pub const NEUTRAL_FIELDS: [&str; 7] = [
    "mobile_phone",
    "company_phone1",
    "company_phone2",
    "email",
    "line_id",
    "note1",
    "note2",
];

/// The bilingual contact record.
///
/// Field names double as the canonical keys — they match the persistence
/// API's form fields and the segmentation output, so the record round-trips
/// without a mapping layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    // Basic info (zh/en)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_name_en: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub position_en: String,

    // Department hierarchy, three levels (zh/en)
    #[serde(default)]
    pub department1: String,
    #[serde(default)]
    pub department1_en: String,
    #[serde(default)]
    pub department2: String,
    #[serde(default)]
    pub department2_en: String,
    #[serde(default)]
    pub department3: String,
    #[serde(default)]
    pub department3_en: String,

    // Contact info
    #[serde(default)]
    pub mobile_phone: String,
    #[serde(default)]
    pub company_phone1: String,
    #[serde(default)]
    pub company_phone2: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub line_id: String,

    // Addresses (zh/en)
    #[serde(default)]
    pub company_address1: String,
    #[serde(default)]
    pub company_address1_en: String,
    #[serde(default)]
    pub company_address2: String,
    #[serde(default)]
    pub company_address2_en: String,

    // Free-text notes
    #[serde(default)]
    pub note1: String,
    #[serde(default)]
    pub note2: String,

    // Bookkeeping — assigned by capture/persistence, never by the classifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_ocr_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_ocr_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl CardRecord {
    /// Read a content slot by canonical key. None for unknown keys.
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "name" => &self.name,
            "name_en" => &self.name_en,
            "company_name" => &self.company_name,
            "company_name_en" => &self.company_name_en,
            "position" => &self.position,
            "position_en" => &self.position_en,
            "department1" => &self.department1,
            "department1_en" => &self.department1_en,
            "department2" => &self.department2,
            "department2_en" => &self.department2_en,
            "department3" => &self.department3,
            "department3_en" => &self.department3_en,
            "mobile_phone" => &self.mobile_phone,
            "company_phone1" => &self.company_phone1,
            "company_phone2" => &self.company_phone2,
            "email" => &self.email,
            "line_id" => &self.line_id,
            "company_address1" => &self.company_address1,
            "company_address1_en" => &self.company_address1_en,
            "company_address2" => &self.company_address2,
            "company_address2_en" => &self.company_address2_en,
            "note1" => &self.note1,
            "note2" => &self.note2,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Write a content slot by canonical key. Returns false (and leaves the
    /// record untouched) for unknown keys.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let slot = match key {
            "name" => &mut self.name,
            "name_en" => &mut self.name_en,
            "company_name" => &mut self.company_name,
            "company_name_en" => &mut self.company_name_en,
            "position" => &mut self.position,
            "position_en" => &mut self.position_en,
            "department1" => &mut self.department1,
            "department1_en" => &mut self.department1_en,
            "department2" => &mut self.department2,
            "department2_en" => &mut self.department2_en,
            "department3" => &mut self.department3,
            "department3_en" => &mut self.department3_en,
            "mobile_phone" => &mut self.mobile_phone,
            "company_phone1" => &mut self.company_phone1,
            "company_phone2" => &mut self.company_phone2,
            "email" => &mut self.email,
            "line_id" => &mut self.line_id,
            "company_address1" => &mut self.company_address1,
            "company_address1_en" => &mut self.company_address1_en,
            "company_address2" => &mut self.company_address2,
            "company_address2_en" => &mut self.company_address2_en,
            "note1" => &mut self.note1,
            "note2" => &mut self.note2,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// True if the slot holds no usable data (missing, empty, or whitespace).
    pub fn is_blank(&self, key: &str) -> bool {
        self.get(key).map(|v| v.trim().is_empty()).unwrap_or(true)
    }

    /// All canonical content keys, pairs first then neutral slots.
    pub fn content_keys() -> impl Iterator<Item = &'static str> {
        FIELD_PAIRS
            .iter()
            .flat_map(|p| [p.zh, p.en])
            .chain(NEUTRAL_FIELDS)
    }

    /// True if a string is one of the 23 canonical content keys.
    pub fn is_content_key(key: &str) -> bool {
        Self::content_keys().any(|k| k == key)
    }
}
