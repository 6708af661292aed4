//! Free-text `UserComment` payloads.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::detection::{Detection, DetectionSet};

/// Character-code prefix marking a `UserComment` value as Unicode text.
pub const USER_COMMENT_UNICODE_PREFIX: &[u8; 8] = b"UNICODE\0";

/// Encodes `text` as an EXIF `UserComment` value: the Unicode character-code
/// prefix followed by the text as UTF-16 big-endian, without terminator.
pub fn encode_user_comment(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(USER_COMMENT_UNICODE_PREFIX.len() + 2 * text.len());
    bytes.extend_from_slice(USER_COMMENT_UNICODE_PREFIX);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}

/// Renders every detection of `set` as JSON, grouped by label.
///
/// Labels appear in first-occurrence order; each maps to a list of
/// `{"confidence": .., "area": ..}` objects with confidence rounded to two
/// decimals and area in pixels.
pub fn raw_detection_comment(set: &DetectionSet) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ByLabel(set))
}

struct ByLabel<'a>(&'a DetectionSet);

struct LabelRecords<'a> {
    label: &'a str,
    records: &'a [Detection],
}

#[derive(Serialize)]
struct RecordSummary {
    confidence: f64,
    area: i64,
}

impl Serialize for ByLabel<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let labels = self.0.labels_unique();
        let mut map = serializer.serialize_map(Some(labels.len()))?;
        for label in labels {
            map.serialize_entry(
                label,
                &LabelRecords {
                    label,
                    records: self.0.records(),
                },
            )?;
        }
        map.end()
    }
}

impl Serialize for LabelRecords<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for record in self.records.iter().filter(|r| r.label() == self.label) {
            seq.serialize_element(&RecordSummary {
                confidence: round_to(record.confidence(), 2),
                area: record.area(),
            })?;
        }
        seq.end()
    }
}

/// Rounds to `decimals` places on the exact binary value, ties to even.
///
/// `0.125` becomes `0.12` and `0.675` (stored as 0.67499...) becomes `0.67`.
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}
