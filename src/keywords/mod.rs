//! Keyword string building and the `XPKeywords` byte encoding.
//!
//! Most EXIF text fields are plain byte strings, but `XPKeywords` is read by
//! photo managers as UTF-16 little-endian text terminated by two zero bytes,
//! regardless of the container's own byte order. [`encode_for_metadata_field`]
//! produces exactly that layout.

mod comment;

pub use comment::{encode_user_comment, raw_detection_comment, USER_COMMENT_UNICODE_PREFIX};

/// Default separator between keywords.
pub const DEFAULT_DELIMITER: &str = ",";

/// Joins ranked labels with `delimiter`, without a trailing delimiter.
///
/// ```
/// use phototagger::keywords::to_delimited_string;
///
/// assert_eq!(to_delimited_string(&["dog", "cat"], ","), "dog,cat");
/// assert_eq!(to_delimited_string::<&str>(&[], ","), "");
/// ```
pub fn to_delimited_string<S: AsRef<str>>(labels: &[S], delimiter: &str) -> String {
    let mut out = String::new();
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            out.push_str(delimiter);
        }
        out.push_str(label.as_ref());
    }
    out
}

/// Encodes `text` as UTF-16LE code units followed by a `0x00 0x00` terminator.
///
/// The output is always `2 * (utf16_len + 1)` bytes long.
///
/// ```
/// use phototagger::keywords::encode_for_metadata_field;
///
/// assert_eq!(
///     encode_for_metadata_field("cat"),
///     vec![0x63, 0x00, 0x61, 0x00, 0x74, 0x00, 0x00, 0x00]
/// );
/// ```
pub fn encode_for_metadata_field(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 * (text.len() + 1));
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes.extend_from_slice(&[0x00, 0x00]);
    bytes
}

/// Decodes an `XPKeywords` value back into text.
///
/// Trailing NUL code units are dropped, unpaired surrogates are replaced
/// and a dangling odd byte is ignored.
pub fn decode_metadata_field(bytes: &[u8]) -> String {
    let mut units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    while units.last() == Some(&0) {
        units.pop();
    }
    String::from_utf16_lossy(&units)
}
