//! Reading and writing the TIFF structure inside an EXIF block.
//!
//! Values are kept as raw bytes in the container's own byte order, so tags
//! this crate knows nothing about survive a read/write cycle unchanged. Only
//! the sub-IFD pointers and thumbnail offsets are regenerated on write.

use std::collections::{BTreeMap, HashSet};

use log::warn;

use super::tags::{
    ByteOrder, FieldType, IfdKind, EXIF_IFD_POINTER, GPS_IFD_POINTER, INTEROP_IFD_POINTER,
    JPEG_INTERCHANGE_FORMAT, JPEG_INTERCHANGE_FORMAT_LENGTH,
};
use super::ParseError;

const TIFF_MAGIC: u16 = 42;
const HEADER_LEN: usize = 8;
const ENTRY_LEN: usize = 12;

/// One IFD entry: its field type, value count and raw value bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub field_type: FieldType,
    pub count: u32,
    pub raw: Vec<u8>,
}

impl Entry {
    /// Creates an entry whose count is derived from the raw length.
    pub fn new(field_type: FieldType, raw: Vec<u8>) -> Self {
        let count = (raw.len() / field_type.size()) as u32;
        Self {
            field_type,
            count,
            raw,
        }
    }

    fn long(order: ByteOrder, value: u32) -> Self {
        Self::new(FieldType::Long, order.u32_bytes(value).to_vec())
    }

    fn as_u32(&self, order: ByteOrder) -> Option<u32> {
        match self.field_type {
            FieldType::Long | FieldType::Ifd => {
                let bytes: [u8; 4] = self.raw.get(..4)?.try_into().ok()?;
                Some(order.u32_from(bytes))
            }
            FieldType::Short => {
                let bytes: [u8; 2] = self.raw.get(..2)?.try_into().ok()?;
                Some(order.u16_from(bytes) as u32)
            }
            _ => None,
        }
    }
}

/// Tag → entry map for one directory, kept in ascending tag order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ifd {
    entries: BTreeMap<u16, Entry>,
}

impl Ifd {
    pub fn get(&self, tag: u16) -> Option<&Entry> {
        self.entries.get(&tag)
    }

    pub fn insert(&mut self, tag: u16, entry: Entry) {
        self.entries.insert(tag, entry);
    }

    pub fn remove(&mut self, tag: u16) -> Option<Entry> {
        self.entries.remove(&tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.keys().copied()
    }

    /// Bytes this IFD occupies when written: header, entries, next
    /// pointer and out-of-line values padded to even length.
    fn encoded_len(&self) -> usize {
        let data: usize = self
            .entries
            .values()
            .filter(|entry| entry.raw.len() > 4)
            .map(|entry| entry.raw.len() + entry.raw.len() % 2)
            .sum();
        2 + ENTRY_LEN * self.entries.len() + 4 + data
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder, next: u32) {
        let base = out.len();
        let mut data_offset = base + 2 + ENTRY_LEN * self.entries.len() + 4;
        let mut data = Vec::new();

        out.extend_from_slice(&order.u16_bytes(self.entries.len() as u16));
        for (tag, entry) in &self.entries {
            out.extend_from_slice(&order.u16_bytes(*tag));
            out.extend_from_slice(&order.u16_bytes(entry.field_type as u16));
            out.extend_from_slice(&order.u32_bytes(entry.count));
            if entry.raw.len() <= 4 {
                let mut inline = [0u8; 4];
                inline[..entry.raw.len()].copy_from_slice(&entry.raw);
                out.extend_from_slice(&inline);
            } else {
                out.extend_from_slice(&order.u32_bytes(data_offset as u32));
                data.extend_from_slice(&entry.raw);
                if entry.raw.len() % 2 == 1 {
                    data.push(0);
                }
                data_offset += entry.raw.len() + entry.raw.len() % 2;
            }
        }
        out.extend_from_slice(&order.u32_bytes(next));
        out.extend_from_slice(&data);
    }
}

/// A parsed EXIF container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExifData {
    byte_order: ByteOrder,
    primary: Ifd,
    exif: Ifd,
    gps: Ifd,
    interop: Ifd,
    thumbnail_ifd: Ifd,
    thumbnail: Option<Vec<u8>>,
}

impl ExifData {
    /// Creates an empty container.
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            primary: Ifd::default(),
            exif: Ifd::default(),
            gps: Ifd::default(),
            interop: Ifd::default(),
            thumbnail_ifd: Ifd::default(),
            thumbnail: None,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// The embedded JPEG thumbnail, if any.
    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.thumbnail.as_deref()
    }

    pub fn ifd(&self, kind: IfdKind) -> &Ifd {
        match kind {
            IfdKind::Primary => &self.primary,
            IfdKind::Exif => &self.exif,
            IfdKind::Gps => &self.gps,
            IfdKind::Interop => &self.interop,
            IfdKind::Thumbnail => &self.thumbnail_ifd,
        }
    }

    fn ifd_mut(&mut self, kind: IfdKind) -> &mut Ifd {
        match kind {
            IfdKind::Primary => &mut self.primary,
            IfdKind::Exif => &mut self.exif,
            IfdKind::Gps => &mut self.gps,
            IfdKind::Interop => &mut self.interop,
            IfdKind::Thumbnail => &mut self.thumbnail_ifd,
        }
    }

    pub fn get(&self, kind: IfdKind, tag: u16) -> Option<&Entry> {
        self.ifd(kind).get(tag)
    }

    /// Sets `tag` in `kind` to `raw`, replacing any existing value.
    ///
    /// `raw` must already be in the container's byte order for multi-byte
    /// types; BYTE and UNDEFINED values are order-independent.
    pub fn set(&mut self, kind: IfdKind, tag: u16, field_type: FieldType, raw: Vec<u8>) {
        self.ifd_mut(kind).insert(tag, Entry::new(field_type, raw));
    }

    pub fn remove(&mut self, kind: IfdKind, tag: u16) -> Option<Entry> {
        self.ifd_mut(kind).remove(tag)
    }

    /// Parses a TIFF structure (the EXIF block without its `Exif\0\0` prefix).
    pub fn from_tiff(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < HEADER_LEN {
            return Err(ParseError::new("TIFF header truncated"));
        }
        let byte_order = match &data[..2] {
            b"II" => ByteOrder::LittleEndian,
            b"MM" => ByteOrder::BigEndian,
            other => {
                return Err(ParseError::new(format!(
                    "unknown byte order marker {:02X}{:02X}",
                    other[0], other[1]
                )))
            }
        };
        let reader = Reader {
            data,
            order: byte_order,
        };
        if reader.u16(2)? != TIFF_MAGIC {
            return Err(ParseError::new("TIFF magic number is not 42"));
        }

        let mut visited = HashSet::new();
        let mut exif = ExifData::new(byte_order);

        let (mut primary, next) = reader.ifd(reader.u32(4)? as usize, &mut visited)?;

        if let Some(offset) = take_pointer(&mut primary, EXIF_IFD_POINTER, byte_order) {
            let (mut exif_ifd, _) = reader.ifd(offset as usize, &mut visited)?;
            if let Some(offset) = take_pointer(&mut exif_ifd, INTEROP_IFD_POINTER, byte_order) {
                exif.interop = reader.ifd(offset as usize, &mut visited)?.0;
            }
            exif.exif = exif_ifd;
        }
        if let Some(offset) = take_pointer(&mut primary, GPS_IFD_POINTER, byte_order) {
            exif.gps = reader.ifd(offset as usize, &mut visited)?.0;
        }
        exif.primary = primary;

        if next != 0 {
            let (mut thumbnail_ifd, _) = reader.ifd(next as usize, &mut visited)?;
            let start = take_pointer(&mut thumbnail_ifd, JPEG_INTERCHANGE_FORMAT, byte_order);
            let len = take_pointer(&mut thumbnail_ifd, JPEG_INTERCHANGE_FORMAT_LENGTH, byte_order);
            if let (Some(start), Some(len)) = (start, len) {
                exif.thumbnail = Some(reader.slice(start as usize, len as usize)?.to_vec());
            }
            exif.thumbnail_ifd = thumbnail_ifd;
        }

        Ok(exif)
    }

    /// Serializes the container back into a TIFF structure.
    pub fn to_tiff(&self) -> Vec<u8> {
        let order = self.byte_order;
        let has_interop = !self.interop.is_empty();
        let has_exif = !self.exif.is_empty() || has_interop;
        let has_gps = !self.gps.is_empty();
        let has_ifd1 = !self.thumbnail_ifd.is_empty() || self.thumbnail.is_some();

        // Pointer entries are inline LONGs, so placeholders give final sizes.
        let mut primary = self.primary.clone();
        let mut exif = self.exif.clone();
        let mut thumbnail_ifd = self.thumbnail_ifd.clone();
        if has_exif {
            primary.insert(EXIF_IFD_POINTER, Entry::long(order, 0));
        }
        if has_gps {
            primary.insert(GPS_IFD_POINTER, Entry::long(order, 0));
        }
        if has_interop {
            exif.insert(INTEROP_IFD_POINTER, Entry::long(order, 0));
        }
        if let Some(thumbnail) = &self.thumbnail {
            thumbnail_ifd.insert(JPEG_INTERCHANGE_FORMAT, Entry::long(order, 0));
            thumbnail_ifd.insert(
                JPEG_INTERCHANGE_FORMAT_LENGTH,
                Entry::long(order, thumbnail.len() as u32),
            );
        }

        let primary_at = HEADER_LEN;
        let exif_at = primary_at + primary.encoded_len();
        let gps_at = exif_at + if has_exif { exif.encoded_len() } else { 0 };
        let interop_at = gps_at + if has_gps { self.gps.encoded_len() } else { 0 };
        let ifd1_at = interop_at + if has_interop { self.interop.encoded_len() } else { 0 };
        let thumbnail_at = ifd1_at + if has_ifd1 { thumbnail_ifd.encoded_len() } else { 0 };

        if has_exif {
            primary.insert(EXIF_IFD_POINTER, Entry::long(order, exif_at as u32));
        }
        if has_gps {
            primary.insert(GPS_IFD_POINTER, Entry::long(order, gps_at as u32));
        }
        if has_interop {
            exif.insert(INTEROP_IFD_POINTER, Entry::long(order, interop_at as u32));
        }
        if self.thumbnail.is_some() {
            thumbnail_ifd.insert(JPEG_INTERCHANGE_FORMAT, Entry::long(order, thumbnail_at as u32));
        }

        let mut out = Vec::with_capacity(thumbnail_at + self.thumbnail.as_ref().map_or(0, Vec::len));
        out.extend_from_slice(order.marker());
        out.extend_from_slice(&order.u16_bytes(TIFF_MAGIC));
        out.extend_from_slice(&order.u32_bytes(primary_at as u32));

        let next = if has_ifd1 { ifd1_at as u32 } else { 0 };
        primary.write(&mut out, order, next);
        if has_exif {
            exif.write(&mut out, order, 0);
        }
        if has_gps {
            self.gps.write(&mut out, order, 0);
        }
        if has_interop {
            self.interop.write(&mut out, order, 0);
        }
        if has_ifd1 {
            thumbnail_ifd.write(&mut out, order, 0);
        }
        if let Some(thumbnail) = &self.thumbnail {
            out.extend_from_slice(thumbnail);
        }
        out
    }
}

fn take_pointer(ifd: &mut Ifd, tag: u16, order: ByteOrder) -> Option<u32> {
    ifd.remove(tag).and_then(|entry| entry.as_u32(order))
}

/// Bounds-checked reads over the TIFF bytes.
struct Reader<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> Reader<'a> {
    fn slice(&self, start: usize, len: usize) -> Result<&'a [u8], ParseError> {
        start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| {
                ParseError::new(format!(
                    "value at offset {} (len {}) runs past end of data ({} bytes)",
                    start,
                    len,
                    self.data.len()
                ))
            })
    }

    fn u16(&self, at: usize) -> Result<u16, ParseError> {
        let bytes = self.slice(at, 2)?;
        Ok(self.order.u16_from([bytes[0], bytes[1]]))
    }

    fn u32(&self, at: usize) -> Result<u32, ParseError> {
        let bytes = self.slice(at, 4)?;
        Ok(self.order.u32_from([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads the IFD at `offset`, returning it and the next-IFD offset.
    fn ifd(&self, offset: usize, visited: &mut HashSet<usize>) -> Result<(Ifd, u32), ParseError> {
        if !visited.insert(offset) {
            return Err(ParseError::new(format!("IFD at offset {} is referenced twice", offset)));
        }

        let count = self.u16(offset)? as usize;
        let mut ifd = Ifd::default();

        for i in 0..count {
            let at = offset + 2 + i * ENTRY_LEN;
            let tag = self.u16(at)?;
            let type_code = self.u16(at + 2)?;
            let value_count = self.u32(at + 4)?;

            let Some(field_type) = FieldType::from_u16(type_code) else {
                warn!("skipping EXIF tag 0x{:04X} with unknown type {}", tag, type_code);
                continue;
            };

            let len = (value_count as usize)
                .checked_mul(field_type.size())
                .ok_or_else(|| ParseError::new(format!("tag 0x{:04X} is too large", tag)))?;
            let raw = if len <= 4 {
                self.slice(at + 8, len)?
            } else {
                self.slice(self.u32(at + 8)? as usize, len)?
            };

            ifd.insert(
                tag,
                Entry {
                    field_type,
                    count: value_count,
                    raw: raw.to_vec(),
                },
            );
        }

        // Some writers truncate the block right after the last entry.
        let next = self.u32(offset + 2 + count * ENTRY_LEN).unwrap_or(0);
        Ok((ifd, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::tags::{DATE_TIME_ORIGINAL, MAKE, ORIENTATION, USER_COMMENT, XP_KEYWORDS};

    fn sample(order: ByteOrder) -> ExifData {
        let mut exif = ExifData::new(order);
        exif.set(IfdKind::Primary, MAKE, FieldType::Ascii, b"Canon\0".to_vec());
        exif.set(
            IfdKind::Primary,
            ORIENTATION,
            FieldType::Short,
            order.u16_bytes(6).to_vec(),
        );
        exif.set(
            IfdKind::Exif,
            DATE_TIME_ORIGINAL,
            FieldType::Ascii,
            b"2021:06:01 12:00:00\0".to_vec(),
        );
        exif.set(IfdKind::Gps, 0x0000, FieldType::Byte, vec![2, 3, 0, 0]);
        exif.set(IfdKind::Interop, 0x0001, FieldType::Ascii, b"R98\0".to_vec());
        exif.set(
            IfdKind::Thumbnail,
            0x0103,
            FieldType::Short,
            order.u16_bytes(6).to_vec(),
        );
        exif.thumbnail = Some(vec![0xFF, 0xD8, 0xFF, 0xD9]);
        exif
    }

    #[test]
    fn test_roundtrip_little_endian() {
        let original = sample(ByteOrder::LittleEndian);
        let tiff = original.to_tiff();
        assert_eq!(&tiff[..4], b"II\x2A\x00");

        let restored = ExifData::from_tiff(&tiff).expect("parse tiff");
        assert_eq!(original, restored);
    }

    #[test]
    fn test_roundtrip_big_endian() {
        let original = sample(ByteOrder::BigEndian);
        let tiff = original.to_tiff();
        assert_eq!(&tiff[..4], b"MM\x00\x2A");

        let restored = ExifData::from_tiff(&tiff).expect("parse tiff");
        assert_eq!(original, restored);
        assert_eq!(restored.thumbnail(), Some(&[0xFF, 0xD8, 0xFF, 0xD9][..]));
    }

    #[test]
    fn test_write_is_stable() {
        let tiff = sample(ByteOrder::LittleEndian).to_tiff();
        let again = ExifData::from_tiff(&tiff).unwrap().to_tiff();
        assert_eq!(tiff, again);
    }

    #[test]
    fn test_set_replaces_only_target_tag() {
        let mut exif = sample(ByteOrder::BigEndian);
        exif.set(IfdKind::Primary, XP_KEYWORDS, FieldType::Byte, vec![0x61, 0, 0, 0, 0, 0]);
        exif.set(IfdKind::Primary, XP_KEYWORDS, FieldType::Byte, vec![0x62, 0, 0, 0]);
        exif.set(IfdKind::Exif, USER_COMMENT, FieldType::Undefined, b"ASCII\0\0\0hi".to_vec());

        let restored = ExifData::from_tiff(&exif.to_tiff()).unwrap();
        let keywords = restored.get(IfdKind::Primary, XP_KEYWORDS).unwrap();
        assert_eq!(keywords.raw, vec![0x62, 0, 0, 0]);
        assert_eq!(keywords.count, 4);
        assert_eq!(
            restored.get(IfdKind::Primary, MAKE).unwrap().raw,
            b"Canon\0".to_vec()
        );
        assert_eq!(restored.ifd(IfdKind::Exif).len(), 2);
    }

    #[test]
    fn test_out_of_line_values_are_word_aligned() {
        let mut exif = ExifData::new(ByteOrder::LittleEndian);
        exif.set(IfdKind::Primary, MAKE, FieldType::Ascii, b"Nikon\0\0".to_vec());
        exif.set(IfdKind::Primary, 0x0110, FieldType::Ascii, b"D750\0".to_vec());
        let tiff = exif.to_tiff();

        // Entries start at 8 + 2; each value offset field sits 8 bytes in.
        let first = u32::from_le_bytes(tiff[18..22].try_into().unwrap());
        let second = u32::from_le_bytes(tiff[30..34].try_into().unwrap());
        assert_eq!(first % 2, 0);
        assert_eq!(second, first + 8);
        let restored = ExifData::from_tiff(&tiff).unwrap();
        assert_eq!(restored, exif);
    }

    #[test]
    fn test_rejects_bad_header() {
        assert!(ExifData::from_tiff(b"II").is_err());
        assert!(ExifData::from_tiff(b"XX\x2A\x00\x08\x00\x00\x00").is_err());
        assert!(ExifData::from_tiff(b"II\x2B\x00\x08\x00\x00\x00").is_err());
    }

    #[test]
    fn test_rejects_out_of_range_ifd() {
        let tiff = b"II\x2A\x00\xFF\x00\x00\x00";
        assert!(ExifData::from_tiff(tiff).is_err());
    }

    #[test]
    fn test_rejects_ifd_cycle() {
        // IFD0 with zero entries whose next pointer points back at itself.
        let mut tiff = b"II\x2A\x00\x08\x00\x00\x00".to_vec();
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&8u32.to_le_bytes());
        assert!(ExifData::from_tiff(&tiff).is_err());
    }

    #[test]
    fn test_skips_unknown_field_type() {
        let mut tiff = b"II\x2A\x00\x08\x00\x00\x00".to_vec();
        tiff.extend_from_slice(&2u16.to_le_bytes());
        // tag 0x0100, type 99 (unknown)
        tiff.extend_from_slice(&[0x00, 0x01, 99, 0, 1, 0, 0, 0, 0, 0, 0, 0]);
        // tag 0x0112 Orientation, SHORT, 1
        tiff.extend_from_slice(&[0x12, 0x01, 3, 0, 1, 0, 0, 0, 1, 0, 0, 0]);
        tiff.extend_from_slice(&0u32.to_le_bytes());

        let exif = ExifData::from_tiff(&tiff).unwrap();
        assert_eq!(exif.ifd(IfdKind::Primary).tags().collect::<Vec<_>>(), vec![ORIENTATION]);
    }
}
