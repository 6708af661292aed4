//! Tag numbers, field types and byte order for TIFF-structured EXIF data.

/// `XPKeywords` in IFD0: UTF-16LE keywords, stored as BYTE.
pub const XP_KEYWORDS: u16 = 0x9C9E;
/// `UserComment` in the Exif IFD, stored as UNDEFINED.
pub const USER_COMMENT: u16 = 0x9286;
/// `Make` in IFD0.
pub const MAKE: u16 = 0x010F;
/// `Orientation` in IFD0.
pub const ORIENTATION: u16 = 0x0112;
/// `DateTimeOriginal` in the Exif IFD.
pub const DATE_TIME_ORIGINAL: u16 = 0x9003;

pub(crate) const EXIF_IFD_POINTER: u16 = 0x8769;
pub(crate) const GPS_IFD_POINTER: u16 = 0x8825;
pub(crate) const INTEROP_IFD_POINTER: u16 = 0xA005;
pub(crate) const JPEG_INTERCHANGE_FORMAT: u16 = 0x0201;
pub(crate) const JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 0x0202;

/// The image file directories a tag can live in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IfdKind {
    /// IFD0, the primary image.
    Primary,
    /// The Exif sub-IFD (camera settings, comments).
    Exif,
    /// The GPS sub-IFD.
    Gps,
    /// The interoperability sub-IFD.
    Interop,
    /// IFD1, describing the embedded thumbnail.
    Thumbnail,
}

/// TIFF field types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Byte = 1,
    Ascii = 2,
    Short = 3,
    Long = 4,
    Rational = 5,
    SByte = 6,
    Undefined = 7,
    SShort = 8,
    SLong = 9,
    SRational = 10,
    Float = 11,
    Double = 12,
    Ifd = 13,
}

impl FieldType {
    pub fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            1 => Self::Byte,
            2 => Self::Ascii,
            3 => Self::Short,
            4 => Self::Long,
            5 => Self::Rational,
            6 => Self::SByte,
            7 => Self::Undefined,
            8 => Self::SShort,
            9 => Self::SLong,
            10 => Self::SRational,
            11 => Self::Float,
            12 => Self::Double,
            13 => Self::Ifd,
            _ => return None,
        })
    }

    /// Size in bytes of one value of this type.
    pub fn size(self) -> usize {
        match self {
            Self::Byte | Self::Ascii | Self::SByte | Self::Undefined => 1,
            Self::Short | Self::SShort => 2,
            Self::Long | Self::SLong | Self::Float | Self::Ifd => 4,
            Self::Rational | Self::SRational | Self::Double => 8,
        }
    }
}

/// Byte order of a TIFF structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    /// `II` (Intel).
    LittleEndian,
    /// `MM` (Motorola).
    BigEndian,
}

impl ByteOrder {
    pub(crate) fn marker(self) -> &'static [u8; 2] {
        match self {
            Self::LittleEndian => b"II",
            Self::BigEndian => b"MM",
        }
    }

    pub(crate) fn u16_from(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::LittleEndian => u16::from_le_bytes(bytes),
            Self::BigEndian => u16::from_be_bytes(bytes),
        }
    }

    pub(crate) fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::LittleEndian => u32::from_le_bytes(bytes),
            Self::BigEndian => u32::from_be_bytes(bytes),
        }
    }

    pub(crate) fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            Self::LittleEndian => value.to_le_bytes(),
            Self::BigEndian => value.to_be_bytes(),
        }
    }

    pub(crate) fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::LittleEndian => value.to_le_bytes(),
            Self::BigEndian => value.to_be_bytes(),
        }
    }
}
