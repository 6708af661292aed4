//! Integer bounding boxes in XYXY pixel format.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in XYXY format (x0, y0, x1, y1).
///
/// `(x0, y0)` is the top-left corner and `(x1, y1)` the bottom-right corner,
/// in image pixel coordinates. Detectors report whole pixels, so coordinates
/// are integers.
///
/// Note: This type does NOT enforce `x0 <= x1` or `y0 <= y1`, nor that the
/// box lies inside the image. Whatever the detector reports is kept as-is;
/// [`BBox::area`] is the only place that has to cope with a malformed box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BBox {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl BBox {
    /// Creates a new bounding box from explicit corner coordinates.
    #[inline]
    pub fn from_xyxy(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Returns the width of the box, or zero if the box is inverted horizontally.
    #[inline]
    pub fn width(&self) -> i64 {
        self.x1.saturating_sub(self.x0).max(0)
    }

    /// Returns the height of the box, or zero if the box is inverted vertically.
    #[inline]
    pub fn height(&self) -> i64 {
        self.y1.saturating_sub(self.y0).max(0)
    }

    /// Returns the pixel area of the box.
    ///
    /// Always non-negative. Saturates at `i64::MAX` for boxes far larger
    /// than any image.
    #[inline]
    pub fn area(&self) -> i64 {
        self.width().saturating_mul(self.height())
    }

    /// Returns true if the box is properly ordered (x0 <= x1 and y0 <= y1).
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.x0 <= self.x1 && self.y0 <= self.y1
    }

    /// Returns the corners as an `[x0, y0, x1, y1]` array.
    #[inline]
    pub fn to_array(&self) -> [i64; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }
}

impl From<[i64; 4]> for BBox {
    fn from([x0, y0, x1, y1]: [i64; 4]) -> Self {
        Self::from_xyxy(x0, y0, x1, y1)
    }
}

impl From<(i64, i64, i64, i64)> for BBox {
    fn from((x0, y0, x1, y1): (i64, i64, i64, i64)) -> Self {
        Self::from_xyxy(x0, y0, x1, y1)
    }
}

// Serialized as a plain `[x0, y0, x1, y1]` array, the shape detectors emit.
impl Serialize for BBox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BBox {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let corners = <[i64; 4]>::deserialize(deserializer)?;
        Ok(BBox::from(corners))
    }
}
