//! Packed ARGB color decoding.
//!
//! Portfolio documents carry colors as 32-bit integers laid out as
//! `[alpha][red][green][blue]` from the most to the least significant byte.
//! Documents written by JVM tooling store them as signed values, so
//! deserialization accepts anything in `i32::MIN..=u32::MAX` and keeps the
//! low 32 bits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-bit `0xAARRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct PackedColor(u32);

/// Error for integers that cannot be a packed color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} is outside the packed color range")]
pub struct PackedColorRangeError(pub i64);

impl PackedColor {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        ((self.0 >> 24) & 0xFF) as u8
    }

    pub const fn red(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    pub const fn green(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub const fn blue(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Opaque `#rrggbb` form; alpha is discarded.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red(), self.green(), self.blue())
    }

    /// CSS `rgba(r, g, b, a)` form with alpha rendered to two decimals.
    pub fn rgba(self) -> String {
        let alpha = f64::from(self.alpha()) / 255.0;
        format!(
            "rgba({}, {}, {}, {:.2})",
            self.red(),
            self.green(),
            self.blue(),
            alpha
        )
    }
}

impl From<u32> for PackedColor {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<i32> for PackedColor {
    fn from(value: i32) -> Self {
        Self(value as u32)
    }
}

impl From<PackedColor> for u32 {
    fn from(color: PackedColor) -> Self {
        color.0
    }
}

impl TryFrom<i64> for PackedColor {
    type Error = PackedColorRangeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
            return Err(PackedColorRangeError(value));
        }
        Ok(Self(value as u32))
    }
}

impl fmt::Display for PackedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Decode a packed color into `#rrggbb`. `None` in, `None` out; the caller
/// supplies its own default.
pub fn decode_hex(packed: Option<u32>) -> Option<String> {
    packed.map(|value| PackedColor(value).hex())
}

/// Decode a packed color into `rgba(r, g, b, a)`.
pub fn decode_rgba(packed: Option<u32>) -> Option<String> {
    packed.map(|value| PackedColor(value).rgba())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_discards_alpha() {
        assert_eq!(decode_hex(Some(0xFF3366CC)), Some("#3366cc".to_string()));
        assert_eq!(decode_hex(Some(0x003366CC)), Some("#3366cc".to_string()));
    }

    #[test]
    fn test_decode_hex_zero_pads() {
        assert_eq!(decode_hex(Some(0xFF000102)), Some("#000102".to_string()));
        assert_eq!(decode_hex(Some(0)), Some("#000000".to_string()));
    }

    #[test]
    fn test_decode_rgba_half_alpha() {
        assert_eq!(
            decode_rgba(Some(0x803366CC)),
            Some("rgba(51, 102, 204, 0.50)".to_string())
        );
    }

    #[test]
    fn test_decode_rgba_alpha_bounds() {
        assert_eq!(
            decode_rgba(Some(0xFFFFFFFF)),
            Some("rgba(255, 255, 255, 1.00)".to_string())
        );
        assert_eq!(
            decode_rgba(Some(0x00000000)),
            Some("rgba(0, 0, 0, 0.00)".to_string())
        );
    }

    #[test]
    fn test_absent_color_decodes_to_none() {
        assert_eq!(decode_hex(None), None);
        assert_eq!(decode_rgba(None), None);
    }

    #[test]
    fn test_signed_values_keep_low_bits() {
        // 0xFF6200EA as written by a signed 32-bit serializer
        let color: PackedColor = serde_json::from_str("-10354454").unwrap();
        assert_eq!(color.value(), 0xFF6200EA);
        assert_eq!(color.hex(), "#6200ea");
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(serde_json::from_str::<PackedColor>("4294967296").is_err());
        assert!(PackedColor::try_from(-2_147_483_649i64).is_err());
    }
}
