//! Module for pixel formats.
//!
//! Decoded image data is plain bytes, but since every supported image is 8
//! bits per channel the bytes can also be viewed as a slice of pixel structs.
//! The channel order is the PNG order: red, green, blue, and then alpha if the
//! image has alpha.

use bytemuck::{Pod, Zeroable};

/// An RGB value, 8-bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGB8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

/// An 8-bits per channel RGBA pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
#[allow(missing_docs)]
pub struct RGBA8 {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}
impl From<RGB8> for RGBA8 {
  #[inline]
  #[must_use]
  fn from(RGB8 { r, g, b }: RGB8) -> Self {
    Self { r, g, b, a: 255 }
  }
}

#[test]
fn test_rgb8_to_rgba8_is_opaque() {
  assert_eq!(RGBA8::from(RGB8 { r: 1, g: 2, b: 3 }), RGBA8 { r: 1, g: 2, b: 3, a: 255 });
}
