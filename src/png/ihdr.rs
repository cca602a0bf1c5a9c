use super::*;

/// The types of color that this crate supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PngColorType {
  /// Red, Green, Blue
  RGB = 2,
  /// Red, Green, Blue, Alpha
  RGBA = 6,
}
impl PngColorType {
  /// The number of channels in this type of color.
  #[inline]
  #[must_use]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::RGB => 3,
      Self::RGBA => 4,
    }
  }

  /// Bytes per pixel, at the one bit depth we support.
  #[inline]
  #[must_use]
  pub const fn bytes_per_pixel(self) -> usize {
    self.channel_count()
  }
}
impl TryFrom<u8> for PngColorType {
  type Error = PngError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      2 => PngColorType::RGB,
      6 => PngColorType::RGBA,
      _ => return Err(PngError::UnsupportedColorType(value)),
    })
  }
}

/// Image Header
///
/// Parsing this only succeeds for the subset of PNG this crate handles, so
/// the methods are all implied to be 0 and the bit depth to be 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IHDR {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// pixel color type
  pub color_type: PngColorType,
}
impl IHDR {
  /// The only bit depth supported.
  pub const BIT_DEPTH: u8 = 8;

  /// Parses the 13 bytes of `IHDR` chunk data.
  ///
  /// ## Failure
  /// * Data that isn't 13 bytes.
  /// * A width or height of 0.
  /// * Any field outside of the supported subset, each with its own error.
  pub fn try_from_chunk_data(data: &[u8]) -> PngResult<Self> {
    match *data {
      [w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =>
      {
        let width = u32::from_be_bytes([w0, w1, w2, w3]);
        let height = u32::from_be_bytes([h0, h1, h2, h3]);
        if width == 0 || height == 0 {
          return Err(PngError::ZeroDimension);
        }
        if bit_depth != Self::BIT_DEPTH {
          return Err(PngError::UnsupportedBitDepth(bit_depth));
        }
        let color_type = PngColorType::try_from(color_type)?;
        if compression_method != 0 {
          return Err(PngError::UnsupportedCompression(compression_method));
        }
        if filter_method != 0 {
          return Err(PngError::UnsupportedFilter(filter_method));
        }
        if interlace_method != 0 {
          return Err(PngError::UnsupportedInterlace(interlace_method));
        }
        let out = Self { width, height, color_type };
        // catch overflowing dimensions here, rather than partway through
        // decoding.
        out.image_size()?.filtered_len()?;
        Ok(out)
      }
      _ => Err(PngError::BadIhdrLength(data.len())),
    }
  }

  /// The 13 bytes of `IHDR` chunk data for this header.
  #[inline]
  #[must_use]
  pub fn to_chunk_data(&self) -> [u8; 13] {
    let mut out = [0_u8; 13];
    out[0..4].copy_from_slice(&self.width.to_be_bytes());
    out[4..8].copy_from_slice(&self.height.to_be_bytes());
    out[8] = Self::BIT_DEPTH;
    out[9] = self.color_type as u8;
    // compression, filter, and interlace are all 0.
    out
  }

  /// Gets the byte layout of the image.
  pub fn image_size(&self) -> PngResult<ImageSize> {
    let bytes_per_pixel = self.color_type.bytes_per_pixel();
    let stride =
      (self.width as usize).checked_mul(bytes_per_pixel).ok_or(PngError::DimensionsTooLarge)?;
    Ok(ImageSize { width: self.width, height: self.height, bytes_per_pixel, stride })
  }
}
impl TryFrom<&PngChunk> for IHDR {
  type Error = PngError;
  #[inline]
  fn try_from(chunk: &PngChunk) -> Result<Self, Self::Error> {
    Self::try_from_chunk_data(chunk.data())
  }
}

/// The byte layout of an image, derived from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageSize {
  /// width in pixels
  pub width: u32,
  /// height in pixels
  pub height: u32,
  /// bytes per pixel: 3 or 4
  pub bytes_per_pixel: usize,
  /// bytes per unfiltered row
  pub stride: usize,
}
impl ImageSize {
  /// Bytes of unfiltered pixel data: `height * stride`
  #[inline]
  pub fn unfiltered_len(&self) -> PngResult<usize> {
    (self.height as usize).checked_mul(self.stride).ok_or(PngError::DimensionsTooLarge)
  }

  /// Bytes of filtered data: each row has a filter byte in front.
  #[inline]
  pub fn filtered_len(&self) -> PngResult<usize> {
    self
      .stride
      .checked_add(1)
      .and_then(|line| line.checked_mul(self.height as usize))
      .ok_or(PngError::DimensionsTooLarge)
  }
}
