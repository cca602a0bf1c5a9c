#![forbid(unsafe_code)]

//! Module for working with PNG data.
//!
//! * [Portable Network Graphics Specification (Second Edition)][png-spec]
//!
//! [png-spec]: https://www.w3.org/TR/2003/REC-PNG-20031110/
//!
//! ## Supported Images
//!
//! Only 8-bit truecolor images (color type 2, RGB, or color type 6, RGBA)
//! without interlacing can be decoded. Anything else is an error as soon as
//! the `IHDR` is read. Ancillary chunks are read (and their CRC is checked),
//! but otherwise ignored, and they're not written back out when encoding.
//!
//! ## Decoding
//!
//! Call [`decode`] with the full PNG bytes. You get back a [`Png`] which holds
//! the three kinds of critical chunk it found, along with the unfiltered pixel
//! data: `height` rows of `stride` bytes each, top to bottom, channels in
//! R, G, B (and A) order.
//!
//! The steps are:
//! 1) Check the 8 byte PNG signature.
//! 2) Iterate the chunks (with [`PngRawChunkIter`]), which checks each CRC,
//!    and keep the `IHDR`, all of the `IDAT`, and the `IEND`. Bytes after the
//!    `IEND` are ignored.
//! 3) Parse the [`IHDR`] into an [`ImageSize`].
//! 4) Decompress all of the `IDAT` payloads as a single zlib stream. This
//!    gives `height * (stride + 1)` bytes of filtered data.
//! 5) [`unfilter`] that into the final pixel data.
//!
//! ## Encoding
//!
//! Call [`encode`] (or [`encode_with`] to pick [`EncodeOptions`]) and you get
//! back PNG bytes: the signature, the `IHDR` as it was, freshly compressed
//! `IDAT` chunks, and the `IEND` as it was. By default every row is written
//! with filter type 0 and the compressed data is split into `IDAT` chunks of
//! at most 65535 bytes.
//!
//! ## Intermediate Data
//!
//! If you want to look at the data between stages, [`decode_with`] and
//! [`encode_with`] take an `on_intermediate(name, bytes)` callback:
//! * decoding reports `"decompressed_data"` then `"unfiltered_data"`.
//! * encoding reports `"filtered_data"` then `"compressed_data"`.

use core::fmt::Debug;

use alloc::{vec, vec::Vec};
use log::{debug, trace};

use crate::{
  pixel_formats::{RGB8, RGBA8},
  AsciiArray, PngError, PngResult,
};
use crate::{try_pull_byte_array, try_pull_slice, try_pull_u32_be};

mod crc32;
pub use crc32::*;

mod chunk;
pub use chunk::*;

mod raw_chunk;
pub use raw_chunk::*;

mod ihdr;
pub use ihdr::*;

mod filtering;
pub use filtering::*;

mod zlib;
pub use zlib::*;

mod options;
pub use options::*;


/// The first eight bytes of a PNG datastream should match these bytes.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Length, type, and CRC: the bytes of a chunk other than its data.
pub const CHUNK_OVERHEAD: usize = 12;

/// The largest chunk data length PNG allows.
pub const MAX_CHUNK_LEN: u32 = i32::MAX as u32;

/// Names for the [`decode_with`] and [`encode_with`] callbacks.
pub mod stage {
  /// The decompressed `IDAT` data, still filtered.
  pub const DECOMPRESSED_DATA: &str = "decompressed_data";
  /// The final pixel data from decoding.
  pub const UNFILTERED_DATA: &str = "unfiltered_data";
  /// The pixel data after filtering, before compression.
  pub const FILTERED_DATA: &str = "filtered_data";
  /// The zlib stream that's about to be split into `IDAT` chunks.
  pub const COMPRESSED_DATA: &str = "compressed_data";
}

/// A decoded PNG.
///
/// This holds the critical chunks as they were found, plus the unfiltered
/// pixel data. The pixel data is always `height * stride` bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Png {
  ihdr: PngChunk,
  idat: Vec<PngChunk>,
  iend: PngChunk,
  header: IHDR,
  image_size: ImageSize,
  image_data: Vec<u8>,
}
impl Debug for Png {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Png")
      .field("header", &self.header)
      .field("idat_count", &self.idat.len())
      .field("image_size", &self.image_size)
      .field("image_data", &(&self.image_data[..self.image_data.len().min(12)], self.image_data.len()))
      .finish()
  }
}
impl Png {
  /// Makes a new image from pixel data.
  ///
  /// The `IHDR` is built for the given size and color type, and the `IEND` is
  /// empty. There's no `IDAT` until the image is encoded.
  ///
  /// ## Failure
  /// * A width or height of 0.
  /// * Pixel data that isn't `height * stride` bytes.
  pub fn new(
    width: u32, height: u32, color_type: PngColorType, image_data: Vec<u8>,
  ) -> PngResult<Self> {
    let header = IHDR { width, height, color_type };
    // run the bytes back through the parser so that the same checks apply.
    let header = IHDR::try_from_chunk_data(&header.to_chunk_data())?;
    let ihdr = PngChunk::new(ChunkType::IHDR, header.to_chunk_data().to_vec())?;
    let iend = PngChunk::new(ChunkType::IEND, Vec::new())?;
    let image_size = header.image_size()?;
    check_image_data_len(image_size, &image_data)?;
    Ok(Self { ihdr, idat: Vec::new(), iend, header, image_size, image_data })
  }

  /// Swaps in new pixel data of the same size, keeping everything else.
  ///
  /// ## Failure
  /// * Pixel data that isn't `height * stride` bytes.
  pub fn with_image_data(self, image_data: Vec<u8>) -> PngResult<Self> {
    check_image_data_len(self.image_size, &image_data)?;
    Ok(Self { image_data, ..self })
  }

  /// The `IHDR` chunk.
  #[inline]
  #[must_use]
  pub const fn ihdr(&self) -> &PngChunk {
    &self.ihdr
  }

  /// The `IDAT` chunks, in order.
  ///
  /// For a decoded image these are the chunks that were decoded. For a new
  /// image this is empty.
  #[inline]
  #[must_use]
  pub fn idat(&self) -> &[PngChunk] {
    &self.idat
  }

  /// The `IEND` chunk.
  #[inline]
  #[must_use]
  pub const fn iend(&self) -> &PngChunk {
    &self.iend
  }

  /// The parsed `IHDR`.
  #[inline]
  #[must_use]
  pub const fn header(&self) -> IHDR {
    self.header
  }

  /// The byte layout of the pixel data.
  #[inline]
  #[must_use]
  pub const fn image_size(&self) -> ImageSize {
    self.image_size
  }

  /// The unfiltered pixel data.
  #[inline]
  #[must_use]
  pub fn image_data(&self) -> &[u8] {
    &self.image_data
  }

  /// Takes the pixel data out.
  #[inline]
  #[must_use]
  pub fn into_image_data(self) -> Vec<u8> {
    self.image_data
  }

  /// The channel bytes of one pixel, or `None` if out of bounds.
  #[must_use]
  pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
    if x >= self.image_size.width || y >= self.image_size.height {
      return None;
    }
    let bpp = self.image_size.bytes_per_pixel;
    let start = (y as usize) * self.image_size.stride + (x as usize) * bpp;
    self.image_data.get(start..start + bpp)
  }

  /// One pixel as RGBA, whatever the color type. RGB pixels are fully opaque.
  #[must_use]
  pub fn rgba8_pixel(&self, x: u32, y: u32) -> Option<RGBA8> {
    let channels = self.pixel(x, y)?;
    match self.header.color_type {
      PngColorType::RGB => bytemuck::try_from_bytes::<RGB8>(channels).ok().map(|&p| RGBA8::from(p)),
      PngColorType::RGBA => bytemuck::try_from_bytes::<RGBA8>(channels).ok().copied(),
    }
  }

  /// The pixel data as RGB pixels, if that's the image's color type.
  #[inline]
  #[must_use]
  pub fn rgb8_pixels(&self) -> Option<&[RGB8]> {
    match self.header.color_type {
      PngColorType::RGB => bytemuck::try_cast_slice(&self.image_data).ok(),
      PngColorType::RGBA => None,
    }
  }

  /// The pixel data as RGBA pixels, if that's the image's color type.
  #[inline]
  #[must_use]
  pub fn rgba8_pixels(&self) -> Option<&[RGBA8]> {
    match self.header.color_type {
      PngColorType::RGBA => bytemuck::try_cast_slice(&self.image_data).ok(),
      PngColorType::RGB => None,
    }
  }
}

/// A zeroed buffer, with allocation failure as an error rather than an abort.
///
/// Sizes come from the header, which a hostile file can make as big as it
/// likes.
pub(crate) fn try_zeroed_vec(len: usize) -> PngResult<Vec<u8>> {
  let mut buffer: Vec<u8> = Vec::new();
  buffer.try_reserve_exact(len).map_err(|_| PngError::DimensionsTooLarge)?;
  buffer.resize(len, 0);
  Ok(buffer)
}

fn check_image_data_len(image_size: ImageSize, image_data: &[u8]) -> PngResult<()> {
  let expected = image_size.unfiltered_len()?;
  if image_data.len() == expected {
    Ok(())
  } else {
    Err(PngError::SizeMismatch { expected, actual: Some(image_data.len()) })
  }
}

/// Decodes PNG bytes.
///
/// See the [module docs](self) for the steps and [`PngError`] for what can go
/// wrong.
#[inline]
pub fn decode(bytes: &[u8]) -> PngResult<Png> {
  decode_with(bytes, |_, _| ())
}

/// Decodes PNG bytes, passing each intermediate buffer to `on_intermediate`.
pub fn decode_with<F>(bytes: &[u8], mut on_intermediate: F) -> PngResult<Png>
where
  F: FnMut(&str, &[u8]),
{
  let mut ihdr: Option<PngChunk> = None;
  let mut idat: Vec<PngChunk> = Vec::new();
  let mut iend: Option<PngChunk> = None;
  for raw_chunk in PngRawChunkIter::new(bytes)? {
    let raw_chunk = raw_chunk?;
    match raw_chunk.chunk_type() {
      ChunkType::IHDR => {
        if ihdr.is_some() {
          return Err(PngError::DuplicateIhdr { offset: raw_chunk.offset() });
        }
        if !idat.is_empty() {
          return Err(PngError::IhdrAfterIdat { offset: raw_chunk.offset() });
        }
        ihdr = Some(PngChunk::from(raw_chunk));
      }
      ChunkType::IDAT => idat.push(PngChunk::from(raw_chunk)),
      ChunkType::IEND => {
        iend = Some(PngChunk::from(raw_chunk));
        break;
      }
      other if other.is_critical() => {
        trace!("skipping unknown critical {} chunk at offset {}", other, raw_chunk.offset())
      }
      other => trace!("skipping {} chunk at offset {}", other, raw_chunk.offset()),
    }
  }
  let ihdr = ihdr.ok_or(PngError::MissingIhdr)?;
  if idat.is_empty() {
    return Err(PngError::MissingIdat);
  }
  let iend = iend.ok_or(PngError::MissingIend)?;

  let header = IHDR::try_from(&ihdr)?;
  let image_size = header.image_size()?;
  debug!("decoding {:?} from {} IDAT chunks", image_size, idat.len());

  let decompressed = inflate_exact(image_size.filtered_len()?, idat.iter().map(PngChunk::data))?;
  on_intermediate(stage::DECOMPRESSED_DATA, &decompressed);
  let image_data = unfilter(&decompressed, image_size)?;
  drop(decompressed);
  on_intermediate(stage::UNFILTERED_DATA, &image_data);

  Ok(Png { ihdr, idat, iend, header, image_size, image_data })
}

/// Encodes a PNG with the default [`EncodeOptions`].
#[inline]
pub fn encode(png: &Png) -> PngResult<Vec<u8>> {
  encode_with(png, &EncodeOptions::default(), |_, _| ())
}

/// Encodes a PNG, passing each intermediate buffer to `on_intermediate`.
///
/// The `IHDR` and `IEND` chunks are written exactly as they are in the `png`.
/// The `IDAT` chunks are always rebuilt from the pixel data.
pub fn encode_with<F>(png: &Png, options: &EncodeOptions, mut on_intermediate: F) -> PngResult<Vec<u8>>
where
  F: FnMut(&str, &[u8]),
{
  let filtered = filter(&png.image_data, png.image_size, options.filter_strategy)?;
  on_intermediate(stage::FILTERED_DATA, &filtered);
  let compressed = deflate(&filtered, options.compression_level)?;
  drop(filtered);
  on_intermediate(stage::COMPRESSED_DATA, &compressed);

  let idat = split_into_idat(&compressed, options.max_idat_len)?;
  debug!("encoded {} compressed bytes as {} IDAT chunks", compressed.len(), idat.len());

  let total = PNG_SIGNATURE.len()
    + png.ihdr.encoded_len()
    + idat.iter().map(PngChunk::encoded_len).sum::<usize>()
    + png.iend.encoded_len();
  let mut out: Vec<u8> = Vec::with_capacity(total);
  out.extend_from_slice(&PNG_SIGNATURE);
  png.ihdr.write_to(&mut out);
  for chunk in idat.iter() {
    chunk.write_to(&mut out);
  }
  png.iend.write_to(&mut out);
  Ok(out)
}

/// Splits a zlib stream into `IDAT` chunks of at most `max_idat_len` bytes.
///
/// An empty stream still gets one (empty) `IDAT`.
pub fn split_into_idat(compressed: &[u8], max_idat_len: u32) -> PngResult<Vec<PngChunk>> {
  let max_idat_len = max_idat_len.clamp(1, MAX_CHUNK_LEN) as usize;
  if compressed.is_empty() {
    return Ok(vec![PngChunk::new(ChunkType::IDAT, Vec::new())?]);
  }
  compressed
    .chunks(max_idat_len)
    .map(|segment| PngChunk::new(ChunkType::IDAT, segment.to_vec()))
    .collect()
}
