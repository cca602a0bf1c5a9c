use miniz_oxide::{deflate::core::TDEFLStatus, inflate::TINFLStatus};
use thiserror::Error;

use crate::png::ChunkType;

/// Shorthand for a result with a [`PngError`].
pub type PngResult<T> = Result<T, PngError>;

/// An error from decoding or encoding PNG data.
///
/// Every error is fatal: nothing is retried, and no partial image is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PngError {
  /// The leading 8 bytes are not the PNG signature.
  #[error("the data does not start with the PNG signature")]
  NotPng,

  /// A read ran past the end of the input.
  #[error("truncated input: needed {needed} bytes at offset {offset}, only {available} remain")]
  Truncated {
    /// Where the read started.
    offset: usize,
    /// How many bytes the read wanted.
    needed: usize,
    /// How many bytes were left.
    available: usize,
  },

  /// A chunk's declared CRC doesn't match the CRC of its type and data.
  #[error("CRC mismatch in {chunk_type} chunk at offset {offset}: declared {declared:#010X}, actual {actual:#010X}")]
  CrcMismatch {
    /// The type of the damaged chunk.
    chunk_type: ChunkType,
    /// Offset of the chunk's length field.
    offset: usize,
    /// The CRC stored in the data stream.
    declared: u32,
    /// The CRC computed over the chunk's type and data.
    actual: u32,
  },

  /// No `IHDR` chunk was found.
  #[error("no IHDR chunk")]
  MissingIhdr,

  /// No `IDAT` chunk was found.
  #[error("no IDAT chunk")]
  MissingIdat,

  /// The chunk stream ended without an `IEND` chunk.
  #[error("no IEND chunk")]
  MissingIend,

  /// A second `IHDR` chunk was found.
  #[error("second IHDR chunk at offset {offset}")]
  DuplicateIhdr {
    /// Offset of the second `IHDR`'s length field.
    offset: usize,
  },

  /// The `IHDR` chunk came after an `IDAT` chunk.
  #[error("IHDR chunk at offset {offset} follows image data")]
  IhdrAfterIdat {
    /// Offset of the `IHDR`'s length field.
    offset: usize,
  },

  /// The `IHDR` data isn't exactly 13 bytes.
  #[error("IHDR data is {0} bytes, expected 13")]
  BadIhdrLength(usize),

  /// The declared width or height is 0.
  #[error("image width or height is zero")]
  ZeroDimension,

  /// A buffer size computed from the image dimensions overflowed, or a buffer
  /// of that size couldn't be allocated.
  #[error("image dimensions are too large")]
  DimensionsTooLarge,

  /// Chunk data can be at most `2^31 - 1` bytes.
  #[error("chunk data is {0} bytes, the limit is 2^31-1")]
  ChunkTooLong(usize),

  /// Only a bit depth of 8 is supported.
  #[error("unsupported bit depth: {0}")]
  UnsupportedBitDepth(u8),

  /// Only color types 2 (RGB) and 6 (RGBA) are supported.
  #[error("unsupported color type: {0}")]
  UnsupportedColorType(u8),

  /// Only compression method 0 (zlib) exists.
  #[error("unsupported compression method: {0}")]
  UnsupportedCompression(u8),

  /// Only filter method 0 (adaptive) exists.
  #[error("unsupported filter method: {0}")]
  UnsupportedFilter(u8),

  /// Interlaced images are not supported.
  #[error("unsupported interlace method: {0}")]
  UnsupportedInterlace(u8),

  /// A scanline's filter byte isn't one of the five filter types.
  #[error("unsupported filter type {filter_type} on row {row}")]
  UnsupportedFilterType {
    /// The row that holds the bad filter byte.
    row: usize,
    /// The filter byte.
    filter_type: u8,
  },

  /// A buffer isn't the size that the image dimensions call for.
  ///
  /// When `actual` is `None` the data was longer than expected.
  #[error("size mismatch: expected {expected} bytes, got {actual:?}")]
  SizeMismatch {
    /// The size the image dimensions call for.
    expected: usize,
    /// The size found, if it could be determined.
    actual: Option<usize>,
  },

  /// The zlib decompressor rejected the image data.
  #[error("inflate failed: {0:?}")]
  InflateFailure(TINFLStatus),

  /// The zlib compressor reported a failure.
  #[error("deflate failed: {0:?}")]
  DeflateFailure(TDEFLStatus),
}
