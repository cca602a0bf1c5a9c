use super::*;

/// A chunk borrowed from the PNG bytes.
///
/// These come out of a [`PngRawChunkIter`], which has already checked the CRC.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawPngChunk<'b> {
  pub(crate) chunk_type: ChunkType,
  pub(crate) data: &'b [u8],
  pub(crate) declared_crc: u32,
  pub(crate) offset: usize,
}
impl Debug for RawPngChunk<'_> {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("RawPngChunk")
      .field("chunk_type", &self.chunk_type)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("declared_crc", &self.declared_crc)
      .field("offset", &self.offset)
      .finish()
  }
}
impl<'b> RawPngChunk<'b> {
  /// The chunk's type.
  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> ChunkType {
    self.chunk_type
  }
  /// The chunk's data.
  #[inline]
  #[must_use]
  pub const fn data(&self) -> &'b [u8] {
    self.data
  }
  /// The CRC stored in the chunk.
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.declared_crc
  }
  /// Offset of the chunk's length field within the full PNG bytes.
  #[inline]
  #[must_use]
  pub const fn offset(&self) -> usize {
    self.offset
  }
}

/// Checks the 8 byte PNG signature and gives back the bytes after it.
///
/// ## Failure
/// * [`PngError::Truncated`] if the input is a proper prefix of the signature.
/// * [`PngError::NotPng`] otherwise, if the signature doesn't match.
pub fn strip_png_signature(bytes: &[u8]) -> PngResult<&[u8]> {
  match bytes.strip_prefix(&PNG_SIGNATURE[..]) {
    Some(rest) => Ok(rest),
    None if PNG_SIGNATURE.starts_with(bytes) => {
      Err(PngError::Truncated { offset: 0, needed: PNG_SIGNATURE.len(), available: bytes.len() })
    }
    None => Err(PngError::NotPng),
  }
}

/// An iterator that produces successive chunks from PNG bytes.
///
/// * Every chunk's CRC is checked, including chunks you'll end up ignoring.
/// * The first error ends the iteration.
/// * Iteration ends normally when the bytes run out exactly on a chunk
///   boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PngRawChunkIter<'b> {
  spare: &'b [u8],
  offset: usize,
}
impl<'b> PngRawChunkIter<'b> {
  /// Pass the full PNG bytes, the signature is checked and removed.
  pub fn new(bytes: &'b [u8]) -> PngResult<Self> {
    let spare = strip_png_signature(bytes)?;
    Ok(Self { spare, offset: PNG_SIGNATURE.len() })
  }

  /// Offset of the next unread byte within the full PNG bytes.
  #[inline]
  #[must_use]
  pub const fn offset(&self) -> usize {
    self.offset
  }

  fn parse_next(&self) -> PngResult<(RawPngChunk<'b>, &'b [u8])> {
    let start = self.offset;
    let (length, rest) = try_pull_u32_be(self.spare, start)?;
    let (type_bytes, rest) = try_pull_byte_array::<4>(rest, start + 4)?;
    let chunk_type = ChunkType::from(type_bytes);
    let (data, rest) = try_pull_slice(rest, length as usize, start + 8)?;
    let data_end = start + 8 + data.len();
    let (declared_crc, rest) = try_pull_u32_be(rest, data_end)?;
    let actual = chunk_crc(type_bytes, data);
    if actual != declared_crc {
      return Err(PngError::CrcMismatch { chunk_type, offset: start, declared: declared_crc, actual });
    }
    Ok((RawPngChunk { chunk_type, data, declared_crc, offset: start }, rest))
  }
}
impl<'b> Iterator for PngRawChunkIter<'b> {
  type Item = PngResult<RawPngChunk<'b>>;
  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if self.spare.is_empty() {
      return None;
    }
    match self.parse_next() {
      Ok((chunk, rest)) => {
        trace!("{} chunk: {} bytes at offset {}", chunk.chunk_type, chunk.data.len(), chunk.offset);
        self.offset += CHUNK_OVERHEAD + chunk.data.len();
        self.spare = rest;
        Some(Ok(chunk))
      }
      Err(e) => {
        self.spare = &[];
        Some(Err(e))
      }
    }
  }
}
impl core::iter::FusedIterator for PngRawChunkIter<'_> {}
