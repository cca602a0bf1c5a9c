use super::*;

/// The four byte type tag of a PNG chunk.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub AsciiArray<4>);
#[allow(nonstandard_style)]
impl ChunkType {
  /// Image Header
  pub const IHDR: Self = Self(AsciiArray(*b"IHDR"));
  /// Image Data
  pub const IDAT: Self = Self(AsciiArray(*b"IDAT"));
  /// Image End
  pub const IEND: Self = Self(AsciiArray(*b"IEND"));

  /// Gets the raw type bytes.
  #[inline]
  #[must_use]
  pub const fn to_bytes(self) -> [u8; 4] {
    *self.0.as_bytes()
  }

  /// If bit 5 of the first byte is clear the chunk is critical.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0 .0[0] & 32) == 0
  }
}
impl From<[u8; 4]> for ChunkType {
  #[inline]
  #[must_use]
  fn from(bytes: [u8; 4]) -> Self {
    Self(AsciiArray(bytes))
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    Debug::fmt(&self.0, f)
  }
}
impl core::fmt::Display for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    core::fmt::Display::fmt(&self.0, f)
  }
}

/// An owned PNG chunk.
///
/// The length field isn't stored, it's always the length of the data. The CRC
/// is stored as declared, and [`write_to`](Self::write_to) emits it as-is.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PngChunk {
  chunk_type: ChunkType,
  data: Vec<u8>,
  crc: u32,
}
impl Debug for PngChunk {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("PngChunk")
      .field("chunk_type", &self.chunk_type)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("crc", &self.crc)
      .finish()
  }
}
impl PngChunk {
  /// Makes a chunk with a freshly computed CRC.
  ///
  /// ## Failure
  /// * If the data is longer than PNG allows (`2^31 - 1` bytes).
  pub fn new(chunk_type: ChunkType, data: Vec<u8>) -> PngResult<Self> {
    let crc = chunk_crc(chunk_type.to_bytes(), &data);
    Self::from_parts(chunk_type, data, crc)
  }

  /// Makes a chunk with whatever CRC you say.
  ///
  /// Nothing checks the CRC, so you can use this to build a damaged chunk.
  ///
  /// ## Failure
  /// * If the data is longer than PNG allows (`2^31 - 1` bytes).
  #[inline]
  pub fn from_parts(chunk_type: ChunkType, data: Vec<u8>, crc: u32) -> PngResult<Self> {
    if data.len() > MAX_CHUNK_LEN as usize {
      return Err(PngError::ChunkTooLong(data.len()));
    }
    Ok(Self { chunk_type, data, crc })
  }

  /// The chunk's type.
  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> ChunkType {
    self.chunk_type
  }

  /// The chunk's data.
  #[inline]
  #[must_use]
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  /// The length field that this chunk will write.
  #[inline]
  #[must_use]
  pub fn length(&self) -> u32 {
    // `from_parts` enforces the limit, and the parser can't produce longer data
    // than its u32 length field.
    self.data.len() as u32
  }

  /// The CRC that this chunk declares.
  #[inline]
  #[must_use]
  pub const fn declared_crc(&self) -> u32 {
    self.crc
  }

  /// Computes the CRC that this chunk *should* declare.
  #[inline]
  #[must_use]
  pub fn compute_actual_crc(&self) -> u32 {
    chunk_crc(self.chunk_type.to_bytes(), &self.data)
  }

  /// The number of bytes that [`write_to`](Self::write_to) will append.
  #[inline]
  #[must_use]
  pub fn encoded_len(&self) -> usize {
    CHUNK_OVERHEAD + self.data.len()
  }

  /// Appends the framed chunk: length, type, data, CRC.
  ///
  /// The declared CRC is written without being recomputed.
  pub fn write_to(&self, out: &mut Vec<u8>) {
    out.reserve(self.encoded_len());
    out.extend_from_slice(&self.length().to_be_bytes());
    out.extend_from_slice(&self.chunk_type.to_bytes());
    out.extend_from_slice(&self.data);
    out.extend_from_slice(&self.crc.to_be_bytes());
  }

  /// The framed chunk as a new vec.
  #[inline]
  #[must_use]
  pub fn to_bytes(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(self.encoded_len());
    self.write_to(&mut out);
    out
  }
}
impl From<RawPngChunk<'_>> for PngChunk {
  #[inline]
  #[must_use]
  fn from(raw: RawPngChunk<'_>) -> Self {
    Self { chunk_type: raw.chunk_type(), data: raw.data().to_vec(), crc: raw.declared_crc() }
  }
}
