use super::*;

/// How the encoder picks each row's filter type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterStrategy {
  /// Every row uses filter type 0.
  ///
  /// This compresses worse, but it's simple and deterministic.
  #[default]
  NoFilter,
  /// Each row uses whichever filter type gives the smallest sum of absolute
  /// differences, taking the filtered bytes as signed values. Ties go to the
  /// lower filter type.
  MinSumAbs,
}

/// Settings for [`encode_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
  pub(crate) filter_strategy: FilterStrategy,
  pub(crate) compression_level: u8,
  pub(crate) max_idat_len: u32,
}
impl Default for EncodeOptions {
  #[inline]
  #[must_use]
  fn default() -> Self {
    Self {
      filter_strategy: FilterStrategy::NoFilter,
      compression_level: Self::DEFAULT_COMPRESSION_LEVEL,
      max_idat_len: Self::DEFAULT_MAX_IDAT_LEN,
    }
  }
}
impl EncodeOptions {
  /// The zlib default level.
  pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

  /// PNG allows far bigger `IDAT` chunks than this, but some decoders are
  /// only tested against chunks that fit in 16 bits.
  pub const DEFAULT_MAX_IDAT_LEN: u32 = u16::MAX as u32;

  /// Sets the row filter strategy.
  #[inline]
  #[must_use]
  pub const fn with_filter_strategy(mut self, filter_strategy: FilterStrategy) -> Self {
    self.filter_strategy = filter_strategy;
    self
  }

  /// Sets the compression level, clamped to `0..=10`.
  #[inline]
  #[must_use]
  pub const fn with_compression_level(mut self, level: u8) -> Self {
    self.compression_level = if level > 10 { 10 } else { level };
    self
  }

  /// Sets the largest `IDAT` payload, clamped to `1..=2^31-1`.
  #[inline]
  #[must_use]
  pub const fn with_max_idat_len(mut self, max_idat_len: u32) -> Self {
    self.max_idat_len = if max_idat_len == 0 {
      1
    } else if max_idat_len > MAX_CHUNK_LEN {
      MAX_CHUNK_LEN
    } else {
      max_idat_len
    };
    self
  }

  /// The row filter strategy.
  #[inline]
  #[must_use]
  pub const fn filter_strategy(&self) -> FilterStrategy {
    self.filter_strategy
  }

  /// The compression level.
  #[inline]
  #[must_use]
  pub const fn compression_level(&self) -> u8 {
    self.compression_level
  }

  /// The largest `IDAT` payload.
  #[inline]
  #[must_use]
  pub const fn max_idat_len(&self) -> u32 {
    self.max_idat_len
  }
}
