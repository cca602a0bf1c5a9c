//! From the PNG spec:
//!
//! > Filters are applied to **bytes**, not to pixels, regardless of the bit
//! > depth or color type of the image.
//!
//! Each scanline of filtered data is a filter type byte followed by `stride`
//! filtered bytes. Filtering byte `x` can refer to three neighbors, which are
//! always the *unfiltered* values:
//!
//! ```text
//! c b
//! a x
//! ```
//!
//! * `a`: the byte one pixel to the left of `x`.
//! * `b`: the byte directly above `x`.
//! * `c`: the byte one pixel to the left of `b`.
//!
//! Any neighbor that would be outside the image counts as 0. All arithmetic is
//! on unsigned bytes, modulo 256.

use super::*;

/// The five scanline filter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FilterType {
  /// `x`
  None = 0,
  /// `x - a`
  Sub = 1,
  /// `x - b`
  Up = 2,
  /// `x - floor((a + b) / 2)`
  Average = 3,
  /// `x - paeth_predict(a, b, c)`
  Paeth = 4,
}
impl FilterType {
  /// All filter types, in filter byte order.
  pub const ALL: [Self; 5] = [Self::None, Self::Sub, Self::Up, Self::Average, Self::Paeth];
}
impl TryFrom<u8> for FilterType {
  type Error = u8;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::None,
      1 => Self::Sub,
      2 => Self::Up,
      3 => Self::Average,
      4 => Self::Paeth,
      other => return Err(other),
    })
  }
}

/// The Paeth filter function computes a simple linear function of the three
/// neighboring bytes (left `a`, above `b`, upper left `c`).
///
/// The output is whichever neighbor is closest to the computed value, with
/// ties going to `a` and then to `b`.
#[inline]
#[must_use]
pub const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  // Note: the PNG spec says "The calculations within the PaethPredictor
  // function shall be performed exactly, without overflow.", so this is done
  // in i32, which can't overflow for any u8 inputs.
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The order of these tests must not change.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// `floor((a + b) / 2)` without wrapping.
#[inline]
#[must_use]
const fn average(a: u8, b: u8) -> u8 {
  ((a as u16 + b as u16) / 2) as u8
}

/// The neighbors of byte `j` as `(a, b, c)`.
///
/// `cur` is the unfiltered row so far (at least `j` bytes of it are
/// meaningful), and `prev` is the unfiltered row above, or empty on the first
/// row.
#[inline]
#[must_use]
fn neighbors(cur: &[u8], prev: &[u8], j: usize, bytes_per_pixel: usize) -> (u8, u8, u8) {
  let a = if j >= bytes_per_pixel { cur[j - bytes_per_pixel] } else { 0 };
  let b = prev.get(j).copied().unwrap_or(0);
  let c = if j >= bytes_per_pixel { prev.get(j - bytes_per_pixel).copied().unwrap_or(0) } else { 0 };
  (a, b, c)
}

/// The value a filter type predicts from the neighbors.
#[inline]
#[must_use]
const fn predict(filter_type: FilterType, a: u8, b: u8, c: u8) -> u8 {
  match filter_type {
    FilterType::None => 0,
    FilterType::Sub => a,
    FilterType::Up => b,
    FilterType::Average => average(a, b),
    FilterType::Paeth => paeth_predict(a, b, c),
  }
}

/// Reconstructs one row of pixel bytes into `out`.
///
/// `prev` is the already reconstructed row above, or empty for the first row.
/// The `a` and `c` neighbors are read back out of `out` and `prev`, so they're
/// always the reconstructed values.
///
/// The slices should all be the same length (or `prev` empty). If they aren't,
/// only the bytes that fit in both `filtered` and `out` are written, and a
/// missing `prev` byte counts as 0.
pub fn reconstruct_row(
  filter_type: FilterType, filtered: &[u8], prev: &[u8], out: &mut [u8], bytes_per_pixel: usize,
) {
  let len = filtered.len().min(out.len());
  match filter_type {
    FilterType::None => out[..len].copy_from_slice(&filtered[..len]),
    FilterType::Up if prev.is_empty() => out[..len].copy_from_slice(&filtered[..len]),
    _ => {
      for (j, x) in filtered[..len].iter().copied().enumerate() {
        let (a, b, c) = neighbors(out, prev, j, bytes_per_pixel);
        out[j] = x.wrapping_add(predict(filter_type, a, b, c));
      }
    }
  }
}

/// Filters one row of pixel bytes into `out`.
///
/// This is the inverse of [`reconstruct_row`]: `row` and `prev` are both
/// unfiltered data. Mismatched lengths are handled the same way, only the
/// bytes that fit in both `row` and `out` are written.
pub fn filter_row(
  filter_type: FilterType, row: &[u8], prev: &[u8], out: &mut [u8], bytes_per_pixel: usize,
) {
  for (j, (o, x)) in out.iter_mut().zip(row.iter().copied()).enumerate() {
    let (a, b, c) = neighbors(row, prev, j, bytes_per_pixel);
    *o = x.wrapping_sub(predict(filter_type, a, b, c));
  }
}

/// Reverses the filtering of decompressed image data.
///
/// * `filtered` must be exactly `height * (stride + 1)` bytes.
/// * The output is `height * stride` bytes of row-major pixel data.
///
/// Rows are processed top to bottom. At the start of row `r` the output holds
/// all of rows `0..r` fully reconstructed, and row `r - 1` of the output serves
/// as the "previous row".
pub fn unfilter(filtered: &[u8], size: ImageSize) -> PngResult<Vec<u8>> {
  let expected = size.filtered_len()?;
  if filtered.len() != expected {
    return Err(PngError::SizeMismatch { expected, actual: Some(filtered.len()) });
  }
  let stride = size.stride;
  let mut unfiltered = try_zeroed_vec(size.unfiltered_len()?)?;
  if stride == 0 {
    return Ok(unfiltered);
  }
  for (row, filterline) in filtered.chunks_exact(stride + 1).enumerate() {
    let (&filter_byte, filtered_bytes) =
      filterline.split_first().ok_or(PngError::SizeMismatch { expected, actual: None })?;
    let filter_type = FilterType::try_from(filter_byte)
      .map_err(|filter_type| PngError::UnsupportedFilterType { row, filter_type })?;
    let (done, rest) = unfiltered.split_at_mut(row * stride);
    let prev: &[u8] = if row == 0 { &[] } else { &done[(row - 1) * stride..] };
    reconstruct_row(filter_type, filtered_bytes, prev, &mut rest[..stride], size.bytes_per_pixel);
  }
  Ok(unfiltered)
}

/// Sum of the filtered bytes taken as signed deltas.
#[inline]
#[must_use]
fn sum_of_abs_deltas(filtered: &[u8]) -> u64 {
  filtered.iter().map(|&x| u64::from((x as i8).unsigned_abs())).sum()
}

/// Filters pixel data so that it's ready for compression.
///
/// * `image_data` must be exactly `height * stride` bytes.
/// * The output is `height * (stride + 1)` bytes, each row led by its filter
///   type.
pub fn filter(image_data: &[u8], size: ImageSize, strategy: FilterStrategy) -> PngResult<Vec<u8>> {
  let expected = size.unfiltered_len()?;
  if image_data.len() != expected {
    return Err(PngError::SizeMismatch { expected, actual: Some(image_data.len()) });
  }
  let stride = size.stride;
  let mut out: Vec<u8> = Vec::with_capacity(size.filtered_len()?);
  if stride == 0 {
    out.resize(size.height as usize, FilterType::None as u8);
    return Ok(out);
  }
  match strategy {
    FilterStrategy::NoFilter => {
      for row in image_data.chunks_exact(stride) {
        out.push(FilterType::None as u8);
        out.extend_from_slice(row);
      }
    }
    FilterStrategy::MinSumAbs => {
      let mut best = vec![0_u8; stride];
      let mut scratch = vec![0_u8; stride];
      let mut prev: &[u8] = &[];
      for row in image_data.chunks_exact(stride) {
        let mut best_type = FilterType::None;
        best.copy_from_slice(row);
        let mut best_sum = sum_of_abs_deltas(&best);
        for filter_type in FilterType::ALL.into_iter().skip(1) {
          filter_row(filter_type, row, prev, &mut scratch, size.bytes_per_pixel);
          let sum = sum_of_abs_deltas(&scratch);
          if sum < best_sum {
            best_sum = sum;
            best_type = filter_type;
            core::mem::swap(&mut best, &mut scratch);
          }
        }
        out.push(best_type as u8);
        out.extend_from_slice(&best);
        prev = row;
      }
    }
  }
  Ok(out)
}

#[test]
fn test_paeth_predict() {
  assert_eq!(paeth_predict(0, 0, 0), 0);
  assert_eq!(paeth_predict(255, 0, 0), 255);
  // p=0, pa=10, pb=20, pc=30
  assert_eq!(paeth_predict(10, 20, 30), 10);
  // p=150, pa=50, pb=50, pc=100: the pa/pb tie goes to a
  assert_eq!(paeth_predict(100, 100, 50), 100);
  // p=3, pa=2, pb=1, pc=1: the pb/pc tie goes to b
  assert_eq!(paeth_predict(1, 4, 2), 4);
  // p=15, pa=5, pb=5, pc=0
  assert_eq!(paeth_predict(20, 10, 15), 15);
}

#[test]
fn test_average_is_unsigned() {
  assert_eq!(average(200, 200), 200);
  assert_eq!(average(255, 254), 254);
  assert_eq!(average(1, 0), 0);
}
