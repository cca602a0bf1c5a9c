use crate::{PngError, PngResult};

/// Splits `N` bytes off the front of `bytes`.
///
/// `offset` is only used for error reporting: it's where `bytes` begins within
/// the full input.
#[inline]
pub(crate) fn try_pull_byte_array<const N: usize>(
  bytes: &[u8], offset: usize,
) -> PngResult<([u8; N], &[u8])> {
  let (head, tail) = try_pull_slice(bytes, N, offset)?;
  let mut a = [0_u8; N];
  a.copy_from_slice(head);
  Ok((a, tail))
}

/// Splits `count` bytes off the front of `bytes`.
#[inline]
pub(crate) fn try_pull_slice(bytes: &[u8], count: usize, offset: usize) -> PngResult<(&[u8], &[u8])> {
  if bytes.len() >= count {
    Ok(bytes.split_at(count))
  } else {
    Err(PngError::Truncated { offset, needed: count, available: bytes.len() })
  }
}

#[inline]
pub(crate) fn try_pull_u32_be(bytes: &[u8], offset: usize) -> PngResult<(u32, &[u8])> {
  let (a, tail) = try_pull_byte_array::<4>(bytes, offset)?;
  Ok((u32::from_be_bytes(a), tail))
}

#[test]
fn test_pull_helpers() {
  let bytes = [0, 0, 1, 2, 9];
  let (u, rest) = try_pull_u32_be(&bytes, 0).unwrap();
  assert_eq!(u, 258);
  assert_eq!(rest, &[9]);
  assert_eq!(
    try_pull_u32_be(rest, 4),
    Err(PngError::Truncated { offset: 4, needed: 4, available: 1 })
  );
  let (head, tail) = try_pull_slice(&bytes, 5, 0).unwrap();
  assert_eq!(head.len(), 5);
  assert!(tail.is_empty());
}
