//! The zlib stage, using `miniz_oxide`.

use miniz_oxide::{
  deflate::core::{compress, create_comp_flags_from_zip_params, CompressorOxide, TDEFLFlush, TDEFLStatus},
  inflate::{decompress_slice_iter_to_slice, TINFLStatus},
};

use super::*;

/// Decompresses a zlib stream split over any number of slices.
///
/// The output must be exactly `expected` bytes. Decompression stops once the
/// output is full, so a stream that would produce more is reported without
/// ever decompressing the excess.
pub fn inflate_exact<'a>(
  expected: usize, compressed: impl Iterator<Item = &'a [u8]>,
) -> PngResult<Vec<u8>> {
  let mut out = try_zeroed_vec(expected)?;
  match decompress_slice_iter_to_slice(&mut out, compressed, true, false) {
    Ok(actual) if actual == expected => Ok(out),
    Ok(actual) => Err(PngError::SizeMismatch { expected, actual: Some(actual) }),
    Err(TINFLStatus::HasMoreOutput) => Err(PngError::SizeMismatch { expected, actual: None }),
    Err(status) => Err(PngError::InflateFailure(status)),
  }
}

/// Compresses bytes into a zlib stream.
///
/// `level` is the usual 0 to 10 compression level.
pub fn deflate(input: &[u8], level: u8) -> PngResult<Vec<u8>> {
  let flags = create_comp_flags_from_zip_params(i32::from(level.min(10)), 1, 0);
  let mut compressor = CompressorOxide::new(flags);
  let mut output = vec![0_u8; (input.len() / 2).max(64)];
  let mut in_pos = 0;
  let mut out_pos = 0;
  loop {
    let (status, bytes_in, bytes_out) =
      compress(&mut compressor, &input[in_pos..], &mut output[out_pos..], TDEFLFlush::Finish);
    in_pos += bytes_in;
    out_pos += bytes_out;
    match status {
      TDEFLStatus::Done => {
        output.truncate(out_pos);
        return Ok(output);
      }
      TDEFLStatus::Okay => {
        // the output ran out of room, so make more.
        if output.len().saturating_sub(out_pos) < 32 {
          output.resize(output.len() * 2, 0);
        }
      }
      other => return Err(PngError::DeflateFailure(other)),
    }
  }
}
