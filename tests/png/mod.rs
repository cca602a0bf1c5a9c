use haystack::{png::*, PngError};
use miniz_oxide::deflate::compress_to_vec_zlib;

fn chunk(ty: ChunkType, data: &[u8]) -> Vec<u8> {
  PngChunk::new(ty, data.to_vec()).unwrap().to_bytes()
}

fn ihdr_data(width: u32, height: u32, color_type: u8) -> Vec<u8> {
  let mut v = Vec::with_capacity(13);
  v.extend_from_slice(&width.to_be_bytes());
  v.extend_from_slice(&height.to_be_bytes());
  v.extend_from_slice(&[8, color_type, 0, 0, 0]);
  v
}

/// Assembles PNG bytes from whole chunks.
fn assemble(chunks: &[Vec<u8>]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  chunks.iter().for_each(|c| out.extend_from_slice(c));
  out
}

/// The 1x1 RGB image with the pixel `(0x80, 0x40, 0x20)`.
fn smallest_png() -> Vec<u8> {
  let filtered = [0, 0x80, 0x40, 0x20];
  assemble(&[
    chunk(ChunkType::IHDR, &ihdr_data(1, 1, 2)),
    chunk(ChunkType::IDAT, &compress_to_vec_zlib(&filtered, 6)),
    chunk(ChunkType::IEND, &[]),
  ])
}

/// Walks the framing of PNG bytes without checking anything, giving the
/// `(offset, type, data)` of each chunk.
fn frames(bytes: &[u8]) -> Vec<(usize, [u8; 4], &[u8])> {
  let mut out = Vec::new();
  let mut offset = PNG_SIGNATURE.len();
  while offset < bytes.len() {
    let len = u32::from_be_bytes(bytes[offset..offset + 4].try_into().unwrap()) as usize;
    let ty: [u8; 4] = bytes[offset + 4..offset + 8].try_into().unwrap();
    out.push((offset, ty, &bytes[offset + 8..offset + 8 + len]));
    offset += 12 + len;
  }
  out
}

#[test]
fn test_RawPngChunkIter_no_panics() {
  // totally random data should never panic the iterator or the decoder!
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    if let Ok(iter) = PngRawChunkIter::new(&v) {
      for _ in iter {
        //
      }
    }
    assert!(decode(&v).is_err());
  }
  // and neither should random data behind a real signature.
  for _ in 0..10 {
    let mut v = PNG_SIGNATURE.to_vec();
    v.extend(super::rand_bytes(1024));
    for _ in PngRawChunkIter::new(&v).unwrap() {
      //
    }
    let _ = decode(&v);
  }
}

#[test]
fn test_smallest_png_round_trip() {
  let bytes = smallest_png();
  let png = decode(&bytes).unwrap();
  assert_eq!(png.header().width, 1);
  assert_eq!(png.header().height, 1);
  assert_eq!(png.header().color_type, PngColorType::RGB);
  assert_eq!(png.image_data(), &[0x80, 0x40, 0x20]);
  assert_eq!(png.pixel(0, 0), Some(&[0x80, 0x40, 0x20][..]));
  assert_eq!(png.pixel(1, 0), None);
  assert_eq!(encode(&png).unwrap(), bytes);
}

#[test]
fn test_sub_and_up_rows_decode() {
  // 3x2 RGB, the first row with Sub and the second with Up.
  let filtered = [
    1, 10, 5, 5, 1, 1, 1, 2, 2, 2, //
    2, 1, 2, 3, 255, 255, 255, 0, 0, 0,
  ];
  let bytes = assemble(&[
    chunk(ChunkType::IHDR, &ihdr_data(3, 2, 2)),
    chunk(ChunkType::IDAT, &compress_to_vec_zlib(&filtered, 6)),
    chunk(ChunkType::IEND, &[]),
  ]);
  let png = decode(&bytes).unwrap();
  assert_eq!(
    png.image_data(),
    &[
      10, 5, 5, 11, 6, 6, 13, 8, 8, //
      11, 7, 8, 10, 5, 5, 13, 8, 8,
    ]
  );
  let pixels = png.rgb8_pixels().unwrap();
  assert_eq!(pixels.len(), 6);
  assert_eq!(pixels[3], haystack::RGB8 { r: 11, g: 7, b: 8 });
  assert!(png.rgba8_pixels().is_none());
}

#[test]
fn test_large_image_splits_idat() {
  let (width, height) = (200, 200);
  let pixels = super::rand_bytes(width * height * 4);
  let png = Png::new(width as u32, height as u32, PngColorType::RGBA, pixels.clone()).unwrap();
  let mut compressed_len = 0;
  let bytes = encode_with(&png, &EncodeOptions::default(), |name, data| {
    if name == stage::COMPRESSED_DATA {
      compressed_len = data.len();
    }
  })
  .unwrap();
  assert!(compressed_len > 65535);

  let idats: Vec<usize> =
    frames(&bytes).into_iter().filter(|(_, ty, _)| ty == b"IDAT").map(|(_, _, d)| d.len()).collect();
  assert!(idats.len() >= 2, "{idats:?}");
  let (last, full) = idats.split_last().unwrap();
  assert!(full.iter().all(|&len| len == 65535), "{idats:?}");
  assert!(*last <= 65535);
  assert_eq!(idats.iter().sum::<usize>(), compressed_len);

  let decoded = decode(&bytes).unwrap();
  assert_eq!(decoded.idat().len(), idats.len());
  assert_eq!(decoded.image_data(), &pixels[..]);
  assert_eq!(decoded.rgba8_pixels().unwrap().len(), width * height);
}

#[test]
fn test_encoded_chunks_have_good_crcs() {
  let png = Png::new(16, 16, PngColorType::RGB, super::rand_bytes(16 * 16 * 3)).unwrap();
  let options = EncodeOptions::default().with_max_idat_len(100);
  let bytes = encode_with(&png, &options, |_, _| ()).unwrap();
  let mut count = 0;
  for raw in PngRawChunkIter::new(&bytes).unwrap() {
    let raw = raw.unwrap();
    assert_eq!(raw.declared_crc(), chunk_crc(raw.chunk_type().to_bytes(), raw.data()));
    count += 1;
  }
  assert!(count >= 4);
}

#[test]
fn test_round_trip_with_options() {
  // a smooth gradient, which the adaptive filters do well on.
  let (width, height) = (37_u32, 23_u32);
  let mut pixels = Vec::new();
  for y in 0..height {
    for x in 0..width {
      pixels.extend_from_slice(&[(x * 7) as u8, (y * 11) as u8, (x + y) as u8, 255]);
    }
  }
  let png = Png::new(width, height, PngColorType::RGBA, pixels.clone()).unwrap();
  for options in [
    EncodeOptions::default(),
    EncodeOptions::default().with_filter_strategy(FilterStrategy::MinSumAbs),
    EncodeOptions::default().with_max_idat_len(7).with_compression_level(9),
    EncodeOptions::default().with_compression_level(0),
  ] {
    let mut filter_bytes = Vec::new();
    let bytes = encode_with(&png, &options, |name, data| {
      if name == stage::FILTERED_DATA {
        filter_bytes = data.chunks(width as usize * 4 + 1).map(|row| row[0]).collect();
      }
    })
    .unwrap();
    assert_eq!(filter_bytes.len(), height as usize);
    if options.filter_strategy() == FilterStrategy::NoFilter {
      assert!(filter_bytes.iter().all(|&f| f == 0));
    } else {
      assert!(filter_bytes.iter().any(|&f| f != 0));
    }
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded.image_data(), &pixels[..], "{options:?}");
    assert!(decoded.idat().iter().all(|c| c.length() <= options.max_idat_len()));
  }
}

#[test]
fn test_crc_corruption_is_detected() {
  let original = smallest_png();
  for (offset, ty, data) in frames(&original) {
    if data.is_empty() {
      continue;
    }
    for i in 0..data.len() {
      let mut bytes = original.clone();
      bytes[offset + 8 + i] ^= 0x01;
      match decode(&bytes) {
        Err(PngError::CrcMismatch { chunk_type, offset: at, .. }) => {
          assert_eq!(chunk_type.to_bytes(), ty);
          assert_eq!(at, offset);
        }
        other => panic!("flipping byte {i} of {ty:?}: {other:?}"),
      }
    }
  }
}

#[test]
fn test_truncation_is_detected() {
  let bytes = smallest_png();
  assert!(matches!(decode(&bytes[..bytes.len() - 4]), Err(PngError::Truncated { .. })));
  // cut in the middle of a chunk's data.
  assert!(matches!(decode(&bytes[..8 + 12 + 5]), Err(PngError::Truncated { .. })));
  // cut in the middle of the signature.
  assert!(matches!(decode(&bytes[..5]), Err(PngError::Truncated { .. })));
  assert!(matches!(decode(&[]), Err(PngError::Truncated { .. })));
}

#[test]
fn test_not_png() {
  let mut bytes = smallest_png();
  bytes[1] = b'J';
  assert_eq!(decode(&bytes), Err(PngError::NotPng));
  assert_eq!(decode(b"GIF89a, definitely"), Err(PngError::NotPng));
}

#[test]
fn test_missing_critical_chunks() {
  let bytes = smallest_png();
  // drop the IEND entirely.
  assert_eq!(decode(&bytes[..bytes.len() - 12]), Err(PngError::MissingIend));

  let ihdr = chunk(ChunkType::IHDR, &ihdr_data(1, 1, 2));
  let idat = chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1, 2, 3], 6));
  let iend = chunk(ChunkType::IEND, &[]);
  assert_eq!(decode(&assemble(&[ihdr.clone(), iend.clone()])), Err(PngError::MissingIdat));
  assert_eq!(decode(&assemble(&[idat.clone(), iend.clone()])), Err(PngError::MissingIhdr));
  assert_eq!(decode(&PNG_SIGNATURE), Err(PngError::MissingIhdr));
  assert!(decode(&assemble(&[ihdr, idat, iend])).is_ok());
}

#[test]
fn test_misplaced_ihdr() {
  let ihdr = chunk(ChunkType::IHDR, &ihdr_data(1, 1, 2));
  let idat = chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1, 2, 3], 6));
  let iend = chunk(ChunkType::IEND, &[]);
  assert_eq!(
    decode(&assemble(&[ihdr.clone(), ihdr.clone(), idat.clone(), iend.clone()])),
    Err(PngError::DuplicateIhdr { offset: 8 + ihdr.len() })
  );
  assert_eq!(
    decode(&assemble(&[idat.clone(), ihdr.clone(), iend])),
    Err(PngError::IhdrAfterIdat { offset: 8 + idat.len() })
  );
}

#[test]
fn test_ancillary_chunks_are_skipped() {
  let ihdr = chunk(ChunkType::IHDR, &ihdr_data(1, 1, 2));
  let text = chunk(ChunkType::from(*b"tEXt"), b"Comment\0hello");
  let idat = chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1, 2, 3], 6));
  let iend = chunk(ChunkType::IEND, &[]);
  let bytes = assemble(&[ihdr.clone(), text.clone(), idat.clone(), iend.clone()]);
  let png = decode(&bytes).unwrap();
  assert_eq!(png.image_data(), &[1, 2, 3]);
  // the ancillary chunk isn't written back out.
  assert_eq!(encode(&png).unwrap(), assemble(&[ihdr.clone(), idat.clone(), iend.clone()]));

  // but it still has to have a good CRC.
  let mut bad_text = text.clone();
  let last = bad_text.len() - 1;
  bad_text[last] ^= 0xFF;
  assert!(matches!(
    decode(&assemble(&[ihdr, bad_text, idat, iend])),
    Err(PngError::CrcMismatch { chunk_type, .. }) if chunk_type.to_bytes() == *b"tEXt"
  ));
}

#[test]
fn test_trailing_bytes_after_iend_are_ignored() {
  let mut bytes = smallest_png();
  bytes.extend_from_slice(b"trailing garbage");
  assert_eq!(decode(&bytes).unwrap().image_data(), &[0x80, 0x40, 0x20]);
}

#[test]
fn test_unsupported_headers() {
  let idat = chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1, 2, 3], 6));
  let iend = chunk(ChunkType::IEND, &[]);
  let with_ihdr = |data: &[u8]| decode(&assemble(&[chunk(ChunkType::IHDR, data), idat.clone(), iend.clone()]));

  // grayscale
  assert_eq!(with_ihdr(&ihdr_data(1, 1, 0)), Err(PngError::UnsupportedColorType(0)));
  // palette
  assert_eq!(with_ihdr(&ihdr_data(1, 1, 3)), Err(PngError::UnsupportedColorType(3)));
  let mut sixteen_bit = ihdr_data(1, 1, 2);
  sixteen_bit[8] = 16;
  assert_eq!(with_ihdr(&sixteen_bit), Err(PngError::UnsupportedBitDepth(16)));
  let mut interlaced = ihdr_data(1, 1, 2);
  interlaced[12] = 1;
  assert_eq!(with_ihdr(&interlaced), Err(PngError::UnsupportedInterlace(1)));
  assert_eq!(with_ihdr(&ihdr_data(0, 1, 2)), Err(PngError::ZeroDimension));
  assert_eq!(with_ihdr(&ihdr_data(1, 1, 2)[..12]), Err(PngError::BadIhdrLength(12)));
}

#[test]
fn test_wrong_amount_of_image_data() {
  let ihdr = chunk(ChunkType::IHDR, &ihdr_data(2, 1, 2));
  let iend = chunk(ChunkType::IEND, &[]);
  // one byte short
  let short = chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1, 2, 3, 4, 5], 6));
  assert_eq!(
    decode(&assemble(&[ihdr.clone(), short, iend.clone()])),
    Err(PngError::SizeMismatch { expected: 7, actual: Some(6) })
  );
  // one byte long
  let long = chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1, 2, 3, 4, 5, 6, 7], 6));
  assert_eq!(
    decode(&assemble(&[ihdr.clone(), long, iend.clone()])),
    Err(PngError::SizeMismatch { expected: 7, actual: None })
  );
  // not zlib at all
  let junk = chunk(ChunkType::IDAT, &[0xFF; 16]);
  assert!(matches!(decode(&assemble(&[ihdr, junk, iend])), Err(PngError::InflateFailure(_))));
}

#[test]
fn test_decode_hooks_see_each_stage() {
  let bytes = smallest_png();
  let mut seen: Vec<(String, Vec<u8>)> = Vec::new();
  decode_with(&bytes, |name, data| seen.push((name.to_string(), data.to_vec()))).unwrap();
  assert_eq!(
    seen,
    vec![
      (stage::DECOMPRESSED_DATA.to_string(), vec![0, 0x80, 0x40, 0x20]),
      (stage::UNFILTERED_DATA.to_string(), vec![0x80, 0x40, 0x20]),
    ]
  );
}

#[test]
fn test_png_new_rejects_bad_data() {
  assert_eq!(Png::new(0, 4, PngColorType::RGB, vec![]), Err(PngError::ZeroDimension));
  assert_eq!(
    Png::new(2, 2, PngColorType::RGB, vec![0; 11]),
    Err(PngError::SizeMismatch { expected: 12, actual: Some(11) })
  );
  let png = Png::new(2, 2, PngColorType::RGB, vec![0; 12]).unwrap();
  assert!(png.idat().is_empty());
  assert_eq!(png.ihdr().declared_crc(), png.ihdr().compute_actual_crc());
  let png = png.with_image_data(vec![9; 12]).unwrap();
  assert_eq!(png.pixel(1, 1), Some(&[9, 9, 9][..]));
}

#[test]
fn test_huge_headers_are_errors() {
  let idat = chunk(ChunkType::IDAT, &compress_to_vec_zlib(&[0, 1, 2, 3], 6));
  let iend = chunk(ChunkType::IEND, &[]);
  let with_ihdr = |data: &[u8]| decode(&assemble(&[chunk(ChunkType::IHDR, data), idat.clone(), iend.clone()]));

  // the biggest dimensions PNG allows: the buffer size fits in a 64-bit usize,
  // but no allocator can provide it.
  let bytes = assemble(&[
    chunk(ChunkType::IHDR, &ihdr_data(0x7FFF_FFFF, 0x7FFF_FFFF, 6)),
    idat.clone(),
    iend.clone(),
  ]);
  assert_eq!(bytes.len(), 8 + 25 + idat.len() + 12);
  assert_eq!(decode(&bytes), Err(PngError::DimensionsTooLarge));

  // here the buffer size overflows usize entirely.
  assert_eq!(with_ihdr(&ihdr_data(u32::MAX, u32::MAX, 2)), Err(PngError::DimensionsTooLarge));
  assert_eq!(with_ihdr(&ihdr_data(u32::MAX, u32::MAX, 6)), Err(PngError::DimensionsTooLarge));
  assert_eq!(
    IHDR::try_from_chunk_data(&ihdr_data(u32::MAX, u32::MAX, 6)),
    Err(PngError::DimensionsTooLarge)
  );
  assert_eq!(
    Png::new(u32::MAX, u32::MAX, PngColorType::RGBA, Vec::new()),
    Err(PngError::DimensionsTooLarge)
  );
}
