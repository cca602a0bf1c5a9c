#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![warn(missing_docs)]

//! A crate for round-tripping PNG data through raw pixel buffers.
//!
//! Only a narrow subset of PNG is handled: 8-bit truecolor images, with or
//! without alpha, that are not interlaced. Within that subset you can decode a
//! PNG byte stream into a [`Png`](png::Png) holding the unfiltered row-major
//! pixel bytes, change those bytes however you like, and encode the result
//! back into a PNG byte stream.

extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

pub mod pixel_formats;
pub use pixel_formats::*;

pub mod ascii_array;
pub use ascii_array::*;

mod error;
pub use error::*;

mod parser_helpers;
pub(crate) use parser_helpers::*;

pub mod png;
