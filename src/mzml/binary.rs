//! Peak array decoding for mzML
//!
//! A `<binaryDataArray>` is described by cvParams that arrive before its
//! `<binary>` text. [`ArrayDescriptor`] collects them; [`ArrayDescriptor::decode`]
//! turns the Base64 text into values once the element closes.

use std::io::Read;

use base64::prelude::*;
use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;

use super::cv_params::terms;

/// Errors that can occur during binary decoding
#[derive(Debug, thiserror::Error)]
pub enum BinaryDecodeError {
    /// The `<binary>` text is not valid Base64
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// zlib inflation failed
    #[error("Decompression error: {0}")]
    DecompressionError(#[from] std::io::Error),

    /// Byte count is not a whole number of values
    #[error("{bytes} bytes do not hold whole {width}-byte values")]
    RaggedBytes {
        /// Decoded byte count
        bytes: usize,
        /// Bytes per value
        width: usize,
    },

    /// Decoded array length disagrees with `defaultArrayLength`
    #[error("array holds {actual} values, spectrum declares {expected}")]
    LengthMismatch {
        /// Value count from `defaultArrayLength`
        expected: usize,
        /// Value count actually decoded
        actual: usize,
    },

    /// MS-Numpress arrays are recognised but not decoded
    #[error("MS-Numpress compressed arrays are not supported")]
    Numpress,
}

/// Which peak array a `<binaryDataArray>` holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArrayKind {
    Mz,
    Intensity,
}

/// Encoding facts gathered from the cvParams of one `<binaryDataArray>`
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ArrayDescriptor {
    pub(crate) kind: Option<ArrayKind>,
    single_precision: bool,
    zlib: bool,
    numpress: bool,
}

impl ArrayDescriptor {
    /// Fold one cvParam accession into the descriptor
    pub(crate) fn observe(&mut self, accession: &str) {
        match accession {
            terms::MZ_ARRAY => self.kind = Some(ArrayKind::Mz),
            terms::INTENSITY_ARRAY => self.kind = Some(ArrayKind::Intensity),
            terms::FLOAT_32_BIT => self.single_precision = true,
            terms::FLOAT_64_BIT => self.single_precision = false,
            terms::ZLIB_COMPRESSION => self.zlib = true,
            terms::NO_COMPRESSION => self.zlib = false,
            a if terms::NUMPRESS.contains(&a) => self.numpress = true,
            _ => {}
        }
    }

    /// Decode the `<binary>` text, checking it against `expected` values
    ///
    /// Empty text decodes to an empty array whatever the declared length.
    pub(crate) fn decode(&self, text: &str, expected: usize) -> Result<Vec<f64>, BinaryDecodeError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        if self.numpress {
            return Err(BinaryDecodeError::Numpress);
        }

        let mut bytes = BASE64_STANDARD.decode(text)?;
        if self.zlib {
            let mut inflated = Vec::new();
            ZlibDecoder::new(bytes.as_slice()).read_to_end(&mut inflated)?;
            bytes = inflated;
        }

        let width = self.width();
        if bytes.len() % width != 0 {
            return Err(BinaryDecodeError::RaggedBytes {
                bytes: bytes.len(),
                width,
            });
        }
        let values: Vec<f64> = if self.single_precision {
            bytes
                .chunks_exact(width)
                .map(|c| f64::from(LittleEndian::read_f32(c)))
                .collect()
        } else {
            bytes.chunks_exact(width).map(LittleEndian::read_f64).collect()
        };

        if values.len() != expected {
            return Err(BinaryDecodeError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(values)
    }

    fn width(&self) -> usize {
        if self.single_precision {
            4
        } else {
            8
        }
    }
}
