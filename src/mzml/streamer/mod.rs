//! Streaming mzML parser using quick-xml
//!
//! Pull-based: the document is never held in memory, one `<spectrum>` element
//! is materialised at a time. Gzip-compressed input is detected from the file
//! suffix and inflated on the fly.

use std::io::BufRead;
use std::path::Path;

use quick_xml::Reader;

use crate::input::open_input;

pub use error::MzMLError;

mod error;
mod helpers;
mod spectrum;


/// Streaming parser for mzML files
pub struct MzMLStreamer<R: BufRead> {
    reader: Reader<R>,
    current_spectrum_index: i64,
}

impl MzMLStreamer<Box<dyn BufRead>> {
    /// Open an mzML file for streaming, inflating it if the name ends in `.gz`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MzMLError> {
        Self::new(open_input(path)?)
    }
}

impl<R: BufRead> MzMLStreamer<R> {
    /// Create a new streamer from a BufRead source
    pub fn new(reader: R) -> Result<Self, MzMLError> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        Ok(Self {
            reader: xml_reader,
            current_spectrum_index: 0,
        })
    }

    /// Approximate byte position in the (decompressed) stream
    pub fn position(&self) -> u64 {
        self.reader.buffer_position()
    }

    /// Number of spectra read so far
    pub fn spectra_read(&self) -> i64 {
        self.current_spectrum_index
    }
}
