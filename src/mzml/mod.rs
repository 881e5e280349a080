//! # mzML Parser Module
//!
//! Streaming parsing of mzML files, the XML-based community standard for mass
//! spectrometry data defined by HUPO-PSI. Only what the demixing pass needs is
//! extracted: native ID, MS level, scan time and its unit, precursor ions and
//! the m/z / intensity arrays.
//!
//! ## mzML Structure
//!
//! ```text
//! indexedmzML (optional wrapper)
//! └── mzML
//!     └── run
//!         └── spectrumList
//!             └── spectrum* (many)
//!                 ├── cvParam*
//!                 ├── scanList
//!                 ├── precursorList (for MS2+)
//!                 └── binaryDataArrayList
//!                     └── binaryDataArray*
//!                         ├── cvParam* (encoding info)
//!                         └── binary (base64 data)
//! ```

mod binary;
mod cv_params;
mod models;
pub mod streamer;

pub use binary::BinaryDecodeError;
pub use cv_params::{terms, CvParam};
pub use models::*;
pub use streamer::{MzMLError, MzMLStreamer};
