#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use demix::identification::{IdentificationSummary, MzIdentMLReader};

fuzz_target!(|data: &[u8]| {
    let reader = MzIdentMLReader::new(Cursor::new(data), "fuzz");
    let _ = IdentificationSummary::collect(reader.take(1000), 0.005);
});
