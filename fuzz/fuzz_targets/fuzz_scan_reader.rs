#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use demix::mzml::MzMLStreamer;
use demix::scan::ScanReader;

fuzz_target!(|data: &[u8]| {
    // Any input must end in a terminal state without panicking
    let Ok(streamer) = MzMLStreamer::new(Cursor::new(data)) else {
        return;
    };
    let mut scans = ScanReader::new(streamer);

    for _ in 0..100 {
        match scans.next() {
            Some(Ok(scan)) => {
                assert!(scan.peaks.windows(2).all(|w| w[0].mz.total_cmp(&w[1].mz).is_le()));
            }
            Some(Err(e)) if e.is_fatal() => {
                assert!(scans.next().is_none());
                break;
            }
            Some(Err(_)) => {}
            None => {
                assert!(scans.is_exhausted());
                break;
            }
        }
    }
});
