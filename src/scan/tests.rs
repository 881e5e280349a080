use super::*;
use std::io::{BufReader, Cursor};

use base64::prelude::*;

fn encode_f64(values: &[f64]) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    BASE64_STANDARD.encode(bytes)
}

/// Build one `<spectrum>` element
fn spectrum_xml(
    id: &str,
    ms_level: Option<u8>,
    scan_time: Option<(&str, Option<&str>)>,
    precursors: &[(Option<&str>, Option<&str>)],
    peaks: &[(f64, f64)],
) -> String {
    let mut xml = format!(
        r#"<spectrum index="0" id="{}" defaultArrayLength="{}">"#,
        id,
        peaks.len()
    );
    if let Some(level) = ms_level {
        xml.push_str(&format!(
            r#"<cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="{}"/>"#,
            level
        ));
    }
    xml.push_str(r#"<cvParam cvRef="MS" accession="MS:1000127" name="centroid spectrum"/>"#);
    xml.push_str(r#"<scanList count="1"><scan>"#);
    if let Some((value, unit)) = scan_time {
        match unit {
            Some(unit) => xml.push_str(&format!(
                r#"<cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="{}" unitCvRef="UO" unitName="{}"/>"#,
                value, unit
            )),
            None => xml.push_str(&format!(
                r#"<cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="{}"/>"#,
                value
            )),
        }
    }
    xml.push_str("</scan></scanList>");
    if !precursors.is_empty() {
        xml.push_str(r#"<precursorList count="1">"#);
        for (mz, charge) in precursors {
            xml.push_str("<precursor><selectedIonList><selectedIon>");
            if let Some(mz) = mz {
                xml.push_str(&format!(
                    r#"<cvParam cvRef="MS" accession="MS:1000744" name="selected ion m/z" value="{}"/>"#,
                    mz
                ));
            }
            if let Some(z) = charge {
                xml.push_str(&format!(
                    r#"<cvParam cvRef="MS" accession="MS:1000041" name="charge state" value="{}"/>"#,
                    z
                ));
            }
            xml.push_str("</selectedIon></selectedIonList></precursor>");
        }
        xml.push_str("</precursorList>");
    }
    let mzs: Vec<f64> = peaks.iter().map(|p| p.0).collect();
    let intensities: Vec<f64> = peaks.iter().map(|p| p.1).collect();
    xml.push_str(&format!(
        r#"<binaryDataArrayList count="2">
<binaryDataArray><cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/><cvParam cvRef="MS" accession="MS:1000576" name="no compression"/><cvParam cvRef="MS" accession="MS:1000514" name="m/z array"/><binary>{}</binary></binaryDataArray>
<binaryDataArray><cvParam cvRef="MS" accession="MS:1000523" name="64-bit float"/><cvParam cvRef="MS" accession="MS:1000576" name="no compression"/><cvParam cvRef="MS" accession="MS:1000515" name="intensity array"/><binary>{}</binary></binaryDataArray>
</binaryDataArrayList></spectrum>"#,
        encode_f64(&mzs),
        encode_f64(&intensities)
    ));
    xml
}

fn wrap(spectra: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0"><run id="r"><spectrumList count="{}">{}</spectrumList></run></mzML>"#,
        spectra.len(),
        spectra.join("\n")
    )
}

fn reader(doc: String) -> ScanReader<BufReader<Cursor<String>>> {
    ScanReader::new(MzMLStreamer::new(BufReader::new(Cursor::new(doc))).unwrap())
}

#[test]
fn test_seconds_are_kept() {
    let doc = wrap(&[spectrum_xml(
        "scan=7",
        Some(2),
        Some(("15", Some("second"))),
        &[(Some("500.25"), Some("2"))],
        &[(200.0, 10.0)],
    )]);
    let mut scans = reader(doc);
    let scan = scans.next().unwrap().unwrap();

    assert_eq!(scan.index, 7);
    assert!(scan.is_ms2());
    assert_eq!(scan.retention_time, 15.0);
    assert_eq!(scans.time_scale(), Some(TimeScale::Seconds));
    assert!(scans.next().is_none());
    assert!(scans.is_exhausted());
}

#[test]
fn test_minutes_are_scaled() {
    let doc = wrap(&[spectrum_xml(
        "scan=1",
        Some(2),
        Some(("0.25", Some("minute"))),
        &[(Some("500.25"), Some("2"))],
        &[],
    )]);
    let scan = reader(doc).next().unwrap().unwrap();
    assert_eq!(scan.retention_time, 15.0);
}

#[test]
fn test_time_scale_is_detected_once() {
    let doc = wrap(&[
        spectrum_xml("scan=1", Some(1), Some(("2", None)), &[], &[]),
        spectrum_xml("scan=2", Some(1), Some(("3", Some("second"))), &[], &[]),
        spectrum_xml("scan=3", Some(1), Some(("4", Some("minute"))), &[], &[]),
    ]);
    let scans: Vec<Scan> = reader(doc).map(|s| s.unwrap()).collect();

    // No annotation yet: minutes assumed
    assert_eq!(scans[0].retention_time, 120.0);
    assert_eq!(scans[1].retention_time, 3.0);
    // Locked to seconds by the first annotated scan
    assert_eq!(scans[2].retention_time, 4.0);
}

#[test]
fn test_peaks_are_filtered_and_sorted() {
    let doc = wrap(&[spectrum_xml(
        "scan=1",
        Some(2),
        Some(("1", Some("second"))),
        &[(Some("400.0"), None)],
        &[(300.0, 5.0), (100.0, 0.0), (200.0, 7.0)],
    )]);
    let scan = reader(doc).next().unwrap().unwrap();

    assert_eq!(
        scan.peaks,
        vec![
            Peak { mz: 200.0, intensity: 7.0 },
            Peak { mz: 300.0, intensity: 5.0 },
        ]
    );
    assert_eq!(scan.precursors[0].charge, None);
    assert_eq!(scan.precursors[0].charge_or_zero(), 0);
}

#[test]
fn test_unparsable_charge_is_unknown() {
    let doc = wrap(&[spectrum_xml(
        "scan=1",
        Some(2),
        Some(("1", Some("second"))),
        &[(Some("400.0"), Some("two"))],
        &[],
    )]);
    let scan = reader(doc).next().unwrap().unwrap();
    assert_eq!(scan.precursors[0].charge, None);
}

#[test]
fn test_soft_failures_skip_one_scan() {
    let doc = wrap(&[
        spectrum_xml("scan=1", Some(2), None, &[(Some("400.0"), Some("2"))], &[]),
        spectrum_xml("scan=2", Some(2), Some(("1", Some("second"))), &[], &[]),
        spectrum_xml("scan=3", Some(2), Some(("1", Some("second"))), &[(None, Some("2"))], &[]),
        spectrum_xml("scan=4", Some(2), Some(("1", Some("second"))), &[(Some("400.0"), Some("2"))], &[]),
    ]);
    let results: Vec<_> = reader(doc).collect();

    assert_eq!(results.len(), 4);
    assert!(matches!(results[0], Err(ScanError::MissingScanTime { .. })));
    assert!(matches!(results[1], Err(ScanError::MissingPrecursor { .. })));
    assert!(matches!(results[2], Err(ScanError::MalformedPrecursor { .. })));
    for result in &results[..3] {
        assert!(!result.as_ref().unwrap_err().is_fatal());
    }
    assert_eq!(results[3].as_ref().unwrap().index, 4);
}

#[test]
fn test_bad_scan_index_ends_the_stream() {
    let doc = wrap(&[
        spectrum_xml("scan=1", Some(1), Some(("1", Some("second"))), &[], &[]),
        spectrum_xml("sample=1 period=1", Some(1), Some(("2", Some("second"))), &[], &[]),
        spectrum_xml("scan=3", Some(1), Some(("3", Some("second"))), &[], &[]),
    ]);
    let results: Vec<_> = reader(doc).collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    let err = results[1].as_ref().unwrap_err();
    assert!(matches!(err, ScanError::MissingScanIndex { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_corrupt_document_ends_the_stream() {
    let good = spectrum_xml("scan=1", Some(1), Some(("1", Some("second"))), &[], &[]);
    let doc = format!(
        r#"<mzML><run><spectrumList>{}<spectrum index="1" id="scan=2" defaultArrayLength="1"><binaryDataArrayList><binaryDataArray><cvParam accession="MS:1000514"/><binary>@@@@</binary></binaryDataArray></binaryDataArrayList></spectrum>{}</spectrumList></run></mzML>"#,
        good,
        spectrum_xml("scan=3", Some(1), Some(("3", Some("second"))), &[], &[]),
    );
    let results: Vec<_> = reader(doc).collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(ScanError::Stream { spectra_read: 1, .. })
    ));
}

#[test]
fn test_profile_ms2_is_skipped() {
    let profile = |xml: String| {
        xml.replace(
            r#"accession="MS:1000127" name="centroid spectrum""#,
            r#"accession="MS:1000128" name="profile spectrum""#,
        )
    };
    let doc = wrap(&[
        profile(spectrum_xml("scan=1", Some(1), Some(("1.0", None)), &[], &[(300.0, 5.0)])),
        profile(spectrum_xml(
            "scan=2",
            Some(2),
            Some(("1.1", None)),
            &[(Some("500.25"), Some("2"))],
            &[(200.0, 10.0), (200.001, 12.0)],
        )),
        spectrum_xml(
            "scan=3",
            Some(2),
            Some(("1.2", None)),
            &[(Some("500.25"), Some("2"))],
            &[(200.0, 10.0)],
        )
        .replace(r#"<cvParam cvRef="MS" accession="MS:1000127" name="centroid spectrum"/>"#, ""),
    ]);
    let results: Vec<_> = reader(doc).collect();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().index, 1);
    let err = results[1].as_ref().unwrap_err();
    assert!(matches!(err, ScanError::ProfileSpectrum { id } if id == "scan=2"));
    assert!(!err.is_fatal());
    // No spectrum representation term: read as centroided
    assert_eq!(results[2].as_ref().unwrap().peaks.len(), 1);
}
