use super::*;
use crate::scan::{Peak, ScanPrecursor};

static PEAKS: [Peak; 2] = [
    Peak {
        mz: 175.119,
        intensity: 1200.0,
    },
    Peak {
        mz: 303.5,
        intensity: 800.25,
    },
];

fn feature_record() -> PseudoSpectrum<'static> {
    PseudoSpectrum {
        scan_index: 1523,
        scan_title: "controllerType=0 controllerNumber=1 scan=1523",
        retention_time: 150.0,
        precursor: ScanPrecursor {
            mz: 500.2505,
            charge: Some(2),
        },
        assignment: Assignment::Feature {
            id: 87,
            mz: 500.25,
            rt_apex: 151.2,
        },
        corrected_mz: 500.249,
        charge: 2,
        peaks: &PEAKS,
    }
}

fn fallback_record() -> PseudoSpectrum<'static> {
    PseudoSpectrum {
        scan_index: 7,
        scan_title: "scan=7",
        retention_time: 33.5,
        precursor: ScanPrecursor {
            mz: 612.3,
            charge: Some(3),
        },
        assignment: Assignment::Unmatched,
        corrected_mz: 612.3,
        charge: 3,
        peaks: &PEAKS[..1],
    }
}

#[test]
fn test_feature_record() {
    let mut text = String::new();
    format_record(&mut text, &feature_record());

    assert_eq!(
        text,
        "BEGIN IONS\n\
         TITLE=1523[87:500.250000:151.200000]\n\
         RTINSECONDS=150.000000\n\
         PEPMASS=500.249000\n\
         CHARGE=2+\n\
         RAWFILE=controllerType=0 controllerNumber=1 scan=1523 [500.250500:2] diff:-0.000500\n\
         175.119 1200.0\n\
         303.5 800.25\n\
         END IONS\n\n"
    );
}

#[test]
fn test_fallback_record() {
    let mut text = String::new();
    format_record(&mut text, &fallback_record());

    assert_eq!(
        text,
        "BEGIN IONS\n\
         TITLE=7[-:612.300000:33.500000]\n\
         RTINSECONDS=33.500000\n\
         PEPMASS=612.300000\n\
         CHARGE=3+\n\
         RAWFILE=scan=7\n\
         175.119 1200.0\n\
         END IONS\n\n"
    );
}

#[test]
fn test_unknown_charge_is_written_as_zero() {
    let mut record = feature_record();
    record.precursor.charge = None;
    let mut text = String::new();
    format_record(&mut text, &record);
    assert!(text.contains("[500.250500:0]"));
}

#[test]
fn test_writer_counts_records() {
    let mut writer = MgfWriter::new(Vec::new());
    writer
        .write_all(&[feature_record(), fallback_record()])
        .unwrap();
    assert_eq!(writer.records_written(), 2);

    let bytes = writer.finish().unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.matches("BEGIN IONS").count(), 2);
    assert_eq!(text.matches("END IONS\n\n").count(), 2);
    assert!(text.starts_with("BEGIN IONS\nTITLE=1523[87:"));
}

#[test]
fn test_create_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.mgf");

    let mut writer = MgfWriter::create(&path).unwrap();
    writer.write_spectrum(&fallback_record()).unwrap();
    writer.finish().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("END IONS\n\n"));
}

#[test]
fn test_output_path() {
    assert_eq!(
        output_path_for("/data/run.mzML"),
        PathBuf::from("/data/run.mzML.demix.mgf")
    );
    assert_eq!(
        output_path_for("run.mzML.gz"),
        PathBuf::from("run.mzML.gz.demix.mgf")
    );
}
