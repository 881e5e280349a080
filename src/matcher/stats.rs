use std::fmt;

use serde::Serialize;

use super::ScanSplit;
use crate::scan::ScanError;

/// Counters accumulated over a demixing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DemixStats {
    /// Scans read successfully, any MS level
    pub scans_read: usize,
    /// MS2 scans among them
    pub ms2_scans: usize,
    /// Scans skipped for a recoverable defect
    pub scans_skipped: usize,
    /// Skipped scans that were profile-mode MS2 spectra
    pub profile_scans: usize,
    /// Records assigned to a feature
    pub feature_records: usize,
    /// Fallback records built from the scan's own precursor
    pub fallback_records: usize,
    /// MS2 scans with a precursor assigned to two or more features
    pub chimeric_scans: usize,
    /// Precursors that produced no record
    pub dropped_precursors: usize,
}

impl DemixStats {
    /// Count one scan and what it was split into
    pub fn record_scan(&mut self, is_ms2: bool, split: &ScanSplit<'_>) {
        self.scans_read += 1;
        if !is_ms2 {
            return;
        }
        self.ms2_scans += 1;

        let features = split.feature_records();
        self.feature_records += features;
        self.fallback_records += split.spectra.len() - features;
        self.dropped_precursors += split.dropped_precursors;
        if split.is_chimeric() {
            self.chimeric_scans += 1;
        }
    }

    /// Count a scan skipped for a recoverable defect
    pub fn record_skip(&mut self, reason: &ScanError) {
        self.scans_skipped += 1;
        if matches!(reason, ScanError::ProfileSpectrum { .. }) {
            self.profile_scans += 1;
        }
    }

    /// Total records written
    pub fn records_written(&self) -> usize {
        self.feature_records + self.fallback_records
    }
}

impl fmt::Display for DemixStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Read {} scans ({} MS2, {} skipped, {} profile); wrote {} records ({} feature, {} fallback); {} chimeric scans, {} precursors dropped",
            self.scans_read,
            self.ms2_scans,
            self.scans_skipped,
            self.profile_scans,
            self.records_written(),
            self.feature_records,
            self.fallback_records,
            self.chimeric_scans,
            self.dropped_precursors
        )
    }
}
