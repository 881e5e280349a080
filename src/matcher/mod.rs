//! Feature matching and chimeric spectrum splitting
//!
//! For every precursor of an MS2 scan the matcher looks up the features whose
//! m/z falls inside the isolation window and keeps those eluting at the scan's
//! retention time. Each kept feature becomes one [`PseudoSpectrum`] carrying
//! the scan's full peak list, so a chimeric scan is duplicated once per
//! co-isolated precursor. A multiply charged precursor without an exact
//! feature match also gets a fallback record built from its own m/z.
//!
//! Matching is a pure function of the scan, the feature table and the mass
//! offset; no state carries over between scans.

use crate::calibration::correct_mz;
use crate::features::{FeatureId, FeatureTable};
use crate::scan::{Peak, Scan, ScanPrecursor};

mod stats;

pub use stats::DemixStats;


/// Default full isolation window width in Th
pub const DEFAULT_ISOLATION_WIDTH: f64 = 4.0;

/// Default relative tolerance for an exact precursor-to-feature match
pub const DEFAULT_MS1_PRECISION: f64 = 1e-5;

/// What a pseudo-spectrum's precursor was taken from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assignment {
    /// A feature eluting at the scan time inside the isolation window
    Feature {
        /// Stable feature id
        id: FeatureId,
        /// Feature m/z
        mz: f64,
        /// Feature apex retention time in seconds
        rt_apex: f64,
    },
    /// No exact feature match: the scan's own precursor
    Unmatched,
}

impl Assignment {
    /// Whether the record comes from a feature
    pub fn is_feature(&self) -> bool {
        matches!(self, Assignment::Feature { .. })
    }
}

/// One output record: a scan's peaks under a corrected precursor assignment
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoSpectrum<'s> {
    /// Acquisition index of the source scan
    pub scan_index: u64,
    /// Native ID of the source scan
    pub scan_title: &'s str,
    /// Retention time of the source scan in seconds
    pub retention_time: f64,
    /// Precursor as recorded in the source scan
    pub precursor: ScanPrecursor,
    /// Where the corrected precursor comes from
    pub assignment: Assignment,
    /// Offset-corrected precursor m/z
    pub corrected_mz: f64,
    /// Precursor charge written to the record
    pub charge: i32,
    /// Peak list of the source scan
    pub peaks: &'s [Peak],
}

impl PseudoSpectrum<'_> {
    /// Feature id as a string, `-` for fallback records
    pub fn label(&self) -> String {
        match self.assignment {
            Assignment::Feature { id, .. } => id.to_string(),
            Assignment::Unmatched => "-".to_string(),
        }
    }
}

/// All records produced from one scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanSplit<'s> {
    /// Records in emission order
    pub spectra: Vec<PseudoSpectrum<'s>>,
    /// Precursors that produced no record
    pub dropped_precursors: usize,
    /// Precursors whose isolation window held two or more eluting features
    pub chimeric_precursors: usize,
}

impl ScanSplit<'_> {
    /// Number of feature-assigned records
    pub fn feature_records(&self) -> usize {
        self.spectra
            .iter()
            .filter(|s| s.assignment.is_feature())
            .count()
    }

    /// Whether any single precursor was assigned to more than one feature
    pub fn is_chimeric(&self) -> bool {
        self.chimeric_precursors > 0
    }
}

/// Matches scans against a feature table
#[derive(Debug, Clone, Copy)]
pub struct FeatureMatcher<'t> {
    table: &'t FeatureTable,
    offset_ppm: f64,
    half_width: f64,
    ms1_precision: f64,
}

impl<'t> FeatureMatcher<'t> {
    /// Create a matcher for a full isolation width in Th
    pub fn new(table: &'t FeatureTable, offset_ppm: f64, isolation_width: f64) -> Self {
        Self {
            table,
            offset_ppm,
            half_width: isolation_width / 2.0,
            ms1_precision: DEFAULT_MS1_PRECISION,
        }
    }

    /// Set the relative tolerance that counts as an exact match
    pub fn with_ms1_precision(mut self, ms1_precision: f64) -> Self {
        self.ms1_precision = ms1_precision;
        self
    }

    /// Mass offset applied to every precursor, in ppm
    pub fn offset_ppm(&self) -> f64 {
        self.offset_ppm
    }

    /// Split one scan into pseudo-spectra
    ///
    /// Non-MS2 scans yield nothing.
    pub fn split_scan<'s>(&self, scan: &'s Scan) -> ScanSplit<'s> {
        let mut split = ScanSplit::default();
        if !scan.is_ms2() {
            return split;
        }

        for precursor in &scan.precursors {
            let emitted = split.spectra.len();
            let exact = self.match_precursor(scan, precursor, &mut split.spectra);
            let charge = precursor.charge_or_zero();
            if split.spectra.len() - emitted > 1 {
                split.chimeric_precursors += 1;
            }

            if !exact && charge > 1 {
                split.spectra.push(PseudoSpectrum {
                    scan_index: scan.index,
                    scan_title: &scan.id,
                    retention_time: scan.retention_time,
                    precursor: *precursor,
                    assignment: Assignment::Unmatched,
                    corrected_mz: correct_mz(precursor.mz, self.offset_ppm),
                    charge,
                    peaks: &scan.peaks,
                });
            }
            if split.spectra.len() == emitted {
                split.dropped_precursors += 1;
            }
        }
        split
    }

    /// Push one record per eluting feature in the window
    ///
    /// Returns whether any of them is within `ms1_precision` of the
    /// precursor m/z.
    fn match_precursor<'s>(
        &self,
        scan: &'s Scan,
        precursor: &ScanPrecursor,
        out: &mut Vec<PseudoSpectrum<'s>>,
    ) -> bool {
        let pmz = precursor.mz;
        let mut exact = false;

        let candidates = self
            .table
            .candidates(pmz - self.half_width, pmz + self.half_width);
        for (id, feature) in candidates {
            if !feature.elutes_at(scan.retention_time) {
                continue;
            }
            if (pmz - feature.mz).abs() / pmz <= self.ms1_precision {
                exact = true;
            }
            out.push(PseudoSpectrum {
                scan_index: scan.index,
                scan_title: &scan.id,
                retention_time: scan.retention_time,
                precursor: *precursor,
                assignment: Assignment::Feature {
                    id,
                    mz: feature.mz,
                    rt_apex: feature.rt_apex,
                },
                corrected_mz: correct_mz(feature.mz, self.offset_ppm),
                charge: feature.charge,
                peaks: &scan.peaks,
            });
        }
        exact
    }
}
