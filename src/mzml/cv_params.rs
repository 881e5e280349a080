//! PSI-MS controlled vocabulary terms read from mzML
//!
//! Every scan property demix needs arrives as a `<cvParam>`. Only the
//! accession, the value and a unit annotation are kept.

use std::str::FromStr;

use super::models::TimeUnitAnnotation;

/// One `<cvParam>` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CvParam {
    /// Accession, e.g. `MS:1000511`
    pub accession: String,
    /// Raw value attribute
    pub value: Option<String>,
    /// Unit attributes, when either is present
    pub unit: Option<TimeUnitAnnotation>,
}

impl CvParam {
    /// Parse the value, ignoring surrounding whitespace
    pub fn parse_value<T: FromStr>(&self) -> Option<T> {
        self.value.as_deref()?.trim().parse().ok()
    }
}

/// Accessions consumed by the streamer and the scan reader
pub mod terms {
    /// MS level
    pub const MS_LEVEL: &str = "MS:1000511";
    /// Centroid spectrum
    pub const CENTROID_SPECTRUM: &str = "MS:1000127";
    /// Profile spectrum
    pub const PROFILE_SPECTRUM: &str = "MS:1000128";
    /// Scan start time
    pub const SCAN_START_TIME: &str = "MS:1000016";

    /// Selected ion m/z
    pub const SELECTED_ION_MZ: &str = "MS:1000744";
    /// Charge state
    pub const CHARGE_STATE: &str = "MS:1000041";
    /// Isolation window target m/z
    pub const ISOLATION_WINDOW_TARGET_MZ: &str = "MS:1000827";

    /// 32-bit float
    pub const FLOAT_32_BIT: &str = "MS:1000521";
    /// 64-bit float
    pub const FLOAT_64_BIT: &str = "MS:1000523";
    /// zlib compression
    pub const ZLIB_COMPRESSION: &str = "MS:1000574";
    /// No compression
    pub const NO_COMPRESSION: &str = "MS:1000576";
    /// MS-Numpress linear, pic and slof
    pub const NUMPRESS: [&str; 3] = ["MS:1002312", "MS:1002313", "MS:1002314"];
    /// m/z array
    pub const MZ_ARRAY: &str = "MS:1000514";
    /// Intensity array
    pub const INTENSITY_ARRAY: &str = "MS:1000515";

    /// Second (UO)
    pub const UNIT_SECOND: &str = "UO:0000010";
    /// Minute (UO)
    pub const UNIT_MINUTE: &str = "UO:0000031";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        let level = CvParam {
            accession: terms::MS_LEVEL.to_string(),
            value: Some("2".to_string()),
            unit: None,
        };
        assert_eq!(level.parse_value::<i16>(), Some(2));
        assert_eq!(level.parse_value::<f64>(), Some(2.0));

        let time = CvParam {
            accession: terms::SCAN_START_TIME.to_string(),
            value: Some(" 12.5 ".to_string()),
            unit: None,
        };
        assert_eq!(time.parse_value::<f64>(), Some(12.5));

        let bare = CvParam {
            accession: terms::CENTROID_SPECTRUM.to_string(),
            ..Default::default()
        };
        assert_eq!(bare.parse_value::<f64>(), None);
    }
}
