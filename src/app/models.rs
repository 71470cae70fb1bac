//! Data models for aviation weather report decoding
//!
//! This module contains the typed records produced by the decoder: raw report
//! input, the individual weather elements (wind, visibility, cloud layers),
//! and the assembled METAR observation and TAF forecast records.
//!
//! Every record is produced fresh by a decode call and owned by the caller.
//! Fields that a report did not carry, or that failed to decode, are `None`
//! rather than errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Raw Report Input
// =============================================================================

/// Kind of aviation weather report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportKind {
    /// Routine or special surface observation
    Metar,
    /// Terminal aerodrome forecast
    Taf,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Metar => write!(f, "METAR"),
            ReportKind::Taf => write!(f, "TAF"),
        }
    }
}

/// Raw report text as received from a collaborator
///
/// Immutable once created; the decoder only ever borrows the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReport {
    kind: ReportKind,
    text: String,
}

impl RawReport {
    /// Create a raw report of the given kind
    pub fn new(kind: ReportKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Create a raw METAR report
    pub fn metar(text: impl Into<String>) -> Self {
        Self::new(ReportKind::Metar, text)
    }

    /// Create a raw TAF report
    pub fn taf(text: impl Into<String>) -> Self {
        Self::new(ReportKind::Taf, text)
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

// =============================================================================
// Weather Elements
// =============================================================================

/// Direction component of a wind group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindDirection {
    /// True direction the wind blows from, in degrees
    Degrees(u16),
    /// Direction variable (`VRB`)
    Variable,
    /// Calm wind (`00000KT`)
    Calm,
}

/// Surface wind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub direction: WindDirection,

    /// Sustained speed in knots
    pub speed_kts: u32,

    /// Gust speed in knots when a `G` group was reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust_kts: Option<u32>,

    /// Direction range from a `dddVddd` group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_range: Option<(u16, u16)>,
}

impl Wind {
    /// Gust spread above the sustained speed, if gusting
    pub fn gust_factor(&self) -> Option<u32> {
        self.gust_kts
            .map(|gust| gust.saturating_sub(self.speed_kts))
    }
}

/// Prevailing visibility in statute miles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    /// Value as written in the report
    pub statute_miles: f64,

    /// `P6SM` style unbounded visibility ("at least")
    pub is_at_least: bool,

    /// `M1/4SM` style visibility ("less than")
    #[serde(default)]
    pub is_less_than: bool,
}

impl Visibility {
    /// Plain visibility with no qualifier
    pub fn miles(statute_miles: f64) -> Self {
        Self {
            statute_miles,
            is_at_least: false,
            is_less_than: false,
        }
    }

    /// Unbounded visibility of at least the given value
    pub fn at_least(statute_miles: f64) -> Self {
        Self {
            statute_miles,
            is_at_least: true,
            is_less_than: false,
        }
    }
}

/// Sky cover amount of a cloud layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CloudCoverage {
    /// 1-2 oktas (`FEW`)
    Few,
    /// 3-4 oktas (`SCT`)
    Scattered,
    /// 5-7 oktas (`BKN`)
    Broken,
    /// 8 oktas (`OVC`)
    Overcast,
    /// No clouds (`CLR`/`SKC`)
    Clear,
    /// Sky obscured, base is vertical visibility (`VV`)
    Obscured,
}

impl CloudCoverage {
    /// Map a three-letter coverage code to its coverage
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FEW" => Some(CloudCoverage::Few),
            "SCT" => Some(CloudCoverage::Scattered),
            "BKN" => Some(CloudCoverage::Broken),
            "OVC" => Some(CloudCoverage::Overcast),
            "CLR" | "SKC" => Some(CloudCoverage::Clear),
            "VV" => Some(CloudCoverage::Obscured),
            _ => None,
        }
    }

    /// Report code for this coverage
    pub fn code(&self) -> &'static str {
        match self {
            CloudCoverage::Few => "FEW",
            CloudCoverage::Scattered => "SCT",
            CloudCoverage::Broken => "BKN",
            CloudCoverage::Overcast => "OVC",
            CloudCoverage::Clear => "CLR",
            CloudCoverage::Obscured => "VV",
        }
    }

    /// Whether a layer of this coverage constitutes a ceiling
    pub fn is_ceiling(&self) -> bool {
        matches!(
            self,
            CloudCoverage::Broken | CloudCoverage::Overcast | CloudCoverage::Obscured
        )
    }
}

/// Convective cloud type appended to a layer group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConvectiveCloud {
    /// Cumulonimbus (`CB`)
    Cb,
    /// Towering cumulus (`TCU`)
    Tcu,
}

/// A single reported cloud layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudLayer {
    pub coverage: CloudCoverage,

    /// Base height above ground level in feet, `None` when reported as `///`
    pub base_feet_agl: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub convective: Option<ConvectiveCloud>,
}

impl CloudLayer {
    pub fn new(coverage: CloudCoverage, base_feet_agl: Option<u32>) -> Self {
        Self {
            coverage,
            base_feet_agl,
            convective: None,
        }
    }
}

/// Lowest Broken, Overcast or Obscured layer base in feet AGL
pub fn ceiling_feet(clouds: &[CloudLayer]) -> Option<u32> {
    clouds
        .iter()
        .filter(|layer| layer.coverage.is_ceiling())
        .filter_map(|layer| layer.base_feet_agl)
        .min()
}

// =============================================================================
// Flight Category
// =============================================================================

/// Flight category derived from visibility and ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    Vfr,
    Mvfr,
    Ifr,
    Lifr,
    Unknown,
}

impl FlightCategory {
    /// Ordering key: higher is more restrictive, `None` for `Unknown`
    pub fn severity(&self) -> Option<u8> {
        match self {
            FlightCategory::Vfr => Some(0),
            FlightCategory::Mvfr => Some(1),
            FlightCategory::Ifr => Some(2),
            FlightCategory::Lifr => Some(3),
            FlightCategory::Unknown => None,
        }
    }

    /// The more restrictive of two categories; `Unknown` yields to the other side
    pub fn worse_of(self, other: FlightCategory) -> FlightCategory {
        match (self.severity(), other.severity()) {
            (Some(a), Some(b)) => {
                if a >= b {
                    self
                } else {
                    other
                }
            }
            (Some(_), None) => self,
            (None, _) => other,
        }
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlightCategory::Vfr => "VFR",
            FlightCategory::Mvfr => "MVFR",
            FlightCategory::Ifr => "IFR",
            FlightCategory::Lifr => "LIFR",
            FlightCategory::Unknown => "UNKNOWN",
        };
        write!(f, "{}", label)
    }
}

// =============================================================================
// Decode Issues
// =============================================================================

/// Report field categories, used to describe missing data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    Station,
    Time,
    Wind,
    Visibility,
    Temperature,
    Altimeter,
}

/// Problems encountered while decoding, carried as data on the record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeIssue {
    /// Header could not be located; the record carries only raw text
    UnparseableReport,
    /// An expected group was absent
    MissingField { field: ReportField },
    /// A time group failed the digit/length/range check
    InvalidTimeField { token: String },
}

// =============================================================================
// METAR Observation Record
// =============================================================================

/// Decoded METAR observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetarRecord {
    /// ICAO station identifier
    pub station: Option<String>,

    /// Observation time resolved against the caller's reference time
    pub observed_at: Option<DateTime<Utc>>,

    /// `AUTO` modifier present
    pub is_automated: bool,

    /// `COR` modifier present
    pub is_corrected: bool,

    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,

    /// Cloud layers in report order
    pub clouds: Vec<CloudLayer>,

    /// Air temperature in degrees Celsius
    pub temperature: Option<i32>,

    /// Dewpoint in degrees Celsius
    pub dewpoint: Option<i32>,

    /// Altimeter setting in inches of mercury
    pub altimeter_inhg: Option<f64>,

    pub category: FlightCategory,

    /// Tokens kept verbatim but not decoded (including everything after `RMK`)
    pub remarks: Vec<String>,

    /// Original report text
    pub raw: String,

    pub issues: Vec<DecodeIssue>,
}

impl MetarRecord {
    /// Record with every field absent, used for unparseable input
    pub fn empty(raw: impl Into<String>) -> Self {
        Self {
            station: None,
            observed_at: None,
            is_automated: false,
            is_corrected: false,
            wind: None,
            visibility: None,
            clouds: Vec::new(),
            temperature: None,
            dewpoint: None,
            altimeter_inhg: None,
            category: FlightCategory::Unknown,
            remarks: Vec::new(),
            raw: raw.into(),
            issues: Vec::new(),
        }
    }

    /// Lowest Broken/Overcast/Obscured layer base
    pub fn ceiling_feet(&self) -> Option<u32> {
        ceiling_feet(&self.clouds)
    }

    /// Temperature/dewpoint spread in degrees Celsius
    pub fn dewpoint_spread(&self) -> Option<i32> {
        match (self.temperature, self.dewpoint) {
            (Some(temp), Some(dew)) => Some(temp - dew),
            _ => None,
        }
    }

    /// Whether the decoder reported any issue for this record
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

// =============================================================================
// TAF Forecast Records
// =============================================================================

/// TAF change indicator that opened a forecast period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeIndicator {
    /// Conditions directly after the header
    Initial,
    /// `FMddhhmm` - conditions replace the previous period
    From,
    /// `BECMG` - gradual transition
    Becoming,
    /// `TEMPO` - temporary fluctuations
    Temporary,
    /// `PROBnn` - probable conditions
    Probability,
}

impl ChangeIndicator {
    /// Whether periods of this type take part in validity chaining
    ///
    /// Temporary and probability periods overlap the period they appear in.
    pub fn is_chained(&self) -> bool {
        matches!(
            self,
            ChangeIndicator::Initial | ChangeIndicator::From | ChangeIndicator::Becoming
        )
    }
}

impl fmt::Display for ChangeIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeIndicator::Initial => "INITIAL",
            ChangeIndicator::From => "FM",
            ChangeIndicator::Becoming => "BECMG",
            ChangeIndicator::Temporary => "TEMPO",
            ChangeIndicator::Probability => "PROB",
        };
        write!(f, "{}", label)
    }
}

/// One timed forecast period within a TAF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub change_type: ChangeIndicator,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,

    /// Percentage for `PROB` periods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<u8>,

    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,
    pub clouds: Vec<CloudLayer>,
    pub category: FlightCategory,

    /// Tokens of this period kept verbatim but not decoded
    pub residue: Vec<String>,

    /// Text of this period's tokens, indicator included
    pub raw: String,
}

impl ForecastPeriod {
    /// Lowest Broken/Overcast/Obscured layer base
    pub fn ceiling_feet(&self) -> Option<u32> {
        ceiling_feet(&self.clouds)
    }

    /// Whether the period covers the given instant
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        match (self.valid_from, self.valid_to) {
            (Some(from), Some(to)) => at >= from && at < to,
            (Some(from), None) => at >= from,
            _ => false,
        }
    }
}

/// Decoded terminal aerodrome forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TafRecord {
    pub station: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,

    /// `AMD` prefix present
    pub is_amended: bool,

    /// Body is `NIL` or `CNL` instead of forecast groups
    pub has_no_forecast: bool,

    /// Periods in report order
    pub periods: Vec<ForecastPeriod>,

    /// Original report text
    pub raw: String,

    pub issues: Vec<DecodeIssue>,
}

impl TafRecord {
    /// Chained (non-temporary) periods in order
    pub fn prevailing_periods(&self) -> impl Iterator<Item = &ForecastPeriod> {
        self.periods
            .iter()
            .filter(|period| period.change_type.is_chained())
    }

    /// The prevailing period in force at the given instant
    pub fn prevailing_at(&self, at: DateTime<Utc>) -> Option<&ForecastPeriod> {
        self.prevailing_periods().find(|period| period.covers(at))
    }

    /// Most restrictive category over all periods, temporary ones included
    pub fn worst_category(&self) -> FlightCategory {
        self.periods
            .iter()
            .fold(FlightCategory::Unknown, |worst, period| {
                worst.worse_of(period.category)
            })
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

// =============================================================================
// Decoded Report
// =============================================================================

/// Either kind of decoded record, as produced by batch decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum DecodedReport {
    Metar(MetarRecord),
    Taf(TafRecord),
}

impl DecodedReport {
    pub fn kind(&self) -> ReportKind {
        match self {
            DecodedReport::Metar(_) => ReportKind::Metar,
            DecodedReport::Taf(_) => ReportKind::Taf,
        }
    }

    pub fn station(&self) -> Option<&str> {
        match self {
            DecodedReport::Metar(record) => record.station.as_deref(),
            DecodedReport::Taf(record) => record.station.as_deref(),
        }
    }

    pub fn issues(&self) -> &[DecodeIssue] {
        match self {
            DecodedReport::Metar(record) => &record.issues,
            DecodedReport::Taf(record) => &record.issues,
        }
    }

    /// Observation category, or the worst forecast category for a TAF
    pub fn category(&self) -> FlightCategory {
        match self {
            DecodedReport::Metar(record) => record.category,
            DecodedReport::Taf(record) => record.worst_category(),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            DecodedReport::Metar(record) => &record.raw,
            DecodedReport::Taf(record) => &record.raw,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_raw_report_accessors() {
        let report = RawReport::metar("KATL 052253Z 12008KT");
        assert_eq!(report.kind(), ReportKind::Metar);
        assert_eq!(report.text(), "KATL 052253Z 12008KT");
        assert_eq!(RawReport::taf("x").kind(), ReportKind::Taf);
    }

    #[test]
    fn test_cloud_coverage_codes() {
        assert_eq!(CloudCoverage::from_code("BKN"), Some(CloudCoverage::Broken));
        assert_eq!(CloudCoverage::from_code("SKC"), Some(CloudCoverage::Clear));
        assert_eq!(CloudCoverage::from_code("XYZ"), None);
        assert_eq!(CloudCoverage::Overcast.code(), "OVC");
        assert!(CloudCoverage::Obscured.is_ceiling());
        assert!(!CloudCoverage::Scattered.is_ceiling());
    }

    #[test]
    fn test_ceiling_is_lowest_broken_or_overcast() {
        let clouds = vec![
            CloudLayer::new(CloudCoverage::Few, Some(800)),
            CloudLayer::new(CloudCoverage::Overcast, Some(2500)),
            CloudLayer::new(CloudCoverage::Broken, Some(1200)),
        ];
        assert_eq!(ceiling_feet(&clouds), Some(1200));
        assert_eq!(ceiling_feet(&clouds[..1]), None);
    }

    #[test]
    fn test_worse_of() {
        assert_eq!(
            FlightCategory::Vfr.worse_of(FlightCategory::Ifr),
            FlightCategory::Ifr
        );
        assert_eq!(
            FlightCategory::Lifr.worse_of(FlightCategory::Mvfr),
            FlightCategory::Lifr
        );
        assert_eq!(
            FlightCategory::Unknown.worse_of(FlightCategory::Mvfr),
            FlightCategory::Mvfr
        );
        assert_eq!(
            FlightCategory::Unknown.worse_of(FlightCategory::Unknown),
            FlightCategory::Unknown
        );
    }

    #[test]
    fn test_flight_category_serialization() {
        let json = serde_json::to_string(&FlightCategory::Mvfr).unwrap();
        assert_eq!(json, "\"MVFR\"");
        assert_eq!(FlightCategory::Lifr.to_string(), "LIFR");
    }

    #[test]
    fn test_wind_gust_factor() {
        let wind = Wind {
            direction: WindDirection::Degrees(270),
            speed_kts: 15,
            gust_kts: Some(25),
            variable_range: None,
        };
        assert_eq!(wind.gust_factor(), Some(10));
    }

    #[test]
    fn test_period_covers() {
        let from = Utc.with_ymd_and_hms(2026, 10, 5, 18, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 10, 5, 20, 0, 0).unwrap();
        let period = ForecastPeriod {
            change_type: ChangeIndicator::Initial,
            valid_from: Some(from),
            valid_to: Some(to),
            probability: None,
            wind: None,
            visibility: None,
            clouds: Vec::new(),
            category: FlightCategory::Unknown,
            residue: Vec::new(),
            raw: String::new(),
        };

        assert!(period.covers(from));
        assert!(!period.covers(to));
    }

    #[test]
    fn test_empty_metar_record() {
        let record = MetarRecord::empty("");
        assert!(record.station.is_none());
        assert_eq!(record.category, FlightCategory::Unknown);
        assert!(record.clouds.is_empty());
        assert!(!record.has_issues());
    }
}
