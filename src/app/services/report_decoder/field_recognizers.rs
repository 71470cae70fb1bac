//! Field recognizers shared by METAR and TAF decoding
//!
//! Each recognizer inspects a single group and either decodes it into a typed
//! value or declines it. Groups are self-describing (a wind group always ends
//! in `KT`, an altimeter group is `A` plus four digits, ...), so recognition
//! does not depend on where a group appears in the report.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::models::{
    CloudCoverage, CloudLayer, ConvectiveCloud, Visibility, Wind, WindDirection,
};
use crate::constants::{ALTIMETER_DIVISOR, CLEAR_SKY_TOKENS, CLOUD_HEIGHT_UNIT_FEET, HPA_TO_INHG};

static WIND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(VRB|\d{3})(\d{2,3})(?:G(\d{2,3}))?KT$").expect("wind pattern is valid")
});

static WIND_VARIATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{3})V(\d{3})$").expect("wind variation pattern is valid"));

static VISIBILITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([PM])?(\d+(?:\.\d+)?|\d+/\d+)SM$").expect("visibility pattern is valid")
});

static VISIBILITY_PLUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\+(?:SM)?$").expect("visibility plus pattern is valid"));

static CLOUD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(FEW|SCT|BKN|OVC)(\d{3}|///)(CB|TCU)?$").expect("cloud pattern is valid")
});

static VERTICAL_VISIBILITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^VV(\d{3}|///)$").expect("vertical visibility pattern is valid"));

static TEMPERATURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(M?\d{2})/(M?\d{2})?$").expect("temperature pattern is valid")
});

static ALTIMETER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^A(\d{4})$").expect("altimeter pattern is valid"));

static QNH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Q(\d{4})$").expect("QNH pattern is valid"));

static STATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]{3}$").expect("station pattern is valid"));

static WINDOW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}/\d{4}$").expect("window pattern is valid"));

/// A recognized report group
#[derive(Debug, Clone, PartialEq)]
pub enum FieldGroup {
    Wind(Wind),
    /// `dddVddd` direction range
    WindVariation(u16, u16),
    Visibility(Visibility),
    CloudLayer(CloudLayer),
    /// `CLR`/`SKC`/`NSC`/`NCD`: consumed, produces no layer
    ClearSky,
    TemperatureDewpoint {
        temperature: i32,
        dewpoint: Option<i32>,
    },
    /// Inches of mercury from an `Annnn` group
    Altimeter(f64),
    /// Inches of mercury converted from a `Qnnnn` group
    AltimeterFromHpa(f64),
}

/// ICAO location indicator: four characters, leading letter
pub fn is_station_identifier(token: &str) -> bool {
    STATION_RE.is_match(token)
}

/// Whether a group has the shape of a `ddhhmmZ` time group, valid or not
///
/// Used to tell a malformed time group (`3260Z`, `991200Z`) from a group of a
/// different kind, so the former can be reported as an invalid time field.
pub fn is_time_group_shape(token: &str) -> bool {
    match token.strip_suffix('Z') {
        Some(digits) => {
            (4..=7).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// `ddhh/ddhh` validity window group
pub fn is_window_group(token: &str) -> bool {
    WINDOW_RE.is_match(token)
}

/// Try every recognizer against one group
pub fn recognize(token: &str) -> Option<FieldGroup> {
    if let Some(wind) = recognize_wind(token) {
        return Some(FieldGroup::Wind(wind));
    }
    if let Some((from, to)) = recognize_wind_variation(token) {
        return Some(FieldGroup::WindVariation(from, to));
    }
    if let Some(visibility) = recognize_visibility(token) {
        return Some(FieldGroup::Visibility(visibility));
    }
    if is_clear_sky(token) {
        return Some(FieldGroup::ClearSky);
    }
    if let Some(layer) = recognize_cloud_layer(token) {
        return Some(FieldGroup::CloudLayer(layer));
    }
    if let Some((temperature, dewpoint)) = recognize_temperature(token) {
        return Some(FieldGroup::TemperatureDewpoint {
            temperature,
            dewpoint,
        });
    }
    if let Some(inches) = recognize_altimeter(token) {
        return Some(FieldGroup::Altimeter(inches));
    }
    recognize_qnh(token).map(FieldGroup::AltimeterFromHpa)
}

/// Wind group: `dddssKT`, `dddssGggKT`, `VRBssKT`
pub fn recognize_wind(token: &str) -> Option<Wind> {
    let caps = WIND_RE.captures(token)?;

    let speed_kts = caps[2].parse::<u32>().ok()?;
    let gust_kts = match caps.get(3) {
        Some(gust) => Some(gust.as_str().parse::<u32>().ok()?),
        None => None,
    };

    let direction = match &caps[1] {
        "VRB" => WindDirection::Variable,
        degrees => {
            let degrees = degrees.parse::<u16>().ok()?;
            if degrees > 360 {
                return None;
            }
            if degrees == 0 && speed_kts == 0 && gust_kts.is_none() {
                WindDirection::Calm
            } else {
                WindDirection::Degrees(degrees)
            }
        }
    };

    Some(Wind {
        direction,
        speed_kts,
        gust_kts,
        variable_range: None,
    })
}

/// Variable wind direction range: `dddVddd`
pub fn recognize_wind_variation(token: &str) -> Option<(u16, u16)> {
    let caps = WIND_VARIATION_RE.captures(token)?;
    let from = caps[1].parse::<u16>().ok()?;
    let to = caps[2].parse::<u16>().ok()?;
    if from > 360 || to > 360 {
        return None;
    }
    Some((from, to))
}

/// Visibility group in statute miles: `10SM`, `2.5SM`, `1/2SM`, `P6SM`, `M1/4SM`, `10+`
pub fn recognize_visibility(token: &str) -> Option<Visibility> {
    if let Some(caps) = VISIBILITY_PLUS_RE.captures(token) {
        let miles = caps[1].parse::<f64>().ok()?;
        return Some(Visibility::at_least(miles));
    }

    let caps = VISIBILITY_RE.captures(token)?;
    let statute_miles = parse_miles(&caps[2])?;
    let qualifier = caps.get(1).map(|m| m.as_str());

    Some(Visibility {
        statute_miles,
        is_at_least: qualifier == Some("P"),
        is_less_than: qualifier == Some("M"),
    })
}

/// Whole-mile group that may precede a fraction, as in `1 1/2SM`
pub fn is_whole_miles(token: &str) -> bool {
    token.len() == 1 && token.bytes().all(|b| b.is_ascii_digit()) && token != "0"
}

/// Visibility written across two groups: whole miles then a fraction
pub fn recognize_split_visibility(whole: &str, fraction: &str) -> Option<Visibility> {
    if !is_whole_miles(whole) || !fraction.contains('/') {
        return None;
    }
    let part = recognize_visibility(fraction)?;
    if part.is_at_least || part.is_less_than {
        return None;
    }
    let whole = whole.parse::<f64>().ok()?;
    Some(Visibility::miles(whole + part.statute_miles))
}

fn parse_miles(value: &str) -> Option<f64> {
    match value.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator = numerator.parse::<f64>().ok()?;
            let denominator = denominator.parse::<f64>().ok()?;
            if denominator == 0.0 {
                None
            } else {
                Some(numerator / denominator)
            }
        }
        None => value.parse::<f64>().ok(),
    }
}

/// Sky clear groups that are consumed without producing a layer
pub fn is_clear_sky(token: &str) -> bool {
    CLEAR_SKY_TOKENS.contains(&token)
}

/// Cloud layer group: `FEW250`, `BKN004`, `OVC010CB`, `SCT///`, `VV002`
pub fn recognize_cloud_layer(token: &str) -> Option<CloudLayer> {
    if let Some(caps) = CLOUD_RE.captures(token) {
        let coverage = CloudCoverage::from_code(&caps[1])?;
        let convective = caps.get(3).map(|m| match m.as_str() {
            "CB" => ConvectiveCloud::Cb,
            _ => ConvectiveCloud::Tcu,
        });
        return Some(CloudLayer {
            coverage,
            base_feet_agl: parse_height(&caps[2]),
            convective,
        });
    }

    let caps = VERTICAL_VISIBILITY_RE.captures(token)?;
    Some(CloudLayer::new(
        CloudCoverage::Obscured,
        parse_height(&caps[1]),
    ))
}

fn parse_height(hundreds: &str) -> Option<u32> {
    hundreds
        .parse::<u32>()
        .ok()
        .map(|h| h * CLOUD_HEIGHT_UNIT_FEET)
}

/// Temperature/dewpoint group: `24/12`, `M05/M12`, `02/`
pub fn recognize_temperature(token: &str) -> Option<(i32, Option<i32>)> {
    let caps = TEMPERATURE_RE.captures(token)?;
    let temperature = parse_celsius(&caps[1])?;
    let dewpoint = match caps.get(2) {
        Some(dew) => Some(parse_celsius(dew.as_str())?),
        None => None,
    };
    Some((temperature, dewpoint))
}

fn parse_celsius(value: &str) -> Option<i32> {
    match value.strip_prefix('M') {
        Some(digits) => digits.parse::<i32>().ok().map(|v| -v),
        None => value.parse::<i32>().ok(),
    }
}

/// Altimeter group `Annnn` in inches of mercury
pub fn recognize_altimeter(token: &str) -> Option<f64> {
    let caps = ALTIMETER_RE.captures(token)?;
    let hundredths = caps[1].parse::<u32>().ok()?;
    Some(f64::from(hundredths) / ALTIMETER_DIVISOR)
}

/// QNH group `Qnnnn` in hectopascals, converted to inches of mercury
pub fn recognize_qnh(token: &str) -> Option<f64> {
    let caps = QNH_RE.captures(token)?;
    let hpa = caps[1].parse::<u32>().ok()?;
    Some(round_hundredths(f64::from(hpa) * HPA_TO_INHG))
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
