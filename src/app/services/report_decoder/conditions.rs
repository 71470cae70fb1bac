//! Accumulation of recognized groups into a set of weather conditions
//!
//! METAR bodies and TAF forecast periods carry the same kinds of groups. Both
//! feed their tokens through [`ConditionsBuilder`], which keeps the first
//! group of each category and retains everything else verbatim.

use tracing::trace;

use super::field_recognizers::{
    FieldGroup, is_whole_miles, recognize, recognize_split_visibility,
};
use super::flight_category::classify;
use crate::app::models::{CloudLayer, FlightCategory, Visibility, Wind};

/// Weather conditions decoded from a run of report groups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,
    pub clouds: Vec<CloudLayer>,

    /// Any sky condition group (layer or clear) was present
    pub sky_reported: bool,

    pub temperature: Option<i32>,
    pub dewpoint: Option<i32>,
    pub altimeter_inhg: Option<f64>,

    /// Groups that were not decoded, in their original order
    pub residue: Vec<String>,
}

impl Conditions {
    /// No group of any kind was decoded
    pub fn is_empty(&self) -> bool {
        self.wind.is_none()
            && self.visibility.is_none()
            && !self.sky_reported
            && self.temperature.is_none()
            && self.altimeter_inhg.is_none()
    }

    /// Flight category for these conditions
    pub fn category(&self) -> FlightCategory {
        let clouds = self.sky_reported.then_some(self.clouds.as_slice());
        classify(self.visibility.as_ref(), clouds)
    }
}

/// Builder that folds report groups into [`Conditions`]
#[derive(Debug, Default)]
pub struct ConditionsBuilder {
    conditions: Conditions,
    wind_variation: Option<(u16, u16, String)>,
    altimeter_from_hpa: Option<f64>,

    /// Lone whole-mile group waiting for a possible fraction
    pending_whole: Option<String>,
}

impl ConditionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one group; unrecognized groups and repeats of a filled category go to residue
    pub fn accept(&mut self, token: &str) {
        if let Some(whole) = self.pending_whole.take() {
            if let Some(visibility) = recognize_split_visibility(&whole, token) {
                self.conditions.visibility = Some(visibility);
                return;
            }
            self.keep_residue(whole);
        }

        if self.conditions.visibility.is_none() && is_whole_miles(token) {
            self.pending_whole = Some(token.to_string());
            return;
        }

        let consumed = match recognize(token) {
            Some(FieldGroup::Wind(wind)) => fill(&mut self.conditions.wind, wind),
            Some(FieldGroup::WindVariation(from, to)) => {
                fill(&mut self.wind_variation, (from, to, token.to_string()))
            }
            Some(FieldGroup::Visibility(visibility)) => {
                fill(&mut self.conditions.visibility, visibility)
            }
            Some(FieldGroup::CloudLayer(layer)) => {
                self.conditions.clouds.push(layer);
                self.conditions.sky_reported = true;
                true
            }
            Some(FieldGroup::ClearSky) => {
                self.conditions.sky_reported = true;
                true
            }
            Some(FieldGroup::TemperatureDewpoint {
                temperature,
                dewpoint,
            }) => {
                if self.conditions.temperature.is_none() {
                    self.conditions.temperature = Some(temperature);
                    self.conditions.dewpoint = dewpoint;
                    true
                } else {
                    false
                }
            }
            Some(FieldGroup::Altimeter(inches)) => fill(&mut self.conditions.altimeter_inhg, inches),
            Some(FieldGroup::AltimeterFromHpa(inches)) => {
                fill(&mut self.altimeter_from_hpa, inches)
            }
            None => false,
        };

        if !consumed {
            self.keep_residue(token.to_string());
        }
    }

    fn keep_residue(&mut self, token: String) {
        trace!("Keeping group '{}' as residue", token);
        self.conditions.residue.push(token);
    }

    /// Offer every group of a sequence in order
    pub fn accept_all<'a>(&mut self, tokens: impl IntoIterator<Item = &'a str>) {
        for token in tokens {
            self.accept(token);
        }
    }

    pub fn build(mut self) -> Conditions {
        if let Some(whole) = self.pending_whole.take() {
            self.keep_residue(whole);
        }

        if let Some((from, to, token)) = self.wind_variation.take() {
            match self.conditions.wind.as_mut() {
                Some(wind) => wind.variable_range = Some((from, to)),
                None => self.conditions.residue.push(token),
            }
        }

        if self.conditions.altimeter_inhg.is_none() {
            self.conditions.altimeter_inhg = self.altimeter_from_hpa;
        }

        self.conditions
    }
}

/// Store `value` if the slot is empty; report whether it was stored
fn fill<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_none() {
        *slot = Some(value);
        true
    } else {
        false
    }
}

/// Decode a run of groups in one call
pub fn decode_conditions<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Conditions {
    let mut builder = ConditionsBuilder::new();
    builder.accept_all(tokens);
    builder.build()
}
