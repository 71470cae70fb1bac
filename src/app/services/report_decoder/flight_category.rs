//! Flight category classification
//!
//! Visibility and ceiling are classified independently against the standard
//! thresholds and the more restrictive result wins.

use crate::app::models::{CloudLayer, FlightCategory, Visibility, ceiling_feet};
use crate::constants::category_thresholds::{
    IFR_CEILING_FT, IFR_VISIBILITY_SM, MVFR_CEILING_FT, MVFR_VISIBILITY_SM, VFR_CEILING_FT,
    VFR_VISIBILITY_SM,
};

/// Classify conditions from visibility and reported sky condition
///
/// `clouds` is `None` when no sky condition group was reported at all; a
/// reported sky with no ceiling layer places no restriction. Returns
/// `Unknown` only when both inputs are absent.
pub fn classify(visibility: Option<&Visibility>, clouds: Option<&[CloudLayer]>) -> FlightCategory {
    let by_visibility = visibility.map(classify_by_visibility);
    let by_ceiling = clouds.map(classify_by_ceiling);

    match (by_visibility, by_ceiling) {
        (Some(vis), Some(ceiling)) => vis.worse_of(ceiling),
        (Some(vis), None) => vis,
        (None, Some(ceiling)) => ceiling,
        (None, None) => FlightCategory::Unknown,
    }
}

/// Category from prevailing visibility alone
pub fn classify_by_visibility(visibility: &Visibility) -> FlightCategory {
    let miles = visibility.statute_miles;
    if miles >= VFR_VISIBILITY_SM {
        FlightCategory::Vfr
    } else if miles >= MVFR_VISIBILITY_SM {
        FlightCategory::Mvfr
    } else if miles >= IFR_VISIBILITY_SM {
        FlightCategory::Ifr
    } else {
        FlightCategory::Lifr
    }
}

/// Category from the ceiling (lowest Broken/Overcast/Obscured layer) alone
pub fn classify_by_ceiling(clouds: &[CloudLayer]) -> FlightCategory {
    match ceiling_feet(clouds) {
        None => FlightCategory::Vfr,
        Some(feet) if feet >= VFR_CEILING_FT => FlightCategory::Vfr,
        Some(feet) if feet >= MVFR_CEILING_FT => FlightCategory::Mvfr,
        Some(feet) if feet >= IFR_CEILING_FT => FlightCategory::Ifr,
        Some(_) => FlightCategory::Lifr,
    }
}
