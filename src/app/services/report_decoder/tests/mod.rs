//! Test utilities and shared fixtures for report decoder testing
//!
//! This module provides reference instants and sample report text used
//! across the component test modules.

use chrono::{DateTime, TimeZone, Utc};

mod stats_tests;
mod taf_tests;
mod tokenizer_tests;

/// Build a UTC instant for tests
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("test timestamp is valid")
}

/// Reference instant shortly after the sample reports were issued
pub fn reference_now() -> DateTime<Utc> {
    utc(2024, 3, 5, 23, 0)
}

pub const SAMPLE_METAR: &str = "KATL 052253Z 12008KT 10SM FEW250 24/12 A3008";

pub const SAMPLE_METAR_WITH_REMARKS: &str = "METAR KORD 052251Z AUTO 27015G25KT 240V300 1 1/2SM -SN BKN008 OVC015 M02/M05 A2987 RMK AO2 SLP118";

pub const SAMPLE_TAF: &str = "TAF KJFK 051730Z 0518/0624 33015KT P6SM SCT040
    FM052000 34010KT P6SM BKN025
    TEMPO 0522/0602 3SM -RA BKN012
    BECMG 0606/0608 VRB03KT 2SM BR OVC006
    PROB30 0612/0616 1/2SM FG VV002";
