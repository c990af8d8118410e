//! Profiles for use in doc examples, tests, and benchmarks.

use crate::environment::EnvironmentProfile;
use chrono::NaiveDate;
use metfor::{Celsius, HectoPascal, Meters};
use optional::{none, some, Optioned};

/// Build a profile of the standard atmosphere from the surface to 15 km every 250 meters.
///
/// The air is moist near the surface and dries out with height. There is no dew point above
/// 8 km.
pub fn make_test_profile() -> EnvironmentProfile {
    const TROPOPAUSE: f64 = 11_000.0;
    const TOP: usize = 15_000;
    const DEW_POINT_TOP: f64 = 8_000.0;

    let heights: Vec<f64> = (0..=TOP).step_by(250).map(|z| z as f64).collect();

    let temperature = |z: f64| {
        if z <= TROPOPAUSE {
            15.0 - 6.5 * z / 1000.0
        } else {
            -56.5
        }
    };

    let pressure = |z: f64| {
        if z <= TROPOPAUSE {
            1013.25 * (1.0 - 0.0065 * z / 288.15).powf(5.25588)
        } else {
            let g = -metfor::g;
            226.32 * (-g * (z - TROPOPAUSE) / (287.04 * 216.65)).exp()
        }
    };

    let dew_point = |z: f64| -> Optioned<Celsius> {
        if z <= DEW_POINT_TOP {
            some(Celsius(temperature(z) - (2.0 + 3.0 * z / 1000.0)))
        } else {
            none()
        }
    };

    let valid_time = NaiveDate::from_ymd_opt(2021, 6, 22).and_then(|d| d.and_hms_opt(18, 0, 0));

    EnvironmentProfile::new()
        .with_source_description("U.S. standard atmosphere".to_owned())
        .with_valid_time(valid_time)
        .with_height_profile(heights.iter().map(|&z| some(Meters(z))).collect())
        .with_pressure_profile(heights.iter().map(|&z| some(HectoPascal(pressure(z)))).collect())
        .with_temperature_profile(heights.iter().map(|&z| some(Celsius(temperature(z)))).collect())
        .with_dew_point_profile(heights.iter().map(|&z| dew_point(z)).collect())
}
