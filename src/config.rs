//! Parcel configuration.
//!
//! A parcel run is configured with string key/value pairs. They are parsed and checked once, here,
//! into a `ParcelConfig`, and nothing downstream ever looks at the strings again.

use crate::error::{AscentError, Result};
use metfor::{Celsius, Meters, MetersPSec, Quantity};
use std::{collections::HashMap, str::FromStr};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// The keys required to configure a parcel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ConfigKey {
    /// Length of the simulation in hours.
    Period,
    /// Time between samples in seconds.
    Timestep,
    /// Starting height of the parcel in meters.
    InitHeight,
    /// Starting vertical velocity in meters per second.
    InitVelocity,
    /// Starting temperature in Celsius.
    InitTemp,
    /// Starting dew point in Celsius.
    InitDewpoint,
}

impl ConfigKey {
    /// The key as it appears in a configuration.
    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Validated configuration for a parcel ascent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParcelConfig {
    /// Length of the simulation in hours, greater than zero.
    pub period_hours: f64,
    /// Seconds between samples, greater than zero.
    pub timestep_seconds: f64,
    /// Starting height.
    pub init_height: Meters,
    /// Starting vertical velocity.
    pub init_velocity: MetersPSec,
    /// Starting temperature.
    pub init_temperature: Celsius,
    /// Starting dew point.
    pub init_dew_point: Celsius,
}

impl ParcelConfig {
    /// Parse a configuration from a map of keys to values.
    ///
    /// Every key in `ConfigKey` must be present and hold a finite decimal number. The period and
    /// timestep must also be greater than zero. Whitespace around keys and values is ignored, as
    /// are keys that aren't in `ConfigKey`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use parcel_ascent::{AscentError, ConfigKey, ParcelConfig};
    ///
    /// let mut map: HashMap<String, String> = [
    ///     ("period", "1.0"),
    ///     ("timestep", "10"),
    ///     ("init_height", "0"),
    ///     ("init_velocity", "0.5"),
    ///     ("init_temp", "25.0"),
    ///     ("init_dewpoint", "18.0"),
    /// ]
    /// .iter()
    /// .map(|&(k, v)| (k.to_owned(), v.to_owned()))
    /// .collect();
    ///
    /// let config = ParcelConfig::from_map(&map).unwrap();
    /// assert_eq!(config.timestep_seconds, 10.0);
    ///
    /// map.remove("init_dewpoint");
    /// assert_eq!(
    ///     ParcelConfig::from_map(&map),
    ///     Err(AscentError::MissingConfigValue(ConfigKey::InitDewpoint))
    /// );
    /// ```
    pub fn from_map<S: std::hash::BuildHasher>(
        map: &HashMap<String, String, S>,
    ) -> Result<ParcelConfig> {
        Self::parse_with(|key| {
            let name = key.name();
            map.get(name)
                .or_else(|| {
                    map.iter()
                        .find(|(k, _)| k.trim() == name)
                        .map(|(_, v)| v)
                })
                .map(String::as_str)
        })
    }

    /// Parse a configuration from an iterator of key/value pairs.
    ///
    /// If a key appears more than once, the last value wins.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<ParcelConfig>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.trim().to_owned(), v.to_owned()))
            .collect();

        Self::from_map(&map)
    }

    fn parse_with<'a, F>(lookup: F) -> Result<ParcelConfig>
    where
        F: Fn(ConfigKey) -> Option<&'a str>,
    {
        let mut values = [0.0f64; 6];
        for (slot, key) in values.iter_mut().zip(ConfigKey::iter()) {
            *slot = parse_value(key, lookup(key))?;
        }

        let [period_hours, timestep_seconds, height, velocity, temperature, dew_point] = values;

        let config = ParcelConfig {
            period_hours,
            timestep_seconds,
            init_height: Meters(height),
            init_velocity: MetersPSec(velocity),
            init_temperature: Celsius(temperature),
            init_dew_point: Celsius(dew_point),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the values that have range restrictions.
    ///
    /// Configurations built by hand instead of parsed are checked here when a parcel is created.
    pub fn validate(&self) -> Result<()> {
        let finite = |key, val: f64| {
            if val.is_finite() {
                Ok(())
            } else {
                Err(AscentError::MalformedConfigValue(key))
            }
        };

        finite(ConfigKey::Period, self.period_hours)?;
        finite(ConfigKey::Timestep, self.timestep_seconds)?;
        finite(ConfigKey::InitHeight, self.init_height.unpack())?;
        finite(ConfigKey::InitVelocity, self.init_velocity.unpack())?;
        finite(ConfigKey::InitTemp, self.init_temperature.unpack())?;
        finite(ConfigKey::InitDewpoint, self.init_dew_point.unpack())?;

        if self.period_hours <= 0.0 {
            return Err(AscentError::ConfigValueOutOfRange(ConfigKey::Period));
        }

        if self.timestep_seconds <= 0.0 {
            return Err(AscentError::ConfigValueOutOfRange(ConfigKey::Timestep));
        }

        Ok(())
    }
}

fn parse_value(key: ConfigKey, value: Option<&str>) -> Result<f64> {
    let value = value.ok_or(AscentError::MissingConfigValue(key))?;

    f64::from_str(value.trim())
        .ok()
        .filter(|val| val.is_finite())
        .ok_or(AscentError::MalformedConfigValue(key))
}
