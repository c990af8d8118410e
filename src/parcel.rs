//! The time series of a parcel's ascent.
//!
//! A `Parcel` is built from a `ParcelConfig` and an `Environment` in three phases: derive the
//! time constants, allocate the buffers for the whole period, then seed the first sample from the
//! configuration and the environment. After that it is advanced one time step at a time with
//! `Parcel::step`, or all the way to the end of the period with `Parcel::ascend`.

use crate::{
    config::ParcelConfig,
    environment::{Environment, Location},
    error::{AscentError, Result},
    thermo,
    utility::allocate_buffer,
};
use chrono::{Duration, NaiveDateTime};
use metfor::{HectoPascal, Kelvin, Meters, MetersPSec, Quantity};
use std::collections::HashMap;
use tracing::{debug, trace};

pub(crate) mod integrate;

use self::integrate::TimeStep;

/// The state of a parcel at a single point in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParcelState {
    /// Seconds since the start of the ascent.
    pub elapsed: f64,
    /// Height
    pub position: Meters,
    /// Vertical velocity, positive up.
    pub velocity: MetersPSec,
    /// Pressure
    pub pressure: HectoPascal,
    /// Temperature
    pub temperature: Kelvin,
    /// Virtual temperature
    pub temperature_virtual: Kelvin,
    /// Water vapor mixing ratio in kg/kg
    pub mixing_ratio: f64,
    /// Saturation mixing ratio in kg/kg
    pub mixing_ratio_saturated: f64,
}

/// A parcel and the time series of its ascent.
///
/// Every series has room for `ascent_steps()` samples, sample `i` being `i * time_delta()`
/// seconds after the start. Only the samples computed so far are visible through the getters.
#[derive(Clone, Debug)]
pub struct Parcel {
    time_delta: f64,
    time_delta_squared: f64,
    ascent_steps: usize,

    position: Vec<Meters>,
    velocity: Vec<MetersPSec>,
    pressure: Vec<HectoPascal>,
    temperature: Vec<Kelvin>,
    temperature_virtual: Vec<Kelvin>,
    mixing_ratio: Vec<f64>,
    mixing_ratio_saturated: Vec<f64>,

    current_location: Location,
    // Number of samples written so far.
    filled: usize,
}

impl Parcel {
    /// Create a parcel and seed the first sample.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{Celsius, Meters, MetersPSec};
    /// use parcel_ascent::{Parcel, ParcelConfig};
    /// # use parcel_ascent::doctest::make_test_profile;
    ///
    /// let env = make_test_profile();
    /// let config = ParcelConfig {
    ///     period_hours: 1.0,
    ///     timestep_seconds: 60.0,
    ///     init_height: Meters(0.0),
    ///     init_velocity: MetersPSec(0.0),
    ///     init_temperature: Celsius(25.0),
    ///     init_dew_point: Celsius(15.0),
    /// };
    ///
    /// let parcel = Parcel::new(&config, &env).unwrap();
    /// assert_eq!(parcel.ascent_steps(), 61);
    /// assert_eq!(parcel.filled(), 1);
    /// ```
    pub fn new<E>(config: &ParcelConfig, env: &E) -> Result<Parcel>
    where
        E: Environment + ?Sized,
    {
        config.validate()?;

        //
        // Derive constants
        //
        let time_delta = config.timestep_seconds;
        let time_delta_squared = time_delta * time_delta;
        let ascent_steps = count_ascent_steps(config.period_hours, time_delta)?;

        //
        // Allocate buffers
        //
        let mut position = allocate_buffer(ascent_steps, Meters(0.0))?;
        let mut velocity = allocate_buffer(ascent_steps, MetersPSec(0.0))?;
        let mut pressure = allocate_buffer(ascent_steps, HectoPascal(0.0))?;
        let mut temperature = allocate_buffer(ascent_steps, Kelvin(0.0))?;
        let mut temperature_virtual = allocate_buffer(ascent_steps, Kelvin(0.0))?;
        let mut mixing_ratio = allocate_buffer(ascent_steps, 0.0)?;
        let mut mixing_ratio_saturated = allocate_buffer(ascent_steps, 0.0)?;

        //
        // Seed the initial conditions, converting to Kelvin
        //
        position[0] = config.init_height;
        velocity[0] = config.init_velocity;
        temperature[0] = Kelvin::from(config.init_temperature);

        let current_location = env.locate(position[0])?;
        pressure[0] = env.pressure_at(&current_location)?;

        mixing_ratio[0] = thermo::mixing_ratio(Kelvin::from(config.init_dew_point), pressure[0])?;
        temperature_virtual[0] = thermo::virtual_temperature(temperature[0], mixing_ratio[0])?;
        mixing_ratio_saturated[0] = thermo::mixing_ratio(temperature[0], pressure[0])?;

        debug!(
            ascent_steps,
            time_delta,
            height = position[0].unpack(),
            pressure = pressure[0].unpack(),
            "parcel initialized"
        );

        Ok(Parcel {
            time_delta,
            time_delta_squared,
            ascent_steps,
            position,
            velocity,
            pressure,
            temperature,
            temperature_virtual,
            mixing_ratio,
            mixing_ratio_saturated,
            current_location,
            filled: 1,
        })
    }

    /// Parse the configuration from a map of key/value strings and create a parcel.
    ///
    /// The whole configuration is parsed before anything else is done, so a bad configuration
    /// never allocates buffers or queries the environment.
    pub fn from_map<E, S>(map: &HashMap<String, String, S>, env: &E) -> Result<Parcel>
    where
        E: Environment + ?Sized,
        S: std::hash::BuildHasher,
    {
        let config = ParcelConfig::from_map(map)?;
        Self::new(&config, env)
    }

    /// Compute the next sample.
    ///
    /// Returns `Ok(false)` without doing anything if every sample has already been computed. If
    /// there is an error, the parcel is left as it was.
    pub fn step<E>(&mut self, env: &E) -> Result<bool>
    where
        E: Environment + ?Sized,
    {
        if self.is_complete() {
            return Ok(false);
        }

        let idx = self.filled;
        let prev = self.sample(idx - 1);
        let time_step = TimeStep {
            dt: self.time_delta,
            dt2: self.time_delta_squared,
        };

        let (next, location) = integrate::advance(&prev, &self.current_location, time_step, env)
            .map_err(|err| {
                debug!(step = idx, error = %err, "parcel step failed");
                err
            })?;

        self.position[idx] = next.position;
        self.velocity[idx] = next.velocity;
        self.pressure[idx] = next.pressure;
        self.temperature[idx] = next.temperature;
        self.temperature_virtual[idx] = next.temperature_virtual;
        self.mixing_ratio[idx] = next.mixing_ratio;
        self.mixing_ratio_saturated[idx] = next.mixing_ratio_saturated;
        self.current_location = location;
        self.filled += 1;

        trace!(
            step = idx,
            height = next.position.unpack(),
            velocity = next.velocity.unpack(),
            temperature = next.temperature.unpack(),
            "parcel step"
        );

        Ok(true)
    }

    /// Step until every sample has been computed.
    pub fn ascend<E>(&mut self, env: &E) -> Result<()>
    where
        E: Environment + ?Sized,
    {
        self.ascend_while(env, |_| true)
    }

    /// Step until every sample has been computed, or until `keep_going` returns false for the
    /// most recent sample.
    ///
    /// The remaining samples are left uncomputed, they can still be filled in later with `step`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::{Celsius, Meters, MetersPSec};
    /// use parcel_ascent::{Parcel, ParcelConfig};
    /// # use parcel_ascent::doctest::make_test_profile;
    ///
    /// let env = make_test_profile();
    /// let config = ParcelConfig {
    ///     period_hours: 1.0,
    ///     timestep_seconds: 10.0,
    ///     init_height: Meters(0.0),
    ///     init_velocity: MetersPSec(0.0),
    ///     init_temperature: Celsius(25.0),
    ///     init_dew_point: Celsius(15.0),
    /// };
    ///
    /// let mut parcel = Parcel::new(&config, &env).unwrap();
    /// parcel.ascend_while(&env, |state| state.position < Meters(1000.0)).unwrap();
    ///
    /// assert!(!parcel.is_complete());
    /// assert!(*parcel.position().last().unwrap() >= Meters(1000.0));
    /// ```
    pub fn ascend_while<E, F>(&mut self, env: &E, mut keep_going: F) -> Result<()>
    where
        E: Environment + ?Sized,
        F: FnMut(&ParcelState) -> bool,
    {
        while keep_going(&self.sample(self.filled - 1)) && self.step(env)? {}

        debug!(
            steps = self.filled,
            complete = self.is_complete(),
            "parcel ascent stopped"
        );

        Ok(())
    }

    /// Seconds between samples.
    #[inline]
    pub fn time_delta(&self) -> f64 {
        self.time_delta
    }

    /// Square of the time between samples.
    #[inline]
    pub fn time_delta_squared(&self) -> f64 {
        self.time_delta_squared
    }

    /// Total number of samples in the period, including the initial one.
    #[inline]
    pub fn ascent_steps(&self) -> usize {
        self.ascent_steps
    }

    /// Number of samples computed so far. Never less than one.
    #[inline]
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Have all the samples been computed?
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.filled == self.ascent_steps
    }

    /// Location of the most recently computed sample.
    #[inline]
    pub fn current_location(&self) -> Location {
        self.current_location
    }

    /// Get the state at sample `idx`, if it has been computed.
    pub fn state(&self, idx: usize) -> Option<ParcelState> {
        if idx < self.filled {
            Some(self.sample(idx))
        } else {
            None
        }
    }

    /// Iterate over all the computed states in order.
    pub fn states(&self) -> impl Iterator<Item = ParcelState> + '_ {
        (0..self.filled).map(move |idx| self.sample(idx))
    }

    /// The wall clock time of sample `idx` given the time the ascent started, such as the valid
    /// time of the environment.
    ///
    /// Returns `None` if `idx` is past the end of the period.
    pub fn valid_time_at(&self, idx: usize, start: NaiveDateTime) -> Option<NaiveDateTime> {
        if idx >= self.ascent_steps {
            return None;
        }

        let millis = (idx as f64 * self.time_delta * 1000.0).round() as i64;
        start.checked_add_signed(Duration::milliseconds(millis))
    }

    /// Height of the parcel.
    #[inline]
    pub fn position(&self) -> &[Meters] {
        &self.position[..self.filled]
    }

    /// Vertical velocity of the parcel.
    #[inline]
    pub fn velocity(&self) -> &[MetersPSec] {
        &self.velocity[..self.filled]
    }

    /// Pressure of the parcel, always the same as the environment.
    #[inline]
    pub fn pressure(&self) -> &[HectoPascal] {
        &self.pressure[..self.filled]
    }

    /// Temperature of the parcel.
    #[inline]
    pub fn temperature(&self) -> &[Kelvin] {
        &self.temperature[..self.filled]
    }

    /// Virtual temperature of the parcel.
    #[inline]
    pub fn temperature_virtual(&self) -> &[Kelvin] {
        &self.temperature_virtual[..self.filled]
    }

    /// Water vapor mixing ratio of the parcel.
    #[inline]
    pub fn mixing_ratio(&self) -> &[f64] {
        &self.mixing_ratio[..self.filled]
    }

    /// Saturation mixing ratio of the parcel.
    #[inline]
    pub fn mixing_ratio_saturated(&self) -> &[f64] {
        &self.mixing_ratio_saturated[..self.filled]
    }

    // Must only be called with idx < self.filled
    fn sample(&self, idx: usize) -> ParcelState {
        debug_assert!(idx < self.filled);

        ParcelState {
            elapsed: idx as f64 * self.time_delta,
            position: self.position[idx],
            velocity: self.velocity[idx],
            pressure: self.pressure[idx],
            temperature: self.temperature[idx],
            temperature_virtual: self.temperature_virtual[idx],
            mixing_ratio: self.mixing_ratio[idx],
            mixing_ratio_saturated: self.mixing_ratio_saturated[idx],
        }
    }
}

// Number of samples in the period, including step zero.
fn count_ascent_steps(period_hours: f64, time_delta: f64) -> Result<usize> {
    let intervals = ((period_hours * 3600.0) / time_delta).floor();

    // Far more samples than could ever be stored.
    if !intervals.is_finite() || intervals >= std::usize::MAX as f64 {
        return Err(AscentError::AllocationFailure);
    }

    (intervals as usize)
        .checked_add(1)
        .ok_or(AscentError::AllocationFailure)
}
