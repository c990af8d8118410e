use super::{Environment, Location};
use crate::{
    error::{AscentError, Result},
    interpolation::{bracket_height, linear_interp, log_linear_interp},
    thermo,
};
use chrono::NaiveDateTime;
use metfor::{Celsius, HectoPascal, Kelvin, Meters};
use optional::Optioned;

/// A vertical profile of the atmosphere, such as from a sounding or model output.
///
/// The profile variables are stored in parallel vectors ordered from the lowest level up. Levels
/// missing a height, pressure, or temperature are skipped during lookups. The dew point profile
/// is optional; where it is missing the air is treated as dry when calculating the virtual
/// temperature.
///
/// A profile is never modified by lookups, so one profile can be shared by many parcels.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentProfile {
    // Description of the source of the profile.
    source: Option<String>,

    // Valid time of the profile
    valid_time: Option<NaiveDateTime>,

    // Profiles
    height: Vec<Optioned<Meters>>,
    pressure: Vec<Optioned<HectoPascal>>,
    temperature: Vec<Optioned<Celsius>>,
    dew_point: Vec<Optioned<Celsius>>,
}

macro_rules! make_profile_setter {
    ($(#[$attr:meta])* => $name:tt, $inner_type:tt, $p_var:ident) => {
        $(#[$attr])*
        pub fn $name(self, profile: Vec<Optioned<$inner_type>>) -> Self {
            Self {$p_var: profile, ..self}
        }
    };
}

impl EnvironmentProfile {
    /// Create a new, empty profile. This is a proxy for default with a clearer name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use parcel_ascent::EnvironmentProfile;
    ///
    /// let env = EnvironmentProfile::new();
    /// println!("{:?}", env);
    /// ```
    #[inline]
    pub fn new() -> Self {
        EnvironmentProfile::default()
    }

    /// Add a source description to this profile.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use parcel_ascent::EnvironmentProfile;
    ///
    /// let env = EnvironmentProfile::new().with_source_description("An empty profile.".to_owned());
    /// assert_eq!(env.source_description().unwrap(), "An empty profile.");
    ///
    /// let env = env.with_source_description(None);
    /// assert!(env.source_description().is_none());
    /// ```
    #[inline]
    pub fn with_source_description<S>(mut self, desc: S) -> Self
    where
        Option<String>: From<S>,
    {
        self.source = Option::from(desc);
        self
    }

    /// Retrieve a source description for this profile.
    #[inline]
    pub fn source_description(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Builder method for the valid time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use parcel_ascent::EnvironmentProfile;
    ///
    /// let vt = NaiveDate::from_ymd_opt(2021, 6, 22)
    ///     .and_then(|d| d.and_hms_opt(0, 0, 0))
    ///     .unwrap();
    /// let env = EnvironmentProfile::new().with_valid_time(vt);
    /// assert_eq!(env.valid_time(), Some(vt));
    ///
    /// let env = env.with_valid_time(None);
    /// assert!(env.valid_time().is_none());
    /// ```
    #[inline]
    pub fn with_valid_time<T>(mut self, valid_time: T) -> Self
    where
        Option<NaiveDateTime>: From<T>,
    {
        self.valid_time = Option::from(valid_time);
        self
    }

    /// Get the valid time of the profile.
    #[inline]
    pub fn valid_time(&self) -> Option<NaiveDateTime> {
        self.valid_time
    }

    make_profile_setter!(
        /// Builder method for the height profile, in meters above sea level. Heights must
        /// increase with index.
        ///
        /// # Examples
        /// ```rust
        /// use parcel_ascent::EnvironmentProfile;
        /// use metfor::Meters;
        /// use optional::{some, Optioned};
        ///
        /// let data = vec![0.0, 500.0, 1000.0, 1500.0, 3000.0];
        /// let height_data: Vec<Optioned<Meters>> = data.into_iter()
        ///     .map(Meters)
        ///     .map(some)
        ///     .collect();
        ///
        /// let _env = EnvironmentProfile::new()
        ///     .with_height_profile(height_data);
        /// ```
        #[inline]
        => with_height_profile, Meters, height
    );

    /// Get the height profile.
    #[inline]
    pub fn height_profile(&self) -> &[Optioned<Meters>] {
        &self.height
    }

    make_profile_setter!(
        /// Builder method for the pressure profile.
        ///
        /// See `with_height_profile` for an example of usage, keeping in mind the units type may
        /// be different.
        #[inline]
        => with_pressure_profile, HectoPascal, pressure
    );

    /// Get the pressure profile.
    #[inline]
    pub fn pressure_profile(&self) -> &[Optioned<HectoPascal>] {
        &self.pressure
    }

    make_profile_setter!(
        /// Builder method for the temperature profile.
        ///
        /// See `with_height_profile` for an example of usage, keeping in mind the units type may
        /// be different.
        #[inline]
        => with_temperature_profile, Celsius, temperature
    );

    /// Get the temperature profile.
    #[inline]
    pub fn temperature_profile(&self) -> &[Optioned<Celsius>] {
        &self.temperature
    }

    make_profile_setter!(
        /// Builder method for the dew point profile.
        ///
        /// See `with_height_profile` for an example of usage, keeping in mind the units type may
        /// be different.
        #[inline]
        => with_dew_point_profile, Celsius, dew_point
    );

    /// Get the dew point profile.
    #[inline]
    pub fn dew_point_profile(&self) -> &[Optioned<Celsius>] {
        &self.dew_point
    }

    /// Get the lowest and highest height that lookups will succeed for.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metfor::Meters;
    /// # use parcel_ascent::doctest::make_test_profile;
    ///
    /// let env = make_test_profile();
    /// let (bottom, top) = env.vertical_range().unwrap();
    /// assert!(bottom < top);
    /// assert_eq!(bottom, Meters(0.0));
    /// ```
    pub fn vertical_range(&self) -> Option<(Meters, Meters)> {
        let mut heights = self
            .height
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.is_complete_level(i))
            .filter_map(|(_, h)| h.into_option());

        let bottom = heights.next()?;
        let top = heights.last()?;

        Some((bottom, top))
    }

    // Does this level have everything needed for a lookup?
    fn is_complete_level(&self, idx: usize) -> bool {
        let has = |opt: Option<bool>| opt.unwrap_or(false);

        has(self.height.get(idx).map(|h| h.is_some()))
            && has(self.pressure.get(idx).map(|p| p.is_some()))
            && has(self.temperature.get(idx).map(|t| t.is_some()))
    }

    // Get the value at a level of a profile, or fail the lookup.
    fn level_value<T>(profile: &[Optioned<T>], idx: usize) -> Result<T>
    where
        T: optional::Noned + Copy,
    {
        profile
            .get(idx)
            .and_then(|val| val.into_option())
            .ok_or(AscentError::EnvironmentLookupFailure)
    }

    fn dew_point_at(&self, location: &Location) -> Option<Celsius> {
        let sector = location.sector();
        let dp0 = self.dew_point.get(sector.lower())?.into_option()?;

        if sector.is_level() {
            return Some(dp0);
        }

        let dp1 = self.dew_point.get(sector.upper())?.into_option()?;
        let h0 = Self::level_value(&self.height, sector.lower()).ok()?;
        let h1 = Self::level_value(&self.height, sector.upper()).ok()?;

        Some(linear_interp(location.position(), h0, h1, dp0, dp1))
    }
}

impl Environment for EnvironmentProfile {
    fn locate(&self, position: Meters) -> Result<Location> {
        bracket_height(&self.height, |i| self.is_complete_level(i), position)
            .map(|sector| Location::new(position, sector))
            .ok_or(AscentError::EnvironmentLookupFailure)
    }

    fn pressure_at(&self, location: &Location) -> Result<HectoPascal> {
        let sector = location.sector();
        let p0 = Self::level_value(&self.pressure, sector.lower())?;

        if sector.is_level() {
            return Ok(p0);
        }

        let p1 = Self::level_value(&self.pressure, sector.upper())?;
        let h0 = Self::level_value(&self.height, sector.lower())?;
        let h1 = Self::level_value(&self.height, sector.upper())?;

        log_linear_interp(location.position(), h0, h1, p0, p1)
            .ok_or(AscentError::EnvironmentLookupFailure)
    }

    fn temperature_at(&self, location: &Location) -> Result<Kelvin> {
        let sector = location.sector();
        let t0 = Self::level_value(&self.temperature, sector.lower())?;

        if sector.is_level() {
            return Ok(Kelvin::from(t0));
        }

        let t1 = Self::level_value(&self.temperature, sector.upper())?;
        let h0 = Self::level_value(&self.height, sector.lower())?;
        let h1 = Self::level_value(&self.height, sector.upper())?;

        Ok(Kelvin::from(linear_interp(
            location.position(),
            h0,
            h1,
            t0,
            t1,
        )))
    }

    fn virtual_temperature_at(&self, location: &Location) -> Result<Kelvin> {
        let temperature = self.temperature_at(location)?;

        match self.dew_point_at(location) {
            Some(dew_point) => {
                let pressure = self.pressure_at(location)?;
                let mw = thermo::mixing_ratio(Kelvin::from(dew_point), pressure)?;
                thermo::virtual_temperature(temperature, mw)
            }
            None => Ok(temperature),
        }
    }
}
