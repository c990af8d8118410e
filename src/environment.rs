//! The atmosphere a parcel rises through.
//!
//! A parcel never owns its environment, it only asks questions of it. Every question is asked at
//! a `Location`, which is a position plus the `Sector` of the environment that position falls in.
//! Getting a `Location` from a height is always done by the environment itself through
//! `Environment::locate`, so the order "set the position, work out the sector, then query" can
//! not be skipped.

use crate::error::Result;
use metfor::{HectoPascal, Kelvin, Meters};

pub use self::profile::EnvironmentProfile;

mod profile;

/// The pair of levels bracketing a location in an environment.
///
/// When a location sits exactly on a level, `lower` and `upper` are the same.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Sector {
    lower: usize,
    upper: usize,
}

impl Sector {
    /// Create a new sector from the index of the level at or below and at or above a location.
    #[inline]
    pub fn new(lower: usize, upper: usize) -> Self {
        debug_assert!(lower <= upper);
        Sector { lower, upper }
    }

    /// Index of the level at or below.
    #[inline]
    pub fn lower(&self) -> usize {
        self.lower
    }

    /// Index of the level at or above.
    #[inline]
    pub fn upper(&self) -> usize {
        self.upper
    }

    /// Does this sector sit exactly on a single level?
    #[inline]
    pub fn is_level(&self) -> bool {
        self.lower == self.upper
    }
}

/// A position in an environment along with the sector it falls in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    position: Meters,
    sector: Sector,
}

impl Location {
    /// Create a location. Normally this is done by `Environment::locate`.
    #[inline]
    pub fn new(position: Meters, sector: Sector) -> Self {
        Location { position, sector }
    }

    /// The height of this location.
    #[inline]
    pub fn position(&self) -> Meters {
        self.position
    }

    /// The sector of the environment this location is in.
    #[inline]
    pub fn sector(&self) -> Sector {
        self.sector
    }
}

/// Lookups a parcel needs from the atmosphere around it.
///
/// Implementations must not have side effects visible to the parcel, and should be cheap since
/// they are queried at every step of an ascent. An environment shared by many parcels on many
/// threads must also be `Sync`.
pub trait Environment {
    /// Find the sector for a height.
    ///
    /// Fails with `AscentError::EnvironmentLookupFailure` if the environment has no data there.
    fn locate(&self, position: Meters) -> Result<Location>;

    /// Ambient pressure at a location.
    fn pressure_at(&self, location: &Location) -> Result<HectoPascal>;

    /// Ambient temperature at a location.
    fn temperature_at(&self, location: &Location) -> Result<Kelvin>;

    /// Ambient virtual temperature at a location.
    ///
    /// The default assumes dry air and returns the temperature.
    fn virtual_temperature_at(&self, location: &Location) -> Result<Kelvin> {
        self.temperature_at(location)
    }
}
