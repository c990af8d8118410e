#![warn(missing_docs)]
/*!
Simulate an air parcel rising through an atmospheric profile.

A parcel is configured by a set of key/value strings, see `ConfigKey` for the keys, and it rises
through anything that implements `Environment`. An `EnvironmentProfile` built from sounding or
model data is provided. The result is a time series of the parcel's height, vertical velocity,
pressure, temperature, virtual temperature, mixing ratio, and saturation mixing ratio.

```rust
use parcel_ascent::{Parcel, ParcelConfig};
# use parcel_ascent::doctest::make_test_profile;

let env = make_test_profile();
let config = ParcelConfig::from_pairs(vec![
    ("period", "0.25"),
    ("timestep", "30"),
    ("init_height", "1000"),
    ("init_velocity", "0"),
    ("init_temp", "9.5"),
    ("init_dewpoint", "-20"),
])
.unwrap();

let mut parcel = Parcel::new(&config, &env).unwrap();
parcel.ascend(&env).unwrap();

assert!(parcel.is_complete());
assert_eq!(parcel.position().len(), 31);
```

Logging is done with `tracing`, so install a subscriber to see it.
*/

//
// API
//
pub use crate::{
    config::{ConfigKey, ParcelConfig},
    environment::{Environment, EnvironmentProfile, Location, Sector},
    error::{AscentError, Result},
    parcel::{Parcel, ParcelState},
};

pub mod config;
pub mod environment;
pub mod parcel;
pub mod thermo;

// Only for doc tests, tests, and benchmarks.
#[doc(hidden)]
pub mod doctest;

//
// Internal use only
//
mod error;
mod interpolation;
mod utility;
