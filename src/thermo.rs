//! Moist thermodynamics for a lifted parcel.
//!
//! These are pure functions. Non-physical input, a temperature at or below absolute zero or a
//! pressure that is not positive, is rejected with `AscentError::InvalidInput` instead of being
//! allowed to turn into a `NaN` or infinity further down the line.

use crate::error::{AscentError, Result};
use metfor::{Celsius, HectoPascal, Kelvin, Quantity};

/// Gas constant for dry air, J K^-1 kg^-1.
const RD: f64 = 287.04;
/// Specific heat of dry air at constant pressure, J K^-1 kg^-1.
const CPD: f64 = 1005.7;
/// Latent heat of vaporization, J kg^-1.
const LV: f64 = 2.501e6;

/// Magnitude of the acceleration due to gravity, m s^-2.
#[inline]
pub fn gravity() -> f64 {
    // metfor uses the convention that gravity points down.
    -metfor::g
}

/// Rate of cooling of an unsaturated parcel with height, K/m.
#[inline]
pub fn dry_adiabatic_lapse_rate() -> f64 {
    gravity() / CPD
}

/// Saturation vapor pressure over liquid water.
///
/// metfor only answers between -80C and 50C, outside that the Magnus formula is used directly.
pub fn saturation_vapor_pressure(temperature: Kelvin) -> Result<HectoPascal> {
    check_temperature(temperature)?;

    let t_c = Celsius::from(temperature);
    metfor::vapor_pressure_water(t_c)
        .or_else(|| Some(magnus_vapor_pressure(t_c)))
        .filter(|vp| vp.unpack().is_finite())
        .ok_or(AscentError::InvalidInput)
}

// Alduchov and Eskridge (1996) coefficients.
#[inline]
fn magnus_vapor_pressure(temperature: Celsius) -> HectoPascal {
    let t = temperature.unpack();
    HectoPascal(6.1094 * (17.625 * t / (t + 243.04)).exp())
}

/// Mixing ratio of water vapor in kg/kg.
///
/// Pass the dew point to get the actual mixing ratio, or the temperature to get the saturation
/// mixing ratio.
///
/// # Examples
///
/// ```rust
/// use metfor::{HectoPascal, Kelvin};
/// use parcel_ascent::{thermo, AscentError};
///
/// let mw = thermo::mixing_ratio(Kelvin(293.15), HectoPascal(1000.0)).unwrap();
/// assert!(mw > 0.0140 && mw < 0.0155);
///
/// assert_eq!(
///     thermo::mixing_ratio(Kelvin(293.15), HectoPascal(0.0)),
///     Err(AscentError::InvalidInput)
/// );
/// ```
pub fn mixing_ratio(temperature: Kelvin, pressure: HectoPascal) -> Result<f64> {
    check_pressure(pressure)?;
    let vp = saturation_vapor_pressure(temperature)?;

    // All of the air would be water vapor, or worse.
    if vp >= pressure {
        return Err(AscentError::InvalidInput);
    }

    let (vp, p) = (vp.unpack(), pressure.unpack());
    let mw = metfor::epsilon * vp / (p - vp);

    if mw.is_finite() {
        Ok(mw)
    } else {
        Err(AscentError::InvalidInput)
    }
}

/// Virtual temperature from the temperature and the water vapor mixing ratio (kg/kg).
pub fn virtual_temperature(temperature: Kelvin, mixing_ratio: f64) -> Result<Kelvin> {
    check_temperature(temperature)?;
    check_mixing_ratio(mixing_ratio)?;

    let eps = metfor::epsilon;
    let t = temperature.unpack();

    Ok(Kelvin(t * (mixing_ratio + eps) / (eps * (1.0 + mixing_ratio))))
}

/// Rate of cooling of a saturated parcel with height, K/m.
///
/// Pseudo-adiabatic, all condensate is assumed to fall out of the parcel immediately.
pub fn moist_adiabatic_lapse_rate(temperature: Kelvin, pressure: HectoPascal) -> Result<f64> {
    let ws = mixing_ratio(temperature, pressure)?;
    let t = temperature.unpack();

    let numerator = 1.0 + LV * ws / (RD * t);
    let denominator = CPD + LV * LV * ws * metfor::epsilon / (RD * t * t);

    Ok(gravity() * numerator / denominator)
}

/// Upward acceleration (m s^-2) of a parcel due to the virtual temperature difference between it
/// and its environment.
pub fn buoyancy(parcel_virtual_t: Kelvin, environment_virtual_t: Kelvin) -> Result<f64> {
    check_temperature(parcel_virtual_t)?;
    check_temperature(environment_virtual_t)?;

    let (tp, te) = (parcel_virtual_t.unpack(), environment_virtual_t.unpack());

    Ok(gravity() * (tp - te) / te)
}

#[inline]
fn check_temperature(temperature: Kelvin) -> Result<()> {
    let t = temperature.unpack();
    if t.is_finite() && t > 0.0 {
        Ok(())
    } else {
        Err(AscentError::InvalidInput)
    }
}

#[inline]
fn check_pressure(pressure: HectoPascal) -> Result<()> {
    let p = pressure.unpack();
    if p.is_finite() && p > 0.0 {
        Ok(())
    } else {
        Err(AscentError::InvalidInput)
    }
}

#[inline]
fn check_mixing_ratio(mw: f64) -> Result<()> {
    if mw.is_finite() && mw >= 0.0 {
        Ok(())
    } else {
        Err(AscentError::InvalidInput)
    }
}
