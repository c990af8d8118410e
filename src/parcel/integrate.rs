use super::ParcelState;
use crate::{
    environment::{Environment, Location},
    error::Result,
    thermo,
};
use metfor::{Kelvin, Meters, MetersPSec, Quantity};

/// Time step sizes used by the integrator, in seconds and seconds squared.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TimeStep {
    pub dt: f64,
    pub dt2: f64,
}

/// Compute the state one time step after `prev`.
///
/// The parcel is accelerated by its buoyancy relative to the environment at its current location,
/// assuming the acceleration is constant over the step. The new position is located in the
/// environment before any lookups are done there. Returns the new state along with its location.
pub(crate) fn advance<E>(
    prev: &ParcelState,
    location: &Location,
    step: TimeStep,
    env: &E,
) -> Result<(ParcelState, Location)>
where
    E: Environment + ?Sized,
{
    let TimeStep { dt, dt2 } = step;

    // Kinematics
    let env_virt_t = env.virtual_temperature_at(location)?;
    let accel = thermo::buoyancy(prev.temperature_virtual, env_virt_t)?;

    let z0 = prev.position.unpack();
    let w0 = prev.velocity.unpack();
    let z1 = z0 + w0 * dt + 0.5 * accel * dt2;
    let w1 = w0 + accel * dt;

    // Position, then sector, then query.
    let new_location = env.locate(Meters(z1))?;
    let pressure = env.pressure_at(&new_location)?;

    // Thermodynamics
    let dz = z1 - z0;
    let saturated = prev.mixing_ratio >= prev.mixing_ratio_saturated;
    let lapse_rate = if saturated && dz > 0.0 {
        thermo::moist_adiabatic_lapse_rate(prev.temperature, prev.pressure)?
    } else {
        thermo::dry_adiabatic_lapse_rate()
    };

    let temperature = Kelvin(prev.temperature.unpack() - lapse_rate * dz);
    let mixing_ratio_saturated = thermo::mixing_ratio(temperature, pressure)?;
    // Any vapor over saturation condenses and falls out.
    let mixing_ratio = prev.mixing_ratio.min(mixing_ratio_saturated);
    let temperature_virtual = thermo::virtual_temperature(temperature, mixing_ratio)?;

    let next = ParcelState {
        elapsed: prev.elapsed + dt,
        position: Meters(z1),
        velocity: MetersPSec(w1),
        pressure,
        temperature,
        temperature_virtual,
        mixing_ratio,
        mixing_ratio_saturated,
    };

    Ok((next, new_location))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{doctest::make_test_profile, error::AscentError, utility::test_tools::*};

    const STEP: TimeStep = TimeStep { dt: 10.0, dt2: 100.0 };

    fn state_at<E: Environment>(
        env: &E,
        z: f64,
        w: f64,
        t: f64,
        dp: f64,
    ) -> (ParcelState, Location) {
        let location = env.locate(Meters(z)).unwrap();
        let pressure = env.pressure_at(&location).unwrap();
        let temperature = Kelvin(t);
        let mixing_ratio = thermo::mixing_ratio(Kelvin(dp), pressure).unwrap();
        let mixing_ratio_saturated = thermo::mixing_ratio(temperature, pressure).unwrap();

        let state = ParcelState {
            elapsed: 0.0,
            position: Meters(z),
            velocity: MetersPSec(w),
            pressure,
            temperature,
            temperature_virtual: thermo::virtual_temperature(temperature, mixing_ratio).unwrap(),
            mixing_ratio,
            mixing_ratio_saturated,
        };

        (state, location)
    }

    #[test]
    fn test_warm_parcel_rises() {
        let env = make_test_profile();
        let (prev, loc) = state_at(&env, 0.0, 0.0, 303.15, 283.15);

        let (next, next_loc) = advance(&prev, &loc, STEP, &env).unwrap();

        assert!(next.velocity > MetersPSec(0.0));
        assert!(next.position > Meters(0.0));
        assert_eq!(next_loc.position(), next.position);
        assert!(next.pressure < prev.pressure);
        assert!(approx_equal(10.0, next.elapsed, 1.0e-12));

        // Unsaturated, so it cools dry adiabatically and keeps its moisture.
        let dz = (next.position - prev.position).unpack();
        let expected_t = prev.temperature.unpack() - thermo::dry_adiabatic_lapse_rate() * dz;
        assert!(approx_equal(expected_t, next.temperature.unpack(), 1.0e-10));
        assert!(approx_equal(prev.mixing_ratio, next.mixing_ratio, 1.0e-15));
    }

    #[test]
    fn test_kinematics_constant_acceleration() {
        let env = make_test_profile();
        let (prev, loc) = state_at(&env, 1000.0, 2.0, 290.0, 270.0);

        let env_vt = env.virtual_temperature_at(&loc).unwrap();
        let accel = thermo::buoyancy(prev.temperature_virtual, env_vt).unwrap();

        let (next, _) = advance(&prev, &loc, STEP, &env).unwrap();

        assert!(approx_equal(2.0 + accel * 10.0, next.velocity.unpack(), 1.0e-10));
        assert!(approx_equal(
            1000.0 + 2.0 * 10.0 + 0.5 * accel * 100.0,
            next.position.unpack(),
            1.0e-10
        ));
    }

    #[test]
    fn test_cold_parcel_sinks() {
        let env = make_test_profile();
        let (prev, loc) = state_at(&env, 2000.0, 0.0, 265.0, 255.0);

        let (next, _) = advance(&prev, &loc, STEP, &env).unwrap();

        assert!(next.velocity < MetersPSec(0.0));
        assert!(next.position < prev.position);
        // Warms as it sinks
        assert!(next.temperature > prev.temperature);
    }

    #[test]
    fn test_saturated_parcel_moist_lapse() {
        let env = make_test_profile();
        let (prev, loc) = state_at(&env, 500.0, 5.0, 300.0, 300.0);
        assert!(prev.mixing_ratio >= prev.mixing_ratio_saturated);

        let (next, _) = advance(&prev, &loc, STEP, &env).unwrap();
        let dz = (next.position - prev.position).unpack();
        assert!(dz > 0.0);

        let lapse = thermo::moist_adiabatic_lapse_rate(prev.temperature, prev.pressure).unwrap();
        let expected_t = prev.temperature.unpack() - lapse * dz;
        assert!(approx_equal(expected_t, next.temperature.unpack(), 1.0e-10));

        // Condensation keeps it at saturation.
        assert!(next.mixing_ratio < prev.mixing_ratio);
        assert!(approx_equal(next.mixing_ratio_saturated, next.mixing_ratio, 1.0e-15));
    }

    #[test]
    fn test_leaving_the_environment_fails() {
        let env = make_test_profile();
        let (prev, loc) = state_at(&env, 10.0, -50.0, 288.0, 280.0);

        assert_eq!(
            advance(&prev, &loc, STEP, &env).map(|_| ()),
            Err(AscentError::EnvironmentLookupFailure)
        );
    }
}
