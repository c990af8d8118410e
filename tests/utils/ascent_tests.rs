use super::*;
use chrono::Duration;
use metfor::Quantity;
use parcel_ascent::{thermo, Environment, EnvironmentProfile, Parcel};

fn ascend(config: &ParcelConfig, env: &EnvironmentProfile) -> Parcel {
    let mut parcel = Parcel::new(config, env).unwrap();
    parcel.ascend(env).unwrap();
    parcel
}

pub fn test_buffers(config: &ParcelConfig, env: &EnvironmentProfile) {
    let parcel = ascend(config, env);

    let expected_steps =
        ((config.period_hours * 3600.0) / config.timestep_seconds).floor() as usize + 1;
    assert_eq!(parcel.ascent_steps(), expected_steps);
    assert!(parcel.is_complete());
    assert_eq!(parcel.filled(), expected_steps);

    assert_eq!(parcel.position().len(), expected_steps);
    assert_eq!(parcel.velocity().len(), expected_steps);
    assert_eq!(parcel.pressure().len(), expected_steps);
    assert_eq!(parcel.temperature().len(), expected_steps);
    assert_eq!(parcel.temperature_virtual().len(), expected_steps);
    assert_eq!(parcel.mixing_ratio().len(), expected_steps);
    assert_eq!(parcel.mixing_ratio_saturated().len(), expected_steps);

    for (i, state) in parcel.states().enumerate() {
        assert_eq!(Some(state), parcel.state(i));
        assert!(approx_equal(i as f64 * config.timestep_seconds, state.elapsed, 1.0e-9));
    }
    assert!(parcel.state(expected_steps).is_none());
}

pub fn test_initial_state(config: &ParcelConfig, env: &EnvironmentProfile) {
    let parcel = Parcel::new(config, env).unwrap();
    let state = parcel.state(0).unwrap();

    assert_eq!(state.position, config.init_height);
    assert_eq!(state.velocity, config.init_velocity);
    assert!(approx_equal(
        config.init_temperature.unpack() + 273.15,
        state.temperature.unpack(),
        1.0e-10
    ));

    let location = env.locate(config.init_height).unwrap();
    assert_eq!(parcel.current_location(), location);
    assert_eq!(state.pressure, env.pressure_at(&location).unwrap());

    let dew_point = metfor::Kelvin::from(config.init_dew_point);
    let mw = thermo::mixing_ratio(dew_point, state.pressure).unwrap();
    let ws = thermo::mixing_ratio(state.temperature, state.pressure).unwrap();
    let tv = thermo::virtual_temperature(state.temperature, mw).unwrap();

    assert_eq!(state.mixing_ratio, mw);
    assert_eq!(state.mixing_ratio_saturated, ws);
    assert_eq!(state.temperature_virtual, tv);
}

pub fn test_kinematics(config: &ParcelConfig, env: &EnvironmentProfile) {
    let parcel = ascend(config, env);
    let dt = parcel.time_delta();

    // Constant acceleration over each step means the displacement comes from the mean velocity.
    for (z, w) in parcel.position().windows(2).zip(parcel.velocity().windows(2)) {
        let dz = (z[1] - z[0]).unpack();
        let mean_w = 0.5 * (w[0].unpack() + w[1].unpack());
        assert!(approx_equal(mean_w * dt, dz, 1.0e-6));
    }
}

pub fn test_pressure_follows_environment(config: &ParcelConfig, env: &EnvironmentProfile) {
    let parcel = ascend(config, env);

    for (&z, &p) in parcel.position().iter().zip(parcel.pressure()) {
        let location = env.locate(z).unwrap();
        assert_eq!(p, env.pressure_at(&location).unwrap());
    }

    let last = *parcel.position().last().unwrap();
    assert_eq!(parcel.current_location().position(), last);
}

pub fn test_moisture(config: &ParcelConfig, env: &EnvironmentProfile) {
    let parcel = ascend(config, env);

    let mw = parcel.mixing_ratio();
    let ws = parcel.mixing_ratio_saturated();

    for i in 1..parcel.filled() {
        // Water only condenses out, it is never added.
        assert!(mw[i] <= mw[i - 1]);
        assert!(mw[i] <= ws[i]);
    }

    for (&t, (&tv, &w)) in parcel
        .temperature()
        .iter()
        .zip(parcel.temperature_virtual().iter().zip(mw))
    {
        assert!(tv >= t);
        assert_eq!(tv, thermo::virtual_temperature(t, w).unwrap());
    }
}

pub fn test_step_matches_ascend(config: &ParcelConfig, env: &EnvironmentProfile) {
    let ascended = ascend(config, env);

    let mut stepped = Parcel::new(config, env).unwrap();
    let mut count = 1;
    while stepped.step(env).unwrap() {
        count += 1;
    }

    assert_eq!(count, ascended.ascent_steps());
    assert!(ascended.states().eq(stepped.states()));
}

pub fn test_valid_times(config: &ParcelConfig, env: &EnvironmentProfile) {
    let parcel = Parcel::new(config, env).unwrap();
    let start = env.valid_time().unwrap();

    assert_eq!(parcel.valid_time_at(0, start), Some(start));

    let last = parcel.ascent_steps() - 1;
    let end = parcel.valid_time_at(last, start).unwrap();
    let period = Duration::seconds((config.period_hours * 3600.0) as i64);
    assert!(end <= start + period);
    assert!(end > start + period - Duration::seconds(config.timestep_seconds as i64 + 1));

    assert!(parcel.valid_time_at(last + 1, start).is_none());
}
