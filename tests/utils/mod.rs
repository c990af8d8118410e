use parcel_ascent::ParcelConfig;

pub mod ascent_tests;

#[allow(unused_macros)] // False alarm
macro_rules! test_ascent {
    ($test_mod_name:ident, $pairs:expr) => {
        mod $test_mod_name {
            use crate::utils::{self, ascent_tests};
            use parcel_ascent::{doctest::make_test_profile, EnvironmentProfile, ParcelConfig};

            fn load_data() -> (ParcelConfig, EnvironmentProfile) {
                (utils::make_config($pairs), make_test_profile())
            }

            #[test]
            fn buffers() {
                let (config, env) = load_data();
                ascent_tests::test_buffers(&config, &env);
            }

            #[test]
            fn initial_state() {
                let (config, env) = load_data();
                ascent_tests::test_initial_state(&config, &env);
            }

            #[test]
            fn kinematics() {
                let (config, env) = load_data();
                ascent_tests::test_kinematics(&config, &env);
            }

            #[test]
            fn pressure_follows_environment() {
                let (config, env) = load_data();
                ascent_tests::test_pressure_follows_environment(&config, &env);
            }

            #[test]
            fn moisture() {
                let (config, env) = load_data();
                ascent_tests::test_moisture(&config, &env);
            }

            #[test]
            fn step_matches_ascend() {
                let (config, env) = load_data();
                ascent_tests::test_step_matches_ascend(&config, &env);
            }

            #[test]
            fn valid_times() {
                let (config, env) = load_data();
                ascent_tests::test_valid_times(&config, &env);
            }
        }
    };
}

pub fn make_config(pairs: &[(&str, &str)]) -> ParcelConfig {
    ParcelConfig::from_pairs(pairs.iter().cloned()).unwrap()
}

pub fn approx_equal(val1: f64, val2: f64, eps: f64) -> bool {
    assert!(eps > 0.0);

    (val1 - val2).abs() < eps
}
