//! Property-based tests for the limiter family.

use proptest::prelude::*;
use trama_core::db_to_linear;
use trama_safety::limiter;

proptest! {
    /// After a hard limit at `limit_db`, every sample's magnitude is at or
    /// below the linear limit.
    #[test]
    fn hard_limit_postcondition(
        mut audio in proptest::collection::vec(-10.0f32..10.0, 1..256),
        limit_db in -24.0f32..0.0,
    ) {
        limiter::hard_limit(&mut audio, limit_db);
        let bound = db_to_linear(f64::from(limit_db)) as f32;
        for &sample in &audio {
            prop_assert!(sample.abs() <= bound + 1e-6);
        }
    }

    /// Uniform peak limiting never raises the peak and preserves sign.
    #[test]
    fn limit_true_peak_postcondition(
        audio in proptest::collection::vec(-4.0f32..4.0, 1..256),
        limit_db in -12.0f32..0.0,
    ) {
        let mut limited = audio.clone();
        limiter::limit_true_peak(&mut limited, limit_db);
        let bound = db_to_linear(f64::from(limit_db)) as f32;
        prop_assert!(limiter::true_peak(&limited) <= bound + 1e-5);
        for (before, after) in audio.iter().zip(&limited) {
            prop_assert!(before.signum() == after.signum() || *after == 0.0);
        }
    }

    /// Soft limiting never increases a sample's magnitude.
    #[test]
    fn soft_limit_is_contractive(
        audio in proptest::collection::vec(-4.0f32..4.0, 1..256),
    ) {
        let mut limited = audio.clone();
        limiter::soft_limit(&mut limited, -3.0, 4.0);
        for (before, after) in audio.iter().zip(&limited) {
            prop_assert!(after.abs() <= before.abs() + 1e-6);
        }
    }
}
