//! Pair scoring (§4.9): two functions sharing the same sign convention
//! (larger is better), both rendering the ILP objective as a maximisation.

/// `cost(current_schedule) - cost(inserted_schedule)`, used directly by GI
/// and as the delay term inside the count-biased score. Non-positive for a
/// valid insertion: a schedule cannot get cheaper by adding a stop.
pub fn increased_delay_score(current_cost_ms: u64, inserted_cost_ms: u64) -> f64 {
    current_cost_ms as f64 - inserted_cost_ms as f64
}

/// `R` such that serving one more order always outweighs any delay
/// difference: `R = 10^ceil(log10(max|increased_delay|))`. Falls back to 1.0
/// when every delay in the pool is zero (nothing to scale against).
pub fn delay_scale(max_abs_increased_delay_ms: f64) -> f64 {
    if max_abs_increased_delay_ms <= 0.0 {
        return 1.0;
    }
    10f64.powf(max_abs_increased_delay_ms.log10().ceil())
}

/// `score := R * trip_size + increased_delay / 1000`, used by SBA/OSP before
/// the ILP solve. `trip_size = 0` for the "keep current schedule" empty pair.
pub fn count_biased_score(trip_size: usize, increased_delay_ms: f64, scale: f64) -> f64 {
    scale * trip_size as f64 + increased_delay_ms / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increased_delay_score_is_nonpositive_for_a_worse_schedule() {
        assert_eq!(increased_delay_score(0, 30_000), -30_000.0);
        assert_eq!(increased_delay_score(60_000, 60_000), 0.0);
    }

    #[test]
    fn delay_scale_dominates_any_single_delay_in_the_pool() {
        let scale = delay_scale(45_000.0);
        assert!(scale >= 45_000.0);
        // One more served order must outweigh any delay difference seen.
        let one_trip = count_biased_score(1, -45_000.0, scale);
        let zero_trip = count_biased_score(0, 0.0, scale);
        assert!(one_trip > zero_trip);
    }

    #[test]
    fn delay_scale_of_all_zero_pool_is_one() {
        assert_eq!(delay_scale(0.0), 1.0);
    }
}
