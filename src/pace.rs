//! Pace model
//!
//! Derives the full training-pace set from a single reference performance.
//! The reference time is extrapolated to the goal distance with the Riegel
//! power law `t2 = t1 * (d2/d1)^k`, and each zone pace is a fixed multiple of
//! the resulting goal-equivalent pace.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::PaceModelConfig;
use crate::error::{PlanError, Result};
use crate::models::{PaceSet, RaceSpec, ReferencePerformance};

pub struct PaceModel;

impl PaceModel {
    /// Derive the athlete's pace set for the given goal race.
    ///
    /// Fails with `InvalidInput` for non-positive reference values and with
    /// `UnsupportedExtrapolation` when the goal/reference distance ratio is
    /// outside the validated range.
    pub fn derive(
        reference: &ReferencePerformance,
        goal: &RaceSpec,
        config: &PaceModelConfig,
    ) -> Result<PaceSet> {
        if reference.distance_km <= Decimal::ZERO {
            return Err(PlanError::invalid_input(
                "reference.distance_km",
                "must be positive",
            ));
        }
        if reference.time_minutes <= Decimal::ZERO {
            return Err(PlanError::invalid_input(
                "reference.time_minutes",
                "must be positive",
            ));
        }
        let goal_distance = goal.distance_km()?;
        if goal_distance <= Decimal::ZERO {
            return Err(PlanError::invalid_input(
                "goal.distance_km",
                "must be positive",
            ));
        }

        let goal_time = Self::equivalent_time_minutes(reference, goal_distance, config)?;
        let goal_pace = (goal_time / goal_distance).round_dp(3);

        let z = &config.zone_multipliers;
        let paces = PaceSet {
            easy: (goal_pace * z.easy).round_dp(3),
            marathon: (goal_pace * z.marathon).round_dp(3),
            threshold: (goal_pace * z.threshold).round_dp(3),
            interval: (goal_pace * z.interval).round_dp(3),
            race: (goal_pace * z.race).round_dp(3),
        };

        // Multiplier ordering is validated on the config, but rounding at
        // extreme paces could still collapse adjacent zones.
        if !paces.is_strictly_ordered() {
            return Err(PlanError::Configuration(
                "derived pace zones are not strictly ordered".to_string(),
            ));
        }

        debug!(
            goal_pace = %goal_pace,
            easy = %paces.easy,
            race = %paces.race,
            "derived pace set from reference performance"
        );
        Ok(paces)
    }

    /// Riegel extrapolation of the reference time to a target distance
    pub fn equivalent_time_minutes(
        reference: &ReferencePerformance,
        target_distance_km: Decimal,
        config: &PaceModelConfig,
    ) -> Result<Decimal> {
        let ratio = (target_distance_km / reference.distance_km)
            .to_f64()
            .ok_or_else(|| {
                PlanError::invalid_input("reference.distance_km", "distance ratio overflows")
            })?;

        if ratio < config.min_distance_ratio || ratio > config.max_distance_ratio {
            return Err(PlanError::UnsupportedExtrapolation {
                ratio,
                min: config.min_distance_ratio,
                max: config.max_distance_ratio,
            });
        }

        let reference_minutes = reference.time_minutes.to_f64().ok_or_else(|| {
            PlanError::invalid_input("reference.time_minutes", "time overflows")
        })?;
        let target_minutes = reference_minutes * ratio.powf(config.riegel_exponent);

        Decimal::from_f64(target_minutes)
            .map(|t| t.round_dp(2))
            .ok_or_else(|| {
                PlanError::invalid_input("reference.time_minutes", "extrapolated time overflows")
            })
    }
}
