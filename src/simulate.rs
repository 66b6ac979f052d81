//! What-if simulation
//!
//! Applies a set of parameter overrides, re-runs the full generation
//! pipeline, and reports which weeks changed. Plans are never mutated in
//! place; a simulation run always produces a fresh plan.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::PlanConfig;
use crate::error::Result;
use crate::models::{PhaseKind, Plan, PlanParameters, RaceSpec, ReferencePerformance, Week};
use crate::plan::generate_plan;

/// Parameter overrides for a simulation run. `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanOverrides {
    pub start_date: Option<NaiveDate>,
    pub goal: Option<RaceSpec>,
    pub reference: Option<ReferencePerformance>,
    pub sessions_per_week: Option<u8>,
    pub min_weekly_volume_km: Option<Decimal>,
    pub max_weekly_volume_km: Option<Decimal>,
    pub intermediate_races: Option<Vec<RaceSpec>>,
}

impl PlanOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produce the effective parameter set for a base parameter set.
    pub fn apply(&self, base: &PlanParameters) -> PlanParameters {
        let mut params = base.clone();
        if let Some(start_date) = self.start_date {
            params.start_date = start_date;
        }
        if let Some(goal) = &self.goal {
            params.goal = goal.clone();
        }
        if let Some(reference) = &self.reference {
            params.profile.reference = reference.clone();
        }
        if let Some(sessions) = self.sessions_per_week {
            params.profile.sessions_per_week = sessions;
        }
        if let Some(min) = self.min_weekly_volume_km {
            params.profile.min_weekly_volume_km = min;
        }
        if let Some(max) = self.max_weekly_volume_km {
            params.profile.max_weekly_volume_km = max;
        }
        if let Some(races) = &self.intermediate_races {
            params.intermediate_races = races.clone();
        }
        params
    }
}

/// Generate a variant plan from base parameters plus overrides.
pub fn simulate(
    base: &PlanParameters,
    overrides: &PlanOverrides,
    config: &PlanConfig,
) -> Result<Plan> {
    let params = overrides.apply(base);
    debug!(changed = !overrides.is_empty(), "running simulation");
    generate_plan(&params, config)
}

/// Condensed view of one week used for plan comparison
#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub phase: PhaseKind,
    pub volume_km: Decimal,
    pub is_deload: bool,
    pub session_count: usize,
    pub start_date: NaiveDate,
}

impl WeekSummary {
    fn of(week: &Week) -> Self {
        Self {
            phase: week.phase,
            volume_km: week.target_volume_km,
            is_deload: week.is_deload,
            session_count: week.non_rest_session_count(),
            start_date: week.start_date,
        }
    }
}

/// One week that differs between a base plan and a variant. A `None` side
/// means that plan has no such week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekDiff {
    pub week_index: u32,
    pub base: Option<WeekSummary>,
    pub variant: Option<WeekSummary>,
}

/// Compare two plans week by week.
pub fn diff_plans(base: &Plan, variant: &Plan) -> Vec<WeekDiff> {
    let weeks = base.weeks.len().max(variant.weeks.len());
    let mut diffs = Vec::new();
    for index in 0..weeks {
        let left = base.weeks.get(index);
        let right = variant.weeks.get(index);
        let differs = match (left, right) {
            (Some(a), Some(b)) => a != b,
            _ => true,
        };
        if differs {
            diffs.push(WeekDiff {
                week_index: index as u32,
                base: left.map(WeekSummary::of),
                variant: right.map(WeekSummary::of),
            });
        }
    }
    diffs
}
