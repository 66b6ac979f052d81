//! Plan assembly
//!
//! Runs the full generation pipeline in order: derive paces, partition
//! phases, resolve race windows, shape the volume curve, and expand every
//! week into sessions. The output [`Plan`] is a value; re-running with the
//! same inputs and configuration produces an identical plan.

use chrono::Duration;
use rust_decimal::Decimal;
use tracing::info;

use crate::config::PlanConfig;
use crate::error::{PlanError, Result};
use crate::models::{
    Plan, PlanParameters, PlanStatistics, RaceRef, RaceSpec, Week, WeekAdjustment,
};
use crate::pace::PaceModel;
use crate::phases::PhasePlanner;
use crate::races::RaceResolver;
use crate::scheduler::SessionScheduler;

/// Generate a complete training plan from athlete parameters.
pub fn generate_plan(params: &PlanParameters, config: &PlanConfig) -> Result<Plan> {
    config.validate()?;
    validate_parameters(params)?;

    let total_weeks = params.total_weeks();
    let paces = PaceModel::derive(&params.profile.reference, &params.goal, &config.pace)?;
    let phases = PhasePlanner::plan_phases(total_weeks, &params.goal, &config.phases)?;
    let adjustments = RaceResolver::resolve(
        &phases,
        params.start_date,
        total_weeks,
        &params.goal,
        &params.intermediate_races,
        &config.races,
    )?;
    let curve = SessionScheduler::volume_curve(
        &phases,
        &adjustments,
        &params.profile,
        &config.scheduling,
    );

    let mut weeks = Vec::with_capacity(total_weeks as usize);
    for index in 0..total_weeks {
        let week_start = params.start_date + Duration::days(i64::from(index) * 7);
        let phase = phases
            .iter()
            .find(|p| p.contains(index))
            .map(|p| p.kind)
            .ok_or_else(|| {
                PlanError::Configuration(format!("week {index} is outside every phase"))
            })?;
        let adjustment = adjustments[index as usize].clone();
        let race = race_for_week(params, adjustment.as_ref());
        let slot = curve[index as usize];

        let sessions = SessionScheduler::schedule_week(
            index,
            week_start,
            phase,
            slot.volume_km,
            adjustment.as_ref(),
            race,
            &params.profile,
            &paces,
            &config.scheduling,
        )?;

        weeks.push(Week {
            index,
            start_date: week_start,
            phase,
            target_volume_km: slot.volume_km,
            is_deload: slot.is_deload,
            adjustment,
            sessions,
        });
    }

    let stats = compute_statistics(&weeks);
    info!(
        total_weeks,
        phases = phases.len(),
        total_distance_km = %stats.total_distance_km,
        races = params.intermediate_races.len() + 1,
        "assembled training plan"
    );

    Ok(Plan {
        params: params.clone(),
        pace_set: paces,
        total_weeks,
        phases,
        weeks,
        stats,
    })
}

fn race_for_week<'a>(
    params: &'a PlanParameters,
    adjustment: Option<&WeekAdjustment>,
) -> Option<(&'a RaceSpec, RaceRef)> {
    match adjustment {
        Some(WeekAdjustment::RaceWeek { race, .. }) => match race {
            RaceRef::Goal => Some((&params.goal, RaceRef::Goal)),
            RaceRef::Intermediate(i) => params
                .intermediate_races
                .get(*i)
                .map(|spec| (spec, RaceRef::Intermediate(*i))),
        },
        _ => None,
    }
}

fn validate_parameters(params: &PlanParameters) -> Result<()> {
    if params.goal.date <= params.start_date {
        return Err(PlanError::invalid_input(
            "goal.date",
            "goal date must fall after the plan start date",
        ));
    }
    let profile = &params.profile;
    if !(1..=7).contains(&profile.sessions_per_week) {
        return Err(PlanError::invalid_input(
            "profile.sessions_per_week",
            "must be between 1 and 7",
        ));
    }
    if profile.min_weekly_volume_km <= Decimal::ZERO {
        return Err(PlanError::invalid_input(
            "profile.min_weekly_volume_km",
            "must be positive",
        ));
    }
    if profile.max_weekly_volume_km < profile.min_weekly_volume_km {
        return Err(PlanError::invalid_input(
            "profile.max_weekly_volume_km",
            "must be at least the minimum weekly volume",
        ));
    }
    if let Some(priority) = &profile.rest_day_priority {
        if priority.iter().any(|d| *d > 6) {
            return Err(PlanError::invalid_input(
                "profile.rest_day_priority",
                "day offsets must be within 0-6",
            ));
        }
    }
    // Resolves eagerly so a missing custom distance surfaces before any
    // pipeline stage runs.
    params.goal.distance_km()?;
    for race in &params.intermediate_races {
        race.distance_km()?;
    }
    Ok(())
}

/// Serialize a plan to pretty-printed JSON
pub fn export_json(plan: &Plan) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(plan)?)
}

fn compute_statistics(weeks: &[Week]) -> PlanStatistics {
    let weekly_load_km: Vec<Decimal> = weeks.iter().map(|w| w.planned_distance_km()).collect();
    let total_distance_km = weekly_load_km.iter().copied().sum();

    let mut phase_volume_km: Vec<(crate::models::PhaseKind, Decimal)> = Vec::new();
    for week in weeks {
        let load = week.planned_distance_km();
        match phase_volume_km.iter_mut().find(|(kind, _)| *kind == week.phase) {
            Some((_, volume)) => *volume += load,
            None => phase_volume_km.push((week.phase, load)),
        }
    }

    PlanStatistics {
        total_distance_km,
        phase_volume_km,
        weekly_load_km,
    }
}
