//! Race insertion resolver
//!
//! Folds intermediate races into the planned phase timeline as per-week
//! volume annotations: a short taper window before each race, the race week
//! itself, and a recovery window after it. Windows never change the week
//! count of the enclosing phase; they only scale its volume and cap its
//! intensity, and the scheduler consumes them when laying out sessions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::RaceWindowConfig;
use crate::error::{PlanError, Result};
use crate::models::{Phase, PhaseKind, RaceRef, RaceSpec, WeekAdjustment};

pub struct RaceResolver;

impl RaceResolver {
    /// Compute the per-week adjustment table for the whole plan. The returned
    /// vector has one entry per week; `None` means the week is unadjusted.
    pub fn resolve(
        phases: &[Phase],
        start_date: NaiveDate,
        total_weeks: u32,
        goal: &RaceSpec,
        races: &[RaceSpec],
        config: &RaceWindowConfig,
    ) -> Result<Vec<Option<WeekAdjustment>>> {
        let mut adjustments: Vec<Option<WeekAdjustment>> = vec![None; total_weeks as usize];

        // The goal week always carries its race-day session; the taper curve
        // already handles its volume, so the factor is neutral.
        let goal_week = total_weeks - 1;
        adjustments[goal_week as usize] = Some(WeekAdjustment::RaceWeek {
            race: RaceRef::Goal,
            factor: Decimal::ONE,
        });

        let goal_taper = phases
            .iter()
            .find(|p| p.kind == PhaseKind::Taper)
            .copied()
            .ok_or_else(|| {
                PlanError::Configuration("phase plan is missing a taper phase".to_string())
            })?;

        // Locate each race and its window lengths.
        let mut placed: Vec<(usize, u32, u32, u32)> = Vec::new(); // (race idx, week, taper, recovery)
        for (i, race) in races.iter().enumerate() {
            if race.date >= goal.date {
                if race.date == goal.date {
                    return Err(PlanError::RaceSchedulingConflict {
                        date: race.date,
                        reason: "coincides with the goal race".to_string(),
                    });
                }
                return Err(PlanError::invalid_input(
                    "intermediate_races",
                    "races must fall strictly before the goal date",
                ));
            }
            if race.date <= start_date {
                return Err(PlanError::invalid_input(
                    "intermediate_races",
                    "races must fall strictly after the plan start date",
                ));
            }
            if i > 0 && race.date <= races[i - 1].date {
                return Err(PlanError::invalid_input(
                    "intermediate_races",
                    "races must be in strictly chronological order",
                ));
            }

            let week = ((race.date - start_date).num_days() / 7) as u32;
            if goal_taper.contains(week) {
                return Err(PlanError::RaceSchedulingConflict {
                    date: race.date,
                    reason: "falls within the goal taper window".to_string(),
                });
            }
            if let Some(&(_, prev_week, _, _)) = placed.last() {
                if week == prev_week {
                    return Err(PlanError::RaceSchedulingConflict {
                        date: race.date,
                        reason: "another race is already scheduled in the same week".to_string(),
                    });
                }
            }

            let windows = config.windows_for(race.bucket()?);
            placed.push((i, week, windows.taper_weeks, windows.recovery_weeks));
        }

        // Two races closer than their combined recovery+taper windows shrink
        // both proportionally instead of overlapping; week count is untouched.
        for k in 1..placed.len() {
            let gap = placed[k].1 - placed[k - 1].1 - 1;
            let recovery_before = placed[k - 1].3;
            let taper_after = placed[k].2;
            let needed = recovery_before + taper_after;
            if needed > gap {
                let shrunk_recovery = gap * recovery_before / needed;
                placed[k - 1].3 = shrunk_recovery;
                placed[k].2 = gap - shrunk_recovery;
                debug!(
                    race = placed[k].0,
                    gap, "shortened adjacent race windows to fit"
                );
            }
        }

        for &(i, week, taper_weeks, recovery_weeks) in &placed {
            let taper_start = week.saturating_sub(taper_weeks);
            for w in taper_start..week {
                if adjustments[w as usize].is_none() {
                    adjustments[w as usize] = Some(WeekAdjustment::PreRaceTaper {
                        race: i,
                        factor: config.pre_race_taper_factor,
                    });
                }
            }

            adjustments[week as usize] = Some(WeekAdjustment::RaceWeek {
                race: RaceRef::Intermediate(i),
                factor: config.race_week_factor,
            });

            // Recovery never spills into the goal taper; its descent already
            // reduces volume there.
            let recovery_end = (week + recovery_weeks)
                .min(total_weeks - 1)
                .min(goal_taper.start_week.saturating_sub(1));
            for w in (week + 1)..=recovery_end {
                if adjustments[w as usize].is_none() {
                    adjustments[w as usize] = Some(WeekAdjustment::PostRaceRecovery {
                        race: i,
                        factor: config.recovery_factor,
                    });
                }
            }
        }

        Ok(adjustments)
    }
}
