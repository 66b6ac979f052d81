//! Phase planner
//!
//! Partitions the plan window into ordered periodization phases. Phase
//! lengths come from a proportion template keyed by goal distance bucket and
//! plan length: short plans drop the peak phase, overly long plans grow the
//! base phase only, and the taper is clamped to an absolute length range for
//! the goal distance.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::PhaseConfig;
use crate::error::{PlanError, Result};
use crate::models::{Phase, PhaseKind, RaceSpec};

pub struct PhasePlanner;

impl PhasePlanner {
    /// Produce the ordered phase list covering `total_weeks` exactly, with no
    /// gaps or overlaps. The final phase is always the taper ending at the
    /// goal week.
    pub fn plan_phases(
        total_weeks: u32,
        goal: &RaceSpec,
        config: &PhaseConfig,
    ) -> Result<Vec<Phase>> {
        let bucket = goal.bucket()?;
        let required_weeks = config.lead_weeks_for(bucket);
        if total_weeks < required_weeks {
            return Err(PlanError::InsufficientTimeWindow {
                available_weeks: total_weeks,
                required_weeks,
            });
        }

        // Weeks beyond the long-plan cap extend the base phase only.
        let capped = total_weeks.min(config.long_plan_weeks);
        let extra_base = total_weeks - capped;

        let use_short_template = capped < config.short_plan_weeks;
        let taper_proportion = if use_short_template {
            config.short_plan.taper
        } else {
            config.standard.taper
        };

        let clamp = config.taper_clamp_for(bucket);
        let proportional_taper = (Decimal::from(capped) * taper_proportion)
            .round()
            .to_u32()
            .unwrap_or(clamp.min_weeks);
        // Clamp rounding remainders are absorbed by the preceding phase via
        // the loading-week split below.
        let taper_weeks = proportional_taper
            .clamp(clamp.min_weeks, clamp.max_weeks)
            .min(capped - 1);
        let loading_weeks = capped - taper_weeks;

        let mut allocation = if use_short_template {
            Self::largest_remainder(
                loading_weeks,
                &[
                    (PhaseKind::Base, config.short_plan.base),
                    (PhaseKind::Build, config.short_plan.build),
                ],
            )
        } else {
            Self::largest_remainder(
                loading_weeks,
                &[
                    (PhaseKind::Base, config.standard.base),
                    (PhaseKind::Build, config.standard.build),
                    (PhaseKind::Peak, config.standard.peak),
                ],
            )
        };
        allocation[0].1 += extra_base;
        allocation.push((PhaseKind::Taper, taper_weeks));

        let mut phases = Vec::new();
        let mut cursor = 0;
        for (kind, weeks) in allocation {
            if weeks == 0 {
                continue;
            }
            phases.push(Phase {
                kind,
                start_week: cursor,
                end_week: cursor + weeks,
            });
            cursor += weeks;
        }

        debug_assert_eq!(cursor, total_weeks);
        debug!(total_weeks, ?bucket, phase_count = phases.len(), "planned phases");
        Ok(phases)
    }

    /// Apportion `total` weeks across phases proportionally, rounding with
    /// the largest-remainder method. Ties go to the earlier phase.
    fn largest_remainder(
        total: u32,
        shares: &[(PhaseKind, Decimal)],
    ) -> Vec<(PhaseKind, u32)> {
        let sum: Decimal = shares.iter().map(|(_, p)| *p).sum();
        let mut result: Vec<(PhaseKind, u32)> = Vec::with_capacity(shares.len());
        let mut remainders: Vec<(usize, Decimal)> = Vec::with_capacity(shares.len());

        for (i, (kind, proportion)) in shares.iter().enumerate() {
            let exact = Decimal::from(total) * *proportion / sum;
            let floor = exact.floor();
            result.push((*kind, floor.to_u32().unwrap_or(0)));
            remainders.push((i, exact - floor));
        }

        let assigned: u32 = result.iter().map(|(_, w)| *w).sum();
        // Stable sort keeps the earlier phase first on equal remainders.
        remainders.sort_by(|a, b| b.1.cmp(&a.1));
        for k in 0..(total - assigned) as usize {
            let (idx, _) = remainders[k % remainders.len()];
            result[idx].1 += 1;
        }

        result
    }
}
