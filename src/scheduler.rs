//! Session scheduler
//!
//! Expands the annotated phase/week structure into concrete dated sessions.
//! The weekly volume curve ramps linearly from the athlete's minimum to
//! maximum volume across loading weeks, holds back every deload week, and
//! descends through the taper; race annotations scale it multiplicatively.
//! Each week's volume is then split across a session-type template for the
//! phase, collapsing lower-priority sessions first when the athlete trains
//! fewer days.

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::trace;

use crate::config::SchedulingConfig;
use crate::error::{PlanError, Result};
use crate::models::{
    AthleteProfile, PaceSet, PaceZone, Phase, PhaseKind, RaceRef, RaceSpec, Session, SessionType,
    WeekAdjustment,
};

/// Weekly volume target before session expansion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekVolume {
    pub volume_km: Decimal,
    pub is_deload: bool,
}

pub struct SessionScheduler;

impl SessionScheduler {
    /// Compute the adjusted volume target for every week of the plan.
    pub fn volume_curve(
        phases: &[Phase],
        adjustments: &[Option<WeekAdjustment>],
        profile: &AthleteProfile,
        config: &SchedulingConfig,
    ) -> Vec<WeekVolume> {
        let total_weeks = phases.last().map(|p| p.end_week).unwrap_or(0);
        let phase_of = |week: u32| {
            phases
                .iter()
                .find(|p| p.contains(week))
                .map(|p| p.kind)
                .unwrap_or(PhaseKind::Taper)
        };

        let loading: Vec<u32> = (0..total_weeks)
            .filter(|w| phase_of(*w) != PhaseKind::Taper)
            .collect();
        let deload_count = loading.len() as u32 / config.deload_cadence;
        let load_steps = loading.len() as u32 - deload_count;

        let min = profile.min_weekly_volume_km;
        let max = profile.max_weekly_volume_km;
        let increment = if load_steps > 1 {
            (max - min) / Decimal::from(load_steps - 1)
        } else {
            Decimal::ZERO
        };

        let mut curve = vec![
            WeekVolume {
                volume_km: min,
                is_deload: false,
            };
            total_weeks as usize
        ];

        let mut ramp = min;
        let mut last_load = min;
        for (pos, &week) in loading.iter().enumerate() {
            let is_deload = (pos as u32 + 1) % config.deload_cadence == 0;
            let volume = if is_deload {
                last_load * (Decimal::ONE - config.deload_fraction)
            } else {
                let v = ramp;
                last_load = v;
                ramp += increment;
                v
            };
            curve[week as usize] = WeekVolume {
                volume_km: volume,
                is_deload,
            };
        }

        // Taper: linear descent from the last loading volume down to a fixed
        // fraction of the minimum volume on the goal week.
        let taper: Vec<u32> = (0..total_weeks)
            .filter(|w| phase_of(*w) == PhaseKind::Taper)
            .collect();
        if !taper.is_empty() {
            let final_volume = min * config.taper_final_week_ratio;
            let step = (last_load - final_volume) / Decimal::from(taper.len() as u32);
            for (j, &week) in taper.iter().enumerate() {
                curve[week as usize] = WeekVolume {
                    volume_km: last_load - step * Decimal::from(j as u32 + 1),
                    is_deload: false,
                };
            }
        }

        for (week, slot) in curve.iter_mut().enumerate() {
            if let Some(adjustment) = adjustments.get(week).and_then(|a| a.as_ref()) {
                slot.volume_km *= adjustment.volume_factor();
            }
            slot.volume_km = slot.volume_km.round_dp(1);
        }

        curve
    }

    /// Lay out one week's sessions. `race` carries the resolved race spec
    /// when the week's adjustment is a race week.
    #[allow(clippy::too_many_arguments)]
    pub fn schedule_week(
        week_index: u32,
        week_start: NaiveDate,
        phase: PhaseKind,
        volume: Decimal,
        adjustment: Option<&WeekAdjustment>,
        race: Option<(&RaceSpec, RaceRef)>,
        profile: &AthleteProfile,
        paces: &PaceSet,
        config: &SchedulingConfig,
    ) -> Result<Vec<Session>> {
        let slots = profile.sessions_per_week;
        if !(1..=7).contains(&slots) {
            return Err(PlanError::invalid_input(
                "profile.sessions_per_week",
                "must be between 1 and 7",
            ));
        }

        let mut available = Self::training_days(slots, profile, config);
        let mut sessions: Vec<Session> = Vec::with_capacity(7);

        // Race day claims its exact date first and suppresses hard sessions
        // for the rest of the week.
        let is_race_week = if let Some((spec, race_ref)) = race {
            let offset = (spec.date - week_start).num_days();
            if !(0..7).contains(&offset) {
                return Err(PlanError::RaceSchedulingConflict {
                    date: spec.date,
                    reason: "race date is outside its scheduled week".to_string(),
                });
            }
            let distance = spec.distance_km()?;
            let zone = PaceSet::race_zone_for(spec.class);
            let pace = paces.pace_for(zone);
            let label = match race_ref {
                RaceRef::Goal => "Goal race",
                RaceRef::Intermediate(_) => "Intermediate race",
            };
            sessions.push(Self::session(
                spec.date,
                SessionType::Race,
                distance,
                Some(pace),
                Some(race_ref),
                format!("{label}: {distance} km"),
            ));
            available.retain(|d| i64::from(*d) != offset);
            if race_ref == RaceRef::Goal {
                // The plan ends at the goal race; later days stay rest days.
                available.retain(|d| i64::from(*d) < offset);
            }
            true
        } else {
            false
        };

        let recovery_week = matches!(adjustment, Some(WeekAdjustment::PostRaceRecovery { .. }));
        let quality = if is_race_week {
            None
        } else {
            Self::quality_for(phase, recovery_week)
        };

        let remaining_slots = slots as usize - usize::from(is_race_week);

        if remaining_slots == 0 {
            // Nothing besides the race; the rest of the week is recovery.
        } else if slots == 1 && !is_race_week {
            // One session a week alternates easy weeks and quality weeks,
            // never stacking quality on adjacent weeks.
            let run_quality = week_index % 2 == 1;
            let session_type = match quality {
                Some(q) if run_quality => q,
                _ => SessionType::Easy,
            };
            if let Some(day) = Self::take_day(&mut available, config.long_run_day) {
                let distance = volume.round_dp(1);
                if distance >= config.min_session_km {
                    sessions.push(Self::typed_session(
                        week_start,
                        day,
                        session_type,
                        distance,
                        phase,
                        paces,
                    ));
                }
            }
        } else {
            // Priority order: long run, quality, easy. Easy sessions are the
            // first to be collapsed when weekly slots run short.
            let long_run = !is_race_week;
            let quality_slot = quality.is_some() && remaining_slots >= 2;
            let easy_slots = remaining_slots
                .saturating_sub(usize::from(long_run))
                .saturating_sub(usize::from(quality_slot));

            let mut fraction_sum = Decimal::ZERO;
            if long_run {
                fraction_sum += config.long_run_fraction;
            }
            if quality_slot {
                fraction_sum += config.quality_fraction;
            }
            let easy_fraction =
                Decimal::ONE - config.long_run_fraction - config.quality_fraction;
            if easy_slots > 0 {
                fraction_sum += easy_fraction;
            }

            if is_race_week {
                // Keep the legs fresh: the whole remaining budget is easy.
                let share = (volume / Decimal::from(remaining_slots as u32)).round_dp(1);
                for _ in 0..remaining_slots {
                    let Some(day) = Self::take_day(&mut available, config.long_run_day) else {
                        break;
                    };
                    if share >= config.min_session_km {
                        sessions.push(Self::typed_session(
                            week_start,
                            day,
                            SessionType::Easy,
                            share,
                            phase,
                            paces,
                        ));
                    }
                }
            } else {
                if long_run {
                    let distance =
                        (volume * config.long_run_fraction / fraction_sum).round_dp(1);
                    if distance >= config.min_session_km {
                        if let Some(day) = Self::take_day(&mut available, config.long_run_day) {
                            sessions.push(Self::typed_session(
                                week_start,
                                day,
                                SessionType::LongRun,
                                distance,
                                phase,
                                paces,
                            ));
                        }
                    }
                }
                if quality_slot {
                    let quality_type = quality.unwrap_or(SessionType::Tempo);
                    let distance =
                        (volume * config.quality_fraction / fraction_sum).round_dp(1);
                    if distance >= config.min_session_km {
                        if let Some(day) = Self::take_day(&mut available, config.quality_day) {
                            sessions.push(Self::typed_session(
                                week_start,
                                day,
                                quality_type,
                                distance,
                                phase,
                                paces,
                            ));
                        }
                    }
                }
                if easy_slots > 0 {
                    let easy_total = volume * easy_fraction / fraction_sum;
                    let share = (easy_total / Decimal::from(easy_slots as u32)).round_dp(1);
                    for _ in 0..easy_slots {
                        let Some(day) = Self::take_day(&mut available, u8::MAX) else {
                            break;
                        };
                        if share >= config.min_session_km {
                            sessions.push(Self::typed_session(
                                week_start,
                                day,
                                SessionType::Easy,
                                share,
                                phase,
                                paces,
                            ));
                        }
                    }
                }
            }
        }

        // Every day without a planned session becomes a rest day.
        for day in 0..7u8 {
            let date = week_start + Duration::days(i64::from(day));
            if !sessions.iter().any(|s| s.date == date) {
                sessions.push(Session::rest(date));
            }
        }
        sessions.sort_by_key(|s| s.date);

        trace!(
            week_index,
            %volume,
            session_count = sessions.iter().filter(|s| s.session_type.counts_as_session()).count(),
            "scheduled week"
        );
        Ok(sessions)
    }

    /// Quality session type for a phase; post-race recovery weeks cap
    /// intensity at tempo.
    fn quality_for(phase: PhaseKind, recovery_week: bool) -> Option<SessionType> {
        let quality = match phase {
            PhaseKind::Base => Some(SessionType::Tempo),
            PhaseKind::Build => Some(SessionType::Threshold),
            PhaseKind::Peak => Some(SessionType::Interval),
            PhaseKind::Taper => None,
        };
        match quality {
            Some(_) if recovery_week => Some(SessionType::Tempo),
            other => other,
        }
    }

    fn zone_for(session_type: SessionType, phase: PhaseKind) -> Option<PaceZone> {
        match session_type {
            SessionType::Easy => Some(PaceZone::Easy),
            // Peak-phase long runs pick up race-specific intensity
            SessionType::LongRun if phase == PhaseKind::Peak => Some(PaceZone::Marathon),
            SessionType::LongRun => Some(PaceZone::Easy),
            SessionType::Tempo => Some(PaceZone::Marathon),
            SessionType::Threshold => Some(PaceZone::Threshold),
            SessionType::Interval => Some(PaceZone::Interval),
            SessionType::Rest | SessionType::Race => None,
        }
    }

    fn typed_session(
        week_start: NaiveDate,
        day: u8,
        session_type: SessionType,
        distance: Decimal,
        phase: PhaseKind,
        paces: &PaceSet,
    ) -> Session {
        let pace = Self::zone_for(session_type, phase).map(|z| paces.pace_for(z));
        let description = match session_type {
            SessionType::Easy => "Easy run".to_string(),
            SessionType::LongRun => format!("Long run: {distance} km"),
            SessionType::Tempo => "Tempo run".to_string(),
            SessionType::Threshold => "Threshold intervals".to_string(),
            SessionType::Interval => "Interval session".to_string(),
            _ => String::new(),
        };
        Self::session(
            week_start + Duration::days(i64::from(day)),
            session_type,
            distance,
            pace,
            None,
            description,
        )
    }

    fn session(
        date: NaiveDate,
        session_type: SessionType,
        distance: Decimal,
        pace: Option<Decimal>,
        race: Option<RaceRef>,
        description: String,
    ) -> Session {
        let duration_minutes = pace
            .map(|p| (distance * p).round().to_u32().unwrap_or(0))
            .unwrap_or(0);
        Session {
            date,
            session_type,
            distance_km: distance,
            duration_minutes,
            target_pace: pace,
            race,
            description,
        }
    }

    /// Training-day offsets for the week, rest days removed in priority order
    fn training_days(
        slots: u8,
        profile: &AthleteProfile,
        config: &SchedulingConfig,
    ) -> Vec<u8> {
        let rest_count = 7 - slots as usize;
        let priority = profile
            .rest_day_priority
            .as_deref()
            .unwrap_or(&config.rest_day_priority);

        let mut rest: Vec<u8> = Vec::with_capacity(rest_count);
        for &day in priority {
            if rest.len() < rest_count && day < 7 && !rest.contains(&day) {
                rest.push(day);
            }
        }
        // Fill remaining rest days from the front of the week, protecting the
        // long-run and quality days as long as possible.
        for day in 0..7u8 {
            if rest.len() >= rest_count {
                break;
            }
            if day == config.long_run_day || day == config.quality_day || rest.contains(&day) {
                continue;
            }
            rest.push(day);
        }
        for day in 0..7u8 {
            if rest.len() >= rest_count {
                break;
            }
            if !rest.contains(&day) {
                rest.push(day);
            }
        }

        (0..7u8).filter(|d| !rest.contains(d)).collect()
    }

    /// Take the preferred day if still free, otherwise the earliest free day
    fn take_day(available: &mut Vec<u8>, preferred: u8) -> Option<u8> {
        let idx = available
            .iter()
            .position(|d| *d == preferred)
            .unwrap_or(0);
        if available.is_empty() {
            return None;
        }
        Some(available.remove(idx))
    }
}
