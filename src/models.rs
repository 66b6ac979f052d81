//! Core data model for plan generation
//!
//! A generated [`Plan`] owns its weeks, which own their sessions; phases are
//! index ranges over weeks rather than owning structures. Every type here is
//! an immutable value after generation: simulation re-runs the pipeline and
//! never mutates an existing plan.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Race distance classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceClass {
    TenK,
    HalfMarathon,
    Marathon,
    /// Non-standard distance; requires an explicit distance on the race
    Other,
}

/// Coarse effort bucket used for lead times and taper/recovery windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceBucket {
    /// Up to ~15 km
    Short,
    /// Half-marathon range
    Medium,
    /// Marathon and beyond
    Long,
}

impl DistanceClass {
    /// Standard distance for the class, if it has one
    pub fn standard_distance_km(&self) -> Option<Decimal> {
        match self {
            Self::TenK => Some(dec!(10.0)),
            Self::HalfMarathon => Some(dec!(21.1)),
            Self::Marathon => Some(dec!(42.2)),
            Self::Other => None,
        }
    }
}

impl DistanceBucket {
    pub fn from_distance_km(distance: Decimal) -> Self {
        if distance < dec!(15.0) {
            Self::Short
        } else if distance < dec!(30.0) {
            Self::Medium
        } else {
            Self::Long
        }
    }
}

/// A race specification, used for both the goal and intermediate races
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSpec {
    pub date: NaiveDate,
    pub class: DistanceClass,
    /// Required when `class` is [`DistanceClass::Other`]
    pub custom_distance_km: Option<Decimal>,
}

impl RaceSpec {
    pub fn new(date: NaiveDate, class: DistanceClass) -> Self {
        Self {
            date,
            class,
            custom_distance_km: None,
        }
    }

    pub fn custom(date: NaiveDate, distance_km: Decimal) -> Self {
        Self {
            date,
            class: DistanceClass::Other,
            custom_distance_km: Some(distance_km),
        }
    }

    /// Race distance in km, resolving the class's standard distance
    pub fn distance_km(&self) -> Result<Decimal> {
        match self.class.standard_distance_km() {
            Some(d) => Ok(d),
            None => self.custom_distance_km.ok_or_else(|| {
                PlanError::invalid_input(
                    "race.distance_km",
                    "a distance is required for non-standard races",
                )
            }),
        }
    }

    pub fn bucket(&self) -> Result<DistanceBucket> {
        Ok(DistanceBucket::from_distance_km(self.distance_km()?))
    }
}

/// One reference performance used to seed the pace model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePerformance {
    pub distance_km: Decimal,
    /// Elapsed time in minutes
    pub time_minutes: Decimal,
}

impl ReferencePerformance {
    pub fn new(distance_km: Decimal, time_minutes: Decimal) -> Self {
        Self {
            distance_km,
            time_minutes,
        }
    }

    /// Average pace of the reference performance in min/km
    pub fn pace_min_per_km(&self) -> Decimal {
        self.time_minutes / self.distance_km
    }
}

/// Athlete inputs to plan generation. Immutable once generation starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub reference: ReferencePerformance,
    /// Training sessions per week (1-7), rest days excluded
    pub sessions_per_week: u8,
    /// Weekly volume at the start of the plan
    pub min_weekly_volume_km: Decimal,
    /// Weekly volume at the top of the progression
    pub max_weekly_volume_km: Decimal,
    /// Preferred rest-day offsets within the week (0 = first day of the plan
    /// week). Falls back to the configured priority order when absent.
    pub rest_day_priority: Option<Vec<u8>>,
}

/// Named training-intensity band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaceZone {
    Easy,
    /// Marathon/tempo effort
    Marathon,
    Threshold,
    Interval,
    /// Race-specific sharpening pace, the fastest band
    Race,
}

/// Training paces in min/km, derived once from the reference performance.
///
/// Invariant: easy > marathon > threshold > interval > race (slower paces are
/// larger values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaceSet {
    pub easy: Decimal,
    pub marathon: Decimal,
    pub threshold: Decimal,
    pub interval: Decimal,
    pub race: Decimal,
}

impl PaceSet {
    pub fn pace_for(&self, zone: PaceZone) -> Decimal {
        match zone {
            PaceZone::Easy => self.easy,
            PaceZone::Marathon => self.marathon,
            PaceZone::Threshold => self.threshold,
            PaceZone::Interval => self.interval,
            PaceZone::Race => self.race,
        }
    }

    /// Zone a race of the given class is run at. Standard distances map onto
    /// the band that matches their effort; non-standard races use the
    /// race-specific band.
    pub fn race_zone_for(class: DistanceClass) -> PaceZone {
        match class {
            DistanceClass::Marathon => PaceZone::Marathon,
            DistanceClass::HalfMarathon => PaceZone::Threshold,
            DistanceClass::TenK => PaceZone::Interval,
            DistanceClass::Other => PaceZone::Race,
        }
    }

    /// Check the strict slower-to-faster ordering invariant
    pub fn is_strictly_ordered(&self) -> bool {
        self.easy > self.marathon
            && self.marathon > self.threshold
            && self.threshold > self.interval
            && self.interval > self.race
    }
}

/// Periodization phase kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Base,
    Build,
    Peak,
    Taper,
}

/// A contiguous block of weeks sharing a periodization purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    /// First week index covered by the phase
    pub start_week: u32,
    /// One past the last week index (half-open range)
    pub end_week: u32,
}

impl Phase {
    pub fn len(&self) -> u32 {
        self.end_week - self.start_week
    }

    pub fn is_empty(&self) -> bool {
        self.start_week == self.end_week
    }

    pub fn contains(&self, week: u32) -> bool {
        week >= self.start_week && week < self.end_week
    }
}

/// Session type within a week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    Easy,
    LongRun,
    Tempo,
    Threshold,
    Interval,
    Rest,
    Race,
}

impl SessionType {
    /// Rest fills calendar days but does not consume a weekly session slot
    pub fn counts_as_session(&self) -> bool {
        !matches!(self, Self::Rest)
    }

    pub fn is_quality(&self) -> bool {
        matches!(self, Self::Tempo | Self::Threshold | Self::Interval)
    }
}

/// Which race a race-type session represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceRef {
    Goal,
    /// Index into the plan's intermediate race list
    Intermediate(usize),
}

/// One dated training session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub date: NaiveDate,
    pub session_type: SessionType,
    pub distance_km: Decimal,
    /// Estimated duration at target pace, rounded to whole minutes
    pub duration_minutes: u32,
    /// None for rest days
    pub target_pace: Option<Decimal>,
    /// Set only on race-type sessions
    pub race: Option<RaceRef>,
    pub description: String,
}

impl Session {
    pub fn rest(date: NaiveDate) -> Self {
        Self {
            date,
            session_type: SessionType::Rest,
            distance_km: Decimal::ZERO,
            duration_minutes: 0,
            target_pace: None,
            race: None,
            description: "Rest day".to_string(),
        }
    }
}

/// Volume annotation attached to a week by the race insertion resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WeekAdjustment {
    /// Reduced volume leading into a race
    PreRaceTaper { race: usize, factor: Decimal },
    /// The week containing a race-day session
    RaceWeek { race: RaceRef, factor: Decimal },
    /// Reduced volume and capped intensity following a race
    PostRaceRecovery { race: usize, factor: Decimal },
}

impl WeekAdjustment {
    pub fn volume_factor(&self) -> Decimal {
        match self {
            Self::PreRaceTaper { factor, .. }
            | Self::RaceWeek { factor, .. }
            | Self::PostRaceRecovery { factor, .. } => *factor,
        }
    }
}

/// One calendar week of the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Week {
    pub index: u32,
    pub start_date: NaiveDate,
    pub phase: PhaseKind,
    /// Planned training volume after deload/taper/recovery adjustments.
    /// Race-day distance is not counted against this target, so race weeks
    /// carry it on top of their reduced training volume.
    pub target_volume_km: Decimal,
    pub is_deload: bool,
    pub adjustment: Option<WeekAdjustment>,
    pub sessions: Vec<Session>,
}

impl Week {
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Duration::days(6)
    }

    pub fn non_rest_session_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.session_type.counts_as_session())
            .count()
    }

    pub fn planned_distance_km(&self) -> Decimal {
        self.sessions.iter().map(|s| s.distance_km).sum()
    }
}

/// Aggregate statistics over an assembled plan, read-only for consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStatistics {
    pub total_distance_km: Decimal,
    pub phase_volume_km: Vec<(PhaseKind, Decimal)>,
    /// Planned distance per week, indexed by week number
    pub weekly_load_km: Vec<Decimal>,
}

/// The complete generation input set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanParameters {
    pub start_date: NaiveDate,
    pub goal: RaceSpec,
    pub profile: AthleteProfile,
    /// Chronologically ordered, strictly between start and goal
    pub intermediate_races: Vec<RaceSpec>,
}

impl PlanParameters {
    /// Total plan weeks: the ceiling of the start-to-goal span in weeks,
    /// counted so the goal date itself always lands inside the final week.
    pub fn total_weeks(&self) -> u32 {
        let days = (self.goal.date - self.start_date).num_days().max(0) as u32;
        (days + 1).div_ceil(7)
    }

    /// Week index containing the given date, if inside the plan window
    pub fn week_of(&self, date: NaiveDate) -> Option<u32> {
        let days = (date - self.start_date).num_days();
        if days < 0 {
            return None;
        }
        let week = (days / 7) as u32;
        (week < self.total_weeks()).then_some(week)
    }
}

/// The final ordered calendar produced by one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub params: PlanParameters,
    pub pace_set: PaceSet,
    pub total_weeks: u32,
    pub phases: Vec<Phase>,
    pub weeks: Vec<Week>,
    pub stats: PlanStatistics,
}

impl Plan {
    pub fn week(&self, index: u32) -> Option<&Week> {
        self.weeks.get(index as usize)
    }

    pub fn sessions_on(&self, date: NaiveDate) -> Vec<&Session> {
        self.weeks
            .iter()
            .flat_map(|w| w.sessions.iter())
            .filter(|s| s.date == date)
            .collect()
    }

    pub fn race_sessions(&self) -> Vec<&Session> {
        self.weeks
            .iter()
            .flat_map(|w| w.sessions.iter())
            .filter(|s| s.session_type == SessionType::Race)
            .collect()
    }

    pub fn phase_of_week(&self, week: u32) -> Option<PhaseKind> {
        self.phases
            .iter()
            .find(|p| p.contains(week))
            .map(|p| p.kind)
    }
}

/// Format a min/km pace as `m:ss`
pub fn format_pace(pace: Decimal) -> String {
    use rust_decimal::prelude::ToPrimitive;

    let total_seconds = (pace * dec!(60)).round().to_i64().unwrap_or(0).max(0);
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
