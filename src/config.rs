//! Plan generation configuration
//!
//! All domain tuning tables live here as immutable data: phase proportions,
//! deload cadence, taper/recovery window lengths, pace-zone offsets, and
//! session placement rules. The pipeline takes a [`PlanConfig`] argument
//! explicitly so tests can substitute fixtures; nothing reads global state.

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{PlanError, Result};
use crate::models::DistanceBucket;

/// Main configuration for the generation pipeline
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PlanConfig {
    pub pace: PaceModelConfig,
    pub phases: PhaseConfig,
    pub races: RaceWindowConfig,
    pub scheduling: SchedulingConfig,
}

/// Pace model settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaceModelConfig {
    /// Exponent of the Riegel time-distance power law
    pub riegel_exponent: f64,

    /// Smallest supported goal/reference distance ratio
    pub min_distance_ratio: f64,

    /// Largest supported goal/reference distance ratio
    pub max_distance_ratio: f64,

    /// Zone paces as multiples of the goal-equivalent pace
    pub zone_multipliers: ZoneMultipliers,
}

/// Per-zone pace offsets relative to the goal-equivalent pace.
///
/// Must be strictly decreasing from easy to race so derived pace sets always
/// satisfy the slower-to-faster ordering invariant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZoneMultipliers {
    pub easy: Decimal,
    pub marathon: Decimal,
    pub threshold: Decimal,
    pub interval: Decimal,
    pub race: Decimal,
}

/// Phase segmentation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhaseConfig {
    /// Base/build/peak/taper proportions for standard-length plans
    pub standard: PhaseProportions,

    /// Proportions for short plans, which omit the peak phase
    pub short_plan: ShortPhaseProportions,

    /// Plans shorter than this many weeks use the short template
    pub short_plan_weeks: u32,

    /// Weeks beyond this count extend the base phase only
    pub long_plan_weeks: u32,

    /// Minimum lead weeks between start and goal, per distance bucket
    pub lead_weeks: LeadTimes,

    /// Absolute taper length bounds, per distance bucket
    pub taper_clamps: TaperClamps,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhaseProportions {
    pub base: Decimal,
    pub build: Decimal,
    pub peak: Decimal,
    pub taper: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShortPhaseProportions {
    pub base: Decimal,
    pub build: Decimal,
    pub taper: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LeadTimes {
    pub short: u32,
    pub medium: u32,
    pub long: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaperClamp {
    pub min_weeks: u32,
    pub max_weeks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TaperClamps {
    pub short: TaperClamp,
    pub medium: TaperClamp,
    pub long: TaperClamp,
}

/// Taper/recovery window lengths around intermediate races
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RaceWindowConfig {
    pub short: RaceWindows,
    pub medium: RaceWindows,
    pub long: RaceWindows,

    /// Volume factor for weeks inside a pre-race taper window
    pub pre_race_taper_factor: Decimal,

    /// Volume factor for the race week itself
    pub race_week_factor: Decimal,

    /// Volume factor for post-race recovery weeks
    pub recovery_factor: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RaceWindows {
    /// Reduced-volume weeks before the race week
    pub taper_weeks: u32,
    /// Reduced-volume, capped-intensity weeks after the race week
    pub recovery_weeks: u32,
}

/// Weekly session layout settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Every Nth loading week is a deload (3:1 loading cadence at 4)
    pub deload_cadence: u32,

    /// Volume reduction applied on deload weeks
    pub deload_fraction: Decimal,

    /// Final taper week volume as a fraction of the minimum weekly volume
    pub taper_final_week_ratio: Decimal,

    /// Long-run share of weekly volume
    pub long_run_fraction: Decimal,

    /// Quality-session share of weekly volume
    pub quality_fraction: Decimal,

    /// Sessions below this distance are omitted rather than scheduled
    pub min_session_km: Decimal,

    /// Day offset within the week for the long run (0-6)
    pub long_run_day: u8,

    /// Day offset within the week for the quality session (0-6)
    pub quality_day: u8,

    /// Day offsets dropped first when filling rest days
    pub rest_day_priority: Vec<u8>,
}

impl Default for PaceModelConfig {
    fn default() -> Self {
        Self {
            riegel_exponent: 1.06,
            min_distance_ratio: 0.2,
            max_distance_ratio: 5.0,
            zone_multipliers: ZoneMultipliers::default(),
        }
    }
}

impl Default for ZoneMultipliers {
    fn default() -> Self {
        Self {
            easy: dec!(1.30),
            marathon: dec!(1.12),
            threshold: dec!(1.02),
            interval: dec!(0.94),
            race: dec!(0.88),
        }
    }
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            standard: PhaseProportions::default(),
            short_plan: ShortPhaseProportions::default(),
            short_plan_weeks: 12,
            long_plan_weeks: 28,
            lead_weeks: LeadTimes::default(),
            taper_clamps: TaperClamps::default(),
        }
    }
}

impl Default for PhaseProportions {
    fn default() -> Self {
        Self {
            base: dec!(0.35),
            build: dec!(0.30),
            peak: dec!(0.20),
            taper: dec!(0.15),
        }
    }
}

impl Default for ShortPhaseProportions {
    fn default() -> Self {
        Self {
            base: dec!(0.40),
            build: dec!(0.40),
            taper: dec!(0.20),
        }
    }
}

impl Default for LeadTimes {
    fn default() -> Self {
        Self {
            short: 8,
            medium: 10,
            long: 12,
        }
    }
}

impl Default for TaperClamps {
    fn default() -> Self {
        Self {
            short: TaperClamp {
                min_weeks: 1,
                max_weeks: 2,
            },
            medium: TaperClamp {
                min_weeks: 1,
                max_weeks: 2,
            },
            long: TaperClamp {
                min_weeks: 2,
                max_weeks: 3,
            },
        }
    }
}

impl Default for RaceWindowConfig {
    fn default() -> Self {
        Self {
            short: RaceWindows {
                taper_weeks: 0,
                recovery_weeks: 1,
            },
            medium: RaceWindows {
                taper_weeks: 1,
                recovery_weeks: 1,
            },
            long: RaceWindows {
                taper_weeks: 2,
                recovery_weeks: 2,
            },
            pre_race_taper_factor: dec!(0.80),
            race_week_factor: dec!(0.80),
            recovery_factor: dec!(0.70),
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            deload_cadence: 4,
            deload_fraction: dec!(0.20),
            taper_final_week_ratio: dec!(0.50),
            long_run_fraction: dec!(0.40),
            quality_fraction: dec!(0.25),
            min_session_km: dec!(2.0),
            long_run_day: 6,
            quality_day: 3,
            rest_day_priority: vec![0, 4, 1, 5],
        }
    }
}

impl PhaseConfig {
    pub fn lead_weeks_for(&self, bucket: DistanceBucket) -> u32 {
        match bucket {
            DistanceBucket::Short => self.lead_weeks.short,
            DistanceBucket::Medium => self.lead_weeks.medium,
            DistanceBucket::Long => self.lead_weeks.long,
        }
    }

    pub fn taper_clamp_for(&self, bucket: DistanceBucket) -> TaperClamp {
        match bucket {
            DistanceBucket::Short => self.taper_clamps.short,
            DistanceBucket::Medium => self.taper_clamps.medium,
            DistanceBucket::Long => self.taper_clamps.long,
        }
    }
}

impl RaceWindowConfig {
    pub fn windows_for(&self, bucket: DistanceBucket) -> RaceWindows {
        match bucket {
            DistanceBucket::Short => self.short,
            DistanceBucket::Medium => self.medium,
            DistanceBucket::Long => self.long,
        }
    }
}

impl PlanConfig {
    /// Load configuration from a TOML file. Missing keys fall back to the
    /// built-in defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Check internal consistency of the tuning tables
    pub fn validate(&self) -> Result<()> {
        let z = &self.pace.zone_multipliers;
        if !(z.easy > z.marathon
            && z.marathon > z.threshold
            && z.threshold > z.interval
            && z.interval > z.race)
        {
            return Err(PlanError::Configuration(
                "zone multipliers must be strictly decreasing from easy to race".to_string(),
            ));
        }
        if z.race <= Decimal::ZERO {
            return Err(PlanError::Configuration(
                "zone multipliers must be positive".to_string(),
            ));
        }

        if self.pace.riegel_exponent < 1.0 {
            return Err(PlanError::Configuration(
                "riegel exponent below 1.0 breaks monotonicity of extrapolated paces".to_string(),
            ));
        }
        if self.pace.min_distance_ratio <= 0.0
            || self.pace.min_distance_ratio >= self.pace.max_distance_ratio
        {
            return Err(PlanError::Configuration(
                "supported distance ratio range must be positive and non-empty".to_string(),
            ));
        }

        let p = &self.phases.standard;
        if p.base + p.build + p.peak + p.taper != Decimal::ONE {
            return Err(PlanError::Configuration(
                "standard phase proportions must sum to 1.0".to_string(),
            ));
        }
        let s = &self.phases.short_plan;
        if s.base + s.build + s.taper != Decimal::ONE {
            return Err(PlanError::Configuration(
                "short-plan phase proportions must sum to 1.0".to_string(),
            ));
        }
        for clamp in [
            self.phases.taper_clamps.short,
            self.phases.taper_clamps.medium,
            self.phases.taper_clamps.long,
        ] {
            if clamp.min_weeks == 0 || clamp.min_weeks > clamp.max_weeks {
                return Err(PlanError::Configuration(
                    "taper clamp ranges must be non-empty and at least one week".to_string(),
                ));
            }
        }

        if self.scheduling.deload_cadence < 2 {
            return Err(PlanError::Configuration(
                "deload cadence must be at least 2 weeks".to_string(),
            ));
        }
        for (name, value) in [
            ("deload_fraction", self.scheduling.deload_fraction),
            ("taper_final_week_ratio", self.scheduling.taper_final_week_ratio),
            ("long_run_fraction", self.scheduling.long_run_fraction),
            ("quality_fraction", self.scheduling.quality_fraction),
            ("pre_race_taper_factor", self.races.pre_race_taper_factor),
            ("race_week_factor", self.races.race_week_factor),
            ("recovery_factor", self.races.recovery_factor),
        ] {
            if value <= Decimal::ZERO || value >= Decimal::ONE {
                return Err(PlanError::Configuration(format!(
                    "{name} must lie strictly between 0 and 1"
                )));
            }
        }
        if self.scheduling.long_run_fraction + self.scheduling.quality_fraction >= Decimal::ONE {
            return Err(PlanError::Configuration(
                "long run and quality fractions must leave room for easy volume".to_string(),
            ));
        }

        if self.scheduling.long_run_day > 6 || self.scheduling.quality_day > 6 {
            return Err(PlanError::Configuration(
                "session day offsets must be within 0-6".to_string(),
            ));
        }
        if self.scheduling.rest_day_priority.iter().any(|d| *d > 6) {
            return Err(PlanError::Configuration(
                "rest day offsets must be within 0-6".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        PlanConfig::default().validate().unwrap();
    }

    #[test]
    fn test_zone_multiplier_ordering_enforced() {
        let mut config = PlanConfig::default();
        config.pace.zone_multipliers.threshold = dec!(1.20);
        assert!(matches!(
            config.validate(),
            Err(PlanError::Configuration(_))
        ));
    }

    #[test]
    fn test_proportions_must_sum_to_one() {
        let mut config = PlanConfig::default();
        config.phases.standard.base = dec!(0.50);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bucket_lookups() {
        let config = PlanConfig::default();
        assert_eq!(config.phases.lead_weeks_for(DistanceBucket::Long), 12);
        assert_eq!(config.phases.lead_weeks_for(DistanceBucket::Short), 8);

        let clamp = config.phases.taper_clamp_for(DistanceBucket::Long);
        assert_eq!((clamp.min_weeks, clamp.max_weeks), (2, 3));

        let windows = config.races.windows_for(DistanceBucket::Short);
        assert_eq!((windows.taper_weeks, windows.recovery_weeks), (0, 1));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PlanConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: PlanConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: PlanConfig = toml::from_str(
            r#"
            [scheduling]
            deload_cadence = 5
            "#,
        )
        .unwrap();
        assert_eq!(parsed.scheduling.deload_cadence, 5);
        assert_eq!(parsed.phases.short_plan_weeks, 12);
        parsed.validate().unwrap();
    }
}
