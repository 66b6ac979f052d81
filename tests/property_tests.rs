use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use planrs::{
    config::{PhaseConfig, PlanConfig},
    generate_plan,
    models::{
        AthleteProfile, DistanceClass, PhaseKind, PlanParameters, RaceSpec,
        ReferencePerformance,
    },
    pace::PaceModel,
    phases::PhasePlanner,
};

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Parameters for a marathon plan spanning exactly `weeks` weeks
fn params_for(weeks: u32, sessions_per_week: u8) -> PlanParameters {
    PlanParameters {
        start_date: start_date(),
        goal: RaceSpec::new(
            start_date() + Duration::days(i64::from(weeks) * 7 - 1),
            DistanceClass::Marathon,
        ),
        profile: AthleteProfile {
            reference: ReferencePerformance::new(dec!(21.1), dec!(105.0)),
            sessions_per_week,
            min_weekly_volume_km: dec!(20.0),
            max_weekly_volume_km: dec!(60.0),
            rest_day_priority: None,
        },
        intermediate_races: Vec::new(),
    }
}

proptest! {
    /// Derived pace sets are strictly ordered for any plausible reference
    #[test]
    fn prop_pace_zones_strictly_ordered(
        distance_km in 9u32..=42,
        pace_seconds_per_km in 220u32..=480,
    ) {
        let reference = ReferencePerformance::new(
            Decimal::from(distance_km),
            Decimal::from(distance_km) * Decimal::from(pace_seconds_per_km) / dec!(60),
        );
        let goal = RaceSpec::new(
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            DistanceClass::Marathon,
        );
        let paces = PaceModel::derive(
            &reference,
            &goal,
            &PlanConfig::default().pace,
        ).unwrap();
        prop_assert!(paces.is_strictly_ordered());
        prop_assert!(paces.race > Decimal::ZERO);
    }

    /// Phase allocation partitions any viable plan window exactly
    #[test]
    fn prop_phases_partition_window(total_weeks in 12u32..=80) {
        let goal = RaceSpec::new(
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            DistanceClass::Marathon,
        );
        let phases =
            PhasePlanner::plan_phases(total_weeks, &goal, &PhaseConfig::default()).unwrap();

        let mut cursor = 0;
        for phase in &phases {
            prop_assert_eq!(phase.start_week, cursor);
            prop_assert!(phase.end_week > phase.start_week);
            cursor = phase.end_week;
        }
        prop_assert_eq!(cursor, total_weeks);

        let taper = phases.last().unwrap();
        prop_assert_eq!(taper.kind, PhaseKind::Taper);
        prop_assert!((2..=3).contains(&taper.len()));
    }

    /// Generated weekly volumes stay inside the athlete's configured range
    #[test]
    fn prop_weekly_volume_bounded(
        total_weeks in 12u32..=40,
        sessions_per_week in 1u8..=7,
    ) {
        let params = params_for(total_weeks, sessions_per_week);
        let plan = generate_plan(&params, &PlanConfig::default()).unwrap();

        let floor = dec!(10.0); // half the minimum volume, the taper endpoint
        for week in &plan.weeks {
            prop_assert!(
                week.target_volume_km <= dec!(60.0),
                "week {} over the max: {}", week.index, week.target_volume_km
            );
            prop_assert!(
                week.target_volume_km >= floor,
                "week {} under the floor: {}", week.index, week.target_volume_km
            );
            prop_assert!(
                week.non_rest_session_count() <= sessions_per_week as usize
            );
        }
    }

    /// Exactly one race session exists for a plan with no intermediate races
    #[test]
    fn prop_single_goal_race_session(total_weeks in 12u32..=40) {
        let params = params_for(total_weeks, 4);
        let plan = generate_plan(&params, &PlanConfig::default()).unwrap();
        prop_assert_eq!(plan.race_sessions().len(), 1);
        prop_assert_eq!(plan.race_sessions()[0].date, params.goal.date);
    }
}
