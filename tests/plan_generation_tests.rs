use chrono::{Duration, NaiveDate};
use rust_decimal_macros::dec;
use planrs::{
    config::PlanConfig,
    diff_plans, generate_plan,
    models::{
        AthleteProfile, DistanceClass, PhaseKind, PlanParameters, RaceRef, RaceSpec,
        ReferencePerformance, SessionType,
    },
    simulate, PlanError, PlanOverrides,
};

/// Integration tests covering full plan generation workflows

fn test_profile(sessions_per_week: u8) -> AthleteProfile {
    AthleteProfile {
        reference: ReferencePerformance::new(dec!(21.1), dec!(105.0)),
        sessions_per_week,
        min_weekly_volume_km: dec!(20.0),
        max_weekly_volume_km: dec!(60.0),
        rest_day_priority: None,
    }
}

fn marathon_params() -> PlanParameters {
    PlanParameters {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        goal: RaceSpec::new(
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            DistanceClass::Marathon,
        ),
        profile: test_profile(4),
        intermediate_races: Vec::new(),
    }
}

#[test]
fn test_full_marathon_plan_structure() {
    let plan = generate_plan(&marathon_params(), &PlanConfig::default()).unwrap();

    assert_eq!(plan.total_weeks, 22);
    let kinds: Vec<PhaseKind> = plan.phases.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PhaseKind::Base,
            PhaseKind::Build,
            PhaseKind::Peak,
            PhaseKind::Taper
        ]
    );
    let lens: Vec<u32> = plan.phases.iter().map(|p| p.len()).collect();
    assert_eq!(lens, vec![8, 7, 4, 3]);

    // Phases tile the plan without gaps or overlaps
    let mut cursor = 0;
    for phase in &plan.phases {
        assert_eq!(phase.start_week, cursor);
        cursor = phase.end_week;
    }
    assert_eq!(cursor, plan.total_weeks);
}

#[test]
fn test_goal_race_session_on_goal_date() {
    let params = marathon_params();
    let plan = generate_plan(&params, &PlanConfig::default()).unwrap();

    let on_goal_day = plan.sessions_on(params.goal.date);
    assert_eq!(on_goal_day.len(), 1);
    assert_eq!(on_goal_day[0].session_type, SessionType::Race);
    assert_eq!(on_goal_day[0].race, Some(RaceRef::Goal));
    assert_eq!(on_goal_day[0].distance_km, dec!(42.2));
    // A marathon race runs at the marathon band
    assert_eq!(on_goal_day[0].target_pace, Some(plan.pace_set.marathon));
}

#[test]
fn test_midweek_goal_ends_the_plan_at_the_race() {
    // Goal on a Wednesday, two days into its final week
    let mut params = marathon_params();
    params.goal.date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
    let plan = generate_plan(&params, &PlanConfig::default()).unwrap();
    assert_eq!(plan.total_weeks, 23);

    for week in &plan.weeks {
        for session in &week.sessions {
            if session.session_type.counts_as_session() {
                assert!(
                    session.date <= params.goal.date,
                    "training after the goal race: {session:?}"
                );
            }
        }
    }

    let on_goal_day = plan.sessions_on(params.goal.date);
    assert_eq!(on_goal_day.len(), 1);
    assert_eq!(on_goal_day[0].session_type, SessionType::Race);
    assert_eq!(on_goal_day[0].race, Some(RaceRef::Goal));
}

#[test]
fn test_volume_progression_and_taper() {
    let plan = generate_plan(&marathon_params(), &PlanConfig::default()).unwrap();

    // Loading volume never decreases outside deloads and race windows
    let taper_start = plan.phases.last().unwrap().start_week;
    let mut previous = None;
    for week in plan.weeks.iter().take(taper_start as usize) {
        if week.is_deload {
            assert!(week.target_volume_km < plan.weeks[week.index as usize - 1].target_volume_km);
            continue;
        }
        if let Some(prev) = previous {
            assert!(week.target_volume_km >= prev, "week {}", week.index);
        }
        previous = Some(week.target_volume_km);
    }

    // Taper weeks descend toward half the minimum weekly volume
    let mut prev = plan.weeks[taper_start as usize - 1].target_volume_km;
    for week in &plan.weeks[taper_start as usize..] {
        assert!(week.target_volume_km < prev);
        prev = week.target_volume_km;
    }
    assert_eq!(plan.weeks.last().unwrap().target_volume_km, dec!(10.0));
}

#[test]
fn test_session_budget_for_every_week_count() {
    for sessions_per_week in 1..=7u8 {
        let mut params = marathon_params();
        params.profile = test_profile(sessions_per_week);
        let plan = generate_plan(&params, &PlanConfig::default()).unwrap();

        for week in &plan.weeks {
            assert!(
                week.non_rest_session_count() <= sessions_per_week as usize,
                "{sessions_per_week}/wk exceeded in week {}",
                week.index
            );
            // Every calendar day is accounted for
            assert_eq!(week.sessions.len(), 7);
            for pair in week.sessions.windows(2) {
                assert_eq!(pair[1].date, pair[0].date + Duration::days(1));
            }
        }
    }
}

#[test]
fn test_pace_set_ordering_and_zone_assignment() {
    let plan = generate_plan(&marathon_params(), &PlanConfig::default()).unwrap();
    assert!(plan.pace_set.is_strictly_ordered());

    for week in &plan.weeks {
        for session in &week.sessions {
            match session.session_type {
                SessionType::Easy => {
                    assert_eq!(session.target_pace, Some(plan.pace_set.easy))
                }
                SessionType::Threshold => {
                    assert_eq!(session.target_pace, Some(plan.pace_set.threshold))
                }
                SessionType::Interval => {
                    assert_eq!(session.target_pace, Some(plan.pace_set.interval))
                }
                SessionType::Rest => assert_eq!(session.target_pace, None),
                _ => {}
            }
        }
    }
}

#[test]
fn test_intermediate_race_stays_local() {
    let params = marathon_params();
    let config = PlanConfig::default();
    let baseline = generate_plan(&params, &config).unwrap();

    let overrides = PlanOverrides {
        intermediate_races: Some(vec![RaceSpec::new(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            DistanceClass::TenK,
        )]),
        ..Default::default()
    };
    let variant = simulate(&params, &overrides, &config).unwrap();

    // Same skeleton, changes confined to the race and recovery weeks
    assert_eq!(variant.phases, baseline.phases);
    let changed: Vec<u32> = diff_plans(&baseline, &variant)
        .iter()
        .map(|d| d.week_index)
        .collect();
    assert_eq!(changed, vec![10, 11]);

    let race_week = &variant.weeks[10];
    assert!(race_week.target_volume_km < baseline.weeks[10].target_volume_km);
    assert!(race_week
        .sessions
        .iter()
        .any(|s| s.session_type == SessionType::Race));
}

#[test]
fn test_simulation_is_pure() {
    let params = marathon_params();
    let config = PlanConfig::default();
    let baseline = generate_plan(&params, &config).unwrap();

    // Running a what-if does not disturb subsequent generations
    let overrides = PlanOverrides {
        max_weekly_volume_km: Some(dec!(80.0)),
        ..Default::default()
    };
    simulate(&params, &overrides, &config).unwrap();

    let again = generate_plan(&params, &config).unwrap();
    assert_eq!(baseline, again);
}

#[test]
fn test_minimum_lead_time_enforced() {
    let mut params = marathon_params();
    // 11 weeks out, one short of the marathon minimum
    params.goal.date = params.start_date + Duration::days(11 * 7 - 1);
    let err = generate_plan(&params, &PlanConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        PlanError::InsufficientTimeWindow {
            available_weeks: 11,
            required_weeks: 12
        }
    ));

    // Exactly 12 weeks succeeds
    params.goal.date = params.start_date + Duration::days(12 * 7 - 1);
    generate_plan(&params, &PlanConfig::default()).unwrap();
}

#[test]
fn test_custom_distance_race() {
    let mut params = marathon_params();
    params.goal = RaceSpec::custom(
        NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
        dec!(35.0),
    );
    let plan = generate_plan(&params, &PlanConfig::default()).unwrap();

    let race = plan.race_sessions()[0];
    assert_eq!(race.distance_km, dec!(35.0));
    // Non-standard distances use the race-specific band
    assert_eq!(race.target_pace, Some(plan.pace_set.race));

    // Omitting the custom distance is an input error
    params.goal.custom_distance_km = None;
    let err = generate_plan(&params, &PlanConfig::default()).unwrap_err();
    assert!(matches!(err, PlanError::InvalidInput { .. }));
}

#[test]
fn test_race_inside_goal_taper_rejected() {
    let mut params = marathon_params();
    params.intermediate_races.push(RaceSpec::new(
        NaiveDate::from_ymd_opt(2024, 5, 22).unwrap(),
        DistanceClass::TenK,
    ));
    let err = generate_plan(&params, &PlanConfig::default()).unwrap_err();
    assert!(matches!(err, PlanError::RaceSchedulingConflict { .. }));
}

#[test]
fn test_config_override_changes_layout() {
    let mut config = PlanConfig::default();
    config.scheduling.deload_cadence = 3;
    let plan = generate_plan(&marathon_params(), &config).unwrap();

    // 3:1 becomes 2:1, so the first deload arrives a week earlier
    assert!(plan.weeks[2].is_deload);
    assert!(!plan.weeks[3].is_deload);
}

#[test]
fn test_validation_errors_are_user_facing() {
    let mut params = marathon_params();
    params.profile.sessions_per_week = 0;
    let err = generate_plan(&params, &PlanConfig::default()).unwrap_err();
    assert!(err.is_validation());
    assert!(err.user_message().contains("sessions_per_week"));
}
