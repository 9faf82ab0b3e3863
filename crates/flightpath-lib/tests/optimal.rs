mod common;

use common::{altitude_run, fixture_scenario};
use flightpath_lib::{
    find_optimal_paths, find_rta_path, plan_flight, CancelToken, CostConfig, Objective, Parallelism,
    RtaOutcome, RtaRequest, TotalRun,
};

#[test]
fn single_run_wins_every_objective() {
    let mut total_run = TotalRun::new();
    total_run.insert(altitude_run(0.78, 35_000, 5_000.0, 1.5));

    let paths = find_optimal_paths(&total_run, &CostConfig::default());
    for objective in Objective::ALL {
        let path = paths.get(objective).expect("every objective has a result");
        assert_eq!(path.objective, objective);
        assert_eq!(path.altitude_ft, 35_000);
        assert!((path.mach - 0.78).abs() < 1e-9);
        assert_eq!(path.path.len(), 2);
    }
    assert!((paths.fuel.as_ref().unwrap().flight_cost - 5_000.0).abs() < 1e-9);
    assert!((paths.time.as_ref().unwrap().flight_cost - (5_000.0 + 99.0 * 1.5)).abs() < 1e-9);
}

#[test]
fn objectives_pick_different_runs() {
    let mut total_run = TotalRun::new();
    // Slow and frugal versus fast and thirsty.
    total_run.insert(altitude_run(0.74, 35_000, 4_000.0, 3.0));
    total_run.insert(altitude_run(0.82, 35_000, 4_100.0, 1.5));

    let config = CostConfig::default().with_custom_cost_index(10.0);
    let paths = find_optimal_paths(&total_run, &config);
    assert!((paths.fuel.unwrap().mach - 0.74).abs() < 1e-9);
    assert!((paths.time.unwrap().mach - 0.82).abs() < 1e-9);
    // 4000 + 30 < 4100 + 15
    assert!((paths.custom.unwrap().mach - 0.74).abs() < 1e-9);
}

#[test]
fn ties_go_to_the_first_run_in_mach_altitude_order() {
    let mut total_run = TotalRun::new();
    total_run.insert(altitude_run(0.80, 31_000, 4_000.0, 1.0));
    total_run.insert(altitude_run(0.78, 35_000, 4_000.0, 1.0));
    total_run.insert(altitude_run(0.78, 33_000, 4_000.0, 1.0));

    let paths = find_optimal_paths(&total_run, &CostConfig::default());
    let fuel = paths.fuel.expect("selected");
    assert!((fuel.mach - 0.78).abs() < 1e-9);
    assert_eq!(fuel.altitude_ft, 33_000);
}

#[test]
fn fixture_plan_selects_consistent_optima() {
    let scenario = fixture_scenario();
    let mut request = scenario.plan_request();
    request.sweep.parallelism = Parallelism::Threads(2);

    let plan = plan_flight(&scenario, &request, &CancelToken::new()).expect("plan succeeds");
    let fuel = plan.optimal.fuel.as_ref().expect("fuel optimum");
    let time = plan.optimal.time.as_ref().expect("time optimum");

    assert!(fuel.fuel_kg <= time.fuel_kg + 1e-9);
    assert!(time.time_h <= fuel.time_h + 1e-9);
    for run in plan.total_run.iter() {
        assert!(run.total_fuel_kg() >= fuel.fuel_kg - 1e-9);
        assert!(run.total_time_h() >= time.time_h - 1e-9);
    }
    assert!(plan.rta.is_some());
}

#[test]
fn rta_on_fixture_distinguishes_band_from_window() {
    let scenario = fixture_scenario();
    let plan = plan_flight(&scenario, &scenario.plan_request(), &CancelToken::new()).unwrap();
    let fuel = plan.optimal.fuel.expect("fuel optimum");
    let cruise = &scenario.profiles.cruise;
    let sos = cruise
        .speed_of_sound_at(fuel.altitude_ft)
        .expect("speed of sound at optimum altitude");
    let time_at = |mach: f64| fuel.distance_nm / (mach * sos + fuel.average_wind_kt);

    let on_time = RtaRequest {
        available_time_h: time_at(0.76),
        min_mach: 0.71,
        max_mach: 0.81,
    };
    let outcome = find_rta_path(&fuel, cruise, &on_time).unwrap();
    let solution = outcome.solution().expect("0.76 is inside the band");
    assert!((solution.required_mach - 0.76).abs() < 1e-9);
    assert_eq!(solution.path.path, fuel.path);

    // Reachable by the aircraft (envelope starts at 0.70) but below the band.
    let slow = RtaRequest {
        available_time_h: time_at(0.705),
        ..on_time
    };
    assert!(matches!(
        find_rta_path(&fuel, cruise, &slow).unwrap(),
        RtaOutcome::OutOfMachBand { .. }
    ));

    let impossible = RtaRequest {
        available_time_h: time_at(0.95),
        ..on_time
    };
    assert!(matches!(
        find_rta_path(&fuel, cruise, &impossible).unwrap(),
        RtaOutcome::OutsideArrivalWindow { .. }
    ));
}

#[test]
fn rta_without_completed_runs_has_no_baseline() {
    let scenario = fixture_scenario();
    let mut request = scenario.plan_request();
    // Mach 0.82 at 31000 ft is the only pair and it cannot be sustained.
    request.sweep.machs = vec![0.82];
    request.sweep.altitudes_ft = vec![31_000];

    let plan = plan_flight(&scenario, &request, &CancelToken::new()).unwrap();
    assert!(plan.total_run.is_empty());
    assert!(plan.optimal.is_empty());
    assert_eq!(plan.rta, Some(RtaOutcome::NoBaselinePath));
}
