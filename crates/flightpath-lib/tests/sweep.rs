mod common;

use common::{fixture_scenario, uniform_profiles};
use flightpath_lib::{
    run_sweep, Airspace, CancelToken, Error, FlightPhase, Grid, Mission, Parallelism, Point,
    SkipReason, SweepConfig,
};

const ALTITUDES: [u32; 3] = [30_000, 34_000, 38_000];
const MACHS: [f64; 3] = [0.74, 0.78, 0.82];

fn layered_airspace() -> Airspace {
    ALTITUDES
        .iter()
        .enumerate()
        .fold(Airspace::new(), |airspace, (i, &altitude_ft)| {
            let mut grid = Grid::new(12, 8);
            for x in 0..12 {
                for y in 0..8 {
                    let wind = (i as f64 * 15.0) - f64::from(y) * 5.0 + f64::from(x % 3);
                    grid.set_wind_at(x, y, wind).unwrap();
                }
            }
            for y in 1..7 {
                grid.set_walkable_at(5 + i as i32, y, false).unwrap();
            }
            airspace.with_layer(altitude_ft, grid)
        })
}

fn mission() -> Mission {
    Mission {
        departure: Point::new(0, 4),
        top_of_climb: Point::new(2, 4),
        top_of_descent: Point::new(9, 4),
        arrival: Point::new(11, 4),
    }
}

fn config(parallelism: Parallelism) -> SweepConfig {
    SweepConfig::new(MACHS.to_vec(), ALTITUDES.to_vec()).with_parallelism(parallelism)
}

#[test]
fn parallel_and_sequential_sweeps_agree() {
    let airspace = layered_airspace();
    let profiles = uniform_profiles(&ALTITUDES, &MACHS, 580.0);
    let cancel = CancelToken::new();

    let sequential = run_sweep(
        &airspace,
        &profiles,
        &mission(),
        &config(Parallelism::Sequential),
        &cancel,
    )
    .expect("sequential sweep");
    assert_eq!(sequential.total_run.len(), ALTITUDES.len() * MACHS.len());
    assert!(sequential.skipped.is_empty());

    for parallelism in [Parallelism::Auto, Parallelism::Threads(2), Parallelism::Threads(4)] {
        let parallel = run_sweep(&airspace, &profiles, &mission(), &config(parallelism), &cancel)
            .expect("parallel sweep");
        assert_eq!(parallel, sequential, "{parallelism:?} diverged");
    }
}

#[test]
fn sweeping_twice_is_idempotent() {
    let airspace = layered_airspace();
    let profiles = uniform_profiles(&ALTITUDES, &MACHS, 580.0);
    let cancel = CancelToken::new();
    let cfg = config(Parallelism::Auto);

    let first = run_sweep(&airspace, &profiles, &mission(), &cfg, &cancel).unwrap();
    let second = run_sweep(&airspace, &profiles, &mission(), &cfg, &cancel).unwrap();
    assert_eq!(first, second);
}

#[test]
fn phase_totals_add_up_per_run() {
    let airspace = layered_airspace();
    let profiles = uniform_profiles(&ALTITUDES, &MACHS, 580.0);
    let outcome = run_sweep(
        &airspace,
        &profiles,
        &mission(),
        &config(Parallelism::Sequential),
        &CancelToken::new(),
    )
    .unwrap();

    for run in outcome.total_run.iter() {
        let fuel = run.ascent.fuel_kg + run.cruise.fuel_kg + run.descent.fuel_kg;
        assert!((run.total_fuel_kg() - fuel).abs() < 1e-9);
        assert_eq!(run.cruise.path.first(), Some(&mission().top_of_climb));
        assert_eq!(run.cruise.path.last(), Some(&mission().top_of_descent));
        assert_eq!(run.ascent.path.first(), Some(&mission().departure));
        assert_eq!(run.descent.path.last(), Some(&mission().arrival));
    }
    assert!(outcome.total_run.get(0.78, 34_000).is_some());
    assert!(outcome.total_run.get(0.78, 31_000).is_none());
}

#[test]
fn unsupported_pairs_are_skipped_not_fatal() {
    let airspace = layered_airspace();
    // No profile rows at Mach 0.82.
    let profiles = uniform_profiles(&ALTITUDES, &MACHS[..2], 580.0);
    let outcome = run_sweep(
        &airspace,
        &profiles,
        &mission(),
        &config(Parallelism::Auto),
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(outcome.total_run.len(), 6);
    assert_eq!(outcome.skipped.len(), 3);
    for skipped in &outcome.skipped {
        assert!((skipped.mach - 0.82).abs() < 1e-9);
        assert!(matches!(
            skipped.reason,
            SkipReason::Infeasible {
                phase: FlightPhase::Ascent,
                ..
            }
        ));
    }
}

#[test]
fn walled_off_layer_reports_no_path() {
    let mut airspace = layered_airspace();
    let mut sealed = Grid::new(12, 8);
    for y in 0..8 {
        sealed.set_walkable_at(6, y, false).unwrap();
    }
    airspace.insert_layer(38_000, sealed);
    let profiles = uniform_profiles(&ALTITUDES, &MACHS, 580.0);

    let outcome = run_sweep(
        &airspace,
        &profiles,
        &mission(),
        &config(Parallelism::Sequential),
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(outcome.skipped.len(), MACHS.len());
    assert!(outcome
        .skipped
        .iter()
        .all(|s| s.altitude_ft == 38_000
            && s.reason == SkipReason::NoPath { phase: FlightPhase::Cruise }));
}

#[test]
fn cancelled_sweep_returns_error() {
    let airspace = layered_airspace();
    let profiles = uniform_profiles(&ALTITUDES, &MACHS, 580.0);
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = run_sweep(
        &airspace,
        &profiles,
        &mission(),
        &config(Parallelism::Threads(2)),
        &cancel,
    )
    .unwrap_err();
    assert!(matches!(err, Error::SweepCancelled { completed: 0 }));
}

#[test]
fn missing_layer_and_bad_config_are_errors() {
    let airspace = layered_airspace();
    let profiles = uniform_profiles(&ALTITUDES, &MACHS, 580.0);
    let cancel = CancelToken::new();

    let missing = SweepConfig::new(vec![0.78], vec![41_000]);
    assert!(matches!(
        run_sweep(&airspace, &profiles, &mission(), &missing, &cancel),
        Err(Error::MissingAltitudeLayer { altitude_ft: 41_000 })
    ));

    let empty = SweepConfig::new(Vec::new(), ALTITUDES.to_vec());
    assert!(matches!(
        run_sweep(&airspace, &profiles, &mission(), &empty, &cancel),
        Err(Error::InvalidConfig { .. })
    ));

    let outside = Mission::direct(Point::new(0, 0), Point::new(40, 0));
    assert!(matches!(
        run_sweep(&airspace, &profiles, &outside, &config(Parallelism::Auto), &cancel),
        Err(Error::OutOfBounds { x: 40, .. })
    ));
}

#[test]
fn invalid_search_coefficients_fail_before_any_run() {
    let scenario = fixture_scenario();
    let cancel = CancelToken::new();

    for cost_index in [f64::NAN, -100_000.0] {
        let mut cfg = scenario.sweep.clone();
        cfg.coefficients.cost_index = cost_index;
        let result = run_sweep(
            &scenario.airspace,
            &scenario.profiles,
            &scenario.mission,
            &cfg,
            &cancel,
        );
        assert!(
            matches!(result, Err(Error::InvalidConfig { .. })),
            "cost index {cost_index} accepted: {result:?}"
        );
    }

    let mut cfg = scenario.sweep.clone();
    cfg.coefficients.fuel_cost = -1.0;
    assert!(matches!(
        run_sweep(
            &scenario.airspace,
            &scenario.profiles,
            &scenario.mission,
            &cfg,
            &cancel,
        ),
        Err(Error::InvalidConfig { .. })
    ));
}

#[test]
fn fixture_sweep_skips_unsustainable_cruise() {
    let scenario = fixture_scenario();
    let outcome = run_sweep(
        &scenario.airspace,
        &scenario.profiles,
        &scenario.mission,
        &scenario.sweep,
        &CancelToken::new(),
    )
    .expect("fixture sweep runs");

    assert_eq!(outcome.total_run.len(), 5);
    assert_eq!(outcome.skipped.len(), 1);
    let skipped = &outcome.skipped[0];
    assert_eq!(skipped.altitude_ft, 31_000);
    assert!((skipped.mach - 0.82).abs() < 1e-9);
    assert!(matches!(
        skipped.reason,
        SkipReason::Infeasible {
            phase: FlightPhase::Cruise,
            ..
        }
    ));
}
