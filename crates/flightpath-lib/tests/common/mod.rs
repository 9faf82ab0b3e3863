//! Shared fixtures and builders for integration tests.

use std::path::PathBuf;

use flightpath_lib::{
    load_scenario, AltitudeRun, FlightPhase, PhaseProfiles, PhaseResult, Point, ProfileRow,
    ProfileTable, Scenario,
};

/// Path to the fixtures directory shared by the workspace.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// The sample scenario: two wind layers, a terminal grid and three profiles.
#[allow(dead_code)]
pub fn fixture_scenario() -> Scenario {
    load_scenario(&fixtures_dir().join("scenario.json")).expect("fixture scenario loads")
}

/// Profiles with one sustainable row per (altitude, Mach) in every phase.
#[allow(dead_code)]
pub fn uniform_profiles(altitudes: &[u32], machs: &[f64], speed_of_sound_kt: f64) -> PhaseProfiles {
    let table = |phase: FlightPhase, burn: f64| {
        let rows = altitudes.iter().flat_map(|&altitude_ft| {
            machs.iter().map(move |&mach| {
                ProfileRow::from_mach(altitude_ft, mach, speed_of_sound_kt, burn * mach)
            })
        });
        ProfileTable::new(phase, rows.collect::<Vec<_>>()).expect("uniform profile is valid")
    };
    PhaseProfiles {
        climb: table(FlightPhase::Ascent, 4000.0),
        cruise: table(FlightPhase::Cruise, 3000.0),
        descent: table(FlightPhase::Descent, 1200.0),
    }
}

/// A run whose cruise phase carries all of the fuel and time.
#[allow(dead_code)]
pub fn altitude_run(mach: f64, altitude_ft: u32, fuel_kg: f64, time_h: f64) -> AltitudeRun {
    let idle = |phase| PhaseResult {
        phase,
        distance_nm: 0.0,
        fuel_kg: 0.0,
        time_h: 0.0,
        average_wind_kt: 0.0,
        path: vec![Point::new(0, 0)],
    };
    AltitudeRun {
        mach,
        altitude_ft,
        ascent: idle(FlightPhase::Ascent),
        cruise: PhaseResult {
            phase: FlightPhase::Cruise,
            distance_nm: 100.0,
            fuel_kg,
            time_h,
            average_wind_kt: 0.0,
            path: vec![Point::new(0, 0), Point::new(1, 0)],
        },
        descent: idle(FlightPhase::Descent),
    }
}
