mod common;

use std::fs;

use common::{fixture_scenario, fixtures_dir};
use flightpath_lib::{load_scenario, load_wind_grid, DiagonalMovement, Error, Point};
use tempfile::TempDir;

#[test]
fn fixture_scenario_loads_every_part() {
    let scenario = fixture_scenario();

    assert_eq!(scenario.airspace.altitudes().collect::<Vec<_>>(), vec![31_000, 35_000]);
    let fl310 = scenario.airspace.layer(31_000).expect("layer loaded");
    assert_eq!((fl310.width(), fl310.height()), (12, 6));
    assert_eq!(fl310.cell_size().x_nm, 20.0);
    assert!(!fl310.is_walkable_at(5, 3));
    assert!(scenario.airspace.terminal().is_some());

    assert_eq!(scenario.mission.top_of_descent, Point::new(9, 3));
    assert_eq!(scenario.sweep.machs, vec![0.74, 0.78, 0.82]);
    assert_eq!(scenario.sweep.diagonal, DiagonalMovement::OnlyWhenNoObstacles);
    assert_eq!(scenario.sweep.coefficients.cost_index, 50.0);
    assert!(scenario.rta.is_some());

    let climb = scenario.profiles.climb.lookup(35_000, 0.78).expect("climb row");
    assert_eq!(climb.true_airspeed_kt, 376.0);
    let cruise = scenario.profiles.cruise.lookup(35_000, 0.78).expect("cruise row");
    assert!((cruise.true_airspeed_kt - 0.78 * 576.4).abs() < 1e-9);
}

#[test]
fn relative_paths_resolve_against_manifest_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("data");
    fs::create_dir(&nested).unwrap();
    for name in [
        "winds_fl350.csv",
        "climb_profile.csv",
        "cruise_profile.csv",
        "descent_profile.csv",
    ] {
        fs::copy(fixtures_dir().join(name), nested.join(name)).unwrap();
    }
    let manifest = r#"{
        "layers": [{ "altitude_ft": 35000, "winds": "data/winds_fl350.csv" }],
        "profiles": {
            "climb": "data/climb_profile.csv",
            "cruise": "data/cruise_profile.csv",
            "descent": "data/descent_profile.csv"
        },
        "mission": {
            "departure": { "x": 0, "y": 0 },
            "top_of_climb": { "x": 1, "y": 0 },
            "top_of_descent": { "x": 10, "y": 0 },
            "arrival": { "x": 11, "y": 0 }
        },
        "sweep": { "machs": [0.78], "search_cost_index": 0 }
    }"#;
    let path = dir.path().join("scenario.json");
    fs::write(&path, manifest).unwrap();

    let scenario = load_scenario(&path).expect("scenario loads");
    assert_eq!(scenario.sweep.altitudes_ft, vec![35_000]);
    assert_eq!(scenario.sweep.coefficients.cost_index, 0.0);
    assert!(scenario.airspace.terminal().is_none());
    assert!(scenario.rta.is_none());
    assert_eq!(scenario.cost.time_cost_index, 99.0);
}

#[test]
fn unknown_manifest_fields_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scenario.json");
    fs::write(&path, r#"{ "layers": [], "colour": "red" }"#).unwrap();

    let err = load_scenario(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }), "{err}");
}

/// Copy the FL350 wind layer and the profiles next to a manifest in `dir`.
fn write_manifest(dir: &TempDir, cell_size: &str, search_cost_index: f64) -> std::path::PathBuf {
    for name in [
        "winds_fl350.csv",
        "climb_profile.csv",
        "cruise_profile.csv",
        "descent_profile.csv",
    ] {
        fs::copy(fixtures_dir().join(name), dir.path().join(name)).unwrap();
    }
    let manifest = format!(
        r#"{{
        "cell_size": {cell_size},
        "layers": [{{ "altitude_ft": 35000, "winds": "winds_fl350.csv" }}],
        "profiles": {{
            "climb": "climb_profile.csv",
            "cruise": "cruise_profile.csv",
            "descent": "descent_profile.csv"
        }},
        "mission": {{
            "departure": {{ "x": 0, "y": 0 }},
            "top_of_climb": {{ "x": 1, "y": 0 }},
            "top_of_descent": {{ "x": 10, "y": 0 }},
            "arrival": {{ "x": 11, "y": 0 }}
        }},
        "sweep": {{ "machs": [0.78], "search_cost_index": {search_cost_index} }}
    }}"#
    );
    let path = dir.path().join("scenario.json");
    fs::write(&path, manifest).unwrap();
    path
}

#[test]
fn non_positive_cell_size_is_rejected() {
    let valid = TempDir::new().unwrap();
    let path = write_manifest(&valid, r#"{ "x_nm": 20.0, "y_nm": 20.0 }"#, 50.0);
    assert!(load_scenario(&path).is_ok());

    for cell_size in [
        r#"{ "x_nm": 0.0, "y_nm": 20.0 }"#,
        r#"{ "x_nm": 20.0, "y_nm": -1.0 }"#,
    ] {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir, cell_size, 50.0);
        let err = load_scenario(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }), "{err}");
        assert!(err.to_string().contains("cell size"), "{err}");
    }
}

#[test]
fn negative_search_cost_index_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_manifest(&dir, r#"{ "x_nm": 20.0, "y_nm": 20.0 }"#, -5.0);
    let err = load_scenario(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }), "{err}");
    assert!(err.to_string().contains("cost_index"), "{err}");
}

#[test]
fn missing_wind_file_is_an_io_error() {
    let err = load_wind_grid(&fixtures_dir().join("winds_fl999.csv")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
