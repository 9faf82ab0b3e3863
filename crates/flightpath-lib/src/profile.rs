//! Aircraft performance profiles keyed by altitude and Mach.
//!
//! Profiles are loaded once before any search runs and are read-only
//! afterwards. One [`ProfileTable`] exists per flight phase; [`PhaseProfiles`]
//! bundles the three.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::flight::FlightPhase;

/// Mach number in thousandths, used wherever Mach needs a total order or
/// exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachKey(u32);

impl MachKey {
    pub fn from_mach(mach: f64) -> Self {
        Self((mach * 1000.0).round().max(0.0) as u32)
    }

    pub fn mach(self) -> f64 {
        f64::from(self.0) / 1000.0
    }
}

impl fmt::Display for MachKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{:.3}", self.mach())
    }
}

/// Performance at one (altitude, Mach) flight condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub altitude_ft: u32,
    pub mach: f64,
    pub true_airspeed_kt: f64,
    pub speed_of_sound_kt: f64,
    /// Hourly fuel burn; zero or negative means the condition cannot be sustained.
    pub fuel_burn_kg_per_hr: f64,
}

impl ProfileRow {
    /// Build a row whose true airspeed is derived from Mach and speed of sound.
    pub fn from_mach(
        altitude_ft: u32,
        mach: f64,
        speed_of_sound_kt: f64,
        fuel_burn_kg_per_hr: f64,
    ) -> Self {
        Self {
            altitude_ft,
            mach,
            true_airspeed_kt: mach * speed_of_sound_kt,
            speed_of_sound_kt,
            fuel_burn_kg_per_hr,
        }
    }

    pub fn can_sustain(&self) -> bool {
        self.fuel_burn_kg_per_hr > 0.0
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("mach", self.mach),
            ("true_airspeed_kt", self.true_airspeed_kt),
            ("speed_of_sound_kt", self.speed_of_sound_kt),
            ("fuel_burn_kg_hr", self.fuel_burn_kg_per_hr),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(Error::ProfileData {
                message: format!(
                    "{} must be finite at {} ft / Mach {}",
                    name, self.altitude_ft, self.mach
                ),
            });
        }
        if self.mach <= 0.0 || self.speed_of_sound_kt <= 0.0 || self.true_airspeed_kt < 0.0 {
            return Err(Error::ProfileData {
                message: format!(
                    "mach, speed of sound and airspeed must be positive at {} ft / Mach {}",
                    self.altitude_ft, self.mach
                ),
            });
        }
        Ok(())
    }
}

/// Immutable performance table for a single flight phase.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    phase: FlightPhase,
    rows: BTreeMap<(u32, MachKey), ProfileRow>,
}

impl ProfileTable {
    /// Build a table from rows, rejecting invalid or duplicate conditions.
    pub fn new(phase: FlightPhase, rows: impl IntoIterator<Item = ProfileRow>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for row in rows {
            row.validate()?;
            let key = (row.altitude_ft, MachKey::from_mach(row.mach));
            if table.insert(key, row).is_some() {
                return Err(Error::ProfileData {
                    message: format!(
                        "duplicate {} profile row for {} ft / Mach {:.3}",
                        phase, row.altitude_ft, row.mach
                    ),
                });
            }
        }
        Ok(Self { phase, rows: table })
    }

    /// Load a table from a CSV file.
    pub fn from_path(phase: FlightPhase, path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        Self::from_reader(phase, file).map_err(|err| match err {
            Error::ProfileData { message } => Error::ProfileData {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Load a table from CSV with a header row.
    ///
    /// Headers are matched after normalisation, so `Altitude (ft)`,
    /// `altitude_ft` and `alt` all resolve to the altitude column. The
    /// airspeed column is optional and defaults to Mach times speed of sound.
    pub fn from_reader<R: Read>(phase: FlightPhase, reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::Fields).from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|err| Error::ProfileData {
                message: format!("failed to read profile headers: {err}"),
            })?
            .clone();

        let normalize = |s: &str| {
            s.to_ascii_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect::<String>()
        };
        let normalized_headers: Vec<String> = headers.iter().map(&normalize).collect();

        let synonyms: &[(&str, &[&str])] = &[
            ("altitude", &["altitude_ft", "altitudeft", "altitude", "alt", "fl"]),
            ("mach", &["mach", "mach_number", "m"]),
            (
                "speed",
                &["true_airspeed_kt", "speed_kt", "speedkt", "speedv", "tas", "speed"],
            ),
            (
                "sound",
                &[
                    "speed_of_sound_kt",
                    "speedofsoundkt",
                    "speedofsound",
                    "speed_of_sound",
                    "sos",
                ],
            ),
            (
                "fuel",
                &[
                    "fuel_burn_kg_hr",
                    "fuelburnkghr",
                    "fuel_burn",
                    "fuelburn",
                    "fuel_flow",
                    "ff",
                ],
            ),
        ];

        let mut index_map: BTreeMap<&str, usize> = BTreeMap::new();
        for (canon, alts) in synonyms {
            'outer: for alt in *alts {
                for (i, h) in normalized_headers.iter().enumerate() {
                    if h == alt {
                        index_map.insert(*canon, i);
                        break 'outer;
                    }
                }
            }
        }

        let missing: Vec<&str> = ["altitude", "mach", "sound", "fuel"]
            .into_iter()
            .filter(|c| !index_map.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(Error::ProfileData {
                message: format!(
                    "profile missing required columns: {}. Available: {}",
                    missing.join(", "),
                    headers.iter().collect::<Vec<_>>().join(", ")
                ),
            });
        }

        let mut rows = Vec::new();
        for (offset, result) in csv_reader.records().enumerate() {
            let line = offset + 2;
            let record = result.map_err(|e| Error::ProfileData {
                message: e.to_string(),
            })?;

            let parse = |field: &str| -> Result<Option<f64>> {
                let Some(raw) = index_map.get(field).and_then(|&i| record.get(i)) else {
                    return Ok(None);
                };
                if raw.is_empty() {
                    return Ok(None);
                }
                raw.parse::<f64>()
                    .map(Some)
                    .map_err(|e| Error::ProfileData {
                        message: format!("invalid {} at line {}: {}", field, line, e),
                    })
            };
            let require = |field: &str| -> Result<f64> {
                parse(field)?.ok_or_else(|| Error::ProfileData {
                    message: format!("missing {} at line {}", field, line),
                })
            };

            let altitude = require("altitude")?;
            if altitude < 0.0 || altitude.fract() != 0.0 {
                return Err(Error::ProfileData {
                    message: format!("altitude must be a whole number of feet at line {}", line),
                });
            }
            let mach = require("mach")?;
            let speed_of_sound_kt = require("sound")?;
            let fuel_burn_kg_per_hr = require("fuel")?;
            let true_airspeed_kt = parse("speed")?.unwrap_or(mach * speed_of_sound_kt);

            rows.push(ProfileRow {
                altitude_ft: altitude as u32,
                mach,
                true_airspeed_kt,
                speed_of_sound_kt,
                fuel_burn_kg_per_hr,
            });
        }

        Self::new(phase, rows)
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    /// Row for an exact (altitude, Mach) condition.
    pub fn lookup(&self, altitude_ft: u32, mach: f64) -> Option<&ProfileRow> {
        self.rows.get(&(altitude_ft, MachKey::from_mach(mach)))
    }

    /// Speed of sound recorded for an altitude.
    pub fn speed_of_sound_at(&self, altitude_ft: u32) -> Option<f64> {
        self.rows_at(altitude_ft)
            .next()
            .map(|row| row.speed_of_sound_kt)
    }

    /// Slowest and fastest sustainable Mach at an altitude.
    pub fn mach_envelope(&self, altitude_ft: u32) -> Option<(f64, f64)> {
        self.rows_at(altitude_ft)
            .filter(|row| row.can_sustain())
            .fold(None, |acc, row| match acc {
                None => Some((row.mach, row.mach)),
                Some((lo, hi)) => Some((f64::min(lo, row.mach), f64::max(hi, row.mach))),
            })
    }

    /// Distinct altitudes covered by the table, ascending.
    pub fn altitudes(&self) -> Vec<u32> {
        let seen: BTreeSet<u32> = self.rows.keys().map(|(alt, _)| *alt).collect();
        seen.into_iter().collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &ProfileRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn rows_at(&self, altitude_ft: u32) -> impl Iterator<Item = &ProfileRow> {
        self.rows
            .range((altitude_ft, MachKey(0))..=(altitude_ft, MachKey(u32::MAX)))
            .map(|(_, row)| row)
    }
}

/// Climb, cruise and descent tables used by a sweep.
#[derive(Debug, Clone)]
pub struct PhaseProfiles {
    pub climb: ProfileTable,
    pub cruise: ProfileTable,
    pub descent: ProfileTable,
}

impl PhaseProfiles {
    pub fn for_phase(&self, phase: FlightPhase) -> &ProfileTable {
        match phase {
            FlightPhase::Ascent => &self.climb,
            FlightPhase::Cruise => &self.cruise,
            FlightPhase::Descent => &self.descent,
        }
    }
}
