//! Output formatting for flight plans and feasibility checks.

use std::io::{self, Write};

use clap::ValueEnum;
use flightpath_lib::{
    Feasibility, FlightPhase, FlightPlan, MachKey, Objective, OptimalPath, Point, RtaOutcome,
};
use serde::Serialize;

use crate::terminal::{format_with_separators, path_arrow, ColorPalette};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Styling choices for text output.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub palette: ColorPalette,
    pub unicode: bool,
}

impl TextStyle {
    pub fn plain() -> Self {
        Self {
            palette: ColorPalette::plain(),
            unicode: false,
        }
    }
}

/// Feasibility of one phase at a single flight condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseCheck {
    pub phase: FlightPhase,
    pub altitude_ft: u32,
    pub mach: f64,
    pub feasibility: Feasibility,
}

/// Write any serialisable value to stdout as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization or writing fails.
pub fn render_json<T: Serialize>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(io::Error::other)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Write a flight plan as a text report.
pub fn write_plan_text<W: Write>(out: &mut W, plan: &FlightPlan, style: TextStyle) -> io::Result<()> {
    let p = style.palette;

    writeln!(
        out,
        "{}Sweep:{} {} runs completed, {} skipped",
        p.heading,
        p.reset,
        plan.total_run.len(),
        plan.skipped.len()
    )?;
    for skipped in &plan.skipped {
        writeln!(
            out,
            "  {}skipped{} {} @ {} ft: {}",
            p.warn,
            p.reset,
            MachKey::from_mach(skipped.mach),
            skipped.altitude_ft,
            skipped.reason
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}Optimal paths:{}", p.heading, p.reset)?;
    if plan.optimal.is_empty() {
        writeln!(out, "  {}none{} (no run completed)", p.bad, p.reset)?;
    }
    for objective in Objective::ALL {
        if let Some(path) = plan.optimal.get(objective) {
            write_optimal(out, path, style)?;
        }
    }

    if let Some(rta) = &plan.rta {
        writeln!(out)?;
        write_rta(out, rta, p)?;
    }
    Ok(())
}

fn write_optimal<W: Write>(out: &mut W, path: &OptimalPath, style: TextStyle) -> io::Result<()> {
    let p = style.palette;
    writeln!(
        out,
        "  {}{:<7}{} {} @ {} ft  fuel {} kg  time {:.3} h  distance {:.1} nm  wind {:+.1} kt  cost {:.1}",
        p.label,
        path.objective.to_string(),
        p.reset,
        MachKey::from_mach(path.mach),
        path.altitude_ft,
        format_with_separators(path.fuel_kg.round().max(0.0) as u64),
        path.time_h,
        path.distance_nm,
        path.average_wind_kt,
        path.flight_cost
    )?;
    writeln!(
        out,
        "          {}cruise {}{}",
        p.muted,
        format_path(&path.path, style.unicode),
        p.reset
    )
}

fn write_rta<W: Write>(out: &mut W, rta: &RtaOutcome, p: ColorPalette) -> io::Result<()> {
    match rta {
        RtaOutcome::Feasible(solution) => writeln!(
            out,
            "{}RTA:{} {}feasible{} at Mach {:.3} (ground speed {:.1} kt, window {:.3}-{:.3} h)",
            p.heading,
            p.reset,
            p.good,
            p.reset,
            solution.required_mach,
            solution.required_ground_speed_kt,
            solution.window.earliest_h,
            solution.window.latest_h
        ),
        RtaOutcome::OutOfMachBand {
            required_mach,
            min_mach,
            max_mach,
        } => writeln!(
            out,
            "{}RTA:{} {}out of Mach band{}: needs Mach {:.3}, allowed {:.3}-{:.3}",
            p.heading, p.reset, p.bad, p.reset, required_mach, min_mach, max_mach
        ),
        RtaOutcome::OutsideArrivalWindow {
            requested_h,
            window,
        } => writeln!(
            out,
            "{}RTA:{} {}outside arrival window{}: {:.3} h requested, achievable {:.3}-{:.3} h",
            p.heading, p.reset, p.bad, p.reset, requested_h, window.earliest_h, window.latest_h
        ),
        RtaOutcome::NoBaselinePath => writeln!(
            out,
            "{}RTA:{} {}no fuel-optimal path to retime{}",
            p.heading, p.reset, p.bad, p.reset
        ),
    }
}

/// Write per-phase feasibility as a table.
pub fn write_checks_text<W: Write>(
    out: &mut W,
    checks: &[PhaseCheck],
    palette: ColorPalette,
) -> io::Result<()> {
    for check in checks {
        let colour = if check.feasibility.is_feasible() {
            palette.good
        } else {
            palette.bad
        };
        writeln!(
            out,
            "{}{:<8}{} {} ft  {}  {}{}{}",
            palette.label,
            check.phase.to_string(),
            palette.reset,
            check.altitude_ft,
            MachKey::from_mach(check.mach),
            colour,
            check.feasibility,
            palette.reset
        )?;
    }
    Ok(())
}

fn format_path(path: &[Point], unicode: bool) -> String {
    path.iter()
        .map(Point::to_string)
        .collect::<Vec<_>>()
        .join(path_arrow(unicode))
}
