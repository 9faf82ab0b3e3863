//! Plan command handler: sweep, select optima and optionally retime for an RTA.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use flightpath_lib::{
    load_scenario, plan_flight, CancelToken, FlightPlanRequest, Parallelism, RtaRequest, Scenario,
};

use crate::output::{render_json, write_plan_text, OutputFormat, TextStyle};
use crate::terminal::{supports_unicode, ColorPalette};

/// Arguments for the plan command.
#[derive(Debug, Clone)]
pub struct PlanCommandArgs {
    pub scenario: PathBuf,
    pub parallelism: Parallelism,
    /// Overrides the scenario's custom cost index.
    pub custom_cost_index: Option<f64>,
    /// Overrides the scenario's time cost index.
    pub time_cost_index: Option<f64>,
    /// Cost index steering the searches; defaults to the scenario's.
    pub search_cost_index: Option<f64>,
    pub rta_hours: Option<f64>,
    pub min_mach: Option<f64>,
    pub max_mach: Option<f64>,
    /// Ignore any RTA configured in the scenario.
    pub no_rta: bool,
    pub format: OutputFormat,
}

pub fn handle_plan(args: &PlanCommandArgs) -> Result<()> {
    let scenario = load_scenario(&args.scenario)
        .with_context(|| format!("failed to load scenario {}", args.scenario.display()))?;
    let request = build_request(&scenario, args)?;

    let plan = plan_flight(&scenario, &request, &CancelToken::new())
        .context("flight planning failed")?;

    match args.format {
        OutputFormat::Json => render_json(&plan).context("failed to write JSON output")?,
        OutputFormat::Text => {
            let style = TextStyle {
                palette: ColorPalette::detect(),
                unicode: supports_unicode(),
            };
            write_plan_text(&mut io::stdout().lock(), &plan, style)
                .context("failed to write plan")?;
        }
    }
    Ok(())
}

/// Merge command-line overrides into the scenario's own settings.
pub fn build_request(scenario: &Scenario, args: &PlanCommandArgs) -> Result<FlightPlanRequest> {
    let mut request = scenario.plan_request();
    request.sweep.parallelism = args.parallelism;

    if let Some(ci) = args.custom_cost_index {
        request.cost.custom_cost_index = ci;
    }
    if let Some(ci) = args.time_cost_index {
        request.cost.time_cost_index = ci;
    }
    if let Some(ci) = args.search_cost_index {
        request.sweep.coefficients.cost_index = ci;
    }

    request.rta = if args.no_rta {
        None
    } else {
        match (args.rta_hours, request.rta) {
            (None, configured) => configured.map(|rta| RtaRequest {
                min_mach: args.min_mach.unwrap_or(rta.min_mach),
                max_mach: args.max_mach.unwrap_or(rta.max_mach),
                ..rta
            }),
            (Some(hours), configured) => {
                let min_mach = args.min_mach.or(configured.map(|rta| rta.min_mach));
                let max_mach = args.max_mach.or(configured.map(|rta| rta.max_mach));
                let (Some(min_mach), Some(max_mach)) = (min_mach, max_mach) else {
                    bail!("--rta-hours needs --min-mach and --max-mach when the scenario has no RTA band");
                };
                Some(RtaRequest {
                    available_time_h: hours,
                    min_mach,
                    max_mach,
                })
            }
        }
    };

    tracing::debug!(
        "plan request: {} Mach x {} altitudes, rta={}",
        request.sweep.machs.len(),
        request.sweep.altitudes_ft.len(),
        request.rta.is_some()
    );
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn scenario() -> Scenario {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/scenario.json");
        load_scenario(&path).expect("fixture scenario")
    }

    fn args() -> PlanCommandArgs {
        PlanCommandArgs {
            scenario: PathBuf::new(),
            parallelism: Parallelism::Sequential,
            custom_cost_index: None,
            time_cost_index: None,
            search_cost_index: None,
            rta_hours: None,
            min_mach: None,
            max_mach: None,
            no_rta: false,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn overrides_replace_scenario_settings() {
        let scenario = scenario();
        let request = build_request(
            &scenario,
            &PlanCommandArgs {
                custom_cost_index: Some(20.0),
                search_cost_index: Some(0.0),
                rta_hours: Some(0.6),
                ..args()
            },
        )
        .unwrap();

        assert_eq!(request.sweep.parallelism, Parallelism::Sequential);
        assert_eq!(request.cost.custom_cost_index, 20.0);
        assert_eq!(request.cost.time_cost_index, 99.0);
        assert_eq!(request.sweep.coefficients.cost_index, 0.0);
        let rta = request.rta.expect("rta kept");
        assert_eq!(rta.available_time_h, 0.6);
        assert_eq!((rta.min_mach, rta.max_mach), (0.71, 0.81));
    }

    #[test]
    fn no_rta_drops_configured_request() {
        let request = build_request(
            &scenario(),
            &PlanCommandArgs {
                no_rta: true,
                ..args()
            },
        )
        .unwrap();
        assert!(request.rta.is_none());
    }
}
