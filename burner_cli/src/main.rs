//! # Burner Design CLI
//!
//! Command-line front end for `burner_core`: one-off designs, fuel listings,
//! pipe diameter selection and batch runs of project files.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=burner_core=debug burner design methane --power-kw 100`).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use burner_core::file_io::{catalog_for_project, load_catalog, load_project, save_project};
use burner_core::flow_network::{DiameterOptimizationInput, FlowNetworkSolver, PipeMaterial, PipeSegment};
use burner_core::pipeline::{DesignPipeline, PipelineInput, PipelineReport, PipingLayout};
use burner_core::project::{DesignCase, DesignProject, DesignSettings};
use burner_core::units::{Celsius, Kelvin, Kilowatts, Meters, Millibar, Millimeters, Pascals, Watts};
use burner_core::validation::Criterion;
use burner_core::{CalcResult, DesignError, FuelCatalog, Locale, MessageTable};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "burner")]
#[command(about = "Gas burner and combustion chamber design tool", long_about = None)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutputArgs {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Message language (en, cs)
    #[arg(long, global = true, value_parser = parse_locale)]
    locale: Option<Locale>,

    /// Fuel catalog JSON to use instead of the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Design burner, chamber and radiation for one operating point
    Design(DesignArgs),
    /// List fuels in the catalog
    Fuels,
    /// Select the smallest gas pipe meeting loss and velocity limits
    OptimizePipe {
        /// Straight pipe length (m)
        #[arg(long)]
        length: f64,
        /// Gas mass flow (kg/s)
        #[arg(long)]
        mass_flow: f64,
        /// Gas density (kg/m3)
        #[arg(long)]
        density: f64,
        /// Allowed friction loss (Pa)
        #[arg(long)]
        max_loss: f64,
        /// Allowed gas velocity (m/s)
        #[arg(long, default_value_t = 20.0)]
        max_velocity: f64,
        #[arg(long, default_value = "steel_new", value_parser = parse_material)]
        material: PipeMaterial,
    },
    /// Create a project file with one example case
    NewProject {
        /// Output path (.bdp)
        path: PathBuf,
        #[arg(long, default_value = "")]
        engineer: String,
        #[arg(long, default_value = "")]
        job_id: String,
        #[arg(long, default_value = "")]
        client: String,
    },
    /// Run every case of a project file
    RunProject {
        /// Path to the project file
        path: PathBuf,
    },
}

#[derive(Args)]
struct DesignArgs {
    /// Fuel id from the catalog
    fuel: String,

    /// Thermal power (kW)
    #[arg(long)]
    power_kw: f64,

    /// Gas supply pressure (mbar)
    #[arg(long, default_value_t = 30.0)]
    pressure_mbar: f64,

    /// Excess air ratio λ
    #[arg(long, default_value_t = 1.2)]
    excess_air: f64,

    /// Burner port velocity (m/s); derived from power when omitted
    #[arg(long)]
    velocity: Option<f64>,

    /// Chamber residence time (s)
    #[arg(long, default_value_t = 0.5)]
    residence_time: f64,

    /// Insulation thickness (mm)
    #[arg(long, default_value_t = 100.0)]
    insulation_mm: f64,

    /// Ambient temperature (°C)
    #[arg(long, default_value_t = 20.0)]
    ambient_c: f64,

    /// Soot concentration (kg/m3)
    #[arg(long, default_value_t = 0.0)]
    soot: f64,

    /// Supply pipe length (m); adds a piping loss estimate with standard fittings
    #[arg(long)]
    pipe_length: Option<f64>,

    /// Supply pipe internal diameter (mm)
    #[arg(long, default_value_t = 50.0)]
    pipe_diameter_mm: f64,

    #[arg(long, default_value = "steel_new", value_parser = parse_material)]
    pipe_material: PipeMaterial,

    /// Project file to take limits and settings from
    #[arg(long)]
    project: Option<PathBuf>,
}

fn parse_locale(s: &str) -> Result<Locale, String> {
    Locale::parse(s).ok_or_else(|| format!("unknown locale '{}', expected en or cs", s))
}

fn parse_material(s: &str) -> Result<PipeMaterial, String> {
    PipeMaterial::from_str_flexible(s).ok_or_else(|| format!("unknown pipe material '{}'", s))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let out = &cli.output;

    let result = match &cli.command {
        Commands::Design(args) => cmd_design(out, args).map(|()| ExitCode::SUCCESS),
        Commands::Fuels => cmd_fuels(out).map(|()| ExitCode::SUCCESS),
        Commands::OptimizePipe {
            length,
            mass_flow,
            density,
            max_loss,
            max_velocity,
            material,
        } => cmd_optimize_pipe(
            out,
            &DiameterOptimizationInput {
                length: *length,
                mass_flow_rate: *mass_flow,
                gas_density: *density,
                max_pressure_loss: *max_loss,
                material: *material,
                max_velocity: *max_velocity,
            },
        )
        .map(|()| ExitCode::SUCCESS),
        Commands::NewProject {
            path,
            engineer,
            job_id,
            client,
        } => cmd_new_project(path, engineer, job_id, client).map(|()| ExitCode::SUCCESS),
        Commands::RunProject { path } => cmd_run_project(out, path),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            report_error(out, &e);
            ExitCode::FAILURE
        }
    }
}

fn report_error(out: &OutputArgs, error: &DesignError) {
    let table = out.locale.unwrap_or_default().table();
    eprintln!("Error [{}]: {}", error.error_code(), table.error(error));
    if out.json {
        if let Ok(json) = serde_json::to_string_pretty(error) {
            eprintln!("{}", json);
        }
    }
}

fn load_catalog_arg(out: &OutputArgs) -> CalcResult<FuelCatalog> {
    match &out.catalog {
        Some(path) => load_catalog(path),
        None => FuelCatalog::builtin(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| DesignError::SerializationError {
        reason: e.to_string(),
    })?;
    println!("{}", json);
    Ok(())
}

fn cmd_design(out: &OutputArgs, args: &DesignArgs) -> CalcResult<()> {
    let settings = match &args.project {
        Some(path) => load_project(path)?.settings,
        None => DesignSettings::default(),
    };
    let catalog = match (&out.catalog, &settings.catalog_path) {
        (None, Some(path)) => load_catalog(path)?,
        _ => load_catalog_arg(out)?,
    };
    let locale = out.locale.unwrap_or(settings.locale);

    let power: Watts = Kilowatts(args.power_kw).into();
    let pressure: Pascals = Millibar(args.pressure_mbar).into();
    let insulation: Meters = Millimeters(args.insulation_mm).into();
    let ambient: Kelvin = Celsius(args.ambient_c).into();

    let piping = args.pipe_length.map(|length| {
        let diameter: Meters = Millimeters(args.pipe_diameter_mm).into();
        PipingLayout {
            segments: vec![PipeSegment::new(length, diameter.value(), args.pipe_material)],
            fittings: FlowNetworkSolver::with_settings(settings.flow).standard_fittings(diameter.value()),
            viscosity: settings.flow.gas_viscosity,
            gas_density: None,
        }
    });

    let input = PipelineInput {
        excess_air_ratio: args.excess_air,
        target_velocity: args.velocity,
        residence_time: args.residence_time,
        insulation_thickness: insulation.value(),
        ambient_temperature: ambient.value(),
        soot_concentration: args.soot,
        piping,
        ..PipelineInput::new(args.fuel.clone(), power.value(), pressure.value())
    };
    debug!("Design input: {:?}", input);

    let report = DesignPipeline::new(&catalog, &settings).run(&input)?;
    if out.json {
        print_json(&report)
    } else {
        print_report(&report, locale.table());
        Ok(())
    }
}

fn cmd_fuels(out: &OutputArgs) -> CalcResult<()> {
    let catalog = load_catalog_arg(out)?;
    if out.json {
        let fuels: Vec<_> = catalog.fuels().collect();
        return print_json(&fuels);
    }
    println!("{:<14} {:<16} {:<10} {:>10} {:>8} {:>8}", "ID", "Name", "Family", "LHV MJ/kg", "AFR", "M g/mol");
    for fuel in catalog.fuels() {
        println!(
            "{:<14} {:<16} {:<10} {:>10.2} {:>8.2} {:>8.2}",
            fuel.id,
            fuel.name,
            fuel.family.to_string(),
            fuel.lower_heating_value_mass / 1e6,
            fuel.air_fuel_ratio_mass,
            fuel.molecular_weight
        );
    }
    Ok(())
}

fn cmd_optimize_pipe(out: &OutputArgs, input: &DiameterOptimizationInput) -> CalcResult<()> {
    let pipe = FlowNetworkSolver::new().optimize_diameter(input)?;
    if out.json {
        return print_json(&pipe);
    }
    let diameter: Millimeters = Meters(pipe.diameter).into();
    println!("Pipe diameter:   {:.0} mm ({})", diameter.value(), input.material);
    println!("Gas velocity:    {:.2} m/s", pipe.velocity);
    println!("Friction loss:   {:.1} Pa", pipe.pressure_loss);
    println!("Reynolds number: {:.0}", pipe.reynolds);
    println!("Friction factor: {:.4}", pipe.friction_factor);
    Ok(())
}

fn cmd_new_project(path: &Path, engineer: &str, job_id: &str, client: &str) -> CalcResult<()> {
    let mut project = DesignProject::new(engineer, job_id, client);
    let input = PipelineInput {
        target_velocity: Some(5.0),
        ..PipelineInput::new("methane", Watts::from(Kilowatts(100.0)).value(), Pascals::from(Millibar(30.0)).value())
    };
    project.add_case(DesignCase::new("Example 100 kW methane", input));
    save_project(&project, path)?;
    println!("Created {}", path.display());
    Ok(())
}

fn cmd_run_project(out: &OutputArgs, path: &Path) -> CalcResult<ExitCode> {
    let project = load_project(path)?;
    let catalog = match &out.catalog {
        Some(catalog_path) => load_catalog(catalog_path)?,
        None => catalog_for_project(&project)?,
    };
    let table = out.locale.unwrap_or(project.settings.locale).table();

    let cases = project.cases_by_label();
    let inputs: Vec<PipelineInput> = cases.iter().map(|(_, case)| case.input.clone()).collect();
    let results = DesignPipeline::new(&catalog, &project.settings).run_batch(&inputs);
    let failures = failed_cases(&results);

    if out.json {
        let entries: Vec<_> = cases
            .iter()
            .zip(&results)
            .map(|((id, case), result)| {
                serde_json::json!({
                    "id": id,
                    "label": case.label,
                    "result": result,
                })
            })
            .collect();
        print_json(&entries)?;
        return Ok(case_status(failures));
    }

    for ((_, case), result) in cases.iter().zip(&results) {
        println!("=== {} ===", case.label);
        match result {
            Ok(report) => print_report(report, table),
            Err(e) => println!("Error [{}]: {}", e.error_code(), table.error(e)),
        }
        println!();
    }
    println!("{} case(s), {} failed", results.len(), failures);
    Ok(case_status(failures))
}

fn failed_cases(results: &[CalcResult<PipelineReport>]) -> usize {
    results.iter().filter(|r| r.is_err()).count()
}

/// Non-zero exit when any case failed.
fn case_status(failures: usize) -> ExitCode {
    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn status(passed: bool) -> &'static str {
    if passed {
        "[OK]"
    } else {
        "[FAIL]"
    }
}

fn print_report(report: &PipelineReport, table: &dyn MessageTable) {
    let c = &report.combustion;
    let b = &report.burner;
    let ch = &report.chamber;
    let r = &report.radiation;

    println!("Combustion ({})", report.fuel_id);
    println!("  Fuel flow:         {:.5} kg/s", c.fuel_flow_rate);
    println!("  Air flow:          {:.4} kg/s", c.air_flow_rate);
    println!("  Flame temperature: {:.0} °C", Celsius::from(Kelvin(c.adiabatic_flame_temperature)).value());
    println!("  CO2 / O2:          {:.1} % / {:.1} %", c.co2_percent, c.o2_percent);
    println!();
    println!("Burner");
    println!("  Diameter:          {:.1} mm", Millimeters::from(Meters(b.diameter)).value());
    println!("  Length:            {:.1} mm", Millimeters::from(Meters(b.length)).value());
    println!("  Gas velocity:      {:.2} m/s", b.velocity);
    println!("  Pressure drop:     {:.2} Pa", b.pressure_drop);
    println!("  Heat density:      {:.2} MW/m2", b.heat_release_density / 1e6);
    println!("  Flame length:      {:.2} m", b.flame_length);
    println!();
    println!("Chamber");
    println!("  Volume:            {:.3} m3{}", ch.volume, if ch.resized { " (enlarged)" } else { "" });
    println!("  Diameter x length: {:.3} m x {:.3} m", ch.diameter, ch.length);
    println!("  Residence time:    {:.2} s", ch.residence_time);
    println!("  Wall temperature:  {:.0} °C", Celsius::from(Kelvin(ch.wall_temperature)).value());
    println!("  Heat loss:         {:.2} kW", Kilowatts::from(Watts(ch.heat_loss_rate)).value());
    println!("  Efficiency:        {:.1} %", ch.thermal_efficiency * 100.0);
    println!();
    println!("Radiation");
    println!("  Flame emissivity:  {:.3}", r.flame_emissivity);
    println!("  View factor:       {:.3}", r.view_factor);
    println!("  Flame to wall:     {:.2} kW", Kilowatts::from(Watts(r.flame_to_wall)).value());
    println!("  Efficiency:        {:.2} %", r.radiation_efficiency);

    if let Some(p) = &report.piping {
        println!();
        println!("Gas piping");
        println!("  Friction:          {:.1} Pa", p.friction_losses);
        println!("  Fittings:          {:.1} Pa", p.minor_losses);
        println!("  Elevation:         {:.1} Pa", p.elevation_losses);
        println!("  Burner:            {:.1} Pa", p.burner_loss);
        println!("  Required supply:   {:.1} Pa", p.required_supply_pressure);
        if !p.friction_converged {
            println!("  (friction factor not fully converged)");
        }
    }

    println!();
    println!("Checks");
    let validation = report.validation();
    for criterion in Criterion::BURNER.iter().chain(Criterion::CHAMBER.iter()) {
        let passed = validation.passed(*criterion);
        println!("  {:<8} {}", status(passed), table.criterion(*criterion));
    }

    if !report.recommendations.is_empty() {
        println!();
        println!("Recommendations");
        for rec in &report.recommendations {
            println!("  - {}", table.recommendation(rec));
        }
    }
}
