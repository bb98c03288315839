//! Top-level CLI definition and dispatch.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use prisoner_sim::control::signals::CancelToken;
use prisoner_sim::core::config::Config;
use prisoner_sim::core::errors::SimError;
use prisoner_sim::logger::experiment_log::ExperimentLog;
use prisoner_sim::render::chart::SvgChartRenderer;
use prisoner_sim::sim::permutation::seeded_rng;
use prisoner_sim::sim::runner::{ExperimentParams, run_experiments};
use prisoner_sim::sim::scaling::{StopReason, run_scaling};
use prisoner_sim::sim::sweep::{SeriesRenderer, SweepDriver, SweepParams};

/// Monte Carlo simulator for the 100 prisoners problem.
#[derive(Debug, Parser)]
#[command(
    name = "prisoners",
    author,
    version,
    about = "100 Prisoners Problem - Monte Carlo Simulator",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Seed the random number generator for a reproducible run.
    #[arg(long, global = true, value_name = "SEED")]
    seed: Option<u64>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Run a batch of experiments with a fixed number of prisoners.
    Run(RunArgs),
    /// Sweep the number of prisoners and chart the success rate.
    Plot(PlotArgs),
    /// Time single trials at growing prisoner counts until interrupted.
    ///
    /// Also stops on its own once the next count would pass the ceiling
    /// (`scaling.max_prisoners`, 100000000 by default, or `--max`).
    #[command(visible_alias = "test")]
    Scale(ScaleArgs),
    /// Inspect configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionArgs),
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Number of prisoners (even, >= 2).
    #[arg(value_name = "PRISONERS")]
    prisoners: usize,
    /// Number of experiments (>= 1).
    #[arg(value_name = "EXPERIMENTS")]
    experiments: usize,
    /// Experiment log path (overrides config).
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct PlotArgs {
    /// First prisoner count (even, >= 2).
    #[arg(value_name = "START")]
    start: usize,
    /// Last prisoner count (even, >= START).
    #[arg(value_name = "END")]
    end: usize,
    /// Experiments per prisoner count (>= 1).
    #[arg(value_name = "EXPERIMENTS")]
    experiments: usize,
    /// Chart output path (overrides config).
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Experiment log path (overrides config).
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ScaleArgs {
    /// First prisoner count (overrides config).
    #[arg(long, value_name = "N")]
    start: Option<usize>,
    /// Ceiling: stop once the next prisoner count would exceed this
    /// [default from config: 100000000].
    #[arg(long, value_name = "N")]
    max: Option<usize>,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print the config file path.
    Path,
    /// Print the effective configuration.
    Show,
}

#[derive(Debug, Clone, Args)]
struct CompletionArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

impl From<SimError> for CliError {
    fn from(err: SimError) -> Self {
        if err.is_user_error() {
            Self::User(err.to_string())
        } else {
            Self::Runtime(err.to_string())
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Run(args) => run_batch(cli, args),
        Command::Plot(args) => run_plot(cli, args),
        Command::Scale(args) => run_scale(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// run: fixed-N batch
// ---------------------------------------------------------------------------

fn run_batch(cli: &Cli, args: &RunArgs) -> Result<(), CliError> {
    let params = ExperimentParams::new(args.prisoners, args.experiments)?;
    let config = Config::load(cli.config.as_deref())?;
    let mode = output_mode(cli);
    let seed = effective_seed(cli, &config);
    let log_path = args.log_file.as_ref().unwrap_or(&config.output.log_file);

    if cli.verbose && mode == OutputMode::Human {
        print_run_context(seed, log_path);
    }

    let cancel = CancelToken::with_interrupts();
    let mut log = ExperimentLog::reset(log_path, config.output.log_format)?;
    let mut rng = seeded_rng(Some(seed));
    let summary = run_experiments(&params, &mut rng, &mut log, Some(&cancel));
    let lines = log.lines_written();
    log.close()?;

    match mode {
        OutputMode::Human => {
            if summary.interrupted {
                println!(
                    "{}",
                    format!(
                        "Interrupted after {} of {} experiments.",
                        summary.trials, summary.requested
                    )
                    .yellow()
                );
            }
            println!(
                "After {} experiments with {} prisoners:",
                summary.trials, summary.prisoners
            );
            println!(
                "Average success rate: {}",
                format!("{:.4}", summary.success_rate()).bold()
            );
            println!("Execution time: {:.6} seconds.", secs(summary.elapsed));
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "run",
                "prisoners": summary.prisoners,
                "requested": summary.requested,
                "experiments": summary.trials,
                "successes": summary.successes,
                "success_rate": summary.success_rate(),
                "interrupted": summary.interrupted,
                "elapsed_secs": secs(summary.elapsed),
                "seed": seed,
                "log_file": log_path.to_string_lossy(),
                "log_lines": lines,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// plot: N sweep
// ---------------------------------------------------------------------------

fn run_plot(cli: &Cli, args: &PlotArgs) -> Result<(), CliError> {
    let params = SweepParams::new(args.start, args.end, args.experiments)?;
    let config = Config::load(cli.config.as_deref())?;
    let mode = output_mode(cli);
    let seed = effective_seed(cli, &config);
    let log_path = args.log_file.as_ref().unwrap_or(&config.output.log_file);
    let plot_path = args.output.as_ref().unwrap_or(&config.output.plot_file);

    if cli.verbose && mode == OutputMode::Human {
        print_run_context(seed, log_path);
    }

    let cancel = CancelToken::with_interrupts();
    let mut renderer = SvgChartRenderer::new(plot_path, &config.plot);
    let mut log = ExperimentLog::reset(log_path, config.output.log_format)?;
    let mut rng = seeded_rng(Some(seed));

    let report = SweepDriver::new(&mut rng, &mut log)
        .with_cancel(&cancel)
        .run(&params, &mut renderer, |point| {
            if mode == OutputMode::Human {
                println!(
                    "Prisoners: {}, Success Rate: {:.4}",
                    point.prisoners, point.success_rate
                );
            }
        })?;
    log.close()?;

    let plot_file = if report.interrupted {
        None
    } else {
        renderer.destination()
    };

    match mode {
        OutputMode::Human => {
            match plot_file {
                Some(path) => println!("Plot saved as {}.", path.display().to_string().green()),
                None => println!("{}", "Sweep interrupted; plot not written.".yellow()),
            }
            println!("Execution time: {:.6} seconds.", secs(report.elapsed));
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "plot",
                "start": params.start(),
                "end": params.end(),
                "experiments": params.trials(),
                "points": report.series.points,
                "interrupted": report.interrupted,
                "plot_file": plot_file.map(|p| p.to_string_lossy()),
                "log_file": log_path.to_string_lossy(),
                "elapsed_secs": secs(report.elapsed),
                "seed": seed,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// scale: execution-time test
// ---------------------------------------------------------------------------

fn run_scale(cli: &Cli, args: &ScaleArgs) -> Result<(), CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(start) = args.start {
        config.scaling.start_prisoners = start;
    }
    if let Some(max) = args.max {
        config.scaling.max_prisoners = max;
    }
    config.validate()?;

    let mode = output_mode(cli);
    let seed = effective_seed(cli, &config);
    let cancel = CancelToken::with_interrupts();
    let mut rng = seeded_rng(Some(seed));

    if mode == OutputMode::Human {
        if cli.verbose {
            println!("Seed: {seed}");
        }
        println!("Use Ctrl+C to stop the execution time test.");
    }

    let mut write_error = None;
    let report = run_scaling(&config.scaling, &mut rng, &cancel, |sample| match mode {
        OutputMode::Human => println!(
            "Number of prisoners: {} -> Experiment execution time: {:.6} seconds.",
            sample.prisoners,
            secs(sample.elapsed)
        ),
        OutputMode::Json => {
            let payload = json!({
                "command": "scale",
                "prisoners": sample.prisoners,
                "success": sample.success,
                "elapsed_secs": secs(sample.elapsed),
            });
            if let Err(e) = write_json_line(&payload)
                && write_error.is_none()
            {
                write_error = Some(e);
                cancel.cancel();
            }
        }
    });
    if let Some(e) = write_error {
        return Err(e);
    }

    match mode {
        OutputMode::Human => match report.stop {
            StopReason::Cancelled => println!("{}", "Test stopped.".yellow()),
            StopReason::Ceiling => println!(
                "Test stopped: the next prisoner count would exceed {}.",
                config.scaling.max_prisoners
            ),
        },
        OutputMode::Json => {
            let payload = json!({
                "command": "scale",
                "stop": report.stop,
                "samples": report.samples,
                "largest": report.largest,
                "seed": seed,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => println!("{}", config.to_toml()?),
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "source": config.source.to_string_lossy(),
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn effective_seed(cli: &Cli, config: &Config) -> u64 {
    cli.seed
        .or(config.simulation.seed)
        .unwrap_or_else(rand::random::<u64>)
}

fn print_run_context(seed: u64, log_path: &Path) {
    println!("Seed: {seed}");
    println!("Log file: {}", log_path.display());
}

fn secs(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64()
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("PSIM_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

/// `--json` wins, then `PSIM_OUTPUT_FORMAT=json`; anything else is human text,
/// including when stdout is piped.
fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    let env_json = env_mode.is_some_and(|mode| mode.trim().eq_ignore_ascii_case("json"));
    if json_flag || env_json {
        OutputMode::Json
    } else {
        OutputMode::Human
    }
}
