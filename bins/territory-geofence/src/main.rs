//! territory-geofence - Geofence membership for territories
//!
//! Distance, containment, and per-territory membership over backend JSON exports.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use territory_cli::output::{format_count, format_distance, format_duration, format_membership, Status};
use territory_cli::progress;
use territory_core::config::Config;
use territory_core::error::exit_codes;
use territory_core::{Error, ResultExt};
use territory_geo::records::{parse_point_records, parse_territories, parse_territory, record_id};
use territory_geo::{distance_meters, territories_containing, Category, GeoPoint, MembershipEngine};
use territory_telemetry::{metrics, names, timed_span, TelemetryConfig, Timer};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "territory-geofence")]
#[command(about = "Geofence membership for territories, pins, and posts")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Configuration file (defaults to .territory.toml lookup)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Great-circle distance between two points
    Distance {
        /// First point as LAT,LNG
        #[arg(allow_hyphen_values = true)]
        from: GeoPoint,
        /// Second point as LAT,LNG
        #[arg(allow_hyphen_values = true)]
        to: GeoPoint,
    },

    /// List the territories that contain a point
    Contains {
        /// JSON array of territory records
        territories: PathBuf,
        /// Point as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        point: GeoPoint,
    },

    /// Per-territory counts and scores for a set of points
    Membership {
        /// JSON array of territory records
        territories: PathBuf,
        /// JSON array of pin, post, or comment records
        points: PathBuf,
        /// Category for records without a `type` field
        #[arg(long)]
        default_category: Option<String>,
        /// Include the contained points in the output
        #[arg(long)]
        include_points: bool,
    },

    /// Check every territory record and report the invalid ones
    Validate {
        /// JSON array of territory records
        territories: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = TelemetryConfig {
        json: cli.format == OutputFormat::Json,
        ..TelemetryConfig::verbose(cli.verbose)
    };
    if let Err(e) = territory_telemetry::init_with_config(telemetry) {
        eprintln!("{}", e);
    }

    match run(&cli) {
        Ok(code) => exit(code),
        Err(err) => {
            let code = match err.downcast_ref::<Error>() {
                Some(error) => {
                    report_error(error, cli.format);
                    error.exit_code()
                }
                None => {
                    Status::error(&format!("{:#}", err));
                    exit_codes::FAILURE
                }
            };
            exit(code)
        }
    }
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn report_error(error: &Error, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let report = json!({ "error": error.to_report() });
            println!("{}", report);
        }
        OutputFormat::Text => Status::error(&error.to_string()),
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let config = Config::load(cli.config.as_deref())?;
    if let Some(path) = &config.path {
        debug!(path = %path.display(), "Using configuration file");
    }

    match &cli.command {
        Commands::Distance { from, to } => run_distance(from, to, cli.format),
        Commands::Contains { territories, point } => run_contains(territories, point, cli.format),
        Commands::Membership {
            territories,
            points,
            default_category,
            include_points,
        } => {
            let options = MembershipOptions {
                default_category: Category::from(
                    default_category
                        .as_deref()
                        .unwrap_or(&config.schema.output.default_category),
                ),
                include_points: *include_points || config.schema.output.include_points,
            };
            run_membership(territories, points, &options, &config, cli)
        }
        Commands::Validate { territories } => run_validate(territories, &config, cli.format),
    }
}

/// Read and parse a JSON input file.
fn read_json(path: &Path) -> territory_core::Result<Value> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let content = std::fs::read_to_string(path).context(format!("While reading {}", path.display()))?;
    serde_json::from_str(&content).context(format!("While parsing {}", path.display()))
}

fn run_distance(from: &GeoPoint, to: &GeoPoint, format: OutputFormat) -> Result<i32> {
    let meters = distance_meters(from, to);

    match format {
        OutputFormat::Json => {
            let output = json!({
                "from": from,
                "to": to,
                "meters": meters,
                "kilometers": meters / 1000.0,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("{} -> {}: {}", from, to, format_distance(meters));
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn run_contains(path: &Path, point: &GeoPoint, format: OutputFormat) -> Result<i32> {
    let territories = parse_territories(&read_json(path)?)
        .context(format!("While reading territories from {}", path.display()))?;
    metrics().increment_by(names::TERRITORIES_LOADED, territories.len() as u64);

    let ids = territories_containing(point, &territories).map_err(Error::from)?;

    match format {
        OutputFormat::Json => {
            let output = json!({ "point": point, "territories": ids });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text if ids.is_empty() => {
            Status::info(&format!("No territory contains {}", point));
        }
        OutputFormat::Text => {
            for id in &ids {
                println!("{}", id);
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}

struct MembershipOptions {
    default_category: Category,
    include_points: bool,
}

fn run_membership(
    territories_path: &Path,
    points_path: &Path,
    options: &MembershipOptions,
    config: &Config,
    cli: &Cli,
) -> Result<i32> {
    let territories = parse_territories(&read_json(territories_path)?)
        .context(format!("While reading territories from {}", territories_path.display()))?;
    let points = parse_point_records(&read_json(points_path)?, &options.default_category)
        .context(format!("While reading points from {}", points_path.display()))?;

    metrics().increment_by(names::TERRITORIES_LOADED, territories.len() as u64);
    metrics().increment_by(names::POINTS_LOADED, points.len() as u64);

    let engine = MembershipEngine::new(config.schema.scoring_policy())
        .with_strict_coordinates(config.schema.validation.strict_coordinates);

    let spinner = (cli.format == OutputFormat::Text).then(|| {
        progress::spinner(&format!(
            "Computing {} over {}",
            format_count(territories.len(), "territory", "territories"),
            format_count(points.len(), "point", "points")
        ))
    });

    let timer = Timer::start(names::MEMBERSHIP_MS);
    let results = match engine.compute_all(&territories, &points) {
        Ok(results) => results,
        Err(e) => {
            if let Some(pb) = &spinner {
                progress::finish_error(pb, "Membership failed");
            }
            return Err(Error::from(e).into());
        }
    };
    let elapsed = timer.stop();

    let contained: usize = results.iter().map(|r| r.total_points()).sum();
    metrics().increment_by(names::POINTS_CONTAINED, contained as u64);
    let largest = results.iter().map(|r| r.total_points()).max().unwrap_or(0);
    metrics().gauge(names::LARGEST_TERRITORY_POINTS, largest as u64);

    if let Some(pb) = &spinner {
        progress::finish_success(pb, &format!("Done in {}", format_duration(elapsed)));
    }

    match cli.format {
        OutputFormat::Json => {
            let memberships: Vec<Value> = if options.include_points {
                results
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<serde_json::Result<_>>()?
            } else {
                results.iter().map(|r| r.summary_json()).collect()
            };

            let output = if cli.verbose {
                json!({ "memberships": memberships, "metrics": metrics().export_json() })
            } else {
                Value::Array(memberships)
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            Status::header("Territory membership");
            for result in &results {
                println!("{}", format_membership(result));
                if options.include_points {
                    for point in &result.contained_points {
                        let id = point.id.as_deref().unwrap_or("-");
                        println!("    {} {} {}", id, point.category, point.location);
                    }
                }
            }
        }
    }

    Ok(exit_codes::SUCCESS)
}

fn run_validate(path: &Path, config: &Config, format: OutputFormat) -> Result<i32> {
    let value = read_json(path)?;
    let records = value
        .as_array()
        .ok_or_else(|| Error::input(format!("{}: expected a JSON array of territory records", path.display())))?;

    let engine = MembershipEngine::default()
        .with_strict_coordinates(config.schema.validation.strict_coordinates);

    timed_span!(names::VALIDATE_MS, records = records.len());
    let mut invalid = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let checked = parse_territory(record).and_then(|territory| engine.check(&territory, &[]));
        if let Err(e) = checked {
            let id = record_id(record);
            warn!(index, id = id.as_deref().unwrap_or("-"), error = %e, "Invalid territory");
            invalid.push(json!({ "index": index, "id": id, "code": e.code() as u32, "error": e.to_string() }));
        }
    }
    metrics().increment_by(names::TERRITORIES_LOADED, records.len() as u64);
    metrics().increment_by(names::INVALID_TERRITORIES, invalid.len() as u64);

    let valid = records.len() - invalid.len();
    match format {
        OutputFormat::Json => {
            let output = json!({ "valid": valid, "invalid": invalid });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            for entry in &invalid {
                Status::error(&format!(
                    "record {}: {}",
                    entry["index"],
                    entry["error"].as_str().unwrap_or_default()
                ));
            }
            if invalid.is_empty() {
                Status::success(&format!(
                    "All {} valid",
                    format_count(records.len(), "territory is", "territories are")
                ));
            } else {
                Status::warning(&format!(
                    "{} of {} invalid",
                    format_count(invalid.len(), "territory", "territories"),
                    records.len()
                ));
            }
        }
    }

    if invalid.is_empty() {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::VALIDATION_ERROR)
    }
}
