use anyhow::{Context, Result};
use clap::Parser;
use graphcheck_config::{ConfigLoader, GraphcheckConfig};
use graphcheck_http::{HttpClient, HttpConfig, RestClient};
use graphcheck_load::{LoadOptions, LoadRun, SystemProbe};
use graphcheck_logging::init_logging_from_config;
use graphcheck_runner::{RunnerOptions, ScenarioRunner};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

mod cli;

use cli::{Cli, Commands, ConfigCommands};

/// Load configuration from file or use defaults
fn load_config(config_path: Option<&PathBuf>) -> Result<GraphcheckConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            if path.exists() {
                info!("Loading configuration from: {:?}", path);
                loader
                    .from_file(path)
                    .context(format!("Failed to load configuration from {:?}", path))
            } else {
                warn!("Configuration file not found: {:?}. Using defaults.", path);
                loader
                    .from_env()
                    .context("Failed to load configuration from environment")
            }
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .from_env()
                .context("Failed to load configuration from environment")
        }
    }
}

/// Fold command line flags over the loaded configuration. Flags are the
/// last layer, so the result is validated again.
fn apply_cli_overrides(config: &mut GraphcheckConfig, cli: &Cli) -> Result<()> {
    if let Some(endpoint) = &cli.endpoint {
        config.target.endpoint = endpoint.clone();
    }

    match &cli.command {
        Commands::Scenarios {
            seed,
            filter,
            report_json,
            strict,
            shutdown,
        } => {
            if seed.is_some() {
                config.scenarios.seed = *seed;
            }
            if filter.is_some() {
                config.scenarios.filter = filter.clone();
            }
            if report_json.is_some() {
                config.scenarios.report_path = report_json.clone();
            }
            config.scenarios.strict |= *strict;
            config.target.shutdown_on_exit |= *shutdown;
        }
        Commands::Load {
            kind,
            objects,
            interval,
            seed,
            output,
        } => {
            if let Some(kind) = kind {
                config.load.kind = *kind;
            }
            if let Some(objects) = objects {
                config.load.objects = *objects;
            }
            if let Some(interval) = interval {
                config.load.interval = *interval;
            }
            if seed.is_some() {
                config.load.seed = *seed;
            }
            if output.is_some() {
                config.load.output = output.clone();
            }
        }
        Commands::List { .. } | Commands::Config { .. } => {}
    }

    config
        .validate_all()
        .context("Invalid configuration after applying command line flags")
}

fn build_client(config: &GraphcheckConfig) -> Result<RestClient> {
    let http_config = HttpConfig::from_config(config.target.endpoint.clone(), config.http.clone());
    RestClient::new(http_config).context("Failed to build HTTP client")
}

/// Run the scenario catalog and return the process exit code
async fn scenarios_command(config: &GraphcheckConfig) -> Result<i32> {
    let client = Arc::new(build_client(config)?);
    let options = RunnerOptions::from(&config.scenarios);
    let mut runner = ScenarioRunner::new(
        client.clone() as Arc<dyn HttpClient>,
        graphcheck_scenarios::catalog(),
        options,
    );

    let report = match runner.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("Scenario run aborted: {}", e);
            println!("❌ {}", e);
            return Ok(1);
        }
    };

    println!("{}", report.render_table());

    if let Some(path) = &config.scenarios.report_path {
        report
            .write_json(path)
            .context(format!("Failed to write report to {:?}", path))?;
        println!("📝 JSON report written to: {:?}", path);
    }

    if config.target.shutdown_on_exit {
        client.shutdown().await;
    }

    Ok(report.exit_code())
}

/// Run the three load phases and write the dataset
async fn load_command(config: &GraphcheckConfig) -> Result<i32> {
    let client: Arc<dyn HttpClient> = Arc::new(build_client(config)?);
    let options = LoadOptions::from(&config.load);
    let run = LoadRun::new(client, Box::new(SystemProbe::new()), options)
        .context("Invalid load parameters")?;

    let outcome = match run.run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Load run aborted: {}", e);
            println!("❌ {}", e);
            return Ok(1);
        }
    };

    let output = config.load.output_path();
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    outcome
        .dataset
        .write_csv(&output)
        .context(format!("Failed to write dataset to {:?}", output))?;

    print!("{}", outcome.summary);
    println!("📝 {} sample rows written to: {:?}", outcome.dataset.len(), output);

    Ok(0)
}

fn list_command(json: bool) -> Result<()> {
    let catalog = graphcheck_scenarios::catalog();

    if json {
        let entries: Vec<serde_json::Value> = catalog
            .iter()
            .map(|scenario| {
                serde_json::json!({
                    "name": scenario.name(),
                    "resource": scenario.resource().collection(),
                    "conformance": scenario.conformance(),
                    "description": scenario.description(),
                })
            })
            .collect();
        let formatted =
            serde_json::to_string_pretty(&entries).context("Failed to format catalog as JSON")?;
        println!("{}", formatted);
        return Ok(());
    }

    let width = catalog.iter().map(|s| s.name().len()).max().unwrap_or(0);
    for scenario in &catalog {
        println!(
            "{:<width$}  {:<10}  {:<10}  {}",
            scenario.name(),
            scenario.resource().collection(),
            scenario.conformance().to_string(),
            scenario.description(),
            width = width
        );
    }
    println!("{} scenarios", catalog.len());
    Ok(())
}

/// Handle configuration validation
fn handle_config_validate(config_file: &PathBuf) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match ConfigLoader::new()
        .from_file(config_file)
        .context(format!("Failed to load configuration from {:?}", config_file))
    {
        Ok(_config) => {
            println!("✅ Configuration file is valid");
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {:#}", e);
            error!("Configuration validation failed: {:#}", e);
            Err(e)
        }
    }
}

/// Handle configuration generation
fn handle_config_generate(output: &Path, force: bool) -> Result<()> {
    info!("Generating sample configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    fs::write(output, GraphcheckConfig::generate_sample())
        .context("Failed to write configuration file")?;

    println!("✅ Configuration generated at: {:?}", output);
    println!("📝 Edit the file to point at your service");
    println!(
        "🔧 Validate with: graphcheck config validate --config-file {:?}",
        output
    );

    Ok(())
}

/// Handle configuration display
fn handle_config_show(config: &GraphcheckConfig) -> Result<()> {
    let rendered = serde_yaml::to_string(config).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first so the logging section applies
    let mut config = load_config(cli.config.as_ref())?;
    init_logging_from_config(&config.logging, cli.log_level.as_deref())?;
    apply_cli_overrides(&mut config, &cli)?;

    info!("graphcheck starting against {}", config.target.endpoint);

    let code = match &cli.command {
        Commands::Scenarios { .. } => scenarios_command(&config).await?,
        Commands::Load { .. } => load_command(&config).await?,
        Commands::List { json } => {
            list_command(*json)?;
            0
        }
        Commands::Config { config_cmd } => {
            match config_cmd {
                ConfigCommands::Validate { config_file } => handle_config_validate(config_file)?,
                ConfigCommands::Generate { output, force } => {
                    handle_config_generate(output, *force)?
                }
                ConfigCommands::Show => handle_config_show(&config)?,
            }
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
