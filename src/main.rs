use pmstore::cli::{AgentArgs, Cli, Commands, ConfigAction};
use pmstore::config::{Config, ConfigValidator};
use pmstore::error::{PmError, Result};
use pmstore::tags::ComplianceTagger;
use pmstore::{EventRecorder, Observation};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Record {
            target,
            timestamp,
            log,
        } => {
            cmd_record(cli.config, &target, timestamp, &log)?;
        }
        Commands::Update {
            target,
            timestamp,
            log,
        } => {
            cmd_update(cli.config, &target, timestamp, &log)?;
        }
        Commands::Observe {
            target,
            timestamp,
            log,
        } => {
            cmd_observe(cli.config, &target, timestamp, &log)?;
        }
        Commands::Show {
            target,
            limit,
            json,
        } => {
            cmd_show(cli.config, &target, limit, json)?;
        }
        Commands::Tags { log } => {
            cmd_tags(cli.config, &log)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "pmstore=debug" } else { "pmstore=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn now_or(timestamp: Option<i64>) -> i64 {
    timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp())
}

fn cmd_record(
    config_path: Option<PathBuf>,
    target: &AgentArgs,
    timestamp: Option<i64>,
    log: &str,
) -> Result<()> {
    let recorder = build_recorder(config_path)?;
    let id = recorder.record_finding(target.agent, &target.location, now_or(timestamp), log)?;

    tracing::info!("Recorded finding {} for agent {:03}", id, target.agent);
    println!("{}", id);
    Ok(())
}

fn cmd_update(
    config_path: Option<PathBuf>,
    target: &AgentArgs,
    timestamp: Option<i64>,
    log: &str,
) -> Result<()> {
    let recorder = build_recorder(config_path)?;
    recorder.advance_last_seen(target.agent, &target.location, log, now_or(timestamp))?;

    tracing::info!("Advanced last seen for agent {:03}", target.agent);
    Ok(())
}

fn cmd_observe(
    config_path: Option<PathBuf>,
    target: &AgentArgs,
    timestamp: Option<i64>,
    log: &str,
) -> Result<()> {
    let recorder = build_recorder(config_path)?;
    let observation =
        recorder.observe_finding(target.agent, &target.location, now_or(timestamp), log)?;

    match observation {
        Observation::Inserted(id) => {
            tracing::info!("New finding {} for agent {:03}", id, target.agent)
        }
        Observation::Recurred(id) => {
            tracing::info!("Recurrence of finding {} for agent {:03}", id, target.agent)
        }
    }
    println!("{}", observation);
    Ok(())
}

fn cmd_show(config_path: Option<PathBuf>, target: &AgentArgs, limit: usize, json: bool) -> Result<()> {
    let recorder = build_recorder(config_path)?;
    let records = recorder.recent(target.agent, &target.location, limit)?;

    if json {
        let out = serde_json::to_string_pretty(&records).map_err(|e| PmError::Json {
            source: e,
            context: "Failed to serialize findings".to_string(),
        })?;
        println!("{}", out);
        return Ok(());
    }

    println!("Agent {:03} ({})", target.agent, target.location);
    println!("==========");

    if records.is_empty() {
        println!("\nNo findings recorded");
        return Ok(());
    }

    for record in &records {
        println!(
            "\n#{}  first: {}  last: {}",
            record.id,
            format_timestamp(record.date_first),
            format_timestamp(record.date_last)
        );
        println!("  {}", record.log);
        if let Some(pci) = &record.pci_dss {
            println!("  PCI-DSS: {}", pci);
        }
        if let Some(cis) = &record.cis {
            println!("  CIS: {}", cis);
        }
    }

    Ok(())
}

fn cmd_tags(config_path: Option<PathBuf>, log: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let tags = ComplianceTagger::from_config(&config.tags).tag(log);

    println!("PCI-DSS: {}", tags.pci_dss.as_deref().unwrap_or("-"));
    println!("CIS: {}", tags.cis.as_deref().unwrap_or("-"));
    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let out = toml::to_string_pretty(&config)?;
            println!("{}", out);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| PmError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'pmstore config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;
        return Ok(config);
    }

    Config::load(&path)
}

fn build_recorder(config_path: Option<PathBuf>) -> Result<EventRecorder> {
    let mut config = load_config(config_path)?;
    config.storage.agents_dir = expand_path(&config.storage.agents_dir)?;
    Ok(EventRecorder::from_config(&config))
}

fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| PmError::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| PmError::Config("Cannot determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
