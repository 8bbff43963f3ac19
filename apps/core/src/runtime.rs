use std::io::BufRead;
use std::path::PathBuf;

use crate::config::{self, ConfigError};
use crate::contract::ResultDto;
use crate::core_service::{CoreService, RefreshOutcome, ServiceError};
use crate::logging;
use crate::transport;

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Service(ServiceError),
    Io(std::io::Error),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Service(error) => write!(f, "service error: {error}"),
            Self::Io(error) => write!(f, "io error: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ServiceError> for RuntimeError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeMode {
    /// One-shot query; results print as JSON and the process exits.
    Query(String),
    /// Rebuild the index, report the entry count, exit.
    Refresh,
    /// Serve newline-delimited JSON requests over stdio (the host transport).
    Serve,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub mode: RuntimeMode,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut config_path = None;
    let mut mode = RuntimeMode::Serve;

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--config" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "--config requires a path".to_string())?;
                config_path = Some(PathBuf::from(value));
                index += 2;
            }
            "--query" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "--query requires a string".to_string())?;
                mode = RuntimeMode::Query(value.clone());
                index += 2;
            }
            "--refresh" => {
                mode = RuntimeMode::Refresh;
                index += 1;
            }
            "--serve" => {
                mode = RuntimeMode::Serve;
                index += 1;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(RuntimeOptions { config_path, mode })
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    if let Err(error) = logging::init() {
        eprintln!("[foxfind-core] logging unavailable: {error}");
    }

    let cfg = config::load(options.config_path.as_deref())?;
    if !cfg.config_path.exists() {
        config::save(&cfg)?;
        println!(
            "[foxfind-core] wrote default config to {}",
            cfg.config_path.display()
        );
    }
    println!(
        "[foxfind-core] startup profile={} include_history={} places_db_path={}",
        cfg.profile_id,
        cfg.include_history,
        cfg.places_db_path.display(),
    );

    let service = CoreService::new(cfg)?;
    match service.refresh() {
        RefreshOutcome::Refreshed {
            bookmarks,
            history,
            entries,
        } => println!(
            "[foxfind-core] startup indexed bookmarks={bookmarks} history={history} entries={entries}"
        ),
        RefreshOutcome::Unavailable => {
            println!("[foxfind-core] places database unavailable; serving empty index")
        }
        RefreshOutcome::Coalesced => {}
    }

    match options.mode {
        RuntimeMode::Query(query) => {
            let results: Vec<ResultDto> = service
                .search(&query, 0)
                .into_iter()
                .map(Into::into)
                .collect();
            let encoded = serde_json::to_string_pretty(&results)
                .map_err(|e| RuntimeError::Io(std::io::Error::other(e)))?;
            println!("{encoded}");
            Ok(())
        }
        RuntimeMode::Refresh => {
            println!("[foxfind-core] indexed_entries={}", service.indexed_entries());
            Ok(())
        }
        RuntimeMode::Serve => {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                println!("{}", transport::handle_json(&service, &line));
            }
            Ok(())
        }
    }
}
