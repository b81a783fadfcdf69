//! # Fabric CLI
//!
//! Command-line interface for Fabric event processing system.
//!
//! This module provides CLI commands for:
//! - Starting/stopping the service
//! - Configuration validation
//! - Status monitoring
//! - Debugging and troubleshooting
//!
//! See specs/interfaces/cli-interface.md for complete specification.

use clap::{Parser, Subcommand};
use fabric_core::{FabricError, ValidationError};
use std::path::PathBuf;
use std::time::Duration as StdDuration;
use tracing::{info, warn};

// ============================================================================
// CLI Structure
// ============================================================================

/// Fabric CLI - Event processing for GitHub webhooks
#[derive(Parser)]
#[command(name = "fabric")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Event processing system for GitHub webhooks")]
#[command(
    long_about = "Fabric processes GitHub webhooks with ordered delivery and reliable processing"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "QUEUE_KEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the Fabric service
    Start {
        /// Service mode (server or worker)
        #[arg(short, long, default_value = "server")]
        mode: ServiceMode,

        /// Port to bind HTTP server
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Host to bind HTTP server
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,
    },

    /// Stop the Fabric service
    Stop {
        /// Graceful shutdown timeout in seconds
        #[arg(short, long, default_value = "30")]
        timeout: u64,

        /// Force kill if graceful shutdown fails
        #[arg(short, long)]
        force: bool,
    },

    /// Show service status
    Status {
        /// Show detailed status information
        #[arg(short, long)]
        verbose: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate configuration
    Config {
        /// Configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Output format for configuration
        #[arg(short = 'f', long, default_value = "yaml")]
        format: ConfigFormat,
    },

    /// Monitor event processing
    Monitor {
        /// Follow log output
        #[arg(short, long)]
        follow: bool,

        /// Filter by event type
        #[arg(short, long)]
        event_type: Option<String>,

        /// Filter by repository
        #[arg(short, long)]
        repository: Option<String>,

        /// Show only errors
        #[arg(long)]
        errors_only: bool,

        /// Number of recent events to show
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },

    /// Event management commands
    Events {
        #[command(subcommand)]
        action: EventCommands,
    },

    /// Session management commands
    Sessions {
        #[command(subcommand)]
        action: SessionCommands,
    },

    /// Health check commands
    Health {
        #[command(subcommand)]
        action: HealthCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Service operating modes
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
pub enum ServiceMode {
    /// HTTP server receiving webhooks
    Server,
    /// Background worker processing events
    Worker,
    /// Combined server and worker
    Combined,
}

/// Output format options
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Table format
    Table,
}

/// Configuration format options
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

// ============================================================================
// Event Commands
// ============================================================================

/// Event management subcommands
#[derive(Subcommand)]
pub enum EventCommands {
    /// List recent events
    List {
        /// Number of events to show
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Filter by event type
        #[arg(short, long)]
        event_type: Option<String>,

        /// Filter by repository
        #[arg(short, long)]
        repository: Option<String>,

        /// Filter by session ID
        #[arg(short, long)]
        session: Option<String>,

        /// Show events since timestamp
        #[arg(short = 'S', long)]
        since: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show event details
    Show {
        /// Event ID to display
        event_id: String,

        /// Output format
        #[arg(short, long, default_value = "yaml")]
        format: OutputFormat,

        /// Show raw payload
        #[arg(long)]
        raw: bool,
    },

    /// Replay an event
    Replay {
        /// Event ID to replay
        event_id: String,

        /// Force replay even if already processed
        #[arg(short, long)]
        force: bool,

        /// Target queue for replay
        #[arg(short, long)]
        queue: Option<String>,
    },

    /// Delete an event
    Delete {
        /// Event ID to delete
        event_id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

// ============================================================================
// Session Commands
// ============================================================================

/// Session management subcommands
#[derive(Subcommand)]
pub enum SessionCommands {
    /// List active sessions
    List {
        /// Repository filter
        #[arg(short, long)]
        repository: Option<String>,

        /// Entity type filter
        #[arg(short, long)]
        entity_type: Option<String>,

        /// Show sessions with pending events
        #[arg(short, long)]
        pending_only: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show session details
    Show {
        /// Session ID to display
        session_id: String,

        /// Output format
        #[arg(short, long, default_value = "yaml")]
        format: OutputFormat,

        /// Include event history
        #[arg(long)]
        with_events: bool,
    },

    /// Reset session state
    Reset {
        /// Session ID to reset
        session_id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Reset reason
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Pause session processing
    Pause {
        /// Session ID to pause
        session_id: String,

        /// Pause reason
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Resume session processing
    Resume {
        /// Session ID to resume
        session_id: String,
    },
}

// ============================================================================
// Health Commands
// ============================================================================

/// Health check subcommands
#[derive(Subcommand)]
pub enum HealthCommands {
    /// Check overall system health
    Check {
        /// Include detailed component checks
        #[arg(short, long)]
        verbose: bool,

        /// Timeout for health checks in seconds
        #[arg(short, long, default_value = "10")]
        timeout: u64,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Check queue connectivity
    Queue {
        /// Queue provider to check
        #[arg(short, long)]
        provider: Option<String>,

        /// Include queue statistics
        #[arg(short, long)]
        stats: bool,
    },

    /// Check GitHub API connectivity
    Github {
        /// Test authentication
        #[arg(short, long)]
        auth: bool,

        /// Test rate limits
        #[arg(short, long)]
        rate_limits: bool,
    },

    /// Check storage connectivity
    Storage {
        /// Storage type to check
        #[arg(short, long)]
        storage_type: Option<String>,

        /// Include storage statistics
        #[arg(short, long)]
        stats: bool,
    },
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fabric error: {0}")]
    Fabric(#[from] FabricError),
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },
}

/// Service operation errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Service not running")]
    NotRunning,

    #[error("Service already running: PID {pid}")]
    AlreadyRunning { pid: u32 },

    #[error("Service start failed: {message}")]
    StartFailed { message: String },

    #[error("Service stop failed: {message}")]
    StopFailed { message: String },

    #[error("Service timeout: operation took longer than {seconds}s")]
    Timeout { seconds: u64 },
}

// ============================================================================
// Configuration Types
// ============================================================================

/// CLI configuration structure
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct CliConfig {
    /// Default service mode
    pub default_mode: ServiceMode,

    /// Default HTTP server settings
    pub server: ServerConfig,

    /// Default logging configuration
    pub logging: LoggingConfig,

    /// Output formatting preferences
    pub output: OutputConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_mode: ServiceMode::Combined,
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            timeout_seconds: 30,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum LogFormat {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json")]
    Json,
}

/// Output formatting preferences
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct OutputConfig {
    pub default_format: OutputFormat,
    pub colors: bool,
    pub timestamps: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Text,
            colors: true,
            timestamps: true,
        }
    }
}

// ============================================================================
// Main Entry Point (Stub)
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    // Initialize logging
    initialize_logging(&cli)?;

    // Load configuration
    let config = load_configuration(cli.config.as_ref()).await?;

    // Execute command
    match cli.command {
        Commands::Start {
            mode,
            port,
            host,
            foreground,
        } => execute_start_command(mode, port, host, foreground, &config).await,
        Commands::Stop { timeout, force } => execute_stop_command(timeout, force).await,
        Commands::Status { verbose, format } => {
            execute_status_command(verbose, format, &config).await
        }
        Commands::Config { file, show, format } => {
            execute_config_command(file, show, format, &config).await
        }
        Commands::Monitor {
            follow,
            event_type,
            repository,
            errors_only,
            limit,
        } => {
            execute_monitor_command(follow, event_type, repository, errors_only, limit, &config)
                .await
        }
        Commands::Events { action } => execute_events_command(action, &config).await,
        Commands::Sessions { action } => execute_sessions_command(action, &config).await,
        Commands::Health { action } => execute_health_command(action, &config).await,
        Commands::Completions { shell } => execute_completions_command(shell).await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Initialize logging based on CLI arguments.
///
/// Mirrors `fabric-service`'s startup logging setup: an `EnvFilter` seeded
/// from `--log-level` (overridable via `RUST_LOG`) and either a compact text
/// or a JSON formatting layer depending on `--json-logs`.
fn initialize_logging(cli: &Cli) -> Result<(), CliError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    }
    .map_err(|e| CliError::CommandFailed {
        message: format!("failed to initialize logging: {e}"),
    })
}

/// Load configuration from file or defaults.
///
/// Layers (lowest to highest precedence): built-in [`CliConfig::default`],
/// an optional config file (`--config` / `QUEUE_KEEPER_CONFIG`), then
/// `FABRIC__`-prefixed environment variables with `__` as the nesting
/// separator (e.g. `FABRIC__SERVER__PORT=9090`).
async fn load_configuration(config_path: Option<&PathBuf>) -> Result<CliConfig, ConfigError> {
    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound { path: path.clone() });
        }
    }

    let defaults = CliConfig::default();
    let defaults_value = config::Config::try_from(&defaults).map_err(|e| {
        ConfigError::Validation(ValidationError::InvalidFormat {
            field: "default_config".to_string(),
            message: e.to_string(),
        })
    })?;

    let mut builder = config::Config::builder().add_source(defaults_value);

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path.as_path()));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("FABRIC")
            .separator("__")
            .try_parsing(true),
    );

    let resolved = builder.build().map_err(|e| {
        ConfigError::Validation(ValidationError::InvalidFormat {
            field: "config".to_string(),
            message: e.to_string(),
        })
    })?;

    resolved
        .try_deserialize::<CliConfig>()
        .map_err(|e| ConfigError::Validation(ValidationError::InvalidFormat {
            field: "config".to_string(),
            message: e.to_string(),
        }))
}

// ============================================================================
// Process management helpers
// ============================================================================

/// Location of the PID file used to track a daemonized service instance.
fn pid_file_path() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("fabric")
        .join("fabric.pid")
}

fn read_pid_file() -> Option<u32> {
    std::fs::read_to_string(pid_file_path())
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok())
}

fn write_pid_file(pid: u32) -> Result<(), CliError> {
    let path = pid_file_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, pid.to_string())?;
    Ok(())
}

fn remove_pid_file() {
    let _ = std::fs::remove_file(pid_file_path());
}

/// Whether a process with the given PID is still alive, checked via `kill -0`
/// the same way a shell-based process supervisor would.
fn is_process_running(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn send_signal(pid: u32, signal: &str) -> Result<(), CliError> {
    let status = std::process::Command::new("kill")
        .args([signal, &pid.to_string()])
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::CommandFailed {
            message: format!("failed to send {signal} to PID {pid}"),
        })
    }
}

/// Locate the `fabric-service` binary, preferring one next to this
/// executable (the layout produced by `cargo build`/release packaging)
/// and falling back to the `PATH`.
fn service_binary_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .map(|dir| dir.join("fabric-service"))
        .filter(|p| p.exists())
        .unwrap_or_else(|| PathBuf::from("fabric-service"))
}

// ============================================================================
// HTTP admin client helpers
// ============================================================================

/// Base URL of the running Fabric HTTP service, derived from the resolved
/// configuration (`0.0.0.0` is rewritten to `127.0.0.1` since it isn't a
/// valid client-side connect target).
fn base_url(config: &CliConfig) -> String {
    let host = if config.server.host == "0.0.0.0" {
        "127.0.0.1"
    } else {
        config.server.host.as_str()
    };
    format!("http://{host}:{port}", port = config.server.port)
}

async fn api_get(base: &str, path: &str) -> Result<serde_json::Value, CliError> {
    let url = format!("{base}{path}");
    let response = reqwest::get(&url).await.map_err(|e| CliError::CommandFailed {
        message: format!("request to {url} failed: {e}"),
    })?;
    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
    if !status.is_success() {
        return Err(CliError::CommandFailed {
            message: format!("{url} returned {status}: {body}"),
        });
    }
    Ok(body)
}

async fn api_post(
    base: &str,
    path: &str,
    body: Option<&serde_json::Value>,
) -> Result<serde_json::Value, CliError> {
    let url = format!("{base}{path}");
    let client = reqwest::Client::new();
    let mut request = client.post(&url);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request.send().await.map_err(|e| CliError::CommandFailed {
        message: format!("request to {url} failed: {e}"),
    })?;
    let status = response.status();
    let response_body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
    if !status.is_success() {
        return Err(CliError::CommandFailed {
            message: format!("{url} returned {status}: {response_body}"),
        });
    }
    Ok(response_body)
}

/// Render a JSON value in the requested output format.
fn print_value(format: &OutputFormat, value: &serde_json::Value) -> Result<(), CliError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| CliError::CommandFailed {
            message: format!("failed to render JSON output: {e}"),
        })?,
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| CliError::CommandFailed {
            message: format!("failed to render YAML output: {e}"),
        })?,
        OutputFormat::Text | OutputFormat::Table => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::CommandFailed {
                message: format!("failed to render output: {e}"),
            })?
        }
    };
    println!("{rendered}");
    Ok(())
}

/// Execute start command
async fn execute_start_command(
    mode: ServiceMode,
    port: u16,
    host: String,
    foreground: bool,
    _config: &CliConfig,
) -> Result<(), CliError> {
    info!(
        mode = ?mode,
        port = port,
        host = %host,
        foreground = foreground,
        "Starting Fabric service"
    );

    if let Some(pid) = read_pid_file() {
        if is_process_running(pid) {
            return Err(CliError::Service(ServiceError::AlreadyRunning { pid }));
        }
        remove_pid_file();
    }

    let binary = service_binary_path();
    let mut command = std::process::Command::new(&binary);
    command
        .env("FABRIC__SERVER__HOST", &host)
        .env("FABRIC__SERVER__PORT", port.to_string())
        .env("FABRIC_SERVICE_MODE", format!("{mode:?}").to_lowercase());

    if foreground {
        let status = command.status().map_err(|e| {
            CliError::Service(ServiceError::StartFailed {
                message: format!("failed to launch {}: {e}", binary.display()),
            })
        })?;
        if !status.success() {
            return Err(CliError::Service(ServiceError::StartFailed {
                message: format!("service exited with {status}"),
            }));
        }
        return Ok(());
    }

    command.stdin(std::process::Stdio::null());
    command.stdout(std::process::Stdio::null());
    command.stderr(std::process::Stdio::null());

    let child = command.spawn().map_err(|e| {
        CliError::Service(ServiceError::StartFailed {
            message: format!("failed to launch {}: {e}", binary.display()),
        })
    })?;

    write_pid_file(child.id())?;
    info!(pid = child.id(), "Fabric service started in background");
    Ok(())
}

/// Execute stop command
async fn execute_stop_command(timeout: u64, force: bool) -> Result<(), CliError> {
    info!(timeout = timeout, force = force, "Stopping Fabric service");

    let pid = read_pid_file().ok_or(CliError::Service(ServiceError::NotRunning))?;
    if !is_process_running(pid) {
        remove_pid_file();
        return Err(CliError::Service(ServiceError::NotRunning));
    }

    send_signal(pid, "-TERM").map_err(|_| {
        CliError::Service(ServiceError::StopFailed {
            message: format!("could not signal PID {pid}"),
        })
    })?;

    let deadline = std::time::Instant::now() + StdDuration::from_secs(timeout);
    while std::time::Instant::now() < deadline {
        if !is_process_running(pid) {
            remove_pid_file();
            info!(pid = pid, "Fabric service stopped");
            return Ok(());
        }
        tokio::time::sleep(StdDuration::from_millis(200)).await;
    }

    if force {
        send_signal(pid, "-KILL")?;
        remove_pid_file();
        warn!(pid = pid, "Fabric service force-killed after timeout");
        return Ok(());
    }

    Err(CliError::Service(ServiceError::Timeout { seconds: timeout }))
}

/// Execute status command
async fn execute_status_command(
    verbose: bool,
    format: OutputFormat,
    config: &CliConfig,
) -> Result<(), CliError> {
    info!(verbose = verbose, format = ?format, "Checking service status");

    let pid = read_pid_file();
    let process_running = pid.map(is_process_running).unwrap_or(false);

    let path = if verbose { "/health/deep" } else { "/health" };
    let health = api_get(&base_url(config), path).await.ok();

    let status = serde_json::json!({
        "pid": pid,
        "process_running": process_running,
        "base_url": base_url(config),
        "health": health,
    });

    print_value(&format, &status)?;

    if !process_running && health.is_none() {
        return Err(CliError::Service(ServiceError::NotRunning));
    }
    Ok(())
}

/// Execute config command
async fn execute_config_command(
    file: Option<PathBuf>,
    show: bool,
    format: ConfigFormat,
    config: &CliConfig,
) -> Result<(), CliError> {
    info!(file = ?file, show = show, format = ?format, "Processing config command");

    let resolved = match &file {
        Some(path) => load_configuration(Some(path)).await?,
        None => config.clone(),
    };

    // Loading already validates the file exists and deserializes cleanly;
    // report success up front before optionally printing the resolved form.
    println!("configuration is valid");

    if show {
        let rendered = match format {
            ConfigFormat::Yaml => serde_yaml::to_string(&resolved).map_err(|e| CliError::CommandFailed {
                message: format!("failed to render configuration as YAML: {e}"),
            })?,
            ConfigFormat::Json => {
                serde_json::to_string_pretty(&resolved).map_err(|e| CliError::CommandFailed {
                    message: format!("failed to render configuration as JSON: {e}"),
                })?
            }
            ConfigFormat::Toml => toml::to_string_pretty(&resolved).map_err(|e| CliError::CommandFailed {
                message: format!("failed to render configuration as TOML: {e}"),
            })?,
        };
        println!("{rendered}");
    }

    Ok(())
}

/// Execute monitor command
async fn execute_monitor_command(
    follow: bool,
    event_type: Option<String>,
    repository: Option<String>,
    errors_only: bool,
    limit: usize,
    config: &CliConfig,
) -> Result<(), CliError> {
    info!(
        follow = follow,
        event_type = ?event_type,
        repository = ?repository,
        errors_only = errors_only,
        limit = limit,
        "Starting event monitoring"
    );

    let base = base_url(config);
    loop {
        let mut query = vec![("per_page".to_string(), limit.to_string())];
        if let Some(event_type) = &event_type {
            query.push(("event_type".to_string(), event_type.clone()));
        }
        if let Some(repository) = &repository {
            query.push(("repository".to_string(), repository.clone()));
        }
        let query_string = query
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let events = api_get(&base, &format!("/api/events?{query_string}")).await?;
        let events = events
            .get("events")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        for event in &events {
            let status = event.get("status").and_then(|s| s.as_str()).unwrap_or("");
            if errors_only && !status.eq_ignore_ascii_case("error") && !status.eq_ignore_ascii_case("failed") {
                continue;
            }
            println!("{event}");
        }

        if !follow {
            break;
        }
        tokio::time::sleep(StdDuration::from_secs(5)).await;
    }

    Ok(())
}

fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Execute events command
async fn execute_events_command(action: EventCommands, config: &CliConfig) -> Result<(), CliError> {
    let base = base_url(config);
    match action {
        EventCommands::List {
            limit,
            event_type,
            repository,
            session,
            since,
            format,
        } => {
            info!(
                limit = limit,
                event_type = ?event_type,
                repository = ?repository,
                session = ?session,
                since = ?since,
                format = ?format,
                "Listing events"
            );
            let mut query = vec![("per_page".to_string(), limit.to_string())];
            if let Some(event_type) = &event_type {
                query.push(("event_type".to_string(), event_type.clone()));
            }
            if let Some(repository) = &repository {
                query.push(("repository".to_string(), repository.clone()));
            }
            if let Some(session) = &session {
                query.push(("session_id".to_string(), session.clone()));
            }
            if let Some(since) = &since {
                query.push(("since".to_string(), since.clone()));
            }
            let query_string = query
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencode(v)))
                .collect::<Vec<_>>()
                .join("&");
            let response = api_get(&base, &format!("/api/events?{query_string}")).await?;
            print_value(&format, &response)
        }
        EventCommands::Show {
            event_id,
            format,
            raw,
        } => {
            info!(event_id = %event_id, format = ?format, raw = raw, "Showing event details");
            let response = api_get(&base, &format!("/api/events/{event_id}")).await?;
            let response = if raw {
                response.get("event").cloned().unwrap_or(response)
            } else {
                response
            };
            print_value(&format, &response)
        }
        EventCommands::Replay {
            event_id,
            force,
            queue,
        } => {
            info!(event_id = %event_id, force = force, queue = ?queue, "Replaying event");
            let body = serde_json::json!({ "force": force, "queue": queue });
            let response = api_post(&base, &format!("/admin/events/{event_id}/replay"), Some(&body)).await?;
            print_value(&OutputFormat::Json, &response)
        }
        EventCommands::Delete { event_id, yes } => {
            info!(event_id = %event_id, yes = yes, "Deleting event");
            if !yes {
                return Err(CliError::InvalidArgument {
                    arg: "yes".to_string(),
                    message: "pass --yes to confirm deleting an event".to_string(),
                });
            }
            let url = format!("{base}/admin/events/{event_id}");
            let client = reqwest::Client::new();
            let response = client.delete(&url).send().await.map_err(|e| CliError::CommandFailed {
                message: format!("request to {url} failed: {e}"),
            })?;
            if response.status().is_success() {
                println!("event {event_id} deleted");
                Ok(())
            } else {
                Err(CliError::CommandFailed {
                    message: format!(
                        "the connected service does not support event deletion ({})",
                        response.status()
                    ),
                })
            }
        }
    }
}

/// Execute sessions command
async fn execute_sessions_command(
    action: SessionCommands,
    config: &CliConfig,
) -> Result<(), CliError> {
    let base = base_url(config);
    match action {
        SessionCommands::List {
            repository,
            entity_type,
            pending_only,
            format,
        } => {
            info!(
                repository = ?repository,
                entity_type = ?entity_type,
                pending_only = pending_only,
                format = ?format,
                "Listing sessions"
            );
            let mut query = Vec::new();
            if let Some(repository) = &repository {
                query.push(("repository".to_string(), repository.clone()));
            }
            if let Some(entity_type) = &entity_type {
                query.push(("entity_type".to_string(), entity_type.clone()));
            }
            let query_string = query
                .iter()
                .map(|(k, v)| format!("{k}={}", urlencode(v)))
                .collect::<Vec<_>>()
                .join("&");
            let response = api_get(&base, &format!("/api/sessions?{query_string}")).await?;
            print_value(&format, &response)
        }
        SessionCommands::Show {
            session_id,
            format,
            with_events,
        } => {
            info!(
                session_id = %session_id,
                format = ?format,
                with_events = with_events,
                "Showing session details"
            );
            let response = api_get(&base, &format!("/api/sessions/{session_id}")).await?;
            print_value(&format, &response)
        }
        SessionCommands::Reset {
            session_id,
            yes,
            reason,
        } => {
            info!(session_id = %session_id, yes = yes, reason = ?reason, "Resetting session");
            if !yes {
                return Err(CliError::InvalidArgument {
                    arg: "yes".to_string(),
                    message: "pass --yes to confirm resetting a session".to_string(),
                });
            }
            let body = serde_json::json!({ "reason": reason });
            let response = api_post(&base, &format!("/admin/sessions/{session_id}/reset"), Some(&body)).await?;
            print_value(&OutputFormat::Json, &response)
        }
        SessionCommands::Pause { session_id, reason } => {
            info!(session_id = %session_id, reason = ?reason, "Pausing session");
            let body = serde_json::json!({ "reason": reason });
            match api_post(&base, &format!("/admin/sessions/{session_id}/pause"), Some(&body)).await {
                Ok(response) => print_value(&OutputFormat::Json, &response),
                Err(_) => Err(CliError::CommandFailed {
                    message: "the connected service does not support pausing sessions yet".to_string(),
                }),
            }
        }
        SessionCommands::Resume { session_id } => {
            info!(session_id = %session_id, "Resuming session");
            match api_post(&base, &format!("/admin/sessions/{session_id}/resume"), None).await {
                Ok(response) => print_value(&OutputFormat::Json, &response),
                Err(_) => Err(CliError::CommandFailed {
                    message: "the connected service does not support resuming sessions yet".to_string(),
                }),
            }
        }
    }
}

/// Execute health command
async fn execute_health_command(action: HealthCommands, config: &CliConfig) -> Result<(), CliError> {
    let base = base_url(config);
    match action {
        HealthCommands::Check {
            verbose,
            timeout,
            format,
        } => {
            info!(verbose = verbose, timeout = timeout, format = ?format, "Checking system health");
            let client = reqwest::Client::builder()
                .timeout(StdDuration::from_secs(timeout))
                .build()
                .map_err(|e| CliError::CommandFailed {
                    message: format!("failed to build HTTP client: {e}"),
                })?;
            let path = if verbose { "/health/deep" } else { "/health" };
            let response = client
                .get(format!("{base}{path}"))
                .send()
                .await
                .map_err(|e| CliError::CommandFailed {
                    message: format!("health check request failed: {e}"),
                })?;
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
            print_value(&format, &body)?;
            if !status.is_success() {
                return Err(CliError::CommandFailed {
                    message: format!("health check reported {status}"),
                });
            }
            Ok(())
        }
        HealthCommands::Queue { provider, stats } => {
            info!(provider = ?provider, stats = stats, "Checking queue health");
            let health = api_get(&base, "/health/deep").await?;
            print_component_health(&health, "queue")
        }
        HealthCommands::Github { auth, rate_limits } => {
            info!(auth = auth, rate_limits = rate_limits, "Checking GitHub connectivity");
            check_github_health(auth, rate_limits).await
        }
        HealthCommands::Storage {
            storage_type,
            stats,
        } => {
            info!(storage_type = ?storage_type, stats = stats, "Checking storage health");
            let health = api_get(&base, "/health/deep").await?;
            print_component_health(&health, "storage")
        }
    }
}

/// Print the subset of a deep-health response whose check names mention
/// `component`, since the service does not yet expose a dedicated
/// per-component admin endpoint.
fn print_component_health(health: &serde_json::Value, component: &str) -> Result<(), CliError> {
    let checks = health.get("checks").and_then(|c| c.as_object());
    let matching: serde_json::Map<String, serde_json::Value> = checks
        .map(|checks| {
            checks
                .iter()
                .filter(|(name, _)| name.to_lowercase().contains(component))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default();

    if matching.is_empty() {
        println!(
            "the connected service does not expose a dedicated '{component}' health check yet; overall status: {}",
            health.get("status").and_then(|s| s.as_str()).unwrap_or("unknown")
        );
        return Ok(());
    }

    print_value(&OutputFormat::Json, &serde_json::Value::Object(matching))
}

/// Check GitHub API connectivity directly, independent of the Fabric service,
/// since reachability to GitHub is a property of the host the CLI runs on.
async fn check_github_health(auth: bool, rate_limits: bool) -> Result<(), CliError> {
    let client = reqwest::Client::builder()
        .user_agent("fabric-cli")
        .build()
        .map_err(|e| CliError::CommandFailed {
            message: format!("failed to build HTTP client: {e}"),
        })?;

    let token = std::env::var("GITHUB_TOKEN").ok();
    let mut request = client.get("https://api.github.com/rate_limit");
    if let Some(token) = &token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| CliError::CommandFailed {
        message: format!("could not reach GitHub API: {e}"),
    })?;
    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);

    if auth && token.is_none() {
        warn!("no GITHUB_TOKEN set; authentication was not exercised");
    }

    let summary = serde_json::json!({
        "reachable": status.is_success(),
        "status": status.as_u16(),
        "authenticated": token.is_some(),
        "rate_limit": if rate_limits { body.get("rate").cloned() } else { None },
    });
    print_value(&OutputFormat::Json, &summary)?;

    if !status.is_success() {
        return Err(CliError::CommandFailed {
            message: format!("GitHub API returned {status}"),
        });
    }
    Ok(())
}

/// Execute completions command
async fn execute_completions_command(shell: clap_complete::Shell) -> Result<(), CliError> {
    use clap::CommandFactory;

    info!(shell = ?shell, "Generating shell completions");
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
