/// hubctl - describe Kubernetes resources across the clusters of a multi-cluster management backend
///
/// Resolves the managed namespaces and clusters a resource lives in, fetches it from
/// each of them and prints one table row (or one YAML/JSON document) per cluster.
mod config;
mod describe;
mod hub;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ClientConfig;
use crate::describe::{DescribeArgs, Describer};
use crate::hub::{auth, HubClient};

#[derive(Parser)]
#[command(name = "hubctl")]
#[command(about = "Describe resources across the clusters of a management backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (default: ~/.hubctl/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the state of one resource in every matching namespace and cluster
    Describe(DescribeArgs),

    /// Log in and store the issued token
    Login {
        /// User name
        #[arg(short, long)]
        username: String,

        /// User password
        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored token
    Logout,

    /// Show or change the client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration with secrets masked
    Show,

    /// Update stored settings
    Set {
        /// API key for the backend's open API
        #[arg(short, long)]
        api_key: Option<String>,

        /// Backend base URL
        #[arg(short, long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(short, long)]
        timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for rendered output
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hubctl={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Commands::Describe(args) => describe_resource(&cli, args).await,
        Commands::Login { username, password } => login(&cli, username, password).await,
        Commands::Logout => logout(&cli),
        Commands::Config { command } => match command {
            ConfigCommands::Show => show_config(&cli),
            ConfigCommands::Set {
                api_key,
                base_url,
                timeout_secs,
            } => set_config(&cli, api_key.clone(), base_url.clone(), *timeout_secs),
        },
    };

    if let Err(e) = result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => ClientConfig::default_path(),
    }
}

/// Describe one resource across namespaces and clusters
async fn describe_resource(cli: &Cli, args: &DescribeArgs) -> Result<()> {
    let request = args.to_request()?;

    let config = ClientConfig::load(config_path(cli)?).context("Failed to load configuration")?;
    if config.system.token.is_empty() {
        anyhow::bail!("Not logged in. Run `hubctl login` first or set HUBCTL_TOKEN");
    }

    let client = HubClient::new(&config)?;
    let report = Describer::new(&client)
        .with_concurrency(usize::from(args.concurrency))
        .describe(&request)
        .await
        .context("Failed to list namespaces")?;

    let stdout = std::io::stdout();
    report
        .render(&mut stdout.lock())
        .context("Failed to write output")?;

    report.ensure_complete(args.strict)
}

/// Log in and persist the token
async fn login(cli: &Cli, username: &str, password: &str) -> Result<()> {
    let path = config_path(cli)?;
    let effective = ClientConfig::load(&path).context("Failed to load configuration")?;

    let token = auth::login(&effective, username, password).await?;

    // Persist to the file as stored, without env overrides
    let mut stored = ClientConfig::from_file(&path)?;
    stored.set_login(username, &token);
    stored.save(&path)?;

    info!("✓ Login successful, token saved to {}", path.display());
    Ok(())
}

/// Clear stored credentials
fn logout(cli: &Cli) -> Result<()> {
    let path = config_path(cli)?;
    let mut stored = ClientConfig::from_file(&path)?;
    stored.clear_login();
    stored.save(&path)?;

    info!("✓ Logged out");
    Ok(())
}

/// Print the effective configuration
fn show_config(cli: &Cli) -> Result<()> {
    let config = ClientConfig::load(config_path(cli)?).context("Failed to load configuration")?;
    print!("{}", serde_yaml::to_string(&config.masked())?);
    Ok(())
}

/// Update stored configuration values
fn set_config(
    cli: &Cli,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    if api_key.is_none() && base_url.is_none() && timeout_secs.is_none() {
        anyhow::bail!("Nothing to set; pass --api-key, --base-url or --timeout-secs");
    }

    let path = config_path(cli)?;
    let mut stored = ClientConfig::from_file(&path)?;
    if let Some(api_key) = api_key {
        stored.system.api_key = api_key;
    }
    if let Some(base_url) = base_url {
        stored.system.base_url = base_url;
    }
    if let Some(timeout_secs) = timeout_secs {
        stored.system.timeout_secs = timeout_secs;
    }
    stored.validate()?;
    stored.save(&path)?;

    info!("Configuration saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{OutputFormat, ResourceKind};

    #[test]
    fn test_cli_parses_describe() {
        let cli = Cli::try_parse_from([
            "hubctl",
            "describe",
            "--deployment",
            "web",
            "-n",
            "ns1",
            "-o",
            "yaml",
        ])
        .unwrap();

        let Commands::Describe(args) = cli.command else {
            panic!("expected describe");
        };
        let request = args.to_request().unwrap();
        assert_eq!(request.kind, ResourceKind::Deployment);
        assert_eq!(request.namespace.as_deref(), Some("ns1"));
        assert_eq!(request.output, OutputFormat::Yaml);
        assert_eq!(args.concurrency, 1);
        assert!(!args.strict);
    }

    #[test]
    fn test_cli_rejects_two_kinds() {
        let result = Cli::try_parse_from([
            "hubctl",
            "describe",
            "--deployment",
            "web",
            "--service",
            "web",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_zero_concurrency() {
        let result = Cli::try_parse_from([
            "hubctl",
            "describe",
            "--pod",
            "web-1",
            "--concurrency",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_config_set() {
        let cli = Cli::try_parse_from([
            "hubctl",
            "--config",
            "/tmp/hubctl.yaml",
            "config",
            "set",
            "--api-key",
            "k",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/hubctl.yaml")));
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Set { .. }
            }
        ));
    }

    #[test]
    fn test_set_config_requires_a_field() {
        let cli = Cli::try_parse_from(["hubctl", "logout"]).unwrap();
        assert!(set_config(&cli, None, None, None).is_err());
    }

    #[test]
    fn test_login_logout_roundtrip_on_disk() {
        let path = std::env::temp_dir().join(format!("hubctl-main-test-{}.yaml", std::process::id()));
        let cli = Cli::try_parse_from(["hubctl", "--config", path.to_str().unwrap(), "logout"]).unwrap();

        let mut stored = ClientConfig::default();
        stored.set_login("alice", "tok");
        stored.save(&path).unwrap();

        logout(&cli).unwrap();
        let cleared = ClientConfig::from_file(&path).unwrap();
        assert!(cleared.system.token.is_empty());
        assert!(cleared.user.name.is_empty());

        set_config(&cli, Some("key".to_string()), None, Some(10)).unwrap();
        let updated = ClientConfig::from_file(&path).unwrap();
        assert_eq!(updated.system.api_key, "key");
        assert_eq!(updated.system.timeout_secs, 10);

        let _ = std::fs::remove_file(path);
    }
}
