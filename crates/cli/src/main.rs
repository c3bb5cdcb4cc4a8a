//! fxdev CLI - Fuchsia artifacts, device discovery and syslog streaming

mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use fxdev_core::application::{HostPorts, Toolbox};
use fxdev_core::domain::{ArtifactBundle, DeviceId, HostPlatform};
use fxdev_core::port::TracingDiagnostics;
use fxdev_infra_system::{resolve_cache_root, OsEnvironment, OsFileSystem, TokioProcessSpawner};

#[derive(Parser)]
#[command(name = "fxdev")]
#[command(about = "Fuchsia device discovery and syslog streaming", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show resolved tool and ssh config paths
    Artifacts,

    /// List attached Fuchsia devices (first one by default)
    Devices {
        /// Print every device instead of only the first
        #[arg(long)]
        all: bool,
    },

    /// Resolve a device node name to its address
    Resolve {
        /// Node name (e.g. paper-pulp-bush-angel)
        name: String,
    },

    /// Stream a device's system log to stdout
    Syslog {
        /// Device to connect to (default: first discovered device)
        #[arg(short, long, env = "FXDEV_DEVICE")]
        device: Option<String>,

        /// Stop after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Tabled)]
struct ArtifactRow {
    artifact: &'static str,
    path: String,
}

fn build_toolbox() -> Toolbox {
    let env = Arc::new(OsEnvironment);
    let cache_root = resolve_cache_root(env.as_ref());

    let ports = HostPorts {
        spawner: Arc::new(TokioProcessSpawner::new()),
        fs: Arc::new(OsFileSystem),
        env,
        diagnostics: Arc::new(TracingDiagnostics),
    };

    Toolbox::new(ports, HostPlatform::current(), cache_root)
}

fn print_artifacts(bundle: &ArtifactBundle, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(bundle)?);
        return Ok(());
    }

    let display = |path: Option<&Path>| match path {
        Some(path) => path.display().to_string().green().to_string(),
        None => "not found".red().to_string(),
    };
    let rows = vec![
        ArtifactRow {
            artifact: "ssh_config",
            path: display(bundle.ssh_config()),
        },
        ArtifactRow {
            artifact: "dev_finder",
            path: display(bundle.dev_finder()),
        },
        ArtifactRow {
            artifact: "pm",
            path: display(bundle.pm()),
        },
        ArtifactRow {
            artifact: "kernel_compiler",
            path: display(bundle.kernel_compiler()),
        },
    ];

    println!("{}", "Fuchsia Artifacts".cyan().bold());
    println!("{}", Table::new(rows));
    Ok(())
}

async fn list_devices(toolbox: &Toolbox, all: bool, json: bool) -> Result<()> {
    let devices = if all {
        toolbox
            .dev_finder()
            .list_all()
            .await
            .context("Device discovery failed")?
    } else {
        toolbox.list_devices().await.into_iter().collect()
    };

    if devices.is_empty() {
        anyhow::bail!("No Fuchsia devices found");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else {
        for device in &devices {
            println!("{device}");
        }
    }
    Ok(())
}

async fn resolve(toolbox: &Toolbox, name: &str, json: bool) -> Result<()> {
    let address = toolbox
        .dev_finder()
        .resolve(name)
        .await
        .with_context(|| format!("Failed to resolve {name}"))?
        .with_context(|| format!("No address found for {name}"))?;

    if json {
        println!("{}", serde_json::json!({ "name": name, "address": address }));
    } else {
        println!("{address}");
    }
    Ok(())
}

async fn syslog(toolbox: &Toolbox, device: Option<String>, timeout_secs: Option<u64>) -> Result<()> {
    let device = match device {
        Some(name) => DeviceId::parse_line(&name).context("Device name must not be empty")?,
        None => toolbox
            .list_devices()
            .await
            .context("No Fuchsia devices found")?,
    };

    info!(device = %device, "Streaming syslog");
    let mut stream = toolbox.syslogs(&device);

    let deadline = async {
        match timeout_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(deadline, ctrl_c);

    let mut stdout = tokio::io::stdout();
    loop {
        tokio::select! {
            line = stream.next() => {
                let Some(line) = line else {
                    debug!("Syslog stream ended");
                    break;
                };
                let written = async {
                    stdout.write_all(line.as_str().as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await
                };
                if written.await.is_err() {
                    // stdout closed (e.g. piped into `head`)
                    break;
                }
            }
            _ = &mut deadline => {
                info!("Syslog timeout reached");
                break;
            }
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
    }

    stream.close().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_logging()?;

    let cli = Cli::parse();
    let toolbox = build_toolbox();

    match cli.command {
        Commands::Artifacts => print_artifacts(toolbox.artifacts(), cli.json)?,
        Commands::Devices { all } => list_devices(&toolbox, all, cli.json).await?,
        Commands::Resolve { name } => resolve(&toolbox, &name, cli.json).await?,
        Commands::Syslog {
            device,
            timeout_secs,
        } => syslog(&toolbox, device, timeout_secs).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_syslog_args() {
        let cli = Cli::parse_from([
            "fxdev",
            "syslog",
            "--device",
            "192.168.42.56 paper-pulp-bush-angel",
            "--timeout-secs",
            "5",
        ]);

        match cli.command {
            Commands::Syslog {
                device,
                timeout_secs,
            } => {
                assert_eq!(device.as_deref(), Some("192.168.42.56 paper-pulp-bush-angel"));
                assert_eq!(timeout_secs, Some(5));
            }
            _ => panic!("expected syslog command"),
        }
    }

    #[test]
    fn test_json_flag_is_global() {
        let cli = Cli::parse_from(["fxdev", "devices", "--all", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Devices { all: true }));
    }
}
