//! Vessel - provisioning manager for persistent podman containers
//!
//! This is the CLI entry point. It collects parameters and calls the
//! orchestration operations; all validation and sequencing lives in the
//! library.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vessel::backup::{self, BackupEngine};
use vessel::config::Config;
use vessel::error::{Result, VesselError};
use vessel::firewall::FirewallCmd;
use vessel::provision::{CreateRequest, Orchestrator, PortAllocator};
use vessel::registry::RegistryView;
use vessel::runtime::{ContainerRuntime, Podman};
use vessel::service::{ServiceAction, ServiceRegistrar, Systemctl};

/// Vessel - provision and manage service-backed podman containers
#[derive(Parser)]
#[command(name = "vessel")]
#[command(version)]
#[command(about = "Provision and manage service-backed podman containers", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Base directory for container data directories
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for backup artifacts
    #[arg(long, global = true)]
    backup_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a container with a service record and open port
    Create {
        /// Container name
        name: String,
        /// Base image
        #[arg(short, long)]
        image: Option<String>,
        /// Requested host port; allocation scans forward from here
        #[arg(short, long)]
        port: Option<String>,
        /// Comma-separated extra packages to install
        #[arg(long)]
        packages: Option<String>,
        /// CPU share
        #[arg(long)]
        cpus: Option<String>,
        /// Memory limit
        #[arg(long)]
        memory: Option<String>,
    },

    /// Remove a container and its service record
    #[command(name = "rm")]
    Remove {
        /// Container name
        name: String,
        /// Stop and remove even if running
        #[arg(short, long)]
        force: bool,
    },

    /// List containers
    #[command(name = "ls")]
    List {
        /// Which containers to show
        #[arg(short, long, value_enum, default_value_t = StateFilter::All)]
        state: StateFilter,
    },

    /// Open a shell inside a running container
    Enter {
        /// Container name
        name: String,
    },

    /// Export a container filesystem to a timestamped archive
    Backup {
        /// Container name
        name: String,
        /// Target directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// List backup artifacts
    Backups {
        /// Directory to list
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Import a backup archive as a new container
    Restore {
        /// Name for the restored container
        name: String,
        /// Backup archive
        file: PathBuf,
    },

    /// Manage a container's service record
    Service {
        /// Action to dispatch
        action: ActionArg,
        /// Container name
        name: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StateFilter {
    All,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ActionArg {
    Start,
    Stop,
    Restart,
    Status,
}

impl From<ActionArg> for ServiceAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Start => ServiceAction::Start,
            ActionArg::Stop => ServiceAction::Stop,
            ActionArg::Restart => ServiceAction::Restart,
            ActionArg::Status => ServiceAction::Status,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::default();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.backup_dir {
        config.backup_dir = dir;
    }

    let runtime: Arc<dyn ContainerRuntime> = Arc::new(Podman::new());
    let registrar = ServiceRegistrar::new(&config.unit_dir, Arc::new(Systemctl::new()));

    match cli.command {
        Commands::Create {
            name,
            image,
            port,
            packages,
            cpus,
            memory,
        } => {
            let packages = packages
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();

            let ports = PortAllocator::new(config.default_port);
            let orchestrator = Orchestrator::new(
                config,
                ports,
                runtime,
                registrar,
                Arc::new(FirewallCmd::new()),
            );

            let provisioned = orchestrator.create(&CreateRequest {
                name,
                image,
                port,
                packages,
                cpus,
                memory,
            })?;
            println!(
                "Container {} ready on port {}",
                provisioned.name, provisioned.port
            );
        }

        Commands::Remove { name, force } => {
            let ports = PortAllocator::new(config.default_port);
            let orchestrator = Orchestrator::new(
                config,
                ports,
                runtime,
                registrar,
                Arc::new(FirewallCmd::new()),
            );

            orchestrator.remove(&name, force)?;
            println!("{}", name);
        }

        Commands::List { state } => {
            let view = RegistryView::new(runtime);
            let records = match state {
                StateFilter::All => view.all()?,
                StateFilter::Running => view.running()?,
                StateFilter::Stopped => view.stopped()?,
            };

            println!(
                "{:<20} {:<40} {:<10} {:<20}",
                "NAME", "IMAGE", "STATUS", "PORTS"
            );
            for record in records {
                println!(
                    "{:<20} {:<40} {:<10} {:<20}",
                    record.name,
                    record.image,
                    record.status.to_string(),
                    record.ports.join(", ")
                );
            }
        }

        Commands::Enter { name } => {
            if !runtime.container_exists(&name)? {
                return Err(VesselError::ContainerNotFound(name));
            }
            runtime.exec_interactive(&name, &["/bin/bash".to_string()])?;
        }

        Commands::Backup { name, dir } => {
            let dir = dir.unwrap_or(config.backup_dir);
            std::fs::create_dir_all(&dir)?;

            let engine = BackupEngine::new(runtime);
            let artifact = engine.backup(&name, &dir)?;
            println!("{}", artifact.display());
        }

        Commands::Backups { dir } => {
            let dir = dir.unwrap_or(config.backup_dir);
            let artifacts = backup::list_artifacts(&dir)?;

            println!("{:<50} {:>12}", "ARTIFACT", "SIZE");
            for artifact in artifacts {
                let name = artifact
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                println!("{:<50} {:>12}", name, artifact.size);
            }
        }

        Commands::Restore { name, file } => {
            let engine = BackupEngine::new(runtime);
            engine.restore(&name, &file)?;
            println!("{}", name);
        }

        Commands::Service { action, name } => {
            if let Some(output) = registrar.manage(action.into(), &name)? {
                print!("{}", output);
            } else {
                println!("{}", name);
            }
        }
    }

    Ok(())
}
