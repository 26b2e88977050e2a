use crate::pipeline::{BuildOptions, Pipeline};
use crate::types::{config::PackConfig, error::PackError};
use crate::utils::logger::{self, LogLevel, Logger};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod addon;
mod builder;
mod client;
mod pipeline;
mod types;
mod utils;

#[derive(Parser)]
#[command(name = "bkpack")]
#[command(author = "BlenderKit")]
#[command(version)]
#[command(about = "Builds the BlenderKit client and packages the BlenderKit Godot plugin")]
struct Cli {
    /// Project root holding the plugin sources (defaults to the current directory)
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Log every copied file
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PluginArgs {
    /// Client source directory; when set, sources are not fetched
    #[arg(long)]
    client_dir: Option<PathBuf>,
    /// Output directory for the staged plugin and the archive
    #[arg(long)]
    result_dir: Option<PathBuf>,
    /// Use this vX.Y.Z binaries directory instead of building/locating the client
    #[arg(long)]
    client_build: Option<PathBuf>,
    /// Also copy the staged plugin to <dir>/<plugin>, e.g. a Godot project's addons folder
    #[arg(long)]
    install_at: Option<PathBuf>,
    /// Directory to delete after the plugin is staged, e.g. a cached client/bin
    #[arg(long)]
    clean_dir: Option<PathBuf>,
}

impl From<PluginArgs> for BuildOptions {
    fn from(a: PluginArgs) -> Self {
        BuildOptions {
            client_dir: a.client_dir,
            result_dir: a.result_dir,
            client_build: a.client_build,
            install_at: a.install_at,
            clean_dir: a.clean_dir,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and build the client, stage the plugin, then create the archive
    Build(PluginArgs),

    /// Fetch and build the client only
    BuildClient {
        /// Client source directory; when set, sources are not fetched
        #[arg(long)]
        client_dir: Option<PathBuf>,
    },

    /// Stage plugin sources and client binaries into the result directory
    BuildPlugin(PluginArgs),

    /// Zip the staged plugin into <base>_v<version>.zip
    BuildArchive {
        /// Output directory holding the staged plugin
        #[arg(long)]
        result_dir: Option<PathBuf>,
    },

    /// Clone or update the client sources
    GetClientSrc {},

    /// Write a new plugin version (a leading 'v' is dropped)
    SetVersion {
        /// New version, e.g. 1.2.3 or v1.2.3
        version: String,
    },

    /// Print the current plugin version
    Version {},

    /// Delete build outputs
    Clean {},
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::set_verbose(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Logger::new().log_message(LogLevel::Error, &e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), PackError> {
    let project_root = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir()
            .map_err(|e| PackError::Io(format!("Failed to get current dir: {}", e)))?,
    };
    let cfg = PackConfig::load(&project_root)?;
    let pipeline = Pipeline::new(cfg, project_root);

    match cli.command {
        Commands::Build(args) => pipeline.build(&BuildOptions::from(args)).map(|_| ()),
        Commands::BuildClient { client_dir } => pipeline.build_client(&BuildOptions {
            client_dir,
            ..BuildOptions::default()
        }),
        Commands::BuildPlugin(args) => pipeline.build_plugin(&BuildOptions::from(args)).map(|_| ()),
        Commands::BuildArchive { result_dir } => pipeline
            .build_archive(&BuildOptions {
                result_dir,
                ..BuildOptions::default()
            })
            .map(|_| ()),
        Commands::GetClientSrc {} => pipeline.get_client_src(),
        Commands::SetVersion { version } => pipeline.set_version(&version),
        Commands::Version {} => pipeline.show_version().map(|_| ()),
        Commands::Clean {} => pipeline.clean(),
    }
}
