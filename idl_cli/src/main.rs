use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cmds;

#[derive(Parser)]
#[command(name = "idlc")]
#[command(about = "Go code generator for resolved IDL type graphs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Go packages from a resolved type graph
    Codegen {
        /// Resolved type graph (YAML, or JSON with a .json extension)
        #[arg(short = 'i', long = "input", value_name = "GRAPH")]
        input: PathBuf,

        /// Output root; each package lands under its import path
        #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "generated")]
        output_dir: PathBuf,

        /// Schema files to generate (default: every file in the graph)
        #[arg(short = 'f', long = "file", value_name = "SCHEMA")]
        files: Vec<String>,

        /// Generation options file
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /// Skip structured-logging methods
        #[arg(long = "no-zap")]
        no_zap: bool,

        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /// Validate a type graph and run generation without writing anything
    Check {
        /// Resolved type graph (YAML, or JSON with a .json extension)
        #[arg(short = 'i', long = "input", value_name = "GRAPH")]
        input: PathBuf,

        /// Generation options file
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Codegen { verbose, .. } | Commands::Check { verbose, .. } => *verbose,
        }
    }
}

/* RUST_LOG wins; otherwise -v raises the default level to debug */
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.verbose());

    match cli.command {
        Commands::Codegen { input, output_dir, files, config, no_zap, verbose } => {
            cmds::codegen::run(cmds::codegen::CodegenArgs { input, output_dir, files, config, no_zap, verbose })
        }
        Commands::Check { input, config, verbose } => cmds::check::run(&input, config.as_deref(), verbose),
    }
}
