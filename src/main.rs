use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{config, rename, validate};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LOG_ENV: &str = "PKGWIZ_LOG";

#[derive(Parser)]
#[command(name = "pkgwiz")]
#[command(version = VERSION)]
#[command(about = "Rename a package's identity: manifest, module descriptors and folder")]
struct Cli {
    /// Project root (default: current directory)
    #[arg(long, global = true)]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check company and package names and show the derived domain name
    Validate(validate::ValidateArgs),
    /// Preview or apply a package rename
    Rename(rename::RenameArgs),
    /// Show pkgwiz configuration
    Config(config::ConfigArgs),
}

/// Logs go to stderr so stdout stays a single JSON document.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> std::process::ExitCode {
    init_logging();

    let cli = Cli::parse();
    let global = GlobalArgs {
        project: cli.project,
    };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);

    if let Err(err) = output::print_json_result(json_result) {
        tracing::error!(code = err.code.as_str(), "{}", err.message);
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
