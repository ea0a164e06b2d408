//! prodomo - a work/break interval timer for the terminal
//!
//! Alternates a work interval and a break interval:
//! - 40 minutes of work and 10 minutes of break by default
//! - an alarm at every boundary
//! - the countdown mirrored into a desktop notification and an overlay

use anyhow::Result;
use clap::{CommandFactory, Parser};

use prodomo::cli::{
    apply_settings, run_session, show_config, Cli, Commands, Display, Paths, RunArgs,
};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so they never interleave with console output.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    if let Some(Commands::Completions { shell }) = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    let paths = Paths::resolve(&cli)?;
    tracing::debug!(
        "Settings file: {}, data dir: {}",
        paths.settings_file.display(),
        paths.data_dir.display()
    );

    match cli.command {
        Some(Commands::Run(args)) => run_session(&paths, &args).await?,
        None => run_session(&paths, &RunArgs::default()).await?,
        Some(Commands::Config) => show_config(&paths)?,
        Some(Commands::Set(args)) => apply_settings(&paths, &args)?,
        Some(Commands::Completions { .. }) => {}
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
