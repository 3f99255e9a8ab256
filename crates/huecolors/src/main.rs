mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use huecolors_core::{Cache, HueSession};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands work on the file directly
        Command::Config(args) => {
            config::apply_defaults(&mut cli.global, &config::load_config_or_default());
            commands::config_cmd::handle(args, &cli.global)
        }

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "huecolors", &mut std::io::stdout());
            Ok(())
        }

        // Everything else goes through a session
        cmd => {
            let cfg = config::load_config()?;
            config::apply_defaults(&mut cli.global, &cfg);
            let (hue_config, database) = config::resolve(&cli.global, &cfg)?;

            let cache = Cache::open(&database)?;
            let session = HueSession::new(hue_config, cache);
            let mut notices = session.notices();
            session.init().await?;

            let cancel = CancellationToken::new();
            let guard = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    guard.cancel();
                }
            });

            tracing::debug!(command = ?cmd, "dispatching command");
            let dispatch = commands::dispatch(cmd, &session, &cli.global, &cancel);
            let result = until_cancelled(dispatch, &cancel).await;

            // Failures are rendered by miette; only echo confirmations.
            if result.is_ok() && !cli.global.quiet {
                while let Ok(notice) = notices.try_recv() {
                    eprintln!("{notice}");
                }
            }
            result
        }
    }
}

/// Drive `fut` to completion unless `cancel` fires first.
async fn until_cancelled<F>(fut: F, cancel: &CancellationToken) -> Result<(), CliError>
where
    F: Future<Output = Result<(), CliError>>,
{
    tokio::select! {
        result = fut => result,
        () = cancel.cancelled() => Err(CliError::Cancelled),
    }
}
