mod cli;
mod command;
mod runner;
mod transport;

use arc_shared::ReturnCode;
use cli::Invocation;
use runner::ArcConfig;
use std::process::ExitCode;
use transport::{DiscoveryConfig, SerialConnector, SystemEnumerator};

use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let code = match cli::parse(std::env::args_os()) {
        Invocation::Run(cli) => {
            init_tracing(cli.verbose);

            let config = ArcConfig {
                discovery: DiscoveryConfig {
                    descriptor: cli.descriptor.clone(),
                },
                ..Default::default()
            };
            debug!("Config: {:?}", config);

            runner::run(&config, &cli.command, &SystemEnumerator, &SerialConnector).await
        }
        Invocation::Informational => return ExitCode::SUCCESS,
        Invocation::WrongArgs(reason) => {
            init_tracing(0);
            debug!("Argument error: {}", reason);
            ReturnCode::WrongArgs
        }
    };

    println!("{}", code);
    ExitCode::from(code.exit_code())
}

/// Logs go to stderr; stdout carries only usage text and the outcome
fn init_tracing(verbose: u8) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .init();
}

/// `RUST_LOG` wins when set; `-v` only picks the fallback level
fn env_filter(verbose: u8, env: Option<&str>) -> EnvFilter {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(env.unwrap_or_default())
}
