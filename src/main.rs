// SPDX-License-Identifier: GPL-3.0-only
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;

use crate::cli::Cli;
use crate::config::{Config, PROGNAME};
use crate::daemon::{Context, Daemon};
use crate::error::AppError;
use crate::hotplug::BlockMonitor;
use crate::notify::dbus::DbusSink;
use crate::shutdown::Shutdown;

#[macro_use]
extern crate tracing;

mod cli;
mod compose;
mod config;
mod daemon;
mod error;
mod hotplug;
mod notify;
mod router;
mod shutdown;
mod systemd;

fn setup_logs(config: &Config) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::new(format!(
        "warn,{}={}",
        env!("CARGO_CRATE_NAME"),
        config.log_level()
    ));

    if let Ok(journal_layer) = tracing_journald::layer() {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .with(journal_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    let shutdown = Shutdown::new().context("Can't create shutdown pipe")?;
    shutdown.install_signal_handler().map_err(AppError::Signal)?;

    let sink = DbusSink::connect().map_err(AppError::SinkInit)?;
    let mut monitor = BlockMonitor::new().map_err(AppError::SourceInit)?;

    let mut ctx = Context { config, shutdown };
    let mut daemon = Daemon::new(sink, &ctx.config);

    systemd::notify(systemd::READY);
    let result = daemon.run(&mut ctx, &mut monitor);
    systemd::notify(systemd::STOPPING);

    Ok(result?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli);
    setup_logs(&config);

    info!("{} v{} starting", PROGNAME, env!("CARGO_PKG_VERSION"));

    match run(config) {
        Ok(()) => {
            info!("Shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {:#}", PROGNAME, err);
            ExitCode::FAILURE
        }
    }
}
