mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use crossbeam_channel::{select, unbounded};

use padmux_aggregator::{Aggregator, Error as AggregatorError};
use padmux_gamepad::{default_source, SlotSource};
use padmux_vpad::default_bus;
use padmuxd::navigator::{NavEvent, NavigationHost, Navigator, StatusReport};
use padmuxd::{load_config, logging, print_debug, print_error, print_info, print_warning, DaemonConfig};

use crate::cli::{Cli, Command};

/// Terminal stand-in for a launcher window: always focused, logs navigation
/// and prints the status whenever it changes.
#[derive(Default)]
struct ConsoleHost {
    last_status: Option<StatusReport>,
}

impl NavigationHost for ConsoleHost {
    fn is_focused(&self) -> bool {
        true
    }

    fn navigate(&mut self, event: NavEvent) {
        print_debug!("navigate: {event:?}");
    }

    fn set_status(&mut self, report: &StatusReport) {
        if self.last_status.as_ref() == Some(report) {
            return;
        }
        for line in report.to_string().lines() {
            print_info!("{line}");
        }
        self.last_status = Some(report.clone());
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if logging::setup(cli.verbose, cli.no_color).is_err() {
        return ExitCode::FAILURE;
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            print_error!("failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Run => run(&config),
        Command::Slots => slots(),
        Command::Config => match config.to_yaml() {
            Ok(yaml) => {
                for line in yaml.lines() {
                    print_info!("{line}");
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                print_error!("failed to print config: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(config: &DaemonConfig) -> ExitCode {
    let source = default_source();
    let mut aggregator = match Aggregator::new(
        config.aggregator.to_config(),
        Arc::clone(&source),
        default_bus(),
    ) {
        Ok(aggregator) => aggregator,
        Err(e) => {
            print_error!("failed to create aggregator: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.aggregator.enabled {
        match aggregator.start() {
            Ok(()) => print_info!("virtual controller enabled"),
            Err(AggregatorError::DriverUnavailable(reason)) => {
                print_warning!("virtual controller disabled: {reason}");
            }
            Err(e) => print_error!("failed to start aggregator: {e}"),
        }
    }

    let mut navigator = Navigator::new(source, config.navigator.require_focus);
    navigator.set_ignored(aggregator.virtual_slots());

    // Handle Ctrl+C to exit cleanly
    let (stop_tx, stop_rx) = unbounded::<()>();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    }) {
        print_error!("failed to set Ctrl+C handler: {e}");
        return ExitCode::FAILURE;
    }

    let ticker = crossbeam_channel::tick(config.navigator.poll_interval());
    let mut host = ConsoleHost::default();
    print_info!("padmuxd started. Press Ctrl+C to stop.");
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                navigator.drive(&mut host);
            }
        }
    }

    // Releases the virtual controller to neutral once the loop is gone.
    aggregator.stop();
    print_info!("padmuxd stopped");
    ExitCode::SUCCESS
}

fn slots() -> ExitCode {
    let source = default_source();
    let connected = source.connected();
    if connected.is_empty() {
        print_info!("No controllers connected");
        return ExitCode::SUCCESS;
    }
    for slot in connected.iter() {
        let pressed = source
            .read(slot)
            .map(|snapshot| snapshot.pad.pressed().count())
            .unwrap_or(0);
        print_info!("slot {slot}: connected, {pressed} button(s) held");
    }
    ExitCode::SUCCESS
}
