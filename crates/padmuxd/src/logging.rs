// Colorized wrappers for logging

use std::fmt::Display;

use chrono::NaiveDateTime;
use fern::Dispatch;

#[doc(hidden)]
pub use colored::Colorize as __Colorize;

const TIME_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Prefix `message` with the local time. Applied by the dispatcher to every
/// record, library ones included.
pub fn format_line(now: NaiveDateTime, message: impl Display) -> String {
    format!("[{}] {message}", now.format(TIME_FORMAT))
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {{
        use $crate::logging::__Colorize as _;
        log::error!("{}", format!($($arg)*).bright_red());
    }}
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }}
}

#[macro_export]
macro_rules! print_debug {
    ($($arg:tt)*) => {{
        use $crate::logging::__Colorize as _;
        log::debug!("{}", format!($($arg)*).dimmed());
    }}
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {{
        use $crate::logging::__Colorize as _;
        log::warn!("{}", format!($($arg)*).bright_yellow());
    }}
}

const OWN_TARGETS: [&str; 4] = [
    "padmuxd",
    "padmux_aggregator",
    "padmux_gamepad",
    "padmux_vpad",
];

/// Setup the logger.
pub fn setup(verbose: bool, no_color: bool) -> Result<(), log::SetLoggerError> {
    let log_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let mut dispatch = Dispatch::new()
        .format(|out, message, _record| {
            out.finish(format_args!(
                "{}",
                format_line(chrono::Local::now().naive_local(), message)
            ));
        })
        .level(log::LevelFilter::Warn); // Hide dependency chatter
    for target in OWN_TARGETS {
        dispatch = dispatch.level_for(target, log_level);
    }
    dispatch.chain(std::io::stdout()).apply()?;

    if no_color {
        colored::control::set_override(false);
    }
    Ok(())
}
