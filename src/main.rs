// Prevents additional console window on Windows, DO NOT REMOVE!!
// we could make it only for release instead by using : all ( not(debug_assertions), target_os = "windows" )
#![cfg_attr (
    all (target_os = "windows"),
    windows_subsystem = "windows"
)]
// off-windows only the platform independent core gets built (and tested), so most of it goes unused there
#![cfg_attr (not(windows), allow(dead_code))]


mod types;
mod keys;
mod labels;
mod messages;
mod config;
mod monitor;    // <- sub-mods: registry, lines

#[cfg(windows)] mod win_app;
#[cfg(windows)] mod win_hooks;
#[cfg(windows)] mod win_utils;


use config::{Config, LogSetupError};



fn main() {

    let conf = Config::instance();

    // we want the non-blocking log-appender guard to be here in main, to ensure any pending logs get flushed upon crash etc
    let guard = match conf.setup_log_subscriber() {
        Ok(guard) => Some(guard),
        Err(LogSetupError::Disabled) => None,
        Err(e) => { eprintln! ("HookWatch logging unavailable: {}", e); None }
    };

    tracing::info! ("Starting HookWatch ...");

    conf.check_conf_version_match();

    if let Err(e) = run_app (conf) {
        tracing::error! ("HookWatch failed: {}", e);
        drop (guard);
        // ^^ exit skips destructors, so flush pending logs first
        std::process::exit(1);
    }
}


#[cfg(windows)]
fn run_app (conf: &'static Config) -> Result<(), win_app::AppError> {
    win_app::run (conf)
}

#[cfg(not(windows))]
fn run_app (_conf: &'static Config) -> Result<(), &'static str> {
    Err ("HookWatch watches Windows hooks, and can only run on Windows")
}
