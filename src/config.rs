#![ allow (non_snake_case, non_upper_case_globals) ]

use std::ops::Not;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};
use std::{fs, io};

use itertools::Itertools;
use thiserror::Error;
use tracing::metadata::LevelFilter;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::{reload, Layer, Registry};

use toml_edit::{DocumentMut, Item};

use crate::monitor::{LineLayout, LineOptions};
use crate::types::HookKind;



#[derive (Error, Debug)]
pub enum LogSetupError {
    #[error("Logging is disabled in config")]
    Disabled,
    #[error("Log subscriber is already set up")]
    AlreadySetUp,
    #[error("No writeable location for log files")]
    NoLogLocation,
    #[error("Could not create log appender: {0}")]
    Appender (String),
    #[error("Bad log timestamp format: {0}")]
    TimeFormat (String),
}



#[derive (Debug)]
pub struct Config {
    pub toml     : RwLock <Option <DocumentMut>>,
    pub default  : DocumentMut,
    pub loglevel : RwLock <Option <Handle <LevelFilter, Registry>>>,
}



// first some module level helper functions ..
/// Returns the directory of the currently running executable
fn get_app_dir () -> Option<PathBuf> {
    std::env::current_exe().ok() .and_then (|p| p.parent() .map (|p| p.to_path_buf()))
}

/// Checks whether a path is writeable by the current user by attempting to open/create a file in write mode
fn is_writeable (path: &Path) -> bool {
    fs::OpenOptions::new().write(true).create(true).truncate(false).open(path).is_ok()
    // note that ^^ this is similar to 'touch' and will create an empty file if it doesnt exist
}




impl Config {

    pub fn instance () -> &'static Config {
        static INSTANCE: OnceLock <Config> = OnceLock::new();
        INSTANCE .get_or_init ( || {
            let conf = Config::with_user_doc (None);
            conf.load();
            conf
        } )
    }

    /// builds a config around the bundled defaults and an (optional) already parsed user doc, without touching disk
    pub fn with_user_doc (user: Option<DocumentMut>) -> Config {
        Config {
            toml    : RwLock::new (user),
            default : DocumentMut::from_str (Self::DEFAULT_CONF) .expect ("bundled default conf should parse"),
            // ^^ our conf toml is at root of project, the include_str macro will load the contents at compile time
            loglevel : RwLock::new (None),
        }
    }

    pub const CONF_FILE_NAME : &'static str = "HookWatch.conf.toml";
    const DEFAULT_CONF : &'static str = include_str!("../HookWatch.conf.toml");


    fn get_config_file (&self) -> Option<PathBuf> {
        let app_dir_loc = get_app_dir() .map (|p| p.join(Self::CONF_FILE_NAME));
        if app_dir_loc.as_ref() .is_some_and (|p| is_writeable(p)) {
            return app_dir_loc
        }
        let app_data_dir = dirs::data_local_dir() .map (|p| p.join("HookWatch"));
        if let Some(dir) = app_data_dir.as_ref() .filter (|p| !p.exists()) {
            let _ = fs::create_dir (dir);
        }
        let app_data_dir_loc = app_data_dir .map (|p| p.join(Self::CONF_FILE_NAME));

        if app_data_dir_loc .as_ref() .is_some_and (|p| is_writeable(p)) {
            return app_data_dir_loc
        }
        None
    }
    pub fn get_log_loc (&self) -> Option<PathBuf> {
        self.get_config_file() .and_then (|p| p.parent() .map (|p| p.to_path_buf()))
    }


    pub fn trigger_config_file_edit (&self) {
        if let Some(conf_path) = self.get_config_file() {
            if let Err(e) = std::process::Command::new("cmd").arg("/c").arg("start").arg("").arg(&conf_path).spawn() {
                warn! ("Could not open {:?} for editing: {}", conf_path, e);
            }
        }
    }
    pub fn trigger_config_file_reset (&self) {
        self.toml.write().unwrap() .replace (self.default.clone());
        self.write_back_toml();
    }


    pub fn load (&self) {
        if let Some(conf_path) = self.get_config_file().as_ref() {
            if let Ok(cfg_str) = fs::read_to_string(conf_path) {
                if !cfg_str.trim().is_empty() {
                    match DocumentMut::from_str(&cfg_str) {
                        Ok(toml) => {
                            // successfully read and parsed a writeable non-empty toml, we'll use that
                            self.toml.write().unwrap().replace(toml);
                            return
                        }
                        Err(e) => warn! ("Failed to parse {:?}, resetting to defaults: {}", conf_path, e),
        }   }   }  }
        // there's no writeable location, or the file was empty, or we failed to read or parse it .. load default and write back
        self.trigger_config_file_reset();
    }

    pub fn reload_log_level (&self) {
        let log_level = self.get_log_level();
        if let Some(handle) = self.loglevel.read().unwrap().as_ref() {
            warn! ("Setting log-level to {:?}", log_level.into_level());
            let _ = handle.modify (|f| *f = log_level);
        }
    }

    pub fn setup_log_subscriber (&self) -> Result <WorkerGuard, LogSetupError> {

        if self.check_flag__logging_enabled().not() { return Err (LogSetupError::Disabled) }
        if self.loglevel.read().unwrap().is_some()  { return Err (LogSetupError::AlreadySetUp) }

        let log_loc = self.get_log_loc() .ok_or (LogSetupError::NoLogLocation)?;

        let log_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("HookWatch_log")
            .filename_suffix("log")
            .max_log_files(7)
            .build(log_loc)
            .map_err (|e| LogSetupError::Appender (e.to_string()))?;

        let time_format = ::time::format_description::parse_borrowed::<2> (
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
        ) .map_err (|e| LogSetupError::TimeFormat (e.to_string()))?;
        let timer = LocalTime::new (time_format);

        let (nb_log_appender, guard) = non_blocking (log_appender);

        let (level_filter, filter_handle) = reload::Layer::new(self.get_log_level());

        *self.loglevel.write().unwrap() = Some(filter_handle);

        let file_subscriber = tracing_subscriber::fmt::Layer::new()
            .with_writer(nb_log_appender)
            .with_ansi(false) .with_timer(timer.clone()) .with_filter(level_filter);

        let console_subscriber = tracing_subscriber::fmt::Layer::new()
            .with_ansi(true) .with_timer(timer)
            .with_writer ( io::stderr.with_min_level(Level::WARN) .or_else(io::stdout) )
            .with_filter (self.get_log_level());

        tracing_subscriber::registry() .with (file_subscriber) .with (console_subscriber) .init();

        Ok(guard)
    }


    fn write_back_toml (&self) {
        let Some(conf_path) = self.get_config_file() else { return };
        let toml_str = self.toml.read().unwrap().as_ref() .map (|d| d.to_string()) .unwrap_or_default();
        if let Err(e) = fs::write (&conf_path, toml_str) {
            warn! ("Could not write config back to {:?}: {}", conf_path, e);
        }
    }



    /// looks a key up in the user doc first, falling back to the bundled default
    fn lookup <T> (&self, key:&str, f: impl Fn(&Item) -> Option<T>) -> Option<T> {
        self.toml.read().unwrap().as_ref()
            .and_then (|t| t.get(key)) .and_then (&f)
            .or_else (|| self.default.get(key) .and_then (&f))
    }

    fn check_flag (&self, flag_name:&str) -> bool {
        self.lookup (flag_name, |t| t.as_bool()) .unwrap_or_default()
    }

    fn get_int (&self, key:&str) -> i64 {
        self.lookup (key, |t| t.as_integer()) .unwrap_or_default()
    }

    /// integer settings that end up as pixel coords .. out of range values fall back to the bundled default
    fn get_i32 (&self, key:&str) -> i32 {
        let val = self.get_int (key);
        i32::try_from (val) .unwrap_or_else (|_| {
            warn! ("Ignoring out of range value {} for {:?}", val, key);
            self.default.get(key) .and_then (|t| t.as_integer()) .and_then (|d| i32::try_from(d).ok()) .unwrap_or_default()
        })
    }

    fn get_string (&self, key:&str) -> String {
        self.lookup (key, |t| t.as_str().map (|s| s.to_string())) .unwrap_or_default()
    }

    fn get_string_array (&self, key:&str) -> Vec<String> {
        self.lookup (key, |t| {
            t.as_array() .map (|a| a.iter() .filter_map (|v| v.as_str().map(|s| s.to_string())) .collect::<Vec<_>>())
        }) .unwrap_or_default()
    }


    pub fn check_conf_version_match (&self) -> bool {
        let version_of = |doc: Option<&DocumentMut>| {
            doc .and_then (|d| d.get("hookwatch_conf_version")) .and_then (|t| t.as_float()) .unwrap_or_default()
        };
        let conf_version = version_of (self.toml.read().unwrap().as_ref());
        info! ("Using user conf {} with version : {:?}", Self::CONF_FILE_NAME, conf_version);

        let default_conf_version = version_of (Some(&self.default));
        if conf_version != default_conf_version {
            warn! (" !!! WARNING !!! CONF VERSION MISMATCH : Expected {:?} .. Found {:?}", default_conf_version, conf_version);
            return false
        }
        true
    }


    pub fn check_flag__logging_enabled (&self) -> bool {
        self.check_flag ("logging_enabled")
    }
    pub fn get_log_level (&self) -> LevelFilter {
        if !self.check_flag__logging_enabled() {
            return LevelFilter::OFF;
        }
        match self.get_string("logging_level").to_ascii_uppercase().as_str() {
            "TRACE" => LevelFilter::TRACE,
            "DEBUG" => LevelFilter::DEBUG,
            "WARN"  => LevelFilter::WARN,
            "ERROR" => LevelFilter::ERROR,
            "OFF"   => LevelFilter::OFF,
            _       => LevelFilter::INFO,
        }
    }


    pub fn get_window_title (&self) -> String {
        self.get_string ("window_title")
    }
    pub fn get_window_size (&self) -> (i32, i32) {
        let dim = |key, min| self.get_i32(key).max(min);
        (dim ("window_width", 200), dim ("window_height", 160))
    }


    /// row overrides from the `hook_rows` table, keyed by hook tag .. unknown tags are warned about and ignored
    pub fn get_hook_rows (&self) -> Vec <(HookKind, i32)> {
        self.lookup ("hook_rows", |t| {
            t.as_table_like() .map (|tbl| {
                tbl.iter() .filter_map (|(k, v)| {
                    let Ok(kind) = HookKind::from_str(k) else {
                        warn! ("Ignoring hook_rows entry for unknown hook kind {:?}", k);
                        return None
                    };
                    let row = v.as_integer()?;
                    match i32::try_from (row) {
                        Ok(row) => Some ((kind, row)),
                        Err(_)  => { warn! ("Ignoring out of range hook_rows entry {} = {}", k, row); None }
                    }
                }) .collect::<Vec<_>>()
            })
        }) .unwrap_or_default()
    }

    pub fn get_line_layout (&self) -> LineLayout {
        LineLayout::new (self.get_i32("text_left_margin"), &self.get_hook_rows())
    }

    pub fn get_line_options (&self) -> LineOptions {
        let max_chars = self.get_int ("max_line_chars");
        LineOptions {
            key_names : self.check_flag ("keyboard_show_key_names"),
            max_chars : usize::try_from (max_chars) .ok() .filter (|&n| n > 0),
        }
    }

    pub fn get_hooks_installed_at_startup (&self) -> Vec<HookKind> {
        self.get_string_array ("hooks_installed_at_startup") .iter()
            .filter_map (|s| match HookKind::from_str(s) {
                Ok(kind) => Some(kind),
                Err(e)   => { warn! ("Ignoring startup hook entry: {}", e); None }
            })
            .sorted() .dedup() .collect()
    }

}
