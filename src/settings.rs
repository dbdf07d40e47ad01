use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

/// Runtime settings, layered as defaults, then a config file, then
/// `FILEARRAY_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory holding the `<name>.json` record files.
    pub data_dir: PathBuf,
    /// Address the HTTP listener binds to.
    pub listen: String,
    /// Base64 of `user:password`, compared against the Basic authorization header.
    pub token: String,
    /// Field searched by the date matcher when a command names none.
    pub date_field: String,
    /// Write a store back to its file after every mutating command.
    pub autosave: bool,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("json"),
            listen: "127.0.0.1:5000".to_string(),
            token: "YWRtaW46YWRtaW4=".to_string(), // admin:admin
            date_field: "Date".to_string(),
            autosave: true,
            log: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from `file` when given, otherwise from an optional
    /// `filearray.toml` in the working directory.
    pub fn load(file: Option<&Path>) -> Result<Settings> {
        let defaults = Settings::default();
        let builder = Config::builder()
            .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
            .set_default("listen", defaults.listen)?
            .set_default("token", defaults.token)?
            .set_default("date_field", defaults.date_field)?
            .set_default("autosave", defaults.autosave)?
            .set_default("log", defaults.log)?;
        let builder = match file {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("filearray").required(false)),
        };
        let settings = builder
            .add_source(Environment::with_prefix("FILEARRAY").try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
