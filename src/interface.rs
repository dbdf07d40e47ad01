//! Registry of named stores shared between request handlers.
//!
//! Each name maps to one JSON file under the data directory and to exactly
//! one [`Store`] behind a mutex. The mutex is what serializes concurrent
//! callers; the store itself assumes single-threaded access.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::command::{Command, Engine, Outcome};
use crate::construct::Store;
use crate::error::{FileArrayError, Result};
use crate::persist::PersistenceMode;
use crate::settings::Settings;

lazy_static! {
    static ref STORE_NAME: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|e| FileArrayError::Lock(e.to_string()))
}

pub struct StoreRegistry {
    data_dir: PathBuf,
    date_field: String,
    autosave: bool,
    stores: Mutex<HashMap<String, Arc<Mutex<Store>>>>,
}

impl StoreRegistry {
    pub fn new(settings: &Settings) -> Self {
        Self {
            data_dir: settings.data_dir.clone(),
            date_field: settings.date_field.clone(),
            autosave: settings.autosave,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Registers an already loaded store under `name`, replacing any previous one.
    pub fn insert(&self, name: &str, store: Store) -> Result<Arc<Mutex<Store>>> {
        Self::check_name(name)?;
        let store = Arc::new(Mutex::new(store));
        lock(&self.stores)?.insert(name.to_string(), Arc::clone(&store));
        Ok(store)
    }

    /// Returns the store for `name`, loading `<data_dir>/<name>.json` on first use.
    /// The file is read without holding the registry lock; if two callers load
    /// the same name at once, the first one registered wins.
    pub fn open(&self, name: &str) -> Result<Arc<Mutex<Store>>> {
        Self::check_name(name)?;
        if let Some(store) = lock(&self.stores)?.get(name) {
            return Ok(Arc::clone(store));
        }
        let path = self.data_dir.join(format!("{}.json", name));
        let loaded = Store::open(PersistenceMode::File(path))?;
        let store = lock(&self.stores)?
            .entry(name.to_string())
            .or_insert_with(|| {
                info!(store = name, "store opened");
                Arc::new(Mutex::new(loaded))
            })
            .clone();
        Ok(store)
    }

    /// Runs one command against the named store, writing it back afterwards
    /// when the command mutated it and autosave is on.
    ///
    /// A mutation that succeeded is reported as such even when the autosave
    /// fails. The failure is logged and the collection stays mutated in memory,
    /// so the next successful write persists it.
    pub fn run(&self, name: &str, command: Command) -> Result<Outcome> {
        let store = self.open(name)?;
        let mut store = lock(&store)?;
        let mutation = command.is_mutation();
        let outcome = Engine::new(&mut store)
            .with_date_field(self.date_field.as_str())
            .execute(command)?;
        if mutation && self.autosave {
            if let Err(e) = store.write() {
                warn!(store = name, error = %e, "autosave failed, changes kept in memory");
            }
        }
        Ok(outcome)
    }

    pub fn len(&self) -> usize {
        self.stores.lock().map_or(0, |stores| stores.len())
    }

    fn check_name(name: &str) -> Result<()> {
        if STORE_NAME.is_match(name) {
            Ok(())
        } else {
            Err(FileArrayError::InvalidArgument(format!("invalid store name \"{}\"", name)))
        }
    }
}
