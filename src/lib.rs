//! Filearray – a small in-memory record store backed by a single JSON file.
//!
//! A store loads a JSON array of flat records, lets callers search, sort,
//! add, delete and edit them, and writes the array back to the same file:
//! * A [`construct::Record`] is a JSON object; its `ID` field is unique and
//!   assigned by the store.
//! * The *template* is the [`datatype::Shape`] of the first record the store
//!   sees. Every later record must match it (same field names, same per-field
//!   types, recursively).
//! * The *search index cache* holds the positions matched by the last search,
//!   which is what a delete removes.
//!
//! ## Modules
//! * [`construct`] – The [`construct::Store`], identities and confirmations.
//! * [`datatype`] – Value classes, shapes and the equality checker.
//! * [`matcher`] – Date (`dd.mm.yyyy`) and time (`hh:mm`) views over a store.
//! * [`persist`] – The [`persist::Persistor`] trait with file and in-memory backends.
//! * [`command`] – JSON commands and the [`command::Engine`] executing them.
//! * [`interface`] – A registry of named stores shared between requests.
//! * [`server`] – An axum router exposing the registry behind Basic-Auth.
//! * [`settings`] – Layered configuration.
//!
//! ## Quick Start
//! ```
//! use serde_json::json;
//! use filearray::construct::Store;
//! use filearray::persist::parse_records;
//! let records = parse_records(r#"[{"Name": "Al", "Age": 30, "ID": 1}, {"Name": "Bo", "Age": 25, "ID": 2}]"#).unwrap();
//! let mut store = Store::from_records(records).unwrap();
//! let found = store.search("Name", &json!("^A")).unwrap().unwrap();
//! assert_eq!(found[0]["ID"], json!(1));
//! store.add(json!({"Name": "Cy", "Age": 40})).unwrap();
//! assert_eq!(store.len(), 3);
//! ```
//!
//! ## Concurrency
//! A store is single-threaded and holds no locks. Hosts that share one store
//! between threads wrap it in a mutex, as [`interface::StoreRegistry`] does.

pub mod command;
pub mod construct;
pub mod datatype;
pub mod error;
pub mod interface;
pub mod matcher;
pub mod persist;
pub mod server;
pub mod settings;
