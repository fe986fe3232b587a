//! odo-core - Core library for Odo
//!
//! This crate contains the shared models, local store, sync coordination,
//! and export logic used by all Odo clients (mobile, CLI).

pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod remote;
pub mod services;
pub mod sync;

pub use error::{Error, Result};
pub use models::{EmployeeId, RecordId, SyncRecord};
