#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Marquee movie-alert client.
//!
//! This crate hosts the preference-form selection state, the theatre
//! catalog loader, the remote preference-store client, identity
//! resolution, and configuration handling used by the terminal UI and
//! any future frontends.

pub mod catalog;
pub mod config;
pub mod identity;
pub mod models;
pub mod selection;
pub mod store;

pub use catalog::{Catalog, CatalogLoader};
pub use config::AppConfig;
pub use identity::Identity;
pub use models::{AlertMode, PreferenceRecord, TheatreRow};
pub use selection::{Selection, ValidationError};
pub use store::{PreferenceStore, StoreError};
