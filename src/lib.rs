#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Vetclinic - veterinary clinic record keeping
//!
//! Vetclinic manages owners, pets, and consultations in a local SQLite
//! database and exposes an interactive console menu for create, query,
//! update, and delete operations. It can be used as both a command-line
//! application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none)  | SQLite database operations only | `rusqlite` |
//! | `display` | Table formatting for query listings | `tabled` |
//! | `cli` | Interactive menu binary | All above + `clap` |
//!
//! ```toml
//! # Minimal - just database operations
//! vetclinic = { version = "0.1", default-features = false }
//!
//! # Default (CLI binary with interactive menu)
//! vetclinic = "0.1"
//! ```
//!
//! # Architecture
//!
//! - **[`database`]**: All database functionality (always available)
//!   - `core`: SQLite connection management and schema definitions
//!   - `clinic`: Clinic database facade and per-entity repositories
//! - **[`menu`]**: Interactive console menu (requires `cli`)
//! - **[`config`]**: Configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vetclinic::database::{ClinicDatabase, NewOwner};
//!
//! let db = ClinicDatabase::open_in_dir("~/.vetclinic")?;
//! let id = db.owners().insert(&NewOwner {
//!     name: "Juan Pérez".to_string(),
//!     phone: Some("3101234567".to_string()),
//!     address: None,
//! })?;
//! println!("owner {id} registered");
//! ```

pub mod config;
pub mod database;

#[cfg(feature = "cli")]
pub mod menu;

pub use crate::config::VetclinicConfig;
pub use crate::database::ClinicDatabase;
