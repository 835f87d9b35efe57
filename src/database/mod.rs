//! Database module
//!
//! This module provides all database functionality for vetclinic, organized
//! into:
//!
//! - **core**: Core database infrastructure (SQLite connections, schema management)
//! - **clinic**: Clinic database facade and per-entity repositories
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/             # Foundation
//! │   ├── connection    # SQLite DatabaseConn wrapper
//! │   └── schema        # Schema definitions and management
//! │
//! └── clinic/           # Clinic records
//!     ├── owner         # Owner repository
//!     ├── pet           # Pet repository (joins owner names)
//!     ├── consultation  # Consultation repository (joins pet names)
//!     └── seed          # Fixed sample data for fresh databases
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use vetclinic::database::{ClinicDatabase, NewPet};
//!
//! let db = ClinicDatabase::open_in_dir("~/.vetclinic")?;
//! if db.needs_seed() {
//!     db.seed()?;
//! }
//!
//! let pets = db.pets().list_by_owner(1)?;
//! ```

pub mod clinic;
pub mod core;

// SQLite connection and schema management
pub use core::{DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};

// Clinic database (main entry point)
pub use clinic::ClinicDatabase;

// Per-entity repositories and record types
pub use clinic::{
    seed_sample_data, Consultation, ConsultationListing, ConsultationPatch,
    ConsultationRepository, NewConsultation, NewOwner, NewPet, Owner, OwnerPatch, OwnerRepository,
    Pet, PetListing, PetPatch, PetRepository, SeedSummary, DATE_FORMAT,
};
