//! Clinic database storage
//!
//! This module provides the persistent clinic database: one SQLite file
//! holding owners, pets, and consultations in a strict containment
//! hierarchy. Deleting an owner cascades to their pets and transitively to
//! those pets' consultations.

mod consultation;
mod owner;
mod pet;
mod seed;

pub use consultation::{
    Consultation, ConsultationListing, ConsultationPatch, ConsultationRepository, NewConsultation,
    DATE_FORMAT,
};
pub use owner::{NewOwner, Owner, OwnerPatch, OwnerRepository};
pub use pet::{NewPet, Pet, PetListing, PetPatch, PetRepository};
pub use seed::{seed_sample_data, SeedSummary};

use crate::database::core::{DatabaseConn, SchemaManager, SchemaStatus};
use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::info;

/// Main clinic database (SQLite backend)
///
/// `ClinicDatabase` provides a unified interface to the clinic tables. It
/// handles schema initialization, drift detection, and access to the
/// per-entity repositories. One instance owns the process's single
/// connection for its whole lifetime; dropping it closes the file.
pub struct ClinicDatabase {
    db: DatabaseConn,
}

impl ClinicDatabase {
    /// Open the clinic database at the specified path
    ///
    /// If the database doesn't exist, it is created and initialized. If the
    /// schema is outdated, from a newer version, or missing tables, it is
    /// reset and reinitialized (existing records are lost in that case).
    pub fn open(path: &str) -> Result<Self> {
        let db = DatabaseConn::open_path(path)?;
        let schema = SchemaManager::new(&db.conn);

        match schema.check_status()? {
            SchemaStatus::Current => {
                info!("Clinic database schema is current");
            }
            SchemaStatus::NotInitialized => {
                info!("Initializing clinic database schema");
                schema.initialize()?;
            }
            SchemaStatus::NeedsMigration { from, to } => {
                info!("Clinic database needs migration from v{} to v{}", from, to);
                // No incremental migrations yet; reset and reinitialize
                schema.reset()?;
                schema.initialize()?;
            }
            SchemaStatus::Incompatible {
                database_version,
                required_version,
            } => {
                info!(
                    "Clinic database schema incompatible (db: v{}, required: v{}), resetting",
                    database_version, required_version
                );
                schema.reset()?;
                schema.initialize()?;
            }
            SchemaStatus::Corrupted => {
                info!("Clinic database schema corrupted, resetting");
                schema.reset()?;
                schema.initialize()?;
            }
        }

        Ok(Self { db })
    }

    /// Open the clinic database, discarding any existing file first
    ///
    /// This is the explicit destructive-reset path; the default [`open`]
    /// keeps existing records.
    ///
    /// [`open`]: ClinicDatabase::open
    pub fn open_with_reset(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            std::fs::remove_file(path)
                .map_err(|e| anyhow!("Failed to remove database file '{}': {}", path, e))?;
            info!("Removed previous database file: {}", path);
        }
        Self::open(path)
    }

    /// Open the clinic database from a data directory
    ///
    /// Uses the standard database file path: `{data_dir}/vetclinic.sqlite3`
    pub fn open_in_dir(data_dir: &str) -> Result<Self> {
        let path = format!(
            "{}/{}",
            data_dir.trim_end_matches('/'),
            crate::config::DATABASE_FILE_NAME
        );
        Self::open(&path)
    }

    /// Create an in-memory clinic database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let db = DatabaseConn::open_in_memory()?;
        let schema = SchemaManager::new(&db.conn);
        schema.initialize()?;
        Ok(Self { db })
    }

    /// Get the owner repository
    pub fn owners(&self) -> OwnerRepository<'_> {
        OwnerRepository::new(&self.db.conn)
    }

    /// Get the pet repository
    pub fn pets(&self) -> PetRepository<'_> {
        PetRepository::new(&self.db.conn)
    }

    /// Get the consultation repository
    pub fn consultations(&self) -> ConsultationRepository<'_> {
        ConsultationRepository::new(&self.db.conn)
    }

    /// Get the underlying database connection (for advanced queries)
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.db.conn
    }

    /// Check whether the database has no owners yet
    pub fn needs_seed(&self) -> bool {
        self.owners().is_empty()
    }

    /// Load the fixed sample records into a fresh database
    pub fn seed(&self) -> Result<SeedSummary> {
        seed_sample_data(&self.db.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_initializes_schema() {
        let db = ClinicDatabase::open_in_memory().unwrap();
        assert!(db.needs_seed());
        assert!(db.owners().list().unwrap().is_empty());
    }

    #[test]
    fn test_open_is_not_destructive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.sqlite3");
        let path = path.to_str().unwrap();

        {
            let db = ClinicDatabase::open(path).unwrap();
            db.owners()
                .insert(&NewOwner {
                    name: "Juan Pérez".to_string(),
                    phone: None,
                    address: None,
                })
                .unwrap();
        }

        let db = ClinicDatabase::open(path).unwrap();
        assert_eq!(db.owners().count().unwrap(), 1);
    }

    #[test]
    fn test_open_with_reset_discards_previous_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.sqlite3");
        let path = path.to_str().unwrap();

        {
            let db = ClinicDatabase::open(path).unwrap();
            db.owners()
                .insert(&NewOwner {
                    name: "Juan Pérez".to_string(),
                    phone: None,
                    address: None,
                })
                .unwrap();
        }

        let db = ClinicDatabase::open_with_reset(path).unwrap();
        assert!(db.owners().list().unwrap().is_empty());
    }

    #[test]
    fn test_cascade_owner_to_pets_to_consultations() {
        let db = ClinicDatabase::open_in_memory().unwrap();
        db.seed().unwrap();

        // Juan (id 1) owns Fido (id 1, two consultations) and Luna (id 2, one)
        assert_eq!(db.pets().list_by_owner(1).unwrap().len(), 2);
        assert_eq!(db.consultations().list().unwrap().len(), 3);

        assert!(db.owners().delete(1).unwrap());

        assert!(db.pets().list_by_owner(1).unwrap().is_empty());
        assert!(db.consultations().list_by_pet(1).unwrap().is_empty());
        assert!(db.consultations().list_by_pet(2).unwrap().is_empty());
        // María's bird had no consultations; nothing else remains
        assert!(db.consultations().list().unwrap().is_empty());
        assert_eq!(db.pets().list().unwrap().len(), 1);
    }

    #[test]
    fn test_cascade_pet_to_consultations() {
        let db = ClinicDatabase::open_in_memory().unwrap();
        db.seed().unwrap();

        assert!(db.pets().delete(1).unwrap());
        assert!(db.consultations().list_by_pet(1).unwrap().is_empty());
        assert_eq!(db.consultations().list().unwrap().len(), 1);
    }

    #[test]
    fn test_concrete_scenario() {
        let db = ClinicDatabase::open_in_memory().unwrap();

        let owner_id = db
            .owners()
            .insert(&NewOwner {
                name: "Juan Pérez".to_string(),
                phone: Some("3101234567".to_string()),
                address: Some("Calle Falsa 123".to_string()),
            })
            .unwrap();
        assert_eq!(owner_id, 1);

        let pet_id = db
            .pets()
            .insert(&NewPet {
                name: "Fido".to_string(),
                species: Some("Perro".to_string()),
                breed: Some("Labrador".to_string()),
                age: Some(5),
                owner_id: Some(owner_id),
            })
            .unwrap();
        assert_eq!(pet_id, 1);

        let consultation_id = db
            .consultations()
            .insert(&NewConsultation {
                date: "2025-06-05 10:00:00".to_string(),
                reason: "Chequeo Anual".to_string(),
                diagnosis: Some("Todo en orden.".to_string()),
                pet_id: Some(pet_id),
            })
            .unwrap();
        assert_eq!(consultation_id, 1);

        let pets = db.pets().list_by_owner(owner_id).unwrap();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].name, "Fido");

        assert!(db.owners().delete(owner_id).unwrap());
        assert!(db.pets().list_by_owner(owner_id).unwrap().is_empty());
        assert!(db.consultations().list_by_pet(pet_id).unwrap().is_empty());
    }
}
