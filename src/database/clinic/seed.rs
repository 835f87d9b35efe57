//! Sample data for fresh clinic databases
//!
//! A freshly created database is seeded with a small fixed set of owners,
//! pets, and consultations so the menu has something to show. Seeding is
//! skipped once any owner exists.

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use super::consultation::{ConsultationRepository, NewConsultation};
use super::owner::{NewOwner, OwnerRepository};
use super::pet::{NewPet, PetRepository};

/// Counts of records inserted by a seed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub owners: usize,
    pub pets: usize,
    pub consultations: usize,
}

/// Seed the database with the fixed sample records
///
/// Returns the number of records inserted per table, or `None` counts of
/// zero when the database already holds owners.
pub fn seed_sample_data(conn: &Connection) -> Result<SeedSummary> {
    let owners = OwnerRepository::new(conn);
    if !owners.is_empty() {
        info!("Database already has owners, skipping sample data");
        return Ok(SeedSummary {
            owners: 0,
            pets: 0,
            consultations: 0,
        });
    }

    let pets = PetRepository::new(conn);
    let consultations = ConsultationRepository::new(conn);

    let juan = owners.insert(&NewOwner {
        name: "Juan Pérez".to_string(),
        phone: Some("3101234567".to_string()),
        address: Some("Calle Falsa 123".to_string()),
    })?;
    let maria = owners.insert(&NewOwner {
        name: "María García".to_string(),
        phone: Some("3209876543".to_string()),
        address: Some("Carrera Siempre Viva 742".to_string()),
    })?;

    let fido = pets.insert(&NewPet {
        name: "Fido".to_string(),
        species: Some("Perro".to_string()),
        breed: Some("Labrador".to_string()),
        age: Some(5),
        owner_id: Some(juan),
    })?;
    let luna = pets.insert(&NewPet {
        name: "Luna".to_string(),
        species: Some("Gato".to_string()),
        breed: Some("Siamés".to_string()),
        age: Some(2),
        owner_id: Some(juan),
    })?;
    pets.insert(&NewPet {
        name: "Coco".to_string(),
        species: Some("Pájaro".to_string()),
        breed: Some("Periquito".to_string()),
        age: Some(1),
        owner_id: Some(maria),
    })?;

    consultations.insert(&NewConsultation {
        date: "2025-06-05 10:00:00".to_string(),
        reason: "Chequeo Anual".to_string(),
        diagnosis: Some("Todo en orden.".to_string()),
        pet_id: Some(fido),
    })?;
    consultations.insert(&NewConsultation {
        date: "2025-06-08 14:30:00".to_string(),
        reason: "Vacunación".to_string(),
        diagnosis: Some("Vacuna de refuerzo aplicada.".to_string()),
        pet_id: Some(fido),
    })?;
    consultations.insert(&NewConsultation {
        date: "2025-06-07 11:00:00".to_string(),
        reason: "Problema respiratorio".to_string(),
        diagnosis: Some("Bronquitis leve, tratamiento con antibióticos.".to_string()),
        pet_id: Some(luna),
    })?;

    let summary = SeedSummary {
        owners: 2,
        pets: 3,
        consultations: 3,
    };
    info!(
        "Seeded sample data: {} owners, {} pets, {} consultations",
        summary.owners, summary.pets, summary.consultations
    );
    Ok(summary)
}
