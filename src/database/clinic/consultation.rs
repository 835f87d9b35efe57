//! Consultation repository for the clinic database

use anyhow::{anyhow, Result};
use rusqlite::{Connection, ToSql};
use serde::{Deserialize, Serialize};

/// Timestamp format used for consultation dates
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored consultation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: i64,
    /// "YYYY-MM-DD HH:MM:SS" timestamp
    pub date: String,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub pet_id: Option<i64>,
}

/// Fields for inserting a new consultation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConsultation {
    pub date: String,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub pet_id: Option<i64>,
}

/// Partial update of a consultation record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsultationPatch {
    pub date: Option<String>,
    pub reason: Option<String>,
    pub diagnosis: Option<String>,
    pub pet_id: Option<i64>,
}

impl ConsultationPatch {
    /// Check whether the patch carries no changes
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.reason.is_none()
            && self.diagnosis.is_none()
            && self.pet_id.is_none()
    }
}

/// A consultation row joined with its pet's name, as shown in query listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationListing {
    pub id: i64,
    pub date: String,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub pet_name: Option<String>,
}

const CONSULTATION_LISTING_SELECT: &str = r#"
    SELECT c.id, c.date, c.reason, c.diagnosis, p.name
    FROM consultations c LEFT JOIN pets p ON c.pet_id = p.id
"#;

/// Repository for consultation record operations
pub struct ConsultationRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ConsultationRepository<'a> {
    /// Create a new consultation repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new consultation and return its assigned id
    ///
    /// A non-existent `pet_id` is rejected by the foreign-key checker and
    /// surfaces as an error.
    pub fn insert(&self, consultation: &NewConsultation) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO consultations (date, reason, diagnosis, pet_id) VALUES (?1, ?2, ?3, ?4)",
                (
                    consultation.date.as_str(),
                    consultation.reason.as_str(),
                    consultation.diagnosis.as_deref(),
                    consultation.pet_id,
                ),
            )
            .map_err(|e| anyhow!("Failed to insert consultation: {}", e))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetch a single consultation by id
    pub fn get(&self, id: i64) -> Result<Option<Consultation>> {
        let result = self.conn.query_row(
            "SELECT id, date, reason, diagnosis, pet_id FROM consultations WHERE id = ?1",
            [id],
            |row| {
                Ok(Consultation {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    reason: row.get(2)?,
                    diagnosis: row.get(3)?,
                    pet_id: row.get(4)?,
                })
            },
        );

        match result {
            Ok(consultation) => Ok(Some(consultation)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(anyhow!("Failed to get consultation {}: {}", id, e)),
        }
    }

    /// List all consultations joined with their pet's name, ordered by id
    pub fn list(&self) -> Result<Vec<ConsultationListing>> {
        let query = format!("{} ORDER BY c.id", CONSULTATION_LISTING_SELECT);
        let mut stmt = self
            .conn
            .prepare(&query)
            .map_err(|e| anyhow!("Failed to prepare consultation listing: {}", e))?;
        let params: &[&dyn ToSql] = &[];
        Self::stmt_to_listings(&mut stmt, params)
    }

    /// List the consultations of one pet, joined with the pet's name
    ///
    /// A pet with no consultations yields an empty vector, not an error.
    pub fn list_by_pet(&self, pet_id: i64) -> Result<Vec<ConsultationListing>> {
        let query = format!(
            "{} WHERE c.pet_id = ?1 ORDER BY c.id",
            CONSULTATION_LISTING_SELECT
        );
        let mut stmt = self
            .conn
            .prepare(&query)
            .map_err(|e| anyhow!("Failed to prepare consultation listing: {}", e))?;
        let params: &[&dyn ToSql] = &[&pet_id];
        Self::stmt_to_listings(&mut stmt, params)
    }

    /// Convert a prepared listing statement to rows
    fn stmt_to_listings(
        stmt: &mut rusqlite::Statement<'_>,
        params: &[&dyn ToSql],
    ) -> Result<Vec<ConsultationListing>> {
        let rows = stmt
            .query_map(params, |row| {
                Ok(ConsultationListing {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    reason: row.get(2)?,
                    diagnosis: row.get(3)?,
                    pet_name: row.get(4)?,
                })
            })
            .map_err(|e| anyhow!("Failed to list consultations: {}", e))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow!("Failed to read consultation row: {}", e))
    }

    /// Apply a partial update to a consultation
    ///
    /// Returns `Ok(true)` iff the consultation existed and at least one field
    /// was written. An empty patch or an unknown id returns `Ok(false)`.
    pub fn update(&self, id: i64, patch: &ConsultationPatch) -> Result<bool> {
        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();

        if let Some(date) = &patch.date {
            sets.push("date = ?");
            params.push(date);
        }
        if let Some(reason) = &patch.reason {
            sets.push("reason = ?");
            params.push(reason);
        }
        if let Some(diagnosis) = &patch.diagnosis {
            sets.push("diagnosis = ?");
            params.push(diagnosis);
        }
        if let Some(pet_id) = &patch.pet_id {
            sets.push("pet_id = ?");
            params.push(pet_id);
        }

        if sets.is_empty() {
            return Ok(false);
        }

        let sql = format!("UPDATE consultations SET {} WHERE id = ?", sets.join(", "));
        params.push(&id);

        let affected = self
            .conn
            .execute(&sql, params.as_slice())
            .map_err(|e| anyhow!("Failed to update consultation {}: {}", id, e))?;
        Ok(affected > 0)
    }

    /// Delete a consultation by id
    ///
    /// Returns `Ok(true)` iff a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM consultations WHERE id = ?1", [id])
            .map_err(|e| anyhow!("Failed to delete consultation {}: {}", id, e))?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::clinic::owner::{NewOwner, OwnerRepository};
    use crate::database::clinic::pet::{NewPet, PetRepository};
    use crate::database::core::{DatabaseConn, SchemaManager};

    fn create_test_db() -> DatabaseConn {
        let db = DatabaseConn::open_in_memory().unwrap();
        SchemaManager::new(&db.conn).initialize().unwrap();
        db
    }

    fn insert_pet(db: &DatabaseConn) -> i64 {
        let owner_id = OwnerRepository::new(&db.conn)
            .insert(&NewOwner {
                name: "Juan Pérez".to_string(),
                phone: None,
                address: None,
            })
            .unwrap();
        PetRepository::new(&db.conn)
            .insert(&NewPet {
                name: "Fido".to_string(),
                species: Some("Perro".to_string()),
                breed: None,
                age: Some(5),
                owner_id: Some(owner_id),
            })
            .unwrap()
    }

    fn checkup(pet_id: i64) -> NewConsultation {
        NewConsultation {
            date: "2025-06-05 10:00:00".to_string(),
            reason: "Chequeo Anual".to_string(),
            diagnosis: Some("Todo en orden.".to_string()),
            pet_id: Some(pet_id),
        }
    }

    #[test]
    fn test_insert_and_list_joins_pet_name() {
        let db = create_test_db();
        let pet_id = insert_pet(&db);
        let repo = ConsultationRepository::new(&db.conn);

        let id = repo.insert(&checkup(pet_id)).unwrap();
        assert_eq!(id, 1);

        let listings = repo.list().unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].date, "2025-06-05 10:00:00");
        assert_eq!(listings[0].reason, "Chequeo Anual");
        assert_eq!(listings[0].pet_name.as_deref(), Some("Fido"));
    }

    #[test]
    fn test_list_by_pet_without_consultations_is_empty() {
        let db = create_test_db();
        let pet_id = insert_pet(&db);
        let repo = ConsultationRepository::new(&db.conn);

        assert!(repo.list_by_pet(pet_id).unwrap().is_empty());
    }

    #[test]
    fn test_insert_with_dangling_pet_rejected() {
        let db = create_test_db();
        let repo = ConsultationRepository::new(&db.conn);

        assert!(repo.insert(&checkup(42)).is_err());
    }

    #[test]
    fn test_update_diagnosis_only() {
        let db = create_test_db();
        let pet_id = insert_pet(&db);
        let repo = ConsultationRepository::new(&db.conn);
        let id = repo.insert(&checkup(pet_id)).unwrap();

        let changed = repo
            .update(
                id,
                &ConsultationPatch {
                    diagnosis: Some("Requiere seguimiento.".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(changed);

        let consultation = repo.get(id).unwrap().unwrap();
        assert_eq!(
            consultation.diagnosis.as_deref(),
            Some("Requiere seguimiento.")
        );
        assert_eq!(consultation.reason, "Chequeo Anual");
        assert_eq!(consultation.date, "2025-06-05 10:00:00");
    }

    #[test]
    fn test_update_empty_patch_fails() {
        let db = create_test_db();
        let pet_id = insert_pet(&db);
        let repo = ConsultationRepository::new(&db.conn);
        let id = repo.insert(&checkup(pet_id)).unwrap();

        assert!(!repo.update(id, &ConsultationPatch::default()).unwrap());
    }

    #[test]
    fn test_update_unknown_id() {
        let db = create_test_db();
        let repo = ConsultationRepository::new(&db.conn);

        let changed = repo
            .update(
                5,
                &ConsultationPatch {
                    reason: Some("Vacunación".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_delete() {
        let db = create_test_db();
        let pet_id = insert_pet(&db);
        let repo = ConsultationRepository::new(&db.conn);
        let id = repo.insert(&checkup(pet_id)).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
    }
}
