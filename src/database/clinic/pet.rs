//! Pet repository for the clinic database

use anyhow::{anyhow, Result};
use rusqlite::{Connection, ToSql};
use serde::{Deserialize, Serialize};

/// A stored pet record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub owner_id: Option<i64>,
}

/// Fields for inserting a new pet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPet {
    pub name: String,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub owner_id: Option<i64>,
}

/// Partial update of a pet record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetPatch {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub owner_id: Option<i64>,
}

impl PetPatch {
    /// Check whether the patch carries no changes
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.species.is_none()
            && self.breed.is_none()
            && self.age.is_none()
            && self.owner_id.is_none()
    }
}

/// A pet row joined with its owner's name, as shown in query listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetListing {
    pub id: i64,
    pub name: String,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub owner_name: Option<String>,
}

const PET_LISTING_SELECT: &str = r#"
    SELECT p.id, p.name, p.species, p.breed, p.age, o.name
    FROM pets p LEFT JOIN owners o ON p.owner_id = o.id
"#;

/// Repository for pet record operations
pub struct PetRepository<'a> {
    conn: &'a Connection,
}

impl<'a> PetRepository<'a> {
    /// Create a new pet repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new pet and return its assigned id
    ///
    /// A non-existent `owner_id` is rejected by the foreign-key checker and
    /// surfaces as an error.
    pub fn insert(&self, pet: &NewPet) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO pets (name, species, breed, age, owner_id) VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    pet.name.as_str(),
                    pet.species.as_deref(),
                    pet.breed.as_deref(),
                    pet.age,
                    pet.owner_id,
                ),
            )
            .map_err(|e| anyhow!("Failed to insert pet '{}': {}", pet.name, e))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetch a single pet by id
    pub fn get(&self, id: i64) -> Result<Option<Pet>> {
        let result = self.conn.query_row(
            "SELECT id, name, species, breed, age, owner_id FROM pets WHERE id = ?1",
            [id],
            |row| {
                Ok(Pet {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    species: row.get(2)?,
                    breed: row.get(3)?,
                    age: row.get(4)?,
                    owner_id: row.get(5)?,
                })
            },
        );

        match result {
            Ok(pet) => Ok(Some(pet)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(anyhow!("Failed to get pet {}: {}", id, e)),
        }
    }

    /// List all pets joined with their owner's name, ordered by id
    pub fn list(&self) -> Result<Vec<PetListing>> {
        let query = format!("{} ORDER BY p.id", PET_LISTING_SELECT);
        let mut stmt = self
            .conn
            .prepare(&query)
            .map_err(|e| anyhow!("Failed to prepare pet listing: {}", e))?;
        let params: &[&dyn ToSql] = &[];
        Self::stmt_to_listings(&mut stmt, params)
    }

    /// List the pets of one owner, joined with the owner's name
    ///
    /// An owner with no pets yields an empty vector, not an error.
    pub fn list_by_owner(&self, owner_id: i64) -> Result<Vec<PetListing>> {
        let query = format!("{} WHERE p.owner_id = ?1 ORDER BY p.id", PET_LISTING_SELECT);
        let mut stmt = self
            .conn
            .prepare(&query)
            .map_err(|e| anyhow!("Failed to prepare pet listing: {}", e))?;
        let params: &[&dyn ToSql] = &[&owner_id];
        Self::stmt_to_listings(&mut stmt, params)
    }

    /// Convert a prepared listing statement to rows
    fn stmt_to_listings(
        stmt: &mut rusqlite::Statement<'_>,
        params: &[&dyn ToSql],
    ) -> Result<Vec<PetListing>> {
        let rows = stmt
            .query_map(params, |row| {
                Ok(PetListing {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    species: row.get(2)?,
                    breed: row.get(3)?,
                    age: row.get(4)?,
                    owner_name: row.get(5)?,
                })
            })
            .map_err(|e| anyhow!("Failed to list pets: {}", e))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow!("Failed to read pet row: {}", e))
    }

    /// Apply a partial update to a pet
    ///
    /// Returns `Ok(true)` iff the pet existed and at least one field was
    /// written. An empty patch or an unknown id returns `Ok(false)`.
    pub fn update(&self, id: i64, patch: &PetPatch) -> Result<bool> {
        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();

        if let Some(name) = &patch.name {
            sets.push("name = ?");
            params.push(name);
        }
        if let Some(species) = &patch.species {
            sets.push("species = ?");
            params.push(species);
        }
        if let Some(breed) = &patch.breed {
            sets.push("breed = ?");
            params.push(breed);
        }
        if let Some(age) = &patch.age {
            sets.push("age = ?");
            params.push(age);
        }
        if let Some(owner_id) = &patch.owner_id {
            sets.push("owner_id = ?");
            params.push(owner_id);
        }

        if sets.is_empty() {
            return Ok(false);
        }

        let sql = format!("UPDATE pets SET {} WHERE id = ?", sets.join(", "));
        params.push(&id);

        let affected = self
            .conn
            .execute(&sql, params.as_slice())
            .map_err(|e| anyhow!("Failed to update pet {}: {}", id, e))?;
        Ok(affected > 0)
    }

    /// Delete a pet by id
    ///
    /// Cascades to the pet's consultations. Returns `Ok(true)` iff a row was
    /// removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM pets WHERE id = ?1", [id])
            .map_err(|e| anyhow!("Failed to delete pet {}: {}", id, e))?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::clinic::owner::{NewOwner, OwnerRepository};
    use crate::database::core::{DatabaseConn, SchemaManager};

    fn create_test_db() -> DatabaseConn {
        let db = DatabaseConn::open_in_memory().unwrap();
        SchemaManager::new(&db.conn).initialize().unwrap();
        db
    }

    fn insert_owner(db: &DatabaseConn, name: &str) -> i64 {
        OwnerRepository::new(&db.conn)
            .insert(&NewOwner {
                name: name.to_string(),
                phone: None,
                address: None,
            })
            .unwrap()
    }

    fn fido(owner_id: i64) -> NewPet {
        NewPet {
            name: "Fido".to_string(),
            species: Some("Perro".to_string()),
            breed: Some("Labrador".to_string()),
            age: Some(5),
            owner_id: Some(owner_id),
        }
    }

    #[test]
    fn test_insert_and_list_joins_owner_name() {
        let db = create_test_db();
        let owner_id = insert_owner(&db, "Juan Pérez");
        let repo = PetRepository::new(&db.conn);

        let id = repo.insert(&fido(owner_id)).unwrap();
        assert_eq!(id, 1);

        let listings = repo.list().unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name, "Fido");
        assert_eq!(listings[0].owner_name.as_deref(), Some("Juan Pérez"));
    }

    #[test]
    fn test_list_by_owner_filters() {
        let db = create_test_db();
        let juan = insert_owner(&db, "Juan Pérez");
        let maria = insert_owner(&db, "María García");
        let repo = PetRepository::new(&db.conn);

        repo.insert(&fido(juan)).unwrap();
        repo.insert(&NewPet {
            name: "Coco".to_string(),
            species: Some("Pájaro".to_string()),
            breed: None,
            age: Some(1),
            owner_id: Some(maria),
        })
        .unwrap();

        let juans_pets = repo.list_by_owner(juan).unwrap();
        assert_eq!(juans_pets.len(), 1);
        assert_eq!(juans_pets[0].name, "Fido");
    }

    #[test]
    fn test_list_by_owner_without_pets_is_empty() {
        let db = create_test_db();
        let owner_id = insert_owner(&db, "Juan Pérez");
        let repo = PetRepository::new(&db.conn);

        assert!(repo.list_by_owner(owner_id).unwrap().is_empty());
    }

    #[test]
    fn test_pet_without_owner_still_listed() {
        let db = create_test_db();
        let repo = PetRepository::new(&db.conn);

        repo.insert(&NewPet {
            name: "Callejero".to_string(),
            species: Some("Perro".to_string()),
            breed: None,
            age: None,
            owner_id: None,
        })
        .unwrap();

        let listings = repo.list().unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].owner_name, None);
    }

    #[test]
    fn test_insert_with_dangling_owner_rejected() {
        let db = create_test_db();
        let repo = PetRepository::new(&db.conn);

        assert!(repo.insert(&fido(42)).is_err());
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_age_only() {
        let db = create_test_db();
        let owner_id = insert_owner(&db, "Juan Pérez");
        let repo = PetRepository::new(&db.conn);
        let id = repo.insert(&fido(owner_id)).unwrap();

        let changed = repo
            .update(
                id,
                &PetPatch {
                    age: Some(6),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(changed);

        let pet = repo.get(id).unwrap().unwrap();
        assert_eq!(pet.age, Some(6));
        assert_eq!(pet.name, "Fido");
        assert_eq!(pet.species.as_deref(), Some("Perro"));
        assert_eq!(pet.breed.as_deref(), Some("Labrador"));
        assert_eq!(pet.owner_id, Some(owner_id));
    }

    #[test]
    fn test_update_empty_patch_fails() {
        let db = create_test_db();
        let owner_id = insert_owner(&db, "Juan Pérez");
        let repo = PetRepository::new(&db.conn);
        let id = repo.insert(&fido(owner_id)).unwrap();

        assert!(!repo.update(id, &PetPatch::default()).unwrap());
        assert_eq!(repo.get(id).unwrap().unwrap().age, Some(5));
    }

    #[test]
    fn test_update_unknown_id() {
        let db = create_test_db();
        let repo = PetRepository::new(&db.conn);

        let changed = repo
            .update(
                7,
                &PetPatch {
                    age: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_delete() {
        let db = create_test_db();
        let owner_id = insert_owner(&db, "Juan Pérez");
        let repo = PetRepository::new(&db.conn);
        let id = repo.insert(&fido(owner_id)).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
    }
}
