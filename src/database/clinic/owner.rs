//! Owner repository for the clinic database
//!
//! Owners are the root of the clinic record hierarchy; pets hang off owners
//! and consultations hang off pets.

use anyhow::{anyhow, Result};
use rusqlite::{Connection, ToSql};
use serde::{Deserialize, Serialize};

/// A stored owner record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Fields for inserting a new owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOwner {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update of an owner record
///
/// `None` fields are left untouched. An all-`None` patch is a no-op and
/// `update` reports it as a failure without touching storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl OwnerPatch {
    /// Check whether the patch carries no changes
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

/// Repository for owner record operations
pub struct OwnerRepository<'a> {
    conn: &'a Connection,
}

impl<'a> OwnerRepository<'a> {
    /// Create a new owner repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Check if the owners table is empty
    pub fn is_empty(&self) -> bool {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM owners", [], |row| row.get(0))
            .unwrap_or(0);
        count == 0
    }

    /// Get the number of stored owners
    pub fn count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM owners", [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get owner count: {}", e))?;
        Ok(count)
    }

    /// Insert a new owner and return its assigned id
    pub fn insert(&self, owner: &NewOwner) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO owners (name, phone, address) VALUES (?1, ?2, ?3)",
                (
                    owner.name.as_str(),
                    owner.phone.as_deref(),
                    owner.address.as_deref(),
                ),
            )
            .map_err(|e| anyhow!("Failed to insert owner '{}': {}", owner.name, e))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Fetch a single owner by id
    pub fn get(&self, id: i64) -> Result<Option<Owner>> {
        let result = self.conn.query_row(
            "SELECT id, name, phone, address FROM owners WHERE id = ?1",
            [id],
            |row| {
                Ok(Owner {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    phone: row.get(2)?,
                    address: row.get(3)?,
                })
            },
        );

        match result {
            Ok(owner) => Ok(Some(owner)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(anyhow!("Failed to get owner {}: {}", id, e)),
        }
    }

    /// List all owners, ordered by id
    pub fn list(&self) -> Result<Vec<Owner>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, phone, address FROM owners ORDER BY id")
            .map_err(|e| anyhow!("Failed to prepare owner listing: {}", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Owner {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    phone: row.get(2)?,
                    address: row.get(3)?,
                })
            })
            .map_err(|e| anyhow!("Failed to list owners: {}", e))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow!("Failed to read owner row: {}", e))
    }

    /// Apply a partial update to an owner
    ///
    /// Returns `Ok(true)` iff the owner existed and at least one field was
    /// written. An empty patch or an unknown id returns `Ok(false)`.
    pub fn update(&self, id: i64, patch: &OwnerPatch) -> Result<bool> {
        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();

        if let Some(name) = &patch.name {
            sets.push("name = ?");
            params.push(name);
        }
        if let Some(phone) = &patch.phone {
            sets.push("phone = ?");
            params.push(phone);
        }
        if let Some(address) = &patch.address {
            sets.push("address = ?");
            params.push(address);
        }

        if sets.is_empty() {
            return Ok(false);
        }

        let sql = format!("UPDATE owners SET {} WHERE id = ?", sets.join(", "));
        params.push(&id);

        let affected = self
            .conn
            .execute(&sql, params.as_slice())
            .map_err(|e| anyhow!("Failed to update owner {}: {}", id, e))?;
        Ok(affected > 0)
    }

    /// Delete an owner by id
    ///
    /// Cascades to the owner's pets and their consultations. Returns
    /// `Ok(true)` iff a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM owners WHERE id = ?1", [id])
            .map_err(|e| anyhow!("Failed to delete owner {}: {}", id, e))?;
        Ok(affected > 0)
    }
}
