//! Interactive console menu
//!
//! A finite-state loop over the clinic database: a main menu with five
//! options (insert, query, update, delete, exit), each of the first four
//! entering its own sub-menu. The loop is generic over [`BufRead`]/[`Write`]
//! so it can be driven by scripted input in tests; the binary runs it over
//! locked stdin/stdout.
//!
//! Input rules:
//! - ids are digit-checked before use; anything else rejects the action
//!   (insert/delete) or means "no change" (update)
//! - optional text fields treat an empty line as "not provided"
//! - invalid menu selections print an error and redisplay the menu
//!
//! Storage errors reported by the repositories are printed and the current
//! action is abandoned; they never terminate the loop.

use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::NaiveDateTime;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::database::{
    ClinicDatabase, ConsultationListing, ConsultationPatch, NewConsultation, NewOwner, NewPet,
    Owner, OwnerPatch, PetListing, PetPatch, DATE_FORMAT,
};

/// States of the menu loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuState {
    Main,
    Insert,
    Query,
    Update,
    Delete,
    Exit,
}

/// Placeholder shown for absent optional fields in listings
const NOT_AVAILABLE: &str = "N/A";

#[derive(Tabled)]
struct OwnerRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Address")]
    address: String,
}

impl From<&Owner> for OwnerRow {
    fn from(owner: &Owner) -> Self {
        Self {
            id: owner.id,
            name: owner.name.clone(),
            phone: owner
                .phone
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            address: owner
                .address
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

#[derive(Tabled)]
struct PetRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Breed")]
    breed: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Owner")]
    owner: String,
}

impl From<&PetListing> for PetRow {
    fn from(pet: &PetListing) -> Self {
        Self {
            id: pet.id,
            name: pet.name.clone(),
            species: pet
                .species
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            breed: pet
                .breed
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            age: pet
                .age
                .map(|a| a.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            owner: pet
                .owner_name
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

#[derive(Tabled)]
struct ConsultationRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Pet")]
    pet: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Diagnosis")]
    diagnosis: String,
}

impl From<&ConsultationListing> for ConsultationRow {
    fn from(consultation: &ConsultationListing) -> Self {
        Self {
            id: consultation.id,
            date: consultation.date.clone(),
            pet: consultation
                .pet_name
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            reason: consultation.reason.clone(),
            diagnosis: consultation
                .diagnosis
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

/// The interactive menu loop
///
/// Holds the input and output handles; all durable state lives in the
/// database.
pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Create a menu over the given input and output handles
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Run the menu loop until the user exits or input ends
    pub fn run(&mut self, db: &ClinicDatabase) -> Result<()> {
        let mut state = MenuState::Main;
        while state != MenuState::Exit {
            state = match state {
                MenuState::Main => self.main_menu()?,
                MenuState::Insert => self.insert_menu(db)?,
                MenuState::Query => self.query_menu(db)?,
                MenuState::Update => self.update_menu(db)?,
                MenuState::Delete => self.delete_menu(db)?,
                MenuState::Exit => MenuState::Exit,
            };
        }
        writeln!(self.output, "\nDatabase connection closed. Goodbye!")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Input helpers
    // ------------------------------------------------------------------

    /// Print a prompt and read one trimmed line; `None` on end of input
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt for an optional text field; empty line means "not provided"
    fn prompt_optional(&mut self, message: &str) -> Result<Option<String>> {
        Ok(self.prompt(message)?.filter(|s| !s.is_empty()))
    }

    /// Prompt for an id; `None` when the input is not all digits
    fn prompt_id(&mut self, message: &str) -> Result<Option<i64>> {
        let Some(line) = self.prompt(message)? else {
            return Ok(None);
        };
        Ok(parse_digits(&line))
    }

    // ------------------------------------------------------------------
    // Menus
    // ------------------------------------------------------------------

    fn main_menu(&mut self) -> Result<MenuState> {
        writeln!(self.output, "\n\n--- VETERINARY CLINIC MENU ---")?;
        writeln!(self.output, "1. Insert new record")?;
        writeln!(self.output, "2. Query and list records")?;
        writeln!(self.output, "3. Update existing record")?;
        writeln!(self.output, "4. Delete record")?;
        writeln!(self.output, "5. Exit")?;

        let Some(choice) = self.prompt("Select an option: ")? else {
            return Ok(MenuState::Exit);
        };
        Ok(match choice.as_str() {
            "1" => MenuState::Insert,
            "2" => MenuState::Query,
            "3" => MenuState::Update,
            "4" => MenuState::Delete,
            "5" => MenuState::Exit,
            _ => {
                writeln!(self.output, "Invalid option.")?;
                MenuState::Main
            }
        })
    }

    fn insert_menu(&mut self, db: &ClinicDatabase) -> Result<MenuState> {
        loop {
            writeln!(self.output, "\n--- INSERT NEW RECORD ---")?;
            writeln!(self.output, "1. Insert owner")?;
            writeln!(self.output, "2. Insert pet")?;
            writeln!(self.output, "3. Insert consultation")?;
            writeln!(self.output, "4. Back to main menu")?;

            let Some(choice) = self.prompt("Select an insert option: ")? else {
                return Ok(MenuState::Exit);
            };
            match choice.as_str() {
                "1" => self.insert_owner(db)?,
                "2" => self.insert_pet(db)?,
                "3" => self.insert_consultation(db)?,
                "4" => return Ok(MenuState::Main),
                _ => writeln!(self.output, "Invalid option.")?,
            }
        }
    }

    fn query_menu(&mut self, db: &ClinicDatabase) -> Result<MenuState> {
        loop {
            writeln!(self.output, "\n--- QUERY AND LIST RECORDS ---")?;
            writeln!(self.output, "1. List all owners")?;
            writeln!(self.output, "2. List all pets")?;
            writeln!(self.output, "3. List all consultations")?;
            writeln!(self.output, "4. List pets by owner id")?;
            writeln!(self.output, "5. List consultations by pet id")?;
            writeln!(self.output, "6. Back to main menu")?;

            let Some(choice) = self.prompt("Select a query option: ")? else {
                return Ok(MenuState::Exit);
            };
            match choice.as_str() {
                "1" => self.show_owners(db)?,
                "2" => self.show_pets(db, None)?,
                "3" => self.show_consultations(db, None)?,
                "4" => {
                    match self.prompt_id("Owner id to list pets for: ")? {
                        Some(id) => self.show_pets(db, Some(id))?,
                        None => writeln!(self.output, "Invalid owner id.")?,
                    };
                }
                "5" => {
                    match self.prompt_id("Pet id to list consultations for: ")? {
                        Some(id) => self.show_consultations(db, Some(id))?,
                        None => writeln!(self.output, "Invalid pet id.")?,
                    };
                }
                "6" => return Ok(MenuState::Main),
                _ => writeln!(self.output, "Invalid option.")?,
            }
        }
    }

    fn update_menu(&mut self, db: &ClinicDatabase) -> Result<MenuState> {
        loop {
            writeln!(self.output, "\n--- UPDATE EXISTING RECORD ---")?;
            writeln!(self.output, "1. Update owner")?;
            writeln!(self.output, "2. Update pet")?;
            writeln!(self.output, "3. Update consultation")?;
            writeln!(self.output, "4. Back to main menu")?;

            let Some(choice) = self.prompt("Select an update option: ")? else {
                return Ok(MenuState::Exit);
            };
            match choice.as_str() {
                "1" => self.update_owner(db)?,
                "2" => self.update_pet(db)?,
                "3" => self.update_consultation(db)?,
                "4" => return Ok(MenuState::Main),
                _ => writeln!(self.output, "Invalid option.")?,
            }
        }
    }

    fn delete_menu(&mut self, db: &ClinicDatabase) -> Result<MenuState> {
        loop {
            writeln!(self.output, "\n--- DELETE RECORD ---")?;
            writeln!(self.output, "1. Delete owner")?;
            writeln!(self.output, "2. Delete pet")?;
            writeln!(self.output, "3. Delete consultation")?;
            writeln!(self.output, "4. Back to main menu")?;

            let Some(choice) = self.prompt("Select a delete option: ")? else {
                return Ok(MenuState::Exit);
            };
            match choice.as_str() {
                "1" => self.delete_owner(db)?,
                "2" => self.delete_pet(db)?,
                "3" => self.delete_consultation(db)?,
                "4" => return Ok(MenuState::Main),
                _ => writeln!(self.output, "Invalid option.")?,
            }
        }
    }

    // ------------------------------------------------------------------
    // Insert actions
    // ------------------------------------------------------------------

    fn insert_owner(&mut self, db: &ClinicDatabase) -> Result<()> {
        let Some(name) = self.prompt_optional("Owner name: ")? else {
            writeln!(self.output, "Owner name is required.")?;
            return Ok(());
        };
        let phone = self.prompt_optional("Owner phone (optional): ")?;
        let address = self.prompt_optional("Owner address (optional): ")?;

        match db.owners().insert(&NewOwner {
            name: name.clone(),
            phone,
            address,
        }) {
            Ok(id) => writeln!(self.output, "Owner '{}' added with id {}.", name, id)?,
            Err(e) => writeln!(self.output, "Error inserting owner: {}", e)?,
        }
        Ok(())
    }

    fn insert_pet(&mut self, db: &ClinicDatabase) -> Result<()> {
        let Some(name) = self.prompt_optional("Pet name: ")? else {
            writeln!(self.output, "Pet name is required.")?;
            return Ok(());
        };
        let species = self.prompt_optional("Pet species (optional): ")?;
        let breed = self.prompt_optional("Pet breed (optional): ")?;

        let age = match self.prompt_optional("Pet age in years (optional): ")? {
            Some(raw) => match parse_age(&raw) {
                Some(age) => Some(age),
                None => {
                    writeln!(self.output, "Invalid age, field left unset.")?;
                    None
                }
            },
            None => None,
        };

        let Some(owner_id) = self.prompt_id("Owner id for this pet: ")? else {
            writeln!(self.output, "Invalid owner id.")?;
            return Ok(());
        };

        match db.pets().insert(&NewPet {
            name: name.clone(),
            species,
            breed,
            age,
            owner_id: Some(owner_id),
        }) {
            Ok(id) => writeln!(self.output, "Pet '{}' added with id {}.", name, id)?,
            Err(e) => writeln!(self.output, "Error inserting pet: {}", e)?,
        }
        Ok(())
    }

    fn insert_consultation(&mut self, db: &ClinicDatabase) -> Result<()> {
        let Some(date) =
            self.prompt_optional("Consultation date (YYYY-MM-DD HH:MM:SS, e.g. 2025-06-10 15:00:00): ")?
        else {
            writeln!(self.output, "Consultation date is required.")?;
            return Ok(());
        };
        if !is_valid_date(&date) {
            writeln!(self.output, "Invalid date, expected YYYY-MM-DD HH:MM:SS.")?;
            return Ok(());
        }

        let Some(reason) = self.prompt_optional("Consultation reason: ")? else {
            writeln!(self.output, "Consultation reason is required.")?;
            return Ok(());
        };
        let diagnosis = self.prompt_optional("Consultation diagnosis (optional): ")?;

        let Some(pet_id) = self.prompt_id("Pet id for this consultation: ")? else {
            writeln!(self.output, "Invalid pet id.")?;
            return Ok(());
        };

        match db.consultations().insert(&NewConsultation {
            date,
            reason,
            diagnosis,
            pet_id: Some(pet_id),
        }) {
            Ok(id) => writeln!(
                self.output,
                "Consultation for pet {} added with id {}.",
                pet_id, id
            )?,
            Err(e) => writeln!(self.output, "Error inserting consultation: {}", e)?,
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Query actions
    // ------------------------------------------------------------------

    fn show_owners(&mut self, db: &ClinicDatabase) -> Result<()> {
        writeln!(self.output, "\n--- OWNERS ---")?;
        match db.owners().list() {
            Ok(owners) if owners.is_empty() => {
                writeln!(self.output, "No owners registered.")?;
            }
            Ok(owners) => {
                let rows: Vec<OwnerRow> = owners.iter().map(OwnerRow::from).collect();
                writeln!(self.output, "{}", Table::new(rows).with(Style::rounded()))?;
            }
            Err(e) => writeln!(self.output, "Error listing owners: {}", e)?,
        }
        Ok(())
    }

    fn show_pets(&mut self, db: &ClinicDatabase, owner_id: Option<i64>) -> Result<()> {
        writeln!(self.output, "\n--- PETS ---")?;
        let result = match owner_id {
            Some(id) => db.pets().list_by_owner(id),
            None => db.pets().list(),
        };
        match result {
            Ok(pets) if pets.is_empty() => match owner_id {
                Some(id) => writeln!(self.output, "No pets for owner id {}.", id)?,
                None => writeln!(self.output, "No pets registered.")?,
            },
            Ok(pets) => {
                let rows: Vec<PetRow> = pets.iter().map(PetRow::from).collect();
                writeln!(self.output, "{}", Table::new(rows).with(Style::rounded()))?;
            }
            Err(e) => writeln!(self.output, "Error listing pets: {}", e)?,
        }
        Ok(())
    }

    fn show_consultations(&mut self, db: &ClinicDatabase, pet_id: Option<i64>) -> Result<()> {
        writeln!(self.output, "\n--- CONSULTATIONS ---")?;
        let result = match pet_id {
            Some(id) => db.consultations().list_by_pet(id),
            None => db.consultations().list(),
        };
        match result {
            Ok(consultations) if consultations.is_empty() => match pet_id {
                Some(id) => writeln!(self.output, "No consultations for pet id {}.", id)?,
                None => writeln!(self.output, "No consultations registered.")?,
            },
            Ok(consultations) => {
                let rows: Vec<ConsultationRow> =
                    consultations.iter().map(ConsultationRow::from).collect();
                writeln!(self.output, "{}", Table::new(rows).with(Style::rounded()))?;
            }
            Err(e) => writeln!(self.output, "Error listing consultations: {}", e)?,
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Update actions
    // ------------------------------------------------------------------

    fn update_owner(&mut self, db: &ClinicDatabase) -> Result<()> {
        let Some(id) = self.prompt_id("Owner id to update: ")? else {
            writeln!(self.output, "Invalid owner id.")?;
            return Ok(());
        };

        let patch = OwnerPatch {
            name: self.prompt_optional("New name (leave blank to keep): ")?,
            phone: self.prompt_optional("New phone (leave blank to keep): ")?,
            address: self.prompt_optional("New address (leave blank to keep): ")?,
        };

        if patch.is_empty() {
            writeln!(self.output, "No fields to update.")?;
            return Ok(());
        }

        match db.owners().update(id, &patch) {
            Ok(true) => writeln!(self.output, "Owner {} updated.", id)?,
            Ok(false) => writeln!(self.output, "Owner {} not found.", id)?,
            Err(e) => writeln!(self.output, "Error updating owner: {}", e)?,
        }
        Ok(())
    }

    fn update_pet(&mut self, db: &ClinicDatabase) -> Result<()> {
        let Some(id) = self.prompt_id("Pet id to update: ")? else {
            writeln!(self.output, "Invalid pet id.")?;
            return Ok(());
        };

        let name = self.prompt_optional("New name (leave blank to keep): ")?;
        let species = self.prompt_optional("New species (leave blank to keep): ")?;
        let breed = self.prompt_optional("New breed (leave blank to keep): ")?;

        // non-numeric input means "no change"
        let age = self
            .prompt_optional("New age (leave blank to keep): ")?
            .and_then(|raw| parse_age(&raw));
        let owner_id = self
            .prompt_optional("New owner id (leave blank to keep): ")?
            .and_then(|raw| parse_digits(&raw));

        let patch = PetPatch {
            name,
            species,
            breed,
            age,
            owner_id,
        };

        if patch.is_empty() {
            writeln!(self.output, "No fields to update.")?;
            return Ok(());
        }

        match db.pets().update(id, &patch) {
            Ok(true) => writeln!(self.output, "Pet {} updated.", id)?,
            Ok(false) => writeln!(self.output, "Pet {} not found.", id)?,
            Err(e) => writeln!(self.output, "Error updating pet: {}", e)?,
        }
        Ok(())
    }

    fn update_consultation(&mut self, db: &ClinicDatabase) -> Result<()> {
        let Some(id) = self.prompt_id("Consultation id to update: ")? else {
            writeln!(self.output, "Invalid consultation id.")?;
            return Ok(());
        };

        let date = match self
            .prompt_optional("New date (YYYY-MM-DD HH:MM:SS, leave blank to keep): ")?
        {
            Some(raw) if !is_valid_date(&raw) => {
                writeln!(self.output, "Invalid date, field left unchanged.")?;
                None
            }
            other => other,
        };
        let reason = self.prompt_optional("New reason (leave blank to keep): ")?;
        let diagnosis = self.prompt_optional("New diagnosis (leave blank to keep): ")?;
        let pet_id = self
            .prompt_optional("New pet id (leave blank to keep): ")?
            .and_then(|raw| parse_digits(&raw));

        let patch = ConsultationPatch {
            date,
            reason,
            diagnosis,
            pet_id,
        };

        if patch.is_empty() {
            writeln!(self.output, "No fields to update.")?;
            return Ok(());
        }

        match db.consultations().update(id, &patch) {
            Ok(true) => writeln!(self.output, "Consultation {} updated.", id)?,
            Ok(false) => writeln!(self.output, "Consultation {} not found.", id)?,
            Err(e) => writeln!(self.output, "Error updating consultation: {}", e)?,
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete actions
    // ------------------------------------------------------------------

    fn delete_owner(&mut self, db: &ClinicDatabase) -> Result<()> {
        let Some(id) = self.prompt_id("Owner id to delete: ")? else {
            writeln!(self.output, "Invalid owner id.")?;
            return Ok(());
        };
        match db.owners().delete(id) {
            Ok(true) => writeln!(self.output, "Owner {} deleted (with their pets).", id)?,
            Ok(false) => writeln!(self.output, "Owner {} not found.", id)?,
            Err(e) => writeln!(self.output, "Error deleting owner: {}", e)?,
        }
        Ok(())
    }

    fn delete_pet(&mut self, db: &ClinicDatabase) -> Result<()> {
        let Some(id) = self.prompt_id("Pet id to delete: ")? else {
            writeln!(self.output, "Invalid pet id.")?;
            return Ok(());
        };
        match db.pets().delete(id) {
            Ok(true) => writeln!(self.output, "Pet {} deleted (with its consultations).", id)?,
            Ok(false) => writeln!(self.output, "Pet {} not found.", id)?,
            Err(e) => writeln!(self.output, "Error deleting pet: {}", e)?,
        }
        Ok(())
    }

    fn delete_consultation(&mut self, db: &ClinicDatabase) -> Result<()> {
        let Some(id) = self.prompt_id("Consultation id to delete: ")? else {
            writeln!(self.output, "Invalid consultation id.")?;
            return Ok(());
        };
        match db.consultations().delete(id) {
            Ok(true) => writeln!(self.output, "Consultation {} deleted.", id)?,
            Ok(false) => writeln!(self.output, "Consultation {} not found.", id)?,
            Err(e) => writeln!(self.output, "Error deleting consultation: {}", e)?,
        }
        Ok(())
    }
}

/// Parse an all-digit string as an id
fn parse_digits(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Parse an all-digit string as an age in years
fn parse_age(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Check a consultation timestamp against the "YYYY-MM-DD HH:MM:SS" format
fn is_valid_date(raw: &str) -> bool {
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT).is_ok()
}
