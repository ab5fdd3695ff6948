use chrono::Local;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::table::{NewTable, UpdateTable};
use crate::forms::{optional_inline, sanitize_inline_text};

const NUMBER_MAX_LEN: u64 = 10;
const NAME_MAX_LEN: u64 = 50;
const LOCATION_MAX_LEN: u64 = 100;

fn default_capacity() -> i32 {
    4
}

/// Result type returned by the table form helpers.
pub type TableFormResult<T> = Result<T, TableFormError>;

#[derive(Debug, Error)]
pub enum TableFormError {
    #[error("Datos inválidos: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("El número de mesa es obligatorio")]
    EmptyNumber,
    #[error("Mesero inválido: `{0}`")]
    InvalidWaiter(String),
}

fn required_number(raw: &str) -> TableFormResult<String> {
    let number = sanitize_inline_text(raw);
    if number.is_empty() {
        return Err(TableFormError::EmptyNumber);
    }
    Ok(number)
}

/// Blank selects mean "no waiter".
fn parse_waiter(raw: Option<&str>) -> TableFormResult<Option<i32>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .map(Some)
            .ok_or_else(|| TableFormError::InvalidWaiter(value.to_string())),
        None => Ok(None),
    }
}

/// Form payload emitted when creating a table.
#[derive(Debug, Deserialize, Validate)]
pub struct AddTableForm {
    #[validate(length(min = 1, max = NUMBER_MAX_LEN))]
    pub number: String,
    #[serde(default)]
    #[validate(length(max = NAME_MAX_LEN))]
    pub name: Option<String>,
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, max = 50))]
    pub capacity: i32,
    #[serde(default)]
    #[validate(length(max = LOCATION_MAX_LEN))]
    pub location: Option<String>,
    #[serde(default)]
    pub assigned_waiter_id: Option<String>,
}

impl AddTableForm {
    pub fn into_new_table(self, tenant_id: i32) -> TableFormResult<NewTable> {
        self.validate()?;

        let mut table =
            NewTable::new(tenant_id, required_number(&self.number)?).with_capacity(self.capacity);
        if let Some(name) = optional_inline(self.name.as_deref()) {
            table = table.with_name(name);
        }
        if let Some(location) = optional_inline(self.location.as_deref()) {
            table = table.with_location(location);
        }
        if let Some(waiter_id) = parse_waiter(self.assigned_waiter_id.as_deref())? {
            table = table.with_assigned_waiter(waiter_id);
        }

        Ok(table)
    }
}

/// Form payload emitted when editing a table.
#[derive(Debug, Deserialize, Validate)]
pub struct EditTableForm {
    #[validate(length(min = 1, max = NUMBER_MAX_LEN))]
    pub number: String,
    #[serde(default)]
    #[validate(length(max = NAME_MAX_LEN))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 50))]
    pub capacity: i32,
    #[serde(default)]
    #[validate(length(max = LOCATION_MAX_LEN))]
    pub location: Option<String>,
    #[serde(default)]
    pub qr_enabled: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub assigned_waiter_id: Option<String>,
}

impl EditTableForm {
    pub fn into_update_table(self) -> TableFormResult<UpdateTable> {
        self.validate()?;

        Ok(UpdateTable {
            number: required_number(&self.number)?,
            name: optional_inline(self.name.as_deref()),
            capacity: self.capacity,
            qr_enabled: self.qr_enabled,
            location: optional_inline(self.location.as_deref()),
            is_active: self.is_active,
            assigned_waiter_id: parse_waiter(self.assigned_waiter_id.as_deref())?,
            updated_at: Local::now().naive_utc(),
        })
    }
}

/// Form payload emitted by the "assign waiter" select.
#[derive(Debug, Default, Deserialize)]
pub struct AssignWaiterForm {
    #[serde(default)]
    pub staff_id: Option<String>,
}

impl AssignWaiterForm {
    pub fn staff_id(&self) -> TableFormResult<Option<i32>> {
        parse_waiter(self.staff_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_form_builds_table_with_fresh_uuid() {
        let form = AddTableForm {
            number: " 12 ".to_string(),
            name: Some("Terraza".to_string()),
            capacity: 6,
            location: Some("   ".to_string()),
            assigned_waiter_id: Some(String::new()),
        };

        let table = form.into_new_table(7).expect("valid table");
        assert_eq!(table.number, "12");
        assert_eq!(table.name.as_deref(), Some("Terraza"));
        assert_eq!(table.location, None);
        assert_eq!(table.assigned_waiter_id, None);
        assert_eq!(table.qr_code_uuid.len(), 36);
    }

    #[test]
    fn capacity_must_be_positive() {
        let form = AddTableForm {
            number: "1".to_string(),
            name: None,
            capacity: 0,
            location: None,
            assigned_waiter_id: None,
        };
        assert!(matches!(
            form.into_new_table(1),
            Err(TableFormError::Validation(_))
        ));
    }

    #[test]
    fn assign_form_parses_blank_and_ids() {
        assert_eq!(AssignWaiterForm::default().staff_id().ok(), Some(None));
        let form = AssignWaiterForm {
            staff_id: Some("5".to_string()),
        };
        assert_eq!(form.staff_id().ok(), Some(Some(5)));
        let form = AssignWaiterForm {
            staff_id: Some("x".to_string()),
        };
        assert!(form.staff_id().is_err());
    }
}
