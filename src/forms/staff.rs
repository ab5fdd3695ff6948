use chrono::Local;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::staff::{NewStaffMember, StaffRole, StaffStatus, UpdateStaffMember};
use crate::forms::{optional_inline, parse_optional_time, sanitize_inline_text};

const NAME_MAX_LEN: u64 = 100;
const PHONE_MAX_LEN: u64 = 20;
const EMPLOYEE_ID_MAX_LEN: u64 = 20;

fn default_max_tables() -> i32 {
    8
}

/// Result type returned by the staff form helpers.
pub type StaffFormResult<T> = Result<T, StaffFormError>;

#[derive(Debug, Error)]
pub enum StaffFormError {
    #[error("Datos inválidos: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("El nombre es obligatorio")]
    EmptyName,
    #[error("Rol inválido: `{0}`")]
    InvalidRole(String),
    #[error("Estado inválido: `{0}`")]
    InvalidStatus(String),
    #[error("Hora de turno inválida: `{0}`")]
    InvalidShift(String),
}

fn parse_role(raw: &str) -> StaffFormResult<StaffRole> {
    StaffRole::parse(raw.trim()).ok_or_else(|| StaffFormError::InvalidRole(raw.to_string()))
}

fn parse_shift(
    start: Option<&str>,
    end: Option<&str>,
) -> StaffFormResult<(Option<chrono::NaiveTime>, Option<chrono::NaiveTime>)> {
    let start = parse_optional_time(start).map_err(StaffFormError::InvalidShift)?;
    let end = parse_optional_time(end).map_err(StaffFormError::InvalidShift)?;
    Ok((start, end))
}

fn required_name(raw: &str) -> StaffFormResult<String> {
    let name = sanitize_inline_text(raw);
    if name.is_empty() {
        return Err(StaffFormError::EmptyName);
    }
    Ok(name)
}

/// Form payload emitted when registering a staff member.
#[derive(Debug, Deserialize, Validate)]
pub struct AddStaffForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = PHONE_MAX_LEN))]
    pub phone: Option<String>,
    pub role: String,
    /// Left blank to generate the next `{W|K|B}NNN` identifier.
    #[serde(default)]
    #[validate(length(max = EMPLOYEE_ID_MAX_LEN))]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub shift_start: Option<String>,
    #[serde(default)]
    pub shift_end: Option<String>,
    #[serde(default = "default_max_tables")]
    #[validate(range(min = 1, max = 50))]
    pub max_tables: i32,
}

impl AddStaffForm {
    /// Builds the new member. The employee id is empty when none was given.
    pub fn into_new_staff(self, tenant_id: i32) -> StaffFormResult<NewStaffMember> {
        self.validate()?;

        let role = parse_role(&self.role)?;
        let (shift_start, shift_end) =
            parse_shift(self.shift_start.as_deref(), self.shift_end.as_deref())?;
        let employee_id = optional_inline(self.employee_id.as_deref())
            .map(|id| id.to_uppercase())
            .unwrap_or_default();

        let mut staff = NewStaffMember::new(
            tenant_id,
            self.email.trim().to_lowercase(),
            required_name(&self.name)?,
            role,
            employee_id,
        );
        if let Some(phone) = optional_inline(self.phone.as_deref()) {
            staff = staff.with_phone(phone);
        }
        staff.shift_start = shift_start;
        staff.shift_end = shift_end;
        staff.max_tables = self.max_tables;

        Ok(staff)
    }
}

/// Form payload emitted when editing a staff member.
#[derive(Debug, Deserialize, Validate)]
pub struct EditStaffForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = PHONE_MAX_LEN))]
    pub phone: Option<String>,
    pub role: String,
    pub status: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub shift_start: Option<String>,
    #[serde(default)]
    pub shift_end: Option<String>,
    #[serde(default)]
    pub notification_email: bool,
    #[validate(range(min = 1, max = 50))]
    pub max_tables: i32,
}

impl EditStaffForm {
    pub fn into_update_staff(self) -> StaffFormResult<UpdateStaffMember> {
        self.validate()?;

        let status = StaffStatus::parse(self.status.trim())
            .ok_or_else(|| StaffFormError::InvalidStatus(self.status.clone()))?;
        let (shift_start, shift_end) =
            parse_shift(self.shift_start.as_deref(), self.shift_end.as_deref())?;

        Ok(UpdateStaffMember {
            name: required_name(&self.name)?,
            phone: optional_inline(self.phone.as_deref()),
            role: parse_role(&self.role)?,
            status,
            is_available: self.is_available,
            shift_start,
            shift_end,
            notification_email: self.notification_email,
            max_tables: self.max_tables,
            updated_at: Local::now().naive_utc(),
        })
    }
}
