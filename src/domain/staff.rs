use chrono::{Local, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::order_item::ResponsibleArea;
use crate::{BAR_ROLE, KITCHEN_ROLE, WAITER_ROLE};

labeled_enum! {
    /// Job performed by a staff member.
    pub enum StaffRole {
        Waiter => ("waiter", "Mesero"),
        Kitchen => ("kitchen", "Cocina"),
        Bar => ("bar", "Bar"),
    }
    fallback = Waiter;
}

impl StaffRole {
    /// Identity-service role granting access to this role's dashboards.
    pub fn access_role(self) -> &'static str {
        match self {
            StaffRole::Waiter => WAITER_ROLE,
            StaffRole::Kitchen => KITCHEN_ROLE,
            StaffRole::Bar => BAR_ROLE,
        }
    }

    /// Prefix used for generated employee identifiers.
    pub fn employee_prefix(self) -> char {
        match self {
            StaffRole::Waiter => 'W',
            StaffRole::Kitchen => 'K',
            StaffRole::Bar => 'B',
        }
    }

    /// Staff role preparing items of `area`.
    pub fn for_area(area: ResponsibleArea) -> Self {
        match area {
            ResponsibleArea::Kitchen => StaffRole::Kitchen,
            ResponsibleArea::Bar => StaffRole::Bar,
        }
    }
}

labeled_enum! {
    pub enum StaffStatus {
        Active => ("active", "Activo"),
        Inactive => ("inactive", "Inactivo"),
        OnBreak => ("on_break", "En descanso"),
    }
    fallback = Inactive;
}

/// Generates the next employee identifier, e.g. `W004`, given the identifiers
/// already in use for the role.
pub fn next_employee_id<'a>(role: StaffRole, existing: impl IntoIterator<Item = &'a str>) -> String {
    let prefix = role.employee_prefix();
    let highest = existing
        .into_iter()
        .filter_map(|value| value.strip_prefix(prefix))
        .filter_map(|digits| digits.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{:03}", highest + 1)
}

/// A person working for a tenant.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StaffMember {
    pub id: i32,
    pub tenant_id: i32,
    /// E-mail used to match the authenticated identity.
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: StaffRole,
    pub employee_id: String,
    pub status: StaffStatus,
    pub is_available: bool,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
    pub notification_email: bool,
    pub max_tables: i32,
    pub last_active_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl StaffMember {
    /// Whether `time` falls inside the configured shift. No shift means always on.
    pub fn is_on_shift(&self, time: NaiveTime) -> bool {
        match (self.shift_start, self.shift_end) {
            (Some(start), Some(end)) if start <= end => time >= start && time <= end,
            (Some(start), Some(end)) => time >= start || time <= end,
            _ => true,
        }
    }

    /// Active, flagged available and on shift.
    pub fn can_take_tables_at(&self, time: NaiveTime) -> bool {
        self.status == StaffStatus::Active && self.is_available && self.is_on_shift(time)
    }
}

/// Payload required to insert a staff member.
#[derive(Debug, Clone)]
pub struct NewStaffMember {
    pub tenant_id: i32,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: StaffRole,
    pub employee_id: String,
    pub status: StaffStatus,
    pub is_available: bool,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
    pub notification_email: bool,
    pub max_tables: i32,
    pub updated_at: NaiveDateTime,
}

impl NewStaffMember {
    pub fn new(
        tenant_id: i32,
        email: impl Into<String>,
        name: impl Into<String>,
        role: StaffRole,
        employee_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            email: email.into(),
            name: name.into(),
            phone: None,
            role,
            employee_id: employee_id.into(),
            status: StaffStatus::Active,
            is_available: true,
            shift_start: None,
            shift_end: None,
            notification_email: true,
            max_tables: 8,
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_shift(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.shift_start = Some(start);
        self.shift_end = Some(end);
        self
    }

    pub fn with_status(mut self, status: StaffStatus) -> Self {
        self.status = status;
        self
    }
}

/// Patch data applied when editing a staff member.
#[derive(Debug, Clone)]
pub struct UpdateStaffMember {
    pub name: String,
    pub phone: Option<String>,
    pub role: StaffRole,
    pub status: StaffStatus,
    pub is_available: bool,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
    pub notification_email: bool,
    pub max_tables: i32,
    pub updated_at: NaiveDateTime,
}

/// Query definition used to list staff members.
#[derive(Debug, Clone)]
pub struct StaffListQuery {
    pub tenant_id: i32,
    pub role: Option<StaffRole>,
    pub only_active: bool,
}

impl StaffListQuery {
    pub fn new(tenant_id: i32) -> Self {
        Self {
            tenant_id,
            role: None,
            only_active: false,
        }
    }

    pub fn role(mut self, role: StaffRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn only_active(mut self) -> Self {
        self.only_active = true;
        self
    }
}

/// Waiter row from the pre-unification `legacy_waiters` table.
#[derive(Debug, Clone)]
pub struct LegacyWaiter {
    pub id: i32,
    pub tenant_id: i32,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub employee_id: Option<String>,
    pub is_active: bool,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
}

/// Outcome of reconciling legacy waiters into the staff table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyMigrationReport {
    pub migrated: Vec<String>,
    pub skipped: Vec<String>,
    pub tables_repointed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
    }

    #[test]
    fn next_employee_id_increments_highest_for_role() {
        let existing = ["W001", "W007", "K010", "Wxyz"];
        assert_eq!(next_employee_id(StaffRole::Waiter, existing), "W008");
        assert_eq!(next_employee_id(StaffRole::Kitchen, existing), "K011");
        assert_eq!(next_employee_id(StaffRole::Bar, existing), "B001");
    }

    #[test]
    fn overnight_shift_covers_midnight() {
        let now = NaiveDateTime::default();
        let member = StaffMember {
            id: 1,
            tenant_id: 1,
            email: "w@example.com".to_string(),
            name: "Ana".to_string(),
            phone: None,
            role: StaffRole::Waiter,
            employee_id: "W001".to_string(),
            status: StaffStatus::Active,
            is_available: true,
            shift_start: Some(at(20, 0)),
            shift_end: Some(at(4, 0)),
            notification_email: true,
            max_tables: 8,
            last_active_at: None,
            created_at: now,
            updated_at: now,
        };

        assert!(member.can_take_tables_at(at(23, 0)));
        assert!(member.can_take_tables_at(at(3, 0)));
        assert!(!member.can_take_tables_at(at(12, 0)));

        let on_break = StaffMember {
            status: StaffStatus::OnBreak,
            ..member
        };
        assert!(!on_break.can_take_tables_at(at(23, 0)));
    }
}
