use chrono::{NaiveDateTime, NaiveTime};
use diesel::prelude::*;

use crate::domain::staff::{
    LegacyWaiter as DomainLegacyWaiter, NewStaffMember as DomainNewStaffMember,
    StaffMember as DomainStaffMember, UpdateStaffMember as DomainUpdateStaffMember,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::staff_members)]
pub struct StaffMember {
    pub id: i32,
    pub tenant_id: i32,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub employee_id: String,
    pub status: String,
    pub is_available: bool,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
    pub notification_email: bool,
    pub max_tables: i32,
    pub last_active_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::staff_members)]
pub struct NewStaffMember<'a> {
    pub tenant_id: i32,
    pub email: &'a str,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub role: &'a str,
    pub employee_id: &'a str,
    pub status: &'a str,
    pub is_available: bool,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
    pub notification_email: bool,
    pub max_tables: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::staff_members)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateStaffMember<'a> {
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub role: &'a str,
    pub status: &'a str,
    pub is_available: bool,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
    pub notification_email: bool,
    pub max_tables: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::legacy_waiters)]
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
    pub created_at: NaiveDateTime,
}

impl From<StaffMember> for DomainStaffMember {
    fn from(value: StaffMember) -> Self {
        Self {
            id: value.id,
            tenant_id: value.tenant_id,
            email: value.email,
            name: value.name,
            phone: value.phone,
            role: value.role.as_str().into(),
            employee_id: value.employee_id,
            status: value.status.as_str().into(),
            is_available: value.is_available,
            shift_start: value.shift_start,
            shift_end: value.shift_end,
            notification_email: value.notification_email,
            max_tables: value.max_tables,
            last_active_at: value.last_active_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewStaffMember> for NewStaffMember<'a> {
    fn from(value: &'a DomainNewStaffMember) -> Self {
        Self {
            tenant_id: value.tenant_id,
            email: value.email.as_str(),
            name: value.name.as_str(),
            phone: value.phone.as_deref(),
            role: value.role.into(),
            employee_id: value.employee_id.as_str(),
            status: value.status.into(),
            is_available: value.is_available,
            shift_start: value.shift_start,
            shift_end: value.shift_end,
            notification_email: value.notification_email,
            max_tables: value.max_tables,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateStaffMember> for UpdateStaffMember<'a> {
    fn from(value: &'a DomainUpdateStaffMember) -> Self {
        Self {
            name: value.name.as_str(),
            phone: value.phone.as_deref(),
            role: value.role.into(),
            status: value.status.into(),
            is_available: value.is_available,
            shift_start: value.shift_start,
            shift_end: value.shift_end,
            notification_email: value.notification_email,
            max_tables: value.max_tables,
            updated_at: value.updated_at,
        }
    }
}

impl From<LegacyWaiter> for DomainLegacyWaiter {
    fn from(value: LegacyWaiter) -> Self {
        Self {
            id: value.id,
            tenant_id: value.tenant_id,
            email: value.email,
            name: value.name,
            phone: value.phone,
            employee_id: value.employee_id,
            is_active: value.is_active,
            shift_start: value.shift_start,
            shift_end: value.shift_end,
        }
    }
}
