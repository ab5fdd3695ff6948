use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::notification::{
    NewStaffNotification as DomainNewStaffNotification,
    StaffNotification as DomainStaffNotification,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::staff_notifications)]
pub struct StaffNotification {
    pub id: i32,
    pub tenant_id: i32,
    pub staff_id: Option<i32>,
    pub table_id: Option<i32>,
    pub order_id: Option<i32>,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub priority: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub read_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::staff_notifications)]
pub struct NewStaffNotification<'a> {
    pub tenant_id: i32,
    pub staff_id: Option<i32>,
    pub table_id: Option<i32>,
    pub order_id: Option<i32>,
    pub notification_type: &'a str,
    pub title: &'a str,
    pub message: &'a str,
    pub priority: &'a str,
    pub created_at: NaiveDateTime,
}

impl From<StaffNotification> for DomainStaffNotification {
    fn from(value: StaffNotification) -> Self {
        Self {
            id: value.id,
            tenant_id: value.tenant_id,
            staff_id: value.staff_id,
            table_id: value.table_id,
            order_id: value.order_id,
            notification_type: value.notification_type.as_str().into(),
            title: value.title,
            message: value.message,
            priority: value.priority.as_str().into(),
            status: value.status.as_str().into(),
            created_at: value.created_at,
            read_at: value.read_at,
        }
    }
}

impl<'a> From<&'a DomainNewStaffNotification> for NewStaffNotification<'a> {
    fn from(value: &'a DomainNewStaffNotification) -> Self {
        Self {
            tenant_id: value.tenant_id,
            staff_id: value.staff_id,
            table_id: value.table_id,
            order_id: value.order_id,
            notification_type: value.notification_type.into(),
            title: value.title.as_str(),
            message: value.message.as_str(),
            priority: value.priority.into(),
            created_at: value.created_at,
        }
    }
}
