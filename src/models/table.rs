use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::table::{
    NewTable as DomainNewTable, NewTableScanLog as DomainNewTableScanLog, Table as DomainTable,
    TableScanLog as DomainTableScanLog, UpdateTable as DomainUpdateTable,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tables)]
pub struct Table {
    pub id: i32,
    pub tenant_id: i32,
    pub number: String,
    pub name: Option<String>,
    pub capacity: i32,
    pub qr_code_uuid: String,
    pub qr_enabled: bool,
    pub location: Option<String>,
    pub is_active: bool,
    pub total_scans: i32,
    pub last_scan: Option<NaiveDateTime>,
    pub total_orders: i32,
    pub assigned_waiter_id: Option<i32>,
    pub legacy_waiter_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tables)]
pub struct NewTable<'a> {
    pub tenant_id: i32,
    pub number: &'a str,
    pub name: Option<&'a str>,
    pub capacity: i32,
    pub qr_code_uuid: &'a str,
    pub qr_enabled: bool,
    pub location: Option<&'a str>,
    pub is_active: bool,
    pub assigned_waiter_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::tables)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateTable<'a> {
    pub number: &'a str,
    pub name: Option<&'a str>,
    pub capacity: i32,
    pub qr_enabled: bool,
    pub location: Option<&'a str>,
    pub is_active: bool,
    pub assigned_waiter_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::table_scan_logs)]
#[diesel(belongs_to(Table, foreign_key = table_id))]
pub struct TableScanLog {
    pub id: i32,
    pub table_id: i32,
    pub kind: String,
    pub scanned_at: NaiveDateTime,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub note: Option<String>,
    pub resulted_in_order: bool,
    pub order_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::table_scan_logs)]
pub struct NewTableScanLog<'a> {
    pub table_id: i32,
    pub kind: &'a str,
    pub scanned_at: NaiveDateTime,
    pub ip_address: Option<&'a str>,
    pub user_agent: &'a str,
    pub note: Option<&'a str>,
}

impl From<Table> for DomainTable {
    fn from(value: Table) -> Self {
        Self {
            id: value.id,
            tenant_id: value.tenant_id,
            number: value.number,
            name: value.name,
            capacity: value.capacity,
            qr_code_uuid: value.qr_code_uuid,
            qr_enabled: value.qr_enabled,
            location: value.location,
            is_active: value.is_active,
            total_scans: value.total_scans,
            last_scan: value.last_scan,
            total_orders: value.total_orders,
            assigned_waiter_id: value.assigned_waiter_id,
            legacy_waiter_id: value.legacy_waiter_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewTable> for NewTable<'a> {
    fn from(value: &'a DomainNewTable) -> Self {
        Self {
            tenant_id: value.tenant_id,
            number: value.number.as_str(),
            name: value.name.as_deref(),
            capacity: value.capacity,
            qr_code_uuid: value.qr_code_uuid.as_str(),
            qr_enabled: value.qr_enabled,
            location: value.location.as_deref(),
            is_active: value.is_active,
            assigned_waiter_id: value.assigned_waiter_id,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateTable> for UpdateTable<'a> {
    fn from(value: &'a DomainUpdateTable) -> Self {
        Self {
            number: value.number.as_str(),
            name: value.name.as_deref(),
            capacity: value.capacity,
            qr_enabled: value.qr_enabled,
            location: value.location.as_deref(),
            is_active: value.is_active,
            assigned_waiter_id: value.assigned_waiter_id,
            updated_at: value.updated_at,
        }
    }
}

impl From<TableScanLog> for DomainTableScanLog {
    fn from(value: TableScanLog) -> Self {
        Self {
            id: value.id,
            table_id: value.table_id,
            kind: value.kind.as_str().into(),
            scanned_at: value.scanned_at,
            ip_address: value.ip_address,
            user_agent: value.user_agent,
            note: value.note,
            resulted_in_order: value.resulted_in_order,
            order_id: value.order_id,
        }
    }
}

impl<'a> From<&'a DomainNewTableScanLog> for NewTableScanLog<'a> {
    fn from(value: &'a DomainNewTableScanLog) -> Self {
        Self {
            table_id: value.table_id,
            kind: value.kind.into(),
            scanned_at: value.scanned_at,
            ip_address: value.ip_address.as_deref(),
            user_agent: value.user_agent.as_str(),
            note: value.note.as_deref(),
        }
    }
}
