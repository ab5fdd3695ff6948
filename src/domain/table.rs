use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

labeled_enum! {
    /// Kind of event recorded against a table.
    pub enum ScanKind {
        /// A customer scanned the table QR code.
        Scan => ("scan", "Escaneo"),
        /// A waiter force-closed the table sessions.
        WaiterClosed => ("waiter_closed", "Cerrada por mesero"),
    }
    fallback = Scan;
}

/// A physical table with its own QR code.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Table {
    pub id: i32,
    pub tenant_id: i32,
    /// Table number, unique within the tenant.
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

impl Table {
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Mesa {}", self.number),
        }
    }

    /// Whether customers may open a session by scanning this table.
    pub fn accepts_scans(&self) -> bool {
        self.is_active && self.qr_enabled
    }

    /// Path encoded in the QR code, relative to the public base URL.
    pub fn qr_path(&self, tenant_slug: &str) -> String {
        format!("/{tenant_slug}/table/{}/", self.qr_code_uuid)
    }
}

/// Payload required to insert a table.
#[derive(Debug, Clone)]
pub struct NewTable {
    pub tenant_id: i32,
    pub number: String,
    pub name: Option<String>,
    pub capacity: i32,
    pub qr_code_uuid: String,
    pub qr_enabled: bool,
    pub location: Option<String>,
    pub is_active: bool,
    pub assigned_waiter_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl NewTable {
    /// Build an active QR-enabled table with a freshly generated QR identifier.
    pub fn new(tenant_id: i32, number: impl Into<String>) -> Self {
        Self {
            tenant_id,
            number: number.into(),
            name: None,
            capacity: 4,
            qr_code_uuid: uuid::Uuid::new_v4().to_string(),
            qr_enabled: true,
            location: None,
            is_active: true,
            assigned_waiter_id: None,
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_capacity(mut self, capacity: i32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_assigned_waiter(mut self, staff_id: i32) -> Self {
        self.assigned_waiter_id = Some(staff_id);
        self
    }
}

/// Patch data applied when editing a table.
#[derive(Debug, Clone)]
pub struct UpdateTable {
    pub number: String,
    pub name: Option<String>,
    pub capacity: i32,
    pub qr_enabled: bool,
    pub location: Option<String>,
    pub is_active: bool,
    pub assigned_waiter_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl UpdateTable {
    pub fn new(number: impl Into<String>, capacity: i32) -> Self {
        Self {
            number: number.into(),
            name: None,
            capacity,
            qr_enabled: true,
            location: None,
            is_active: true,
            assigned_waiter_id: None,
            updated_at: Local::now().naive_utc(),
        }
    }
}

/// Query definition used to list tables of a tenant.
#[derive(Debug, Clone)]
pub struct TableListQuery {
    pub tenant_id: i32,
    pub assigned_waiter_id: Option<i32>,
    pub include_inactive: bool,
}

impl TableListQuery {
    pub fn new(tenant_id: i32) -> Self {
        Self {
            tenant_id,
            assigned_waiter_id: None,
            include_inactive: false,
        }
    }

    pub fn assigned_to(mut self, staff_id: i32) -> Self {
        self.assigned_waiter_id = Some(staff_id);
        self
    }

    pub fn include_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }
}

/// Audit record of a scan or a staff action on a table.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TableScanLog {
    pub id: i32,
    pub table_id: i32,
    pub kind: ScanKind,
    pub scanned_at: NaiveDateTime,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub note: Option<String>,
    pub resulted_in_order: bool,
    pub order_id: Option<i32>,
}

/// Payload required to insert a scan log entry.
#[derive(Debug, Clone)]
pub struct NewTableScanLog {
    pub table_id: i32,
    pub kind: ScanKind,
    pub scanned_at: NaiveDateTime,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub note: Option<String>,
}

impl NewTableScanLog {
    pub fn scan(table_id: i32, client: &ClientInfo, scanned_at: NaiveDateTime) -> Self {
        Self {
            table_id,
            kind: ScanKind::Scan,
            scanned_at,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            note: None,
        }
    }

    pub fn waiter_closed(table_id: i32, note: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            table_id,
            kind: ScanKind::WaiterClosed,
            scanned_at: at,
            ip_address: None,
            user_agent: String::new(),
            note: Some(note.into()),
        }
    }
}

/// Request metadata captured on scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: Option<&str>) -> Table {
        let stamp = NaiveDateTime::default();
        Table {
            id: 3,
            tenant_id: 1,
            number: "7".to_string(),
            name: name.map(str::to_string),
            capacity: 4,
            qr_code_uuid: "abc".to_string(),
            qr_enabled: true,
            location: None,
            is_active: true,
            total_scans: 0,
            last_scan: None,
            total_orders: 0,
            assigned_waiter_id: None,
            legacy_waiter_id: None,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn display_name_falls_back_to_number() {
        assert_eq!(table(None).display_name(), "Mesa 7");
        assert_eq!(table(Some("")).display_name(), "Mesa 7");
        assert_eq!(table(Some("Terraza")).display_name(), "Terraza");
    }

    #[test]
    fn disabled_qr_rejects_scans() {
        let mut t = table(None);
        assert!(t.accepts_scans());
        t.qr_enabled = false;
        assert!(!t.accepts_scans());
        t.qr_enabled = true;
        t.is_active = false;
        assert!(!t.accepts_scans());
    }

    #[test]
    fn qr_path_contains_slug_and_uuid() {
        assert_eq!(table(None).qr_path("casa"), "/casa/table/abc/");
    }

    #[test]
    fn new_tables_get_unique_qr_ids() {
        let a = NewTable::new(1, "1");
        let b = NewTable::new(1, "2");
        assert_ne!(a.qr_code_uuid, b.qr_code_uuid);
        assert!(a.qr_enabled && a.is_active);
    }
}
