use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Ephemeral link between a browser and a scanned table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSession {
    pub token: String,
    pub tenant_id: i32,
    pub table_id: i32,
    pub table_number: String,
    pub table_name: String,
    pub scan_log_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub last_activity: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub is_active: bool,
    pub ended_at: Option<NaiveDateTime>,
}

impl TableSession {
    /// Past the absolute expiry or idle longer than `inactivity`.
    pub fn is_expired_at(&self, now: NaiveDateTime, inactivity: Duration) -> bool {
        now >= self.expires_at || now - self.last_activity > inactivity
    }

    pub fn info(&self, now: NaiveDateTime) -> SessionInfo {
        let remaining = (self.expires_at - now).max(Duration::zero());
        SessionInfo {
            token: self.token.clone(),
            table_id: self.table_id,
            table_number: self.table_number.clone(),
            table_name: self.table_name.clone(),
            created_at: self.created_at,
            last_activity: self.last_activity,
            expires_at: self.expires_at,
            time_remaining_minutes: remaining.num_minutes(),
            is_expiring_soon: remaining < Duration::minutes(5),
        }
    }
}

/// Pointer kept in the browser session to the cached table session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserTableSession {
    pub token: String,
    pub table_id: i32,
    pub created_at: NaiveDateTime,
}

impl From<&TableSession> for BrowserTableSession {
    fn from(session: &TableSession) -> Self {
        Self {
            token: session.token.clone(),
            table_id: session.table_id,
            created_at: session.created_at,
        }
    }
}

/// Status returned to the customer's browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub token: String,
    pub table_id: i32,
    pub table_number: String,
    pub table_name: String,
    pub created_at: NaiveDateTime,
    pub last_activity: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub time_remaining_minutes: i64,
    pub is_expiring_soon: bool,
}

/// Marker left when a waiter closes every session of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInvalidation {
    pub table_id: i32,
    pub table_name: String,
    pub staff_id: i32,
    pub staff_name: String,
    pub reason: Option<String>,
    pub at: NaiveDateTime,
    pub sessions_ended: usize,
}

/// Result of validating the browser's table session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    Active(TableSession),
    /// A waiter closed the table after this session started.
    ClosedByStaff(TableInvalidation),
    /// The session existed but is no longer usable.
    Expired,
    /// This browser holds no session.
    Missing,
}

impl SessionLookup {
    pub fn active(&self) -> Option<&TableSession> {
        match self {
            SessionLookup::Active(session) => Some(session),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap_or_default()
            + Duration::minutes(minute)
    }

    fn session() -> TableSession {
        TableSession {
            token: "t".to_string(),
            tenant_id: 1,
            table_id: 2,
            table_number: "2".to_string(),
            table_name: "Mesa 2".to_string(),
            scan_log_id: None,
            created_at: at(0),
            last_activity: at(0),
            expires_at: at(60),
            ip_address: None,
            user_agent: String::new(),
            is_active: true,
            ended_at: None,
        }
    }

    #[test]
    fn expiry_covers_absolute_and_idle_limits() {
        let s = session();
        let idle = Duration::minutes(45);
        assert!(!s.is_expired_at(at(30), idle));
        assert!(s.is_expired_at(at(46), idle));

        let mut busy = s.clone();
        busy.last_activity = at(50);
        assert!(!busy.is_expired_at(at(59), idle));
        assert!(busy.is_expired_at(at(60), idle));
    }

    #[test]
    fn info_flags_expiring_soon() {
        let s = session();
        let info = s.info(at(56));
        assert_eq!(info.time_remaining_minutes, 4);
        assert!(info.is_expiring_soon);
        assert!(!s.info(at(10)).is_expiring_soon);
        assert_eq!(s.info(at(90)).time_remaining_minutes, 0);
    }
}
