//! Table sessions opened by scanning a table's QR code.
//!
//! Sessions live in a process-wide cache. The browser only keeps a
//! [`BrowserTableSession`] pointer, so a restart ends every session.

use chrono::{Duration, Local, NaiveDateTime};
use dashmap::DashMap;

use crate::domain::table::{ClientInfo, NewTableScanLog, Table};
use crate::domain::table_session::{
    BrowserTableSession, SessionInfo, SessionLookup, TableInvalidation, TableSession,
};
use crate::domain::tenant::TenantContext;
use crate::repository::{TableReader, TableWriter};
use crate::services::{ServiceError, ServiceResult};

/// How long ended sessions and closure markers are kept.
const RETENTION_MINUTES: i64 = 60;

/// Browser session key of the table session pointer.
pub fn session_key(tenant_id: i32) -> String {
    format!("table_session:{tenant_id}")
}

/// Lifetimes applied to table sessions, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub duration_minutes: i64,
    pub inactivity_minutes: i64,
    pub extension_minutes: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            duration_minutes: 60,
            inactivity_minutes: 45,
            extension_minutes: 30,
        }
    }
}

impl SessionSettings {
    pub fn inactivity(&self) -> Duration {
        Duration::minutes(self.inactivity_minutes)
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    evict_at: NaiveDateTime,
}

/// Shared store of table sessions and waiter closure markers.
#[derive(Debug, Default)]
pub struct TableSessionCache {
    sessions: DashMap<String, Entry<TableSession>>,
    invalidations: DashMap<i32, Entry<TableInvalidation>>,
}

impl TableSessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: TableSession) {
        let evict_at = session.expires_at;
        self.sessions.insert(
            session.token.clone(),
            Entry {
                value: session,
                evict_at,
            },
        );
    }

    pub fn get(&self, token: &str) -> Option<TableSession> {
        self.sessions.get(token).map(|entry| entry.value.clone())
    }

    /// Records activity on a live session.
    pub fn touch(&self, token: &str, now: NaiveDateTime) -> Option<TableSession> {
        let mut entry = self.sessions.get_mut(token)?;
        if !entry.value.is_active {
            return None;
        }
        entry.value.last_activity = now;
        Some(entry.value.clone())
    }

    /// Pushes the expiry `minutes` past the later of now and the current expiry.
    pub fn extend(&self, token: &str, minutes: i64, now: NaiveDateTime) -> Option<TableSession> {
        let mut entry = self.sessions.get_mut(token)?;
        if !entry.value.is_active {
            return None;
        }
        let base = entry.value.expires_at.max(now);
        entry.value.expires_at = base + Duration::minutes(minutes);
        entry.value.last_activity = now;
        entry.evict_at = entry.value.expires_at;
        Some(entry.value.clone())
    }

    /// Marks a session ended and keeps it around for the retention window.
    pub fn end(&self, token: &str, now: NaiveDateTime) -> Option<TableSession> {
        let mut entry = self.sessions.get_mut(token)?;
        end_entry(&mut entry, now);
        Some(entry.value.clone())
    }

    /// Ends every live session of `table_id` created at or before `now`.
    pub fn end_table(&self, table_id: i32, now: NaiveDateTime) -> usize {
        let mut ended = 0;
        for mut entry in self.sessions.iter_mut() {
            let session = &entry.value;
            if session.table_id == table_id && session.is_active && session.created_at <= now {
                end_entry(&mut entry, now);
                ended += 1;
            }
        }
        ended
    }

    pub fn mark_closed(&self, invalidation: TableInvalidation) {
        let evict_at = invalidation.at + Duration::minutes(RETENTION_MINUTES);
        self.invalidations.insert(
            invalidation.table_id,
            Entry {
                value: invalidation,
                evict_at,
            },
        );
    }

    pub fn invalidation(&self, table_id: i32) -> Option<TableInvalidation> {
        self.invalidations
            .get(&table_id)
            .map(|entry| entry.value.clone())
    }

    /// Most recent live session of a table.
    pub fn active_session_for_table(
        &self,
        table_id: i32,
        now: NaiveDateTime,
        inactivity: Duration,
    ) -> Option<TableSession> {
        self.sessions
            .iter()
            .filter(|entry| {
                let session = &entry.value;
                session.table_id == table_id
                    && session.is_active
                    && !session.is_expired_at(now, inactivity)
            })
            .map(|entry| entry.value.clone())
            .max_by_key(|session| session.created_at)
    }

    /// Live sessions of a tenant.
    pub fn active_sessions(
        &self,
        tenant_id: i32,
        now: NaiveDateTime,
        inactivity: Duration,
    ) -> Vec<TableSession> {
        let mut sessions: Vec<TableSession> = self
            .sessions
            .iter()
            .filter(|entry| {
                let session = &entry.value;
                session.tenant_id == tenant_id
                    && session.is_active
                    && !session.is_expired_at(now, inactivity)
            })
            .map(|entry| entry.value.clone())
            .collect();
        sessions.sort_by_key(|session| session.created_at);
        sessions
    }

    /// Drops entries past their eviction time. Returns how many were removed.
    pub fn purge_expired(&self, now: NaiveDateTime) -> usize {
        let before = self.sessions.len() + self.invalidations.len();
        self.sessions.retain(|_, entry| entry.evict_at > now);
        self.invalidations.retain(|_, entry| entry.evict_at > now);
        before - (self.sessions.len() + self.invalidations.len())
    }
}

fn end_entry(entry: &mut Entry<TableSession>, now: NaiveDateTime) {
    if entry.value.is_active {
        entry.value.is_active = false;
        entry.value.ended_at = Some(now);
    }
    entry.evict_at = now + Duration::minutes(RETENTION_MINUTES);
}

/// Opens a table session after a customer scanned the table's QR code.
pub fn scan_table<R>(
    repo: &R,
    cache: &TableSessionCache,
    settings: SessionSettings,
    tenant: &TenantContext,
    qr_code_uuid: &str,
    client: &ClientInfo,
) -> ServiceResult<TableSession>
where
    R: TableReader + TableWriter + ?Sized,
{
    let table = repo
        .get_table_by_uuid(qr_code_uuid, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    if !table.accepts_scans() {
        return Err(ServiceError::Form(
            "Esta mesa no está disponible para pedidos en este momento.".to_string(),
        ));
    }

    let now = Local::now().naive_utc();
    let scan_log = repo
        .record_scan_log(tenant.tenant_id(), &NewTableScanLog::scan(table.id, client, now))
        .map_err(ServiceError::from)?;

    let session = open_session(&table, Some(scan_log.id), client, settings, now);
    cache.insert(session.clone());

    log::info!(
        "Table session opened for {} of tenant {}",
        table.display_name(),
        tenant.slug()
    );

    Ok(session)
}

fn open_session(
    table: &Table,
    scan_log_id: Option<i32>,
    client: &ClientInfo,
    settings: SessionSettings,
    now: NaiveDateTime,
) -> TableSession {
    TableSession {
        token: uuid::Uuid::new_v4().to_string(),
        tenant_id: table.tenant_id,
        table_id: table.id,
        table_number: table.number.clone(),
        table_name: table.display_name(),
        scan_log_id,
        created_at: now,
        last_activity: now,
        expires_at: now + Duration::minutes(settings.duration_minutes),
        ip_address: client.ip_address.clone(),
        user_agent: client.user_agent.clone(),
        is_active: true,
        ended_at: None,
    }
}

/// Validates the browser's session pointer and records activity.
///
/// Anything but [`SessionLookup::Active`] and [`SessionLookup::Missing`]
/// means the pointer should be dropped from the browser session.
pub fn lookup_session<R>(
    repo: &R,
    cache: &TableSessionCache,
    settings: SessionSettings,
    tenant: &TenantContext,
    pointer: Option<&BrowserTableSession>,
) -> ServiceResult<SessionLookup>
where
    R: TableReader + ?Sized,
{
    lookup_session_at(
        repo,
        cache,
        settings,
        tenant,
        pointer,
        Local::now().naive_utc(),
    )
}

pub(crate) fn lookup_session_at<R>(
    repo: &R,
    cache: &TableSessionCache,
    settings: SessionSettings,
    tenant: &TenantContext,
    pointer: Option<&BrowserTableSession>,
    now: NaiveDateTime,
) -> ServiceResult<SessionLookup>
where
    R: TableReader + ?Sized,
{
    let Some(pointer) = pointer else {
        return Ok(SessionLookup::Missing);
    };

    let Some(session) = cache.get(&pointer.token) else {
        return Ok(SessionLookup::Expired);
    };

    if session.tenant_id != tenant.tenant_id() || session.table_id != pointer.table_id {
        return Ok(SessionLookup::Expired);
    }

    let closure = cache
        .invalidation(session.table_id)
        .filter(|invalidation| invalidation.at >= session.created_at);
    if let Some(invalidation) = closure {
        cache.end(&session.token, now);
        return Ok(SessionLookup::ClosedByStaff(invalidation));
    }

    if !session.is_active || session.is_expired_at(now, settings.inactivity()) {
        cache.end(&session.token, now);
        return Ok(SessionLookup::Expired);
    }

    let table = repo
        .get_table_by_id(session.table_id, tenant.tenant_id())
        .map_err(ServiceError::from)?;
    if !table.is_some_and(|table| table.accepts_scans()) {
        cache.end(&session.token, now);
        return Ok(SessionLookup::Expired);
    }

    match cache.touch(&session.token, now) {
        Some(session) => Ok(SessionLookup::Active(session)),
        None => Ok(SessionLookup::Expired),
    }
}

/// Extends a live session by the configured extension.
pub fn extend_session(
    cache: &TableSessionCache,
    settings: SessionSettings,
    token: &str,
) -> ServiceResult<SessionInfo> {
    let now = Local::now().naive_utc();
    cache
        .extend(token, settings.extension_minutes, now)
        .map(|session| session.info(now))
        .ok_or(ServiceError::SessionExpired)
}

/// Ends the session at the customer's request.
pub fn end_session(cache: &TableSessionCache, token: &str) -> ServiceResult<()> {
    cache
        .end(token, Local::now().naive_utc())
        .map(|_| ())
        .ok_or(ServiceError::SessionExpired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::TableScanLog;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{TENANT_ID, fixed_datetime, sample_table, tenant_context};

    fn at(minute: i64) -> NaiveDateTime {
        fixed_datetime() + Duration::minutes(minute)
    }

    fn cached_session(cache: &TableSessionCache, token: &str, created: i64) -> TableSession {
        let session = TableSession {
            token: token.to_string(),
            tenant_id: TENANT_ID,
            table_id: 1,
            table_number: "1".to_string(),
            table_name: "Mesa 1".to_string(),
            scan_log_id: None,
            created_at: at(created),
            last_activity: at(created),
            expires_at: at(created + 60),
            ip_address: None,
            user_agent: String::new(),
            is_active: true,
            ended_at: None,
        };
        cache.insert(session.clone());
        session
    }

    fn pointer(session: &TableSession) -> BrowserTableSession {
        BrowserTableSession::from(session)
    }

    fn repo_with_table(active: bool) -> FakeRepo {
        let mut repo = FakeRepo::new();
        repo.table_reader
            .expect_get_table_by_id()
            .returning(move |id, _| {
                let mut table = sample_table(id, "1");
                table.is_active = active;
                Ok(Some(table))
            });
        repo
    }

    #[test]
    fn scan_rejects_disabled_tables() {
        let mut repo = FakeRepo::new();
        repo.table_reader
            .expect_get_table_by_uuid()
            .returning(|_, _| {
                let mut table = sample_table(1, "1");
                table.qr_enabled = false;
                Ok(Some(table))
            });
        repo.table_writer.expect_record_scan_log().never();

        let cache = TableSessionCache::new();
        let result = scan_table(
            &repo,
            &cache,
            SessionSettings::default(),
            &tenant_context(),
            "uuid",
            &ClientInfo::default(),
        );

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn scan_records_log_and_caches_session() {
        let mut repo = FakeRepo::new();
        repo.table_reader
            .expect_get_table_by_uuid()
            .returning(|_, _| Ok(Some(sample_table(4, "4"))));
        repo.table_writer
            .expect_record_scan_log()
            .times(1)
            .returning(|_, log| {
                Ok(TableScanLog {
                    id: 77,
                    table_id: log.table_id,
                    kind: log.kind,
                    scanned_at: log.scanned_at,
                    ip_address: log.ip_address.clone(),
                    user_agent: log.user_agent.clone(),
                    note: None,
                    resulted_in_order: false,
                    order_id: None,
                })
            });

        let cache = TableSessionCache::new();
        let session = scan_table(
            &repo,
            &cache,
            SessionSettings::default(),
            &tenant_context(),
            "uuid",
            &ClientInfo::default(),
        )
        .expect("session");

        assert_eq!(session.scan_log_id, Some(77));
        assert_eq!(session.table_name, "Mesa 4");
        assert_eq!(session.expires_at - session.created_at, Duration::minutes(60));
        assert!(cache.get(&session.token).is_some());
    }

    #[test]
    fn lookup_without_pointer_is_missing() {
        let cache = TableSessionCache::new();
        let result = lookup_session_at(
            &FakeRepo::new(),
            &cache,
            SessionSettings::default(),
            &tenant_context(),
            None,
            at(0),
        );
        assert!(matches!(result, Ok(SessionLookup::Missing)));
    }

    #[test]
    fn lookup_touches_active_session() {
        let cache = TableSessionCache::new();
        let session = cached_session(&cache, "a", 0);
        let repo = repo_with_table(true);

        let result = lookup_session_at(
            &repo,
            &cache,
            SessionSettings::default(),
            &tenant_context(),
            Some(&pointer(&session)),
            at(20),
        )
        .expect("lookup");

        let active = result.active().expect("active session");
        assert_eq!(active.last_activity, at(20));
    }

    #[test]
    fn lookup_expires_idle_sessions() {
        let cache = TableSessionCache::new();
        let session = cached_session(&cache, "a", 0);

        let result = lookup_session_at(
            &repo_with_table(true),
            &cache,
            SessionSettings::default(),
            &tenant_context(),
            Some(&pointer(&session)),
            at(50),
        );

        assert!(matches!(result, Ok(SessionLookup::Expired)));
        assert!(cache.get("a").is_some_and(|s| !s.is_active));
    }

    #[test]
    fn lookup_ends_sessions_of_inactive_tables() {
        let cache = TableSessionCache::new();
        let session = cached_session(&cache, "a", 0);

        let result = lookup_session_at(
            &repo_with_table(false),
            &cache,
            SessionSettings::default(),
            &tenant_context(),
            Some(&pointer(&session)),
            at(5),
        );

        assert!(matches!(result, Ok(SessionLookup::Expired)));
    }

    #[test]
    fn waiter_closure_only_affects_older_sessions() {
        let cache = TableSessionCache::new();
        let old = cached_session(&cache, "old", 0);
        cache.mark_closed(TableInvalidation {
            table_id: 1,
            table_name: "Mesa 1".to_string(),
            staff_id: 3,
            staff_name: "Juan".to_string(),
            reason: None,
            at: at(10),
            sessions_ended: 1,
        });
        let fresh = cached_session(&cache, "fresh", 11);
        let repo = repo_with_table(true);

        let closed = lookup_session_at(
            &repo,
            &cache,
            SessionSettings::default(),
            &tenant_context(),
            Some(&pointer(&old)),
            at(12),
        );
        assert!(matches!(closed, Ok(SessionLookup::ClosedByStaff(_))));

        let valid = lookup_session_at(
            &repo,
            &cache,
            SessionSettings::default(),
            &tenant_context(),
            Some(&pointer(&fresh)),
            at(12),
        );
        assert!(matches!(valid, Ok(SessionLookup::Active(_))));
    }

    #[test]
    fn extend_adds_from_later_of_now_and_expiry() {
        let cache = TableSessionCache::new();
        cached_session(&cache, "a", 0);

        let extended = cache.extend("a", 30, at(10)).expect("extended");
        assert_eq!(extended.expires_at, at(90));

        cache.end("a", at(11));
        assert!(cache.extend("a", 30, at(12)).is_none());
    }

    #[test]
    fn end_table_ends_every_live_session() {
        let cache = TableSessionCache::new();
        cached_session(&cache, "a", 0);
        cached_session(&cache, "b", 5);

        assert_eq!(cache.end_table(1, at(10)), 2);
        assert!(cache
            .active_session_for_table(1, at(10), Duration::minutes(45))
            .is_none());
    }

    #[test]
    fn purge_keeps_ended_sessions_for_an_hour() {
        let cache = TableSessionCache::new();
        cached_session(&cache, "a", 0);
        cache.end("a", at(10));

        assert_eq!(cache.purge_expired(at(30)), 0);
        assert!(cache.get("a").is_some());
        assert_eq!(cache.purge_expired(at(71)), 1);
        assert!(cache.get("a").is_none());
    }
}
