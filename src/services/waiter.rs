//! Waiter dashboard and table service.

use std::collections::HashMap;

use chrono::Local;
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Serialize;

use crate::domain::notification::{NotificationListQuery, NotificationStatus, StaffNotification};
use crate::domain::order::{ItemTicketQuery, OrderListQuery, OrderStatus};
use crate::domain::order_item::OrderItemStatus;
use crate::domain::staff::{StaffMember, StaffRole};
use crate::domain::table::{NewTableScanLog, Table, TableListQuery};
use crate::domain::table_session::{SessionInfo, TableInvalidation};
use crate::domain::tenant::TenantContext;
use crate::forms::waiter::{AvailabilityForm, CloseTableForm};
use crate::repository::{
    NotificationReader, NotificationWriter, OrderReader, OrderWriter, StaffReader, StaffWriter,
    TableReader, TableWriter,
};
use crate::services::orders::{ItemStatusOutcome, OrderView, move_item};
use crate::services::stations::TicketView;
use crate::services::table_sessions::{SessionSettings, TableSessionCache};
use crate::services::{ServiceError, ServiceResult, current_staff};

const DASHBOARD_NOTIFICATIONS: usize = 10;
const DASHBOARD_ORDERS: usize = 10;

const READY_STATUSES: &[OrderItemStatus] =
    &[OrderItemStatus::KitchenReady, OrderItemStatus::BarReady];

#[derive(Debug, Serialize)]
pub struct WaiterTable {
    pub table: Table,
    pub display_name: String,
    pub active_orders: usize,
    pub has_active_session: bool,
    pub session: Option<SessionInfo>,
}

#[derive(Debug, Serialize)]
pub struct WaiterDashboard {
    pub waiter: StaffMember,
    pub tables: Vec<WaiterTable>,
    pub notifications: Vec<StaffNotification>,
    pub pending_notifications: usize,
    pub recent_orders: Vec<OrderView>,
    pub ready_items: usize,
}

fn assigned_tables<R>(repo: &R, waiter: &StaffMember) -> ServiceResult<Vec<Table>>
where
    R: TableReader + ?Sized,
{
    repo.list_tables(TableListQuery::new(waiter.tenant_id).assigned_to(waiter.id))
        .map_err(ServiceError::from)
}

fn active_orders_of<R>(
    repo: &R,
    tenant_id: i32,
    table_ids: &[i32],
) -> ServiceResult<Vec<crate::domain::order::Order>>
where
    R: OrderReader + ?Sized,
{
    if table_ids.is_empty() {
        return Ok(Vec::new());
    }
    repo.list_orders(
        OrderListQuery::new(tenant_id)
            .statuses(OrderStatus::ACTIVE)
            .tables(table_ids.to_vec()),
    )
    .map(|(_, orders)| orders)
    .map_err(ServiceError::from)
}

pub fn waiter_dashboard<R>(
    repo: &R,
    sessions: &TableSessionCache,
    settings: SessionSettings,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
) -> ServiceResult<WaiterDashboard>
where
    R: StaffReader + TableReader + OrderReader + NotificationReader + ?Sized,
{
    let waiter = current_staff(repo, user, tenant, StaffRole::Waiter)?;
    let tenant_id = tenant.tenant_id();
    let now = Local::now().naive_utc();

    let tables = assigned_tables(repo, &waiter)?;
    let table_ids: Vec<i32> = tables.iter().map(|table| table.id).collect();
    let orders = active_orders_of(repo, tenant_id, &table_ids)?;

    let mut per_table: HashMap<i32, usize> = HashMap::new();
    for table_id in orders.iter().filter_map(|order| order.table_id) {
        *per_table.entry(table_id).or_default() += 1;
    }

    let tables = tables
        .into_iter()
        .map(|table| {
            let session = sessions
                .active_session_for_table(table.id, now, settings.inactivity())
                .map(|session| session.info(now));
            WaiterTable {
                display_name: table.display_name(),
                active_orders: per_table.get(&table.id).copied().unwrap_or(0),
                has_active_session: session.is_some(),
                session,
                table,
            }
        })
        .collect();

    let (pending_notifications, notifications) = repo
        .list_notifications(
            NotificationListQuery::new(tenant_id)
                .staff(waiter.id)
                .status(NotificationStatus::Pending)
                .paginate(1, DASHBOARD_NOTIFICATIONS),
        )
        .map_err(ServiceError::from)?;

    let ready_items = if table_ids.is_empty() {
        0
    } else {
        repo.list_item_tickets(ItemTicketQuery::new(tenant_id, READY_STATUSES).tables(table_ids))
            .map_err(ServiceError::from)?
            .len()
    };

    Ok(WaiterDashboard {
        waiter,
        tables,
        notifications,
        pending_notifications,
        recent_orders: orders
            .into_iter()
            .take(DASHBOARD_ORDERS)
            .map(OrderView::from)
            .collect(),
        ready_items,
    })
}

/// Active orders of the waiter's tables with their per-area progress.
pub fn waiter_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
) -> ServiceResult<Vec<OrderView>>
where
    R: StaffReader + TableReader + OrderReader + ?Sized,
{
    let waiter = current_staff(repo, user, tenant, StaffRole::Waiter)?;
    let table_ids: Vec<i32> = assigned_tables(repo, &waiter)?
        .iter()
        .map(|table| table.id)
        .collect();
    Ok(active_orders_of(repo, tenant.tenant_id(), &table_ids)?
        .into_iter()
        .map(OrderView::from)
        .collect())
}

pub fn waiter_order_detail<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    order_id: i32,
) -> ServiceResult<OrderView>
where
    R: StaffReader + OrderReader + ?Sized,
{
    current_staff(repo, user, tenant, StaffRole::Waiter)?;
    repo.get_order_by_id(order_id, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .map(OrderView::from)
        .ok_or(ServiceError::NotFound)
}

/// Lines ready for pickup at the waiter's tables.
pub fn ready_items<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
) -> ServiceResult<Vec<TicketView>>
where
    R: StaffReader + TableReader + OrderReader + ?Sized,
{
    let waiter = current_staff(repo, user, tenant, StaffRole::Waiter)?;
    let table_ids: Vec<i32> = assigned_tables(repo, &waiter)?
        .iter()
        .map(|table| table.id)
        .collect();
    if table_ids.is_empty() {
        return Ok(Vec::new());
    }

    let now = Local::now().naive_utc();
    Ok(repo
        .list_item_tickets(
            ItemTicketQuery::new(tenant.tenant_id(), READY_STATUSES).tables(table_ids),
        )
        .map_err(ServiceError::from)?
        .into_iter()
        .map(|ticket| TicketView::new(ticket, now))
        .collect())
}

/// Hands a ready line to the customer.
pub fn serve_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    item_id: i32,
) -> ServiceResult<ItemStatusOutcome>
where
    R: StaffReader + TableReader + OrderReader + OrderWriter + NotificationWriter + ?Sized,
{
    let waiter = current_staff(repo, user, tenant, StaffRole::Waiter)?;
    move_item(
        repo,
        tenant.tenant_id(),
        item_id,
        OrderItemStatus::Served,
        None,
        &waiter.email,
    )
}

/// Ends every session of a table. Only its assigned waiter may do it.
pub fn close_table<R>(
    repo: &R,
    sessions: &TableSessionCache,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    table_id: i32,
    form: CloseTableForm,
) -> ServiceResult<TableInvalidation>
where
    R: StaffReader + TableReader + TableWriter + ?Sized,
{
    let waiter = current_staff(repo, user, tenant, StaffRole::Waiter)?;
    let tenant_id = tenant.tenant_id();

    let table = repo
        .get_table_by_id(table_id, tenant_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;
    if table.assigned_waiter_id != Some(waiter.id) {
        return Err(ServiceError::Unauthorized);
    }

    let reason = form.reason();
    let now = Local::now().naive_utc();
    let sessions_ended = sessions.end_table(table.id, now);

    let note = match &reason {
        Some(reason) => format!("Cerrada por {} ({}): {reason}", waiter.name, waiter.employee_id),
        None => format!("Cerrada por {} ({})", waiter.name, waiter.employee_id),
    };
    repo.record_scan_log(tenant_id, &NewTableScanLog::waiter_closed(table.id, note, now))
        .map_err(ServiceError::from)?;

    let invalidation = TableInvalidation {
        table_id: table.id,
        table_name: table.display_name(),
        staff_id: waiter.id,
        staff_name: waiter.name.clone(),
        reason,
        at: now,
        sessions_ended,
    };
    sessions.mark_closed(invalidation.clone());

    log::info!(
        "Waiter {} closed {} ({} session(s) ended)",
        waiter.employee_id,
        invalidation.table_name,
        sessions_ended
    );

    Ok(invalidation)
}

pub fn set_availability<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    form: AvailabilityForm,
) -> ServiceResult<StaffMember>
where
    R: StaffReader + StaffWriter + ?Sized,
{
    let waiter = current_staff(repo, user, tenant, StaffRole::Waiter)?;
    repo.set_staff_availability(
        waiter.id,
        tenant.tenant_id(),
        form.is_available,
        Local::now().naive_utc(),
    )
    .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WAITER_ROLE;
    use crate::domain::order_item::ResponsibleArea;
    use crate::domain::table::{ScanKind, TableScanLog};
    use crate::domain::table_session::TableSession;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{
        TENANT_ID, fixed_datetime, sample_item, sample_order, sample_staff, sample_table,
        tenant_context, user_with_roles,
    };

    fn repo_with_waiter(id: i32) -> FakeRepo {
        let mut repo = FakeRepo::new();
        repo.staff_reader
            .expect_get_staff_by_email()
            .returning(move |email, _| Ok(Some(sample_staff(id, StaffRole::Waiter, email))));
        repo
    }

    fn live_session(table_id: i32) -> TableSession {
        let now = Local::now().naive_utc();
        TableSession {
            token: format!("tok-{table_id}"),
            tenant_id: TENANT_ID,
            table_id,
            table_number: table_id.to_string(),
            table_name: format!("Mesa {table_id}"),
            scan_log_id: None,
            created_at: now - chrono::Duration::minutes(1),
            last_activity: now,
            expires_at: now + chrono::Duration::minutes(30),
            ip_address: None,
            user_agent: String::new(),
            is_active: true,
            ended_at: None,
        }
    }

    #[test]
    fn kitchen_staff_have_no_waiter_dashboard() {
        let repo = FakeRepo::new();
        let result = waiter_dashboard(
            &repo,
            &TableSessionCache::new(),
            SessionSettings::default(),
            &user_with_roles(&["kitchen"]),
            &tenant_context(),
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn dashboard_flags_orders_and_sessions_per_table() {
        let mut repo = repo_with_waiter(3);
        repo.table_reader
            .expect_list_tables()
            .withf(|query| query.assigned_waiter_id == Some(3))
            .returning(|_| Ok(vec![sample_table(1, "1"), sample_table(2, "2")]));
        repo.order_reader.expect_list_orders().returning(|_| {
            Ok((
                1,
                vec![sample_order(
                    8,
                    OrderStatus::Preparing,
                    vec![sample_item(1, 8, ResponsibleArea::Kitchen, OrderItemStatus::Cooking)],
                )],
            ))
        });
        repo.notification_reader
            .expect_list_notifications()
            .returning(|_| Ok((4, Vec::new())));
        repo.order_reader
            .expect_list_item_tickets()
            .returning(|_| Ok(Vec::new()));

        let cache = TableSessionCache::new();
        cache.insert(live_session(2));

        let dashboard = waiter_dashboard(
            &repo,
            &cache,
            SessionSettings::default(),
            &user_with_roles(&[WAITER_ROLE]),
            &tenant_context(),
        )
        .expect("dashboard");

        assert_eq!(dashboard.tables[0].active_orders, 1);
        assert!(!dashboard.tables[0].has_active_session);
        assert_eq!(dashboard.tables[1].active_orders, 0);
        assert!(dashboard.tables[1].has_active_session);
        assert_eq!(dashboard.pending_notifications, 4);
        assert_eq!(dashboard.recent_orders.len(), 1);
    }

    #[test]
    fn only_assigned_waiter_closes_table() {
        let mut repo = repo_with_waiter(3);
        repo.table_reader.expect_get_table_by_id().returning(|id, _| {
            let mut table = sample_table(id, "1");
            table.assigned_waiter_id = Some(4);
            Ok(Some(table))
        });
        repo.table_writer.expect_record_scan_log().never();

        let cache = TableSessionCache::new();
        cache.insert(live_session(1));
        let result = close_table(
            &repo,
            &cache,
            &user_with_roles(&[WAITER_ROLE]),
            &tenant_context(),
            1,
            CloseTableForm::default(),
        );

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
        assert!(cache.get("tok-1").is_some_and(|session| session.is_active));
    }

    #[test]
    fn closing_table_ends_sessions_and_logs() {
        let mut repo = repo_with_waiter(3);
        repo.table_reader.expect_get_table_by_id().returning(|id, _| {
            let mut table = sample_table(id, "1");
            table.assigned_waiter_id = Some(3);
            Ok(Some(table))
        });
        repo.table_writer
            .expect_record_scan_log()
            .times(1)
            .withf(|_, log| {
                log.kind == ScanKind::WaiterClosed
                    && log.note.as_deref().is_some_and(|note| note.contains("Cuenta pagada"))
            })
            .returning(|_, log| {
                Ok(TableScanLog {
                    id: 1,
                    table_id: log.table_id,
                    kind: log.kind,
                    scanned_at: log.scanned_at,
                    ip_address: None,
                    user_agent: String::new(),
                    note: log.note.clone(),
                    resulted_in_order: false,
                    order_id: None,
                })
            });

        let cache = TableSessionCache::new();
        cache.insert(live_session(1));
        let invalidation = close_table(
            &repo,
            &cache,
            &user_with_roles(&[WAITER_ROLE]),
            &tenant_context(),
            1,
            CloseTableForm {
                reason: Some("Cuenta pagada".to_string()),
            },
        )
        .expect("closed");

        assert_eq!(invalidation.sessions_ended, 1);
        assert!(cache.invalidation(1).is_some());
        assert!(cache.get("tok-1").is_some_and(|session| !session.is_active));
    }

    #[test]
    fn serving_requires_a_ready_item() {
        let mut repo = repo_with_waiter(3);
        repo.order_reader.expect_get_order_by_item_id().returning(|item_id, _| {
            Ok(Some(sample_order(
                1,
                OrderStatus::Preparing,
                vec![sample_item(item_id, 1, ResponsibleArea::Bar, OrderItemStatus::Mixing)],
            )))
        });
        repo.order_writer.expect_apply_order_changes().never();

        let result = serve_item(&repo, &user_with_roles(&[WAITER_ROLE]), &tenant_context(), 2);
        assert!(matches!(result, Err(ServiceError::InvalidTransition { .. })));
    }

    #[test]
    fn availability_toggle_updates_current_waiter() {
        let mut repo = repo_with_waiter(6);
        repo.staff_writer
            .expect_set_staff_availability()
            .times(1)
            .withf(|id, tenant_id, available, _| *id == 6 && *tenant_id == TENANT_ID && !available)
            .returning(|id, _, available, _| {
                let mut waiter = sample_staff(id, StaffRole::Waiter, "w@example.com");
                waiter.is_available = available;
                waiter.updated_at = fixed_datetime();
                Ok(waiter)
            });

        let waiter = set_availability(
            &repo,
            &user_with_roles(&[WAITER_ROLE]),
            &tenant_context(),
            AvailabilityForm {
                is_available: false,
            },
        )
        .expect("updated");
        assert!(!waiter.is_available);
    }
}
