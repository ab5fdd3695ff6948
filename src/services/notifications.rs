//! Staff alerts. Sending is best effort: a failed insert is logged and the
//! triggering operation carries on.

use std::collections::{BTreeSet, HashMap};

use chrono::{Local, NaiveDateTime, NaiveTime};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use serde::Serialize;
use validator::Validate;

use crate::domain::notification::{
    NewStaffNotification, NotificationListQuery, NotificationPriority, NotificationStatus,
    NotificationType, StaffNotification,
};
use crate::domain::order::Order;
use crate::domain::order_item::{OrderItem, ResponsibleArea};
use crate::domain::staff::{StaffListQuery, StaffMember, StaffRole};
use crate::domain::table::{Table, TableListQuery};
use crate::domain::table_session::TableSession;
use crate::domain::tenant::TenantContext;
use crate::forms::waiter::{CallWaiterForm, NotificationFilter};
use crate::repository::{NotificationReader, NotificationWriter, StaffReader, TableReader};
use crate::services::{ServiceError, ServiceResult, current_staff, wall_clock};

fn send<R>(repo: &R, notifications: Vec<NewStaffNotification>)
where
    R: NotificationWriter + ?Sized,
{
    if notifications.is_empty() {
        return;
    }
    match repo.create_notifications(&notifications) {
        Ok(count) => log::info!(
            "Sent {count} {} notification(s)",
            notifications[0].notification_type
        ),
        Err(err) => log::error!("Failed to store notifications: {err}"),
    }
}

fn active_staff<R>(repo: &R, tenant_id: i32, role: Option<StaffRole>) -> Vec<StaffMember>
where
    R: StaffReader + ?Sized,
{
    let mut query = StaffListQuery::new(tenant_id).only_active();
    if let Some(role) = role {
        query = query.role(role);
    }
    match repo.list_staff(query) {
        Ok(staff) => staff,
        Err(err) => {
            log::error!("Failed to list staff of tenant {tenant_id}: {err}");
            Vec::new()
        }
    }
}

/// Available on-shift waiter with the fewest assigned tables.
///
/// `local_time` is the restaurant's wall-clock time, the one shifts are entered in.
fn least_busy_waiter<R>(repo: &R, tenant_id: i32, local_time: NaiveTime) -> Option<StaffMember>
where
    R: StaffReader + TableReader + ?Sized,
{
    let candidates: Vec<StaffMember> = active_staff(repo, tenant_id, Some(StaffRole::Waiter))
        .into_iter()
        .filter(|waiter| waiter.can_take_tables_at(local_time))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let tables = repo
        .list_tables(TableListQuery::new(tenant_id))
        .unwrap_or_else(|err| {
            log::error!("Failed to list tables of tenant {tenant_id}: {err}");
            Vec::new()
        });
    let mut load: HashMap<i32, usize> = HashMap::new();
    for waiter_id in tables.iter().filter_map(|table| table.assigned_waiter_id) {
        *load.entry(waiter_id).or_default() += 1;
    }

    candidates
        .into_iter()
        .min_by_key(|waiter| (load.get(&waiter.id).copied().unwrap_or(0), waiter.id))
}

/// Waiter responsible for `table_id`, falling back to the least busy one.
pub(crate) fn responsible_waiter<R>(
    repo: &R,
    tenant_id: i32,
    table_id: Option<i32>,
    local_time: NaiveTime,
) -> Option<StaffMember>
where
    R: StaffReader + TableReader + ?Sized,
{
    let assigned = table_id
        .and_then(|table_id| repo.get_table_by_id(table_id, tenant_id).ok().flatten())
        .and_then(|table: Table| table.assigned_waiter_id)
        .and_then(|staff_id| repo.get_staff_by_id(staff_id, tenant_id).ok().flatten())
        .filter(|waiter| waiter.role == StaffRole::Waiter);

    assigned.or_else(|| least_busy_waiter(repo, tenant_id, local_time))
}

fn table_label(order: &Order) -> String {
    match order.table_number.as_deref() {
        Some(number) => format!("Mesa {number}"),
        None => order.order_type.label().to_string(),
    }
}

/// Tells the table's waiter about a new order and every station about the
/// items it has to prepare.
pub fn notify_new_order<R>(repo: &R, order: &Order, now: NaiveDateTime)
where
    R: StaffReader + TableReader + NotificationWriter + ?Sized,
{
    let mut notifications = Vec::new();
    let label = table_label(order);

    let local_time = wall_clock(now);
    if let Some(waiter) = responsible_waiter(repo, order.tenant_id, order.table_id, local_time) {
        notifications.push(
            NewStaffNotification::new(
                order.tenant_id,
                NotificationType::NewOrder,
                format!("Nuevo pedido {}", order.order_number),
                format!(
                    "{label}: {} con {} producto(s).",
                    order.customer_name,
                    order.total_items()
                ),
                now,
            )
            .for_staff(waiter.id)
            .with_table(order.table_id)
            .with_order(order.id)
            .with_priority(NotificationPriority::High),
        );
    } else {
        log::warn!(
            "No waiter available for order {} of tenant {}",
            order.order_number,
            order.tenant_id
        );
    }
    send(repo, notifications);

    let areas: BTreeSet<ResponsibleArea> = order
        .items
        .iter()
        .filter(|item| item.is_live())
        .map(|item| item.responsible_area)
        .collect();
    for area in areas {
        notify_new_items(repo, order, area, now);
    }
}

/// Alerts every active member of the station preparing `area`.
pub fn notify_new_items<R>(repo: &R, order: &Order, area: ResponsibleArea, now: NaiveDateTime)
where
    R: StaffReader + NotificationWriter + ?Sized,
{
    let items: Vec<&OrderItem> = order
        .items
        .iter()
        .filter(|item| item.is_live() && item.responsible_area == area)
        .collect();
    if items.is_empty() {
        return;
    }
    let summary = items
        .iter()
        .map(|item| format!("{}x {}", item.quantity, item.name))
        .collect::<Vec<_>>()
        .join(", ");

    let notifications = active_staff(repo, order.tenant_id, Some(StaffRole::for_area(area)))
        .into_iter()
        .map(|member| {
            NewStaffNotification::new(
                order.tenant_id,
                NotificationType::NewItem,
                format!("{}: pedido {}", area.label(), order.order_number),
                format!("{}: {summary}", table_label(order)),
                now,
            )
            .for_staff(member.id)
            .with_table(order.table_id)
            .with_order(order.id)
            .with_priority(NotificationPriority::High)
        })
        .collect();
    send(repo, notifications);
}

/// Alerts every active waiter that a line is ready to be picked up.
pub fn notify_item_ready<R>(repo: &R, order: &Order, item: &OrderItem, now: NaiveDateTime)
where
    R: StaffReader + NotificationWriter + ?Sized,
{
    let notifications = active_staff(repo, order.tenant_id, Some(StaffRole::Waiter))
        .into_iter()
        .map(|waiter| {
            NewStaffNotification::new(
                order.tenant_id,
                NotificationType::ItemReady,
                format!("{} listo", item.name),
                format!(
                    "{}x {} del pedido {} ({}) listo en {}.",
                    item.quantity,
                    item.name,
                    order.order_number,
                    table_label(order),
                    item.responsible_area.label().to_lowercase()
                ),
                now,
            )
            .for_staff(waiter.id)
            .with_table(order.table_id)
            .with_order(order.id)
            .with_priority(NotificationPriority::High)
        })
        .collect();
    send(repo, notifications);
}

/// Alerts the table's waiter that the whole order is ready.
pub fn notify_order_ready<R>(repo: &R, order: &Order, now: NaiveDateTime)
where
    R: StaffReader + TableReader + NotificationWriter + ?Sized,
{
    let local_time = wall_clock(now);
    let Some(waiter) = responsible_waiter(repo, order.tenant_id, order.table_id, local_time) else {
        log::warn!("Order {} is ready but no waiter is available", order.order_number);
        return;
    };
    let notification = NewStaffNotification::new(
        order.tenant_id,
        NotificationType::OrderReady,
        format!("Pedido {} listo", order.order_number),
        format!("{} ya puede servirse.", table_label(order)),
        now,
    )
    .for_staff(waiter.id)
    .with_table(order.table_id)
    .with_order(order.id)
    .with_priority(NotificationPriority::Urgent);
    send(repo, vec![notification]);
}

/// Lets every active staff member know the order was delivered.
pub fn notify_order_served<R>(repo: &R, order: &Order, now: NaiveDateTime)
where
    R: StaffReader + NotificationWriter + ?Sized,
{
    let notifications = active_staff(repo, order.tenant_id, None)
        .into_iter()
        .map(|member| {
            NewStaffNotification::new(
                order.tenant_id,
                NotificationType::OrderServed,
                format!("Pedido {} servido", order.order_number),
                format!("{} completó su pedido.", table_label(order)),
                now,
            )
            .for_staff(member.id)
            .with_table(order.table_id)
            .with_order(order.id)
            .with_priority(NotificationPriority::Low)
        })
        .collect();
    send(repo, notifications);
}

/// Forwards a customer request ("call the waiter") to the table's waiter.
///
/// Returns `false` when nobody could be notified.
pub fn notify_customer_request<R>(
    repo: &R,
    tenant_id: i32,
    table_id: i32,
    table_name: &str,
    message: Option<String>,
    now: NaiveDateTime,
) -> bool
where
    R: StaffReader + TableReader + NotificationWriter + ?Sized,
{
    let Some(waiter) = responsible_waiter(repo, tenant_id, Some(table_id), wall_clock(now)) else {
        return false;
    };
    let notification = NewStaffNotification::new(
        tenant_id,
        NotificationType::CustomerRequest,
        format!("{table_name} solicita atención"),
        message.unwrap_or_else(|| "El cliente solicita al mesero.".to_string()),
        now,
    )
    .for_staff(waiter.id)
    .with_table(Some(table_id))
    .with_priority(NotificationPriority::High);

    match repo.create_notifications(&[notification]) {
        Ok(_) => true,
        Err(err) => {
            log::error!("Failed to store customer request for table {table_id}: {err}");
            false
        }
    }
}

/// Customer "call the waiter" button. `Ok(false)` means no waiter could be reached.
pub fn call_waiter<R>(repo: &R, session: &TableSession, form: CallWaiterForm) -> ServiceResult<bool>
where
    R: StaffReader + TableReader + NotificationWriter + ?Sized,
{
    form.validate()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    Ok(notify_customer_request(
        repo,
        session.tenant_id,
        session.table_id,
        &session.table_name,
        form.message(),
        Local::now().naive_utc(),
    ))
}

/// Notification list shown to a waiter.
#[derive(Debug, Serialize)]
pub struct NotificationsPage {
    pub notifications: Paginated<StaffNotification>,
    pub pending: usize,
    pub statuses: &'static [NotificationStatus],
    pub types: &'static [NotificationType],
    pub status_filter: Option<NotificationStatus>,
    pub type_filter: Option<NotificationType>,
}

pub fn list_notifications<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    filter: NotificationFilter,
) -> ServiceResult<NotificationsPage>
where
    R: StaffReader + NotificationReader + ?Sized,
{
    let waiter = current_staff(repo, user, tenant, StaffRole::Waiter)?;
    let tenant_id = tenant.tenant_id();

    let status_filter = filter
        .status
        .as_deref()
        .and_then(NotificationStatus::parse);
    let type_filter = filter
        .notification_type
        .as_deref()
        .and_then(NotificationType::parse);
    let page = filter.page.unwrap_or(1).max(1);

    let mut query = NotificationListQuery::new(tenant_id)
        .staff(waiter.id)
        .paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(status) = status_filter {
        query = query.status(status);
    }
    if let Some(notification_type) = type_filter {
        query = query.notification_type(notification_type);
    }

    let (total, notifications) = repo.list_notifications(query).map_err(ServiceError::from)?;
    let (pending, _) = repo
        .list_notifications(
            NotificationListQuery::new(tenant_id)
                .staff(waiter.id)
                .status(NotificationStatus::Pending)
                .paginate(1, 1),
        )
        .map_err(ServiceError::from)?;

    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

    Ok(NotificationsPage {
        notifications: Paginated::new(notifications, page, total_pages),
        pending,
        statuses: NotificationStatus::ALL,
        types: NotificationType::ALL,
        status_filter,
        type_filter,
    })
}

pub fn mark_notification_read<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    notification_id: i32,
) -> ServiceResult<()>
where
    R: StaffReader + NotificationWriter + ?Sized,
{
    let waiter = current_staff(repo, user, tenant, StaffRole::Waiter)?;
    repo.mark_notification_read(
        notification_id,
        tenant.tenant_id(),
        waiter.id,
        Local::now().naive_utc(),
    )
    .map_err(ServiceError::from)
}

/// Returns how many notifications changed.
pub fn mark_all_notifications_read<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
) -> ServiceResult<usize>
where
    R: StaffReader + NotificationWriter + ?Sized,
{
    let waiter = current_staff(repo, user, tenant, StaffRole::Waiter)?;
    repo.mark_all_notifications_read(tenant.tenant_id(), waiter.id, Local::now().naive_utc())
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WAITER_ROLE;
    use crate::domain::order::OrderStatus;
    use crate::domain::order_item::OrderItemStatus;
    use crate::domain::staff::StaffStatus;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{
        TENANT_ID, fixed_datetime, sample_item, sample_order, sample_staff, sample_table,
        tenant_context, user_with_roles,
    };
    use pushkind_common::repository::errors::RepositoryError;

    fn order_with_items() -> Order {
        sample_order(
            5,
            OrderStatus::Pending,
            vec![
                sample_item(1, 5, ResponsibleArea::Kitchen, OrderItemStatus::Pending),
                sample_item(2, 5, ResponsibleArea::Bar, OrderItemStatus::Pending),
            ],
        )
    }

    #[test]
    fn new_order_goes_to_assigned_waiter_and_stations() {
        let mut repo = FakeRepo::new();
        repo.table_reader.expect_get_table_by_id().returning(|id, _| {
            let mut table = sample_table(id, "1");
            table.assigned_waiter_id = Some(3);
            Ok(Some(table))
        });
        repo.staff_reader
            .expect_get_staff_by_id()
            .returning(|id, _| Ok(Some(sample_staff(id, StaffRole::Waiter, "w@example.com"))));
        repo.staff_reader.expect_list_staff().returning(|query| {
            let role = query.role.unwrap_or_default();
            Ok(vec![sample_staff(10, role, "s@example.com")])
        });
        repo.notification_writer
            .expect_create_notifications()
            .times(3)
            .returning(|batch| Ok(batch.len()));

        notify_new_order(&repo, &order_with_items(), fixed_datetime());
    }

    #[test]
    fn fallback_picks_least_loaded_waiter() {
        let mut repo = FakeRepo::new();
        repo.staff_reader.expect_list_staff().returning(|_| {
            let mut busy = sample_staff(1, StaffRole::Waiter, "a@example.com");
            busy.is_available = true;
            let idle = sample_staff(2, StaffRole::Waiter, "b@example.com");
            let mut away = sample_staff(3, StaffRole::Waiter, "c@example.com");
            away.status = StaffStatus::OnBreak;
            Ok(vec![busy, idle, away])
        });
        repo.table_reader.expect_list_tables().returning(|_| {
            let mut first = sample_table(1, "1");
            first.assigned_waiter_id = Some(1);
            let mut second = sample_table(2, "2");
            second.assigned_waiter_id = Some(3);
            Ok(vec![first, second])
        });

        let waiter = responsible_waiter(&repo, TENANT_ID, None, fixed_datetime().time());
        assert_eq!(waiter.map(|waiter| waiter.id), Some(2));
    }

    #[test]
    fn fallback_respects_local_shift_hours() {
        let mut repo = FakeRepo::new();
        repo.staff_reader.expect_list_staff().returning(|_| {
            let mut evening = sample_staff(7, StaffRole::Waiter, "noche@example.com");
            evening.shift_start = NaiveTime::from_hms_opt(18, 0, 0);
            evening.shift_end = NaiveTime::from_hms_opt(23, 0, 0);
            Ok(vec![evening])
        });
        repo.table_reader.expect_list_tables().returning(|_| Ok(Vec::new()));

        let inside = NaiveTime::from_hms_opt(21, 30, 0).unwrap();
        let outside = NaiveTime::from_hms_opt(23, 30, 0).unwrap();
        assert_eq!(
            responsible_waiter(&repo, TENANT_ID, None, inside).map(|waiter| waiter.id),
            Some(7)
        );
        assert!(responsible_waiter(&repo, TENANT_ID, None, outside).is_none());
    }

    #[test]
    fn failed_inserts_are_swallowed() {
        let mut repo = FakeRepo::new();
        repo.staff_reader
            .expect_list_staff()
            .returning(|_| Ok(vec![sample_staff(1, StaffRole::Waiter, "a@example.com")]));
        repo.notification_writer
            .expect_create_notifications()
            .times(1)
            .returning(|_| Err(RepositoryError::NotFound));

        let order = order_with_items();
        notify_item_ready(&repo, &order, &order.items[0], fixed_datetime());
    }

    #[test]
    fn customer_request_without_waiter_reports_failure() {
        let mut repo = FakeRepo::new();
        repo.table_reader
            .expect_get_table_by_id()
            .returning(|id, _| Ok(Some(sample_table(id, "1"))));
        repo.staff_reader.expect_list_staff().returning(|_| Ok(Vec::new()));
        repo.notification_writer.expect_create_notifications().never();

        assert!(!notify_customer_request(
            &repo,
            TENANT_ID,
            1,
            "Mesa 1",
            None,
            fixed_datetime()
        ));
    }

    #[test]
    fn list_requires_waiter_row() {
        let mut repo = FakeRepo::new();
        repo.staff_reader
            .expect_get_staff_by_email()
            .returning(|_, _| Ok(None));

        let result = list_notifications(
            &repo,
            &user_with_roles(&[WAITER_ROLE]),
            &tenant_context(),
            NotificationFilter::default(),
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn list_filters_by_status_for_current_waiter() {
        let mut repo = FakeRepo::new();
        repo.staff_reader
            .expect_get_staff_by_email()
            .returning(|email, _| Ok(Some(sample_staff(4, StaffRole::Waiter, email))));
        repo.notification_reader
            .expect_list_notifications()
            .withf(|query| query.staff_id == Some(4))
            .returning(|query| {
                if query.status == Some(NotificationStatus::Read) {
                    Ok((12, Vec::new()))
                } else {
                    Ok((3, Vec::new()))
                }
            });

        let page = list_notifications(
            &repo,
            &user_with_roles(&[WAITER_ROLE]),
            &tenant_context(),
            NotificationFilter {
                status: Some("read".to_string()),
                notification_type: None,
                page: Some(2),
            },
        )
        .expect("page");

        assert_eq!(page.pending, 3);
        assert_eq!(page.status_filter, Some(NotificationStatus::Read));
    }
}
