use chrono::{Local, NaiveDateTime, NaiveTime};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use serde::{Deserialize, Serialize};

use crate::domain::order::{
    Order, OrderChangeSet, OrderListQuery, OrderStatus, OrderStatusChange,
    OrderStatusHistoryEntry, OrderType, reconcile_order_status,
};
use crate::domain::order_item::{
    AreaProgress, ItemTimelineEvent, ItemsSummary, OrderItem, OrderItemStatus, ResponsibleArea,
};
use crate::domain::tenant::TenantContext;
use crate::forms::orders::{OrderStatusForm, ReviewForm};
use crate::repository::{
    NotificationWriter, OrderReader, OrderWriter, StaffReader, TableReader,
};
use crate::services::notifications::{notify_item_ready, notify_order_ready, notify_order_served};
use crate::services::{ServiceError, ServiceResult, ensure_admin};

/// Browser session key listing the tracking codes of a tenant's orders.
pub fn orders_key(tenant_id: i32) -> String {
    format!("orders:{tenant_id}")
}

/// Tracking codes remembered per browser.
pub const REMEMBERED_ORDERS: usize = 20;

/// Puts `code` first in the remembered list.
pub fn remember_order(codes: &mut Vec<String>, code: &str) {
    codes.retain(|existing| existing != code);
    codes.insert(0, code.to_string());
    codes.truncate(REMEMBERED_ORDERS);
}

/// An order line prepared for display.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    #[serde(flatten)]
    pub item: OrderItem,
    pub status_label: &'static str,
    pub area_label: &'static str,
    pub options_summary: String,
    pub progress_percentage: u8,
    pub timeline: Vec<ItemTimelineEvent>,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            item: item.clone(),
            status_label: item.status.label(),
            area_label: item.responsible_area.label(),
            options_summary: item.options_summary(),
            progress_percentage: item.status.progress_percentage(),
            timeline: item.timeline(),
        }
    }
}

/// An order with its derived progress, as shown to customers and staff.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub order: Order,
    pub status_label: &'static str,
    pub order_type_label: &'static str,
    pub payment_method_label: &'static str,
    pub items: Vec<OrderItemView>,
    pub kitchen: AreaProgress,
    pub bar: AreaProgress,
    pub summary: ItemsSummary,
    pub summary_label: &'static str,
    pub progress_percentage: u8,
    pub total_items: i32,
    pub estimated_ready_time: Option<NaiveDateTime>,
    pub can_be_reviewed: bool,
    pub can_be_cancelled: bool,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let live: Vec<&OrderItem> = order.items.iter().filter(|item| item.is_live()).collect();
        let progress_percentage = if live.is_empty() {
            0
        } else {
            let sum: usize = live
                .iter()
                .map(|item| item.status.progress_percentage() as usize)
                .sum();
            (sum / live.len()) as u8
        };
        let summary = ItemsSummary::of(&order.items);

        Self {
            status_label: order.status.label(),
            order_type_label: order.order_type.label(),
            payment_method_label: order.payment_method.label(),
            items: order.items.iter().map(OrderItemView::from).collect(),
            kitchen: AreaProgress::for_area(&order.items, ResponsibleArea::Kitchen),
            bar: AreaProgress::for_area(&order.items, ResponsibleArea::Bar),
            summary,
            summary_label: summary.label(),
            progress_percentage,
            total_items: order.total_items(),
            estimated_ready_time: order.estimated_ready_time(),
            can_be_reviewed: order.can_be_reviewed(),
            can_be_cancelled: order.can_be_cancelled(),
            order,
        }
    }
}

fn find_by_code<R>(repo: &R, tenant: &TenantContext, tracking_code: &str) -> ServiceResult<Order>
where
    R: OrderReader + ?Sized,
{
    repo.get_order_by_tracking_code(tracking_code, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

pub fn customer_order<R>(
    repo: &R,
    tenant: &TenantContext,
    tracking_code: &str,
) -> ServiceResult<OrderView>
where
    R: OrderReader + ?Sized,
{
    find_by_code(repo, tenant, tracking_code).map(OrderView::from)
}

/// Order with its status history, for the tracking page.
#[derive(Debug, Serialize)]
pub struct TrackingView {
    pub view: OrderView,
    pub history: Vec<HistoryEntryView>,
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryView {
    pub previous_status: Option<&'static str>,
    pub new_status: &'static str,
    pub changed_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<OrderStatusHistoryEntry> for HistoryEntryView {
    fn from(entry: OrderStatusHistoryEntry) -> Self {
        Self {
            previous_status: entry.previous_status.map(OrderStatus::label),
            new_status: entry.new_status.label(),
            changed_by: entry.changed_by,
            notes: entry.notes,
            created_at: entry.created_at,
        }
    }
}

pub fn track_order<R>(
    repo: &R,
    tenant: &TenantContext,
    tracking_code: &str,
) -> ServiceResult<TrackingView>
where
    R: OrderReader + ?Sized,
{
    let order = find_by_code(repo, tenant, tracking_code)?;
    let history = repo
        .list_order_history(order.id, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .into_iter()
        .map(HistoryEntryView::from)
        .collect();

    Ok(TrackingView {
        view: OrderView::from(order),
        history,
    })
}

/// Orders placed from this browser, newest first.
pub fn my_orders<R>(repo: &R, tenant: &TenantContext, codes: &[String]) -> ServiceResult<Vec<OrderView>>
where
    R: OrderReader + ?Sized,
{
    if codes.is_empty() {
        return Ok(Vec::new());
    }
    let (_, orders) = repo
        .list_orders(OrderListQuery::new(tenant.tenant_id()).tracking_codes(codes.to_vec()))
        .map_err(ServiceError::from)?;
    Ok(orders.into_iter().map(OrderView::from).collect())
}

pub fn review_order<R>(
    repo: &R,
    tenant: &TenantContext,
    tracking_code: &str,
    form: ReviewForm,
) -> ServiceResult<Order>
where
    R: OrderReader + OrderWriter + ?Sized,
{
    let order = find_by_code(repo, tenant, tracking_code)?;
    if !order.can_be_reviewed() {
        return Err(ServiceError::Form(
            "Solo puedes calificar pedidos entregados y una única vez.".to_string(),
        ));
    }

    let (rating, review) = form
        .into_review()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.review_order(
        order.id,
        tenant.tenant_id(),
        rating,
        review,
        Local::now().naive_utc(),
    )
    .map_err(ServiceError::from)
}

/// Counters shown on the admin screens for the current day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodayStats {
    pub total_orders: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub ready: usize,
    pub delivered: usize,
    pub cancelled: usize,
    /// Revenue of ready and delivered orders.
    pub revenue_cents: i64,
}

impl TodayStats {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut stats = TodayStats::default();
        for order in orders {
            stats.total_orders += 1;
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Confirmed | OrderStatus::Preparing => stats.in_progress += 1,
                OrderStatus::Ready => stats.ready += 1,
                OrderStatus::Delivered => stats.delivered += 1,
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
            if matches!(order.status, OrderStatus::Ready | OrderStatus::Delivered) {
                stats.revenue_cents += order.total_cents;
            }
        }
        stats
    }
}

pub(crate) fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(NaiveTime::MIN)
}

/// Orders created since midnight.
pub(crate) fn orders_today<R>(repo: &R, tenant_id: i32, now: NaiveDateTime) -> ServiceResult<Vec<Order>>
where
    R: OrderReader + ?Sized,
{
    repo.list_orders(OrderListQuery::new(tenant_id).created_from(start_of_day(now)))
        .map(|(_, orders)| orders)
        .map_err(ServiceError::from)
}

/// Query string accepted by the admin order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrdersPage {
    pub orders: Paginated<OrderView>,
    pub stats: TodayStats,
    pub statuses: &'static [OrderStatus],
    pub order_types: &'static [OrderType],
    pub status_filter: Option<OrderStatus>,
    pub type_filter: Option<OrderType>,
    pub search: Option<String>,
}

pub fn list_admin_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    params: OrderListParams,
) -> ServiceResult<AdminOrdersPage>
where
    R: OrderReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let status_filter = params.status.as_deref().and_then(OrderStatus::parse);
    let type_filter = params.order_type.as_deref().and_then(OrderType::parse);
    let search = params
        .search
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty());
    let page = params.page.unwrap_or(1).max(1);

    let mut query = OrderListQuery::new(tenant_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(status) = status_filter {
        query = query.status(status);
    }
    if let Some(order_type) = type_filter {
        query = query.order_type(order_type);
    }
    if let Some(term) = &search {
        query = query.search(term.clone());
    }

    let (total, orders) = repo.list_orders(query).map_err(ServiceError::from)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

    let today = orders_today(repo, tenant_id, Local::now().naive_utc())?;

    Ok(AdminOrdersPage {
        orders: Paginated::new(
            orders.into_iter().map(OrderView::from).collect(),
            page,
            total_pages,
        ),
        stats: TodayStats::from_orders(&today),
        statuses: OrderStatus::ALL,
        order_types: OrderType::ALL,
        status_filter,
        type_filter,
        search,
    })
}

#[derive(Debug, Serialize)]
pub struct AdminOrderDetail {
    pub view: OrderView,
    pub history: Vec<HistoryEntryView>,
    pub next_statuses: Vec<OrderStatus>,
}

pub fn admin_order_detail<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    order_id: i32,
) -> ServiceResult<AdminOrderDetail>
where
    R: OrderReader + ?Sized,
{
    ensure_admin(user, tenant)?;

    let order = repo
        .get_order_by_id(order_id, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;
    let history = repo
        .list_order_history(order.id, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .into_iter()
        .map(HistoryEntryView::from)
        .collect();

    Ok(AdminOrderDetail {
        next_statuses: order.status.next_statuses(),
        view: OrderView::from(order),
        history,
    })
}

fn send_order_notifications<R>(repo: &R, order: &Order, now: NaiveDateTime)
where
    R: StaffReader + TableReader + NotificationWriter + ?Sized,
{
    match order.status {
        OrderStatus::Ready => notify_order_ready(repo, order, now),
        OrderStatus::Delivered => notify_order_served(repo, order, now),
        _ => {}
    }
}

/// Moves an order along its lifecycle from the admin screen.
///
/// Confirming confirms pending items; cancelling cancels every item not yet
/// served.
pub fn update_order_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    order_id: i32,
    form: OrderStatusForm,
) -> ServiceResult<Order>
where
    R: OrderReader + OrderWriter + StaffReader + TableReader + NotificationWriter + ?Sized,
{
    ensure_admin(user, tenant)?;

    let (next, notes) = form
        .into_status()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let order = repo
        .get_order_by_id(order_id, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    if !order.status.can_transition_to(next) {
        return Err(ServiceError::order_transition(order.status, next));
    }

    let now = Local::now().naive_utc();
    let item_updates = match next.cascade_to_items() {
        Some(OrderItemStatus::Cancelled) => order
            .items
            .iter()
            .filter(|item| !item.status.is_terminal())
            .map(|item| item.transition(OrderItemStatus::Cancelled, now))
            .collect(),
        Some(status) => order
            .items
            .iter()
            .filter(|item| item.status == OrderItemStatus::Pending)
            .map(|item| item.transition(status, now))
            .collect(),
        None => Vec::new(),
    };

    let changes = OrderChangeSet {
        order_id: order.id,
        tenant_id: tenant.tenant_id(),
        item_updates,
        status_change: Some(OrderStatusChange {
            from: order.status,
            to: next,
            changed_by: Some(user.email.clone()),
            notes,
        }),
        at: now,
    };

    let updated = repo
        .apply_order_changes(&changes)
        .map_err(ServiceError::from)?;
    log::info!(
        "Order {} moved from {} to {} by {}",
        updated.order_number,
        order.status,
        next,
        user.email
    );

    send_order_notifications(repo, &updated, now);

    Ok(updated)
}

/// Result of moving a single line.
#[derive(Debug, Clone)]
pub struct ItemStatusOutcome {
    pub order: Order,
    pub item: OrderItem,
    /// New order status when the move advanced the order.
    pub order_status: Option<OrderStatus>,
    /// Every live line of the item's area is ready or served.
    pub all_area_ready: bool,
}

/// Moves one order line and reconciles the order status in the same write.
///
/// `area` restricts the move to lines of one station. Pending orders must be
/// confirmed before their lines progress.
pub(crate) fn move_item<R>(
    repo: &R,
    tenant_id: i32,
    item_id: i32,
    next: OrderItemStatus,
    area: Option<ResponsibleArea>,
    changed_by: &str,
) -> ServiceResult<ItemStatusOutcome>
where
    R: OrderReader + OrderWriter + StaffReader + TableReader + NotificationWriter + ?Sized,
{
    let order = repo
        .get_order_by_item_id(item_id, tenant_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;
    let item = order.item(item_id).ok_or(ServiceError::NotFound)?;

    if area.is_some_and(|area| area != item.responsible_area) {
        return Err(ServiceError::NotFound);
    }
    if order.status == OrderStatus::Pending && next != OrderItemStatus::Cancelled {
        return Err(ServiceError::Form(format!(
            "El pedido {} debe confirmarse antes de prepararse.",
            order.order_number
        )));
    }
    if order.status.is_terminal() || !item.status.can_transition_to(next, item.responsible_area) {
        return Err(ServiceError::item_transition(item.status, next));
    }

    let now = Local::now().naive_utc();
    let update = item.transition(next, now);

    let mut projected = order.items.clone();
    if let Some(line) = projected.iter_mut().find(|line| line.id == item_id) {
        line.status = next;
    }
    let order_status = reconcile_order_status(order.status, &projected);

    let changes = OrderChangeSet {
        order_id: order.id,
        tenant_id,
        item_updates: vec![update],
        status_change: order_status.map(|to| OrderStatusChange {
            from: order.status,
            to,
            changed_by: Some(changed_by.to_string()),
            notes: Some("Actualizado según el estado de los productos".to_string()),
        }),
        at: now,
    };

    let updated = repo
        .apply_order_changes(&changes)
        .map_err(ServiceError::from)?;
    let item = updated
        .item(item_id)
        .cloned()
        .ok_or_else(|| ServiceError::Internal(format!("item {item_id} vanished")))?;

    log::info!(
        "Item {} of order {} moved to {} by {}",
        item.id,
        updated.order_number,
        next,
        changed_by
    );
    if let Some(status) = order_status {
        log::info!("Order {} advanced to {}", updated.order_number, status);
    }

    let progress = AreaProgress::for_area(&updated.items, item.responsible_area);
    let all_area_ready = progress.total > 0 && progress.ready + progress.served == progress.total;

    if next.is_ready_for_service() {
        notify_item_ready(repo, &updated, &item, now);
    }
    if order_status.is_some() {
        send_order_notifications(repo, &updated, now);
    }

    Ok(ItemStatusOutcome {
        order: updated,
        item,
        order_status,
        all_area_ready,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ADMIN_ROLE;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{
        sample_item, sample_order, tenant_context, user_with_roles,
    };

    fn status_form(status: &str) -> OrderStatusForm {
        OrderStatusForm {
            status: status.to_string(),
            notes: None,
        }
    }

    fn quiet(repo: &mut FakeRepo) {
        repo.staff_reader.expect_list_staff().returning(|_| Ok(Vec::new()));
        repo.table_reader.expect_get_table_by_id().returning(|_, _| Ok(None));
        repo.table_reader.expect_list_tables().returning(|_| Ok(Vec::new()));
    }

    #[test]
    fn remember_order_dedupes_and_caps() {
        let mut codes: Vec<String> = (0..REMEMBERED_ORDERS).map(|i| i.to_string()).collect();
        remember_order(&mut codes, "5");
        assert_eq!(codes[0], "5");
        assert_eq!(codes.len(), REMEMBERED_ORDERS);

        remember_order(&mut codes, "new");
        assert_eq!(codes[0], "new");
        assert_eq!(codes.len(), REMEMBERED_ORDERS);
        assert!(!codes.contains(&(REMEMBERED_ORDERS - 1).to_string()));
    }

    #[test]
    fn review_requires_delivered_order() {
        let mut repo = FakeRepo::new();
        repo.order_reader
            .expect_get_order_by_tracking_code()
            .returning(|_, _| Ok(Some(sample_order(1, OrderStatus::Ready, Vec::new()))));
        repo.order_writer.expect_review_order().never();

        let result = review_order(
            &repo,
            &tenant_context(),
            "track-1",
            ReviewForm {
                rating: 5,
                review: None,
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn admin_status_update_requires_admin() {
        let repo = FakeRepo::new();
        let result = update_order_status(
            &repo,
            &user_with_roles(&["waiter"]),
            &tenant_context(),
            1,
            status_form("confirmed"),
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn admin_status_update_rejects_skips() {
        let mut repo = FakeRepo::new();
        repo.order_reader
            .expect_get_order_by_id()
            .returning(|id, _| Ok(Some(sample_order(id, OrderStatus::Pending, Vec::new()))));
        repo.order_writer.expect_apply_order_changes().never();

        let result = update_order_status(
            &repo,
            &user_with_roles(&[ADMIN_ROLE]),
            &tenant_context(),
            1,
            status_form("ready"),
        );
        assert!(matches!(result, Err(ServiceError::InvalidTransition { .. })));
    }

    #[test]
    fn cancelling_cascades_to_unserved_items() {
        let mut repo = FakeRepo::new();
        quiet(&mut repo);
        repo.order_reader.expect_get_order_by_id().returning(|id, _| {
            Ok(Some(sample_order(
                id,
                OrderStatus::Confirmed,
                vec![
                    sample_item(1, id, ResponsibleArea::Kitchen, OrderItemStatus::Confirmed),
                    sample_item(2, id, ResponsibleArea::Bar, OrderItemStatus::Cancelled),
                ],
            )))
        });
        repo.order_writer
            .expect_apply_order_changes()
            .times(1)
            .withf(|changes| {
                changes.item_updates.len() == 1
                    && changes.item_updates[0].item_id == 1
                    && changes.item_updates[0].status == OrderItemStatus::Cancelled
                    && changes
                        .status_change
                        .as_ref()
                        .is_some_and(|change| change.to == OrderStatus::Cancelled)
            })
            .returning(|changes| {
                Ok(sample_order(changes.order_id, OrderStatus::Cancelled, Vec::new()))
            });

        let order = update_order_status(
            &repo,
            &user_with_roles(&[ADMIN_ROLE]),
            &tenant_context(),
            3,
            status_form("cancelled"),
        )
        .expect("cancelled");
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn item_move_rejected_while_order_pending() {
        let mut repo = FakeRepo::new();
        repo.order_reader.expect_get_order_by_item_id().returning(|item_id, _| {
            Ok(Some(sample_order(
                1,
                OrderStatus::Pending,
                vec![sample_item(item_id, 1, ResponsibleArea::Kitchen, OrderItemStatus::Pending)],
            )))
        });
        repo.order_writer.expect_apply_order_changes().never();

        let result = move_item(
            &repo,
            9,
            4,
            OrderItemStatus::PreparingKitchen,
            Some(ResponsibleArea::Kitchen),
            "cook@example.com",
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn item_move_never_crosses_areas() {
        let mut repo = FakeRepo::new();
        repo.order_reader.expect_get_order_by_item_id().returning(|item_id, _| {
            Ok(Some(sample_order(
                1,
                OrderStatus::Confirmed,
                vec![sample_item(item_id, 1, ResponsibleArea::Kitchen, OrderItemStatus::Confirmed)],
            )))
        });

        let wrong_station = move_item(
            &repo,
            9,
            4,
            OrderItemStatus::PreparingKitchen,
            Some(ResponsibleArea::Bar),
            "bar@example.com",
        );
        assert!(matches!(wrong_station, Err(ServiceError::NotFound)));

        let wrong_state = move_item(&repo, 9, 4, OrderItemStatus::Mixing, None, "x@example.com");
        assert!(matches!(wrong_state, Err(ServiceError::InvalidTransition { .. })));
    }

    #[test]
    fn last_ready_item_moves_order_to_ready() {
        let mut repo = FakeRepo::new();
        quiet(&mut repo);
        repo.notification_writer
            .expect_create_notifications()
            .returning(|batch| Ok(batch.len()));
        repo.order_reader.expect_get_order_by_item_id().returning(|_, _| {
            Ok(Some(sample_order(
                1,
                OrderStatus::Preparing,
                vec![
                    sample_item(1, 1, ResponsibleArea::Kitchen, OrderItemStatus::Plating),
                    sample_item(2, 1, ResponsibleArea::Bar, OrderItemStatus::BarReady),
                ],
            )))
        });
        repo.order_writer
            .expect_apply_order_changes()
            .times(1)
            .withf(|changes| {
                changes
                    .status_change
                    .as_ref()
                    .is_some_and(|change| change.to == OrderStatus::Ready)
                    && changes.item_updates[0].preparation_completed_at.is_some()
            })
            .returning(|_| {
                Ok(sample_order(
                    1,
                    OrderStatus::Ready,
                    vec![
                        sample_item(1, 1, ResponsibleArea::Kitchen, OrderItemStatus::KitchenReady),
                        sample_item(2, 1, ResponsibleArea::Bar, OrderItemStatus::BarReady),
                    ],
                ))
            });

        let outcome = move_item(
            &repo,
            9,
            1,
            OrderItemStatus::KitchenReady,
            Some(ResponsibleArea::Kitchen),
            "cook@example.com",
        )
        .expect("moved");

        assert_eq!(outcome.order_status, Some(OrderStatus::Ready));
        assert!(outcome.all_area_ready);
        assert_eq!(outcome.item.status, OrderItemStatus::KitchenReady);
    }
}
