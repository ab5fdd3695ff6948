//! Kitchen and bar dashboards.

use chrono::{Local, NaiveDateTime};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Serialize;

use crate::ADMIN_ROLE;
use crate::domain::order::{ItemTicket, ItemTicketQuery, OrderStatus};
use crate::domain::order_item::{OrderItemStatus, ResponsibleArea};
use crate::domain::staff::StaffRole;
use crate::domain::tenant::TenantContext;
use crate::forms::orders::ItemStatusForm;
use crate::repository::{NotificationWriter, OrderReader, OrderWriter, StaffReader, TableReader};
use crate::services::orders::move_item;
use crate::services::{ServiceError, ServiceResult, ensure_staff};

/// Ready tickets listed on a station dashboard.
pub const RECENT_READY_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl From<OrderItemStatus> for StatusOption {
    fn from(status: OrderItemStatus) -> Self {
        Self {
            value: status.as_str(),
            label: status.label(),
        }
    }
}

/// Ticket with what a station needs to act on it.
#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: ItemTicket,
    pub status_label: &'static str,
    pub options_summary: String,
    pub waiting_minutes: i64,
    pub next_statuses: Vec<StatusOption>,
}

impl TicketView {
    pub(crate) fn new(ticket: ItemTicket, now: NaiveDateTime) -> Self {
        let item = &ticket.item;
        let area = item.responsible_area;
        let next_statuses = area
            .flow()
            .iter()
            .copied()
            .filter(|next| *next != OrderItemStatus::Served)
            .filter(|next| item.status.can_transition_to(*next, area))
            .map(StatusOption::from)
            .collect();

        Self {
            status_label: item.status.label(),
            options_summary: item.options_summary(),
            waiting_minutes: (now - ticket.order_created_at).num_minutes().max(0),
            next_statuses,
            ticket,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusGroup {
    pub status: &'static str,
    pub label: &'static str,
    pub tickets: Vec<TicketView>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StationCounters {
    pub waiting: usize,
    pub in_progress: usize,
    pub ready: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationDashboard {
    pub area: ResponsibleArea,
    pub area_label: &'static str,
    /// One group per working state, in flow order.
    pub groups: Vec<StatusGroup>,
    pub recent_ready: Vec<TicketView>,
    pub counters: StationCounters,
    pub generated_at: NaiveDateTime,
}

fn ensure_station(
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    area: ResponsibleArea,
) -> ServiceResult<()> {
    ensure_staff(
        user,
        tenant,
        &[StaffRole::for_area(area).access_role(), ADMIN_ROLE],
    )
}

pub fn station_dashboard<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    area: ResponsibleArea,
) -> ServiceResult<StationDashboard>
where
    R: OrderReader + ?Sized,
{
    ensure_station(user, tenant, area)?;
    let tenant_id = tenant.tenant_id();
    let now = Local::now().naive_utc();

    let working = repo
        .list_item_tickets(ItemTicketQuery::new(tenant_id, area.work_statuses()).area(area))
        .map_err(ServiceError::from)?;
    let recent_ready: Vec<TicketView> = repo
        .list_item_tickets(
            ItemTicketQuery::new(tenant_id, &[area.ready_status()])
                .area(area)
                .limit(RECENT_READY_LIMIT),
        )
        .map_err(ServiceError::from)?
        .into_iter()
        .map(|ticket| TicketView::new(ticket, now))
        .collect();

    let mut groups: Vec<StatusGroup> = area
        .work_statuses()
        .iter()
        .map(|status| StatusGroup {
            status: status.as_str(),
            label: status.label(),
            tickets: Vec::new(),
        })
        .collect();

    let mut counters = StationCounters {
        ready: recent_ready.len(),
        ..StationCounters::default()
    };
    for ticket in working {
        if ticket.order_status.is_terminal() || ticket.order_status == OrderStatus::Pending {
            continue;
        }
        let status = ticket.item.status;
        if status == OrderItemStatus::Confirmed {
            counters.waiting += 1;
        } else {
            counters.in_progress += 1;
        }
        if let Some(group) = groups.iter_mut().find(|group| group.status == status.as_str()) {
            group.tickets.push(TicketView::new(ticket, now));
        }
    }

    Ok(StationDashboard {
        area,
        area_label: area.label(),
        groups,
        recent_ready,
        counters,
        generated_at: now,
    })
}

/// Reply sent to the station after a status change.
#[derive(Debug, Clone, Serialize)]
pub struct StationUpdate {
    pub success: bool,
    pub new_status: &'static str,
    pub new_status_display: &'static str,
    pub order_number: String,
    pub order_status: Option<&'static str>,
    pub all_area_ready: bool,
}

fn station_move<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    area: ResponsibleArea,
    item_id: i32,
    next: OrderItemStatus,
) -> ServiceResult<StationUpdate>
where
    R: OrderReader + OrderWriter + StaffReader + TableReader + NotificationWriter + ?Sized,
{
    ensure_station(user, tenant, area)?;
    if next == OrderItemStatus::Served {
        return Err(ServiceError::Form(
            "Los pedidos se marcan como servidos desde el panel de meseros.".to_string(),
        ));
    }

    let outcome = move_item(repo, tenant.tenant_id(), item_id, next, Some(area), &user.email)?;

    Ok(StationUpdate {
        success: true,
        new_status: outcome.item.status.as_str(),
        new_status_display: outcome.item.status.label(),
        order_number: outcome.order.order_number,
        order_status: outcome.order_status.map(OrderStatus::as_str),
        all_area_ready: outcome.all_area_ready,
    })
}

pub fn update_station_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    area: ResponsibleArea,
    item_id: i32,
    form: ItemStatusForm,
) -> ServiceResult<StationUpdate>
where
    R: OrderReader + OrderWriter + StaffReader + TableReader + NotificationWriter + ?Sized,
{
    ensure_station(user, tenant, area)?;
    let next = form
        .status()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    station_move(repo, user, tenant, area, item_id, next)
}

/// Starts preparing an item.
pub fn start_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    area: ResponsibleArea,
    item_id: i32,
) -> ServiceResult<StationUpdate>
where
    R: OrderReader + OrderWriter + StaffReader + TableReader + NotificationWriter + ?Sized,
{
    station_move(repo, user, tenant, area, item_id, area.start_status())
}

/// Marks an item ready for pickup.
pub fn ready_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    area: ResponsibleArea,
    item_id: i32,
) -> ServiceResult<StationUpdate>
where
    R: OrderReader + OrderWriter + StaffReader + TableReader + NotificationWriter + ?Sized,
{
    station_move(repo, user, tenant, area, item_id, area.ready_status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KITCHEN_ROLE;
    use crate::domain::order_item::OrderItem;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{
        fixed_datetime, sample_item, sample_order, tenant_context, user_with_roles,
    };

    fn ticket(item: OrderItem, order_status: OrderStatus) -> ItemTicket {
        ItemTicket {
            order_number: format!("ORD-20240501-{:04}", item.order_id),
            order_status,
            table_id: Some(1),
            table_number: Some("1".to_string()),
            customer_name: "Ana".to_string(),
            order_created_at: fixed_datetime(),
            item,
        }
    }

    #[test]
    fn bar_staff_cannot_open_kitchen() {
        let repo = FakeRepo::new();
        let result = station_dashboard(
            &repo,
            &user_with_roles(&["bar"]),
            &tenant_context(),
            ResponsibleArea::Kitchen,
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn dashboard_groups_tickets_by_state() {
        let mut repo = FakeRepo::new();
        repo.order_reader.expect_list_item_tickets().returning(|query| {
            if query.statuses == [OrderItemStatus::KitchenReady] {
                assert_eq!(query.limit, Some(RECENT_READY_LIMIT));
                return Ok(vec![ticket(
                    sample_item(9, 3, ResponsibleArea::Kitchen, OrderItemStatus::KitchenReady),
                    OrderStatus::Preparing,
                )]);
            }
            Ok(vec![
                ticket(
                    sample_item(1, 1, ResponsibleArea::Kitchen, OrderItemStatus::Confirmed),
                    OrderStatus::Confirmed,
                ),
                ticket(
                    sample_item(2, 1, ResponsibleArea::Kitchen, OrderItemStatus::Cooking),
                    OrderStatus::Preparing,
                ),
                ticket(
                    sample_item(3, 2, ResponsibleArea::Kitchen, OrderItemStatus::Cooking),
                    OrderStatus::Cancelled,
                ),
            ])
        });

        let dashboard = station_dashboard(
            &repo,
            &user_with_roles(&[KITCHEN_ROLE]),
            &tenant_context(),
            ResponsibleArea::Kitchen,
        )
        .expect("dashboard");

        assert_eq!(dashboard.counters.waiting, 1);
        assert_eq!(dashboard.counters.in_progress, 1);
        assert_eq!(dashboard.counters.ready, 1);
        let cooking = dashboard
            .groups
            .iter()
            .find(|group| group.status == "cooking")
            .expect("cooking group");
        assert_eq!(cooking.tickets.len(), 1);
        let labels: Vec<&str> = cooking.tickets[0]
            .next_statuses
            .iter()
            .map(|option| option.value)
            .collect();
        assert_eq!(labels, vec!["plating", "kitchen_ready"]);
    }

    #[test]
    fn stations_cannot_serve() {
        let repo = FakeRepo::new();
        let result = update_station_item(
            &repo,
            &user_with_roles(&[KITCHEN_ROLE]),
            &tenant_context(),
            ResponsibleArea::Kitchen,
            1,
            ItemStatusForm {
                status: "served".to_string(),
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn start_moves_to_area_start_state() {
        let mut repo = FakeRepo::new();
        repo.staff_reader.expect_list_staff().returning(|_| Ok(Vec::new()));
        repo.table_reader.expect_get_table_by_id().returning(|_, _| Ok(None));
        repo.table_reader.expect_list_tables().returning(|_| Ok(Vec::new()));
        repo.order_reader.expect_get_order_by_item_id().returning(|item_id, _| {
            Ok(Some(sample_order(
                1,
                OrderStatus::Confirmed,
                vec![sample_item(item_id, 1, ResponsibleArea::Bar, OrderItemStatus::Confirmed)],
            )))
        });
        repo.order_writer
            .expect_apply_order_changes()
            .withf(|changes| {
                changes.item_updates[0].status == OrderItemStatus::PreparingBar
                    && changes
                        .status_change
                        .as_ref()
                        .is_some_and(|change| change.to == OrderStatus::Preparing)
            })
            .returning(|_| {
                Ok(sample_order(
                    1,
                    OrderStatus::Preparing,
                    vec![sample_item(5, 1, ResponsibleArea::Bar, OrderItemStatus::PreparingBar)],
                ))
            });

        let update = start_item(
            &repo,
            &user_with_roles(&["bar"]),
            &tenant_context(),
            ResponsibleArea::Bar,
            5,
        )
        .expect("started");

        assert_eq!(update.new_status, "preparing_bar");
        assert_eq!(update.order_status, Some("preparing"));
        assert!(!update.all_area_ready);
    }
}
