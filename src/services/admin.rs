//! Restaurant administration dashboard and sales report.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::{Deserialize, Serialize};

use crate::domain::order::{Order, OrderListQuery, OrderStatus};
use crate::domain::staff::{StaffListQuery, StaffMember, StaffRole};
use crate::domain::table::TableListQuery;
use crate::domain::table_session::SessionInfo;
use crate::domain::tenant::TenantContext;
use crate::repository::{OrderReader, StaffReader, TableReader};
use crate::services::orders::{OrderView, TodayStats, orders_today, start_of_day};
use crate::services::table_sessions::{SessionSettings, TableSessionCache};
use crate::services::{ServiceError, ServiceResult, ensure_admin, wall_clock};

const TOP_TABLES: usize = 5;
const TOP_ITEMS: usize = 10;
const RECENT_ORDERS: usize = 10;
pub const DEFAULT_REPORT_DAYS: i64 = 7;
pub const MAX_REPORT_DAYS: i64 = 90;

#[derive(Debug, Serialize)]
pub struct TopTable {
    pub table_id: i32,
    pub display_name: String,
    pub total_orders: i32,
    pub total_scans: i32,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub stats: TodayStats,
    pub total_tables: usize,
    pub tables_in_use: usize,
    pub active_sessions: Vec<SessionInfo>,
    pub top_tables: Vec<TopTable>,
    pub recent_orders: Vec<OrderView>,
    pub active_staff: usize,
    pub available_waiters: usize,
}

/// Waiters that can take tables at the local `time`.
fn available_waiters(staff: &[StaffMember], time: NaiveTime) -> usize {
    staff
        .iter()
        .filter(|member| member.role == StaffRole::Waiter && member.can_take_tables_at(time))
        .count()
}

pub fn admin_dashboard<R>(
    repo: &R,
    sessions: &TableSessionCache,
    settings: SessionSettings,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
) -> ServiceResult<AdminDashboard>
where
    R: OrderReader + TableReader + StaffReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();
    let now = Local::now().naive_utc();

    let mut today = orders_today(repo, tenant_id, now)?;
    let stats = TodayStats::from_orders(&today);
    today.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let active_sessions: Vec<SessionInfo> = sessions
        .active_sessions(tenant_id, now, settings.inactivity())
        .iter()
        .map(|session| session.info(now))
        .collect();
    let mut occupied: Vec<i32> = active_sessions.iter().map(|info| info.table_id).collect();
    occupied.sort_unstable();
    occupied.dedup();

    let mut tables = repo
        .list_tables(TableListQuery::new(tenant_id))
        .map_err(ServiceError::from)?;
    let total_tables = tables.len();
    tables.sort_by(|a, b| b.total_orders.cmp(&a.total_orders).then(a.id.cmp(&b.id)));
    let top_tables = tables
        .into_iter()
        .filter(|table| table.total_orders > 0)
        .take(TOP_TABLES)
        .map(|table| TopTable {
            table_id: table.id,
            display_name: table.display_name(),
            total_orders: table.total_orders,
            total_scans: table.total_scans,
        })
        .collect();

    let staff = repo
        .list_staff(StaffListQuery::new(tenant_id).only_active())
        .map_err(ServiceError::from)?;
    let available_waiters = available_waiters(&staff, wall_clock(now));

    Ok(AdminDashboard {
        stats,
        total_tables,
        tables_in_use: occupied.len(),
        active_sessions,
        top_tables,
        recent_orders: today
            .into_iter()
            .take(RECENT_ORDERS)
            .map(OrderView::from)
            .collect(),
        active_staff: staff.len(),
        available_waiters,
    })
}

/// Query string accepted by the sales report.
#[derive(Debug, Default, Deserialize)]
pub struct SalesReportParams {
    #[serde(default)]
    pub days: Option<i64>,
}

#[derive(Debug, Default, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub orders: usize,
    pub revenue_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct TopItem {
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct SalesReport {
    pub days: i64,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    pub total_orders: usize,
    pub revenue_cents: i64,
    pub average_order_cents: i64,
    pub daily: Vec<DailySales>,
    pub top_items: Vec<TopItem>,
}

impl SalesReport {
    /// Builds the report over the orders created since `from`. Only ready and
    /// delivered orders count.
    pub fn build(days: i64, from: NaiveDateTime, to: NaiveDateTime, orders: &[Order]) -> Self {
        let mut daily: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();
        let mut offset = 0;
        while offset < days {
            let date = (from + Duration::days(offset)).date();
            daily.insert(
                date,
                DailySales {
                    date,
                    ..DailySales::default()
                },
            );
            offset += 1;
        }

        let mut items: HashMap<String, (i64, i64)> = HashMap::new();
        let mut total_orders = 0;
        let mut revenue_cents = 0;

        for order in orders
            .iter()
            .filter(|order| matches!(order.status, OrderStatus::Ready | OrderStatus::Delivered))
        {
            total_orders += 1;
            revenue_cents += order.total_cents;

            let day = daily
                .entry(order.created_at.date())
                .or_insert_with(|| DailySales {
                    date: order.created_at.date(),
                    ..DailySales::default()
                });
            day.orders += 1;
            day.revenue_cents += order.total_cents;

            for item in order.items.iter().filter(|item| item.is_live()) {
                let entry = items.entry(item.name.clone()).or_default();
                entry.0 += i64::from(item.quantity);
                entry.1 += item.total_price_cents;
            }
        }

        let mut top_items: Vec<TopItem> = items
            .into_iter()
            .map(|(name, (quantity, revenue_cents))| TopItem {
                name,
                quantity,
                revenue_cents,
            })
            .collect();
        top_items.sort_by(|a, b| {
            b.quantity
                .cmp(&a.quantity)
                .then(b.revenue_cents.cmp(&a.revenue_cents))
                .then(a.name.cmp(&b.name))
        });
        top_items.truncate(TOP_ITEMS);

        let average_order_cents = if total_orders == 0 {
            0
        } else {
            revenue_cents / total_orders as i64
        };

        SalesReport {
            days,
            from,
            to,
            total_orders,
            revenue_cents,
            average_order_cents,
            daily: daily.into_values().collect(),
            top_items,
        }
    }
}

pub fn sales_report<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    params: SalesReportParams,
) -> ServiceResult<SalesReport>
where
    R: OrderReader + ?Sized,
{
    ensure_admin(user, tenant)?;

    let days = params
        .days
        .unwrap_or(DEFAULT_REPORT_DAYS)
        .clamp(1, MAX_REPORT_DAYS);
    let now = Local::now().naive_utc();
    let from = start_of_day(now) - Duration::days(days - 1);

    let (_, orders) = repo
        .list_orders(OrderListQuery::new(tenant.tenant_id()).created_from(from))
        .map_err(ServiceError::from)?;

    Ok(SalesReport::build(days, from, now, &orders))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ADMIN_ROLE;
    use crate::domain::order_item::{OrderItemStatus, ResponsibleArea};
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{
        fixed_datetime, sample_item, sample_order, sample_staff, sample_table, tenant_context,
        user_with_roles,
    };

    fn priced_order(id: i32, status: OrderStatus, total_cents: i64, day_offset: i64) -> Order {
        let mut item = sample_item(id, id, ResponsibleArea::Kitchen, OrderItemStatus::Served);
        item.name = if id % 2 == 0 { "Arepa" } else { "Empanada" }.to_string();
        item.quantity = 2;
        item.total_price_cents = total_cents;
        let mut order = sample_order(id, status, vec![item]);
        order.total_cents = total_cents;
        order.created_at = fixed_datetime() + Duration::days(day_offset);
        order
    }

    #[test]
    fn available_waiters_follow_local_shift() {
        let mut evening = sample_staff(1, StaffRole::Waiter, "noche@example.com");
        evening.shift_start = NaiveTime::from_hms_opt(18, 0, 0);
        evening.shift_end = NaiveTime::from_hms_opt(23, 0, 0);
        let cook = sample_staff(2, StaffRole::Kitchen, "cocina@example.com");
        let staff = vec![evening, cook];

        let inside = NaiveTime::from_hms_opt(22, 59, 0).unwrap();
        let outside = NaiveTime::from_hms_opt(23, 1, 0).unwrap();
        assert_eq!(available_waiters(&staff, inside), 1);
        assert_eq!(available_waiters(&staff, outside), 0);
    }

    #[test]
    fn report_counts_only_completed_orders() {
        let from = start_of_day(fixed_datetime());
        let orders = vec![
            priced_order(1, OrderStatus::Delivered, 30_000, 0),
            priced_order(2, OrderStatus::Ready, 20_000, 1),
            priced_order(3, OrderStatus::Cancelled, 90_000, 1),
            priced_order(4, OrderStatus::Preparing, 15_000, 2),
        ];

        let report = SalesReport::build(3, from, fixed_datetime(), &orders);

        assert_eq!(report.total_orders, 2);
        assert_eq!(report.revenue_cents, 50_000);
        assert_eq!(report.average_order_cents, 25_000);
        assert_eq!(report.daily.len(), 3);
        assert_eq!(report.daily[1].orders, 1);
        assert_eq!(report.daily[2].revenue_cents, 0);
        assert_eq!(report.top_items[0].name, "Empanada");
    }

    #[test]
    fn report_days_are_clamped() {
        let mut repo = FakeRepo::new();
        repo.order_reader
            .expect_list_orders()
            .returning(|_| Ok((0, Vec::new())));

        let report = sales_report(
            &repo,
            &user_with_roles(&[ADMIN_ROLE]),
            &tenant_context(),
            SalesReportParams { days: Some(400) },
        )
        .expect("report");
        assert_eq!(report.days, MAX_REPORT_DAYS);
        assert_eq!(report.daily.len(), MAX_REPORT_DAYS as usize);
    }

    #[test]
    fn kitchen_cannot_see_report() {
        let repo = FakeRepo::new();
        let result = sales_report(
            &repo,
            &user_with_roles(&["kitchen"]),
            &tenant_context(),
            SalesReportParams::default(),
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn dashboard_ranks_tables_by_orders() {
        let mut repo = FakeRepo::new();
        repo.order_reader.expect_list_orders().returning(|_| {
            Ok((1, vec![priced_order(1, OrderStatus::Delivered, 40_000, 0)]))
        });
        repo.table_reader.expect_list_tables().returning(|_| {
            let mut quiet = sample_table(1, "1");
            quiet.total_orders = 2;
            let mut busy = sample_table(2, "2");
            busy.total_orders = 9;
            let unused = sample_table(3, "3");
            Ok(vec![quiet, busy, unused])
        });
        repo.staff_reader.expect_list_staff().returning(|_| {
            Ok(vec![
                sample_staff(1, StaffRole::Waiter, "w@casa.co"),
                sample_staff(2, StaffRole::Bar, "b@casa.co"),
            ])
        });

        let dashboard = admin_dashboard(
            &repo,
            &TableSessionCache::new(),
            SessionSettings::default(),
            &user_with_roles(&[ADMIN_ROLE]),
            &tenant_context(),
        )
        .expect("dashboard");

        assert_eq!(dashboard.stats.revenue_cents, 40_000);
        assert_eq!(dashboard.total_tables, 3);
        assert_eq!(dashboard.top_tables.len(), 2);
        assert_eq!(dashboard.top_tables[0].table_id, 2);
        assert_eq!(dashboard.active_staff, 2);
        assert_eq!(dashboard.available_waiters, 1);
        assert!(dashboard.active_sessions.is_empty());
    }
}
