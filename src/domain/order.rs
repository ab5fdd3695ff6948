use chrono::{Duration, NaiveDate, NaiveDateTime};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

use crate::domain::money::OrderTotals;
use crate::domain::order_item::{ItemsSummary, NewOrderItem, OrderItem, OrderItemStatus};

labeled_enum! {
    /// Lifecycle states of an order.
    pub enum OrderStatus {
        Pending => ("pending", "Pendiente"),
        Confirmed => ("confirmed", "Confirmado"),
        Preparing => ("preparing", "En preparación"),
        Ready => ("ready", "Listo"),
        Delivered => ("delivered", "Entregado"),
        Cancelled => ("cancelled", "Cancelado"),
    }
    fallback = Pending;
}

impl OrderStatus {
    /// Statuses of orders still being worked on.
    pub const ACTIVE: &'static [OrderStatus] = &[
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ];

    fn rank(self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Manual lifecycle moves allowed to staff.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Preparing)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
                | (OrderStatus::Preparing, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::Delivered)
        )
    }

    /// Statuses reachable from `self` by a manual move.
    pub fn next_statuses(self) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .iter()
            .copied()
            .filter(|next| self.can_transition_to(*next))
            .collect()
    }

    /// Item state implied for pending items when the order enters `self`.
    pub fn cascade_to_items(self) -> Option<OrderItemStatus> {
        match self {
            OrderStatus::Confirmed => Some(OrderItemStatus::Confirmed),
            OrderStatus::Cancelled => Some(OrderItemStatus::Cancelled),
            _ => None,
        }
    }
}

/// Derives the order status implied by its items.
///
/// Returns `Some` only when the items move a confirmed or later order
/// forward. Pending orders wait for confirmation and terminal orders never
/// change.
pub fn reconcile_order_status(current: OrderStatus, items: &[OrderItem]) -> Option<OrderStatus> {
    if matches!(current, OrderStatus::Pending) || current.is_terminal() {
        return None;
    }

    let target = match ItemsSummary::of(items) {
        ItemsSummary::Completed => OrderStatus::Delivered,
        ItemsSummary::AllReady => OrderStatus::Ready,
        ItemsSummary::InProgress | ItemsSummary::PartialReady => OrderStatus::Preparing,
        ItemsSummary::Pending | ItemsSummary::NoItems => return None,
    };

    match (current.rank(), target.rank()) {
        (Some(from), Some(to)) if to > from => Some(target),
        _ => None,
    }
}

labeled_enum! {
    pub enum OrderType {
        DineIn => ("dine_in", "Para comer aquí"),
        Takeaway => ("takeaway", "Para llevar"),
        Delivery => ("delivery", "Delivery"),
    }
    fallback = DineIn;
}

labeled_enum! {
    pub enum PaymentMethod {
        Cash => ("cash", "Efectivo"),
        Card => ("card", "Tarjeta"),
        Transfer => ("transfer", "Transferencia"),
        DigitalWallet => ("digital_wallet", "Billetera digital"),
    }
    fallback = Cash;
}

labeled_enum! {
    pub enum PaymentStatus {
        Pending => ("pending", "Pendiente"),
        Paid => ("paid", "Pagado"),
        Refunded => ("refunded", "Reembolsado"),
    }
    fallback = Pending;
}

/// Formats the human-facing order number, e.g. `ORD-20240501-0007`.
pub fn format_order_number(date: NaiveDate, sequence: u32) -> String {
    format!("{}{sequence:04}", order_number_prefix(date))
}

/// Prefix shared by every order number of `date`.
pub fn order_number_prefix(date: NaiveDate) -> String {
    format!("ORD-{}-", date.format("%Y%m%d"))
}

/// Extracts the daily sequence of an order number.
pub fn order_number_sequence(order_number: &str) -> Option<u32> {
    order_number.rsplit('-').next()?.parse().ok()
}

/// Sequence following the highest one among `numbers`, compared numerically.
pub fn next_order_sequence<'a>(numbers: impl IntoIterator<Item = &'a str>) -> u32 {
    numbers
        .into_iter()
        .filter_map(order_number_sequence)
        .max()
        .map_or(1, |last| last + 1)
}

/// An order placed by a customer of a tenant.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    pub id: i32,
    pub tenant_id: i32,
    pub order_number: String,
    /// Unguessable identifier used in customer URLs.
    pub tracking_code: String,
    pub table_id: Option<i32>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub order_type: OrderType,
    pub table_number: Option<String>,
    pub delivery_address: Option<String>,
    pub status: OrderStatus,
    /// Minutes.
    pub estimated_preparation_time: i32,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub delivery_fee_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub customer_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub confirmed_at: Option<NaiveDateTime>,
    pub ready_at: Option<NaiveDateTime>,
    pub delivered_at: Option<NaiveDateTime>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Total number of units across live lines.
    pub fn total_items(&self) -> i32 {
        self.items
            .iter()
            .filter(|item| item.is_live())
            .map(|item| item.quantity)
            .sum()
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    pub fn can_be_modified(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn can_be_reviewed(&self) -> bool {
        self.status == OrderStatus::Delivered && self.rating.is_none()
    }

    /// Confirmation time plus the estimated preparation time.
    pub fn estimated_ready_time(&self) -> Option<NaiveDateTime> {
        self.confirmed_at
            .map(|confirmed| confirmed + Duration::minutes(self.estimated_preparation_time as i64))
    }

    pub fn item(&self, item_id: i32) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

/// Payload required to insert an order with its lines.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub tenant_id: i32,
    pub tracking_code: String,
    pub table_id: Option<i32>,
    /// Scan that opened the table session the order was placed from.
    pub scan_log_id: Option<i32>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub order_type: OrderType,
    pub table_number: Option<String>,
    pub delivery_address: Option<String>,
    pub estimated_preparation_time: i32,
    pub totals: OrderTotals,
    pub payment_method: PaymentMethod,
    pub customer_notes: Option<String>,
    pub items: Vec<NewOrderItem>,
    pub created_at: NaiveDateTime,
}

/// Status move recorded in the order history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub changed_by: Option<String>,
    pub notes: Option<String>,
}

/// Everything written atomically when an order or its items progress.
#[derive(Debug, Clone)]
pub struct OrderChangeSet {
    pub order_id: i32,
    pub tenant_id: i32,
    pub item_updates: Vec<crate::domain::order_item::OrderItemStatusUpdate>,
    pub status_change: Option<OrderStatusChange>,
    pub at: NaiveDateTime,
}

/// Row of the order status history.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderStatusHistoryEntry {
    pub id: i32,
    pub order_id: i32,
    pub previous_status: Option<OrderStatus>,
    pub new_status: OrderStatus,
    pub changed_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Query definition used to list orders of a tenant.
#[derive(Debug, Clone)]
pub struct OrderListQuery {
    pub tenant_id: i32,
    pub statuses: Vec<OrderStatus>,
    pub order_type: Option<OrderType>,
    pub table_ids: Option<Vec<i32>>,
    pub tracking_codes: Option<Vec<String>>,
    pub created_from: Option<NaiveDateTime>,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl OrderListQuery {
    pub fn new(tenant_id: i32) -> Self {
        Self {
            tenant_id,
            statuses: Vec::new(),
            order_type: None,
            table_ids: None,
            tracking_codes: None,
            created_from: None,
            search: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.statuses = vec![status];
        self
    }

    pub fn statuses(mut self, statuses: &[OrderStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    pub fn tables(mut self, table_ids: Vec<i32>) -> Self {
        self.table_ids = Some(table_ids);
        self
    }

    pub fn tracking_codes(mut self, codes: Vec<String>) -> Self {
        self.tracking_codes = Some(codes);
        self
    }

    pub fn created_from(mut self, from: NaiveDateTime) -> Self {
        self.created_from = Some(from);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query definition for station and waiter item feeds.
///
/// Lines of delivered or cancelled orders are never listed.
#[derive(Debug, Clone)]
pub struct ItemTicketQuery {
    pub tenant_id: i32,
    pub area: Option<crate::domain::order_item::ResponsibleArea>,
    pub statuses: Vec<OrderItemStatus>,
    pub table_ids: Option<Vec<i32>>,
    pub limit: Option<i64>,
}

impl ItemTicketQuery {
    pub fn new(tenant_id: i32, statuses: &[OrderItemStatus]) -> Self {
        Self {
            tenant_id,
            area: None,
            statuses: statuses.to_vec(),
            table_ids: None,
            limit: None,
        }
    }

    pub fn area(mut self, area: crate::domain::order_item::ResponsibleArea) -> Self {
        self.area = Some(area);
        self
    }

    pub fn tables(mut self, table_ids: Vec<i32>) -> Self {
        self.table_ids = Some(table_ids);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// An order line together with the order context a station needs.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ItemTicket {
    pub item: OrderItem,
    pub order_number: String,
    pub order_status: OrderStatus,
    pub table_id: Option<i32>,
    pub table_number: Option<String>,
    pub customer_name: String,
    pub order_created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_item::ResponsibleArea;

    fn item(status: OrderItemStatus) -> OrderItem {
        let stamp = NaiveDateTime::default();
        OrderItem {
            id: 1,
            order_id: 1,
            menu_item_id: None,
            name: "Ceviche".to_string(),
            variant_name: None,
            addon_names: Vec::new(),
            modifier_names: Vec::new(),
            quantity: 2,
            unit_price_cents: 100,
            variant_price_cents: 0,
            addons_price_cents: 0,
            modifiers_price_cents: 0,
            total_price_cents: 200,
            special_instructions: None,
            responsible_area: ResponsibleArea::Kitchen,
            status,
            preparation_started_at: None,
            preparation_completed_at: None,
            served_at: None,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn manual_transitions_follow_lifecycle() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Delivered));
        assert!(!Preparing.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Pending.can_transition_to(Ready));
        assert_eq!(Pending.next_statuses(), vec![Confirmed, Cancelled]);
    }

    #[test]
    fn first_item_in_preparation_moves_order_to_preparing() {
        let items = vec![
            item(OrderItemStatus::Cooking),
            item(OrderItemStatus::Confirmed),
        ];
        assert_eq!(
            reconcile_order_status(OrderStatus::Confirmed, &items),
            Some(OrderStatus::Preparing)
        );
        assert_eq!(reconcile_order_status(OrderStatus::Preparing, &items), None);
    }

    #[test]
    fn all_items_ready_moves_order_to_ready() {
        let items = vec![
            item(OrderItemStatus::KitchenReady),
            item(OrderItemStatus::Served),
            item(OrderItemStatus::Cancelled),
        ];
        assert_eq!(
            reconcile_order_status(OrderStatus::Preparing, &items),
            Some(OrderStatus::Ready)
        );
    }

    #[test]
    fn all_items_served_delivers_order() {
        let items = vec![item(OrderItemStatus::Served), item(OrderItemStatus::Served)];
        assert_eq!(
            reconcile_order_status(OrderStatus::Ready, &items),
            Some(OrderStatus::Delivered)
        );
    }

    #[test]
    fn pending_and_terminal_orders_are_not_reconciled() {
        let items = vec![item(OrderItemStatus::Served)];
        assert_eq!(reconcile_order_status(OrderStatus::Pending, &items), None);
        assert_eq!(reconcile_order_status(OrderStatus::Cancelled, &items), None);
        assert_eq!(reconcile_order_status(OrderStatus::Delivered, &items), None);
    }

    #[test]
    fn order_numbers_round_trip_sequence() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default();
        let number = format_order_number(date, 7);
        assert_eq!(number, "ORD-20240501-0007");
        assert_eq!(order_number_sequence(&number), Some(7));
        assert_eq!(order_number_sequence("garbage"), None);
    }

    #[test]
    fn sequence_keeps_growing_past_four_digits() {
        assert_eq!(next_order_sequence(Vec::<&str>::new()), 1);
        assert_eq!(
            next_order_sequence(["ORD-20240501-9999", "ORD-20240501-10000", "ORD-20240501-0042"]),
            10001
        );
        assert_eq!(next_order_sequence(["ORD-20240501-9999"]), 10000);
    }
}
