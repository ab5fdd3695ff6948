use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

labeled_enum! {
    /// Station responsible for preparing an item.
    pub enum ResponsibleArea {
        Kitchen => ("kitchen", "Cocina"),
        Bar => ("bar", "Bar"),
    }
    fallback = Kitchen;
}

labeled_enum! {
    /// Fine-grained preparation state of a single order line.
    pub enum OrderItemStatus {
        Pending => ("pending", "Pendiente"),
        Confirmed => ("confirmed", "Confirmado"),
        PreparingKitchen => ("preparing_kitchen", "Preparando en cocina"),
        Cooking => ("cooking", "Cocinando"),
        Plating => ("plating", "Emplatando"),
        KitchenReady => ("kitchen_ready", "Listo en cocina"),
        PreparingBar => ("preparing_bar", "Preparando en bar"),
        Mixing => ("mixing", "Mezclando"),
        BarReady => ("bar_ready", "Listo en bar"),
        Served => ("served", "Servido"),
        Cancelled => ("cancelled", "Cancelado"),
    }
    fallback = Pending;
}

const KITCHEN_FLOW: &[OrderItemStatus] = &[
    OrderItemStatus::Pending,
    OrderItemStatus::Confirmed,
    OrderItemStatus::PreparingKitchen,
    OrderItemStatus::Cooking,
    OrderItemStatus::Plating,
    OrderItemStatus::KitchenReady,
    OrderItemStatus::Served,
];

const BAR_FLOW: &[OrderItemStatus] = &[
    OrderItemStatus::Pending,
    OrderItemStatus::Confirmed,
    OrderItemStatus::PreparingBar,
    OrderItemStatus::Mixing,
    OrderItemStatus::BarReady,
    OrderItemStatus::Served,
];

const KITCHEN_WORK: &[OrderItemStatus] = &[
    OrderItemStatus::Confirmed,
    OrderItemStatus::PreparingKitchen,
    OrderItemStatus::Cooking,
    OrderItemStatus::Plating,
];

const BAR_WORK: &[OrderItemStatus] = &[
    OrderItemStatus::Confirmed,
    OrderItemStatus::PreparingBar,
    OrderItemStatus::Mixing,
];

impl ResponsibleArea {
    /// Ordered states an item of this area moves through.
    pub fn flow(self) -> &'static [OrderItemStatus] {
        match self {
            ResponsibleArea::Kitchen => KITCHEN_FLOW,
            ResponsibleArea::Bar => BAR_FLOW,
        }
    }

    /// States listed as outstanding work on the station dashboard.
    pub fn work_statuses(self) -> &'static [OrderItemStatus] {
        match self {
            ResponsibleArea::Kitchen => KITCHEN_WORK,
            ResponsibleArea::Bar => BAR_WORK,
        }
    }

    /// First in-preparation state, used by the "start" shortcut.
    pub fn start_status(self) -> OrderItemStatus {
        match self {
            ResponsibleArea::Kitchen => OrderItemStatus::PreparingKitchen,
            ResponsibleArea::Bar => OrderItemStatus::PreparingBar,
        }
    }

    pub fn ready_status(self) -> OrderItemStatus {
        match self {
            ResponsibleArea::Kitchen => OrderItemStatus::KitchenReady,
            ResponsibleArea::Bar => OrderItemStatus::BarReady,
        }
    }
}

impl OrderItemStatus {
    /// Being actively prepared at a station.
    pub fn is_in_preparation(self) -> bool {
        matches!(
            self,
            OrderItemStatus::PreparingKitchen
                | OrderItemStatus::Cooking
                | OrderItemStatus::Plating
                | OrderItemStatus::PreparingBar
                | OrderItemStatus::Mixing
        )
    }

    /// Prepared and waiting for a waiter.
    pub fn is_ready_for_service(self) -> bool {
        matches!(
            self,
            OrderItemStatus::KitchenReady | OrderItemStatus::BarReady
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderItemStatus::Served | OrderItemStatus::Cancelled)
    }

    pub fn progress_percentage(self) -> u8 {
        match self {
            OrderItemStatus::Pending | OrderItemStatus::Cancelled => 0,
            OrderItemStatus::Confirmed => 20,
            OrderItemStatus::PreparingKitchen | OrderItemStatus::PreparingBar => 40,
            OrderItemStatus::Cooking => 60,
            OrderItemStatus::Mixing => 70,
            OrderItemStatus::Plating => 80,
            OrderItemStatus::KitchenReady | OrderItemStatus::BarReady => 90,
            OrderItemStatus::Served => 100,
        }
    }

    /// Whether an item of `area` may move from `self` to `next`.
    ///
    /// Moves go forward along the area's flow, possibly skipping steps.
    /// Cancellation is allowed from any non-terminal state. Serving is only
    /// allowed once the item is ready.
    pub fn can_transition_to(self, next: OrderItemStatus, area: ResponsibleArea) -> bool {
        if self.is_terminal() || self == next {
            return false;
        }
        if next == OrderItemStatus::Cancelled {
            return true;
        }
        if next == OrderItemStatus::Served {
            return self == area.ready_status();
        }

        let flow = area.flow();
        match (
            flow.iter().position(|status| *status == self),
            flow.iter().position(|status| *status == next),
        ) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

/// Line of a placed order. Catalog values are snapshotted at checkout.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub menu_item_id: Option<i32>,
    pub name: String,
    pub variant_name: Option<String>,
    pub addon_names: Vec<String>,
    pub modifier_names: Vec<String>,
    pub quantity: i32,
    /// Base unit price of the menu item at checkout.
    pub unit_price_cents: i64,
    pub variant_price_cents: i64,
    pub addons_price_cents: i64,
    pub modifiers_price_cents: i64,
    pub total_price_cents: i64,
    pub special_instructions: Option<String>,
    pub responsible_area: ResponsibleArea,
    pub status: OrderItemStatus,
    pub preparation_started_at: Option<NaiveDateTime>,
    pub preparation_completed_at: Option<NaiveDateTime>,
    pub served_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl OrderItem {
    /// Human readable summary of the chosen options.
    pub fn options_summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(variant) = self.variant_name.as_deref() {
            parts.push(variant.to_string());
        }
        parts.extend(self.addon_names.iter().map(|name| format!("+ {name}")));
        parts.extend(self.modifier_names.iter().cloned());
        parts.join(", ")
    }

    /// Minutes spent preparing, when both ends are known.
    pub fn preparation_minutes(&self) -> Option<i64> {
        match (self.preparation_started_at, self.preparation_completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_minutes()),
            _ => None,
        }
    }

    /// Whether the line still counts towards the order.
    pub fn is_live(&self) -> bool {
        self.status != OrderItemStatus::Cancelled
    }

    /// Computes the timestamps the item gets when it enters `next` at `now`.
    pub fn transition(&self, next: OrderItemStatus, now: NaiveDateTime) -> OrderItemStatusUpdate {
        let mut update = OrderItemStatusUpdate {
            item_id: self.id,
            status: next,
            preparation_started_at: self.preparation_started_at,
            preparation_completed_at: self.preparation_completed_at,
            served_at: self.served_at,
            updated_at: now,
        };

        if next.is_in_preparation() && update.preparation_started_at.is_none() {
            update.preparation_started_at = Some(now);
        }
        if next.is_ready_for_service() {
            if update.preparation_started_at.is_none() {
                update.preparation_started_at = Some(now);
            }
            update.preparation_completed_at = Some(now);
        }
        if next == OrderItemStatus::Served {
            update.served_at = Some(now);
        }

        update
    }

    /// Milestones reached by the item, oldest first.
    pub fn timeline(&self) -> Vec<ItemTimelineEvent> {
        let milestones = [
            (Some(self.created_at), "Pedido recibido"),
            (self.preparation_started_at, "Preparación iniciada"),
            (self.preparation_completed_at, "Listo para servir"),
            (self.served_at, "Servido"),
        ];

        milestones
            .into_iter()
            .filter_map(|(at, label)| at.map(|at| ItemTimelineEvent { label, at }))
            .collect()
    }
}

/// A point in the life of an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemTimelineEvent {
    pub label: &'static str,
    pub at: NaiveDateTime,
}

/// Payload required to insert an order line.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub menu_item_id: Option<i32>,
    pub name: String,
    pub variant_name: Option<String>,
    pub addon_names: Vec<String>,
    pub modifier_names: Vec<String>,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub variant_price_cents: i64,
    pub addons_price_cents: i64,
    pub modifiers_price_cents: i64,
    pub total_price_cents: i64,
    pub special_instructions: Option<String>,
    pub responsible_area: ResponsibleArea,
}

/// New state and timestamps written for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemStatusUpdate {
    pub item_id: i32,
    pub status: OrderItemStatus,
    pub preparation_started_at: Option<NaiveDateTime>,
    pub preparation_completed_at: Option<NaiveDateTime>,
    pub served_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

/// Progress of one area across the items of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AreaProgress {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub ready: usize,
    pub served: usize,
    pub percentage: u8,
}

impl AreaProgress {
    /// Aggregates the live items of `area`.
    pub fn for_area<'a>(items: impl IntoIterator<Item = &'a OrderItem>, area: ResponsibleArea) -> Self {
        let mut progress = AreaProgress::default();
        let mut sum: usize = 0;

        for item in items
            .into_iter()
            .filter(|item| item.responsible_area == area && item.is_live())
        {
            progress.total += 1;
            sum += item.status.progress_percentage() as usize;
            match item.status {
                OrderItemStatus::Pending | OrderItemStatus::Confirmed => progress.pending += 1,
                OrderItemStatus::Served => progress.served += 1,
                status if status.is_ready_for_service() => progress.ready += 1,
                _ => progress.in_progress += 1,
            }
        }

        if progress.total > 0 {
            progress.percentage = (sum / progress.total) as u8;
        }
        progress
    }
}

labeled_enum! {
    /// Coarse summary of where the items of an order stand.
    pub enum ItemsSummary {
        NoItems => ("no_items", "Sin productos"),
        Pending => ("pending", "Pendiente"),
        InProgress => ("in_progress", "En preparación"),
        PartialReady => ("partial_ready", "Parcialmente listo"),
        AllReady => ("all_ready", "Listo para servir"),
        Completed => ("completed", "Completado"),
    }
    fallback = NoItems;
}

impl ItemsSummary {
    pub fn of<'a>(items: impl IntoIterator<Item = &'a OrderItem>) -> Self {
        let live: Vec<&OrderItem> = items.into_iter().filter(|item| item.is_live()).collect();
        if live.is_empty() {
            return ItemsSummary::NoItems;
        }

        let served = live
            .iter()
            .filter(|item| item.status == OrderItemStatus::Served)
            .count();
        let done = live
            .iter()
            .filter(|item| {
                item.status == OrderItemStatus::Served || item.status.is_ready_for_service()
            })
            .count();
        let started = live
            .iter()
            .filter(|item| item.status.is_in_preparation())
            .count();

        if served == live.len() {
            ItemsSummary::Completed
        } else if done == live.len() {
            ItemsSummary::AllReady
        } else if done > 0 {
            ItemsSummary::PartialReady
        } else if started > 0 {
            ItemsSummary::InProgress
        } else {
            ItemsSummary::Pending
        }
    }
}
