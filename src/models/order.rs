use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::order::{
    NewOrder as DomainNewOrder, Order as DomainOrder, OrderStatus,
    OrderStatusHistoryEntry as DomainOrderStatusHistoryEntry, PaymentStatus,
};
use crate::domain::order_item::{
    NewOrderItem as DomainNewOrderItem, OrderItem as DomainOrderItem, OrderItemStatus,
};
use crate::models::menu::{decode_labels, encode_labels};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub tenant_id: i32,
    pub order_number: String,
    pub tracking_code: String,
    pub table_id: Option<i32>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub order_type: String,
    pub table_number: Option<String>,
    pub delivery_address: Option<String>,
    pub status: String,
    pub estimated_preparation_time: i32,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub delivery_fee_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: String,
    pub payment_status: String,
    pub customer_notes: Option<String>,
    pub internal_notes: Option<String>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub confirmed_at: Option<NaiveDateTime>,
    pub ready_at: Option<NaiveDateTime>,
    pub delivered_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(belongs_to(Order, foreign_key = order_id))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub menu_item_id: Option<i32>,
    pub name: String,
    pub variant_name: Option<String>,
    pub addon_names: String,
    pub modifier_names: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub variant_price_cents: i64,
    pub addons_price_cents: i64,
    pub modifiers_price_cents: i64,
    pub total_price_cents: i64,
    pub special_instructions: Option<String>,
    pub responsible_area: String,
    pub status: String,
    pub preparation_started_at: Option<NaiveDateTime>,
    pub preparation_completed_at: Option<NaiveDateTime>,
    pub served_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::order_status_history)]
#[diesel(belongs_to(Order, foreign_key = order_id))]
pub struct OrderStatusHistory {
    pub id: i32,
    pub order_id: i32,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub changed_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub tenant_id: i32,
    pub order_number: &'a str,
    pub tracking_code: &'a str,
    pub table_id: Option<i32>,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub customer_email: Option<&'a str>,
    pub order_type: &'a str,
    pub table_number: Option<&'a str>,
    pub delivery_address: Option<&'a str>,
    pub status: &'a str,
    pub estimated_preparation_time: i32,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub delivery_fee_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: &'a str,
    pub payment_status: &'a str,
    pub customer_notes: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem<'a> {
    pub order_id: i32,
    pub menu_item_id: Option<i32>,
    pub name: &'a str,
    pub variant_name: Option<&'a str>,
    pub addon_names: String,
    pub modifier_names: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub variant_price_cents: i64,
    pub addons_price_cents: i64,
    pub modifiers_price_cents: i64,
    pub total_price_cents: i64,
    pub special_instructions: Option<&'a str>,
    pub responsible_area: &'a str,
    pub status: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_status_history)]
pub struct NewOrderStatusHistory<'a> {
    pub order_id: i32,
    pub previous_status: Option<&'a str>,
    pub new_status: &'a str,
    pub changed_by: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

impl Order {
    pub fn into_domain(self, items: Vec<OrderItem>) -> DomainOrder {
        DomainOrder {
            id: self.id,
            tenant_id: self.tenant_id,
            order_number: self.order_number,
            tracking_code: self.tracking_code,
            table_id: self.table_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            order_type: self.order_type.as_str().into(),
            table_number: self.table_number,
            delivery_address: self.delivery_address,
            status: self.status.as_str().into(),
            estimated_preparation_time: self.estimated_preparation_time,
            subtotal_cents: self.subtotal_cents,
            tax_cents: self.tax_cents,
            delivery_fee_cents: self.delivery_fee_cents,
            discount_cents: self.discount_cents,
            total_cents: self.total_cents,
            payment_method: self.payment_method.as_str().into(),
            payment_status: self.payment_status.as_str().into(),
            customer_notes: self.customer_notes,
            internal_notes: self.internal_notes,
            rating: self.rating,
            review: self.review,
            created_at: self.created_at,
            updated_at: self.updated_at,
            confirmed_at: self.confirmed_at,
            ready_at: self.ready_at,
            delivered_at: self.delivered_at,
            items: items.into_iter().map(DomainOrderItem::from).collect(),
        }
    }
}

impl From<(Order, Vec<OrderItem>)> for DomainOrder {
    fn from(value: (Order, Vec<OrderItem>)) -> Self {
        value.0.into_domain(value.1)
    }
}

impl From<OrderItem> for DomainOrderItem {
    fn from(value: OrderItem) -> Self {
        Self {
            id: value.id,
            order_id: value.order_id,
            menu_item_id: value.menu_item_id,
            name: value.name,
            variant_name: value.variant_name,
            addon_names: decode_labels(&value.addon_names),
            modifier_names: decode_labels(&value.modifier_names),
            quantity: value.quantity,
            unit_price_cents: value.unit_price_cents,
            variant_price_cents: value.variant_price_cents,
            addons_price_cents: value.addons_price_cents,
            modifiers_price_cents: value.modifiers_price_cents,
            total_price_cents: value.total_price_cents,
            special_instructions: value.special_instructions,
            responsible_area: value.responsible_area.as_str().into(),
            status: value.status.as_str().into(),
            preparation_started_at: value.preparation_started_at,
            preparation_completed_at: value.preparation_completed_at,
            served_at: value.served_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<OrderStatusHistory> for DomainOrderStatusHistoryEntry {
    fn from(value: OrderStatusHistory) -> Self {
        Self {
            id: value.id,
            order_id: value.order_id,
            previous_status: value.previous_status.as_deref().map(Into::into),
            new_status: value.new_status.as_str().into(),
            changed_by: value.changed_by,
            notes: value.notes,
            created_at: value.created_at,
        }
    }
}

impl<'a> NewOrder<'a> {
    pub fn from_domain(order_number: &'a str, value: &'a DomainNewOrder) -> Self {
        Self {
            tenant_id: value.tenant_id,
            order_number,
            tracking_code: value.tracking_code.as_str(),
            table_id: value.table_id,
            customer_name: value.customer_name.as_str(),
            customer_phone: value.customer_phone.as_str(),
            customer_email: value.customer_email.as_deref(),
            order_type: value.order_type.into(),
            table_number: value.table_number.as_deref(),
            delivery_address: value.delivery_address.as_deref(),
            status: OrderStatus::Pending.into(),
            estimated_preparation_time: value.estimated_preparation_time,
            subtotal_cents: value.totals.subtotal_cents,
            tax_cents: value.totals.tax_cents,
            delivery_fee_cents: value.totals.delivery_fee_cents,
            discount_cents: value.totals.discount_cents,
            total_cents: value.totals.total_cents,
            payment_method: value.payment_method.into(),
            payment_status: PaymentStatus::Pending.into(),
            customer_notes: value.customer_notes.as_deref(),
            created_at: value.created_at,
            updated_at: value.created_at,
        }
    }
}

impl<'a> NewOrderItem<'a> {
    pub fn from_domain(order_id: i32, created_at: NaiveDateTime, value: &'a DomainNewOrderItem) -> Self {
        Self {
            order_id,
            menu_item_id: value.menu_item_id,
            name: value.name.as_str(),
            variant_name: value.variant_name.as_deref(),
            addon_names: encode_labels(&value.addon_names),
            modifier_names: encode_labels(&value.modifier_names),
            quantity: value.quantity,
            unit_price_cents: value.unit_price_cents,
            variant_price_cents: value.variant_price_cents,
            addons_price_cents: value.addons_price_cents,
            modifiers_price_cents: value.modifiers_price_cents,
            total_price_cents: value.total_price_cents,
            special_instructions: value.special_instructions.as_deref(),
            responsible_area: value.responsible_area.into(),
            status: OrderItemStatus::Pending.into(),
            created_at,
            updated_at: created_at,
        }
    }
}
