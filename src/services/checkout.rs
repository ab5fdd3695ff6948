use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::domain::cart::{Cart, PricedCart, PricedCartLine};
use crate::domain::money::{OrderTotals, PricingPolicy, apply_rate};
use crate::domain::order::{NewOrder, Order, OrderType, PaymentMethod};
use crate::domain::order_item::NewOrderItem;
use crate::domain::table_session::TableSession;
use crate::domain::tenant::TenantContext;
use crate::forms::checkout::CheckoutForm;
use crate::repository::{MenuReader, NotificationWriter, OrderWriter, StaffReader, TableReader};
use crate::services::cart::price_cart;
use crate::services::notifications::notify_new_order;
use crate::services::table_sessions::{SessionSettings, TableSessionCache};
use crate::services::{ServiceError, ServiceResult};

/// Preparation estimate given to every new order, in minutes.
pub const ESTIMATED_PREPARATION_MINUTES: i32 = 30;

/// Prices an order. The delivery fee only applies to delivery orders.
pub fn compute_totals(
    subtotal_cents: i64,
    order_type: OrderType,
    pricing: PricingPolicy,
) -> OrderTotals {
    let tax_cents = apply_rate(subtotal_cents, pricing.tax_rate_basis_points);
    let delivery_fee_cents = if order_type == OrderType::Delivery {
        pricing.delivery_fee_cents
    } else {
        0
    };
    OrderTotals {
        subtotal_cents,
        tax_cents,
        delivery_fee_cents,
        discount_cents: 0,
        total_cents: subtotal_cents + tax_cents + delivery_fee_cents,
    }
}

/// Data rendered on the checkout form.
#[derive(Debug, Serialize)]
pub struct CheckoutPage {
    pub cart: PricedCart,
    pub totals: OrderTotals,
    pub delivery_fee_cents: i64,
    pub tax_rate_basis_points: i64,
    /// Table supplied by the active table session.
    pub session_table_number: Option<String>,
    pub order_types: &'static [OrderType],
    pub payment_methods: &'static [PaymentMethod],
}

pub fn checkout_page<R>(
    repo: &R,
    tenant: &TenantContext,
    cart: &Cart,
    session: Option<&TableSession>,
    pricing: PricingPolicy,
) -> ServiceResult<CheckoutPage>
where
    R: MenuReader + ?Sized,
{
    let priced = price_cart(repo, tenant.tenant_id(), cart)?;
    if priced.lines.is_empty() {
        return Err(ServiceError::EmptyCart);
    }

    let totals = compute_totals(priced.total_cents, OrderType::DineIn, pricing);

    Ok(CheckoutPage {
        cart: priced,
        totals,
        delivery_fee_cents: pricing.delivery_fee_cents,
        tax_rate_basis_points: pricing.tax_rate_basis_points,
        session_table_number: session.map(|session| session.table_number.clone()),
        order_types: OrderType::ALL,
        payment_methods: PaymentMethod::ALL,
    })
}

fn snapshot(line: &PricedCartLine) -> NewOrderItem {
    NewOrderItem {
        menu_item_id: Some(line.menu_item_id),
        name: line.name.clone(),
        variant_name: line.variant_name.clone(),
        addon_names: line.addon_names.clone(),
        modifier_names: line.modifier_names.clone(),
        quantity: line.quantity as i32,
        unit_price_cents: line.unit_price_cents,
        variant_price_cents: line.variant_price_cents,
        addons_price_cents: line.addons_price_cents,
        modifiers_price_cents: line.modifiers_price_cents,
        total_price_cents: line.total_price_cents,
        special_instructions: line.special_instructions.clone(),
        responsible_area: line.responsible_area,
    }
}

/// Collaborators of a checkout that live outside the repository.
pub struct CheckoutContext<'a> {
    pub tenant: &'a TenantContext,
    pub pricing: PricingPolicy,
    pub sessions: &'a TableSessionCache,
    pub session_settings: SessionSettings,
    /// Active table session of the browser, if any.
    pub session: Option<&'a TableSession>,
}

/// Places the order for the current cart.
///
/// The cart is repriced from the catalog, the order is stored with a snapshot
/// of every line and the table session is extended. Staff are notified on a
/// best effort basis. Clearing the browser cart is left to the caller.
pub fn place_order<R>(
    repo: &R,
    ctx: &CheckoutContext<'_>,
    cart: &Cart,
    form: CheckoutForm,
) -> ServiceResult<Order>
where
    R: MenuReader + OrderWriter + StaffReader + TableReader + NotificationWriter + ?Sized,
{
    let tenant_id = ctx.tenant.tenant_id();

    let priced = price_cart(repo, tenant_id, cart)?;
    if priced.lines.is_empty() {
        return Err(ServiceError::EmptyCart);
    }

    let details = form
        .into_details(ctx.session.map(|session| session.table_number.as_str()))
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let (table_id, scan_log_id) = match (details.order_type, ctx.session) {
        (OrderType::DineIn, Some(session)) => (Some(session.table_id), session.scan_log_id),
        (OrderType::DineIn, None) => {
            let table = match details.table_number.as_deref() {
                Some(number) => repo
                    .get_table_by_number(number, tenant_id)
                    .map_err(ServiceError::from)?,
                None => None,
            };
            (table.map(|table| table.id), None)
        }
        _ => (None, None),
    };

    let now: NaiveDateTime = Local::now().naive_utc();
    let new_order = NewOrder {
        tenant_id,
        tracking_code: uuid::Uuid::new_v4().to_string(),
        table_id,
        scan_log_id,
        customer_name: details.customer_name,
        customer_phone: details.customer_phone,
        customer_email: details.customer_email,
        order_type: details.order_type,
        table_number: details.table_number,
        delivery_address: details.delivery_address,
        estimated_preparation_time: ESTIMATED_PREPARATION_MINUTES,
        totals: compute_totals(priced.total_cents, details.order_type, ctx.pricing),
        payment_method: details.payment_method,
        customer_notes: details.customer_notes,
        items: priced.lines.iter().map(snapshot).collect(),
        created_at: now,
    };

    let order = repo.create_order(&new_order).map_err(ServiceError::from)?;
    log::info!(
        "Order {} placed for tenant {} ({} item(s), total {})",
        order.order_number,
        tenant_id,
        order.total_items(),
        order.total_cents
    );

    if let Some(session) = ctx.session {
        ctx.sessions.extend(
            &session.token,
            ctx.session_settings.extension_minutes,
            now,
        );
    }

    notify_new_order(repo, &order, now);

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::CartLine;
    use crate::domain::menu::MenuItemDetail;
    use crate::domain::order::OrderStatus;
    use crate::domain::order_item::{OrderItemStatus, ResponsibleArea};
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{
        TENANT_ID, fixed_datetime, sample_item, sample_menu_item, sample_order, sample_table,
        tenant_context,
    };

    fn form(order_type: &str, table: Option<&str>) -> CheckoutForm {
        CheckoutForm {
            customer_name: "Ana Pérez".to_string(),
            customer_phone: "300 123 4567".to_string(),
            customer_email: None,
            order_type: order_type.to_string(),
            table_number: table.map(str::to_string),
            delivery_address: Some("Calle 1 # 2-3".to_string()),
            payment_method: "cash".to_string(),
            customer_notes: None,
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(
            CartLine {
                menu_item_id: 1,
                variant_id: None,
                addon_ids: Vec::new(),
                modifier_ids: Vec::new(),
                quantity: 2,
                special_instructions: None,
            },
            false,
        );
        cart
    }

    fn repo_with_menu() -> FakeRepo {
        let mut repo = FakeRepo::new();
        repo.menu_reader.expect_get_menu_item_details().returning(|_, _| {
            Ok(vec![MenuItemDetail {
                item: sample_menu_item(1, "Bandeja", 2_500_000),
                category_name: "Platos".to_string(),
                variants: Vec::new(),
                addons: Vec::new(),
                modifiers: Vec::new(),
            }])
        });
        repo.staff_reader.expect_list_staff().returning(|_| Ok(Vec::new()));
        repo.table_reader.expect_list_tables().returning(|_| Ok(Vec::new()));
        repo
    }

    fn session() -> TableSession {
        TableSession {
            token: "tok".to_string(),
            tenant_id: TENANT_ID,
            table_id: 7,
            table_number: "7".to_string(),
            table_name: "Mesa 7".to_string(),
            scan_log_id: Some(40),
            created_at: fixed_datetime(),
            last_activity: fixed_datetime(),
            expires_at: fixed_datetime(),
            ip_address: None,
            user_agent: String::new(),
            is_active: true,
            ended_at: None,
        }
    }

    #[test]
    fn totals_add_tax_and_delivery_fee() {
        let pricing = PricingPolicy::default();
        let dine_in = compute_totals(10_000, OrderType::DineIn, pricing);
        assert_eq!(dine_in.tax_cents, 1_900);
        assert_eq!(dine_in.delivery_fee_cents, 0);
        assert_eq!(dine_in.total_cents, 11_900);

        let delivery = compute_totals(10_000, OrderType::Delivery, pricing);
        assert_eq!(delivery.total_cents, 11_900 + pricing.delivery_fee_cents);
    }

    #[test]
    fn empty_cart_cannot_check_out() {
        let repo = FakeRepo::new();
        let cache = TableSessionCache::new();
        let tenant = tenant_context();
        let ctx = CheckoutContext {
            tenant: &tenant,
            pricing: PricingPolicy::default(),
            sessions: &cache,
            session_settings: SessionSettings::default(),
            session: None,
        };

        let result = place_order(&repo, &ctx, &Cart::new(), form("dine_in", Some("3")));
        assert!(matches!(result, Err(ServiceError::EmptyCart)));
    }

    #[test]
    fn invalid_form_is_reported_before_writing() {
        let mut repo = repo_with_menu();
        repo.order_writer.expect_create_order().never();
        let cache = TableSessionCache::new();
        let tenant = tenant_context();
        let ctx = CheckoutContext {
            tenant: &tenant,
            pricing: PricingPolicy::default(),
            sessions: &cache,
            session_settings: SessionSettings::default(),
            session: None,
        };

        let result = place_order(&repo, &ctx, &cart(), form("dine_in", None));
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn session_supplies_table_and_scan_log() {
        let mut repo = repo_with_menu();
        repo.order_writer
            .expect_create_order()
            .times(1)
            .withf(|order| {
                order.table_id == Some(7)
                    && order.scan_log_id == Some(40)
                    && order.table_number.as_deref() == Some("7")
                    && order.totals.subtotal_cents == 5_000_000
                    && order.items[0].unit_price_cents == 2_500_000
                    && order.estimated_preparation_time == ESTIMATED_PREPARATION_MINUTES
            })
            .returning(|_| {
                Ok(sample_order(
                    1,
                    OrderStatus::Pending,
                    vec![sample_item(
                        1,
                        1,
                        ResponsibleArea::Kitchen,
                        OrderItemStatus::Pending,
                    )],
                ))
            });
        repo.table_reader
            .expect_get_table_by_id()
            .returning(|id, _| Ok(Some(sample_table(id, "7"))));

        let cache = TableSessionCache::new();
        let session = session();
        cache.insert(session.clone());
        let tenant = tenant_context();
        let ctx = CheckoutContext {
            tenant: &tenant,
            pricing: PricingPolicy::default(),
            sessions: &cache,
            session_settings: SessionSettings::default(),
            session: Some(&session),
        };

        let order = place_order(&repo, &ctx, &cart(), form("dine_in", Some("99")))
            .expect("order placed");
        assert_eq!(order.id, 1);
        assert!(
            cache
                .get("tok")
                .is_some_and(|cached| cached.expires_at > session.expires_at)
        );
    }

    #[test]
    fn takeaway_orders_have_no_table() {
        let mut repo = repo_with_menu();
        repo.order_writer
            .expect_create_order()
            .withf(|order| order.table_id.is_none() && order.totals.delivery_fee_cents == 0)
            .returning(|_| Ok(sample_order(2, OrderStatus::Pending, Vec::new())));
        repo.table_reader
            .expect_get_table_by_id()
            .returning(|id, _| Ok(Some(sample_table(id, "1"))));

        let cache = TableSessionCache::new();
        let tenant = tenant_context();
        let ctx = CheckoutContext {
            tenant: &tenant,
            pricing: PricingPolicy::default(),
            sessions: &cache,
            session_settings: SessionSettings::default(),
            session: None,
        };

        assert!(place_order(&repo, &ctx, &cart(), form("takeaway", None)).is_ok());
    }
}
