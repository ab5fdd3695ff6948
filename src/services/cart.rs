use std::collections::HashMap;

use crate::domain::cart::{Cart, PricedCart, PricedCartLine};
use crate::domain::menu::MenuItemDetail;
use crate::forms::cart::{AddToCartForm, CartFormError, RemoveCartForm, UpdateCartForm};
use crate::repository::MenuReader;
use crate::services::{ServiceError, ServiceResult};

/// Browser session key of the cart of a tenant.
pub fn cart_key(tenant_id: i32) -> String {
    format!("cart:{tenant_id}")
}

/// Outcome of a cart mutation, echoed to the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartUpdate {
    pub message: String,
    pub cart_total_items: u32,
    pub cart_total_price_cents: i64,
}

impl CartUpdate {
    fn new(message: impl Into<String>, priced: &PricedCart) -> Self {
        Self {
            message: message.into(),
            cart_total_items: priced.total_quantity,
            cart_total_price_cents: priced.total_cents,
        }
    }
}

fn form_error(err: CartFormError) -> ServiceError {
    ServiceError::Form(err.to_string())
}

/// Prices `cart` against the current catalog of the tenant.
///
/// Options that do not belong to the item are ignored. Lines whose item is
/// gone or no longer available are left out.
pub fn price_cart<R>(repo: &R, tenant_id: i32, cart: &Cart) -> ServiceResult<PricedCart>
where
    R: MenuReader + ?Sized,
{
    if cart.is_empty() {
        return Ok(PricedCart::default());
    }

    let details: HashMap<i32, MenuItemDetail> = repo
        .get_menu_item_details(tenant_id, &cart.menu_item_ids())
        .map_err(ServiceError::from)?
        .into_iter()
        .map(|detail| (detail.item.id, detail))
        .collect();

    let mut lines = Vec::with_capacity(cart.distinct_items());
    for (key, line) in cart.lines() {
        let Some(detail) = details.get(&line.menu_item_id) else {
            continue;
        };
        let item = &detail.item;
        if !item.is_available {
            continue;
        }

        let variant = line.variant_id.and_then(|id| detail.variant(id));
        let addons: Vec<_> = line
            .addon_ids
            .iter()
            .filter_map(|id| detail.addon(*id))
            .collect();
        let modifiers: Vec<_> = line
            .modifier_ids
            .iter()
            .filter_map(|id| detail.modifier(*id))
            .collect();

        let base_price_cents = item.current_price_cents();
        let variant_price_cents = variant.map_or(0, |variant| variant.price_modifier_cents);
        let addons_price_cents: i64 = addons.iter().map(|addon| addon.price_cents).sum();
        let modifiers_price_cents: i64 = modifiers
            .iter()
            .map(|modifier| modifier.price_modifier_cents)
            .sum();
        let unit_price_cents =
            base_price_cents + variant_price_cents + addons_price_cents + modifiers_price_cents;

        lines.push(PricedCartLine {
            key: key.clone(),
            menu_item_id: item.id,
            name: item.name.clone(),
            slug: item.slug.clone(),
            category_name: detail.category_name.clone(),
            variant_id: variant.map(|variant| variant.id),
            variant_name: variant.map(|variant| variant.name.clone()),
            addon_names: addons.iter().map(|addon| addon.name.clone()).collect(),
            modifier_names: modifiers
                .iter()
                .map(|modifier| modifier.name.clone())
                .collect(),
            quantity: line.quantity,
            base_price_cents,
            variant_price_cents,
            addons_price_cents,
            modifiers_price_cents,
            unit_price_cents,
            total_price_cents: unit_price_cents * line.quantity as i64,
            responsible_area: item.responsible_area,
            special_instructions: line.special_instructions.clone(),
        });
    }

    Ok(PricedCart::from_lines(lines))
}

/// Quantity of `menu_item_id` held by cart lines other than `key`.
fn quantity_elsewhere(cart: &Cart, menu_item_id: i32, key: &str) -> u32 {
    cart.lines()
        .filter(|(existing, line)| line.menu_item_id == menu_item_id && existing.as_str() != key)
        .fold(0u32, |total, (_, line)| total.saturating_add(line.quantity))
}

/// Adds an item with its chosen options to the cart.
pub fn add_to_cart<R>(
    repo: &R,
    tenant_id: i32,
    cart: &mut Cart,
    form: AddToCartForm,
) -> ServiceResult<CartUpdate>
where
    R: MenuReader + ?Sized,
{
    let (line, override_quantity) = form.into_cart_line().map_err(form_error)?;

    let item = repo
        .get_menu_item_by_id(line.menu_item_id, tenant_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    if !item.is_orderable() {
        return Err(ServiceError::Form(format!(
            "{} no está disponible en este momento.",
            item.name
        )));
    }

    let key = line.key();
    let already = cart
        .lines()
        .find(|(existing, _)| **existing == key)
        .map_or(0, |(_, existing)| existing.quantity);
    let requested = if override_quantity {
        line.quantity
    } else {
        already.saturating_add(line.quantity)
    };
    let total = quantity_elsewhere(cart, item.id, &key).saturating_add(requested);
    if !item.can_order(total) {
        return Err(ServiceError::Form(format!(
            "No hay suficiente stock de {}.",
            item.name
        )));
    }

    let name = item.name.clone();
    cart.add(line, override_quantity);
    let priced = price_cart(repo, tenant_id, cart)?;

    Ok(CartUpdate::new(format!("{name} agregado al carrito."), &priced))
}

/// Changes the quantity of a line; zero or less removes it.
pub fn update_cart_line<R>(
    repo: &R,
    tenant_id: i32,
    cart: &mut Cart,
    form: UpdateCartForm,
) -> ServiceResult<CartUpdate>
where
    R: MenuReader + ?Sized,
{
    let menu_item_id = cart
        .lines()
        .find(|(existing, _)| **existing == form.key)
        .map(|(_, line)| line.menu_item_id)
        .ok_or_else(|| form_error(CartFormError::UnknownLine))?;

    if form.quantity > 0 {
        let item = repo
            .get_menu_item_by_id(menu_item_id, tenant_id)
            .map_err(ServiceError::from)?
            .ok_or(ServiceError::NotFound)?;
        let requested = u32::try_from(form.quantity).unwrap_or(u32::MAX);
        let total = quantity_elsewhere(cart, menu_item_id, &form.key).saturating_add(requested);
        if !item.can_order(total) {
            return Err(ServiceError::Form(format!(
                "No hay suficiente stock de {}.",
                item.name
            )));
        }
    }

    if !cart.update(&form.key, form.quantity) {
        return Err(form_error(CartFormError::UnknownLine));
    }
    let priced = price_cart(repo, tenant_id, cart)?;
    let message = if form.quantity <= 0 {
        "Producto eliminado del carrito."
    } else {
        "Carrito actualizado."
    };
    Ok(CartUpdate::new(message, &priced))
}

pub fn remove_cart_line<R>(
    repo: &R,
    tenant_id: i32,
    cart: &mut Cart,
    form: RemoveCartForm,
) -> ServiceResult<CartUpdate>
where
    R: MenuReader + ?Sized,
{
    if !cart.remove(&form.key) {
        return Err(form_error(CartFormError::UnknownLine));
    }
    let priced = price_cart(repo, tenant_id, cart)?;
    Ok(CartUpdate::new("Producto eliminado del carrito.", &priced))
}

pub fn clear_cart(cart: &mut Cart) -> CartUpdate {
    cart.clear();
    CartUpdate::new("Carrito vaciado.", &PricedCart::default())
}
