use chrono::Local;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::menu::{
    AddonType, ModifierType, NewMenuAddon, NewMenuCategory, NewMenuItem, NewMenuModifier,
    NewMenuVariant, UpdateMenuCategory, UpdateMenuItem, VariantType,
};
use crate::domain::money::parse_cents;
use crate::domain::order_item::ResponsibleArea;
use crate::forms::{
    optional_inline, optional_multiline, parse_optional_time, sanitize_inline_text, slugify,
    unique_ids,
};

const NAME_MAX_LEN: u64 = 200;
const SHORT_DESCRIPTION_MAX_LEN: u64 = 300;
const DESCRIPTION_MAX_LEN: u64 = 2048;

/// Result type returned by the menu form helpers.
pub type MenuFormResult<T> = Result<T, MenuFormError>;

#[derive(Debug, Error)]
pub enum MenuFormError {
    #[error("Datos inválidos: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("El nombre es obligatorio")]
    EmptyName,
    #[error("No se pudo generar un identificador a partir del nombre")]
    EmptySlug,
    #[error("Precio inválido: `{0}`")]
    InvalidPrice(String),
    #[error("El precio con descuento debe ser menor al precio base")]
    DiscountNotLower,
    #[error("Valor numérico inválido en {field}: `{value}`")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Hora inválida: `{0}`")]
    InvalidTime(String),
    #[error("Área responsable inválida")]
    InvalidArea,
    #[error("Tipo inválido: `{0}`")]
    InvalidType(String),
}

fn required_name(raw: &str) -> MenuFormResult<String> {
    let name = sanitize_inline_text(raw);
    if name.is_empty() {
        return Err(MenuFormError::EmptyName);
    }
    Ok(name)
}

fn slug_for(name: &str, explicit: Option<&str>) -> MenuFormResult<String> {
    let slug = match explicit.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => slugify(value),
        None => slugify(name),
    };
    if slug.is_empty() {
        return Err(MenuFormError::EmptySlug);
    }
    Ok(slug)
}

fn price(raw: &str) -> MenuFormResult<i64> {
    parse_cents(raw)
        .filter(|cents| *cents >= 0)
        .ok_or_else(|| MenuFormError::InvalidPrice(raw.trim().to_string()))
}

/// Signed price used by variants and modifiers.
fn price_delta(raw: &str) -> MenuFormResult<i64> {
    if raw.trim().is_empty() {
        return Ok(0);
    }
    parse_cents(raw).ok_or_else(|| MenuFormError::InvalidPrice(raw.trim().to_string()))
}

fn optional_price(raw: Option<&str>) -> MenuFormResult<Option<i64>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => price(value).map(Some),
        None => Ok(None),
    }
}

fn optional_number(raw: Option<&str>, field: &'static str) -> MenuFormResult<Option<i32>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<i32>()
            .ok()
            .filter(|number| *number >= 0)
            .map(Some)
            .ok_or_else(|| MenuFormError::InvalidNumber {
                field,
                value: value.to_string(),
            }),
        None => Ok(None),
    }
}

/// Splits a comma separated allergen list.
fn parse_allergens(raw: &str) -> Vec<String> {
    let mut allergens: Vec<String> = Vec::new();
    for allergen in raw.split(',').map(sanitize_inline_text) {
        if !allergen.is_empty() && !allergens.contains(&allergen) {
            allergens.push(allergen);
        }
    }
    allergens
}

/// Form payload for creating or editing a menu category.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MenuCategoryForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub available_from: Option<String>,
    #[serde(default)]
    pub available_until: Option<String>,
}

impl MenuCategoryForm {
    pub fn into_new_category(self, tenant_id: i32) -> MenuFormResult<NewMenuCategory> {
        self.validate()?;

        let name = required_name(&self.name)?;
        let slug = slug_for(&name, self.slug.as_deref())?;
        let available_from =
            parse_optional_time(self.available_from.as_deref()).map_err(MenuFormError::InvalidTime)?;
        let available_until = parse_optional_time(self.available_until.as_deref())
            .map_err(MenuFormError::InvalidTime)?;

        let mut category = NewMenuCategory::new(tenant_id, name, slug).with_sort_order(self.sort_order);
        if let Some(description) = optional_multiline(self.description.as_deref()) {
            category = category.with_description(description);
        }
        category.is_active = self.is_active;
        category.available_from = available_from;
        category.available_until = available_until;

        Ok(category)
    }

    pub fn into_update_category(self) -> MenuFormResult<UpdateMenuCategory> {
        self.validate()?;

        Ok(UpdateMenuCategory {
            name: required_name(&self.name)?,
            description: optional_multiline(self.description.as_deref()),
            sort_order: self.sort_order,
            is_active: self.is_active,
            available_from: parse_optional_time(self.available_from.as_deref())
                .map_err(MenuFormError::InvalidTime)?,
            available_until: parse_optional_time(self.available_until.as_deref())
                .map_err(MenuFormError::InvalidTime)?,
            updated_at: Local::now().naive_utc(),
        })
    }
}

/// Form payload for creating or editing a menu item.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MenuItemForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = SHORT_DESCRIPTION_MAX_LEN))]
    pub short_description: Option<String>,
    pub base_price: String,
    #[serde(default)]
    pub discounted_price: Option<String>,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub is_featured: bool,
    /// Blank means unlimited stock.
    #[serde(default)]
    pub stock_quantity: Option<String>,
    #[serde(default)]
    pub calories: Option<String>,
    #[serde(default)]
    pub preparation_time: Option<String>,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_vegan: bool,
    #[serde(default)]
    pub is_gluten_free: bool,
    #[serde(default)]
    pub is_spicy: bool,
    #[serde(default)]
    pub allergens: String,
    #[serde(default)]
    pub responsible_area: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// Normalized values shared by item creation and edition.
struct ItemFields {
    name: String,
    base_price_cents: i64,
    discounted_price_cents: Option<i64>,
    stock_quantity: Option<i32>,
    calories: Option<i32>,
    preparation_time: Option<i32>,
    responsible_area: ResponsibleArea,
}

impl MenuItemForm {
    fn fields(&self) -> MenuFormResult<ItemFields> {
        self.validate()?;

        let base_price_cents = price(&self.base_price)?;
        let discounted_price_cents = optional_price(self.discounted_price.as_deref())?;
        if discounted_price_cents.is_some_and(|discounted| discounted >= base_price_cents) {
            return Err(MenuFormError::DiscountNotLower);
        }

        let responsible_area = match self.responsible_area.trim() {
            "" => ResponsibleArea::Kitchen,
            value => ResponsibleArea::parse(value).ok_or(MenuFormError::InvalidArea)?,
        };

        Ok(ItemFields {
            name: required_name(&self.name)?,
            base_price_cents,
            discounted_price_cents,
            stock_quantity: optional_number(self.stock_quantity.as_deref(), "stock")?,
            calories: optional_number(self.calories.as_deref(), "calorías")?,
            preparation_time: optional_number(
                self.preparation_time.as_deref(),
                "tiempo de preparación",
            )?,
            responsible_area,
        })
    }

    pub fn into_new_item(self, tenant_id: i32) -> MenuFormResult<NewMenuItem> {
        let fields = self.fields()?;
        let slug = slug_for(&fields.name, self.slug.as_deref())?;

        let mut item = NewMenuItem::new(
            tenant_id,
            self.category_id,
            fields.name,
            slug,
            fields.base_price_cents,
        )
        .with_area(fields.responsible_area);
        item.description = optional_multiline(self.description.as_deref());
        item.short_description = optional_inline(self.short_description.as_deref());
        item.discounted_price_cents = fields.discounted_price_cents;
        item.is_available = self.is_available;
        item.is_featured = self.is_featured;
        item.stock_quantity = fields.stock_quantity;
        item.calories = fields.calories;
        item.preparation_time = fields.preparation_time;
        item.is_vegetarian = self.is_vegetarian || self.is_vegan;
        item.is_vegan = self.is_vegan;
        item.is_gluten_free = self.is_gluten_free;
        item.is_spicy = self.is_spicy;
        item.allergens = parse_allergens(&self.allergens);
        item.sort_order = self.sort_order;

        Ok(item)
    }

    pub fn into_update_item(self) -> MenuFormResult<UpdateMenuItem> {
        let fields = self.fields()?;

        Ok(UpdateMenuItem {
            category_id: self.category_id,
            name: fields.name,
            description: optional_multiline(self.description.as_deref()),
            short_description: optional_inline(self.short_description.as_deref()),
            base_price_cents: fields.base_price_cents,
            discounted_price_cents: fields.discounted_price_cents,
            is_available: self.is_available,
            is_featured: self.is_featured,
            stock_quantity: fields.stock_quantity,
            calories: fields.calories,
            preparation_time: fields.preparation_time,
            is_vegetarian: self.is_vegetarian || self.is_vegan,
            is_vegan: self.is_vegan,
            is_gluten_free: self.is_gluten_free,
            is_spicy: self.is_spicy,
            allergens: parse_allergens(&self.allergens),
            responsible_area: fields.responsible_area,
            sort_order: self.sort_order,
            updated_at: Local::now().naive_utc(),
        })
    }
}

/// Form payload for adding a variant to an item.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AddVariantForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[serde(default)]
    pub variant_type: String,
    #[serde(default)]
    pub price_modifier: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl AddVariantForm {
    pub fn into_new_variant(self, menu_item_id: i32) -> MenuFormResult<NewMenuVariant> {
        self.validate()?;

        let variant_type = match self.variant_type.trim() {
            "" => VariantType::Size,
            value => VariantType::parse(value)
                .ok_or_else(|| MenuFormError::InvalidType(value.to_string()))?,
        };

        Ok(NewMenuVariant {
            menu_item_id,
            variant_type,
            name: required_name(&self.name)?,
            price_modifier_cents: price_delta(&self.price_modifier)?,
            is_default: self.is_default,
            is_available: true,
            sort_order: self.sort_order,
        })
    }
}

fn default_max_quantity() -> i32 {
    1
}

/// Form payload for creating an addon and linking it to items.
#[derive(Debug, Deserialize, Validate)]
pub struct AddAddonForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[serde(default)]
    pub addon_type: String,
    #[serde(default)]
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    pub description: Option<String>,
    pub price: String,
    #[serde(default = "default_max_quantity")]
    #[validate(range(min = 1, max = 10))]
    pub max_quantity: i32,
    #[serde(default)]
    pub menu_item_ids: Vec<i32>,
}

impl AddAddonForm {
    pub fn into_new_addon(self, tenant_id: i32) -> MenuFormResult<NewMenuAddon> {
        self.validate()?;

        let addon_type = match self.addon_type.trim() {
            "" => AddonType::Other,
            value => {
                AddonType::parse(value).ok_or_else(|| MenuFormError::InvalidType(value.to_string()))?
            }
        };

        Ok(NewMenuAddon {
            tenant_id,
            addon_type,
            name: required_name(&self.name)?,
            description: optional_multiline(self.description.as_deref()),
            price_cents: price(&self.price)?,
            max_quantity: self.max_quantity,
            menu_item_ids: unique_ids(self.menu_item_ids),
        })
    }
}

/// Form payload for creating a modifier and linking it to items.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AddModifierForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[serde(default)]
    pub modifier_type: String,
    #[serde(default)]
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    pub description: Option<String>,
    #[serde(default)]
    pub price_modifier: String,
    #[serde(default)]
    pub menu_item_ids: Vec<i32>,
}

impl AddModifierForm {
    pub fn into_new_modifier(self, tenant_id: i32) -> MenuFormResult<NewMenuModifier> {
        self.validate()?;

        let modifier_type = match self.modifier_type.trim() {
            "" => ModifierType::Other,
            value => ModifierType::parse(value)
                .ok_or_else(|| MenuFormError::InvalidType(value.to_string()))?,
        };

        Ok(NewMenuModifier {
            tenant_id,
            modifier_type,
            name: required_name(&self.name)?,
            description: optional_multiline(self.description.as_deref()),
            price_modifier_cents: price_delta(&self.price_modifier)?,
            menu_item_ids: unique_ids(self.menu_item_ids),
        })
    }
}
