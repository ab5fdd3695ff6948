use chrono::{NaiveDateTime, NaiveTime};
use diesel::prelude::*;

use crate::domain::menu::{
    MenuAddon as DomainMenuAddon, MenuCategory as DomainMenuCategory,
    MenuItem as DomainMenuItem, MenuModifier as DomainMenuModifier,
    MenuVariant as DomainMenuVariant, NewMenuAddon as DomainNewMenuAddon,
    NewMenuCategory as DomainNewMenuCategory, NewMenuItem as DomainNewMenuItem,
    NewMenuModifier as DomainNewMenuModifier, NewMenuVariant as DomainNewMenuVariant,
    UpdateMenuCategory as DomainUpdateMenuCategory, UpdateMenuItem as DomainUpdateMenuItem,
};

/// Encodes a list of labels for a JSON text column.
pub(crate) fn encode_labels(labels: &[String]) -> String {
    serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string())
}

/// Decodes a JSON text column, treating malformed content as empty.
pub(crate) fn decode_labels(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::menu_categories)]
pub struct MenuCategory {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub available_from: Option<NaiveTime>,
    pub available_until: Option<NaiveTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::menu_categories)]
pub struct NewMenuCategory<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub sort_order: i32,
    pub is_active: bool,
    pub available_from: Option<NaiveTime>,
    pub available_until: Option<NaiveTime>,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::menu_categories)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateMenuCategory<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub sort_order: i32,
    pub is_active: bool,
    pub available_from: Option<NaiveTime>,
    pub available_until: Option<NaiveTime>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::menu_items)]
#[diesel(belongs_to(MenuCategory, foreign_key = category_id))]
pub struct MenuItem {
    pub id: i32,
    pub tenant_id: i32,
    pub category_id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub base_price_cents: i64,
    pub discounted_price_cents: Option<i64>,
    pub is_available: bool,
    pub is_featured: bool,
    pub stock_quantity: Option<i32>,
    pub calories: Option<i32>,
    pub preparation_time: Option<i32>,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub is_spicy: bool,
    pub allergens: String,
    pub responsible_area: String,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::menu_items)]
pub struct NewMenuItem<'a> {
    pub tenant_id: i32,
    pub category_id: i32,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub short_description: Option<&'a str>,
    pub base_price_cents: i64,
    pub discounted_price_cents: Option<i64>,
    pub is_available: bool,
    pub is_featured: bool,
    pub stock_quantity: Option<i32>,
    pub calories: Option<i32>,
    pub preparation_time: Option<i32>,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub is_spicy: bool,
    pub allergens: String,
    pub responsible_area: &'a str,
    pub sort_order: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::menu_items)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateMenuItem<'a> {
    pub category_id: i32,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub short_description: Option<&'a str>,
    pub base_price_cents: i64,
    pub discounted_price_cents: Option<i64>,
    pub is_available: bool,
    pub is_featured: bool,
    pub stock_quantity: Option<i32>,
    pub calories: Option<i32>,
    pub preparation_time: Option<i32>,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub is_spicy: bool,
    pub allergens: String,
    pub responsible_area: &'a str,
    pub sort_order: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::menu_variants)]
#[diesel(belongs_to(MenuItem, foreign_key = menu_item_id))]
pub struct MenuVariant {
    pub id: i32,
    pub menu_item_id: i32,
    pub variant_type: String,
    pub name: String,
    pub price_modifier_cents: i64,
    pub is_default: bool,
    pub is_available: bool,
    pub sort_order: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::menu_variants)]
pub struct NewMenuVariant<'a> {
    pub menu_item_id: i32,
    pub variant_type: &'a str,
    pub name: &'a str,
    pub price_modifier_cents: i64,
    pub is_default: bool,
    pub is_available: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::menu_addons)]
pub struct MenuAddon {
    pub id: i32,
    pub tenant_id: i32,
    pub addon_type: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub is_available: bool,
    pub max_quantity: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::menu_addons)]
pub struct NewMenuAddon<'a> {
    pub tenant_id: i32,
    pub addon_type: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price_cents: i64,
    pub max_quantity: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::menu_modifiers)]
pub struct MenuModifier {
    pub id: i32,
    pub tenant_id: i32,
    pub modifier_type: String,
    pub name: String,
    pub description: Option<String>,
    pub price_modifier_cents: i64,
    pub is_available: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::menu_modifiers)]
pub struct NewMenuModifier<'a> {
    pub tenant_id: i32,
    pub modifier_type: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price_modifier_cents: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::menu_item_addons)]
pub struct NewMenuItemAddon {
    pub menu_item_id: i32,
    pub addon_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::menu_item_modifiers)]
pub struct NewMenuItemModifier {
    pub menu_item_id: i32,
    pub modifier_id: i32,
}

impl From<MenuCategory> for DomainMenuCategory {
    fn from(value: MenuCategory) -> Self {
        Self {
            id: value.id,
            tenant_id: value.tenant_id,
            name: value.name,
            slug: value.slug,
            description: value.description,
            sort_order: value.sort_order,
            is_active: value.is_active,
            available_from: value.available_from,
            available_until: value.available_until,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewMenuCategory> for NewMenuCategory<'a> {
    fn from(value: &'a DomainNewMenuCategory) -> Self {
        Self {
            tenant_id: value.tenant_id,
            name: value.name.as_str(),
            slug: value.slug.as_str(),
            description: value.description.as_deref(),
            sort_order: value.sort_order,
            is_active: value.is_active,
            available_from: value.available_from,
            available_until: value.available_until,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateMenuCategory> for UpdateMenuCategory<'a> {
    fn from(value: &'a DomainUpdateMenuCategory) -> Self {
        Self {
            name: value.name.as_str(),
            description: value.description.as_deref(),
            sort_order: value.sort_order,
            is_active: value.is_active,
            available_from: value.available_from,
            available_until: value.available_until,
            updated_at: value.updated_at,
        }
    }
}

impl From<MenuItem> for DomainMenuItem {
    fn from(value: MenuItem) -> Self {
        Self {
            id: value.id,
            tenant_id: value.tenant_id,
            category_id: value.category_id,
            name: value.name,
            slug: value.slug,
            description: value.description,
            short_description: value.short_description,
            base_price_cents: value.base_price_cents,
            discounted_price_cents: value.discounted_price_cents,
            is_available: value.is_available,
            is_featured: value.is_featured,
            stock_quantity: value.stock_quantity,
            calories: value.calories,
            preparation_time: value.preparation_time,
            is_vegetarian: value.is_vegetarian,
            is_vegan: value.is_vegan,
            is_gluten_free: value.is_gluten_free,
            is_spicy: value.is_spicy,
            allergens: decode_labels(&value.allergens),
            responsible_area: value.responsible_area.as_str().into(),
            sort_order: value.sort_order,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewMenuItem> for NewMenuItem<'a> {
    fn from(value: &'a DomainNewMenuItem) -> Self {
        Self {
            tenant_id: value.tenant_id,
            category_id: value.category_id,
            name: value.name.as_str(),
            slug: value.slug.as_str(),
            description: value.description.as_deref(),
            short_description: value.short_description.as_deref(),
            base_price_cents: value.base_price_cents,
            discounted_price_cents: value.discounted_price_cents,
            is_available: value.is_available,
            is_featured: value.is_featured,
            stock_quantity: value.stock_quantity,
            calories: value.calories,
            preparation_time: value.preparation_time,
            is_vegetarian: value.is_vegetarian,
            is_vegan: value.is_vegan,
            is_gluten_free: value.is_gluten_free,
            is_spicy: value.is_spicy,
            allergens: encode_labels(&value.allergens),
            responsible_area: value.responsible_area.into(),
            sort_order: value.sort_order,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateMenuItem> for UpdateMenuItem<'a> {
    fn from(value: &'a DomainUpdateMenuItem) -> Self {
        Self {
            category_id: value.category_id,
            name: value.name.as_str(),
            description: value.description.as_deref(),
            short_description: value.short_description.as_deref(),
            base_price_cents: value.base_price_cents,
            discounted_price_cents: value.discounted_price_cents,
            is_available: value.is_available,
            is_featured: value.is_featured,
            stock_quantity: value.stock_quantity,
            calories: value.calories,
            preparation_time: value.preparation_time,
            is_vegetarian: value.is_vegetarian,
            is_vegan: value.is_vegan,
            is_gluten_free: value.is_gluten_free,
            is_spicy: value.is_spicy,
            allergens: encode_labels(&value.allergens),
            responsible_area: value.responsible_area.into(),
            sort_order: value.sort_order,
            updated_at: value.updated_at,
        }
    }
}

impl From<MenuVariant> for DomainMenuVariant {
    fn from(value: MenuVariant) -> Self {
        Self {
            id: value.id,
            menu_item_id: value.menu_item_id,
            variant_type: value.variant_type.as_str().into(),
            name: value.name,
            price_modifier_cents: value.price_modifier_cents,
            is_default: value.is_default,
            is_available: value.is_available,
            sort_order: value.sort_order,
        }
    }
}

impl<'a> From<&'a DomainNewMenuVariant> for NewMenuVariant<'a> {
    fn from(value: &'a DomainNewMenuVariant) -> Self {
        Self {
            menu_item_id: value.menu_item_id,
            variant_type: value.variant_type.into(),
            name: value.name.as_str(),
            price_modifier_cents: value.price_modifier_cents,
            is_default: value.is_default,
            is_available: value.is_available,
            sort_order: value.sort_order,
        }
    }
}

impl From<MenuAddon> for DomainMenuAddon {
    fn from(value: MenuAddon) -> Self {
        Self {
            id: value.id,
            tenant_id: value.tenant_id,
            addon_type: value.addon_type.as_str().into(),
            name: value.name,
            description: value.description,
            price_cents: value.price_cents,
            is_available: value.is_available,
            max_quantity: value.max_quantity,
            created_at: value.created_at,
        }
    }
}

impl<'a> From<&'a DomainNewMenuAddon> for NewMenuAddon<'a> {
    fn from(value: &'a DomainNewMenuAddon) -> Self {
        Self {
            tenant_id: value.tenant_id,
            addon_type: value.addon_type.into(),
            name: value.name.as_str(),
            description: value.description.as_deref(),
            price_cents: value.price_cents,
            max_quantity: value.max_quantity,
        }
    }
}

impl From<MenuModifier> for DomainMenuModifier {
    fn from(value: MenuModifier) -> Self {
        Self {
            id: value.id,
            tenant_id: value.tenant_id,
            modifier_type: value.modifier_type.as_str().into(),
            name: value.name,
            description: value.description,
            price_modifier_cents: value.price_modifier_cents,
            is_available: value.is_available,
            created_at: value.created_at,
        }
    }
}

impl<'a> From<&'a DomainNewMenuModifier> for NewMenuModifier<'a> {
    fn from(value: &'a DomainNewMenuModifier) -> Self {
        Self {
            tenant_id: value.tenant_id,
            modifier_type: value.modifier_type.into(),
            name: value.name.as_str(),
            description: value.description.as_deref(),
            price_modifier_cents: value.price_modifier_cents,
        }
    }
}
