use chrono::{Local, NaiveDateTime, NaiveTime};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

use crate::domain::order_item::ResponsibleArea;

labeled_enum! {
    pub enum VariantType {
        Size => ("SIZE", "Tamaño"),
        Type => ("TYPE", "Tipo"),
        Style => ("STYLE", "Estilo"),
        Other => ("OTHER", "Otro"),
    }
    fallback = Other;
}

labeled_enum! {
    pub enum AddonType {
        Ingredient => ("INGREDIENT", "Ingrediente extra"),
        Side => ("SIDE", "Acompañamiento"),
        Sauce => ("SAUCE", "Salsa"),
        Drink => ("DRINK", "Bebida"),
        Other => ("OTHER", "Otro"),
    }
    fallback = Other;
}

labeled_enum! {
    pub enum ModifierType {
        Remove => ("REMOVE", "Quitar ingrediente"),
        Add => ("ADD", "Agregar ingrediente"),
        Style => ("STYLE", "Estilo de preparación"),
        Temperature => ("TEMPERATURE", "Temperatura"),
        Other => ("OTHER", "Otro"),
    }
    fallback = Other;
}

/// A section of the menu such as "Entradas" or "Bebidas".
#[derive(Debug, Serialize, Deserialize, Clone)]
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

impl MenuCategory {
    /// Active and, when a window is configured, inside it at `time`.
    pub fn is_available_at(&self, time: NaiveTime) -> bool {
        if !self.is_active {
            return false;
        }
        match (self.available_from, self.available_until) {
            (Some(from), Some(until)) if from <= until => time >= from && time <= until,
            (Some(from), Some(until)) => time >= from || time <= until,
            (Some(from), None) => time >= from,
            (None, Some(until)) => time <= until,
            (None, None) => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMenuCategory {
    pub tenant_id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub available_from: Option<NaiveTime>,
    pub available_until: Option<NaiveTime>,
    pub updated_at: NaiveDateTime,
}

impl NewMenuCategory {
    pub fn new(tenant_id: i32, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            tenant_id,
            name: name.into(),
            slug: slug.into(),
            description: None,
            sort_order: 0,
            is_active: true,
            available_from: None,
            available_until: None,
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Patch data applied when editing a category.
#[derive(Debug, Clone)]
pub struct UpdateMenuCategory {
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub available_from: Option<NaiveTime>,
    pub available_until: Option<NaiveTime>,
    pub updated_at: NaiveDateTime,
}

/// A dish or drink offered by the restaurant.
#[derive(Debug, Serialize, Deserialize, Clone)]
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
    /// `None` means unlimited stock.
    pub stock_quantity: Option<i32>,
    pub calories: Option<i32>,
    /// Preparation time in minutes.
    pub preparation_time: Option<i32>,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_gluten_free: bool,
    pub is_spicy: bool,
    pub allergens: Vec<String>,
    /// Station that prepares the item.
    pub responsible_area: ResponsibleArea,
    pub sort_order: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl MenuItem {
    /// Price charged today: the discounted price when it undercuts the base.
    pub fn current_price_cents(&self) -> i64 {
        match self.discounted_price_cents {
            Some(discounted) if discounted < self.base_price_cents => discounted,
            _ => self.base_price_cents,
        }
    }

    pub fn has_discount(&self) -> bool {
        self.current_price_cents() < self.base_price_cents
    }

    /// Whole percentage saved by the discount.
    pub fn discount_percentage(&self) -> i64 {
        if !self.has_discount() || self.base_price_cents == 0 {
            return 0;
        }
        (self.base_price_cents - self.current_price_cents()) * 100 / self.base_price_cents
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity.is_none_or(|stock| stock > 0)
    }

    pub fn is_orderable(&self) -> bool {
        self.is_available && self.is_in_stock()
    }

    /// Whether at least `quantity` units may be ordered now.
    pub fn can_order(&self, quantity: u32) -> bool {
        self.is_available
            && self
                .stock_quantity
                .is_none_or(|stock| stock >= 0 && quantity <= stock as u32)
    }
}

#[derive(Debug, Clone)]
pub struct NewMenuItem {
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
    pub allergens: Vec<String>,
    pub responsible_area: ResponsibleArea,
    pub sort_order: i32,
    pub updated_at: NaiveDateTime,
}

impl NewMenuItem {
    pub fn new(
        tenant_id: i32,
        category_id: i32,
        name: impl Into<String>,
        slug: impl Into<String>,
        base_price_cents: i64,
    ) -> Self {
        Self {
            tenant_id,
            category_id,
            name: name.into(),
            slug: slug.into(),
            description: None,
            short_description: None,
            base_price_cents,
            discounted_price_cents: None,
            is_available: true,
            is_featured: false,
            stock_quantity: None,
            calories: None,
            preparation_time: None,
            is_vegetarian: false,
            is_vegan: false,
            is_gluten_free: false,
            is_spicy: false,
            allergens: Vec::new(),
            responsible_area: ResponsibleArea::Kitchen,
            sort_order: 0,
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn with_area(mut self, area: ResponsibleArea) -> Self {
        self.responsible_area = area;
        self
    }

    pub fn with_discounted_price(mut self, cents: i64) -> Self {
        self.discounted_price_cents = Some(cents);
        self
    }

    pub fn with_stock(mut self, stock: i32) -> Self {
        self.stock_quantity = Some(stock);
        self
    }

    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }
}

/// Patch data applied when editing a menu item. The slug is never changed.
#[derive(Debug, Clone)]
pub struct UpdateMenuItem {
    pub category_id: i32,
    pub name: String,
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
    pub allergens: Vec<String>,
    pub responsible_area: ResponsibleArea,
    pub sort_order: i32,
    pub updated_at: NaiveDateTime,
}

/// Alternative version of an item that adjusts its price.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MenuVariant {
    pub id: i32,
    pub menu_item_id: i32,
    pub variant_type: VariantType,
    pub name: String,
    pub price_modifier_cents: i64,
    pub is_default: bool,
    pub is_available: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct NewMenuVariant {
    pub menu_item_id: i32,
    pub variant_type: VariantType,
    pub name: String,
    pub price_modifier_cents: i64,
    pub is_default: bool,
    pub is_available: bool,
    pub sort_order: i32,
}

/// Optional extra sold with items it is linked to.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MenuAddon {
    pub id: i32,
    pub tenant_id: i32,
    pub addon_type: AddonType,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub is_available: bool,
    pub max_quantity: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMenuAddon {
    pub tenant_id: i32,
    pub addon_type: AddonType,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub max_quantity: i32,
    /// Items the addon is offered with.
    pub menu_item_ids: Vec<i32>,
}

/// Preparation change such as "sin cebolla".
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MenuModifier {
    pub id: i32,
    pub tenant_id: i32,
    pub modifier_type: ModifierType,
    pub name: String,
    pub description: Option<String>,
    pub price_modifier_cents: i64,
    pub is_available: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMenuModifier {
    pub tenant_id: i32,
    pub modifier_type: ModifierType,
    pub name: String,
    pub description: Option<String>,
    pub price_modifier_cents: i64,
    pub menu_item_ids: Vec<i32>,
}

/// A menu item together with its available options.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MenuItemDetail {
    pub item: MenuItem,
    pub category_name: String,
    pub variants: Vec<MenuVariant>,
    pub addons: Vec<MenuAddon>,
    pub modifiers: Vec<MenuModifier>,
}

impl MenuItemDetail {
    pub fn variant(&self, variant_id: i32) -> Option<&MenuVariant> {
        self.variants
            .iter()
            .find(|variant| variant.id == variant_id && variant.is_available)
    }

    pub fn addon(&self, addon_id: i32) -> Option<&MenuAddon> {
        self.addons
            .iter()
            .find(|addon| addon.id == addon_id && addon.is_available)
    }

    pub fn modifier(&self, modifier_id: i32) -> Option<&MenuModifier> {
        self.modifiers
            .iter()
            .find(|modifier| modifier.id == modifier_id && modifier.is_available)
    }
}

/// Query definition used to list menu items.
#[derive(Debug, Clone)]
pub struct MenuItemListQuery {
    pub tenant_id: i32,
    pub category_id: Option<i32>,
    pub search: Option<String>,
    pub only_available: bool,
    pub only_featured: bool,
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub pagination: Option<Pagination>,
}

impl MenuItemListQuery {
    pub fn new(tenant_id: i32) -> Self {
        Self {
            tenant_id,
            category_id: None,
            search: None,
            only_available: false,
            only_featured: false,
            vegetarian: false,
            vegan: false,
            gluten_free: false,
            pagination: None,
        }
    }

    pub fn category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn only_available(mut self) -> Self {
        self.only_available = true;
        self
    }

    pub fn only_featured(mut self) -> Self {
        self.only_featured = true;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item(base: i64, discounted: Option<i64>, stock: Option<i32>) -> MenuItem {
        let stamp = NaiveDateTime::default();
        MenuItem {
            id: 1,
            tenant_id: 1,
            category_id: 1,
            name: "Lomo saltado".to_string(),
            slug: "lomo-saltado".to_string(),
            description: None,
            short_description: None,
            base_price_cents: base,
            discounted_price_cents: discounted,
            is_available: true,
            is_featured: false,
            stock_quantity: stock,
            calories: None,
            preparation_time: None,
            is_vegetarian: false,
            is_vegan: false,
            is_gluten_free: false,
            is_spicy: false,
            allergens: Vec::new(),
            responsible_area: ResponsibleArea::Kitchen,
            sort_order: 0,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    #[test]
    fn discounted_price_only_applies_when_lower() {
        let item = sample_item(2000, Some(1500), None);
        assert_eq!(item.current_price_cents(), 1500);
        assert!(item.has_discount());
        assert_eq!(item.discount_percentage(), 25);

        let odd = sample_item(2000, Some(2500), None);
        assert_eq!(odd.current_price_cents(), 2000);
        assert!(!odd.has_discount());
        assert_eq!(odd.discount_percentage(), 0);
    }

    #[test]
    fn stock_limits_orderable_quantity() {
        assert!(sample_item(100, None, None).can_order(50));
        assert!(sample_item(100, None, Some(3)).can_order(3));
        assert!(!sample_item(100, None, Some(3)).can_order(4));
        assert!(!sample_item(100, None, Some(0)).is_in_stock());
        assert!(!sample_item(100, None, Some(0)).is_orderable());
    }

    #[test]
    fn category_window_is_respected() {
        let stamp = NaiveDateTime::default();
        let category = MenuCategory {
            id: 1,
            tenant_id: 1,
            name: "Desayunos".to_string(),
            slug: "desayunos".to_string(),
            description: None,
            sort_order: 0,
            is_active: true,
            available_from: NaiveTime::from_hms_opt(7, 0, 0),
            available_until: NaiveTime::from_hms_opt(11, 30, 0),
            created_at: stamp,
            updated_at: stamp,
        };

        let morning = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default();
        let evening = NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default();
        assert!(category.is_available_at(morning));
        assert!(!category.is_available_at(evening));
    }
}
