//! Browser-session shopping cart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::order_item::ResponsibleArea;

/// Largest quantity accepted for a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Identifies a line by item and chosen options.
///
/// Option ids are sorted so that the same selection always produces the same
/// key regardless of submission order.
pub fn line_key(
    menu_item_id: i32,
    variant_id: Option<i32>,
    addon_ids: &[i32],
    modifier_ids: &[i32],
) -> String {
    fn join(prefix: &str, ids: &[i32]) -> String {
        if ids.is_empty() {
            return format!("no_{prefix}");
        }
        let mut sorted = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let ids: Vec<String> = sorted.iter().map(i32::to_string).collect();
        format!("{prefix}_{}", ids.join("_"))
    }

    let variant = match variant_id {
        Some(id) => format!("variant_{id}"),
        None => "no_variant".to_string(),
    };

    format!(
        "{menu_item_id}_{variant}_{}_{}",
        join("addons", addon_ids),
        join("modifiers", modifier_ids)
    )
}

/// Selection stored for one cart line. Prices are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: i32,
    pub variant_id: Option<i32>,
    pub addon_ids: Vec<i32>,
    pub modifier_ids: Vec<i32>,
    pub quantity: u32,
    pub special_instructions: Option<String>,
}

impl CartLine {
    pub fn key(&self) -> String {
        line_key(
            self.menu_item_id,
            self.variant_id,
            &self.addon_ids,
            &self.modifier_ids,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: BTreeMap<String, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `line`, merging with an existing line of the same key.
    ///
    /// With `override_quantity` the stored quantity is replaced instead of
    /// accumulated. Returns the key of the affected line.
    pub fn add(&mut self, mut line: CartLine, override_quantity: bool) -> String {
        line.addon_ids.sort_unstable();
        line.addon_ids.dedup();
        line.modifier_ids.sort_unstable();
        line.modifier_ids.dedup();
        let key = line.key();

        match self.lines.get_mut(&key) {
            Some(existing) => {
                existing.quantity = if override_quantity {
                    line.quantity
                } else {
                    existing.quantity.saturating_add(line.quantity)
                }
                .min(MAX_LINE_QUANTITY);
                if line.special_instructions.is_some() {
                    existing.special_instructions = line.special_instructions;
                }
            }
            None => {
                line.quantity = line.quantity.min(MAX_LINE_QUANTITY);
                self.lines.insert(key.clone(), line);
            }
        }

        key
    }

    /// Sets the quantity of a line; zero removes it. Returns `false` when the
    /// key is unknown.
    pub fn update(&mut self, key: &str, quantity: i64) -> bool {
        if !self.lines.contains_key(key) {
            return false;
        }
        if quantity <= 0 {
            self.lines.remove(key);
        } else if let Some(line) = self.lines.get_mut(key) {
            line.quantity = (quantity as u64).min(MAX_LINE_QUANTITY as u64) as u32;
        }
        true
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.lines.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities.
    pub fn total_quantity(&self) -> u32 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn distinct_items(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = (&String, &CartLine)> {
        self.lines.iter()
    }

    /// Menu item ids referenced by the cart.
    pub fn menu_item_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.lines.values().map(|line| line.menu_item_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Drops lines whose key is not in `keep`.
    pub fn retain_keys(&mut self, keep: &[String]) {
        self.lines.retain(|key, _| keep.contains(key));
    }
}

/// Cart line priced against the current catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedCartLine {
    pub key: String,
    pub menu_item_id: i32,
    pub name: String,
    pub slug: String,
    pub category_name: String,
    pub variant_id: Option<i32>,
    pub variant_name: Option<String>,
    pub addon_names: Vec<String>,
    pub modifier_names: Vec<String>,
    pub quantity: u32,
    pub base_price_cents: i64,
    pub variant_price_cents: i64,
    pub addons_price_cents: i64,
    pub modifiers_price_cents: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub responsible_area: ResponsibleArea,
    pub special_instructions: Option<String>,
}

/// Cart view with totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PricedCart {
    pub lines: Vec<PricedCartLine>,
    pub total_cents: i64,
    pub total_quantity: u32,
    pub distinct_items: usize,
}

impl PricedCart {
    pub fn from_lines(lines: Vec<PricedCartLine>) -> Self {
        let total_cents = lines.iter().map(|line| line.total_price_cents).sum();
        let total_quantity = lines.iter().map(|line| line.quantity).sum();
        let distinct_items = lines.len();
        Self {
            lines,
            total_cents,
            total_quantity,
            distinct_items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(item: i32, addons: &[i32], quantity: u32) -> CartLine {
        CartLine {
            menu_item_id: item,
            variant_id: None,
            addon_ids: addons.to_vec(),
            modifier_ids: Vec::new(),
            quantity,
            special_instructions: None,
        }
    }

    #[test]
    fn key_is_independent_of_option_order() {
        assert_eq!(
            line_key(5, Some(2), &[9, 3], &[1]),
            "5_variant_2_addons_3_9_modifiers_1"
        );
        assert_eq!(line_key(5, Some(2), &[3, 9], &[1]), line_key(5, Some(2), &[9, 3], &[1]));
        assert_eq!(line_key(5, None, &[], &[]), "5_no_variant_no_addons_no_modifiers");
    }

    #[test]
    fn adding_same_selection_accumulates() {
        let mut cart = Cart::new();
        let first = cart.add(line(1, &[4, 2], 1), false);
        let second = cart.add(line(1, &[2, 4], 2), false);

        assert_eq!(first, second);
        assert_eq!(cart.distinct_items(), 1);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn override_replaces_quantity() {
        let mut cart = Cart::new();
        cart.add(line(1, &[], 5), false);
        cart.add(line(1, &[], 2), true);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn quantities_are_capped() {
        let mut cart = Cart::new();
        let key = cart.add(line(1, &[], 90), false);
        cart.add(line(1, &[], 50), false);
        assert_eq!(cart.total_quantity(), MAX_LINE_QUANTITY);
        assert!(cart.update(&key, 1_000));
        assert_eq!(cart.total_quantity(), MAX_LINE_QUANTITY);
    }

    #[test]
    fn update_to_zero_removes_line() {
        let mut cart = Cart::new();
        let key = cart.add(line(1, &[], 2), false);
        cart.add(line(2, &[], 1), false);

        assert!(cart.update(&key, 0));
        assert_eq!(cart.distinct_items(), 1);
        assert!(!cart.update("missing", 3));
    }

    #[test]
    fn remove_and_clear() {
        let mut cart = Cart::new();
        let key = cart.add(line(1, &[], 2), false);
        cart.add(line(2, &[], 1), false);

        assert!(cart.remove(&key));
        assert!(!cart.remove(&key));
        cart.clear();
        assert!(cart.is_empty());
    }
}
