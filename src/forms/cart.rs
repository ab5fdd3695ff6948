use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::cart::{CartLine, MAX_LINE_QUANTITY};
use crate::forms::{optional_multiline, unique_ids};

const INSTRUCTIONS_MAX_LEN: u64 = 500;
const QUANTITY_MAX: u32 = MAX_LINE_QUANTITY;

/// Result type returned by the cart form helpers.
pub type CartFormResult<T> = Result<T, CartFormError>;

#[derive(Debug, Error)]
pub enum CartFormError {
    #[error("Datos inválidos: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("La línea del carrito no existe")]
    UnknownLine,
}

fn default_quantity() -> u32 {
    1
}

/// Payload posted by the "add to cart" button.
#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartForm {
    #[validate(range(min = 1))]
    pub menu_item_id: i32,
    #[serde(default)]
    pub variant_id: Option<i32>,
    #[serde(default)]
    pub addon_ids: Vec<i32>,
    #[serde(default)]
    pub modifier_ids: Vec<i32>,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = QUANTITY_MAX))]
    pub quantity: u32,
    #[serde(default)]
    #[validate(length(max = INSTRUCTIONS_MAX_LEN))]
    pub special_instructions: Option<String>,
    /// Replace the quantity of an identical line instead of adding to it.
    #[serde(default)]
    pub override_quantity: bool,
}

impl AddToCartForm {
    /// Validates the payload into a cart line and the override flag.
    pub fn into_cart_line(self) -> CartFormResult<(CartLine, bool)> {
        self.validate()?;

        let line = CartLine {
            menu_item_id: self.menu_item_id,
            variant_id: self.variant_id.filter(|id| *id > 0),
            addon_ids: unique_ids(self.addon_ids),
            modifier_ids: unique_ids(self.modifier_ids),
            quantity: self.quantity,
            special_instructions: optional_multiline(self.special_instructions.as_deref()),
        };

        Ok((line, self.override_quantity))
    }
}

/// Payload posted when changing the quantity of a cart line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub key: String,
    pub quantity: i64,
}

/// Payload posted when removing a cart line.
#[derive(Debug, Deserialize)]
pub struct RemoveCartForm {
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(quantity: u32) -> AddToCartForm {
        AddToCartForm {
            menu_item_id: 4,
            variant_id: Some(0),
            addon_ids: vec![9, 2, 9],
            modifier_ids: vec![],
            quantity,
            special_instructions: Some("  sin   hielo ".to_string()),
            override_quantity: false,
        }
    }

    #[test]
    fn add_form_normalizes_selection() {
        let (line, override_quantity) = form(2).into_cart_line().expect("valid form");

        assert_eq!(line.variant_id, None);
        assert_eq!(line.addon_ids, vec![9, 2]);
        assert_eq!(line.special_instructions.as_deref(), Some("sin hielo"));
        assert!(!override_quantity);
    }

    #[test]
    fn add_form_rejects_out_of_range_quantity() {
        assert!(matches!(
            form(0).into_cart_line(),
            Err(CartFormError::Validation(_))
        ));
        assert!(matches!(
            form(100).into_cart_line(),
            Err(CartFormError::Validation(_))
        ));
    }
}
