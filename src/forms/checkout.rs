use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::order::{OrderType, PaymentMethod};
use crate::forms::{optional_inline, optional_multiline, sanitize_inline_text};

lazy_static! {
    // Literal pattern, compiled on first use; covered by `phone_pattern_compiles`.
    static ref PHONE_RE: Regex = Regex::new(r"^\+?1?\d{9,15}$").expect("valid phone pattern");
}

const NAME_MAX_LEN: u64 = 100;
const ADDRESS_MAX_LEN: u64 = 500;
const NOTES_MAX_LEN: u64 = 1000;

pub type CheckoutFormResult<T> = Result<T, CheckoutFormError>;

#[derive(Debug, Error, PartialEq)]
pub enum CheckoutFormError {
    #[error("Revisa los datos del pedido: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("El nombre es obligatorio")]
    MissingName,
    #[error("Número de teléfono inválido. Usa entre 9 y 15 dígitos.")]
    InvalidPhone,
    #[error("Tipo de pedido inválido")]
    InvalidOrderType,
    #[error("Selecciona un método de pago")]
    InvalidPaymentMethod,
    #[error("El número de mesa es obligatorio para comer en el local")]
    MissingTableNumber,
    #[error("La dirección de entrega es obligatoria para delivery")]
    MissingDeliveryAddress,
}

/// Customer data posted from the checkout page.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CheckoutForm {
    #[validate(length(max = NAME_MAX_LEN))]
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    #[validate(email)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub order_type: String,
    #[serde(default)]
    pub table_number: Option<String>,
    #[serde(default)]
    #[validate(length(max = ADDRESS_MAX_LEN))]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    #[validate(length(max = NOTES_MAX_LEN))]
    pub customer_notes: Option<String>,
}

/// Checkout data after validation and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub order_type: OrderType,
    pub table_number: Option<String>,
    pub delivery_address: Option<String>,
    pub payment_method: PaymentMethod,
    pub customer_notes: Option<String>,
}

/// Strips spaces and dashes and checks the remaining digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '-')
        .collect();
    PHONE_RE.is_match(&compact).then_some(compact)
}

impl CheckoutForm {
    /// Validates the form. `session_table_number` is the table of the active
    /// table session, which satisfies the dine-in table requirement.
    pub fn into_details(
        mut self,
        session_table_number: Option<&str>,
    ) -> CheckoutFormResult<CheckoutDetails> {
        if self
            .customer_email
            .as_deref()
            .is_some_and(|email| email.trim().is_empty())
        {
            self.customer_email = None;
        }
        self.validate()?;

        let customer_name = sanitize_inline_text(&self.customer_name);
        if customer_name.is_empty() {
            return Err(CheckoutFormError::MissingName);
        }

        let customer_phone =
            normalize_phone(&self.customer_phone).ok_or(CheckoutFormError::InvalidPhone)?;

        let order_type = match self.order_type.trim() {
            "" => OrderType::DineIn,
            value => OrderType::parse(value).ok_or(CheckoutFormError::InvalidOrderType)?,
        };

        let payment_method = PaymentMethod::parse(self.payment_method.trim())
            .ok_or(CheckoutFormError::InvalidPaymentMethod)?;

        let mut table_number = optional_inline(self.table_number.as_deref());
        let mut delivery_address = optional_multiline(self.delivery_address.as_deref());

        match order_type {
            OrderType::DineIn => {
                if let Some(session_number) = session_table_number {
                    table_number = Some(session_number.to_string());
                }
                if table_number.is_none() {
                    return Err(CheckoutFormError::MissingTableNumber);
                }
                delivery_address = None;
            }
            OrderType::Delivery => {
                if delivery_address.is_none() {
                    return Err(CheckoutFormError::MissingDeliveryAddress);
                }
                table_number = None;
            }
            OrderType::Takeaway => {
                table_number = None;
                delivery_address = None;
            }
        }

        Ok(CheckoutDetails {
            customer_name,
            customer_phone,
            customer_email: optional_inline(self.customer_email.as_deref()),
            order_type,
            table_number,
            delivery_address,
            payment_method,
            customer_notes: optional_multiline(self.customer_notes.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_pattern_compiles() {
        assert!(PHONE_RE.is_match("+56912345678"));
        assert!(!PHONE_RE.is_match("12345"));
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            customer_name: " Ana  Pérez ".to_string(),
            customer_phone: "+57 300-123-4567".to_string(),
            customer_email: Some(String::new()),
            order_type: "dine_in".to_string(),
            table_number: Some("4".to_string()),
            delivery_address: Some("Calle 1".to_string()),
            payment_method: "cash".to_string(),
            customer_notes: None,
        }
    }

    #[test]
    fn phone_is_normalized() {
        assert_eq!(normalize_phone("300 123 4567").as_deref(), Some("3001234567"));
        assert_eq!(normalize_phone("+1-555-123-4567").as_deref(), Some("+15551234567"));
        assert_eq!(normalize_phone("12345"), None);
        assert_eq!(normalize_phone("abc1234567"), None);
    }

    #[test]
    fn dine_in_keeps_table_and_drops_address() {
        let details = form().into_details(None).expect("valid");
        assert_eq!(details.customer_name, "Ana Pérez");
        assert_eq!(details.customer_phone, "+573001234567");
        assert_eq!(details.customer_email, None);
        assert_eq!(details.table_number.as_deref(), Some("4"));
        assert_eq!(details.delivery_address, None);
    }

    #[test]
    fn table_session_supplies_table_number() {
        let mut input = form();
        input.table_number = None;
        assert_eq!(
            input.into_details(None).unwrap_err(),
            CheckoutFormError::MissingTableNumber
        );

        let mut input = form();
        input.table_number = None;
        let details = input.into_details(Some("12")).expect("valid");
        assert_eq!(details.table_number.as_deref(), Some("12"));
    }

    #[test]
    fn delivery_requires_address() {
        let mut input = form();
        input.order_type = "delivery".to_string();
        input.delivery_address = Some("   ".to_string());
        assert_eq!(
            input.into_details(None).unwrap_err(),
            CheckoutFormError::MissingDeliveryAddress
        );
    }

    #[test]
    fn payment_method_is_required() {
        let mut input = form();
        input.payment_method = String::new();
        assert_eq!(
            input.into_details(None).unwrap_err(),
            CheckoutFormError::InvalidPaymentMethod
        );
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut input = form();
        input.customer_email = Some("not-an-email".to_string());
        assert!(matches!(
            input.into_details(None),
            Err(CheckoutFormError::Validation(_))
        ));
    }
}
