use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::order::OrderStatus;
use crate::domain::order_item::OrderItemStatus;
use crate::forms::optional_multiline;

const REVIEW_MAX_LEN: u64 = 1000;
const NOTES_MAX_LEN: u64 = 500;

/// Result type returned by the order form helpers.
pub type OrderFormResult<T> = Result<T, OrderFormError>;

#[derive(Debug, Error)]
pub enum OrderFormError {
    #[error("Datos inválidos: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Estado inválido: `{0}`")]
    InvalidStatus(String),
}

/// Rating left by the customer once the order was delivered.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewForm {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[serde(default)]
    #[validate(length(max = REVIEW_MAX_LEN))]
    pub review: Option<String>,
}

impl ReviewForm {
    pub fn into_review(self) -> OrderFormResult<(i32, Option<String>)> {
        self.validate()?;
        Ok((self.rating, optional_multiline(self.review.as_deref())))
    }
}

/// Coarse order status change requested from the admin screen.
#[derive(Debug, Deserialize, Validate)]
pub struct OrderStatusForm {
    pub status: String,
    #[serde(default)]
    #[validate(length(max = NOTES_MAX_LEN))]
    pub notes: Option<String>,
}

impl OrderStatusForm {
    pub fn into_status(self) -> OrderFormResult<(OrderStatus, Option<String>)> {
        self.validate()?;
        let status = OrderStatus::parse(self.status.trim())
            .ok_or_else(|| OrderFormError::InvalidStatus(self.status.clone()))?;
        Ok((status, optional_multiline(self.notes.as_deref())))
    }
}

/// Item status change posted by the kitchen, bar and waiter dashboards.
#[derive(Debug, Deserialize)]
pub struct ItemStatusForm {
    pub status: String,
}

impl ItemStatusForm {
    pub fn status(&self) -> OrderFormResult<OrderItemStatus> {
        OrderItemStatus::parse(self.status.trim())
            .ok_or_else(|| OrderFormError::InvalidStatus(self.status.clone()))
    }
}
