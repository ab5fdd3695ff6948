use serde::Deserialize;
use validator::Validate;

use crate::forms::{optional_inline, optional_multiline};

/// Form payload emitted when a waiter closes every session of a table.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CloseTableForm {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub reason: Option<String>,
}

impl CloseTableForm {
    pub fn reason(&self) -> Option<String> {
        optional_inline(self.reason.as_deref())
    }
}

/// Availability toggle posted from the waiter dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityForm {
    #[serde(default)]
    pub is_available: bool,
}

/// Customer request for the table's waiter.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CallWaiterForm {
    #[serde(default)]
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

impl CallWaiterForm {
    pub fn message(&self) -> Option<String> {
        optional_multiline(self.message.as_deref())
    }
}

/// Query string accepted by the notification list.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}
