use chrono::{Duration, Local};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::tenant::{
    NewRestaurant, NewTenant, RESERVED_SLUGS, SubscriptionPlan, TenantStatus,
};
use crate::forms::{optional_inline, optional_multiline, parse_optional_time, sanitize_inline_text, slugify};

const NAME_MAX_LEN: u64 = 200;
const SLUG_MAX_LEN: u64 = 50;
const TRIAL_DAYS: i64 = 30;

/// Result type returned by the tenant form helpers.
pub type TenantFormResult<T> = Result<T, TenantFormError>;

#[derive(Debug, Error)]
pub enum TenantFormError {
    #[error("Datos inválidos: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("El nombre es obligatorio")]
    EmptyName,
    #[error("El identificador `{0}` está reservado")]
    ReservedSlug(String),
    #[error("No se pudo generar un identificador a partir del nombre")]
    EmptySlug,
    #[error("Plan inválido: `{0}`")]
    InvalidPlan(String),
    #[error("Estado inválido: `{0}`")]
    InvalidStatus(String),
    #[error("Color inválido: `{0}`")]
    InvalidColor(String),
    #[error("Horario inválido: `{0}`")]
    InvalidHours(String),
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|ch| ch.is_ascii_hexdigit())
}

/// Form payload emitted when onboarding a tenant and its restaurant.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateTenantForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    /// Generated from the name when blank.
    #[serde(default)]
    #[validate(length(max = SLUG_MAX_LEN))]
    pub slug: Option<String>,
    #[serde(default)]
    pub subscription_plan: String,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub restaurant_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(email)]
    pub owner_email: String,
    #[serde(default)]
    pub opening_time: Option<String>,
    #[serde(default)]
    pub closing_time: Option<String>,
}

impl CreateTenantForm {
    pub fn into_new_tenant(mut self) -> TenantFormResult<(NewTenant, NewRestaurant)> {
        if self.email.as_deref().is_some_and(|email| email.trim().is_empty()) {
            self.email = None;
        }
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        let restaurant_name = sanitize_inline_text(&self.restaurant_name);
        if name.is_empty() || restaurant_name.is_empty() {
            return Err(TenantFormError::EmptyName);
        }

        let slug = match self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => slugify(explicit),
            None => slugify(&name),
        };
        if slug.is_empty() {
            return Err(TenantFormError::EmptySlug);
        }
        if RESERVED_SLUGS.contains(&slug.as_str()) {
            return Err(TenantFormError::ReservedSlug(slug));
        }

        let plan = match self.subscription_plan.trim() {
            "" => SubscriptionPlan::Basic,
            value => SubscriptionPlan::parse(value)
                .ok_or_else(|| TenantFormError::InvalidPlan(value.to_string()))?,
        };

        let now = Local::now().naive_utc();
        let mut tenant = NewTenant::new(name, slug)
            .with_plan(plan)
            .with_trial_ends_at(now + Duration::days(TRIAL_DAYS));
        if let Some(color) = optional_inline(self.primary_color.as_deref()) {
            if !is_hex_color(&color) {
                return Err(TenantFormError::InvalidColor(color));
            }
            tenant = tenant.with_primary_color(color);
        }
        if let Some(domain) = optional_inline(self.domain.as_deref()) {
            tenant = tenant.with_domain(domain.to_lowercase());
        }

        let opening = parse_optional_time(self.opening_time.as_deref())
            .map_err(TenantFormError::InvalidHours)?;
        let closing = parse_optional_time(self.closing_time.as_deref())
            .map_err(TenantFormError::InvalidHours)?;

        let mut restaurant = NewRestaurant::new(restaurant_name, self.owner_email.trim().to_lowercase())
            .with_address(sanitize_inline_text(&self.address))
            .with_phone(sanitize_inline_text(&self.phone));
        if let Some(email) = optional_inline(self.email.as_deref()) {
            restaurant = restaurant.with_email(email);
        }
        if let (Some(opening), Some(closing)) = (opening, closing) {
            restaurant = restaurant.with_hours(opening, closing);
        }
        restaurant.description = optional_multiline(self.description.as_deref());

        Ok((tenant, restaurant))
    }
}

/// Form payload emitted by the tenant status selector.
#[derive(Debug, Deserialize)]
pub struct TenantStatusForm {
    pub status: String,
}

impl TenantStatusForm {
    pub fn status(&self) -> TenantFormResult<TenantStatus> {
        TenantStatus::parse(self.status.trim())
            .ok_or_else(|| TenantFormError::InvalidStatus(self.status.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> CreateTenantForm {
        CreateTenantForm {
            name: "La Cocina de María".to_string(),
            restaurant_name: "La Cocina de María".to_string(),
            owner_email: "maria@example.com".to_string(),
            email: Some(String::new()),
            opening_time: Some("11:00".to_string()),
            closing_time: Some("23:00".to_string()),
            ..CreateTenantForm::default()
        }
    }

    #[test]
    fn slug_is_generated_from_name() {
        let (tenant, restaurant) = form().into_new_tenant().expect("valid tenant");
        assert_eq!(tenant.slug, "la-cocina-de-maria");
        assert_eq!(tenant.status, TenantStatus::Trial);
        assert!(tenant.trial_ends_at.is_some());
        assert!(restaurant.opening_time.is_some());
        assert_eq!(restaurant.email, "");
    }

    #[test]
    fn reserved_slugs_are_rejected() {
        let mut input = form();
        input.slug = Some("Admin".to_string());
        assert!(matches!(
            input.into_new_tenant(),
            Err(TenantFormError::ReservedSlug(slug)) if slug == "admin"
        ));
    }

    #[test]
    fn color_must_be_hex() {
        let mut input = form();
        input.primary_color = Some("orange".to_string());
        assert!(matches!(
            input.into_new_tenant(),
            Err(TenantFormError::InvalidColor(_))
        ));
    }

    #[test]
    fn status_form_parses_known_values() {
        let form = TenantStatusForm {
            status: "SUSPENDED".to_string(),
        };
        assert_eq!(form.status().ok(), Some(TenantStatus::Suspended));
        let form = TenantStatusForm {
            status: "gone".to_string(),
        };
        assert!(form.status().is_err());
    }
}
