use chrono::{Local, NaiveDateTime, NaiveTime};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

labeled_enum! {
    /// Subscription state of a tenant. Only operational tenants are served.
    pub enum TenantStatus {
        Trial => ("TRIAL", "Prueba"),
        Active => ("ACTIVE", "Activo"),
        Suspended => ("SUSPENDED", "Suspendido"),
        Expired => ("EXPIRED", "Expirado"),
    }
    fallback = Suspended;
}

impl TenantStatus {
    /// Whether requests for this tenant may be served.
    pub fn is_operational(self) -> bool {
        matches!(self, TenantStatus::Trial | TenantStatus::Active)
    }
}

labeled_enum! {
    /// Commercial plan a tenant subscribes to.
    pub enum SubscriptionPlan {
        Basic => ("BASIC", "Básico"),
        Professional => ("PROFESSIONAL", "Profesional"),
        Enterprise => ("ENTERPRISE", "Empresarial"),
    }
    fallback = Basic;
}

/// Path segments that can never be used as a tenant slug.
pub const RESERVED_SLUGS: &[&str] = &[
    "admin", "api", "assets", "static", "media", "platform", "na", "logout", "favicon.ico",
];

/// A customer organisation of the platform.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Tenant {
    pub id: i32,
    pub name: String,
    /// First URL path segment identifying the tenant.
    pub slug: String,
    pub status: TenantStatus,
    pub subscription_plan: SubscriptionPlan,
    /// Brand color used by the customer facing templates.
    pub primary_color: String,
    /// Custom domain, used as the base of generated QR URLs.
    pub domain: Option<String>,
    pub trial_ends_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new tenant.
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    pub slug: String,
    pub status: TenantStatus,
    pub subscription_plan: SubscriptionPlan,
    pub primary_color: String,
    pub domain: Option<String>,
    pub trial_ends_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl NewTenant {
    /// Build a tenant in trial on the basic plan.
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            status: TenantStatus::Trial,
            subscription_plan: SubscriptionPlan::Basic,
            primary_color: "#e67e22".to_string(),
            domain: None,
            trial_ends_at: None,
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn with_status(mut self, status: TenantStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_plan(mut self, plan: SubscriptionPlan) -> Self {
        self.subscription_plan = plan;
        self
    }

    pub fn with_primary_color(mut self, color: impl Into<String>) -> Self {
        self.primary_color = color.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_trial_ends_at(mut self, trial_ends_at: NaiveDateTime) -> Self {
        self.trial_ends_at = Some(trial_ends_at);
        self
    }
}

/// The single restaurant operated by a tenant.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Restaurant {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub owner_email: String,
    pub is_active: bool,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Restaurant {
    /// Checks business hours. Missing hours mean always open; a closing time
    /// earlier than the opening time wraps past midnight.
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        if !self.is_active {
            return false;
        }
        match (self.opening_time, self.closing_time) {
            (Some(open), Some(close)) if open <= close => time >= open && time <= close,
            (Some(open), Some(close)) => time >= open || time <= close,
            _ => true,
        }
    }
}

/// Payload required to insert the restaurant of a new tenant.
#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub owner_email: String,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub updated_at: NaiveDateTime,
}

impl NewRestaurant {
    pub fn new(name: impl Into<String>, owner_email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            owner_email: owner_email.into(),
            opening_time: None,
            closing_time: None,
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_hours(mut self, opening: NaiveTime, closing: NaiveTime) -> Self {
        self.opening_time = Some(opening);
        self.closing_time = Some(closing);
        self
    }
}

/// Tenant resolved for the current request together with its restaurant.
#[derive(Debug, Serialize, Clone)]
pub struct TenantContext {
    pub tenant: Tenant,
    pub restaurant: Restaurant,
}

impl TenantContext {
    pub fn tenant_id(&self) -> i32 {
        self.tenant.id
    }

    pub fn slug(&self) -> &str {
        &self.tenant.slug
    }

    /// Absolute path inside the tenant prefix, e.g. `/sushi/menu/`.
    pub fn path(&self, suffix: &str) -> String {
        let suffix = suffix.trim_start_matches('/');
        format!("/{}/{}", self.tenant.slug, suffix)
    }
}

/// Query definition used to list tenants on the platform.
#[derive(Debug, Clone)]
pub struct TenantListQuery {
    pub status: Option<TenantStatus>,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl TenantListQuery {
    pub fn new() -> Self {
        Self {
            status: None,
            search: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: TenantStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

impl Default for TenantListQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn restaurant(opening: Option<(u32, u32)>, closing: Option<(u32, u32)>) -> Restaurant {
        let stamp = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Restaurant {
            id: 1,
            tenant_id: 1,
            name: "Casa".to_string(),
            description: None,
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            owner_email: "owner@example.com".to_string(),
            is_active: true,
            opening_time: opening.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            closing_time: closing.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            created_at: stamp,
            updated_at: stamp,
        }
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
    }

    #[test]
    fn only_trial_and_active_are_operational() {
        assert!(TenantStatus::Trial.is_operational());
        assert!(TenantStatus::Active.is_operational());
        assert!(!TenantStatus::Suspended.is_operational());
        assert!(!TenantStatus::Expired.is_operational());
    }

    #[test]
    fn unknown_status_decodes_as_suspended() {
        assert_eq!(TenantStatus::from("ACTIVE"), TenantStatus::Active);
        assert_eq!(TenantStatus::from("bogus"), TenantStatus::Suspended);
    }

    #[test]
    fn business_hours_within_same_day() {
        let r = restaurant(Some((9, 0)), Some((22, 0)));
        assert!(r.is_open_at(at(12, 0)));
        assert!(!r.is_open_at(at(23, 0)));
    }

    #[test]
    fn business_hours_wrap_midnight() {
        let r = restaurant(Some((18, 0)), Some((2, 0)));
        assert!(r.is_open_at(at(23, 30)));
        assert!(r.is_open_at(at(1, 0)));
        assert!(!r.is_open_at(at(10, 0)));
    }

    #[test]
    fn missing_hours_mean_always_open() {
        assert!(restaurant(None, None).is_open_at(at(4, 0)));
    }

    #[test]
    fn tenant_paths_are_prefixed_with_slug() {
        let stamp = NaiveDateTime::default();
        let ctx = TenantContext {
            tenant: Tenant {
                id: 1,
                name: "Casa".to_string(),
                slug: "casa".to_string(),
                status: TenantStatus::Active,
                subscription_plan: SubscriptionPlan::Basic,
                primary_color: "#000".to_string(),
                domain: None,
                trial_ends_at: None,
                created_at: stamp,
                updated_at: stamp,
            },
            restaurant: restaurant(None, None),
        };
        assert_eq!(ctx.path("/menu/"), "/casa/menu/");
        assert_eq!(ctx.path("orders/checkout/"), "/casa/orders/checkout/");
    }
}
