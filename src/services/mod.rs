//! Use cases shared by the HTML and JSON routes.

use chrono::{Local, NaiveDateTime, NaiveTime, TimeZone};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::repository::errors::RepositoryError;
use pushkind_common::routes::check_role;
use thiserror::Error;

use crate::ADMIN_ROLE;
use crate::domain::order::OrderStatus;
use crate::domain::order_item::OrderItemStatus;
use crate::domain::staff::{StaffMember, StaffRole, StaffStatus};
use crate::domain::tenant::TenantContext;
use crate::repository::StaffReader;

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod menu_admin;
pub mod notifications;
pub mod orders;
pub mod qr;
pub mod staff;
pub mod stations;
pub mod table_sessions;
pub mod tables;
pub mod tenancy;
pub mod waiter;

/// Result type returned by every service.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{0}")]
    Form(String),
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("table session expired")]
    SessionExpired,
    #[error("cart is empty")]
    EmptyCart,
    #[error("repository error: {0}")]
    Repository(RepositoryError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}

impl ServiceError {
    pub(crate) fn order_transition(from: OrderStatus, to: OrderStatus) -> Self {
        ServiceError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }

    pub(crate) fn item_transition(from: OrderItemStatus, to: OrderItemStatus) -> Self {
        ServiceError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }
}

/// Wall-clock time of a UTC timestamp. Shifts and opening hours are entered
/// in local time while stored timestamps are UTC.
pub(crate) fn wall_clock(now: NaiveDateTime) -> NaiveTime {
    Local.from_utc_datetime(&now).time()
}

/// The user belongs to this tenant and holds one of `roles`.
pub(crate) fn ensure_staff(
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    roles: &[&str],
) -> ServiceResult<()> {
    if user.hub_id != tenant.tenant_id() {
        return Err(ServiceError::Unauthorized);
    }
    if roles.iter().any(|role| check_role(role, &user.roles)) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

pub(crate) fn ensure_admin(user: &AuthenticatedUser, tenant: &TenantContext) -> ServiceResult<()> {
    ensure_staff(user, tenant, &[ADMIN_ROLE])
}

/// Staff row of the authenticated user, matched by e-mail.
///
/// Fails with `Unauthorized` when the user has no row of `role` in the tenant.
pub(crate) fn current_staff<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    role: StaffRole,
) -> ServiceResult<StaffMember>
where
    R: StaffReader + ?Sized,
{
    ensure_staff(user, tenant, &[role.access_role()])?;

    let member = repo
        .get_staff_by_email(&user.email.to_lowercase(), tenant.tenant_id())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::Unauthorized)?;

    if member.role != role || member.status == StaffStatus::Inactive {
        return Err(ServiceError::Unauthorized);
    }
    Ok(member)
}
