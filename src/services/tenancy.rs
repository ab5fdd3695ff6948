//! Tenant resolution and platform administration.

use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use pushkind_common::routes::check_role;
use serde::{Deserialize, Serialize};

use crate::PLATFORM_ADMIN_ROLE;
use crate::domain::tenant::{Tenant, TenantContext, TenantListQuery, TenantStatus};
use crate::forms::tenants::{CreateTenantForm, TenantStatusForm};
use crate::repository::{TenantReader, TenantWriter};
use crate::services::{ServiceError, ServiceResult};

/// Loads the tenant named by `slug` when it may be served.
pub fn resolve_tenant<R>(repo: &R, slug: &str) -> ServiceResult<TenantContext>
where
    R: TenantReader + ?Sized,
{
    repo.get_tenant_context(slug)
        .map_err(ServiceError::from)?
        .filter(|context| context.tenant.status.is_operational())
        .ok_or(ServiceError::NotFound)
}

fn ensure_platform_admin(user: &AuthenticatedUser) -> ServiceResult<()> {
    if check_role(PLATFORM_ADMIN_ROLE, &user.roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Query string accepted by the tenant list.
#[derive(Debug, Default, Deserialize)]
pub struct TenantListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TenantsPage {
    pub tenants: Paginated<Tenant>,
    pub statuses: &'static [TenantStatus],
    pub status_filter: Option<TenantStatus>,
    pub search: Option<String>,
}

pub fn list_tenants<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: TenantListParams,
) -> ServiceResult<TenantsPage>
where
    R: TenantReader + ?Sized,
{
    ensure_platform_admin(user)?;

    let status_filter = params.status.as_deref().and_then(TenantStatus::parse);
    let search = params
        .search
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty());
    let page = params.page.unwrap_or(1).max(1);

    let mut query = TenantListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(status) = status_filter {
        query = query.status(status);
    }
    if let Some(term) = &search {
        query = query.search(term.clone());
    }

    let (total, tenants) = repo.list_tenants(query).map_err(ServiceError::from)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

    Ok(TenantsPage {
        tenants: Paginated::new(tenants, page, total_pages),
        statuses: TenantStatus::ALL,
        status_filter,
        search,
    })
}

/// Onboards a tenant together with its restaurant.
pub fn create_tenant<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateTenantForm,
) -> ServiceResult<TenantContext>
where
    R: TenantReader + TenantWriter + ?Sized,
{
    ensure_platform_admin(user)?;

    let (new_tenant, new_restaurant) = form
        .into_new_tenant()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if repo
        .get_tenant_by_slug(&new_tenant.slug)
        .map_err(ServiceError::from)?
        .is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "El identificador `{}` ya está en uso",
            new_tenant.slug
        )));
    }

    let context = repo
        .create_tenant(&new_tenant, &new_restaurant)
        .map_err(ServiceError::from)?;
    log::info!(
        "Tenant {} ({}) created by {}",
        context.tenant.slug,
        context.tenant.id,
        user.email
    );
    Ok(context)
}

pub fn change_tenant_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant_id: i32,
    form: TenantStatusForm,
) -> ServiceResult<Tenant>
where
    R: TenantReader + TenantWriter + ?Sized,
{
    ensure_platform_admin(user)?;

    let status = form
        .status()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let tenant = repo
        .get_tenant_by_id(tenant_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    let updated = repo
        .update_tenant_status(tenant.id, status)
        .map_err(ServiceError::from)?;
    log::info!(
        "Tenant {} moved from {} to {} by {}",
        tenant.slug,
        tenant.status,
        updated.status,
        user.email
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ADMIN_ROLE;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{tenant_context, user_with_roles};

    fn tenant_form() -> CreateTenantForm {
        CreateTenantForm {
            name: "El Fogón".to_string(),
            restaurant_name: "El Fogón".to_string(),
            owner_email: "duena@elfogon.co".to_string(),
            ..CreateTenantForm::default()
        }
    }

    #[test]
    fn suspended_tenants_do_not_resolve() {
        let mut repo = FakeRepo::new();
        repo.tenant_reader.expect_get_tenant_context().returning(|_| {
            let mut context = tenant_context();
            context.tenant.status = TenantStatus::Suspended;
            Ok(Some(context))
        });

        let result = resolve_tenant(&repo, "la-esquina");
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn trial_tenants_resolve() {
        let mut repo = FakeRepo::new();
        repo.tenant_reader.expect_get_tenant_context().returning(|_| {
            let mut context = tenant_context();
            context.tenant.status = TenantStatus::Trial;
            Ok(Some(context))
        });

        let context = resolve_tenant(&repo, "la-esquina").expect("resolved");
        assert_eq!(context.slug(), "la-esquina");
    }

    #[test]
    fn restaurant_admins_are_not_platform_admins() {
        let repo = FakeRepo::new();
        let result = create_tenant(&repo, &user_with_roles(&[ADMIN_ROLE]), tenant_form());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn duplicate_slug_conflicts() {
        let mut repo = FakeRepo::new();
        repo.tenant_reader
            .expect_get_tenant_by_slug()
            .withf(|slug| slug == "el-fogon")
            .returning(|_| Ok(Some(tenant_context().tenant)));
        repo.tenant_writer.expect_create_tenant().never();

        let result = create_tenant(
            &repo,
            &user_with_roles(&[PLATFORM_ADMIN_ROLE]),
            tenant_form(),
        );
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn status_change_is_applied() {
        let mut repo = FakeRepo::new();
        repo.tenant_reader
            .expect_get_tenant_by_id()
            .returning(|_| Ok(Some(tenant_context().tenant)));
        repo.tenant_writer
            .expect_update_tenant_status()
            .times(1)
            .returning(|_, status| {
                let mut tenant = tenant_context().tenant;
                tenant.status = status;
                Ok(tenant)
            });

        let tenant = change_tenant_status(
            &repo,
            &user_with_roles(&[PLATFORM_ADMIN_ROLE]),
            9,
            TenantStatusForm {
                status: "SUSPENDED".to_string(),
            },
        )
        .expect("updated");
        assert_eq!(tenant.status, TenantStatus::Suspended);
    }
}
