use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Serialize;

use crate::domain::staff::{StaffListQuery, StaffMember, StaffRole, next_employee_id};
use crate::domain::table::TableListQuery;
use crate::domain::tenant::TenantContext;
use crate::forms::staff::{AddStaffForm, EditStaffForm};
use crate::repository::{StaffReader, StaffWriter, TableReader};
use crate::services::{ServiceError, ServiceResult, ensure_admin};

#[derive(Debug, Serialize)]
pub struct StaffRow {
    pub member: StaffMember,
    pub role_label: &'static str,
    pub status_label: &'static str,
    pub assigned_tables: usize,
}

#[derive(Debug, Serialize)]
pub struct StaffPage {
    pub staff: Vec<StaffRow>,
    pub roles: Vec<(&'static str, &'static str)>,
    pub role_filter: Option<StaffRole>,
}

pub fn list_staff<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    role: Option<&str>,
) -> ServiceResult<StaffPage>
where
    R: StaffReader + TableReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let role_filter = role.and_then(StaffRole::parse);
    let mut query = StaffListQuery::new(tenant_id);
    if let Some(role) = role_filter {
        query = query.role(role);
    }

    let tables = repo
        .list_tables(TableListQuery::new(tenant_id))
        .map_err(ServiceError::from)?;
    let staff = repo
        .list_staff(query)
        .map_err(ServiceError::from)?
        .into_iter()
        .map(|member| StaffRow {
            role_label: member.role.label(),
            status_label: member.status.label(),
            assigned_tables: tables
                .iter()
                .filter(|table| table.assigned_waiter_id == Some(member.id))
                .count(),
            member,
        })
        .collect();

    Ok(StaffPage {
        staff,
        roles: StaffRole::ALL
            .iter()
            .map(|role| (role.as_str(), role.label()))
            .collect(),
        role_filter,
    })
}

pub fn get_staff<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    staff_id: i32,
) -> ServiceResult<StaffMember>
where
    R: StaffReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    repo.get_staff_by_id(staff_id, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

/// Registers a member. A blank employee id gets the next one of the role.
pub fn create_staff<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    form: AddStaffForm,
) -> ServiceResult<StaffMember>
where
    R: StaffReader + StaffWriter + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let mut new_staff = form
        .into_new_staff(tenant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if repo
        .get_staff_by_email(&new_staff.email, tenant_id)
        .map_err(ServiceError::from)?
        .is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "Ya existe personal con el correo {}",
            new_staff.email
        )));
    }

    let existing = repo
        .list_employee_ids(tenant_id, new_staff.role)
        .map_err(ServiceError::from)?;
    if new_staff.employee_id.is_empty() {
        new_staff.employee_id =
            next_employee_id(new_staff.role, existing.iter().map(String::as_str));
    } else if existing.contains(&new_staff.employee_id) {
        return Err(ServiceError::Conflict(format!(
            "El código {} ya está en uso",
            new_staff.employee_id
        )));
    }

    let member = repo.create_staff(&new_staff).map_err(ServiceError::from)?;
    log::info!(
        "Staff {} ({}) registered for tenant {}",
        member.employee_id,
        member.role,
        tenant_id
    );
    Ok(member)
}

pub fn update_staff<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    staff_id: i32,
    form: EditStaffForm,
) -> ServiceResult<StaffMember>
where
    R: StaffReader + StaffWriter + ?Sized,
{
    let member = get_staff(repo, user, tenant, staff_id)?;
    let updates = form
        .into_update_staff()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_staff(member.id, tenant.tenant_id(), &updates)
        .map_err(ServiceError::from)
}

pub fn delete_staff<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    staff_id: i32,
) -> ServiceResult<()>
where
    R: StaffReader + StaffWriter + ?Sized,
{
    let member = get_staff(repo, user, tenant, staff_id)?;
    repo.delete_staff(member.id, tenant.tenant_id())
        .map_err(ServiceError::from)?;
    log::info!("Staff {} removed from tenant {}", member.employee_id, tenant.tenant_id());
    Ok(())
}
