use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Serialize;

use crate::domain::staff::{StaffListQuery, StaffMember, StaffRole};
use crate::domain::table::{Table, TableListQuery};
use crate::domain::tenant::TenantContext;
use crate::forms::tables::{AddTableForm, AssignWaiterForm, EditTableForm};
use crate::repository::{StaffReader, TableReader, TableWriter};
use crate::services::{ServiceError, ServiceResult, ensure_admin};

#[derive(Debug, Serialize)]
pub struct TableRow {
    pub table: Table,
    pub display_name: String,
    pub waiter_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TablesPage {
    pub tables: Vec<TableRow>,
    pub waiters: Vec<StaffMember>,
}

fn waiters_of<R>(repo: &R, tenant_id: i32) -> ServiceResult<Vec<StaffMember>>
where
    R: StaffReader + ?Sized,
{
    repo.list_staff(
        StaffListQuery::new(tenant_id)
            .role(StaffRole::Waiter)
            .only_active(),
    )
    .map_err(ServiceError::from)
}

/// The waiter must be an active waiter of the tenant.
fn ensure_waiter<R>(repo: &R, tenant_id: i32, waiter_id: Option<i32>) -> ServiceResult<()>
where
    R: StaffReader + ?Sized,
{
    let Some(waiter_id) = waiter_id else {
        return Ok(());
    };
    match repo
        .get_staff_by_id(waiter_id, tenant_id)
        .map_err(ServiceError::from)?
    {
        Some(staff) if staff.role == StaffRole::Waiter => Ok(()),
        _ => Err(ServiceError::Form("Mesero inválido".to_string())),
    }
}

fn ensure_number_free<R>(
    repo: &R,
    tenant_id: i32,
    number: &str,
    except: Option<i32>,
) -> ServiceResult<()>
where
    R: TableReader + ?Sized,
{
    match repo
        .get_table_by_number(number, tenant_id)
        .map_err(ServiceError::from)?
    {
        Some(existing) if Some(existing.id) != except => Err(ServiceError::Conflict(format!(
            "Ya existe la mesa {number}"
        ))),
        _ => Ok(()),
    }
}

pub fn list_tables<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
) -> ServiceResult<TablesPage>
where
    R: TableReader + StaffReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let waiters = waiters_of(repo, tenant_id)?;
    let tables = repo
        .list_tables(TableListQuery::new(tenant_id).include_inactive())
        .map_err(ServiceError::from)?
        .into_iter()
        .map(|table| TableRow {
            display_name: table.display_name(),
            waiter_name: table.assigned_waiter_id.and_then(|waiter_id| {
                waiters
                    .iter()
                    .find(|waiter| waiter.id == waiter_id)
                    .map(|waiter| waiter.name.clone())
            }),
            table,
        })
        .collect();

    Ok(TablesPage { tables, waiters })
}

pub fn get_table<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    table_id: i32,
) -> ServiceResult<Table>
where
    R: TableReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    repo.get_table_by_id(table_id, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_table<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    form: AddTableForm,
) -> ServiceResult<Table>
where
    R: TableReader + TableWriter + StaffReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let new_table = form
        .into_new_table(tenant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    ensure_number_free(repo, tenant_id, &new_table.number, None)?;
    ensure_waiter(repo, tenant_id, new_table.assigned_waiter_id)?;

    let table = repo.create_table(&new_table).map_err(ServiceError::from)?;
    log::info!("Table {} created for tenant {}", table.number, tenant_id);
    Ok(table)
}

pub fn update_table<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    table_id: i32,
    form: EditTableForm,
) -> ServiceResult<Table>
where
    R: TableReader + TableWriter + StaffReader + ?Sized,
{
    let table = get_table(repo, user, tenant, table_id)?;
    let tenant_id = tenant.tenant_id();

    let updates = form
        .into_update_table()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    ensure_number_free(repo, tenant_id, &updates.number, Some(table.id))?;
    ensure_waiter(repo, tenant_id, updates.assigned_waiter_id)?;

    repo.update_table(table.id, tenant_id, &updates)
        .map_err(ServiceError::from)
}

pub fn delete_table<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    table_id: i32,
) -> ServiceResult<()>
where
    R: TableReader + TableWriter + ?Sized,
{
    let table = get_table(repo, user, tenant, table_id)?;
    repo.delete_table(table.id, tenant.tenant_id())
        .map_err(ServiceError::from)
}

pub fn assign_waiter<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    table_id: i32,
    form: AssignWaiterForm,
) -> ServiceResult<Table>
where
    R: TableReader + TableWriter + StaffReader + ?Sized,
{
    let table = get_table(repo, user, tenant, table_id)?;
    let tenant_id = tenant.tenant_id();

    let waiter_id = form
        .staff_id()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    ensure_waiter(repo, tenant_id, waiter_id)?;

    repo.assign_waiter(table.id, tenant_id, waiter_id)
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ADMIN_ROLE;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{
        sample_staff, sample_table, tenant_context, user_with_roles,
    };

    fn admin() -> AuthenticatedUser {
        user_with_roles(&[ADMIN_ROLE])
    }

    fn add_form(number: &str) -> AddTableForm {
        AddTableForm {
            number: number.to_string(),
            name: None,
            capacity: 4,
            location: None,
            assigned_waiter_id: None,
        }
    }

    #[test]
    fn duplicate_number_conflicts() {
        let mut repo = FakeRepo::new();
        repo.table_reader
            .expect_get_table_by_number()
            .returning(|number, _| Ok(Some(sample_table(2, number))));
        repo.table_writer.expect_create_table().never();

        let result = create_table(&repo, &admin(), &tenant_context(), add_form("5"));
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn renaming_to_own_number_is_allowed() {
        let mut repo = FakeRepo::new();
        repo.table_reader
            .expect_get_table_by_id()
            .returning(|id, _| Ok(Some(sample_table(id, "5"))));
        repo.table_reader
            .expect_get_table_by_number()
            .returning(|number, _| Ok(Some(sample_table(4, number))));
        repo.table_writer
            .expect_update_table()
            .times(1)
            .returning(|id, _, updates| {
                let mut table = sample_table(id, &updates.number);
                table.capacity = updates.capacity;
                Ok(table)
            });

        let form = EditTableForm {
            number: "5".to_string(),
            name: None,
            capacity: 8,
            location: None,
            qr_enabled: true,
            is_active: true,
            assigned_waiter_id: None,
        };
        let table = update_table(&repo, &admin(), &tenant_context(), 4, form).expect("updated");
        assert_eq!(table.capacity, 8);
    }

    #[test]
    fn only_waiters_are_assignable() {
        let mut repo = FakeRepo::new();
        repo.table_reader
            .expect_get_table_by_id()
            .returning(|id, _| Ok(Some(sample_table(id, "1"))));
        repo.staff_reader
            .expect_get_staff_by_id()
            .returning(|id, _| Ok(Some(sample_staff(id, StaffRole::Kitchen, "k@example.com"))));
        repo.table_writer.expect_assign_waiter().never();

        let form = AssignWaiterForm {
            staff_id: Some("3".to_string()),
        };
        let result = assign_waiter(&repo, &admin(), &tenant_context(), 1, form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn blank_assignment_releases_table() {
        let mut repo = FakeRepo::new();
        repo.table_reader
            .expect_get_table_by_id()
            .returning(|id, _| Ok(Some(sample_table(id, "1"))));
        repo.table_writer
            .expect_assign_waiter()
            .times(1)
            .withf(|_, _, waiter_id| waiter_id.is_none())
            .returning(|id, _, _| Ok(sample_table(id, "1")));

        let table = assign_waiter(
            &repo,
            &admin(),
            &tenant_context(),
            1,
            AssignWaiterForm::default(),
        )
        .expect("released");
        assert_eq!(table.assigned_waiter_id, None);
    }
}
