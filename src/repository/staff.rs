use chrono::{Local, NaiveDateTime};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::staff::{
        LegacyMigrationReport, LegacyWaiter as DomainLegacyWaiter,
        NewStaffMember as DomainNewStaffMember, StaffListQuery,
        StaffMember as DomainStaffMember, StaffRole, StaffStatus,
        UpdateStaffMember as DomainUpdateStaffMember, next_employee_id,
    },
    models::staff::{
        LegacyWaiter as DbLegacyWaiter, NewStaffMember as DbNewStaffMember,
        StaffMember as DbStaffMember, UpdateStaffMember as DbUpdateStaffMember,
    },
    repository::{DieselRepository, StaffReader, StaffWriter},
    schema::staff_members,
};

fn employee_ids(
    conn: &mut SqliteConnection,
    tenant_id: i32,
    role: StaffRole,
) -> RepositoryResult<Vec<String>> {
    Ok(staff_members::table
        .filter(staff_members::tenant_id.eq(tenant_id))
        .filter(staff_members::role.eq(role.as_str()))
        .select(staff_members::employee_id)
        .load::<String>(conn)?)
}

impl StaffReader for DieselRepository {
    fn get_staff_by_id(
        &self,
        id: i32,
        tenant_id: i32,
    ) -> RepositoryResult<Option<DomainStaffMember>> {
        let mut conn = self.conn()?;
        let staff = staff_members::table
            .filter(staff_members::id.eq(id))
            .filter(staff_members::tenant_id.eq(tenant_id))
            .first::<DbStaffMember>(&mut conn)
            .optional()?;

        Ok(staff.map(Into::into))
    }

    fn get_staff_by_email(
        &self,
        email: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<DomainStaffMember>> {
        let mut conn = self.conn()?;
        let staff = staff_members::table
            .filter(staff_members::email.eq(email))
            .filter(staff_members::tenant_id.eq(tenant_id))
            .first::<DbStaffMember>(&mut conn)
            .optional()?;

        Ok(staff.map(Into::into))
    }

    fn list_staff(&self, query: StaffListQuery) -> RepositoryResult<Vec<DomainStaffMember>> {
        let mut conn = self.conn()?;

        let mut items = staff_members::table
            .filter(staff_members::tenant_id.eq(query.tenant_id))
            .into_boxed::<Sqlite>();

        if let Some(role) = query.role {
            items = items.filter(staff_members::role.eq(role.as_str()));
        }

        if query.only_active {
            items = items.filter(staff_members::status.eq(StaffStatus::Active.as_str()));
        }

        let staff = items
            .order((staff_members::role.asc(), staff_members::name.asc()))
            .load::<DbStaffMember>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(staff)
    }

    fn list_employee_ids(&self, tenant_id: i32, role: StaffRole) -> RepositoryResult<Vec<String>> {
        let mut conn = self.conn()?;
        employee_ids(&mut conn, tenant_id, role)
    }
}

impl StaffWriter for DieselRepository {
    fn create_staff(
        &self,
        new_staff: &DomainNewStaffMember,
    ) -> RepositoryResult<DomainStaffMember> {
        let mut conn = self.conn()?;

        let created = diesel::insert_into(staff_members::table)
            .values(&DbNewStaffMember::from(new_staff))
            .get_result::<DbStaffMember>(&mut conn)?;

        Ok(created.into())
    }

    fn update_staff(
        &self,
        staff_id: i32,
        tenant_id: i32,
        updates: &DomainUpdateStaffMember,
    ) -> RepositoryResult<DomainStaffMember> {
        let mut conn = self.conn()?;

        let target = staff_members::table
            .filter(staff_members::id.eq(staff_id))
            .filter(staff_members::tenant_id.eq(tenant_id));

        let updated = diesel::update(target)
            .set(&DbUpdateStaffMember::from(updates))
            .get_result::<DbStaffMember>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn delete_staff(&self, staff_id: i32, tenant_id: i32) -> RepositoryResult<()> {
        use crate::schema::{staff_notifications, tables};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            let deleted = diesel::delete(
                staff_members::table
                    .filter(staff_members::id.eq(staff_id))
                    .filter(staff_members::tenant_id.eq(tenant_id)),
            )
            .execute(conn)?;

            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }

            diesel::update(tables::table.filter(tables::assigned_waiter_id.eq(Some(staff_id))))
                .set(tables::assigned_waiter_id.eq::<Option<i32>>(None))
                .execute(conn)?;

            diesel::delete(
                staff_notifications::table.filter(staff_notifications::staff_id.eq(Some(staff_id))),
            )
            .execute(conn)?;

            Ok(())
        })
    }

    fn set_staff_availability(
        &self,
        staff_id: i32,
        tenant_id: i32,
        is_available: bool,
        at: NaiveDateTime,
    ) -> RepositoryResult<DomainStaffMember> {
        let mut conn = self.conn()?;

        let target = staff_members::table
            .filter(staff_members::id.eq(staff_id))
            .filter(staff_members::tenant_id.eq(tenant_id));

        let updated = diesel::update(target)
            .set((
                staff_members::is_available.eq(is_available),
                staff_members::last_active_at.eq(Some(at)),
                staff_members::updated_at.eq(at),
            ))
            .get_result::<DbStaffMember>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn migrate_legacy_waiters(&self, dry_run: bool) -> RepositoryResult<LegacyMigrationReport> {
        use crate::schema::{legacy_waiters, tables};

        let mut conn = self.conn()?;

        conn.transaction::<LegacyMigrationReport, RepositoryError, _>(|conn| {
            let legacy: Vec<DomainLegacyWaiter> = legacy_waiters::table
                .order(legacy_waiters::id.asc())
                .load::<DbLegacyWaiter>(conn)?
                .into_iter()
                .map(Into::into)
                .collect();

            let mut report = LegacyMigrationReport::default();

            for waiter in legacy {
                let existing = staff_members::table
                    .filter(staff_members::tenant_id.eq(waiter.tenant_id))
                    .filter(staff_members::email.eq(&waiter.email))
                    .select(staff_members::id)
                    .first::<i32>(conn)
                    .optional()?;

                let staff_id = match existing {
                    Some(id) => {
                        report.skipped.push(waiter.email.clone());
                        Some(id)
                    }
                    None => {
                        report.migrated.push(waiter.email.clone());
                        if dry_run {
                            None
                        } else {
                            let taken = employee_ids(conn, waiter.tenant_id, StaffRole::Waiter)?;
                            let employee_id = match waiter.employee_id.as_deref() {
                                Some(id) if !id.is_empty() && !taken.iter().any(|t| t == id) => {
                                    id.to_string()
                                }
                                _ => next_employee_id(
                                    StaffRole::Waiter,
                                    taken.iter().map(String::as_str),
                                ),
                            };

                            let status = if waiter.is_active {
                                StaffStatus::Active
                            } else {
                                StaffStatus::Inactive
                            };
                            let mut new_staff = DomainNewStaffMember::new(
                                waiter.tenant_id,
                                waiter.email.as_str(),
                                waiter.name.as_str(),
                                StaffRole::Waiter,
                                employee_id,
                            )
                            .with_status(status);
                            new_staff.phone = waiter.phone.clone();
                            new_staff.shift_start = waiter.shift_start;
                            new_staff.shift_end = waiter.shift_end;
                            new_staff.updated_at = Local::now().naive_utc();

                            let created = diesel::insert_into(staff_members::table)
                                .values(&DbNewStaffMember::from(&new_staff))
                                .get_result::<DbStaffMember>(conn)?;
                            Some(created.id)
                        }
                    }
                };

                let pointing = tables::table
                    .filter(tables::tenant_id.eq(waiter.tenant_id))
                    .filter(tables::legacy_waiter_id.eq(Some(waiter.id)))
                    .filter(tables::assigned_waiter_id.is_null());

                report.tables_repointed += match staff_id {
                    Some(staff_id) if !dry_run => diesel::update(pointing)
                        .set(tables::assigned_waiter_id.eq(Some(staff_id)))
                        .execute(conn)?,
                    _ => pointing.count().get_result::<i64>(conn)? as usize,
                };
            }

            Ok(report)
        })
    }
}
