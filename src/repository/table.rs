use chrono::Local;
use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::table::{
        NewTable as DomainNewTable, NewTableScanLog as DomainNewTableScanLog, ScanKind,
        Table as DomainTable, TableListQuery, TableScanLog as DomainTableScanLog,
        UpdateTable as DomainUpdateTable,
    },
    models::table::{
        NewTable as DbNewTable, NewTableScanLog as DbNewTableScanLog, Table as DbTable,
        TableScanLog as DbTableScanLog, UpdateTable as DbUpdateTable,
    },
    repository::{DieselRepository, TableReader, TableWriter},
};

impl TableReader for DieselRepository {
    fn get_table_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<DomainTable>> {
        use crate::schema::tables;

        let mut conn = self.conn()?;
        let table = tables::table
            .filter(tables::id.eq(id))
            .filter(tables::tenant_id.eq(tenant_id))
            .first::<DbTable>(&mut conn)
            .optional()?;

        Ok(table.map(Into::into))
    }

    fn get_table_by_uuid(
        &self,
        uuid: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<DomainTable>> {
        use crate::schema::tables;

        let mut conn = self.conn()?;
        let table = tables::table
            .filter(tables::qr_code_uuid.eq(uuid))
            .filter(tables::tenant_id.eq(tenant_id))
            .first::<DbTable>(&mut conn)
            .optional()?;

        Ok(table.map(Into::into))
    }

    fn get_table_by_number(
        &self,
        number: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<DomainTable>> {
        use crate::schema::tables;

        let mut conn = self.conn()?;
        let table = tables::table
            .filter(tables::number.eq(number))
            .filter(tables::tenant_id.eq(tenant_id))
            .first::<DbTable>(&mut conn)
            .optional()?;

        Ok(table.map(Into::into))
    }

    fn list_tables(&self, query: TableListQuery) -> RepositoryResult<Vec<DomainTable>> {
        use crate::schema::tables;

        let mut conn = self.conn()?;

        let mut items = tables::table
            .filter(tables::tenant_id.eq(query.tenant_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(waiter_id) = query.assigned_waiter_id {
            items = items.filter(tables::assigned_waiter_id.eq(Some(waiter_id)));
        }

        if !query.include_inactive {
            items = items.filter(tables::is_active.eq(true));
        }

        let tables = items
            .order(tables::number.asc())
            .load::<DbTable>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(tables)
    }
}

impl TableWriter for DieselRepository {
    fn create_table(&self, new_table: &DomainNewTable) -> RepositoryResult<DomainTable> {
        use crate::schema::tables;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(tables::table)
            .values(&DbNewTable::from(new_table))
            .get_result::<DbTable>(&mut conn)?;

        Ok(created.into())
    }

    fn update_table(
        &self,
        table_id: i32,
        tenant_id: i32,
        updates: &DomainUpdateTable,
    ) -> RepositoryResult<DomainTable> {
        use crate::schema::tables;

        let mut conn = self.conn()?;

        let target = tables::table
            .filter(tables::id.eq(table_id))
            .filter(tables::tenant_id.eq(tenant_id));

        let updated = diesel::update(target)
            .set(&DbUpdateTable::from(updates))
            .get_result::<DbTable>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn delete_table(&self, table_id: i32, tenant_id: i32) -> RepositoryResult<()> {
        use crate::schema::{orders, staff_notifications, table_scan_logs, tables};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            let exists = tables::table
                .filter(tables::id.eq(table_id))
                .filter(tables::tenant_id.eq(tenant_id))
                .select(tables::id)
                .first::<i32>(conn)
                .optional()?;

            if exists.is_none() {
                return Err(RepositoryError::NotFound);
            }

            diesel::update(orders::table.filter(orders::table_id.eq(Some(table_id))))
                .set(orders::table_id.eq::<Option<i32>>(None))
                .execute(conn)?;

            diesel::update(
                staff_notifications::table.filter(staff_notifications::table_id.eq(Some(table_id))),
            )
            .set(staff_notifications::table_id.eq::<Option<i32>>(None))
            .execute(conn)?;

            diesel::delete(table_scan_logs::table.filter(table_scan_logs::table_id.eq(table_id)))
                .execute(conn)?;

            diesel::delete(tables::table.filter(tables::id.eq(table_id))).execute(conn)?;

            Ok(())
        })
    }

    fn assign_waiter(
        &self,
        table_id: i32,
        tenant_id: i32,
        waiter_id: Option<i32>,
    ) -> RepositoryResult<DomainTable> {
        use crate::schema::tables;

        let mut conn = self.conn()?;

        let target = tables::table
            .filter(tables::id.eq(table_id))
            .filter(tables::tenant_id.eq(tenant_id));

        let updated = diesel::update(target)
            .set((
                tables::assigned_waiter_id.eq(waiter_id),
                tables::updated_at.eq(Local::now().naive_utc()),
            ))
            .get_result::<DbTable>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn record_scan_log(
        &self,
        tenant_id: i32,
        new_log: &DomainNewTableScanLog,
    ) -> RepositoryResult<DomainTableScanLog> {
        use crate::schema::{table_scan_logs, tables};

        let mut conn = self.conn()?;

        conn.transaction::<DomainTableScanLog, RepositoryError, _>(|conn| {
            let target = tables::table
                .filter(tables::id.eq(new_log.table_id))
                .filter(tables::tenant_id.eq(tenant_id));

            let affected = if new_log.kind == ScanKind::Scan {
                diesel::update(target)
                    .set((
                        tables::total_scans.eq(tables::total_scans + 1),
                        tables::last_scan.eq(Some(new_log.scanned_at)),
                    ))
                    .execute(conn)?
            } else {
                target.count().get_result::<i64>(conn)? as usize
            };

            if affected == 0 {
                return Err(RepositoryError::NotFound);
            }

            let created = diesel::insert_into(table_scan_logs::table)
                .values(&DbNewTableScanLog::from(new_log))
                .get_result::<DbTableScanLog>(conn)?;

            Ok(created.into())
        })
    }
}
