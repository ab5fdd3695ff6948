use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::notification::{
        NewStaffNotification as DomainNewStaffNotification, NotificationListQuery,
        NotificationStatus, StaffNotification as DomainStaffNotification,
    },
    models::notification::{
        NewStaffNotification as DbNewStaffNotification, StaffNotification as DbStaffNotification,
    },
    repository::{DieselRepository, NotificationReader, NotificationWriter},
    schema::staff_notifications,
};

fn filtered_notifications(
    query: &NotificationListQuery,
) -> staff_notifications::BoxedQuery<'static, Sqlite> {
    let mut items = staff_notifications::table
        .filter(staff_notifications::tenant_id.eq(query.tenant_id))
        .into_boxed::<Sqlite>();

    if let Some(staff_id) = query.staff_id {
        items = items.filter(staff_notifications::staff_id.eq(Some(staff_id)));
    }
    if let Some(status) = query.status {
        items = items.filter(staff_notifications::status.eq(status.as_str()));
    }
    if let Some(notification_type) = query.notification_type {
        items = items.filter(staff_notifications::notification_type.eq(notification_type.as_str()));
    }

    items
}

impl NotificationReader for DieselRepository {
    fn list_notifications(
        &self,
        query: NotificationListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainStaffNotification>)> {
        let mut conn = self.conn()?;

        let total = filtered_notifications(&query)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered_notifications(&query).order((
            staff_notifications::created_at.desc(),
            staff_notifications::id.desc(),
        ));

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let notifications = items
            .load::<DbStaffNotification>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((total, notifications))
    }
}

impl NotificationWriter for DieselRepository {
    fn create_notifications(
        &self,
        notifications: &[DomainNewStaffNotification],
    ) -> RepositoryResult<usize> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;

        let payload: Vec<DbNewStaffNotification> =
            notifications.iter().map(DbNewStaffNotification::from).collect();

        let inserted = diesel::insert_into(staff_notifications::table)
            .values(&payload)
            .execute(&mut conn)?;

        Ok(inserted)
    }

    fn mark_notification_read(
        &self,
        notification_id: i32,
        tenant_id: i32,
        staff_id: i32,
        at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            staff_notifications::table
                .filter(staff_notifications::id.eq(notification_id))
                .filter(staff_notifications::tenant_id.eq(tenant_id))
                .filter(staff_notifications::staff_id.eq(Some(staff_id))),
        )
        .set((
            staff_notifications::status.eq(NotificationStatus::Read.as_str()),
            staff_notifications::read_at.eq(Some(at)),
        ))
        .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn mark_all_notifications_read(
        &self,
        tenant_id: i32,
        staff_id: i32,
        at: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            staff_notifications::table
                .filter(staff_notifications::tenant_id.eq(tenant_id))
                .filter(staff_notifications::staff_id.eq(Some(staff_id)))
                .filter(staff_notifications::status.eq(NotificationStatus::Pending.as_str())),
        )
        .set((
            staff_notifications::status.eq(NotificationStatus::Read.as_str()),
            staff_notifications::read_at.eq(Some(at)),
        ))
        .execute(&mut conn)?;

        Ok(updated)
    }
}
