use chrono::Local;
use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::tenant::{
        NewRestaurant as DomainNewRestaurant, NewTenant as DomainNewTenant, Tenant as DomainTenant,
        TenantContext, TenantListQuery, TenantStatus,
    },
    models::tenant::{
        NewRestaurant as DbNewRestaurant, NewTenant as DbNewTenant, Restaurant as DbRestaurant,
        Tenant as DbTenant,
    },
    repository::{DieselRepository, TenantReader, TenantWriter},
};

impl TenantReader for DieselRepository {
    fn get_tenant_by_id(&self, id: i32) -> RepositoryResult<Option<DomainTenant>> {
        use crate::schema::tenants;

        let mut conn = self.conn()?;
        let tenant = tenants::table
            .filter(tenants::id.eq(id))
            .first::<DbTenant>(&mut conn)
            .optional()?;

        Ok(tenant.map(Into::into))
    }

    fn get_tenant_by_slug(&self, slug: &str) -> RepositoryResult<Option<DomainTenant>> {
        use crate::schema::tenants;

        let mut conn = self.conn()?;
        let tenant = tenants::table
            .filter(tenants::slug.eq(slug))
            .first::<DbTenant>(&mut conn)
            .optional()?;

        Ok(tenant.map(Into::into))
    }

    fn get_tenant_context(&self, slug: &str) -> RepositoryResult<Option<TenantContext>> {
        use crate::schema::{restaurants, tenants};

        let mut conn = self.conn()?;
        let row = tenants::table
            .inner_join(restaurants::table)
            .filter(tenants::slug.eq(slug))
            .select((DbTenant::as_select(), DbRestaurant::as_select()))
            .first::<(DbTenant, DbRestaurant)>(&mut conn)
            .optional()?;

        Ok(row.map(|(tenant, restaurant)| TenantContext {
            tenant: tenant.into(),
            restaurant: restaurant.into(),
        }))
    }

    fn list_tenants(&self, query: TenantListQuery) -> RepositoryResult<(usize, Vec<DomainTenant>)> {
        use crate::schema::tenants;

        let mut conn = self.conn()?;

        let TenantListQuery {
            status,
            search,
            pagination,
        } = query;

        let search_pattern = search.as_ref().map(|term| format!("%{}%", term));

        let mut count_query = tenants::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(status) = status {
            count_query = count_query.filter(tenants::status.eq(status.as_str()));
        }
        if let Some(ref pattern) = search_pattern {
            count_query = count_query.filter(
                tenants::name
                    .like(pattern.clone())
                    .or(tenants::slug.like(pattern.clone())),
            );
        }
        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = tenants::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(status) = status {
            items = items.filter(tenants::status.eq(status.as_str()));
        }
        if let Some(ref pattern) = search_pattern {
            items = items.filter(
                tenants::name
                    .like(pattern.clone())
                    .or(tenants::slug.like(pattern.clone())),
            );
        }

        items = items.order(tenants::name.asc());

        if let Some(pagination) = pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let tenants = items
            .load::<DbTenant>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((total, tenants))
    }
}

impl TenantWriter for DieselRepository {
    fn create_tenant(
        &self,
        new_tenant: &DomainNewTenant,
        new_restaurant: &DomainNewRestaurant,
    ) -> RepositoryResult<TenantContext> {
        use crate::schema::{restaurants, tenants};

        let mut conn = self.conn()?;

        conn.transaction::<TenantContext, RepositoryError, _>(|conn| {
            let tenant = diesel::insert_into(tenants::table)
                .values(&DbNewTenant::from(new_tenant))
                .get_result::<DbTenant>(conn)?;

            let restaurant = diesel::insert_into(restaurants::table)
                .values(&DbNewRestaurant::from_domain(tenant.id, new_restaurant))
                .get_result::<DbRestaurant>(conn)?;

            Ok(TenantContext {
                tenant: tenant.into(),
                restaurant: restaurant.into(),
            })
        })
    }

    fn update_tenant_status(
        &self,
        tenant_id: i32,
        status: TenantStatus,
    ) -> RepositoryResult<DomainTenant> {
        use crate::schema::tenants;

        let mut conn = self.conn()?;

        let updated = diesel::update(tenants::table.filter(tenants::id.eq(tenant_id)))
            .set((
                tenants::status.eq(status.as_str()),
                tenants::updated_at.eq(Local::now().naive_utc()),
            ))
            .get_result::<DbTenant>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }
}
