use chrono::{NaiveDateTime, NaiveTime};
use diesel::prelude::*;

use crate::domain::tenant::{
    NewRestaurant as DomainNewRestaurant, NewTenant as DomainNewTenant,
    Restaurant as DomainRestaurant, Tenant as DomainTenant,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::tenants)]
pub struct Tenant {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub status: String,
    pub subscription_plan: String,
    pub primary_color: String,
    pub domain: Option<String>,
    pub trial_ends_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::tenants)]
pub struct NewTenant<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub status: &'a str,
    pub subscription_plan: &'a str,
    pub primary_color: &'a str,
    pub domain: Option<&'a str>,
    pub trial_ends_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::restaurants)]
#[diesel(belongs_to(Tenant, foreign_key = tenant_id))]
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

#[derive(Insertable)]
#[diesel(table_name = crate::schema::restaurants)]
pub struct NewRestaurant<'a> {
    pub tenant_id: i32,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub address: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub owner_email: &'a str,
    pub opening_time: Option<NaiveTime>,
    pub closing_time: Option<NaiveTime>,
    pub updated_at: NaiveDateTime,
}

impl From<Tenant> for DomainTenant {
    fn from(value: Tenant) -> Self {
        Self {
            id: value.id,
            name: value.name,
            slug: value.slug,
            status: value.status.as_str().into(),
            subscription_plan: value.subscription_plan.as_str().into(),
            primary_color: value.primary_color,
            domain: value.domain,
            trial_ends_at: value.trial_ends_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewTenant> for NewTenant<'a> {
    fn from(value: &'a DomainNewTenant) -> Self {
        Self {
            name: value.name.as_str(),
            slug: value.slug.as_str(),
            status: value.status.into(),
            subscription_plan: value.subscription_plan.into(),
            primary_color: value.primary_color.as_str(),
            domain: value.domain.as_deref(),
            trial_ends_at: value.trial_ends_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<Restaurant> for DomainRestaurant {
    fn from(value: Restaurant) -> Self {
        Self {
            id: value.id,
            tenant_id: value.tenant_id,
            name: value.name,
            description: value.description,
            address: value.address,
            phone: value.phone,
            email: value.email,
            owner_email: value.owner_email,
            is_active: value.is_active,
            opening_time: value.opening_time,
            closing_time: value.closing_time,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> NewRestaurant<'a> {
    pub fn from_domain(tenant_id: i32, value: &'a DomainNewRestaurant) -> Self {
        Self {
            tenant_id,
            name: value.name.as_str(),
            description: value.description.as_deref(),
            address: value.address.as_str(),
            phone: value.phone.as_str(),
            email: value.email.as_str(),
            owner_email: value.owner_email.as_str(),
            opening_time: value.opening_time,
            closing_time: value.closing_time,
            updated_at: value.updated_at,
        }
    }
}
