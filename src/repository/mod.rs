use chrono::NaiveDateTime;
use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::menu::{
    MenuAddon, MenuCategory, MenuItem, MenuItemDetail, MenuItemListQuery, MenuModifier,
    MenuVariant, NewMenuAddon, NewMenuCategory, NewMenuItem, NewMenuModifier, NewMenuVariant,
    UpdateMenuCategory, UpdateMenuItem,
};
use crate::domain::notification::{
    NewStaffNotification, NotificationListQuery, StaffNotification,
};
use crate::domain::order::{
    ItemTicket, ItemTicketQuery, NewOrder, Order, OrderChangeSet, OrderListQuery,
    OrderStatusHistoryEntry,
};
use crate::domain::staff::{
    LegacyMigrationReport, NewStaffMember, StaffListQuery, StaffMember, StaffRole,
    UpdateStaffMember,
};
use crate::domain::table::{
    NewTable, NewTableScanLog, Table, TableListQuery, TableScanLog, UpdateTable,
};
use crate::domain::tenant::{
    NewRestaurant, NewTenant, Tenant, TenantContext, TenantListQuery, TenantStatus,
};

pub mod menu;
pub mod notification;
pub mod order;
pub mod staff;
pub mod table;
pub mod tenant;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over tenants and their restaurants.
pub trait TenantReader {
    fn get_tenant_by_id(&self, id: i32) -> RepositoryResult<Option<Tenant>>;
    fn get_tenant_by_slug(&self, slug: &str) -> RepositoryResult<Option<Tenant>>;
    /// Tenant with its restaurant, regardless of status.
    fn get_tenant_context(&self, slug: &str) -> RepositoryResult<Option<TenantContext>>;
    fn list_tenants(&self, query: TenantListQuery) -> RepositoryResult<(usize, Vec<Tenant>)>;
}

/// Write operations over tenants.
pub trait TenantWriter {
    /// Inserts the tenant and its restaurant in one transaction.
    fn create_tenant(
        &self,
        new_tenant: &NewTenant,
        new_restaurant: &NewRestaurant,
    ) -> RepositoryResult<TenantContext>;
    fn update_tenant_status(&self, tenant_id: i32, status: TenantStatus)
    -> RepositoryResult<Tenant>;
}

/// Read-only operations over tables.
pub trait TableReader {
    fn get_table_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<Table>>;
    fn get_table_by_uuid(&self, uuid: &str, tenant_id: i32) -> RepositoryResult<Option<Table>>;
    fn get_table_by_number(&self, number: &str, tenant_id: i32)
    -> RepositoryResult<Option<Table>>;
    fn list_tables(&self, query: TableListQuery) -> RepositoryResult<Vec<Table>>;
}

/// Write operations over tables and their scan logs.
pub trait TableWriter {
    fn create_table(&self, new_table: &NewTable) -> RepositoryResult<Table>;
    fn update_table(
        &self,
        table_id: i32,
        tenant_id: i32,
        updates: &UpdateTable,
    ) -> RepositoryResult<Table>;
    fn delete_table(&self, table_id: i32, tenant_id: i32) -> RepositoryResult<()>;
    fn assign_waiter(
        &self,
        table_id: i32,
        tenant_id: i32,
        waiter_id: Option<i32>,
    ) -> RepositoryResult<Table>;
    /// Inserts a scan log. Scans also bump the table's counters.
    fn record_scan_log(
        &self,
        tenant_id: i32,
        new_log: &NewTableScanLog,
    ) -> RepositoryResult<TableScanLog>;
}

/// Read-only operations over the catalog.
pub trait MenuReader {
    fn list_categories(&self, tenant_id: i32, only_active: bool)
    -> RepositoryResult<Vec<MenuCategory>>;
    fn get_category_by_id(&self, id: i32, tenant_id: i32)
    -> RepositoryResult<Option<MenuCategory>>;
    fn get_category_by_slug(
        &self,
        slug: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<MenuCategory>>;
    fn list_menu_items(&self, query: MenuItemListQuery)
    -> RepositoryResult<(usize, Vec<MenuItem>)>;
    fn get_menu_item_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<MenuItem>>;
    fn get_menu_item_by_slug(
        &self,
        slug: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<MenuItem>>;
    /// Items of `tenant_id` among `item_ids` with every linked option.
    fn get_menu_item_details(
        &self,
        tenant_id: i32,
        item_ids: &[i32],
    ) -> RepositoryResult<Vec<MenuItemDetail>>;
    fn list_addons(&self, tenant_id: i32) -> RepositoryResult<Vec<MenuAddon>>;
    fn list_modifiers(&self, tenant_id: i32) -> RepositoryResult<Vec<MenuModifier>>;
}

/// Write operations over the catalog.
pub trait MenuWriter {
    fn create_category(&self, new_category: &NewMenuCategory) -> RepositoryResult<MenuCategory>;
    fn update_category(
        &self,
        category_id: i32,
        tenant_id: i32,
        updates: &UpdateMenuCategory,
    ) -> RepositoryResult<MenuCategory>;
    fn delete_category(&self, category_id: i32, tenant_id: i32) -> RepositoryResult<()>;
    fn create_menu_item(&self, new_item: &NewMenuItem) -> RepositoryResult<MenuItem>;
    fn update_menu_item(
        &self,
        item_id: i32,
        tenant_id: i32,
        updates: &UpdateMenuItem,
    ) -> RepositoryResult<MenuItem>;
    fn delete_menu_item(&self, item_id: i32, tenant_id: i32) -> RepositoryResult<()>;
    fn create_variant(
        &self,
        tenant_id: i32,
        new_variant: &NewMenuVariant,
    ) -> RepositoryResult<MenuVariant>;
    fn create_addon(&self, new_addon: &NewMenuAddon) -> RepositoryResult<MenuAddon>;
    fn create_modifier(&self, new_modifier: &NewMenuModifier) -> RepositoryResult<MenuModifier>;
}

/// Read-only operations over orders.
pub trait OrderReader {
    fn get_order_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<Order>>;
    fn get_order_by_tracking_code(
        &self,
        tracking_code: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<Order>>;
    /// Order containing the line `item_id`.
    fn get_order_by_item_id(&self, item_id: i32, tenant_id: i32)
    -> RepositoryResult<Option<Order>>;
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
    fn list_item_tickets(&self, query: ItemTicketQuery) -> RepositoryResult<Vec<ItemTicket>>;
    fn list_order_history(
        &self,
        order_id: i32,
        tenant_id: i32,
    ) -> RepositoryResult<Vec<OrderStatusHistoryEntry>>;
}

/// Write operations over orders.
pub trait OrderWriter {
    /// Places an order, assigning its daily number.
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
    /// Writes item and order status changes with their history atomically.
    fn apply_order_changes(&self, changes: &OrderChangeSet) -> RepositoryResult<Order>;
    fn review_order(
        &self,
        order_id: i32,
        tenant_id: i32,
        rating: i32,
        review: Option<String>,
        at: NaiveDateTime,
    ) -> RepositoryResult<Order>;
}

/// Read-only operations over staff.
pub trait StaffReader {
    fn get_staff_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<StaffMember>>;
    fn get_staff_by_email(
        &self,
        email: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<StaffMember>>;
    fn list_staff(&self, query: StaffListQuery) -> RepositoryResult<Vec<StaffMember>>;
    fn list_employee_ids(&self, tenant_id: i32, role: StaffRole) -> RepositoryResult<Vec<String>>;
}

/// Write operations over staff.
pub trait StaffWriter {
    fn create_staff(&self, new_staff: &NewStaffMember) -> RepositoryResult<StaffMember>;
    fn update_staff(
        &self,
        staff_id: i32,
        tenant_id: i32,
        updates: &UpdateStaffMember,
    ) -> RepositoryResult<StaffMember>;
    /// Removes the member, releasing their tables and notifications.
    fn delete_staff(&self, staff_id: i32, tenant_id: i32) -> RepositoryResult<()>;
    fn set_staff_availability(
        &self,
        staff_id: i32,
        tenant_id: i32,
        is_available: bool,
        at: NaiveDateTime,
    ) -> RepositoryResult<StaffMember>;
    /// Copies legacy waiter rows into staff and repoints their tables.
    fn migrate_legacy_waiters(&self, dry_run: bool) -> RepositoryResult<LegacyMigrationReport>;
}

/// Read-only operations over staff notifications.
pub trait NotificationReader {
    fn list_notifications(
        &self,
        query: NotificationListQuery,
    ) -> RepositoryResult<(usize, Vec<StaffNotification>)>;
}

/// Write operations over staff notifications.
pub trait NotificationWriter {
    fn create_notifications(
        &self,
        notifications: &[NewStaffNotification],
    ) -> RepositoryResult<usize>;
    fn mark_notification_read(
        &self,
        notification_id: i32,
        tenant_id: i32,
        staff_id: i32,
        at: NaiveDateTime,
    ) -> RepositoryResult<()>;
    fn mark_all_notifications_read(
        &self,
        tenant_id: i32,
        staff_id: i32,
        at: NaiveDateTime,
    ) -> RepositoryResult<usize>;
}
