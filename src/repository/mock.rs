use chrono::NaiveDateTime;
use mockall::mock;

use super::{
    MenuReader, MenuWriter, NotificationReader, NotificationWriter, OrderReader, OrderWriter,
    StaffReader, StaffWriter, TableReader, TableWriter, TenantReader, TenantWriter,
};
use crate::domain::{
    menu::{
        MenuAddon, MenuCategory, MenuItem, MenuItemDetail, MenuItemListQuery, MenuModifier,
        MenuVariant, NewMenuAddon, NewMenuCategory, NewMenuItem, NewMenuModifier, NewMenuVariant,
        UpdateMenuCategory, UpdateMenuItem,
    },
    notification::{NewStaffNotification, NotificationListQuery, StaffNotification},
    order::{
        ItemTicket, ItemTicketQuery, NewOrder, Order, OrderChangeSet, OrderListQuery,
        OrderStatusHistoryEntry,
    },
    staff::{
        LegacyMigrationReport, NewStaffMember, StaffListQuery, StaffMember, StaffRole,
        UpdateStaffMember,
    },
    table::{NewTable, NewTableScanLog, Table, TableListQuery, TableScanLog, UpdateTable},
    tenant::{NewRestaurant, NewTenant, Tenant, TenantContext, TenantListQuery, TenantStatus},
};
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub TenantReader {}

    impl TenantReader for TenantReader {
        fn get_tenant_by_id(&self, id: i32) -> RepositoryResult<Option<Tenant>>;
        fn get_tenant_by_slug(&self, slug: &str) -> RepositoryResult<Option<Tenant>>;
        fn get_tenant_context(&self, slug: &str) -> RepositoryResult<Option<TenantContext>>;
        fn list_tenants(&self, query: TenantListQuery) -> RepositoryResult<(usize, Vec<Tenant>)>;
    }
}

mock! {
    pub TenantWriter {}

    impl TenantWriter for TenantWriter {
        fn create_tenant(&self, new_tenant: &NewTenant, new_restaurant: &NewRestaurant) -> RepositoryResult<TenantContext>;
        fn update_tenant_status(&self, tenant_id: i32, status: TenantStatus) -> RepositoryResult<Tenant>;
    }
}

mock! {
    pub TableReader {}

    impl TableReader for TableReader {
        fn get_table_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<Table>>;
        fn get_table_by_uuid(&self, uuid: &str, tenant_id: i32) -> RepositoryResult<Option<Table>>;
        fn get_table_by_number(&self, number: &str, tenant_id: i32) -> RepositoryResult<Option<Table>>;
        fn list_tables(&self, query: TableListQuery) -> RepositoryResult<Vec<Table>>;
    }
}

mock! {
    pub TableWriter {}

    impl TableWriter for TableWriter {
        fn create_table(&self, new_table: &NewTable) -> RepositoryResult<Table>;
        fn update_table(&self, table_id: i32, tenant_id: i32, updates: &UpdateTable) -> RepositoryResult<Table>;
        fn delete_table(&self, table_id: i32, tenant_id: i32) -> RepositoryResult<()>;
        fn assign_waiter(&self, table_id: i32, tenant_id: i32, waiter_id: Option<i32>) -> RepositoryResult<Table>;
        fn record_scan_log(&self, tenant_id: i32, new_log: &NewTableScanLog) -> RepositoryResult<TableScanLog>;
    }
}

mock! {
    pub MenuReader {}

    impl MenuReader for MenuReader {
        fn list_categories(&self, tenant_id: i32, only_active: bool) -> RepositoryResult<Vec<MenuCategory>>;
        fn get_category_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<MenuCategory>>;
        fn get_category_by_slug(&self, slug: &str, tenant_id: i32) -> RepositoryResult<Option<MenuCategory>>;
        fn list_menu_items(&self, query: MenuItemListQuery) -> RepositoryResult<(usize, Vec<MenuItem>)>;
        fn get_menu_item_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<MenuItem>>;
        fn get_menu_item_by_slug(&self, slug: &str, tenant_id: i32) -> RepositoryResult<Option<MenuItem>>;
        fn get_menu_item_details(&self, tenant_id: i32, item_ids: &[i32]) -> RepositoryResult<Vec<MenuItemDetail>>;
        fn list_addons(&self, tenant_id: i32) -> RepositoryResult<Vec<MenuAddon>>;
        fn list_modifiers(&self, tenant_id: i32) -> RepositoryResult<Vec<MenuModifier>>;
    }
}

mock! {
    pub MenuWriter {}

    impl MenuWriter for MenuWriter {
        fn create_category(&self, new_category: &NewMenuCategory) -> RepositoryResult<MenuCategory>;
        fn update_category(&self, category_id: i32, tenant_id: i32, updates: &UpdateMenuCategory) -> RepositoryResult<MenuCategory>;
        fn delete_category(&self, category_id: i32, tenant_id: i32) -> RepositoryResult<()>;
        fn create_menu_item(&self, new_item: &NewMenuItem) -> RepositoryResult<MenuItem>;
        fn update_menu_item(&self, item_id: i32, tenant_id: i32, updates: &UpdateMenuItem) -> RepositoryResult<MenuItem>;
        fn delete_menu_item(&self, item_id: i32, tenant_id: i32) -> RepositoryResult<()>;
        fn create_variant(&self, tenant_id: i32, new_variant: &NewMenuVariant) -> RepositoryResult<MenuVariant>;
        fn create_addon(&self, new_addon: &NewMenuAddon) -> RepositoryResult<MenuAddon>;
        fn create_modifier(&self, new_modifier: &NewMenuModifier) -> RepositoryResult<MenuModifier>;
    }
}

mock! {
    pub OrderReader {}

    impl OrderReader for OrderReader {
        fn get_order_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<Order>>;
        fn get_order_by_tracking_code(&self, tracking_code: &str, tenant_id: i32) -> RepositoryResult<Option<Order>>;
        fn get_order_by_item_id(&self, item_id: i32, tenant_id: i32) -> RepositoryResult<Option<Order>>;
        fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
        fn list_item_tickets(&self, query: ItemTicketQuery) -> RepositoryResult<Vec<ItemTicket>>;
        fn list_order_history(&self, order_id: i32, tenant_id: i32) -> RepositoryResult<Vec<OrderStatusHistoryEntry>>;
    }
}

mock! {
    pub OrderWriter {}

    impl OrderWriter for OrderWriter {
        fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
        fn apply_order_changes(&self, changes: &OrderChangeSet) -> RepositoryResult<Order>;
        fn review_order(&self, order_id: i32, tenant_id: i32, rating: i32, review: Option<String>, at: NaiveDateTime) -> RepositoryResult<Order>;
    }
}

mock! {
    pub StaffReader {}

    impl StaffReader for StaffReader {
        fn get_staff_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<StaffMember>>;
        fn get_staff_by_email(&self, email: &str, tenant_id: i32) -> RepositoryResult<Option<StaffMember>>;
        fn list_staff(&self, query: StaffListQuery) -> RepositoryResult<Vec<StaffMember>>;
        fn list_employee_ids(&self, tenant_id: i32, role: StaffRole) -> RepositoryResult<Vec<String>>;
    }
}

mock! {
    pub StaffWriter {}

    impl StaffWriter for StaffWriter {
        fn create_staff(&self, new_staff: &NewStaffMember) -> RepositoryResult<StaffMember>;
        fn update_staff(&self, staff_id: i32, tenant_id: i32, updates: &UpdateStaffMember) -> RepositoryResult<StaffMember>;
        fn delete_staff(&self, staff_id: i32, tenant_id: i32) -> RepositoryResult<()>;
        fn set_staff_availability(&self, staff_id: i32, tenant_id: i32, is_available: bool, at: NaiveDateTime) -> RepositoryResult<StaffMember>;
        fn migrate_legacy_waiters(&self, dry_run: bool) -> RepositoryResult<LegacyMigrationReport>;
    }
}

mock! {
    pub NotificationReader {}

    impl NotificationReader for NotificationReader {
        fn list_notifications(&self, query: NotificationListQuery) -> RepositoryResult<(usize, Vec<StaffNotification>)>;
    }
}

mock! {
    pub NotificationWriter {}

    impl NotificationWriter for NotificationWriter {
        fn create_notifications(&self, notifications: &[NewStaffNotification]) -> RepositoryResult<usize>;
        fn mark_notification_read(&self, notification_id: i32, tenant_id: i32, staff_id: i32, at: NaiveDateTime) -> RepositoryResult<()>;
        fn mark_all_notifications_read(&self, tenant_id: i32, staff_id: i32, at: NaiveDateTime) -> RepositoryResult<usize>;
    }
}

/// Repository composed of one mock per trait, for services needing several.
#[derive(Default)]
pub struct FakeRepo {
    pub tenant_reader: MockTenantReader,
    pub tenant_writer: MockTenantWriter,
    pub table_reader: MockTableReader,
    pub table_writer: MockTableWriter,
    pub menu_reader: MockMenuReader,
    pub menu_writer: MockMenuWriter,
    pub order_reader: MockOrderReader,
    pub order_writer: MockOrderWriter,
    pub staff_reader: MockStaffReader,
    pub staff_writer: MockStaffWriter,
    pub notification_reader: MockNotificationReader,
    pub notification_writer: MockNotificationWriter,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TenantReader for FakeRepo {
    fn get_tenant_by_id(&self, id: i32) -> RepositoryResult<Option<Tenant>> {
        self.tenant_reader.get_tenant_by_id(id)
    }

    fn get_tenant_by_slug(&self, slug: &str) -> RepositoryResult<Option<Tenant>> {
        self.tenant_reader.get_tenant_by_slug(slug)
    }

    fn get_tenant_context(&self, slug: &str) -> RepositoryResult<Option<TenantContext>> {
        self.tenant_reader.get_tenant_context(slug)
    }

    fn list_tenants(&self, query: TenantListQuery) -> RepositoryResult<(usize, Vec<Tenant>)> {
        self.tenant_reader.list_tenants(query)
    }
}

impl TenantWriter for FakeRepo {
    fn create_tenant(
        &self,
        new_tenant: &NewTenant,
        new_restaurant: &NewRestaurant,
    ) -> RepositoryResult<TenantContext> {
        self.tenant_writer.create_tenant(new_tenant, new_restaurant)
    }

    fn update_tenant_status(
        &self,
        tenant_id: i32,
        status: TenantStatus,
    ) -> RepositoryResult<Tenant> {
        self.tenant_writer.update_tenant_status(tenant_id, status)
    }
}

impl TableReader for FakeRepo {
    fn get_table_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<Table>> {
        self.table_reader.get_table_by_id(id, tenant_id)
    }

    fn get_table_by_uuid(&self, uuid: &str, tenant_id: i32) -> RepositoryResult<Option<Table>> {
        self.table_reader.get_table_by_uuid(uuid, tenant_id)
    }

    fn get_table_by_number(&self, number: &str, tenant_id: i32) -> RepositoryResult<Option<Table>> {
        self.table_reader.get_table_by_number(number, tenant_id)
    }

    fn list_tables(&self, query: TableListQuery) -> RepositoryResult<Vec<Table>> {
        self.table_reader.list_tables(query)
    }
}

impl TableWriter for FakeRepo {
    fn create_table(&self, new_table: &NewTable) -> RepositoryResult<Table> {
        self.table_writer.create_table(new_table)
    }

    fn update_table(
        &self,
        table_id: i32,
        tenant_id: i32,
        updates: &UpdateTable,
    ) -> RepositoryResult<Table> {
        self.table_writer.update_table(table_id, tenant_id, updates)
    }

    fn delete_table(&self, table_id: i32, tenant_id: i32) -> RepositoryResult<()> {
        self.table_writer.delete_table(table_id, tenant_id)
    }

    fn assign_waiter(
        &self,
        table_id: i32,
        tenant_id: i32,
        waiter_id: Option<i32>,
    ) -> RepositoryResult<Table> {
        self.table_writer.assign_waiter(table_id, tenant_id, waiter_id)
    }

    fn record_scan_log(
        &self,
        tenant_id: i32,
        new_log: &NewTableScanLog,
    ) -> RepositoryResult<TableScanLog> {
        self.table_writer.record_scan_log(tenant_id, new_log)
    }
}

impl MenuReader for FakeRepo {
    fn list_categories(
        &self,
        tenant_id: i32,
        only_active: bool,
    ) -> RepositoryResult<Vec<MenuCategory>> {
        self.menu_reader.list_categories(tenant_id, only_active)
    }

    fn get_category_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<MenuCategory>> {
        self.menu_reader.get_category_by_id(id, tenant_id)
    }

    fn get_category_by_slug(
        &self,
        slug: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<MenuCategory>> {
        self.menu_reader.get_category_by_slug(slug, tenant_id)
    }

    fn list_menu_items(&self, query: MenuItemListQuery) -> RepositoryResult<(usize, Vec<MenuItem>)> {
        self.menu_reader.list_menu_items(query)
    }

    fn get_menu_item_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<MenuItem>> {
        self.menu_reader.get_menu_item_by_id(id, tenant_id)
    }

    fn get_menu_item_by_slug(
        &self,
        slug: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<MenuItem>> {
        self.menu_reader.get_menu_item_by_slug(slug, tenant_id)
    }

    fn get_menu_item_details(
        &self,
        tenant_id: i32,
        item_ids: &[i32],
    ) -> RepositoryResult<Vec<MenuItemDetail>> {
        self.menu_reader.get_menu_item_details(tenant_id, item_ids)
    }

    fn list_addons(&self, tenant_id: i32) -> RepositoryResult<Vec<MenuAddon>> {
        self.menu_reader.list_addons(tenant_id)
    }

    fn list_modifiers(&self, tenant_id: i32) -> RepositoryResult<Vec<MenuModifier>> {
        self.menu_reader.list_modifiers(tenant_id)
    }
}

impl MenuWriter for FakeRepo {
    fn create_category(&self, new_category: &NewMenuCategory) -> RepositoryResult<MenuCategory> {
        self.menu_writer.create_category(new_category)
    }

    fn update_category(
        &self,
        category_id: i32,
        tenant_id: i32,
        updates: &UpdateMenuCategory,
    ) -> RepositoryResult<MenuCategory> {
        self.menu_writer
            .update_category(category_id, tenant_id, updates)
    }

    fn delete_category(&self, category_id: i32, tenant_id: i32) -> RepositoryResult<()> {
        self.menu_writer.delete_category(category_id, tenant_id)
    }

    fn create_menu_item(&self, new_item: &NewMenuItem) -> RepositoryResult<MenuItem> {
        self.menu_writer.create_menu_item(new_item)
    }

    fn update_menu_item(
        &self,
        item_id: i32,
        tenant_id: i32,
        updates: &UpdateMenuItem,
    ) -> RepositoryResult<MenuItem> {
        self.menu_writer.update_menu_item(item_id, tenant_id, updates)
    }

    fn delete_menu_item(&self, item_id: i32, tenant_id: i32) -> RepositoryResult<()> {
        self.menu_writer.delete_menu_item(item_id, tenant_id)
    }

    fn create_variant(
        &self,
        tenant_id: i32,
        new_variant: &NewMenuVariant,
    ) -> RepositoryResult<MenuVariant> {
        self.menu_writer.create_variant(tenant_id, new_variant)
    }

    fn create_addon(&self, new_addon: &NewMenuAddon) -> RepositoryResult<MenuAddon> {
        self.menu_writer.create_addon(new_addon)
    }

    fn create_modifier(&self, new_modifier: &NewMenuModifier) -> RepositoryResult<MenuModifier> {
        self.menu_writer.create_modifier(new_modifier)
    }
}

impl OrderReader for FakeRepo {
    fn get_order_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<Order>> {
        self.order_reader.get_order_by_id(id, tenant_id)
    }

    fn get_order_by_tracking_code(
        &self,
        tracking_code: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<Order>> {
        self.order_reader
            .get_order_by_tracking_code(tracking_code, tenant_id)
    }

    fn get_order_by_item_id(&self, item_id: i32, tenant_id: i32) -> RepositoryResult<Option<Order>> {
        self.order_reader.get_order_by_item_id(item_id, tenant_id)
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)> {
        self.order_reader.list_orders(query)
    }

    fn list_item_tickets(&self, query: ItemTicketQuery) -> RepositoryResult<Vec<ItemTicket>> {
        self.order_reader.list_item_tickets(query)
    }

    fn list_order_history(
        &self,
        order_id: i32,
        tenant_id: i32,
    ) -> RepositoryResult<Vec<OrderStatusHistoryEntry>> {
        self.order_reader.list_order_history(order_id, tenant_id)
    }
}

impl OrderWriter for FakeRepo {
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order> {
        self.order_writer.create_order(new_order)
    }

    fn apply_order_changes(&self, changes: &OrderChangeSet) -> RepositoryResult<Order> {
        self.order_writer.apply_order_changes(changes)
    }

    fn review_order(
        &self,
        order_id: i32,
        tenant_id: i32,
        rating: i32,
        review: Option<String>,
        at: NaiveDateTime,
    ) -> RepositoryResult<Order> {
        self.order_writer
            .review_order(order_id, tenant_id, rating, review, at)
    }
}

impl StaffReader for FakeRepo {
    fn get_staff_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<StaffMember>> {
        self.staff_reader.get_staff_by_id(id, tenant_id)
    }

    fn get_staff_by_email(
        &self,
        email: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<StaffMember>> {
        self.staff_reader.get_staff_by_email(email, tenant_id)
    }

    fn list_staff(&self, query: StaffListQuery) -> RepositoryResult<Vec<StaffMember>> {
        self.staff_reader.list_staff(query)
    }

    fn list_employee_ids(&self, tenant_id: i32, role: StaffRole) -> RepositoryResult<Vec<String>> {
        self.staff_reader.list_employee_ids(tenant_id, role)
    }
}

impl StaffWriter for FakeRepo {
    fn create_staff(&self, new_staff: &NewStaffMember) -> RepositoryResult<StaffMember> {
        self.staff_writer.create_staff(new_staff)
    }

    fn update_staff(
        &self,
        staff_id: i32,
        tenant_id: i32,
        updates: &UpdateStaffMember,
    ) -> RepositoryResult<StaffMember> {
        self.staff_writer.update_staff(staff_id, tenant_id, updates)
    }

    fn delete_staff(&self, staff_id: i32, tenant_id: i32) -> RepositoryResult<()> {
        self.staff_writer.delete_staff(staff_id, tenant_id)
    }

    fn set_staff_availability(
        &self,
        staff_id: i32,
        tenant_id: i32,
        is_available: bool,
        at: NaiveDateTime,
    ) -> RepositoryResult<StaffMember> {
        self.staff_writer
            .set_staff_availability(staff_id, tenant_id, is_available, at)
    }

    fn migrate_legacy_waiters(&self, dry_run: bool) -> RepositoryResult<LegacyMigrationReport> {
        self.staff_writer.migrate_legacy_waiters(dry_run)
    }
}

impl NotificationReader for FakeRepo {
    fn list_notifications(
        &self,
        query: NotificationListQuery,
    ) -> RepositoryResult<(usize, Vec<StaffNotification>)> {
        self.notification_reader.list_notifications(query)
    }
}

impl NotificationWriter for FakeRepo {
    fn create_notifications(
        &self,
        notifications: &[NewStaffNotification],
    ) -> RepositoryResult<usize> {
        self.notification_writer.create_notifications(notifications)
    }

    fn mark_notification_read(
        &self,
        notification_id: i32,
        tenant_id: i32,
        staff_id: i32,
        at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        self.notification_writer
            .mark_notification_read(notification_id, tenant_id, staff_id, at)
    }

    fn mark_all_notifications_read(
        &self,
        tenant_id: i32,
        staff_id: i32,
        at: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        self.notification_writer
            .mark_all_notifications_read(tenant_id, staff_id, at)
    }
}
