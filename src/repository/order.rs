use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::order::{
        ItemTicket, ItemTicketQuery, NewOrder as DomainNewOrder, Order as DomainOrder,
        OrderChangeSet, OrderListQuery, OrderStatus,
        OrderStatusHistoryEntry as DomainOrderStatusHistoryEntry, format_order_number,
        next_order_sequence, order_number_prefix,
    },
    domain::order_item::OrderItem as DomainOrderItem,
    models::order::{
        NewOrder as DbNewOrder, NewOrderItem as DbNewOrderItem,
        NewOrderStatusHistory as DbNewOrderStatusHistory, Order as DbOrder,
        OrderItem as DbOrderItem, OrderStatusHistory as DbOrderStatusHistory,
    },
    repository::{DieselRepository, OrderReader, OrderWriter},
    schema::orders,
};

const CLOSED_ORDER_STATUSES: [OrderStatus; 2] = [OrderStatus::Delivered, OrderStatus::Cancelled];

fn filtered_orders(query: &OrderListQuery) -> orders::BoxedQuery<'static, Sqlite> {
    let mut items = orders::table
        .filter(orders::tenant_id.eq(query.tenant_id))
        .into_boxed::<Sqlite>();

    if !query.statuses.is_empty() {
        let statuses: Vec<&'static str> = query.statuses.iter().map(|s| s.as_str()).collect();
        items = items.filter(orders::status.eq_any(statuses));
    }

    if let Some(order_type) = query.order_type {
        items = items.filter(orders::order_type.eq(order_type.as_str()));
    }

    if let Some(table_ids) = query.table_ids.clone() {
        items = items.filter(orders::table_id.eq_any(table_ids));
    }

    if let Some(codes) = query.tracking_codes.clone() {
        items = items.filter(orders::tracking_code.eq_any(codes));
    }

    if let Some(from) = query.created_from {
        items = items.filter(orders::created_at.ge(from));
    }

    if let Some(term) = query.search.as_deref() {
        let pattern = format!("%{}%", term);
        items = items.filter(
            orders::order_number
                .like(pattern.clone())
                .or(orders::customer_name.like(pattern.clone()))
                .or(orders::customer_phone.like(pattern)),
        );
    }

    items
}

fn load_items(conn: &mut SqliteConnection, order_id: i32) -> RepositoryResult<Vec<DbOrderItem>> {
    use crate::schema::order_items;

    Ok(order_items::table
        .filter(order_items::order_id.eq(order_id))
        .order(order_items::id.asc())
        .load::<DbOrderItem>(conn)?)
}

fn next_order_number(
    conn: &mut SqliteConnection,
    tenant_id: i32,
    created_at: NaiveDateTime,
) -> RepositoryResult<String> {
    let date = created_at.date();
    let prefix = order_number_prefix(date);

    let numbers = orders::table
        .filter(orders::tenant_id.eq(tenant_id))
        .filter(orders::order_number.like(format!("{prefix}%")))
        .select(orders::order_number)
        .load::<String>(conn)?;

    let sequence = next_order_sequence(numbers.iter().map(String::as_str));

    Ok(format_order_number(date, sequence))
}

impl OrderReader for DieselRepository {
    fn get_order_by_id(&self, id: i32, tenant_id: i32) -> RepositoryResult<Option<DomainOrder>> {
        let mut conn = self.conn()?;
        let order = orders::table
            .filter(orders::id.eq(id))
            .filter(orders::tenant_id.eq(tenant_id))
            .first::<DbOrder>(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = load_items(&mut conn, order.id)?;

        Ok(Some(DomainOrder::from((order, items))))
    }

    fn get_order_by_tracking_code(
        &self,
        tracking_code: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<DomainOrder>> {
        let mut conn = self.conn()?;
        let order = orders::table
            .filter(orders::tracking_code.eq(tracking_code))
            .filter(orders::tenant_id.eq(tenant_id))
            .first::<DbOrder>(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = load_items(&mut conn, order.id)?;

        Ok(Some(DomainOrder::from((order, items))))
    }

    fn get_order_by_item_id(
        &self,
        item_id: i32,
        tenant_id: i32,
    ) -> RepositoryResult<Option<DomainOrder>> {
        use crate::schema::order_items;

        let mut conn = self.conn()?;
        let order = orders::table
            .inner_join(order_items::table)
            .filter(order_items::id.eq(item_id))
            .filter(orders::tenant_id.eq(tenant_id))
            .select(DbOrder::as_select())
            .first::<DbOrder>(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = load_items(&mut conn, order.id)?;

        Ok(Some(DomainOrder::from((order, items))))
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<DomainOrder>)> {
        use crate::schema::order_items;

        let mut conn = self.conn()?;

        let total = filtered_orders(&query)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered_orders(&query).order(orders::created_at.desc());

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let db_orders = items.load::<DbOrder>(&mut conn)?;
        if db_orders.is_empty() {
            return Ok((total, Vec::new()));
        }

        let order_ids: Vec<i32> = db_orders.iter().map(|order| order.id).collect();

        let mut items_by_order: HashMap<i32, Vec<DbOrderItem>> = HashMap::new();
        let rows = order_items::table
            .filter(order_items::order_id.eq_any(&order_ids))
            .order(order_items::id.asc())
            .load::<DbOrderItem>(&mut conn)?;

        for item in rows {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        let orders = db_orders
            .into_iter()
            .map(|order| {
                let order_id = order.id;
                let items = items_by_order.remove(&order_id).unwrap_or_default();
                DomainOrder::from((order, items))
            })
            .collect();

        Ok((total, orders))
    }

    fn list_item_tickets(&self, query: ItemTicketQuery) -> RepositoryResult<Vec<ItemTicket>> {
        use crate::schema::order_items;

        let mut conn = self.conn()?;

        let mut rows = order_items::table
            .inner_join(orders::table)
            .filter(orders::tenant_id.eq(query.tenant_id))
            .filter(
                orders::status.ne_all(CLOSED_ORDER_STATUSES.map(OrderStatus::as_str).to_vec()),
            )
            .select((
                DbOrderItem::as_select(),
                orders::order_number,
                orders::status,
                orders::table_id,
                orders::table_number,
                orders::customer_name,
                orders::created_at,
            ))
            .into_boxed::<Sqlite>();

        if !query.statuses.is_empty() {
            let statuses: Vec<&'static str> = query.statuses.iter().map(|s| s.as_str()).collect();
            rows = rows.filter(order_items::status.eq_any(statuses));
        }

        if let Some(area) = query.area {
            rows = rows.filter(order_items::responsible_area.eq(area.as_str()));
        }

        if let Some(table_ids) = query.table_ids {
            rows = rows.filter(orders::table_id.eq_any(table_ids));
        }

        // Oldest first so stations work in arrival order.
        rows = rows.order((orders::created_at.asc(), order_items::id.asc()));

        if let Some(limit) = query.limit {
            rows = rows.limit(limit);
        }

        let rows = rows.load::<(
                DbOrderItem,
                String,
                String,
                Option<i32>,
                Option<String>,
                String,
                NaiveDateTime,
            )>(&mut conn)?;

        let tickets = rows
            .into_iter()
            .map(
                |(item, order_number, status, table_id, table_number, customer_name, created_at)| {
                    ItemTicket {
                        item: DomainOrderItem::from(item),
                        order_number,
                        order_status: status.as_str().into(),
                        table_id,
                        table_number,
                        customer_name,
                        order_created_at: created_at,
                    }
                },
            )
            .collect();

        Ok(tickets)
    }

    fn list_order_history(
        &self,
        order_id: i32,
        tenant_id: i32,
    ) -> RepositoryResult<Vec<DomainOrderStatusHistoryEntry>> {
        use crate::schema::order_status_history;

        let mut conn = self.conn()?;

        let entries = order_status_history::table
            .inner_join(orders::table)
            .filter(order_status_history::order_id.eq(order_id))
            .filter(orders::tenant_id.eq(tenant_id))
            .select(DbOrderStatusHistory::as_select())
            .order((
                order_status_history::created_at.asc(),
                order_status_history::id.asc(),
            ))
            .load::<DbOrderStatusHistory>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(entries)
    }
}

impl OrderWriter for DieselRepository {
    fn create_order(&self, new_order: &DomainNewOrder) -> RepositoryResult<DomainOrder> {
        use crate::schema::{menu_items, order_items, order_status_history, table_scan_logs, tables};

        let mut conn = self.conn()?;

        conn.transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let order_number = next_order_number(conn, new_order.tenant_id, new_order.created_at)?;

            let created = diesel::insert_into(orders::table)
                .values(&DbNewOrder::from_domain(&order_number, new_order))
                .get_result::<DbOrder>(conn)?;

            let order_id = created.id;

            if !new_order.items.is_empty() {
                let payload: Vec<DbNewOrderItem> = new_order
                    .items
                    .iter()
                    .map(|item| DbNewOrderItem::from_domain(order_id, new_order.created_at, item))
                    .collect();

                diesel::insert_into(order_items::table)
                    .values(&payload)
                    .execute(conn)?;
            }

            diesel::insert_into(order_status_history::table)
                .values(&DbNewOrderStatusHistory {
                    order_id,
                    previous_status: None,
                    new_status: OrderStatus::Pending.into(),
                    changed_by: None,
                    notes: Some("Pedido creado"),
                    created_at: new_order.created_at,
                })
                .execute(conn)?;

            for item in &new_order.items {
                let Some(menu_item_id) = item.menu_item_id else {
                    continue;
                };
                let target = menu_items::table
                    .filter(menu_items::id.eq(menu_item_id))
                    .filter(menu_items::tenant_id.eq(new_order.tenant_id))
                    .filter(menu_items::stock_quantity.is_not_null());

                diesel::update(target)
                    .set(menu_items::stock_quantity.eq(menu_items::stock_quantity - item.quantity))
                    .execute(conn)?;
            }

            diesel::update(
                menu_items::table
                    .filter(menu_items::tenant_id.eq(new_order.tenant_id))
                    .filter(menu_items::stock_quantity.lt(0)),
            )
            .set(menu_items::stock_quantity.eq(Some(0)))
            .execute(conn)?;

            if let Some(table_id) = new_order.table_id {
                diesel::update(
                    tables::table
                        .filter(tables::id.eq(table_id))
                        .filter(tables::tenant_id.eq(new_order.tenant_id)),
                )
                .set(tables::total_orders.eq(tables::total_orders + 1))
                .execute(conn)?;

                if let Some(scan_log_id) = new_order.scan_log_id {
                    diesel::update(
                        table_scan_logs::table
                            .filter(table_scan_logs::id.eq(scan_log_id))
                            .filter(table_scan_logs::table_id.eq(table_id)),
                    )
                    .set((
                        table_scan_logs::resulted_in_order.eq(true),
                        table_scan_logs::order_id.eq(Some(order_id)),
                    ))
                    .execute(conn)?;
                }
            }

            let items = load_items(conn, order_id)?;

            Ok(DomainOrder::from((created, items)))
        })
    }

    fn apply_order_changes(&self, changes: &OrderChangeSet) -> RepositoryResult<DomainOrder> {
        use crate::schema::{order_items, order_status_history};

        let mut conn = self.conn()?;

        conn.transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let order_id = changes.order_id;

            let target = || {
                orders::table
                    .filter(orders::id.eq(order_id))
                    .filter(orders::tenant_id.eq(changes.tenant_id))
            };

            let exists = target()
                .select(orders::id)
                .first::<i32>(conn)
                .optional()?;
            if exists.is_none() {
                return Err(RepositoryError::NotFound);
            }

            for update in &changes.item_updates {
                let updated = diesel::update(
                    order_items::table
                        .filter(order_items::id.eq(update.item_id))
                        .filter(order_items::order_id.eq(order_id)),
                )
                .set((
                    order_items::status.eq(update.status.as_str()),
                    order_items::preparation_started_at.eq(update.preparation_started_at),
                    order_items::preparation_completed_at.eq(update.preparation_completed_at),
                    order_items::served_at.eq(update.served_at),
                    order_items::updated_at.eq(update.updated_at),
                ))
                .execute(conn)?;

                if updated == 0 {
                    return Err(RepositoryError::NotFound);
                }
            }

            diesel::update(target())
                .set(orders::updated_at.eq(changes.at))
                .execute(conn)?;

            if let Some(change) = &changes.status_change {
                diesel::update(target())
                    .set(orders::status.eq(change.to.as_str()))
                    .execute(conn)?;

                match change.to {
                    OrderStatus::Confirmed => {
                        diesel::update(target().filter(orders::confirmed_at.is_null()))
                            .set(orders::confirmed_at.eq(Some(changes.at)))
                            .execute(conn)?;
                    }
                    OrderStatus::Ready => {
                        diesel::update(target())
                            .set(orders::ready_at.eq(Some(changes.at)))
                            .execute(conn)?;
                    }
                    OrderStatus::Delivered => {
                        diesel::update(target())
                            .set(orders::delivered_at.eq(Some(changes.at)))
                            .execute(conn)?;
                    }
                    _ => {}
                }

                diesel::insert_into(order_status_history::table)
                    .values(&DbNewOrderStatusHistory {
                        order_id,
                        previous_status: Some(change.from.as_str()),
                        new_status: change.to.as_str(),
                        changed_by: change.changed_by.as_deref(),
                        notes: change.notes.as_deref(),
                        created_at: changes.at,
                    })
                    .execute(conn)?;
            }

            let order = orders::table
                .filter(orders::id.eq(order_id))
                .first::<DbOrder>(conn)?;
            let items = load_items(conn, order_id)?;

            Ok(DomainOrder::from((order, items)))
        })
    }

    fn review_order(
        &self,
        order_id: i32,
        tenant_id: i32,
        rating: i32,
        review: Option<String>,
        at: NaiveDateTime,
    ) -> RepositoryResult<DomainOrder> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let target = orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::tenant_id.eq(tenant_id));

            let updated = diesel::update(target)
                .set((
                    orders::rating.eq(Some(rating)),
                    orders::review.eq(review),
                    orders::updated_at.eq(at),
                ))
                .get_result::<DbOrder>(conn)
                .optional()?;

            let Some(order) = updated else {
                return Err(RepositoryError::NotFound);
            };

            let items = load_items(conn, order_id)?;

            Ok(DomainOrder::from((order, items)))
        })
    }
}
