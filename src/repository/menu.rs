use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::menu::{
        MenuAddon as DomainMenuAddon, MenuCategory as DomainMenuCategory,
        MenuItem as DomainMenuItem, MenuItemDetail, MenuItemListQuery,
        MenuModifier as DomainMenuModifier, MenuVariant as DomainMenuVariant,
        NewMenuAddon as DomainNewMenuAddon, NewMenuCategory as DomainNewMenuCategory,
        NewMenuItem as DomainNewMenuItem, NewMenuModifier as DomainNewMenuModifier,
        NewMenuVariant as DomainNewMenuVariant, UpdateMenuCategory as DomainUpdateMenuCategory,
        UpdateMenuItem as DomainUpdateMenuItem,
    },
    models::menu::{
        MenuAddon as DbMenuAddon, MenuCategory as DbMenuCategory, MenuItem as DbMenuItem,
        MenuModifier as DbMenuModifier, MenuVariant as DbMenuVariant,
        NewMenuAddon as DbNewMenuAddon, NewMenuCategory as DbNewMenuCategory,
        NewMenuItem as DbNewMenuItem, NewMenuItemAddon, NewMenuItemModifier,
        NewMenuModifier as DbNewMenuModifier, NewMenuVariant as DbNewMenuVariant,
        UpdateMenuCategory as DbUpdateMenuCategory, UpdateMenuItem as DbUpdateMenuItem,
    },
    repository::{DieselRepository, MenuReader, MenuWriter},
    schema::menu_items,
};

fn filtered_items(query: &MenuItemListQuery) -> menu_items::BoxedQuery<'static, Sqlite> {
    let mut items = menu_items::table
        .filter(menu_items::tenant_id.eq(query.tenant_id))
        .into_boxed::<Sqlite>();

    if let Some(category_id) = query.category_id {
        items = items.filter(menu_items::category_id.eq(category_id));
    }

    if let Some(term) = query.search.as_deref() {
        let pattern = format!("%{}%", term);
        items = items.filter(
            menu_items::name
                .like(pattern.clone())
                .or(menu_items::description.like(pattern.clone()))
                .or(menu_items::short_description.like(pattern)),
        );
    }

    if query.only_available {
        items = items.filter(menu_items::is_available.eq(true)).filter(
            menu_items::stock_quantity
                .is_null()
                .or(menu_items::stock_quantity.gt(0)),
        );
    }

    if query.only_featured {
        items = items.filter(menu_items::is_featured.eq(true));
    }
    if query.vegetarian {
        items = items.filter(menu_items::is_vegetarian.eq(true));
    }
    if query.vegan {
        items = items.filter(menu_items::is_vegan.eq(true));
    }
    if query.gluten_free {
        items = items.filter(menu_items::is_gluten_free.eq(true));
    }

    items
}

fn ensure_items_with_tenant(
    conn: &mut SqliteConnection,
    tenant_id: i32,
    item_ids: &[i32],
) -> RepositoryResult<()> {
    if item_ids.is_empty() {
        return Ok(());
    }

    let found = menu_items::table
        .filter(menu_items::tenant_id.eq(tenant_id))
        .filter(menu_items::id.eq_any(item_ids))
        .count()
        .get_result::<i64>(conn)? as usize;

    if found == item_ids.len() {
        Ok(())
    } else {
        Err(RepositoryError::NotFound)
    }
}

impl MenuReader for DieselRepository {
    fn list_categories(
        &self,
        tenant_id: i32,
        only_active: bool,
    ) -> RepositoryResult<Vec<DomainMenuCategory>> {
        use crate::schema::menu_categories;

        let mut conn = self.conn()?;

        let mut query = menu_categories::table
            .filter(menu_categories::tenant_id.eq(tenant_id))
            .into_boxed::<Sqlite>();

        if only_active {
            query = query.filter(menu_categories::is_active.eq(true));
        }

        let categories = query
            .order((menu_categories::sort_order.asc(), menu_categories::name.asc()))
            .load::<DbMenuCategory>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(categories)
    }

    fn get_category_by_id(
        &self,
        id: i32,
        tenant_id: i32,
    ) -> RepositoryResult<Option<DomainMenuCategory>> {
        use crate::schema::menu_categories;

        let mut conn = self.conn()?;
        let category = menu_categories::table
            .filter(menu_categories::id.eq(id))
            .filter(menu_categories::tenant_id.eq(tenant_id))
            .first::<DbMenuCategory>(&mut conn)
            .optional()?;

        Ok(category.map(Into::into))
    }

    fn get_category_by_slug(
        &self,
        slug: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<DomainMenuCategory>> {
        use crate::schema::menu_categories;

        let mut conn = self.conn()?;
        let category = menu_categories::table
            .filter(menu_categories::slug.eq(slug))
            .filter(menu_categories::tenant_id.eq(tenant_id))
            .first::<DbMenuCategory>(&mut conn)
            .optional()?;

        Ok(category.map(Into::into))
    }

    fn list_menu_items(
        &self,
        query: MenuItemListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainMenuItem>)> {
        let mut conn = self.conn()?;

        let total = filtered_items(&query)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered_items(&query)
            .order((menu_items::sort_order.asc(), menu_items::name.asc()));

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let items = items
            .load::<DbMenuItem>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok((total, items))
    }

    fn get_menu_item_by_id(
        &self,
        id: i32,
        tenant_id: i32,
    ) -> RepositoryResult<Option<DomainMenuItem>> {
        let mut conn = self.conn()?;
        let item = menu_items::table
            .filter(menu_items::id.eq(id))
            .filter(menu_items::tenant_id.eq(tenant_id))
            .first::<DbMenuItem>(&mut conn)
            .optional()?;

        Ok(item.map(Into::into))
    }

    fn get_menu_item_by_slug(
        &self,
        slug: &str,
        tenant_id: i32,
    ) -> RepositoryResult<Option<DomainMenuItem>> {
        let mut conn = self.conn()?;
        let item = menu_items::table
            .filter(menu_items::slug.eq(slug))
            .filter(menu_items::tenant_id.eq(tenant_id))
            .first::<DbMenuItem>(&mut conn)
            .optional()?;

        Ok(item.map(Into::into))
    }

    fn get_menu_item_details(
        &self,
        tenant_id: i32,
        item_ids: &[i32],
    ) -> RepositoryResult<Vec<MenuItemDetail>> {
        use crate::schema::{
            menu_addons, menu_categories, menu_item_addons, menu_item_modifiers, menu_modifiers,
            menu_variants,
        };

        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;

        let items = menu_items::table
            .inner_join(menu_categories::table)
            .filter(menu_items::tenant_id.eq(tenant_id))
            .filter(menu_items::id.eq_any(item_ids))
            .select((DbMenuItem::as_select(), menu_categories::name))
            .order(menu_items::id.asc())
            .load::<(DbMenuItem, String)>(&mut conn)?;

        if items.is_empty() {
            return Ok(Vec::new());
        }

        let found_ids: Vec<i32> = items.iter().map(|(item, _)| item.id).collect();

        let mut variants_by_item: HashMap<i32, Vec<DomainMenuVariant>> = HashMap::new();
        for variant in menu_variants::table
            .filter(menu_variants::menu_item_id.eq_any(&found_ids))
            .order((menu_variants::sort_order.asc(), menu_variants::id.asc()))
            .load::<DbMenuVariant>(&mut conn)?
        {
            variants_by_item
                .entry(variant.menu_item_id)
                .or_default()
                .push(variant.into());
        }

        let mut addons_by_item: HashMap<i32, Vec<DomainMenuAddon>> = HashMap::new();
        for (item_id, addon) in menu_item_addons::table
            .inner_join(menu_addons::table)
            .filter(menu_item_addons::menu_item_id.eq_any(&found_ids))
            .filter(menu_addons::tenant_id.eq(tenant_id))
            .select((menu_item_addons::menu_item_id, DbMenuAddon::as_select()))
            .order(menu_addons::name.asc())
            .load::<(i32, DbMenuAddon)>(&mut conn)?
        {
            addons_by_item.entry(item_id).or_default().push(addon.into());
        }

        let mut modifiers_by_item: HashMap<i32, Vec<DomainMenuModifier>> = HashMap::new();
        for (item_id, modifier) in menu_item_modifiers::table
            .inner_join(menu_modifiers::table)
            .filter(menu_item_modifiers::menu_item_id.eq_any(&found_ids))
            .filter(menu_modifiers::tenant_id.eq(tenant_id))
            .select((menu_item_modifiers::menu_item_id, DbMenuModifier::as_select()))
            .order(menu_modifiers::name.asc())
            .load::<(i32, DbMenuModifier)>(&mut conn)?
        {
            modifiers_by_item
                .entry(item_id)
                .or_default()
                .push(modifier.into());
        }

        let details = items
            .into_iter()
            .map(|(item, category_name)| {
                let id = item.id;
                MenuItemDetail {
                    item: item.into(),
                    category_name,
                    variants: variants_by_item.remove(&id).unwrap_or_default(),
                    addons: addons_by_item.remove(&id).unwrap_or_default(),
                    modifiers: modifiers_by_item.remove(&id).unwrap_or_default(),
                }
            })
            .collect();

        Ok(details)
    }

    fn list_addons(&self, tenant_id: i32) -> RepositoryResult<Vec<DomainMenuAddon>> {
        use crate::schema::menu_addons;

        let mut conn = self.conn()?;
        let addons = menu_addons::table
            .filter(menu_addons::tenant_id.eq(tenant_id))
            .order(menu_addons::name.asc())
            .load::<DbMenuAddon>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(addons)
    }

    fn list_modifiers(&self, tenant_id: i32) -> RepositoryResult<Vec<DomainMenuModifier>> {
        use crate::schema::menu_modifiers;

        let mut conn = self.conn()?;
        let modifiers = menu_modifiers::table
            .filter(menu_modifiers::tenant_id.eq(tenant_id))
            .order(menu_modifiers::name.asc())
            .load::<DbMenuModifier>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(modifiers)
    }
}

impl MenuWriter for DieselRepository {
    fn create_category(
        &self,
        new_category: &DomainNewMenuCategory,
    ) -> RepositoryResult<DomainMenuCategory> {
        use crate::schema::menu_categories;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(menu_categories::table)
            .values(&DbNewMenuCategory::from(new_category))
            .get_result::<DbMenuCategory>(&mut conn)?;

        Ok(created.into())
    }

    fn update_category(
        &self,
        category_id: i32,
        tenant_id: i32,
        updates: &DomainUpdateMenuCategory,
    ) -> RepositoryResult<DomainMenuCategory> {
        use crate::schema::menu_categories;

        let mut conn = self.conn()?;

        let target = menu_categories::table
            .filter(menu_categories::id.eq(category_id))
            .filter(menu_categories::tenant_id.eq(tenant_id));

        let updated = diesel::update(target)
            .set(&DbUpdateMenuCategory::from(updates))
            .get_result::<DbMenuCategory>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn delete_category(&self, category_id: i32, tenant_id: i32) -> RepositoryResult<()> {
        use crate::schema::menu_categories;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            menu_categories::table
                .filter(menu_categories::id.eq(category_id))
                .filter(menu_categories::tenant_id.eq(tenant_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn create_menu_item(&self, new_item: &DomainNewMenuItem) -> RepositoryResult<DomainMenuItem> {
        use crate::schema::menu_categories;

        let mut conn = self.conn()?;

        conn.transaction::<DomainMenuItem, RepositoryError, _>(|conn| {
            let category = menu_categories::table
                .filter(menu_categories::id.eq(new_item.category_id))
                .filter(menu_categories::tenant_id.eq(new_item.tenant_id))
                .select(menu_categories::id)
                .first::<i32>(conn)
                .optional()?;

            if category.is_none() {
                return Err(RepositoryError::NotFound);
            }

            let created = diesel::insert_into(menu_items::table)
                .values(&DbNewMenuItem::from(new_item))
                .get_result::<DbMenuItem>(conn)?;

            Ok(created.into())
        })
    }

    fn update_menu_item(
        &self,
        item_id: i32,
        tenant_id: i32,
        updates: &DomainUpdateMenuItem,
    ) -> RepositoryResult<DomainMenuItem> {
        use crate::schema::menu_categories;

        let mut conn = self.conn()?;

        conn.transaction::<DomainMenuItem, RepositoryError, _>(|conn| {
            let category = menu_categories::table
                .filter(menu_categories::id.eq(updates.category_id))
                .filter(menu_categories::tenant_id.eq(tenant_id))
                .select(menu_categories::id)
                .first::<i32>(conn)
                .optional()?;

            if category.is_none() {
                return Err(RepositoryError::NotFound);
            }

            let target = menu_items::table
                .filter(menu_items::id.eq(item_id))
                .filter(menu_items::tenant_id.eq(tenant_id));

            let updated = diesel::update(target)
                .set(&DbUpdateMenuItem::from(updates))
                .get_result::<DbMenuItem>(conn)
                .optional()?;

            updated.map(Into::into).ok_or(RepositoryError::NotFound)
        })
    }

    fn delete_menu_item(&self, item_id: i32, tenant_id: i32) -> RepositoryResult<()> {
        use crate::schema::{menu_item_addons, menu_item_modifiers, menu_variants, order_items};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            ensure_items_with_tenant(conn, tenant_id, &[item_id])?;

            diesel::update(order_items::table.filter(order_items::menu_item_id.eq(Some(item_id))))
                .set(order_items::menu_item_id.eq::<Option<i32>>(None))
                .execute(conn)?;

            diesel::delete(menu_variants::table.filter(menu_variants::menu_item_id.eq(item_id)))
                .execute(conn)?;
            diesel::delete(
                menu_item_addons::table.filter(menu_item_addons::menu_item_id.eq(item_id)),
            )
            .execute(conn)?;
            diesel::delete(
                menu_item_modifiers::table.filter(menu_item_modifiers::menu_item_id.eq(item_id)),
            )
            .execute(conn)?;

            diesel::delete(menu_items::table.filter(menu_items::id.eq(item_id))).execute(conn)?;

            Ok(())
        })
    }

    fn create_variant(
        &self,
        tenant_id: i32,
        new_variant: &DomainNewMenuVariant,
    ) -> RepositoryResult<DomainMenuVariant> {
        use crate::schema::menu_variants;

        let mut conn = self.conn()?;

        conn.transaction::<DomainMenuVariant, RepositoryError, _>(|conn| {
            ensure_items_with_tenant(conn, tenant_id, &[new_variant.menu_item_id])?;

            if new_variant.is_default {
                diesel::update(
                    menu_variants::table
                        .filter(menu_variants::menu_item_id.eq(new_variant.menu_item_id)),
                )
                .set(menu_variants::is_default.eq(false))
                .execute(conn)?;
            }

            let created = diesel::insert_into(menu_variants::table)
                .values(&DbNewMenuVariant::from(new_variant))
                .get_result::<DbMenuVariant>(conn)?;

            Ok(created.into())
        })
    }

    fn create_addon(&self, new_addon: &DomainNewMenuAddon) -> RepositoryResult<DomainMenuAddon> {
        use crate::schema::{menu_addons, menu_item_addons};

        let mut conn = self.conn()?;

        conn.transaction::<DomainMenuAddon, RepositoryError, _>(|conn| {
            ensure_items_with_tenant(conn, new_addon.tenant_id, &new_addon.menu_item_ids)?;

            let created = diesel::insert_into(menu_addons::table)
                .values(&DbNewMenuAddon::from(new_addon))
                .get_result::<DbMenuAddon>(conn)?;

            if !new_addon.menu_item_ids.is_empty() {
                let links: Vec<NewMenuItemAddon> = new_addon
                    .menu_item_ids
                    .iter()
                    .map(|&menu_item_id| NewMenuItemAddon {
                        menu_item_id,
                        addon_id: created.id,
                    })
                    .collect();

                diesel::insert_into(menu_item_addons::table)
                    .values(&links)
                    .execute(conn)?;
            }

            Ok(created.into())
        })
    }

    fn create_modifier(
        &self,
        new_modifier: &DomainNewMenuModifier,
    ) -> RepositoryResult<DomainMenuModifier> {
        use crate::schema::{menu_item_modifiers, menu_modifiers};

        let mut conn = self.conn()?;

        conn.transaction::<DomainMenuModifier, RepositoryError, _>(|conn| {
            ensure_items_with_tenant(conn, new_modifier.tenant_id, &new_modifier.menu_item_ids)?;

            let created = diesel::insert_into(menu_modifiers::table)
                .values(&DbNewMenuModifier::from(new_modifier))
                .get_result::<DbMenuModifier>(conn)?;

            if !new_modifier.menu_item_ids.is_empty() {
                let links: Vec<NewMenuItemModifier> = new_modifier
                    .menu_item_ids
                    .iter()
                    .map(|&menu_item_id| NewMenuItemModifier {
                        menu_item_id,
                        modifier_id: created.id,
                    })
                    .collect();

                diesel::insert_into(menu_item_modifiers::table)
                    .values(&links)
                    .execute(conn)?;
            }

            Ok(created.into())
        })
    }
}
