use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use serde::{Deserialize, Serialize};

use crate::domain::menu::{
    MenuAddon, MenuCategory, MenuItem, MenuItemDetail, MenuItemListQuery, MenuModifier,
    MenuVariant,
};
use crate::domain::tenant::TenantContext;
use crate::forms::menu::{
    AddAddonForm, AddModifierForm, AddVariantForm, MenuCategoryForm, MenuItemForm,
};
use crate::repository::{MenuReader, MenuWriter};
use crate::services::menu::MenuItemCard;
use crate::services::{ServiceError, ServiceResult, ensure_admin};

/// Query parameters accepted by the admin item list.
#[derive(Debug, Default, Deserialize)]
pub struct MenuAdminParams {
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MenuAdminPage {
    pub categories: Vec<MenuCategory>,
    pub items: Paginated<MenuItemCard>,
    pub category_id: Option<i32>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MenuItemEditor {
    pub detail: MenuItemDetail,
    pub categories: Vec<MenuCategory>,
    pub addons: Vec<MenuAddon>,
    pub modifiers: Vec<MenuModifier>,
}

pub fn list_menu_admin<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    params: MenuAdminParams,
) -> ServiceResult<MenuAdminPage>
where
    R: MenuReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();
    let page = params.page.unwrap_or(1).max(1);
    let search = params
        .search
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty());

    let categories = repo
        .list_categories(tenant_id, false)
        .map_err(ServiceError::from)?;

    let mut query = MenuItemListQuery::new(tenant_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(category_id) = params.category_id {
        query = query.category(category_id);
    }
    if let Some(term) = &search {
        query = query.search(term.clone());
    }

    let (total, items) = repo.list_menu_items(query).map_err(ServiceError::from)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    let items = items.into_iter().map(MenuItemCard::from).collect();

    Ok(MenuAdminPage {
        categories,
        items: Paginated::new(items, page, total_pages),
        category_id: params.category_id,
        search,
    })
}

pub fn get_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    category_id: i32,
) -> ServiceResult<MenuCategory>
where
    R: MenuReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    repo.get_category_by_id(category_id, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    form: MenuCategoryForm,
) -> ServiceResult<MenuCategory>
where
    R: MenuReader + MenuWriter + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let new_category = form
        .into_new_category(tenant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if repo
        .get_category_by_slug(&new_category.slug, tenant_id)
        .map_err(ServiceError::from)?
        .is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "Ya existe una categoría con el identificador `{}`",
            new_category.slug
        )));
    }

    repo.create_category(&new_category)
        .map_err(ServiceError::from)
}

pub fn update_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    category_id: i32,
    form: MenuCategoryForm,
) -> ServiceResult<MenuCategory>
where
    R: MenuReader + MenuWriter + ?Sized,
{
    let category = get_category(repo, user, tenant, category_id)?;
    let updates = form
        .into_update_category()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_category(category.id, tenant.tenant_id(), &updates)
        .map_err(ServiceError::from)
}

/// Only empty categories may be removed.
pub fn delete_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    category_id: i32,
) -> ServiceResult<()>
where
    R: MenuReader + MenuWriter + ?Sized,
{
    let category = get_category(repo, user, tenant, category_id)?;
    let tenant_id = tenant.tenant_id();

    let (item_count, _) = repo
        .list_menu_items(
            MenuItemListQuery::new(tenant_id)
                .category(category.id)
                .paginate(1, 1),
        )
        .map_err(ServiceError::from)?;
    if item_count > 0 {
        return Err(ServiceError::Conflict(format!(
            "La categoría `{}` todavía tiene {item_count} producto(s)",
            category.name
        )));
    }

    repo.delete_category(category.id, tenant_id)
        .map_err(ServiceError::from)
}

fn ensure_category<R>(repo: &R, tenant_id: i32, category_id: i32) -> ServiceResult<()>
where
    R: MenuReader + ?Sized,
{
    match repo
        .get_category_by_id(category_id, tenant_id)
        .map_err(ServiceError::from)?
    {
        Some(_) => Ok(()),
        None => Err(ServiceError::Form("Categoría inválida".to_string())),
    }
}

/// Edit screen of an item: its options plus everything that may be linked.
pub fn menu_item_editor<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    item_id: i32,
) -> ServiceResult<MenuItemEditor>
where
    R: MenuReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let detail = repo
        .get_menu_item_details(tenant_id, &[item_id])
        .map_err(ServiceError::from)?
        .into_iter()
        .next()
        .ok_or(ServiceError::NotFound)?;

    Ok(MenuItemEditor {
        detail,
        categories: repo
            .list_categories(tenant_id, false)
            .map_err(ServiceError::from)?,
        addons: repo.list_addons(tenant_id).map_err(ServiceError::from)?,
        modifiers: repo.list_modifiers(tenant_id).map_err(ServiceError::from)?,
    })
}

pub fn create_menu_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    form: MenuItemForm,
) -> ServiceResult<MenuItem>
where
    R: MenuReader + MenuWriter + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let new_item = form
        .into_new_item(tenant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    ensure_category(repo, tenant_id, new_item.category_id)?;

    if repo
        .get_menu_item_by_slug(&new_item.slug, tenant_id)
        .map_err(ServiceError::from)?
        .is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "Ya existe un producto con el identificador `{}`",
            new_item.slug
        )));
    }

    let item = repo
        .create_menu_item(&new_item)
        .map_err(ServiceError::from)?;
    log::info!("Menu item {} created for tenant {}", item.slug, tenant_id);
    Ok(item)
}

pub fn update_menu_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    item_id: i32,
    form: MenuItemForm,
) -> ServiceResult<MenuItem>
where
    R: MenuReader + MenuWriter + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let item = repo
        .get_menu_item_by_id(item_id, tenant_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;
    let updates = form
        .into_update_item()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    ensure_category(repo, tenant_id, updates.category_id)?;

    repo.update_menu_item(item.id, tenant_id, &updates)
        .map_err(ServiceError::from)
}

pub fn delete_menu_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    item_id: i32,
) -> ServiceResult<()>
where
    R: MenuReader + MenuWriter + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let item = repo
        .get_menu_item_by_id(item_id, tenant_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;
    repo.delete_menu_item(item.id, tenant_id)
        .map_err(ServiceError::from)
}

/// Adds a variant. Names are unique per item, ignoring case.
pub fn add_variant<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    item_id: i32,
    form: AddVariantForm,
) -> ServiceResult<MenuVariant>
where
    R: MenuReader + MenuWriter + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let detail = repo
        .get_menu_item_details(tenant_id, &[item_id])
        .map_err(ServiceError::from)?
        .into_iter()
        .next()
        .ok_or(ServiceError::NotFound)?;
    let new_variant = form
        .into_new_variant(detail.item.id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if detail
        .variants
        .iter()
        .any(|variant| variant.name.to_lowercase() == new_variant.name.to_lowercase())
    {
        return Err(ServiceError::Conflict(format!(
            "El producto ya tiene la variante `{}`",
            new_variant.name
        )));
    }

    repo.create_variant(tenant_id, &new_variant)
        .map_err(ServiceError::from)
}

/// Every linked id must name an item of the tenant.
fn ensure_items<R>(repo: &R, tenant_id: i32, item_ids: &[i32]) -> ServiceResult<()>
where
    R: MenuReader + ?Sized,
{
    if item_ids.is_empty() {
        return Ok(());
    }
    let found = repo
        .get_menu_item_details(tenant_id, item_ids)
        .map_err(ServiceError::from)?
        .len();
    if found != item_ids.len() {
        return Err(ServiceError::Form("Productos inválidos".to_string()));
    }
    Ok(())
}

pub fn create_addon<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    form: AddAddonForm,
) -> ServiceResult<MenuAddon>
where
    R: MenuReader + MenuWriter + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let new_addon = form
        .into_new_addon(tenant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    ensure_items(repo, tenant_id, &new_addon.menu_item_ids)?;

    repo.create_addon(&new_addon).map_err(ServiceError::from)
}

pub fn create_modifier<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    form: AddModifierForm,
) -> ServiceResult<MenuModifier>
where
    R: MenuReader + MenuWriter + ?Sized,
{
    ensure_admin(user, tenant)?;
    let tenant_id = tenant.tenant_id();

    let new_modifier = form
        .into_new_modifier(tenant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    ensure_items(repo, tenant_id, &new_modifier.menu_item_ids)?;

    repo.create_modifier(&new_modifier)
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ADMIN_ROLE;
    use crate::domain::menu::VariantType;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{
        TENANT_ID, fixed_datetime, sample_menu_item, tenant_context, user_with_roles,
    };

    fn category(id: i32, slug: &str) -> MenuCategory {
        MenuCategory {
            id,
            tenant_id: TENANT_ID,
            name: slug.to_string(),
            slug: slug.to_string(),
            description: None,
            sort_order: 0,
            is_active: true,
            available_from: None,
            available_until: None,
            created_at: fixed_datetime(),
            updated_at: fixed_datetime(),
        }
    }

    fn item_form(name: &str) -> MenuItemForm {
        MenuItemForm {
            category_id: 1,
            name: name.to_string(),
            base_price: "18000".to_string(),
            is_available: true,
            ..MenuItemForm::default()
        }
    }

    fn admin() -> AuthenticatedUser {
        user_with_roles(&[ADMIN_ROLE])
    }

    #[test]
    fn waiters_cannot_manage_menu() {
        let repo = FakeRepo::new();
        let result = create_menu_item(
            &repo,
            &user_with_roles(&["waiter"]),
            &tenant_context(),
            item_form("Ajiaco"),
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn duplicate_category_slug_conflicts() {
        let mut repo = FakeRepo::new();
        repo.menu_reader
            .expect_get_category_by_slug()
            .returning(|slug, _| Ok(Some(category(1, slug))));
        repo.menu_writer.expect_create_category().never();

        let form = MenuCategoryForm {
            name: "Bebidas".to_string(),
            is_active: true,
            ..MenuCategoryForm::default()
        };
        let result = create_category(&repo, &admin(), &tenant_context(), form);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn item_creation_generates_slug() {
        let mut repo = FakeRepo::new();
        repo.menu_reader
            .expect_get_category_by_id()
            .returning(|id, _| Ok(Some(category(id, "platos"))));
        repo.menu_reader
            .expect_get_menu_item_by_slug()
            .withf(|slug, _| slug == "bandeja-paisa")
            .returning(|_, _| Ok(None));
        repo.menu_writer
            .expect_create_menu_item()
            .times(1)
            .returning(|new_item| {
                let mut item = sample_menu_item(5, &new_item.name, new_item.base_price_cents);
                item.slug = new_item.slug.clone();
                Ok(item)
            });

        let item = create_menu_item(&repo, &admin(), &tenant_context(), item_form("Bandeja Paisa"))
            .expect("created");
        assert_eq!(item.slug, "bandeja-paisa");
        assert_eq!(item.base_price_cents, 1_800_000);
    }

    #[test]
    fn item_needs_a_tenant_category() {
        let mut repo = FakeRepo::new();
        repo.menu_reader
            .expect_get_category_by_id()
            .returning(|_, _| Ok(None));
        repo.menu_writer.expect_create_menu_item().never();

        let result = create_menu_item(&repo, &admin(), &tenant_context(), item_form("Sancocho"));
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn categories_with_items_are_kept() {
        let mut repo = FakeRepo::new();
        repo.menu_reader
            .expect_get_category_by_id()
            .returning(|id, _| Ok(Some(category(id, "platos"))));
        repo.menu_reader
            .expect_list_menu_items()
            .returning(|_| Ok((3, vec![sample_menu_item(1, "Arepa", 5_000)])));
        repo.menu_writer.expect_delete_category().never();

        let result = delete_category(&repo, &admin(), &tenant_context(), 1);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn variant_names_are_unique_per_item() {
        let mut repo = FakeRepo::new();
        repo.menu_reader
            .expect_get_menu_item_details()
            .returning(|_, _| {
                Ok(vec![MenuItemDetail {
                    item: sample_menu_item(2, "Jugo", 6_000),
                    category_name: "Bebidas".to_string(),
                    variants: vec![MenuVariant {
                        id: 1,
                        menu_item_id: 2,
                        variant_type: VariantType::Size,
                        name: "Grande".to_string(),
                        price_modifier_cents: 200_000,
                        is_default: false,
                        is_available: true,
                        sort_order: 0,
                    }],
                    addons: Vec::new(),
                    modifiers: Vec::new(),
                }])
            });
        repo.menu_writer.expect_create_variant().never();

        let form = AddVariantForm {
            name: "grande".to_string(),
            ..AddVariantForm::default()
        };
        let result = add_variant(&repo, &admin(), &tenant_context(), 2, form);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn addon_links_must_belong_to_tenant() {
        let mut repo = FakeRepo::new();
        repo.menu_reader
            .expect_get_menu_item_details()
            .returning(|_, _| Ok(Vec::new()));
        repo.menu_writer.expect_create_addon().never();

        let form = AddAddonForm {
            name: "Queso extra".to_string(),
            addon_type: String::new(),
            description: None,
            price: "2000".to_string(),
            max_quantity: 2,
            menu_item_ids: vec![77],
        };
        let result = create_addon(&repo, &admin(), &tenant_context(), form);
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
