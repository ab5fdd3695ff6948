//! Public catalog for customers.

use std::collections::HashMap;

use chrono::{Local, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::menu::{
    MenuAddon, MenuCategory, MenuItem, MenuItemListQuery, MenuModifier, MenuVariant,
};
use crate::domain::tenant::TenantContext;
use crate::repository::MenuReader;
use crate::services::{ServiceError, ServiceResult};

pub const FEATURED_LIMIT: usize = 6;
pub const SEARCH_LIMIT: usize = 10;
pub const MIN_SEARCH_LEN: usize = 2;

/// Filters accepted by the public menu page.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct MenuQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub vegan: bool,
    #[serde(default)]
    pub gluten_free: bool,
}

impl MenuQuery {
    fn search_term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|term| !term.is_empty())
    }

    fn is_filtered(&self) -> bool {
        self.category.is_some()
            || self.search_term().is_some()
            || self.vegetarian
            || self.vegan
            || self.gluten_free
    }
}

/// A menu item with the derived prices templates display.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItemCard {
    #[serde(flatten)]
    pub item: MenuItem,
    pub current_price_cents: i64,
    pub has_discount: bool,
    pub discount_percentage: i64,
    pub is_orderable: bool,
}

impl From<MenuItem> for MenuItemCard {
    fn from(item: MenuItem) -> Self {
        Self {
            current_price_cents: item.current_price_cents(),
            has_discount: item.has_discount(),
            discount_percentage: item.discount_percentage(),
            is_orderable: item.is_orderable(),
            item,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuSection {
    pub category: MenuCategory,
    pub items: Vec<MenuItemCard>,
}

#[derive(Debug, Serialize)]
pub struct MenuPage {
    pub categories: Vec<MenuCategory>,
    pub sections: Vec<MenuSection>,
    pub featured: Vec<MenuItemCard>,
    pub filters: MenuQuery,
    pub total_items: usize,
}

#[derive(Debug, Serialize)]
pub struct MenuItemPage {
    pub item: MenuItemCard,
    pub category_name: String,
    pub variants: Vec<MenuVariant>,
    pub addons: Vec<MenuAddon>,
    pub modifiers: Vec<MenuModifier>,
    pub default_variant_id: Option<i32>,
}

/// Active categories whose availability window includes `time`.
fn visible_categories<R>(repo: &R, tenant_id: i32, time: NaiveTime) -> ServiceResult<Vec<MenuCategory>>
where
    R: MenuReader + ?Sized,
{
    let mut categories = repo
        .list_categories(tenant_id, true)
        .map_err(ServiceError::from)?;
    categories.retain(|category| category.is_available_at(time));
    Ok(categories)
}

fn group_items(categories: &[MenuCategory], items: Vec<MenuItem>) -> Vec<MenuSection> {
    let mut by_category: HashMap<i32, Vec<MenuItemCard>> = HashMap::new();
    for item in items {
        by_category
            .entry(item.category_id)
            .or_default()
            .push(MenuItemCard::from(item));
    }

    categories
        .iter()
        .filter_map(|category| {
            by_category.remove(&category.id).map(|items| MenuSection {
                category: category.clone(),
                items,
            })
        })
        .collect()
}

pub fn public_menu<R>(repo: &R, tenant: &TenantContext, query: MenuQuery) -> ServiceResult<MenuPage>
where
    R: MenuReader + ?Sized,
{
    public_menu_at(repo, tenant, query, Local::now().time())
}

pub fn public_menu_at<R>(
    repo: &R,
    tenant: &TenantContext,
    query: MenuQuery,
    time: NaiveTime,
) -> ServiceResult<MenuPage>
where
    R: MenuReader + ?Sized,
{
    let tenant_id = tenant.tenant_id();
    let categories = visible_categories(repo, tenant_id, time)?;

    let mut list_query = MenuItemListQuery::new(tenant_id).only_available();
    if let Some(slug) = query.category.as_deref() {
        let category = categories
            .iter()
            .find(|category| category.slug == slug)
            .ok_or(ServiceError::NotFound)?;
        list_query = list_query.category(category.id);
    }
    if let Some(term) = query.search_term() {
        list_query = list_query.search(term);
    }
    list_query.vegetarian = query.vegetarian;
    list_query.vegan = query.vegan;
    list_query.gluten_free = query.gluten_free;

    let (_, items) = repo
        .list_menu_items(list_query)
        .map_err(ServiceError::from)?;

    let sections = group_items(&categories, items);
    let total_items = sections.iter().map(|section| section.items.len()).sum();
    let featured = if query.is_filtered() {
        Vec::new()
    } else {
        sections
            .iter()
            .flat_map(|section| section.items.iter())
            .filter(|card| card.item.is_featured)
            .take(FEATURED_LIMIT)
            .cloned()
            .collect()
    };

    Ok(MenuPage {
        categories,
        sections,
        featured,
        filters: query,
        total_items,
    })
}

/// Item page with the options a customer may pick.
pub fn menu_item_page<R>(
    repo: &R,
    tenant: &TenantContext,
    item_slug: &str,
) -> ServiceResult<MenuItemPage>
where
    R: MenuReader + ?Sized,
{
    let tenant_id = tenant.tenant_id();
    let item = repo
        .get_menu_item_by_slug(item_slug, tenant_id)
        .map_err(ServiceError::from)?
        .filter(|item| item.is_available)
        .ok_or(ServiceError::NotFound)?;

    let category_available = visible_categories(repo, tenant_id, Local::now().time())?
        .iter()
        .any(|category| category.id == item.category_id);
    if !category_available {
        return Err(ServiceError::NotFound);
    }

    let detail = repo
        .get_menu_item_details(tenant_id, &[item.id])
        .map_err(ServiceError::from)?
        .into_iter()
        .next()
        .ok_or(ServiceError::NotFound)?;

    let variants: Vec<MenuVariant> = detail
        .variants
        .into_iter()
        .filter(|variant| variant.is_available)
        .collect();
    let default_variant_id = variants
        .iter()
        .find(|variant| variant.is_default)
        .or_else(|| variants.first())
        .map(|variant| variant.id);

    Ok(MenuItemPage {
        item: MenuItemCard::from(detail.item),
        category_name: detail.category_name,
        default_variant_id,
        variants,
        addons: detail
            .addons
            .into_iter()
            .filter(|addon| addon.is_available)
            .collect(),
        modifiers: detail
            .modifiers
            .into_iter()
            .filter(|modifier| modifier.is_available)
            .collect(),
    })
}

/// Whole visible catalog grouped by category.
pub fn menu_catalog<R>(repo: &R, tenant: &TenantContext) -> ServiceResult<Vec<MenuSection>>
where
    R: MenuReader + ?Sized,
{
    public_menu(repo, tenant, MenuQuery::default()).map(|page| page.sections)
}

/// Quick search over orderable items. Terms shorter than two characters match nothing.
pub fn search_menu<R>(repo: &R, tenant: &TenantContext, term: &str) -> ServiceResult<Vec<MenuItemCard>>
where
    R: MenuReader + ?Sized,
{
    let term = term.trim();
    if term.chars().count() < MIN_SEARCH_LEN {
        return Ok(Vec::new());
    }

    let tenant_id = tenant.tenant_id();
    let categories = visible_categories(repo, tenant_id, Local::now().time())?;
    let (_, items) = repo
        .list_menu_items(MenuItemListQuery::new(tenant_id).only_available().search(term))
        .map_err(ServiceError::from)?;

    Ok(items
        .into_iter()
        .filter(|item| categories.iter().any(|category| category.id == item.category_id))
        .take(SEARCH_LIMIT)
        .map(MenuItemCard::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu::{MenuItemDetail, VariantType};
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{TENANT_ID, fixed_datetime, sample_menu_item, tenant_context};

    fn category(id: i32, slug: &str, window: Option<(u32, u32)>) -> MenuCategory {
        MenuCategory {
            id,
            tenant_id: TENANT_ID,
            name: slug.to_string(),
            slug: slug.to_string(),
            description: None,
            sort_order: id,
            is_active: true,
            available_from: window.and_then(|(from, _)| NaiveTime::from_hms_opt(from, 0, 0)),
            available_until: window.and_then(|(_, until)| NaiveTime::from_hms_opt(until, 0, 0)),
            created_at: fixed_datetime(),
            updated_at: fixed_datetime(),
        }
    }

    fn item_in(id: i32, category_id: i32, featured: bool) -> MenuItem {
        let mut item = sample_menu_item(id, &format!("Plato {id}"), 10_000);
        item.category_id = category_id;
        item.is_featured = featured;
        item
    }

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).expect("valid time")
    }

    #[test]
    fn menu_hides_categories_outside_their_window() {
        let mut repo = FakeRepo::new();
        repo.menu_reader.expect_list_categories().returning(|_, _| {
            Ok(vec![
                category(1, "desayunos", Some((7, 11))),
                category(2, "almuerzos", Some((11, 16))),
            ])
        });
        repo.menu_reader.expect_list_menu_items().returning(|_| {
            Ok((2, vec![item_in(1, 1, true), item_in(2, 2, true)]))
        });

        let page = public_menu_at(&repo, &tenant_context(), MenuQuery::default(), noon())
            .expect("menu");

        assert_eq!(page.categories.len(), 1);
        assert_eq!(page.sections.len(), 1);
        assert_eq!(page.sections[0].category.slug, "almuerzos");
        assert_eq!(page.total_items, 1);
        assert_eq!(page.featured.len(), 1);
    }

    #[test]
    fn filters_are_forwarded_and_suppress_featured() {
        let mut repo = FakeRepo::new();
        repo.menu_reader
            .expect_list_categories()
            .returning(|_, _| Ok(vec![category(1, "bebidas", None)]));
        repo.menu_reader
            .expect_list_menu_items()
            .withf(|query| {
                query.category_id == Some(1)
                    && query.vegan
                    && query.only_available
                    && query.search.as_deref() == Some("coco")
            })
            .returning(|_| Ok((1, vec![item_in(4, 1, true)])));

        let query = MenuQuery {
            category: Some("bebidas".to_string()),
            q: Some(" coco ".to_string()),
            vegan: true,
            ..MenuQuery::default()
        };
        let page = public_menu_at(&repo, &tenant_context(), query, noon()).expect("menu");

        assert_eq!(page.total_items, 1);
        assert!(page.featured.is_empty());
    }

    #[test]
    fn unknown_category_is_not_found() {
        let mut repo = FakeRepo::new();
        repo.menu_reader
            .expect_list_categories()
            .returning(|_, _| Ok(vec![category(1, "bebidas", None)]));
        repo.menu_reader.expect_list_menu_items().never();

        let query = MenuQuery {
            category: Some("postres".to_string()),
            ..MenuQuery::default()
        };
        let result = public_menu_at(&repo, &tenant_context(), query, noon());
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn short_search_terms_match_nothing() {
        let mut repo = FakeRepo::new();
        repo.menu_reader.expect_list_menu_items().never();

        let results = search_menu(&repo, &tenant_context(), " a ").expect("search");
        assert!(results.is_empty());
    }

    #[test]
    fn item_page_drops_unavailable_options() {
        let mut repo = FakeRepo::new();
        repo.menu_reader
            .expect_get_menu_item_by_slug()
            .returning(|_, _| Ok(Some(item_in(3, 1, false))));
        repo.menu_reader
            .expect_list_categories()
            .returning(|_, _| Ok(vec![category(1, "platos", None)]));
        repo.menu_reader
            .expect_get_menu_item_details()
            .returning(|_, _| {
                let variant = |id: i32, is_default: bool, is_available: bool| MenuVariant {
                    id,
                    menu_item_id: 3,
                    variant_type: VariantType::Size,
                    name: format!("Tamaño {id}"),
                    price_modifier_cents: 0,
                    is_default,
                    is_available,
                    sort_order: id,
                };
                Ok(vec![MenuItemDetail {
                    item: item_in(3, 1, false),
                    category_name: "Platos".to_string(),
                    variants: vec![variant(1, true, false), variant(2, false, true)],
                    addons: Vec::new(),
                    modifiers: Vec::new(),
                }])
            });

        let page = menu_item_page(&repo, &tenant_context(), "plato-3").expect("item");
        assert_eq!(page.variants.len(), 1);
        assert_eq!(page.default_variant_id, Some(2));
    }

    #[test]
    fn unavailable_item_page_is_not_found() {
        let mut repo = FakeRepo::new();
        repo.menu_reader.expect_get_menu_item_by_slug().returning(|_, _| {
            let mut item = item_in(3, 1, false);
            item.is_available = false;
            Ok(Some(item))
        });

        let result = menu_item_page(&repo, &tenant_context(), "plato-3");
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
