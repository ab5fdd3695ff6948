use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::routes::{redirect, render_template};
use serde::Deserialize;
use serde_json::json;
use tera::Tera;

use crate::config::AppConfig;
use crate::domain::tenant::TenantContext;
use crate::forms::cart::{AddToCartForm, RemoveCartForm, UpdateCartForm};
use crate::repository::DieselRepository;
use crate::routes::{
    cart_json, customer_context, json_service_error, load_cart, parse_form, store_cart,
    table_session_or_redirect,
};
use crate::services::ServiceError;
use crate::services::cart::{add_to_cart, clear_cart, price_cart, remove_cart_line, update_cart_line};
use crate::services::menu::{
    MenuQuery, menu_catalog, menu_item_page, public_menu, search_menu,
};
use crate::services::table_sessions::TableSessionCache;

#[get("/menu/")]
pub async fn show_menu(
    params: web::Query<MenuQuery>,
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<TableSessionCache>,
    config: web::Data<AppConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let tenant = tenant.into_inner();
    let table_session =
        match table_session_or_redirect(&session, &repo, &sessions, &config, &tenant) {
            Ok(table_session) => table_session,
            Err(response) => return response,
        };

    match public_menu(repo.get_ref(), &tenant, params.into_inner()) {
        Ok(menu) => {
            let mut context = customer_context(
                &flash_messages,
                &tenant,
                &session,
                table_session.as_ref(),
                "menu",
            );
            context.insert("categories", &menu.categories);
            context.insert("sections", &menu.sections);
            context.insert("featured", &menu.featured);
            context.insert("filters", &menu.filters);
            context.insert("total_items", &menu.total_items);
            render_template(&tera, "menu/index.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::warning("La categoría no está disponible.").send();
            redirect(&tenant.path("menu/"))
        }
        Err(err) => {
            log::error!("Failed to load menu of {}: {err}", tenant.slug());
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/menu/item/{item_slug}/")]
pub async fn show_menu_item(
    path: web::Path<(String, String)>,
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<TableSessionCache>,
    config: web::Data<AppConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (_, item_slug) = path.into_inner();
    let tenant = tenant.into_inner();
    let table_session =
        match table_session_or_redirect(&session, &repo, &sessions, &config, &tenant) {
            Ok(table_session) => table_session,
            Err(response) => return response,
        };

    match menu_item_page(repo.get_ref(), &tenant, &item_slug) {
        Ok(page) => {
            let mut context = customer_context(
                &flash_messages,
                &tenant,
                &session,
                table_session.as_ref(),
                "menu",
            );
            context.insert("page", &page);
            render_template(&tera, "menu/item.html", &context)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::warning("El producto no está disponible.").send();
            redirect(&tenant.path("menu/"))
        }
        Err(err) => {
            log::error!("Failed to load menu item `{item_slug}`: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/menu/api/")]
pub async fn menu_api(
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match menu_catalog(repo.get_ref(), &tenant) {
        Ok(sections) => HttpResponse::Ok().json(json!({
            "success": true,
            "categories": sections,
        })),
        Err(err) => json_service_error(err, "load menu catalog"),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[get("/menu/api/search/")]
pub async fn menu_search(
    params: web::Query<SearchParams>,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match search_menu(repo.get_ref(), &tenant, &params.q) {
        Ok(results) => HttpResponse::Ok().json(json!({
            "success": true,
            "count": results.len(),
            "results": results,
        })),
        Err(err) => json_service_error(err, "search menu"),
    }
}

#[get("/menu/cart/")]
pub async fn show_cart(
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<TableSessionCache>,
    config: web::Data<AppConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let tenant = tenant.into_inner();
    let table_session =
        match table_session_or_redirect(&session, &repo, &sessions, &config, &tenant) {
            Ok(table_session) => table_session,
            Err(response) => return response,
        };

    let cart = load_cart(&session, tenant.tenant_id());
    match price_cart(repo.get_ref(), tenant.tenant_id(), &cart) {
        Ok(priced) => {
            let mut context = customer_context(
                &flash_messages,
                &tenant,
                &session,
                table_session.as_ref(),
                "cart",
            );
            context.insert("cart", &priced);
            render_template(&tera, "menu/cart.html", &context)
        }
        Err(err) => {
            log::error!("Failed to price cart: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/menu/cart/add/")]
pub async fn cart_add(
    body: web::Bytes,
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let form: AddToCartForm = match parse_form(&body) {
        Ok(form) => form,
        Err(err) => return json_service_error(err, "add to cart"),
    };

    let tenant_id = tenant.tenant_id();
    let mut cart = load_cart(&session, tenant_id);
    match add_to_cart(repo.get_ref(), tenant_id, &mut cart, form) {
        Ok(update) => {
            store_cart(&session, tenant_id, &cart);
            cart_json(&update)
        }
        Err(err) => json_service_error(err, "add to cart"),
    }
}

#[post("/menu/cart/update/")]
pub async fn cart_update(
    form: web::Form<UpdateCartForm>,
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let tenant_id = tenant.tenant_id();
    let mut cart = load_cart(&session, tenant_id);
    match update_cart_line(repo.get_ref(), tenant_id, &mut cart, form.into_inner()) {
        Ok(update) => {
            store_cart(&session, tenant_id, &cart);
            cart_json(&update)
        }
        Err(err) => json_service_error(err, "update cart"),
    }
}

#[post("/menu/cart/remove/")]
pub async fn cart_remove(
    form: web::Form<RemoveCartForm>,
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let tenant_id = tenant.tenant_id();
    let mut cart = load_cart(&session, tenant_id);
    match remove_cart_line(repo.get_ref(), tenant_id, &mut cart, form.into_inner()) {
        Ok(update) => {
            store_cart(&session, tenant_id, &cart);
            cart_json(&update)
        }
        Err(err) => json_service_error(err, "remove cart line"),
    }
}

#[post("/menu/cart/clear/")]
pub async fn cart_clear(tenant: web::ReqData<TenantContext>, session: Session) -> impl Responder {
    let tenant_id = tenant.tenant_id();
    let mut cart = load_cart(&session, tenant_id);
    let update = clear_cart(&mut cart);
    store_cart(&session, tenant_id, &cart);
    cart_json(&update)
}
