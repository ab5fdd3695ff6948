//! HTTP handlers and the helpers they share.

use std::collections::HashMap;

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, http::StatusCode};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use chrono::Local;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::{base_context, redirect};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tera::Context;

use crate::config::AppConfig;
use crate::domain::cart::Cart;
use crate::domain::money::format_cents;
use crate::domain::table::ClientInfo;
use crate::domain::table_session::{
    BrowserTableSession, SessionLookup, TableInvalidation, TableSession,
};
use crate::domain::tenant::TenantContext;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::cart::{CartUpdate, cart_key};
use crate::services::orders::orders_key;
use crate::services::table_sessions::{TableSessionCache, lookup_session, session_key};

pub mod admin;
pub mod customer;
pub mod menu;
pub mod orders;
pub mod platform;
pub mod stations;
pub mod waiter;

#[derive(Debug, Serialize)]
struct Alert {
    level: &'static str,
    message: String,
}

fn alerts(flash_messages: &IncomingFlashMessages) -> Vec<Alert> {
    flash_messages
        .iter()
        .map(|message| Alert {
            level: match message.level() {
                Level::Error => "danger",
                Level::Warning => "warning",
                Level::Success => "success",
                _ => "info",
            },
            message: message.content().to_string(),
        })
        .collect()
}

/// Template context of the customer pages of a tenant.
pub fn tenant_context(
    flash_messages: &IncomingFlashMessages,
    tenant: &TenantContext,
    current_page: &str,
) -> Context {
    let mut context = Context::new();
    context.insert("alerts", &alerts(flash_messages));
    context.insert("tenant", &tenant.tenant);
    context.insert("restaurant", &tenant.restaurant);
    context.insert("base_path", &tenant.path(""));
    context.insert("current_page", current_page);
    context
}

/// Staff page context inside a tenant.
pub fn staff_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    current_page: &str,
    auth_service_url: &str,
) -> Context {
    let mut context = base_context(flash_messages, user, current_page, auth_service_url);
    context.insert("tenant", &tenant.tenant);
    context.insert("restaurant", &tenant.restaurant);
    context.insert("base_path", &tenant.path(""));
    context
}

/// Flash shown before sending a user without the role to `/na`.
pub fn not_allowed() -> HttpResponse {
    FlashMessage::error("No tienes permisos para acceder a esta sección.").send();
    redirect("/na")
}

/// Customer page context: tenant, cart badge and table session banner.
pub fn customer_context(
    flash_messages: &IncomingFlashMessages,
    tenant: &TenantContext,
    session: &Session,
    table_session: Option<&TableSession>,
    current_page: &str,
) -> Context {
    let mut context = tenant_context(flash_messages, tenant, current_page);
    let cart = load_cart(session, tenant.tenant_id());
    context.insert("cart_items", &cart.total_quantity());
    context.insert(
        "table_session",
        &table_session.map(|table_session| table_session.info(Local::now().naive_utc())),
    );
    context
}

/// Decodes an urlencoded body. Repeated keys fill `Vec` fields.
pub fn parse_form<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    serde_html_form::from_bytes(body).map_err(|err| ServiceError::Form(err.to_string()))
}

/// `{"success": false, "error": ...}` with `status`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "success": false, "error": message.into() }))
}

/// Maps a service failure onto the JSON error envelope.
pub fn json_service_error(err: ServiceError, action: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => json_error(StatusCode::UNAUTHORIZED, "Acceso no autorizado"),
        ServiceError::NotFound => json_error(StatusCode::NOT_FOUND, "No encontrado"),
        ServiceError::SessionExpired => json_error(
            StatusCode::UNAUTHORIZED,
            "La sesión de la mesa expiró. Escanea el código QR nuevamente.",
        ),
        ServiceError::EmptyCart => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "El carrito está vacío")
        }
        ServiceError::Conflict(message) => json_error(StatusCode::CONFLICT, message),
        ServiceError::Form(message) => json_error(StatusCode::UNPROCESSABLE_ENTITY, message),
        ServiceError::InvalidTransition { from, to } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Transición inválida de {from} a {to}"),
        ),
        err => {
            log::error!("Failed to {action}: {err}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Error interno")
        }
    }
}

pub fn client_info(req: &HttpRequest) -> ClientInfo {
    let connection = req.connection_info();
    ClientInfo {
        ip_address: connection.realip_remote_addr().map(str::to_string),
        user_agent: req
            .headers()
            .get(actix_web::http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    }
}

pub fn load_cart(session: &Session, tenant_id: i32) -> Cart {
    session
        .get::<Cart>(&cart_key(tenant_id))
        .unwrap_or_else(|err| {
            log::warn!("Discarding unreadable cart: {err}");
            None
        })
        .unwrap_or_default()
}

pub fn store_cart(session: &Session, tenant_id: i32, cart: &Cart) {
    if let Err(err) = session.insert(cart_key(tenant_id), cart) {
        log::error!("Failed to store cart: {err}");
    }
}

pub fn load_orders(session: &Session, tenant_id: i32) -> Vec<String> {
    session
        .get::<Vec<String>>(&orders_key(tenant_id))
        .ok()
        .flatten()
        .unwrap_or_default()
}

pub fn store_orders(session: &Session, tenant_id: i32, codes: &[String]) {
    if let Err(err) = session.insert(orders_key(tenant_id), codes) {
        log::error!("Failed to remember orders: {err}");
    }
}

pub fn load_table_pointer(session: &Session, tenant_id: i32) -> Option<BrowserTableSession> {
    session
        .get::<BrowserTableSession>(&session_key(tenant_id))
        .ok()
        .flatten()
}

pub fn store_table_pointer(session: &Session, tenant_id: i32, pointer: &BrowserTableSession) {
    if let Err(err) = session.insert(session_key(tenant_id), pointer) {
        log::error!("Failed to store table session: {err}");
    }
}

/// Drops the browser's pointer unless the lookup found a live session.
pub fn sync_table_pointer(session: &Session, tenant_id: i32, lookup: &SessionLookup) {
    if !matches!(lookup, SessionLookup::Active(_) | SessionLookup::Missing) {
        session.remove(&session_key(tenant_id));
    }
}

/// Validates the browser's table session and drops a stale pointer.
pub fn current_table_session(
    session: &Session,
    repo: &DieselRepository,
    cache: &TableSessionCache,
    config: &AppConfig,
    tenant: &TenantContext,
) -> SessionLookup {
    let pointer = load_table_pointer(session, tenant.tenant_id());
    let lookup = match lookup_session(
        repo,
        cache,
        config.session_settings(),
        tenant,
        pointer.as_ref(),
    ) {
        Ok(lookup) => lookup,
        Err(err) => {
            log::error!("Failed to check table session: {err}");
            return SessionLookup::Missing;
        }
    };
    sync_table_pointer(session, tenant.tenant_id(), &lookup);
    lookup
}

/// Live table session for an HTML page, or the redirect to the closed page.
pub fn table_session_or_redirect(
    session: &Session,
    repo: &DieselRepository,
    cache: &TableSessionCache,
    config: &AppConfig,
    tenant: &TenantContext,
) -> Result<Option<TableSession>, HttpResponse> {
    match current_table_session(session, repo, cache, config, tenant) {
        SessionLookup::Active(table_session) => Ok(Some(table_session)),
        SessionLookup::ClosedByStaff(closure) => Err(session_closed_redirect(tenant, &closure)),
        SessionLookup::Expired | SessionLookup::Missing => Ok(None),
    }
}

pub fn session_closed_redirect(tenant: &TenantContext, closure: &TableInvalidation) -> HttpResponse {
    let mut message = format!("{} cerró la {}.", closure.staff_name, closure.table_name);
    if let Some(reason) = &closure.reason {
        message.push_str(&format!(" Motivo: {reason}."));
    }
    FlashMessage::warning(message).send();
    redirect(&tenant.path("session-closed/"))
}

pub fn cart_json(update: &CartUpdate) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": update.message,
        "cart_total_items": update.cart_total_items,
        "cart_total_price": update.cart_total_price_cents,
        "cart_total_price_display": format_cents(update.cart_total_price_cents),
    }))
}

/// Tera filter rendering integer cents as `$12.500`.
pub fn money_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let cents = value
        .as_i64()
        .ok_or_else(|| tera::Error::msg("money filter expects an integer amount of cents"))?;
    Ok(Value::String(format_cents(cents)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_filter_formats_cents() {
        let value = money_filter(&json!(1_250_000), &HashMap::new()).expect("formatted");
        assert_eq!(value, json!(format_cents(1_250_000)));
    }

    #[test]
    fn money_filter_rejects_text() {
        assert!(money_filter(&json!("doce"), &HashMap::new()).is_err());
    }

    #[test]
    fn json_errors_use_envelope() {
        let response = json_service_error(ServiceError::NotFound, "load");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn repeated_keys_fill_vectors() {
        let form: crate::forms::cart::AddToCartForm =
            parse_form(b"menu_item_id=3&addon_ids=1&addon_ids=2&quantity=2").expect("parsed");
        assert_eq!(form.addon_ids, vec![1, 2]);
        assert_eq!(form.quantity, 2);
    }
}
