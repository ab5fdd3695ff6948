use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Local;
use pushkind_common::routes::{redirect, render_template};
use serde_json::json;
use tera::{Context, Tera};

use crate::config::AppConfig;
use crate::domain::table_session::{BrowserTableSession, SessionLookup};
use crate::domain::tenant::TenantContext;
use crate::forms::waiter::CallWaiterForm;
use crate::repository::DieselRepository;
use crate::routes::{
    client_info, current_table_session, customer_context, json_error, json_service_error,
    load_table_pointer, store_table_pointer, table_session_or_redirect,
};
use crate::services::ServiceError;
use crate::services::menu::{MenuQuery, public_menu};
use crate::services::notifications::call_waiter;
use crate::services::table_sessions::{
    TableSessionCache, end_session, extend_session, scan_table, session_key,
};

#[get("/")]
pub async fn landing(tera: web::Data<Tera>) -> impl Responder {
    render_template(&tera, "landing.html", &Context::new())
}

#[get("/")]
pub async fn restaurant_home(
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

    match public_menu(repo.get_ref(), &tenant, MenuQuery::default()) {
        Ok(menu) => {
            let mut context = customer_context(
                &flash_messages,
                &tenant,
                &session,
                table_session.as_ref(),
                "home",
            );
            context.insert(
                "is_open",
                &tenant.restaurant.is_open_at(Local::now().time()),
            );
            context.insert("categories", &menu.categories);
            context.insert("featured", &menu.featured);
            render_template(&tera, "customer/home.html", &context)
        }
        Err(err) => {
            log::error!("Failed to load home of {}: {err}", tenant.slug());
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/table/{qr_code_uuid}/")]
pub async fn scan(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<TableSessionCache>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let (_, qr_code_uuid) = path.into_inner();
    let tenant = tenant.into_inner();
    let client = client_info(&req);

    match scan_table(
        repo.get_ref(),
        &sessions,
        config.session_settings(),
        &tenant,
        &qr_code_uuid,
        &client,
    ) {
        Ok(table_session) => {
            store_table_pointer(
                &session,
                tenant.tenant_id(),
                &BrowserTableSession::from(&table_session),
            );
            FlashMessage::success(format!(
                "¡Bienvenido! Estás en la {}. Ya puedes hacer tu pedido.",
                table_session.table_name
            ))
            .send();
            redirect(&tenant.path("menu/"))
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::warning("El código QR no corresponde a ninguna mesa.").send();
            redirect(&tenant.path(""))
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::warning(message).send();
            redirect(&tenant.path(""))
        }
        Err(err) => {
            log::error!("Failed to open table session: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/session-closed/")]
pub async fn session_closed(
    tenant: web::ReqData<TenantContext>,
    session: Session,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let tenant = tenant.into_inner();
    session.remove(&session_key(tenant.tenant_id()));
    let context = customer_context(&flash_messages, &tenant, &session, None, "session_closed");
    render_template(&tera, "customer/session_closed.html", &context)
}

#[get("/api/session/status/")]
pub async fn session_status(
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<TableSessionCache>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let tenant = tenant.into_inner();
    match current_table_session(&session, &repo, &sessions, &config, &tenant) {
        SessionLookup::Active(table_session) => HttpResponse::Ok().json(json!({
            "success": true,
            "active": true,
            "session": table_session.info(Local::now().naive_utc()),
        })),
        SessionLookup::ClosedByStaff(closure) => HttpResponse::Ok().json(json!({
            "success": true,
            "active": false,
            "closed_by_staff": true,
            "redirect": tenant.path("session-closed/"),
            "staff_name": closure.staff_name,
        })),
        SessionLookup::Expired | SessionLookup::Missing => HttpResponse::Ok().json(json!({
            "success": true,
            "active": false,
            "closed_by_staff": false,
        })),
    }
}

#[post("/api/session/extend/")]
pub async fn session_extend(
    tenant: web::ReqData<TenantContext>,
    session: Session,
    sessions: web::Data<TableSessionCache>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let tenant = tenant.into_inner();
    let Some(pointer) = load_table_pointer(&session, tenant.tenant_id()) else {
        return json_service_error(ServiceError::SessionExpired, "extend table session");
    };

    match extend_session(&sessions, config.session_settings(), &pointer.token) {
        Ok(info) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Sesión extendida.",
            "session": info,
        })),
        Err(err) => {
            session.remove(&session_key(tenant.tenant_id()));
            json_service_error(err, "extend table session")
        }
    }
}

#[post("/api/session/end/")]
pub async fn session_end(
    tenant: web::ReqData<TenantContext>,
    session: Session,
    sessions: web::Data<TableSessionCache>,
) -> impl Responder {
    let tenant = tenant.into_inner();
    let pointer = load_table_pointer(&session, tenant.tenant_id());
    session.remove(&session_key(tenant.tenant_id()));

    let Some(pointer) = pointer else {
        return json_service_error(ServiceError::SessionExpired, "end table session");
    };
    match end_session(&sessions, &pointer.token) {
        Ok(()) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Sesión finalizada. ¡Gracias por tu visita!",
        })),
        Err(err) => json_service_error(err, "end table session"),
    }
}

#[post("/api/call-waiter/")]
pub async fn call_waiter_request(
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<TableSessionCache>,
    config: web::Data<AppConfig>,
    form: web::Form<CallWaiterForm>,
) -> impl Responder {
    let tenant = tenant.into_inner();
    let table_session = match current_table_session(&session, &repo, &sessions, &config, &tenant)
    {
        SessionLookup::Active(table_session) => table_session,
        _ => return json_service_error(ServiceError::SessionExpired, "call waiter"),
    };

    match call_waiter(repo.get_ref(), &table_session, form.into_inner()) {
        Ok(true) => HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Tu mesero fue notificado y vendrá en un momento.",
        })),
        Ok(false) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "No hay meseros disponibles en este momento.",
        ),
        Err(err) => json_service_error(err, "call waiter"),
    }
}
