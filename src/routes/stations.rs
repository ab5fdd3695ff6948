//! Kitchen and bar dashboards. Both stations share the handlers below and
//! differ only in the [`ResponsibleArea`] they act on.

use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::render_template;
use tera::Tera;

use crate::domain::order_item::ResponsibleArea;
use crate::domain::tenant::TenantContext;
use crate::forms::orders::ItemStatusForm;
use crate::repository::DieselRepository;
use crate::routes::{json_service_error, not_allowed, staff_context};
use crate::services::ServiceError;
use crate::services::stations::{
    StationUpdate, ready_item, start_item, station_dashboard, update_station_item,
};

fn render_dashboard(
    area: ResponsibleArea,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    repo: &DieselRepository,
    flash_messages: &IncomingFlashMessages,
    server_config: &CommonServerConfig,
    tera: &Tera,
) -> HttpResponse {
    match station_dashboard(repo, user, tenant, area) {
        Ok(dashboard) => {
            let mut context = staff_context(
                flash_messages,
                user,
                tenant,
                area.as_str(),
                &server_config.auth_service_url,
            );
            context.insert("dashboard", &dashboard);
            context.insert("station_path", &tenant.path(area.as_str()));
            render_template(tera, "stations/dashboard.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_allowed(),
        Err(err) => {
            log::error!("Failed to load {area} dashboard: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn items_feed(
    area: ResponsibleArea,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    repo: &DieselRepository,
) -> HttpResponse {
    match station_dashboard(repo, user, tenant, area) {
        Ok(dashboard) => HttpResponse::Ok().json(dashboard),
        Err(err) => json_service_error(err, "load station items"),
    }
}

fn station_reply(result: Result<StationUpdate, ServiceError>, action: &str) -> HttpResponse {
    match result {
        Ok(update) => HttpResponse::Ok().json(update),
        Err(err) => json_service_error(err, action),
    }
}

#[get("/")]
pub async fn kitchen_dashboard(
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_dashboard(
        ResponsibleArea::Kitchen,
        &user,
        &tenant,
        &repo,
        &flash_messages,
        &server_config,
        &tera,
    )
}

#[get("/api/items/")]
pub async fn kitchen_items(
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    items_feed(ResponsibleArea::Kitchen, &user, &tenant, &repo)
}

#[post("/item/{item_id}/status/")]
pub async fn kitchen_item_status(
    path: web::Path<(String, i32)>,
    form: web::Form<ItemStatusForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    station_reply(
        update_station_item(
            repo.get_ref(),
            &user,
            &tenant,
            ResponsibleArea::Kitchen,
            item_id,
            form.into_inner(),
        ),
        "update kitchen item",
    )
}

#[post("/item/{item_id}/start/")]
pub async fn kitchen_item_start(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    station_reply(
        start_item(repo.get_ref(), &user, &tenant, ResponsibleArea::Kitchen, item_id),
        "start kitchen item",
    )
}

#[post("/item/{item_id}/ready/")]
pub async fn kitchen_item_ready(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    station_reply(
        ready_item(repo.get_ref(), &user, &tenant, ResponsibleArea::Kitchen, item_id),
        "finish kitchen item",
    )
}

#[get("/")]
pub async fn bar_dashboard(
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_dashboard(
        ResponsibleArea::Bar,
        &user,
        &tenant,
        &repo,
        &flash_messages,
        &server_config,
        &tera,
    )
}

#[get("/api/items/")]
pub async fn bar_items(
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    items_feed(ResponsibleArea::Bar, &user, &tenant, &repo)
}

#[post("/item/{item_id}/status/")]
pub async fn bar_item_status(
    path: web::Path<(String, i32)>,
    form: web::Form<ItemStatusForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    station_reply(
        update_station_item(
            repo.get_ref(),
            &user,
            &tenant,
            ResponsibleArea::Bar,
            item_id,
            form.into_inner(),
        ),
        "update bar item",
    )
}

#[post("/item/{item_id}/start/")]
pub async fn bar_item_start(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    station_reply(
        start_item(repo.get_ref(), &user, &tenant, ResponsibleArea::Bar, item_id),
        "start bar item",
    )
}

#[post("/item/{item_id}/ready/")]
pub async fn bar_item_ready(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    station_reply(
        ready_item(repo.get_ref(), &user, &tenant, ResponsibleArea::Bar, item_id),
        "finish bar item",
    )
}
