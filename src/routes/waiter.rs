use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{redirect, render_template};
use serde_json::json;
use tera::Tera;

use crate::config::AppConfig;
use crate::domain::order::OrderStatus;
use crate::domain::tenant::TenantContext;
use crate::forms::waiter::{AvailabilityForm, CloseTableForm, NotificationFilter};
use crate::repository::DieselRepository;
use crate::routes::{json_service_error, not_allowed, staff_context};
use crate::services::ServiceError;
use crate::services::notifications::{
    list_notifications, mark_all_notifications_read, mark_notification_read,
};
use crate::services::table_sessions::TableSessionCache;
use crate::services::waiter::{
    close_table, ready_items, serve_item, set_availability, waiter_dashboard,
    waiter_order_detail, waiter_orders,
};

#[get("/")]
pub async fn show_dashboard(
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<TableSessionCache>,
    config: web::Data<AppConfig>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match waiter_dashboard(
        repo.get_ref(),
        &sessions,
        config.session_settings(),
        &user,
        &tenant,
    ) {
        Ok(dashboard) => {
            let mut context = staff_context(
                &flash_messages,
                &user,
                &tenant,
                "waiter",
                &server_config.auth_service_url,
            );
            context.insert("dashboard", &dashboard);
            render_template(&tera, "waiter/dashboard.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_allowed(),
        Err(err) => {
            log::error!("Failed to load waiter dashboard: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/orders/")]
pub async fn show_orders(
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match waiter_orders(repo.get_ref(), &user, &tenant) {
        Ok(orders) => {
            let mut context = staff_context(
                &flash_messages,
                &user,
                &tenant,
                "waiter_orders",
                &server_config.auth_service_url,
            );
            context.insert("orders", &orders);
            render_template(&tera, "waiter/orders.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_allowed(),
        Err(err) => {
            log::error!("Failed to list waiter orders: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/orders/{order_id}/")]
pub async fn show_order(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (_, order_id) = path.into_inner();
    match waiter_order_detail(repo.get_ref(), &user, &tenant, order_id) {
        Ok(view) => {
            let mut context = staff_context(
                &flash_messages,
                &user,
                &tenant,
                "waiter_orders",
                &server_config.auth_service_url,
            );
            context.insert("view", &view);
            render_template(&tera, "waiter/order_detail.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_allowed(),
        Err(ServiceError::NotFound) => {
            FlashMessage::warning("El pedido no existe.").send();
            redirect(&tenant.path("waiter/orders/"))
        }
        Err(err) => {
            log::error!("Failed to load order {order_id} for waiter: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/api/ready-items/")]
pub async fn ready_items_feed(
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match ready_items(repo.get_ref(), &user, &tenant) {
        Ok(items) => HttpResponse::Ok().json(json!({
            "success": true,
            "count": items.len(),
            "items": items,
        })),
        Err(err) => json_service_error(err, "load ready items"),
    }
}

#[post("/item/{item_id}/serve/")]
pub async fn serve(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    match serve_item(repo.get_ref(), &user, &tenant, item_id) {
        Ok(outcome) => HttpResponse::Ok().json(json!({
            "success": true,
            "new_status": outcome.item.status.as_str(),
            "new_status_display": outcome.item.status.label(),
            "order_number": outcome.order.order_number,
            "order_status": outcome.order_status.map(OrderStatus::as_str),
        })),
        Err(err) => json_service_error(err, "serve item"),
    }
}

#[post("/tables/{table_id}/close/")]
pub async fn close(
    path: web::Path<(String, i32)>,
    form: web::Form<CloseTableForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<TableSessionCache>,
) -> impl Responder {
    let (_, table_id) = path.into_inner();
    match close_table(
        repo.get_ref(),
        &sessions,
        &user,
        &tenant,
        table_id,
        form.into_inner(),
    ) {
        Ok(closure) => {
            FlashMessage::success(format!(
                "{} cerrada. Sesiones finalizadas: {}.",
                closure.table_name, closure.sessions_ended
            ))
            .send();
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Solo el mesero asignado puede cerrar esta mesa.").send();
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::warning("La mesa no existe.").send();
        }
        Err(err) => {
            log::error!("Failed to close table {table_id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }
    redirect(&tenant.path("waiter/"))
}

#[post("/availability/")]
pub async fn availability(
    form: web::Form<AvailabilityForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match set_availability(repo.get_ref(), &user, &tenant, form.into_inner()) {
        Ok(member) => HttpResponse::Ok().json(json!({
            "success": true,
            "is_available": member.is_available,
        })),
        Err(err) => json_service_error(err, "change availability"),
    }
}

#[get("/notifications/")]
pub async fn show_notifications(
    params: web::Query<NotificationFilter>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match list_notifications(repo.get_ref(), &user, &tenant, params.into_inner()) {
        Ok(page) => {
            let mut context = staff_context(
                &flash_messages,
                &user,
                &tenant,
                "notifications",
                &server_config.auth_service_url,
            );
            context.insert("page", &page);
            render_template(&tera, "waiter/notifications.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_allowed(),
        Err(err) => {
            log::error!("Failed to list notifications: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/notifications/{notification_id}/read/")]
pub async fn read_notification(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, notification_id) = path.into_inner();
    match mark_notification_read(repo.get_ref(), &user, &tenant, notification_id) {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(err) => json_service_error(err, "mark notification read"),
    }
}

#[post("/notifications/read-all/")]
pub async fn read_all_notifications(
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match mark_all_notifications_read(repo.get_ref(), &user, &tenant) {
        Ok(updated) => HttpResponse::Ok().json(json!({
            "success": true,
            "updated": updated,
        })),
        Err(err) => json_service_error(err, "mark notifications read"),
    }
}
