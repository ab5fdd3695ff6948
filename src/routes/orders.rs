use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::routes::{redirect, render_template};
use serde_json::json;
use tera::Tera;

use crate::config::AppConfig;
use crate::domain::cart::Cart;
use crate::domain::tenant::TenantContext;
use crate::forms::checkout::CheckoutForm;
use crate::forms::orders::ReviewForm;
use crate::repository::DieselRepository;
use crate::routes::{
    customer_context, json_service_error, load_cart, load_orders, store_cart, store_orders,
    table_session_or_redirect,
};
use crate::services::ServiceError;
use crate::services::checkout::{CheckoutContext, checkout_page, place_order};
use crate::services::orders::{customer_order, my_orders, remember_order, review_order, track_order};
use crate::services::table_sessions::TableSessionCache;

fn order_path(tenant: &TenantContext, tracking_code: &str) -> String {
    tenant.path(&format!("orders/order/{tracking_code}/"))
}

#[get("/orders/checkout/")]
pub async fn show_checkout(
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
    match checkout_page(
        repo.get_ref(),
        &tenant,
        &cart,
        table_session.as_ref(),
        config.pricing(),
    ) {
        Ok(page) => {
            let mut context = customer_context(
                &flash_messages,
                &tenant,
                &session,
                table_session.as_ref(),
                "checkout",
            );
            context.insert("page", &page);
            render_template(&tera, "orders/checkout.html", &context)
        }
        Err(ServiceError::EmptyCart) => {
            FlashMessage::warning("Tu carrito está vacío. Agrega productos antes de pagar.")
                .send();
            redirect(&tenant.path("menu/"))
        }
        Err(err) => {
            log::error!("Failed to prepare checkout: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/orders/checkout/")]
pub async fn submit_checkout(
    form: web::Form<CheckoutForm>,
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
    sessions: web::Data<TableSessionCache>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let tenant = tenant.into_inner();
    let table_session =
        match table_session_or_redirect(&session, &repo, &sessions, &config, &tenant) {
            Ok(table_session) => table_session,
            Err(response) => return response,
        };

    let tenant_id = tenant.tenant_id();
    let cart = load_cart(&session, tenant_id);
    let ctx = CheckoutContext {
        tenant: &tenant,
        pricing: config.pricing(),
        sessions: &sessions,
        session_settings: config.session_settings(),
        session: table_session.as_ref(),
    };

    match place_order(repo.get_ref(), &ctx, &cart, form.into_inner()) {
        Ok(order) => {
            store_cart(&session, tenant_id, &Cart::new());
            let mut codes = load_orders(&session, tenant_id);
            remember_order(&mut codes, &order.tracking_code);
            store_orders(&session, tenant_id, &codes);

            FlashMessage::success(format!(
                "¡Pedido {} recibido! Te avisaremos cuando esté listo.",
                order.order_number
            ))
            .send();
            redirect(&order_path(&tenant, &order.tracking_code))
        }
        Err(ServiceError::EmptyCart) => {
            FlashMessage::warning("Tu carrito está vacío. Agrega productos antes de pagar.")
                .send();
            redirect(&tenant.path("menu/"))
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(&tenant.path("orders/checkout/"))
        }
        Err(err) => {
            log::error!("Failed to place order for tenant {tenant_id}: {err}");
            FlashMessage::error("No pudimos registrar tu pedido. Intenta de nuevo.").send();
            redirect(&tenant.path("orders/checkout/"))
        }
    }
}

#[get("/orders/my-orders/")]
pub async fn show_my_orders(
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let tenant = tenant.into_inner();
    let codes = load_orders(&session, tenant.tenant_id());

    match my_orders(repo.get_ref(), &tenant, &codes) {
        Ok(orders) => {
            let mut context =
                customer_context(&flash_messages, &tenant, &session, None, "my_orders");
            context.insert("orders", &orders);
            render_template(&tera, "orders/my_orders.html", &context)
        }
        Err(err) => {
            log::error!("Failed to list remembered orders: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/orders/order/{tracking_code}/")]
pub async fn show_order(
    path: web::Path<(String, String)>,
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (_, tracking_code) = path.into_inner();
    let tenant = tenant.into_inner();

    match customer_order(repo.get_ref(), &tenant, &tracking_code) {
        Ok(view) => {
            let mut context = customer_context(&flash_messages, &tenant, &session, None, "order");
            context.insert("view", &view);
            render_template(&tera, "orders/detail.html", &context)
        }
        Err(ServiceError::NotFound) => HttpResponse::NotFound().body("Pedido no encontrado"),
        Err(err) => {
            log::error!("Failed to load order {tracking_code}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/orders/tracking/{tracking_code}/")]
pub async fn show_tracking(
    path: web::Path<(String, String)>,
    tenant: web::ReqData<TenantContext>,
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (_, tracking_code) = path.into_inner();
    let tenant = tenant.into_inner();

    match track_order(repo.get_ref(), &tenant, &tracking_code) {
        Ok(tracking) => {
            let mut context =
                customer_context(&flash_messages, &tenant, &session, None, "tracking");
            context.insert("view", &tracking.view);
            context.insert("history", &tracking.history);
            render_template(&tera, "orders/tracking.html", &context)
        }
        Err(ServiceError::NotFound) => HttpResponse::NotFound().body("Pedido no encontrado"),
        Err(err) => {
            log::error!("Failed to track order {tracking_code}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Polled by the tracking page.
#[get("/orders/tracking/{tracking_code}/status/")]
pub async fn tracking_status(
    path: web::Path<(String, String)>,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, tracking_code) = path.into_inner();
    match customer_order(repo.get_ref(), &tenant, &tracking_code) {
        Ok(view) => HttpResponse::Ok().json(json!({
            "success": true,
            "status": view.order.status,
            "status_display": view.status_label,
            "progress_percentage": view.progress_percentage,
            "summary": view.summary_label,
            "kitchen": view.kitchen,
            "bar": view.bar,
            "items": view.items,
        })),
        Err(err) => json_service_error(err, "poll order status"),
    }
}

#[post("/orders/order/{tracking_code}/review/")]
pub async fn submit_review(
    path: web::Path<(String, String)>,
    form: web::Form<ReviewForm>,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, tracking_code) = path.into_inner();
    let tenant = tenant.into_inner();

    match review_order(repo.get_ref(), &tenant, &tracking_code, form.into_inner()) {
        Ok(_) => {
            FlashMessage::success("¡Gracias por calificar tu pedido!").send();
        }
        Err(ServiceError::NotFound) => {
            return HttpResponse::NotFound().body("Pedido no encontrado");
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
        }
        Err(err) => {
            log::error!("Failed to review order {tracking_code}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }
    redirect(&order_path(&tenant, &tracking_code))
}
