use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{base_context, redirect, render_template};
use tera::Tera;

use crate::forms::tenants::{CreateTenantForm, TenantStatusForm};
use crate::repository::DieselRepository;
use crate::routes::not_allowed;
use crate::services::ServiceError;
use crate::services::tenancy::{
    TenantListParams, change_tenant_status, create_tenant, list_tenants,
};

const TENANTS_PATH: &str = "/platform/tenants/";

#[get("/tenants/")]
pub async fn show_tenants(
    params: web::Query<TenantListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match list_tenants(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "tenants",
                &server_config.auth_service_url,
            );
            context.insert("page", &page);
            render_template(&tera, "platform/tenants.html", &context)
        }
        Err(ServiceError::Unauthorized) => not_allowed(),
        Err(err) => {
            log::error!("Failed to list tenants: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/tenants/")]
pub async fn add_tenant(
    form: web::Form<CreateTenantForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match create_tenant(repo.get_ref(), &user, form.into_inner()) {
        Ok(context) => {
            FlashMessage::success(format!(
                "Restaurante {} creado en /{}/.",
                context.restaurant.name, context.tenant.slug
            ))
            .send();
        }
        Err(ServiceError::Unauthorized) => return not_allowed(),
        Err(ServiceError::Form(message)) | Err(ServiceError::Conflict(message)) => {
            FlashMessage::error(message).send();
        }
        Err(err) => {
            log::error!("Failed to create tenant: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }
    redirect(TENANTS_PATH)
}

#[post("/tenants/{tenant_id}/status/")]
pub async fn tenant_status(
    tenant_id: web::Path<i32>,
    form: web::Form<TenantStatusForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match change_tenant_status(repo.get_ref(), &user, tenant_id.into_inner(), form.into_inner()) {
        Ok(tenant) => {
            FlashMessage::success(format!(
                "{} ahora está en estado {}.",
                tenant.name,
                tenant.status.label()
            ))
            .send();
        }
        Err(ServiceError::Unauthorized) => return not_allowed(),
        Err(ServiceError::NotFound) => {
            FlashMessage::warning("El restaurante no existe.").send();
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
        }
        Err(err) => {
            log::error!("Failed to change tenant status: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }
    redirect(TENANTS_PATH)
}
