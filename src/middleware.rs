//! Tenant resolution for the `/{tenant_slug}` scope.

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{Error, HttpMessage, HttpResponse, web};

use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::tenancy::resolve_tenant;

/// Path segment naming the tenant.
pub const TENANT_SLUG: &str = "tenant_slug";

/// Loads the tenant named by the first path segment and stores its
/// [`TenantContext`](crate::domain::tenant::TenantContext) in the request
/// extensions. Unknown or suspended tenants get a 404.
pub async fn tenant_context(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<EitherBody<impl MessageBody>>, Error> {
    let slug = req.match_info().get(TENANT_SLUG).map(str::to_string);
    let repo = req.app_data::<web::Data<DieselRepository>>().cloned();

    let (Some(slug), Some(repo)) = (slug, repo) else {
        return Ok(req
            .into_response(HttpResponse::NotFound().finish())
            .map_into_right_body());
    };

    match resolve_tenant(repo.get_ref(), &slug) {
        Ok(context) => {
            req.extensions_mut().insert(context);
            next.call(req).await.map(ServiceResponse::map_into_left_body)
        }
        Err(ServiceError::NotFound) => {
            log::debug!("No operational tenant for slug `{slug}`");
            Ok(req
                .into_response(HttpResponse::NotFound().body("Restaurante no encontrado"))
                .map_into_right_body())
        }
        Err(err) => {
            log::error!("Failed to resolve tenant `{slug}`: {err}");
            Ok(req
                .into_response(HttpResponse::InternalServerError().finish())
                .map_into_right_body())
        }
    }
}
