use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{redirect, render_template};
use serde::Deserialize;
use serde_json::json;
use tera::{Context, Tera};

use crate::config::AppConfig;
use crate::domain::tenant::TenantContext;
use crate::forms::menu::{
    AddAddonForm, AddModifierForm, AddVariantForm, MenuCategoryForm, MenuItemForm,
};
use crate::forms::orders::OrderStatusForm;
use crate::forms::staff::{AddStaffForm, EditStaffForm};
use crate::forms::tables::{AddTableForm, AssignWaiterForm, EditTableForm};
use crate::repository::DieselRepository;
use crate::routes::{json_service_error, not_allowed, parse_form, staff_context};
use crate::services::admin::{SalesReportParams, admin_dashboard, sales_report};
use crate::services::orders::{
    OrderListParams, admin_order_detail, list_admin_orders, update_order_status,
};
use crate::services::qr::{RequestOrigin, qr_base_url, qr_sheet, table_qr, table_qr_download};
use crate::services::table_sessions::TableSessionCache;
use crate::services::{ServiceError, ServiceResult, menu_admin, staff, tables};

/// Flashes the outcome of an admin form and redirects to `back`.
fn form_outcome<T>(result: ServiceResult<T>, success: &str, back: &str, action: &str) -> HttpResponse {
    match result {
        Ok(_) => {
            FlashMessage::success(success).send();
            redirect(back)
        }
        Err(ServiceError::Unauthorized) => not_allowed(),
        Err(ServiceError::Form(message)) | Err(ServiceError::Conflict(message)) => {
            FlashMessage::error(message).send();
            redirect(back)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::warning("El registro no existe.").send();
            redirect(back)
        }
        Err(err) => {
            log::error!("Failed to {action}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Renders an admin page or maps the failure the way every admin page does.
fn render_page<T>(
    result: ServiceResult<T>,
    tera: &Tera,
    template: &str,
    fill: impl FnOnce(&mut Context, T),
    mut context: Context,
    back: &str,
    action: &str,
) -> HttpResponse {
    match result {
        Ok(data) => {
            fill(&mut context, data);
            render_template(tera, template, &context)
        }
        Err(ServiceError::Unauthorized) => not_allowed(),
        Err(ServiceError::NotFound) => {
            FlashMessage::warning("El registro no existe.").send();
            redirect(back)
        }
        Err(err) => {
            log::error!("Failed to {action}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn admin_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    current_page: &str,
    server_config: &CommonServerConfig,
) -> Context {
    staff_context(
        flash_messages,
        user,
        tenant,
        current_page,
        &server_config.auth_service_url,
    )
}

fn public_base(req: &HttpRequest, tenant: &TenantContext, config: &AppConfig) -> String {
    let connection = req.connection_info();
    qr_base_url(
        tenant,
        config.qr_base_url.as_deref(),
        config.scheme(),
        RequestOrigin {
            scheme: connection.scheme(),
            host: connection.host(),
        },
    )
}

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
    let context = admin_context(&flash_messages, &user, &tenant, "admin", &server_config);
    render_page(
        admin_dashboard(
            repo.get_ref(),
            &sessions,
            config.session_settings(),
            &user,
            &tenant,
        ),
        &tera,
        "admin/dashboard.html",
        |context, dashboard| context.insert("dashboard", &dashboard),
        context,
        "/na",
        "load admin dashboard",
    )
}

#[get("/sales/")]
pub async fn show_sales(
    params: web::Query<SalesReportParams>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = admin_context(&flash_messages, &user, &tenant, "sales", &server_config);
    render_page(
        sales_report(repo.get_ref(), &user, &tenant, params.into_inner()),
        &tera,
        "admin/sales.html",
        |context, report| context.insert("report", &report),
        context,
        &tenant.path("admin/"),
        "build sales report",
    )
}

#[get("/orders/")]
pub async fn show_orders(
    params: web::Query<OrderListParams>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = admin_context(&flash_messages, &user, &tenant, "orders", &server_config);
    render_page(
        list_admin_orders(repo.get_ref(), &user, &tenant, params.into_inner()),
        &tera,
        "admin/orders.html",
        |context, page| context.insert("page", &page),
        context,
        &tenant.path("admin/"),
        "list orders",
    )
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
    let context = admin_context(&flash_messages, &user, &tenant, "orders", &server_config);
    render_page(
        admin_order_detail(repo.get_ref(), &user, &tenant, order_id),
        &tera,
        "admin/order_detail.html",
        |context, detail| context.insert("detail", &detail),
        context,
        &tenant.path("admin/orders/"),
        "load order",
    )
}

#[post("/orders/{order_id}/status/")]
pub async fn order_status(
    path: web::Path<(String, i32)>,
    form: web::Form<OrderStatusForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, order_id) = path.into_inner();
    match update_order_status(repo.get_ref(), &user, &tenant, order_id, form.into_inner()) {
        Ok(order) => HttpResponse::Ok().json(json!({
            "success": true,
            "new_status": order.status,
            "new_status_display": order.status.label(),
            "order_number": order.order_number,
        })),
        Err(err) => json_service_error(err, "update order status"),
    }
}

#[get("/menu/")]
pub async fn show_menu(
    params: web::Query<menu_admin::MenuAdminParams>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = admin_context(&flash_messages, &user, &tenant, "menu", &server_config);
    render_page(
        menu_admin::list_menu_admin(repo.get_ref(), &user, &tenant, params.into_inner()),
        &tera,
        "admin/menu.html",
        |context, page| context.insert("page", &page),
        context,
        &tenant.path("admin/"),
        "list menu",
    )
}

#[post("/menu/categories/")]
pub async fn add_category(
    form: web::Form<MenuCategoryForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    form_outcome(
        menu_admin::create_category(repo.get_ref(), &user, &tenant, form.into_inner()),
        "Categoría creada.",
        &tenant.path("admin/menu/"),
        "create category",
    )
}

#[get("/menu/categories/{category_id}/")]
pub async fn show_category(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (_, category_id) = path.into_inner();
    let context = admin_context(&flash_messages, &user, &tenant, "menu", &server_config);
    render_page(
        menu_admin::get_category(repo.get_ref(), &user, &tenant, category_id),
        &tera,
        "admin/category.html",
        |context, category| context.insert("category", &category),
        context,
        &tenant.path("admin/menu/"),
        "load category",
    )
}

#[post("/menu/categories/{category_id}/")]
pub async fn edit_category(
    path: web::Path<(String, i32)>,
    form: web::Form<MenuCategoryForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, category_id) = path.into_inner();
    form_outcome(
        menu_admin::update_category(repo.get_ref(), &user, &tenant, category_id, form.into_inner()),
        "Categoría actualizada.",
        &tenant.path("admin/menu/"),
        "update category",
    )
}

#[post("/menu/categories/{category_id}/delete/")]
pub async fn remove_category(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, category_id) = path.into_inner();
    form_outcome(
        menu_admin::delete_category(repo.get_ref(), &user, &tenant, category_id),
        "Categoría eliminada.",
        &tenant.path("admin/menu/"),
        "delete category",
    )
}

#[post("/menu/items/")]
pub async fn add_item(
    form: web::Form<MenuItemForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    form_outcome(
        menu_admin::create_menu_item(repo.get_ref(), &user, &tenant, form.into_inner()),
        "Producto creado.",
        &tenant.path("admin/menu/"),
        "create menu item",
    )
}

#[get("/menu/items/{item_id}/")]
pub async fn show_item(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    let context = admin_context(&flash_messages, &user, &tenant, "menu", &server_config);
    render_page(
        menu_admin::menu_item_editor(repo.get_ref(), &user, &tenant, item_id),
        &tera,
        "admin/menu_item.html",
        |context, editor| context.insert("editor", &editor),
        context,
        &tenant.path("admin/menu/"),
        "load menu item",
    )
}

#[post("/menu/items/{item_id}/")]
pub async fn edit_item(
    path: web::Path<(String, i32)>,
    form: web::Form<MenuItemForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    form_outcome(
        menu_admin::update_menu_item(repo.get_ref(), &user, &tenant, item_id, form.into_inner()),
        "Producto actualizado.",
        &tenant.path(&format!("admin/menu/items/{item_id}/")),
        "update menu item",
    )
}

#[post("/menu/items/{item_id}/delete/")]
pub async fn remove_item(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    form_outcome(
        menu_admin::delete_menu_item(repo.get_ref(), &user, &tenant, item_id),
        "Producto eliminado.",
        &tenant.path("admin/menu/"),
        "delete menu item",
    )
}

#[post("/menu/items/{item_id}/variants/")]
pub async fn add_variant(
    path: web::Path<(String, i32)>,
    form: web::Form<AddVariantForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, item_id) = path.into_inner();
    form_outcome(
        menu_admin::add_variant(repo.get_ref(), &user, &tenant, item_id, form.into_inner()),
        "Variante agregada.",
        &tenant.path(&format!("admin/menu/items/{item_id}/")),
        "add variant",
    )
}

#[post("/menu/addons/")]
pub async fn add_addon(
    body: web::Bytes,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = parse_form::<AddAddonForm>(&body)
        .and_then(|form| menu_admin::create_addon(repo.get_ref(), &user, &tenant, form));
    form_outcome(
        result,
        "Adición creada.",
        &tenant.path("admin/menu/"),
        "create addon",
    )
}

#[post("/menu/modifiers/")]
pub async fn add_modifier(
    body: web::Bytes,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = parse_form::<AddModifierForm>(&body)
        .and_then(|form| menu_admin::create_modifier(repo.get_ref(), &user, &tenant, form));
    form_outcome(
        result,
        "Modificador creado.",
        &tenant.path("admin/menu/"),
        "create modifier",
    )
}

#[get("/tables/")]
pub async fn show_tables(
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = admin_context(&flash_messages, &user, &tenant, "tables", &server_config);
    render_page(
        tables::list_tables(repo.get_ref(), &user, &tenant),
        &tera,
        "admin/tables.html",
        |context, page| context.insert("page", &page),
        context,
        &tenant.path("admin/"),
        "list tables",
    )
}

#[post("/tables/")]
pub async fn add_table(
    form: web::Form<AddTableForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    form_outcome(
        tables::create_table(repo.get_ref(), &user, &tenant, form.into_inner()),
        "Mesa creada.",
        &tenant.path("admin/tables/"),
        "create table",
    )
}

#[get("/tables/qr-sheet/")]
pub async fn show_qr_sheet(
    req: HttpRequest,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    config: web::Data<AppConfig>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let base_url = public_base(&req, &tenant, &config);
    let context = admin_context(&flash_messages, &user, &tenant, "tables", &server_config);
    render_page(
        qr_sheet(repo.get_ref(), &user, &tenant, &base_url),
        &tera,
        "admin/qr_sheet.html",
        |context, codes| context.insert("codes", &codes),
        context,
        &tenant.path("admin/tables/"),
        "render QR sheet",
    )
}

#[get("/tables/{table_id}/")]
pub async fn show_table(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (_, table_id) = path.into_inner();
    let result = tables::get_table(repo.get_ref(), &user, &tenant, table_id).and_then(|table| {
        tables::list_tables(repo.get_ref(), &user, &tenant).map(|page| (table, page.waiters))
    });
    let context = admin_context(&flash_messages, &user, &tenant, "tables", &server_config);
    render_page(
        result,
        &tera,
        "admin/table.html",
        |context, (table, waiters)| {
            context.insert("display_name", &table.display_name());
            context.insert("table", &table);
            context.insert("waiters", &waiters);
        },
        context,
        &tenant.path("admin/tables/"),
        "load table",
    )
}

#[post("/tables/{table_id}/")]
pub async fn edit_table(
    path: web::Path<(String, i32)>,
    form: web::Form<EditTableForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, table_id) = path.into_inner();
    form_outcome(
        tables::update_table(repo.get_ref(), &user, &tenant, table_id, form.into_inner()),
        "Mesa actualizada.",
        &tenant.path("admin/tables/"),
        "update table",
    )
}

#[post("/tables/{table_id}/delete/")]
pub async fn remove_table(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, table_id) = path.into_inner();
    form_outcome(
        tables::delete_table(repo.get_ref(), &user, &tenant, table_id),
        "Mesa eliminada.",
        &tenant.path("admin/tables/"),
        "delete table",
    )
}

#[post("/tables/{table_id}/assign/")]
pub async fn assign_table(
    path: web::Path<(String, i32)>,
    form: web::Form<AssignWaiterForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, table_id) = path.into_inner();
    form_outcome(
        tables::assign_waiter(repo.get_ref(), &user, &tenant, table_id, form.into_inner()),
        "Mesero asignado.",
        &tenant.path("admin/tables/"),
        "assign waiter",
    )
}

#[get("/tables/{table_id}/qr/")]
pub async fn show_table_qr(
    req: HttpRequest,
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    config: web::Data<AppConfig>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (_, table_id) = path.into_inner();
    let base_url = public_base(&req, &tenant, &config);
    let context = admin_context(&flash_messages, &user, &tenant, "tables", &server_config);
    render_page(
        table_qr(repo.get_ref(), &user, &tenant, table_id, &base_url),
        &tera,
        "admin/table_qr.html",
        |context, qr| context.insert("qr", &qr),
        context,
        &tenant.path("admin/tables/"),
        "render table QR",
    )
}

#[get("/tables/{table_id}/qr/download/")]
pub async fn download_table_qr(
    req: HttpRequest,
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let (_, table_id) = path.into_inner();
    let base_url = public_base(&req, &tenant, &config);

    match table_qr_download(repo.get_ref(), &user, &tenant, table_id, &base_url) {
        Ok((filename, png)) => HttpResponse::Ok()
            .content_type("image/png")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            })
            .body(png),
        Err(ServiceError::Unauthorized) => not_allowed(),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to render QR of table {table_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StaffParams {
    #[serde(default)]
    pub role: Option<String>,
}

#[get("/staff/")]
pub async fn show_staff(
    params: web::Query<StaffParams>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = admin_context(&flash_messages, &user, &tenant, "staff", &server_config);
    render_page(
        staff::list_staff(repo.get_ref(), &user, &tenant, params.role.as_deref()),
        &tera,
        "admin/staff.html",
        |context, page| context.insert("page", &page),
        context,
        &tenant.path("admin/"),
        "list staff",
    )
}

#[post("/staff/")]
pub async fn add_staff(
    form: web::Form<AddStaffForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    form_outcome(
        staff::create_staff(repo.get_ref(), &user, &tenant, form.into_inner()),
        "Empleado registrado.",
        &tenant.path("admin/staff/"),
        "create staff member",
    )
}

#[get("/staff/{staff_id}/")]
pub async fn show_staff_member(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (_, staff_id) = path.into_inner();
    let context = admin_context(&flash_messages, &user, &tenant, "staff", &server_config);
    render_page(
        staff::get_staff(repo.get_ref(), &user, &tenant, staff_id),
        &tera,
        "admin/staff_member.html",
        |context, member| context.insert("member", &member),
        context,
        &tenant.path("admin/staff/"),
        "load staff member",
    )
}

#[post("/staff/{staff_id}/")]
pub async fn edit_staff(
    path: web::Path<(String, i32)>,
    form: web::Form<EditStaffForm>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, staff_id) = path.into_inner();
    form_outcome(
        staff::update_staff(repo.get_ref(), &user, &tenant, staff_id, form.into_inner()),
        "Empleado actualizado.",
        &tenant.path("admin/staff/"),
        "update staff member",
    )
}

#[post("/staff/{staff_id}/delete/")]
pub async fn remove_staff(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    tenant: web::ReqData<TenantContext>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (_, staff_id) = path.into_inner();
    form_outcome(
        staff::delete_staff(repo.get_ref(), &user, &tenant, staff_id),
        "Empleado eliminado.",
        &tenant.path("admin/staff/"),
        "delete staff member",
    )
}
