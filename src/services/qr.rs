//! QR codes printed on tables.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Luma};
use pushkind_common::domain::auth::AuthenticatedUser;
use qrcode::QrCode;
use serde::Serialize;

use crate::domain::table::{Table, TableListQuery};
use crate::domain::tenant::TenantContext;
use crate::repository::TableReader;
use crate::services::{ServiceError, ServiceResult, ensure_admin};

const QR_MIN_DIMENSION: u32 = 300;

/// Where the request came from, used when nothing else names a public base.
#[derive(Debug, Clone, Copy)]
pub struct RequestOrigin<'a> {
    pub scheme: &'a str,
    pub host: &'a str,
}

/// Base URL encoded in QR codes: the tenant's domain, the configured base or
/// the request origin, in that order.
pub fn qr_base_url(
    tenant: &TenantContext,
    configured: Option<&str>,
    scheme: &str,
    origin: RequestOrigin<'_>,
) -> String {
    let base = match tenant.tenant.domain.as_deref().map(str::trim) {
        Some(domain) if !domain.is_empty() => format!("{scheme}://{domain}"),
        _ => match configured.map(str::trim).filter(|base| !base.is_empty()) {
            Some(base) => base.to_string(),
            None => format!("{}://{}", origin.scheme, origin.host),
        },
    };
    base.trim_end_matches('/').to_string()
}

pub fn table_qr_url(base_url: &str, tenant: &TenantContext, table: &Table) -> String {
    format!("{base_url}{}", table.qr_path(tenant.slug()))
}

/// Renders `data` as a grayscale PNG.
pub fn render_qr_png(data: &str) -> ServiceResult<Vec<u8>> {
    let code = QrCode::new(data.as_bytes()).map_err(|err| {
        log::error!("Failed to encode QR payload: {err}");
        ServiceError::Internal(err.to_string())
    })?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|err| {
            log::error!("Failed to write QR image: {err}");
            ServiceError::Internal(err.to_string())
        })?;
    Ok(png)
}

pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

pub fn qr_filename(table: &Table) -> String {
    format!("mesa_{}_qr.png", table.number)
}

#[derive(Debug, Serialize)]
pub struct TableQr {
    pub table: Table,
    pub display_name: String,
    pub url: String,
    pub data_uri: String,
    pub filename: String,
}

fn build_table_qr(base_url: &str, tenant: &TenantContext, table: Table) -> ServiceResult<TableQr> {
    let url = table_qr_url(base_url, tenant, &table);
    let png = render_qr_png(&url)?;
    Ok(TableQr {
        display_name: table.display_name(),
        filename: qr_filename(&table),
        data_uri: png_data_uri(&png),
        url,
        table,
    })
}

fn admin_table<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    table_id: i32,
) -> ServiceResult<Table>
where
    R: TableReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    repo.get_table_by_id(table_id, tenant.tenant_id())
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)
}

/// Preview of one table's code.
pub fn table_qr<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    table_id: i32,
    base_url: &str,
) -> ServiceResult<TableQr>
where
    R: TableReader + ?Sized,
{
    let table = admin_table(repo, user, tenant, table_id)?;
    build_table_qr(base_url, tenant, table)
}

/// PNG attachment of one table's code with its download name.
pub fn table_qr_download<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    table_id: i32,
    base_url: &str,
) -> ServiceResult<(String, Vec<u8>)>
where
    R: TableReader + ?Sized,
{
    let table = admin_table(repo, user, tenant, table_id)?;
    let png = render_qr_png(&table_qr_url(base_url, tenant, &table))?;
    Ok((qr_filename(&table), png))
}

/// Printable sheet with the codes of every active table.
pub fn qr_sheet<R>(
    repo: &R,
    user: &AuthenticatedUser,
    tenant: &TenantContext,
    base_url: &str,
) -> ServiceResult<Vec<TableQr>>
where
    R: TableReader + ?Sized,
{
    ensure_admin(user, tenant)?;
    repo.list_tables(TableListQuery::new(tenant.tenant_id()))
        .map_err(ServiceError::from)?
        .into_iter()
        .filter(Table::accepts_scans)
        .map(|table| build_table_qr(base_url, tenant, table))
        .collect()
}
