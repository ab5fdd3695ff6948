use std::env;
use std::time::Duration;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::middleware::from_fn;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use chrono::Local;
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use pushkind_common::middleware::RedirectUnauthorized;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{logout, not_assigned};
use tera::Tera;

use mesaqr::config::AppConfig;
use mesaqr::middleware::tenant_context;
use mesaqr::repository::DieselRepository;
use mesaqr::routes::{admin, customer, menu, money_filter, orders, platform, stations, waiter};
use mesaqr::services::table_sessions::TableSessionCache;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

async fn purge_table_sessions(sessions: web::Data<TableSessionCache>) {
    let mut interval = actix_web::rt::time::interval(PURGE_INTERVAL);
    loop {
        interval.tick().await;
        let purged = sessions.purge_expired(Local::now().naive_utc());
        if purged > 0 {
            log::debug!("Purged {purged} expired table session entries");
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = AppConfig::from_env();

    let secret = env::var("SECRET_KEY");
    let secret_key = match &secret {
        Ok(key) => Key::from(key.as_bytes()),
        Err(_) => Key::generate(),
    };

    let auth_service_url = match env::var("AUTH_SERVICE_URL") {
        Ok(auth_service_url) => auth_service_url,
        Err(_) => {
            log::error!("AUTH_SERVICE_URL environment variable not set");
            std::process::exit(1);
        }
    };

    let common_config = CommonServerConfig {
        secret: secret.unwrap_or_default(),
        auth_service_url,
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let mut tera = match Tera::new("templates/**/*") {
        Ok(t) => t,
        Err(e) => {
            log::error!("Parsing error(s): {e}");
            std::process::exit(1);
        }
    };
    tera.register_filter("money", money_filter);

    let sessions = web::Data::new(TableSessionCache::new());
    actix_web::rt::spawn(purge_table_sessions(sessions.clone()));

    let address = config.address.clone();
    let port = config.port;
    let domain = config.domain.clone();
    let cookie_secure = config.use_https;

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(cookie_secure)
                    .cookie_domain(Some(format!(".{domain}")))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(not_assigned)
            .service(logout)
            .service(customer::landing)
            .service(
                web::scope("/platform")
                    .wrap(RedirectUnauthorized)
                    .service(platform::show_tenants)
                    .service(platform::add_tenant)
                    .service(platform::tenant_status),
            )
            .service(
                web::scope("/{tenant_slug}")
                    .wrap(from_fn(tenant_context))
                    .service(
                        web::scope("/kitchen")
                            .wrap(RedirectUnauthorized)
                            .service(stations::kitchen_dashboard)
                            .service(stations::kitchen_items)
                            .service(stations::kitchen_item_status)
                            .service(stations::kitchen_item_start)
                            .service(stations::kitchen_item_ready),
                    )
                    .service(
                        web::scope("/bar")
                            .wrap(RedirectUnauthorized)
                            .service(stations::bar_dashboard)
                            .service(stations::bar_items)
                            .service(stations::bar_item_status)
                            .service(stations::bar_item_start)
                            .service(stations::bar_item_ready),
                    )
                    .service(
                        web::scope("/waiter")
                            .wrap(RedirectUnauthorized)
                            .service(waiter::show_dashboard)
                            .service(waiter::show_orders)
                            .service(waiter::show_order)
                            .service(waiter::ready_items_feed)
                            .service(waiter::serve)
                            .service(waiter::close)
                            .service(waiter::availability)
                            .service(waiter::show_notifications)
                            .service(waiter::read_all_notifications)
                            .service(waiter::read_notification),
                    )
                    .service(
                        web::scope("/admin")
                            .wrap(RedirectUnauthorized)
                            .service(admin::show_dashboard)
                            .service(admin::show_sales)
                            .service(admin::show_orders)
                            .service(admin::show_order)
                            .service(admin::order_status)
                            .service(admin::show_menu)
                            .service(admin::add_category)
                            .service(admin::show_category)
                            .service(admin::edit_category)
                            .service(admin::remove_category)
                            .service(admin::add_item)
                            .service(admin::show_item)
                            .service(admin::edit_item)
                            .service(admin::remove_item)
                            .service(admin::add_variant)
                            .service(admin::add_addon)
                            .service(admin::add_modifier)
                            .service(admin::show_tables)
                            .service(admin::add_table)
                            .service(admin::show_qr_sheet)
                            .service(admin::show_table)
                            .service(admin::edit_table)
                            .service(admin::remove_table)
                            .service(admin::assign_table)
                            .service(admin::show_table_qr)
                            .service(admin::download_table_qr)
                            .service(admin::show_staff)
                            .service(admin::add_staff)
                            .service(admin::show_staff_member)
                            .service(admin::edit_staff)
                            .service(admin::remove_staff),
                    )
                    .service(customer::restaurant_home)
                    .service(customer::scan)
                    .service(customer::session_closed)
                    .service(customer::session_status)
                    .service(customer::session_extend)
                    .service(customer::session_end)
                    .service(customer::call_waiter_request)
                    .service(menu::show_menu)
                    .service(menu::show_menu_item)
                    .service(menu::menu_api)
                    .service(menu::menu_search)
                    .service(menu::show_cart)
                    .service(menu::cart_add)
                    .service(menu::cart_update)
                    .service(menu::cart_remove)
                    .service(menu::cart_clear)
                    .service(orders::show_checkout)
                    .service(orders::submit_checkout)
                    .service(orders::show_my_orders)
                    .service(orders::show_order)
                    .service(orders::show_tracking)
                    .service(orders::tracking_status)
                    .service(orders::submit_review),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(common_config.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(sessions.clone())
    })
    .bind((address, port))?
    .run()
    .await
}
