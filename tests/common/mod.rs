//! Helpers for integration tests.

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_common::db::{DbPool, establish_connection_pool};
use pushkind_common::domain::auth::AuthenticatedUser;

use mesaqr::domain::tenant::{NewRestaurant, NewTenant, TenantContext, TenantStatus};
use mesaqr::repository::{DieselRepository, TenantWriter};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// Temporary database used in integration tests.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}

/// Active tenant with a restaurant owned by `owner@<slug>.test`.
#[allow(dead_code)]
pub fn create_tenant(repo: &DieselRepository, slug: &str) -> TenantContext {
    repo.create_tenant(
        &NewTenant::new(format!("Restaurante {slug}"), slug).with_status(TenantStatus::Active),
        &NewRestaurant::new(format!("Local {slug}"), format!("owner@{slug}.test")),
    )
    .expect("create tenant")
}

#[allow(dead_code)]
pub fn staff_user(tenant: &TenantContext, email: &str, roles: &[&str]) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: email.to_string(),
        email: email.to_string(),
        hub_id: tenant.tenant_id(),
        name: email.to_string(),
        roles: roles.iter().map(|role| (*role).to_string()).collect(),
        exp: 0,
    }
}
