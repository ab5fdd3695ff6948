//! Copies rows of the legacy `legacy_waiters` table into `staff_members` and
//! repoints the tables that still reference them.

use clap::Parser;
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;

use mesaqr::repository::{DieselRepository, StaffWriter};

#[derive(Debug, Parser)]
#[command(name = "migrate-legacy-waiters", about = "Reconcile legacy waiters into staff")]
struct Args {
    /// Report what would change without writing anything.
    #[arg(long)]
    dry_run: bool,
    #[arg(long, env = "DATABASE_URL", default_value = "app.db")]
    database_url: String,
}

fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let args = Args::parse();

    let pool = match establish_connection_pool(&args.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let report = match repo.migrate_legacy_waiters(args.dry_run) {
        Ok(report) => report,
        Err(e) => {
            log::error!("Legacy waiter migration failed: {e}");
            std::process::exit(1);
        }
    };

    let prefix = if args.dry_run { "[dry run] " } else { "" };
    for email in &report.migrated {
        log::info!("{prefix}migrated {email}");
    }
    for email in &report.skipped {
        log::info!("{prefix}skipped {email}: already registered as staff");
    }
    log::info!(
        "{prefix}{} migrated, {} skipped, {} table(s) repointed",
        report.migrated.len(),
        report.skipped.len(),
        report.tables_repointed
    );
}
