//! Runtime settings read from the environment.

use std::env;

use crate::domain::money::PricingPolicy;
use crate::services::table_sessions::SessionSettings;

/// Application settings shared with every handler.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Cookie domain.
    pub domain: String,
    /// Public base used in QR codes when the tenant has no custom domain.
    pub qr_base_url: Option<String>,
    pub use_https: bool,
    pub session_duration_minutes: i64,
    pub session_inactivity_minutes: i64,
    pub session_extension_minutes: i64,
    pub tax_rate_basis_points: i64,
    pub delivery_fee_cents: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let pricing = PricingPolicy::default();
        let session = SessionSettings::default();
        Self {
            database_url: "app.db".to_string(),
            address: "127.0.0.1".to_string(),
            port: 8080,
            domain: "localhost".to_string(),
            qr_base_url: None,
            use_https: false,
            session_duration_minutes: session.duration_minutes,
            session_inactivity_minutes: session.inactivity_minutes,
            session_extension_minutes: session.extension_minutes,
            tax_rate_basis_points: pricing.tax_rate_basis_points,
            delivery_fee_cents: pricing.delivery_fee_cents,
        }
    }
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring invalid value `{raw}` for {name}");
                default
            }
        },
        Err(_) => default,
    }
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|raw| matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl AppConfig {
    /// Reads the configuration, falling back to defaults for missing values.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            address: env::var("ADDRESS").unwrap_or(defaults.address),
            port: parsed("PORT", defaults.port),
            domain: env::var("DOMAIN").unwrap_or(defaults.domain),
            qr_base_url: env::var("QR_BASE_URL")
                .ok()
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            use_https: flag("USE_HTTPS"),
            session_duration_minutes: parsed(
                "TABLE_SESSION_DURATION",
                defaults.session_duration_minutes,
            ),
            session_inactivity_minutes: parsed(
                "TABLE_INACTIVITY_TIMEOUT",
                defaults.session_inactivity_minutes,
            ),
            session_extension_minutes: parsed(
                "TABLE_SESSION_EXTENSION",
                defaults.session_extension_minutes,
            ),
            tax_rate_basis_points: parsed("TAX_RATE_BASIS_POINTS", defaults.tax_rate_basis_points),
            delivery_fee_cents: parsed("DELIVERY_FEE_CENTS", defaults.delivery_fee_cents),
        }
    }

    pub fn pricing(&self) -> PricingPolicy {
        PricingPolicy {
            tax_rate_basis_points: self.tax_rate_basis_points,
            delivery_fee_cents: self.delivery_fee_cents,
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            duration_minutes: self.session_duration_minutes,
            inactivity_minutes: self.session_inactivity_minutes,
            extension_minutes: self.session_extension_minutes,
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_https { "https" } else { "http" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.pricing(), PricingPolicy::default());
        assert_eq!(config.session_settings().duration_minutes, 60);
        assert_eq!(config.session_settings().inactivity_minutes, 45);
        assert_eq!(config.session_settings().extension_minutes, 30);
        assert_eq!(config.scheme(), "http");
    }
}
