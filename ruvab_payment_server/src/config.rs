use std::env;

use log::*;
use razorpay_tools::RazorpayConfig;
use rpg_common::{parse_boolean_flag, Secret, DEFAULT_CURRENCY_CODE};

const DEFAULT_RPG_HOST: &str = "127.0.0.1";
const DEFAULT_RPG_PORT: u16 = 8370;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// The currency that new orders are created in.
    pub currency: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// Gateway credentials. `None` means payments are disabled; the server still starts.
    pub razorpay: Option<RazorpayConfig>,
    /// When set, every webhook must carry a valid `X-Razorpay-Signature`. When unset, webhooks are trusted blindly.
    pub webhook_secret: Option<Secret<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPG_HOST.to_string(),
            port: DEFAULT_RPG_PORT,
            database_url: String::default(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            razorpay: None,
            webhook_secret: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("RPG_HOST").ok().unwrap_or_else(|| DEFAULT_RPG_HOST.into());
        let port = env::var("RPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for RPG_PORT. {e} Using the default, {DEFAULT_RPG_PORT}, instead."
                    );
                    DEFAULT_RPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_RPG_PORT);
        let database_url = ruvab_payment_engine::db_url();
        let db_max_connections = env::var("RPG_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| {
                        warn!(
                            "🪛️ {s} is not a valid value for RPG_DB_MAX_CONNECTIONS. {e} Using the default, \
                             {DEFAULT_DB_MAX_CONNECTIONS}, instead."
                        )
                    })
                    .ok()
            })
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let currency = env::var("RPG_CURRENCY")
            .ok()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string());
        let use_x_forwarded_for = parse_boolean_flag(env::var("RPG_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("RPG_USE_FORWARDED").ok(), false);
        let razorpay = RazorpayConfig::from_env();
        let webhook_secret = env::var("RPG_RAZORPAY_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(Secret::new);
        if webhook_secret.is_none() {
            warn!(
                "🪛️ RPG_RAZORPAY_WEBHOOK_SECRET is not set. Webhooks will be processed WITHOUT signature checks. Never \
                 run like this in production."
            );
        }
        Self {
            host,
            port,
            database_url,
            db_max_connections,
            currency,
            use_x_forwarded_for,
            use_forwarded,
            razorpay,
            webhook_secret,
        }
    }

    pub fn payments_enabled(&self) -> bool {
        self.razorpay.is_some()
    }

    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig { use_x_forwarded_for: self.use_x_forwarded_for, use_forwarded: self.use_forwarded }
    }
}

/// How to work out who is calling, when the server sits behind a reverse proxy.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyConfig {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}
