use std::{env, time::Duration};

use log::*;
use rpg_common::Secret;

pub const DEFAULT_RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";
pub const DEFAULT_RAZORPAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    /// The public key id. It is safe to hand this to browsers so that the checkout widget can be opened.
    pub key_id: String,
    /// The key secret. Used for basic auth against the REST API and for signing payment callbacks.
    pub key_secret: Secret<String>,
    pub api_url: String,
    pub timeout: Duration,
}

impl RazorpayConfig {
    pub fn new(key_id: &str, key_secret: Secret<String>) -> Self {
        Self {
            key_id: key_id.to_string(),
            key_secret,
            api_url: DEFAULT_RAZORPAY_API_URL.to_string(),
            timeout: DEFAULT_RAZORPAY_TIMEOUT,
        }
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads the gateway credentials from the environment.
    ///
    /// Returns `None` if either the key id or the key secret is missing. Callers treat this as "payments disabled".
    pub fn from_env() -> Option<Self> {
        let key_id = env::var("RPG_RAZORPAY_KEY_ID").ok().filter(|s| !s.trim().is_empty());
        let key_secret = env::var("RPG_RAZORPAY_KEY_SECRET").ok().filter(|s| !s.trim().is_empty());
        let (key_id, key_secret) = match (key_id, key_secret) {
            (Some(id), Some(secret)) => (id, Secret::new(secret)),
            (None, _) => {
                warn!("🪛️ RPG_RAZORPAY_KEY_ID is not set. Payment features are disabled.");
                return None;
            },
            (_, None) => {
                warn!("🪛️ RPG_RAZORPAY_KEY_SECRET is not set. Payment features are disabled.");
                return None;
            },
        };
        let api_url = env::var("RPG_RAZORPAY_API_URL").unwrap_or_else(|_| {
            debug!("🪛️ RPG_RAZORPAY_API_URL not set, using {DEFAULT_RAZORPAY_API_URL}");
            DEFAULT_RAZORPAY_API_URL.to_string()
        });
        let timeout = env::var("RPG_RAZORPAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for RPG_RAZORPAY_TIMEOUT_SECS. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RAZORPAY_TIMEOUT);
        Some(Self::new(&key_id, key_secret).with_api_url(&api_url).with_timeout(timeout))
    }
}
