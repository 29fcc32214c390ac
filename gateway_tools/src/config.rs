use std::time::Duration;

use log::*;
use rpg_common::Secret;

const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway REST API, e.g. "https://api.razorpay.com/v1"
    pub base_url: String,
    pub key_id: String,
    pub key_secret: Secret<String>,
    /// Upper bound on any single gateway call. A gateway that hangs must not hang a checkout or refund with it.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.razorpay.com/v1".to_string(),
            key_id: String::default(),
            key_secret: Secret::default(),
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("RPG_GATEWAY_URL").unwrap_or_else(|_| {
            warn!("RPG_GATEWAY_URL not set, using the production gateway url");
            Self::default().base_url
        });
        let key_id = std::env::var("RPG_GATEWAY_KEY_ID").unwrap_or_else(|_| {
            warn!("RPG_GATEWAY_KEY_ID not set, using (probably useless) default");
            "rzp_test_0000000000".to_string()
        });
        let key_secret = Secret::new(std::env::var("RPG_GATEWAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("RPG_GATEWAY_KEY_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let timeout = std::env::var("RPG_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_GATEWAY_TIMEOUT);
        Self { base_url, key_id, key_secret, timeout }
    }
}
