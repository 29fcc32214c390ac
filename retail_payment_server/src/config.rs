use std::env;

use gateway_tools::GatewayConfig;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use retail_payment_engine::{db_url, helpers::DEFAULT_GST_RATE_BPS};
use rpg_common::Secret;

const DEFAULT_RPS_HOST: &str = "127.0.0.1";
const DEFAULT_RPS_PORT: u16 = 8360;
const DEFAULT_SELLER_STATE: &str = "Maharashtra";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shared secret the gateway uses to sign settlement callbacks.
    pub webhook_secret: Secret<String>,
    /// HS256 key used to *verify* access tokens. Token issuance lives in the identity service, not here.
    pub jwt_secret: Secret<String>,
    /// The state the store is registered in, for GST jurisdiction.
    pub seller_state: String,
    /// GST rate in basis points (1800 = 18%).
    pub gst_rate_bps: i64,
    /// Payment gateway REST credentials and endpoint.
    pub gateway: GatewayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPS_HOST.to_string(),
            port: DEFAULT_RPS_PORT,
            database_url: String::default(),
            webhook_secret: Secret::default(),
            jwt_secret: Secret::default(),
            seller_state: DEFAULT_SELLER_STATE.to_string(),
            gst_rate_bps: DEFAULT_GST_RATE_BPS,
            gateway: GatewayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("RPS_HOST").ok().unwrap_or_else(|| DEFAULT_RPS_HOST.into());
        let port = env::var("RPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for RPS_PORT. {e} Using the default, {DEFAULT_RPS_PORT}, \
                         instead."
                    );
                    DEFAULT_RPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_RPS_PORT);
        let database_url = db_url();
        let webhook_secret = env::var("RPG_WEBHOOK_SECRET").map(Secret::new).unwrap_or_else(|_| {
            error!(
                "🪛️ RPG_WEBHOOK_SECRET is not set. All payment callbacks will be rejected until it is configured."
            );
            Secret::default()
        });
        let jwt_secret = env::var("RPG_JWT_SECRET").map(Secret::new).unwrap_or_else(|_| {
            let random: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
            warn!(
                "🪛️ RPG_JWT_SECRET is not set. A random verification key has been generated; no externally \
                 issued token will validate against it, and it will not survive a restart."
            );
            Secret::new(random)
        });
        let seller_state = env::var("RPG_SELLER_STATE").unwrap_or_else(|_| {
            info!("🪛️ RPG_SELLER_STATE is not set. Using the default, {DEFAULT_SELLER_STATE}.");
            DEFAULT_SELLER_STATE.to_string()
        });
        let gst_rate_bps = env::var("RPG_GST_RATE_BPS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| {
                        error!("🪛️ {s} is not a valid GST rate for RPG_GST_RATE_BPS. {e}");
                        e
                    })
                    .ok()
            })
            .unwrap_or(DEFAULT_GST_RATE_BPS);
        let gateway = GatewayConfig::new_from_env_or_default();
        Self { host, port, database_url, webhook_secret, jwt_secret, seller_state, gst_rate_bps, gateway }
    }
}
