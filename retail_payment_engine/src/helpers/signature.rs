//! Keyed-hash validation of payment-gateway callbacks.
//!
//! The gateway signs each settlement callback with HMAC-SHA256 over `"{gateway_order_id}|{gateway_payment_id}"`
//! using the webhook secret shared at onboarding. A callback whose signature does not match was not produced by
//! the gateway and must not advance any order.

use hmac::{Hmac, Mac};
use log::error;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Produces the hex digest the gateway would attach to a callback for this order/payment pair.
pub fn sign_callback(gateway_order_id: &str, gateway_payment_id: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());
    let bytes = mac.finalize().into_bytes();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Verifies a callback signature. Fails closed: an empty secret means the deployment is misconfigured, and no
/// callback can be trusted until that is fixed.
pub fn verify_callback(gateway_order_id: &str, gateway_payment_id: &str, signature: &str, secret: &str) -> bool {
    if secret.is_empty() {
        error!("Webhook secret is not configured. Rejecting all payment callbacks until it is set.");
        return false;
    }
    let expected = sign_callback(gateway_order_id, gateway_payment_id, secret);
    constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "whsec_test_1234567890";

    #[test]
    fn round_trip() {
        let sig = sign_callback("order_MkWab001", "pay_MkWab002", SECRET);
        assert!(verify_callback("order_MkWab001", "pay_MkWab002", &sig, SECRET));
    }

    #[test]
    fn any_single_character_mutation_fails() {
        let sig = sign_callback("order_MkWab001", "pay_MkWab002", SECRET);
        for i in 0..sig.len() {
            let mut mutated = sig.clone().into_bytes();
            mutated[i] = if mutated[i] == b'0' { b'1' } else { b'0' };
            let mutated = String::from_utf8(mutated).unwrap();
            if mutated == sig {
                continue;
            }
            assert!(!verify_callback("order_MkWab001", "pay_MkWab002", &mutated, SECRET));
        }
    }

    #[test]
    fn wrong_payment_id_fails() {
        let sig = sign_callback("order_MkWab001", "pay_MkWab002", SECRET);
        assert!(!verify_callback("order_MkWab001", "pay_MkWab003", &sig, SECRET));
    }

    #[test]
    fn empty_secret_fails_closed() {
        let sig = sign_callback("order_MkWab001", "pay_MkWab002", "");
        assert!(!verify_callback("order_MkWab001", "pay_MkWab002", &sig, ""));
    }
}
