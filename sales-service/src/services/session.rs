//! Session tokens injected into the page shell.
//!
//! The ERP owns real session issuance; the gateway only mints a per-request
//! token the frontend echoes back, HMAC-bound to the caller.

use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Mint a `nonce.signature` token bound to the caller.
pub fn issue_token(secret: &Secret<String>, user: &str) -> String {
    let mut nonce_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = hex::encode(nonce_bytes);
    let signature = sign(secret, user, &nonce);
    format!("{}.{}", nonce, signature)
}

/// Check a token previously issued for `user`.
pub fn verify_token(secret: &Secret<String>, user: &str, token: &str) -> bool {
    match token.split_once('.') {
        Some((nonce, signature)) => sign(secret, user, nonce) == signature,
        None => false,
    }
}

fn sign(secret: &Secret<String>, user: &str, nonce: &str) -> String {
    let payload = format!("{}|{}", user, nonce);
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_for_the_same_user() {
        let secret = Secret::new("test-secret".to_string());
        let token = issue_token(&secret, "clerk@example.com");
        assert!(verify_token(&secret, "clerk@example.com", &token));
        assert!(!verify_token(&secret, "someone-else", &token));
        assert!(!verify_token(&secret, "clerk@example.com", "garbage"));
    }
}
