//! PKCE (RFC 7636) helpers for the authorization-code flow.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Verifier and S256 challenge for one login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    /// Kept server-side until the code exchange
    pub code_verifier: String,
    /// Sent with the authorization request
    pub code_challenge: String,
}

impl PkceChallenge {
    /// Generate a fresh verifier (32 random bytes, 43 characters) and its challenge
    pub fn generate() -> Self {
        let code_verifier = random_token();
        let code_challenge = challenge_for(&code_verifier);
        Self {
            code_verifier,
            code_challenge,
        }
    }
}

/// BASE64URL(SHA256(verifier))
pub fn challenge_for(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// URL-safe random token, used for verifiers and the OAuth `state`
pub fn random_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}
