//! Compact JWE decryption for the provider's encrypted identity token.
//!
//! The identity provider wraps a random content-encryption key under our
//! registered RSA public key (RSA-OAEP) and encrypts the inner signed
//! token with AES-GCM. Only decryption lives here; this service never
//! produces JWEs.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::{Oaep, RsaPrivateKey};
use serde::Deserialize;
use sha1::Sha1;
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

/// AES-GCM nonce size in bytes.
const GCM_IV_LEN: usize = 12;

/// AES-GCM authentication tag size in bytes.
const GCM_TAG_LEN: usize = 16;

/// Cap on any single encoded JWE part, before base64 decode.
const MAX_PART_LEN: usize = 256 * 1024;

/// Protected header fields we act on.
#[derive(Debug, Deserialize)]
struct JweHeader {
    alg: String,
    enc: String,
}

/// Decrypt a compact (five-part) JWE, returning the inner plaintext —
/// for identity tokens, the provider's compact signed token.
///
/// Supported algorithms: `RSA-OAEP-256` / `RSA-OAEP` key wrap with
/// `A256GCM` / `A128GCM` content encryption. Anything else fails with
/// `AuthError::UnsupportedAlgorithm`; a malformed token or a key
/// mismatch fails with `AuthError::Decryption` and never yields claims.
pub fn decrypt_compact(key: &RsaPrivateKey, token: &str) -> AuthResult<String> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 5 {
        return Err(AuthError::Decryption(
            "Expected a five-part compact JWE".to_string(),
        ));
    }
    if parts.iter().any(|p| p.len() > MAX_PART_LEN) {
        return Err(AuthError::Decryption(
            "JWE part exceeds maximum size".to_string(),
        ));
    }

    let header_bytes = decode_part(parts[0], "protected header")?;
    let header: JweHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| AuthError::Decryption(format!("Invalid protected header: {e}")))?;

    let encrypted_key = decode_part(parts[1], "encrypted key")?;
    let iv = decode_part(parts[2], "initialization vector")?;
    let ciphertext = decode_part(parts[3], "ciphertext")?;
    let tag = decode_part(parts[4], "authentication tag")?;

    if iv.len() != GCM_IV_LEN {
        return Err(AuthError::Decryption(format!(
            "Unexpected IV length: {}",
            iv.len()
        )));
    }
    if tag.len() != GCM_TAG_LEN {
        return Err(AuthError::Decryption(format!(
            "Unexpected tag length: {}",
            tag.len()
        )));
    }

    let cek = match header.alg.as_str() {
        "RSA-OAEP-256" => key.decrypt(Oaep::new::<Sha256>(), &encrypted_key),
        "RSA-OAEP" => key.decrypt(Oaep::new::<Sha1>(), &encrypted_key),
        other => {
            return Err(AuthError::UnsupportedAlgorithm(format!(
                "JWE key algorithm {other}"
            )))
        }
    }
    .map_err(|_| {
        // Deliberately vague: OAEP failures must not leak which part of
        // the unwrap went wrong.
        AuthError::Decryption("Content key unwrap failed".to_string())
    })?;

    // AAD is the ASCII of the encoded protected header (RFC 7516 §5.1).
    let aad = parts[0].as_bytes();
    let mut sealed = ciphertext;
    sealed.extend_from_slice(&tag);
    let payload = Payload { msg: &sealed, aad };

    let plaintext = match header.enc.as_str() {
        "A256GCM" => {
            let cipher = Aes256Gcm::new_from_slice(&cek)
                .map_err(|_| AuthError::Decryption("Bad content key length".to_string()))?;
            cipher.decrypt(Nonce::from_slice(&iv), payload)
        }
        "A128GCM" => {
            let cipher = Aes128Gcm::new_from_slice(&cek)
                .map_err(|_| AuthError::Decryption("Bad content key length".to_string()))?;
            cipher.decrypt(Nonce::from_slice(&iv), payload)
        }
        other => {
            return Err(AuthError::UnsupportedAlgorithm(format!(
                "JWE content encryption {other}"
            )))
        }
    }
    .map_err(|_| AuthError::Decryption("Authenticated decryption failed".to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|_| AuthError::Decryption("Plaintext is not valid UTF-8".to_string()))
}

fn decode_part(part: &str, what: &str) -> AuthResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|e| AuthError::Decryption(format!("Invalid base64 in {what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::tests::{test_keys, TEST_SIG_PRIVATE_KEY};
    use rand::rngs::OsRng;
    use rand::RngCore;
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::RsaPublicKey;
    use serde_json::json;

    /// Test-only compact JWE encryption, mirroring what the provider does.
    fn encrypt_compact(public_key: &RsaPublicKey, plaintext: &[u8]) -> String {
        let mut cek = [0u8; 32];
        OsRng.fill_bytes(&mut cek);
        let mut iv = [0u8; GCM_IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let header = json!({ "alg": "RSA-OAEP-256", "enc": "A256GCM" });
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());

        let encrypted_key = public_key
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), &cek)
            .unwrap();

        let cipher = Aes256Gcm::new_from_slice(&cek).unwrap();
        let sealed = cipher
            .encrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: plaintext,
                    aad: header_b64.as_bytes(),
                },
            )
            .unwrap();
        let (ct, tag) = sealed.split_at(sealed.len() - GCM_TAG_LEN);

        format!(
            "{}.{}.{}.{}.{}",
            header_b64,
            URL_SAFE_NO_PAD.encode(encrypted_key),
            URL_SAFE_NO_PAD.encode(iv),
            URL_SAFE_NO_PAD.encode(ct),
            URL_SAFE_NO_PAD.encode(tag),
        )
    }

    fn test_encryption_keypair() -> (RsaPrivateKey, RsaPublicKey) {
        let private = RsaPrivateKey::from_pkcs8_pem(TEST_SIG_PRIVATE_KEY).unwrap();
        let public = private.to_public_key();
        (private, public)
    }

    #[test]
    fn decrypts_token_encrypted_under_our_key() {
        let (private, public) = test_encryption_keypair();
        let inner = "eyJhbGciOiJSUzI1NiJ9.eyJuYW1lIjoiTWF0dGkgTWVpa8OkbMOkaW5lbiJ9.sig";

        let token = encrypt_compact(&public, inner.as_bytes());
        let decrypted = decrypt_compact(&private, &token).unwrap();

        assert_eq!(decrypted, inner);
    }

    #[test]
    fn wrong_key_fails_with_decryption_error() {
        let (private, _) = test_encryption_keypair();
        // A fresh keypair the service does not hold.
        let other = RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        let token = encrypt_compact(&other.to_public_key(), b"secret");

        let err = decrypt_compact(&private, &token).unwrap_err();
        assert!(matches!(err, AuthError::Decryption(_)));
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let (private, public) = test_encryption_keypair();
        let token = encrypt_compact(&public, b"payload");

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        // Flip the ciphertext to a different valid base64 string.
        parts[3] = URL_SAFE_NO_PAD.encode(b"tampered-ciphertext");
        let forged = parts.join(".");

        let err = decrypt_compact(&private, &forged).unwrap_err();
        assert!(matches!(err, AuthError::Decryption(_)));
    }

    #[test]
    fn rejects_non_jwe_shapes() {
        let (private, _) = test_encryption_keypair();
        assert!(matches!(
            decrypt_compact(&private, "a.b.c").unwrap_err(),
            AuthError::Decryption(_)
        ));
        assert!(matches!(
            decrypt_compact(&private, "").unwrap_err(),
            AuthError::Decryption(_)
        ));
    }

    #[test]
    fn rejects_unsupported_content_encryption() {
        let (private, public) = test_encryption_keypair();
        let token = encrypt_compact(&public, b"payload");

        // Rewrite the header to an unsupported CBC-HMAC composite. The
        // algorithm check fires before the AAD check would.
        let header = json!({ "alg": "RSA-OAEP-256", "enc": "A128CBC-HS256" });
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        parts[0] = header_b64;
        let rewritten = parts.join(".");

        let err = decrypt_compact(&private, &rewritten).unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn key_material_decrypts_via_configured_encryption_key() {
        let keys = test_keys();
        let (_, public) = test_encryption_keypair();
        let token = encrypt_compact(&public, b"{\"name\":\"Test Signer\"}");

        let plaintext = keys.decrypt_identity_token(&token).unwrap();
        assert_eq!(plaintext, "{\"name\":\"Test Signer\"}");
    }
}
