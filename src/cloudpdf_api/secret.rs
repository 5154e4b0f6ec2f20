use crate::cloudpdf_api::types::CloudPdfError;
use base64::{engine::general_purpose, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// How an access secret string maps to HMAC key bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretEncoding {
    /// The UTF-8 bytes of the secret string are the key
    #[default]
    Utf8,
    /// The secret is URL-safe base64 (padding optional) of the key
    Base64Url,
}

/// Shared secret used to sign CloudPDF tokens
///
/// The secret string is held in a [`SecretString`] and only exposed while
/// decoding key bytes. `Debug` output never contains the secret.
pub struct AccessSecret {
    secret: SecretString,
    encoding: SecretEncoding,
}

impl AccessSecret {
    pub fn new(secret: impl Into<String>, encoding: SecretEncoding) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
            encoding,
        }
    }

    /// Secret whose UTF-8 bytes are the signing key
    pub fn utf8(secret: impl Into<String>) -> Self {
        Self::new(secret, SecretEncoding::Utf8)
    }

    /// Secret provisioned as URL-safe base64
    pub fn base64_url(secret: impl Into<String>) -> Self {
        Self::new(secret, SecretEncoding::Base64Url)
    }

    /// Same secret string, read with a different encoding
    pub fn with_encoding(mut self, encoding: SecretEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> SecretEncoding {
        self.encoding
    }

    /// Decode the secret into HMAC key bytes
    ///
    /// Decoding is deterministic: the same secret and encoding always yield
    /// the same bytes.
    pub fn key_bytes(&self) -> Result<Vec<u8>, CloudPdfError> {
        let raw = self.secret.expose_secret();
        let bytes = match self.encoding {
            SecretEncoding::Utf8 => raw.as_bytes().to_vec(),
            SecretEncoding::Base64Url => decode_base64_url(raw)?,
        };

        if bytes.is_empty() {
            return Err(CloudPdfError::Config(
                "Access secret must not be empty".to_string(),
            ));
        }

        Ok(bytes)
    }
}

impl Clone for AccessSecret {
    fn clone(&self) -> Self {
        Self::new(self.secret.expose_secret(), self.encoding)
    }
}

impl fmt::Debug for AccessSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessSecret")
            .field("secret", &"[REDACTED]")
            .field("encoding", &self.encoding)
            .finish()
    }
}

/// Map the URL-safe alphabet onto the standard one, restore `=` padding from
/// the length, then decode with the standard engine.
fn decode_base64_url(raw: &str) -> Result<Vec<u8>, CloudPdfError> {
    let mut normalized: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    match normalized.len() % 4 {
        2 => normalized.push_str("=="),
        3 => normalized.push('='),
        _ => {}
    }

    general_purpose::STANDARD.decode(&normalized).map_err(|e| {
        tracing::debug!("Access secret is not valid base64url: {}", e);
        CloudPdfError::Config(format!("Access secret is not valid base64url: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_secret_is_raw_bytes() {
        let secret = AccessSecret::utf8("my-secret");
        assert_eq!(secret.key_bytes().unwrap(), b"my-secret".to_vec());
    }

    #[test]
    fn test_base64_url_substitutes_alphabet_and_restores_padding() {
        // 0xfb 0xff encodes to "-_8" in the URL-safe alphabet without padding
        let secret = AccessSecret::base64_url("-_8");
        assert_eq!(secret.key_bytes().unwrap(), vec![0xfb, 0xff]);

        let two_pad = AccessSecret::base64_url("YQ");
        assert_eq!(two_pad.key_bytes().unwrap(), b"a".to_vec());

        let padded = AccessSecret::base64_url("YQ==");
        assert_eq!(padded.key_bytes().unwrap(), b"a".to_vec());
    }

    #[test]
    fn test_base64_url_malformed_is_config_error() {
        let secret = AccessSecret::base64_url("not*base64");
        match secret.key_bytes() {
            Err(CloudPdfError::Config(msg)) => assert!(msg.contains("base64url")),
            other => panic!("expected config error, got {:?}", other),
        }

        // A single leftover character can never be valid
        assert!(AccessSecret::base64_url("abcde").key_bytes().is_err());
    }

    #[test]
    fn test_decoding_is_deterministic() {
        for secret in [
            AccessSecret::utf8("c2VjcmV0LWtleQ"),
            AccessSecret::base64_url("c2VjcmV0LWtleQ"),
        ] {
            assert_eq!(secret.key_bytes().unwrap(), secret.key_bytes().unwrap());
        }
        assert_eq!(
            AccessSecret::base64_url("c2VjcmV0LWtleQ").key_bytes().unwrap(),
            b"secret-key".to_vec()
        );
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(AccessSecret::utf8("").key_bytes().is_err());
        assert!(AccessSecret::base64_url("").key_bytes().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let secret = AccessSecret::utf8("super-secret-value");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("REDACTED"));
    }
}
