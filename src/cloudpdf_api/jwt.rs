use crate::cloudpdf_api::config::CloudPdfConfig;
use crate::cloudpdf_api::secret::AccessSecret;
use crate::cloudpdf_api::types::CloudPdfError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Signing algorithm for every CloudPDF token
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claim names owned by the token format itself
const RESERVED_CLAIMS: [&str; 2] = ["exp", "iat"];

/// A single custom claim value
///
/// Booleans go on the wire as the lowercase strings `"true"` and `"false"`,
/// which is what the CloudPDF verifier compares against. Values compare by
/// their wire form, so `Bool(true) == Text("true")`.
#[derive(Debug, Clone)]
pub enum ClaimValue {
    Text(String),
    Bool(bool),
}

impl ClaimValue {
    /// Wire form of the value
    pub fn as_str(&self) -> &str {
        match self {
            ClaimValue::Text(s) => s,
            ClaimValue::Bool(true) => "true",
            ClaimValue::Bool(false) => "false",
        }
    }

    /// Interpret the value as a boolean flag
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ClaimValue::Bool(b) => Some(*b),
            ClaimValue::Text(s) if s == "true" => Some(true),
            ClaimValue::Text(s) if s == "false" => Some(false),
            ClaimValue::Text(_) => None,
        }
    }
}

impl PartialEq for ClaimValue {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ClaimValue {}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::Text(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::Text(value)
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Bool(value)
    }
}

impl Serialize for ClaimValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ClaimValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => ClaimValue::Text(s),
            serde_json::Value::Bool(b) => ClaimValue::Bool(b),
            other => ClaimValue::Text(other.to_string()),
        })
    }
}

/// Ordered set of custom claims describing one authorized action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    entries: Vec<(String, ClaimValue)>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a claim, replacing an existing claim of the same name in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ClaimValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Add a claim (builder pattern)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).map(ClaimValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ClaimValue::as_bool)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for ClaimSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ClaimSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ClaimSetVisitor;

        impl<'de> Visitor<'de> for ClaimSetVisitor {
            type Value = ClaimSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of claim names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ClaimSet, A::Error> {
                let mut claims = ClaimSet::new();
                while let Some((name, value)) = access.next_entry::<String, ClaimValue>()? {
                    claims.insert(name, value);
                }
                Ok(claims)
            }
        }

        deserializer.deserialize_map(ClaimSetVisitor)
    }
}

/// Payload of a CloudPDF token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    /// Issued at time (Unix timestamp, seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Action-specific claims
    #[serde(flatten)]
    pub claims: ClaimSet,
}

/// Header and payload of a token read without signature verification
#[derive(Debug, Clone)]
pub struct DecodedToken {
    pub algorithm: Algorithm,
    /// Key identifier, the tenant the token was issued for
    pub key_id: Option<String>,
    pub claims: TokenClaims,
}

/// Claims authorizing a single document upload
pub fn upload_claims(public: bool, search: bool) -> ClaimSet {
    ClaimSet::new()
        .with("type", "upload")
        .with("public", public)
        .with("search", search)
}

/// Claims authorizing viewing (and optionally downloading/searching) a document
pub fn view_claims(
    document_id: &str,
    allow_download: bool,
    allow_search: bool,
) -> Result<ClaimSet, CloudPdfError> {
    if document_id.trim().is_empty() {
        return Err(CloudPdfError::Validation(
            "Document ID must not be empty".to_string(),
        ));
    }

    Ok(ClaimSet::new()
        .with("type", "get-document")
        .with("documentId", document_id)
        .with("download", allow_download)
        .with("search", allow_search))
}

/// Issues short-lived HS256 tokens scoped to one tenant
///
/// Holds only immutable key material, so a single issuer can be shared
/// across concurrent callers.
#[derive(Clone)]
pub struct TokenIssuer {
    cloud_name: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    /// Create an issuer for a tenant
    ///
    /// Fails with [`CloudPdfError::Config`] when the cloud name is empty or
    /// the secret cannot be decoded with its configured encoding.
    pub fn new(cloud_name: impl Into<String>, secret: &AccessSecret) -> Result<Self, CloudPdfError> {
        let cloud_name = cloud_name.into();
        if cloud_name.trim().is_empty() {
            return Err(CloudPdfError::Config(
                "Cloud name must not be empty".to_string(),
            ));
        }

        let key = secret.key_bytes()?;
        tracing::debug!(
            "Creating TokenIssuer for cloud={} (secret encoding={:?}, key length={})",
            cloud_name,
            secret.encoding(),
            key.len()
        );

        Ok(Self {
            cloud_name,
            encoding_key: EncodingKey::from_secret(&key),
            decoding_key: DecodingKey::from_secret(&key),
        })
    }

    pub fn from_config(config: &CloudPdfConfig) -> Result<Self, CloudPdfError> {
        Self::new(config.cloud_name.clone(), &config.access_secret)
    }

    /// Tenant embedded as `kid` in every token
    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }

    /// Token authorizing one upload
    pub fn issue_upload_token(
        &self,
        public: bool,
        search: bool,
        expiry: DateTime<Utc>,
    ) -> Result<String, CloudPdfError> {
        self.sign(&upload_claims(public, search), expiry)
    }

    /// Token authorizing access to one document
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cloudpdf_sdk::{AccessSecret, TokenIssuer};
    /// use chrono::{Duration, Utc};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let issuer = TokenIssuer::new("my-cloud", &AccessSecret::utf8("my-secret"))?;
    /// let token = issuer.issue_view_token("doc-123", true, false, Utc::now() + Duration::hours(1))?;
    /// println!("Viewer token: {}", token);
    /// # Ok(())
    /// # }
    /// ```
    pub fn issue_view_token(
        &self,
        document_id: &str,
        allow_download: bool,
        allow_search: bool,
        expiry: DateTime<Utc>,
    ) -> Result<String, CloudPdfError> {
        let claims = view_claims(document_id, allow_download, allow_search)?;
        self.sign(&claims, expiry)
    }

    /// Sign a claim set with an exact expiry
    ///
    /// `exp` is the expiry instant in whole seconds. The fresh token is verified
    /// against the same key before it is returned; a token that does not
    /// round-trip is reported as [`CloudPdfError::Token`].
    pub fn sign(&self, claims: &ClaimSet, expiry: DateTime<Utc>) -> Result<String, CloudPdfError> {
        if let Some((name, _)) = claims
            .iter()
            .find(|(name, _)| RESERVED_CLAIMS.contains(name))
        {
            return Err(CloudPdfError::Validation(format!(
                "Claim '{}' is reserved and cannot be set directly",
                name
            )));
        }

        let payload = TokenClaims {
            exp: expiry.timestamp(),
            iat: Some(Utc::now().timestamp()),
            claims: claims.clone(),
        };

        let mut header = Header::new(TOKEN_ALGORITHM);
        header.kid = Some(self.cloud_name.clone());

        let token = encode(&header, &payload, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign token for cloud={}: {}", self.cloud_name, e);
            CloudPdfError::Token(format!("Failed to sign token: {}", e))
        })?;

        let verified = self.verify(&token)?;
        if verified.exp != payload.exp || verified.claims != payload.claims {
            tracing::error!(
                "Signed token did not round-trip for cloud={} (exp {} vs {})",
                self.cloud_name,
                verified.exp,
                payload.exp
            );
            return Err(CloudPdfError::Token(
                "Signed token does not match the requested claims".to_string(),
            ));
        }

        tracing::debug!(
            "Issued token for cloud={}, type={}, exp={} (length: {})",
            self.cloud_name,
            claims.get_str("type").unwrap_or("custom"),
            payload.exp,
            token.len()
        );

        Ok(token)
    }

    /// Verify a token's signature and key id against this issuer
    ///
    /// Expiry is not checked against the clock; only that `exp` is present.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, CloudPdfError> {
        let header = decode_header(token)
            .map_err(|e| CloudPdfError::Token(format!("Invalid token header: {}", e)))?;

        if header.alg != TOKEN_ALGORITHM {
            return Err(CloudPdfError::Token(format!(
                "Unexpected algorithm {:?}, expected {:?}",
                header.alg, TOKEN_ALGORITHM
            )));
        }

        if header.kid.as_deref() != Some(self.cloud_name.as_str()) {
            return Err(CloudPdfError::Token(format!(
                "Key ID {:?} does not match cloud '{}'",
                header.kid, self.cloud_name
            )));
        }

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| CloudPdfError::Token(format!("Token verification failed: {}", e)))?;

        Ok(data.claims)
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("cloud_name", &self.cloud_name)
            .finish_non_exhaustive()
    }
}

/// Read a token's header and claims without verifying the signature
///
/// Intended for inspection only; never use the result to make an
/// authorization decision.
pub fn decode_token_unverified(token: &str) -> Result<DecodedToken, CloudPdfError> {
    let header = decode_header(token)
        .map_err(|e| CloudPdfError::Token(format!("Invalid token header: {}", e)))?;

    let data = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
        .map_err(|e| CloudPdfError::Token(format!("Failed to decode token: {}", e)))?;

    Ok(DecodedToken {
        algorithm: header.alg,
        key_id: header.kid,
        claims: data.claims,
    })
}
