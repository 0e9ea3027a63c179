use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::claims::{matching_role, role_claim};
use crate::config::AuthConfig;

/// Why a request was refused. Never shown to the caller; only logged.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("unsupported authorization scheme")]
    UnsupportedScheme,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token carries no role claim")]
    MissingRole,
    #[error("role not allowed to edit")]
    RoleNotAllowed,
}

/// Identity of an authorized editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    pub subject: Option<String>,
    pub role: String,
}

/// Decides whether a request may mutate memorials.
///
/// Accepts `Authorization: Basic <jwt>` where the JWT is signed with the configured key,
/// unexpired, and carries an allowed role.
pub struct CredentialValidator {
    key: DecodingKey,
    validation: Validation,
    allowed_roles: Vec<String>,
}

impl CredentialValidator {
    pub fn new(cfg: &AuthConfig) -> anyhow::Result<Self> {
        let (key, algorithm) = match (&cfg.jwt_public_key_pem, &cfg.jwt_secret) {
            (Some(pem), _) => (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256),
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => anyhow::bail!("no token verification key configured"),
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = cfg.leeway_secs;
        if let Some(issuer) = &cfg.issuer {
            validation.set_issuer(std::slice::from_ref(issuer));
        }
        match &cfg.audience {
            Some(audience) => validation.set_audience(std::slice::from_ref(audience)),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key,
            validation,
            allowed_roles: cfg.allowed_roles.clone(),
        })
    }

    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        self.authorize(headers).is_ok()
    }

    pub fn authorize(&self, headers: &HeaderMap) -> Result<Editor, AuthFailure> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or(AuthFailure::MissingHeader)?
            .to_str()
            .map_err(|_| AuthFailure::UnsupportedScheme)?;
        let token = header
            .strip_prefix("Basic ")
            .ok_or(AuthFailure::UnsupportedScheme)?;
        self.authorize_token(token.trim())
    }

    pub fn authorize_token(&self, token: &str) -> Result<Editor, AuthFailure> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation)?;
        let claims = data.claims;

        let role = role_claim(&claims).ok_or(AuthFailure::MissingRole)?;
        let role = matching_role(role, &self.allowed_roles).ok_or(AuthFailure::RoleNotAllowed)?;

        let editor = Editor {
            subject: claims.get("sub").and_then(Value::as_str).map(String::from),
            role: role.to_string(),
        };
        debug!(subject = ?editor.subject, role = %editor.role, "editor token verified");
        Ok(editor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use time::OffsetDateTime;

    const SECRET: &str = "test-secret";

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: Some(SECRET.into()),
            jwt_public_key_pem: None,
            issuer: None,
            audience: None,
            allowed_roles: vec!["President".into(), "Minister".into(), "Founder".into()],
            leeway_secs: 0,
        }
    }

    fn exp_in(secs: i64) -> i64 {
        OffsetDateTime::now_utc().unix_timestamp() + secs
    }

    fn token(claims: Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    fn validator() -> CredentialValidator {
        CredentialValidator::new(&config()).unwrap()
    }

    #[test]
    fn accepts_allowed_role() {
        let t = token(json!({ "sub": "u1", "role": "President", "exp": exp_in(300) }), SECRET);
        let editor = validator().authorize(&headers(&format!("Basic {t}"))).unwrap();
        assert_eq!(editor.role, "President");
        assert_eq!(editor.subject.as_deref(), Some("u1"));
    }

    #[test]
    fn accepts_role_array_and_schema_claim() {
        let v = validator();
        let t = token(json!({ "roles": ["Guest", "Minister"], "exp": exp_in(300) }), SECRET);
        assert!(v.is_authorized(&headers(&format!("Basic {t}"))));

        let t = token(
            json!({
                "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": ["Founder"],
                "exp": exp_in(300),
            }),
            SECRET,
        );
        assert!(v.is_authorized(&headers(&format!("Basic {t}"))));
    }

    #[test]
    fn rejects_missing_header_and_other_schemes() {
        let v = validator();
        assert!(matches!(v.authorize(&HeaderMap::new()), Err(AuthFailure::MissingHeader)));

        let t = token(json!({ "role": "President", "exp": exp_in(300) }), SECRET);
        assert!(matches!(
            v.authorize(&headers(&format!("Bearer {t}"))),
            Err(AuthFailure::UnsupportedScheme)
        ));
    }

    #[test]
    fn rejects_role_outside_allow_list() {
        let t = token(json!({ "role": "Guest", "exp": exp_in(300) }), SECRET);
        assert!(matches!(
            validator().authorize(&headers(&format!("Basic {t}"))),
            Err(AuthFailure::RoleNotAllowed)
        ));

        let t = token(json!({ "sub": "u1", "exp": exp_in(300) }), SECRET);
        assert!(matches!(
            validator().authorize(&headers(&format!("Basic {t}"))),
            Err(AuthFailure::MissingRole)
        ));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let v = validator();
        for raw in ["Basic ", "Basic abc.def", "Basic a.b.c.d", "Basic !!!.@@@.###"] {
            assert!(!v.is_authorized(&headers(raw)), "{raw}");
        }
        // Plain base64 user:password is not a token.
        assert!(!v.is_authorized(&headers("Basic YWRtaW46YWRtaW4=")));
    }

    #[test]
    fn rejects_unsigned_or_foreign_signatures() {
        let v = validator();
        let forged = token(json!({ "role": "President", "exp": exp_in(300) }), "other-secret");
        assert!(!v.is_authorized(&headers(&format!("Basic {forged}"))));

        // Header and payload with a stripped signature.
        let mut parts: Vec<&str> = forged.split('.').collect();
        parts[2] = "";
        assert!(!v.is_authorized(&headers(&format!("Basic {}", parts.join(".")))));
    }

    #[test]
    fn rejects_expired_or_expiryless_tokens() {
        let v = validator();
        let expired = token(json!({ "role": "President", "exp": exp_in(-120) }), SECRET);
        assert!(!v.is_authorized(&headers(&format!("Basic {expired}"))));

        let forever = token(json!({ "role": "President" }), SECRET);
        assert!(!v.is_authorized(&headers(&format!("Basic {forever}"))));
    }

    #[test]
    fn enforces_issuer_and_audience_when_configured() {
        let mut cfg = config();
        cfg.issuer = Some("memorial-hall".into());
        cfg.audience = Some("editors".into());
        let v = CredentialValidator::new(&cfg).unwrap();

        let good = token(
            json!({ "role": "Founder", "iss": "memorial-hall", "aud": "editors", "exp": exp_in(300) }),
            SECRET,
        );
        assert!(v.is_authorized(&headers(&format!("Basic {good}"))));

        let wrong = token(
            json!({ "role": "Founder", "iss": "someone-else", "aud": "editors", "exp": exp_in(300) }),
            SECRET,
        );
        assert!(!v.is_authorized(&headers(&format!("Basic {wrong}"))));
    }

    #[test]
    fn audience_is_ignored_when_not_configured() {
        let t = token(
            json!({ "role": "Founder", "aud": "anything", "exp": exp_in(300) }),
            SECRET,
        );
        assert!(validator().is_authorized(&headers(&format!("Basic {t}"))));
    }

    #[test]
    fn new_fails_without_key() {
        let mut cfg = config();
        cfg.jwt_secret = None;
        assert!(CredentialValidator::new(&cfg).is_err());
    }
}
