use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_ALLOWED_ROLES: [&str; 3] = ["President", "Minister", "Founder"];

/// Verification settings for editor tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 shared secret. Ignored when `jwt_public_key_pem` is set.
    pub jwt_secret: Option<String>,
    /// RS256 public key (PEM).
    pub jwt_public_key_pem: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub allowed_roles: Vec<String>,
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub user_info_endpoint: String,
    pub client_secret: Option<String>,
    pub scope: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
    pub oauth: OAuthConfig,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL is not set")?;
        let port = match get("APP_PORT") {
            Some(v) => v.parse::<u16>().context("APP_PORT is not a valid port")?,
            None => 8080,
        };

        let auth = AuthConfig {
            jwt_secret: get("AUTH_JWT_SECRET"),
            jwt_public_key_pem: get("AUTH_JWT_PUBLIC_KEY"),
            issuer: get("AUTH_JWT_ISSUER"),
            audience: get("AUTH_JWT_AUDIENCE"),
            allowed_roles: get("AUTH_ALLOWED_ROLES")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|| DEFAULT_ALLOWED_ROLES.iter().map(|r| r.to_string()).collect()),
            leeway_secs: get("AUTH_LEEWAY_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60),
        };
        if auth.jwt_secret.is_none() && auth.jwt_public_key_pem.is_none() {
            anyhow::bail!("one of AUTH_JWT_SECRET or AUTH_JWT_PUBLIC_KEY must be set");
        }

        let oauth = OAuthConfig {
            client_id: get("OAUTH_CLIENT_ID").unwrap_or_default(),
            redirect_uri: get("OAUTH_REDIRECT_URI")
                .unwrap_or_else(|| "http://localhost:3000/".into()),
            authorization_endpoint: get("OAUTH_AUTHORIZATION_ENDPOINT").unwrap_or_default(),
            token_endpoint: get("OAUTH_TOKEN_ENDPOINT").unwrap_or_default(),
            user_info_endpoint: get("OAUTH_USER_INFO_ENDPOINT").unwrap_or_default(),
            client_secret: get("OAUTH_CLIENT_SECRET"),
            scope: get("OAUTH_SCOPE").unwrap_or_else(|| "openid profile email".into()),
        };

        Ok(Self {
            database_url,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            auth,
            oauth,
            seed_demo_data: get("SEED_DEMO_DATA")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_required_keys_present() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/memorials"),
            ("AUTH_JWT_SECRET", "s3cret"),
        ]))
        .expect("config should load");

        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.auth.allowed_roles, vec!["President", "Minister", "Founder"]);
        assert_eq!(cfg.auth.leeway_secs, 60);
        assert_eq!(cfg.oauth.redirect_uri, "http://localhost:3000/");
        assert_eq!(cfg.oauth.scope, "openid profile email");
        assert!(cfg.oauth.client_secret.is_none());
        assert!(!cfg.seed_demo_data);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("AUTH_JWT_SECRET", "x")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn requires_a_verification_key() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(err.to_string().contains("AUTH_JWT_SECRET"));
    }

    #[test]
    fn parses_role_list_and_flags() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("AUTH_JWT_SECRET", "x"),
            ("AUTH_ALLOWED_ROLES", " Admin, ,Editor "),
            ("APP_PORT", "9090"),
            ("SEED_DEMO_DATA", "TRUE"),
            ("OAUTH_CLIENT_SECRET", ""),
        ]))
        .unwrap();

        assert_eq!(cfg.auth.allowed_roles, vec!["Admin", "Editor"]);
        assert_eq!(cfg.port, 9090);
        assert!(cfg.seed_demo_data);
        assert!(cfg.oauth.client_secret.is_none());
    }

    #[test]
    fn rejects_bad_port() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("AUTH_JWT_SECRET", "x"),
            ("APP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
