//! Server configuration from the environment

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail, ensure};
use auth::AuthConfig;
use auth::config::PasswordPolicy;
use base64::Engine;
use base64::engine::general_purpose;

const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 3600;

pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// `None` runs on in-memory stores
    pub database: Option<DatabaseConfig>,
    pub frontend_origins: Vec<String>,
    pub session_purge_interval: Duration,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            }),
            _ => None,
        };

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            database,
            frontend_origins,
            session_purge_interval: Duration::from_secs(parse_or(
                "SESSION_PURGE_INTERVAL_SECS",
                300,
            )?),
            auth: auth_config()?,
        })
    }
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    let base = match env::var("AUTH_SESSION_SECRET") {
        Ok(secret_b64) => AuthConfig {
            session_secret: decode_secret(&secret_b64)?,
            ..AuthConfig::default()
        },
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("AUTH_SESSION_SECRET not set, using a random secret");
            AuthConfig::with_random_secret()
        }
        Err(_) => bail!("AUTH_SESSION_SECRET must be set in production"),
    };

    let password_pepper = env::var("AUTH_PASSWORD_PEPPER")
        .ok()
        .filter(|pepper| !pepper.is_empty())
        .map(String::into_bytes);

    Ok(AuthConfig {
        session_ttl: session_ttl(parse_or("AUTH_SESSION_TTL_SECS", 12 * 3600)?)?,
        cookie_secure: parse_or("AUTH_COOKIE_SECURE", !cfg!(debug_assertions))?,
        password_pepper,
        password_policy: password_policy(env::var("AUTH_PASSWORD_POLICY").ok().as_deref())?,
        mask_login_failures: parse_or("AUTH_MASK_LOGIN_FAILURES", false)?,
        ..base
    })
}

fn session_ttl(secs: u64) -> anyhow::Result<Duration> {
    ensure!(
        (1..=MAX_SESSION_TTL_SECS).contains(&secs),
        "AUTH_SESSION_TTL_SECS must be between 1 and {MAX_SESSION_TTL_SECS}, got {secs}"
    );
    Ok(Duration::from_secs(secs))
}

/// `default` (or unset) accepts any non-blank password; `strict` enforces a
/// minimum length and rejects common patterns
fn password_policy(name: Option<&str>) -> anyhow::Result<PasswordPolicy> {
    match name.map(str::trim) {
        None | Some("") | Some("default") => Ok(PasswordPolicy::default()),
        Some("strict") => Ok(PasswordPolicy::strict()),
        Some(other) => {
            bail!("invalid AUTH_PASSWORD_POLICY={other:?}: expected default or strict")
        }
    }
}

fn decode_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(secret_b64.trim())
        .context("AUTH_SESSION_SECRET is not valid base64")?;

    ensure!(
        bytes.len() == 32,
        "AUTH_SESSION_SECRET must decode to 32 bytes, got {}",
        bytes.len()
    );

    let mut secret = [0u8; 32];
    secret.copy_from_slice(&bytes);
    Ok(secret)
}

/// Parse `key` if set, else `default`
fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_secret() {
        let encoded = general_purpose::STANDARD.encode([7u8; 32]);
        assert_eq!(decode_secret(&encoded).unwrap(), [7u8; 32]);

        let short = general_purpose::STANDARD.encode([7u8; 16]);
        assert!(decode_secret(&short).is_err());
        assert!(decode_secret("%%%").is_err());
    }

    #[test]
    fn test_parse_or_default_when_unset() {
        let value: u64 = parse_or("USERAUTH_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_session_ttl_bounds() {
        assert_eq!(session_ttl(43_200).unwrap(), Duration::from_secs(43_200));
        assert_eq!(
            session_ttl(MAX_SESSION_TTL_SECS).unwrap(),
            Duration::from_secs(MAX_SESSION_TTL_SECS)
        );
        assert!(session_ttl(0).is_err());
        assert!(session_ttl(MAX_SESSION_TTL_SECS + 1).is_err());
        assert!(session_ttl(10_000_000_000_000).is_err());
    }

    #[test]
    fn test_password_policy_selection() {
        assert_eq!(password_policy(None).unwrap(), PasswordPolicy::default());
        assert_eq!(password_policy(Some("default")).unwrap(), PasswordPolicy::default());
        assert_eq!(password_policy(Some(" strict ")).unwrap(), PasswordPolicy::strict());
        assert!(password_policy(Some("lenient")).is_err());
    }
}
