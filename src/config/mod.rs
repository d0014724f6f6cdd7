//! Application configuration management

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};

/// URI scheme that selects the in-process graph store instead of Neo4j
pub const MEMORY_GRAPH_URI: &str = "memory://";

/// Upper bound for TOKEN_LIFETIME_HOURS (one year)
pub const MAX_TOKEN_LIFETIME_HOURS: i64 = 24 * 365;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface address to bind, all interfaces when unset
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// Bolt URI of the graph database, or `memory://`
    pub graph_uri: String,

    /// Graph database user
    pub graph_user: String,

    /// Graph database password
    pub graph_password: String,

    /// Graph database name (server default when unset)
    pub graph_database: Option<String>,

    /// Maximum pooled Bolt connections
    pub graph_max_connections: usize,

    /// JWT signing secret
    pub jwt_secret: String,

    /// Lifetime of issued tokens, in hours
    pub token_lifetime_hours: i64,

    /// Bcrypt cost factor
    pub bcrypt_cost: u32,

    /// Suffix every user email must end with
    pub email_domain: String,

    /// Directory uploaded item images are written to
    pub images_path: PathBuf,

    /// Items per page for paged catalogue listings
    pub page_size: usize,

    /// Require an admin bearer token on catalogue administration routes
    pub admin_token_required: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: None,
            port: 5023,
            graph_uri: "bolt://localhost:7687".to_string(),
            graph_user: "neo4j".to_string(),
            graph_password: "neo4j".to_string(),
            graph_database: None,
            graph_max_connections: 10,
            jwt_secret: dev_secret(),
            token_lifetime_hours: 12,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            email_domain: "@gmail.com".to_string(),
            images_path: PathBuf::from("./data/images"),
            page_size: 10,
            admin_token_required: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret.trim().to_string(),
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, using a generated development secret");
                defaults.jwt_secret
            }
        };

        Ok(Self {
            host: env::var("HOST").ok(),

            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("Invalid PORT")?,

            graph_uri: env::var("GRAPH_URI").unwrap_or(defaults.graph_uri),

            graph_user: env::var("GRAPH_USER").unwrap_or(defaults.graph_user),

            graph_password: env::var("GRAPH_PASSWORD").unwrap_or(defaults.graph_password),

            graph_database: env::var("GRAPH_DATABASE").ok(),

            graph_max_connections: env::var("GRAPH_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.graph_max_connections),

            jwt_secret,

            token_lifetime_hours: match env::var("TOKEN_LIFETIME_HOURS") {
                Ok(raw) => parse_token_lifetime(&raw).context("Invalid TOKEN_LIFETIME_HOURS")?,
                Err(_) => defaults.token_lifetime_hours,
            },

            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.bcrypt_cost),

            email_domain: env::var("EMAIL_DOMAIN").unwrap_or(defaults.email_domain),

            images_path: env::var("IMAGES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.images_path),

            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.page_size),

            admin_token_required: env::var("ADMIN_TOKEN_REQUIRED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.admin_token_required),
        })
    }

    /// Socket address the server listens on
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip = match self.host.as_deref().map(str::trim) {
            None | Some("") => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Some(host) => host.parse().context("Invalid HOST")?,
        };
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Whether the in-process graph store was requested
    pub fn uses_memory_graph(&self) -> bool {
        self.graph_uri.starts_with(MEMORY_GRAPH_URI)
    }
}

fn parse_token_lifetime(raw: &str) -> Result<i64> {
    let hours: i64 = raw.trim().parse()?;
    anyhow::ensure!(
        (1..=MAX_TOKEN_LIFETIME_HOURS).contains(&hours),
        "must be between 1 and {MAX_TOKEN_LIFETIME_HOURS} hours, got {hours}"
    );
    Ok(hours)
}

/// Per-process secret for development; tokens do not survive a restart
fn dev_secret() -> String {
    format!("dev-secret-{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr().unwrap(), "0.0.0.0:5023".parse().unwrap());

        let config = Config {
            host: Some("127.0.0.1".to_string()),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.bind_addr().unwrap(), "127.0.0.1:8080".parse().unwrap());

        let config = Config {
            host: Some("::1".to_string()),
            ..Config::default()
        };
        assert_eq!(config.bind_addr().unwrap(), "[::1]:5023".parse().unwrap());

        let config = Config {
            host: Some("not an address".to_string()),
            ..Config::default()
        };
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn test_token_lifetime_bounds() {
        assert_eq!(parse_token_lifetime("12").unwrap(), 12);
        assert_eq!(parse_token_lifetime(" 8760 ").unwrap(), MAX_TOKEN_LIFETIME_HOURS);
        assert!(parse_token_lifetime("0").is_err());
        assert!(parse_token_lifetime("-3").is_err());
        assert!(parse_token_lifetime("8761").is_err());
        assert!(parse_token_lifetime("10000000000000000").is_err());
        assert!(parse_token_lifetime("twelve").is_err());
    }
}
