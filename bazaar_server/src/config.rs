use std::{env, fmt::Display, str::FromStr};

use bazaar_common::{helpers::parse_boolean_flag, Secret};
use chrono::Duration;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

pub const DEFAULT_BZR_HOST: &str = "127.0.0.1";
pub const DEFAULT_BZR_PORT: u16 = 8360;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/bazaar.db";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
pub const DEFAULT_DB_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_TOKEN_VALIDITY_HOURS: i64 = 24;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The maximum number of pooled database connections.
    pub db_max_connections: u32,
    /// How long a request waits for a pooled connection or a database lock before giving up.
    pub db_timeout: std::time::Duration,
    /// If false, the schema migrations are not applied on startup.
    pub run_migrations: bool,
    /// The front-end origin that is allowed to make credentialed cross-origin requests.
    pub cors_origin: String,
    pub auth: AuthConfig,
    /// If supplied, an admin account with these details is created (or reset) on startup.
    pub admin: Option<AdminBootstrap>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BZR_HOST.to_string(),
            port: DEFAULT_BZR_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            db_timeout: std::time::Duration::from_secs(DEFAULT_DB_TIMEOUT_SECS),
            run_migrations: true,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            auth: AuthConfig::default(),
            admin: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BZR_HOST").ok().unwrap_or_else(|| DEFAULT_BZR_HOST.into());
        let port = parse_env("BZR_PORT", DEFAULT_BZR_PORT);
        let database_url = env::var("BZR_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ BZR_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let db_max_connections = parse_env("BZR_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        let db_timeout = std::time::Duration::from_secs(parse_env("BZR_DB_TIMEOUT_SECS", DEFAULT_DB_TIMEOUT_SECS));
        let run_migrations = parse_boolean_flag(env::var("BZR_RUN_MIGRATIONS").ok(), true);
        let cors_origin = env::var("BZR_CORS_ORIGIN").ok().unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into());
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let admin = AdminBootstrap::from_env();
        Self { host, port, database_url, db_max_connections, db_timeout, run_migrations, cors_origin, auth, admin }
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    /// How long an access token remains valid after it is issued.
    pub token_validity: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this, since every token will be invalidated when the server restarts. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret), token_validity: Duration::hours(DEFAULT_TOKEN_VALIDITY_HOURS) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S, token_validity: Duration) -> Self {
        Self { jwt_secret: Secret::new(secret.into()), token_validity }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("BZR_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [BZR_JWT_SECRET]")))?;
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "BZR_JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        let hours = parse_env("BZR_TOKEN_VALIDITY_HOURS", DEFAULT_TOKEN_VALIDITY_HOURS);
        let hours = if hours > 0 {
            hours
        } else {
            warn!("🪛️ BZR_TOKEN_VALIDITY_HOURS must be positive. Using {DEFAULT_TOKEN_VALIDITY_HOURS} hours.");
            DEFAULT_TOKEN_VALIDITY_HOURS
        };
        Ok(Self::new(secret, Duration::hours(hours)))
    }
}

//-------------------------------------------------  AdminBootstrap  ---------------------------------------------------
/// The admin account that is seeded on startup. Admins cannot sign up through the API.
#[derive(Clone, Debug)]
pub struct AdminBootstrap {
    pub name: String,
    pub email: String,
    pub password: Secret<String>,
}

impl AdminBootstrap {
    pub fn from_env() -> Option<Self> {
        let email = env::var("BZR_ADMIN_EMAIL").ok().filter(|s| !s.trim().is_empty());
        let password = env::var("BZR_ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());
        match (email, password) {
            (Some(email), Some(password)) => {
                let name = env::var("BZR_ADMIN_NAME").ok().unwrap_or_else(|| "Administrator".into());
                Some(Self { name, email, password: Secret::new(password) })
            },
            (Some(_), None) | (None, Some(_)) => {
                warn!("🪛️ Both BZR_ADMIN_EMAIL and BZR_ADMIN_PASSWORD must be set to seed an admin account.");
                None
            },
            (None, None) => {
                info!("🪛️ No admin account is configured for seeding.");
                None
            },
        }
    }
}
