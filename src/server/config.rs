use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    #[serde(default = "default_cors_allow_any")]
    pub cors_allow_any: bool,

    /// Usernames holding the admin role. Applied on registration and synced
    /// onto existing accounts at start-up, so removing a name revokes the role.
    /// Whoever registers a listed name first gets the role: create these
    /// accounts before the server is reachable by others.
    #[serde(default)]
    pub admin_usernames: Vec<String>,

    #[serde(default = "default_password_hash_cost")]
    pub password_hash_cost: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    db_max_connections: Option<u32>,
    token_ttl_hours: Option<i64>,
    cors_allow_any: Option<bool>,
    admin_usernames: Option<Vec<String>>,
    password_hash_cost: Option<u32>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_token_ttl_hours() -> i64 {
    24 * 7
}

fn default_cors_allow_any() -> bool {
    true
}

fn default_password_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl ServerConfig {
    /// Loads the config from an optional TOML file, overridden by the process
    /// environment (after `.env` has been applied).
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();
        Self::load_from(config_path, std::env::vars())
    }

    /// Same layering as [`ServerConfig::load`], reading variables from `vars`
    /// instead of the process environment.
    pub fn load_from<I>(config_path: Option<&str>, vars: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialServerConfig::default()
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_iter(vars)
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        let final_config = ServerConfig {
            database_url: env_config.database_url.or(file_config.database_url)
                .ok_or("DATABASE_URL is required")?,
            jwt_secret: env_config.jwt_secret.or(file_config.jwt_secret)
                .ok_or("JWT_SECRET is required")?,
            listen_addr: env_config.listen_addr.or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            log_dir: env_config.log_dir.or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            db_max_connections: env_config.db_max_connections.or(file_config.db_max_connections)
                .unwrap_or_else(default_db_max_connections),
            token_ttl_hours: env_config.token_ttl_hours.or(file_config.token_ttl_hours)
                .unwrap_or_else(default_token_ttl_hours),
            cors_allow_any: env_config.cors_allow_any.or(file_config.cors_allow_any)
                .unwrap_or_else(default_cors_allow_any),
            admin_usernames: env_config.admin_usernames.or(file_config.admin_usernames)
                .unwrap_or_default(),
            password_hash_cost: env_config.password_hash_cost.or(file_config.password_hash_cost)
                .unwrap_or_else(default_password_hash_cost),
        };

        Ok(final_config)
    }
}
