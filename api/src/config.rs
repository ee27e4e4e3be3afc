use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CLUSTER: &str = "cluster0.8rpbzhd.mongodb.net";
const DEFAULT_DATABASE: &str = "Plate_Share";
const DEFAULT_SERVICE_ACCOUNT: &str = "serviceKey.json";
const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} env var must be set")]
    Missing(&'static str),

    #[error("{key} env var is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub mongodb_uri: String,
    pub database: String,
    pub service_account_path: PathBuf,
    pub firebase_api_key: String,
    pub identity_toolkit_url: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| dotenvy::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let port = match lookup("PORT") {
            Some(port) => port.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: "PORT",
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_PORT,
        };

        // an explicit URI wins over the Atlas credentials
        let mongodb_uri = match lookup("MONGODB_URI") {
            Some(uri) => uri,
            None => atlas_uri(
                &required("DB_USERNAME")?,
                &required("DB_PASSWORD")?,
                &lookup("DB_CLUSTER").unwrap_or_else(|| DEFAULT_CLUSTER.to_string()),
            ),
        };

        let identity_toolkit_url = lookup("IDENTITY_TOOLKIT_URL")
            .unwrap_or_else(|| DEFAULT_IDENTITY_TOOLKIT_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            port,
            mongodb_uri,
            database: lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            service_account_path: lookup("FIREBASE_SERVICE_ACCOUNT")
                .unwrap_or_else(|| DEFAULT_SERVICE_ACCOUNT.to_string())
                .into(),
            firebase_api_key: required("FIREBASE_API_KEY")?,
            identity_toolkit_url,
        })
    }
}

fn atlas_uri(username: &str, password: &str, cluster: &str) -> String {
    let username = urlencoding::encode(username);
    let password = urlencoding::encode(password);
    format!("mongodb+srv://{username}:{password}@{cluster}/?appName=Cluster0")
}
