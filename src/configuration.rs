//! src/configuration.rs

mod environment_schema;

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;

use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;

pub use environment_schema::*;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    pub environment: Environment,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub secret_key: Secret<String>,
    pub admin: AdminSettings,
}

// Identity used to bootstrap the first administrator account.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct AdminSettings {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    // Alter the schema on startup to match the registered entities.
    // Never leave this on against a database holding real data.
    pub synchronize: bool,
    // Log every statement sent to the database
    pub logging: bool,
}

impl Settings {
    /// Validate `vars` against [`ENVIRONMENT_SCHEMA`] and build the settings.
    ///
    /// Nothing here touches the process environment, the caller decides
    /// where the variables come from.
    pub fn from_environment<I, K, V>(vars: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_resolved(ENVIRONMENT_SCHEMA.validate(&vars)?)
    }

    /// Same as [`from_environment`](Self::from_environment), for raw
    /// environment entries that may not be valid UTF-8.
    pub fn from_os_environment<I>(vars: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        Self::from_resolved(ENVIRONMENT_SCHEMA.validate_os(vars)?)
    }

    fn from_resolved(
        resolved: ResolvedEnvironment,
    ) -> Result<Self, ConfigurationError> {
        let environment: Environment = resolved
            .get("NODE_ENV")
            .unwrap_or(Environment::Development.as_str())
            .to_string()
            .try_into()
            .map_err(|e: String| config::ConfigError::Message(e))?;

        let mut settings = config::Config::default();
        // Schema auto-sync and statement logging are only on by default
        // while developing. DB_SYNCHRONIZE and DB_LOGGING override this.
        settings.set_default(
            "database.synchronize",
            environment.is_development(),
        )?;
        settings
            .set_default("database.logging", environment.is_development())?;
        for (key, value) in resolved.iter() {
            settings.set(key.path, value.to_string())?;
        }

        let settings: Settings = settings.try_into()?;
        if settings.database.synchronize && !environment.is_development() {
            tracing::warn!(
                environment = environment.as_str(),
                "schema synchronization is enabled outside of development"
            );
        }
        Ok(settings)
    }
}

/// Read the process environment, after loading `.env` from the current
/// directory if there is one. Variables already set are never overridden.
pub fn get_configuration() -> Result<Settings, ConfigurationError> {
    if let Ok(path) = dotenv::dotenv() {
        tracing::info!("loaded environment file {}", path.display());
    }
    Settings::from_os_environment(std::env::vars_os())
}

/// Like [`get_configuration`], with an explicit environment file.
/// A missing file is not an error.
pub fn get_configuration_with_env_file(
    env_file: &Path,
) -> Result<Settings, ConfigurationError> {
    if dotenv::from_path(env_file).is_ok() {
        tracing::info!("loaded environment file {}", env_file.display());
    }
    Settings::from_os_environment(std::env::vars_os())
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum Environment {
    Development,
    Production,
    Test,
    Provision,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
            Environment::Provision => "provision",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(a: String) -> Result<Self, Self::Error> {
        match a.as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            "provision" => Ok(Self::Provision),
            other => Err(format!(
                "{} is not a supported environment. Use one of {:?}.",
                other, NODE_ENVIRONMENTS
            )),
        }
    }
}
