//! src/configuration/environment_schema.rs
//!
//! The declarative contract for the process environment: which variables
//! must be present, how their values are typed and where they land in
//! [`Settings`](crate::configuration::Settings).

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt::Debug;

use crate::utils::error_chain_fmt;

/// Values accepted for `NODE_ENV`.
pub const NODE_ENVIRONMENTS: &[&str] =
    &["development", "production", "test", "provision"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    String,
    /// A TCP port, coerced to a number when the settings are deserialized.
    Port,
    Boolean,
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Default(&'static str),
    /// Absent keys are simply left out of the resolved environment.
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvKey {
    /// Name of the environment variable, e.g. `DB_HOST`.
    pub name: &'static str,
    /// Dotted settings path the value is stored under, e.g. `database.host`.
    pub path: &'static str,
    pub key_type: KeyType,
    pub presence: Presence,
}

impl EnvKey {
    const fn new(
        name: &'static str,
        path: &'static str,
        key_type: KeyType,
        presence: Presence,
    ) -> Self {
        Self {
            name,
            path,
            key_type,
            presence,
        }
    }

    fn check(&self, value: &str) -> Result<String, EnvironmentIssue> {
        if value.is_empty() {
            return Err(EnvironmentIssue::Empty { key: self.name });
        }
        match self.key_type {
            KeyType::String => Ok(value.to_owned()),
            KeyType::Port => match value.parse::<u16>() {
                Ok(_) => Ok(value.to_owned()),
                Err(_) => Err(EnvironmentIssue::NotAPort {
                    key: self.name,
                    value: value.to_owned(),
                }),
            },
            KeyType::Boolean => match value.to_lowercase().as_str() {
                "true" => Ok("true".into()),
                "false" => Ok("false".into()),
                _ => Err(EnvironmentIssue::NotABoolean {
                    key: self.name,
                    value: value.to_owned(),
                }),
            },
            KeyType::OneOf(allowed) => {
                if allowed.contains(&value) {
                    Ok(value.to_owned())
                } else {
                    Err(EnvironmentIssue::NotAllowed {
                        key: self.name,
                        value: value.to_owned(),
                        allowed,
                    })
                }
            }
        }
    }
}

/// An ordered set of environment keys.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentSchema {
    keys: &'static [EnvKey],
}

/// Every variable the application reads at startup.
pub const ENVIRONMENT_SCHEMA: EnvironmentSchema = EnvironmentSchema {
    keys: &[
        EnvKey::new(
            "NODE_ENV",
            "application.environment",
            KeyType::OneOf(NODE_ENVIRONMENTS),
            Presence::Default("development"),
        ),
        EnvKey::new(
            "PORT",
            "application.port",
            KeyType::Port,
            Presence::Default("5000"),
        ),
        EnvKey::new(
            "SECRET_KEY",
            "application.secret_key",
            KeyType::String,
            Presence::Required,
        ),
        EnvKey::new(
            "ADMIN_USER",
            "application.admin.username",
            KeyType::String,
            Presence::Required,
        ),
        EnvKey::new(
            "ADMIN_PASSWORD",
            "application.admin.password",
            KeyType::String,
            Presence::Required,
        ),
        EnvKey::new(
            "DB_USERNAME",
            "database.username",
            KeyType::String,
            Presence::Required,
        ),
        EnvKey::new(
            "DB_PASSWORD",
            "database.password",
            KeyType::String,
            Presence::Required,
        ),
        EnvKey::new(
            "DB_HOST",
            "database.host",
            KeyType::String,
            Presence::Required,
        ),
        EnvKey::new(
            "DB_PORT",
            "database.port",
            KeyType::Port,
            Presence::Required,
        ),
        EnvKey::new(
            "DB_NAME",
            "database.database_name",
            KeyType::String,
            Presence::Required,
        ),
        EnvKey::new(
            "DB_SYNCHRONIZE",
            "database.synchronize",
            KeyType::Boolean,
            Presence::Optional,
        ),
        EnvKey::new(
            "DB_LOGGING",
            "database.logging",
            KeyType::Boolean,
            Presence::Optional,
        ),
    ],
};

impl EnvironmentSchema {
    pub fn keys(&self) -> &'static [EnvKey] {
        self.keys
    }

    /// Check `vars` against every key of the schema, in order.
    ///
    /// All problems are collected before returning, so a single run reports
    /// every offending variable. Variables the schema does not know about
    /// are ignored.
    pub fn validate(
        &self,
        vars: &HashMap<String, String>,
    ) -> Result<ResolvedEnvironment, ConfigurationError> {
        self.validate_with(vars, &[])
    }

    /// Like [`validate`](Self::validate), for an environment that may hold
    /// names or values that are not valid UTF-8.
    ///
    /// Such entries are skipped unless the name is a schema key, in which
    /// case the key is reported as [`EnvironmentIssue::NotUnicode`].
    pub fn validate_os<I>(
        &self,
        vars: I,
    ) -> Result<ResolvedEnvironment, ConfigurationError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut utf8 = HashMap::new();
        let mut not_unicode = Vec::new();

        for (name, value) in vars {
            let name = match name.into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            match value.into_string() {
                Ok(value) => {
                    utf8.insert(name, value);
                }
                Err(_) => {
                    if let Some(key) = self.keys.iter().find(|k| k.name == name) {
                        not_unicode.push(key.name);
                    }
                }
            }
        }
        self.validate_with(&utf8, &not_unicode)
    }

    fn validate_with(
        &self,
        vars: &HashMap<String, String>,
        not_unicode: &[&'static str],
    ) -> Result<ResolvedEnvironment, ConfigurationError> {
        let mut values = Vec::with_capacity(self.keys.len());
        let mut issues = Vec::new();

        for key in self.keys {
            if not_unicode.contains(&key.name) {
                issues.push(EnvironmentIssue::NotUnicode { key: key.name });
                continue;
            }
            let raw = match (vars.get(key.name), key.presence) {
                (Some(value), _) => value.as_str(),
                (None, Presence::Default(default)) => default,
                (None, Presence::Optional) => continue,
                (None, Presence::Required) => {
                    issues.push(EnvironmentIssue::Missing { key: key.name });
                    continue;
                }
            };
            match key.check(raw) {
                Ok(value) => values.push((*key, value)),
                Err(issue) => issues.push(issue),
            }
        }

        if issues.is_empty() {
            Ok(ResolvedEnvironment { values })
        } else {
            Err(ConfigurationError::Invalid(issues))
        }
    }
}

/// Schema keys paired with their checked values, defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    values: Vec<(EnvKey, String)>,
}

impl ResolvedEnvironment {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key.name == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EnvKey, &str)> {
        self.values.iter().map(|(key, value)| (key, value.as_str()))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentIssue {
    #[error("{key} is required")]
    Missing { key: &'static str },
    #[error("{key} must not be empty")]
    Empty { key: &'static str },
    #[error("{key} is not valid unicode")]
    NotUnicode { key: &'static str },
    #[error("{key} must be a port number, got `{value}`")]
    NotAPort { key: &'static str, value: String },
    #[error("{key} must be `true` or `false`, got `{value}`")]
    NotABoolean { key: &'static str, value: String },
    #[error("{key} must be one of {allowed:?}, got `{value}`")]
    NotAllowed {
        key: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
}

impl EnvironmentIssue {
    pub fn key(&self) -> &'static str {
        match self {
            EnvironmentIssue::Missing { key }
            | EnvironmentIssue::Empty { key }
            | EnvironmentIssue::NotUnicode { key }
            | EnvironmentIssue::NotAPort { key, .. }
            | EnvironmentIssue::NotABoolean { key, .. }
            | EnvironmentIssue::NotAllowed { key, .. } => key,
        }
    }
}

#[derive(thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid environment: {}", join_issues(.0))]
    Invalid(Vec<EnvironmentIssue>),
    #[error("Failed to load settings")]
    Load(#[from] config::ConfigError),
}

impl ConfigurationError {
    /// Names of the environment variables that failed validation.
    pub fn keys(&self) -> Vec<&'static str> {
        match self {
            ConfigurationError::Invalid(issues) => {
                issues.iter().map(EnvironmentIssue::key).collect()
            }
            ConfigurationError::Load(_) => Vec::new(),
        }
    }
}

impl Debug for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

fn join_issues(issues: &[EnvironmentIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
