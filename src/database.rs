//! src/database.rs
mod entity;
mod naming;
mod synchronize;

use secrecy::{ExposeSecret, Secret};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};

pub use entity::*;
pub use naming::*;
pub use synchronize::*;

use crate::configuration::Settings;
use crate::domain::User;

/// Every entity the application modules register.
pub fn app_entities() -> EntityRegistry {
    EntityRegistry::new().register::<User>()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEngine {
    Postgres,
}

impl DatabaseEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseEngine::Postgres => "postgres",
        }
    }
}

/// Everything the database layer needs to open connections.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub naming_strategy: NamingStrategy,
    pub engine: DatabaseEngine,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub database: String,
    pub entities: EntityRegistry,
    pub synchronize: bool,
    pub logging: bool,
    // Leave the pool open once the application stops.
    pub keep_connection_alive: bool,
}

impl PartialEq for ConnectionOptions {
    fn eq(&self, other: &Self) -> bool {
        self.naming_strategy == other.naming_strategy
            && self.engine == other.engine
            && self.host == other.host
            && self.port == other.port
            && self.username == other.username
            && self.password.expose_secret() == other.password.expose_secret()
            && self.database == other.database
            && self.entities == other.entities
            && self.synchronize == other.synchronize
            && self.logging == other.logging
            && self.keep_connection_alive == other.keep_connection_alive
    }
}

impl ConnectionOptions {
    pub fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
            .database(&self.database);
        if self.logging {
            options.log_statements(tracing::log::LevelFilter::Info);
        } else {
            options.disable_statement_logging();
        }
        options
    }
}

/// Build the options the database layer connects with.
///
/// No I/O happens here: the same settings always produce equal options.
#[tracing::instrument(name = "Building connection options", skip(configuration))]
pub async fn connection_options(configuration: &Settings) -> ConnectionOptions {
    let database = &configuration.database;
    ConnectionOptions {
        naming_strategy: NamingStrategy::SnakeCase,
        engine: DatabaseEngine::Postgres,
        host: database.host.clone(),
        port: database.port,
        username: database.username.clone(),
        password: database.password.clone(),
        database: database.database_name.clone(),
        entities: app_entities(),
        synchronize: database.synchronize,
        logging: database.logging,
        keep_connection_alive: true,
    }
}

/// A pool that connects on first use, with the pool defaults of `sqlx`.
pub fn get_connection_pool(options: &ConnectionOptions) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(options.connect_options())
}
