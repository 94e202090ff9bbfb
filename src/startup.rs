use actix_web::dev::{Server, ServerHandle};
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use anyhow::Context;
use sqlx::PgPool;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::database::{
    connection_options, get_connection_pool, synchronize, ConnectionOptions,
};
use crate::routes::health_check;

pub struct Application {
    port: u16,
    server: Server,
    connection_pool: PgPool,
    keep_connection_alive: bool,
}

impl Application {
    /// Wire the database layer and bind the listener.
    ///
    /// The pool is lazy, so unless schema synchronization is enabled no
    /// connection is opened before the first query.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let options = connection_options(&configuration).await;
        Self::build_with_options(configuration, options).await
    }

    pub async fn build_with_options(
        configuration: Settings,
        options: ConnectionOptions,
    ) -> Result<Self, anyhow::Error> {
        let connection_pool = get_connection_pool(&options);

        synchronize_schema(&options, &connection_pool)
            .await
            .context("Failed to synchronize the database schema")?;

        let address = format!("0.0.0.0:{}", configuration.application.port);
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}", address))?;
        let port = listener.local_addr()?.port();
        tracing::info!(
            environment = configuration.application.environment.as_str(),
            "app started at: 0.0.0.0:{}",
            port
        );
        let server = run(listener, connection_pool.clone())?;
        Ok(Self {
            port,
            server,
            connection_pool,
            keep_connection_alive: options.keep_connection_alive,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn connection_pool(&self) -> &PgPool {
        &self.connection_pool
    }

    pub fn handle(&self) -> ServerHandle {
        self.server.handle()
    }

    // A more expressive name that makes it clear that
    // this function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        let outcome = self.server.await;
        if !self.keep_connection_alive {
            tracing::info!("closing the connection pool");
            self.connection_pool.close().await;
        }
        outcome
    }
}

async fn synchronize_schema(
    options: &ConnectionOptions,
    connection_pool: &PgPool,
) -> Result<(), sqlx::Error> {
    if options.synchronize {
        tracing::info!("synchronizing postgres schema");
        synchronize(connection_pool, &options.entities, options.naming_strategy)
            .await
    } else {
        Ok(())
    }
}

pub fn run(
    listener: TcpListener,
    connection_pool: PgPool,
) -> Result<Server, std::io::Error> {
    let connection_pool = web::Data::new(connection_pool);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .app_data(connection_pool.clone())
    })
    .listen(listener)?
    .run();
    // No .await here
    Ok(server)
}
