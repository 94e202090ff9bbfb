use app_module::database::connection_options;
use app_module::startup::Application;
use sqlx::PgPool;

use crate::helpers::{load, test_environment};

// Run the application and stop it right away, handing back its pool.
async fn run_and_stop(keep_connection_alive: bool) -> PgPool {
    let configuration =
        load(test_environment()).expect("failed to read configuration.");
    let mut options = connection_options(&configuration).await;
    options.keep_connection_alive = keep_connection_alive;

    let application = Application::build_with_options(configuration, options)
        .await
        .expect("failed to build application");
    let connection_pool = application.connection_pool().clone();
    let handle = application.handle();
    let running = tokio::spawn(application.run_until_stopped());

    handle.stop(true).await;
    running
        .await
        .expect("application task panicked")
        .expect("application failed");
    connection_pool
}

#[actix_web::test]
async fn the_pool_stays_open_after_shutdown_when_kept_alive() {
    let connection_pool = run_and_stop(true).await;
    assert!(!connection_pool.is_closed());
}

#[actix_web::test]
async fn the_pool_is_closed_after_shutdown_otherwise() {
    let connection_pool = run_and_stop(false).await;
    assert!(connection_pool.is_closed());
}
