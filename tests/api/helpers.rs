use once_cell::sync::Lazy;
use sqlx::PgPool;

use app_module::configuration::{ConfigurationError, Settings};
use app_module::startup::Application;
use app_module::telemetry::{
    get_line_subscriber, get_subscriber, init_subscriber,
};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    // The sink is part of the type returned by `get_subscriber`, so each
    // branch has to initialise its own subscriber.
    match std::env::var("TEST_LOG") {
        Ok(v) => {
            if v == "json" {
                init_subscriber(get_subscriber(
                    subscriber_name,
                    default_filter_level,
                    std::io::stdout,
                ));
            } else {
                init_subscriber(get_line_subscriber(
                    default_filter_level,
                    std::io::stdout,
                ));
            }
        }
        _ => {
            let subscriber = get_subscriber(
                subscriber_name,
                default_filter_level,
                std::io::sink,
            );
            init_subscriber(subscriber);
        }
    };
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db_pool: PgPool,
}

/// A complete environment pointing at a database nobody listens on.
pub fn test_environment() -> Vec<(String, String)> {
    [
        ("NODE_ENV", "test"),
        ("PORT", "0"),
        ("SECRET_KEY", "test-secret"),
        ("ADMIN_USER", "admin@example.com"),
        ("ADMIN_PASSWORD", "admin-password"),
        ("DB_USERNAME", "postgres"),
        ("DB_PASSWORD", "password"),
        ("DB_HOST", "127.0.0.1"),
        ("DB_PORT", "5432"),
        ("DB_NAME", "app_test"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn environment_without(key: &str) -> Vec<(String, String)> {
    test_environment()
        .into_iter()
        .filter(|(k, _)| k != key)
        .collect()
}

pub fn init_tracing() {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);
}

pub fn load(
    vars: Vec<(String, String)>,
) -> Result<Settings, ConfigurationError> {
    init_tracing();
    Settings::from_environment(vars)
}

pub async fn spawn_app() -> TestApp {
    let configuration =
        load(test_environment()).expect("failed to read configuration.");

    // Launch the application as the background task
    let application = Application::build(configuration)
        .await
        .expect("failed to build application");
    let application_port = application.port();
    let db_pool = application.connection_pool().clone();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        port: application_port,
        db_pool,
    }
}
