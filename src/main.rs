use anyhow::Context;
// this binary will target "package name"
use app_module::configuration::get_configuration;
use app_module::startup::Application;
use app_module::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber =
        get_subscriber("app_module".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    // Nothing is bound or connected until the environment is valid
    let configuration = get_configuration().map_err(|e| {
        tracing::error! {
            error.cause_chain = ?e,
            error.message = %e,
            "invalid configuration"
        };
        e
    })?;

    let application = Application::build(configuration)
        .await
        .context("Failed to build application")?;
    application.run_until_stopped().await?;
    Ok(())
}
