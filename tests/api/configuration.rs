use app_module::configuration::{
    get_configuration_with_env_file, ConfigurationError, Environment,
};
use app_module::database::connection_options;
use claim::{assert_err, assert_ok};
use fake::faker::internet::en::{Password, Username};
use fake::faker::lorem::en::Word;
use fake::Fake;
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::helpers::{
    environment_without, init_tracing, load, test_environment,
};

fn with(key: &str, value: &str) -> Vec<(String, String)> {
    let mut vars = environment_without(key);
    vars.push((key.to_string(), value.to_string()));
    vars
}

#[test]
fn a_missing_db_password_is_named_in_the_error() {
    let error = load(environment_without("DB_PASSWORD")).unwrap_err();

    assert_eq!(error.keys(), vec!["DB_PASSWORD"]);
    assert!(matches!(error, ConfigurationError::Invalid(_)));
    assert!(error.to_string().contains("DB_PASSWORD"));
}

#[test]
fn every_required_key_is_enforced() {
    for key in [
        "SECRET_KEY",
        "ADMIN_USER",
        "ADMIN_PASSWORD",
        "DB_USERNAME",
        "DB_PASSWORD",
        "DB_HOST",
        "DB_PORT",
        "DB_NAME",
    ] {
        let error = load(environment_without(key)).unwrap_err();
        assert_eq!(error.keys(), vec![key]);
    }
}

#[test]
fn unsupported_node_env_is_rejected() {
    for value in ["staging", "local", "PRODUCTION", ""] {
        let error = load(with("NODE_ENV", value)).unwrap_err();
        assert_eq!(error.keys(), vec!["NODE_ENV"], "NODE_ENV={:?}", value);
    }
}

#[test]
fn defaults_apply_when_port_and_node_env_are_absent() {
    let vars: Vec<_> = environment_without("PORT")
        .into_iter()
        .filter(|(k, _)| k != "NODE_ENV")
        .collect();

    let settings = assert_ok!(load(vars));
    assert_eq!(settings.application.port, 5000);
    assert_eq!(settings.application.environment, Environment::Development);
}

#[test]
fn a_database_port_out_of_range_is_rejected() {
    assert_err!(load(with("DB_PORT", "99999")));
}

#[actix_web::test]
async fn connection_options_match_the_environment_verbatim() {
    for _ in 0..10 {
        let username: String = Username().fake();
        let password: String = Password(8..24).fake();
        let host: String = Word().fake();
        let database: String = Word().fake();
        let port: u16 = (1..u16::MAX).fake();

        let mut vars = test_environment();
        vars.retain(|(k, _)| !k.starts_with("DB_"));
        vars.extend([
            ("DB_USERNAME".to_string(), username.clone()),
            ("DB_PASSWORD".to_string(), password.clone()),
            ("DB_HOST".to_string(), host.clone()),
            ("DB_PORT".to_string(), port.to_string()),
            ("DB_NAME".to_string(), database.clone()),
        ]);

        let settings = load(vars).expect("valid environment");
        let options = connection_options(&settings).await;

        assert_eq!(options.username, username);
        assert_eq!(options.password.expose_secret(), &password);
        assert_eq!(options.host, host);
        assert_eq!(options.port, port);
        assert_eq!(options.database, database);
        assert_eq!(options.engine.as_str(), "postgres");
        assert_eq!(connection_options(&settings).await, options);
    }
}

#[test]
fn env_file_fills_gaps_but_never_overrides_the_process_environment() {
    init_tracing();
    let env_file =
        std::env::temp_dir().join(format!("{}.env", Uuid::new_v4()));
    std::fs::write(
        &env_file,
        "SECRET_KEY=file-secret\n\
         ADMIN_USER=file-admin\n\
         ADMIN_PASSWORD=file-admin-password\n\
         DB_USERNAME=file-user\n\
         DB_PASSWORD=file-password\n\
         DB_HOST=file-host\n\
         DB_PORT=5432\n\
         DB_NAME=file_db\n",
    )
    .expect("Failed to write the environment file");
    std::env::set_var("DB_HOST", "process-host");

    let settings = get_configuration_with_env_file(&env_file);
    std::fs::remove_file(&env_file).ok();
    let settings = settings.expect("failed to read configuration.");

    assert_eq!(settings.database.host, "process-host");
    assert_eq!(settings.database.database_name, "file_db");
    assert_eq!(settings.database.password.expose_secret(), "file-password");
}
