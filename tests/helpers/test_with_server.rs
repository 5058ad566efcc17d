use std::sync::Arc;

use cleanup_dispatch::config::AppConfig;
use cleanup_dispatch::database::client::{Database, DbConfig};
use cleanup_dispatch::middleware::mw_ctx::{create_ctx_state, CtxState};
use cleanup_dispatch::services::points_ledger::Tariff;

#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        db_namespace: "test".to_string(),
        db_database: "test".to_string(),
        db_password: None,
        db_username: None,
        db_url: "mem://".to_string(),
        db_retry_attempts: 10,
        jwt_secret: "secret".to_string(),
        jwt_duration_hours: 1,
        port: 0,
        is_development: true,
        uploads_dir: "target/tests_media".to_string(),
        uploads_base_url: "/uploads".to_string(),
        upload_file_size_max_mb: 5,
        tariff: Tariff::default(),
        leaderboard_default_limit: 50,
        leaderboard_max_limit: 200,
        nearby_default_radius_m: 5_000.0,
        nearby_max_radius_m: 50_000.0,
        nearby_default_limit: 20,
        nearby_max_limit: 100,
        geo_cell_degrees: 0.05,
        geo_resync_secs: 0,
        sentry_project_link: None,
    }
}

#[allow(dead_code)]
pub async fn create_test_state(config: &AppConfig) -> Arc<CtxState> {
    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        password: config.db_password.as_deref(),
        username: config.db_username.as_deref(),
        retry_attempts: config.db_retry_attempts,
    })
    .await
    .expect("test db connects");
    db.run_migrations().await.expect("migrations run");
    create_ctx_state(db, config)
}

#[macro_export]
macro_rules! test_with_server {
    ($name:ident, |$server:ident, $ctx_state:ident, $config:ident| $body:block) => {
        #[tokio::test(flavor = "multi_thread")]
        #[serial_test::serial]
        async fn $name() {
            use axum_test::{TestServer, TestServerConfig};
            use futures::FutureExt;
            use std::panic::resume_unwind;

            let $config = $crate::helpers::test_with_server::test_config();
            let $ctx_state = $crate::helpers::test_with_server::create_test_state(&$config).await;

            let routes_all = cleanup_dispatch::init::main_router(&$ctx_state, &$config);

            let $server = TestServer::new_with_config(
                routes_all,
                TestServerConfig {
                    transport: None,
                    save_cookies: true,
                    expect_success_by_default: false,
                    restrict_requests_with_http_schema: false,
                    default_content_type: None,
                    default_scheme: None,
                },
            )
            .expect("Failed to create test server");

            let test_result = std::panic::AssertUnwindSafe(async {
                (|| async $body)().await;
            })
            .catch_unwind()
            .await;

            $ctx_state
                .db
                .client
                .query(format!("REMOVE DATABASE {};", $config.db_database))
                .await
                .expect("failed to remove database");

            if let Err(panic) = test_result {
                resume_unwind(panic);
            }
        }
    };
}
