use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use userbase::account::AccountService;
use userbase::config::AppConfig;
use userbase::store::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "userbase=debug,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("createsuperuser") => {
            let email = args
                .next()
                .ok_or_else(|| anyhow::anyhow!("usage: userbase createsuperuser <email> [name]"))?;
            let name = args.next().unwrap_or_default();
            let password = std::env::var("SUPERUSER_PASSWORD")
                .map_err(|_| anyhow::anyhow!("SUPERUSER_PASSWORD must be set"))?;

            let config = AppConfig::from_env()?;
            let db = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;

            // Run migrations if present
            if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                tracing::warn!(error = %e, "migration failed; continuing");
            }

            let service = AccountService::new(Arc::new(PgStore::new(db)));
            let user = service.create_superuser(&email, &password, &name).await?;
            tracing::info!(user_id = %user.id, email = %user.email, "superuser created");
            Ok(())
        }
        _ => anyhow::bail!("usage: userbase createsuperuser <email> [name]"),
    }
}
