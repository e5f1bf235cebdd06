use dotenv::dotenv;
use scholarship_auth::{config::AppConfig, logging, setup};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init();

    let config = AppConfig::from_env()?;

    let store = setup::setup_database(&config.database).await?;
    let notifier = setup::setup_email_service(&config.email, config.database.backend);
    let lifecycle = setup::build_lifecycle(store, notifier, config.auth);

    let (app, listener) = setup::setup_api_router(lifecycle, config.bind).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
