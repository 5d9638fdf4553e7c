use velo_auth::config::load_config;
use velo_auth::startup::{build_auth_service, run};
use velo_auth::types::StartupError;
use velo_auth::{SERVICE_NAME, VERSION};

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            env_logger::init();
            log::error!("Failed to load configuration: {}", e);
            return Err(e);
        },
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    log::info!("Starting {} v{}", SERVICE_NAME, VERSION);

    let service = build_auth_service(&config.backend)?;
    run(&config, service)?.await?;

    Ok(())
}
