use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use splitsettle::{routes, Config, SettlementEngine};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "Failed to load configuration");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, err));
        }
    };
    info!(
        host = %config.host,
        port = config.port,
        policy = ?config.reference_policy,
        "Starting splitsettle"
    );

    let state = web::Data::new(routes::AppState::new(SettlementEngine::new(
        config.reference_policy,
    )));
    let allowed_origin = config.allowed_origin.clone();

    HttpServer::new(move || {
        let cors = match &allowed_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header(),
            None => Cors::permissive(),
        };

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(config.bind_address())?
    .run()
    .await
}
