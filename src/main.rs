use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use taskforge::{routes, store::Stores, AppState, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let stores = match Stores::connect(&config).await {
        Ok(stores) => stores,
        Err(e) => {
            log::error!("could not open the store: {}", e);
            std::process::exit(1);
        }
    };

    let state = web::Data::new(AppState::new(&config, stores));
    let bind_addr = (config.server_host.clone(), config.server_port);

    log::info!("Starting TaskForge server at {}", config.server_url());
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();
        let verifier = state.verifier.clone();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .service(routes::health::health)
            .configure(|cfg| routes::config(cfg, verifier))
    })
    .bind(bind_addr)?
    .run()
    .await
}
