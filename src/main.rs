use actix_web::{App, HttpServer, web::Data};
use actix_files as fs;
use dotenv::dotenv;
use log::{info, error};
use tera::Tera;

use chatbot_web_app::backend::BackendClient;
use chatbot_web_app::config::AppConfig;
use chatbot_web_app::web::routes;
use chatbot_web_app::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting chatbot web application");

    // Resolve configuration before anything binds or connects
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("Forwarding to chat backend at: {}", config.backend_url);

    // Initialize template engine
    let mut tera = match Tera::new("templates/**/*") {
        Ok(t) => t,
        Err(e) => {
            error!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    tera.autoescape_on(vec![".html"]);

    // Create app state
    let app_state = Data::new(AppState::new(
        tera,
        BackendClient::new(config.backend_url.clone()),
    ));

    // Start web server
    info!("Listening on {}", config.bind_addr);
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", "./static"))
    })
    .bind(config.bind_addr)?
    .run()
    .await
}
