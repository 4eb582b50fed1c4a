use std::io;

use dotenvy::dotenv;
use pedidos_service::{build_server, build_state, create_pool, run_migrations, ServerConfig};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = ServerConfig::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    if config.expose_internal_errors {
        log::warn!("Internal error messages are returned to clients (EXPOSE_INTERNAL_ERRORS)");
    }
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = build_state(&config, pool);
    build_server(state, &config.host, config.port)?.await
}
