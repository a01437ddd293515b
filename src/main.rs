use actix_cors::Cors;
use actix_web::{
    middleware::{Logger, NormalizePath},
    web, App, HttpServer,
};
use std::io;
use todo_api::{
    auth::{AuthMiddleware, AuthService},
    config::Config,
    db, routes,
};

fn to_io(error: todo_api::AppError) -> io::Error {
    io::Error::other(error)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io)?;
    let pool = db::create_pool(&config).await.map_err(to_io)?;
    db::run_migrations(&pool).await.map_err(to_io)?;

    let auth = AuthService::from_config(&config);
    let signer = web::Data::new(auth.signer().clone());
    let auth = web::Data::new(auth);
    let pool = web::Data::new(pool);
    let allowed_origins = config.allowed_origins.clone();

    log::info!("Starting todo-api server at {}", config.server_url());
    HttpServer::new(move || {
        let cors = allowed_origins.iter().fold(
            Cors::default()
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
                .max_age(3600),
            |cors, origin| cors.allowed_origin(origin),
        );

        App::new()
            .app_data(pool.clone())
            .app_data(auth.clone())
            .app_data(signer.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
