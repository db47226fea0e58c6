use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::{JwtSettings, PasswordSettings};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{health_check, login, logout, refresh_token, register};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
    password_config: PasswordSettings,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let jwt_config_data = web::Data::new(jwt_config.clone());
    let password_config_data = web::Data::new(password_config);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            // Shared state
            .app_data(connection.clone())
            .app_data(jwt_config_data.clone())
            .app_data(password_config_data.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/Auth")
                    // Public routes
                    .route("/Login", web::post().to(login))
                    .route("/Register", web::post().to(register))
                    .route("/RefreshToken", web::post().to(refresh_token))
                    // Logout identifies the caller from the bearer token
                    .service(
                        web::resource("/Logout")
                            .wrap(JwtMiddleware::new(jwt_config.clone()))
                            .route(web::post().to(logout)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
