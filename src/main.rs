use actix_web::{App, HttpServer, middleware::Logger, web};
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use chrono::Local;  // timestamp in log lines
use std::sync::Arc;

use otp_auth_backend::{
    config::Config,
    database::{create_cache, create_pool, run_migrations},
    external::TwilioService,
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::{AuthService, OtpService},
    stores::{RedisStore, SeaOrmCredentialStore},
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");

    // Refuse to start without a signing secret
    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.expires_in)
        .expect("Invalid JWT configuration");

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let cache = create_cache(&config.redis)
        .await
        .expect("Failed to connect to redis");

    if config.otp.cooldown_fail_open {
        log::warn!("OTP cooldown is fail-open: cache errors during admission will not block issuance");
    }

    let otp_service = OtpService::new(
        Arc::new(RedisStore::new(cache)),
        Arc::new(TwilioService::new(config.twilio.clone())),
        config.otp.clone(),
        config.twilio.default_country_code.clone(),
    );
    let auth_service = AuthService::new(
        Arc::new(SeaOrmCredentialStore::new(pool)),
        otp_service,
        jwt_service.clone(),
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(auth_service.clone()))
            .configure(swagger_config)
            .configure(handlers::api_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
