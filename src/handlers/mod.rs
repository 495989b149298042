pub mod auth;
pub mod user;

pub use auth::auth_config;
pub use user::user_config;

use actix_web::web;

/// All JSON routes under `/api`.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth_config)
            .configure(user_config),
    );
}
