use actix_cors::Cors;
use actix_web::http::header;

pub fn create_cors() -> Cors {
    Cors::default()
        // TODO: restrict origins once the mobile web client has a fixed domain
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allowed_header("X-Device-ID")
        .expose_headers(vec![header::RETRY_AFTER])
        .max_age(3600)
}
