use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Result, ResponseError};
use crate::error::AppError;
use crate::middlewares::AuthenticatedMobile;
use crate::models::*;
use crate::services::AuthService;

#[utoipa::path(
    get,
    path = "/user",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_details(
    auth_service: web::Data<AuthService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let mobile = req
        .extensions()
        .get::<AuthenticatedMobile>()
        .map(|m| m.0.clone());
    let Some(mobile) = mobile else {
        return Ok(AppError::AuthError("Unauthorized".to_string()).error_response());
    };

    match auth_service.get_user(&mobile).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse { user }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/user", web::get().to(get_user_details));
}
