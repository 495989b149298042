use actix_web::{web, HttpRequest, HttpResponse, Result, ResponseError};
use crate::models::*;
use crate::services::AuthService;
use crate::utils::fingerprint_device;

/// `X-Device-ID` when the client sends one, otherwise a fingerprint of its
/// user agent and address.
fn resolve_device_id(req: &HttpRequest) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };

    let device_id = header("X-Device-ID");
    if !device_id.is_empty() {
        return device_id;
    }

    let ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or_default()
        .to_string();
    fingerprint_device(&header("User-Agent"), &ip)
}

fn otp_sent(sent: SendOtpResponse) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success_with_message(
        sent,
        "OTP sent successfully".to_string(),
    ))
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    params(
        ("X-Device-ID" = Option<String>, Header, description = "Client device identifier")
    ),
    responses(
        (status = 200, description = "OTP sent successfully", body = SendOtpResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User already registered"),
        (status = 429, description = "OTP already sent, try again later"),
        (status = 500, description = "Failed to register user")
    )
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    req: HttpRequest,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let device_id = resolve_device_id(&req);
    match auth_service.register(request.into_inner(), device_id).await {
        Ok(sent) => Ok(otp_sent(sent)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "OTP sent, or session token when a valid OTP was given", body = LoginResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Account not verified or invalid OTP"),
        (status = 404, description = "User not found"),
        (status = 429, description = "OTP already sent, try again later")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(LoginOutcome::OtpSent(sent)) => Ok(otp_sent(sent)),
        Ok(LoginOutcome::Authenticated(session)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(session)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/verify-otp",
    tag = "auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Account verified", body = VerifyOtpResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Invalid or expired OTP")
    )
)]
pub async fn verify_otp(
    auth_service: web::Data<AuthService>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse> {
    match auth_service.verify_otp(request.into_inner()).await {
        Ok(verified) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            verified,
            "Account verified. You can now login.".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/resend-otp",
    tag = "auth",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "OTP sent successfully", body = SendOtpResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found"),
        (status = 429, description = "OTP already sent, try again later")
    )
)]
pub async fn resend_otp(
    auth_service: web::Data<AuthService>,
    request: web::Json<ResendOtpRequest>,
) -> Result<HttpResponse> {
    match auth_service.resend_otp(request.into_inner()).await {
        Ok(sent) => Ok(otp_sent(sent)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/verify-otp", web::post().to(verify_otp))
        .route("/resend-otp", web::post().to(resend_otp));
}
