//! Credential API handlers
//!
//! Thin HTTP adapters over `AuthService`. Errors render through
//! `AuthError`'s `ResponseError` implementation.

use crate::auth::dto::{
    ChangePasswordRequest, EvaluatePasswordRequest, EvaluatePasswordResponse, LoginRequest,
    MessageResponse, SignUpRequest, SignUpResponse,
};
use crate::auth::error::AuthError;
use crate::auth::service::AuthService;
use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

/// Evaluate a candidate password for live checklist feedback
pub async fn evaluate_password(
    service: web::Data<AuthService>,
    payload: web::Json<EvaluatePasswordRequest>,
) -> HttpResponse {
    let requirements = service.evaluate_password(&payload.password);
    HttpResponse::Ok().json(EvaluatePasswordResponse::from(requirements))
}

/// Create an account
pub async fn sign_up(
    service: web::Data<AuthService>,
    payload: web::Json<SignUpRequest>,
) -> Result<HttpResponse, AuthError> {
    let result = service.sign_up(&payload).await?;

    Ok(HttpResponse::Created().json(SignUpResponse {
        account_id: result.account.id,
        email: result.account.email,
        confirmation_required: result.session.is_none(),
    }))
}

/// Sign in with email and password
pub async fn login(
    service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    payload.validate()?;
    let session = service.sign_in(&payload.email, &payload.password).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// Change the password of the bearer's account
pub async fn change_password(
    req: HttpRequest,
    service: web::Data<AuthService>,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AuthError> {
    let token = extract_bearer_token(&req).ok_or(AuthError::MissingToken)?;
    service.change_password_with_token(token, &payload).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}

/// Sign out the bearer's session
pub async fn logout(
    req: HttpRequest,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let token = extract_bearer_token(&req).ok_or(AuthError::MissingToken)?;
    service.sign_out(token).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Signed out successfully".to_string(),
    }))
}

/// Attempts to extract the Bearer token from the Authorization header
fn extract_bearer_token(req: &HttpRequest) -> Option<&str> {
    let auth_header = req.headers().get("Authorization")?.to_str().ok()?;
    auth_header.strip_prefix("Bearer ").map(str::trim).filter(|token| !token.is_empty())
}
