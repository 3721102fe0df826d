//! Actix-web extractor for bearer token authentication.
//!
//! The token from the `Authorization: Bearer <token>` header is wrapped in
//! `SecretString` immediately and is never logged.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use secrecy::SecretString;

use crate::error::AppError;
use crate::models::UserIdentity;
use crate::services::OccurrenceService;

/// Extract the bearer token, if the header is present and well-formed.
fn extract_bearer_token(req: &HttpRequest) -> Option<SecretString> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.split_once(' ')?;
            if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
                Some(SecretString::from(token.trim().to_string()))
            } else {
                None
            }
        })
}

/// Extractor that requires a valid bearer token for an existing user.
///
/// ```ignore
/// async fn protected_handler(auth: BearerAuth) -> impl Responder {
///     // auth.identity is the resolved caller
/// }
/// ```
pub struct BearerAuth {
    pub identity: UserIdentity,
}

impl FromRequest for BearerAuth {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let service = req.app_data::<web::Data<OccurrenceService>>().cloned();
        let token = extract_bearer_token(req);

        Box::pin(async move {
            let service = service
                .ok_or_else(|| AppError::Internal("Occurrence service not configured".into()))?;
            let token = token
                .ok_or_else(|| AppError::Unauthenticated("missing bearer token".into()))?;

            let identity = service.authenticate_bearer(&token).await?;
            Ok(BearerAuth { identity })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use secrecy::ExposeSecret;

    #[test]
    fn test_extract_bearer_token() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(
            extract_bearer_token(&req).unwrap().expose_secret(),
            "abc.def.ghi"
        );

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "bearer xyz"))
            .to_http_request();
        assert!(extract_bearer_token(&req).is_some());
    }

    #[test]
    fn test_extract_rejects_other_schemes() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert!(extract_bearer_token(&req).is_none());

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert!(extract_bearer_token(&req).is_none());

        assert!(extract_bearer_token(&TestRequest::default().to_http_request()).is_none());
    }
}
