use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;

/// Caller identity propagated by the upstream BFF.
///
/// The frontend authenticates the clerk and forwards the identity in the
/// X-User-ID header; the gateway never sees credentials. The identity is
/// only used for authorization checks and trace attribution.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("X-User-ID")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!(
                    "Missing X-User-ID header (required from BFF)"
                ))
            })?;

        // Add to tracing span for observability
        tracing::Span::current().record("user_id", user_id);

        Ok(UserId(user_id.to_string()))
    }
}
