//! Identity Middleware
//!
//! Resolves the access token on every request and stores the resulting
//! `RequestContext`. A present but invalid token is rejected with 401.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::application::token_service::TokenService;
use crate::domain::context::{RequestContext, set_request_context};
use crate::domain::token::{Strictness, TokenKind};
use crate::error::AuthError;

pub async fn resolve_identity(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let user_id = tokens.extract_user_id(req.headers(), Strictness::Lenient, TokenKind::Access)?;

    if let Some(id) = user_id {
        tracing::trace!(user_id = %id, "Resolved request identity");
    }

    set_request_context(
        req.extensions_mut(),
        RequestContext::anonymous().with_user_id(user_id),
    );

    Ok(next.run(req).await)
}
