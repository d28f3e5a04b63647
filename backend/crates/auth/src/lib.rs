//! Auth (Token Service) Backend Module
//!
//! Stateless authentication with signed, time-bound tokens:
//! - `domain/` - Claims, token pair, per-request identity context
//! - `application/` - Token configuration and the token service
//! - `presentation/` - Identity middleware and extractors
//!
//! ## Security Model
//! - HS256 JWTs carrying the user id as `sub`
//! - Short-lived access token (`session` cookie) and long-lived refresh
//!   token (`refreshToken` cookie)
//! - Cookies are `HttpOnly`, `Secure` and `SameSite=Strict`
//! - No server-side session table

pub mod application;
pub mod domain;
pub mod error;
pub mod presentation;

pub use application::config::TokenConfig;
pub use application::token_service::TokenService;
pub use domain::context::{RequestContext, request_context, set_request_context};
pub use domain::token::{Strictness, TokenKind, TokenPair};
pub use error::{AuthError, AuthResult};
pub use presentation::extractor::{CurrentUser, MaybeUser};
pub use presentation::middleware::resolve_identity;
