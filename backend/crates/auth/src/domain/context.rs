//! Request Identity Context
//!
//! The resolved identity travels with the request as an immutable value in
//! its extensions. `None` means no authenticated user.

use axum::http::Extensions;
use kernel::id::UserId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    user_id: Option<UserId>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Copy of this context carrying `user_id`
    pub fn with_user_id(self, user_id: Option<UserId>) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Store the context on the in-flight request
pub fn set_request_context(extensions: &mut Extensions, context: RequestContext) {
    extensions.insert(context);
}

/// Context of the in-flight request; anonymous if none was set
pub fn request_context(extensions: &Extensions) -> RequestContext {
    extensions
        .get::<RequestContext>()
        .copied()
        .unwrap_or_default()
}
