//! Handler types and dependencies

use std::sync::Arc;
use std::time::Instant;

use teloxide::types::Message;

use crate::core::auth::AuthorizationPolicy;
use crate::download::cookies::CookieProvider;
use crate::download::Workflow;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub workflow: Arc<Workflow>,
    pub cookies: CookieProvider,
    pub auth: AuthorizationPolicy,
    pub started_at: Instant,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(workflow: Arc<Workflow>, cookies: CookieProvider, auth: AuthorizationPolicy) -> Self {
        Self {
            workflow,
            cookies,
            auth,
            started_at: Instant::now(),
        }
    }
}

/// Telegram user id of the sender, 0 for channel posts and anonymous admins
pub fn sender_id(msg: &Message) -> u64 {
    msg.from.as_ref().map(|u| u.id.0).unwrap_or(0)
}
