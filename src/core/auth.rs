//! Authorization policy for privileged bot commands
//!
//! The dispatcher asks the policy before routing an admin command; the
//! download workflow never consults it.

use crate::core::config;

/// Capabilities a chat user may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read bot status (/status)
    ViewStatus,
    /// Replace the global cookies file (/update_cookies)
    ManageCookies,
}

/// Explicit admin list, injected into the handlers instead of read ad hoc.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    admin_ids: Vec<i64>,
}

impl AuthorizationPolicy {
    pub fn new(admin_ids: Vec<i64>) -> Self {
        Self { admin_ids }
    }

    /// Policy built from ADMIN_IDS
    pub fn from_env() -> Self {
        Self::new(config::admin::ADMIN_IDS.clone())
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Every capability is admin-only for now.
    pub fn allows(&self, user_id: i64, capability: Capability) -> bool {
        let allowed = self.is_admin(user_id);
        if !allowed {
            log::warn!("User {} denied {:?}", user_id, capability);
        }
        allowed
    }

    pub fn has_admins(&self) -> bool {
        !self.admin_ids.is_empty()
    }
}
