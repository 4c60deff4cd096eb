//! Short-lived request tokens behind the inline menu buttons.
//!
//! Each menu button carries `dl:<token>` as callback data. The token maps to a
//! [`PendingRequest`] that is handed out exactly once: [`TokenStore::take`] is an
//! atomic remove-and-return, so a double tap on the same button can never start
//! two downloads.
//!
//! Entries expire after a TTL and the store is capacity-bounded, so menus nobody
//! clicks do not accumulate until the next restart.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::config;
use crate::download::cookies::CredentialRef;
use crate::download::error::WorkflowError;

/// A user's in-flight menu choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub token: String,
    pub source_url: String,
    pub format_id: String,
    /// Display label of the menu entry ("720p")
    pub label: String,
    pub credential_ref: Option<CredentialRef>,
    pub issued_at: Instant,
}

/// Injected store abstraction; the in-memory map is the only implementation today.
pub trait TokenStore: Send + Sync {
    /// Mints a fresh token and stores the request under it.
    fn issue(
        &self,
        source_url: &str,
        format_id: &str,
        label: &str,
        credential_ref: Option<CredentialRef>,
    ) -> PendingRequest;

    /// Atomically removes and returns the request. `None` for unknown,
    /// already consumed, or expired tokens.
    fn take(&self, token: &str) -> Option<PendingRequest>;

    /// Number of stored (possibly expired, not yet swept) entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops expired entries, returning how many were removed.
    fn purge_expired(&self) -> usize;
}

/// Entries to drop so that `len` entries plus one new one fit in `capacity`.
fn eviction_count(len: usize, capacity: usize) -> usize {
    (len + 1).saturating_sub(capacity)
}

/// Mints an opaque token of `config::tokens::TOKEN_LEN` lowercase hex chars.
pub fn mint_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(config::tokens::TOKEN_LEN);
    token
}

/// `DashMap`-backed store. Shard-level locking keeps unrelated tokens from
/// contending with each other.
pub struct MemoryTokenStore {
    entries: DashMap<String, PendingRequest>,
    ttl: Duration,
    capacity: usize,
}

impl MemoryTokenStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Store configured from TOKEN_TTL_SECS / TOKEN_STORE_CAPACITY
    pub fn from_env() -> Self {
        Self::new(*config::tokens::TTL, *config::tokens::CAPACITY)
    }

    fn is_expired(&self, request: &PendingRequest) -> bool {
        request.issued_at.elapsed() >= self.ttl
    }

    /// Sweeps expired entries, then evicts the oldest ones until one slot is free.
    fn make_room(&self) {
        let purged = self.purge_expired();
        if self.entries.len() < self.capacity {
            log::debug!("Token store at capacity, purged {} expired entries", purged);
            return;
        }

        let mut by_age: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().issued_at))
            .collect();
        by_age.sort_by_key(|(_, issued_at)| *issued_at);

        // Other callers may have taken entries since the capacity check.
        let excess = eviction_count(by_age.len(), self.capacity);
        if excess == 0 {
            return;
        }
        for (token, _) in by_age.into_iter().take(excess) {
            self.entries.remove(&token);
        }
        log::warn!(
            "Token store full ({} entries), evicted {} oldest menu tokens",
            self.capacity,
            excess
        );
    }
}

impl TokenStore for MemoryTokenStore {
    fn issue(
        &self,
        source_url: &str,
        format_id: &str,
        label: &str,
        credential_ref: Option<CredentialRef>,
    ) -> PendingRequest {
        if self.entries.len() >= self.capacity {
            self.make_room();
        }

        loop {
            let token = mint_token();
            match self.entries.entry(token.clone()) {
                Entry::Occupied(_) => {
                    log::warn!("Token collision on {}, minting another", token);
                    continue;
                }
                Entry::Vacant(slot) => {
                    let request = PendingRequest {
                        token,
                        source_url: source_url.to_string(),
                        format_id: format_id.to_string(),
                        label: label.to_string(),
                        credential_ref,
                        issued_at: Instant::now(),
                    };
                    slot.insert(request.clone());
                    return request;
                }
            }
        }
    }

    fn take(&self, token: &str) -> Option<PendingRequest> {
        let (_, request) = self.entries.remove(token)?;
        if self.is_expired(&request) {
            log::info!("Token {} presented after expiry", token);
            return None;
        }
        Some(request)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn purge_expired(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, request| {
            let keep = request.issued_at.elapsed() < self.ttl;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

/// Token Resolution: consumes the token or reports `ExpiredOrInvalidToken`.
pub fn resolve_token(store: &dyn TokenStore, token: &str) -> Result<PendingRequest, WorkflowError> {
    store.take(token).ok_or(WorkflowError::ExpiredOrInvalidToken)
}

/// Spawns the periodic sweeper for expired tokens.
pub fn spawn_sweeper(store: Arc<dyn TokenStore>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                log::info!("Swept {} expired menu tokens ({} left)", removed, store.len());
            }
        }
    })
}
