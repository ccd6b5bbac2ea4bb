//! Per-session resolvers.
//!
//! Every checkout session gets its own resolver, and with it its own memo.
//! Resolvers are never shared between sessions. Sessions untouched for longer
//! than the idle TTL are dropped the next time a session is looked up.

use super::resolver::DeliveryFeeResolver;
use crate::distance::DistanceProvider;
use crate::zone::DeliveryZone;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Idle time after which an abandoned checkout session is evicted.
pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct Session {
    resolver: Arc<DeliveryFeeResolver>,
    last_used: Instant,
}

pub struct SessionRegistry {
    provider: Arc<dyn DistanceProvider>,
    fallback_zone: DeliveryZone,
    idle_ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new(provider: Arc<dyn DistanceProvider>, fallback_zone: DeliveryZone) -> Self {
        Self {
            provider,
            fallback_zone,
            idle_ttl: DEFAULT_SESSION_IDLE_TTL,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    /// The resolver for `session_id`, created on first use.
    pub fn resolver(&self, session_id: &str) -> Arc<DeliveryFeeResolver> {
        let mut sessions = self.lock();
        let now = Instant::now();
        evict_idle(&mut sessions, now, self.idle_ttl);

        let session = sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!(session = session_id, "opening resolver session");
            Session {
                resolver: Arc::new(
                    DeliveryFeeResolver::new(self.provider.clone())
                        .with_fallback_zone(self.fallback_zone.clone()),
                ),
                last_used: now,
            }
        });
        session.last_used = now;
        session.resolver.clone()
    }

    /// Drop a session. Returns false if it did not exist.
    pub fn close(&self, session_id: &str) -> bool {
        let removed = self.lock().remove(session_id).is_some();
        if removed {
            debug!(session = session_id, "closed resolver session");
        }
        removed
    }

    /// Clear every session's memo, e.g. after the zone configuration changed.
    pub fn reset_all(&self) {
        for session in self.lock().values() {
            session.resolver.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn evict_idle(sessions: &mut HashMap<String, Session>, now: Instant, idle_ttl: Duration) {
    sessions.retain(|id, session| {
        let keep = now.saturating_duration_since(session.last_used) < idle_ttl;
        if !keep {
            debug!(session = %id, "evicting idle resolver session");
        }
        keep
    });
}
