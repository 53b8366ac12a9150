//! Per-session "active order" slot.
//!
//! The workflow itself never touches ambient state: services take the
//! caller's current order id (or none) and hand back the resolved value.
//! This store is the HTTP layer's implementation of that slot, keyed by an
//! opaque cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use dashmap::DashMap;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "pos_session";

#[derive(Debug, Default)]
pub struct SessionStore {
    active_orders: DashMap<Uuid, Uuid>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_order(&self, session_id: Uuid) -> Option<Uuid> {
        self.active_orders.get(&session_id).map(|entry| *entry)
    }

    pub fn set_active_order(&self, session_id: Uuid, order_id: Uuid) {
        self.active_orders.insert(session_id, order_id);
    }

    /// Clears the slot, returning the order id it held. The order rows are
    /// left untouched; finalizing is purely a session-side action.
    pub fn clear_active_order(&self, session_id: Uuid) -> Option<Uuid> {
        self.active_orders.remove(&session_id).map(|(_, v)| v)
    }
}

/// Reads the session id from the cookie jar, minting a new one (and the
/// Set-Cookie to persist it) when absent or unparsable.
pub fn session_id_from_jar(jar: CookieJar) -> (Uuid, CookieJar) {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
    {
        return (id, jar);
    }

    let id = Uuid::new_v4();
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .build();
    (id, jar.add(cookie))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_holds_exactly_one_order_per_session() {
        let store = SessionStore::new();
        let session = Uuid::new_v4();
        assert_eq!(store.active_order(session), None);

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        store.set_active_order(session, first);
        store.set_active_order(session, second);
        assert_eq!(store.active_order(session), Some(second));

        assert_eq!(store.clear_active_order(session), Some(second));
        assert_eq!(store.active_order(session), None);
    }

    #[test]
    fn minted_session_ids_are_stable_once_set() {
        let jar = CookieJar::new();
        let (id, jar) = session_id_from_jar(jar);
        let (again, _) = session_id_from_jar(jar);
        assert_eq!(id, again);
    }
}
