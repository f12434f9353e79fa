//! Observable signed-in session state.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier that scopes stored records.
    pub id: String,
    /// Contact email, if known.
    pub email: Option<String>,
}

/// Snapshot delivered to session listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Current user, if signed in.
    pub user: Option<User>,
    /// True while the session is being resolved.
    pub is_loading: bool,
}

type Listener = Arc<dyn Fn(&SessionState) + Send + Sync>;

struct HubInner {
    state: SessionState,
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

/// Publishes session transitions to subscribed listeners.
///
/// Starts in the loading state with no user. Deliveries are serialized, so
/// every listener sees transitions in the order they were applied. Listeners
/// may read [`state`](Self::state) but must not subscribe or publish from
/// inside the callback.
#[derive(Clone)]
pub struct SessionHub {
    inner: Arc<Mutex<HubInner>>,
    delivery: Arc<Mutex<()>>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHub")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl SessionHub {
    /// Creates a hub in the loading state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                state: SessionState {
                    user: None,
                    is_loading: true,
                },
                listeners: Vec::new(),
                next_id: 0,
            })),
            delivery: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        lock(&self.inner).state.clone()
    }

    /// Registers `listener`; it receives the current state immediately and
    /// every later transition until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        let _delivery = self.lock_delivery();
        let (id, current) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Arc::clone(&listener)));
            (id, inner.state.clone())
        };
        listener(&current);
        Subscription {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Marks `user` as signed in.
    pub fn sign_in(&self, user: User) {
        debug!(user_id = %user.id, "session signed in");
        self.publish(SessionState {
            user: Some(user),
            is_loading: false,
        });
    }

    /// Clears the current user.
    pub fn sign_out(&self) {
        debug!("session signed out");
        self.publish(SessionState {
            user: None,
            is_loading: false,
        });
    }

    /// Marks the session as resolving, keeping the current user.
    pub fn set_loading(&self) {
        let user = self.state().user;
        self.publish(SessionState {
            user,
            is_loading: true,
        });
    }

    fn publish(&self, state: SessionState) {
        // Held from the state update until every listener has run
        let _delivery = self.lock_delivery();
        let listeners: Vec<Listener> = {
            let mut inner = lock(&self.inner);
            inner.state = state.clone();
            inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in listeners {
            listener(&state);
        }
    }

    fn lock_delivery(&self) -> std::sync::MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle returned by [`SessionHub::subscribe`]; dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    hub: Weak<Mutex<HubInner>>,
    id: u64,
}

impl Subscription {
    /// Stops delivery to this listener.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            lock(&inner).listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

fn lock(inner: &Mutex<HubInner>) -> std::sync::MutexGuard<'_, HubInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
