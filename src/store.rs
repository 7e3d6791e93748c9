use std::sync::Arc;

use tokio::sync::watch;

use crate::session::Session;

/// Shared holder of the current [`Session`].
///
/// Clones share state. Reads never go stale; subscribers are woken on
/// every replacement. Only the [`SessionController`](crate::SessionController)
/// writes to it.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    /// Create an independent store holding the signed-out session.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::signed_out());
        Self { tx: Arc::new(tx) }
    }

    /// Latest session value.
    #[must_use]
    pub fn read(&self) -> Session {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated()
    }

    /// Receiver notified whenever the session is replaced.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Swap in a new session, returning the previous one.
    pub(crate) fn replace(&self, session: Session) -> Session {
        self.tx.send_replace(session)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
