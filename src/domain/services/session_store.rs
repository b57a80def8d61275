use tokio::sync::watch;
use tracing::info;

use crate::domain::models::session::{Role, Session};

/// Single observable holder of the current session. Components read the
/// current value or subscribe to changes; nothing is broadcast globally.
pub struct SessionStore {
    tx: watch::Sender<Session>,
}

impl SessionStore {
    pub fn new(initial: Session) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn role(&self) -> Role {
        self.tx.borrow().role
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    pub fn is_privileged(&self) -> bool {
        self.tx.borrow().role.is_privileged()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn sign_in(&self, token: String, role: Role, user_id: Option<String>) {
        info!(role = %role, "Session signed in");
        self.tx.send_replace(Session { token: Some(token), role, user_id });
    }

    pub fn sign_out(&self) {
        info!("Session signed out");
        self.tx.send_replace(Session::anonymous());
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Session::anonymous())
    }
}
