//! Authentication context.
//!
//! Holds the current session (or none) and notifies subscribers when the
//! signed-in identity changes. Display-name edits for the same user do not
//! count as an identity change.

use crate::models::UserSession;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug)]
pub struct AuthContext {
    tx: watch::Sender<Option<UserSession>>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AuthContext {
    pub fn new(initial: Option<UserSession>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> Option<UserSession> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        self.tx.subscribe()
    }

    /// Replace the session. Returns true when the identity changed.
    pub fn set_session(&self, session: Option<UserSession>) -> bool {
        self.tx.send_if_modified(|current| {
            let identity_changed = current.as_ref().map(|s| &s.user_id)
                != session.as_ref().map(|s| &s.user_id);
            let changed = *current != session;
            *current = session.clone();

            if identity_changed {
                match &session {
                    Some(s) => info!("Session changed: user {}", s.user_id),
                    None => info!("Session cleared"),
                }
            }
            // Only identity changes wake subscribers
            changed && identity_changed
        })
    }

    pub fn sign_in(&self, session: UserSession) -> bool {
        self.set_session(Some(session))
    }

    pub fn sign_out(&self) -> bool {
        self.set_session(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_changes_notify() {
        let auth = AuthContext::default();
        let mut rx = auth.subscribe();
        assert!(!rx.has_changed().unwrap());

        assert!(auth.sign_in(UserSession::new("u1")));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(auth.sign_out());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
    }

    #[test]
    fn test_display_name_change_is_silent() {
        let auth = AuthContext::new(Some(UserSession::new("u1")));
        let rx = auth.subscribe();

        assert!(!auth.sign_in(UserSession::new("u1").with_display_name("Asha")));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(
            auth.current().and_then(|s| s.display_name),
            Some("Asha".to_string())
        );
    }

    #[test]
    fn test_signing_out_twice_is_not_a_change() {
        let auth = AuthContext::default();
        assert!(!auth.sign_out());
    }
}
