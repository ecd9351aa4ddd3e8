use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The boundary to the external authentication provider.
pub trait AuthSession: Send + Sync {
    fn is_authenticated(&self) -> bool;

    fn logout(&self);
}

/// Shared signed-in flag, flipped by whoever owns the login flow.
#[derive(Debug, Clone, Default)]
pub struct SessionFlag {
    authenticated: Arc<AtomicBool>,
}

impl SessionFlag {
    pub fn new(authenticated: bool) -> Self {
        Self {
            authenticated: Arc::new(AtomicBool::new(authenticated)),
        }
    }

    pub fn login(&self) {
        self.authenticated.store(true, Ordering::SeqCst);
    }
}

impl AuthSession for SessionFlag {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn logout(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }
}
