use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct SessionState {
    cart: Mutex<Vec<String>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Vec<String> {
        self.cart().clone()
    }

    pub fn record_purchase(&self, items: &[String]) {
        self.cart().extend(items.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.cart().is_empty()
    }

    fn cart(&self) -> MutexGuard<'_, Vec<String>> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
