//! Listener registry for circuit breaker state transitions

use crate::window::State;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

/// Observer of realized state transitions
///
/// Each transition is delivered once to every listener registered at the time
/// it is published. Listeners run on the thread that caused the transition,
/// after the new state is visible, so they may call back into the breaker.
pub trait StateListener: Send + Sync {
    fn on_transition(&self, circuit: &str, from: State, to: State);
}

impl<F> StateListener for F
where
    F: Fn(&str, State, State) + Send + Sync,
{
    fn on_transition(&self, circuit: &str, from: State, to: State) {
        self(circuit, from, to)
    }
}

/// Identity-distinct set of listeners
#[derive(Default)]
pub struct Notifier {
    listeners: RwLock<Vec<Arc<dyn StateListener>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; returns `false` if this exact `Arc` is already present
    pub fn add(&self, listener: Arc<dyn StateListener>) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Unregister `listener`; returns `false` if it was not registered
    pub fn remove(&self, listener: &Arc<dyn StateListener>) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let before = listeners.len();
        listeners.retain(|l| !same_listener(l, listener));
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `from -> to` to a snapshot of the registered listeners
    ///
    /// The registry lock is released before any listener runs. A panicking
    /// listener is logged and skipped; the rest are still invoked.
    pub fn notify(&self, circuit: &str, from: State, to: State) {
        let snapshot: Vec<Arc<dyn StateListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in snapshot {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                listener.on_transition(circuit, from, to)
            }));

            if let Err(payload) = result {
                tracing::error!(
                    circuit,
                    %from,
                    %to,
                    panic = panic_message(&*payload),
                    "state listener panicked"
                );
            }
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.len())
            .finish()
    }
}

// Compares data pointers only; vtable pointers for one type may differ across codegen units
fn same_listener(a: &Arc<dyn StateListener>, b: &Arc<dyn StateListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}
