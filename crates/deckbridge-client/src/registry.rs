use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use deckbridge_protocol::{EventKind, InboundEvent};

use crate::handler::{ErasedHandler, Handler, Typed};

/// At most one handler per event kind.
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    handlers: RwLock<HashMap<EventKind, Arc<dyn ErasedHandler>>>,
}

impl HandlerRegistry {
    /// Install `handler` for `E::KIND`, returning true if one was replaced.
    pub(crate) fn insert<E, H>(&self, handler: H) -> bool
    where
        E: InboundEvent,
        H: Handler<E>,
    {
        let erased: Arc<dyn ErasedHandler> = Arc::new(Typed::<E, H>::new(handler));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(E::KIND, erased)
            .is_some()
    }

    pub(crate) fn remove(&self, kind: EventKind) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind)
            .is_some()
    }

    pub(crate) fn contains(&self, kind: EventKind) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&kind)
    }

    /// The handler for `kind`; the lock is released before it is invoked.
    pub(crate) fn get(&self, kind: EventKind) -> Option<Arc<dyn ErasedHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
    }
}
