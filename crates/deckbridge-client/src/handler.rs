use std::marker::PhantomData;

use deckbridge_protocol::InboundEvent;

use crate::client::Client;
use crate::error::Result;

/// Responds to one kind of inbound event.
///
/// Implemented for closures `Fn(&Client, &E)` and for any type that wants
/// to implement it directly. Handlers run synchronously on the receive
/// loop, so a slow handler delays every message behind it.
pub trait Handler<E: InboundEvent>: Send + Sync + 'static {
    fn handle(&self, client: &Client, event: &E);
}

impl<E, F> Handler<E> for F
where
    E: InboundEvent,
    F: Fn(&Client, &E) + Send + Sync + 'static,
{
    fn handle(&self, client: &Client, event: &E) {
        self(client, event)
    }
}

/// A handler with its event type erased, stored per event kind.
pub(crate) trait ErasedHandler: Send + Sync {
    /// Decode `message` into the handler's event type and invoke it.
    fn invoke(&self, client: &Client, message: &[u8]) -> Result<()>;
}

pub(crate) struct Typed<E, H> {
    handler: H,
    _event: PhantomData<fn() -> E>,
}

impl<E, H> Typed<E, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _event: PhantomData,
        }
    }
}

impl<E, H> ErasedHandler for Typed<E, H>
where
    E: InboundEvent,
    H: Handler<E>,
{
    fn invoke(&self, client: &Client, message: &[u8]) -> Result<()> {
        let event = E::decode(message)?;
        self.handler.handle(client, &event);
        Ok(())
    }
}
