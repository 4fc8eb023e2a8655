use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use deckbridge_protocol::{
    read_tag, ApplicationInfo, Command, Device, DeviceDidConnectEvent, DeviceDidDisconnectEvent,
    EventKind, EventTag, InboundEvent, Registration, RegistrationInfo, Target,
};
use deckbridge_transport::{Connector, Endpoint, Received, Transport, TransportError, WsConnector};
use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::devices::DeviceRegistry;
use crate::error::{ClientError, Result};
use crate::handler::Handler;
use crate::registry::HandlerRegistry;
use crate::state::ClientState;

/// What [`Client::dispatch`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A registered handler ran.
    Handled(EventKind),
    /// The event is known but no handler is registered for it.
    Unhandled(EventKind),
    /// The tag was missing or not a known event; the message was ignored.
    Unknown,
}

struct Session {
    state: ClientState,
    transport: Option<Arc<dyn Transport>>,
}

/// A plugin's connection to the host.
///
/// Shareable across threads: one thread blocks in [`run`](Self::run) while
/// others send commands or call [`stop`](Self::stop). Sends are serialized
/// so each message reaches the host whole.
pub struct Client {
    plugin_uuid: String,
    register_event: String,
    endpoint: Endpoint,
    application: ApplicationInfo,
    connector: Box<dyn Connector>,
    handlers: HandlerRegistry,
    devices: DeviceRegistry,
    session: Mutex<Session>,
    send_lock: Mutex<()>,
    started: AtomicBool,
}

impl Client {
    /// Validate `config` and prepare a client that connects over WebSocket.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_connector(config, WsConnector)
    }

    /// Like [`new`](Self::new), connecting through `connector` instead.
    pub fn with_connector(config: ClientConfig, connector: impl Connector + 'static) -> Result<Self> {
        let endpoint = config.endpoint()?;
        let info = RegistrationInfo::parse(&config.info)?;

        debug!(
            %endpoint,
            plugin_uuid = %config.plugin_uuid,
            devices = info.devices.len(),
            "client configured"
        );

        Ok(Self {
            plugin_uuid: config.plugin_uuid,
            register_event: config.register_event,
            endpoint,
            application: info.application,
            connector: Box::new(connector),
            handlers: HandlerRegistry::default(),
            devices: DeviceRegistry::from_devices(info.devices),
            session: Mutex::new(Session {
                state: ClientState::Configured,
                transport: None,
            }),
            send_lock: Mutex::new(()),
            started: AtomicBool::new(false),
        })
    }

    /// Register `handler` for events of type `E`, replacing any earlier one.
    ///
    /// Handlers may be registered before or during [`run`](Self::run).
    pub fn on<E, H>(&self, handler: H)
    where
        E: InboundEvent,
        H: Handler<E>,
    {
        if self.handlers.insert::<E, H>(handler) {
            debug!(event = %E::KIND, "replaced event handler");
        }
    }

    /// Remove the handler for `kind`, returning whether one was registered.
    pub fn off(&self, kind: EventKind) -> bool {
        self.handlers.remove(kind)
    }

    pub fn has_handler(&self, kind: EventKind) -> bool {
        self.handlers.contains(kind)
    }

    /// Connect, register, and process messages until the session ends.
    ///
    /// Blocks the calling thread. Returns `Ok(())` when the host closes the
    /// connection normally or [`stop`](Self::stop) is called, and an error
    /// when connecting, registering, or reading fails. The client is
    /// stopped on return; it cannot be run again.
    pub fn run(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ClientError::NotConnected {
                state: self.state(),
            });
        }

        let state = self.state();
        if state != ClientState::Configured {
            return Err(ClientError::NotConnected { state });
        }

        let transport = match self.connector.connect(&self.endpoint) {
            Ok(transport) => transport,
            Err(err) => {
                self.session().state = ClientState::Stopped;
                return Err(ClientError::Connection(err));
            }
        };

        info!(endpoint = %self.endpoint, "connected to host");

        // The transport is published only after the handshake, so no command
        // can reach the host ahead of it.
        if let Err(err) = self.register(transport.as_ref()) {
            let _ = transport.close();
            let mut session = self.session();
            let stopped = session.state == ClientState::Stopped;
            session.state = ClientState::Stopped;
            return if stopped { Ok(()) } else { Err(err) };
        }

        {
            let mut session = self.session();
            if session.state == ClientState::Stopped {
                drop(session);
                debug!("stopped while connecting");
                let _ = transport.close();
                return Ok(());
            }
            session.state = ClientState::Connected;
            session.transport = Some(Arc::clone(&transport));
        }

        {
            let mut session = self.session();
            if session.state == ClientState::Connected {
                session.state = ClientState::Running;
            }
        }

        let outcome = self.receive_loop(transport.as_ref());
        self.stop();
        outcome
    }

    fn register(&self, transport: &dyn Transport) -> Result<()> {
        let message = Registration::new(&self.register_event, &self.plugin_uuid).to_message()?;
        let _guard = lock(&self.send_lock);
        transport.send(&message).map_err(ClientError::Write)?;
        debug!(event = %self.register_event, "sent registration");
        Ok(())
    }

    fn receive_loop(&self, transport: &dyn Transport) -> Result<()> {
        loop {
            match transport.receive() {
                Ok(Received::Message(message)) => {
                    if let Err(err) = self.dispatch(&message) {
                        warn!(error = %err, "dropping message that failed to dispatch");
                    }
                }
                Ok(Received::Closed) | Err(TransportError::Closed) => {
                    info!("connection closed");
                    return Ok(());
                }
                Err(err) => {
                    if self.state() == ClientState::Stopped {
                        return Ok(());
                    }
                    warn!(error = %err, "receive loop ended");
                    return Err(ClientError::Read(err));
                }
            }
        }
    }

    /// Close the connection and end the receive loop.
    ///
    /// Safe to call from any thread, at any time, any number of times.
    /// Commands sent afterwards fail with [`ClientError::NotConnected`].
    pub fn stop(&self) {
        let (previous, transport) = {
            let mut session = self.session();
            let previous = session.state;
            session.state = ClientState::Stopped;
            (previous, session.transport.take())
        };

        if let Some(transport) = transport {
            match transport.close() {
                Ok(()) => debug!(from = %previous, "client stopped"),
                Err(err) => warn!(error = %err, "error closing connection"),
            }
        }
    }

    /// Route one inbound message to its handler.
    ///
    /// Device bookkeeping for connect and disconnect events happens first,
    /// whether or not a handler is registered, so the handler already sees
    /// the updated registry.
    pub fn dispatch(&self, message: &[u8]) -> Result<DispatchOutcome> {
        let kind = match read_tag(message)? {
            EventTag::Known(kind) => kind,
            EventTag::Unknown(tag) => {
                debug!(%tag, "ignoring unknown event");
                return Ok(DispatchOutcome::Unknown);
            }
            EventTag::Missing => {
                debug!("ignoring message without an event tag");
                return Ok(DispatchOutcome::Unknown);
            }
        };
        trace!(event = %kind, bytes = message.len(), "received event");

        match kind {
            EventKind::DeviceDidConnect => {
                let event = DeviceDidConnectEvent::decode(message)?;
                self.devices.insert(Device::new(
                    event.device,
                    event.device_info.device_type,
                    event.device_info.size,
                ));
            }
            EventKind::DeviceDidDisconnect => {
                let event = DeviceDidDisconnectEvent::decode(message)?;
                self.devices.remove(&event.device);
            }
            _ => {}
        }

        let Some(handler) = self.handlers.get(kind) else {
            return Ok(DispatchOutcome::Unhandled(kind));
        };
        handler.invoke(self, message)?;
        Ok(DispatchOutcome::Handled(kind))
    }

    /// Serialize and send one command to the host.
    pub fn send_command(&self, command: &Command) -> Result<()> {
        let transport = self.connected_transport()?;
        let message = command.to_message()?;

        let _guard = lock(&self.send_lock);
        transport.send(&message).map_err(ClientError::Write)?;
        trace!(command = command.name(), "sent command");
        Ok(())
    }

    pub fn open_url(&self, url: &str) -> Result<()> {
        self.send_command(&Command::open_url(url))
    }

    pub fn send_to_property_inspector(&self, context: &str, action: &str, payload: Value) -> Result<()> {
        self.send_command(&Command::send_to_property_inspector(context, action, payload))
    }

    pub fn set_image(&self, context: &str, image: &str, target: Target) -> Result<()> {
        self.send_command(&Command::set_image(context, image, target))
    }

    pub fn set_title(&self, context: &str, title: &str, target: Target) -> Result<()> {
        self.send_command(&Command::set_title(context, title, target))
    }

    pub fn show_alert(&self, context: &str) -> Result<()> {
        self.send_command(&Command::show_alert(context))
    }

    pub fn show_ok(&self, context: &str) -> Result<()> {
        self.send_command(&Command::show_ok(context))
    }

    pub fn set_settings(&self, context: &str, settings: Value) -> Result<()> {
        self.send_command(&Command::set_settings(context, settings))
    }

    pub fn set_state(&self, context: &str, state: u32) -> Result<()> {
        self.send_command(&Command::set_state(context, state))
    }

    pub fn switch_to_profile(&self, context: &str, device: &str, profile: &str) -> Result<()> {
        self.send_command(&Command::switch_to_profile(context, device, profile))
    }

    pub fn state(&self) -> ClientState {
        self.session().state
    }

    pub fn language(&self) -> &str {
        &self.application.language
    }

    pub fn platform(&self) -> &str {
        &self.application.platform
    }

    pub fn version(&self) -> &str {
        &self.application.version
    }

    pub fn application(&self) -> &ApplicationInfo {
        &self.application
    }

    /// The attached device with this ID, if any.
    pub fn device(&self, id: &str) -> Option<Device> {
        self.devices.get(id)
    }

    /// All attached devices, sorted by ID.
    pub fn devices(&self) -> Vec<Device> {
        self.devices.snapshot()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn plugin_uuid(&self) -> &str {
        &self.plugin_uuid
    }

    fn connected_transport(&self) -> Result<Arc<dyn Transport>> {
        let session = self.session();
        match (&session.transport, session.state) {
            (Some(transport), state) if state.is_connected() => Ok(Arc::clone(transport)),
            (_, state) => Err(ClientError::NotConnected { state }),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        lock(&self.session)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("plugin_uuid", &self.plugin_uuid)
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .field("devices", &self.devices.len())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
