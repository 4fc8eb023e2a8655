use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use deckbridge_protocol::Device;

/// Devices currently attached to the host, keyed by device ID.
///
/// Seeded from the launch info and kept in sync by connect and disconnect
/// events. Guarded by its own lock, independent of the send path.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Mutex<HashMap<String, Device>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let registry = Self::new();
        for device in devices {
            registry.insert(device);
        }
        registry
    }

    /// Add or replace a device, returning the previous entry.
    pub fn insert(&self, device: Device) -> Option<Device> {
        self.lock().insert(device.id.clone(), device)
    }

    pub fn remove(&self, id: &str) -> Option<Device> {
        self.lock().remove(id)
    }

    pub fn get(&self, id: &str) -> Option<Device> {
        self.lock().get(id).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// All devices, sorted by ID.
    pub fn snapshot(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = self.lock().values().cloned().collect();
        devices.sort_by(|a, b| a.id.cmp(&b.id));
        devices
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Device>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
