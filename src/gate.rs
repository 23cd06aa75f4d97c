//! Notification gate - the single flag shared between the BLE event
//! context (writer) and the telemetry cycle (reader).

use core::sync::atomic::{AtomicBool, Ordering};

/// Whether the connected peer has enabled PM notifications.
///
/// Starts disabled. Only a peer descriptor write changes it.
pub struct NotificationGate {
    enabled: AtomicBool,
}

impl NotificationGate {
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
        }
    }

    /// Open or close the gate. Idempotent.
    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Most recently set value. Never blocks.
    pub fn get(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}

impl Default for NotificationGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_starts_disabled() {
        assert!(!NotificationGate::new().get());
        assert!(!NotificationGate::default().get());
    }

    #[test]
    fn gate_reflects_last_set() {
        let gate = NotificationGate::new();
        gate.set(true);
        assert!(gate.get());
        gate.set(true);
        assert!(gate.get());
        gate.set(false);
        assert!(!gate.get());
    }

    #[test]
    fn gate_usable_as_static() {
        static GATE: NotificationGate = NotificationGate::new();
        GATE.set(true);
        assert!(GATE.get());
        GATE.set(false);
    }
}
