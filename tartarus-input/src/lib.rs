//! Publishes a kernel-level virtual keyboard through `/dev/uinput`, using the same raw
//! Linux `KEY_*` numbering the resolver's [`tartarus_core::HostAction::Key`] codes are
//! defined in — no USB-HID-usage-table indirection.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to create virtual keyboard device: {0}")]
    Create(std::io::Error),

    #[error("failed to emit input event: {0}")]
    Emit(std::io::Error),
}

/// Owns the `/dev/uinput` virtual device. Dropping it tears the device down, which the
/// kernel's input core treats as an implicit release-all for anything still held (§5).
pub struct VirtualKeyboard {
    device: VirtualDevice,
}

impl VirtualKeyboard {
    pub fn new(name: &str) -> Result<Self, InputError> {
        let mut keys = AttributeSet::<Key>::new();
        for code in 0..=255u16 {
            keys.insert(Key::new(code));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(InputError::Create)?
            .name(name)
            .with_keys(&keys)
            .map_err(InputError::Create)?
            .build()
            .map_err(InputError::Create)?;

        Ok(VirtualKeyboard { device })
    }

    /// Emit a single key press or release, followed by the synchronization event evdev
    /// consumers expect to terminate a report.
    pub fn emit_key(&mut self, code: u8, pressed: bool) -> Result<(), InputError> {
        debug!("emit KEY_{code} {}", if pressed { "down" } else { "up" });
        let key_event = InputEvent::new(EventType::KEY, code as u16, pressed as i32);
        let syn_event = InputEvent::new(EventType::SYNCHRONIZATION, 0, 0);
        self.device
            .emit(&[key_event, syn_event])
            .map_err(InputError::Emit)
    }
}
