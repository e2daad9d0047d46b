//! The Concurrency Shell (§4.4): a single `Mutex` guarding interface state and the
//! profile store, shared by the HID read thread and the configuration-surface thread.
//! Everything that mutates transient state acquires this lock first.

use std::sync::Mutex;

use log::error;
use tartarus_core::profile::PROFILE_SIZE;
use tartarus_core::{InterfaceState, ProfileStore};
use tartarus_hid::led::LedHandle;
use tartarus_input::VirtualKeyboard;

struct Engine {
    state: InterfaceState,
    store: ProfileStore,
}

/// Owns the interface lock plus the two outputs resolved actions fan out to: the virtual
/// keyboard and the LED worker's channel. The HID event handler and the config surface
/// both go through [`Shell::handle_report`] / the `profile_*` methods, never touching
/// `Engine` directly.
pub struct Shell {
    engine: Mutex<Engine>,
    keyboard: Mutex<VirtualKeyboard>,
    leds: LedHandle,
    intf_type: &'static str,
}

impl Shell {
    pub fn new(boot_profile: u8, keyboard: VirtualKeyboard, leds: LedHandle) -> Self {
        let mut state = InterfaceState::new();
        state.active_profile = boot_profile;
        let shell = Shell {
            engine: Mutex::new(Engine {
                state,
                store: ProfileStore::new(),
            }),
            keyboard: Mutex::new(keyboard),
            leds,
            intf_type: "keyboard",
        };
        shell.leds.set(tartarus_core::led::channel_state(boot_profile));
        shell
    }

    /// The HID event path: decode, resolve, and emit — all inside one lock acquisition,
    /// per §4.4.
    pub fn handle_report(&self, raw: &[u8]) {
        let actions = {
            let mut engine = self.engine.lock().unwrap();
            tartarus_core::process_report(&mut engine.state, &engine.store, raw)
        };
        self.emit(&actions);
    }

    pub fn profile_count(&self) -> u8 {
        tartarus_core::profile::PROFILE_COUNT
    }

    pub fn profile_num(&self) -> u8 {
        self.engine.lock().unwrap().state.active_profile
    }

    /// `profile_num` write: folds `raw` through the configuration surface's wrap rule,
    /// runs the release-all profile swap, and updates the active profile. `emit` refreshes
    /// the LEDs from the `ProfileChanged` action `set_active_profile` always includes.
    pub fn set_profile_num(&self, raw: u32) -> u8 {
        let target = tartarus_core::state::clamp_profile_num(raw);
        let actions = {
            let mut engine = self.engine.lock().unwrap();
            tartarus_core::set_active_profile(&mut engine.state, &engine.store, target)
        };
        self.emit(&actions);
        target
    }

    pub fn read_profile(&self) -> [u8; PROFILE_SIZE * 2] {
        let engine = self.engine.lock().unwrap();
        engine.store.read(engine.state.active_profile.max(1))
    }

    pub fn write_profile(&self, bytes: &[u8]) {
        let mut engine = self.engine.lock().unwrap();
        let num = engine.state.active_profile.max(1);
        engine.store.overwrite(num, bytes);
    }

    pub fn intf_type(&self) -> &'static str {
        self.intf_type
    }

    /// Fan out resolved actions: key events go to the virtual keyboard, profile changes
    /// (from a device-side `PROFILE` bind or a config-surface `profile_num` write) refresh
    /// the indicator LEDs (§4.5).
    fn emit(&self, actions: &[tartarus_core::HostAction]) {
        use tartarus_core::HostAction;

        let mut keyboard = self.keyboard.lock().unwrap();
        for action in actions {
            match action {
                HostAction::Key { code, pressed } => {
                    if let Err(e) = keyboard.emit_key(*code, *pressed) {
                        error!("failed to emit key event: {e}");
                    }
                }
                HostAction::ProfileChanged(profile_num) => {
                    self.leds.set(tartarus_core::led::channel_state(*profile_num));
                }
            }
        }
    }
}
