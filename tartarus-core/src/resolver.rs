//! The heart of the engine: turns a decoded event into a host-visible action and keeps
//! the overlay/ignore/hypershift bookkeeping consistent.

use crate::bind::{Bind, BindKind};
use crate::decoder::{decode, Event};
use crate::profile::ProfileStore;
use crate::state::InterfaceState;
use log::debug;

/// The host-visible result of resolving one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostAction {
    Key { code: u8, pressed: bool },
    /// `active_profile` was just set to this value; the caller should refresh the
    /// profile-indicator LEDs (§4.5 — LED dispatch is a side effect of a profile change).
    ProfileChanged(u8),
}

/// Decode and resolve one raw HID report, returning the host actions to emit in order.
///
/// This is the full HID-event-path critical section of §4.4: decoding and resolution
/// both happen here so a caller only needs to hold the interface lock across one call.
pub fn process_report(
    state: &mut InterfaceState,
    store: &ProfileStore,
    raw: &[u8],
) -> Vec<HostAction> {
    let (events, report_state) = decode(state.report_state, raw);
    state.report_state = report_state;

    if state.active_profile == 0 {
        debug!("interface disabled, swallowing {} event(s)", events.len());
        return Vec::new();
    }

    let mut actions = Vec::new();
    for event in events {
        resolve_event(state, store, event, &mut actions);
    }
    actions
}

/// Set the active profile from the configuration surface (§6 `profile_num` write).
///
/// Unlike a `PROFILE` bind, there is no triggering key here: this runs the profile-swap
/// procedure over every currently-held key with no filter, then installs `target` as the
/// active profile, clearing any in-progress hypershift. Callers are expected to have
/// already folded `target` through [`crate::state::clamp_profile_num`].
pub fn set_active_profile(
    state: &mut InterfaceState,
    store: &ProfileStore,
    target: u8,
) -> Vec<HostAction> {
    let mut actions = Vec::new();
    profile_swap(state, store, target, None, &mut actions);
    state.active_profile = target;
    state.shift_profile = 0;
    state.revert_profile = 0;
    actions.push(HostAction::ProfileChanged(target));
    actions
}

/// Which profile a release at `idx` resolves against, per §4.3 step 1.
fn release_lookup_profile(state: &InterfaceState, idx: u8) -> u8 {
    if state.shift_overlay.get(idx) && state.shift_profile != 0 {
        state.shift_profile
    } else if state.active_profile == state.shift_profile {
        state.revert_profile
    } else {
        state.active_profile
    }
}

fn resolve_event(
    state: &mut InterfaceState,
    store: &ProfileStore,
    event: Event,
    actions: &mut Vec<HostAction>,
) {
    let idx = event.index;

    // Step 1: lookup profile (press always looks up active_profile).
    let lookup_profile = if event.pressed {
        state.active_profile
    } else {
        release_lookup_profile(state, idx)
    };

    // Step 2: the overlay bit always clears, regardless of direction.
    state.shift_overlay.clear(idx);

    // Step 3: a pending ignore consumes this release (or press, in the self-healing case)
    // without resolving anything.
    if state.ignore_mask.get(idx) {
        state.ignore_mask.clear(idx);
        update_held(state, event);
        return;
    }

    // active_profile == 0 is handled by the caller, but a SHIFT release can still resolve
    // against revert_profile == 0 if hypershift bookkeeping somehow desynced; treat that
    // as NOP rather than panicking.
    let bind = if lookup_profile == 0 {
        Bind::NOP
    } else {
        store.get(lookup_profile).get(idx)
    };

    // Step 4: dispatch.
    match bind.kind {
        BindKind::Nop
        | BindKind::Macro
        | BindKind::Script
        | BindKind::Debug
        | BindKind::SwapKey
        | BindKind::MouseMove
        | BindKind::MouseWheel
        | BindKind::Unknown(_) => {}
        BindKind::Key => actions.push(HostAction::Key {
            code: bind.arg,
            pressed: event.pressed,
        }),
        BindKind::Shift => resolve_shift(state, store, bind.arg, event, actions),
        BindKind::Profile => resolve_profile(state, store, bind.arg, idx, event, actions),
    }

    // Step 5: a press made while already inside hypershift must route its release back
    // through shift_profile even if active_profile moves on in the meantime.
    if event.pressed && state.active_profile == state.shift_profile {
        state.shift_overlay.set(idx);
    }

    // Step 6.
    update_held(state, event);
}

fn resolve_shift(
    state: &mut InterfaceState,
    store: &ProfileStore,
    target: u8,
    event: Event,
    actions: &mut Vec<HostAction>,
) {
    if !event.pressed {
        if state.revert_profile != 0 {
            state.active_profile = state.revert_profile;
            state.revert_profile = 0;
        }
        return;
    }

    if state.shift_profile != 0 && state.shift_profile != target {
        profile_swap(state, store, 0, Some(SwapFilter::Overlay), actions);
    }
    if state.revert_profile == 0 {
        state.revert_profile = state.active_profile;
    }
    state.shift_profile = target;
    state.active_profile = target;
}

fn resolve_profile(
    state: &mut InterfaceState,
    store: &ProfileStore,
    target: u8,
    idx: u8,
    event: Event,
    actions: &mut Vec<HostAction>,
) {
    if !event.pressed {
        return;
    }
    profile_swap(state, store, target, None, actions);
    state.active_profile = target;
    state.shift_profile = 0;
    state.revert_profile = 0;
    // The triggering key is still physically held but hasn't been added to held_keys
    // yet (step 6 runs after dispatch), so the swap above never saw it. Guarantee its
    // eventual release is swallowed regardless of what the new profile binds there.
    state.ignore_mask.set(idx);
    actions.push(HostAction::ProfileChanged(target));
}

enum SwapFilter {
    Overlay,
}

/// §4.3.1: reconcile every currently-held key across a profile change so the host never
/// sees a key stuck down on the outgoing profile.
fn profile_swap(
    state: &mut InterfaceState,
    store: &ProfileStore,
    target: u8,
    filter: Option<SwapFilter>,
    actions: &mut Vec<HostAction>,
) {
    let held = state.held_keys.clone();
    for key in held {
        if state.ignore_mask.get(key) {
            continue;
        }
        if matches!(filter, Some(SwapFilter::Overlay)) && !state.shift_overlay.get(key) {
            continue;
        }

        let release_profile = release_lookup_profile(state, key);
        let release_bind = if release_profile == 0 {
            Bind::NOP
        } else {
            store.get(release_profile).get(key)
        };
        let press_bind = if target == 0 {
            Bind::NOP
        } else {
            store.get(target).get(key)
        };

        let transparent = release_bind.kind == BindKind::Key
            && press_bind.kind == BindKind::Key
            && release_bind.arg == press_bind.arg;

        if transparent {
            debug!("profile swap: key {key:#04x} transparent, no events");
        } else if release_bind.kind == BindKind::Key {
            actions.push(HostAction::Key {
                code: release_bind.arg,
                pressed: false,
            });
            if press_bind.kind == BindKind::Key {
                actions.push(HostAction::Key {
                    code: press_bind.arg,
                    pressed: true,
                });
            }
        } else {
            state.ignore_mask.set(key);
        }

        state.shift_overlay.clear(key);
    }
}

fn update_held(state: &mut InterfaceState, event: Event) {
    if event.pressed {
        state.mark_pressed(event.index);
    } else {
        state.mark_released(event.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::ALT_BIT;
    use crate::profile::{Profile, ProfileStore};

    fn report(modifier: u8, keys: &[u8]) -> Vec<u8> {
        let mut r = vec![0u8; 8];
        r[0] = modifier;
        for (i, k) in keys.iter().enumerate() {
            r[2 + i] = *k;
        }
        r
    }

    fn store_with(profile1: Profile, profile2: Profile) -> ProfileStore {
        let mut store = ProfileStore::new();
        store.overwrite(1, &profile1.to_bytes());
        store.overwrite(2, &profile2.to_bytes());
        store
    }

    #[test]
    fn basic_press_release() {
        let mut p1 = Profile::blank();
        p1.set(0x04, Bind::key(30)); // KEY_A
        let store = store_with(p1, Profile::blank());
        let mut state = InterfaceState::new();
        state.active_profile = 1;

        let a = process_report(&mut state, &store, &report(0, &[0x04]));
        assert_eq!(a, vec![HostAction::Key { code: 30, pressed: true }]);
        let b = process_report(&mut state, &store, &report(0, &[]));
        assert_eq!(a.len(), 1);
        assert_eq!(b, vec![HostAction::Key { code: 30, pressed: false }]);
    }

    #[test]
    fn hypershift_round_trip() {
        let mut p1 = Profile::blank();
        p1.set(0x04, Bind::key(30));
        p1.set(0x44, Bind::shift(2));
        let mut p2 = Profile::blank();
        p2.set(0x04, Bind::key(31));
        p2.set(0x44, Bind::shift(2));
        let store = store_with(p1, p2);
        let mut state = InterfaceState::new();
        state.active_profile = 1;

        process_report(&mut state, &store, &report(ALT_BIT, &[]));
        let presses = process_report(&mut state, &store, &report(ALT_BIT, &[0x04]));
        assert_eq!(presses, vec![HostAction::Key { code: 31, pressed: true }]);
        let releases = process_report(&mut state, &store, &report(ALT_BIT, &[]));
        assert_eq!(releases, vec![HostAction::Key { code: 31, pressed: false }]);
        process_report(&mut state, &store, &report(0, &[]));

        assert_eq!(state.active_profile, 1);
        assert_eq!(state.shift_overlay, Default::default());
    }

    #[test]
    fn cross_layer_release_resolves_against_press_time_profile() {
        let mut p1 = Profile::blank();
        p1.set(0x04, Bind::key(30));
        p1.set(0x44, Bind::shift(2));
        let mut p2 = Profile::blank();
        p2.set(0x04, Bind::key(31));
        p2.set(0x44, Bind::shift(2));
        let store = store_with(p1, p2);
        let mut state = InterfaceState::new();
        state.active_profile = 1;

        let press_a = process_report(&mut state, &store, &report(0, &[0x04]));
        assert_eq!(press_a, vec![HostAction::Key { code: 30, pressed: true }]);
        process_report(&mut state, &store, &report(ALT_BIT, &[0x04]));
        let release_a = process_report(&mut state, &store, &report(ALT_BIT, &[]));
        assert_eq!(release_a, vec![HostAction::Key { code: 30, pressed: false }]);
        process_report(&mut state, &store, &report(0, &[]));
        assert_eq!(state.active_profile, 1);
    }

    #[test]
    fn transparent_swap_emits_nothing() {
        let mut p1 = Profile::blank();
        p1.set(0x04, Bind::key(30));
        p1.set(0x10, Bind::profile(2));
        let mut p2 = Profile::blank();
        p2.set(0x04, Bind::key(30));
        let store = store_with(p1, p2);
        let mut state = InterfaceState::new();
        state.active_profile = 1;

        process_report(&mut state, &store, &report(0, &[0x04]));
        let actions = process_report(&mut state, &store, &report(0, &[0x04, 0x10]));
        assert_eq!(actions, vec![HostAction::ProfileChanged(2)]);
        assert_eq!(state.active_profile, 2);
    }

    #[test]
    fn profile_swap_with_held_keys_and_own_release_swallowed() {
        let mut p1 = Profile::blank();
        p1.set(0x04, Bind::key(30));
        p1.set(0x10, Bind::profile(2));
        let mut p2 = Profile::blank();
        p2.set(0x04, Bind::key(31));
        let store = store_with(p1, p2);
        let mut state = InterfaceState::new();
        state.active_profile = 1;

        let press_a = process_report(&mut state, &store, &report(0, &[0x04]));
        assert_eq!(press_a, vec![HostAction::Key { code: 30, pressed: true }]);

        let swap = process_report(&mut state, &store, &report(0, &[0x04, 0x10]));
        assert_eq!(
            swap,
            vec![
                HostAction::Key { code: 30, pressed: false },
                HostAction::Key { code: 31, pressed: true },
                HostAction::ProfileChanged(2),
            ]
        );
        assert_eq!(state.active_profile, 2);

        // The profile key's own release is swallowed even though profile 2 has no bind
        // there at all.
        let release = process_report(&mut state, &store, &report(0, &[0x04]));
        assert!(release.is_empty());
    }

    #[test]
    fn modifier_only_scenario() {
        let store = store_with(Profile::default_layout(), Profile::default_layout());
        let mut state = InterfaceState::new();
        state.active_profile = 1;

        let press = process_report(&mut state, &store, &report(0x02, &[]));
        assert_eq!(press, vec![HostAction::Key { code: 42, pressed: true }]);
        let release = process_report(&mut state, &store, &report(0, &[]));
        assert_eq!(release, vec![HostAction::Key { code: 42, pressed: false }]);
    }

    #[test]
    fn disabled_interface_swallows_everything() {
        let store = store_with(Profile::default_layout(), Profile::default_layout());
        let mut state = InterfaceState::new();
        assert_eq!(state.active_profile, 0);
        let actions = process_report(&mut state, &store, &report(0, &[0x1E]));
        assert!(actions.is_empty());
    }

    #[test]
    fn config_surface_profile_switch_releases_held_keys() {
        let mut p1 = Profile::blank();
        p1.set(0x04, Bind::key(30));
        let p2 = Profile::blank();
        let store = store_with(p1, p2);
        let mut state = InterfaceState::new();
        state.active_profile = 1;

        process_report(&mut state, &store, &report(0, &[0x04]));
        let actions = set_active_profile(&mut state, &store, 2);
        assert_eq!(
            actions,
            vec![
                HostAction::Key { code: 30, pressed: false },
                HostAction::ProfileChanged(2),
            ]
        );
        assert_eq!(state.active_profile, 2);
        assert_eq!(state.shift_profile, 0);
        assert_eq!(state.revert_profile, 0);
    }

    #[test]
    fn profile_bind_signals_profile_changed_with_no_keys_held() {
        let mut p1 = Profile::blank();
        p1.set(0x10, Bind::profile(2));
        let store = store_with(p1, Profile::blank());
        let mut state = InterfaceState::new();
        state.active_profile = 1;

        let actions = process_report(&mut state, &store, &report(0, &[0x10]));
        assert_eq!(actions, vec![HostAction::ProfileChanged(2)]);
    }
}
