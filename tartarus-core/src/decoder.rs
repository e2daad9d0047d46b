//! Diffs successive 8-byte HID reports into an ordered list of press/release events.

use log::warn;

/// Raw report length (§6): 1 modifier byte, 1 reserved byte, 6 held-scancode slots.
pub const REPORT_LEN: usize = 8;
const KEY_SLOTS: usize = 6;

pub const SHIFT_BIT: u8 = 0x02;
pub const ALT_BIT: u8 = 0x04;
const MODIFIER_INDEX_BASE: u8 = 0x40;

/// A single press/release event over the 256-entry key-index space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    pub index: u8,
    pub pressed: bool,
}

/// What the decoder needs to remember between reports: the modifier byte and the
/// press-ordered key-byte region. Independent of any profile resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportState {
    modifier: u8,
    keys: [u8; KEY_SLOTS],
}

fn normalize(raw: &[u8]) -> [u8; REPORT_LEN] {
    if raw.len() != REPORT_LEN {
        warn!("HID report length {} != {REPORT_LEN}, clamping", raw.len());
    }
    let mut out = [0u8; REPORT_LEN];
    let n = raw.len().min(REPORT_LEN);
    out[..n].copy_from_slice(&raw[..n]);
    out
}

/// Decode a new raw report against the previous [`ReportState`].
///
/// Returns the events to apply and the `ReportState` to retain for the next call. The
/// decoder never mutates interface state itself (§4.1): callers apply the returned events
/// atomically through the resolver.
pub fn decode(prev: ReportState, raw: &[u8]) -> (Vec<Event>, ReportState) {
    let report = normalize(raw);
    let new_modifier = report[0];
    let mut new_keys = [0u8; KEY_SLOTS];
    new_keys.copy_from_slice(&report[2..2 + KEY_SLOTS]);

    let changed = prev.modifier ^ new_modifier;
    if changed & (SHIFT_BIT | ALT_BIT) != 0 {
        let mut events = Vec::with_capacity(2);
        for bit in [SHIFT_BIT, ALT_BIT] {
            if changed & bit != 0 {
                events.push(Event {
                    index: MODIFIER_INDEX_BASE | bit,
                    pressed: new_modifier & bit != 0,
                });
            }
        }
        // Invariant 2: modifier changes and key changes never share a report, so the
        // key-byte region is carried over untouched.
        return (
            events,
            ReportState {
                modifier: new_modifier,
                keys: prev.keys,
            },
        );
    }

    let mut events = Vec::new();
    let old = &prev.keys;
    let new = &new_keys;
    let mut off = 0usize;
    let mut i = 0usize;
    loop {
        let old_slot = old.get(i + off).copied().unwrap_or(0);
        let new_slot = new.get(i).copied().unwrap_or(0);
        if old_slot == 0 && new_slot == 0 {
            break;
        }
        if old_slot == new_slot {
            i += 1;
            continue;
        }
        if old_slot != 0 {
            events.push(Event {
                index: old_slot,
                pressed: false,
            });
            off += 1;
            continue;
        }
        // old_slot == 0, new_slot != 0
        events.push(Event {
            index: new_slot,
            pressed: true,
        });
        i += 1;
    }

    (
        events,
        ReportState {
            modifier: new_modifier,
            keys: new_keys,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(modifier: u8, keys: &[u8]) -> [u8; REPORT_LEN] {
        let mut r = [0u8; REPORT_LEN];
        r[0] = modifier;
        for (i, k) in keys.iter().enumerate() {
            r[2 + i] = *k;
        }
        r
    }

    #[test]
    fn single_press() {
        let prev = ReportState::default();
        let (events, _) = decode(prev, &report(0, &[0x1E]));
        assert_eq!(events, vec![Event { index: 0x1E, pressed: true }]);
    }

    #[test]
    fn press_then_release() {
        let prev = ReportState::default();
        let (_, state) = decode(prev, &report(0, &[0x1E]));
        let (events, _) = decode(state, &report(0, &[]));
        assert_eq!(events, vec![Event { index: 0x1E, pressed: false }]);
    }

    #[test]
    fn two_keys_then_release_first_collapses_left() {
        let prev = ReportState::default();
        let (_, state) = decode(prev, &report(0, &[0x1E, 0x1F]));
        let (events, _) = decode(state, &report(0, &[0x1F]));
        assert_eq!(events, vec![Event { index: 0x1E, pressed: false }]);
    }

    #[test]
    fn modifier_change_emits_synthesized_event_and_skips_keys() {
        let prev = ReportState::default();
        let (events, state) = decode(prev, &report(SHIFT_BIT, &[0x1E]));
        assert_eq!(
            events,
            vec![Event { index: 0x42, pressed: true }]
        );
        // key region untouched by the modifier-only report
        assert_eq!(state.keys, [0u8; KEY_SLOTS]);
    }

    #[test]
    fn short_report_is_clamped_not_rejected() {
        let prev = ReportState::default();
        let (events, _) = decode(prev, &[0, 0, 0x1E]);
        assert_eq!(events, vec![Event { index: 0x1E, pressed: true }]);
    }
}
