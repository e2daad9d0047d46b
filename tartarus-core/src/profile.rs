//! Per-interface profile storage: eight 256-entry bind tables addressed by profile number.

use crate::bind::Bind;

/// Number of key indices in the 8-bit key-index space (§3).
pub const PROFILE_SIZE: usize = 256;

/// Number of profiles a single interface carries.
pub const PROFILE_COUNT: u8 = 8;

/// Synthesized key index for the shift modifier (`0x40 | 0x02`). Never collides with a
/// device scancode.
pub const SHIFT_INDEX: u8 = 0x42;

/// Synthesized key index for the circular thumb "alt" button (`0x40 | 0x04`).
pub const ALT_INDEX: u8 = 0x44;

/// Raw device scancodes for the Tartarus V2's 20 main keys, left to right, top to bottom.
pub mod scancode {
    pub const KEY_1: u8 = 0x1E;
    pub const KEY_2: u8 = 0x1F;
    pub const KEY_3: u8 = 0x20;
    pub const KEY_4: u8 = 0x21;
    pub const KEY_5: u8 = 0x22;
    pub const KEY_6: u8 = 0x2B;
    pub const KEY_7: u8 = 0x14;
    pub const KEY_8: u8 = 0x1A;
    pub const KEY_9: u8 = 0x08;
    pub const KEY_10: u8 = 0x15;
    pub const KEY_11: u8 = 0x39;
    pub const KEY_12: u8 = 0x04;
    pub const KEY_13: u8 = 0x16;
    pub const KEY_14: u8 = 0x07;
    pub const KEY_15: u8 = 0x09;
    pub const KEY_16: u8 = super::SHIFT_INDEX;
    pub const KEY_17: u8 = 0x1D;
    pub const KEY_18: u8 = 0x1B;
    pub const KEY_19: u8 = 0x06;
    pub const KEY_20: u8 = 0x2C;
    pub const HAT_LEFT: u8 = 0x50;
    pub const HAT_UP: u8 = 0x52;
    pub const HAT_RIGHT: u8 = 0x4F;
    pub const HAT_DOWN: u8 = 0x51;
}

/// Linux `input-event-codes.h` `KEY_*` values used by the default layout.
mod linux_key {
    pub const ESC: u8 = 1;
    pub const _1: u8 = 2;
    pub const _2: u8 = 3;
    pub const _3: u8 = 4;
    pub const _4: u8 = 5;
    pub const _5: u8 = 6;
    pub const Q: u8 = 16;
    pub const W: u8 = 17;
    pub const E: u8 = 18;
    pub const R: u8 = 19;
    pub const A: u8 = 30;
    pub const S: u8 = 31;
    pub const D: u8 = 32;
    pub const F: u8 = 33;
    pub const Z: u8 = 44;
    pub const X: u8 = 45;
    pub const C: u8 = 46;
    pub const SPACE: u8 = 57;
    pub const BACKSLASH: u8 = 43;
    pub const LEFTSHIFT: u8 = 42;
    pub const LEFTALT: u8 = 56;
    pub const UP: u8 = 103;
    pub const LEFT: u8 = 105;
    pub const RIGHT: u8 = 106;
    pub const DOWN: u8 = 108;
}

/// A single interface's 256-entry bind table.
#[derive(Clone)]
pub struct Profile {
    binds: [Bind; PROFILE_SIZE],
}

impl Profile {
    pub fn blank() -> Self {
        Profile {
            binds: [Bind::NOP; PROFILE_SIZE],
        }
    }

    /// The well-known Razer Tartarus V2 default layout: the 20 main keys to their
    /// QWERTY-area default binding, the hat to arrow keys, shift to shift, and the
    /// circular thumb button to alt.
    pub fn default_layout() -> Self {
        use linux_key::*;
        use scancode::*;

        let mut p = Profile::blank();
        p.set(KEY_1, Bind::key(_1));
        p.set(KEY_2, Bind::key(_2));
        p.set(KEY_3, Bind::key(_3));
        p.set(KEY_4, Bind::key(_4));
        p.set(KEY_5, Bind::key(_5));
        p.set(KEY_6, Bind::key(ESC));
        p.set(KEY_7, Bind::key(Q));
        p.set(KEY_8, Bind::key(W));
        p.set(KEY_9, Bind::key(E));
        p.set(KEY_10, Bind::key(R));
        p.set(KEY_11, Bind::key(BACKSLASH));
        p.set(KEY_12, Bind::key(A));
        p.set(KEY_13, Bind::key(S));
        p.set(KEY_14, Bind::key(D));
        p.set(KEY_15, Bind::key(F));
        p.set(SHIFT_INDEX, Bind::key(LEFTSHIFT));
        p.set(KEY_17, Bind::key(Z));
        p.set(KEY_18, Bind::key(X));
        p.set(KEY_19, Bind::key(C));
        p.set(KEY_20, Bind::key(SPACE));
        p.set(ALT_INDEX, Bind::key(LEFTALT));
        p.set(HAT_UP, Bind::key(UP));
        p.set(HAT_DOWN, Bind::key(DOWN));
        p.set(HAT_LEFT, Bind::key(LEFT));
        p.set(HAT_RIGHT, Bind::key(RIGHT));
        p
    }

    pub fn get(&self, index: u8) -> Bind {
        self.binds[index as usize]
    }

    pub fn set(&mut self, index: u8, bind: Bind) {
        self.binds[index as usize] = bind;
    }

    /// Serialize as `(kind, arg)` pairs, 512 bytes total.
    pub fn to_bytes(&self) -> [u8; PROFILE_SIZE * 2] {
        let mut out = [0u8; PROFILE_SIZE * 2];
        for (i, bind) in self.binds.iter().enumerate() {
            let (kind, arg) = bind.to_wire();
            out[i * 2] = kind;
            out[i * 2 + 1] = arg;
        }
        out
    }

    /// Replace the table's contents from a caller-supplied byte slice. A short slice is
    /// zero-filled (decoding to [`Bind::NOP`]); a long slice is truncated. Never fails —
    /// this is the validation policy of §7.
    pub fn overwrite_from_bytes(&mut self, bytes: &[u8]) {
        for (i, bind) in self.binds.iter_mut().enumerate() {
            let kind = bytes.get(i * 2).copied().unwrap_or(0);
            let arg = bytes.get(i * 2 + 1).copied().unwrap_or(0);
            *bind = Bind::from_wire(kind, arg);
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::default_layout()
    }
}

/// Owns the eight profiles for one interface. Profile number `0` is reserved ("device
/// disabled") and has no backing [`Profile`] here.
pub struct ProfileStore {
    profiles: [Profile; PROFILE_COUNT as usize],
}

impl ProfileStore {
    pub fn new() -> Self {
        ProfileStore {
            profiles: std::array::from_fn(|_| Profile::default_layout()),
        }
    }

    /// # Panics
    /// Panics if `profile_num` is not in `1..=8`. Callers validate user input before this
    /// boundary (§7: "unparseable" profile numbers are rejected with an error code, valid
    /// numbers are always in range by construction of [`crate::state::clamp_profile_num`]).
    pub fn get(&self, profile_num: u8) -> &Profile {
        &self.profiles[Self::slot(profile_num)]
    }

    pub fn overwrite(&mut self, profile_num: u8, bytes: &[u8]) {
        self.profiles[Self::slot(profile_num)].overwrite_from_bytes(bytes);
    }

    pub fn read(&self, profile_num: u8) -> [u8; PROFILE_SIZE * 2] {
        self.profiles[Self::slot(profile_num)].to_bytes()
    }

    fn slot(profile_num: u8) -> usize {
        assert!(
            (1..=PROFILE_COUNT).contains(&profile_num),
            "profile number {profile_num} out of range 1..=8"
        );
        (profile_num - 1) as usize
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_maps_number_row() {
        let p = Profile::default_layout();
        assert_eq!(p.get(scancode::KEY_1), Bind::key(linux_key::_1));
        assert_eq!(p.get(scancode::KEY_5), Bind::key(linux_key::_5));
    }

    #[test]
    fn default_layout_maps_modifiers() {
        let p = Profile::default_layout();
        assert_eq!(p.get(SHIFT_INDEX), Bind::key(linux_key::LEFTSHIFT));
        assert_eq!(p.get(ALT_INDEX), Bind::key(linux_key::LEFTALT));
    }

    #[test]
    fn round_trip_through_bytes() {
        let mut p = Profile::default_layout();
        let bytes = p.to_bytes();
        let mut p2 = Profile::blank();
        p2.overwrite_from_bytes(&bytes);
        assert_eq!(p2.get(scancode::KEY_12), p.get(scancode::KEY_12));
    }

    #[test]
    fn short_write_zero_fills_remainder() {
        let mut p = Profile::default_layout();
        p.overwrite_from_bytes(&[1, 0x50]);
        assert_eq!(p.get(0), Bind::key(0x50));
        assert_eq!(p.get(1), Bind::NOP);
    }

    #[test]
    fn round_trip_preserves_non_canonical_kind_bytes() {
        let mut p = Profile::blank();
        p.set(0, Bind::from_wire(0xEE, 0x12));
        let bytes = p.to_bytes();
        assert_eq!(&bytes[..2], &[0xEE, 0x12]);

        let mut p2 = Profile::blank();
        p2.overwrite_from_bytes(&bytes);
        assert_eq!(p2.get(0), p.get(0));
        assert_eq!(p2.to_bytes(), bytes);
    }

    #[test]
    fn store_profiles_are_independent() {
        let mut store = ProfileStore::new();
        store.overwrite(2, &[1, 0x99]);
        assert_eq!(store.get(2).get(0), Bind::key(0x99));
        assert_eq!(store.get(1).get(0), Bind::NOP);
    }

    #[test]
    #[should_panic]
    fn profile_zero_is_undefined() {
        let store = ProfileStore::new();
        store.get(0);
    }
}
