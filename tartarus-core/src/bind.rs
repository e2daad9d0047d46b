//! The tagged action associated with a single key index in a [`crate::profile::Profile`].

/// A profile's action for one key index.
///
/// `arg` is interpreted according to `kind`: a host key code for [`BindKind::Key`], a
/// profile number `1..=8` for [`BindKind::Shift`] and [`BindKind::Profile`], an index into
/// an external macro/script table for [`BindKind::Macro`]/[`BindKind::Script`]. The
/// remaining kinds are declared by the wire format but carry no behavior in this engine
/// (see `BindKind` docs).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Bind {
    pub kind: BindKind,
    pub arg: u8,
}

impl Bind {
    pub const NOP: Bind = Bind {
        kind: BindKind::Nop,
        arg: 0,
    };

    pub fn key(code: u8) -> Self {
        Bind {
            kind: BindKind::Key,
            arg: code,
        }
    }

    pub fn shift(profile: u8) -> Self {
        Bind {
            kind: BindKind::Shift,
            arg: profile,
        }
    }

    pub fn profile(profile: u8) -> Self {
        Bind {
            kind: BindKind::Profile,
            arg: profile,
        }
    }

    /// Decode a two-byte `(kind, arg)` wire pair as stored in a profile payload.
    ///
    /// A kind byte outside `0..=9` is preserved in [`BindKind::Unknown`] rather than
    /// folded to [`BindKind::Nop`]: a profile payload is caller-supplied data the
    /// validation policy (§7) never rejects, and §8's round-trip law requires
    /// `overwrite_from_bytes`/`to_bytes` to reproduce it byte-for-byte. It is swallowed
    /// exactly like `Nop` in the resolver regardless.
    pub fn from_wire(kind: u8, arg: u8) -> Self {
        Bind {
            kind: BindKind::from_wire(kind),
            arg,
        }
    }

    pub fn to_wire(self) -> (u8, u8) {
        (self.kind.to_wire(), self.arg)
    }
}

/// The action family a [`Bind`] dispatches to in the resolver.
///
/// `Macro`, `Script`, `SwapKey`, `MouseMove`, `MouseWheel` and `Debug` are declared bind
/// kinds with no resolver behavior defined by the source this engine is specified
/// against (§1, §9 open question b/c) — they are swallowed like `Nop`. `Unknown` holds
/// any wire byte outside `0..=9`, likewise swallowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BindKind {
    #[default]
    Nop,
    Key,
    Shift,
    Profile,
    Macro,
    Script,
    SwapKey,
    MouseMove,
    MouseWheel,
    Debug,
    Unknown(u8),
}

impl BindKind {
    fn from_wire(byte: u8) -> Self {
        match byte {
            0 => BindKind::Nop,
            1 => BindKind::Key,
            2 => BindKind::Shift,
            3 => BindKind::Profile,
            4 => BindKind::Macro,
            5 => BindKind::Script,
            6 => BindKind::SwapKey,
            7 => BindKind::MouseMove,
            8 => BindKind::MouseWheel,
            9 => BindKind::Debug,
            other => BindKind::Unknown(other),
        }
    }

    fn to_wire(self) -> u8 {
        match self {
            BindKind::Nop => 0,
            BindKind::Key => 1,
            BindKind::Shift => 2,
            BindKind::Profile => 3,
            BindKind::Macro => 4,
            BindKind::Script => 5,
            BindKind::SwapKey => 6,
            BindKind::MouseMove => 7,
            BindKind::MouseWheel => 8,
            BindKind::Debug => 9,
            BindKind::Unknown(byte) => byte,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_wire_kind_is_preserved_not_folded_to_nop() {
        assert_eq!(Bind::from_wire(0xEE, 0x12).kind, BindKind::Unknown(0xEE));
    }

    #[test]
    fn wire_round_trip() {
        let bind = Bind::key(0x04);
        let (kind, arg) = bind.to_wire();
        assert_eq!(Bind::from_wire(kind, arg), bind);
    }

    #[test]
    fn unknown_kind_wire_round_trip() {
        let bind = Bind::from_wire(0xEE, 0x12);
        let (kind, arg) = bind.to_wire();
        assert_eq!((kind, arg), (0xEE, 0x12));
        assert_eq!(Bind::from_wire(kind, arg), bind);
    }
}
