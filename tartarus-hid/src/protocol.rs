//! The Tartarus V2's 90-byte wire report: header, command payload, XOR-checksummed
//! trailer. Field layout and checksum algorithm are taken from the device's own kernel
//! driver (Razer USA, Ltd, VID `0x1532` / PID `0x022b`).

/// Full report length; the device rejects short transfers.
pub const REPORT_LEN: usize = 90;

pub const VENDOR_ID: u16 = 0x1532;
pub const PRODUCT_ID: u16 = 0x022b;

/// Keyboard-layout query: class `0x00`, command id `0x86`, payload size `0x02`.
pub const CMD_KBD_LAYOUT: (u8, u8, u8) = (0x00, 0x86, 0x02);
/// LED set: class `0x03`, command id `0x00`, payload size `0x03`.
pub const CMD_SET_LED: (u8, u8, u8) = (0x03, 0x00, 0x03);

/// Profile-indicator channel identifiers, per the device's RGB indicator wiring.
pub const LED_CHANNEL_RED: u8 = 0x0C;
pub const LED_CHANNEL_GREEN: u8 = 0x0D;
pub const LED_CHANNEL_BLUE: u8 = 0x0E;

const VARIABLE_STORE: u8 = 0x00;

// Byte offsets within the 90-byte report.
const OFF_TR_ID: usize = 1;
const OFF_TYPE: usize = 4;
const OFF_SIZE: usize = 5;
const OFF_CLASS: usize = 6;
const OFF_CMD_ID: usize = 7;
const OFF_DATA: usize = 8;
const DATA_LEN: usize = 80;
const TRAILER_LEN: usize = 2;
const TRANSACTION_ID: u8 = 0xFF;

/// A single 90-byte device report, built and consumed as a flat byte buffer matching the
/// on-wire layout exactly:
/// `status(1) tr_id(1) remaining(2 BE) type(1) size(1) class(1) cmd_id(1) data(80) cksum(1) reserved(1)`.
#[derive(Clone, Copy)]
pub struct RazerReport {
    bytes: [u8; REPORT_LEN],
}

impl RazerReport {
    /// Build a request report for the given command class/id/payload-size triple, with
    /// the transaction id fixed to `0xFF` as every host-originated request in this
    /// protocol uses.
    pub fn command(class: u8, id: u8, size: u8) -> Self {
        let mut bytes = [0u8; REPORT_LEN];
        bytes[OFF_TR_ID] = TRANSACTION_ID;
        bytes[OFF_TYPE] = 0;
        bytes[OFF_SIZE] = size;
        bytes[OFF_CLASS] = class;
        bytes[OFF_CMD_ID] = id;
        RazerReport { bytes }
    }

    /// Write into the 80-byte data region at `offset`.
    pub fn set_data(&mut self, offset: usize, value: u8) {
        self.bytes[OFF_DATA + offset] = value;
    }

    pub fn data(&self, offset: usize) -> u8 {
        self.bytes[OFF_DATA + offset]
    }

    /// Build a LED-set command for one channel, fixing up the checksum.
    pub fn led_set(channel: u8, on: bool) -> Self {
        let (class, id, size) = CMD_SET_LED;
        let mut report = RazerReport::command(class, id, size);
        report.set_data(0, VARIABLE_STORE);
        report.set_data(1, channel);
        report.set_data(2, on as u8);
        report.finalize();
        report
    }

    /// Build the keyboard-layout query sent once at probe time.
    pub fn kbd_layout_query() -> Self {
        let (class, id, size) = CMD_KBD_LAYOUT;
        let mut report = RazerReport::command(class, id, size);
        report.finalize();
        report
    }

    /// XOR every byte in `2..88` and store it at the checksum position (byte 88).
    pub fn finalize(&mut self) {
        self.bytes[REPORT_LEN - TRAILER_LEN] = checksum(&self.bytes);
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_LEN] {
        &self.bytes
    }

    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut bytes = [0u8; REPORT_LEN];
        let n = raw.len().min(REPORT_LEN);
        bytes[..n].copy_from_slice(&raw[..n]);
        RazerReport { bytes }
    }

    pub fn checksum_valid(&self) -> bool {
        self.bytes[REPORT_LEN - TRAILER_LEN] == checksum(&self.bytes)
    }
}

/// XOR of bytes `2..=87` inclusive (skips the leading status/transaction-id header bytes
/// and the trailing checksum/reserved bytes).
fn checksum(bytes: &[u8; REPORT_LEN]) -> u8 {
    bytes[2..REPORT_LEN - TRAILER_LEN]
        .iter()
        .fold(0u8, |ck, b| ck ^ b)
}

const _: () = assert!(OFF_DATA + DATA_LEN + TRAILER_LEN == REPORT_LEN);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_is_90_bytes() {
        let r = RazerReport::kbd_layout_query();
        assert_eq!(r.as_bytes().len(), REPORT_LEN);
    }

    #[test]
    fn checksum_covers_bytes_2_through_87() {
        let mut r = RazerReport::led_set(LED_CHANNEL_GREEN, true);
        assert!(r.checksum_valid());
        r.bytes[50] ^= 0xFF;
        assert!(!r.checksum_valid());
        r.finalize();
        assert!(r.checksum_valid());
    }

    #[test]
    fn checksum_excludes_header_and_reserved() {
        let r1 = RazerReport::led_set(LED_CHANNEL_GREEN, true);
        let mut r2 = r1;
        r2.bytes[0] ^= 0xFF; // status byte, outside the checksummed range
        assert_eq!(r1.as_bytes()[88], r2.as_bytes()[88]);
    }

    #[test]
    fn led_set_encodes_channel_and_state() {
        let r = RazerReport::led_set(LED_CHANNEL_RED, false);
        assert_eq!(r.data(0), VARIABLE_STORE);
        assert_eq!(r.data(1), LED_CHANNEL_RED);
        assert_eq!(r.data(2), 0);
    }
}
