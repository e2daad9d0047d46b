//! Synchronous wrapper around a `/dev/hidraw*` node. All device I/O in this crate goes
//! through `DeviceIo` so drivers never touch a raw file descriptor directly.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::TransportError;
use crate::protocol::{RazerReport, REPORT_LEN};

pub struct DeviceIo {
    file: File,
    path: PathBuf,
}

impl DeviceIo {
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| TransportError::Io {
                device: path.display().to_string(),
                source,
            })?;
        Ok(DeviceIo {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Write a full 90-byte report to the device.
    pub fn write_report(&mut self, bytes: &[u8; REPORT_LEN]) -> Result<(), TransportError> {
        self.file.write_all(bytes).map_err(|source| TransportError::Io {
            device: self.path.display().to_string(),
            source,
        })?;
        debug!("TX {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    /// Read a raw input report (the 8-byte key/modifier report from interface 0).
    pub fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let n = self.file.read(buf).map_err(|source| TransportError::Io {
            device: self.path.display().to_string(),
            source,
        })?;
        debug!("RX {n} bytes from {}", self.path.display());
        Ok(n)
    }

    /// Write a full request, then read the device's 90-byte reply.
    pub fn request(&mut self, request: &[u8; REPORT_LEN]) -> Result<[u8; REPORT_LEN], TransportError> {
        self.write_report(request)?;
        let mut reply = [0u8; REPORT_LEN];
        let n = self.read_report(&mut reply)?;
        if n != REPORT_LEN {
            return Err(TransportError::ShortTransfer {
                expected: REPORT_LEN,
                actual: n,
            });
        }
        if !RazerReport::from_bytes(&reply).checksum_valid() {
            return Err(TransportError::ChecksumMismatch);
        }
        Ok(reply)
    }
}
