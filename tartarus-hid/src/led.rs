//! Asynchronous, fire-and-forget LED dispatch: a dedicated worker thread owns its own
//! hidraw handle and drains an mpsc channel of channel-state vectors, so a profile
//! change never blocks on a device transaction while holding the interface lock.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{error, warn};

use crate::protocol::{RazerReport, LED_CHANNEL_BLUE, LED_CHANNEL_GREEN, LED_CHANNEL_RED};
use crate::transport::DeviceIo;

/// Handle held by callers (the resolver/shell) to push a new LED state. Cloning and
/// dropping are both cheap; dropping the last handle ends the worker thread.
#[derive(Clone)]
pub struct LedHandle {
    tx: Sender<[bool; 3]>,
}

impl LedHandle {
    /// Submit a new `[red, green, blue]` channel state. Never blocks; the worker thread
    /// performs the actual device transactions.
    pub fn set(&self, channels: [bool; 3]) {
        if self.tx.send(channels).is_err() {
            warn!("LED worker thread has exited, dropping LED update");
        }
    }
}

/// Spawn the LED worker thread against the hidraw node at `path`. Returns a handle to
/// submit updates and the thread's `JoinHandle` for clean shutdown.
pub fn spawn(path: &Path) -> (LedHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let path = path.to_path_buf();
    let join = thread::spawn(move || worker_loop(path, rx));
    (LedHandle { tx }, join)
}

fn worker_loop(path: PathBuf, rx: Receiver<[bool; 3]>) {
    let mut io = match DeviceIo::open(&path) {
        Ok(io) => io,
        Err(e) => {
            error!("LED worker could not open {}: {e}", path.display());
            return;
        }
    };

    for channels in rx {
        for (channel, state) in [
            (LED_CHANNEL_RED, channels[0]),
            (LED_CHANNEL_GREEN, channels[1]),
            (LED_CHANNEL_BLUE, channels[2]),
        ] {
            let report = RazerReport::led_set(channel, state);
            if let Err(e) = io.write_report(report.as_bytes()) {
                // Cosmetic failure only: logged and otherwise ignored, per §4.5.
                error!("LED set (channel {channel:#04x}) failed: {e}");
            }
        }
    }
}
