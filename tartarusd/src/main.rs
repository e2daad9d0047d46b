//! Host-resident input translation daemon for the Razer Tartarus V2: attaches to the
//! keyboard hidraw interface, decodes and resolves every report, and publishes the
//! result through a virtual `/dev/uinput` keyboard.

mod config;
mod shell;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use shell::Shell;

/// Tartarus V2 input translation daemon.
#[derive(Parser, Debug)]
#[command(name = "tartarusd", about = "Razer Tartarus V2 input translation daemon")]
struct Args {
    /// hidraw node for the keyboard interface (interface 0).
    #[arg(long, default_value = "/dev/hidraw0")]
    hidraw: PathBuf,

    /// Profile number to boot into (0 disables the interface).
    #[arg(long, default_value_t = 1)]
    profile: u8,

    /// Name advertised for the virtual keyboard device.
    #[arg(long, default_value = "Tartarus V2 (tartarusd)")]
    device_name: String,

    /// Path to the control-surface Unix domain socket.
    #[arg(long)]
    socket: Option<PathBuf>,
}

fn default_socket_path() -> PathBuf {
    let base = dirs::runtime_dir().unwrap_or_else(std::env::temp_dir);
    base.join("tartarusd.sock")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let keyboard = tartarus_input::VirtualKeyboard::new(&args.device_name)
        .context("failed to create virtual keyboard")?;
    let (leds, led_thread) = tartarus_hid::led::spawn(&args.hidraw);

    let shell = Arc::new(Shell::new(args.profile, keyboard, leds));

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("shutdown requested");
            running.store(false, Ordering::SeqCst);
        })
        .context("failed to install signal handler")?;
    }

    let socket_path = args.socket.unwrap_or_else(default_socket_path);
    {
        let shell = Arc::clone(&shell);
        let socket_path = socket_path.clone();
        std::thread::spawn(move || {
            if let Err(e) = config::serve(&socket_path, shell) {
                error!("control surface exited: {e}");
            }
        });
    }

    info!("attaching to {}", args.hidraw.display());
    let mut device = match tartarus_hid::DeviceIo::open(&args.hidraw) {
        Ok(device) => device,
        Err(e) => {
            error!("failed to open {}: {e}", args.hidraw.display());
            return Err(e.into());
        }
    };

    let mut buf = [0u8; 8];
    while running.load(Ordering::SeqCst) {
        match device.read_report(&mut buf) {
            Ok(n) => shell.handle_report(&buf[..n]),
            Err(e) => {
                // A dead or disconnected device ends the read loop without crashing the
                // daemon (§5, "a dead device does not crash the daemon").
                warn!("HID read failed, ending read loop: {e}");
                break;
            }
        }
    }

    info!("shutting down");
    drop(led_thread);
    let _ = std::fs::remove_file(&socket_path);
    Ok(())
}
