//! Command-line client for tartarusd's control surface, speaking the same
//! length-prefixed protocol the daemon's socket server implements.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

const OP_PROFILE_COUNT: u8 = 0x01;
const OP_GET_PROFILE_NUM: u8 = 0x02;
const OP_SET_PROFILE_NUM: u8 = 0x03;
const OP_GET_PROFILE: u8 = 0x04;
const OP_SET_PROFILE: u8 = 0x05;
const OP_INTF_TYPE: u8 = 0x06;

#[derive(Parser, Debug)]
#[command(name = "tartarusctl", about = "Control tartarusd over its local socket")]
struct Args {
    #[arg(long)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read or write the active profile number.
    ProfileNum {
        /// New profile number to set (1..=8, or 0 to disable). Omit to read.
        value: Option<u8>,
    },
    /// Read or write the active profile's bind table.
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Print the compiled profile ceiling.
    ProfileCount,
    /// Print which interface this socket attaches to.
    IntfType,
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    Get,
    Set { path: PathBuf },
}

fn default_socket_path() -> PathBuf {
    let base = dirs::runtime_dir().unwrap_or_else(std::env::temp_dir);
    base.join("tartarusd.sock")
}

fn request(stream: &mut UnixStream, payload: &[u8]) -> Result<Vec<u8>> {
    stream.write_all(&(payload.len() as u32).to_le_bytes())?;
    stream.write_all(payload)?;

    let mut len_bytes = [0u8; 4];
    stream.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf)?;
    Ok(buf)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let socket_path = args.socket.unwrap_or_else(default_socket_path);
    let mut stream = UnixStream::connect(&socket_path)
        .with_context(|| format!("failed to connect to {}", socket_path.display()))?;

    match args.command {
        Command::ProfileCount => {
            let reply = request(&mut stream, &[OP_PROFILE_COUNT])?;
            println!("{}", reply.first().copied().unwrap_or(0));
        }
        Command::IntfType => {
            let reply = request(&mut stream, &[OP_INTF_TYPE])?;
            println!("{}", String::from_utf8_lossy(&reply));
        }
        Command::ProfileNum { value: None } => {
            let reply = request(&mut stream, &[OP_GET_PROFILE_NUM])?;
            println!("{}", reply.first().copied().unwrap_or(0));
        }
        Command::ProfileNum { value: Some(v) } => {
            let mut payload = vec![OP_SET_PROFILE_NUM];
            payload.extend_from_slice(&(v as u32).to_le_bytes());
            let reply = request(&mut stream, &payload)?;
            println!("{}", reply.first().copied().unwrap_or(0));
        }
        Command::Profile { action: ProfileAction::Get } => {
            let reply = request(&mut stream, &[OP_GET_PROFILE])?;
            std::io::stdout().write_all(&reply)?;
        }
        Command::Profile { action: ProfileAction::Set { path } } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let mut payload = vec![OP_SET_PROFILE];
            payload.extend_from_slice(&bytes);
            let reply = request(&mut stream, &payload)?;
            if reply.first() != Some(&0) {
                bail!("daemon rejected profile write");
            }
        }
    }
    Ok(())
}
