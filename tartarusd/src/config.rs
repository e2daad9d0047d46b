//! The local control surface (§6): a Unix domain socket carrying a small length-prefixed
//! request/response protocol for the four configuration endpoints. `tartarusctl` is the
//! client-side counterpart.

use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use log::{debug, error, warn};

use crate::shell::Shell;

pub const OP_PROFILE_COUNT: u8 = 0x01;
pub const OP_GET_PROFILE_NUM: u8 = 0x02;
pub const OP_SET_PROFILE_NUM: u8 = 0x03;
pub const OP_GET_PROFILE: u8 = 0x04;
pub const OP_SET_PROFILE: u8 = 0x05;
pub const OP_INTF_TYPE: u8 = 0x06;

/// Bind the control socket and serve requests until the listener errors out (typically
/// because the daemon is shutting down and the socket file was removed).
pub fn serve(socket_path: &Path, shell: Arc<Shell>) -> std::io::Result<()> {
    let _ = std::fs::remove_file(socket_path);
    let listener = UnixListener::bind(socket_path)?;
    debug!("control surface listening on {}", socket_path.display());

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let shell = Arc::clone(&shell);
                thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, &shell) {
                        warn!("control connection ended: {e}");
                    }
                });
            }
            Err(e) => error!("control surface accept failed: {e}"),
        }
    }
    Ok(())
}

fn handle_connection(mut stream: UnixStream, shell: &Shell) -> std::io::Result<()> {
    loop {
        let request = match read_frame(&mut stream) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(()),
            Err(e) => return Err(e),
        };
        let response = dispatch(shell, &request);
        write_frame(&mut stream, &response)?;
    }
}

fn dispatch(shell: &Shell, request: &[u8]) -> Vec<u8> {
    let Some(&opcode) = request.first() else {
        return Vec::new();
    };
    match opcode {
        OP_PROFILE_COUNT => vec![shell.profile_count()],
        OP_GET_PROFILE_NUM => vec![shell.profile_num()],
        OP_SET_PROFILE_NUM => {
            let raw = request.get(1..5).map(|b| {
                u32::from_le_bytes([b[0], b[1], b[2], b[3]])
            });
            match raw {
                Some(raw) => vec![shell.set_profile_num(raw)],
                None => vec![0],
            }
        }
        OP_GET_PROFILE => shell.read_profile().to_vec(),
        OP_SET_PROFILE => {
            shell.write_profile(&request[1..]);
            vec![0]
        }
        OP_INTF_TYPE => shell.intf_type().as_bytes().to_vec(),
        _ => Vec::new(),
    }
}

/// Frames are a 4-byte little-endian length prefix followed by that many payload bytes.
fn read_frame(stream: &mut UnixStream) -> std::io::Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    match stream.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let len = u32::from_le_bytes(len_bytes) as usize;
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf)?;
    Ok(Some(buf))
}

fn write_frame(stream: &mut UnixStream, payload: &[u8]) -> std::io::Result<()> {
    stream.write_all(&(payload.len() as u32).to_le_bytes())?;
    stream.write_all(payload)
}
