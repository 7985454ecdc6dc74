//! User and host facts.

use tracing::debug;

use prompt2_core::state::{SysState, UNKNOWN};

use crate::error::StatusResult;

const USER_VARS: [&str; 2] = ["USER", "LOGNAME"];

/// Gather user name, short host name and numeric ids.
pub fn inspect_system() -> SysState {
    let hostname = hostname().unwrap_or_else(|err| {
        debug!("Could not read hostname: {}", err);
        String::new()
    });
    let (uid, gid) = ids();

    SysState {
        username: username(),
        hostname,
        uid,
        gid,
    }
}

fn username() -> String {
    USER_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|name| !name.is_empty()))
        .unwrap_or_default()
}

/// Host name up to the first `.`.
pub fn short_hostname(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

#[cfg(unix)]
fn hostname() -> StatusResult<String> {
    let mut buf = [0u8; 256];
    // SAFETY: buf is valid for writes of buf.len() bytes.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let full = String::from_utf8_lossy(&buf[..end]);
    Ok(short_hostname(&full).to_string())
}

#[cfg(not(unix))]
fn hostname() -> StatusResult<String> {
    Ok(std::env::var("COMPUTERNAME")
        .map(|name| short_hostname(&name).to_string())
        .unwrap_or_default())
}

#[cfg(unix)]
fn ids() -> (i32, i32) {
    // SAFETY: getuid and getgid cannot fail.
    let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
    (
        i32::try_from(uid).unwrap_or(UNKNOWN),
        i32::try_from(gid).unwrap_or(UNKNOWN),
    )
}

#[cfg(not(unix))]
fn ids() -> (i32, i32) {
    (UNKNOWN, UNKNOWN)
}
