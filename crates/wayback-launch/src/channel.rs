// Author: Dustin Pilgrim
// License: MIT

use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;

use wayback_core::{Result, WaybackError};

/// Two connected stream sockets.
///
/// `remote` is meant for a child process, `local` stays with us until it is
/// handed on or dropped. Both are close-on-exec until a [`Launch`] marks one
/// inheritable.
///
/// [`Launch`]: crate::Launch
#[derive(Debug)]
pub struct ChannelPair {
    pub local: UnixStream,
    pub remote: UnixStream,
}

impl ChannelPair {
    pub fn local_fd(&self) -> RawFd {
        self.local.as_raw_fd()
    }

    pub fn remote_fd(&self) -> RawFd {
        self.remote.as_raw_fd()
    }
}

pub fn create_channel() -> Result<ChannelPair> {
    let (local, remote) = UnixStream::pair().map_err(WaybackError::Resource)?;
    Ok(ChannelPair { local, remote })
}
