// Author: Dustin Pilgrim
// License: MIT

pub mod channel;
pub mod launcher;

pub use channel::{create_channel, ChannelPair};
pub use launcher::{check_executable, exit_code, Launch, ProcessHandle};
