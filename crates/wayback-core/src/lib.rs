// Author: Dustin Pilgrim
// License: MIT

pub mod discovery;
pub mod error;
pub mod options;
pub mod output;
pub mod registry;

pub use discovery::{Bind, Discovery};
pub use error::{Result, WaybackError};
pub use options::{OptKind, OptSpec};
pub use output::{OutputEvent, OutputRecord, Position, Size};
pub use registry::{MatchPolicy, OutputRegistry};
