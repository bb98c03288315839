//! Loop control shared by the long-running commands.

pub mod signals;
