//! Host API implementations: binary location, subprocesses, PTYs, HTTP.

pub mod http;
pub mod locate;
pub mod process;
pub mod pty;
