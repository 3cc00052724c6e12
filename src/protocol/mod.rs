//! Host serial protocol plumbing.
//!
//! ```text
//!  SerialPort ──▶ LineDecoder ──▶ commands::parse ──▶ RigController
//!  SerialPort ◀── MessageEmitter ◀── HostMessage ◀──┘
//! ```

pub mod emitter;
pub mod line_codec;
