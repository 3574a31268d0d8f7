//! Firmware tasks
//!
//! The panel runs a single cooperative loop; all console I/O and key
//! scanning happen inside it.

pub mod control_loop;
