//! Console session state machine
//!
//! Tracks whether the console has completed the handshake and whether
//! the link is still alive. Transitions are driven only by inbound
//! messages and elapsed time; the session never writes to the transport
//! itself but reports what happened so the caller can send the reply.

pub mod events;
pub mod machine;

pub use events::SessionEvent;
pub use machine::{Session, State};
