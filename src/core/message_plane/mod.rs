// src/core/message_plane/mod.rs

//! The Message Plane: the only leaf responsible for raw
//! socket I/O. Everything above this module talks in terms of typed
//! messages (`core::protocol`), never raw buffers.

pub mod netlink;
pub mod udp;

pub use netlink::{LinkMonitor, LinkState, NetlinkMonitor};
pub use udp::IfaceSocket;
