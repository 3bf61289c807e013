//! End-to-end checks over real loopback sockets.

mod probe;
mod status;
mod wake;
