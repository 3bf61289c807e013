//! Device reachability and Wake-on-LAN engine.
//!
//! Everything here talks to the outside world through the ports defined in
//! `lanwake-common`; the concrete network adapters live in [`network`].

pub mod broadcaster;
pub mod directory;
pub mod network;
pub mod poller;
pub mod probe;
pub mod session;
pub mod sink;
pub mod store;
pub mod vendors;
pub mod wake;
