pub mod icmp;
pub mod tcp;
pub mod transport;
pub mod udp;
