pub mod icmp;
pub mod magic;
