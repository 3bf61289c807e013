pub mod host;
pub mod mac;
