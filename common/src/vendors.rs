use crate::network::mac::MacAddress;

/// Resolves the NIC vendor behind a hardware address.
pub trait VendorRepository: Send + Sync {
    fn get_vendor(&self, mac: MacAddress) -> Option<String>;
}
