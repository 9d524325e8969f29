/// Devices the server knows, in display priority order.
pub const CANONICAL_DEVICES: [&str; 4] = ["rm1", "rm2", "rmpp", "rmppm"];

/// Position of a device in [`CANONICAL_DEVICES`], if it is one of them.
pub fn canonical_rank(device: &str) -> Option<usize> {
    CANONICAL_DEVICES.iter().position(|known| *known == device)
}

pub fn is_known_device(device: &str) -> bool {
    canonical_rank(device).is_some()
}
