use sha2::{Digest, Sha256};

/// Derives a stable device identifier from the client's user agent and IP:
/// the first 16 hex chars of SHA-256(user_agent ‖ ip).
pub fn fingerprint_device(user_agent: &str, ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_agent.as_bytes());
    hasher.update(ip.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}
