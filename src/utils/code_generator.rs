use rand::Rng;
use subtle::ConstantTimeEq;

/// Uniform numeric code of `digits` width, zero-padded (`"000731"` is valid).
///
/// `thread_rng` is a CSPRNG seeded from the OS and periodically reseeded.
pub fn generate_numeric_code(digits: usize) -> String {
    let upper = 10u64.pow(digits as u32);
    let mut rng = rand::thread_rng();
    format!("{:0width$}", rng.gen_range(0..upper), width = digits)
}

/// Constant-time comparison of a stored code and a submitted one.
pub fn codes_match(stored: &str, submitted: &str) -> bool {
    stored.as_bytes().ct_eq(submitted.as_bytes()).into()
}
