pub mod code_generator;
pub mod device;
pub mod jwt;
pub mod phone;

pub use code_generator::{codes_match, generate_numeric_code};
pub use device::fingerprint_device;
pub use jwt::*;
pub use phone::*;
