pub mod common;
pub mod otp;
pub mod user;

pub use common::*;
pub use otp::*;
pub use user::*;
