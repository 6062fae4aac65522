pub mod code;
pub mod otp;
pub mod password;
pub mod rotation;
pub mod trigger;
