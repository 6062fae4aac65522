pub mod otps;
pub mod passwords;
