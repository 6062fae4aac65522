use crate::domain::repository::EntropySource;
use crate::error::GenerationError;

const DIGITS: &[u8] = b"0123456789";

/// Largest multiple of 10 that fits in a byte. Bytes at or above it are
/// discarded so every digit is equally likely.
const ACCEPT_BELOW: u8 = 250;

/// Produces numeric codes from a secure entropy source.
pub struct CodeGenerator<E: EntropySource> {
    pub entropy: E,
}

impl<E: EntropySource> CodeGenerator<E> {
    pub fn new(entropy: E) -> Self {
        Self { entropy }
    }

    /// Generate `length` digits, each uniformly distributed over `0-9`.
    pub fn generate(&self, length: usize) -> Result<String, GenerationError> {
        let mut code = String::with_capacity(length);
        let mut buf = [0u8; 16];
        while code.len() < length {
            self.entropy.fill(&mut buf)?;
            for &byte in buf.iter().filter(|&&b| b < ACCEPT_BELOW) {
                if code.len() == length {
                    break;
                }
                code.push(DIGITS[usize::from(byte % 10)] as char);
            }
        }
        Ok(code)
    }
}
