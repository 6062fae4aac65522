use crate::domain::repository::EntropySource;
use crate::error::GenerationError;

/// Operating-system CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), GenerationError> {
        getrandom::fill(buf).map_err(|e| GenerationError(e.to_string()))
    }
}
