use crate::error::Result;
use crate::models::FileLocator;

/// Reads facts out of GML file content
pub trait GmlContentReader: Send + Sync {
    /// Highest level-of-detail marker among the file's features.
    ///
    /// Any read or parse failure is reported as `UdxError::UnreadableContent`.
    fn max_lod(&self, locator: &FileLocator) -> Result<u32>;
}
