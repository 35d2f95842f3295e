use async_trait::async_trait;

use crate::error::Result;
use crate::sensor::TagRecord;

/// Client boundary to the cloud tag manager service.
///
/// Implementations do the network round trips; the core only consumes the
/// returned records. Retries, if any, live behind this trait - the core
/// never retries.
#[async_trait]
pub trait TagManagerClient: Send + Sync {
    /// List every tag known to the tag manager.
    async fn tag_list(&self) -> Result<Vec<TagRecord>>;

    /// Ask one tag to post its current readings immediately and return them.
    async fn request_immediate_postback(&self, tag_id: u32) -> Result<TagRecord>;

    /// Turn the tag's LED on, optionally flashing.
    async fn light_on(&self, tag_id: u32, flash: bool) -> Result<TagRecord>;

    /// Turn the tag's LED off.
    async fn light_off(&self, tag_id: u32) -> Result<TagRecord>;
}
