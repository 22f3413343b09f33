use anyhow::Result;
use async_trait::async_trait;

use crate::probe_result::Summary;

/// Delivery seam for a finished check.
#[async_trait]
pub trait CheckReporter: Send + Sync {
    async fn report(&self, summary: &Summary) -> Result<()>;

    fn name(&self) -> &str;
}
