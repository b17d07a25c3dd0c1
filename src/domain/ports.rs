use crate::core::session::SiteContext;
use crate::domain::model::TaskOutput;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Human-readable location of `path` inside this storage.
    fn location(&self, path: &str) -> String;
}

/// One step of a site's daily routine, e.g. signing in.
#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, ctx: &SiteContext) -> Result<TaskOutput>;
}

/// A site knows which tasks to run, in order, for one of its accounts.
pub trait Site: Send + Sync {
    fn name(&self) -> &str;

    fn build_task_sequence(&self, ctx: &SiteContext) -> Vec<Box<dyn Task>>;
}
