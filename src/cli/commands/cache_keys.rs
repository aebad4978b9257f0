//! Cache-keys command - print cache keys for one job

use crate::cache::{derive_keys, host_platform, CacheKeyChain};
use crate::cli::args::{CacheKeysArgs, JobArgs};
use crate::cli::Context;
use crate::error::MatrixResult;
use chrono::Utc;

/// Execute the cache-keys command
pub async fn execute(args: CacheKeysArgs, ctx: &Context) -> MatrixResult<()> {
    let chain = job_keys(&args.job)?;

    ctx.reporter.set_output("primaryKey", &chain.primary).await?;
    ctx.reporter
        .set_output("restoreKeys", &chain.fallbacks.join("\n"))
        .await?;
    Ok(())
}

/// Key chain for a job on this host, this month
pub fn job_keys(job: &JobArgs) -> MatrixResult<CacheKeyChain> {
    let (host_os, host_arch) = host_platform();
    derive_keys(
        &job.target,
        job.distribution,
        job.platform.as_deref().unwrap_or(host_os),
        job.arch.as_deref().unwrap_or(host_arch),
        Utc::now(),
    )
}
