//! Cache command - restore or save the nx cache for one job

use crate::cache::{restore_cache, save_cache, LocalCacheStore};
use crate::cli::args::{CacheAction, CacheArgs, CacheOpArgs};
use crate::cli::commands::cache_keys::job_keys;
use crate::cli::Context;
use crate::error::MatrixResult;
use std::path::PathBuf;
use tracing::debug;

/// Execute the cache command
pub async fn execute(args: CacheArgs, ctx: &Context) -> MatrixResult<()> {
    match args.action {
        CacheAction::Restore(op) => restore(op, ctx).await,
        CacheAction::Save(op) => save(op, ctx).await,
    }
}

async fn restore(op: CacheOpArgs, ctx: &Context) -> MatrixResult<()> {
    let chain = job_keys(&op.job)?;
    let (store, paths) = store_for(op, ctx);

    let hit = restore_cache(&store, &paths, &chain).await?;
    ctx.reporter
        .set_output("cacheHit", hit.as_deref().unwrap_or_default())
        .await
}

async fn save(op: CacheOpArgs, ctx: &Context) -> MatrixResult<()> {
    let chain = job_keys(&op.job)?;
    let (store, paths) = store_for(op, ctx);

    save_cache(&store, &paths, &chain.primary).await
}

/// Local store and cache paths, from flags first and config second
fn store_for(op: CacheOpArgs, ctx: &Context) -> (LocalCacheStore, Vec<PathBuf>) {
    let root = op
        .cache_dir
        .or_else(|| ctx.config.cache.dir.clone())
        .unwrap_or_else(LocalCacheStore::default_root);
    let paths = if op.paths.is_empty() {
        ctx.config.cache.paths.clone()
    } else {
        op.paths
    };

    debug!("Cache store at {}, paths {:?}", root.display(), paths);
    (
        LocalCacheStore::new(root, ctx.working_directory.clone()),
        paths,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::JobArgs;
    use crate::config::Config;
    use crate::report::Reporter;
    use tempfile::TempDir;

    fn op(cache_dir: Option<PathBuf>, paths: Vec<PathBuf>) -> CacheOpArgs {
        CacheOpArgs {
            job: JobArgs {
                target: "test".to_string(),
                distribution: 1,
                platform: Some("linux".to_string()),
                arch: Some("x64".to_string()),
            },
            paths,
            cache_dir,
        }
    }

    fn context(workspace: &TempDir, output: PathBuf) -> Context {
        Context {
            config: Config::default(),
            reporter: Reporter::new(Some(output)),
            working_directory: workspace.path().to_path_buf(),
            debug: false,
        }
    }

    #[test]
    fn flags_override_config() {
        let workspace = TempDir::new().unwrap();
        let ctx = context(&workspace, workspace.path().join("out"));

        let (store, paths) = store_for(
            op(Some(PathBuf::from("/tmp/store")), vec![PathBuf::from("dist")]),
            &ctx,
        );
        assert_eq!(store.root(), PathBuf::from("/tmp/store"));
        assert_eq!(paths, vec![PathBuf::from("dist")]);

        let (_, paths) = store_for(op(None, vec![]), &ctx);
        assert_eq!(paths, vec![PathBuf::from("node_modules/.cache/nx")]);
    }

    #[tokio::test]
    async fn save_then_restore_reports_hit() {
        let workspace = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let output = workspace.path().join("out");
        let ctx = context(&workspace, output.clone());

        let artifact = workspace.path().join("dist/app.js");
        std::fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        std::fs::write(&artifact, "bundle").unwrap();

        let dist = vec![PathBuf::from("dist")];
        save(op(Some(store_dir.path().to_path_buf()), dist.clone()), &ctx)
            .await
            .unwrap();
        // Racing save of the same key is not an error
        save(op(Some(store_dir.path().to_path_buf()), dist.clone()), &ctx)
            .await
            .unwrap();

        std::fs::remove_dir_all(workspace.path().join("dist")).unwrap();
        restore(op(Some(store_dir.path().to_path_buf()), dist), &ctx)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&artifact).unwrap(), "bundle");
        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("cacheHit<<"));
        assert!(written.contains("-test-1\n"));
    }
}
