//! Matrix command - generate the affected job matrix

use crate::cli::args::{non_empty, MatrixArgs};
use crate::cli::Context;
use crate::config::{Config, RunInputs};
use crate::error::MatrixResult;
use crate::matrix::{build_matrix, Matrix};
use crate::nx::{GitBoundaries, NxCli};
use crate::report::Reporter;
use tracing::{debug, info};

/// Execute the matrix command
pub async fn execute(args: MatrixArgs, ctx: &Context) -> MatrixResult<()> {
    let mut inputs = RunInputs::parse(
        &args.targets,
        args.distribution.as_deref().unwrap_or_default(),
        ctx.config.matrix.default_distribution,
    )?;
    inputs.working_directory = ctx.working_directory.clone();
    inputs.debug = ctx.debug;
    inputs.args = args.forwarded_args();
    inputs.boundaries = GitBoundaries {
        base: non_empty(args.base),
        head: non_empty(args.head),
    };
    debug!("Run inputs: {:?}", inputs);

    let matrix = generate(&inputs, &ctx.config, &ctx.reporter).await?;

    ctx.reporter.set_output("matrix", &matrix).await?;
    ctx.reporter
        .set_output("hasChanges", &matrix.has_changes())
        .await?;
    Ok(())
}

/// Build the matrix for `inputs` inside a log group
pub async fn generate(
    inputs: &RunInputs,
    config: &Config,
    reporter: &Reporter,
) -> MatrixResult<Matrix> {
    reporter.group(&format!(
        "Generating affected matrix for {}",
        inputs.targets.join(",")
    ));
    debug!("Distribution: {}", inputs.distribution);

    let nx = NxCli::new(inputs.working_directory.clone(), config.nx.bin.clone())
        .with_select(config.nx.select.clone())
        .with_boundaries(inputs.boundaries.clone())
        .with_args(inputs.args.clone())
        .with_verbose(inputs.debug);

    let result = match nx.ensure_installed() {
        Ok(()) => build_matrix(&inputs.targets, &inputs.distribution, &nx).await,
        Err(e) => Err(e),
    };

    reporter.end_group();

    let matrix = result?;
    for target in &inputs.targets {
        debug!("{}: {} jobs", target, matrix.rows_for(target).count());
    }
    info!(
        "Generated affected matrix: {} jobs across {} targets",
        matrix.include.len(),
        inputs.targets.len()
    );
    Ok(matrix)
}
