use std::{path::PathBuf, sync::Arc};

use clap::Args;
use flexeval_features::{
    aggregate::FeatureSpaceAggregator,
    instance_table::{InstanceTable, MISSING_VALUE},
    source::{DataSource, InMemorySource},
};

use crate::{
    schema::{config::EvalConfig, input::SourceFile},
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct AggregateArg {
    /// Paths to the data source JSON files
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Description of the aggregated feature space
    #[arg(long, default_value = "Aggregate")]
    pub description: String,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AggregateArg, config: &EvalConfig) -> anyhow::Result<()> {
    let sources = arg
        .sources
        .iter()
        .map(|path| {
            let file: SourceFile = util::read_json_file("data source", path)?;
            Ok(in_memory_source(file, &config.missing_value))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let table = aggregate(&arg.description, sources, &config.separator)?;
    Output::save_json(&table, arg.output.clone())
}

fn in_memory_source(file: SourceFile, missing_value: &str) -> Arc<dyn DataSource> {
    let SourceFile {
        description,
        tolerance,
        mut instances,
    } = file;
    if missing_value != MISSING_VALUE {
        let replaced = instances.replace_value(missing_value, MISSING_VALUE);
        tracing::debug!(source = %description, replaced, "normalized missing values");
    }
    let source = InMemorySource::new(description, instances);
    match tolerance {
        Some(tolerance) => Arc::new(source.with_tolerance(tolerance)),
        None => Arc::new(source),
    }
}

fn aggregate(
    description: &str,
    sources: Vec<Arc<dyn DataSource>>,
    separator: &str,
) -> anyhow::Result<InstanceTable> {
    let table = FeatureSpaceAggregator::new(description, sources)
        .with_separator(separator)
        .build()?;
    tracing::info!(
        instances = table.len(),
        features = table.num_data_points(),
        proportion_missing = table.proportion_missing(),
        "aggregated feature space"
    );
    Ok(table)
}
