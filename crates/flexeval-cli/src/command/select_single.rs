use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use flexeval_features::{instance_table::InstanceTable, selector::SingleVariableBaselineSelector};

use crate::{
    schema::report::SelectionReport,
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SelectSingleArg {
    /// 1-based iteration; selects the iteration-th feature in sorted order
    #[arg(long)]
    pub iteration: usize,

    /// Available feature names
    #[arg(required_unless_present = "table", conflicts_with = "table")]
    pub features: Vec<String>,

    /// Take the available features from this instance table JSON file
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SelectSingleArg) -> anyhow::Result<()> {
    let available = available_features(arg)?;
    let selector = SingleVariableBaselineSelector;
    let selected = selector.select_features(arg.iteration, available)?;
    tracing::info!(iteration = arg.iteration, ?selected, "selected feature");

    let report = SelectionReport {
        generated_at: Utc::now(),
        selector: SingleVariableBaselineSelector::NAME.to_owned(),
        iteration: arg.iteration,
        selected,
    };
    Output::save_json(&report, arg.output.clone())
}

/// Feature names from `--table` if given, else from the command line.
fn available_features(arg: &SelectSingleArg) -> anyhow::Result<Vec<String>> {
    match &arg.table {
        Some(path) => {
            let table: InstanceTable = util::read_json_file("instance table", path)?;
            Ok(table.data_point_names().to_vec())
        }
        None => Ok(arg.features.clone()),
    }
}
