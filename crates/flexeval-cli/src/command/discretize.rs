use std::{collections::BTreeMap, path::PathBuf};

use chrono::Utc;
use clap::{Args, ValueEnum};
use flexeval_features::{
    instance_table::MISSING_VALUE,
    transform::{
        DependentVariableTransformer, IdentityTransformer, MedianTransformer, ThresholdTransformer,
    },
};

use crate::{
    schema::{config::EvalConfig, input::RawValue, report::DiscretizeReport},
    util::{self, Output},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Method {
    /// Split at a fixed threshold
    #[default]
    Threshold,
    /// Split at the median of the given values
    Median,
    /// Keep values unchanged
    Identity,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct DiscretizeArg {
    /// Path to a JSON object mapping instance ids to raw values
    pub values: PathBuf,

    #[arg(long, value_enum, default_value_t)]
    pub method: Method,

    /// Threshold of the threshold method, in the unit of the raw values
    #[arg(long, default_value_t = 730.0)]
    pub threshold: f64,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &DiscretizeArg, config: &EvalConfig) -> anyhow::Result<()> {
    let values: BTreeMap<String, RawValue> = util::read_json_file("values", &arg.values)?;
    let raw = values
        .into_iter()
        .map(|(id, value)| {
            let mut value = value.to_string();
            if value == config.missing_value {
                MISSING_VALUE.clone_into(&mut value);
            }
            (id, value)
        })
        .collect::<BTreeMap<_, _>>();

    let transformer = transformer(arg, config, &raw)?;
    let classes = raw
        .into_iter()
        .map(|(id, value)| Ok((id, transformer.transform(&value)?)))
        .collect::<anyhow::Result<BTreeMap<_, _>>>()?;
    tracing::info!(
        transformer = %transformer.description(),
        instances = classes.len(),
        "discretized values"
    );

    let report = DiscretizeReport {
        generated_at: Utc::now(),
        transformer: transformer.description(),
        classes,
    };
    Output::save_json(&report, arg.output.clone())
}

fn transformer(
    arg: &DiscretizeArg,
    config: &EvalConfig,
    raw: &BTreeMap<String, String>,
) -> anyhow::Result<Box<dyn DependentVariableTransformer>> {
    let low = config.low_descriptor.as_str();
    let high = config.high_descriptor.as_str();
    let transformer: Box<dyn DependentVariableTransformer> = match arg.method {
        Method::Threshold => Box::new(ThresholdTransformer::new(arg.threshold, low, high)),
        Method::Median => Box::new(MedianTransformer::from_raw_values(
            raw.values().map(String::as_str),
            low,
            high,
        )?),
        Method::Identity => Box::new(IdentityTransformer),
    };
    Ok(transformer)
}
