// Runtime executor: dataset + config in, encoded chart or summary out

use crate::aggregate::{self, DateAverage, PlatformPostTypeAverage, PlatformQuartiles};
use crate::compiler::{self, ChartKind};
use crate::config::Config;
use crate::data::Dataset;
use crate::error::Error;
use crate::graph;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// Render one chart kind to bytes in the configured output format
pub fn render_chart(kind: ChartKind, dataset: &Dataset, config: &Config) -> Result<Vec<u8>> {
    ensure_rows(dataset)?;
    info!(chart = ?kind, records = dataset.len(), "Rendering chart");

    let scene = compiler::compile(kind, dataset, config)
        .with_context(|| format!("Failed to build {:?} chart", kind))?;
    graph::render(&scene, config.canvas.format)
}

/// All three aggregations behind the charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub quartiles_by_platform: Vec<PlatformQuartiles>,
    pub platform_post_type_averages: Vec<PlatformPostTypeAverage>,
    pub date_averages: Vec<DateAverage>,
}

pub fn summarize(dataset: &Dataset) -> Result<Summary> {
    ensure_rows(dataset)?;
    let records = dataset.records();
    Ok(Summary {
        quartiles_by_platform: aggregate::quartiles_by_platform(records)?,
        platform_post_type_averages: aggregate::average_by_platform_post_type(records),
        date_averages: aggregate::average_by_date(records),
    })
}

pub fn summary_json(dataset: &Dataset, pretty: bool) -> Result<String> {
    let summary = summarize(dataset)?;
    let json = if pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    };
    json.context("Failed to serialize summary")
}

fn ensure_rows(dataset: &Dataset) -> Result<()> {
    if dataset.is_empty() {
        return Err(Error::InvalidInput("Dataset must contain at least one data row".into()).into());
    }
    Ok(())
}
