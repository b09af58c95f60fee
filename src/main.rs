// src/main.rs
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use serde::Deserialize;
use serde_json::json;
use sleepscope::store::ManualSource;
use sleepscope::{ChannelDataList, DataBatchItem, DisplayWindow, PlotPreferences};

// 一个文件里可以是单个批次，也可以是批次列表
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchFile {
    Many(Vec<Vec<DataBatchItem>>),
    One(Vec<DataBatchItem>),
}

#[derive(Parser)]
#[command(name = "sleepscope")]
#[command(about = "Ingest PSG batches and print one processed display window")]
struct Cli {
    /// JSON file holding one batch or a list of batches
    batches: PathBuf,

    /// Plot preferences JSON
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Window start in seconds (defaults to the recording start)
    #[arg(long)]
    start: Option<f64>,

    /// Window end in seconds (defaults to start + display interval)
    #[arg(long)]
    end: Option<f64>,

    /// Horizontal resolution of the plot
    #[arg(long, default_value = "1000")]
    pixels: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let text = fs::read_to_string(&args.batches)
        .with_context(|| format!("failed to read {}", args.batches.display()))?;
    let batches = match serde_json::from_str(&text).context("batch file is not valid JSON")? {
        BatchFile::Many(batches) => batches,
        BatchFile::One(batch) => vec![batch],
    };
    let mut prefs = match &args.prefs {
        Some(path) => PlotPreferences::from_json_file(path)
            .with_context(|| format!("failed to load preferences from {}", path.display()))?,
        None => PlotPreferences::default(),
    };

    let mut list = ChannelDataList::new();
    let mut source = ManualSource::new(batches);
    let report = list.ingest_from(&mut source).context("failed to ingest batches")?;
    info!(
        "ingested: {} new chunks, {} merges, {} duplicates, {} annotations",
        report.inserted,
        report.merged,
        report.duplicates.len(),
        report.annotations
    );

    let Some(recording) = list.time_range() else {
        bail!("no data in {}", args.batches.display());
    };
    let start = args.start.unwrap_or(recording.start_time);
    let end = args
        .end
        .unwrap_or_else(|| (start + prefs.display_interval).min(recording.end_time));
    let window = DisplayWindow::new(start, end, args.pixels);
    let channels = list.get_data(window, &mut prefs);

    let output = json!({
        "timeRange": recording,
        "channels": channels,
        "duplicates": report.duplicates,
        "summary": list.active_score().map(|score| score.get_summary()),
        "report": list.active_score().map(|score| score.get_summary().to_report_rows()),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
