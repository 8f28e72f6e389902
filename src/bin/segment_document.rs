//! Segment JSON glyph dumps and print a JSON summary
//!
//! Usage:
//!   cargo run --release --bin segment_document -- page_dump.json [more.json ...]
//!   cargo run --release --bin segment_document -- --model zones.json --workers 4 *.json
//!   cargo run --release --bin segment_document -- --config pipeline.json dump.json
//!   cargo run --release --bin segment_document -- --timeout 30 --skip-bad-pages *.json
//!
//! Without `--model` only segmentation and reading order run. A model that is
//! given but cannot be loaded is a fatal error.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use zone_oxide::classification::LinearZoneModel;
use zone_oxide::pipeline::{BatchProcessor, JsonCharacterExtractor, Pipeline, ProcessedDocument};
use zone_oxide::{Document, PipelineConfig, Result};

struct CliConfig {
    inputs: Vec<PathBuf>,
    model: Option<PathBuf>,
    config: Option<PathBuf>,
    workers: Option<usize>,
    timeout: Option<Duration>,
    skip_bad_pages: bool,
}

impl CliConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut inputs = Vec::new();
        let mut model = None;
        let mut config = None;
        let mut workers = None;
        let mut timeout = None;
        let mut skip_bad_pages = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--model" => {
                    i += 1;
                    if i < args.len() {
                        model = Some(PathBuf::from(&args[i]));
                    }
                },
                "--config" => {
                    i += 1;
                    if i < args.len() {
                        config = Some(PathBuf::from(&args[i]));
                    }
                },
                "--workers" => {
                    i += 1;
                    if i < args.len() {
                        workers = args[i].parse().ok();
                    }
                },
                "--timeout" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse::<f64>().ok().map(Duration::from_secs_f64);
                    }
                },
                "--skip-bad-pages" => skip_bad_pages = true,
                other => inputs.push(PathBuf::from(other)),
            }
            i += 1;
        }

        Self {
            inputs,
            model,
            config,
            workers,
            timeout,
            skip_bad_pages,
        }
    }
}

fn summarize_structure(document: &Document) -> Value {
    let zones: Vec<Value> = document
        .pages()
        .iter()
        .flat_map(|page| {
            page.zones().iter().map(move |zone| {
                json!({
                    "page": page.index(),
                    "bounds": zone.bounds(),
                    "lines": zone.lines().len(),
                    "label": zone.label(),
                    "text": zone.text(),
                })
            })
        })
        .collect();
    let unsegmented: Vec<usize> = document
        .pages()
        .iter()
        .filter(|page| !page.chunks().is_empty())
        .map(|page| page.index())
        .collect();
    json!({
        "pages": document.pages().len(),
        "unsegmented_pages": unsegmented,
        "zones": zones,
    })
}

fn summarize(processed: &ProcessedDocument) -> Value {
    let mut summary = summarize_structure(&processed.document);
    summary["references"] = json!(processed.references);
    let failed_pages: Vec<Value> = processed
        .failed_pages
        .iter()
        .map(|f| json!({ "page": f.page, "error": f.error.to_string() }))
        .collect();
    summary["failed_pages"] = json!(failed_pages);
    summary
}

fn build_pipeline(cli: &CliConfig) -> Result<Pipeline> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if cli.skip_bad_pages {
        config.segmentation.skip_malformed_pages = true;
    }
    let mut pipeline = Pipeline::new(config);
    if let Some(path) = &cli.model {
        let model = LinearZoneModel::from_json_file(path)?;
        pipeline = pipeline.with_model(Arc::new(model));
    }
    Ok(pipeline)
}

fn main() {
    env_logger::init();

    let cli = CliConfig::from_args();
    if cli.inputs.is_empty() {
        eprintln!(
            "Usage: segment_document [--model <file>] [--config <file>] [--workers <n>] \
             [--timeout <secs>] [--skip-bad-pages] <dump.json>..."
        );
        std::process::exit(2);
    }

    let pipeline = match build_pipeline(&cli) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            eprintln!("Failed to set up pipeline: {}", e);
            std::process::exit(1);
        },
    };

    let start_time = Instant::now();
    let mut processor = match cli.workers {
        Some(n) => BatchProcessor::new(n),
        None => BatchProcessor::default(),
    };
    if let Some(timeout) = cli.timeout {
        processor = processor.with_timeout(timeout);
    }
    let extractor = Arc::new(JsonCharacterExtractor::new());

    let summaries: Vec<std::result::Result<Value, String>> = if pipeline.has_model() {
        processor
            .process_files(&pipeline, extractor, cli.inputs.clone())
            .into_iter()
            .map(|r| match r {
                Some(Ok(processed)) => Ok(summarize(&processed)),
                Some(Err(e)) => Err(e.to_string()),
                None => Err("cancelled".to_string()),
            })
            .collect()
    } else {
        processor
            .structure_files(&pipeline, extractor, cli.inputs.clone())
            .into_iter()
            .map(|r| match r {
                Some(Ok(document)) => Ok(summarize_structure(&document)),
                Some(Err(e)) => Err(e.to_string()),
                None => Err("cancelled".to_string()),
            })
            .collect()
    };

    let mut failed = 0;
    let outputs: Vec<Value> = cli
        .inputs
        .iter()
        .zip(summaries)
        .map(|(path, summary)| {
            let mut output = json!({ "file": path.display().to_string() });
            match summary {
                Ok(Value::Object(fields)) => {
                    if let Value::Object(out) = &mut output {
                        out.extend(fields);
                    }
                },
                Ok(other) => output["result"] = other,
                Err(e) => {
                    output["error"] = json!(e);
                    failed += 1;
                },
            }
            output
        })
        .collect();

    match serde_json::to_string_pretty(&outputs) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Failed to serialize summary: {}", e);
            std::process::exit(1);
        },
    }

    eprintln!(
        "Processed {} files ({} failed) in {:.2}s",
        cli.inputs.len(),
        failed,
        start_time.elapsed().as_secs_f64()
    );
    if failed > 0 {
        std::process::exit(1);
    }
}
