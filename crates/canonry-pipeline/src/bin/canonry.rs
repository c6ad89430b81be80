//! Canonry batch runner.
//!
//! Resolve a CSV of noisy organization names against a canonical reference
//! registry and write the enriched table back out.
//!
//! Usage:
//!   canonry --reference registry.csv --input raw.csv --output resolved.csv
//!   canonry -r registry.csv -i raw.csv -o out.csv --seed 42 --top-k 3
//!   canonry -r registry.csv -i raw.csv -o out.csv --provider openai --model text-embedding-3-small

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use canonry_core::{RawRecord, ReferenceEntity, Table};
use canonry_inference::{backend_from_env, EmbeddingProvider};
use canonry_pipeline::{AugmentConfig, Pipeline, PipelineConfig, PipelineOutcome};

#[derive(Debug)]
struct Args {
    reference: PathBuf,
    input: PathBuf,
    output: PathBuf,
    top_k: usize,
    augment_count: usize,
    seed: Option<u64>,
    min_score: Option<f32>,
    provider: EmbeddingProvider,
    model: Option<String>,
    verbose: bool,
}

const USAGE: &str = "\
canonry - resolve noisy organization names against a canonical registry

USAGE:
    canonry --reference <FILE> --input <FILE> --output <FILE> [OPTIONS]

REQUIRED:
    -r, --reference <FILE>   Reference registry CSV (entity_id,name,region)
    -i, --input <FILE>       Raw records CSV (name required, entity_id optional)
    -o, --output <FILE>      Destination CSV for the enriched table

OPTIONS:
    -k, --top-k <N>          Candidates per query (default: 5)
    -a, --augment-count <K>  Synthetic variants per entity (default: 10)
    -s, --seed <S>           Fix the augmentation RNG seed
        --min-score <X>      Reject rank-1 matches scoring below X
    -p, --provider <NAME>    Embedding provider: ollama | openai (default: ollama)
    -m, --model <NAME>       Override the embedding model
    -v, --verbose            Debug-level logging
    -h, --help               Show this help
";

fn parse_args() -> anyhow::Result<Args> {
    let argv: Vec<String> = env::args().collect();

    let mut reference = None;
    let mut input = None;
    let mut output = None;
    let mut top_k = canonry_core::defaults::TOP_K;
    let mut augment_count = canonry_core::defaults::AUGMENT_COUNT;
    let mut seed = None;
    let mut min_score = None;
    let mut provider = EmbeddingProvider::default();
    let mut model = None;
    let mut verbose = false;

    let mut i = 1;
    while i < argv.len() {
        let arg = argv[i].as_str();
        let value = |i: &mut usize| -> anyhow::Result<String> {
            *i += 1;
            argv.get(*i)
                .cloned()
                .with_context(|| format!("missing value for {}", arg))
        };

        match arg {
            "--reference" | "-r" => reference = Some(PathBuf::from(value(&mut i)?)),
            "--input" | "-i" => input = Some(PathBuf::from(value(&mut i)?)),
            "--output" | "-o" => output = Some(PathBuf::from(value(&mut i)?)),
            "--top-k" | "-k" => top_k = value(&mut i)?.parse().context("invalid --top-k")?,
            "--augment-count" | "-a" => {
                augment_count = value(&mut i)?.parse().context("invalid --augment-count")?
            }
            "--seed" | "-s" => seed = Some(value(&mut i)?.parse().context("invalid --seed")?),
            "--min-score" => {
                min_score = Some(value(&mut i)?.parse().context("invalid --min-score")?)
            }
            "--provider" | "-p" => provider = value(&mut i)?.parse()?,
            "--model" | "-m" => model = Some(value(&mut i)?),
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => {
                print!("{}", USAGE);
                std::process::exit(0);
            }
            other => bail!("unknown argument '{}'\n\n{}", other, USAGE),
        }
        i += 1;
    }

    Ok(Args {
        reference: reference.context("--reference is required")?,
        input: input.context("--input is required")?,
        output: output.context("--output is required")?,
        top_k,
        augment_count,
        seed,
        min_score,
        provider,
        model,
        verbose,
    })
}

fn read_table(path: &Path) -> anyhow::Result<Table> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader
        .headers()
        .context("failed to read CSV header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record.context("failed to read CSV row")?;
        table.push_row(record.iter().map(str::to_string).collect())?;
    }
    Ok(table)
}

fn write_output(path: &Path, outcome: &PipelineOutcome) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let extra_headers: Vec<&str> = outcome
        .records
        .first()
        .map(|r| r.extra.iter().map(|(k, _)| k.as_str()).collect())
        .unwrap_or_default();

    let mut header = vec!["entity_id", "name"];
    header.extend(&extra_headers);
    header.push("predicted_entity_id");
    header.push("predicted_title");
    writer.write_record(&header)?;

    for record in &outcome.records {
        let mut row: Vec<&str> = vec![record.entity_id.as_deref().unwrap_or(""), &record.name];
        row.extend(record.extra.iter().map(|(_, v)| v.as_str()));
        row.push(record.predicted_entity_id.as_deref().unwrap_or(""));
        row.push(record.predicted_title.as_deref().unwrap_or(""));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let reference_table = read_table(&args.reference)?;
    let raw_table = read_table(&args.input)?;

    let reference = ReferenceEntity::from_table(&reference_table)?;
    let raw = RawRecord::from_table(&raw_table)?;
    info!(
        reference_rows = reference.len(),
        raw_rows = raw.len(),
        provider = %args.provider,
        "Input loaded"
    );

    let backend = backend_from_env(args.provider, args.model.clone())?;

    let config = PipelineConfig {
        top_k: args.top_k,
        augment: AugmentConfig {
            count: args.augment_count,
            seed: args.seed,
            ..AugmentConfig::default()
        },
        min_score: args.min_score,
    };

    let pipeline = Pipeline::new(config, Arc::from(backend))?;
    let outcome = pipeline.run(reference, raw).await?;

    write_output(&args.output, &outcome)?;

    println!("Resolved {} records -> {}", outcome.records.len(), args.output.display());
    println!("Train accuracy (synthetic variants): {:.4}", outcome.train_accuracy);
    match outcome.test_accuracy {
        Some(acc) => println!("Test accuracy (labeled records):     {:.4}", acc),
        None => println!("Test accuracy: n/a (no labeled records)"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
