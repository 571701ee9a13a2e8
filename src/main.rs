use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use csv2doc::cache::TableCache;
use csv2doc::options::{projection_from_lists, SavedOptions};
use csv2doc::{
    load_file, run_pipeline, ExportFormat, FilterSpec, PipelineOptions, SortOrder, SortSpec,
};

/// Convert a CSV (or JSON records) file into a CSV, HTML or DOCX document.
#[derive(Parser, Debug)]
#[command(name = "csv2doc", version, about)]
struct Args {
    /// Input table (.csv or .json)
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// Document title (HTML and DOCX)
    #[arg(short, long)]
    title: Option<String>,

    /// Output path; defaults to the suggested file name
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Load options from a saved options file
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Keep rows whose COLUMN equals VALUE (repeat to accept more values)
    #[arg(long = "filter", value_name = "COLUMN=VALUE")]
    filters: Vec<String>,

    /// Only output these columns (wins over --exclude)
    #[arg(long = "include", value_name = "COLUMN")]
    include: Vec<String>,

    /// Drop these columns from the output
    #[arg(long = "exclude", value_name = "COLUMN")]
    exclude: Vec<String>,

    /// Sort by these columns, first one primary
    #[arg(long = "sort-by", value_name = "COLUMN")]
    sort_by: Vec<String>,

    /// Sort in descending order; also applies to a sort loaded from --options
    #[arg(long)]
    descending: bool,

    /// Split the output into groups on these columns
    #[arg(long = "group-by", value_name = "COLUMN")]
    group_by: Vec<String>,

    /// Write the effective options to FILE
    #[arg(long, value_name = "FILE")]
    save_options: Option<PathBuf>,

    /// Keep uploaded tables and their last-used options in DIR; a later run
    /// on the same file without --options reuses them
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Print the distinct values of COLUMN and exit
    #[arg(long, value_name = "COLUMN")]
    list_values: Option<String>,
}

fn parse_filters(raw: &[String]) -> Result<FilterSpec> {
    let mut spec = FilterSpec::new();
    for item in raw {
        let Some((col, value)) = item.split_once('=') else {
            bail!("--filter expects COLUMN=VALUE, got '{item}'");
        };
        spec.entry(col.to_string())
            .or_insert_with(BTreeSet::new)
            .insert(value.to_string());
    }
    Ok(spec)
}

/// Command-line flags replace the matching section of the loaded options.
/// `--descending` alone flips the order of a loaded sort.
fn apply_flags(args: &Args, options: &mut PipelineOptions) -> Result<()> {
    if !args.filters.is_empty() {
        options.filter = parse_filters(&args.filters)?;
    }
    if !args.include.is_empty() || !args.exclude.is_empty() {
        options.projection = projection_from_lists(&args.include, &args.exclude);
    }
    if !args.sort_by.is_empty() {
        options.sort = SortSpec::new(args.sort_by.iter().cloned(), SortOrder::Ascending);
    }
    if args.descending {
        options.sort.order = SortOrder::Descending;
    }
    if !args.group_by.is_empty() {
        options.group = args.group_by.clone();
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = load_file(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    info!(
        "loaded {}: {} rows, {} columns",
        args.input.display(),
        table.len(),
        table.column_count()
    );

    if let Some(col) = &args.list_values {
        let Some(values) = table.unique_values(col) else {
            bail!("no column named '{col}'");
        };
        for v in values {
            println!("{v}");
        }
        return Ok(());
    }

    let mut cache = args
        .cache_dir
        .as_ref()
        .map(|dir| TableCache::persistent(dir))
        .transpose()?;
    let cache_key = match cache.as_mut() {
        Some(cache) => {
            let name = args
                .input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some(cache.insert(&name, table.clone())?)
        }
        None => None,
    };

    let mut options = match (&args.options, cache.as_ref().zip(cache_key.as_ref())) {
        (Some(path), _) => SavedOptions::load(path)?.to_pipeline_options(),
        (None, Some((cache, key))) => cache
            .options(key)
            .map(SavedOptions::to_pipeline_options)
            .unwrap_or_default(),
        (None, None) => Default::default(),
    };
    apply_flags(&args, &mut options)?;

    let saved = SavedOptions::from_pipeline_options(&options);
    if let Some(path) = &args.save_options {
        saved.save(path)?;
        info!("saved options to {}", path.display());
    }
    if let (Some(cache), Some(key)) = (cache.as_mut(), cache_key.as_ref()) {
        cache.save_options(key, saved)?;
    }

    let export = run_pipeline(&table, &options, args.format, args.title.as_deref())
        .with_context(|| format!("exporting as {:?}", args.format))?;
    if !export.warnings.is_empty() {
        warn!(
            "{} option(s) referred to missing columns and were skipped",
            export.warnings.len()
        );
    }

    let out = args
        .output
        .unwrap_or_else(|| PathBuf::from(&export.document.suggested_name));
    std::fs::write(&out, &export.document.bytes)
        .with_context(|| format!("writing {}", out.display()))?;
    info!(
        "wrote {} ({}, {} bytes)",
        out.display(),
        export.document.mime_type,
        export.document.bytes.len()
    );
    Ok(())
}
