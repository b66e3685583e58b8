extern crate sap_orient;

use clap::Parser;
use sap_orient::{run_batch, FileDocumentSink};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct BatchArgs {
    /// Plot schedule spreadsheet (.xlsx/.xlsm/.xltx/.xltm/.xls/.csv),
    /// headers on the second row
    schedule_file: PathBuf,
    /// Directory containing the SAP assessment XML files
    xml_dir: PathBuf,
    /// Directory the corrected XML files are written into
    #[arg(long, short, default_value = "edited_xmls")]
    output_dir: PathBuf,
    /// Worksheet to read; defaults to the first sheet in the workbook
    #[arg(long)]
    sheet: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = BatchArgs::parse();
    fs::create_dir_all(&args.output_dir)?;
    let mut sink = FileDocumentSink::new(args.output_dir.clone());

    let outcome = run_batch(
        &args.schedule_file,
        args.sheet.as_deref(),
        &args.xml_dir,
        &mut sink,
    )?;

    info!(
        written = outcome.written.len(),
        skipped = outcome.skipped_missing.len(),
        output_dir = %args.output_dir.display(),
        "finished"
    );
    Ok(())
}
