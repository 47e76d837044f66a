use std::io::{BufWriter, Write};

use anyhow::{bail, Result};
use clap::Parser;
use interop::{decode_with, DecodeOptions, MetricKind, MetricTable};

#[derive(Parser)]
struct Args {
    /// Metrics file path
    #[clap(required = true)]
    path: String,
    /// Metrics kind (inferred from the file name when omitted)
    #[clap(long)]
    kind: Option<String>,
    /// Read through a memory map
    #[clap(long)]
    mmap: bool,
    /// Fail if the header's record length disagrees with the known layout
    #[clap(long)]
    strict: bool,
    /// Verbosity level (-v for info, -vv for debug)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_kind(name: &str) -> Result<MetricKind> {
    match MetricKind::ALL
        .into_iter()
        .find(|kind| kind.name().eq_ignore_ascii_case(name))
    {
        Some(kind) => Ok(kind),
        None => bail!("unknown metrics kind: {name}"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let kind = match args.kind.as_deref() {
        Some(name) => parse_kind(name)?,
        None => MetricKind::from_path(&args.path)?,
    };
    let options = DecodeOptions::default()
        .mmap(args.mmap)
        .strict_record_len(args.strict);
    let table = decode_with(&args.path, kind, &options)?;
    log::info!("decoded {} {} records from {}", table.len(), kind, args.path);

    let mut out = BufWriter::new(std::io::stdout().lock());
    let columns = table.columns();
    let mut names: Vec<String> = columns.names().iter().map(|n| n.to_string()).collect();
    if let MetricTable::Quality(q) = &table {
        names.extend((1..=q.nclust.ncols()).map(|b| format!("Q{b}")));
    }
    writeln!(out, "{}", names.join("\t"))?;

    for row in 0..table.len() {
        let mut fields: Vec<String> = columns
            .iter()
            .filter_map(|(_, column)| column.display_at(row))
            .collect();
        if let MetricTable::Quality(q) = &table {
            if let Some(counts) = q.nclust.row(row) {
                fields.extend(counts.iter().map(|c| c.to_string()));
            }
        }
        writeln!(out, "{}", fields.join("\t"))?;
    }
    out.flush()?;

    Ok(())
}
