use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bank_statement_sql::{aggregate, Config, FileFormat, ParserBuilder, SqlEmitter, Summary};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "statement-sql", version, about = "Generate condominium SQL from a BPI statement export")]
struct Cli {
    /// Statement CSV (stdin when omitted)
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Where to write the SQL (stdout when omitted)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// JSON file overriding rule tables and database references
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Building UUID, overrides the configured one
    #[arg(long = "building-id")]
    building_id: Option<String>,

    /// Print run statistics instead of SQL
    #[arg(long)]
    summary: bool,

    /// Log classification detail to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(building_id) = cli.building_id {
        config.emitter.building_id = building_id;
    }

    let content = read_input(cli.input.as_ref())?;
    let transactions = ParserBuilder::new()
        .content_bytes(&content)
        .format(FileFormat::BpiCsv)
        .rules(config.rules)
        .parse()
        .context("parsing statement")?;
    let summary = aggregate(&transactions);

    let mut writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };

    if cli.summary {
        write_summary(&mut writer, &summary)?;
    } else {
        SqlEmitter::new(config.emitter)
            .emit(&summary, &mut writer)
            .context("writing SQL")?;
    }

    writer.flush().context("flushing output")
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Raw bytes: undecodable rows are skipped by the parser, not fatal here.
fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    match path {
        Some(path) => {
            File::open(path)
                .with_context(|| format!("opening {}", path.display()))?
                .read_to_end(&mut content)
                .with_context(|| format!("reading {}", path.display()))?;
        }
        None => {
            io::stdin().read_to_end(&mut content).context("reading stdin")?;
        }
    }
    Ok(content)
}

fn write_summary(out: &mut dyn Write, summary: &Summary) -> Result<()> {
    writeln!(out, "Processed transactions:")?;
    writeln!(out, "  Income: {}", summary.income_count())?;
    writeln!(out, "  Expenses: {}", summary.expense_count())?;

    for (year, bucket) in &summary.years {
        writeln!(out, "  {}: {} income, {} expenses", year, bucket.income.len(), bucket.expense.len())?;
    }

    writeln!(out)?;
    writeln!(out, "Payments per member:")?;
    for (member, entry) in &summary.ledger {
        writeln!(out, "  {}: {} payments, total €{:.2}", member, entry.count, entry.total)?;
    }
    Ok(())
}
