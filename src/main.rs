use anyhow::Result;
use clap::Parser;
use deindex::{stream, Table};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Drop the first column of a CSV file, e.g. the row index a dataframe export prepends"
)]
struct Args {
    /// Source CSV file (must have a header row)
    input: PathBuf,
    /// Destination CSV file (created or overwritten)
    output: PathBuf,
    /// Copy record-by-record instead of loading the whole table into memory
    #[arg(long)]
    stream: bool,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // ─── 2) load → transform → save ──────────────────────────────────
    if args.stream {
        let rows = stream::drop_first_field(&args.input, &args.output)?;
        info!(rows, "streamed {}", args.input.display());
    } else {
        let table = Table::load(&args.input)?.drop_first_column()?;
        table.save(&args.output)?;
        info!(
            rows = table.rows.len(),
            columns = table.headers.len(),
            "converted {}",
            args.input.display()
        );
    }

    // ─── 3) report ───────────────────────────────────────────────────
    println!(
        "✅ Removed the first column; wrote {}",
        args.output.display()
    );
    Ok(())
}
