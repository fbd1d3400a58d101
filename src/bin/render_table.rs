use clap::Parser;
use genpdfi_tables::config::{FontFile, TableJob};
use genpdfi_tables::surface::Surface;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "render_table")]
#[command(about = "Render a JSON table job to a PDF file", long_about = None)]
struct Args {
    /// Path to the JSON job file
    #[arg(value_name = "JOB")]
    job: PathBuf,

    /// Path of the PDF file to write
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// TrueType font to register, as FAMILY[:STYLE]=PATH (repeatable)
    #[arg(long = "font", value_name = "FAMILY[:STYLE]=PATH")]
    fonts: Vec<FontFile>,

    /// Log every drawn row
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), genpdfi_tables::Error> {
    let job = TableJob::from_path(&args.job)?;
    let surface = job.render(&args.fonts)?;
    let pages = surface.page_count();
    let rows = job.data.rows().flatten().count();
    surface.save(&args.output)?;

    println!(
        "Rendered {} rows on {} page(s) to {}",
        rows,
        pages,
        args.output.display()
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if !args.job.exists() {
        eprintln!("Error: The file '{}' does not exist", args.job.display());
        std::process::exit(1);
    }

    if let Err(err) = run(&args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
