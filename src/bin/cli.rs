//! urlshort CLI
//!
//! Inspects and edits a store file while no server holds it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use urlshort::merge::{merge_all, Source};
use urlshort::{Format, ShortenerError, Store};

/// urlshort CLI
#[derive(Parser, Debug)]
#[command(name = "urlshort-cli")]
#[command(about = "CLI for the urlshort store file")]
struct Args {
    /// Store file
    #[arg(short, long, default_value = "bolt.db")]
    store: PathBuf,

    /// Bucket to operate on
    #[arg(short, long, default_value = "default")]
    bucket: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the destination of a path
    Get {
        /// The path to look up, e.g. /foo
        path: String,
    },

    /// Map a path to a destination
    Set {
        /// The path to map
        path: String,

        /// The redirect destination
        url: String,
    },

    /// Merge a YAML or JSON path map file as one batch
    Import {
        /// Path map file (.yaml, .yml or .json)
        file: PathBuf,
    },

    /// List every mapping in the bucket
    List,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> urlshort::Result<ExitCode> {
    let store = Store::open(&args.store)?;
    let bucket = args.bucket.as_str();

    let code = match args.command {
        Commands::Get { path } => match store.get(bucket, path.as_bytes())? {
            Some(url) => {
                println!("{}", String::from_utf8_lossy(&url));
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("{}: not mapped", path);
                ExitCode::from(2)
            }
        },
        Commands::Set { path, url } => {
            store.ensure_bucket(bucket)?;
            store.put(bucket, path.as_bytes(), url.as_bytes())?;
            ExitCode::SUCCESS
        }
        Commands::Import { file } => {
            let format = Format::from_extension(&file).ok_or_else(|| {
                ShortenerError::Config(format!(
                    "cannot tell the format of {} (expected .yaml, .yml or .json)",
                    file.display()
                ))
            })?;
            let source = Source::from_file(&file, format)?;
            let report = merge_all(&store, bucket, [source])?;
            println!("imported {} entries", report.total_entries());
            ExitCode::SUCCESS
        }
        Commands::List => {
            for (path, url) in store.entries(bucket)? {
                println!(
                    "{}\t{}",
                    String::from_utf8_lossy(&path),
                    String::from_utf8_lossy(&url)
                );
            }
            ExitCode::SUCCESS
        }
    };

    store.close()?;
    Ok(code)
}
