use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use yaif_compiler::{compile_schema, validate_schema, Diagnostics, GenerateOptions, Target, YaifError};

mod run;
mod watch;

use run::{check_extension, compile_file, read_schema, summary, write_output};

#[derive(Parser)]
#[command(name = "yaif")]
#[command(about = "Validate YAIF schemas and generate code from them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code from a `.yaif` schema
    Generate {
        /// Input `.yaif` file
        #[arg(short, long)]
        input: PathBuf,

        /// Output language: typescript, jsonschema or python
        #[arg(short, long, default_value = "python")]
        target: Target,

        /// Output file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write every inherited field instead of extending the parent
        #[arg(long)]
        flatten: bool,
    },

    /// Check a `.yaif` schema and report every problem found
    Validate {
        /// Input `.yaif` file
        #[arg(short, long)]
        input: PathBuf,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Regenerate whenever the schema file changes
    Watch {
        /// Input `.yaif` file
        #[arg(short, long)]
        input: PathBuf,

        /// Output language: typescript, jsonschema or python
        #[arg(short, long, default_value = "python")]
        target: Target,

        /// Output file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write every inherited field instead of extending the parent
        #[arg(long)]
        flatten: bool,

        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval: u64,
    },
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
    eprintln!("{}", diagnostics);
}

fn generate_once(input: &Path, target: Target, output: Option<&Path>, options: &GenerateOptions) -> Result<(), YaifError> {
    let code = compile_file(input, target, options)?;
    write_output(output, &code)
}

fn main() -> Result<(), YaifError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { input, target, output, flatten } => {
            let options = GenerateOptions { flatten: *flatten };
            match generate_once(input, *target, output.as_deref(), &options) {
                Err(YaifError::Diagnostics(diagnostics)) => {
                    report(&diagnostics);
                    process::exit(1);
                }
                result => result,
            }
        }

        Commands::Validate { input, json } => {
            let text = read_schema(input)?;
            if *json {
                let diagnostics = validate_schema(&text);
                println!("{}", serde_json::to_string_pretty(&diagnostics)?);
                if !diagnostics.is_empty() {
                    process::exit(1);
                }
                return Ok(());
            }
            match compile_schema(&text) {
                Ok(model) => {
                    println!("{}", summary(&model));
                    Ok(())
                }
                Err(diagnostics) => {
                    report(&diagnostics);
                    process::exit(1);
                }
            }
        }

        Commands::Watch { input, target, output, flatten, interval } => {
            check_extension(input)?;
            info!(path = %input.display(), emitter = %target, "watching");
            let options = GenerateOptions { flatten: *flatten };
            watch::watch(input, Duration::from_millis(*interval), || {
                match generate_once(input, *target, output.as_deref(), &options) {
                    Ok(()) => info!(path = %input.display(), "regenerated"),
                    Err(YaifError::Diagnostics(diagnostics)) => report(&diagnostics),
                    Err(err) => error!(error = %err, "generation failed"),
                }
            })
        }
    }
}
