use anyhow::{bail, Context};
use chain_let::chain::{Environment, Outcome};
use chain_let::config::Settings;
use chain_let::definition::ChainLoader;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a chain from a file and print its result
    Run {
        /// Path to the chain file
        #[arg(short, long)]
        file: PathBuf,

        /// Extra initial bindings, as a JSON object
        #[arg(short, long)]
        bindings: Option<String>,

        /// Sentinel key marking failed values
        #[arg(short, long)]
        sentinel: Option<String>,

        /// Exit with an error when the chain short-circuits
        #[arg(long)]
        strict: bool,
    },
    /// Validate a chain file without running it
    Check {
        /// Path to the chain file
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::from_env()?;

    match args.command {
        Commands::Run {
            file,
            bindings,
            sentinel,
            strict,
        } => {
            let settings = match sentinel {
                Some(key) => settings.with_sentinel(key)?,
                None => settings,
            };

            let definition = ChainLoader::new()
                .load(&file)
                .with_context(|| format!("Failed to load chain from {}", file.display()))?;

            let extra = match bindings {
                Some(raw) => {
                    let value: Value =
                        serde_json::from_str(&raw).context("--bindings is not valid JSON")?;
                    if !value.is_object() {
                        bail!("--bindings must be a JSON object");
                    }
                    Environment::from_json(&value)
                }
                None => Environment::empty(),
            };

            let outcome = definition.evaluate(&settings, &extra)?;
            println!("{}", serde_json::to_string_pretty(outcome.value())?);

            if let Outcome::ShortCircuited { step, index, .. } = &outcome {
                if strict {
                    bail!("Chain short-circuited at step {} ({})", index, step);
                }
            }
        }
        Commands::Check { file } => {
            let definition = ChainLoader::new()
                .load(&file)
                .with_context(|| format!("Failed to load chain from {}", file.display()))?;
            let predicate = definition.predicate(&settings)?;

            println!("Chain: {}", definition.summary());
            println!("Predicate: {:?}", predicate);
            for (i, step) in definition.steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step.name);
            }
            for warning in definition.unbound_references() {
                log::warn!("{}", warning);
                println!("warning: {}", warning);
            }
        }
    }

    Ok(())
}
