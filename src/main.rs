//! Tiller CLI - agent dependency resolution and steering rule merging.

use clap::Parser;
use std::process;
use tiller::cli::{Cli, Commands, SteeringCommands};
use tiller::commands::{self, Output};
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr so stdout stays parseable JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = run_command(cli.command, human) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run_command(command: Commands, human: bool) -> Result<(), tiller::Error> {
    match command {
        Commands::Resolve {
            artifact_type,
            name,
            base,
            pack,
            common,
        } => {
            let result = commands::resolve(base, pack, common, &artifact_type, &name)?;
            output(&result, human);
        }

        Commands::Scan {
            agent,
            base,
            pack,
            common,
        } => {
            let result = commands::scan(base, pack, common, &agent)?;
            output(&result, human);
        }

        Commands::Steering { command } => match command {
            SteeringCommands::Merge {
                dir,
                agent,
                context_file,
                project_type,
                include,
            } => {
                let result = commands::steering_merge(
                    &dir,
                    &agent,
                    context_file.as_deref(),
                    project_type,
                    include,
                )?;
                output(&result, human);
            }
            SteeringCommands::Validate { dir } => {
                let result = commands::steering_validate(&dir)?;
                output(&result, human);
            }
        },
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
