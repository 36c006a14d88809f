mod audit;
mod byte_string;
mod entity;

use std::io;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::{byte_string::ByteString, entity::Entity};

const DEFAULT_NAME: &str = "Foo";

#[derive(Parser)]
#[command(name = "move-semantics")]
#[command(version)]
#[command(about = "Shows copy vs. move construction for an owned byte string", long_about = None)]
struct Args {
    /// The name given to the entity
    #[arg(long, default_value = DEFAULT_NAME)]
    name: String,

    /// Construction path for the entity's name
    #[arg(long, value_enum, default_value_t = Via::Take)]
    via: Via,

    /// Exit without waiting for a line on standard input
    #[arg(long)]
    no_pause: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Via {
    /// Transfer ownership from a temporary (no extra allocation)
    Take,
    /// Duplicate a named value (one extra allocation)
    Copy,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("move_semantics=debug")),
        )
        .init();

    let before = audit::snapshot();
    let entity = match args.via {
        Via::Take => Entity::new(ByteString::from(args.name.as_str())),
        Via::Copy => {
            let name = ByteString::from(args.name.as_str());
            let entity = Entity::from_name(&name);
            tracing::info!("The named original still reads \"{name}\"");
            entity
        }
    };
    let cost = audit::snapshot().since(&before);

    println!(
        "{}",
        entity
            .name()
            .as_str()
            .context("The name does not print as text")?
    );
    tracing::info!("Construction cost: {cost}");

    if !args.no_pause {
        wait_for_enter()?;
    }
    Ok(())
}

/// Blocks until one line arrives on standard input. EOF releases the wait
/// too, so piped runs do not hang.
fn wait_for_enter() -> Result<()> {
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read from standard input")?;
    Ok(())
}
