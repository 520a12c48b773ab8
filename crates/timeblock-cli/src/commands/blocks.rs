//! Timeblock merge/remove/drag commands for CLI.
//!
//! Collections are read as JSON arrays of timeblock rows and the result is
//! printed as a JSON array.

use chrono::{DateTime, FixedOffset};
use clap::Subcommand;
use timeblock_core::{Config, Timeblock};

use super::{parse_instant, read_input};

#[derive(Subcommand)]
pub enum BlocksAction {
    /// Merge proposed timeblocks into existing ones
    Merge {
        /// Existing timeblocks (JSON file, `-` for stdin)
        prev: String,
        /// Proposed timeblocks (JSON file)
        new: String,
    },
    /// Remove the window spanned by the given instants
    Remove {
        /// Existing timeblocks (JSON file, `-` for stdin)
        prev: String,
        /// Selected instants (RFC 3339)
        #[arg(value_parser = parse_instant)]
        dates: Vec<DateTime<FixedOffset>>,
    },
    /// Expand a drag gesture into daily timeblocks
    Drag {
        /// Gesture start (RFC 3339)
        #[arg(value_parser = parse_instant)]
        from: DateTime<FixedOffset>,
        /// Gesture end (RFC 3339)
        #[arg(value_parser = parse_instant)]
        to: DateTime<FixedOffset>,
    },
}

fn load_blocks(path: &str) -> Result<Vec<Timeblock>, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(&read_input(path)?)?)
}

pub fn run(action: BlocksAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Config::load_or_default().engine();

    let blocks = match action {
        BlocksAction::Merge { prev, new } => {
            if prev == "-" && new == "-" {
                return Err("only one of PREV and NEW may read stdin".into());
            }
            engine.add_timeblocks(&load_blocks(&prev)?, &load_blocks(&new)?)
        }
        BlocksAction::Remove { prev, dates } => engine.remove_timeblocks(&load_blocks(&prev)?, &dates),
        BlocksAction::Drag { from, to } => engine.duration_to_timeblocks(&[from, to]),
    };

    tracing::debug!(count = blocks.len(), "writing timeblocks");
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    Ok(())
}
