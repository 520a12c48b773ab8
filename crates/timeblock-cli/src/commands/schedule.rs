//! Auto-scheduling commands for CLI.

use chrono::{DateTime, FixedOffset, Utc};
use clap::Subcommand;
use timeblock_core::{Config, TemplateScenario};

use super::{parse_instant, read_input};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Place a scenario's tasks into its active hours
    Run {
        /// Scenario JSON file (`-` for stdin)
        scenario: String,
        /// Do not place anything before this instant (default: now)
        #[arg(long, value_parser = parse_instant)]
        now: Option<DateTime<FixedOffset>>,
    },
    /// Check every task of a scenario without scheduling
    Check {
        /// Scenario JSON file (`-` for stdin)
        scenario: String,
    },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScheduleAction::Run { scenario, now } => {
            let scenario = TemplateScenario::from_json(&read_input(&scenario)?)?;
            let now = now.map_or_else(Utc::now, |n| n.with_timezone(&Utc));
            let result = scenario.run(&Config::load_or_default().scheduler(), now);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        ScheduleAction::Check { scenario } => {
            let scenario = TemplateScenario::from_json(&read_input(&scenario)?)?;
            let mut invalid = 0;
            for task in &scenario.tasks {
                match task.validate() {
                    Ok(()) => println!("ok      {}  {}", task.id, task.name),
                    Err(e) => {
                        invalid += 1;
                        println!("invalid {}  {}: {e}", task.id, task.name);
                    }
                }
            }
            if invalid > 0 {
                return Err(format!("{invalid} invalid task(s) in scenario '{}'", scenario.name).into());
            }
        }
    }
    Ok(())
}
