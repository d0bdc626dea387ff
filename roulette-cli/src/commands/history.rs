//! Past picks grouped by day.

use anyhow::Result;
use clap::Args;

use super::connect::{self, FilterArg};
use super::render;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub filter: FilterArg,

    /// Print the date index as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: HistoryArgs, server: Option<String>) -> Result<()> {
    let (session, _config) = connect::open(server, &args.filter, None).await?;
    let index = session.date_index();

    if args.json {
        println!("{}", serde_json::to_string_pretty(index)?);
        return Ok(());
    }

    if index.is_empty() {
        println!("No picks recorded under '{}' yet.", session.filter());
        return Ok(());
    }

    println!("{}", render::history_table(index));
    println!(
        "{} picks over {} days",
        index.total_selections(),
        index.len()
    );
    Ok(())
}
