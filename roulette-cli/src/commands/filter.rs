//! Preferred filter management.

use anyhow::Result;
use clap::Args;

use super::connect::{self, FilterArg};

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Filter to make the preferred one
    pub key: Option<String>,

    /// List the available filters
    #[arg(long)]
    pub list: bool,
}

pub async fn run(args: FilterArgs, server: Option<String>) -> Result<()> {
    let filter = FilterArg { filter: args.key };
    let (session, _config) = connect::open(server, &filter, None).await?;
    let current = session.filter();

    if args.list {
        for key in session.catalog().keys() {
            let marker = if &key == current { "*" } else { " " };
            println!("{marker} {key}");
        }
        return Ok(());
    }

    if filter.filter.is_some() {
        println!("Preferred filter set to '{current}'.");
    } else {
        println!("{current}");
    }
    Ok(())
}
