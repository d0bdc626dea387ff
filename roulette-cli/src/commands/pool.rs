//! Pool overview: who is eligible under the active filter.

use anyhow::Result;
use clap::Args;

use super::connect::{self, FilterArg};
use super::render;

#[derive(Args, Debug)]
pub struct PoolArgs {
    #[command(flatten)]
    pub filter: FilterArg,
}

pub async fn run(args: PoolArgs, server: Option<String>) -> Result<()> {
    let (session, _config) = connect::open(server, &args.filter, None).await?;

    if session.pool().is_empty() {
        println!("The pool is empty.");
        return Ok(());
    }

    println!("Filter: {}", session.filter());
    println!("{}", render::pool_table(&session));
    println!(
        "{} of {} eligible",
        session.eligible().len(),
        session.pool().len()
    );
    Ok(())
}
