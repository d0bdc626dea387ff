use anyhow::Result;
use clap::Args;
use dialoguer::{Confirm, theme::ColorfulTheme};

use super::connect::{self, FilterArg};

#[derive(Args, Debug)]
pub struct ResetArgs {
    #[command(flatten)]
    pub filter: FilterArg,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn run(args: ResetArgs, server: Option<String>) -> Result<()> {
    let (mut session, _config) = connect::open(server, &args.filter, None).await?;
    let filter = session.filter().clone();

    if !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Clear every pick under '{filter}'?"))
            .default(false)
            .interact()?;
        if !proceed {
            println!("Nothing changed.");
            return Ok(());
        }
    }

    session.request_reset().await?;
    println!(
        "Reset '{}': {} participants eligible again.",
        filter,
        session.eligible().len()
    );
    Ok(())
}
