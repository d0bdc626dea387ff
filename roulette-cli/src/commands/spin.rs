//! Spin the wheel: draw, reveal, then confirm, skip or cancel.

use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;
use dialoguer::console::style;
use dialoguer::{Confirm, Select, theme::ColorfulTheme};
use tracing::{debug, warn};

use roulette_core::{ClientOperation, DrawResult, SelectionError, SelectionSession};

use super::connect::{self, FilterArg};
use crate::config::RouletteConfig;

#[derive(Args, Debug)]
pub struct SpinArgs {
    #[command(flatten)]
    pub filter: FilterArg,

    /// Seed for a reproducible draw
    #[arg(long)]
    pub seed: Option<u64>,

    /// Confirm the first pick without prompting
    #[arg(short, long)]
    pub yes: bool,
}

/// What to do with a revealed pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Confirm,
    Skip,
    ReinstateSkipped,
    Cancel,
}

impl Decision {
    fn label(self) -> &'static str {
        match self {
            Self::Confirm => "Confirm",
            Self::Skip => "Skip and spin again",
            Self::ReinstateSkipped => "Reinstate skipped and spin again",
            Self::Cancel => "Cancel",
        }
    }
}

/// Choices offered after a reveal; reinstating only makes sense once someone was skipped
fn decisions(skipped: usize) -> Vec<Decision> {
    let mut options = vec![Decision::Confirm, Decision::Skip];
    if skipped > 0 {
        options.push(Decision::ReinstateSkipped);
    }
    options.push(Decision::Cancel);
    options
}

pub async fn run(args: SpinArgs, server: Option<String>) -> Result<()> {
    let (mut session, config) = connect::open(server, &args.filter, args.seed).await?;
    let mut reset_attempted = false;

    loop {
        if session.flush_deferred_refresh().await? {
            debug!("Deferred refresh applied before drawing");
        }
        let draw = match session.request_draw() {
            Ok(draw) => draw,
            Err(e) if e.is_exhausted() => {
                if !session.ledger().is_empty() {
                    if offer_reinstate(&mut session)? {
                        continue;
                    }
                    return Ok(());
                }
                if reset_attempted || !handle_exhausted(&mut session, &config).await? {
                    return Ok(());
                }
                reset_attempted = true;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        reveal(&draw, &config).await;

        if args.yes {
            commit(&mut session, &draw).await?;
            return Ok(());
        }

        if decide(&mut session, &draw).await? {
            return Ok(());
        }
    }
}

/// Prompt until the pick is settled. Returns false when another spin is wanted.
async fn decide(session: &mut SelectionSession, draw: &DrawResult) -> Result<bool> {
    loop {
        let options = decisions(session.ledger().len());
        let labels: Vec<&str> = options.iter().map(|d| d.label()).collect();
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{} goes first?", draw.participant.name()))
            .items(&labels)
            .default(0)
            .interact()?;

        match options[choice] {
            Decision::Confirm => match commit(session, draw).await {
                Ok(()) => return Ok(true),
                Err(e) if session.pending_draw().is_some() => {
                    eprintln!("{} {e:#}", style("✗").red().bold());
                    continue;
                }
                Err(e) => return Err(e),
            },
            Decision::Skip => {
                let skipped = session.reject()?;
                println!("Skipped {}.", skipped.name());
                return Ok(false);
            }
            Decision::ReinstateSkipped => {
                session.abandon();
                let count = session.reinstate_all()?;
                println!("Reinstated {count} skipped participants.");
                return Ok(false);
            }
            Decision::Cancel => {
                session.abandon();
                println!("Cancelled, nobody was picked.");
                return Ok(true);
            }
        }
    }
}

async fn commit(session: &mut SelectionSession, draw: &DrawResult) -> Result<()> {
    match session.confirm().await {
        Ok(participant) => {
            println!(
                "\n{} {}",
                style("✓").green().bold(),
                style(format!("{} goes first today!", participant.name())).green()
            );
            Ok(())
        }
        Err(SelectionError::Collaborator { operation, source })
            if operation != ClientOperation::CommitSelection =>
        {
            // commit went through, only the follow-up refresh failed
            warn!(%operation, error = %source, "Refresh after commit failed");
            println!(
                "{} goes first today! (pool not refreshed: {source})",
                draw.participant.name()
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Everyone left was skipped. Returns whether the wheel should spin again.
fn offer_reinstate(session: &mut SelectionSession) -> Result<bool> {
    println!("Everyone left under '{}' was skipped.", session.filter());
    let reinstate = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Reinstate skipped participants?")
        .default(true)
        .interact()?;
    if reinstate {
        session.reinstate_all()?;
    }
    Ok(reinstate)
}

/// Everyone has been picked. Returns whether the wheel should spin again.
async fn handle_exhausted(session: &mut SelectionSession, config: &RouletteConfig) -> Result<bool> {
    let filter = session.filter().clone();
    if session.pool().iter().all(|p| !p.matches(&filter)) {
        bail!("No participants under filter '{filter}'");
    }

    println!("Everyone under '{filter}' has been picked.");
    if !config.wheel.auto_reset {
        println!("Run `roulette reset` to start over.");
        return Ok(false);
    }

    println!("Resetting the wheel.");
    session.request_reset().await?;
    if session.is_exhausted() {
        bail!("Pool under '{filter}' is still exhausted after a reset");
    }
    Ok(true)
}

async fn reveal(draw: &DrawResult, config: &RouletteConfig) {
    let delay = Duration::from_millis(config.wheel.reveal_delay_ms);
    if !delay.is_zero() {
        println!("{}", style("Spinning the wheel...").dim());
        tokio::time::sleep(delay).await;
    }
    debug!(index = draw.index, "Revealing pick");
    println!("{}", style(draw.participant.name()).bold().cyan());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinstate_only_offered_after_a_skip() {
        assert_eq!(
            decisions(0),
            vec![Decision::Confirm, Decision::Skip, Decision::Cancel]
        );
        assert!(decisions(2).contains(&Decision::ReinstateSkipped));
        assert_eq!(decisions(2).last(), Some(&Decision::Cancel));
    }

    #[test]
    fn confirm_is_the_default_choice() {
        assert_eq!(decisions(1)[0], Decision::Confirm);
        assert_eq!(Decision::Confirm.label(), "Confirm");
    }
}
