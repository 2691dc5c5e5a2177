use anyhow::{Context, Result};
use clap::Args;

use crate::model::{display_name, Ticker};
use crate::session::Session;

#[derive(Debug, Args, Clone)]
pub struct LoginArgs {
    /// Email used as the local identity
    pub email: String,
}

#[derive(Debug, Args, Clone)]
pub struct ToggleArgs {
    /// Ticker to add or remove (GOOG, TSLA, AMZN, META, NVDA)
    pub symbol: Ticker,
}

pub fn login(args: LoginArgs, session: &Session) -> Result<()> {
    let identity = session.login(&args.email).context("failed to log in")?;
    let watched = session.subscribed_symbols();
    println!(
        "Logged in as {} ({} watched symbol{})",
        identity.email,
        watched.len(),
        if watched.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

pub fn logout(session: &Session) -> Result<()> {
    match session.current_user() {
        Some(identity) => {
            session.logout().context("failed to log out")?;
            println!("Logged out of {}", identity.email);
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

pub fn whoami(session: &Session) -> Result<()> {
    match session.current_user() {
        Some(identity) => println!("{}", identity.email),
        None => println!("Not logged in"),
    }
    Ok(())
}

pub fn toggle(args: ToggleArgs, session: &Session) -> Result<()> {
    let symbol = args.symbol.symbol();
    match session
        .toggle_subscription(symbol)
        .with_context(|| format!("failed to update watchlist for {symbol}"))?
    {
        Some(true) => println!("Watching {symbol}"),
        Some(false) => println!("Stopped watching {symbol}"),
        None => println!("Log in first; watchlist unchanged"),
    }
    Ok(())
}

pub fn watchlist(session: &Session) -> Result<()> {
    let Some(identity) = session.current_user() else {
        println!("Not logged in");
        return Ok(());
    };

    let symbols = session.subscribed_symbols();
    if symbols.is_empty() {
        println!("{} has no active subscriptions", identity.email);
        return Ok(());
    }

    println!("Watchlist for {}:", identity.email);
    for symbol in symbols {
        println!("  {symbol:<6} {}", display_name(&symbol));
    }
    Ok(())
}

pub fn reset(session: &Session) -> Result<()> {
    let removed = session
        .reset_all_data()
        .context("failed to clear local data")?;
    println!("Cleared {removed} stored entr{}", if removed == 1 { "y" } else { "ies" });
    Ok(())
}
