//! Interactive input.
//!
//! Prompts are written to stderr; passwords are read from the terminal
//! without echo.

use std::io::{BufRead, Write};

use anyhow::Context;
use passroll::{Credential, CredentialSet, RotationError, TargetRange};

use crate::cli::CommandLine;

/// Ask for one line of input.
pub fn line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{prompt}");
    std::io::stderr().flush().context("failed to write prompt")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read from stdin")?;
    Ok(answer.trim().to_string())
}

/// Ask a yes/no question; anything but an explicit yes aborts.
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    Ok(is_affirmative(&line(&format!("{question} [y/N]: "))?))
}

/// Accept English and Spanish affirmatives.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    )
}

/// The login name, from the flag or the terminal.
pub fn username(args: &CommandLine) -> anyhow::Result<String> {
    let user = match &args.user {
        Some(user) => user.trim().to_string(),
        None => line("Username: ")?,
    };
    if user.is_empty() {
        return Err(RotationError::config("username must not be empty").into());
    }
    Ok(user)
}

/// The target range, from flags or the terminal.
pub fn range(args: &CommandLine) -> anyhow::Result<TargetRange> {
    if let Some(range) = args.range {
        return Ok(range);
    }
    let base = match &args.base {
        Some(base) => base.clone(),
        None => line("Base prefix (e.g. 192.168.1): ")?,
    };
    let start = match args.start {
        Some(start) => start,
        None => number("First host number: ")?,
    };
    let end = match args.end {
        Some(end) => end,
        None => number("Last host number: ")?,
    };
    Ok(TargetRange::new(&base, start, end)?)
}

fn number(prompt: &str) -> anyhow::Result<i64> {
    let answer = line(prompt)?;
    answer
        .parse()
        .map_err(|_| RotationError::invalid_range(format!("'{answer}' is not a number")).into())
}

fn secret(prompt: &str) -> anyhow::Result<String> {
    rpassword::prompt_password(prompt).context("failed to read password")
}

/// Read the current password and the new one twice.
pub fn credentials(user: &str) -> anyhow::Result<CredentialSet> {
    let current = secret(&format!("Current password for {user}: "))?;
    let next = secret("New password: ")?;
    let confirmation = Credential::from(secret("Confirm new password: ")?);
    Ok(CredentialSet::confirmed(current, next, &confirmation)?)
}
