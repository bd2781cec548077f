//! passroll command-line entry point.

mod cli;
mod logging;
mod prompt;

use std::process::ExitCode;

use cli::CommandLine;
use passroll::{
    BatchOrchestrator, ConnectivityProber, RotationConfig, RotationError, SessionDriver, SshOpener,
    cancellation,
};

/// Exit status after the operator declined to continue, or on any
/// failure that is not the operator's input.
const EXIT_FAILURE: u8 = 1;

/// Exit status for unusable input.
const EXIT_INVALID_INPUT: u8 = 2;

/// Exit status after Ctrl-C interrupted the batch.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CommandLine::parse_args();
    logging::init(args.log_format, args.verbose);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn run(args: CommandLine) -> anyhow::Result<ExitCode> {
    let config = args.apply(RotationConfig::load(args.config.as_deref())?);
    config.validate()?;

    let user = prompt::username(&args)?;
    let range = prompt::range(&args)?;
    let credentials = prompt::credentials(&user)?;
    let targets = range.targets();

    eprintln!(
        "About to change the password of '{user}' on {} host(s) in {range} (concurrency {}).",
        targets.len(),
        config.concurrency
    );
    if !args.yes && !prompt::confirm("Continue?")? {
        eprintln!("Aborted; no host was contacted.");
        return Ok(ExitCode::from(EXIT_FAILURE));
    }

    let (handle, cancel) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, closing open sessions");
            handle.cancel();
        }
    });

    let opener = SshOpener::new(config.host_key_policy);
    let orchestrator = BatchOrchestrator::from_config(
        ConnectivityProber::new(opener.clone()),
        SessionDriver::new(opener, &config),
        &config,
    );
    let report = orchestrator
        .run(&targets, &config.connect_params(&user), &credentials, &cancel)
        .await?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }

    if cancel.is_cancelled() {
        Ok(ExitCode::from(EXIT_INTERRUPTED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn exit_status(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<RotationError>() {
        Some(e) if e.is_invalid_input() || matches!(e, RotationError::Config { .. }) => {
            EXIT_INVALID_INPUT
        }
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_exits_with_two() {
        let err = anyhow::Error::from(RotationError::invalid_range("bad"));
        assert_eq!(exit_status(&err), EXIT_INVALID_INPUT);

        let err = anyhow::Error::from(RotationError::CredentialMismatch);
        assert_eq!(exit_status(&err), EXIT_INVALID_INPUT);
    }

    #[test]
    fn config_errors_exit_with_two() {
        let err = anyhow::Error::from(RotationError::config("concurrency must be at least 1"));
        assert_eq!(exit_status(&err), EXIT_INVALID_INPUT);
    }

    #[test]
    fn other_errors_exit_with_one() {
        let err = anyhow::anyhow!("stdin closed");
        assert_eq!(exit_status(&err), EXIT_FAILURE);

        let err = anyhow::Error::from(RotationError::io_context(
            "reading config",
            std::io::Error::other("boom"),
        ));
        assert_eq!(exit_status(&err), EXIT_FAILURE);
    }
}
