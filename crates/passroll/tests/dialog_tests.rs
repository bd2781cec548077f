//! Integration tests for the session driver against mock channels.
//!
//! These tests require the `mock` feature to be enabled.

#![cfg(feature = "mock")]

use std::time::Duration;

use passroll::mock::{MockHost, MockOpener, Script, builtin};
use passroll::{
    ConnectParams, CredentialSet, DialogueOutcome, Drive, KeywordSet, RotationConfig,
    SessionDriver, Target,
};

fn fast_config() -> RotationConfig {
    RotationConfig::new()
        .poll_interval(Duration::from_millis(10))
        .result_grace(Duration::from_millis(100))
}

fn params(timeout_ms: u64) -> ConnectParams {
    ConnectParams::new("admin").timeout(Duration::from_millis(timeout_ms))
}

fn credentials() -> CredentialSet {
    CredentialSet::new("old-secret", "new-secret").unwrap()
}

async fn drive(opener: &MockOpener, config: &RotationConfig, address: &str) -> DialogueOutcome {
    SessionDriver::new(opener.clone(), config)
        .drive(
            &Target::new(address),
            &params(300),
            &credentials(),
            &passroll::Cancellation::never(),
        )
        .await
}

#[tokio::test]
async fn english_dialogue_succeeds() {
    let opener = MockOpener::new().script("h", builtin::passwd_success());
    assert_eq!(drive(&opener, &fast_config(), "h").await, DialogueOutcome::Succeeded);
}

#[tokio::test]
async fn spanish_dialogue_succeeds() {
    let opener = MockOpener::new().script("h", builtin::passwd_spanish());
    assert_eq!(drive(&opener, &fast_config(), "h").await, DialogueOutcome::Succeeded);
}

#[tokio::test]
async fn slow_prompts_with_escapes_succeed() {
    let opener = MockOpener::new().script("h", builtin::passwd_slow(Duration::from_millis(50)));
    assert_eq!(drive(&opener, &fast_config(), "h").await, DialogueOutcome::Succeeded);
}

#[tokio::test]
async fn silent_host_times_out_in_current_prompt_and_closes_once() {
    let opener = MockOpener::new().script("h", builtin::silent_shell());
    let outcome = drive(&opener, &fast_config(), "h").await;

    let reason = outcome.reason().unwrap();
    assert!(
        reason.contains("prompt not observed within timeout for state AWAITING_CURRENT_PROMPT"),
        "{reason}"
    );
    let channels = opener.channels("h");
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].close_count, 1);
}

#[tokio::test]
async fn stall_after_current_names_new_prompt_state() {
    let script = Script::new().respond("Current password: ");
    let opener = MockOpener::new().script("h", script);
    let outcome = drive(&opener, &fast_config(), "h").await;

    assert!(outcome
        .reason()
        .unwrap()
        .contains("for state AWAITING_NEW_PROMPT"));
    assert_eq!(opener.channels("h")[0].written, "passwd\nold-secret\n");
}

#[tokio::test]
async fn timeout_is_per_prompt() {
    // Each prompt takes 200ms; the whole dialogue exceeds the 300ms timeout.
    let opener = MockOpener::new().script("h", builtin::passwd_slow(Duration::from_millis(200)));
    let config = fast_config().result_grace(Duration::from_millis(400));
    assert_eq!(drive(&opener, &config, "h").await, DialogueOutcome::Succeeded);
}

#[tokio::test]
async fn unrecognised_result_is_never_success() {
    let script = builtin::passwd_with_result("Password change queued\r\n$ ");
    let opener = MockOpener::new().script("h", script);
    let outcome = drive(&opener, &fast_config(), "h").await;

    assert_eq!(
        outcome,
        DialogueOutcome::failed("unclassified result: Password change queued $")
    );
}

#[tokio::test]
async fn early_eof_in_result_still_classifies() {
    let script = builtin::passwd_with_result("passwd: all authentication tokens updated successfully.\r\n")
        .eof();
    let opener = MockOpener::new().script("h", script);
    let config = fast_config().result_grace(Duration::from_secs(30));

    let started = tokio::time::Instant::now();
    assert_eq!(drive(&opener, &config, "h").await, DialogueOutcome::Succeeded);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn custom_keywords_extend_the_table() {
    let script = Script::new()
        .respond("Mot de passe actuel : ")
        .respond("Nouveau mot de passe : ")
        .respond("Retapez le nouveau mot de passe : ")
        .respond("passwd : mot de passe mis à jour avec succès\r\n");
    let opener = MockOpener::new().script("h", script);

    let mut config = fast_config();
    config.prompts.current.extend(["actuel"]);
    config.prompts.new.extend(["nouveau"]);
    config.prompts.confirm.extend(["retapez"]);
    config.prompts.success.extend(["succès"]);

    assert_eq!(drive(&opener, &config, "h").await, DialogueOutcome::Succeeded);
}

#[tokio::test]
async fn replaced_table_only_uses_given_keywords() {
    let opener = MockOpener::new().script("h", builtin::passwd_success());
    let mut config = fast_config();
    config.prompts.current = KeywordSet::new(["old password"]);

    let outcome = drive(&opener, &config, "h").await;
    assert!(outcome.reason().unwrap().contains("AWAITING_CURRENT_PROMPT"));
}

#[tokio::test]
async fn simulated_host_changes_password() {
    let host = MockHost::new("old-secret");
    let opener = MockOpener::new().passwd("h", host.clone());

    assert_eq!(drive(&opener, &fast_config(), "h").await, DialogueOutcome::Succeeded);
    assert_eq!(host.password(), "new-secret");
}

#[tokio::test]
async fn secrets_never_appear_in_reasons() {
    let script = builtin::passwd_with_result("old-secret new-secret error\r\n");
    let opener = MockOpener::new().script("h", script);
    let outcome = drive(&opener, &fast_config(), "h").await;

    let reason = outcome.reason().unwrap();
    assert!(reason.starts_with("remote reported failure:"));
    assert!(!reason.contains("old-secret"));
    assert!(!reason.contains("new-secret"));
}
