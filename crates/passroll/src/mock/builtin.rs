//! Built-in scripts for common `passwd` dialogues.

use std::time::Duration;

use super::script::Script;

/// A Linux `passwd` that accepts the change.
#[must_use]
pub fn passwd_success() -> Script {
    passwd_with_result("passwd: password updated successfully\r\n$ ")
}

/// A Linux `passwd` whose final output is `result`.
#[must_use]
pub fn passwd_with_result(result: &str) -> Script {
    Script::new()
        .respond("Changing password for admin.\r\nCurrent password: ")
        .respond("New password: ")
        .respond("Retype new password: ")
        .respond(result)
}

/// A Spanish-locale `passwd` that accepts the change.
#[must_use]
pub fn passwd_spanish() -> Script {
    Script::new()
        .respond("Cambiando la contraseña de admin.\r\nContraseña actual: ")
        .respond("Nueva contraseña: ")
        .respond("Vuelva a escribir la nueva contraseña: ")
        .respond("passwd: contraseña actualizada correctamente\r\n$ ")
}

/// A `passwd` where every prompt arrives after `delay`, with colour codes.
#[must_use]
pub fn passwd_slow(delay: Duration) -> Script {
    Script::new()
        .delay(delay)
        .respond("\x1b[1mCurrent\x1b[0m password: ")
        .delay(delay)
        .respond("New password: ")
        .delay(delay)
        .respond("Retype new password: ")
        .delay(delay)
        .respond("passwd: password updated successfully\r\n")
}

/// A shell that prints a banner and never prompts.
#[must_use]
pub fn silent_shell() -> Script {
    Script::new().output("Last login: Mon Jan  1 00:00:00 2024\r\n$ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::PromptTable;

    fn text(script: &Script, index: usize) -> String {
        String::from_utf8_lossy(&script.steps()[index].output).into_owned()
    }

    #[test]
    fn builtin_prompts_match_default_table() {
        let table = PromptTable::default();
        for script in [passwd_success(), passwd_spanish()] {
            assert!(table.current.matches(&text(&script, 0)));
            assert!(table.new.matches(&text(&script, 1)));
            assert!(table.confirm.matches(&text(&script, 2)));
            assert!(table.success.matches(&text(&script, 3)));
            assert!(!table.failure.matches(&text(&script, 3)));
        }
    }

    #[test]
    fn silent_shell_never_prompts() {
        let table = PromptTable::default();
        assert!(!table.current.matches(&text(&silent_shell(), 0)));
    }
}
