//! Host key verification against an OpenSSH `known_hosts` file.

use std::io::Write;
use std::path::{Path, PathBuf};

use russh::keys::{HashAlg, PublicKey};

use crate::config::HostKeyPolicy;

/// What `known_hosts` says about a host's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum KeyStatus {
    /// An entry for the host carries this key.
    Trusted,
    /// Entries exist for the host, none with this key.
    Changed,
    /// The host has no usable entry.
    Unknown,
}

/// Location of an OpenSSH `known_hosts` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownHosts {
    path: PathBuf,
}

impl Default for KnownHosts {
    /// `$SSH_KNOWN_HOSTS`, else `~/.ssh/known_hosts`.
    fn default() -> Self {
        if let Ok(path) = std::env::var("SSH_KNOWN_HOSTS") {
            return Self::new(path);
        }
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        Self::new(PathBuf::from(home).join(".ssh").join("known_hosts"))
    }
}

impl KnownHosts {
    /// Use the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn status(&self, host: &str, port: u16, key: &PublicKey) -> KeyStatus {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => lookup(&contents, host, port, key),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => KeyStatus::Unknown,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read known_hosts");
                KeyStatus::Unknown
            }
        }
    }

    pub(super) fn append(&self, host: &str, port: u16, key: &PublicKey) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
                }
            }
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{} {}", host_pattern(host, port), openssh_key(key))
    }
}

/// Decide whether to trust `key` for `host` under `policy`.
pub(super) fn verify(
    policy: HostKeyPolicy,
    known_hosts: &KnownHosts,
    host: &str,
    port: u16,
    key: &PublicKey,
) -> bool {
    #[cfg(feature = "insecure-skip-verify")]
    if policy == HostKeyPolicy::AcceptAll {
        tracing::warn!(host, "accepting server key without verification (INSECURE)");
        return true;
    }

    match known_hosts.status(host, port, key) {
        KeyStatus::Trusted => {
            tracing::debug!(host, "host key verified against known_hosts");
            true
        }
        KeyStatus::Changed => {
            tracing::error!(
                host,
                fingerprint = %key.fingerprint(HashAlg::Sha256),
                "HOST KEY MISMATCH! Possible man-in-the-middle attack!"
            );
            false
        }
        KeyStatus::Unknown if policy == HostKeyPolicy::Tofu => {
            match known_hosts.append(host, port, key) {
                Ok(()) => tracing::info!(
                    host,
                    path = %known_hosts.path().display(),
                    "added host key to known_hosts (TOFU)"
                ),
                Err(e) => tracing::warn!(
                    host,
                    error = %e,
                    "failed to record host key, accepting without saving"
                ),
            }
            true
        }
        KeyStatus::Unknown => {
            tracing::warn!(host, "host not found in known_hosts, rejecting key");
            false
        }
    }
}

/// `host` for port 22, `[host]:port` otherwise.
fn host_pattern(host: &str, port: u16) -> String {
    if port == 22 {
        host.to_string()
    } else {
        format!("[{host}]:{port}")
    }
}

fn openssh_key(key: &PublicKey) -> String {
    key.to_openssh()
        .unwrap_or_else(|_| format!("{} <encoding-error>", key.algorithm().as_str()))
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look `host` up in `known_hosts` text. Hashed and marker lines are skipped.
fn lookup(contents: &str, host: &str, port: u16, key: &PublicKey) -> KeyStatus {
    let pattern = host_pattern(host, port);
    let wanted = key.fingerprint(HashAlg::Sha256);
    let mut seen = false;

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with('@') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(hosts), Some(_key_type), Some(data)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        if !hosts.split(',').any(|h| h == pattern) {
            continue;
        }
        let Ok(stored) = russh::keys::parse_public_key_base64(data) else {
            continue;
        };
        if stored.fingerprint(HashAlg::Sha256) == wanted {
            return KeyStatus::Trusted;
        }
        seen = true;
    }

    if seen { KeyStatus::Changed } else { KeyStatus::Unknown }
}
