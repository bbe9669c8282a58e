// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "dramtag";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = base_dir(|key| std::env::var(key).ok()).join(APP_DIR);
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(path = %dir.display(), error = %e, "cannot create data directory");
    }
    dir
}

/// XDG data dir, then `~/.local/share`, then `/tmp`.
fn base_dir(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(xdg) = lookup("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = lookup("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    PathBuf::from("/tmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let dir = base_dir(|key| match key {
            "XDG_DATA_HOME" => Some("/xdg".into()),
            "HOME" => Some("/home/ann".into()),
            _ => None,
        });
        assert_eq!(dir, PathBuf::from("/xdg"));
    }

    #[test]
    fn home_then_tmp() {
        let dir = base_dir(|key| (key == "HOME").then(|| "/home/ann".to_owned()));
        assert_eq!(dir, PathBuf::from("/home/ann/.local/share"));
        assert_eq!(base_dir(|_| None), PathBuf::from("/tmp"));
    }
}
