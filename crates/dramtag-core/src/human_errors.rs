// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command line.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives the CLI exit code.

use crate::error::{AcquisitionError, DramtagError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip or timeout; running the command again may work.
    Transient,
    /// The user has to fix their input.
    ActionRequired,
    /// Retrying will not help.
    Permanent,
}

impl Severity {
    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Transient => 75,
            Self::ActionRequired => 64,
            Self::Permanent => 1,
        }
    }
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `DramtagError` into something a label-printing hobbyist can act on.
pub fn humanize_error(err: &DramtagError) -> HumanError {
    match err {
        DramtagError::Acquisition(inner) => humanize_acquisition(inner),

        DramtagError::Normalization(_) => HumanError {
            message: "The catalogue answered, but not with bottle details we understand.".into(),
            suggestion: "Check the bottle id, or enter the label details by hand.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        DramtagError::Validation(detail) => HumanError {
            message: "Some label details are missing or invalid.".into(),
            suggestion: format!("Fix the input and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DramtagError::RenderAsset(detail) => HumanError {
            message: "The QR code or font could not be produced.".into(),
            suggestion: format!(
                "Nothing was written. Try a shorter URL or a lower --ec level. ({detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        DramtagError::ProfileNotFound(name) => HumanError {
            message: format!("There is no label profile called \"{name}\"."),
            suggestion: "Run `dramtag profiles` to see the available profiles.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DramtagError::Image(_) => HumanError {
            message: "The label image could not be written.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        DramtagError::Archive(_) => HumanError {
            message: "The batch archive could not be packed.".into(),
            suggestion: "Check there is enough free disk space and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        DramtagError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file or folder couldn't be found.".into(),
                suggestion: "Check the output path exists.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "dramtag doesn't have permission to write there.".into(),
                suggestion: "Choose a different output location.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        DramtagError::Serialization(_) => HumanError {
            message: "dramtag had an internal data problem.".into(),
            suggestion: "Check config.json is valid JSON, then try again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

fn humanize_acquisition(err: &AcquisitionError) -> HumanError {
    match err {
        AcquisitionError::Timeout => HumanError {
            message: "The catalogue didn't respond in time.".into(),
            suggestion: "Try again later, or raise DRAMTAG_TIMEOUT_SECONDS.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        AcquisitionError::Connection(_) => HumanError {
            message: "We couldn't reach the catalogue.".into(),
            suggestion: "Check your internet connection, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        AcquisitionError::Blocked(_) => HumanError {
            message: "The catalogue is refusing our requests right now.".into(),
            suggestion: "Wait a few minutes before trying again, or enter the details by hand."
                .into(),
            retriable: true,
            severity: Severity::Transient,
        },
        AcquisitionError::Status(code) => HumanError {
            message: "The catalogue couldn't find that bottle.".into(),
            suggestion: format!("Check the bottle id. (HTTP status {code})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        AcquisitionError::Malformed(_) => HumanError {
            message: "The catalogue sent a page we couldn't read.".into(),
            suggestion: "Try again later, or enter the details by hand.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_transient() {
        let human = humanize_error(&DramtagError::Acquisition(AcquisitionError::Timeout));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn validation_is_action_required() {
        let human = humanize_error(&DramtagError::Validation("name is missing".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("name is missing"));
        assert_eq!(human.severity.exit_code(), 64);
    }

    #[test]
    fn unknown_profile_points_at_listing() {
        let human = humanize_error(&DramtagError::ProfileNotFound("zebra".into()));
        assert!(human.message.contains("zebra"));
        assert!(human.suggestion.contains("dramtag profiles"));
    }

    #[test]
    fn asset_failure_reports_nothing_written() {
        let human = humanize_error(&DramtagError::RenderAsset("data too long".into()));
        assert!(human.suggestion.starts_with("Nothing was written"));
        assert!(human.suggestion.contains("data too long"));
        assert!(!human.suggestion.contains("built-in defaults"));
        assert!(!human.retriable);
    }
}
