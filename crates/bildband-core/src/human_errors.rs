// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the end of a run.
//
// Every technical error is mapped to a plain sentence plus a suggestion the
// user can act on.

use crate::error::BildbandError;

/// What an error meant for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// One image was left out; the rest of the document is fine.
    Skipped,
    /// No document was written.
    Fatal,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `BildbandError` into a `HumanError`.
pub fn humanize_error(err: &BildbandError) -> HumanError {
    match err {
        BildbandError::DirectoryRead { path, .. } => HumanError {
            message: format!("The folder {} could not be read.", path.display()),
            suggestion: "Check that the folder exists and that you may list its contents.".into(),
            severity: Severity::Fatal,
        },

        BildbandError::OutputWrite { path, .. } => HumanError {
            message: format!("The PDF {} could not be saved.", path.display()),
            suggestion: "Make sure the folder is writable and the disk is not full. \
                         Close the PDF if another program has it open."
                .into(),
            severity: Severity::Fatal,
        },

        BildbandError::NoPages { path } => HumanError {
            message: format!("No usable images were found in {}.", path.display()),
            suggestion: "Put JPEG, PNG or WebP files in the folder, or pass --extension \
                         for other file endings."
                .into(),
            severity: Severity::Fatal,
        },

        BildbandError::InvalidConfig(detail) => HumanError {
            message: "The settings are not valid.".into(),
            suggestion: format!("Fix the setting and try again. ({detail})"),
            severity: Severity::Fatal,
        },

        BildbandError::ConfigLoad { path, detail } => HumanError {
            message: format!("The settings file {} could not be loaded.", path.display()),
            suggestion: format!(
                "Check the path given to --config and that the file is valid JSON. ({detail})"
            ),
            severity: Severity::Fatal,
        },

        BildbandError::Decode { name, .. } => HumanError {
            message: format!("{name} is not a readable image and was left out."),
            suggestion: "The file may be damaged or only partly downloaded. \
                         Open it in an image viewer, or save it again as JPEG or PNG."
                .into(),
            severity: Severity::Skipped,
        },

        BildbandError::Encode { name, .. } => HumanError {
            message: format!("{name} could not be converted and was left out."),
            suggestion: "Try saving the image again as a plain JPEG.".into(),
            severity: Severity::Skipped,
        },

        BildbandError::IntegrityMismatch { .. } => HumanError {
            message: "The saved PDF does not match what was written.".into(),
            suggestion: "Another program may have changed the file. Run Bildband again.".into(),
            severity: Severity::Fatal,
        },

        BildbandError::PdfError(_) => HumanError {
            message: "Something went wrong while building the PDF.".into(),
            suggestion: format!("Run again with --verbose for details. ({err})"),
            severity: Severity::Fatal,
        },
    }
}
