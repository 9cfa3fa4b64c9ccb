//! Validation report produced by static analysis of codepage source.

use serde::{Deserialize, Serialize};

/// Which checks to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Parse the (extracted) script text.
    pub check_syntax: bool,
    /// Look for recommended and risky API idioms.
    pub check_apis: bool,
    /// Look for dangerous constructs and embedded credentials.
    pub check_security: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_syntax: true,
            check_apis: true,
            check_security: true,
        }
    }
}

/// Findings for one source text. Produced, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `true` iff there are no errors and no security issues.
    pub is_valid: bool,
    /// Fatal findings.
    pub errors: Vec<String>,
    /// Advisory findings.
    pub warnings: Vec<String>,
    /// Error-level security findings, reported as their own category.
    pub security_issues: Vec<String>,
    /// Purely advisory hints.
    pub suggestions: Vec<String>,
}

impl ValidationReport {
    /// Record a fatal finding.
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.refresh();
    }

    /// Record an error-level security finding.
    pub fn security_issue(&mut self, message: impl Into<String>) {
        self.security_issues.push(message.into());
        self.refresh();
    }

    /// Record an advisory finding.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record a hint.
    pub fn suggestion(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }

    fn refresh(&mut self) {
        self.is_valid = self.errors.is_empty() && self.security_issues.is_empty();
    }

    /// A report with no findings.
    pub fn clean() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    /// Every blocking finding, security issues first.
    pub fn blocking_findings(&self) -> impl Iterator<Item = &str> {
        self.security_issues
            .iter()
            .chain(self.errors.iter())
            .map(String::as_str)
    }
}
