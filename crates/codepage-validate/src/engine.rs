//! The validation pipeline: extraction, syntax, security and API usage.

use regex::Regex;
use tracing::debug;

use codepage_core::result::AppResult;
use codepage_entity::validation::{ValidationOptions, ValidationReport};

use crate::extract::{ScriptExtractor, compile};
use crate::syntax;

/// A compiled pattern and the finding it produces.
#[derive(Debug, Clone)]
struct Rule {
    pattern: Regex,
    message: &'static str,
}

impl Rule {
    fn new(pattern: &str, message: &'static str) -> AppResult<Self> {
        Ok(Self {
            pattern: compile(pattern)?,
            message,
        })
    }

    fn hits(&self, source: &str) -> bool {
        self.pattern.is_match(source)
    }
}

/// Validates codepage source text. Patterns are compiled once in
/// [`Validator::new`]; `validate` itself is pure and cheap to call.
#[derive(Debug, Clone)]
pub struct Validator {
    extractor: ScriptExtractor,
    /// Error-level security rules.
    dangerous: Vec<Rule>,
    /// Advisory security rules.
    risky: Vec<Rule>,
    native_client: Rule,
    generic_fetch: Rule,
    connection_test: Rule,
}

impl Validator {
    /// Compile every rule.
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            extractor: ScriptExtractor::new()?,
            dangerous: vec![
                Rule::new(
                    r"\beval\s*\(",
                    "Uses eval(), which executes arbitrary strings as code",
                )?,
                Rule::new(
                    r"\bnew\s+Function\s*\(",
                    "Uses the Function constructor, which executes arbitrary strings as code",
                )?,
                Rule::new(
                    r#"\bset(?:Timeout|Interval)\s*\(\s*["'`]"#,
                    "Passes a string to setTimeout/setInterval, which evaluates it as code",
                )?,
                Rule::new(
                    r#"(?i)\b(?:user_?token|app_?token|api_?key|access_?token|secret|password)["']?\s*[:=]\s*["'][^"'\s]{8,}["']"#,
                    "Embeds a credential literal in source; load secrets at runtime instead",
                )?,
                Rule::new(
                    r"QB-USER-TOKEN\s+[A-Za-z0-9_]{8,}",
                    "Embeds a user token in an authorization header literal",
                )?,
            ],
            risky: vec![
                Rule::new(
                    r"\.(?:innerHTML|outerHTML)\s*=[^=]",
                    "Assigns to innerHTML/outerHTML; make sure the content is sanitized",
                )?,
                Rule::new(
                    r"\bdocument\s*\.\s*write(?:ln)?\s*\(",
                    "Uses document.write, which can inject unsanitized markup",
                )?,
                Rule::new(
                    r"\.insertAdjacentHTML\s*\(",
                    "Uses insertAdjacentHTML; make sure the content is sanitized",
                )?,
            ],
            native_client: Rule::new(
                r"\b(?:qbClient|quickbase|qdb)\s*\.\s*(?:get|post|patch|delete|query|request|api)\s*\(",
                "Uses the recommended platform client",
            )?,
            generic_fetch: Rule::new(
                r"\bfetch\s*\(|\bXMLHttpRequest\b|\baxios\s*[.(]",
                "Uses a generic HTTP call without the platform client; it may hit cross-origin restrictions",
            )?,
            connection_test: Rule::new(
                r"\b(?:testConnection|pingConnection|checkConnection)\s*\(",
                "Includes a connection test; consider removing it once the page is stable",
            )?,
        })
    }

    /// Run the enabled checks over `source`.
    pub fn validate(&self, source: &str, options: &ValidationOptions) -> ValidationReport {
        let mut report = ValidationReport::clean();
        let is_document = self.extractor.is_document(source);

        if options.check_syntax {
            self.check_syntax(source, is_document, &mut report);
        }
        if options.check_security {
            self.check_security(source, &mut report);
        }
        if options.check_apis {
            self.check_apis(source, &mut report);
        }

        debug!(
            is_document,
            is_valid = report.is_valid,
            errors = report.errors.len(),
            security_issues = report.security_issues.len(),
            warnings = report.warnings.len(),
            "Validated source"
        );
        report
    }

    fn check_syntax(&self, source: &str, is_document: bool, report: &mut ValidationReport) {
        let script = if is_document {
            self.extractor.scripts(source)
        } else {
            source.to_string()
        };
        if script.trim().is_empty() {
            return;
        }

        if let Err(err) = syntax::check(&script) {
            if is_document {
                // Script lines are counted within the extracted text.
                report.warning(format!(
                    "Advisory only, not enforced for full documents: embedded script may not parse ({err})"
                ));
            } else {
                report.error(format!("Syntax error: {err}"));
            }
        }
    }

    fn check_security(&self, source: &str, report: &mut ValidationReport) {
        for rule in self.dangerous.iter().filter(|r| r.hits(source)) {
            report.security_issue(rule.message);
            report.error(format!("Security: {}", rule.message));
        }
        for rule in self.risky.iter().filter(|r| r.hits(source)) {
            report.warning(rule.message);
        }
    }

    fn check_apis(&self, source: &str, report: &mut ValidationReport) {
        let native = self.native_client.hits(source);
        if native {
            report.suggestion(self.native_client.message);
        } else if self.generic_fetch.hits(source) {
            report.warning(self.generic_fetch.message);
        }
        if self.connection_test.hits(source) {
            report.suggestion(self.connection_test.message);
        }
    }
}
