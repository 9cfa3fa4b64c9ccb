//! Conversion between codepages and their text representations.
//!
//! Three formats are supported:
//!
//! - **raw**: the code field verbatim
//! - **structured**: a JSON document with every attribute except identity
//!   and timestamps
//! - **human-readable**: a Markdown document with the code in a fenced block

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use codepage_core::error::AppError;
use codepage_core::result::AppResult;
use codepage_entity::codepage::{Codepage, CodepageDraft};

/// Name given to imported raw source when nothing better is known.
pub const DEFAULT_IMPORT_NAME: &str = "Imported Codepage";

/// Export/import format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Code only.
    Raw,
    /// JSON metadata document.
    Structured,
    /// Markdown document.
    HumanReadable,
}

impl Format {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "html" | "htm" | "js" => Some(Self::Raw),
            "json" => Some(Self::Structured),
            "md" | "markdown" => Some(Self::HumanReadable),
            _ => None,
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Raw => "html",
            Self::Structured => "json",
            Self::HumanReadable => "md",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Structured => write!(f, "structured"),
            Self::HumanReadable => write!(f, "human_readable"),
        }
    }
}

impl FromStr for Format {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "raw" | "html" | "source" => Ok(Self::Raw),
            "structured" | "json" => Ok(Self::Structured),
            "human_readable" | "human" | "markdown" | "md" => Ok(Self::HumanReadable),
            other => Err(AppError::validation(format!("Unknown format '{other}'"))),
        }
    }
}

/// Structured document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    name: String,
    code: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    target_table_id: Option<String>,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl From<CodepageDraft> for Document {
    fn from(d: CodepageDraft) -> Self {
        Self {
            name: d.name,
            code: d.code,
            description: d.description,
            version: d.version,
            tags: d.tags,
            dependencies: d.dependencies,
            target_table_id: d.target_table_id,
            active: d.active,
        }
    }
}

impl From<Document> for CodepageDraft {
    fn from(d: Document) -> Self {
        Self {
            name: d.name,
            code: d.code,
            description: d.description,
            version: d.version,
            tags: d.tags,
            dependencies: d.dependencies,
            target_table_id: d.target_table_id,
            active: d.active,
        }
    }
}

/// Render a codepage in the given format.
pub fn export(codepage: &Codepage, format: Format) -> AppResult<String> {
    match format {
        Format::Raw => Ok(codepage.code.clone()),
        Format::Structured => Ok(serde_json::to_string_pretty(&Document::from(
            codepage.to_draft(),
        ))?),
        Format::HumanReadable => Ok(to_markdown(codepage)),
    }
}

/// Parse text into a draft.
///
/// With `format` unset the format is detected: markup is raw source, a
/// JSON object with `name` and `code` is structured. Anything else fails
/// with an unrecognized-format error. `default_name` names raw imports.
pub fn import(
    text: &str,
    format: Option<Format>,
    default_name: Option<&str>,
) -> AppResult<CodepageDraft> {
    match format {
        Some(Format::Raw) => Ok(from_raw(text, default_name)),
        Some(Format::Structured) => from_structured(text),
        Some(Format::HumanReadable) => from_markdown(text),
        None if text.trim_start().starts_with('<') => Ok(from_raw(text, default_name)),
        None => from_structured(text).map_err(|_| {
            AppError::unrecognized_format(
                "Input is neither a markup document nor a structured codepage document",
            )
        }),
    }
}

fn from_raw(text: &str, default_name: Option<&str>) -> CodepageDraft {
    let name = default_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from)
        .or_else(|| document_title(text))
        .unwrap_or_else(|| DEFAULT_IMPORT_NAME.to_string());
    CodepageDraft::new(name, text)
}

/// Text of the first `<title>` element, if any.
fn document_title(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let open = lower.find("<title>")? + "<title>".len();
    let close = open + lower[open..].find("</title>")?;
    let title = text[open..close].trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn from_structured(text: &str) -> AppResult<CodepageDraft> {
    let document: Document = serde_json::from_str(text).map_err(|e| {
        AppError::unrecognized_format(format!("Not a structured codepage document: {e}"))
    })?;
    Ok(document.into())
}

const META_VERSION: &str = "**Version:**";
const META_TARGET: &str = "**Target table:**";
const META_TAGS: &str = "**Tags:**";
const META_ACTIVE: &str = "**Active:**";
const CODE_HEADING: &str = "## Code";
const DEPENDENCIES_HEADING: &str = "## Dependencies";

fn to_markdown(codepage: &Codepage) -> String {
    let mut out = format!("# {}\n\n", codepage.name);

    if let Some(version) = &codepage.version {
        out.push_str(&format!("{META_VERSION} {version}  \n"));
    }
    if let Some(target) = &codepage.target_table_id {
        out.push_str(&format!("{META_TARGET} {target}  \n"));
    }
    if !codepage.tags.is_empty() {
        out.push_str(&format!("{META_TAGS} {}  \n", codepage.tags.join(", ")));
    }
    out.push_str(&format!(
        "{META_ACTIVE} {}\n\n",
        if codepage.active { "yes" } else { "no" }
    ));

    if let Some(description) = &codepage.description {
        out.push_str(description.trim_end());
        out.push_str("\n\n");
    }

    if !codepage.dependencies.is_empty() {
        out.push_str(DEPENDENCIES_HEADING);
        out.push_str("\n\n");
        for dep in &codepage.dependencies {
            out.push_str(&format!("- {dep}\n"));
        }
        out.push('\n');
    }

    let fence = fence_for(&codepage.code);
    let label = if codepage.code.trim_start().starts_with('<') {
        "html"
    } else {
        "javascript"
    };
    out.push_str(&format!("{CODE_HEADING}\n\n{fence}{label}\n"));
    out.push_str(&codepage.code);
    if !codepage.code.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&fence);
    out.push('\n');
    out
}

/// A backtick fence longer than any backtick run in `code`.
fn fence_for(code: &str) -> String {
    let longest = code
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(3))
}

fn from_markdown(text: &str) -> AppResult<CodepageDraft> {
    let mut name = None;
    let mut draft_version = None;
    let mut target = None;
    let mut tags = Vec::new();
    let mut active = true;
    let mut description: Vec<&str> = Vec::new();
    let mut dependencies = Vec::new();
    let mut code = None;

    let mut lines = text.lines();
    let mut in_dependencies = false;
    while let Some(line) = lines.next() {
        let trimmed = line.trim_end();
        if name.is_none() {
            if let Some(title) = trimmed.strip_prefix("# ") {
                name = Some(title.trim().to_string());
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix(META_VERSION) {
            draft_version = Some(rest.trim().to_string());
        } else if let Some(rest) = trimmed.strip_prefix(META_TARGET) {
            target = Some(rest.trim().to_string());
        } else if let Some(rest) = trimmed.strip_prefix(META_TAGS) {
            tags = rest
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
        } else if let Some(rest) = trimmed.strip_prefix(META_ACTIVE) {
            active = !rest.trim().eq_ignore_ascii_case("no");
        } else if trimmed == DEPENDENCIES_HEADING {
            in_dependencies = true;
        } else if trimmed.starts_with("```") {
            code = Some(read_fence(trimmed, &mut lines)?);
            break;
        } else if trimmed == CODE_HEADING {
            in_dependencies = false;
        } else if in_dependencies {
            if let Some(dep) = trimmed.trim_start().strip_prefix("- ") {
                dependencies.push(dep.trim().to_string());
            }
        } else {
            description.push(line);
        }
    }

    let name = name.ok_or_else(|| {
        AppError::unrecognized_format("Markdown document has no '# name' heading")
    })?;
    let code = code
        .ok_or_else(|| AppError::unrecognized_format("Markdown document has no fenced code block"))?;

    let description = description.join("\n").trim().to_string();
    Ok(CodepageDraft {
        name,
        code,
        description: (!description.is_empty()).then_some(description),
        version: draft_version,
        tags,
        dependencies,
        target_table_id: target,
        active,
    })
}

/// Collect the body of a fenced block whose opening line is `opening`.
fn read_fence<'a>(opening: &str, lines: &mut impl Iterator<Item = &'a str>) -> AppResult<String> {
    let width = opening.chars().take_while(|c| *c == '`').count();
    let mut body = Vec::new();
    for line in lines.by_ref() {
        let candidate = line.trim_end();
        if candidate.len() >= width && candidate.chars().all(|c| c == '`') {
            return Ok(body.join("\n"));
        }
        body.push(line);
    }
    Err(AppError::unrecognized_format("Unterminated fenced code block"))
}
