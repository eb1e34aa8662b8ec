use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Language mode handed to the editing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Html,
    Css,
    C,
    Cpp,
    Go,
    Json,
    Java,
    Markdown,
    Toml,
    Yaml,
    Bash,
    PlainText,
    /// No known mode for this extension
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Map an extension (without the dot) to a language; case-insensitive
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "html" | "htm" => Language::Html,
            "css" => Language::Css,
            "c" | "h" => Language::C,
            "cpp" | "hpp" | "cc" | "hh" | "cxx" | "hxx" => Language::Cpp,
            "go" => Language::Go,
            "json" => Language::Json,
            "java" => Language::Java,
            "md" | "markdown" => Language::Markdown,
            "toml" => Language::Toml,
            "yml" | "yaml" => Language::Yaml,
            "sh" | "bash" => Language::Bash,
            "txt" => Language::PlainText,
            _ => Language::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Html => "html",
            Language::Css => "css",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Go => "go",
            Language::Json => "json",
            Language::Java => "java",
            Language::Markdown => "markdown",
            Language::Toml => "toml",
            Language::Yaml => "yaml",
            Language::Bash => "bash",
            Language::PlainText => "plaintext",
            Language::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
