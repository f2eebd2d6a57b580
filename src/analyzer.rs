pub mod comment;
pub mod config;
pub mod extract;
pub mod parser;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use config::AnalyzerConfig;
use extract::ExtractedComment;
use parser::{PhpParser, TreeSitterPhpParser};

/// All doc comments extracted from one file.
pub struct FileReport {
    pub file: PathBuf,
    pub comments: Vec<ExtractedComment>,
}

impl FileReport {
    pub fn to_json(&self) -> JsonFileReport {
        JsonFileReport {
            file: self.file.display().to_string(),
            comments: self.comments.iter().map(JsonComment::from_extracted).collect(),
        }
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for extracted in &self.comments {
            writeln!(
                f,
                "{}:{} [{}]",
                self.file.display(),
                extracted.line,
                extracted.kind.as_str()
            )?;

            let comment = &extracted.comment;
            for flag in comment_flags(comment) {
                writeln!(f, "  {flag}")?;
            }
            for parameter in comment.parameter_list() {
                writeln!(f, "  @param {parameter}")?;
            }
            if comment.has_return_type() {
                writeln!(f, "  @return {}", comment.return_type())?;
            }
            for variable in comment.variable_list() {
                writeln!(f, "  @var {variable}")?;
            }
            for (_, property) in comment.magic_property_map() {
                writeln!(f, "  @property {property}")?;
            }
            for (_, method) in comment.magic_method_map() {
                writeln!(f, "  @method {method}")?;
            }
            for template in comment.template_type_list() {
                writeln!(f, "  @template {}", template.name())?;
            }
            if let Some(scope) = comment.closure_scope() {
                writeln!(f, "  @phan-closure-scope {scope}")?;
            }
            if !comment.suppress_issue_set().is_empty() {
                let names: Vec<_> = comment
                    .suppress_issue_set()
                    .iter()
                    .map(String::as_str)
                    .collect();
                writeln!(f, "  @suppress {}", names.join(", "))?;
            }
        }
        Ok(())
    }
}

fn comment_flags(comment: &comment::Comment) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if comment.is_deprecated() {
        flags.push("@deprecated");
    }
    if comment.is_override_intended() {
        flags.push("@override");
    }
    if comment.is_ns_internal() {
        flags.push("@internal");
    }
    flags
}

/// Serializable view of one extracted comment, using the stable canonical
/// string renderings throughout.
#[derive(Serialize)]
pub struct JsonComment {
    pub line: usize,
    pub kind: &'static str,
    pub deprecated: bool,
    pub override_intended: bool,
    pub ns_internal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub parameters: Vec<String>,
    pub variables: Vec<String>,
    pub magic_properties: Vec<String>,
    pub magic_methods: Vec<String>,
    pub template_types: Vec<String>,
    pub suppressed_issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closure_scope: Option<String>,
}

impl JsonComment {
    fn from_extracted(extracted: &ExtractedComment) -> Self {
        let comment = &extracted.comment;
        Self {
            line: extracted.line,
            kind: extracted.kind.as_str(),
            deprecated: comment.is_deprecated(),
            override_intended: comment.is_override_intended(),
            ns_internal: comment.is_ns_internal(),
            return_type: comment
                .has_return_type()
                .then(|| comment.return_type().to_string()),
            parameters: comment
                .parameter_list()
                .iter()
                .map(ToString::to_string)
                .collect(),
            variables: comment
                .variable_list()
                .iter()
                .map(ToString::to_string)
                .collect(),
            magic_properties: comment
                .magic_property_map()
                .map(|(_, property)| property.to_string())
                .collect(),
            magic_methods: comment
                .magic_method_map()
                .map(|(_, method)| method.to_string())
                .collect(),
            template_types: comment
                .template_type_list()
                .iter()
                .map(|template| template.name().to_string())
                .collect(),
            suppressed_issues: comment.suppress_issue_set().iter().cloned().collect(),
            closure_scope: comment.closure_scope().map(ToString::to_string),
        }
    }
}

#[derive(Serialize)]
pub struct JsonFileReport {
    pub file: String,
    pub comments: Vec<JsonComment>,
}

/// Drives extraction over files. Each worker owns its own tree-sitter
/// parser; the resulting comment models are immutable, so collecting
/// across threads needs no locking.
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: Option<AnalyzerConfig>) -> Self {
        Self {
            config: config.unwrap_or_default(),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn extract_file(&self, path: &Path) -> Result<FileReport> {
        let mut parser = TreeSitterPhpParser::new()?;
        let parsed = parser.parse_file(path)?;
        Ok(FileReport {
            file: parsed.path.clone(),
            comments: extract::extract_comments(&parsed, &self.config),
        })
    }

    pub fn extract_root(&self, root: &Path) -> Result<Vec<FileReport>> {
        let paths = collect_php_files(root)?;
        self.extract_files_with_progress(&paths, None)
    }

    pub fn extract_files_with_progress(
        &self,
        paths: &[PathBuf],
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<FileReport>> {
        let mut reports = paths
            .par_iter()
            .map(|path| {
                let report = self.extract_file(path);
                if let Some(progress) = progress {
                    progress.inc(1);
                }
                report
            })
            .collect::<Result<Vec<_>>>()?;

        reports.sort_by(|a, b| a.file.cmp(&b.file));
        Ok(reports)
    }
}

pub fn collect_php_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(if is_php_file(root) {
            vec![root.to_path_buf()]
        } else {
            vec![]
        });
    }

    let mut php_files = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if entry.file_type().is_file() && is_php_file(path) {
            php_files.push(path.to_path_buf());
        }
    }

    php_files.sort();
    Ok(php_files)
}

pub fn collect_php_files_from_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut php_files = Vec::new();
    for root in roots {
        php_files.extend(collect_php_files(root)?);
    }
    php_files.sort();
    php_files.dedup();
    Ok(php_files)
}

pub fn is_php_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("php"))
}
