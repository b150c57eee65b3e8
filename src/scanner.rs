use crate::matcher::CompiledMatcher;
use crate::models::{Config, ParsedAnnotation};
use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use rayon::prelude::*;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// How files are discovered
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub recursive: bool,
    pub exclude_patterns: Vec<String>,
    pub ignored_dirs: Vec<String>,
    pub respect_gitignore: bool,
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            recursive: config.recursive,
            exclude_patterns: config.exclude_patterns.clone(),
            ignored_dirs: config.ignored_dirs.clone(),
            respect_gitignore: config.respect_gitignore,
        }
    }
}

/// Enumerates files and hands their content to the matcher
#[derive(Debug, Clone)]
pub struct FileScanner {
    options: ScanOptions,
    exclude: Vec<Regex>,
}

impl FileScanner {
    pub fn new(options: &ScanOptions) -> Result<Self> {
        let exclude = options
            .exclude_patterns
            .iter()
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| {
                Regex::new(pattern)
                    .with_context(|| format!("Invalid exclude pattern: {}", pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            options: options.clone(),
            exclude,
        })
    }

    /// Expand the given files and directories into a sorted, deduplicated list of files
    pub fn collect_files(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files = Vec::new();

        for input in inputs {
            if self.is_excluded(input) {
                tracing::debug!("excluding {}", input.display());
                continue;
            }

            let metadata = fs::metadata(input)
                .with_context(|| format!("No such file: {}", input.display()))?;

            if metadata.is_dir() {
                if !self.options.recursive {
                    bail!("Cannot process directory {} without recursion", input.display());
                }
                for file in self.walk(input)? {
                    if seen.insert(absolute(&file)?) {
                        files.push(file);
                    }
                }
            } else if seen.insert(absolute(input)?) {
                files.push(input.clone());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Match every file in parallel
    pub fn scan_files(
        &self,
        files: &[PathBuf],
        matcher: &CompiledMatcher,
    ) -> Result<BTreeMap<PathBuf, Vec<ParsedAnnotation>>> {
        files
            .par_iter()
            .filter(|path| !should_skip(path))
            .map(|path| -> Result<(PathBuf, Vec<ParsedAnnotation>)> {
                let content = read_lossy(path)?;
                Ok((path.clone(), matcher.match_lines(&content)))
            })
            .collect()
    }

    fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut walker = WalkBuilder::new(root);
        walker.standard_filters(self.options.respect_gitignore);

        let ignored_dirs = self.options.ignored_dirs.clone();
        let exclude = self.exclude.clone();
        walker.filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            let name = entry.file_name().to_str().unwrap_or("");
            if is_dir && entry.depth() > 0 && ignored_dirs.iter().any(|ignored| ignored == name) {
                return false;
            }
            !matches_any(&exclude, entry.path())
        });

        let mut files = Vec::new();
        for result in walker.build() {
            let entry = result
                .with_context(|| format!("Failed to list {}", root.display()))?;
            if entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        matches_any(&self.exclude, path)
    }
}

/// True when a pattern matches the path as given or its absolute form
fn matches_any(patterns: &[Regex], path: &Path) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let given = path.to_string_lossy();
    let absolute = std::path::absolute(path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| given.to_string());
    patterns
        .iter()
        .any(|re| re.is_match(&given) || re.is_match(&absolute))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("Failed to generate absolute path for {}", path.display()))
}

fn should_skip(path: &Path) -> bool {
    if is_likely_binary(path) {
        tracing::debug!("skipping binary file {}", path.display());
        return true;
    }
    if let Ok(metadata) = fs::metadata(path) {
        if metadata.len() > MAX_FILE_SIZE {
            tracing::debug!("skipping large file {}", path.display());
            return true;
        }
    }
    false
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to process {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Check if a file is likely binary
pub fn is_likely_binary(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        matches!(
            ext.to_lowercase().as_str(),
            "png" | "jpg" | "jpeg" | "gif" | "ico" | "pdf" | "zip" | "tar" | "gz" | "exe" | "dll" | "so" | "dylib" | "bin" | "dat"
        )
    } else {
        false
    }
}
