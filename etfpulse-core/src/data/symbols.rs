//! Symbol lists: the ordered set of tickers a ranking pass walks.
//!
//! `SymbolList` is an explicit value handed to the runner. `SymbolListFile`
//! is the file-backed provider: a newline-delimited ticker file that is
//! seeded with the default ETF list when absent and read back thereafter.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The 20 large US ETFs used when no symbol file exists yet.
pub const DEFAULT_ETFS: [&str; 20] = [
    "SPY", "IVV", "VOO", "QQQ", "VTI", "VTV", "VUG", "IWM", "IJH", "DIA", "XLK", "XLE", "XLF",
    "XLV", "XLY", "XLI", "XLC", "XLB", "XLP", "XLU",
];

#[derive(Debug, Error)]
pub enum SymbolListError {
    #[error("read symbol list {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("write symbol list {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Ordered list of unique ticker symbols. First occurrence wins on duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SymbolList {
    symbols: Vec<String>,
}

impl SymbolList {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let symbols = symbols
            .into_iter()
            .map(|s| s.as_ref().trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.clone()))
            .collect();
        Self { symbols }
    }

    pub fn default_etfs() -> Self {
        Self::new(DEFAULT_ETFS)
    }

    /// Parse newline-delimited tickers. Blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(|line| line.split('#').next().unwrap_or_default()),
        )
    }

    /// Render as newline-delimited text, one ticker per line.
    pub fn to_text(&self) -> String {
        let mut out = self.symbols.join("\n");
        out.push('\n');
        out
    }

    pub fn as_slice(&self) -> &[String] {
        &self.symbols
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s.eq_ignore_ascii_case(symbol))
    }
}

impl From<Vec<String>> for SymbolList {
    fn from(symbols: Vec<String>) -> Self {
        Self::new(symbols)
    }
}

impl From<SymbolList> for Vec<String> {
    fn from(list: SymbolList) -> Self {
        list.symbols
    }
}

/// File-backed symbol list provider.
#[derive(Debug, Clone)]
pub struct SymbolListFile {
    path: PathBuf,
}

impl SymbolListFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the list, seeding the file with the default ETFs first if absent.
    pub fn load_or_init(&self) -> Result<SymbolList, SymbolListError> {
        if !self.exists() {
            tracing::info!(path = %self.path.display(), "symbol list missing, writing defaults");
            self.write(&SymbolList::default_etfs())?;
        }
        self.load()
    }

    pub fn load(&self) -> Result<SymbolList, SymbolListError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SymbolListError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(SymbolList::parse(&content))
    }

    /// Write atomically: write to a sibling `.tmp` file, then rename.
    pub fn write(&self, list: &SymbolList) -> Result<(), SymbolListError> {
        let write_err = |source| SymbolListError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, list.to_text()).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            write_err(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_preserving_first_occurrence() {
        let list = SymbolList::new(["spy", "QQQ", "SPY", " iwm ", ""]);
        assert_eq!(list.as_slice(), &["SPY", "QQQ", "IWM"]);
    }

    #[test]
    fn default_list_has_twenty_unique_etfs() {
        let list = SymbolList::default_etfs();
        assert_eq!(list.len(), 20);
        assert_eq!(list.as_slice()[0], "SPY");
        assert!(list.contains("xlu"));
    }

    #[test]
    fn parse_skips_blank_and_comment_lines() {
        let list = SymbolList::parse("# sector funds\nXLK\n\nXLE  # energy\nXLK\n");
        assert_eq!(list.as_slice(), &["XLK", "XLE"]);
    }

    #[test]
    fn text_roundtrip() {
        let list = SymbolList::new(["DIA", "SPY"]);
        assert_eq!(SymbolList::parse(&list.to_text()), list);
    }

    #[test]
    fn serde_as_plain_array() {
        let list: SymbolList = serde_json::from_str(r#"["spy","spy","qqq"]"#).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["SPY","QQQ"]"#);
    }

    #[test]
    fn load_or_init_seeds_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = SymbolListFile::new(dir.path().join("etfs.txt"));
        assert!(!file.exists());

        let list = file.load_or_init().unwrap();
        assert!(file.exists());
        assert_eq!(list, SymbolList::default_etfs());
    }

    #[test]
    fn load_or_init_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = SymbolListFile::new(dir.path().join("etfs.txt"));
        file.write(&SymbolList::new(["VTI"])).unwrap();

        let list = file.load_or_init().unwrap();
        assert_eq!(list.as_slice(), &["VTI"]);
    }

    #[test]
    fn load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = SymbolListFile::new(dir.path().join("absent.txt"));
        assert!(matches!(file.load(), Err(SymbolListError::Read { .. })));
    }
}
