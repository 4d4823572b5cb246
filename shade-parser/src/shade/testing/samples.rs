//! Sample library loader
//!
//!     Resolves a sample from its category and number to a file under
//!     `shade-parser/samples/`, then reads, tokenizes, analyzes or parses it. Numbers are read
//!     from the file name prefix before the first dash (`01-lighting.shade` is number 1). Two
//!     files resolving to the same number are an error.
//!
//!     Loading panics on any failure: the samples are part of the test suite, so a missing or
//!     broken sample is a broken test.

use crate::shade::ast::Module;
use crate::shade::error::Error;
use crate::shade::lexing::{tokenize_with, Token};
use crate::shade::options::ParseOptions;
use crate::shade::parsing::{analyze, parse_with, StructureData};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const SAMPLES_ROOT: &str = "samples";
const EXPECT_PREFIX: &str = "// expect:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCategory {
    Program,
    Declarations,
    Statements,
    Error,
}

impl SampleCategory {
    pub const ALL: [SampleCategory; 4] = [
        SampleCategory::Program,
        SampleCategory::Declarations,
        SampleCategory::Statements,
        SampleCategory::Error,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            SampleCategory::Program => "programs",
            SampleCategory::Declarations => "declarations",
            SampleCategory::Statements => "statements",
            SampleCategory::Error => "errors",
        }
    }

    /// Whether samples of this category compile.
    pub fn is_valid(&self) -> bool {
        *self != SampleCategory::Error
    }
}

pub fn samples_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(SAMPLES_ROOT)
}

/// Map of number to path for every `.shade` file in `dir`.
pub fn list_files_by_number(dir: &Path) -> Result<BTreeMap<usize, PathBuf>, String> {
    let mut files = BTreeMap::new();
    let entries = fs::read_dir(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
    for entry in entries {
        let path = entry.map_err(|e| e.to_string())?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("shade") {
            continue;
        }
        let Some(stem) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let Some(number) = stem.split('-').next().and_then(|n| n.parse::<usize>().ok()) else {
            continue;
        };
        if let Some(previous) = files.insert(number, path.clone()) {
            return Err(format!(
                "{} and {} share number {}",
                previous.display(),
                path.display(),
                number
            ));
        }
    }
    Ok(files)
}

/// A resolved sample file.
#[derive(Debug, Clone)]
pub struct Sample {
    pub category: SampleCategory,
    pub number: usize,
    pub path: PathBuf,
}

impl Sample {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn options(&self) -> ParseOptions {
        ParseOptions::for_file(self.name())
    }

    pub fn source(&self) -> String {
        fs::read_to_string(&self.path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", self.path.display(), e))
    }

    pub fn tokenize(&self) -> Vec<Token> {
        let source = self.source();
        tokenize_with(&source, &self.options())
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|e| panic!("Failed to tokenize {}: {}", self.path.display(), e))
    }

    pub fn analyze(&self) -> StructureData {
        analyze(&self.source(), &self.options())
            .unwrap_or_else(|e| panic!("Failed to analyze {}: {}", self.path.display(), e))
    }

    pub fn try_parse(&self) -> Result<Module, Error> {
        parse_with(&self.source(), &self.options())
    }

    pub fn parse(&self) -> Module {
        self.try_parse()
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", self.path.display(), e))
    }

    /// The error of a sample that must not compile.
    pub fn parse_error(&self) -> Error {
        match self.try_parse() {
            Ok(_) => panic!("{} compiled, expected an error", self.path.display()),
            Err(error) => error,
        }
    }

    /// The error kind named on an `// expect: <Kind>` first line.
    pub fn expected_error(&self) -> Option<String> {
        let source = self.source();
        let first = source.lines().next()?;
        first
            .strip_prefix(EXPECT_PREFIX)
            .map(|kind| kind.trim().to_string())
    }
}

/// Interface for loading curated samples.
pub struct Samples;

impl Samples {
    pub fn load(category: SampleCategory, number: usize) -> Sample {
        let dir = samples_root().join(category.dir_name());
        let path = list_files_by_number(&dir)
            .unwrap_or_else(|e| panic!("Failed to list {}: {}", dir.display(), e))
            .remove(&number)
            .unwrap_or_else(|| panic!("No {:?} sample #{}", category, number));
        Sample {
            category,
            number,
            path,
        }
    }

    pub fn program(number: usize) -> Sample {
        Self::load(SampleCategory::Program, number)
    }

    pub fn declarations(number: usize) -> Sample {
        Self::load(SampleCategory::Declarations, number)
    }

    pub fn statements(number: usize) -> Sample {
        Self::load(SampleCategory::Statements, number)
    }

    pub fn error(number: usize) -> Sample {
        Self::load(SampleCategory::Error, number)
    }

    /// Every sample of a category, in number order.
    pub fn all(category: SampleCategory) -> Vec<Sample> {
        let dir = samples_root().join(category.dir_name());
        list_files_by_number(&dir)
            .unwrap_or_else(|e| panic!("Failed to list {}: {}", dir.display(), e))
            .into_iter()
            .map(|(number, path)| Sample {
                category,
                number,
                path,
            })
            .collect()
    }

    /// Every sample that compiles.
    pub fn valid() -> Vec<Sample> {
        SampleCategory::ALL
            .iter()
            .filter(|category| category.is_valid())
            .flat_map(|category| Self::all(*category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_by_number() {
        let sample = Samples::program(1);
        assert_eq!(sample.name(), "01-lighting.shade");
        assert!(sample.source().contains("fn main("));
    }

    #[test]
    fn test_expected_error_line() {
        assert_eq!(
            Samples::error(1).expected_error().as_deref(),
            Some("UnknownTypeError")
        );
        assert_eq!(Samples::program(1).expected_error(), None);
    }

    #[test]
    fn test_every_category_has_samples() {
        for category in SampleCategory::ALL {
            assert!(!Samples::all(category).is_empty(), "{:?}", category);
        }
    }

    #[test]
    #[should_panic(expected = "No Program sample #99")]
    fn test_missing_sample() {
        Samples::program(99);
    }
}
