pub mod errors;

pub use errors::{IirError, IirErrorCategory, IirResult, ParserResult};

use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Number of equaliser banks (outer grid axis).
pub const OUTER_SLOTS: usize = 8;
/// Number of gain levels per bank (inner grid axis).
pub const INNER_SLOTS: usize = 8;
pub const RECORD_LINE_COUNT: usize = 7;
pub const EMITTED_ROW_COUNT: usize = 3;
/// Minimum width of line 1; the gain correction touches columns 0..3.
pub const GAIN_CORRECTED_COLUMNS: usize = 3;

pub const INPUT_FILE_PREFIX: &str = "facuIn";
pub const INPUT_FILE_EXTENSION: &str = "txt";
pub const OUTPUT_FILE_NAME: &str = "outCoeffs.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Slot {
    pub outer: usize,
    pub inner: usize,
}

impl Slot {
    pub const fn new(outer: usize, inner: usize) -> Self {
        Self { outer, inner }
    }

    /// Name of the coefficient file backing this slot, e.g. `facuIn07.txt`.
    pub fn input_file_name(&self) -> String {
        format!(
            "{}{}{}.{}",
            INPUT_FILE_PREFIX, self.outer, self.inner, INPUT_FILE_EXTENSION
        )
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.outer, self.inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub input_dir: PathBuf,
}

impl AggregatorConfig {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.input_dir.join(OUTPUT_FILE_NAME)
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSummary {
    pub output_path: PathBuf,
    pub populated_slots: Vec<Slot>,
    pub skipped_slots: usize,
    pub rows_written: usize,
}

impl AggregationSummary {
    pub fn populated_count(&self) -> usize {
        self.populated_slots.len()
    }

    pub fn populated_in_group(&self, outer: usize) -> usize {
        self.populated_slots
            .iter()
            .filter(|slot| slot.outer == outer)
            .count()
    }
}
