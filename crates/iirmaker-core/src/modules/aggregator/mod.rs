mod model;
mod parser;

use super::RecordSource;
use super::traits::DirectorySource;
use crate::domain::{
    AggregationSummary, AggregatorConfig, INNER_SLOTS, IirError, IirResult, OUTER_SLOTS, Slot,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, error, info};

use model::CoefficientBlock;
use parser::RawRecord;

const DOCUMENT_OPEN: &str = "{\n";
const DOCUMENT_CLOSE: &str = "}\n";
const GROUP_OPEN: &str = "  {\n";
const GROUP_CLOSE: &str = "  },\n";

/// Walks the slot grid in row-major order and renders the nested table.
#[derive(Debug, Clone)]
pub struct CoefficientAggregator<S> {
    source: S,
}

impl<S: RecordSource> CoefficientAggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Writes the whole document to `writer`.
    ///
    /// Stops at the first failing slot. Everything rendered before that
    /// point has already been handed to `writer`, so the document is left
    /// with unbalanced braces.
    pub fn write_table<W: Write>(
        &self,
        writer: &mut W,
        summary: &mut AggregationSummary,
    ) -> IirResult<()> {
        emit(writer, DOCUMENT_OPEN)?;
        for outer in 0..OUTER_SLOTS {
            emit(writer, GROUP_OPEN)?;
            for inner in 0..INNER_SLOTS {
                let slot = Slot::new(outer, inner);
                let Some(text) = self.source.load(slot)? else {
                    debug!(%slot, "no coefficient file, skipping");
                    summary.skipped_slots += 1;
                    continue;
                };

                let record = RawRecord::tokenize(slot, &text);
                let block = CoefficientBlock::from_record(&record)?;
                block.write_to(writer).map_err(write_error)?;

                let gains = block.gains();
                debug!(slot = %block.slot(), g1 = gains.g1, g2 = gains.g2, "slot written");
                summary.populated_slots.push(block.slot());
                summary.rows_written += block.row_count();
            }
            emit(writer, GROUP_CLOSE)?;
        }
        emit(writer, DOCUMENT_CLOSE)
    }
}

/// Runs a full export for `config`: reads every `facuIn<o><i>.txt` present
/// in the input directory and (re)writes `outCoeffs.txt` next to them.
pub fn aggregate(config: &AggregatorConfig) -> IirResult<AggregationSummary> {
    let output_path = config.output_path();
    info!(dir = %config.input_dir().display(), "aggregating coefficient table");

    let file = File::create(&output_path).map_err(|source| {
        IirError::io_system(
            "IO.OUTPUT_CREATE",
            format!(
                "failed to create coefficient table '{}': {}",
                output_path.display(),
                source
            ),
        )
    })?;
    let mut writer = BufWriter::new(file);
    let mut summary = AggregationSummary {
        output_path: output_path.clone(),
        ..AggregationSummary::default()
    };

    let aggregator = CoefficientAggregator::new(DirectorySource::new(config.input_dir()));
    if let Err(failure) = aggregator.write_table(&mut writer, &mut summary) {
        debug!(%failure, "aggregation aborted; output left incomplete");
        flush_partial(&mut writer, &output_path);
        return Err(failure);
    }

    writer.flush().map_err(write_error)?;
    info!(
        populated = summary.populated_count(),
        skipped = summary.skipped_slots,
        output = %output_path.display(),
        "coefficient table written"
    );
    Ok(summary)
}

fn emit<W: Write>(writer: &mut W, text: &str) -> IirResult<()> {
    writer.write_all(text.as_bytes()).map_err(write_error)
}

fn write_error(source: std::io::Error) -> IirError {
    IirError::io_system(
        "IO.OUTPUT_WRITE",
        format!("failed to write coefficient table: {}", source),
    )
}

fn flush_partial<W: Write>(writer: &mut W, output_path: &Path) {
    if let Err(source) = writer.flush() {
        error!(
            output = %output_path.display(),
            %source,
            "failed to flush partial coefficient table"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{CoefficientAggregator, aggregate};
    use crate::domain::{
        AggregationSummary, AggregatorConfig, IirErrorCategory, IirResult, OUTPUT_FILE_NAME,
        Slot,
    };
    use crate::modules::RecordSource;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const SCENARIO_RECORD: &str = "2 9 4 7\n1 1 1 1\n0 0 0 0\n3 0 0\n0 0\n0 0\n5 0 0\n";
    const UNIT_RECORD: &str = "2 2 2 2\n2 2 2 2\n2 2 2 2\n1\n1\n1\n1\n";

    struct MemorySource(BTreeMap<Slot, String>);

    impl RecordSource for MemorySource {
        fn load(&self, slot: Slot) -> IirResult<Option<String>> {
            Ok(self.0.get(&slot).cloned())
        }
    }

    fn render(records: &[(Slot, &str)]) -> (IirResult<()>, String, AggregationSummary) {
        let source = MemorySource(
            records
                .iter()
                .map(|(slot, text)| (*slot, (*text).to_string()))
                .collect(),
        );
        let mut buffer = Vec::new();
        let mut summary = AggregationSummary::default();
        let result = CoefficientAggregator::new(source).write_table(&mut buffer, &mut summary);
        (result, String::from_utf8(buffer).expect("utf8"), summary)
    }

    fn empty_group() -> &'static str {
        "  {\n  },\n"
    }

    #[test]
    fn single_slot_scenario_renders_expected_document() {
        let (result, out, summary) = render(&[(Slot::new(0, 0), SCENARIO_RECORD)]);
        result.expect("render should succeed");

        let mut expected = String::from("{\n  {\n    { \n");
        expected.push_str("      15.0,\t0,\t67.5,\t30.0,\t\n");
        expected.push_str("      0.5,\t0,\t0.5,\t0.5,\t\n");
        expected.push_str("      0.0,\t0,\t0.0,\t0.0,\t\n");
        expected.push_str("    },\n  },\n");
        for _ in 1..8 {
            expected.push_str(empty_group());
        }
        expected.push_str("}\n");

        assert_eq!(out, expected);
        assert_eq!(summary.populated_slots, vec![Slot::new(0, 0)]);
        assert_eq!(summary.skipped_slots, 63);
        assert_eq!(summary.rows_written, 3);
    }

    #[test]
    fn empty_grid_still_emits_eight_groups() {
        let (result, out, summary) = render(&[]);
        result.expect("render should succeed");
        assert_eq!(out, format!("{{\n{}}}\n", empty_group().repeat(8)));
        assert_eq!(summary.populated_count(), 0);
        assert_eq!(summary.skipped_slots, 64);
    }

    #[test]
    fn blocks_follow_row_major_slot_order() {
        let (result, out, summary) = render(&[
            (Slot::new(7, 7), "8 8 8\n0 0 0\n0 0 0\n1\n\n\n1\n"),
            (Slot::new(0, 3), "2 2 2\n0 0 0\n0 0 0\n1\n\n\n1\n"),
            (Slot::new(0, 1), "1 1 1\n0 0 0\n0 0 0\n1\n\n\n1\n"),
            (Slot::new(3, 0), "4 4 4\n0 0 0\n0 0 0\n1\n\n\n1\n"),
        ]);
        result.expect("render should succeed");
        assert_eq!(
            summary.populated_slots,
            vec![
                Slot::new(0, 1),
                Slot::new(0, 3),
                Slot::new(3, 0),
                Slot::new(7, 7)
            ]
        );

        let positions: Vec<usize> = ["0.5,\t0,\t0.5", "1.0,\t0,\t1.0", "2.0,\t0,\t2.0", "4.0,\t0,\t4.0"]
            .iter()
            .map(|needle| out.find(needle).expect("block should be present"))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn nesting_depth_is_three_regardless_of_population() {
        let (result, out, _) = render(&[
            (Slot::new(2, 0), UNIT_RECORD),
            (Slot::new(2, 1), UNIT_RECORD),
            (Slot::new(5, 6), UNIT_RECORD),
        ]);
        result.expect("render should succeed");

        let mut depth = 0_i32;
        let mut max_depth = 0_i32;
        for ch in out.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    max_depth = max_depth.max(depth);
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        assert_eq!(depth, 0);
        assert_eq!(max_depth, 3);
        assert_eq!(out.matches("  {\n").count(), 8);
        assert_eq!(out.matches("    { \n").count(), 3);
    }

    #[test]
    fn failing_slot_aborts_after_earlier_blocks() {
        let (result, out, summary) = render(&[
            (Slot::new(0, 0), UNIT_RECORD),
            (Slot::new(1, 4), "1 2 3 4\n1 2 3 4\n1 2 3 4\n"),
            (Slot::new(6, 6), UNIT_RECORD),
        ]);
        let error = result.expect_err("slot (1,4) has no gain lines");
        assert_eq!(error.category(), IirErrorCategory::InputValidationError);
        assert_eq!(error.placeholder(), "INPUT.RECORD_SHORT");

        assert_eq!(summary.populated_slots, vec![Slot::new(0, 0)]);
        assert_eq!(out.matches("    { \n").count(), 1);
        assert!(out.ends_with("  {\n"));
        assert!(!out.ends_with("}\n"));
    }

    #[test]
    fn aggregate_writes_output_next_to_inputs() {
        let temp = TempDir::new().expect("tempdir should be created");
        write_record(temp.path(), Slot::new(0, 0), SCENARIO_RECORD);
        write_record(temp.path(), Slot::new(4, 7), UNIT_RECORD);

        let config = AggregatorConfig::new(temp.path());
        let summary = aggregate(&config).expect("aggregation should succeed");

        assert_eq!(summary.output_path, temp.path().join(OUTPUT_FILE_NAME));
        assert_eq!(
            summary.populated_slots,
            vec![Slot::new(0, 0), Slot::new(4, 7)]
        );
        assert_eq!(summary.skipped_slots, 62);
        assert_eq!(summary.rows_written, 6);

        let out = fs::read_to_string(&summary.output_path).expect("output should exist");
        assert!(out.starts_with("{\n  {\n    { \n      15.0,\t0,\t67.5,\t30.0,\t\n"));
        assert!(out.ends_with("  },\n}\n"));
    }

    #[test]
    fn aggregate_is_byte_identical_across_runs() {
        let temp = TempDir::new().expect("tempdir should be created");
        write_record(temp.path(), Slot::new(1, 2), "0.1 0.2 0.3 1 -0.7 0.05\n0.4 0.5 0.6 1 -0.3 0.1\n0.7 0.8 0.9 1 0.2 0.0\n0.9\n\n\n1.1\n");
        write_record(temp.path(), Slot::new(6, 0), UNIT_RECORD);

        let config = AggregatorConfig::new(temp.path());
        aggregate(&config).expect("first run should succeed");
        let first = fs::read(config.output_path()).expect("first output should exist");
        aggregate(&config).expect("second run should succeed");
        let second = fs::read(config.output_path()).expect("second output should exist");

        assert_eq!(first, second);
    }

    #[test]
    fn aggregate_truncates_previous_output() {
        let temp = TempDir::new().expect("tempdir should be created");
        let config = AggregatorConfig::new(temp.path());
        fs::write(config.output_path(), "x".repeat(4096)).expect("stale output");

        aggregate(&config).expect("aggregation should succeed");
        let out = fs::read_to_string(config.output_path()).expect("output should exist");
        assert!(!out.contains('x'));
        assert_eq!(out.len(), "{\n}\n".len() + "  {\n  },\n".len() * 8);
    }

    #[test]
    fn aggregate_leaves_partial_output_on_failure() {
        let temp = TempDir::new().expect("tempdir should be created");
        write_record(temp.path(), Slot::new(0, 0), UNIT_RECORD);
        write_record(
            temp.path(),
            Slot::new(2, 3),
            "1 2 3 4\n1 2 3 4\n1 2 3 4\nnot-a-gain\n\n\n1\n",
        );

        let config = AggregatorConfig::new(temp.path());
        let error = aggregate(&config).expect_err("bad gain token should abort");
        assert_eq!(error.placeholder(), "INPUT.RECORD_TOKEN");
        assert!(error.message().contains("not-a-gain"));

        let out = fs::read_to_string(config.output_path()).expect("partial output should exist");
        assert!(out.starts_with("{\n  {\n    { \n      1.0,\t0,\t1.0,\t1.0,\t\n"));
        assert!(out.ends_with("  },\n  {\n"));
    }

    #[test]
    fn aggregate_reports_missing_directory_as_io_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        let config = AggregatorConfig::new(temp.path().join("missing"));
        let error = aggregate(&config).expect_err("output cannot be created");
        assert_eq!(error.category(), IirErrorCategory::IoSystemError);
        assert_eq!(error.placeholder(), "IO.OUTPUT_CREATE");
    }

    fn write_record(dir: &Path, slot: Slot, content: &str) {
        fs::write(dir.join(slot.input_file_name()), content).expect("record should be written");
    }
}
