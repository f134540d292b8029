pub mod aggregator;
pub mod serialization;

mod traits;

pub use aggregator::{CoefficientAggregator, aggregate};
pub use traits::{DirectorySource, RecordSource};
