pub mod loaders;
pub mod proof;
pub mod style;

pub use loaders::{find_matching_files, load_json_records, merge_records, FilePair};
pub use proof::{CheckResult, Issue, ModificationLevel, ProofItem, ProofReport, RevisionResult};
pub use style::StyleType;
