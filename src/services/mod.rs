pub mod prompts;
pub mod report_writer;
pub mod response_parser;
pub mod revision_policy;

pub use prompts::PromptTemplates;
pub use report_writer::{ReportWriter, Summary};
pub use response_parser::{parse_response, parse_value};
pub use revision_policy::RevisionPolicy;
