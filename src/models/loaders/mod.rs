pub mod json_loader;

pub use json_loader::{
    detect_text_field, find_matching_files, load_json_records, merge_records, parse_selection,
    validate_structure, FilePair,
};
