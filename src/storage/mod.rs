pub mod json_file;

pub use json_file::write_json;
