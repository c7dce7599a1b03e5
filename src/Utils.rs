/// reading of corpus files and resolver dictionaries
pub mod load_from_file;
