//! Serialization of extraction results.

pub mod csv_out;

pub use csv_out::{table_to_csv_string, write_table_csv, write_table_csv_path};
