//! CSV input and output.
//!
//! Uploads arrive either as a path (CLI) or as raw bytes (the controller's
//! upload action). Both are read with the same missing-value tokens and then
//! conformed to [`crate::schema::CHURN_SCHEMA`]. Output is always UTF-8 CSV
//! with a header row and no index.

use crate::error::{ChurnError, Result, ResultExt};
use crate::schema::SchemaValidator;
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Cell values read as missing, in addition to empty cells.
pub const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn read_options(infer_schema_length: usize) -> CsvReadOptions {
    let null_values = NullValues::AllColumns(NA_TOKENS.iter().map(|t| (*t).into()).collect());
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(infer_schema_length))
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
}

/// Read a CSV file from disk.
pub fn read_csv_file(path: impl AsRef<Path>, infer_schema_length: usize) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ChurnError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )));
    }

    let df = read_options(infer_schema_length)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .context(format!("Failed to parse {}", path.display()))?;
    let df = SchemaValidator::conform_types(df)?;

    debug!("Read {} ({} rows, {} columns)", path.display(), df.height(), df.width());
    Ok(df)
}

/// Parse uploaded CSV bytes.
pub fn read_csv_bytes(bytes: &[u8], infer_schema_length: usize) -> Result<DataFrame> {
    let df = read_options(infer_schema_length)
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .context("Failed to parse uploaded CSV")?;
    let df = SchemaValidator::conform_types(df)?;

    debug!("Parsed upload ({} rows, {} columns)", df.height(), df.width());
    Ok(df)
}

/// Serialize a frame to CSV bytes.
pub fn write_csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut df = df.clone();
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)?;
    Ok(buf)
}

/// Write a frame to `dir/file_name`, creating `dir` if needed.
pub fn save_csv(df: &DataFrame, dir: impl AsRef<Path>, file_name: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let output_path = dir.join(file_name);

    let mut df = df.clone();
    let mut file = File::create(&output_path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)?;

    info!("Dataset saved: {}", output_path.display());
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "Age,Total_Spend\n30,100.5\n,200\n41,\n";

    #[test]
    fn test_read_csv_bytes_nulls_and_types() {
        let df = read_csv_bytes(SAMPLE.as_bytes(), 1000).unwrap();
        assert_eq!(df.shape(), (3, 2));
        assert_eq!(df.column("Age").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Total_Spend").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Age").unwrap().null_count(), 1);
        assert_eq!(df.column("Total_Spend").unwrap().null_count(), 1);
    }

    #[test]
    fn test_read_csv_bytes_na_tokens() {
        let csv = "Age,Total_Spend\nNA,100.5\n30,NaN\nnull,N/A\n41,200\n";
        let df = read_csv_bytes(csv.as_bytes(), 1000).unwrap();

        assert_eq!(df.column("Age").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Age").unwrap().null_count(), 2);
        assert_eq!(df.column("Total_Spend").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Total_Spend").unwrap().null_count(), 2);
    }

    #[test]
    fn test_read_csv_bytes_empty_column_is_numeric() {
        let csv = "Age,Annual_Income\n30,\n41,\n";
        let df = read_csv_bytes(csv.as_bytes(), 1000).unwrap();
        assert_eq!(df.column("Annual_Income").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Annual_Income").unwrap().null_count(), 2);
    }

    #[test]
    fn test_write_csv_bytes_header_no_index() {
        let df = df!["Age" => [30i64, 41], "Target_Churn" => [0i64, 1]].unwrap();
        let csv = String::from_utf8(write_csv_bytes(&df).unwrap()).unwrap();
        assert_eq!(csv, "Age,Target_Churn\n30,0\n41,1\n");
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_csv_file("no/such/file.csv", 1000),
            Err(ChurnError::Io(_))
        ));
    }

    #[test]
    fn test_save_csv_round_trip() {
        let dir = std::env::temp_dir().join(format!("churn-io-{}", std::process::id()));
        let df = df!["Age" => [30i64, 41]].unwrap();

        let path = save_csv(&df, &dir, "out.csv").unwrap();
        let back = read_csv_file(&path, 1000).unwrap();
        assert!(df.equals(&back));

        fs::remove_dir_all(&dir).ok();
    }
}
