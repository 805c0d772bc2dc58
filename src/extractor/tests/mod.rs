//! Test fixtures for extractor testing
//!
//! Builds export files in the shapes the agency produced across eras.

use std::io::Write;
use tempfile::NamedTempFile;


/// Preamble written above every modern export
pub const PREAMBLE: &str = "ダウンロードした時刻：2025/06/01 10:00:00\n\n,東京,東京,東京,東京,東京\n";

/// Export with the homogeneity column (six fields per row)
pub fn homogeneous_export(rows: &[&str]) -> String {
    let mut content = String::from(PREAMBLE);
    content.push_str("年月日,最高気温(℃),最高気温(℃),最高気温(℃),最低気温(℃),最低気温(℃)\n");
    content.push_str(",,品質情報,均質番号,,品質情報\n");
    content.push_str(",,,,,\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

/// Export without the homogeneity column (four fields per row)
pub fn compact_export(rows: &[&str]) -> String {
    let mut content = String::from(PREAMBLE);
    content.push_str("年月日,最高気温(℃),最高気温(℃),最低気温(℃)\n");
    content.push_str(",,品質情報,\n");
    content.push_str(",,,\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

/// Write content to a temporary file
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file
}
