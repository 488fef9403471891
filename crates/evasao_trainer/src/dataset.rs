//! CSV dataset loading
//!
//! Reads the `;`-separated enrollment microdata. Every byte is decoded as
//! Latin-1, so UTF-8 accents in the source surface as mojibake (`Ã§`) and
//! are repaired later by [`normalize_text`]. Column names are repaired on
//! load; values are kept raw until preprocessing.

use crate::errors::{Result, TrainerError};
use csv::{ByteRecord, ReaderBuilder};
use evasao_core::normalize_text;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Field separator of the microdata files
pub const DELIMITER: u8 = b';';

/// Column-oriented view over string cells; empty cells are `None`
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    /// BLAKE3 hex digest of the raw file bytes
    pub source_hash: String,
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_cell(bytes: &[u8]) -> Option<String> {
    let value = decode_latin1(bytes);
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl Dataset {
    /// Load dataset from a `;`-delimited CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            TrainerError::Dataset(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut dataset = Self::from_reader(bytes)?;
        dataset.source_hash = hex::encode(blake3::hash(bytes).as_bytes());
        Ok(dataset)
    }

    /// Parse from any reader; `source_hash` is left empty
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .byte_headers()?
            .iter()
            .map(|h| normalize_text(decode_latin1(h).trim()))
            .collect();

        if columns.is_empty() {
            return Err(TrainerError::Dataset("CSV has no header".to_string()));
        }

        let mut rows = Vec::new();
        let mut record = ByteRecord::new();
        while rdr.read_byte_record(&mut record)? {
            rows.push(record.iter().map(decode_cell).collect());
        }

        if rows.is_empty() {
            return Err(TrainerError::Dataset("Dataset is empty".to_string()));
        }

        debug!(rows = rows.len(), columns = columns.len(), "parsed csv");

        Ok(Self {
            columns,
            rows,
            source_hash: String::new(),
        })
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, `None` for missing
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_deref()).collect())
    }

    /// Share of missing cells per column, in column order
    pub fn missing_fractions(&self) -> Vec<(String, f64)> {
        let n = self.rows.len().max(1) as f64;
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let missing = self.rows.iter().filter(|row| row[idx].is_none()).count();
                (name.clone(), missing as f64 / n)
            })
            .collect()
    }

    /// Number of distinct present values in a column
    pub fn distinct_count(&self, idx: usize) -> usize {
        let mut seen: Vec<&str> = self.rows.iter().filter_map(|row| row[idx].as_deref()).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Apply `f` to every present cell of a column
    pub fn map_column<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&str) -> String,
    {
        if let Some(idx) = self.column_index(name) {
            for row in &mut self.rows {
                if let Some(value) = row[idx].as_mut() {
                    *value = f(value);
                }
            }
        }
    }

    /// Fill missing cells of a column with `value`
    pub fn fill_missing(&mut self, name: &str, value: &str) -> usize {
        let Some(idx) = self.column_index(name) else {
            return 0;
        };
        let mut filled = 0;
        for row in &mut self.rows {
            if row[idx].is_none() {
                row[idx] = Some(value.to_string());
                filled += 1;
            }
        }
        filled
    }

    /// Remove the named columns; unknown names are ignored
    pub fn drop_columns(&mut self, names: &[String]) {
        let keep: Vec<bool> = self.columns.iter().map(|c| !names.contains(c)).collect();
        let mut kept = keep.iter();
        self.columns.retain(|_| *kept.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut kept = keep.iter();
            row.retain(|_| *kept.next().unwrap_or(&true));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &[u8] = b"UF;Categoria da Situa\xc3\xa7\xc3\xa3o;Carga Horaria\nSP;Evas\xc3\xa3o;1000\nRJ;Conclu\xc3\xadda;\n";

    #[test]
    fn test_headers_are_repaired() {
        let dataset = Dataset::from_bytes(SAMPLE).unwrap();
        assert_eq!(
            dataset.columns,
            vec!["UF", "Categoria da Situação", "Carga Horaria"]
        );
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_values_are_latin1_and_empty_is_missing() {
        let dataset = Dataset::from_bytes(SAMPLE).unwrap();
        let status = dataset.column("Categoria da Situação").unwrap();
        // values stay raw until preprocessing
        assert_eq!(status[0], Some("Evas\u{c3}\u{a3}o"));
        assert_eq!(dataset.column("Carga Horaria").unwrap(), vec![Some("1000"), None]);
    }

    #[test]
    fn test_true_latin1_input() {
        let dataset = Dataset::from_bytes(b"Sexo;Regi\xe3o\nFeminino;Sudeste\n").unwrap();
        assert_eq!(dataset.columns, vec!["Sexo", "Região"]);
    }

    #[test]
    fn test_source_hash() {
        let a = Dataset::from_bytes(SAMPLE).unwrap();
        let b = Dataset::from_bytes(SAMPLE).unwrap();
        assert_eq!(a.source_hash.len(), 64);
        assert_eq!(a.source_hash, b.source_hash);
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE).unwrap();
        file.flush().unwrap();

        let dataset = Dataset::from_csv(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::from_csv("/nonexistent/microdados.csv").unwrap_err();
        assert!(matches!(err, TrainerError::Dataset(_)));
    }

    #[test]
    fn test_empty_dataset() {
        assert!(Dataset::from_bytes(b"UF;Sexo\n").is_err());
    }

    #[test]
    fn test_column_operations() {
        let mut dataset = Dataset::from_bytes(SAMPLE).unwrap();

        assert_eq!(dataset.fill_missing("Carga Horaria", "800"), 1);
        assert_eq!(dataset.distinct_count(2), 2);

        dataset.map_column("UF", |v| v.to_lowercase());
        assert_eq!(dataset.column("UF").unwrap(), vec![Some("sp"), Some("rj")]);

        dataset.drop_columns(&["UF".to_string(), "nope".to_string()]);
        assert_eq!(dataset.columns.len(), 2);
        assert!(dataset.rows.iter().all(|row| row.len() == 2));
        assert!(!dataset.has_column("UF"));
    }

    #[test]
    fn test_missing_fractions() {
        let dataset = Dataset::from_bytes(SAMPLE).unwrap();
        let fractions = dataset.missing_fractions();
        assert_eq!(fractions[2], ("Carga Horaria".to_string(), 0.5));
        assert_eq!(fractions[0].1, 0.0);
    }
}
