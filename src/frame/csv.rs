//! CSV encode/decode for [`DataFrame`]

use std::io::Cursor;

use crate::error::{Error, Result};
use crate::frame::{Column, DataFrame};

/// CSV parsing options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Treat the first row as column names
    pub has_headers: bool,
    /// Field delimiter. `None` auto-detects from the first line.
    pub delimiter: Option<u8>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_headers: true,
            delimiter: None,
        }
    }
}

impl DataFrame {
    /// Parse CSV bytes with headers and delimiter auto-detection.
    pub fn from_csv(data: &[u8]) -> Result<Self> {
        Self::from_csv_with(data, &CsvOptions::default())
    }

    /// Parse CSV bytes with explicit options.
    ///
    /// Rows with the wrong field count are padded or truncated to the column
    /// count; rows the parser rejects are skipped with a warning.
    pub fn from_csv_with(data: &[u8], options: &CsvOptions) -> Result<Self> {
        let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(data));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(options.has_headers)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(Cursor::new(data));

        let mut columns: Vec<Column> = if options.has_headers {
            reader
                .headers()?
                .iter()
                .enumerate()
                .map(|(index, name)| Column {
                    name: if name.is_empty() {
                        format!("column_{}", index + 1)
                    } else {
                        name.to_string()
                    },
                    index,
                })
                .collect()
        } else {
            // Populated from the first record's width
            Vec::new()
        };

        let mut rows = Vec::new();

        for (line, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(line = line + 1, %err, "skipping malformed CSV row");
                    continue;
                }
            };

            if columns.is_empty() {
                columns = (0..record.len())
                    .map(|index| Column {
                        name: format!("column_{}", index + 1),
                        index,
                    })
                    .collect();
            }

            let row: Vec<String> = record.iter().map(|field| field.to_string()).collect();
            rows.push(super::normalize_row(row, columns.len()));
        }

        Ok(DataFrame::from_parts(columns, rows))
    }

    /// Encode as CSV with a header row.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        if self.num_columns() == 0 {
            return Ok(Vec::new());
        }

        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record(self.columns().iter().map(|c| c.name.as_str()))?;
        for row in self.rows() {
            writer.write_record(row)?;
        }

        writer
            .into_inner()
            .map_err(|err| Error::Io(std::io::Error::other(err.to_string())))
    }
}

/// Pick the most frequent of the common delimiters in the first line
pub(crate) fn detect_delimiter(data: &[u8]) -> u8 {
    const CANDIDATES: [u8; 4] = [b',', b'\t', b';', b'|'];

    let first_line_end = data.iter().position(|&b| b == b'\n').unwrap_or(data.len());
    let first_line = &data[..first_line_end];

    CANDIDATES
        .into_iter()
        .map(|candidate| {
            let count = first_line.iter().filter(|&&b| b == candidate).count();
            (count, candidate)
        })
        .max_by_key(|(count, _)| *count)
        .filter(|(count, _)| *count > 0)
        .map(|(_, candidate)| candidate)
        .unwrap_or(b',')
}
