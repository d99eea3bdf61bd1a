//! Parquet decode for [`DataFrame`]
//!
//! Record batches are flattened to string cells. Values with a natural text
//! form go through Arrow's own formatter; floats, temporal types and binary
//! get explicit renderings so the output is stable across Arrow versions.

use arrow::array::*;
use arrow::datatypes::{DataType, TimeUnit};
use arrow::util::display::array_value_to_string;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::Result;
use crate::frame::{Column, DataFrame};

const BATCH_SIZE: usize = 8192;

impl DataFrame {
    /// Decode Parquet bytes into a frame of string cells.
    pub fn from_parquet(data: &[u8]) -> Result<Self> {
        // Bytes implements ChunkReader
        let bytes = Bytes::copy_from_slice(data);
        let builder = ParquetRecordBatchReaderBuilder::try_new(bytes)?;

        let schema = builder.schema().clone();
        let columns: Vec<Column> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(index, field)| Column {
                name: field.name().clone(),
                index,
            })
            .collect();

        let reader = builder.with_batch_size(BATCH_SIZE).build()?;

        let mut rows = Vec::new();
        for batch in reader {
            let batch = batch?;
            for row_idx in 0..batch.num_rows() {
                let mut row = Vec::with_capacity(columns.len());
                for col_idx in 0..batch.num_columns() {
                    row.push(render_value(batch.column(col_idx), row_idx));
                }
                rows.push(row);
            }
        }

        Ok(DataFrame::from_parts(columns, rows))
    }
}

/// Render one array cell as a string
fn render_value(array: &ArrayRef, idx: usize) -> String {
    if array.is_null(idx) {
        return "null".to_string();
    }

    match array.data_type() {
        DataType::Float32 => {
            let arr = array.as_any().downcast_ref::<Float32Array>().unwrap();
            render_float(arr.value(idx) as f64)
        }
        DataType::Float64 => {
            let arr = array.as_any().downcast_ref::<Float64Array>().unwrap();
            render_float(arr.value(idx))
        }
        DataType::Binary => {
            let arr = array.as_any().downcast_ref::<BinaryArray>().unwrap();
            render_binary(arr.value(idx))
        }
        DataType::LargeBinary => {
            let arr = array.as_any().downcast_ref::<LargeBinaryArray>().unwrap();
            render_binary(arr.value(idx))
        }
        DataType::Date32 => {
            let arr = array.as_any().downcast_ref::<Date32Array>().unwrap();
            let days = arr.value(idx);
            // Days from year 1 to the Unix epoch
            match chrono::NaiveDate::from_num_days_from_ce_opt(days + 719_163) {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => format!("date({})", days),
            }
        }
        DataType::Date64 => {
            let arr = array.as_any().downcast_ref::<Date64Array>().unwrap();
            let ms = arr.value(idx);
            match chrono::DateTime::from_timestamp_millis(ms) {
                Some(dt) => dt.format("%Y-%m-%d").to_string(),
                None => format!("date({}ms)", ms),
            }
        }
        DataType::Timestamp(unit, _) => {
            let value = match unit {
                TimeUnit::Second => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampSecondArray>()
                        .unwrap();
                    chrono::DateTime::from_timestamp(arr.value(idx), 0)
                }
                TimeUnit::Millisecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampMillisecondArray>()
                        .unwrap();
                    chrono::DateTime::from_timestamp_millis(arr.value(idx))
                }
                TimeUnit::Microsecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampMicrosecondArray>()
                        .unwrap();
                    chrono::DateTime::from_timestamp_micros(arr.value(idx))
                }
                TimeUnit::Nanosecond => {
                    let arr = array
                        .as_any()
                        .downcast_ref::<TimestampNanosecondArray>()
                        .unwrap();
                    let nanos = arr.value(idx);
                    chrono::DateTime::from_timestamp(
                        nanos.div_euclid(1_000_000_000),
                        nanos.rem_euclid(1_000_000_000) as u32,
                    )
                }
            };
            match value {
                Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => "invalid timestamp".to_string(),
            }
        }
        // Integers, booleans, strings, decimals and nested types all have a
        // sensible text form already
        _ => array_value_to_string(array, idx).unwrap_or_default(),
    }
}

fn render_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v.is_sign_positive() { "Inf" } else { "-Inf" }.to_string()
    } else {
        v.to_string()
    }
}

fn render_binary(bytes: &[u8]) -> String {
    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    if bytes.len() <= 32 {
        format!("0x{}", hex(bytes))
    } else {
        format!("0x{}... ({} bytes)", hex(&bytes[..16]), bytes.len())
    }
}
