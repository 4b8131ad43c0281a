//! Processed arrays: fixed-width numeric tables backed by a polars DataFrame.
//!
//! `ArrayBuilder` accumulates rows column by column and produces a
//! `ProcessedArray` only once every row has been accepted, so a failed
//! compilation never yields a partial array.

use crate::error::{DataStoreError, Result};
use crate::schema::{FieldSpec, FieldType, FieldValue, RowSchema};
use polars::prelude::{AnyValue, Column, DataFrame};

/// Typed storage for one column while rows are being pushed
#[derive(Debug)]
enum ColumnBuffer {
    UInt8(Vec<u8>),
    UInt32(Vec<u32>),
    Float32(Vec<f32>),
    Bool(Vec<bool>),
}

impl ColumnBuffer {
    fn with_capacity(field_type: FieldType, capacity: usize) -> Self {
        match field_type {
            FieldType::UInt8 => ColumnBuffer::UInt8(Vec::with_capacity(capacity)),
            FieldType::UInt32 => ColumnBuffer::UInt32(Vec::with_capacity(capacity)),
            FieldType::Float32 => ColumnBuffer::Float32(Vec::with_capacity(capacity)),
            FieldType::Bool => ColumnBuffer::Bool(Vec::with_capacity(capacity)),
        }
    }

    fn push(&mut self, value: FieldValue) -> bool {
        match (self, value) {
            (ColumnBuffer::UInt8(v), FieldValue::UInt8(x)) => v.push(x),
            (ColumnBuffer::UInt32(v), FieldValue::UInt32(x)) => v.push(x),
            (ColumnBuffer::Float32(v), FieldValue::Float32(x)) => v.push(x),
            (ColumnBuffer::Bool(v), FieldValue::Bool(x)) => v.push(x),
            _ => return false,
        }
        true
    }

    fn into_column(self, name: &str) -> Column {
        match self {
            ColumnBuffer::UInt8(v) => Column::new(name.into(), v),
            ColumnBuffer::UInt32(v) => Column::new(name.into(), v),
            ColumnBuffer::Float32(v) => Column::new(name.into(), v),
            ColumnBuffer::Bool(v) => Column::new(name.into(), v),
        }
    }
}

/// Row-wise builder for a processed array of a known schema
#[derive(Debug)]
pub struct ArrayBuilder {
    kind: String,
    fields: Vec<FieldSpec>,
    buffers: Vec<ColumnBuffer>,
    rows: usize,
}

impl ArrayBuilder {
    pub fn new(kind: impl Into<String>, schema: &RowSchema, capacity: usize) -> Self {
        let fields = schema.fields().to_vec();
        let buffers = fields
            .iter()
            .map(|f| ColumnBuffer::with_capacity(f.field_type, capacity))
            .collect();
        Self {
            kind: kind.into(),
            fields,
            buffers,
            rows: 0,
        }
    }

    /// Append one full-width row
    pub fn push_row(&mut self, row: &[FieldValue]) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(self.mismatch(row));
        }
        // Check every cell before touching the buffers so columns stay aligned.
        let aligned = self
            .fields
            .iter()
            .zip(row)
            .all(|(spec, value)| spec.field_type == value.field_type());
        if !aligned {
            return Err(self.mismatch(row));
        }

        for (buffer, value) in self.buffers.iter_mut().zip(row) {
            buffer.push(*value);
        }
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(self) -> Result<ProcessedArray> {
        let columns = self
            .buffers
            .into_iter()
            .zip(&self.fields)
            .map(|(buffer, spec)| buffer.into_column(spec.name))
            .collect::<Vec<_>>();
        let df = DataFrame::new(columns)?;
        Ok(ProcessedArray { df })
    }

    fn mismatch(&self, row: &[FieldValue]) -> DataStoreError {
        DataStoreError::PrefixMismatch {
            kind: self.kind.clone(),
            expected: format!(
                "{} [{}]",
                self.fields.len(),
                self.fields
                    .iter()
                    .map(|f| f.field_type.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            found: format!(
                "{} [{}]",
                row.len(),
                row.iter()
                    .map(|v| v.field_type().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// The processed representation of a store
#[derive(Debug, Clone)]
pub struct ProcessedArray {
    df: DataFrame,
}

impl ProcessedArray {
    pub fn from_dataframe(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Number of fields per row
    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Read back row `index` in field order
    pub fn row(&self, index: usize) -> Result<Vec<FieldValue>> {
        self.df
            .get_columns()
            .iter()
            .map(|column| {
                let value = column.get(index)?;
                field_value(column.name().as_str(), value)
            })
            .collect()
    }

    pub fn rows(&self) -> Result<Vec<Vec<FieldValue>>> {
        (0..self.len()).map(|i| self.row(i)).collect()
    }

    /// Row-by-row bitwise comparison, NaN payloads included
    pub fn bit_identical(&self, other: &ProcessedArray) -> Result<bool> {
        if self.column_names() != other.column_names() || self.len() != other.len() {
            return Ok(false);
        }
        for i in 0..self.len() {
            let left = self.row(i)?;
            let right = other.row(i)?;
            if !left.iter().zip(&right).all(|(a, b)| a.bit_eq(b)) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn field_value(column: &str, value: AnyValue<'_>) -> Result<FieldValue> {
    match value {
        AnyValue::UInt8(v) => Ok(FieldValue::UInt8(v)),
        AnyValue::UInt32(v) => Ok(FieldValue::UInt32(v)),
        AnyValue::Float32(v) => Ok(FieldValue::Float32(v)),
        AnyValue::Boolean(v) => Ok(FieldValue::Bool(v)),
        other => Err(DataStoreError::UnsupportedColumn {
            column: column.to_string(),
            value: format!("{:?}", other),
        }),
    }
}
