//! Conversion from Arrow record batches into a [`Dataset`].

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};

use super::{Dataset, Value};
use crate::error::Result;

impl Dataset {
    /// Builds a dataset from Arrow record batches sharing `schema`.
    ///
    /// Numeric Arrow types become [`Value::Number`], nulls and NaN become
    /// [`Value::Missing`], and every other type is rendered to text with
    /// Arrow's display formatting.
    pub fn from_record_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let mut columns: Vec<Vec<Value>> = vec![Vec::new(); schema.fields().len()];

        for batch in batches {
            for (index, array) in batch.columns().iter().enumerate() {
                append_values(&mut columns[index], array)?;
            }
        }

        let builder = schema
            .fields()
            .iter()
            .zip(columns)
            .fold(Dataset::builder(), |builder, (field, values)| {
                builder.column(field.name().as_str(), values)
            });
        builder.build()
    }
}

fn append_values(out: &mut Vec<Value>, array: &ArrayRef) -> Result<()> {
    out.reserve(array.len());

    if array.data_type().is_numeric() {
        let floats = cast(array, &DataType::Float64)?;
        let floats = floats.as_primitive::<Float64Type>();
        for i in 0..floats.len() {
            if floats.is_null(i) {
                out.push(Value::Missing);
            } else {
                out.push(Value::number(floats.value(i)));
            }
        }
        return Ok(());
    }

    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array.as_ref(), &options)?;
    for i in 0..array.len() {
        if array.is_null(i) {
            out.push(Value::Missing);
        } else {
            out.push(Value::text(formatter.value(i).to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, true),
            Field::new("amount", DataType::Float64, true),
            Field::new("region", DataType::Utf8, true),
            Field::new("day", DataType::Date32, true),
        ]))
    }

    fn batch(
        ids: Vec<Option<i64>>,
        amounts: Vec<Option<f64>>,
        regions: Vec<Option<&str>>,
        days: Vec<Option<i32>>,
    ) -> RecordBatch {
        RecordBatch::try_new(
            schema(),
            vec![
                Arc::new(Int64Array::from(ids)),
                Arc::new(Float64Array::from(amounts)),
                Arc::new(StringArray::from(regions)),
                Arc::new(Date32Array::from(days)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_record_batches_concatenates_batches() {
        let first = batch(
            vec![Some(1), Some(2)],
            vec![Some(1.5), None],
            vec![Some("north"), None],
            vec![Some(0), Some(1)],
        );
        let second = batch(
            vec![Some(3)],
            vec![Some(f64::NAN)],
            vec![Some("south")],
            vec![None],
        );

        let dataset = Dataset::from_record_batches(schema(), &[first, second]).unwrap();

        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column_names(), vec!["id", "amount", "region", "day"]);
        assert_eq!(dataset.value("id", 2), Some(&Value::Number(3.0)));
        assert_eq!(dataset.value("amount", 0), Some(&Value::Number(1.5)));
        assert_eq!(dataset.value("amount", 1), Some(&Value::Missing));
        assert_eq!(dataset.value("amount", 2), Some(&Value::Missing));
        assert_eq!(dataset.value("region", 1), Some(&Value::Missing));
        assert_eq!(
            dataset.value("day", 1),
            Some(&Value::Text("1970-01-02".to_string()))
        );
        assert_eq!(dataset.value("day", 2), Some(&Value::Missing));
    }

    #[test]
    fn test_from_record_batches_empty() {
        let dataset = Dataset::from_record_batches(schema(), &[]).unwrap();
        assert_eq!(dataset.row_count(), 0);
        assert_eq!(dataset.column_count(), 4);
    }
}
