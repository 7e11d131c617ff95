use crate::error::DatasetError;
use crate::table::OrderTable;
use chrono::{NaiveDate, NaiveDateTime};
use core_types::OrderRecord;
use polars::prelude::*;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

/// The column set every order file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "order_id",
    "customer_id",
    "customer_city",
    "customer_state",
    "product_id",
    "product_category_name",
    "payment_type",
    "review_score",
    "price",
    "order_purchase_timestamp",
    "order_delivered_customer_date",
];

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Options for reading the delimited order file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Reads the order file at `path` into an immutable `OrderTable`.
///
/// Every column is read as text and then coerced: the two timestamp columns into
/// `NaiveDateTime`, `review_score` into `f64` and `price` into `Decimal`. Any value that
/// fails coercion aborts the load, since a partially typed table cannot be aggregated.
pub fn load_orders(path: &Path, options: &LoadOptions) -> Result<OrderTable, DatasetError> {
    if !path.is_file() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }

    tracing::info!(path = %path.display(), "Reading order dataset.");

    // Schema inference over zero rows keeps every column as text, so identifiers
    // that happen to look numeric are never reformatted.
    let frame = CsvReader::from_path(path)?
        .has_header(true)
        .with_separator(options.delimiter)
        .infer_schema(Some(0))
        .finish()?;

    let table = OrderTable::from_records(records_from_frame(&frame)?);

    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        "Order dataset loaded."
    );
    Ok(table)
}

/// Converts a text-typed frame into typed order rows.
fn records_from_frame(frame: &DataFrame) -> Result<Vec<OrderRecord>, DatasetError> {
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|name| frame.column(name).is_err()) {
        return Err(DatasetError::MissingColumn(missing.to_string()));
    }

    let order_id = text_column(frame, "order_id")?;
    let customer_id = text_column(frame, "customer_id")?;
    let customer_city = text_column(frame, "customer_city")?;
    let customer_state = text_column(frame, "customer_state")?;
    let product_id = text_column(frame, "product_id")?;
    let category = text_column(frame, "product_category_name")?;
    let payment_type = text_column(frame, "payment_type")?;
    let review_score = text_column(frame, "review_score")?;
    let price = text_column(frame, "price")?;
    let purchased = text_column(frame, "order_purchase_timestamp")?;
    let delivered = text_column(frame, "order_delivered_customer_date")?;

    let mut records = Vec::with_capacity(frame.height());
    for row in 0..frame.height() {
        // Line numbers are 1-based and the header occupies line 1.
        let line = row + 2;

        let purchase_raw = required(&purchased[row], "order_purchase_timestamp", line)?;
        let order_purchase_timestamp = parse_timestamp(purchase_raw)
            .ok_or_else(|| invalid("order_purchase_timestamp", line, purchase_raw))?;

        let order_delivered_customer_date = match &delivered[row] {
            Some(raw) => Some(
                parse_timestamp(raw)
                    .ok_or_else(|| invalid("order_delivered_customer_date", line, raw))?,
            ),
            None => None,
        };

        let review_score = match &review_score[row] {
            Some(raw) => Some(
                raw.parse::<f64>()
                    .ok()
                    .filter(|score| score.is_finite())
                    .ok_or_else(|| invalid("review_score", line, raw))?,
            ),
            None => None,
        };

        let price = match &price[row] {
            Some(raw) => Some(parse_decimal(raw).ok_or_else(|| invalid("price", line, raw))?),
            None => None,
        };

        records.push(OrderRecord {
            order_id: required(&order_id[row], "order_id", line)?.to_string(),
            customer_id: required(&customer_id[row], "customer_id", line)?.to_string(),
            customer_city: required(&customer_city[row], "customer_city", line)?.to_string(),
            customer_state: required(&customer_state[row], "customer_state", line)?.to_string(),
            product_id: required(&product_id[row], "product_id", line)?.to_string(),
            product_category_name: category[row].clone(),
            payment_type: payment_type[row].clone(),
            review_score,
            price,
            order_purchase_timestamp,
            order_delivered_customer_date,
        });
    }

    Ok(records)
}

/// Extracts a column as trimmed text, mapping blank cells to `None`.
fn text_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DatasetError> {
    let column = frame
        .column(name)
        .map_err(|_| DatasetError::MissingColumn(name.to_string()))?
        .cast(&DataType::String)?;

    let values = column
        .str()?
        .into_iter()
        .map(|cell| {
            cell.map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

fn required<'a>(
    cell: &'a Option<String>,
    column: &str,
    line: usize,
) -> Result<&'a str, DatasetError> {
    cell.as_deref().ok_or_else(|| DatasetError::MissingValue {
        column: column.to_string(),
        line,
    })
}

fn invalid(column: &str, line: usize, value: &str) -> DatasetError {
    DatasetError::InvalidValue {
        column: column.to_string(),
        line,
        value: value.to_string(),
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Parses a timestamp cell. Date-only values are taken as midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "order_id,customer_id,customer_city,customer_state,product_id,\
product_category_name,payment_type,review_score,price,order_purchase_timestamp,\
order_delivered_customer_date,seller_id";

    fn write_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        write!(file, "{body}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_typed_rows() {
        let file = write_csv(
            "A,C1,sao paulo,SP,0001,bed_bath,credit_card,5,10.00,2023-01-01 10:15:00,2023-01-08 09:00:00,S1\n\
             B,C1,sao paulo,SP,0002,,boleto,,20.5,2023-01-05 08:00:00,,S2\n",
        );

        let table = load_orders(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 2);

        let first = &table.records()[0];
        assert_eq!(first.order_id, "A");
        assert_eq!(first.product_id, "0001");
        assert_eq!(first.product_category_name.as_deref(), Some("bed_bath"));
        assert_eq!(first.review_score, Some(5.0));
        assert_eq!(first.price, Some(dec!(10.00)));
        assert!(first.order_delivered_customer_date.is_some());

        let second = &table.records()[1];
        assert_eq!(second.product_category_name, None);
        assert_eq!(second.review_score, None);
        assert_eq!(second.price, Some(dec!(20.5)));
        assert_eq!(second.order_delivered_customer_date, None);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = load_orders(Path::new("/nonexistent/main_data.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::NotFound(_)));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "order_id,customer_id").unwrap();
        writeln!(file, "A,C1").unwrap();
        file.flush().unwrap();

        let err = load_orders(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "customer_city"));
    }

    #[test]
    fn test_unparsable_timestamp_is_fatal() {
        let file = write_csv(
            "A,C1,sao paulo,SP,p1,toys,voucher,4,9.90,not-a-date,,S1\n",
        );
        let err = load_orders(file.path(), &LoadOptions::default()).unwrap_err();
        match err {
            DatasetError::InvalidValue { column, line, value } => {
                assert_eq!(column, "order_purchase_timestamp");
                assert_eq!(line, 2);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_delimiter() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER.replace(',', ";")).unwrap();
        writeln!(file, "A;C1;rio de janeiro;RJ;p1;toys;voucher;3;7;2023-02-01;;S1").unwrap();
        file.flush().unwrap();

        let table = load_orders(file.path(), &LoadOptions { delimiter: b';' }).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].customer_state, "RJ");
        assert_eq!(table.records()[0].price, Some(dec!(7)));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2017, 10, 2)
            .unwrap()
            .and_hms_opt(10, 56, 33)
            .unwrap();
        assert_eq!(parse_timestamp("2017-10-02 10:56:33"), Some(expected));
        assert_eq!(parse_timestamp("2017-10-02T10:56:33"), Some(expected));
        assert_eq!(
            parse_timestamp("2017-10-02"),
            NaiveDate::from_ymd_opt(2017, 10, 2).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("02/10/2017"), None);
    }
}
