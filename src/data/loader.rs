use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, TimeUnit, TimestampMillisecondType};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ByteRecord, StringRecord};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::error::DataError;
use super::model::{QuakeDataset, QuakeEvent};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an earthquake table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – USGS catalogue layout; unknown columns are ignored
/// * `.json`    – `[{ "time": "...", "latitude": 1.0, "mag": "4.2", ... }, ...]`
/// * `.parquet` – flat columns with the same names
///
/// `time`, `latitude` and `longitude` columns are required. `mag`, `depth`,
/// `duration` and `place` may be absent; missing numbers become `NaN`.
pub fn load_file(path: &Path) -> Result<QuakeDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let events = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            parse_csv(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            parse_json(&text)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataError::UnsupportedExtension(other.to_string()).into()),
    };

    Ok(QuakeDataset::from_events(events))
}

// ---------------------------------------------------------------------------
// Field coercion shared by every format
// ---------------------------------------------------------------------------

/// Coerce a raw cell to a number. Absent, empty or malformed → `NaN`.
pub fn coerce_number(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Parse a timestamp cell.
///
/// Accepts RFC 3339 (`2024-03-01T12:00:00.000Z`), naive date-times which are
/// taken as UTC, bare dates, and integer epoch milliseconds.
pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    }
    s.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)
}

/// Log row-level problems. The row is kept either way.
fn check_row(row: usize, event: &QuakeEvent) {
    if event.magnitude.is_nan() {
        log::warn!("row {row}: missing or invalid magnitude");
    }
    if event.time.is_none() {
        log::warn!("row {row}: unparseable timestamp, event will not appear in any year");
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Positions of the known columns in the header. Other columns are ignored.
struct CsvColumns {
    time: usize,
    latitude: usize,
    longitude: usize,
    mag: Option<usize>,
    depth: Option<usize>,
    duration: Option<usize>,
    place: Option<usize>,
}

impl CsvColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self, DataError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &'static str| find(name).ok_or(DataError::MissingColumn(name));
        Ok(CsvColumns {
            time: require("time")?,
            latitude: require("latitude")?,
            longitude: require("longitude")?,
            mag: find("mag"),
            depth: find("depth"),
            duration: find("duration"),
            place: find("place"),
        })
    }

    /// Build an event from raw bytes. Invalid UTF-8 is replaced rather than
    /// rejected, and short rows read as absent cells.
    fn event(&self, record: &ByteRecord) -> QuakeEvent {
        let number = |idx: Option<usize>| coerce_number(csv_cell(record, idx).as_deref());
        let time = csv_cell(record, Some(self.time)).as_deref().and_then(parse_time);
        let place = csv_cell(record, self.place)
            .filter(|p| !p.trim().is_empty())
            .map(Cow::into_owned);
        QuakeEvent {
            time,
            latitude: number(Some(self.latitude)),
            longitude: number(Some(self.longitude)),
            magnitude: number(self.mag),
            depth: number(self.depth),
            duration: number(self.duration),
            place,
        }
    }
}

fn csv_cell(record: &ByteRecord, idx: Option<usize>) -> Option<Cow<'_, str>> {
    idx.and_then(|i| record.get(i)).map(String::from_utf8_lossy)
}

/// Parse CSV with a header row.
pub fn parse_csv(input: impl Read) -> Result<Vec<QuakeEvent>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers().context("reading CSV headers")?.clone();
    let columns = CsvColumns::from_headers(&headers)?;

    let mut events = Vec::new();
    let mut record = ByteRecord::new();
    let mut row_no = 0;
    while reader
        .read_byte_record(&mut record)
        .with_context(|| format!("CSV row {row_no}"))?
    {
        let event = columns.event(&record);
        check_row(row_no, &event);
        events.push(event);
        row_no += 1;
    }
    Ok(events)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON. Numbers may be JSON numbers or numeric strings;
/// `time` may be a string or epoch milliseconds.
///
/// A required key must appear in at least one record. Records that lack a
/// key read it as absent, like a short CSV row.
pub fn parse_json(text: &str) -> Result<Vec<QuakeEvent>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().ok_or(DataError::NotAnArray)?;

    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        objects.push(rec.as_object().ok_or(DataError::NotAnObject(i))?);
    }
    if !objects.is_empty() {
        for required in ["time", "latitude", "longitude"] {
            if !objects.iter().any(|obj| obj.contains_key(required)) {
                return Err(DataError::MissingColumn(required).into());
            }
        }
    }

    let mut events = Vec::with_capacity(objects.len());
    for (i, obj) in objects.into_iter().enumerate() {
        let event = QuakeEvent {
            time: obj.get("time").and_then(json_to_time),
            latitude: json_number(obj, "latitude"),
            longitude: json_number(obj, "longitude"),
            magnitude: json_number(obj, "mag"),
            depth: json_number(obj, "depth"),
            duration: json_number(obj, "duration"),
            place: obj
                .get("place")
                .and_then(JsonValue::as_str)
                .filter(|p| !p.trim().is_empty())
                .map(str::to_string),
        };
        check_row(i, &event);
        events.push(event);
    }
    Ok(events)
}

fn json_number(obj: &Map<String, JsonValue>, key: &str) -> f64 {
    match obj.get(key) {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(JsonValue::String(s)) => coerce_number(Some(s)),
        _ => f64::NAN,
    }
}

fn json_to_time(val: &JsonValue) -> Option<DateTime<Utc>> {
    match val {
        JsonValue::String(s) => parse_time(s),
        JsonValue::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat event columns.
///
/// `time` may be a string column, an Arrow timestamp of any unit, or Int64
/// epoch milliseconds. Numeric columns of any width (or numeric strings) are
/// cast to Float64; values that fail the cast become `NaN`.
fn load_parquet(path: &Path) -> Result<Vec<QuakeEvent>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut events = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n_rows = batch.num_rows();

        let times = time_column(&batch)?;
        let latitude = float_column(&batch, "latitude")?
            .ok_or(DataError::MissingColumn("latitude"))?;
        let longitude = float_column(&batch, "longitude")?
            .ok_or(DataError::MissingColumn("longitude"))?;
        let mag = float_column(&batch, "mag")?;
        let depth = float_column(&batch, "depth")?;
        let duration = float_column(&batch, "duration")?;
        let place = string_column(&batch, "place")?;

        for row in 0..n_rows {
            let event = QuakeEvent {
                time: times[row],
                latitude: latitude[row],
                longitude: longitude[row],
                magnitude: mag.as_ref().map_or(f64::NAN, |c| c[row]),
                depth: depth.as_ref().map_or(f64::NAN, |c| c[row]),
                duration: duration.as_ref().map_or(f64::NAN, |c| c[row]),
                place: place.as_ref().and_then(|c| c[row].clone()),
            };
            check_row(events.len(), &event);
            events.push(event);
        }
    }

    Ok(events)
}

// -- Parquet / Arrow helpers --

/// Cast a named column to Float64, nulls → `NaN`. `None` if the column is absent.
fn float_column(batch: &RecordBatch, name: &str) -> Result<Option<Vec<f64>>> {
    let Some(col) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let casted: ArrayRef = cast(col.as_ref(), &DataType::Float64)
        .with_context(|| format!("casting '{name}' to Float64"))?;
    let arr = casted.as_primitive::<Float64Type>();
    Ok(Some(
        (0..arr.len())
            .map(|i| if arr.is_valid(i) { arr.value(i) } else { f64::NAN })
            .collect(),
    ))
}

fn string_column(batch: &RecordBatch, name: &str) -> Result<Option<Vec<Option<String>>>> {
    let Some(col) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let casted = cast(col.as_ref(), &DataType::Utf8)
        .with_context(|| format!("casting '{name}' to Utf8"))?;
    let arr = casted.as_string::<i32>();
    Ok(Some(
        (0..arr.len())
            .map(|i| arr.is_valid(i).then(|| arr.value(i).to_string()))
            .collect(),
    ))
}

fn time_column(batch: &RecordBatch) -> Result<Vec<Option<DateTime<Utc>>>> {
    let col = batch
        .column_by_name("time")
        .ok_or(DataError::MissingColumn("time"))?;

    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = cast(col.as_ref(), &DataType::Utf8).context("casting 'time' to Utf8")?;
            let arr = text.as_string::<i32>();
            Ok((0..arr.len())
                .map(|i| if arr.is_valid(i) { parse_time(arr.value(i)) } else { None })
                .collect())
        }
        DataType::Timestamp(_, _) | DataType::Int64 | DataType::Date32 | DataType::Date64 => {
            let millis = cast(col.as_ref(), &DataType::Timestamp(TimeUnit::Millisecond, None))
                .context("casting 'time' to millisecond timestamps")?;
            let arr = millis.as_primitive::<TimestampMillisecondType>();
            Ok((0..arr.len())
                .map(|i| {
                    if arr.is_valid(i) {
                        DateTime::from_timestamp_millis(arr.value(i))
                    } else {
                        None
                    }
                })
                .collect())
        }
        other => bail!("Unsupported type for 'time' column: {other:?}"),
    }
}
