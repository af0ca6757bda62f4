//! Readers for the raw postcode CSV sources.

use std::io::Read;

use serde::Deserialize;
use tracing::warn;

use super::PostcodeRecord;
use super::error::DatasetError;

/// A row of the doogal postcode export. Other columns are ignored.
#[derive(Debug, Deserialize)]
struct DoogalRow {
    #[serde(rename = "Postcode")]
    postcode: String,
    #[serde(rename = "Latitude")]
    latitude: String,
    #[serde(rename = "Longitude")]
    longitude: String,
    /// Termination date; empty for live postcodes
    #[serde(rename = "Terminated", default)]
    terminated: String,
}

/// Read the freemaptools export: a header row, then `id,postcode,lat,lng`.
pub fn read_freemaptools<R: Read>(reader: R) -> Result<Vec<PostcodeRecord>, DatasetError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let postcode = row.get(1).ok_or_else(|| missing(line, "postcode"))?;
        let lat = parse_coord(row.get(2), "latitude", line)?;
        let lng = parse_coord(row.get(3), "longitude", line)?;

        push_record(&mut records, postcode, lat, lng, line);
    }
    Ok(records)
}

/// Read the doogal export, skipping terminated postcodes.
pub fn read_doogal<R: Read>(reader: R) -> Result<Vec<PostcodeRecord>, DatasetError> {
    let mut csv = csv::Reader::from_reader(reader);

    let headers = csv.headers()?.clone();

    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let row: DoogalRow = row.deserialize(Some(&headers))?;
        if !row.terminated.trim().is_empty() {
            continue;
        }

        let lat = parse_coord(Some(&row.latitude), "latitude", line)?;
        let lng = parse_coord(Some(&row.longitude), "longitude", line)?;

        push_record(&mut records, &row.postcode, lat, lng, line);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<PostcodeRecord>, postcode: &str, lat: f64, lng: f64, line: u64) {
    let record = PostcodeRecord::new(postcode, lat, lng);
    if record.postcode.is_empty() {
        warn!(line, "skipping row with empty postcode");
        return;
    }
    records.push(record);
}

fn parse_coord(field: Option<&str>, name: &str, line: u64) -> Result<f64, DatasetError> {
    let field = field.ok_or_else(|| missing(line, name))?;
    field.trim().parse().map_err(|_| DatasetError::BadRow {
        line,
        message: format!("invalid {name} {field:?}"),
    })
}

fn missing(line: u64, name: &str) -> DatasetError {
    DatasetError::BadRow {
        line,
        message: format!("missing {name}"),
    }
}
