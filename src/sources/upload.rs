//! Uploaded CSV files.

use std::{io::Read, path::Path};

use anyhow::Result;
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    data::RawRow,
    error::{MergeError, MergeResult},
    io_utils,
};

const UPLOAD_FORMAT_MESSAGE: &str =
    "File format isn't in CSV or some columns misaligned. Check file and try again.";

pub fn load_upload(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Vec<RawRow>> {
    let reader = io_utils::open_input(path)?;
    let rows = parse_upload(reader, delimiter, encoding)?;
    info!("Read {} row(s) from upload {:?}", rows.len(), path);
    Ok(rows)
}

/// Parses a CSV upload. Thousands separators are stripped from every value.
pub fn parse_upload<R: Read>(
    reader: R,
    delimiter: u8,
    encoding: &'static Encoding,
) -> MergeResult<Vec<RawRow>> {
    let mut reader = io_utils::open_csv_reader(reader, delimiter);
    let headers = io_utils::reader_headers(&mut reader, encoding).map_err(|err| {
        debug!("Upload header read failed: {err:#}");
        MergeError::malformed(UPLOAD_FORMAT_MESSAGE)
    })?;

    let mut rows: Vec<RawRow> = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|err| {
            debug!("Upload row {} unreadable: {err}", idx + 2);
            MergeError::malformed(UPLOAD_FORMAT_MESSAGE)
        })?;
        let values = io_utils::decode_record(&record, encoding).map_err(|err| {
            debug!("Upload row {} failed to decode: {err:#}", idx + 2);
            MergeError::malformed(UPLOAD_FORMAT_MESSAGE)
        })?;
        rows.push(
            headers
                .iter()
                .zip(values)
                .map(|(header, value)| (header.clone(), value.replace(',', "")))
                .collect(),
        );
    }
    Ok(rows)
}
