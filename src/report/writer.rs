//! CSV and Parquet encodings of a [`ReportTable`].

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use parquet::data_type::{BoolType, ByteArray, ByteArrayType, DataType, Int64Type};
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::{SerializedFileWriter, SerializedRowGroupWriter};
use parquet::schema::parser::parse_message_type;

use crate::error::{AuditError, io_error};

use super::table::{COLUMNS, ReportRecord, ReportTable};

const PARQUET_EXTENSION: &str = "parquet";

const PARQUET_SCHEMA: &str = "
message report {
    REQUIRED INT64 PR_NUMBER;
    REQUIRED BINARY PR_TITLE (UTF8);
    OPTIONAL BINARY AUTHOR (UTF8);
    OPTIONAL BINARY MERGE_DATE (UTF8);
    REQUIRED BOOLEAN CR_PASSED;
    REQUIRED BOOLEAN CHECKS_PASSED;
}
";

/// Files produced by [`write_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutputs {
    /// The CSV report.
    pub csv: Utf8PathBuf,
    /// The Parquet copy, when requested.
    pub parquet: Option<Utf8PathBuf>,
}

/// Path of the Parquet copy written next to `destination`.
#[must_use]
pub fn columnar_path(destination: &Utf8Path) -> Utf8PathBuf {
    destination.with_extension(PARQUET_EXTENSION)
}

/// Writes `table` as CSV to `destination` and optionally as Parquet beside it.
///
/// Parent directories are created as needed and existing files are replaced.
///
/// # Errors
///
/// Returns [`AuditError::Io`] when a directory or file cannot be written.
pub fn write_report(
    table: &ReportTable,
    destination: &Utf8Path,
    also_columnar: bool,
) -> Result<ReportOutputs, AuditError> {
    if let Some(parent) = destination.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|error| io_error(&format!("failed to create '{parent}'"), &error))?;
    }

    let csv_file = File::create(destination)
        .map_err(|error| io_error(&format!("failed to create '{destination}'"), &error))?;
    write_csv(table, BufWriter::new(csv_file))?;
    tracing::info!(path = %destination, rows = table.len(), "wrote CSV report");

    let parquet = if also_columnar {
        let path = columnar_path(destination);
        write_parquet(table, &path)?;
        tracing::info!(path = %path, rows = table.len(), "wrote Parquet report");
        Some(path)
    } else {
        None
    };

    Ok(ReportOutputs {
        csv: destination.to_owned(),
        parquet,
    })
}

/// Writes `table` as CSV with a header row.
///
/// # Errors
///
/// Returns [`AuditError::Io`] when the writer fails.
pub fn write_csv<W>(table: &ReportTable, writer: W) -> Result<(), AuditError>
where
    W: Write,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(COLUMNS).map_err(csv_failure)?;
    for record in table.records() {
        csv_writer.serialize(record).map_err(csv_failure)?;
    }
    csv_writer
        .flush()
        .map_err(|error| io_error("failed to flush CSV report", &error))
}

/// Reads a CSV report back into records.
///
/// # Errors
///
/// Returns [`AuditError::Decode`] when a line does not match the report
/// columns.
pub fn read_report_csv<R>(reader: R) -> Result<Vec<ReportRecord>, AuditError>
where
    R: Read,
{
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize::<ReportRecord>()
        .map(|record| {
            record.map_err(|error| AuditError::Decode {
                message: format!("invalid report line: {error}"),
            })
        })
        .collect()
}

/// Writes `table` as a single row group Parquet file at `path`.
///
/// # Errors
///
/// Returns [`AuditError::Io`] when the file cannot be created or encoded.
pub fn write_parquet(table: &ReportTable, path: &Utf8Path) -> Result<(), AuditError> {
    let file =
        File::create(path).map_err(|error| io_error(&format!("failed to create '{path}'"), &error))?;
    encode_parquet(table, file).map_err(|error| AuditError::Io {
        message: format!("failed to write Parquet report '{path}': {error}"),
    })
}

fn encode_parquet(table: &ReportTable, file: File) -> Result<(), ParquetError> {
    let schema = Arc::new(parse_message_type(PARQUET_SCHEMA)?);
    let properties = Arc::new(WriterProperties::builder().build());
    let mut writer = SerializedFileWriter::new(file, schema, properties)?;
    let records = table.records();

    let mut row_group = writer.next_row_group()?;
    let numbers = records
        .iter()
        .map(|record| {
            i64::try_from(record.number).map_err(|error| {
                ParquetError::General(format!("PR_NUMBER {} out of range: {error}", record.number))
            })
        })
        .collect::<Result<Vec<i64>, ParquetError>>()?;
    write_column::<Int64Type>(&mut row_group, &numbers, None)?;

    let titles: Vec<ByteArray> = records
        .iter()
        .map(|record| ByteArray::from(record.title.as_str()))
        .collect();
    write_column::<ByteArrayType>(&mut row_group, &titles, None)?;

    write_optional_text(&mut row_group, records.iter().map(|record| record.author.as_deref()))?;
    write_optional_text(
        &mut row_group,
        records.iter().map(|record| record.merge_date.as_deref()),
    )?;

    let approvals: Vec<bool> = records.iter().map(|record| record.review_approved).collect();
    write_column::<BoolType>(&mut row_group, &approvals, None)?;
    let checks: Vec<bool> = records.iter().map(|record| record.checks_passed).collect();
    write_column::<BoolType>(&mut row_group, &checks, None)?;

    row_group.close()?;
    writer.close()?;
    Ok(())
}

fn write_optional_text<'a>(
    row_group: &mut SerializedRowGroupWriter<'_, File>,
    values: impl Iterator<Item = Option<&'a str>>,
) -> Result<(), ParquetError> {
    let mut present = Vec::new();
    let mut definition_levels: Vec<i16> = Vec::new();
    for value in values {
        match value {
            Some(text) => {
                present.push(ByteArray::from(text));
                definition_levels.push(1);
            }
            None => definition_levels.push(0),
        }
    }
    write_column::<ByteArrayType>(row_group, &present, Some(definition_levels.as_slice()))
}

fn write_column<D>(
    row_group: &mut SerializedRowGroupWriter<'_, File>,
    values: &[D::T],
    definition_levels: Option<&[i16]>,
) -> Result<(), ParquetError>
where
    D: DataType,
{
    let Some(mut column) = row_group.next_column()? else {
        return Err(ParquetError::General(
            "report schema has fewer columns than expected".to_owned(),
        ));
    };
    column
        .typed::<D>()
        .write_batch(values, definition_levels, None)?;
    column.close()
}

fn csv_failure(error: csv::Error) -> AuditError {
    AuditError::Io {
        message: format!("failed to write CSV report: {error}"),
    }
}
