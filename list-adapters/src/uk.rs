//! UK FCDO sanctions list adapter (CSV)
//!
//! The published file opens with a "Report Date: ..." preamble row before
//! the header. Names are split over "Name 1".."Name 5" plus the surname
//! in "Name 6"; rows sharing a Unique ID belong to one designation.

use crate::collect::EntityCollector;
use crate::error::{Error, Result};
use crate::source::{decode_lossy, find_file, RawFile};
use screening_core::CanonicalEntityRecord;
use tracing::info;

const UK_FILE: &str = "uk_sanctions.csv";

const NAME_COLUMNS: &[&str] = &["Name 1", "Name 2", "Name 3", "Name 4", "Name 5"];
const SURNAME_COLUMN: &str = "Name 6";
const ADDRESS_COLUMNS: &[&str] = &["Address Line 1", "Address Line 2", "Address Country"];

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn cell<'a>(row: &'a csv::StringRecord, index: Option<usize>) -> Option<&'a str> {
    let value = row.get(index?)?.trim();
    (!value.is_empty()).then_some(value)
}

/// Parse the UK sanctions CSV into canonical records.
pub(crate) fn parse(source_id: &str, files: &[RawFile]) -> Result<Vec<CanonicalEntityRecord>> {
    let file = find_file(files, UK_FILE)
        .ok_or_else(|| Error::parse(source_id, UK_FILE, "file missing from download"))?;

    let text = decode_lossy(&file.bytes);
    // Skip the preamble row so the real header line is first
    let body = if text.starts_with("Report Date") {
        text.splitn(2, '\n').nth(1).unwrap_or("").to_string()
    } else {
        text
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::parse(source_id, UK_FILE, e.to_string()))?
        .clone();
    let id_col = column(&headers, "Unique ID");
    let name_cols: Vec<Option<usize>> = NAME_COLUMNS.iter().map(|n| column(&headers, n)).collect();
    let surname_col = column(&headers, SURNAME_COLUMN);
    let regime_col = column(&headers, "Regime Name");
    let sanctions_col = column(&headers, "Sanctions Imposed");
    let address_cols: Vec<Option<usize>> =
        ADDRESS_COLUMNS.iter().map(|n| column(&headers, n)).collect();

    let mut collector = EntityCollector::new(source_id);

    for row in reader.records() {
        let row = row.map_err(|e| Error::parse(source_id, UK_FILE, e.to_string()))?;
        let Some(unique_id) = cell(&row, id_col) else {
            continue;
        };

        let mut parts: Vec<&str> = name_cols.iter().filter_map(|&i| cell(&row, i)).collect();
        if let Some(surname) = cell(&row, surname_col) {
            parts.push(surname);
        }
        let name = parts.join(" ");
        if name.is_empty() {
            continue;
        }

        let entity = collector.entity(unique_id);
        entity.add_name(&name);
        if let Some(regime) = cell(&row, regime_col) {
            entity.add_program(&format!("UK: {}", regime));
        }
        if let Some(sanctions) = cell(&row, sanctions_col) {
            entity.add_program(sanctions);
        }

        let address_parts: Vec<&str> =
            address_cols.iter().filter_map(|&i| cell(&row, i)).collect();
        if !address_parts.is_empty() {
            entity.add_address(&address_parts.join(", "));
        }
    }

    let records = collector.finish();
    info!(
        "Parsed {} records from the {} sanctions list",
        records.len(),
        source_id
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UK_CSV: &str = "\
Report Date: 21/01/2026,,,,,,,,,,\n\
Name 1,Name 2,Name 3,Name 4,Name 5,Name 6,Unique ID,Regime Name,Sanctions Imposed,Address Line 1,Address Country\n\
,,,,,IRAN AIR,IRA0001,Iran,Asset freeze,Mehrabad Airport,Iran\n\
HOMA,,,,,,IRA0001,Iran,,,\n\
Vladimir,,,,,Petrov,RUS0042,Russia,Travel ban,,\n";

    fn files() -> Vec<RawFile> {
        vec![RawFile::new(UK_FILE, UK_CSV.as_bytes().to_vec())]
    }

    #[test]
    fn test_preamble_row_skipped() {
        let records = parse("UK", &files()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_name_parts_assembled_with_surname_last() {
        let records = parse("UK", &files()).unwrap();
        let person = records.iter().find(|r| r.entity_id == "RUS0042").unwrap();
        assert_eq!(person.primary_name, "Vladimir Petrov");
        assert_eq!(person.programs, vec!["UK: Russia", "Travel ban"]);
    }

    #[test]
    fn test_repeated_unique_id_becomes_alias() {
        let records = parse("UK", &files()).unwrap();
        let iran_air = records.iter().find(|r| r.entity_id == "IRA0001").unwrap();
        assert_eq!(iran_air.primary_name, "IRAN AIR");
        assert_eq!(iran_air.alternate_names, vec!["HOMA"]);
        assert_eq!(iran_air.raw_fields["addresses"], "Mehrabad Airport, Iran");
    }

    #[test]
    fn test_file_without_preamble_still_parses() {
        let no_preamble = UK_CSV.splitn(2, '\n').nth(1).unwrap();
        let files = vec![RawFile::new(UK_FILE, no_preamble.as_bytes().to_vec())];
        let records = parse("UK", &files).unwrap();
        assert_eq!(records.len(), 2);
    }
}
