//! OFAC list adapters
//!
//! Two CSV sets share the entity-number join key:
//!
//! - The SDN set (`SDN.CSV` + `ALT.CSV` + `ADD.CSV`) has no header row;
//!   column layouts follow OFAC's file documentation. `-0-` marks a
//!   missing value.
//! - The Consolidated (non-SDN) set (`CONS_PRIM.CSV` + `CONS_ALT.CSV` +
//!   `CONS_ADD.CSV`) carries headers, with column names that have varied
//!   across publications.

use crate::collect::EntityCollector;
use crate::error::{Error, Result};
use crate::source::{decode_lossy, find_file, RawFile};
use screening_core::CanonicalEntityRecord;
use tracing::info;

/// OFAC's null marker
const SDN_NULL: &str = "-0-";

// SDN.CSV columns (headerless), per OFAC documentation
const SDN_ENT_NUM: usize = 0;
const SDN_NAME: usize = 1;
const SDN_TYPE: usize = 2;
const SDN_PROGRAM: usize = 3;
const SDN_REMARKS: usize = 11;

// ALT.CSV columns: ent_num, alt_num, alt_type, alt_name, remarks
const ALT_ENT_NUM: usize = 0;
const ALT_NAME: usize = 3;

// ADD.CSV columns: ent_num, add_num, address, city/state/postal, country, remarks
const ADD_ENT_NUM: usize = 0;
const ADD_ADDRESS: usize = 2;
const ADD_CITY: usize = 3;
const ADD_COUNTRY: usize = 4;

fn field(record: &csv::StringRecord, index: usize) -> Option<&str> {
    let value = record.get(index)?.trim();
    (!value.is_empty() && value != SDN_NULL).then_some(value)
}

fn headerless_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes())
}

fn headered_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Parse the SDN (Specially Designated Nationals) CSV set.
pub(crate) fn parse_sdn(source_id: &str, files: &[RawFile]) -> Result<Vec<CanonicalEntityRecord>> {
    let primary = find_file(files, "SDN.CSV")
        .ok_or_else(|| Error::parse(source_id, "SDN.CSV", "file missing from download"))?;

    let mut collector = EntityCollector::new(source_id);

    let text = decode_lossy(&primary.bytes);
    for row in headerless_reader(&text).records() {
        let row = row.map_err(|e| Error::parse(source_id, "SDN.CSV", e.to_string()))?;
        let (Some(ent_num), Some(name)) = (field(&row, SDN_ENT_NUM), field(&row, SDN_NAME)) else {
            continue;
        };

        let entity = collector.entity(ent_num);
        entity.add_name(name);
        if let Some(program) = field(&row, SDN_PROGRAM) {
            entity.add_program(program);
        }
        if let Some(sdn_type) = field(&row, SDN_TYPE) {
            entity.set_raw_field("sdn_type", sdn_type);
        }
        if let Some(remarks) = field(&row, SDN_REMARKS) {
            entity.set_raw_field("remarks", remarks);
        }
    }

    if let Some(aliases) = find_file(files, "ALT.CSV") {
        let text = decode_lossy(&aliases.bytes);
        for row in headerless_reader(&text).records() {
            let row = row.map_err(|e| Error::parse(source_id, "ALT.CSV", e.to_string()))?;
            let (Some(ent_num), Some(alias)) = (field(&row, ALT_ENT_NUM), field(&row, ALT_NAME))
            else {
                continue;
            };
            // Aliases for unknown entity numbers are orphans; skip them
            if collector.contains(ent_num) {
                collector.entity(ent_num).add_alias(alias);
            }
        }
    }

    if let Some(addresses) = find_file(files, "ADD.CSV") {
        let text = decode_lossy(&addresses.bytes);
        for row in headerless_reader(&text).records() {
            let row = row.map_err(|e| Error::parse(source_id, "ADD.CSV", e.to_string()))?;
            let Some(ent_num) = field(&row, ADD_ENT_NUM) else {
                continue;
            };
            if !collector.contains(ent_num) {
                continue;
            }

            let parts: Vec<&str> = [ADD_ADDRESS, ADD_CITY, ADD_COUNTRY]
                .iter()
                .filter_map(|&i| field(&row, i))
                .collect();
            if !parts.is_empty() {
                collector.entity(ent_num).add_address(&parts.join(", "));
            }
        }
    }

    let records = collector.finish();
    info!("Parsed {} records from the {} SDN set", records.len(), source_id);
    Ok(records)
}

// Header variants seen across OFAC consolidated publications
const ID_HEADERS: &[&str] = &[
    "Entity Number",
    "Entity_Number",
    "entity_number",
    "EntNum",
    "ent_num",
    "ID",
];
const NAME_HEADERS: &[&str] = &["Name", "name", "Entity Name", "SDN_Name", "alt_name"];
const PROGRAM_HEADERS: &[&str] = &["Program", "Programs", "Sanctions Program"];
const ADDRESS_HEADERS: &[&str] = &[
    "Address",
    "City",
    "State/Province",
    "Postal Code",
    "Country",
    "CityStateProvincePostalCode",
];

fn header_index(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|name| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    })
}

fn header_field<'a>(
    row: &'a csv::StringRecord,
    index: Option<usize>,
) -> Option<&'a str> {
    let value = row.get(index?)?.trim();
    (!value.is_empty() && value != SDN_NULL).then_some(value)
}

/// Parse the Consolidated (non-SDN) CSV set.
pub(crate) fn parse_consolidated(
    source_id: &str,
    files: &[RawFile],
) -> Result<Vec<CanonicalEntityRecord>> {
    let primary = find_file(files, "CONS_PRIM.CSV")
        .ok_or_else(|| Error::parse(source_id, "CONS_PRIM.CSV", "file missing from download"))?;

    let mut collector = EntityCollector::new(source_id);

    let text = decode_lossy(&primary.bytes);
    let mut reader = headered_reader(&text);
    let headers = reader
        .headers()
        .map_err(|e| Error::parse(source_id, "CONS_PRIM.CSV", e.to_string()))?
        .clone();
    let id_col = header_index(&headers, ID_HEADERS);
    let name_col = header_index(&headers, NAME_HEADERS);
    let program_col = header_index(&headers, PROGRAM_HEADERS);

    for row in reader.records() {
        let row = row.map_err(|e| Error::parse(source_id, "CONS_PRIM.CSV", e.to_string()))?;
        let (Some(ent_num), Some(name)) = (header_field(&row, id_col), header_field(&row, name_col))
        else {
            continue;
        };

        let entity = collector.entity(ent_num);
        entity.add_name(name);
        if let Some(program) = header_field(&row, program_col) {
            entity.add_program(program);
        }
    }

    if let Some(aliases) = find_file(files, "CONS_ALT.CSV") {
        let text = decode_lossy(&aliases.bytes);
        let mut reader = headered_reader(&text);
        let headers = reader
            .headers()
            .map_err(|e| Error::parse(source_id, "CONS_ALT.CSV", e.to_string()))?
            .clone();
        let id_col = header_index(&headers, ID_HEADERS);
        let name_col = header_index(&headers, NAME_HEADERS);

        for row in reader.records() {
            let row = row.map_err(|e| Error::parse(source_id, "CONS_ALT.CSV", e.to_string()))?;
            let (Some(ent_num), Some(alias)) =
                (header_field(&row, id_col), header_field(&row, name_col))
            else {
                continue;
            };
            if collector.contains(ent_num) {
                collector.entity(ent_num).add_alias(alias);
            }
        }
    }

    if let Some(addresses) = find_file(files, "CONS_ADD.CSV") {
        let text = decode_lossy(&addresses.bytes);
        let mut reader = headered_reader(&text);
        let headers = reader
            .headers()
            .map_err(|e| Error::parse(source_id, "CONS_ADD.CSV", e.to_string()))?
            .clone();
        let id_col = header_index(&headers, ID_HEADERS);
        let address_cols: Vec<usize> = ADDRESS_HEADERS
            .iter()
            .filter_map(|&name| header_index(&headers, &[name]))
            .collect();

        for row in reader.records() {
            let row = row.map_err(|e| Error::parse(source_id, "CONS_ADD.CSV", e.to_string()))?;
            let Some(ent_num) = header_field(&row, id_col) else {
                continue;
            };
            if !collector.contains(ent_num) {
                continue;
            }

            let parts: Vec<&str> = address_cols
                .iter()
                .filter_map(|&i| header_field(&row, Some(i)))
                .collect();
            if !parts.is_empty() {
                collector.entity(ent_num).add_address(&parts.join(", "));
            }
        }
    }

    let records = collector.finish();
    info!(
        "Parsed {} records from the {} consolidated set",
        records.len(),
        source_id
    );
    Ok(records)
}
