//! EU financial sanctions list adapter (CSV)
//!
//! Semicolon-delimited, UTF-8 with a BOM, one row per name variant; rows
//! sharing a logical id belong to one entity. `Naal_logical_id` is the
//! join key (`Entity_logical_id` appears twice in the published header).

use crate::collect::EntityCollector;
use crate::error::{Error, Result};
use crate::source::{decode_lossy, find_file, RawFile};
use screening_core::CanonicalEntityRecord;
use tracing::info;

const EU_FILE: &str = "eu_consolidated.csv";

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn cell<'a>(row: &'a csv::StringRecord, index: Option<usize>) -> Option<&'a str> {
    let value = row.get(index?)?.trim();
    (!value.is_empty()).then_some(value)
}

/// Parse the EU consolidated CSV into canonical records.
pub(crate) fn parse(source_id: &str, files: &[RawFile]) -> Result<Vec<CanonicalEntityRecord>> {
    let file = find_file(files, EU_FILE)
        .ok_or_else(|| Error::parse(source_id, EU_FILE, "file missing from download"))?;

    let text = decode_lossy(&file.bytes);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::parse(source_id, EU_FILE, e.to_string()))?
        .clone();
    let id_col = column(&headers, "Naal_logical_id");
    let wholename_col = column(&headers, "Naal_wholename");
    let lastname_col = column(&headers, "Naal_lastname");
    let firstname_col = column(&headers, "Naal_firstname");
    let programme_col = column(&headers, "Programme");
    let street_col = column(&headers, "Addr_street");
    let city_col = column(&headers, "Addr_city");
    let country_col = column(&headers, "Addr_country");

    let mut collector = EntityCollector::new(source_id);

    for row in reader.records() {
        let row = row.map_err(|e| Error::parse(source_id, EU_FILE, e.to_string()))?;
        let Some(logical_id) = cell(&row, id_col) else {
            continue;
        };

        // Whole name preferred; fall back to "first last" assembly
        let name = match cell(&row, wholename_col) {
            Some(whole) => whole.to_string(),
            None => {
                let first = cell(&row, firstname_col).unwrap_or_default();
                let last = cell(&row, lastname_col).unwrap_or_default();
                format!("{} {}", first, last).trim().to_string()
            }
        };
        if name.is_empty() {
            continue;
        }

        let entity = collector.entity(logical_id);
        entity.add_name(&name);
        if let Some(programme) = cell(&row, programme_col) {
            entity.add_program(&format!("EU: {}", programme));
        }

        let parts: Vec<&str> = [street_col, city_col, country_col]
            .iter()
            .filter_map(|&i| cell(&row, i))
            .collect();
        if !parts.is_empty() {
            entity.add_address(&parts.join(", "));
        }
    }

    let records = collector.finish();
    info!(
        "Parsed {} records from the {} consolidated list",
        records.len(),
        source_id
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EU_CSV: &str = "\u{feff}Filegenerationdate;Naal_logical_id;Naal_wholename;Naal_firstname;Naal_lastname;Programme;Addr_street;Addr_city;Addr_country\n\
2026-01-21;13;Iran Air;;;IRN;Mehrabad Airport;Tehran;Iran\n\
2026-01-21;13;Iran Air Tours;;;IRN;;;\n\
2026-01-21;44;;Vladimir;Petrov;RUS;;;\n";

    fn files() -> Vec<RawFile> {
        vec![RawFile::new(EU_FILE, EU_CSV.as_bytes().to_vec())]
    }

    #[test]
    fn test_rows_sharing_logical_id_merge() {
        let records = parse("EU", &files()).unwrap();
        let iran_air = records.iter().find(|r| r.entity_id == "13").unwrap();
        assert_eq!(iran_air.primary_name, "Iran Air");
        assert_eq!(iran_air.alternate_names, vec!["Iran Air Tours"]);
        assert_eq!(iran_air.programs, vec!["EU: IRN"]);
        assert_eq!(iran_air.raw_fields["addresses"], "Mehrabad Airport, Tehran, Iran");
    }

    #[test]
    fn test_name_assembled_from_parts_when_wholename_missing() {
        let records = parse("EU", &files()).unwrap();
        let person = records.iter().find(|r| r.entity_id == "44").unwrap();
        assert_eq!(person.primary_name, "Vladimir Petrov");
    }

    #[test]
    fn test_bom_stripped_from_first_header() {
        let records = parse("EU", &files()).unwrap();
        // The BOM precedes "Filegenerationdate"; id lookup must still work
        assert_eq!(records.len(), 2);
    }
}
