//! UN Security Council consolidated list adapter (XML)
//!
//! Individuals carry their name split over FIRST_NAME..FOURTH_NAME;
//! entities put the full name in FIRST_NAME. Aliases nest under
//! INDIVIDUAL_ALIAS / ENTITY_ALIAS elements. Parsing is event-driven
//! over the element path, so the adapter survives the schema's habit of
//! sprinkling the same tag names at different depths.

use crate::collect::{EntityBuilder, EntityCollector};
use crate::error::{Error, Result};
use crate::source::{decode_lossy, find_file, RawFile};
use quick_xml::events::Event;
use quick_xml::Reader;
use screening_core::CanonicalEntityRecord;
use tracing::info;

const UN_FILE: &str = "un_consolidated.xml";

/// Per-record state while walking one INDIVIDUAL or ENTITY element
#[derive(Debug, Default)]
struct PendingRecord {
    data_id: String,
    name_parts: Vec<String>,
    aliases: Vec<String>,
    list_type: String,
    nationalities: Vec<String>,
}

impl PendingRecord {
    fn flush_into(self, collector: &mut EntityCollector) {
        if self.data_id.is_empty() {
            return;
        }

        let name = self.name_parts.join(" ");
        let entity: &mut EntityBuilder = collector.entity(&self.data_id);
        entity.add_name(&name);
        for alias in &self.aliases {
            entity.add_alias(alias);
        }
        if !self.list_type.is_empty() {
            entity.add_program(&format!("UN: {}", self.list_type));
        }
        if !self.nationalities.is_empty() {
            entity.set_raw_field("nationality", &self.nationalities.join("; "));
        }
    }
}

/// Parse the UN consolidated XML into canonical records.
pub(crate) fn parse(source_id: &str, files: &[RawFile]) -> Result<Vec<CanonicalEntityRecord>> {
    let file = find_file(files, UN_FILE)
        .ok_or_else(|| Error::parse(source_id, UN_FILE, "file missing from download"))?;
    let text = decode_lossy(&file.bytes);

    let mut reader = Reader::from_str(&text);
    let mut collector = EntityCollector::new(source_id);

    let mut path: Vec<String> = Vec::new();
    let mut pending: Option<PendingRecord> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if (tag == "INDIVIDUAL" || tag == "ENTITY") && !in_record(&path) {
                    pending = Some(PendingRecord::default());
                }
                path.push(tag);
            }
            Ok(Event::End(_)) => {
                let tag = path.pop().unwrap_or_default();
                if (tag == "INDIVIDUAL" || tag == "ENTITY") && !in_record(&path) {
                    if let Some(record) = pending.take() {
                        record.flush_into(&mut collector);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let value = t
                    .unescape()
                    .map_err(|e| Error::parse(source_id, UN_FILE, e.to_string()))?
                    .trim()
                    .to_string();
                if value.is_empty() {
                    continue;
                }
                if let Some(record) = pending.as_mut() {
                    apply_text(record, &path, value);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::parse(source_id, UN_FILE, e.to_string())),
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

/// True when the path is already inside an INDIVIDUAL or ENTITY element
fn in_record(path: &[String]) -> bool {
    path.iter().any(|t| t == "INDIVIDUAL" || t == "ENTITY")
}

fn apply_text(record: &mut PendingRecord, path: &[String], value: String) {
    let Some(current) = path.last().map(String::as_str) else {
        return;
    };
    let parent = path.len().checked_sub(2).and_then(|i| path.get(i)).map(String::as_str);

    match (parent, current) {
        // Fields directly under the record element
        (Some("INDIVIDUAL") | Some("ENTITY"), "DATAID") => {
            if record.data_id.is_empty() {
                record.data_id = value;
            }
        }
        (Some("INDIVIDUAL") | Some("ENTITY"), "FIRST_NAME")
        | (Some("INDIVIDUAL"), "SECOND_NAME")
        | (Some("INDIVIDUAL"), "THIRD_NAME")
        | (Some("INDIVIDUAL"), "FOURTH_NAME") => {
            record.name_parts.push(value);
        }
        (Some("INDIVIDUAL") | Some("ENTITY"), "UN_LIST_TYPE") => {
            if record.list_type.is_empty() {
                record.list_type = value;
            }
        }
        (Some("INDIVIDUAL_ALIAS") | Some("ENTITY_ALIAS"), "ALIAS_NAME") => {
            record.aliases.push(value);
        }
        (Some("NATIONALITY"), "VALUE") => {
            record.nationalities.push(value);
        }
        _ => {}
    }
}
