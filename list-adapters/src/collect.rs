//! Shared record assembly for all adapters
//!
//! Source files spread one entity over several rows (primary names,
//! aliases, addresses arrive in separate files or repeated rows). The
//! collector accumulates per-entity state keyed by entity id and emits
//! finished records in deterministic entity-id order.

use screening_core::CanonicalEntityRecord;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Default)]
pub(crate) struct EntityBuilder {
    primary: Option<String>,
    aliases: Vec<String>,
    programs: Vec<String>,
    addresses: Vec<String>,
    raw_fields: BTreeMap<String, String>,
}

impl EntityBuilder {
    /// Add a designated name: the first becomes the primary, the rest
    /// become aliases.
    pub(crate) fn add_name(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        match &self.primary {
            None => self.primary = Some(name.to_string()),
            Some(primary) if primary == name => {}
            Some(_) => self.add_alias(name),
        }
    }

    pub(crate) fn add_alias(&mut self, alias: &str) {
        let alias = alias.trim();
        if alias.is_empty()
            || self.primary.as_deref() == Some(alias)
            || self.aliases.iter().any(|a| a == alias)
        {
            return;
        }
        self.aliases.push(alias.to_string());
    }

    pub(crate) fn add_program(&mut self, program: &str) {
        let program = program.trim();
        if !program.is_empty() && !self.programs.iter().any(|p| p == program) {
            self.programs.push(program.to_string());
        }
    }

    pub(crate) fn add_address(&mut self, address: &str) {
        let address = address.trim();
        if !address.is_empty() && !self.addresses.iter().any(|a| a == address) {
            self.addresses.push(address.to_string());
        }
    }

    pub(crate) fn set_raw_field(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.raw_fields.insert(key.to_string(), value.to_string());
        }
    }
}

/// Accumulates entities for one source, keyed by entity id
#[derive(Debug)]
pub(crate) struct EntityCollector {
    source_id: String,
    entities: BTreeMap<String, EntityBuilder>,
}

impl EntityCollector {
    pub(crate) fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            entities: BTreeMap::new(),
        }
    }

    /// Builder for the given entity id, created on first use
    pub(crate) fn entity(&mut self, entity_id: &str) -> &mut EntityBuilder {
        self.entities.entry(entity_id.to_string()).or_default()
    }

    /// True when this entity id has been seen already
    pub(crate) fn contains(&self, entity_id: &str) -> bool {
        self.entities.contains_key(entity_id)
    }

    /// Emit finished records; entities that never got a usable name are
    /// dropped with a warning.
    pub(crate) fn finish(self) -> Vec<CanonicalEntityRecord> {
        let mut records = Vec::with_capacity(self.entities.len());
        let mut dropped = 0usize;

        for (entity_id, builder) in self.entities {
            let Some(primary_name) = builder.primary else {
                dropped += 1;
                continue;
            };

            let mut raw_fields = builder.raw_fields;
            if !builder.addresses.is_empty() {
                raw_fields.insert("addresses".to_string(), builder.addresses.join("; "));
            }

            records.push(CanonicalEntityRecord {
                source_id: self.source_id.clone(),
                entity_id,
                primary_name,
                alternate_names: builder.aliases,
                programs: builder.programs,
                raw_fields,
            });
        }

        if dropped > 0 {
            warn!(
                "Dropped {} {} entities with no usable name",
                dropped, self.source_id
            );
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name_is_primary_rest_are_aliases() {
        let mut collector = EntityCollector::new("OFAC-SDN");
        let entity = collector.entity("1");
        entity.add_name("IRAN AIR");
        entity.add_name("IRAN AIR");
        entity.add_name("HOMA");

        let records = collector.finish();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].primary_name, "IRAN AIR");
        assert_eq!(records[0].alternate_names, vec!["HOMA"]);
    }

    #[test]
    fn test_nameless_entities_dropped() {
        let mut collector = EntityCollector::new("UN");
        collector.entity("1").add_address("Somewhere");
        collector.entity("2").add_name("Kept Entity");

        let records = collector.finish();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity_id, "2");
    }

    #[test]
    fn test_records_sorted_by_entity_id() {
        let mut collector = EntityCollector::new("EU");
        collector.entity("20").add_name("B");
        collector.entity("10").add_name("A");

        let ids: Vec<_> = collector.finish().into_iter().map(|r| r.entity_id).collect();
        assert_eq!(ids, vec!["10", "20"]);
    }

    #[test]
    fn test_addresses_join_into_raw_fields() {
        let mut collector = EntityCollector::new("UK");
        let entity = collector.entity("7");
        entity.add_name("Entity");
        entity.add_address("1 High St, London");
        entity.add_address("1 High St, London");
        entity.add_address("Moscow");

        let records = collector.finish();
        assert_eq!(
            records[0].raw_fields["addresses"],
            "1 High St, London; Moscow"
        );
    }
}
