//! Source registry: which lists are ingested and how each is shaped

use crate::error::Result;
use crate::{eu, ofac, uk, un};
use screening_core::CanonicalEntityRecord;

/// Raw bytes of one downloaded file
#[derive(Debug, Clone)]
pub struct RawFile {
    /// File name within the source (e.g. `SDN.CSV`)
    pub name: String,
    /// Raw bytes as downloaded
    pub bytes: Vec<u8>,
}

impl RawFile {
    /// Create from a name and bytes
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// File format of a watchlist source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// OFAC SDN headerless CSV set (SDN.CSV + ALT.CSV + ADD.CSV)
    OfacSdn,
    /// OFAC Consolidated (non-SDN) headered CSV set
    OfacConsolidated,
    /// UN Security Council consolidated XML
    UnXml,
    /// EU financial sanctions CSV (semicolon-delimited, BOM)
    EuCsv,
    /// UK FCDO sanctions CSV (preamble row)
    UkCsv,
}

impl SourceFormat {
    /// Parse a source's raw files into canonical records.
    pub fn parse(&self, source_id: &str, files: &[RawFile]) -> Result<Vec<CanonicalEntityRecord>> {
        match self {
            SourceFormat::OfacSdn => ofac::parse_sdn(source_id, files),
            SourceFormat::OfacConsolidated => ofac::parse_consolidated(source_id, files),
            SourceFormat::UnXml => un::parse(source_id, files),
            SourceFormat::EuCsv => eu::parse(source_id, files),
            SourceFormat::UkCsv => uk::parse(source_id, files),
        }
    }
}

/// One file within a source
#[derive(Debug, Clone, Copy)]
pub struct FileSpec {
    /// Local file name
    pub name: &'static str,
    /// Download URL
    pub url: &'static str,
}

/// One watchlist source: identity, format, and where to fetch it
#[derive(Debug, Clone, Copy)]
pub struct SourceSpec {
    /// Source identifier recorded on every emitted record
    pub source_id: &'static str,
    /// File format
    pub format: SourceFormat,
    /// Base URL recorded in the snapshot manifest
    pub download_url: &'static str,
    /// Files to fetch
    pub files: &'static [FileSpec],
}

const OFAC_BASE: &str = "https://sanctionslistservice.ofac.treas.gov/api/download";

/// The builtin source registry, in manifest order
pub fn builtin_sources() -> &'static [SourceSpec] {
    &[
        SourceSpec {
            source_id: "OFAC-SDN",
            format: SourceFormat::OfacSdn,
            download_url: OFAC_BASE,
            files: &[
                FileSpec {
                    name: "SDN.CSV",
                    url: "https://sanctionslistservice.ofac.treas.gov/api/download/SDN.CSV",
                },
                FileSpec {
                    name: "ALT.CSV",
                    url: "https://sanctionslistservice.ofac.treas.gov/api/download/ALT.CSV",
                },
                FileSpec {
                    name: "ADD.CSV",
                    url: "https://sanctionslistservice.ofac.treas.gov/api/download/ADD.CSV",
                },
            ],
        },
        SourceSpec {
            source_id: "OFAC-CONS",
            format: SourceFormat::OfacConsolidated,
            download_url: OFAC_BASE,
            files: &[
                FileSpec {
                    name: "CONS_PRIM.CSV",
                    url: "https://sanctionslistservice.ofac.treas.gov/api/download/CONS_PRIM.CSV",
                },
                FileSpec {
                    name: "CONS_ALT.CSV",
                    url: "https://sanctionslistservice.ofac.treas.gov/api/download/CONS_ALT.CSV",
                },
                FileSpec {
                    name: "CONS_ADD.CSV",
                    url: "https://sanctionslistservice.ofac.treas.gov/api/download/CONS_ADD.CSV",
                },
            ],
        },
        SourceSpec {
            source_id: "UN",
            format: SourceFormat::UnXml,
            download_url: "https://scsanctions.un.org/resources/xml/en/consolidated.xml",
            files: &[FileSpec {
                name: "un_consolidated.xml",
                url: "https://scsanctions.un.org/resources/xml/en/consolidated.xml",
            }],
        },
        SourceSpec {
            source_id: "EU",
            format: SourceFormat::EuCsv,
            download_url: "https://webgate.ec.europa.eu/fsd/fsf/public/files/csvFullSanctionsList/content?token=dG9rZW4tMjAxNw",
            files: &[FileSpec {
                name: "eu_consolidated.csv",
                url: "https://webgate.ec.europa.eu/fsd/fsf/public/files/csvFullSanctionsList/content?token=dG9rZW4tMjAxNw",
            }],
        },
        SourceSpec {
            source_id: "UK",
            format: SourceFormat::UkCsv,
            download_url: "https://sanctionslist.fcdo.gov.uk/docs/UK-Sanctions-List.csv",
            files: &[FileSpec {
                name: "uk_sanctions.csv",
                url: "https://sanctionslist.fcdo.gov.uk/docs/UK-Sanctions-List.csv",
            }],
        },
    ]
}

/// Look up a file by name within a downloaded source, case-insensitively.
pub(crate) fn find_file<'a>(files: &'a [RawFile], name: &str) -> Option<&'a RawFile> {
    files.iter().find(|f| f.name.eq_ignore_ascii_case(name))
}

/// Decode raw list bytes forgivingly; the official CSVs are a mix of
/// UTF-8 and Windows-1252-ish encodings.
pub(crate) fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sources_have_unique_ids() {
        let sources = builtin_sources();
        let mut ids: Vec<_> = sources.iter().map(|s| s.source_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), sources.len());
    }

    #[test]
    fn test_every_source_has_files() {
        for source in builtin_sources() {
            assert!(!source.files.is_empty(), "{} has no files", source.source_id);
        }
    }

    #[test]
    fn test_find_file_case_insensitive() {
        let files = vec![RawFile::new("SDN.CSV", b"x".to_vec())];
        assert!(find_file(&files, "sdn.csv").is_some());
        assert!(find_file(&files, "ALT.CSV").is_none());
    }
}
