// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Where a document comes from.  The anonymiser only needs two opaque
//! strings per document (country code and document identifier); this module
//! recovers them from the source file name recorded in the metadata section,
//! e.g. `corpus_PT_news_0042_part1.txt`.

use crate::error::AnonymiseError;
use anyhow::{Context, Result};
use roxmltree::{Document, Node, ParsingOptions};

const COUNTRY_SEGMENT: usize = 1;
const DOCUMENT_ID_SEGMENT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub country: String,
    pub document_id: String,
}

impl DocumentInfo {
    /// Split the source file name on `_`: segment 1 is the country code,
    /// segment 3 the document identifier.
    pub fn from_source_file_name(name: &str) -> Result<Self, AnonymiseError> {
        let segments: Vec<&str> = name.split('_').collect();
        match (segments.get(COUNTRY_SEGMENT), segments.get(DOCUMENT_ID_SEGMENT)) {
            (Some(country), Some(document_id)) => Ok(Self {
                country: (*country).to_string(),
                document_id: (*document_id).to_string(),
            }),
            _ => Err(AnonymiseError::MissingMetadata {
                reason: format!("source file name {name:?} has too few '_' segments"),
            }),
        }
    }
}

/// Read the `<metadata>` section of a corpus document.
pub fn read_document_info(xml: &str) -> Result<DocumentInfo> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options).context("failed to parse document")?;
    let name = source_file_name(doc.root_element()).ok_or_else(|| AnonymiseError::MissingMetadata {
        reason: "no metadata/source/text/file name attribute".to_string(),
    })?;
    Ok(DocumentInfo::from_source_file_name(name)?)
}

fn source_file_name<'a>(root: Node<'a, '_>) -> Option<&'a str> {
    let metadata = find_child(root, "metadata")?;
    metadata
        .descendants()
        .filter(|node| node.is_element() && node.has_tag_name("source"))
        .filter_map(|source| find_child(source, "text"))
        .filter_map(|text| find_child(text, "file"))
        .find_map(|file| file.attribute("name"))
}

fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.has_tag_name(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document>
  <metadata>
    <source>
      <text>
        <file name="corpus_BR_news_0042_part1.txt"/>
      </text>
    </source>
  </metadata>
  <data/>
</document>"#;

    #[test]
    fn reads_country_and_identifier() {
        let info = read_document_info(DOC).expect("metadata present");
        assert_eq!(
            info,
            DocumentInfo {
                country: "BR".to_string(),
                document_id: "0042".to_string(),
            }
        );
    }

    #[test]
    fn short_file_name_is_rejected() {
        let err = DocumentInfo::from_source_file_name("corpus_PT.txt").unwrap_err();
        assert!(matches!(err, AnonymiseError::MissingMetadata { .. }));
    }

    #[test]
    fn missing_metadata_is_reported() {
        let err = read_document_info("<document><data/></document>").unwrap_err();
        assert!(
            err.to_string().contains("document metadata unavailable"),
            "{err:#}"
        );
    }

    #[test]
    fn file_outside_metadata_is_ignored() {
        let xml = r#"<document><metadata/><data><source><text><file name="a_PT_b_1"/></text></source></data></document>"#;
        assert!(read_document_info(xml).is_err());
    }
}
