// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Streaming rewrite of a corpus document.
//!
//! Events are copied from reader to writer untouched except for `<entity>`
//! start tags inside the top-level `<data>` section.  Those are buffered with
//! their content so the entity text is known before the (possibly rewritten)
//! start tag is emitted.  The text itself is never modified.

use crate::contact;
use crate::document::policy::{ANONYMIZED_ATTR, EntityAction, EntityFlags, EntityKind, NORM_ATTR};
use crate::names::{NameSubstituter, RankDraw, SkeletonTable};
use anyhow::{Result, bail};
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

const DATA_TAG: &[u8] = b"data";
const ENTITY_TAG: &[u8] = b"entity";
/// Depth of `<data>`: a direct child of the root element.
const DATA_DEPTH: usize = 2;

pub struct Mutator<'a, D: RankDraw> {
    names: &'a mut NameSubstituter<D>,
    skeletons: &'a SkeletonTable,
    force: bool,
    contact: Box<dyn FnMut(&str) -> String + 'a>,
}

impl<'a, D: RankDraw> Mutator<'a, D> {
    pub fn new(names: &'a mut NameSubstituter<D>, skeletons: &'a SkeletonTable, force: bool) -> Self {
        Self {
            names,
            skeletons,
            force,
            contact: Box::new(contact::scramble_unseeded),
        }
    }

    /// Swap the scrambler used for email, phone and web entities.
    pub fn with_contact_scrambler(mut self, scrambler: impl FnMut(&str) -> String + 'a) -> Self {
        self.contact = Box::new(scrambler);
        self
    }

    /// Rewrite a whole document, returning the serialised result.  The XML
    /// declaration is kept; a document without one gains a UTF-8 declaration.
    pub fn anonymise_document(&mut self, xml: &str) -> Result<Vec<u8>> {
        let mut reader = Reader::from_str(xml);
        let mut writer = Writer::new(Vec::with_capacity(xml.len() + xml.len() / 4));
        let mut depth = 0usize;
        let mut in_data = false;
        let mut first = true;

        loop {
            let event = reader.read_event()?;
            if first {
                first = false;
                if !matches!(event, Event::Decl(_)) {
                    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
                    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
                }
            }

            match event {
                Event::Eof => break,
                Event::Start(start) if in_data && start.name().as_ref() == ENTITY_TAG => {
                    let (text, inner) = capture_entity(&mut reader)?;
                    let start = self.rewrite_entity(start, &text)?;
                    writer.write_event(Event::Start(start))?;
                    for inner_event in inner {
                        writer.write_event(inner_event)?;
                    }
                }
                Event::Empty(start) if in_data && start.name().as_ref() == ENTITY_TAG => {
                    let start = self.rewrite_entity(start, "")?;
                    writer.write_event(Event::Empty(start))?;
                }
                Event::Start(start) => {
                    depth += 1;
                    if depth == DATA_DEPTH && start.name().as_ref() == DATA_TAG {
                        in_data = true;
                    }
                    writer.write_event(Event::Start(start))?;
                }
                Event::End(end) => {
                    if depth == DATA_DEPTH && in_data {
                        in_data = false;
                    }
                    depth = depth.saturating_sub(1);
                    writer.write_event(Event::End(end))?;
                }
                other => writer.write_event(other)?,
            }
        }

        Ok(writer.into_inner())
    }

    /// Apply the entity policy to one start tag, returning the tag to emit.
    fn rewrite_entity<'x>(&mut self, start: BytesStart<'x>, text: &str) -> Result<BytesStart<'x>> {
        let flags = EntityFlags::from_start(&start)?;
        let kind = match (flags.action(self.force), flags.kind) {
            (EntityAction::Anonymise, Some(kind)) => kind,
            (EntityAction::Keep, _) if flags.normalised => return with_anonymized(&start, None),
            (EntityAction::Skip, _) if flags.skip_listed => {
                debug!("skip {text}");
                return Ok(start);
            }
            _ => return Ok(start),
        };

        let value = match kind {
            EntityKind::Person => {
                let skeleton = self.skeletons.get(text)?;
                self.names.anonymise(text, skeleton)?
            }
            EntityKind::Email | EntityKind::Phone | EntityKind::Webpage => (self.contact)(text),
        };
        with_anonymized(&start, Some(&value))
    }
}

/// Collect everything up to and including the matching `</entity>`.  The
/// entity text is the character data before the first child element.
fn capture_entity<'i>(reader: &mut Reader<&'i [u8]>) -> Result<(String, Vec<Event<'i>>)> {
    let mut text = String::new();
    let mut inner = Vec::new();
    let mut nested = 0usize;
    let mut seen_child = false;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Eof => bail!("document ends inside an <entity> element"),
            Event::Start(_) => {
                nested += 1;
                seen_child = true;
            }
            Event::Empty(_) => seen_child = true,
            Event::End(_) if nested == 0 => {
                inner.push(event);
                return Ok((text, inner));
            }
            Event::End(_) => nested -= 1,
            Event::Text(chunk) if !seen_child => text.push_str(&chunk.unescape()?),
            Event::CData(chunk) if !seen_child => text.push_str(&String::from_utf8_lossy(chunk)),
            _ => {}
        }
        inner.push(event);
    }
}

/// Copy `start` without its `norm` attribute, setting `anonymized` to `value`
/// when given: an existing value is replaced in place, otherwise the
/// attribute is appended.
fn with_anonymized<'x>(start: &BytesStart<'x>, value: Option<&str>) -> Result<BytesStart<'x>> {
    let mut out = start.clone();
    out.clear_attributes();
    let mut written = false;

    for attr in start.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        match (key, value) {
            (NORM_ATTR, _) => {}
            (ANONYMIZED_ATTR, Some(value)) => {
                out.push_attribute((ANONYMIZED_ATTR, value));
                written = true;
            }
            _ => out.push_attribute((key, attr.unescape_value()?.as_ref())),
        }
    }

    if let (Some(value), false) = (value, written) {
        out.push_attribute((ANONYMIZED_ATTR, value));
    }
    Ok(out)
}
