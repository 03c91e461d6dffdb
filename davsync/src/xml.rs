// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! XML utilities for WebDAV/CalDAV/CardDAV processing.

use std::collections::BTreeSet;
use std::fmt;
use std::io::Cursor;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::DavError;

/// XML namespaces used in `CalDAV` and `CardDAV`.
pub mod ns {
    /// `WebDAV` namespace.
    pub const DAV: &str = "DAV:";

    /// `CalDAV` namespace.
    pub const CALDAV: &str = "urn:ietf:params:xml:ns:caldav";

    /// `CardDAV` namespace.
    pub const CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";

    /// Apple calendar server namespace, home of `getctag`.
    pub const CALENDARSERVER: &str = "http://calendarserver.org/ns/";
}

/// A namespace together with the prefix used for it in request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// `DAV:` as `D`.
    Dav,
    /// `CalDAV` as `C`.
    CalDav,
    /// `CardDAV` as `CR`.
    CardDav,
    /// Calendar server as `CS`.
    CalendarServer,
}

impl Namespace {
    /// Element prefix.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Dav => "D",
            Self::CalDav => "C",
            Self::CardDav => "CR",
            Self::CalendarServer => "CS",
        }
    }

    /// Namespace URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Dav => ns::DAV,
            Self::CalDav => ns::CALDAV,
            Self::CardDav => ns::CARDDAV,
            Self::CalendarServer => ns::CALENDARSERVER,
        }
    }

    /// Qualified element name, e.g. `C:calendar-data`.
    #[must_use]
    pub fn qualify(self, local: &str) -> String {
        format!("{}:{local}", self.prefix())
    }
}

/// Adds one `xmlns:{prefix}` attribute per distinct namespace, in a stable order.
pub fn declare_namespaces(elem: &mut BytesStart<'_>, namespaces: impl IntoIterator<Item = Namespace>) {
    let unique: BTreeSet<Namespace> = namespaces.into_iter().collect();
    for namespace in unique {
        let attr = format!("xmlns:{}", namespace.prefix());
        elem.push_attribute((attr.as_str(), namespace.uri()));
    }
}

/// Creates the indenting writer every request body is built with.
pub(crate) fn new_writer() -> Writer<Cursor<Vec<u8>>> {
    Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2)
}

/// Finishes a writer created by [`new_writer`].
pub(crate) fn finish(writer: Writer<Cursor<Vec<u8>>>) -> Result<String, DavError> {
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| DavError::Xml(format!("UTF-8 error: {e}")))
}

pub(crate) fn xml_error(e: impl fmt::Display) -> DavError {
    DavError::Xml(e.to_string())
}

/// Local (unprefixed) name of an element.
pub(crate) fn local_name(elem: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(elem.name().local_name().into_inner()).into_owned()
}

/// Reads the text content of the element whose start tag was just consumed.
///
/// Text, CDATA sections and entity references are concatenated verbatim;
/// markup nested inside the element is skipped.
pub(crate) fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, DavError> {
    let mut text = String::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&e.decode().map_err(xml_error)?),
            Event::CData(e) => text.push_str(&e.decode().map_err(xml_error)?),
            Event::GeneralRef(e) => {
                if let Some(ch) = e.resolve_char_ref().map_err(xml_error)? {
                    text.push(ch);
                } else {
                    let name = e.decode().map_err(xml_error)?;
                    let resolved = quick_xml::escape::resolve_predefined_entity(&name)
                        .ok_or_else(|| DavError::Xml(format!("unknown entity &{name};")))?;
                    text.push_str(resolved);
                }
            }
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(text),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

/// Reads the local names of the direct children of the current element.
pub(crate) fn read_child_names(reader: &mut Reader<&[u8]>) -> Result<Vec<String>, DavError> {
    let mut names = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 0 {
                    names.push(local_name(&e));
                }
                depth += 1;
            }
            Event::Empty(e) if depth == 0 => names.push(local_name(&e)),
            Event::End(_) if depth == 0 => return Ok(names),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

/// Reads every `href` nested anywhere inside the current element, trimmed.
pub(crate) fn read_hrefs(reader: &mut Reader<&[u8]>) -> Result<Vec<String>, DavError> {
    let mut hrefs = Vec::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().local_name().into_inner() == b"href" => {
                hrefs.push(read_text(reader)?.trim().to_string());
            }
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(hrefs),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

/// Reads the `name` attribute of every `comp` inside a component set.
pub(crate) fn read_comp_names(reader: &mut Reader<&[u8]>) -> Result<Vec<String>, DavError> {
    let mut components = Vec::new();
    let mut depth = 0usize;
    loop {
        let event = reader.read_event()?;
        if let Event::Start(e) | Event::Empty(e) = &event {
            if e.name().local_name().into_inner() == b"comp" {
                if let Some(name_attr) = e.try_get_attribute("name").map_err(xml_error)? {
                    let name = std::str::from_utf8(&name_attr.value)
                        .map_err(|e| DavError::Xml(format!("UTF-8 error: {e}")))?;
                    components.push(name.to_string());
                }
            }
        }
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(components),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

/// Reads the report names of a `supported-report-set`.
///
/// The layout is `supported-report/report/{name}`; the names are the
/// children of each `report` element.
pub(crate) fn read_report_names(reader: &mut Reader<&[u8]>) -> Result<Vec<String>, DavError> {
    let mut reports = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().local_name().into_inner() == b"report" => {
                reports.extend(read_child_names(reader)?);
            }
            Event::End(e) if e.name().local_name().into_inner() == b"supported-report-set" => {
                return Ok(reports);
            }
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

fn unexpected_eof() -> DavError {
    DavError::Xml("Unexpected EOF".to_string())
}
