// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Multistatus response decoding.

use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::StatusCode;

use crate::error::DavError;
use crate::types::{ETag, Href};
use crate::xml::{read_child_names, read_comp_names, read_hrefs, read_report_names, read_text};

/// `WebDAV` multistatus response.
#[derive(Debug, Clone, Default)]
pub struct MultiStatusResponse {
    /// One record per `<response>` element, in document order.
    pub responses: Vec<ResponseRecord>,
    /// Top-level sync token of a `sync-collection` answer.
    pub sync_token: Option<String>,
}

/// Individual response in a multistatus.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    /// The href exactly as sent by the server.
    pub href: Href,
    /// Response-level status line, used for members without properties.
    pub status: Option<String>,
    /// Property groups, each with its own status.
    pub prop_stats: Vec<PropStat>,
}

/// Property group with its status line.
#[derive(Debug, Clone)]
pub struct PropStat {
    /// Decoded properties.
    pub props: Properties,
    /// Status line, e.g. `HTTP/1.1 200 OK`.
    pub status: String,
}

/// WebDAV/CalDAV/CardDAV properties.
///
/// A field is `None` when the server did not return the property and
/// `Some` (possibly empty) when it did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    /// `displayname`.
    pub display_name: Option<String>,
    /// Local names of the `resourcetype` children.
    pub resource_type: Option<Vec<String>>,
    /// `getetag`.
    pub get_etag: Option<ETag>,
    /// `getctag`.
    pub get_ctag: Option<String>,
    /// `sync-token`.
    pub sync_token: Option<String>,
    /// `current-user-principal` href.
    pub current_user_principal: Option<Href>,
    /// `calendar-home-set` href.
    pub calendar_home_set: Option<Href>,
    /// `addressbook-home-set` href.
    pub addressbook_home_set: Option<Href>,
    /// `calendar-data`, verbatim.
    pub calendar_data: Option<String>,
    /// `address-data`, verbatim.
    pub address_data: Option<String>,
    /// Names of the `supported-calendar-component-set` components.
    pub supported_calendar_components: Option<Vec<String>>,
    /// Names of the reports in `supported-report-set`.
    pub supported_reports: Option<Vec<String>>,
    /// `calendar-description`.
    pub calendar_description: Option<String>,
    /// `addressbook-description`.
    pub addressbook_description: Option<String>,
    /// `calendar-timezone`.
    pub calendar_timezone: Option<String>,
}

impl Properties {
    /// Fills every property still missing here from `other`.
    pub fn merge(&mut self, other: &Self) {
        fn fill<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
            if slot.is_none() {
                *slot = value.cloned();
            }
        }

        fill(&mut self.display_name, other.display_name.as_ref());
        fill(&mut self.resource_type, other.resource_type.as_ref());
        fill(&mut self.get_etag, other.get_etag.as_ref());
        fill(&mut self.get_ctag, other.get_ctag.as_ref());
        fill(&mut self.sync_token, other.sync_token.as_ref());
        fill(
            &mut self.current_user_principal,
            other.current_user_principal.as_ref(),
        );
        fill(&mut self.calendar_home_set, other.calendar_home_set.as_ref());
        fill(
            &mut self.addressbook_home_set,
            other.addressbook_home_set.as_ref(),
        );
        fill(&mut self.calendar_data, other.calendar_data.as_ref());
        fill(&mut self.address_data, other.address_data.as_ref());
        fill(
            &mut self.supported_calendar_components,
            other.supported_calendar_components.as_ref(),
        );
        fill(&mut self.supported_reports, other.supported_reports.as_ref());
        fill(
            &mut self.calendar_description,
            other.calendar_description.as_ref(),
        );
        fill(
            &mut self.addressbook_description,
            other.addressbook_description.as_ref(),
        );
        fill(&mut self.calendar_timezone, other.calendar_timezone.as_ref());
    }
}

/// Extracts the code of a status line such as `HTTP/1.1 404 Not Found`.
#[must_use]
pub fn parse_status_line(line: &str) -> Option<StatusCode> {
    let code = line.split_whitespace().nth(1)?.parse::<u16>().ok()?;
    StatusCode::from_u16(code).ok()
}

fn is_success_line(line: &str) -> bool {
    parse_status_line(line).is_some_and(|s| s.is_success())
}

impl ResponseRecord {
    /// Status of this record.
    ///
    /// The response-level status wins; otherwise the first successful
    /// propstat, otherwise the first propstat with a readable status.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        if let Some(status) = self.status.as_deref().and_then(parse_status_line) {
            return Some(status);
        }
        let mut codes = self
            .prop_stats
            .iter()
            .filter_map(|p| parse_status_line(&p.status));
        let first = codes.next()?;
        if first.is_success() {
            Some(first)
        } else {
            Some(codes.find(StatusCode::is_success).unwrap_or(first))
        }
    }

    /// Whether the record reports success (2xx).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status_code().is_some_and(|s| s.is_success())
    }

    /// Properties of all successful propstats merged together.
    ///
    /// Properties reported under a failing propstat (typically `404` for
    /// unknown properties) are treated as absent.
    #[must_use]
    pub fn props(&self) -> Properties {
        let mut merged = Properties::default();
        for prop_stat in self
            .prop_stats
            .iter()
            .filter(|p| is_success_line(&p.status))
        {
            merged.merge(&prop_stat.props);
        }
        merged
    }
}

impl MultiStatusResponse {
    /// Parses multistatus response from XML.
    ///
    /// # Errors
    ///
    /// Returns an error if XML parsing fails.
    pub fn from_xml(xml: &str) -> Result<Self, DavError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().check_end_names = true;

        let mut multistatus = Self::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.name().local_name().into_inner() {
                    b"response" => multistatus.responses.push(parse_response(&mut reader)?),
                    b"sync-token" => {
                        multistatus.sync_token = Some(read_text(&mut reader)?.trim().to_string());
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(multistatus)
    }
}

fn parse_response(reader: &mut Reader<&[u8]>) -> Result<ResponseRecord, DavError> {
    let mut record = ResponseRecord {
        href: Href::new(String::new()),
        status: None,
        prop_stats: Vec::new(),
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().local_name().into_inner() {
                b"href" => {
                    let href = read_text(reader)?.trim().to_string();
                    // A 404 response may list several hrefs; keep the first.
                    if record.href.is_empty() {
                        record.href = Href::new(href);
                    }
                }
                b"status" => record.status = Some(read_text(reader)?.trim().to_string()),
                b"propstat" => record.prop_stats.push(parse_propstat(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.name().local_name().into_inner() == b"response" => {
                return Ok(record);
            }
            Event::Eof => return Err(DavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
    }
}

fn parse_propstat(reader: &mut Reader<&[u8]>) -> Result<PropStat, DavError> {
    let mut props = Properties::default();
    let mut status = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().local_name().into_inner() {
                b"prop" => props = parse_prop(reader)?,
                b"status" => status = read_text(reader)?.trim().to_string(),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.name().local_name().into_inner() == b"propstat" => {
                return Ok(PropStat { props, status });
            }
            Event::Eof => return Err(DavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
    }
}

fn first_href(hrefs: Vec<String>) -> Option<Href> {
    hrefs.into_iter().find(|h| !h.is_empty()).map(Href::new)
}

fn parse_prop(reader: &mut Reader<&[u8]>) -> Result<Properties, DavError> {
    let mut props = Properties::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().local_name().into_inner() {
                b"displayname" => props.display_name = Some(read_text(reader)?.trim().to_string()),
                b"getetag" => {
                    props.get_etag = Some(ETag::new(read_text(reader)?.trim().to_string()));
                }
                b"getctag" => props.get_ctag = Some(read_text(reader)?.trim().to_string()),
                b"sync-token" => props.sync_token = Some(read_text(reader)?.trim().to_string()),
                b"resourcetype" => props.resource_type = Some(read_child_names(reader)?),
                b"current-user-principal" => {
                    props.current_user_principal = first_href(read_hrefs(reader)?);
                }
                b"calendar-home-set" => props.calendar_home_set = first_href(read_hrefs(reader)?),
                b"addressbook-home-set" => {
                    props.addressbook_home_set = first_href(read_hrefs(reader)?);
                }
                b"calendar-data" => props.calendar_data = Some(read_text(reader)?),
                b"address-data" => props.address_data = Some(read_text(reader)?),
                b"supported-calendar-component-set" => {
                    props.supported_calendar_components = Some(read_comp_names(reader)?);
                }
                b"supported-report-set" => {
                    props.supported_reports = Some(read_report_names(reader)?);
                }
                b"calendar-description" => props.calendar_description = Some(read_text(reader)?),
                b"addressbook-description" => {
                    props.addressbook_description = Some(read_text(reader)?);
                }
                b"calendar-timezone" => props.calendar_timezone = Some(read_text(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            // Self-closing elements are present but empty.
            Event::Empty(e) => match e.name().local_name().into_inner() {
                b"displayname" => props.display_name = Some(String::new()),
                b"getetag" => props.get_etag = Some(ETag::new(String::new())),
                b"getctag" => props.get_ctag = Some(String::new()),
                b"sync-token" => props.sync_token = Some(String::new()),
                b"resourcetype" => props.resource_type = Some(Vec::new()),
                b"calendar-data" => props.calendar_data = Some(String::new()),
                b"address-data" => props.address_data = Some(String::new()),
                b"supported-calendar-component-set" => {
                    props.supported_calendar_components = Some(Vec::new());
                }
                b"supported-report-set" => props.supported_reports = Some(Vec::new()),
                b"calendar-description" => props.calendar_description = Some(String::new()),
                b"addressbook-description" => props.addressbook_description = Some(String::new()),
                b"calendar-timezone" => props.calendar_timezone = Some(String::new()),
                _ => {}
            },
            Event::End(e) if e.name().local_name().into_inner() == b"prop" => return Ok(props),
            Event::Eof => return Err(DavError::Xml("Unexpected EOF".to_string())),
            _ => {}
        }
    }
}
