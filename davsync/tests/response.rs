// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Response parsing tests.

use davsync::{ETag, Href, MultiStatusResponse};
use reqwest::StatusCode;

#[test]
fn response_parse_multistatus_basic() {
    let xml = "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\">
  <D:response>
    <D:href>/calendars/user/event1.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>\"12345\"</D:getetag>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>";

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");

    assert_eq!(response.responses.len(), 1);
    let record = &response.responses[0];
    assert_eq!(record.href.as_str(), "/calendars/user/event1.ics");
    assert_eq!(record.prop_stats.len(), 1);
    assert_eq!(record.prop_stats[0].status, "HTTP/1.1 200 OK");
    assert_eq!(record.status_code(), Some(StatusCode::OK));
    assert!(record.is_ok());
    assert_eq!(
        record.props().get_etag,
        Some(ETag::new("\"12345\"".to_string()))
    );
}

#[test]
fn response_parse_without_prefix_and_other_prefixes() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<multistatus xmlns="DAV:" xmlns:cal="urn:ietf:params:xml:ns:caldav">
  <response>
    <href>/home/</href>
    <propstat>
      <prop>
        <displayname>Home</displayname>
        <cal:calendar-home-set><href>/calendars/alice/</href></cal:calendar-home-set>
      </prop>
      <status>HTTP/1.1 200 OK</status>
    </propstat>
  </response>
</multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");
    let props = response.responses[0].props();

    assert_eq!(props.display_name.as_deref(), Some("Home"));
    assert_eq!(
        props.calendar_home_set,
        Some(Href::from("/calendars/alice/"))
    );
}

#[test]
fn response_props_merge_only_successful_propstats() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:CS="http://calendarserver.org/ns/">
  <D:response>
    <D:href>/cal/work/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Work</D:displayname>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
    <D:propstat>
      <D:prop>
        <CS:getctag/>
        <D:sync-token/>
      </D:prop>
      <D:status>HTTP/1.1 404 Not Found</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");
    let record = &response.responses[0];
    let props = record.props();

    assert!(record.is_ok());
    assert_eq!(props.display_name.as_deref(), Some("Work"));
    assert_eq!(props.get_ctag, None);
    assert_eq!(props.sync_token, None);
    // The raw propstat still carries what the server sent
    assert_eq!(record.prop_stats[1].props.get_ctag.as_deref(), Some(""));
}

#[test]
fn response_empty_property_differs_from_absent() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/cal/a.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>"1"</D:getetag>
        <C:calendar-data></C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/cal/b.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getetag>"2"</D:getetag>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");

    assert_eq!(
        response.responses[0].props().calendar_data.as_deref(),
        Some("")
    );
    assert_eq!(response.responses[1].props().calendar_data, None);
}

#[test]
fn response_calendar_data_kept_verbatim() {
    let xml = "<?xml version=\"1.0\" encoding=\"utf-8\"?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">
  <D:response>
    <D:href>/cal/a.ics</D:href>
    <D:propstat>
      <D:prop>
        <C:calendar-data>BEGIN:VCALENDAR\nSUMMARY:Fish &amp; chips\nEND:VCALENDAR\n</C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>";

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");

    assert_eq!(
        response.responses[0].props().calendar_data.as_deref(),
        Some("BEGIN:VCALENDAR\nSUMMARY:Fish & chips\nEND:VCALENDAR\n")
    );
}

#[test]
fn response_calendar_data_in_cdata() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/cal/a.ics</D:href>
    <D:propstat>
      <D:prop>
        <C:calendar-data><![CDATA[BEGIN:VCALENDAR
SUMMARY:<b>&
END:VCALENDAR]]></C:calendar-data>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");

    assert_eq!(
        response.responses[0].props().calendar_data.as_deref(),
        Some("BEGIN:VCALENDAR\nSUMMARY:<b>&\nEND:VCALENDAR")
    );
}

#[test]
fn response_parse_collection_properties() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav" xmlns:CS="http://calendarserver.org/ns/">
  <D:response>
    <D:href>/cal/work/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <C:supported-calendar-component-set>
          <C:comp name="VEVENT"/>
          <C:comp name="VTODO"/>
        </C:supported-calendar-component-set>
        <CS:getctag>ctag-1</CS:getctag>
        <D:sync-token>http://example.com/sync/1</D:sync-token>
        <C:calendar-description>Team events</C:calendar-description>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");
    let props = response.responses[0].props();

    assert_eq!(
        props.resource_type,
        Some(vec!["collection".to_string(), "calendar".to_string()])
    );
    assert_eq!(
        props.supported_calendar_components,
        Some(vec!["VEVENT".to_string(), "VTODO".to_string()])
    );
    assert_eq!(props.get_ctag.as_deref(), Some("ctag-1"));
    assert_eq!(props.sync_token.as_deref(), Some("http://example.com/sync/1"));
    assert_eq!(props.calendar_description.as_deref(), Some("Team events"));
}

#[test]
fn response_parse_supported_report_set() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/cal/work/</D:href>
    <D:propstat>
      <D:prop>
        <D:supported-report-set>
          <D:supported-report><D:report><C:calendar-multiget/></D:report></D:supported-report>
          <D:supported-report><D:report><C:calendar-query/></D:report></D:supported-report>
          <D:supported-report><D:report><D:sync-collection/></D:report></D:supported-report>
        </D:supported-report-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");

    assert_eq!(
        response.responses[0].props().supported_reports,
        Some(vec![
            "calendar-multiget".to_string(),
            "calendar-query".to_string(),
            "sync-collection".to_string(),
        ])
    );
}

#[test]
fn response_principal_without_href_is_absent() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/</D:href>
    <D:propstat>
      <D:prop>
        <D:current-user-principal><D:unauthenticated/></D:current-user-principal>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");

    assert_eq!(response.responses[0].props().current_user_principal, None);
}

#[test]
fn response_sync_collection_with_removed_member_and_token() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/cal/new.ics</D:href>
    <D:propstat>
      <D:prop><D:getetag>"n1"</D:getetag></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/cal/gone.ics</D:href>
    <D:status>HTTP/1.1 404 Not Found</D:status>
  </D:response>
  <D:sync-token>http://example.com/sync/2</D:sync-token>
</D:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");

    assert_eq!(response.responses.len(), 2);
    assert_eq!(
        response.sync_token.as_deref(),
        Some("http://example.com/sync/2")
    );
    let removed = &response.responses[1];
    assert_eq!(removed.status_code(), Some(StatusCode::NOT_FOUND));
    assert!(!removed.is_ok());
    assert_eq!(removed.props(), davsync::Properties::default());
}

#[test]
fn response_unknown_elements_are_skipped() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:X="urn:example">
  <D:response>
    <D:href>/cal/a.ics</D:href>
    <X:extra><D:href>/not/this</D:href></X:extra>
    <D:propstat>
      <D:prop>
        <X:color>#ff0000</X:color>
        <D:getetag>"a"</D:getetag>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");
    let record = &response.responses[0];

    assert_eq!(record.href.as_str(), "/cal/a.ics");
    assert_eq!(record.props().get_etag, Some(ETag::from("\"a\"")));
}

#[test]
fn response_parse_empty_multistatus() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:"/>"#;

    let response = MultiStatusResponse::from_xml(xml).expect("Failed to parse multistatus");

    assert!(response.responses.is_empty());
    assert_eq!(response.sync_token, None);
}

#[test]
fn response_parse_truncated_document_fails() {
    let xml = r#"<D:multistatus xmlns:D="DAV:"><D:response><D:href>/a</D:href>"#;

    assert!(MultiStatusResponse::from_xml(xml).is_err());
}
