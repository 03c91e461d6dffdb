// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Collection listing tests with wiremock.

use davsync::{Account, AccountKind, DavClient, DavConfig, DavError};
use url::Url;
use wiremock::matchers::{any, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> DavClient {
    DavClient::new(&DavConfig::default()).expect("Failed to create client")
}

fn server_url(server: &MockServer) -> Url {
    Url::parse(&server.uri()).expect("Invalid mock server URL")
}

fn account(server: &MockServer, kind: AccountKind, home: &str) -> Account {
    let url = server_url(server);
    Account::new(url.clone(), kind)
        .with_root_url(url.clone())
        .with_home_url(url.join(home).unwrap())
}

fn multistatus(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(207).set_body_raw(
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\" xmlns:CR=\"urn:ietf:params:xml:ns:carddav\" xmlns:CS=\"http://calendarserver.org/ns/\">
{body}
</D:multistatus>"
        ),
        "application/xml",
    )
}

async fn mount_reports(server: &MockServer, collection_path: &str, reports: &str) {
    Mock::given(method("PROPFIND"))
        .and(path(collection_path))
        .and(header("Depth", "0"))
        .and(body_string_contains("supported-report-set"))
        .respond_with(multistatus(&format!(
            r#"
  <D:response>
    <D:href>{collection_path}</D:href>
    <D:propstat>
      <D:prop>
        <D:supported-report-set>{reports}</D:supported-report-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>"#
        )))
        .expect(1)
        .mount(server)
        .await;
}

const CALENDAR_HOME: &str = r#"
  <D:response>
    <D:href>/calendars/alice/</D:href>
    <D:propstat>
      <D:prop><D:resourcetype><D:collection/></D:resourcetype></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/work/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Work</D:displayname>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <C:supported-calendar-component-set><C:comp name="VEVENT"/></C:supported-calendar-component-set>
        <C:calendar-description>Team events</C:calendar-description>
        <CS:getctag>ctag-1</CS:getctag>
        <D:sync-token>http://example.com/sync/1</D:sync-token>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/availability/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Availability</D:displayname>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <C:supported-calendar-component-set><C:comp name="VAVAILABILITY"/></C:supported-calendar-component-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/no-components/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
    <D:propstat>
      <D:prop><C:supported-calendar-component-set/></D:prop>
      <D:status>HTTP/1.1 404 Not Found</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/tasks/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Tasks</D:displayname>
        <D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
        <C:supported-calendar-component-set><C:comp name="VTODO"/></C:supported-calendar-component-set>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/inbox/</D:href>
    <D:propstat>
      <D:prop><D:resourcetype><D:collection/><C:schedule-inbox/></D:resourcetype></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>"#;

#[tokio::test]
async fn collection_fetch_calendars_filters_and_maps() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .and(path("/calendars/alice/"))
        .and(header("Depth", "1"))
        .and(body_string_contains("supported-calendar-component-set"))
        .and(body_string_contains("getctag"))
        .respond_with(multistatus(CALENDAR_HOME))
        .expect(1)
        .mount(&server)
        .await;
    mount_reports(
        &server,
        "/calendars/alice/work/",
        "<D:supported-report><D:report><C:calendar-multiget/></D:report></D:supported-report>
         <D:supported-report><D:report><D:sync-collection/></D:report></D:supported-report>",
    )
    .await;
    mount_reports(&server, "/calendars/alice/tasks/", "").await;

    let url = server_url(&server);
    let account = account(&server, AccountKind::CalDav, "/calendars/alice/");
    let calendars = client().fetch_collections(&account).await.unwrap();

    assert_eq!(calendars.len(), 2);

    let work = &calendars[0];
    assert_eq!(work.url, url.join("/calendars/alice/work/").unwrap());
    assert_eq!(work.kind, AccountKind::CalDav);
    assert_eq!(work.display_name.as_deref(), Some("Work"));
    assert_eq!(work.description.as_deref(), Some("Team events"));
    assert_eq!(work.ctag.as_deref(), Some("ctag-1"));
    assert_eq!(work.sync_token.as_deref(), Some("http://example.com/sync/1"));
    assert_eq!(work.supported_components, ["VEVENT"]);
    assert_eq!(work.resource_types, ["collection", "calendar"]);
    assert_eq!(
        work.supported_reports,
        ["calendar-multiget", "sync-collection"]
    );
    assert!(work.objects.is_empty());

    let tasks = &calendars[1];
    assert_eq!(tasks.url, url.join("/calendars/alice/tasks/").unwrap());
    assert_eq!(tasks.supported_components, ["VTODO"]);
    assert!(tasks.supported_reports.is_empty());
    assert_eq!(tasks.ctag, None);
}

#[tokio::test]
async fn collection_fetch_address_books() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .and(path("/contacts/alice/"))
        .and(header("Depth", "1"))
        .and(body_string_contains("addressbook-description"))
        .respond_with(multistatus(
            r#"
  <D:response>
    <D:href>/contacts/alice/</D:href>
    <D:propstat>
      <D:prop><D:resourcetype><D:collection/></D:resourcetype></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/contacts/alice/family/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Family</D:displayname>
        <D:resourcetype><D:collection/><CR:addressbook/></D:resourcetype>
        <CR:addressbook-description>Relatives</CR:addressbook-description>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_reports(&server, "/contacts/alice/family/", "").await;

    let url = server_url(&server);
    let account = account(&server, AccountKind::CardDav, "/contacts/alice/");
    let books = client().fetch_address_books(&account).await.unwrap();

    assert_eq!(books.len(), 1);
    assert_eq!(books[0].url, url.join("/contacts/alice/family/").unwrap());
    assert_eq!(books[0].kind, AccountKind::CardDav);
    assert_eq!(books[0].description.as_deref(), Some("Relatives"));
    assert!(books[0].supported_components.is_empty());
}

#[tokio::test]
async fn collection_fetch_requires_root_and_home() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let url = server_url(&server);
    let client = client();

    let bare = Account::new(url.clone(), AccountKind::CalDav);
    let err = client.fetch_calendars(&bare).await.unwrap_err();
    assert!(matches!(err, DavError::Precondition(fields) if fields == ["root_url", "home_url"]));

    let rooted = bare.with_root_url(url);
    let err = client.fetch_calendars(&rooted).await.unwrap_err();
    assert!(matches!(err, DavError::Precondition(fields) if fields == ["home_url"]));
}

#[tokio::test]
async fn collection_fetch_propagates_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("PROPFIND"))
        .and(path("/calendars/alice/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let account = account(&server, AccountKind::CalDav, "/calendars/alice/");
    let err = client().fetch_collections(&account).await.unwrap_err();

    assert!(matches!(
        err,
        DavError::Http { status, ref message } if status == 403 && message == "forbidden"
    ));
}

#[tokio::test]
async fn collection_make_calendar_sends_mkcalendar() {
    let server = MockServer::start().await;
    Mock::given(method("MKCALENDAR"))
        .and(path("/calendars/alice/new/"))
        .and(header("Content-Type", "application/xml; charset=utf-8"))
        .and(body_string_contains("<D:displayname>Holidays</D:displayname>"))
        .and(body_string_contains(
            "<C:calendar-description>Days off</C:calendar-description>",
        ))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let url = server_url(&server).join("/calendars/alice/new/").unwrap();
    client()
        .make_calendar(&url, "Holidays", Some("Days off"))
        .await
        .unwrap();
}

#[tokio::test]
async fn collection_make_calendar_surfaces_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("MKCALENDAR"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;

    let url = server_url(&server).join("/calendars/alice/work/").unwrap();
    let err = client()
        .make_calendar(&url, "Work", None)
        .await
        .unwrap_err();

    assert!(matches!(err, DavError::Http { status, .. } if status == 405));
}
