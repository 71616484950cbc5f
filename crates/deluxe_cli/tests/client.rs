use std::thread;

use deluxe_cli::client::{CdnClient, EntrySource};
use deluxe_core::delivery::PageQuery;
use tiny_http::{Header, Response, Server, StatusCode};

const BODY: &str = r#"{
  "items": [{
    "sys": { "id": "page", "type": "Entry", "contentType": { "sys": { "id": "deluxePage" } } },
    "fields": { "title": "Home", "slug": "home" }
  }]
}"#;

#[test]
fn fetch_sends_token_and_query() {
    let server = Server::http("127.0.0.1:0").expect("bind");
    let port = server.server_addr().to_ip().expect("ip addr").port();
    let responder = thread::spawn(move || {
        let request = server.recv().expect("request");
        let url = request.url().to_string();
        let auth = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("Authorization"))
            .map(|header| header.value.as_str().to_string());
        let response = Response::from_string(BODY).with_header(
            Header::from_bytes("Content-Type", "application/json").expect("valid header"),
        );
        request.respond(response).expect("respond");
        (url, auth)
    });

    let client = CdnClient::with_endpoint(
        format!("http://127.0.0.1:{port}/spaces/s/environments/master/entries"),
        "secret-token",
    );
    let collection = client
        .fetch_entries(&PageQuery::home())
        .expect("fetch entries");
    let (url, auth) = responder.join().expect("responder thread");

    assert_eq!(collection.items.len(), 1);
    assert_eq!(collection.items[0].fields.text("title").as_deref(), Some("Home"));
    assert_eq!(auth.as_deref(), Some("Bearer secret-token"));
    assert!(url.starts_with("/spaces/s/environments/master/entries?"));
    assert!(url.contains("content_type=deluxePage"));
    assert!(url.contains("fields.slug=home"));
    assert!(url.contains("include=5"));
    assert!(url.contains("limit=1"));
}

#[test]
fn upstream_error_status_is_an_error() {
    let server = Server::http("127.0.0.1:0").expect("bind");
    let port = server.server_addr().to_ip().expect("ip addr").port();
    let responder = thread::spawn(move || {
        let request = server.recv().expect("request");
        request
            .respond(Response::from_string("nope").with_status_code(StatusCode(401)))
            .expect("respond");
    });

    let client = CdnClient::with_endpoint(format!("http://127.0.0.1:{port}/entries"), "bad");
    let result = client.fetch_entries(&PageQuery::home());
    responder.join().expect("responder thread");
    assert!(result.is_err());
}
