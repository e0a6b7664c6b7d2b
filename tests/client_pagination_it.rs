// crates.io
use httpmock::prelude::*;
// self
use fhir_rest_client::{
	_preludet::*,
	auth::AuthStrategy,
	client::{DeleteMode, DeleteResponse},
	error::ProtocolError,
	pagination::LinkRelation,
};

#[test]
fn search_envelope_populates_links_and_total() {
	let server = MockServer::start();
	let search = server.mock(|when, then| {
		when.method(GET).path("/fhir/Patient").query_param("name", "Smith");
		then.status(200).header("content-type", "application/fhir+json").body(
			r#"{"resourceType":"Bundle","total":42,"link":[
				{"relation":"self","url":"/Patient?page=2"},
				{"relation":"next","url":"/Patient?page=3"}
			]}"#,
		);
	});
	let mut client = build_reqwest_test_client(&server.url("/fhir"), None);
	let body = client.get("Patient", &[("name", "Smith")]).expect("Search should succeed.");

	assert_eq!(body["resourceType"], "Bundle");
	assert!(client.has_self());
	assert!(client.has_next());
	assert!(!client.has_previous());
	assert_eq!(client.total(), Some(42));
	assert_eq!(client.pagination().link(LinkRelation::Next), Some("/Patient?page=3"));

	search.assert();
}

#[test]
fn later_page_without_next_clears_the_stale_link() {
	let server = MockServer::start();
	let first = server.mock(|when, then| {
		when.method(GET).path("/fhir/Observation").query_param("page", "1");
		then.status(200).body(
			r#"{"total":2,"link":[
				{"relation":"self","url":"Observation?page=1"},
				{"relation":"next","url":"Observation?page=2"}
			]}"#,
		);
	});
	let second = server.mock(|when, then| {
		when.method(GET).path("/fhir/Observation").query_param("page", "2");
		then.status(200).body(
			r#"{"link":[
				{"relation":"self","url":"Observation?page=2"},
				{"relation":"previous","url":"Observation?page=1"}
			]}"#,
		);
	});
	let mut client = build_reqwest_test_client(&server.url("/fhir"), None);

	client.get("Observation", &[("page", "1")]).expect("First page should load.");

	assert!(client.has_next());

	let page = client.next_page().expect("Next page should load.");

	assert!(page.is_some());
	assert!(!client.has_next());
	assert!(client.has_previous());
	assert!(client.has_self());
	// The second page omits `total`, so the running total is kept.
	assert_eq!(client.total(), Some(2));

	first.assert_calls(1);
	second.assert_calls(1);
}

#[test]
fn responses_without_links_keep_pagination_state() {
	let server = MockServer::start();

	server.mock(|when, then| {
		when.method(GET).path("/fhir/Patient");
		then.status(200).body(
			r#"{"total":5,"link":[{"relation":"next","url":"Patient?page=2"}]}"#,
		);
	});
	server.mock(|when, then| {
		when.method(GET).path("/fhir/Patient/7");
		then.status(200).body(r#"{"resourceType":"Patient","id":"7"}"#);
	});

	let mut client = build_reqwest_test_client(&server.url("/fhir"), None);

	client.get("Patient", &[]).expect("Search should succeed.");

	let before = client.pagination().clone();

	client.get("Patient/7", &[]).expect("Read should succeed.");

	assert_eq!(client.pagination(), &before);
	assert_eq!(client.total(), Some(5));
}

#[test]
fn next_page_is_none_without_a_next_link() {
	// Nothing listens on port 9, so any request would fail.
	let mut client = build_reqwest_test_client("http://127.0.0.1:9/fhir", None);

	assert!(client.next_page().expect("Missing link is not an error.").is_none());
	assert!(client.previous_page().expect("Missing link is not an error.").is_none());
	assert!(client.self_page().expect("Missing link is not an error.").is_none());
}

#[test]
fn non_json_body_is_a_protocol_error() {
	let server = MockServer::start();

	server.mock(|when, then| {
		when.method(GET).path("/fhir/Patient/1");
		then.status(502).header("content-type", "text/html").body("<html>Bad Gateway</html>");
	});

	let mut client = build_reqwest_test_client(&server.url("/fhir"), None);
	let err = client.get("Patient/1", &[]).expect_err("HTML bodies must not parse.");

	assert!(matches!(err, Error::Protocol(ProtocolError::InvalidJson { status: 502, .. })));
}

#[test]
fn basic_auth_and_default_headers_are_sent() {
	let server = MockServer::start();
	let create = server.mock(|when, then| {
		when.method(POST)
			.path("/fhir/Patient")
			.header("authorization", "Basic dXNlcjpwYXNz")
			.header("content-type", "application/fhir+json")
			.json_body(serde_json::json!({ "resourceType": "Patient", "active": true }));
		then.status(201).body(r#"{"resourceType":"Patient","id":"new"}"#);
	});
	let auth = AuthStrategy::basic("user", "pass").expect("Basic credentials should be valid.");
	let mut client = build_reqwest_test_client(&server.url("/fhir"), Some(auth));
	let body = client
		.post("Patient", &serde_json::json!({ "resourceType": "Patient", "active": true }), &[])
		.expect("Create should succeed.");

	assert_eq!(body["id"], "new");

	create.assert();
}

#[test]
fn put_and_delete_follow_the_configured_modes() {
	let server = MockServer::start();
	let update = server.mock(|when, then| {
		when.method(PUT).path("/fhir/Patient/9");
		then.status(200).body(r#"{"resourceType":"Patient","id":"9","active":false}"#);
	});
	let remove = server.mock(|when, then| {
		when.method(DELETE).path("/fhir/Patient/9");
		then.status(204);
	});
	let mut client = reqwest_test_client_builder(&server.url("/fhir"))
		.delete_mode(DeleteMode::Status)
		.header("Content-Type", "application/json")
		.build()
		.expect("Client should build.");
	let body = client
		.put("Patient/9", &serde_json::json!({ "resourceType": "Patient", "id": "9" }), &[])
		.expect("Update should succeed.");

	assert_eq!(body["active"], false);

	let deleted = client.delete("Patient/9", &[]).expect("Delete should succeed.");

	assert_eq!(deleted, DeleteResponse::Status(StatusCode::NO_CONTENT));

	update.assert();
	remove.assert();
}

#[test]
fn transport_failures_surface_unmodified() {
	let mut client = build_reqwest_test_client("http://127.0.0.1:9/fhir", None);
	let err = client.get("Patient/1", &[]).expect_err("Connection should be refused.");

	assert!(matches!(err, Error::Transport(_)));
}
