//! Demonstrates an OAuth2-signed Patient search that walks every page through the server's
//! `next` links, using a local mock server for both the token endpoint and the FHIR API.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use fhir_rest_client::{auth::AuthStrategy, client::FhirClient};

fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start();
	let token_mock = server.mock(|when, then| {
		when.method(POST).path("/token");
		then.status(200)
			.header("content-type", "application/json")
			.body("{\"access_token\":\"demo-access\",\"token_type\":\"bearer\"}");
	});

	server.mock(|when, then| {
		when.method(GET).path("/fhir/Patient").query_param("family", "Smith");
		then.status(200).header("content-type", "application/fhir+json").body(
			"{\"resourceType\":\"Bundle\",\"total\":2,\"entry\":[{\"resource\":{\"id\":\"a\"}}],\
			 \"link\":[{\"relation\":\"self\",\"url\":\"Patient?family=Smith\"},\
			 {\"relation\":\"next\",\"url\":\"Patient?_getpages=demo&_page=2\"}]}",
		);
	});
	server.mock(|when, then| {
		when.method(GET).path("/fhir/Patient").query_param("_getpages", "demo");
		then.status(200).header("content-type", "application/fhir+json").body(
			"{\"resourceType\":\"Bundle\",\"entry\":[{\"resource\":{\"id\":\"b\"}}],\
			 \"link\":[{\"relation\":\"self\",\"url\":\"Patient?_getpages=demo&_page=2\"},\
			 {\"relation\":\"previous\",\"url\":\"Patient?family=Smith\"}]}",
		);
	});

	let auth = AuthStrategy::oauth2(&server.url("/token"), "demo-client", "super-secret")?;
	let mut client = FhirClient::builder(server.url("/fhir")).auth(auth).build()?;
	let mut page = Some(client.get("Patient", &[("family", "Smith")])?);
	let mut ids = Vec::new();

	while let Some(bundle) = page {
		for entry in bundle["entry"].as_array().into_iter().flatten() {
			if let Some(id) = entry["resource"]["id"].as_str() {
				ids.push(id.to_owned());
			}
		}

		page = client.next_page()?;
	}

	println!("Collected {} of {:?} patients: {ids:?}.", ids.len(), client.total());

	token_mock.assert_calls(2);

	Ok(())
}
