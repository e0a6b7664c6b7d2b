//! Pagination cursor state derived from FHIR search envelopes.
//!
//! A search response (a `Bundle`) optionally carries `total` and a `link` array of
//! `{relation, url}` objects. [`PaginationState::apply_envelope`] decodes both members first
//! and only then mutates the state, so a malformed envelope never leaves half-updated links.

// self
use crate::{_prelude::*, error::ProtocolError, obs};

/// Link relations tracked by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkRelation {
	/// The page that was just returned.
	SelfLink,
	/// The following page of the result set.
	Next,
	/// The preceding page of the result set.
	Previous,
}
impl LinkRelation {
	/// Returns the FHIR relation string.
	pub const fn as_str(self) -> &'static str {
		match self {
			LinkRelation::SelfLink => "self",
			LinkRelation::Next => "next",
			LinkRelation::Previous => "previous",
		}
	}

	/// Maps a relation string onto a tracked relation; unknown relations yield `None`.
	pub fn parse(relation: &str) -> Option<Self> {
		match relation {
			"self" => Some(LinkRelation::SelfLink),
			"next" => Some(LinkRelation::Next),
			"previous" => Some(LinkRelation::Previous),
			_ => None,
		}
	}
}
impl Display for LinkRelation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One entry of a Bundle's `link` array.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BundleLink {
	/// Relation name such as `self`, `next`, or `previous`.
	pub relation: String,
	/// Target URL, absolute or relative to the server base.
	pub url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
	#[serde(default)]
	total: Option<u64>,
	#[serde(default)]
	link: Option<Vec<BundleLink>>,
}

/// Cursor links and running total observed on the most recent search response.
///
/// Not synchronized: the owning client mutates it through `&mut self`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationState {
	/// Link with relation `self`.
	pub self_link: Option<String>,
	/// Link with relation `next`.
	pub next_link: Option<String>,
	/// Link with relation `previous`.
	pub previous_link: Option<String>,
	/// Result-set size from the last response that reported one.
	pub total: Option<u64>,
}
impl PaginationState {
	/// Returns true when a `next` link is present.
	pub fn has_next(&self) -> bool {
		self.next_link.is_some()
	}

	/// Returns true when a `previous` link is present.
	pub fn has_previous(&self) -> bool {
		self.previous_link.is_some()
	}

	/// Returns true when a `self` link is present.
	pub fn has_self(&self) -> bool {
		self.self_link.is_some()
	}

	/// Returns the stored link for `relation`.
	pub fn link(&self, relation: LinkRelation) -> Option<&str> {
		match relation {
			LinkRelation::SelfLink => self.self_link.as_deref(),
			LinkRelation::Next => self.next_link.as_deref(),
			LinkRelation::Previous => self.previous_link.as_deref(),
		}
	}

	/// Clears all three links, then sets each one found in `links`.
	///
	/// Relations other than `self`/`next`/`previous` are ignored; a repeated relation keeps its
	/// last URL. The running total is untouched.
	pub fn replace_links<'a, I>(&mut self, links: I)
	where
		I: IntoIterator<Item = &'a BundleLink>,
	{
		self.self_link = None;
		self.next_link = None;
		self.previous_link = None;

		for link in links {
			let slot = match LinkRelation::parse(&link.relation) {
				Some(LinkRelation::SelfLink) => &mut self.self_link,
				Some(LinkRelation::Next) => &mut self.next_link,
				Some(LinkRelation::Previous) => &mut self.previous_link,
				None => continue,
			};

			*slot = Some(link.url.clone());
		}

		obs::trace_pagination_update(self.has_self(), self.has_next(), self.has_previous());
	}

	/// Updates the state from a parsed response body.
	///
	/// Non-object bodies and resources other than `Bundle` carry no envelope and leave the
	/// state unchanged. A present `total` overwrites the running total; a present `link` array
	/// replaces all links.
	pub fn apply_envelope(&mut self, body: &Value) -> Result<(), ProtocolError> {
		if !body.is_object() {
			return Ok(());
		}
		// `Patient.link` and friends share the member name but not the shape.
		if body.get("resourceType").and_then(Value::as_str).is_some_and(|kind| kind != "Bundle") {
			return Ok(());
		}

		let envelope: Envelope = serde_path_to_error::deserialize(body)
			.map_err(|source| ProtocolError::MalformedEnvelope { source })?;

		if let Some(total) = envelope.total {
			self.total = Some(total);
		}
		if let Some(links) = envelope.link.as_ref() {
			self.replace_links(links);
		}

		Ok(())
	}
}
