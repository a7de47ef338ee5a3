use super::{FilePathFilterArgs, SearchFilterArgs, TextMatch};

/// Search state contributed by the search bar: a free text term plus structured filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
	pub search: String,
	pub filters: Vec<SearchFilterArgs>,
	pub open: bool,
}

impl SearchState {
	#[must_use]
	pub fn with_search(mut self, search: impl Into<String>) -> Self {
		self.search = search.into();
		self.open = true;
		self
	}

	#[must_use]
	pub fn with_filters(mut self, filters: impl IntoIterator<Item = SearchFilterArgs>) -> Self {
		self.filters = filters.into_iter().collect();
		self.open = true;
		self
	}

	pub fn has_search_term(&self) -> bool {
		!self.search.is_empty()
	}

	/// Structured filters followed by the free text clause, if any.
	pub fn all_filters(&self) -> Vec<SearchFilterArgs> {
		self.filters
			.iter()
			.cloned()
			.chain((!self.search.is_empty()).then(|| {
				SearchFilterArgs::FilePath(FilePathFilterArgs::Name(TextMatch::Contains(
					self.search.clone(),
				)))
			}))
			.collect()
	}

	/// Whether the structured filters are present and differ from `defaults`.
	pub fn filters_differ_from(&self, defaults: &[SearchFilterArgs]) -> bool {
		!self.filters.is_empty() && self.filters != defaults
	}
}

#[cfg(test)]
mod tests {
	use crate::search::{InOrNotIn, ObjectFilterArgs};

	use super::*;

	#[test]
	fn free_text_is_appended_after_structured_filters() {
		let favorite = SearchFilterArgs::Object(ObjectFilterArgs::Favorite(true));
		let state = SearchState::default()
			.with_filters([favorite.clone()])
			.with_search("cat");

		assert_eq!(
			state.all_filters(),
			vec![
				favorite,
				SearchFilterArgs::FilePath(FilePathFilterArgs::Name(TextMatch::Contains(
					"cat".into()
				)))
			]
		);
	}

	#[test]
	fn inactive_search_contributes_nothing() {
		assert!(SearchState::default().all_filters().is_empty());
	}

	#[test]
	fn default_filters_are_not_a_difference() {
		let defaults = vec![SearchFilterArgs::FilePath(FilePathFilterArgs::Locations(
			InOrNotIn::In(vec![1]),
		))];

		assert!(!SearchState::default().filters_differ_from(&defaults));
		assert!(!SearchState::default()
			.with_filters(defaults.clone())
			.filters_differ_from(&defaults));
		assert!(SearchState::default()
			.with_filters([SearchFilterArgs::FilePath(FilePathFilterArgs::Hidden(true))])
			.filters_differ_from(&defaults));
	}
}
