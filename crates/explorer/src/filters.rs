use crate::{
	entity::ExplorerKind,
	route::RouteState,
	search::{state::SearchState, FilePathFilterArgs, SearchFilterArgs},
	settings::ExplorerSettings,
};

/// Whether the listing should recurse below the current directory.
///
/// True for an active free text search, for structured filters other than the scope
/// defaults, or for the media layout when it's configured to include descendants.
pub fn include_descendants<TOrder>(
	search: &SearchState,
	default_filters: &[SearchFilterArgs],
	settings: &ExplorerSettings<TOrder>,
) -> bool {
	search.has_search_term()
		|| search.filters_differ_from(default_filters)
		|| settings.media_with_descendants()
}

/// Composes the clause sequence sent to the search service.
///
/// Clause order is fixed: scope (or the search filters replacing it), then the path clause
/// for locations, then hidden file exclusion.
pub fn build_filters<K: ExplorerKind>(
	entity: &K::Entity,
	search: &SearchState,
	settings: &ExplorerSettings<K::Order>,
	route: &RouteState,
) -> Vec<SearchFilterArgs> {
	let default_filters = K::scope_filters(entity);

	let search_filters = search.all_filters();

	let include_descendants = include_descendants(search, &default_filters, settings);

	let mut filters = if search_filters.is_empty() {
		default_filters
	} else {
		search_filters
	};

	filters.extend(K::path_filter(entity, route, include_descendants));

	if !settings.show_hidden_files {
		filters.push(SearchFilterArgs::FilePath(FilePathFilterArgs::Hidden(false)));
	}

	filters
}
