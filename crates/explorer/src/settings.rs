use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{entity::ExplorerKind, preferences::LibraryPreferences};

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ExplorerLayout {
	#[default]
	Grid,
	List,
	Media,
	Columns,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DoubleClickAction {
	#[default]
	OpenFile,
	QuickPreview,
}

/// Fully populated explorer configuration used to render and query a view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerSettings<TOrder> {
	pub layout_mode: ExplorerLayout,
	pub grid_item_size: u16,
	pub grid_gap: u16,
	pub show_bytes_in_grid_view: bool,
	pub show_hidden_files: bool,
	pub media_columns: u16,
	pub media_aspect_square: bool,
	pub media_view_with_descendants: bool,
	pub open_on_double_click: DoubleClickAction,
	pub col_sizes: BTreeMap<String, u32>,
	pub order: Option<TOrder>,
}

impl<TOrder> ExplorerSettings<TOrder> {
	pub fn with_order(order: Option<TOrder>) -> Self {
		Self {
			layout_mode: ExplorerLayout::Grid,
			grid_item_size: 110,
			grid_gap: 7,
			show_bytes_in_grid_view: true,
			show_hidden_files: false,
			media_columns: 8,
			media_aspect_square: false,
			media_view_with_descendants: true,
			open_on_double_click: DoubleClickAction::OpenFile,
			col_sizes: BTreeMap::new(),
			order,
		}
	}

	/// Whether the media layout should list everything below the current directory.
	pub fn media_with_descendants(&self) -> bool {
		self.layout_mode == ExplorerLayout::Media && self.media_view_with_descendants
	}

	/// Overwrites every field present in `fragment`. Absent (or `null`) fields keep their value.
	#[must_use]
	pub fn merge(mut self, fragment: ExplorerSettingsFragment<TOrder>) -> Self {
		let ExplorerSettingsFragment {
			layout_mode,
			grid_item_size,
			grid_gap,
			show_bytes_in_grid_view,
			show_hidden_files,
			media_columns,
			media_aspect_square,
			media_view_with_descendants,
			open_on_double_click,
			col_sizes,
			order,
		} = fragment;

		macro_rules! merge_fields {
			($this:expr; $($field:ident),+ $(,)?) => {$(
				if let Some(value) = $field {
					$this.$field = value;
				}
			)+};
		}

		merge_fields!(
			self;
			layout_mode,
			grid_item_size,
			grid_gap,
			show_bytes_in_grid_view,
			show_hidden_files,
			media_columns,
			media_aspect_square,
			media_view_with_descendants,
			open_on_double_click,
			col_sizes,
		);

		if let Some(order) = order {
			self.order = Some(order);
		}

		self
	}
}

/// Persisted, possibly partial, explorer settings. A `None` (stored as `null` or missing)
/// means "use the default".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerSettingsFragment<TOrder> {
	pub layout_mode: Option<ExplorerLayout>,
	pub grid_item_size: Option<u16>,
	pub grid_gap: Option<u16>,
	pub show_bytes_in_grid_view: Option<bool>,
	pub show_hidden_files: Option<bool>,
	pub media_columns: Option<u16>,
	pub media_aspect_square: Option<bool>,
	pub media_view_with_descendants: Option<bool>,
	pub open_on_double_click: Option<DoubleClickAction>,
	pub col_sizes: Option<BTreeMap<String, u32>>,
	pub order: Option<TOrder>,
}

impl<TOrder> Default for ExplorerSettingsFragment<TOrder> {
	fn default() -> Self {
		Self {
			layout_mode: None,
			grid_item_size: None,
			grid_gap: None,
			show_bytes_in_grid_view: None,
			show_hidden_files: None,
			media_columns: None,
			media_aspect_square: None,
			media_view_with_descendants: None,
			open_on_double_click: None,
			col_sizes: None,
			order: None,
		}
	}
}

impl<TOrder> From<ExplorerSettings<TOrder>> for ExplorerSettingsFragment<TOrder> {
	fn from(settings: ExplorerSettings<TOrder>) -> Self {
		let ExplorerSettings {
			layout_mode,
			grid_item_size,
			grid_gap,
			show_bytes_in_grid_view,
			show_hidden_files,
			media_columns,
			media_aspect_square,
			media_view_with_descendants,
			open_on_double_click,
			col_sizes,
			order,
		} = settings;

		Self {
			layout_mode: Some(layout_mode),
			grid_item_size: Some(grid_item_size),
			grid_gap: Some(grid_gap),
			show_bytes_in_grid_view: Some(show_bytes_in_grid_view),
			show_hidden_files: Some(show_hidden_files),
			media_columns: Some(media_columns),
			media_aspect_square: Some(media_aspect_square),
			media_view_with_descendants: Some(media_view_with_descendants),
			open_on_double_click: Some(open_on_double_click),
			col_sizes: Some(col_sizes),
			order,
		}
	}
}

/// Effective settings for `entity`: the kind's defaults with the persisted fragment on top.
///
/// Until the entity or the preferences are known, the defaults are returned unchanged.
pub fn resolve_settings<K: ExplorerKind>(
	entity: Option<&K::Entity>,
	preferences: Option<&LibraryPreferences>,
) -> ExplorerSettings<K::Order> {
	let defaults = K::default_settings();

	let (Some(entity), Some(preferences)) = (entity, preferences) else {
		return defaults;
	};

	match K::stored_fragment(preferences, entity) {
		Some(fragment) => defaults.merge(fragment.clone()),
		None => defaults,
	}
}
