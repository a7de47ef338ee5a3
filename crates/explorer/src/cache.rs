use std::{collections::HashMap, fmt, marker::PhantomData};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A type that can live in the normalised cache.
pub trait Model {
	/// Unique name of the model, the `__type` of its nodes.
	fn name() -> &'static str;
}

/// A single entity as sent by the backend next to a query result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheNode {
	#[serde(rename = "__type")]
	pub type_name: String,
	#[serde(rename = "__id")]
	pub id: String,
	#[serde(flatten)]
	pub node: Value,
}

impl CacheNode {
	pub fn new<T: Model + Serialize>(id: impl fmt::Display, node: &T) -> Result<Self, CacheError> {
		Ok(Self {
			type_name: T::name().to_string(),
			id: id.to_string(),
			node: serde_json::to_value(node).map_err(CacheError::Encode)?,
		})
	}
}

/// Points at a [`CacheNode`] of model `T`.
#[derive(Serialize, Deserialize)]
pub struct Reference<T> {
	#[serde(rename = "__type")]
	pub type_name: String,
	#[serde(rename = "__id")]
	pub id: String,
	#[serde(skip)]
	phantom: PhantomData<T>,
}

impl<T: Model> Reference<T> {
	pub fn new(id: impl fmt::Display) -> Self {
		Self {
			type_name: T::name().to_string(),
			id: id.to_string(),
			phantom: PhantomData,
		}
	}
}

impl<T> Clone for Reference<T> {
	fn clone(&self) -> Self {
		Self {
			type_name: self.type_name.clone(),
			id: self.id.clone(),
			phantom: PhantomData,
		}
	}
}

impl<T> fmt::Debug for Reference<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Reference")
			.field("type_name", &self.type_name)
			.field("id", &self.id)
			.finish()
	}
}

impl<T> PartialEq for Reference<T> {
	fn eq(&self, other: &Self) -> bool {
		self.type_name == other.type_name && self.id == other.id
	}
}

/// A query result whose entity was split off into cache nodes.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NormalisedResult<T> {
	pub item: Reference<T>,
	pub nodes: Vec<CacheNode>,
}

impl<T: Model + Serialize> NormalisedResult<T> {
	pub fn from_item(id: impl fmt::Display, item: &T) -> Result<Self, CacheError> {
		let node = CacheNode::new(&id, item)?;

		Ok(Self {
			item: Reference::new(id),
			nodes: vec![node],
		})
	}
}

#[derive(Debug, Error)]
pub enum CacheError {
	#[error("no cached node for <type='{type_name}', id='{id}'>")]
	Missing { type_name: String, id: String },
	#[error("failed to encode cache node: {0}")]
	Encode(#[source] serde_json::Error),
	#[error("cached node <type='{type_name}', id='{id}'> doesn't match its model: {source}")]
	Decode {
		type_name: String,
		id: String,
		#[source]
		source: serde_json::Error,
	},
}

/// Entity store shared by the views. Nodes must be registered before a reference to them is
/// dereferenced.
#[derive(Debug, Default, Clone)]
pub struct NormalisedCache {
	nodes: HashMap<(String, String), Value>,
}

impl NormalisedCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_nodes(&mut self, nodes: impl IntoIterator<Item = CacheNode>) {
		self.nodes.extend(
			nodes
				.into_iter()
				.map(|CacheNode { type_name, id, node }| ((type_name, id), node)),
		);
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn get<T: DeserializeOwned>(&self, reference: &Reference<T>) -> Result<T, CacheError> {
		let node = self
			.nodes
			.get(&(reference.type_name.clone(), reference.id.clone()))
			.ok_or_else(|| CacheError::Missing {
				type_name: reference.type_name.clone(),
				id: reference.id.clone(),
			})?;

		serde_json::from_value(node.clone()).map_err(|source| CacheError::Decode {
			type_name: reference.type_name.clone(),
			id: reference.id.clone(),
			source,
		})
	}

	/// Registers the result's nodes, then resolves its item.
	pub fn resolve<T: DeserializeOwned>(
		&mut self,
		NormalisedResult { item, nodes }: NormalisedResult<T>,
	) -> Result<T, CacheError> {
		self.with_nodes(nodes);
		self.get(&item)
	}
}
