use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use wasm_bindgen::JsValue;

use super::conversation::ConversationState;
use super::error::StorageError;

/// Durable conversation store keyed by conversation id.
pub trait ConversationStorage {
	/// Writes one conversation, replacing any earlier copy.
	fn save(&mut self, id: &str, state: &ConversationState) -> Result<(), StorageError>;
	/// Every stored conversation by id.
	fn load_all(&self) -> Result<BTreeMap<String, ConversationState>, StorageError>;
	/// Removes a conversation. Missing ids are not an error.
	fn delete(&mut self, id: &str) -> Result<(), StorageError>;
}

/// All conversations as one JSON object under a single browser
/// `localStorage` key.
#[derive(Clone, Debug)]
pub struct BrowserStorage {
	key: String,
}

impl BrowserStorage {
	/// Storage under the given `localStorage` key.
	pub fn new(key: impl Into<String>) -> Self {
		Self { key: key.into() }
	}

	fn backend() -> Result<web_sys::Storage, StorageError> {
		web_sys::window()
			.ok_or(StorageError::Unavailable)?
			.local_storage()
			.map_err(js_error)?
			.ok_or(StorageError::Unavailable)
	}

	fn read(&self) -> Result<BTreeMap<String, ConversationState>, StorageError> {
		match Self::backend()?.get_item(&self.key).map_err(js_error)? {
			Some(text) => Ok(serde_json::from_str(&text)?),
			None => Ok(BTreeMap::new()),
		}
	}

	fn write(&self, all: &BTreeMap<String, ConversationState>) -> Result<(), StorageError> {
		let text = serde_json::to_string(all)?;
		Self::backend()?.set_item(&self.key, &text).map_err(js_error)
	}
}

impl ConversationStorage for BrowserStorage {
	fn save(&mut self, id: &str, state: &ConversationState) -> Result<(), StorageError> {
		let mut all = self.read()?;
		all.insert(id.to_owned(), state.clone());
		self.write(&all)
	}

	fn load_all(&self) -> Result<BTreeMap<String, ConversationState>, StorageError> {
		self.read()
	}

	fn delete(&mut self, id: &str) -> Result<(), StorageError> {
		let mut all = self.read()?;
		if all.remove(id).is_some() {
			self.write(&all)?;
		}
		Ok(())
	}
}

fn js_error(value: JsValue) -> StorageError {
	StorageError::Backend(format!("{value:?}"))
}

/// In-process storage. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
	entries: Rc<RefCell<BTreeMap<String, ConversationState>>>,
}

impl MemoryStorage {
	/// Empty storage.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stored state for `id`.
	pub fn get(&self, id: &str) -> Option<ConversationState> {
		self.entries.borrow().get(id).cloned()
	}

	/// Stored ids, sorted.
	pub fn ids(&self) -> Vec<String> {
		self.entries.borrow().keys().cloned().collect()
	}
}

impl ConversationStorage for MemoryStorage {
	fn save(&mut self, id: &str, state: &ConversationState) -> Result<(), StorageError> {
		self.entries.borrow_mut().insert(id.to_owned(), state.clone());
		Ok(())
	}

	fn load_all(&self) -> Result<BTreeMap<String, ConversationState>, StorageError> {
		Ok(self.entries.borrow().clone())
	}

	fn delete(&mut self, id: &str) -> Result<(), StorageError> {
		self.entries.borrow_mut().remove(id);
		Ok(())
	}
}
