//! Uploaded asset storage
//!
//! Assets live in memory for the lifetime of the process. Generated HTML
//! refers to them by URL while editing; the exporter resolves them by id.

use std::collections::HashMap;
use std::sync::Arc;

use design2web_pipeline::{AssetRef, AssetSource, PipelineError};
use parking_lot::RwLock;

use crate::constants::routes::ASSET_URL_PREFIX;

/// One uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct AssetStore {
    assets: RwLock<HashMap<String, Arc<StoredAsset>>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an asset under a fresh id and return its handle
    pub fn insert(
        &self,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> AssetRef {
        let id = uuid::Uuid::new_v4().to_string();
        let asset = StoredAsset {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        };
        log::debug!("Stored asset {} ({} bytes)", id, asset.bytes.len());
        self.assets.write().insert(id.clone(), Arc::new(asset));
        AssetRef {
            url: format!("{}{}", ASSET_URL_PREFIX, id),
            id,
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<StoredAsset>> {
        self.assets.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<StoredAsset>> {
        self.assets.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }
}

impl AssetSource for AssetStore {
    fn fetch(&self, asset: &AssetRef) -> design2web_pipeline::Result<Vec<u8>> {
        self.get(&asset.id)
            .map(|stored| stored.bytes.clone())
            .ok_or_else(|| PipelineError::asset_fetch(format!("unknown asset {}", asset.id)))
    }
}
