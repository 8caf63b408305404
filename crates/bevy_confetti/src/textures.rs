use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a textured particle type gets its image from.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum TextureRef {
    /// A path resolved through the [`AssetServer`].
    Asset(String),
    /// An image that already lives in [`Assets<Image>`], e.g. one generated at runtime.
    #[serde(skip)]
    Handle(Handle<Image>),
}

impl TextureRef {
    /// Resolves the reference to an image handle. An empty path yields the
    /// default handle.
    pub fn load(&self, asset_server: &AssetServer) -> Handle<Image> {
        match self {
            Self::Asset(path) if !path.is_empty() => asset_server.load(path),
            Self::Handle(handle) => handle.clone(),
            _ => Handle::default(),
        }
    }
}

impl From<Handle<Image>> for TextureRef {
    fn from(handle: Handle<Image>) -> Self {
        Self::Handle(handle)
    }
}
