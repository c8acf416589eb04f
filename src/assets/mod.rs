//! Asynchronous asset loading and the `Pending / Ready / Failed` resource state.

pub mod store;
pub mod text;

pub use store::{
    AssetLoader, AssetRequests, FontAsset, Resource, SceneAssets, normalize_rel_path,
};
pub use text::{TextBrushRgba8, TextLayoutEngine};
