//! The single composition: camera, displaced bubble, typography panel, environment, overlay.

pub mod bubble;
pub mod config;
pub mod overlay;
pub mod root;
pub mod typography;

pub use bubble::{Bubble, BubbleConfig};
pub use config::SceneConfig;
pub use overlay::{Inline, Link, Overlay, OverlayConfig, Placement, Span};
pub use root::{BubbleDraw, Composed, PanelDraw, SceneGraph, SceneRoot};
pub use typography::{FontRole, LINE_1, LINE_2, SIZE, TextNode, TypographyConfig, TypographyPanel};
