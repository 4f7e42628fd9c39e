//! Map layer widgets mirrored to a Leaflet renderer.
//!
//! Each widget is a thin field catalog on top of `leafwire-state`:
//!
//! ```text
//! WidgetBase
//!   └── LayerBase
//!         ├── RasterLayerBase ── Heatmap
//!         ├── PathBase ───────── Polyline
//!         └── LayerGroup (children: ChildList)
//! ```
//!
//! Inherited fields are reached through `Deref`, so
//! `heatmap.opacity.set(0.5)` works on a [`Heatmap`].

pub mod base;
pub mod config;
pub mod constants;
pub mod factory;
pub mod heatmap;
pub mod layer;
pub mod layer_group;
pub mod polyline;

pub use base::WidgetBase;
pub use config::{ConfigError, WidgetConfig};
pub use factory::{Catalog, WidgetFactory};
pub use heatmap::{Heatmap, WeightedPoint, default_gradient};
pub use layer::{Layer, LayerBase, PathBase, RasterLayerBase};
pub use layer_group::LayerGroup;
pub use polyline::{LatLng, Polyline};
