pub mod controller;
pub mod features;
pub mod geo;
pub mod map;
pub mod settings;
pub mod style;
pub mod sync;
pub mod themes;

pub use controller::{ChangeCallback, OverlayState, SurfaceSlot, VisibilityController, VisibilitySurface};
pub use features::{FEATURES, Feature, FeatureTarget};
pub use geo::{Coordinate, CoordinateTransform, Crs};
pub use map::{HostMapView, OverlayMapView, restyle};
pub use settings::{KeyValueStore, MemoryStore, OverlaySettings, SettingsStore, StoreError};
pub use sync::{PositionSynchronizer, SyncOutcome};
pub use themes::Theme;
