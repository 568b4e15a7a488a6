//! Map objects: transient annotations (pins, track markers, overlays) shown on the map.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default marker color (opaque dark blue, ARGB).
pub const DEFAULT_COLOR: u32 = 0xFF0D_47A1;

/// Decoded image data attached to a map object.
///
/// Bitmaps are the heavyweight part of a map object; the registry detaches
/// them when the object is unregistered so that lingering references to the
/// object no longer pin the pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Raw pixel bytes
    pub pixels: Arc<[u8]>,
}

impl Bitmap {
    /// Create a bitmap from raw pixel bytes.
    pub fn new(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

/// A single map annotation.
///
/// The identifier is 0 until the object is registered; after that the
/// object is shared as `Arc<MapObject>` and only its bitmap can change.
#[derive(Debug)]
pub struct MapObject {
    pub(crate) id: i64,
    name: String,
    description: Option<String>,
    latitude: f64,
    longitude: f64,
    marker: Option<String>,
    color: u32,
    bitmap: Mutex<Option<Arc<Bitmap>>>,
}

impl MapObject {
    /// Create an unregistered map object at the given coordinates.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: None,
            latitude,
            longitude,
            marker: None,
            color: DEFAULT_COLOR,
            bitmap: Mutex::new(None),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the marker icon name.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Set the ARGB color.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Attach a bitmap.
    pub fn with_bitmap(self, bitmap: Bitmap) -> Self {
        self.set_bitmap(Some(Arc::new(bitmap)));
        self
    }

    /// Registry identifier, 0 while unregistered.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Whether the object has been assigned an identifier.
    pub fn is_registered(&self) -> bool {
        self.id != 0
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    /// Currently attached bitmap, if any.
    pub fn bitmap(&self) -> Option<Arc<Bitmap>> {
        self.bitmap_slot().clone()
    }

    /// Replace the attached bitmap.
    pub fn set_bitmap(&self, bitmap: Option<Arc<Bitmap>>) {
        *self.bitmap_slot() = bitmap;
    }

    /// Detach the bitmap, returning it if one was attached.
    pub(crate) fn release_bitmap(&self) -> Option<Arc<Bitmap>> {
        self.bitmap_slot().take()
    }

    fn bitmap_slot(&self) -> MutexGuard<'_, Option<Arc<Bitmap>>> {
        self.bitmap.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
