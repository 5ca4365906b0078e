//! Slippy-map view model: center, marker, visible tiles and click handling.

use std::f64::consts::PI;

use crate::{
    config::MapConfig,
    model::{CoordinateError, Location},
};

pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";
pub const DEFAULT_ZOOM: u8 = 10;

const TILE_SIZE: f64 = 256.0;
const MAX_ZOOM: u8 = 22;
/// Web Mercator is undefined at the poles.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;
const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    /// Tile containing `location` at `zoom`.
    pub fn containing(location: Location, zoom: u8) -> Self {
        let zoom = zoom.min(MAX_ZOOM);
        let (px, py) = project(location, zoom);
        tile_at(px, py, zoom)
    }

    /// Expand a `{s}/{z}/{x}/{y}` template for this tile.
    pub fn url(&self, template: &str) -> String {
        let subdomain = SUBDOMAINS[((self.x as u64 + self.y as u64) % SUBDOMAINS.len() as u64) as usize];

        template
            .replace("{s}", subdomain)
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * f64::from(1u32 << zoom)
}

/// Location to absolute world pixel at `zoom`.
fn project(location: Location, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = location.lat().clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();

    let x = (location.lng() + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

/// World pixel back to (lat, lng); x wraps around the antimeridian.
fn unproject(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let x = x.rem_euclid(size);
    let y = y.clamp(0.0, size);

    let lng = x / size * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / size)).sinh().atan().to_degrees();
    (lat, lng)
}

fn tile_at(px: f64, py: f64, zoom: u8) -> TileCoord {
    let n = 1i64 << zoom;
    let x = ((px / TILE_SIZE).floor() as i64).rem_euclid(n);
    let y = ((py / TILE_SIZE).floor() as i64).clamp(0, n - 1);

    TileCoord { x: x as u32, y: y as u32, z: zoom }
}

/// A fixed-size viewport centered on the current location, with a marker there.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    center: Location,
    zoom: u8,
    width: u32,
    height: u32,
    tile_template: String,
}

impl MapView {
    pub fn new(center: Location, zoom: u8, width: u32, height: u32, tile_template: impl Into<String>) -> Self {
        Self {
            center,
            zoom: zoom.min(MAX_ZOOM),
            width,
            height,
            tile_template: tile_template.into(),
        }
    }

    pub fn from_config(center: Location, config: &MapConfig) -> Self {
        Self::new(center, config.zoom, config.width, config.height, config.tile_url.clone())
    }

    pub fn center(&self) -> Location {
        self.center
    }

    /// The marker always sits on the center.
    pub fn marker(&self) -> Location {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn attribution(&self) -> &'static str {
        OSM_ATTRIBUTION
    }

    /// Follow a location change.
    pub fn recenter(&mut self, center: Location) {
        self.center = center;
    }

    pub fn center_tile(&self) -> TileCoord {
        TileCoord::containing(self.center, self.zoom)
    }

    pub fn center_tile_url(&self) -> String {
        self.center_tile().url(&self.tile_template)
    }

    /// Coordinate under a viewport pixel, origin at the top-left corner.
    pub fn location_at(&self, x: f64, y: f64) -> Result<Location, CoordinateError> {
        let (cx, cy) = project(self.center, self.zoom);
        let wx = cx + x - f64::from(self.width) / 2.0;
        let wy = cy + y - f64::from(self.height) / 2.0;

        let (lat, lng) = unproject(wx, wy, self.zoom);
        Location::new(lat, lng)
    }

    /// Viewport pixel of `location`; may fall outside the viewport.
    pub fn pixel_of(&self, location: Location) -> (f64, f64) {
        let (cx, cy) = project(self.center, self.zoom);
        let (px, py) = project(location, self.zoom);
        (
            px - cx + f64::from(self.width) / 2.0,
            py - cy + f64::from(self.height) / 2.0,
        )
    }

    /// Tiles covering the viewport, row by row.
    pub fn visible_tiles(&self) -> Vec<TileCoord> {
        let (cx, cy) = project(self.center, self.zoom);
        let left = cx - f64::from(self.width) / 2.0;
        let top = cy - f64::from(self.height) / 2.0;
        let right = left + f64::from(self.width.max(1)) - 1.0;
        let bottom = top + f64::from(self.height.max(1)) - 1.0;

        let n = 1i64 << self.zoom;
        let x0 = (left / TILE_SIZE).floor() as i64;
        let x1 = (right / TILE_SIZE).floor() as i64;
        let y0 = ((top / TILE_SIZE).floor() as i64).max(0);
        let y1 = ((bottom / TILE_SIZE).floor() as i64).min(n - 1);

        let mut tiles = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let tile = TileCoord { x: x.rem_euclid(n) as u32, y: y as u32, z: self.zoom };
                if !tiles.contains(&tile) {
                    tiles.push(tile);
                }
            }
        }
        tiles
    }

    pub fn visible_tile_urls(&self) -> Vec<String> {
        self.visible_tiles().iter().map(|t| t.url(&self.tile_template)).collect()
    }
}
