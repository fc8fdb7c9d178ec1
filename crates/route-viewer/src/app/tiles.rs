//! Walkers tile sources backed by [`TileLayer`] definitions

use crate::app::state::TilesProvider;
use route_overlay_lib::TileLayer;
use walkers::TileId;
use walkers::sources::{Attribution, TileSource};

/// Tile source serving one provider's layer
pub struct LayerSource {
    layer: TileLayer,
    attribution_url: &'static str,
}

impl LayerSource {
    pub fn new(provider: TilesProvider) -> Self {
        Self {
            layer: provider.layer(),
            attribution_url: provider.attribution_url(),
        }
    }
}

impl TileSource for LayerSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.layer.tile_url(tile_id.zoom, tile_id.x, tile_id.y)
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: self.layer.attribution,
            url: self.attribution_url,
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        self.layer.max_zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topo_source() {
        let source = LayerSource::new(TilesProvider::OpenTopoMap);
        let url = source.tile_url(TileId {
            x: 1,
            y: 1,
            zoom: 2,
        });
        assert_eq!(url, "https://c.tile.opentopomap.org/2/1/1.png");
        assert_eq!(source.max_zoom(), 17);
        assert_eq!(source.attribution().text, "© OpenTopoMap (CC-BY-SA)");
    }
}
