//! Map markers for tips with coordinates

use serde::Serialize;

use crate::models::{Coordinates, Tip, TipId};

/// Initial map centre (New Delhi)
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 28.6139,
    lng: 77.2090,
};

/// One pin on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub tip_id: TipId,
    pub coordinates: Coordinates,
    pub icon: &'static str,
    /// Popup text: icon and origin, destination, cost
    pub label: String,
    pub active: bool,
}

/// Markers for every tip that has coordinates, in collection order
pub fn markers(tips: &[Tip], active: Option<TipId>) -> Vec<MapMarker> {
    tips.iter()
        .filter_map(|tip| {
            let coordinates = tip.coordinates?;
            let icon = tip.transport_mode.icon();
            Some(MapMarker {
                tip_id: tip.id,
                coordinates,
                icon,
                label: format!(
                    "{} {} → {} ({})",
                    icon, tip.origin, tip.destination, tip.estimated_cost
                ),
                active: active == Some(tip.id),
            })
        })
        .collect()
}
