//! Reference data: standard container types, filler archetypes and the colour
//! palette used to tell cargo lines apart.

use std::collections::HashMap;

use crate::model::{CargoItem, CargoTemplate, Container, PackagingType};

/// Palette cycled through by cargo line position.
pub const CARGO_COLORS: [&str; 12] = [
    "#ef4444", "#f97316", "#eab308", "#84cc16", "#22c55e", "#14b8a6", "#06b6d4", "#3b82f6",
    "#8b5cf6", "#d946ef", "#ec4899", "#78716c",
];

/// Colour of hypothetical filler placements. Not part of `CARGO_COLORS`.
pub const FILLER_COLOR: &str = "#f43f5e";

/// Colour for units whose item is missing from the colour map.
pub const FALLBACK_COLOR: &str = "#ffffff";

/// Colour per originating item id, fixed for one planning run.
#[derive(Clone, Debug, Default)]
pub struct ColorMap {
    colors: HashMap<String, &'static str>,
}

impl ColorMap {
    /// Assigns palette colours by position in the cargo list.
    ///
    /// A repeated id keeps the colour of its last occurrence.
    pub fn for_items(items: &[CargoItem]) -> Self {
        let colors = items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.id.clone(), CARGO_COLORS[index % CARGO_COLORS.len()]))
            .collect();
        Self { colors }
    }

    pub fn color_of(&self, item_id: &str) -> &'static str {
        self.colors.get(item_id).copied().unwrap_or(FALLBACK_COLOR)
    }
}

/// Standard ISO container types plus a generic custom box.
pub fn container_presets() -> Vec<Container> {
    vec![
        Container::new("20GP", "20' GP", (5898.0, 2352.0, 2393.0), 28200.0),
        Container::new("40GP", "40' GP", (12032.0, 2352.0, 2393.0), 28800.0),
        Container::new("40HQ", "40' HQ", (12032.0, 2352.0, 2698.0), 28600.0),
        Container::new("custom", "Custom", (12000.0, 2400.0, 2500.0), 30000.0),
    ]
}

fn archetype(
    name: &str,
    dims: (f64, f64, f64),
    weight: f64,
    packaging: PackagingType,
) -> CargoTemplate {
    CargoTemplate {
        name: name.to_string(),
        length: dims.0,
        width: dims.1,
        height: dims.2,
        weight,
        is_fragile: false,
        packaging,
    }
}

/// Standard pallets, wooden boxes and bundles tried by the filler analysis.
pub fn filler_catalog() -> Vec<CargoTemplate> {
    use PackagingType::{Bundle, Pallet, WoodenBox};

    vec![
        archetype("S2008 Pallet 1#", (2500.0, 1850.0, 1570.0), 828.0, Pallet),
        archetype("S2008 Pallet 2#", (2500.0, 1850.0, 1500.0), 702.0, Pallet),
        archetype("S2008 Pallet 3/4#", (1850.0, 1500.0, 1560.0), 690.0, Pallet),
        archetype("S2008 Pallet 5#", (1600.0, 1500.0, 960.0), 408.0, Pallet),
        archetype("S2008-15 Wooden Box 6#", (850.0, 850.0, 760.0), 335.0, WoodenBox),
        archetype("S2008-10 Wooden Box 7#", (1130.0, 800.0, 1010.0), 1061.0, WoodenBox),
        archetype("S2008 Pallet 8#", (2460.0, 1860.0, 1000.0), 2130.0, Pallet),
        archetype("S2008-1 Pallet 9#", (2460.0, 1860.0, 1000.0), 2160.0, Pallet),
        archetype("S2008-2/3 Pallet 10#", (2460.0, 1860.0, 780.0), 1952.0, Pallet),
        archetype("S2008-9 Pallet 11#", (5900.0, 1000.0, 300.0), 1200.0, Pallet),
        archetype("S2008-8 Bundle 12#", (6000.0, 275.0, 275.0), 540.0, Bundle),
    ]
}
