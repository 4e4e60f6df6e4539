//! Built-in backdrop style presets.
//!
//! The catalog is a fixed, ordered slice of [`StylePreset`] values. The view layer lists them
//! as quick-selection tiles and the controller resolves the selected id to the preset's
//! description, which becomes the style text sent to the image model.
//!
//! ```rust
//! use styleswap::presets::{find_preset, BACKDROP_PRESETS};
//!
//! assert_eq!(BACKDROP_PRESETS.len(), 5);
//! let preset = find_preset("rustic_kitchen").unwrap();
//! assert_eq!(preset.name, "Rustic Kitchen");
//! ```

/// A named, pre-authored background description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePreset {
    /// Stable identifier, unique within [`BACKDROP_PRESETS`].
    pub id: &'static str,
    /// Display name shown on the tile.
    pub name: &'static str,
    /// Style text handed to the image model when this preset is active.
    pub description: &'static str,
    /// Icon symbol reference for the tile.
    pub icon: &'static str,
}

pub const BACKDROP_PRESETS: &[StylePreset] = &[
    StylePreset {
        id: "boho_artisan",
        name: "Boho Artisan",
        description: "A warm, textured setting with macrame, dried pampas grass, and soft golden-hour light on a reclaimed wood surface.",
        icon: "sun",
    },
    StylePreset {
        id: "modern_farmhouse",
        name: "Modern Farmhouse",
        description: "A clean, rustic white-washed wooden table with a sprig of lavender and linen napkins in soft morning light.",
        icon: "home",
    },
    StylePreset {
        id: "botanical_studio",
        name: "Botanical Studio",
        description: "A minimalist scene with terracotta pots, monstera leaves, and organic shadows on a lime-wash plaster wall.",
        icon: "leaf",
    },
    StylePreset {
        id: "scandi_minimalist",
        name: "Scandi Minimalist",
        description: "Light oak wood flooring, a simple ceramic vase, and airy, high-key lighting for a clean, modern boutique look.",
        icon: "cube",
    },
    StylePreset {
        id: "rustic_kitchen",
        name: "Rustic Kitchen",
        description: "A weathered butcher-block counter with copper pans, fresh herbs, and warm window light in a cozy farmhouse kitchen.",
        icon: "utensils",
    },
];

/// The preset selected when a session starts.
pub fn default_preset() -> &'static StylePreset {
    &BACKDROP_PRESETS[0]
}

/// Look up a preset by id.
pub fn find_preset(id: &str) -> Option<&'static StylePreset> {
    BACKDROP_PRESETS.iter().find(|preset| preset.id == id)
}

/// Look up a preset by display name, ignoring ASCII case.
pub fn find_preset_by_name(name: &str) -> Option<&'static StylePreset> {
    BACKDROP_PRESETS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name.trim()))
}
