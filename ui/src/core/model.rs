//! Contribution model: presets holding human / AI percentages per dimension.

use std::ops::Index;

use super::dimensions::DimensionId;

/// Upper bound for any stored percentage.
pub const MAX_PERCENT: u8 = 100;

/// One percentage per registry dimension.
///
/// Backed by a fixed array so every dimension always has a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contributions([u8; DimensionId::COUNT]);

impl Contributions {
    pub fn uniform(value: u8) -> Self {
        Self([value.min(MAX_PERCENT); DimensionId::COUNT])
    }

    /// Build from values listed in registry order.
    pub fn from_ordered(values: [u8; DimensionId::COUNT]) -> Self {
        Self(values.map(|v| v.min(MAX_PERCENT)))
    }

    pub fn get(&self, dim: DimensionId) -> u8 {
        self.0[dim.index()]
    }

    /// Replace one entry, clamping to `[0, 100]`.
    pub fn set(&mut self, dim: DimensionId, value: u8) {
        self.0[dim.index()] = value.min(MAX_PERCENT);
    }

    pub fn iter(&self) -> impl Iterator<Item = (DimensionId, u8)> + '_ {
        DimensionId::ALL.into_iter().map(|dim| (dim, self.get(dim)))
    }
}

impl Index<DimensionId> for Contributions {
    type Output = u8;

    fn index(&self, dim: DimensionId) -> &u8 {
        &self.0[dim.index()]
    }
}

/// Named, independently stored card contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub title: String,
    pub author: String,
    pub model: String,
    pub date: String,
    pub human: Contributions,
    /// Advisory values proposed by the model. Never edited through the UI.
    pub ai: Contributions,
    /// Dimensions shown on the card. Rendering always follows registry order.
    pub enabled: Vec<DimensionId>,
}

impl Preset {
    pub fn is_enabled(&self, dim: DimensionId) -> bool {
        self.enabled.contains(&dim)
    }

    /// Enabled dimensions in registry order, regardless of the order stored.
    pub fn enabled_in_order(&self) -> impl Iterator<Item = DimensionId> + '_ {
        DimensionId::ALL
            .into_iter()
            .filter(move |dim| self.is_enabled(*dim))
    }

    pub fn example() -> Self {
        Self {
            title: "Example: A Typical AI-Assisted Essay".into(),
            author: "Author Name".into(),
            model: "Model name + version".into(),
            date: "2026".into(),
            ai: Contributions::from_ordered([15, 35, 75, 0, 50, 20]),
            human: Contributions::from_ordered([10, 30, 70, 0, 45, 15]),
            enabled: vec![
                DimensionId::Ideation,
                DimensionId::Research,
                DimensionId::Drafting,
                DimensionId::Editing,
                DimensionId::Review,
            ],
        }
    }

    pub fn custom() -> Self {
        Self {
            title: "My Work Product".into(),
            author: "Author".into(),
            model: "Model name + version".into(),
            date: "2026".into(),
            ai: Contributions::uniform(50),
            human: Contributions::uniform(50),
            enabled: DimensionId::ALL.to_vec(),
        }
    }
}

/// Selector for the built-in presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresetKey {
    Example,
    #[default]
    Custom,
}

impl PresetKey {
    /// Order in which the selector lists presets.
    pub const ALL: [PresetKey; 2] = [PresetKey::Example, PresetKey::Custom];

    pub fn key(self) -> &'static str {
        match self {
            PresetKey::Example => "example",
            PresetKey::Custom => "custom",
        }
    }
}

/// All presets plus the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetBook {
    example: Preset,
    custom: Preset,
    active: PresetKey,
}

impl Default for PresetBook {
    fn default() -> Self {
        Self {
            example: Preset::example(),
            custom: Preset::custom(),
            active: PresetKey::default(),
        }
    }
}

impl PresetBook {
    pub fn active_key(&self) -> PresetKey {
        self.active
    }

    pub fn active(&self) -> &Preset {
        self.get(self.active)
    }

    pub fn get(&self, key: PresetKey) -> &Preset {
        match key {
            PresetKey::Example => &self.example,
            PresetKey::Custom => &self.custom,
        }
    }

    fn get_mut(&mut self, key: PresetKey) -> &mut Preset {
        match key {
            PresetKey::Example => &mut self.example,
            PresetKey::Custom => &mut self.custom,
        }
    }

    /// Change the selection. Stored presets are left as they are.
    pub fn select(&mut self, key: PresetKey) {
        self.active = key;
    }

    /// Replace a single human value on the active preset.
    pub fn set_human_value(&mut self, dim: DimensionId, percent: u8) {
        let key = self.active;
        self.get_mut(key).human.set(dim, percent);
    }
}
