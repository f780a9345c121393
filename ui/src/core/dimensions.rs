//! Registry of the work dimensions a card can split between human and AI.

use std::fmt;

/// Identifier of one contribution dimension. Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DimensionId {
    Ideation,
    Research,
    Drafting,
    Code,
    Editing,
    Review,
}

impl DimensionId {
    pub const COUNT: usize = 6;

    /// Every dimension, in registry order.
    pub const ALL: [DimensionId; Self::COUNT] = [
        DimensionId::Ideation,
        DimensionId::Research,
        DimensionId::Drafting,
        DimensionId::Code,
        DimensionId::Editing,
        DimensionId::Review,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable string key (used for DOM keys and debugging output).
    pub fn key(self) -> &'static str {
        match self {
            DimensionId::Ideation => "ideation",
            DimensionId::Research => "research",
            DimensionId::Drafting => "drafting",
            DimensionId::Code => "code",
            DimensionId::Editing => "editing",
            DimensionId::Review => "review",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dim| dim.key() == key)
    }

    pub fn info(self) -> &'static Dimension {
        &REGISTRY[self.index()]
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Display data for a dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub id: DimensionId,
    pub label: &'static str,
    pub icon: &'static str,
}

static REGISTRY: [Dimension; DimensionId::COUNT] = [
    Dimension {
        id: DimensionId::Ideation,
        label: "Ideation",
        icon: "💡",
    },
    Dimension {
        id: DimensionId::Research,
        label: "Research & Analysis",
        icon: "🔬",
    },
    Dimension {
        id: DimensionId::Drafting,
        label: "Drafting",
        icon: "✍️",
    },
    Dimension {
        id: DimensionId::Code,
        label: "Code",
        icon: "⌨️",
    },
    Dimension {
        id: DimensionId::Editing,
        label: "Editing & Refinement",
        icon: "✂️",
    },
    Dimension {
        id: DimensionId::Review,
        label: "Final Review",
        icon: "👁️",
    },
];

/// The full registry in display order.
pub fn all() -> &'static [Dimension] {
    &REGISTRY
}
