use crate::panel::PanelData;
use serde::{Deserialize, Serialize};

/// The kind of fix a violation calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixCategory {
    /// Add jack studs and a header to every window.
    WindowSupport,
    /// Redistribute studs evenly across the panel width.
    StudSpacing,
    /// Annotate corner and edge openings with diagonal bracing. Geometry is unchanged.
    Bracing,
}

impl FixCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FixCategory::WindowSupport => "window_support",
            FixCategory::StudSpacing => "stud_spacing",
            FixCategory::Bracing => "bracing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BraceKind {
    DiagonalBrace,
}

/// Visual-only marker for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracingAnnotation {
    #[serde(rename = "type")]
    pub kind: BraceKind,
    pub opening_id: String,
    pub position_mm: f64,
    pub width_mm: f64,
}

/// Result of applying remediation to a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remediation {
    /// A new panel with the fixes applied. The input panel is never modified.
    pub panel: PanelData,

    #[serde(default)]
    pub bracing: Vec<BracingAnnotation>,

    /// Fix categories that were triggered, in first-seen order.
    #[serde(default)]
    pub applied: Vec<FixCategory>,
}
