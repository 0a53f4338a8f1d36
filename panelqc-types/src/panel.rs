use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// A vertical framing member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stud {
    pub stud_id: String,

    /// Distance of the stud centreline from the panel's left edge.
    pub position_mm: f64,

    pub width_mm: f64,
    pub depth_mm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpeningType {
    Window,
    Door,
}

/// A door or window void in the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub opening_id: String,
    pub opening_type: OpeningType,

    /// Distance of the opening's left side from the panel's left edge.
    pub position_mm: f64,

    pub width_mm: f64,
    pub height_mm: f64,

    #[serde(default)]
    pub has_jack_studs: bool,

    #[serde(default)]
    pub has_header: bool,

    #[serde(default)]
    pub is_corner: bool,
}

impl Opening {
    pub fn is_window(&self) -> bool {
        self.opening_type == OpeningType::Window
    }
}

/// An MEP duct passing through the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Duct {
    pub duct_id: String,
    pub position_mm: f64,
    pub diameter_mm: f64,

    /// Clearance to the nearest stud as measured by the parser.
    pub clearance_from_stud_mm: f64,
}

/// Structured geometry of one wall panel.
///
/// Produced once per run by the parsing collaborator and treated as read-only input by the
/// rule engine. Studs are expected left-to-right but the order is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelData {
    pub panel_id: String,
    pub name: String,
    pub width_mm: f64,
    pub height_mm: f64,

    #[serde(default)]
    pub studs: Vec<Stud>,

    #[serde(default)]
    pub openings: Vec<Opening>,

    #[serde(default)]
    pub ducts: Vec<Duct>,

    /// Regional earthquake rating, 1 and up. Higher is stricter.
    pub seismic_zone: u32,
}

/// Fatal problems with panel geometry.
///
/// These are raised by [`PanelData::validate`] at the parser boundary, before any check runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PanelError {
    #[error("panel id is empty")]
    MissingId,

    #[error("panel {panel_id}: {field} must be a positive finite number, got {value}")]
    InvalidDimension {
        panel_id: String,
        field: &'static str,
        value: f64,
    },

    #[error("panel {panel_id}: stud {stud_id} at {position_mm}mm lies outside [0, {width_mm}]")]
    StudOutOfBounds {
        panel_id: String,
        stud_id: String,
        position_mm: f64,
        width_mm: f64,
    },

    #[error("panel {panel_id}: duplicate element id {element_id}")]
    DuplicateElementId { panel_id: String, element_id: String },

    #[error("panel {panel_id}: seismic zone must be at least 1")]
    InvalidSeismicZone { panel_id: String },

    #[error("panel id {panel_id:?} cannot be used as a file name")]
    UnsafeId { panel_id: String },

    #[error("panel id {panel_id} appears more than once in the batch")]
    DuplicatePanelId { panel_id: String },
}

/// Panel ids name artifact directories and findings files, so they must be a single plain
/// path component.
pub fn check_panel_id(panel_id: &str) -> Result<(), PanelError> {
    if panel_id.trim().is_empty() {
        return Err(PanelError::MissingId);
    }
    let unsafe_id = panel_id == "."
        || panel_id == ".."
        || panel_id.contains(['/', '\\', ':', '\0']);
    if unsafe_id {
        return Err(PanelError::UnsafeId {
            panel_id: panel_id.to_string(),
        });
    }
    Ok(())
}

impl PanelData {
    /// Check the structural invariants the rule engine relies on.
    pub fn validate(&self) -> Result<(), PanelError> {
        check_panel_id(&self.panel_id)?;

        for (field, value) in [("width_mm", self.width_mm), ("height_mm", self.height_mm)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PanelError::InvalidDimension {
                    panel_id: self.panel_id.clone(),
                    field,
                    value,
                });
            }
        }

        if self.seismic_zone == 0 {
            return Err(PanelError::InvalidSeismicZone {
                panel_id: self.panel_id.clone(),
            });
        }

        for stud in &self.studs {
            if !(0.0..=self.width_mm).contains(&stud.position_mm) {
                return Err(PanelError::StudOutOfBounds {
                    panel_id: self.panel_id.clone(),
                    stud_id: stud.stud_id.clone(),
                    position_mm: stud.position_mm,
                    width_mm: self.width_mm,
                });
            }
        }

        let mut seen = BTreeSet::new();
        let ids = self
            .studs
            .iter()
            .map(|s| s.stud_id.as_str())
            .chain(self.openings.iter().map(|o| o.opening_id.as_str()))
            .chain(self.ducts.iter().map(|d| d.duct_id.as_str()));
        for id in ids {
            if !seen.insert(id) {
                return Err(PanelError::DuplicateElementId {
                    panel_id: self.panel_id.clone(),
                    element_id: id.to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn windows(&self) -> impl Iterator<Item = &Opening> {
        self.openings.iter().filter(|o| o.is_window())
    }
}
