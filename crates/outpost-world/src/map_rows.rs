//! Authored map rows.
//!
//! A map is a list of `(x, y, resource, hazard_id)` rows. Only tiles with
//! content need a row; the grid side is derived from the largest
//! coordinate. Rows are usually written in YAML:
//!
//! ```yaml
//! - { x: 1, y: 1, resource: A }
//! - { x: 2, y: 2, hazard_id: 7 }
//! ```

use outpost_types::{HazardId, Position, ResourceKind};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// One authored tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRow {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Raw resource code as authored.
    #[serde(default)]
    pub resource: Option<String>,
    /// Hazard center id, `0` for none.
    #[serde(default)]
    pub hazard_id: u32,
}

impl MapRow {
    /// A row holding a resource.
    pub fn with_resource(x: u32, y: u32, code: &str) -> Self {
        Self {
            x,
            y,
            resource: Some(code.to_owned()),
            hazard_id: 0,
        }
    }

    /// A row holding a hazard center.
    pub const fn with_hazard(x: u32, y: u32, id: u32) -> Self {
        Self {
            x,
            y,
            resource: None,
            hazard_id: id,
        }
    }

    /// Position of the row.
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Parsed resource kind, if the row holds a resource.
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        self.resource.as_deref().and_then(parse_resource_code)
    }

    /// Parsed hazard id, if the row holds a hazard center.
    pub const fn hazard_center(&self) -> Option<HazardId> {
        HazardId::from_authored(self.hazard_id)
    }
}

/// Interpret an authored resource code.
///
/// `A`, `B` and `C` (any case, surrounding whitespace ignored) are the
/// depleting kinds. Empty strings, `0`, `none` and `-` mean no resource.
/// Anything else is a resource that never depletes.
pub fn parse_resource_code(raw: &str) -> Option<ResourceKind> {
    let code = raw.trim();
    if code.is_empty() || code == "0" || code == "-" || code.eq_ignore_ascii_case("none") {
        return None;
    }
    match code.to_ascii_uppercase().as_str() {
        "A" => Some(ResourceKind::A),
        "B" => Some(ResourceKind::B),
        "C" => Some(ResourceKind::C),
        _ => Some(ResourceKind::Unclassified),
    }
}

/// Parse a YAML list of map rows.
///
/// # Errors
///
/// Returns [`WorldError::Parse`] if the document is not a list of rows.
pub fn rows_from_yaml(source: &str) -> Result<Vec<MapRow>, WorldError> {
    Ok(serde_yml::from_str(source)?)
}
