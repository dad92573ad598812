//! Ports: the anchors through which components are chained.
//!
//! The exchange format between components is a [`PortMap`], a role tag to
//! [`Port`] mapping. It serialises as a JSON object:
//!
//! ```text
//! {
//!   "input":  {"position": [0.0, 0.0],   "direction": "East", "width": 2.0},
//!   "output": {"position": [100.0, 0.0], "direction": {"Angle": 0.5}}
//! }
//! ```
//!
//! A port points along the direction of propagation through it: input ports
//! point into their component and output ports point out of it, so an
//! upstream output port is passed unchanged as the downstream input port.

use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::error::{PortMismatchError, Result};
use crate::math::{normalize_angle, Point2};

/// Angular tolerance used to snap computed headings onto cardinal directions.
const CARDINAL_SNAP: f64 = 1e-9;

/// Role tags used by the built-in components.
pub mod role {
    pub const INPUT: &str = "input";
    pub const OUTPUT: &str = "output";
    pub const INPUT_TOP: &str = "input_top";
    pub const INPUT_BOT: &str = "input_bot";
    pub const OUTPUT_TOP: &str = "output_top";
    pub const OUTPUT_BOT: &str = "output_bot";
}

/// Port heading: a cardinal direction or a continuous angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    East,
    North,
    West,
    South,
    /// Radians, counter-clockwise from +x.
    Angle(f64),
}

impl Direction {
    /// Heading in radians, in `(-PI, PI]`.
    #[must_use]
    pub fn radians(self) -> f64 {
        match self {
            Self::East => 0.0,
            Self::North => FRAC_PI_2,
            Self::West => PI,
            Self::South => -FRAC_PI_2,
            Self::Angle(a) => normalize_angle(a),
        }
    }

    /// Builds a direction from an angle, snapping to a cardinal direction
    /// when the angle is within numerical noise of one.
    #[must_use]
    pub fn from_radians(angle: f64) -> Self {
        let a = normalize_angle(angle);
        let near = |target: f64| normalize_angle(a - target).abs() < CARDINAL_SNAP;
        if near(0.0) {
            Self::East
        } else if near(FRAC_PI_2) {
            Self::North
        } else if near(PI) {
            Self::West
        } else if near(-FRAC_PI_2) {
            Self::South
        } else {
            Self::Angle(a)
        }
    }

    /// Direction rotated counter-clockwise by `by` radians.
    #[must_use]
    pub fn rotated(self, by: f64) -> Self {
        Self::from_radians(self.radians() + by)
    }

    /// Opposite direction.
    #[must_use]
    pub fn reversed(self) -> Self {
        self.rotated(PI)
    }
}

/// A named anchor: position, heading and optional cross-section width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub position: Point2,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

impl Port {
    /// Creates a port without a declared width.
    #[must_use]
    pub fn new(position: Point2, direction: Direction) -> Self {
        Self {
            position,
            direction,
            width: None,
        }
    }

    /// Shorthand for `Port::new(Point2::new(x, y), direction)`.
    #[must_use]
    pub fn at(x: f64, y: f64, direction: Direction) -> Self {
        Self::new(Point2::new(x, y), direction)
    }

    /// Returns the port with a declared width.
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Heading in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.direction.radians()
    }

    /// The same anchor pointing the other way.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            direction: self.direction.reversed(),
            ..self
        }
    }
}

/// Which branch of a symmetric composite lies on the left of the input
/// heading. `Negative` mirrors the component about its input axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Parity {
    #[default]
    Positive,
    Negative,
}

impl Parity {
    /// `+1.0` or `-1.0`.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }

    /// Returns `true` for [`Parity::Negative`].
    #[must_use]
    pub fn is_mirrored(self) -> bool {
        self == Self::Negative
    }

    /// The opposite parity.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// Role tag to port mapping exposed by every component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortMap(BTreeMap<String, Port>);

impl PortMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a port, returning any port previously stored under `role`.
    pub fn insert(&mut self, role: impl Into<String>, port: Port) -> Option<Port> {
        self.0.insert(role.into(), port)
    }

    /// Looks up a port by role.
    ///
    /// # Errors
    ///
    /// Returns `PortMismatchError::UnknownRole` if no such port exists.
    pub fn get(&self, role: &str) -> Result<Port> {
        self.0
            .get(role)
            .copied()
            .ok_or_else(|| PortMismatchError::UnknownRole(role.to_owned()).into())
    }

    /// Returns `true` if a port with this role exists.
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.0.contains_key(role)
    }

    /// Number of ports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map holds no ports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(role, port)` pairs in role order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Port)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn rotation_snaps_to_cardinals() {
        assert_eq!(Direction::East.rotated(FRAC_PI_2), Direction::North);
        assert_eq!(Direction::North.rotated(FRAC_PI_2), Direction::West);
        assert_eq!(Direction::West.reversed(), Direction::East);
        assert_eq!(Direction::from_radians(-FRAC_PI_2 + 1e-12), Direction::South);
        assert!(matches!(Direction::East.rotated(FRAC_PI_4), Direction::Angle(_)));
    }

    #[test]
    fn reversed_port_keeps_position_and_width() {
        let p = Port::at(1.0, 2.0, Direction::East).with_width(0.5);
        let r = p.reversed();
        assert_eq!(r.position, p.position);
        assert_eq!(r.width, Some(0.5));
        assert_eq!(r.direction, Direction::West);
    }

    #[test]
    fn parity_helpers() {
        assert!((Parity::Negative.sign() + 1.0).abs() < f64::EPSILON);
        assert_eq!(Parity::Positive.flipped(), Parity::Negative);
        assert!(!Parity::default().is_mirrored());
    }

    #[test]
    fn missing_role_is_an_error() {
        let map = PortMap::new();
        assert!(map.get(role::OUTPUT).is_err());
    }

    #[test]
    fn json_exchange_format() {
        let mut map = PortMap::new();
        map.insert(role::INPUT, Port::at(0.0, 0.0, Direction::East).with_width(2.0));
        map.insert(role::OUTPUT, Port::at(100.0, 0.0, Direction::Angle(0.5)));
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains(r#""input":{"position":[0.0,0.0],"direction":"East","width":2.0}"#), "{json}");
        assert!(json.contains(r#""direction":{"Angle":0.5}"#), "{json}");
        assert!(!json.contains(r#""width":null"#));
        let back: PortMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
