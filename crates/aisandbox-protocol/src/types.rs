//! Shared building blocks of the wire format.
//!
//! Coordinates travel as bare JSON arrays (`[x, y]`), areas as pairs of
//! coordinates, and every structured value sits inside an [`Envelope`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Vector2
// ---------------------------------------------------------------------------

/// A point or direction on the level plane.
///
/// On the wire this is a two-element array, `[x, y]`. The
/// `#[serde(from, into)]` attributes route (de)serialization through
/// `[f64; 2]` so the Rust side can use named fields.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vector2 {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Vector2 {
    /// Creates a vector from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Length of the vector.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl From<[f64; 2]> for Vector2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Vector2> for [f64; 2] {
    fn from(v: Vector2) -> Self {
        [v.x, v.y]
    }
}

impl std::fmt::Display for Vector2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.2}, {:.2}]", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Area
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle, sent as `[[minX, minY], [maxX, maxY]]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[Vector2; 2]", into = "[Vector2; 2]")]
pub struct Area {
    /// Lower-left corner.
    pub min: Vector2,
    /// Upper-right corner.
    pub max: Vector2,
}

impl Area {
    /// Returns `true` if `p` lies inside the area (edges included).
    pub fn contains(&self, p: Vector2) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
    }

    /// The midpoint of the area.
    pub fn center(&self) -> Vector2 {
        Vector2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

impl From<[Vector2; 2]> for Area {
    fn from([min, max]: [Vector2; 2]) -> Self {
        Self { min, max }
    }
}

impl From<Area> for [Vector2; 2] {
    fn from(a: Area) -> Self {
        [a.min, a.max]
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The `{"__class__": ..., "__value__": ...}` wrapper around every
/// structured wire value.
///
/// The class names the type of `value` (`"LevelInfo"`, `"BotInfo"`,
/// `"Move"`, ...). Nested values are wrapped too, so a `GameInfo` contains
/// maps of `Envelope<RawBotInfo>` and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The wire type name.
    #[serde(rename = "__class__")]
    pub class: String,
    /// The wrapped value.
    #[serde(rename = "__value__")]
    pub value: T,
}

impl<T> Envelope<T> {
    /// Wraps a value.
    pub fn new(class: impl Into<String>, value: T) -> Self {
        Self {
            class: class.into(),
            value,
        }
    }

    /// Unwraps the value, ignoring the class.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Unwraps the value if the class matches `expected`.
    ///
    /// # Errors
    /// Returns [`ProtocolError::UnexpectedClass`] on mismatch.
    pub fn into_class(self, expected: &str) -> Result<T, ProtocolError> {
        if self.class == expected {
            Ok(self.value)
        } else {
            Err(ProtocolError::UnexpectedClass {
                expected: expected.to_string(),
                actual: self.class,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Null handling
// ---------------------------------------------------------------------------

/// Deserializes a field that the server may send as `null` into the
/// type's default (an empty list, a zero timer) instead of failing.
///
/// Use together with `#[serde(default)]` so a missing key behaves the same
/// way. Scalars that are genuinely optional are modelled as `Option<T>`
/// instead, which keeps "absent" distinct from zero.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector2_serializes_as_array() {
        let json = serde_json::to_string(&Vector2::new(82.0, 20.5)).unwrap();
        assert_eq!(json, "[82.0,20.5]");
    }

    #[test]
    fn test_vector2_deserializes_from_integers() {
        let v: Vector2 = serde_json::from_str("[82, 20]").unwrap();
        assert_eq!(v, Vector2::new(82.0, 20.0));
    }

    #[test]
    fn test_vector2_rejects_wrong_arity() {
        assert!(serde_json::from_str::<Vector2>("[1, 2, 3]").is_err());
        assert!(serde_json::from_str::<Vector2>("[1]").is_err());
    }

    #[test]
    fn test_vector2_distance() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.length(), 5.0);
    }

    #[test]
    fn test_area_wire_shape() {
        let area: Area =
            serde_json::from_str("[[79.0, 2.0], [85.0, 9.0]]").unwrap();
        assert_eq!(area.min, Vector2::new(79.0, 2.0));
        assert_eq!(area.max, Vector2::new(85.0, 9.0));
        assert_eq!(area.center(), Vector2::new(82.0, 5.5));
        assert!(area.contains(Vector2::new(80.0, 3.0)));
        assert!(!area.contains(Vector2::new(86.0, 3.0)));
    }

    #[test]
    fn test_envelope_field_names() {
        let env = Envelope::new("Flag", 7);
        let json: serde_json::Value = serde_json::to_value(&env).unwrap();
        assert_eq!(json["__class__"], "Flag");
        assert_eq!(json["__value__"], 7);
    }

    #[test]
    fn test_envelope_into_class_mismatch() {
        let env = Envelope::new("BotInfo", ());
        assert!(env.clone().into_class("BotInfo").is_ok());
        assert!(matches!(
            env.into_class("FlagInfo"),
            Err(ProtocolError::UnexpectedClass { .. })
        ));
    }

    #[test]
    fn test_null_as_default() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "null_as_default")]
            names: Vec<String>,
        }

        let p: Probe = serde_json::from_str(r#"{"names": null}"#).unwrap();
        assert!(p.names.is_empty());
        let p: Probe = serde_json::from_str("{}").unwrap();
        assert!(p.names.is_empty());
        let p: Probe = serde_json::from_str(r#"{"names": ["a"]}"#).unwrap();
        assert_eq!(p.names, vec!["a".to_string()]);
    }
}
