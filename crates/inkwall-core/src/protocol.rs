//! Wire protocol shared by the client core and the relay server.
//!
//! Messages are JSON with an internal `type` tag:
//! ```json
//! { "type": "draw", "x0": 0.0, "y0": 0.0, "x1": 10.0, "y1": 10.0, "color": "#ff0000" }
//! { "type": "clear" }
//! { "type": "history", "segments": [ ... ] }
//! ```
//! Segment coordinates are always world coordinates; the viewport transform
//! on each client is what makes them meaningful across screens.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// One straight line segment between two consecutive pointer samples.
///
/// Immutable once created; the stroke log only ever appends or wipes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeSegment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    /// Stroke color as an RGB hex string, e.g. `#1a2b3c`.
    pub color: String,
}

impl StrokeSegment {
    /// Create a segment from two world-space points.
    pub fn from_points(start: Point, end: Point, color: impl Into<String>) -> Self {
        Self {
            x0: start.x,
            y0: start.y,
            x1: end.x,
            y1: end.y,
            color: color.into(),
        }
    }

    /// Start point in world coordinates.
    pub fn start(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    /// End point in world coordinates.
    pub fn end(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// Structural well-formedness: finite coordinates and a non-empty color.
    ///
    /// A hostile or buggy client must not be able to poison the shared log,
    /// so anything failing this check is dropped rather than propagated.
    pub fn is_well_formed(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|c| c.is_finite())
            && !self.color.is_empty()
    }
}

/// Messages sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A freshly drawn segment, already rendered locally by the author.
    Draw {
        #[serde(flatten)]
        segment: StrokeSegment,
    },
    /// Request to wipe the whole wall.
    Clear,
}

/// Messages sent from the server to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full catch-up snapshot, sent exactly once per connection as the
    /// first message, before any `draw`/`clear` for that connection.
    History { segments: Vec<StrokeSegment> },
    /// A segment drawn by some other participant.
    Draw {
        #[serde(flatten)]
        segment: StrokeSegment,
    },
    /// The wall was wiped. Sent to every session including the one that
    /// asked (clearing is an authoritative reset, not a local echo).
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> StrokeSegment {
        StrokeSegment {
            x0: 0.0,
            y0: 0.0,
            x1: 10.0,
            y1: 10.0,
            color: "#ff0000".to_string(),
        }
    }

    #[test]
    fn test_draw_wire_shape() {
        let msg = ClientMessage::Draw { segment: segment() };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "draw");
        assert_eq!(json["x0"], 0.0);
        assert_eq!(json["x1"], 10.0);
        assert_eq!(json["color"], "#ff0000");
    }

    #[test]
    fn test_clear_wire_shape() {
        let json = serde_json::to_string(&ClientMessage::Clear).unwrap();
        assert_eq!(json, r#"{"type":"clear"}"#);
    }

    #[test]
    fn test_history_wire_shape() {
        let msg = ServerMessage::History {
            segments: vec![segment()],
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "history");
        assert_eq!(json["segments"][0]["y1"], 10.0);
    }

    #[test]
    fn test_draw_parses_from_wire() {
        let json = r##"{"type":"draw","x0":1.0,"y0":2.0,"x1":3.0,"y1":4.0,"color":"#000000"}"##;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Draw { segment } => {
                assert_eq!(segment.start(), Point::new(1.0, 2.0));
                assert_eq!(segment.end(), Point::new(3.0, 4.0));
            }
            ClientMessage::Clear => panic!("wrong message type"),
        }
    }

    #[test]
    fn test_well_formed() {
        assert!(segment().is_well_formed());

        let mut nan = segment();
        nan.x1 = f64::NAN;
        assert!(!nan.is_well_formed());

        let mut inf = segment();
        inf.y0 = f64::INFINITY;
        assert!(!inf.is_well_formed());

        let mut blank = segment();
        blank.color = String::new();
        assert!(!blank.is_well_formed());
    }
}
