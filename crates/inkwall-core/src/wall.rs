//! Client-side wall replica.
//!
//! `WallClient` ties the camera, the pointer machine, and the local stroke
//! history together. It is single-threaded by design: pointer events and
//! network events arrive on one serialized stream, so there is no locking
//! here, only ordering.
//!
//! Local-first rendering: a segment the local participant draws is pushed
//! into the replica before the corresponding `draw` message is handed to the
//! network layer. The server never echoes a `draw` back to its author, so
//! the local copy is already authoritative. `clear` is the opposite: the
//! local replica is only wiped when the server's `clear` comes back, because
//! clearing is an authoritative reset for everyone including the requester.

use crate::camera::Camera;
use crate::input::{InputMachine, PointerEvent, PointerMode};
use crate::protocol::{ClientMessage, ServerMessage, StrokeSegment};

/// Stroke width in device pixels, before zoom compensation.
pub const BASE_STROKE_WIDTH: f64 = 5.0;

const DEFAULT_COLOR: &str = "#000000";

/// One participant's view of the shared wall.
#[derive(Debug, Clone)]
pub struct WallClient {
    /// Viewport transform; purely local, never sent over the wire.
    pub camera: Camera,
    machine: InputMachine,
    strokes: Vec<StrokeSegment>,
    color: String,
}

impl Default for WallClient {
    fn default() -> Self {
        Self {
            camera: Camera::new(),
            machine: InputMachine::new(),
            strokes: Vec::new(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

impl WallClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strokes to render, in insertion order, world coordinates.
    pub fn strokes(&self) -> &[StrokeSegment] {
        &self.strokes
    }

    pub fn mode(&self) -> PointerMode {
        self.machine.mode()
    }

    /// Set the color used for newly drawn segments.
    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Stroke width for the renderer at the current zoom.
    pub fn stroke_width(&self) -> f64 {
        self.camera.stroke_width(BASE_STROKE_WIDTH)
    }

    /// Process one local pointer event.
    ///
    /// Emitted segments are echoed into the local replica immediately and
    /// returned as outbound messages for the sync layer.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<ClientMessage> {
        let emitted = self.machine.handle(event, &mut self.camera, &self.color);
        emitted
            .into_iter()
            .map(|segment| {
                self.strokes.push(segment.clone());
                ClientMessage::Draw { segment }
            })
            .collect()
    }

    /// Ask for a full wipe. Only honored while the pointer is idle; returns
    /// the message to send, or `None` if a draw or pan is in progress.
    pub fn request_clear(&self) -> Option<ClientMessage> {
        self.machine.is_idle().then_some(ClientMessage::Clear)
    }

    /// Apply one server event, in arrival order.
    pub fn apply(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::History { segments } => self.strokes = segments,
            ServerMessage::Draw { segment } => self.strokes.push(segment),
            ServerMessage::Clear => self.strokes.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;
    use kurbo::Point;

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn mv(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    fn segment(x1: f64, y1: f64) -> StrokeSegment {
        StrokeSegment {
            x0: 0.0,
            y0: 0.0,
            x1,
            y1,
            color: "#ff0000".to_string(),
        }
    }

    #[test]
    fn test_local_echo_before_emit() {
        let mut client = WallClient::new();
        client.set_color("#ff0000");

        assert!(client.handle_pointer(down(0.0, 0.0)).is_empty());
        let outbound = client.handle_pointer(mv(10.0, 10.0));

        assert_eq!(outbound.len(), 1);
        assert_eq!(client.strokes().len(), 1, "rendered locally without a round trip");
        match &outbound[0] {
            ClientMessage::Draw { segment } => assert_eq!(*segment, client.strokes()[0]),
            ClientMessage::Clear => panic!("wrong message type"),
        }
    }

    #[test]
    fn test_history_replaces_local_state() {
        let mut client = WallClient::new();
        client.apply(ServerMessage::Draw {
            segment: segment(1.0, 1.0),
        });
        client.apply(ServerMessage::History {
            segments: vec![segment(2.0, 2.0), segment(3.0, 3.0)],
        });
        assert_eq!(client.strokes().len(), 2);
        assert_eq!(client.strokes()[0].end(), Point::new(2.0, 2.0));
    }

    #[test]
    fn test_remote_draw_appends_in_order() {
        let mut client = WallClient::new();
        client.apply(ServerMessage::Draw {
            segment: segment(1.0, 1.0),
        });
        client.apply(ServerMessage::Draw {
            segment: segment(2.0, 2.0),
        });
        assert_eq!(client.strokes()[1].end(), Point::new(2.0, 2.0));
    }

    #[test]
    fn test_clear_is_not_local_first() {
        let mut client = WallClient::new();
        client.apply(ServerMessage::Draw {
            segment: segment(1.0, 1.0),
        });

        let msg = client.request_clear();
        assert_eq!(msg, Some(ClientMessage::Clear));
        assert_eq!(client.strokes().len(), 1, "wipe waits for the server echo");

        client.apply(ServerMessage::Clear);
        assert!(client.strokes().is_empty());
    }

    #[test]
    fn test_clear_refused_mid_gesture() {
        let mut client = WallClient::new();
        client.handle_pointer(down(0.0, 0.0));
        assert_eq!(client.request_clear(), None);

        client.handle_pointer(PointerEvent::Up {
            position: Point::new(0.0, 0.0),
            button: MouseButton::Left,
        });
        assert!(client.request_clear().is_some());
    }

    #[test]
    fn test_stroke_width_tracks_zoom() {
        let mut client = WallClient::new();
        client.camera.zoom = 2.0;
        assert!((client.stroke_width() - BASE_STROKE_WIDTH / 2.0).abs() < f64::EPSILON);
    }
}
