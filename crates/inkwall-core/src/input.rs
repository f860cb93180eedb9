//! Pointer state machine: drawing vs. panning.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::protocol::StrokeSegment;

/// Mouse button identifiers. Left draws, Right pans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in device coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    /// Pointer left the drawable surface.
    Leave,
    /// Scroll wheel, vertical delta (positive = down = zoom out).
    Scroll { position: Point, delta: f64 },
}

/// What the local participant is currently doing with the pointer.
///
/// Drawing and panning are mutually exclusive; entering one while the other
/// is active force-exits the other, so a stray button state can never leave
/// the machine stuck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerMode {
    Idle,
    /// Drawing; anchor is the previous sample in world coordinates.
    Drawing { last_world: Point },
    /// Panning; anchor is the previous sample in device coordinates.
    Panning { last_device: Point },
}

/// Drives [`PointerMode`] transitions from raw pointer events.
///
/// The machine mutates the camera (pan, zoom) directly and returns any
/// stroke segments the event produced, in world coordinates. The caller owns
/// local echo and network emission.
#[derive(Debug, Clone)]
pub struct InputMachine {
    mode: PointerMode,
}

impl Default for InputMachine {
    fn default() -> Self {
        Self {
            mode: PointerMode::Idle,
        }
    }
}

impl InputMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    pub fn is_idle(&self) -> bool {
        self.mode == PointerMode::Idle
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.mode, PointerMode::Drawing { .. })
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.mode, PointerMode::Panning { .. })
    }

    /// Process one pointer event.
    ///
    /// Returns the segments emitted by this event (zero or one) with the
    /// given stroke color.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        camera: &mut Camera,
        color: &str,
    ) -> Vec<StrokeSegment> {
        match event {
            PointerEvent::Down { position, button } => self.handle_down(position, button, camera, color),
            PointerEvent::Up { button, .. } => {
                match (self.mode, button) {
                    (PointerMode::Drawing { .. }, MouseButton::Left)
                    | (PointerMode::Panning { .. }, MouseButton::Right) => {
                        self.mode = PointerMode::Idle;
                    }
                    _ => {}
                }
                Vec::new()
            }
            PointerEvent::Move { position } => self.handle_move(position, camera, color),
            PointerEvent::Leave => {
                // Leaving the surface stops drawing; an in-flight pan keeps
                // going until the button is released.
                if self.is_drawing() {
                    self.mode = PointerMode::Idle;
                }
                Vec::new()
            }
            PointerEvent::Scroll { position, delta } => {
                camera.zoom_scroll(position, delta);
                Vec::new()
            }
        }
    }

    fn handle_down(
        &mut self,
        position: Point,
        button: MouseButton,
        camera: &mut Camera,
        color: &str,
    ) -> Vec<StrokeSegment> {
        match button {
            MouseButton::Left => {
                if self.is_panning() {
                    self.mode = PointerMode::Idle;
                }
                match self.mode {
                    PointerMode::Drawing { last_world } => {
                        // A repeated down while already drawing still produces
                        // a segment from the previous anchor.
                        let world = camera.screen_to_world(position);
                        self.mode = PointerMode::Drawing { last_world: world };
                        vec![StrokeSegment::from_points(last_world, world, color)]
                    }
                    _ => {
                        self.mode = PointerMode::Drawing {
                            last_world: camera.screen_to_world(position),
                        };
                        Vec::new()
                    }
                }
            }
            MouseButton::Right => {
                if self.is_drawing() {
                    self.mode = PointerMode::Idle;
                }
                self.mode = PointerMode::Panning {
                    last_device: position,
                };
                Vec::new()
            }
            MouseButton::Middle => Vec::new(),
        }
    }

    fn handle_move(
        &mut self,
        position: Point,
        camera: &mut Camera,
        color: &str,
    ) -> Vec<StrokeSegment> {
        match self.mode {
            PointerMode::Drawing { last_world } => {
                let world = camera.screen_to_world(position);
                self.mode = PointerMode::Drawing { last_world: world };
                vec![StrokeSegment::from_points(last_world, world, color)]
            }
            PointerMode::Panning { last_device } => {
                camera.pan(position - last_device);
                self.mode = PointerMode::Panning {
                    last_device: position,
                };
                Vec::new()
            }
            PointerMode::Idle => Vec::new(),
        }
    }
}
