//! Inkwall Core Library
//!
//! Platform-agnostic client-side logic for the Inkwall shared drawing wall:
//! the viewport camera, the wire protocol, the local wall replica, the
//! pointer state machine, and the native sync client.

pub mod camera;
pub mod input;
pub mod protocol;
#[cfg(not(target_arch = "wasm32"))]
pub mod sync;
pub mod wall;

pub use camera::Camera;
pub use input::{InputMachine, MouseButton, PointerEvent, PointerMode};
pub use protocol::{ClientMessage, ServerMessage, StrokeSegment};
#[cfg(not(target_arch = "wasm32"))]
pub use sync::{ConnectionState, SyncError, WallEvent, WallSocket};
pub use wall::WallClient;
