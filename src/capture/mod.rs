//! Camera input and frame handling.
//!
//! This module provides the frame types shared by the whole pipeline and
//! a trait-based abstraction over the thermal camera. The camera driver
//! itself is an external collaborator; anything that can produce
//! [`RawFrame`]s at the sensor cadence can drive the pipeline.

mod camera;
mod frame;

pub use camera::{Camera, CameraError, MockCamera};
pub use frame::{Frame, RawFrame, COLS, FPS, ROWS};
