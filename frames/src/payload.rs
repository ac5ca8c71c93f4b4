//! Typed payloads carried in [`crate::Frame::data`].
//!
//! Frames stay schemaless on the wire; these types are the checked view each
//! endpoint builds before acting on a frame. Anything that fails
//! `from_data` is treated as malformed and never reaches a renderer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("coordinate `{field}` out of unit range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("field `{0}` must not be empty")]
    Empty(&'static str),
}

// =============================================================================
// JOIN
// =============================================================================

/// Payload of a `join` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub name: String,
    pub room: String,
}

impl JoinRequest {
    #[must_use]
    pub fn new(name: impl Into<String>, room: impl Into<String>) -> Self {
        Self { name: name.into(), room: room.into() }
    }

    /// Parse a join payload. Blank names or rooms are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Malformed`] for missing fields and
    /// [`PayloadError::Empty`] for blank values.
    pub fn from_data(data: &Value) -> Result<Self, PayloadError> {
        let req: Self = serde_json::from_value(data.clone())?;
        if req.name.trim().is_empty() {
            return Err(PayloadError::Empty("name"));
        }
        if req.room.trim().is_empty() {
            return Err(PayloadError::Empty("room"));
        }
        Ok(req)
    }

    #[must_use]
    pub fn to_data(&self) -> Value {
        serde_json::json!({ "name": self.name, "room": self.room })
    }
}

// =============================================================================
// DRAWING
// =============================================================================

/// One straight piece of a pencil motion, in unit coordinates.
///
/// `(x0, y0)` of a segment equals `(x1, y1)` of the previous segment from the
/// same gesture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeSegment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub color: String,
    /// Display name of the author.
    pub name: String,
}

impl StrokeSegment {
    /// Parse and validate a relayed segment.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::Malformed`] for missing or mistyped fields,
    /// [`PayloadError::OutOfRange`] for non-finite or out-of-unit coordinates,
    /// and [`PayloadError::Empty`] for a blank color.
    pub fn from_data(data: &Value) -> Result<Self, PayloadError> {
        let segment: Self = serde_json::from_value(data.clone())?;
        segment.validate()?;
        Ok(segment)
    }

    /// Check the unit-range and color invariants.
    ///
    /// # Errors
    ///
    /// See [`StrokeSegment::from_data`].
    pub fn validate(&self) -> Result<(), PayloadError> {
        for (field, value) in [("x0", self.x0), ("y0", self.y0), ("x1", self.x1), ("y1", self.y1)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PayloadError::OutOfRange { field, value });
            }
        }
        if self.color.trim().is_empty() {
            return Err(PayloadError::Empty("color"));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_data(&self) -> Value {
        serde_json::json!({
            "x0": self.x0,
            "y0": self.y0,
            "x1": self.x1,
            "y1": self.y1,
            "color": self.color,
            "name": self.name,
        })
    }
}

// =============================================================================
// CONNECT ERROR
// =============================================================================

/// Payload of an unsolicited `connect_error` notice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectError {
    pub reason: String,
}

impl ConnectError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    /// Parse a notice. A missing reason becomes `"unknown"`.
    #[must_use]
    pub fn from_data(data: &Value) -> Self {
        let reason = data
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Self::new(reason)
    }

    #[must_use]
    pub fn to_data(&self) -> Value {
        serde_json::json!({ "reason": self.reason })
    }
}

#[cfg(test)]
#[path = "payload_test.rs"]
mod tests;
