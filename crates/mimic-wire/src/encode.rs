//! Pose frame encoding (tracker side)

use std::collections::BTreeMap;

use serde::Serialize;

use mimic_core::{MimicError, MimicResult, PoseFrame};

/// Message type tag written by trackers
pub const MESSAGE_TYPE: &str = "pose";

#[derive(Serialize)]
struct WireFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    gender: &'static str,
    event: &'static str,
    bones: BTreeMap<&'a str, [f32; 3]>,
}

/// Encode a frame as a JSON text message
pub fn encode_frame(frame: &PoseFrame) -> MimicResult<String> {
    let wire = WireFrame {
        kind: MESSAGE_TYPE,
        gender: frame.gender.as_str(),
        event: frame.event.as_str(),
        bones: frame
            .bones
            .iter()
            .map(|(name, dir)| (name.as_str(), dir.to_array()))
            .collect(),
    };
    serde_json::to_string(&wire).map_err(|e| MimicError::EncodeError(e.to_string()))
}
