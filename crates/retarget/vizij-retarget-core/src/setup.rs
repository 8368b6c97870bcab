//! JSON setup documents: config plus bindings in one file.
//!
//! ```json
//! {
//!   "config": { "blend_factor": 0.4, "calibration": { "axis_remap": true } },
//!   "preset": { "kind": "kinect_v2_mixamo", "prefix": "mixamorig6" },
//!   "bindings": [ { "joint": 7, "bone": "mixamorig6LeftHand", "correction": { "euler_deg": [0, 0, 90] } } ],
//!   "floor_clip_plane": [0.0, 0.98, 0.17, 0.9]
//! }
//! ```
//!
//! Explicit `bindings` replace preset rows for the same bone. A
//! `floor_clip_plane` overrides `config.calibration.floor_tilt`.

use serde::{Deserialize, Serialize};

use crate::binding::{JointBindingTable, JointBoneBinding};
use crate::config::RetargetConfig;
use crate::errors::RetargetError;
use crate::presets;
use crate::transform::floor_tilt_from_clip_plane;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SetupPreset {
    KinectV2Mixamo {
        #[serde(default)]
        prefix: String,
    },
}

impl SetupPreset {
    pub fn bindings(&self) -> Vec<JointBoneBinding> {
        match self {
            SetupPreset::KinectV2Mixamo { prefix } => presets::kinect_v2_mixamo(prefix),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RetargetSetup {
    #[serde(default)]
    pub config: RetargetConfig,
    #[serde(default)]
    pub preset: Option<SetupPreset>,
    #[serde(default)]
    pub bindings: Vec<JointBoneBinding>,
    #[serde(default)]
    pub floor_clip_plane: Option<[f32; 4]>,
}

impl RetargetSetup {
    /// Effective config, with the floor clip plane folded into calibration.
    pub fn resolved_config(&self) -> RetargetConfig {
        let mut cfg = self.config.clone();
        if let Some(plane) = self.floor_clip_plane {
            cfg.calibration.floor_tilt = floor_tilt_from_clip_plane(plane);
        }
        cfg
    }

    /// Preset rows merged with explicit rows, validated into a table.
    pub fn binding_table(&self) -> Result<JointBindingTable, RetargetError> {
        let mut rows = self
            .preset
            .as_ref()
            .map(SetupPreset::bindings)
            .unwrap_or_default();
        for explicit in &self.bindings {
            match rows.iter_mut().find(|r| r.bone == explicit.bone) {
                Some(slot) => *slot = explicit.clone(),
                None => rows.push(explicit.clone()),
            }
        }
        JointBindingTable::new(rows)
    }

    /// Validated `(config, table)` ready for `RetargetEngine::new`.
    pub fn build(&self) -> Result<(RetargetConfig, JointBindingTable), RetargetError> {
        let cfg = self.resolved_config();
        cfg.validate()?;
        Ok((cfg, self.binding_table()?))
    }
}

/// Parse a setup document. Structural problems surface as
/// [`RetargetError::Parse`]; semantic validation happens in
/// [`RetargetSetup::build`].
pub fn parse_setup_json(s: &str) -> Result<RetargetSetup, RetargetError> {
    Ok(serde_json::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{angle_between_quats, IDENTITY};
    use crate::presets::kinect_v2;

    #[test]
    fn explicit_rows_replace_preset_rows() {
        let setup = parse_setup_json(
            r#"{
                "preset": { "kind": "kinect_v2_mixamo", "prefix": "mixamorig6" },
                "bindings": [
                    { "joint": 7, "bone": "mixamorig6LeftHand", "correction": { "euler_deg": [0, 0, 90] } },
                    { "joint": 21, "bone": "mixamorig6LeftHandIndex1" }
                ]
            }"#,
        )
        .unwrap();
        let (cfg, table) = setup.build().unwrap();
        assert_eq!(cfg, RetargetConfig::default());
        assert_eq!(table.len(), 20);

        let hand = table.get("mixamorig6LeftHand").unwrap();
        assert_eq!(hand.joint, kinect_v2::HAND_LEFT);
        // The explicit row carries no fallback.
        assert!(hand.fallback.is_none());
        assert!(hand.correction.angle() > 1.5);
    }

    #[test]
    fn floor_plane_overrides_configured_tilt() {
        let setup = RetargetSetup {
            floor_clip_plane: Some([0.0, 1.0, 0.0, 0.8]),
            ..Default::default()
        };
        let cfg = setup.resolved_config();
        assert!(angle_between_quats(cfg.calibration.floor_tilt, IDENTITY) < 1e-6);

        let tilted = RetargetSetup {
            floor_clip_plane: Some([0.0, 0.98, 0.17, 0.9]),
            ..Default::default()
        };
        let tilt = tilted.resolved_config().calibration.floor_tilt;
        assert!(angle_between_quats(tilt, IDENTITY) > 0.1);
    }

    #[test]
    fn bad_config_fails_build() {
        let setup = parse_setup_json(r#"{ "config": { "blend_factor": 0.0 } }"#).unwrap();
        assert!(matches!(
            setup.build(),
            Err(RetargetError::InvalidConfig { .. })
        ));
        assert!(parse_setup_json("\"nope\"").is_err());
    }
}
