//! Engine: owns the binding table and per-bone state, and runs one retarget
//! pass per host tick.
//!
//! A pass walks the bindings root-to-leaf and, for each bone:
//! resolve → compose → flip guard → localize → smooth → write to the sink.
//! Manual overrides are written afterwards. Per-bone problems skip that bone
//! only; a tick always completes.

use log::{debug, trace, warn};
use nalgebra::UnitQuaternion;

use crate::binding::{BoundJoint, JointBindingTable};
use crate::config::RetargetConfig;
use crate::errors::{RetargetError, SkipReason};
use crate::flip::FlipGuard;
use crate::frame::{FrameIngest, SkeletonFrame};
use crate::localize::localize;
use crate::math;
use crate::outputs::{BoneWrite, TickReport};
use crate::overrides::PoseOverrides;
use crate::resolve::Resolver;
use crate::rig::BonePoseSink;
use crate::smooth::Smoother;
use crate::state::RetargetState;
use crate::transform::RetargetTransform;

#[derive(Debug)]
pub struct RetargetEngine {
    cfg: RetargetConfig,
    /// Bindings sorted so every bone follows its bound ancestors.
    rows: Vec<BoundJoint>,

    // Stages
    resolver: Resolver,
    transform: RetargetTransform,
    guard: FlipGuard,
    smoother: Smoother,

    // Owned state
    state: RetargetState,
    overrides: PoseOverrides,

    report: TickReport,
    ticks: u64,
}

/// Number of ancestors above `bone` in `rig`, failing on parent cycles.
fn depth_in(rig: &dyn BonePoseSink, bone: &str) -> Result<usize, RetargetError> {
    let mut seen: Vec<&str> = vec![bone];
    let mut cur = bone;
    while let Some(parent) = rig.parent(cur) {
        if seen.contains(&parent) {
            return Err(RetargetError::HierarchyCycle {
                bone: parent.to_owned(),
            });
        }
        seen.push(parent);
        cur = parent;
    }
    Ok(seen.len() - 1)
}

impl RetargetEngine {
    /// Build an engine against `rig`. Fails when the config is invalid, a
    /// bound bone is missing from the rig, or the rig's parent links loop.
    pub fn new(
        cfg: RetargetConfig,
        table: JointBindingTable,
        rig: &dyn BonePoseSink,
    ) -> Result<Self, RetargetError> {
        cfg.validate()?;

        let mut ranked: Vec<(usize, BoundJoint)> = Vec::with_capacity(table.len());
        for row in table.iter() {
            if !rig.contains(&row.bone) {
                return Err(RetargetError::MissingBone {
                    bone: row.bone.clone(),
                    joint: row.joint,
                });
            }
            ranked.push((depth_in(rig, &row.bone)?, row.clone()));
        }
        // Stable: equal depths keep authored order.
        ranked.sort_by_key(|(depth, _)| *depth);
        let rows: Vec<BoundJoint> = ranked.into_iter().map(|(_, row)| row).collect();

        debug!(
            "retarget engine ready: {} bindings, composition {:?}, blend {}",
            rows.len(),
            cfg.composition,
            cfg.blend_factor
        );

        Ok(Self {
            resolver: Resolver::new(cfg.require_tracked),
            transform: RetargetTransform::from_config(&cfg),
            guard: FlipGuard::from_config(&cfg),
            smoother: Smoother::new(cfg.blend_factor),
            cfg,
            rows,
            state: RetargetState::new(),
            overrides: PoseOverrides::new(),
            report: TickReport::default(),
            ticks: 0,
        })
    }

    pub fn config(&self) -> &RetargetConfig {
        &self.cfg
    }

    /// Bound bones in processing order.
    pub fn bound_bones(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|r| r.bone.as_str())
    }

    pub fn state(&self) -> &RetargetState {
        &self.state
    }

    pub fn overrides(&self) -> &PoseOverrides {
        &self.overrides
    }

    pub fn overrides_mut(&mut self) -> &mut PoseOverrides {
        &mut self.overrides
    }

    /// Report of the most recent tick.
    pub fn report(&self) -> &TickReport {
        &self.report
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Retarget `frame` onto `sink`.
    pub fn tick(&mut self, frame: &SkeletonFrame, sink: &mut dyn BonePoseSink) -> &TickReport {
        self.report.clear();
        self.report.frame_sequence = Some(frame.sequence);
        self.retarget(frame, sink);
        self.apply_overrides(sink);
        self.ticks += 1;
        &self.report
    }

    /// Retarget the most recent frame held by `ingest`. Without any frame
    /// only overrides are applied.
    pub fn tick_latest(&mut self, ingest: &FrameIngest, sink: &mut dyn BonePoseSink) -> &TickReport {
        match ingest.latest() {
            Some(frame) => self.tick(&frame, sink),
            None => {
                self.report.clear();
                self.apply_overrides(sink);
                self.ticks += 1;
                &self.report
            }
        }
    }

    fn retarget(&mut self, frame: &SkeletonFrame, sink: &mut dyn BonePoseSink) {
        for row in &self.rows {
            let resolved = match self.resolver.resolve(frame, row) {
                Ok(q) => q,
                Err(reason) => {
                    trace!("skip '{}': {}", row.bone, reason);
                    self.report.push_skip(&row.bone, reason);
                    continue;
                }
            };

            let candidate = self.transform.apply(&resolved, &row.correction);
            let prior = self.state.get(&row.bone).copied();
            let guarded = self
                .guard
                .guard(prior.as_ref().map(|s| &s.last_world), candidate);
            if guarded.damped {
                debug!(
                    "flip damped on '{}' (frame {}): jump {:.1}°",
                    row.bone,
                    frame.sequence,
                    guarded.jump.to_degrees()
                );
            }

            let parent_world = match sink.parent(&row.bone) {
                Some(parent) => match sink.world_orientation(parent).and_then(math::to_unit) {
                    Some(q) => Some(q),
                    None => {
                        trace!("skip '{}': parent '{}' has no world orientation", row.bone, parent);
                        self.report.push_skip(&row.bone, SkipReason::ParentUnavailable);
                        continue;
                    }
                },
                None => None,
            };
            let target = localize(parent_world.as_ref(), &guarded.orientation);

            let current = match prior {
                Some(s) => s.last_local,
                None => sink
                    .local_orientation(&row.bone)
                    .and_then(math::to_unit)
                    .unwrap_or_else(UnitQuaternion::identity),
            };
            let smoothed = self.smoother.smooth(&current, &target);

            let local = math::from_unit(&smoothed);
            sink.set_local_orientation(&row.bone, local);
            self.state.record(&row.bone, guarded.orientation, smoothed);
            self.report.push_write(&row.bone, local);
        }
    }

    fn apply_overrides(&mut self, sink: &mut dyn BonePoseSink) {
        if self.overrides.is_empty() {
            return;
        }
        let mut unknown: Vec<String> = Vec::new();
        for (bone, local) in self.overrides.iter() {
            if !sink.contains(bone) {
                unknown.push(bone.to_owned());
                continue;
            }
            sink.set_local_orientation(bone, local);
            self.report.overrides.push(BoneWrite {
                bone: bone.to_owned(),
                local,
            });
        }
        for bone in unknown {
            warn!("dropping override for unknown bone '{bone}'");
            self.overrides.remove(&bone);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::JointBoneBinding;
    use crate::frame::Joint;
    use crate::math::IDENTITY;
    use crate::rig::{BoneGraph, BoneSpec};

    fn rig() -> BoneGraph {
        BoneGraph::new(vec![
            BoneSpec::root("Hips"),
            BoneSpec::child("Spine", "Hips"),
            BoneSpec::child("Head", "Spine"),
        ])
        .unwrap()
    }

    #[test]
    fn bindings_are_reordered_root_to_leaf() {
        let table = JointBindingTable::new(vec![
            JointBoneBinding::new(3, "Head"),
            JointBoneBinding::new(0, "Hips"),
            JointBoneBinding::new(1, "Spine"),
        ])
        .unwrap();
        let engine = RetargetEngine::new(RetargetConfig::default(), table, &rig()).unwrap();
        let order: Vec<&str> = engine.bound_bones().collect();
        assert_eq!(order, vec!["Hips", "Spine", "Head"]);
    }

    #[test]
    fn missing_bone_fails_construction() {
        let table = JointBindingTable::new(vec![JointBoneBinding::new(3, "Tail")]).unwrap();
        let err = RetargetEngine::new(RetargetConfig::default(), table, &rig()).unwrap_err();
        assert!(matches!(err, RetargetError::MissingBone { ref bone, .. } if bone == "Tail"));
    }

    #[test]
    fn invalid_config_fails_construction() {
        let cfg = RetargetConfig {
            blend_factor: 2.0,
            ..Default::default()
        };
        let table = JointBindingTable::new(vec![]).unwrap();
        assert!(RetargetEngine::new(cfg, table, &rig()).is_err());
    }

    #[test]
    fn unknown_override_is_dropped() {
        let table = JointBindingTable::new(vec![]).unwrap();
        let mut rig = rig();
        let mut engine = RetargetEngine::new(RetargetConfig::default(), table, &rig).unwrap();
        engine.overrides_mut().set("Ghost", IDENTITY);
        engine.overrides_mut().set("Spine", IDENTITY);
        let report = engine.tick(&SkeletonFrame::new(0), &mut rig);
        assert_eq!(report.overrides.len(), 1);
        assert_eq!(engine.overrides().len(), 1);
        assert!(engine.overrides().get("Ghost").is_none());
    }

    #[test]
    fn tick_latest_without_frame_is_a_no_op() {
        let table = JointBindingTable::new(vec![JointBoneBinding::new(3, "Head")]).unwrap();
        let mut rig = rig();
        let mut engine = RetargetEngine::new(RetargetConfig::default(), table, &rig).unwrap();
        let ingest = FrameIngest::new();
        let report = engine.tick_latest(&ingest, &mut rig);
        assert!(report.frame_sequence.is_none());
        assert!(report.is_empty());

        ingest.push(SkeletonFrame::new(4).with_joint(Joint::new(3, IDENTITY)));
        let report = engine.tick_latest(&ingest, &mut rig);
        assert_eq!(report.frame_sequence, Some(4));
        assert_eq!(report.writes.len(), 1);
        assert_eq!(engine.ticks(), 2);
    }
}
