//! Target rig: the bone sink contract and an in-memory bone tree.

use hashbrown::HashMap;
use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::errors::RetargetError;
use crate::ids::BoneId;
use crate::math::{self, Quat, IDENTITY};

/// What the engine needs from a target rig.
///
/// Adapters (in-memory graph, Bevy transforms) implement this. World
/// orientations must reflect local writes made earlier in the same tick, since
/// children are localized against freshly updated parents.
pub trait BonePoseSink {
    fn contains(&self, bone: &str) -> bool;

    /// Parent bone id, `None` for a rig root.
    fn parent(&self, bone: &str) -> Option<&str>;

    fn world_orientation(&self, bone: &str) -> Option<Quat>;

    fn local_orientation(&self, bone: &str) -> Option<Quat>;

    fn set_local_orientation(&mut self, bone: &str, local: Quat);
}

fn identity_quat() -> Quat {
    IDENTITY
}

/// Serializable description of one rig bone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoneSpec {
    pub id: BoneId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<BoneId>,
    /// Initial local orientation.
    #[serde(default = "identity_quat")]
    pub rest: Quat,
}

impl BoneSpec {
    pub fn root(id: impl Into<BoneId>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            rest: IDENTITY,
        }
    }

    pub fn child(id: impl Into<BoneId>, parent: impl Into<BoneId>) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent.into()),
            rest: IDENTITY,
        }
    }

    pub fn with_rest(mut self, rest: Quat) -> Self {
        self.rest = rest;
        self
    }
}

/// JSON document shape for rig fixtures: `{ "bones": [...] }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RigSpec {
    pub bones: Vec<BoneSpec>,
}

#[derive(Clone, Debug)]
struct BoneNode {
    id: BoneId,
    parent: Option<usize>,
    children: Vec<usize>,
    local: UnitQuaternion<f32>,
    world: UnitQuaternion<f32>,
}

/// In-memory bone tree with cached world orientations.
///
/// Every local write re-derives the world orientation of the written bone and
/// its whole subtree, so reads always see the current pose.
#[derive(Clone, Debug)]
pub struct BoneGraph {
    nodes: Vec<BoneNode>,
    index: HashMap<BoneId, usize>,
    /// Root-to-leaf (breadth-first) order.
    order: Vec<usize>,
}

impl BoneGraph {
    pub fn new(specs: Vec<BoneSpec>) -> Result<Self, RetargetError> {
        let mut index: HashMap<BoneId, usize> = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if index.insert(spec.id.clone(), i).is_some() {
                return Err(RetargetError::DuplicateBone {
                    bone: spec.id.clone(),
                });
            }
        }

        let mut nodes = Vec::with_capacity(specs.len());
        for spec in &specs {
            let parent = match &spec.parent {
                Some(p) => Some(*index.get(p).ok_or_else(|| RetargetError::UnknownParent {
                    bone: spec.id.clone(),
                    parent: p.clone(),
                })?),
                None => None,
            };
            let local = math::to_unit(spec.rest).ok_or_else(|| RetargetError::InvalidConfig {
                reason: format!("bone '{}' has a degenerate rest orientation", spec.id),
            })?;
            nodes.push(BoneNode {
                id: spec.id.clone(),
                parent,
                children: Vec::new(),
                local,
                world: local,
            });
        }
        for i in 0..nodes.len() {
            if let Some(p) = nodes[i].parent {
                nodes[p].children.push(i);
            }
        }

        // Breadth-first from the roots; anything unreached sits on a cycle.
        let mut order: Vec<usize> = (0..nodes.len()).filter(|&i| nodes[i].parent.is_none()).collect();
        let mut head = 0;
        while head < order.len() {
            let cur = order[head];
            head += 1;
            order.extend(nodes[cur].children.iter().copied());
        }
        if order.len() != nodes.len() {
            let mut reached = vec![false; nodes.len()];
            for &i in &order {
                reached[i] = true;
            }
            let stuck = reached.iter().position(|r| !r).unwrap_or(0);
            return Err(RetargetError::HierarchyCycle {
                bone: nodes[stuck].id.clone(),
            });
        }

        let mut graph = Self {
            nodes,
            index,
            order,
        };
        graph.refresh_worlds();
        Ok(graph)
    }

    pub fn from_json_str(json: &str) -> Result<Self, RetargetError> {
        let spec: RigSpec = serde_json::from_str(json)?;
        Self::new(spec.bones)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bone ids in root-to-leaf order.
    pub fn bone_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(|&i| self.nodes[i].id.as_str())
    }

    /// Number of ancestors above `bone`.
    pub fn depth(&self, bone: &str) -> Option<usize> {
        let mut cur = *self.index.get(bone)?;
        let mut depth = 0;
        while let Some(p) = self.nodes[cur].parent {
            depth += 1;
            cur = p;
        }
        Some(depth)
    }

    fn refresh_worlds(&mut self) {
        for k in 0..self.order.len() {
            let i = self.order[k];
            self.nodes[i].world = match self.nodes[i].parent {
                Some(p) => self.nodes[p].world * self.nodes[i].local,
                None => self.nodes[i].local,
            };
        }
    }

    fn refresh_subtree(&mut self, root: usize) {
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            self.nodes[i].world = match self.nodes[i].parent {
                Some(p) => self.nodes[p].world * self.nodes[i].local,
                None => self.nodes[i].local,
            };
            stack.extend(self.nodes[i].children.iter().copied());
        }
    }
}

impl BonePoseSink for BoneGraph {
    fn contains(&self, bone: &str) -> bool {
        self.index.contains_key(bone)
    }

    fn parent(&self, bone: &str) -> Option<&str> {
        let i = *self.index.get(bone)?;
        self.nodes[i].parent.map(|p| self.nodes[p].id.as_str())
    }

    fn world_orientation(&self, bone: &str) -> Option<Quat> {
        let i = *self.index.get(bone)?;
        Some(math::from_unit(&self.nodes[i].world))
    }

    fn local_orientation(&self, bone: &str) -> Option<Quat> {
        let i = *self.index.get(bone)?;
        Some(math::from_unit(&self.nodes[i].local))
    }

    fn set_local_orientation(&mut self, bone: &str, local: Quat) {
        let Some(&i) = self.index.get(bone) else {
            return;
        };
        let Some(local) = math::to_unit(local) else {
            return;
        };
        self.nodes[i].local = local;
        self.refresh_subtree(i);
    }
}
