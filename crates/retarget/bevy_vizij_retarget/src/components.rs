use bevy::prelude::*;

/// Marker component designating the root of a rig hierarchy to retarget onto.
/// The indexing system walks descendants of any entity with this marker.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct RetargetRigRoot;

/// Optional per-entity bone id override.
/// When present, this id is used instead of the entity's `Name`.
#[derive(Component, Debug, Clone)]
pub struct RetargetBoneHint {
    pub bone: String,
}
