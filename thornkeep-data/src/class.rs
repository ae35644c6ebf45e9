use serde::{Deserialize, Serialize};

use crate::ClassId;

/// The class-specific resource pool distinct from mana, per §4.7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    None,
    Mana,
    Rage,
    Energy,
    Ki,
    Holy,
    Nature,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub id: ClassId,
    pub name: String,
    pub resource_kind: ResourceKind,
}
