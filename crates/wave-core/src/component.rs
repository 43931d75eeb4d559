//! Components
//!
//! Components are a closed tagged enum. Each [`ComponentType`] tag maps to a
//! creation function in a fixed table, so serialized tags can be turned back
//! into components without runtime type inspection.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Stable tag of a component kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ComponentType {
    Transform = 0,
    Script = 1,
}

impl TryFrom<i32> for ComponentType {
    type Error = CoreError;

    fn try_from(tag: i32) -> CoreResult<Self> {
        match tag {
            0 => Ok(Self::Transform),
            1 => Ok(Self::Script),
            other => Err(CoreError::UnknownComponentType(other)),
        }
    }
}

/// Position, rotation (euler, radians) and scale of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Game script attached to an entity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
}

/// Component attached to a game entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    Transform(Transform),
    Script(Script),
}

impl Component {
    /// Get the tag of this component
    pub fn component_type(&self) -> ComponentType {
        match self {
            Self::Transform(_) => ComponentType::Transform,
            Self::Script(_) => ComponentType::Script,
        }
    }
}

/// Builds a component from its creation data (the script name for scripts)
pub type ComponentCreator = fn(data: &str) -> Component;

const CREATORS: [ComponentCreator; 2] = [
    |_| Component::Transform(Transform::default()),
    |data| Component::Script(Script { name: data.to_string() }),
];

/// Look up the creation function for a component type
pub fn creation_function(component_type: ComponentType) -> ComponentCreator {
    CREATORS[component_type as usize]
}
