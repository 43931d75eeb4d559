//! # Wave Core
//!
//! Core editor library for the Wave game engine.
//!
//! This crate provides the engine-agnostic building blocks the editor uses:
//! - **Math**: glam re-exports and bounding boxes
//! - **Ids**: the invalid-id convention shared with the native engine
//! - **Undo/Redo**: closure based command history
//! - **Components**: tagged component registry
//! - **Entities**: game entities and the `EntityApi` engine contract

pub mod component;
pub mod entity;
pub mod id;
pub mod math;
pub mod undo_redo;

pub use component::{Component, ComponentType, Script, Transform};
pub use entity::{EntityApi, GameEntity};
pub use id::{EntityId, INVALID_ID};
pub use math::Aabb;
pub use undo_redo::{UndoRedo, UndoRedoAction, UndoRedoCommand};

use thiserror::Error;

/// Core errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown component type tag: {0}")]
    UnknownComponentType(i32),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
