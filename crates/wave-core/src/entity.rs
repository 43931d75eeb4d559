//! Game entities and the native engine contract.

use crate::component::{Component, ComponentType, Transform};
use crate::id::EntityId;

/// Entity lifecycle calls into the native engine.
///
/// The engine side is opaque; the editor only asks it to create and remove
/// runtime entities when an entity becomes active or inactive.
pub trait EntityApi {
    /// Create the runtime counterpart of `entity` and return its id
    fn create_game_entity(&mut self, entity: &GameEntity) -> EntityId;

    /// Remove the runtime counterpart of `entity`
    fn remove_game_entity(&mut self, entity: &GameEntity);
}

/// Editor-side game entity
#[derive(Debug, Clone)]
pub struct GameEntity {
    pub name: String,
    pub is_enabled: bool,
    entity_id: EntityId,
    is_active: bool,
    components: Vec<Component>,
}

impl GameEntity {
    /// Create an inactive entity with a default transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_enabled: true,
            entity_id: EntityId::INVALID,
            is_active: false,
            components: vec![Component::Transform(Transform::default())],
        }
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Activate or deactivate the entity, registering it with the engine
    pub fn set_active(&mut self, active: bool, api: &mut dyn EntityApi) {
        if self.is_active == active {
            return;
        }
        self.is_active = active;
        if active {
            self.entity_id = api.create_game_entity(self);
            debug_assert!(self.entity_id.is_valid());
        } else if self.entity_id.is_valid() {
            api.remove_game_entity(self);
            self.entity_id = EntityId::INVALID;
        }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Get the component of the given type
    pub fn component(&self, component_type: ComponentType) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| c.component_type() == component_type)
    }

    /// Attach a component; an entity holds at most one of each type
    pub fn add_component(&mut self, component: Component) -> bool {
        if self.component(component.component_type()).is_some() {
            log::warn!(
                "Entity {} already has a {:?} component",
                self.name,
                component.component_type()
            );
            return false;
        }
        self.components.push(component);
        true
    }

    /// Detach the component of the given type; the transform stays
    pub fn remove_component(&mut self, component_type: ComponentType) -> bool {
        if component_type == ComponentType::Transform {
            return false;
        }
        let before = self.components.len();
        self.components.retain(|c| c.component_type() != component_type);
        before != self.components.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::creation_function;

    #[derive(Default)]
    struct FakeEngine {
        next_id: i32,
        live: Vec<i32>,
    }

    impl EntityApi for FakeEngine {
        fn create_game_entity(&mut self, _entity: &GameEntity) -> EntityId {
            let id = self.next_id;
            self.next_id += 1;
            self.live.push(id);
            EntityId(id)
        }

        fn remove_game_entity(&mut self, entity: &GameEntity) {
            self.live.retain(|&id| id != entity.entity_id().0);
        }
    }

    #[test]
    fn test_activation_registers_with_engine() {
        let mut engine = FakeEngine::default();
        let mut entity = GameEntity::new("crate");

        entity.set_active(true, &mut engine);
        assert_eq!(entity.entity_id(), EntityId(0));
        assert_eq!(engine.live, vec![0]);

        entity.set_active(false, &mut engine);
        assert!(!entity.entity_id().is_valid());
        assert!(engine.live.is_empty());
    }

    #[test]
    fn test_components() {
        let mut entity = GameEntity::new("player");
        assert!(entity.component(ComponentType::Transform).is_some());

        assert!(entity.add_component(creation_function(ComponentType::Script)("Mover")));
        assert!(!entity.add_component(creation_function(ComponentType::Script)("Other")));
        assert_eq!(entity.components().len(), 2);

        assert!(!entity.remove_component(ComponentType::Transform));
        assert!(entity.remove_component(ComponentType::Script));
        assert_eq!(entity.components().len(), 1);
    }
}
