//! Undo/Redo
//!
//! Editor commands are pairs of closures with a display name. Property edits
//! capture a typed setter and the two values instead of looking the property up
//! by name at runtime.

use std::cell::RefCell;
use std::rc::Rc;

/// A reversible editor command
pub trait UndoRedoCommand {
    /// Name shown in the history list
    fn name(&self) -> &str;

    /// Revert the command
    fn undo(&mut self);

    /// Apply the command again
    fn redo(&mut self);
}

/// Command built from two closures
pub struct UndoRedoAction {
    name: String,
    undo_action: Box<dyn FnMut()>,
    redo_action: Box<dyn FnMut()>,
}

impl UndoRedoAction {
    /// Create an action from explicit undo and redo closures
    pub fn new(
        name: impl Into<String>,
        undo: impl FnMut() + 'static,
        redo: impl FnMut() + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            undo_action: Box::new(undo),
            redo_action: Box::new(redo),
        }
    }

    /// Create an action that flips one field of `target` between two values.
    ///
    /// `setter` is the typed accessor for the field, so the command cannot
    /// name a property that does not exist.
    pub fn property<T, V>(
        name: impl Into<String>,
        target: Rc<RefCell<T>>,
        setter: fn(&mut T, V),
        undo_value: V,
        redo_value: V,
    ) -> Self
    where
        T: 'static,
        V: Clone + 'static,
    {
        let undo_target = Rc::clone(&target);
        Self::new(
            name,
            move || setter(&mut undo_target.borrow_mut(), undo_value.clone()),
            move || setter(&mut target.borrow_mut(), redo_value.clone()),
        )
    }
}

impl UndoRedoCommand for UndoRedoAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn undo(&mut self) {
        (self.undo_action)();
    }

    fn redo(&mut self) {
        (self.redo_action)();
    }
}

impl std::fmt::Debug for UndoRedoAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoRedoAction").field("name", &self.name).finish()
    }
}

/// Undo and redo history
#[derive(Default)]
pub struct UndoRedo {
    undo_list: Vec<Box<dyn UndoRedoCommand>>,
    /// Front of the list is the next command to redo
    redo_list: Vec<Box<dyn UndoRedoCommand>>,
}

impl UndoRedo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all history
    pub fn reset(&mut self) {
        self.undo_list.clear();
        self.redo_list.clear();
    }

    /// Record a command that has already been applied
    pub fn add(&mut self, command: impl UndoRedoCommand + 'static) {
        self.undo_list.push(Box::new(command));
        self.redo_list.clear();
    }

    /// Undo the most recent command
    pub fn undo(&mut self) {
        if let Some(mut command) = self.undo_list.pop() {
            log::debug!("Undo: {}", command.name());
            command.undo();
            self.redo_list.insert(0, command);
        }
    }

    /// Redo the most recently undone command
    pub fn redo(&mut self) {
        if self.redo_list.is_empty() {
            return;
        }
        let mut command = self.redo_list.remove(0);
        log::debug!("Redo: {}", command.name());
        command.redo();
        self.undo_list.push(command);
    }

    /// Names of the undoable commands, oldest first
    pub fn undo_names(&self) -> Vec<&str> {
        self.undo_list.iter().map(|c| c.name()).collect()
    }

    /// Names of the redoable commands, next first
    pub fn redo_names(&self) -> Vec<&str> {
        self.redo_list.iter().map(|c| c.name()).collect()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_list.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_list.is_empty()
    }
}
