use indexmap::IndexMap;

use crate::domain::FieldDefinition;

use super::{
    error::FormError,
    field::{FieldHandle, FieldId, FieldState},
};

/// Named group of fields shown or hidden together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBlock {
    pub id: String,
    pub fields: Vec<FieldId>,
    pub visible: bool,
}

/// Owns every field handle of a page, in declaration order. Controllers
/// receive the registry by reference instead of looking controls up ad hoc.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: IndexMap<FieldId, FieldHandle>,
    blocks: IndexMap<String, FieldBlock>,
    focused: Option<FieldId>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: &[FieldDefinition]) -> Result<Self, FormError> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.insert(FieldHandle::from_definition(definition)?)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, handle: FieldHandle) -> Result<(), FormError> {
        if self.fields.contains_key(&handle.id) {
            return Err(FormError::DuplicateField(handle.id.clone()));
        }
        self.fields.insert(handle.id.clone(), handle);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.contains_key(id)
    }

    pub fn resolve(&self, id: &str) -> Option<&FieldHandle> {
        self.fields.get(id)
    }

    pub fn resolve_mut(&mut self, id: &str) -> Option<&mut FieldHandle> {
        self.fields.get_mut(id)
    }

    pub fn get(&self, id: &FieldId) -> Result<&FieldHandle, FormError> {
        self.fields
            .get(id)
            .ok_or_else(|| FormError::UnknownField(id.clone()))
    }

    pub fn get_mut(&mut self, id: &FieldId) -> Result<&mut FieldHandle, FormError> {
        self.fields
            .get_mut(id)
            .ok_or_else(|| FormError::UnknownField(id.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldHandle> {
        self.fields.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldHandle> {
        self.fields.values_mut()
    }

    pub fn reconcile(&mut self, id: &FieldId, desired: FieldState) -> Result<bool, FormError> {
        Ok(self.get_mut(id)?.reconcile(desired))
    }

    pub fn define_block(&mut self, id: impl Into<String>, fields: Vec<FieldId>) {
        let id = id.into();
        self.blocks
            .entry(id.clone())
            .and_modify(|block| {
                for field in &fields {
                    if !block.fields.contains(field) {
                        block.fields.push(field.clone());
                    }
                }
            })
            .or_insert(FieldBlock {
                id,
                fields,
                visible: true,
            });
    }

    pub fn block(&self, id: &str) -> Option<&FieldBlock> {
        self.blocks.get(id)
    }

    pub fn set_block_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.blocks.get_mut(id) {
            Some(block) if block.visible != visible => {
                block.visible = visible;
                true
            }
            _ => false,
        }
    }

    pub fn clear_errors(&mut self) {
        for field in self.fields.values_mut() {
            field.error = None;
        }
    }

    pub fn error_count(&self) -> usize {
        self.fields
            .values()
            .filter(|field| field.error.is_some())
            .count()
    }

    /// Fields currently carrying an error annotation, in page order.
    pub fn annotated(&self) -> impl Iterator<Item = &FieldHandle> {
        self.fields.values().filter(|field| field.error.is_some())
    }

    pub fn focus(&mut self, id: Option<FieldId>) {
        self.focused = id;
    }

    pub fn focused(&self) -> Option<&FieldId> {
        self.focused.as_ref()
    }
}
