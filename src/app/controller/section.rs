use crate::domain::SectionDefinition;
use crate::form::{FieldId, FieldRegistry, FieldState, FieldValue, FormError};

pub const MARKER_OPEN: &str = "on";

/// Optional fields grouped behind a toggle. The open state is mirrored in
/// a marker field so it survives a round trip through the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsibleSection {
    pub id: String,
    pub title: Option<String>,
    pub marker: Option<FieldId>,
    pub fields: Vec<FieldId>,
    open: bool,
}

impl CollapsibleSection {
    pub fn new(id: impl Into<String>, fields: Vec<FieldId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            marker: None,
            fields,
            open: false,
        }
    }

    pub fn with_marker(mut self, marker: impl Into<FieldId>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn from_definition(definition: &SectionDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            title: definition.title.clone(),
            marker: definition.marker.as_deref().map(FieldId::from),
            fields: definition
                .fields
                .iter()
                .map(|field| FieldId::from(field.as_str()))
                .collect(),
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

#[derive(Debug, Clone, Default)]
pub struct SectionController {
    sections: Vec<CollapsibleSection>,
}

impl SectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, section: CollapsibleSection) -> usize {
        self.sections.push(section);
        self.sections.len() - 1
    }

    pub fn sections(&self) -> &[CollapsibleSection] {
        &self.sections
    }

    pub fn get(&self, id: &str) -> Option<&CollapsibleSection> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Open when the marker says so or when a member already holds a value.
    pub fn initialize(&mut self, registry: &mut FieldRegistry) -> Result<(), FormError> {
        for index in 0..self.sections.len() {
            let section = &self.sections[index];
            let marker_open = match &section.marker {
                Some(marker) => registry.get(marker)?.value().scalar() == Some(MARKER_OPEN),
                None => false,
            };
            let mut member_filled = false;
            for field in &section.fields {
                member_filled |= !registry.get(field)?.is_empty();
            }
            self.set_open(registry, index, marker_open || member_filled)?;
        }
        Ok(())
    }

    pub fn toggle(&mut self, registry: &mut FieldRegistry, id: &str) -> Result<bool, FormError> {
        let Some(index) = self.sections.iter().position(|section| section.id == id) else {
            tracing::error!(section = id, "unknown collapsible section");
            return Ok(false);
        };
        let open = !self.sections[index].open;
        self.set_open(registry, index, open)?;
        Ok(open)
    }

    /// Member visibility follows the section; values are kept while closed.
    pub fn set_open(
        &mut self,
        registry: &mut FieldRegistry,
        index: usize,
        open: bool,
    ) -> Result<bool, FormError> {
        let Some(section) = self.sections.get_mut(index) else {
            return Ok(false);
        };
        section.open = open;
        let mut changed = registry.set_block_visible(&section.id, open);
        for field in &section.fields {
            let handle = registry.get_mut(field)?;
            let current = handle.state().clone();
            let required = open && handle.declared_required();
            changed |= handle.reconcile(FieldState {
                visible: open,
                required,
                ..current
            });
        }
        if let Some(marker) = &section.marker {
            let handle = registry.get_mut(marker)?;
            let current = handle.state().clone();
            let flag = if open { MARKER_OPEN } else { "" };
            changed |= handle.reconcile(FieldState {
                value: FieldValue::text(flag),
                ..current
            });
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldKind;
    use crate::form::FieldHandle;

    fn setup() -> (FieldRegistry, SectionController) {
        let mut registry = FieldRegistry::new();
        registry
            .insert(FieldHandle::new("open", FieldKind::Hidden))
            .unwrap();
        registry
            .insert(FieldHandle::new("esp2", FieldKind::Lookup))
            .unwrap();
        registry
            .insert(FieldHandle::new("proc2", FieldKind::Lookup))
            .unwrap();
        let mut controller = SectionController::new();
        controller.add(
            CollapsibleSection::new(
                "secondary",
                vec![FieldId::from("esp2"), FieldId::from("proc2")],
            )
            .with_marker("open"),
        );
        (registry, controller)
    }

    #[test]
    fn starts_closed_without_marker_or_values() {
        let (mut registry, mut controller) = setup();
        controller.initialize(&mut registry).unwrap();
        assert!(!controller.get("secondary").unwrap().is_open());
        assert!(!registry.resolve("esp2").unwrap().is_visible());
    }

    #[test]
    fn member_value_opens_section() {
        let (mut registry, mut controller) = setup();
        registry
            .resolve_mut("proc2")
            .unwrap()
            .set_value(FieldValue::choice("3"))
            .unwrap();
        controller.initialize(&mut registry).unwrap();
        assert!(controller.get("secondary").unwrap().is_open());
        assert_eq!(
            registry.resolve("open").unwrap().value(),
            &FieldValue::text("on")
        );
    }

    #[test]
    fn toggle_flips_marker_and_visibility() {
        let (mut registry, mut controller) = setup();
        registry
            .resolve_mut("open")
            .unwrap()
            .set_value(FieldValue::text("on"))
            .unwrap();
        controller.initialize(&mut registry).unwrap();
        assert!(!controller.toggle(&mut registry, "secondary").unwrap());
        assert_eq!(
            registry.resolve("open").unwrap().value(),
            &FieldValue::text("")
        );
        assert!(!registry.resolve("esp2").unwrap().is_visible());
        assert!(controller.toggle(&mut registry, "secondary").unwrap());
        assert!(registry.resolve("proc2").unwrap().is_visible());
    }

    #[test]
    fn closed_section_drops_required_members() {
        let (mut registry, mut controller) = setup();
        let handle = registry.resolve("esp2").unwrap().clone().with_required(true);
        *registry.resolve_mut("esp2").unwrap() = handle;
        controller.initialize(&mut registry).unwrap();
        assert!(!registry.resolve("esp2").unwrap().is_required());
        controller.toggle(&mut registry, "secondary").unwrap();
        assert!(registry.resolve("esp2").unwrap().is_required());
    }
}
