use std::fmt;
use std::sync::Arc;

use crate::form::{FieldId, FieldRegistry, FieldState, FieldValue, FormError};
use crate::lookup::LookupTracker;

/// Builds the extra query parameters a child lookup carries, given the
/// search term, the page and the parent's current value.
pub trait ParamBuilder: Send + Sync {
    fn build(&self, term: &str, page: u32, parent: Option<&str>) -> Vec<(String, String)>;
}

impl<F> ParamBuilder for F
where
    F: Fn(&str, u32, Option<&str>) -> Vec<(String, String)> + Send + Sync,
{
    fn build(&self, term: &str, page: u32, parent: Option<&str>) -> Vec<(String, String)> {
        self(term, page, parent)
    }
}

/// Sends the parent's value under a fixed key (empty when unset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterByParent {
    pub key: String,
}

impl FilterByParent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl ParamBuilder for FilterByParent {
    fn build(&self, _term: &str, _page: u32, parent: Option<&str>) -> Vec<(String, String)> {
        vec![(self.key.clone(), parent.unwrap_or_default().to_string())]
    }
}

#[derive(Clone)]
pub struct DependencyEdge {
    pub child: FieldId,
    pub parent: FieldId,
    pub params: Arc<dyn ParamBuilder>,
    pub placeholder_enabled: Option<String>,
    pub placeholder_disabled: Option<String>,
}

impl fmt::Debug for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyEdge")
            .field("child", &self.child)
            .field("parent", &self.parent)
            .field("placeholder_enabled", &self.placeholder_enabled)
            .field("placeholder_disabled", &self.placeholder_disabled)
            .finish_non_exhaustive()
    }
}

impl DependencyEdge {
    pub fn new(child: FieldId, parent: FieldId, params: Arc<dyn ParamBuilder>) -> Self {
        Self {
            child,
            parent,
            params,
            placeholder_enabled: None,
            placeholder_disabled: None,
        }
    }

    pub fn with_placeholders(
        mut self,
        enabled: Option<String>,
        disabled: Option<String>,
    ) -> Self {
        self.placeholder_enabled = enabled;
        self.placeholder_disabled = disabled;
        self
    }
}

/// Keeps every child selection disabled and empty while its parent is
/// unset, and clears it whenever the parent changes.
#[derive(Debug, Clone, Default)]
pub struct DependentSelection {
    edges: Vec<DependencyEdge>,
}

impl DependentSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, edge: DependencyEdge) -> usize {
        self.edges.push(edge);
        self.edges.len() - 1
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    pub fn edge(&self, index: usize) -> Option<&DependencyEdge> {
        self.edges.get(index)
    }

    pub fn edge_for_child(&self, child: &FieldId) -> Option<&DependencyEdge> {
        self.edges.iter().find(|edge| &edge.child == child)
    }

    /// Page-load state: the child keeps its value only if the parent has one.
    pub fn initialize(&self, registry: &mut FieldRegistry, index: usize) -> Result<bool, FormError> {
        let Some(edge) = self.edges.get(index) else {
            return Ok(false);
        };
        let parent_filled = !registry.get(&edge.parent)?.is_empty();
        let child = registry.get_mut(&edge.child)?;
        let current = child.state().clone();
        let value = if parent_filled {
            current.value.clone()
        } else {
            FieldValue::empty_for(child.kind)
        };
        let changed = child.reconcile(FieldState {
            enabled: parent_filled && !child.declared_disabled(),
            value,
            ..current
        });
        apply_placeholder(edge, child, parent_filled);
        if !parent_filled {
            child.reset_lookup();
        }
        Ok(changed)
    }

    /// Parent value changed: drop the child's selection and options,
    /// re-evaluate its enabled flag and stale any lookup in flight.
    pub fn on_parent_change(
        &self,
        registry: &mut FieldRegistry,
        lookups: &mut LookupTracker,
        index: usize,
    ) -> Result<bool, FormError> {
        let Some(edge) = self.edges.get(index) else {
            return Ok(false);
        };
        let parent_filled = !registry.get(&edge.parent)?.is_empty();
        let child = registry.get_mut(&edge.child)?;
        let current = child.state().clone();
        let changed = child.reconcile(FieldState {
            enabled: parent_filled && !child.declared_disabled(),
            value: FieldValue::empty_for(child.kind),
            ..current
        });
        child.reset_lookup();
        apply_placeholder(edge, child, parent_filled);
        lookups.invalidate(&edge.child);
        tracing::debug!(child = %edge.child, parent = %edge.parent, parent_filled, "dependent selection reset");
        Ok(changed)
    }

    /// Extra lookup parameters for `child`. `None` means no request may be
    /// issued because the parent is unset.
    pub fn lookup_params(
        &self,
        registry: &FieldRegistry,
        child: &FieldId,
        term: &str,
        page: u32,
    ) -> Result<Option<Vec<(String, String)>>, FormError> {
        let Some(edge) = self.edge_for_child(child) else {
            return Ok(Some(Vec::new()));
        };
        let parent = registry.get(&edge.parent)?;
        if parent.is_empty() {
            return Ok(None);
        }
        Ok(Some(edge.params.build(term, page, parent.value().scalar())))
    }
}

fn apply_placeholder(edge: &DependencyEdge, child: &mut crate::form::FieldHandle, enabled: bool) {
    let placeholder = if enabled {
        &edge.placeholder_enabled
    } else {
        &edge.placeholder_disabled
    };
    if let Some(text) = placeholder {
        child.placeholder = Some(text.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldKind;
    use crate::form::FieldHandle;

    fn registry() -> FieldRegistry {
        let mut registry = FieldRegistry::new();
        registry
            .insert(FieldHandle::new("esp", FieldKind::Lookup))
            .unwrap();
        registry
            .insert(FieldHandle::new("proc", FieldKind::Lookup))
            .unwrap();
        registry
    }

    fn controller() -> DependentSelection {
        let mut controller = DependentSelection::new();
        controller.bind(
            DependencyEdge::new(
                FieldId::from("esp"),
                FieldId::from("proc"),
                Arc::new(FilterByParent::new("especialidade_id")),
            ),
        );
        controller
    }

    fn proc_controller() -> DependentSelection {
        let mut controller = DependentSelection::new();
        controller.bind(
            DependencyEdge::new(
                FieldId::from("proc"),
                FieldId::from("esp"),
                Arc::new(FilterByParent::new("especialidade_id")),
            )
            .with_placeholders(Some("buscar".into()), Some("escolha antes".into())),
        );
        controller
    }

    #[test]
    fn child_starts_disabled_without_parent() {
        let mut registry = registry();
        registry
            .resolve_mut("proc")
            .unwrap()
            .set_value(FieldValue::choice("stale"))
            .unwrap();
        proc_controller().initialize(&mut registry, 0).unwrap();
        let proc_field = registry.resolve("proc").unwrap();
        assert!(!proc_field.is_enabled());
        assert!(proc_field.is_empty());
        assert_eq!(proc_field.placeholder.as_deref(), Some("escolha antes"));
    }

    #[test]
    fn child_keeps_value_when_parent_is_set() {
        let mut registry = registry();
        registry
            .resolve_mut("esp")
            .unwrap()
            .set_value(FieldValue::choice("1"))
            .unwrap();
        registry
            .resolve_mut("proc")
            .unwrap()
            .set_value(FieldValue::choice("10"))
            .unwrap();
        proc_controller().initialize(&mut registry, 0).unwrap();
        let proc_field = registry.resolve("proc").unwrap();
        assert!(proc_field.is_enabled());
        assert_eq!(proc_field.value(), &FieldValue::choice("10"));
    }

    #[test]
    fn parent_change_clears_child_and_stales_lookup() {
        let mut registry = registry();
        let mut lookups = LookupTracker::new();
        let controller = proc_controller();
        registry
            .resolve_mut("esp")
            .unwrap()
            .set_value(FieldValue::choice("1"))
            .unwrap();
        controller.initialize(&mut registry, 0).unwrap();
        registry
            .resolve_mut("proc")
            .unwrap()
            .set_value(FieldValue::choice("10"))
            .unwrap();
        let pending = lookups.issue(&FieldId::from("proc"), 1);

        registry
            .resolve_mut("esp")
            .unwrap()
            .set_value(FieldValue::choice("2"))
            .unwrap();
        assert!(controller
            .on_parent_change(&mut registry, &mut lookups, 0)
            .unwrap());
        let proc_field = registry.resolve("proc").unwrap();
        assert!(proc_field.is_enabled());
        assert!(proc_field.is_empty());
        assert!(!lookups.is_current(&pending));
    }

    #[test]
    fn declared_disabled_child_stays_locked() {
        let mut definition = crate::domain::FieldDefinition::new("proc", FieldKind::Lookup);
        definition.disabled = true;
        let mut registry = FieldRegistry::new();
        registry
            .insert(FieldHandle::new("esp", FieldKind::Lookup))
            .unwrap();
        registry
            .insert(FieldHandle::from_definition(&definition).unwrap())
            .unwrap();
        registry
            .resolve_mut("esp")
            .unwrap()
            .set_value(FieldValue::choice("1"))
            .unwrap();
        let controller = proc_controller();
        controller.initialize(&mut registry, 0).unwrap();
        assert!(!registry.resolve("proc").unwrap().is_enabled());

        let mut lookups = LookupTracker::new();
        registry
            .resolve_mut("esp")
            .unwrap()
            .set_value(FieldValue::choice("2"))
            .unwrap();
        controller
            .on_parent_change(&mut registry, &mut lookups, 0)
            .unwrap();
        assert!(!registry.resolve("proc").unwrap().is_enabled());
    }

    #[test]
    fn no_params_while_parent_unset() {
        let registry = registry();
        let params = proc_controller()
            .lookup_params(&registry, &FieldId::from("proc"), "ab", 1)
            .unwrap();
        assert_eq!(params, None);
    }

    #[test]
    fn params_carry_parent_value() {
        let mut registry = registry();
        registry
            .resolve_mut("esp")
            .unwrap()
            .set_value(FieldValue::choice("7"))
            .unwrap();
        let params = proc_controller()
            .lookup_params(&registry, &FieldId::from("proc"), "ab", 2)
            .unwrap();
        assert_eq!(
            params,
            Some(vec![("especialidade_id".to_string(), "7".to_string())])
        );
    }

    #[test]
    fn closures_act_as_param_builders() {
        let builder = |term: &str, page: u32, parent: Option<&str>| {
            vec![(
                "q".to_string(),
                format!("{term}:{page}:{}", parent.unwrap_or("-")),
            )]
        };
        let edge = DependencyEdge::new(FieldId::from("b"), FieldId::from("a"), Arc::new(builder));
        assert_eq!(edge.params.build("x", 3, None)[0].1, "x:3:-");
    }

    #[test]
    fn unrelated_field_has_no_filters() {
        let registry = registry();
        let params = controller()
            .lookup_params(&registry, &FieldId::from("proc"), "", 1)
            .unwrap();
        assert_eq!(params, Some(Vec::new()));
    }
}
