use std::fmt;
use std::sync::Arc;

use crate::domain::{PredicateSpec, VisibilityDefinition};
use crate::form::{FieldId, FieldRegistry, FieldState, FieldValue, FormError};

/// Condition over a driver field's current value.
#[derive(Clone)]
pub enum Predicate {
    Checked,
    Unchecked,
    Filled,
    OneOf(Vec<String>),
    NoneOf(Vec<String>),
    Custom(Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>),
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Checked => f.write_str("Checked"),
            Predicate::Unchecked => f.write_str("Unchecked"),
            Predicate::Filled => f.write_str("Filled"),
            Predicate::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            Predicate::NoneOf(values) => f.debug_tuple("NoneOf").field(values).finish(),
            Predicate::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Predicate {
    pub fn from_spec(spec: &PredicateSpec) -> Self {
        match spec {
            PredicateSpec::Checked => Predicate::Checked,
            PredicateSpec::Unchecked => Predicate::Unchecked,
            PredicateSpec::Filled => Predicate::Filled,
            PredicateSpec::OneOf { values } => Predicate::OneOf(values.clone()),
            PredicateSpec::NoneOf { values } => Predicate::NoneOf(values.clone()),
        }
    }

    pub fn custom(check: impl Fn(&FieldValue) -> bool + Send + Sync + 'static) -> Self {
        Predicate::Custom(Arc::new(check))
    }

    /// `OneOf`/`NoneOf` compare the scalar value; an unset choice compares
    /// as the empty string.
    pub fn evaluate(&self, value: &FieldValue) -> bool {
        match self {
            Predicate::Checked => matches!(value, FieldValue::Checked(true)),
            Predicate::Unchecked => !matches!(value, FieldValue::Checked(true)),
            Predicate::Filled => !value.is_empty(),
            Predicate::OneOf(values) => {
                let current = scalar_of(value);
                values.iter().any(|candidate| candidate == current)
            }
            Predicate::NoneOf(values) => {
                let current = scalar_of(value);
                !values.iter().any(|candidate| candidate == current)
            }
            Predicate::Custom(check) => check(value),
        }
    }
}

fn scalar_of(value: &FieldValue) -> &str {
    value.scalar().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityTarget {
    pub field: FieldId,
    /// Required flag restored when the block is shown.
    pub required_when_shown: bool,
}

#[derive(Debug, Clone)]
pub struct VisibilityRule {
    pub driver: FieldId,
    pub predicate: Predicate,
    pub block: Option<String>,
    pub targets: Vec<VisibilityTarget>,
}

impl VisibilityRule {
    pub fn new(driver: impl Into<FieldId>, predicate: Predicate) -> Self {
        Self {
            driver: driver.into(),
            predicate,
            block: None,
            targets: Vec::new(),
        }
    }

    pub fn with_block(mut self, block: impl Into<String>) -> Self {
        self.block = Some(block.into());
        self
    }

    pub fn with_target(mut self, field: impl Into<FieldId>, required_when_shown: bool) -> Self {
        self.targets.push(VisibilityTarget {
            field: field.into(),
            required_when_shown,
        });
        self
    }

    pub fn from_definition(definition: &VisibilityDefinition) -> Self {
        Self {
            driver: FieldId::from(definition.driver.as_str()),
            predicate: Predicate::from_spec(&definition.predicate),
            block: definition.block.clone(),
            targets: definition
                .targets
                .iter()
                .map(|target| VisibilityTarget {
                    field: FieldId::from(target.field.as_str()),
                    required_when_shown: target.required_when_shown,
                })
                .collect(),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldId> {
        std::iter::once(&self.driver).chain(self.targets.iter().map(|target| &target.field))
    }
}

/// Target visibility and required-ness as a pure function of the driver.
#[derive(Debug, Clone, Default)]
pub struct VisibilityController {
    rules: Vec<VisibilityRule>,
}

impl VisibilityController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, rule: VisibilityRule) -> usize {
        self.rules.push(rule);
        self.rules.len() - 1
    }

    pub fn rules(&self) -> &[VisibilityRule] {
        &self.rules
    }

    pub fn rule(&self, index: usize) -> Option<&VisibilityRule> {
        self.rules.get(index)
    }

    /// Re-derive every target from the driver's current value. Returns true
    /// when anything changed, so a second call with the same driver value
    /// always returns false.
    pub fn apply(&self, registry: &mut FieldRegistry, index: usize) -> Result<bool, FormError> {
        let Some(rule) = self.rules.get(index) else {
            return Ok(false);
        };
        let shown = rule.predicate.evaluate(registry.get(&rule.driver)?.value());
        let mut changed = match &rule.block {
            Some(block) => registry.set_block_visible(block, shown),
            None => false,
        };
        for target in &rule.targets {
            let field = registry.get_mut(&target.field)?;
            let current = field.state().clone();
            changed |= field.reconcile(FieldState {
                visible: shown,
                required: shown && target.required_when_shown,
                ..current
            });
            if !shown && field.error.take().is_some() {
                changed = true;
            }
        }
        Ok(changed)
    }

    pub fn apply_all(&self, registry: &mut FieldRegistry) -> Result<bool, FormError> {
        let mut changed = false;
        for index in 0..self.rules.len() {
            changed |= self.apply(registry, index)?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldKind;
    use crate::form::FieldHandle;

    fn judicial() -> (FieldRegistry, VisibilityController) {
        let mut registry = FieldRegistry::new();
        registry
            .insert(FieldHandle::new("medida_judicial", FieldKind::Checkbox))
            .unwrap();
        registry
            .insert(FieldHandle::new("numero", FieldKind::Text).with_required(true))
            .unwrap();
        registry
            .insert(FieldHandle::new("descricao", FieldKind::Textarea))
            .unwrap();
        registry.define_block(
            "judicial",
            vec![FieldId::from("numero"), FieldId::from("descricao")],
        );
        let mut controller = VisibilityController::new();
        controller.register(
            VisibilityRule::new("medida_judicial", Predicate::Checked)
                .with_block("judicial")
                .with_target("numero", true)
                .with_target("descricao", false),
        );
        (registry, controller)
    }

    #[test]
    fn hidden_targets_drop_required() {
        let (mut registry, controller) = judicial();
        controller.apply(&mut registry, 0).unwrap();
        let numero = registry.resolve("numero").unwrap();
        assert!(!numero.is_visible());
        assert!(!numero.is_required());
        assert!(!registry.block("judicial").unwrap().visible);
    }

    #[test]
    fn shown_targets_restore_only_their_rule() {
        let (mut registry, controller) = judicial();
        controller.apply(&mut registry, 0).unwrap();
        registry
            .resolve_mut("medida_judicial")
            .unwrap()
            .set_value(FieldValue::Checked(true))
            .unwrap();
        assert!(controller.apply(&mut registry, 0).unwrap());
        assert!(registry.resolve("numero").unwrap().is_required());
        assert!(!registry.resolve("descricao").unwrap().is_required());
        assert!(registry.resolve("descricao").unwrap().is_visible());
    }

    #[test]
    fn applying_twice_changes_nothing_more() {
        let (mut registry, controller) = judicial();
        controller.apply(&mut registry, 0).unwrap();
        let snapshot = registry
            .iter()
            .map(|field| field.state().clone())
            .collect::<Vec<_>>();
        assert!(!controller.apply(&mut registry, 0).unwrap());
        let again = registry
            .iter()
            .map(|field| field.state().clone())
            .collect::<Vec<_>>();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn hiding_clears_error_annotation() {
        let (mut registry, controller) = judicial();
        registry.resolve_mut("numero").unwrap().error = Some("Campo obrigatório".into());
        controller.apply(&mut registry, 0).unwrap();
        assert_eq!(registry.resolve("numero").unwrap().error, None);
    }

    #[test]
    fn none_of_treats_unset_choice_as_empty() {
        let predicate = Predicate::NoneOf(vec!["SEM".into(), String::new()]);
        assert!(!predicate.evaluate(&FieldValue::Choice(None)));
        assert!(!predicate.evaluate(&FieldValue::choice("SEM")));
        assert!(predicate.evaluate(&FieldValue::choice("ONC")));
    }

    #[test]
    fn custom_predicates_see_the_value() {
        let predicate = Predicate::custom(|value| matches!(value, FieldValue::Multi(items) if items.len() > 1));
        assert!(predicate.evaluate(&FieldValue::Multi(vec!["a".into(), "b".into()])));
        assert!(!predicate.evaluate(&FieldValue::Multi(vec!["a".into()])));
    }

    #[test]
    fn unknown_driver_is_reported() {
        let mut registry = FieldRegistry::new();
        let mut controller = VisibilityController::new();
        controller.register(VisibilityRule::new("ghost", Predicate::Filled));
        let err = controller.apply(&mut registry, 0).unwrap_err();
        assert_eq!(err, FormError::UnknownField(FieldId::from("ghost")));
    }
}
