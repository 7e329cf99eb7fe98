use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use indexmap::IndexMap;
use jsonschema::{Validator, validator_for};
use serde_json::{Map, Value};

use crate::domain::{FieldKind, FormDefinition};
use crate::form::{
    EventBus, FieldHandle, FieldId, FieldRegistry, FieldValue, FormCommand, FormError, Listener,
    LookupStatus, Subscription,
};
use crate::lookup::{
    LookupAdapter, LookupEndpoint, LookupError, LookupItem, LookupOutcome, LookupQuery,
    LookupTracker, LookupTransport, PendingLookup,
};

use super::controller::{
    CollapsibleSection, DependencyEdge, DependentSelection, FilterByParent, SectionController,
    VisibilityController, VisibilityRule,
};
use super::options::PageOptions;
use super::status::StatusLine;
use super::validation::{ValidationReport, validate, validate_payload};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The gate passed; the payload is what the form posts.
    Proceed(Value),
    Blocked(ValidationReport),
}

/// Where the view should scroll after a blocked submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub field: FieldId,
    pub margin: u16,
}

/// One form page: the registry plus the controllers wired onto it.
pub struct FormPage {
    id: String,
    title: Option<String>,
    action: Option<String>,
    registry: FieldRegistry,
    dependencies: DependentSelection,
    visibility: VisibilityController,
    sections: SectionController,
    bus: EventBus,
    subscriptions: Vec<Subscription>,
    lookups: LookupTracker,
    endpoints: IndexMap<FieldId, LookupAdapter>,
    payload_validator: Option<Validator>,
    options: PageOptions,
    status: StatusLine,
}

impl fmt::Debug for FormPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormPage")
            .field("id", &self.id)
            .field("fields", &self.registry.len())
            .field("dependencies", &self.dependencies.edges().len())
            .field("visibility", &self.visibility.rules().len())
            .field("sections", &self.sections.sections().len())
            .field("listeners", &self.bus.len())
            .finish_non_exhaustive()
    }
}

impl FormPage {
    pub fn from_definition(definition: &FormDefinition, options: PageOptions) -> Result<Self> {
        let mut registry = FieldRegistry::from_definitions(&definition.fields)?;

        let mut dependencies = DependentSelection::new();
        for dependency in &definition.dependencies {
            let child = FieldId::from(dependency.child.as_str());
            let parent = FieldId::from(dependency.parent.as_str());
            if child == parent {
                return Err(FormError::SelfDependency(child).into());
            }
            let rule = format!("dependency {parent} -> {child}");
            if !known(&registry, &rule, &[&child, &parent], options.strict)? {
                continue;
            }
            dependencies.bind(
                DependencyEdge::new(
                    child,
                    parent,
                    Arc::new(FilterByParent::new(dependency.filter_key.clone())),
                )
                .with_placeholders(
                    dependency.placeholder_enabled.clone(),
                    dependency.placeholder_disabled.clone(),
                ),
            );
        }
        detect_cycle(dependencies.edges())?;

        let mut visibility = VisibilityController::new();
        for rule_definition in &definition.visibility {
            let rule = VisibilityRule::from_definition(rule_definition);
            let fields = rule.fields().collect::<Vec<_>>();
            let label = format!("visibility rule on {}", rule.driver);
            if !known(&registry, &label, &fields, options.strict)? {
                continue;
            }
            if let Some(block) = &rule.block {
                registry.define_block(
                    block.clone(),
                    rule.targets.iter().map(|target| target.field.clone()).collect(),
                );
            }
            visibility.register(rule);
        }

        let mut sections = SectionController::new();
        for section_definition in &definition.sections {
            let section = CollapsibleSection::from_definition(section_definition);
            let mut fields = section.fields.iter().collect::<Vec<_>>();
            fields.extend(section.marker.iter());
            let label = format!("section {}", section.id);
            if !known(&registry, &label, &fields, options.strict)? {
                continue;
            }
            // Both controllers write visible and required; one owner per field.
            if let Some(field) = section.fields.iter().find(|field| {
                visibility
                    .rules()
                    .iter()
                    .any(|rule| rule.targets.iter().any(|target| &target.field == *field))
            }) {
                return Err(FormError::ConflictingControl {
                    field: field.clone(),
                    section: section.id.clone(),
                }
                .into());
            }
            registry.define_block(section.id.clone(), section.fields.clone());
            sections.add(section);
        }

        let mut endpoints = IndexMap::new();
        for field in &definition.fields {
            if field.kind != FieldKind::Lookup {
                continue;
            }
            match &field.autocomplete_url {
                Some(url) => {
                    let endpoint = LookupEndpoint::new(url.clone())
                        .with_settings(field.lookup.unwrap_or_default());
                    endpoints.insert(
                        FieldId::from(field.id.as_str()),
                        LookupAdapter::new(endpoint).with_keys(options.keys.clone()),
                    );
                }
                None => {
                    tracing::error!(field = %field.id, "lookup field has no autocomplete url; remote search disabled");
                }
            }
        }

        let payload_validator = match &definition.payload_schema {
            Some(schema) => Some(
                validator_for(schema).map_err(|err| anyhow!("invalid payload schema: {err}"))?,
            ),
            None => None,
        };

        let mut page = Self {
            id: definition.id.clone(),
            title: definition.title.clone(),
            action: definition.action.clone(),
            registry,
            dependencies,
            visibility,
            sections,
            bus: EventBus::new(),
            subscriptions: Vec::new(),
            lookups: LookupTracker::new(),
            endpoints,
            payload_validator,
            options,
            status: StatusLine::new(),
        };
        page.rewire();
        page.initialize()?;
        Ok(page)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn field(&self, id: &str) -> Option<&FieldHandle> {
        self.registry.resolve(id)
    }

    pub fn options(&self) -> &PageOptions {
        &self.options
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn sections(&self) -> &SectionController {
        &self.sections
    }

    pub fn endpoint(&self, field: &str) -> Option<&LookupAdapter> {
        self.endpoints.get(field)
    }

    /// Drop every listener and subscribe again from the current rules.
    pub fn rewire(&mut self) {
        self.bus.dispose(self.subscriptions.drain(..));
        for (index, edge) in self.dependencies.edges().iter().enumerate() {
            self.subscriptions
                .push(self.bus.subscribe(edge.parent.clone(), Listener::Dependency(index)));
        }
        for (index, rule) in self.visibility.rules().iter().enumerate() {
            self.subscriptions
                .push(self.bus.subscribe(rule.driver.clone(), Listener::Visibility(index)));
        }
        if self.options.clear_errors_on_edit {
            for field in self.registry.iter() {
                self.subscriptions
                    .push(self.bus.subscribe(field.id.clone(), Listener::ClearError));
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.bus.len()
    }

    /// Bring every controller in line with the values present at load.
    fn initialize(&mut self) -> Result<(), FormError> {
        // Chained edges settle within one pass per edge.
        for _ in 0..=self.dependencies.edges().len() {
            let mut changed = false;
            for index in 0..self.dependencies.edges().len() {
                changed |= self.dependencies.initialize(&mut self.registry, index)?;
            }
            if !changed {
                break;
            }
        }
        self.visibility.apply_all(&mut self.registry)?;
        self.sections.initialize(&mut self.registry)?;
        Ok(())
    }

    pub fn dispatch(&mut self, command: FormCommand) -> Result<bool, FormError> {
        match command {
            FormCommand::SetValue { field, value } => {
                let handle = self.registry.get_mut(&field)?;
                if !handle.is_enabled() {
                    return Err(FormError::FieldDisabled(field));
                }
                let changed = handle.set_value(value)?;
                if changed {
                    self.status.value_updated(&handle.label);
                    self.propagate(field)?;
                }
                Ok(changed)
            }
            FormCommand::Clear { field } => {
                let changed = self.registry.get_mut(&field)?.clear_value();
                if changed {
                    self.propagate(field)?;
                }
                Ok(changed)
            }
            FormCommand::SelectOption { field, item } => {
                let handle = self.registry.get_mut(&field)?;
                if !handle.is_enabled() {
                    return Err(FormError::FieldDisabled(field));
                }
                let changed = handle.set_value(FieldValue::choice(item.id))?;
                handle.selected_label = Some(item.label);
                if changed {
                    self.status.value_updated(&handle.label);
                    self.propagate(field)?;
                }
                Ok(changed)
            }
            FormCommand::ToggleSection { section } => {
                if self.sections.get(&section).is_none() {
                    tracing::error!(%section, "unknown collapsible section");
                    return Ok(false);
                }
                self.sections.toggle(&mut self.registry, &section)?;
                Ok(true)
            }
        }
    }

    pub fn set_value(&mut self, field: &str, value: FieldValue) -> Result<bool, FormError> {
        self.dispatch(FormCommand::SetValue {
            field: FieldId::from(field),
            value,
        })
    }

    /// Set a field from a raw JSON value, converted per the field's kind.
    pub fn set_json(&mut self, field: &str, value: &Value) -> Result<bool, FormError> {
        let id = FieldId::from(field);
        let kind = self.registry.get(&id)?.kind;
        let value = FieldValue::from_json(kind, value).map_err(|message| {
            FormError::ValueMismatch {
                field: id.clone(),
                message,
            }
        })?;
        self.dispatch(FormCommand::SetValue { field: id, value })
    }

    pub fn clear(&mut self, field: &str) -> Result<bool, FormError> {
        self.dispatch(FormCommand::Clear {
            field: FieldId::from(field),
        })
    }

    pub fn select_option(&mut self, field: &str, item: LookupItem) -> Result<bool, FormError> {
        self.dispatch(FormCommand::SelectOption {
            field: FieldId::from(field),
            item,
        })
    }

    pub fn toggle_section(&mut self, section: &str) -> Result<bool, FormError> {
        self.dispatch(FormCommand::ToggleSection {
            section: section.to_string(),
        })
    }

    /// Run listeners for `origin`, then for every child that a dependency
    /// listener cleared along the way.
    fn propagate(&mut self, origin: FieldId) -> Result<(), FormError> {
        let mut queue = VecDeque::from([origin]);
        let mut visited = HashSet::new();
        while let Some(field) = queue.pop_front() {
            if !visited.insert(field.clone()) {
                continue;
            }
            for listener in self.bus.listeners_for(&field) {
                match listener {
                    Listener::Dependency(index) => {
                        self.dependencies.on_parent_change(
                            &mut self.registry,
                            &mut self.lookups,
                            index,
                        )?;
                        if let Some(edge) = self.dependencies.edge(index) {
                            queue.push_back(edge.child.clone());
                        }
                    }
                    Listener::Visibility(index) => {
                        self.visibility.apply(&mut self.registry, index)?;
                    }
                    Listener::ClearError => {
                        self.registry.get_mut(&field)?.error = None;
                    }
                }
            }
        }
        Ok(())
    }

    /// Issue a lookup for `field`. `None` when no request may be made: the
    /// field is disabled, has no endpoint, the term is too short or its
    /// parent is unset.
    pub fn begin_lookup(
        &mut self,
        field: &str,
        term: &str,
        page: u32,
    ) -> Result<Option<PendingLookup>, FormError> {
        let id = FieldId::from(field);
        let handle = self.registry.get(&id)?;
        if !handle.is_enabled() {
            return Ok(None);
        }
        let Some(adapter) = self.endpoints.get(&id) else {
            tracing::error!(field, "no lookup endpoint configured");
            return Ok(None);
        };
        let settings = &adapter.endpoint.settings;
        if term.chars().count() < settings.min_input {
            let message = self.options.lookup_messages.input_too_short(settings.min_input);
            self.status.set_raw(format!("{}: {message}", handle.label));
            return Ok(None);
        }
        let Some(extra) = self
            .dependencies
            .lookup_params(&self.registry, &id, term, page)?
        else {
            return Ok(None);
        };

        let mut query = LookupQuery::new(term)
            .with_page(page)
            .with_limit(settings.limit);
        query.extra = extra;
        let url = adapter.endpoint.request_url(&query);
        let ticket = self.lookups.issue(&id, query.page);

        let handle = self.registry.get_mut(&id)?;
        handle.lookup_status = LookupStatus::Searching;
        let searching = if query.page > 1 {
            &self.options.lookup_messages.loading_more
        } else {
            &self.options.lookup_messages.searching
        };
        self.status.searching(&handle.label, searching);
        Ok(Some(PendingLookup { ticket, url, query }))
    }

    /// Apply a response, unless a newer request or a parent change has
    /// superseded it.
    pub fn complete_lookup(
        &mut self,
        pending: &PendingLookup,
        response: Result<Value, LookupError>,
    ) -> LookupOutcome {
        let ticket = &pending.ticket;
        if !self.lookups.is_current(ticket) {
            tracing::debug!(field = %ticket.field, page = ticket.page, "discarding stale lookup response");
            return LookupOutcome::Discarded;
        }
        let Some(adapter) = self.endpoints.get(&ticket.field) else {
            return LookupOutcome::Skipped;
        };
        let result = response.and_then(|body| adapter.keys.normalize(&body));
        let Some(handle) = self.registry.resolve_mut(ticket.field.as_str()) else {
            tracing::error!(field = %ticket.field, "lookup field vanished");
            return LookupOutcome::Skipped;
        };
        match result {
            Ok(page) => {
                let results = page.results.len();
                if ticket.page <= 1 {
                    handle.options = page.results;
                } else {
                    handle.options.extend(page.results);
                }
                handle.has_more = page.has_more;
                handle.lookup_status = LookupStatus::Loaded;
                if handle.options.is_empty() {
                    let label = handle.label.clone();
                    self.status
                        .set_raw(format!("{label}: {}", self.options.lookup_messages.no_results));
                } else {
                    self.status.ready();
                }
                LookupOutcome::Applied {
                    results,
                    has_more: page.has_more,
                }
            }
            Err(err) => {
                let message = self.options.lookup_messages.error_loading.to_string();
                tracing::warn!(field = %ticket.field, error = %err, "lookup failed");
                handle.lookup_status = LookupStatus::Failed(message.clone());
                let label = handle.label.clone();
                self.status.lookup_failed(&label, &message);
                LookupOutcome::Failed(err)
            }
        }
    }

    /// Issue and complete a lookup in one step through `transport`.
    pub fn run_lookup(
        &mut self,
        transport: &dyn LookupTransport,
        field: &str,
        term: &str,
        page: u32,
    ) -> Result<LookupOutcome, FormError> {
        let Some(pending) = self.begin_lookup(field, term, page)? else {
            return Ok(LookupOutcome::Skipped);
        };
        let response = transport.fetch(&pending.url);
        Ok(self.complete_lookup(&pending, response))
    }

    pub fn validate(&mut self) -> ValidationReport {
        let report = validate(&mut self.registry, &self.options.required_message);
        if report.ok() {
            self.status.validation_passed();
        } else {
            self.status.issues_remaining(report.issues());
        }
        report
    }

    /// Values the form posts: enabled fields only, masks stripped, unset
    /// choices omitted.
    pub fn payload(&self) -> Value {
        let mut map = Map::new();
        for field in self.registry.iter().filter(|field| field.is_enabled()) {
            if let Some(value) = field.submitted_value() {
                map.insert(field.id.to_string(), value);
            }
        }
        Value::Object(map)
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        let report = self.validate();
        if !report.ok() {
            return SubmitOutcome::Blocked(report);
        }
        let payload = self.payload();
        if let Some(validator) = &self.payload_validator {
            let report = validate_payload(&mut self.registry, validator, &payload);
            if !report.ok() {
                self.status.issues_remaining(report.issues());
                return SubmitOutcome::Blocked(report);
            }
        }
        SubmitOutcome::Proceed(payload)
    }

    pub fn scroll_request(&self) -> Option<ScrollRequest> {
        self.registry.focused().map(|field| ScrollRequest {
            field: field.clone(),
            margin: self.options.scroll_margin,
        })
    }
}

/// Whether every field a rule names is declared. Missing fields disable
/// the rule, or fail the page in strict mode.
fn known(
    registry: &FieldRegistry,
    rule: &str,
    fields: &[&FieldId],
    strict: bool,
) -> Result<bool, FormError> {
    let Some(missing) = fields.iter().find(|field| !registry.contains(field.as_str())) else {
        return Ok(true);
    };
    if strict {
        return Err(FormError::DanglingReference {
            rule: rule.to_string(),
            field: (*missing).clone(),
        });
    }
    tracing::error!(%rule, field = %missing, "rule references an undeclared field; skipped");
    Ok(false)
}

fn detect_cycle(edges: &[DependencyEdge]) -> Result<(), FormError> {
    let mut children: IndexMap<&FieldId, Vec<&FieldId>> = IndexMap::new();
    for edge in edges {
        children.entry(&edge.parent).or_default().push(&edge.child);
    }

    fn visit<'a>(
        node: &'a FieldId,
        children: &IndexMap<&'a FieldId, Vec<&'a FieldId>>,
        path: &mut Vec<&'a FieldId>,
        done: &mut HashSet<&'a FieldId>,
    ) -> Result<(), FormError> {
        if let Some(start) = path.iter().position(|seen| *seen == node) {
            let mut cycle = path[start..].iter().map(|id| (*id).clone()).collect::<Vec<_>>();
            cycle.push(node.clone());
            return Err(FormError::DependencyCycle(cycle));
        }
        if done.contains(node) {
            return Ok(());
        }
        path.push(node);
        for child in children.get(node).into_iter().flatten() {
            visit(*child, children, path, done)?;
        }
        path.pop();
        done.insert(node);
        Ok(())
    }

    let mut done = HashSet::new();
    for parent in children.keys() {
        visit(*parent, &children, &mut Vec::new(), &mut done)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DependencyDefinition, FieldDefinition, PredicateSpec, SectionDefinition,
        TargetDefinition, VisibilityDefinition,
    };
    use serde_json::json;

    fn dependency(child: &str, parent: &str) -> DependencyDefinition {
        DependencyDefinition {
            child: child.into(),
            parent: parent.into(),
            filter_key: format!("{parent}_id"),
            placeholder_enabled: None,
            placeholder_disabled: None,
        }
    }

    fn definition(fields: Vec<FieldDefinition>) -> FormDefinition {
        FormDefinition {
            id: "test".into(),
            title: None,
            action: None,
            fields,
            dependencies: Vec::new(),
            visibility: Vec::new(),
            sections: Vec::new(),
            payload_schema: None,
        }
    }

    fn chain() -> FormDefinition {
        let mut definition = definition(vec![
            FieldDefinition::new("a", FieldKind::Lookup).with_autocomplete("/a/"),
            FieldDefinition::new("b", FieldKind::Lookup).with_autocomplete("/b/"),
            FieldDefinition::new("c", FieldKind::Lookup).with_autocomplete("/c/"),
        ]);
        definition.dependencies = vec![dependency("b", "a"), dependency("c", "b")];
        definition
    }

    #[test]
    fn clearing_a_parent_cascades_down_the_chain() {
        let mut page = FormPage::from_definition(&chain(), PageOptions::default()).unwrap();
        page.set_value("a", FieldValue::choice("1")).unwrap();
        page.set_value("b", FieldValue::choice("2")).unwrap();
        page.set_value("c", FieldValue::choice("3")).unwrap();
        page.clear("a").unwrap();
        for id in ["b", "c"] {
            let field = page.field(id).unwrap();
            assert!(field.is_empty(), "{id} kept a value");
            assert!(!field.is_enabled(), "{id} still enabled");
        }
    }

    #[test]
    fn disabled_child_rejects_values() {
        let mut page = FormPage::from_definition(&chain(), PageOptions::default()).unwrap();
        let err = page.set_value("b", FieldValue::choice("2")).unwrap_err();
        assert_eq!(err, FormError::FieldDisabled(FieldId::from("b")));
    }

    #[test]
    fn rewiring_never_duplicates_listeners() {
        let mut page = FormPage::from_definition(&chain(), PageOptions::default()).unwrap();
        let wired = page.listener_count();
        page.rewire();
        page.rewire();
        assert_eq!(page.listener_count(), wired);
        assert_eq!(wired, 2);
    }

    #[test]
    fn cycles_and_self_edges_are_rejected() {
        let mut looped = chain();
        looped.dependencies.push(dependency("a", "c"));
        let err = FormPage::from_definition(&looped, PageOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("dependency cycle"));

        let mut selfish = chain();
        selfish.dependencies = vec![dependency("a", "a")];
        let err = FormPage::from_definition(&selfish, PageOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "field 'a' depends on itself");
    }

    #[test]
    fn dangling_rules_are_skipped_unless_strict() {
        let mut definition = chain();
        definition.visibility.push(VisibilityDefinition {
            driver: "ghost".into(),
            predicate: PredicateSpec::Checked,
            block: None,
            targets: vec![TargetDefinition {
                field: "a".into(),
                required_when_shown: true,
            }],
        });
        let page = FormPage::from_definition(&definition, PageOptions::default()).unwrap();
        assert!(page.field("a").unwrap().is_visible());

        let err = FormPage::from_definition(&definition, PageOptions::default().with_strict(true))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "visibility rule on ghost references unknown field 'ghost'"
        );
    }

    #[test]
    fn edits_clear_errors_when_enabled() {
        let mut definition = definition(vec![
            FieldDefinition::new("nome", FieldKind::Text).required(),
        ]);
        definition.id = "clear".into();
        let mut page = FormPage::from_definition(
            &definition,
            PageOptions::default().with_clear_errors_on_edit(true),
        )
        .unwrap();
        assert!(!page.validate().ok());
        page.set_value("nome", FieldValue::text("x")).unwrap();
        assert_eq!(page.field("nome").unwrap().error, None);
    }

    #[test]
    fn lookup_pages_replace_then_append() {
        let mut page = FormPage::from_definition(&chain(), PageOptions::default()).unwrap();
        let transport = |url: &str| -> Result<Value, LookupError> {
            let id = if url.contains("page=1") { 1 } else { 2 };
            let more = id == 1;
            Ok(json!({"results": [{"id": id, "nome": format!("item {id}")}], "pagination": {"more": more}}))
        };
        let first = page.run_lookup(&transport, "a", "it", 1).unwrap();
        assert_eq!(first, LookupOutcome::Applied { results: 1, has_more: true });
        page.run_lookup(&transport, "a", "it", 2).unwrap();
        assert_eq!(page.field("a").unwrap().options.len(), 2);
        page.run_lookup(&transport, "a", "it", 1).unwrap();
        assert_eq!(page.field("a").unwrap().options.len(), 1);
    }

    #[test]
    fn child_lookup_waits_for_parent() {
        let mut page = FormPage::from_definition(&chain(), PageOptions::default()).unwrap();
        page.set_value("a", FieldValue::choice("9")).unwrap();
        assert_eq!(page.begin_lookup("c", "x", 1).unwrap(), None);
        let pending = page.begin_lookup("b", "x", 1).unwrap().unwrap();
        assert_eq!(pending.url, "/b/?term=x&page=1&limit=10&a_id=9");
    }

    #[test]
    fn failed_lookup_marks_the_field() {
        let mut page = FormPage::from_definition(&chain(), PageOptions::default()).unwrap();
        let transport = |_: &str| -> Result<Value, LookupError> { Err(LookupError::Status(500)) };
        let outcome = page.run_lookup(&transport, "a", "x", 1).unwrap();
        assert_eq!(outcome, LookupOutcome::Failed(LookupError::Status(500)));
        assert!(matches!(
            page.field("a").unwrap().lookup_status,
            LookupStatus::Failed(_)
        ));
    }

    #[test]
    fn section_members_cannot_follow_a_visibility_rule() {
        let mut definition = definition(vec![
            FieldDefinition::new("flag", FieldKind::Checkbox),
            FieldDefinition::new("x", FieldKind::Text),
        ]);
        definition.visibility.push(VisibilityDefinition {
            driver: "flag".into(),
            predicate: PredicateSpec::Checked,
            block: None,
            targets: vec![TargetDefinition {
                field: "x".into(),
                required_when_shown: true,
            }],
        });
        definition.sections.push(SectionDefinition {
            id: "sec".into(),
            title: None,
            marker: None,
            fields: vec!["x".into()],
        });
        let err = FormPage::from_definition(&definition, PageOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field 'x' is controlled by both section 'sec' and a visibility rule"
        );
    }

    #[test]
    fn lookup_without_url_is_skipped_but_still_cascades() {
        let mut definition = chain();
        definition
            .fields
            .push(FieldDefinition::new("loose", FieldKind::Lookup));
        let mut page = FormPage::from_definition(&definition, PageOptions::default()).unwrap();
        assert!(page.endpoint("loose").is_none());
        let transport = |_: &str| -> Result<Value, LookupError> { Ok(json!([])) };
        assert_eq!(
            page.run_lookup(&transport, "loose", "x", 1).unwrap(),
            LookupOutcome::Skipped
        );

        page.set_value("a", FieldValue::choice("1")).unwrap();
        page.set_value("b", FieldValue::choice("2")).unwrap();
        page.clear("a").unwrap();
        let child = page.field("b").unwrap();
        assert!(child.is_empty());
        assert!(!child.is_enabled());
    }

    #[test]
    fn toggling_an_unknown_section_reports_no_change() {
        let mut page = FormPage::from_definition(&chain(), PageOptions::default()).unwrap();
        assert!(!page.toggle_section("nope").unwrap());
    }

    #[test]
    fn payload_schema_blocks_submission() {
        let mut definition = definition(vec![
            FieldDefinition::new("cpf", FieldKind::Text)
                .with_mask(crate::domain::MaskSpec::Cpf),
        ]);
        definition.payload_schema = Some(json!({
            "type": "object",
            "properties": {"cpf": {"type": "string", "minLength": 11}}
        }));
        let mut page = FormPage::from_definition(&definition, PageOptions::default()).unwrap();
        page.set_value("cpf", FieldValue::text("123")).unwrap();
        assert!(matches!(page.submit(), SubmitOutcome::Blocked(_)));
        page.set_value("cpf", FieldValue::text("12345678901")).unwrap();
        assert_eq!(
            page.submit(),
            SubmitOutcome::Proceed(json!({"cpf": "12345678901"}))
        );
    }
}
