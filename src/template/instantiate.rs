//! Instantiation of loaded declarations into widgets

use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use super::macros::{combine_macros, expand};
use crate::parser::ast::{
    Adjacency, ComponentDecl, ComponentKind, Direction, Document, GroupDecl, Macros,
};

/// Creates widgets by class name and applies properties to them
///
/// Property application is entirely up to the implementor: the engine only
/// hands over resolved names and values.
pub trait WidgetFactory {
    type Widget;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a widget of `class_name`; `object_name` identifies the instance
    fn create(&mut self, class_name: &str, object_name: &str)
        -> Result<Self::Widget, Self::Error>;

    fn apply_property(
        &mut self,
        widget: &mut Self::Widget,
        name: &str,
        value: &str,
    ) -> Result<(), Self::Error>;
}

/// Errors raised while instantiating a document
#[derive(Debug, Error)]
pub enum InstantiateError {
    #[error("unknown group/component name: '{name}'")]
    UnknownComponent { name: String },

    #[error("component '{component}' refers to unknown group '{group}'")]
    UnknownGroup { component: String, group: String },

    #[error("group '{group}' contains itself: {}", chain.join(" -> "))]
    CircularGroup { group: String, chain: Vec<String> },

    /// The factory failed to create or configure a widget
    #[error("instantiation failed for {name}: {source}")]
    Failed {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("layout merge conflict at {item}/{direction}")]
    MergeConflict { item: String, direction: Direction },
}

impl InstantiateError {
    pub fn failed(
        name: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Failed {
            name: name.into(),
            source: Box::new(source),
        }
    }
}

/// A single instantiated widget
#[derive(Debug)]
pub struct InstantiatedComponent<W> {
    /// Full prefixed name, e.g. `main.inlet`
    pub name: String,
    /// Resolved class name
    pub class: String,
    pub widget: W,
    pub properties: IndexMap<String, String>,
}

/// An instantiated group with its prefixed sub-layout
#[derive(Debug)]
pub struct InstantiatedGroup<W> {
    pub name: String,
    /// Name of the group declaration this was built from
    pub group: String,
    pub components: IndexMap<String, Instantiated<W>>,
    pub layout: Adjacency,
    pub anchors: IndexMap<Direction, String>,
}

#[derive(Debug)]
pub enum Instantiated<W> {
    Component(InstantiatedComponent<W>),
    Group(InstantiatedGroup<W>),
}

impl<W> Instantiated<W> {
    pub fn name(&self) -> &str {
        match self {
            Self::Component(c) => &c.name,
            Self::Group(g) => &g.name,
        }
    }

    fn collect_widgets<'a>(&'a self, out: &mut Vec<(&'a str, &'a W)>) {
        match self {
            Self::Component(c) => out.push((&c.name, &c.widget)),
            Self::Group(g) => g.components.values().for_each(|c| c.collect_widgets(out)),
        }
    }
}

/// A macro expansion that never settled
#[derive(Debug, Clone, PartialEq)]
pub struct MacroRunaway {
    pub component: String,
    pub text: String,
}

/// Result of instantiating a whole document
#[derive(Debug)]
pub struct InstantiatedMap<W> {
    /// Top-level results keyed by prefixed name
    pub components: IndexMap<String, Instantiated<W>>,
    /// The document's own layout, prefixed
    pub layout: Adjacency,
    /// Every group's internal layout plus the document layout
    pub merged_layout: Adjacency,
    pub macro_warnings: Vec<MacroRunaway>,
}

impl<W> InstantiatedMap<W> {
    /// Flattened name -> widget view, nested groups included
    pub fn widgets(&self) -> Vec<(&str, &W)> {
        let mut out = Vec::new();
        for component in self.components.values() {
            component.collect_widgets(&mut out);
        }
        out
    }

    pub fn widget(&self, name: &str) -> Option<&W> {
        self.widgets()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, w)| w)
    }
}

/// Walks declarations, combining macro scopes and driving the factory
pub struct Instantiator<'a, F: WidgetFactory> {
    groups: &'a IndexMap<String, GroupDecl>,
    factory: &'a mut F,
    /// Groups currently being expanded, outermost first
    resolving: Vec<String>,
    macro_warnings: Vec<MacroRunaway>,
}

impl<'a, F: WidgetFactory> Instantiator<'a, F> {
    pub fn new(groups: &'a IndexMap<String, GroupDecl>, factory: &'a mut F) -> Self {
        Self {
            groups,
            factory,
            resolving: Vec::new(),
            macro_warnings: Vec::new(),
        }
    }

    pub fn macro_warnings(&self) -> &[MacroRunaway] {
        &self.macro_warnings
    }

    pub fn into_macro_warnings(self) -> Vec<MacroRunaway> {
        self.macro_warnings
    }

    /// Instantiate the declaration `name` out of `components`
    ///
    /// `macros` is the caller's scope; the declaration's own macros override it.
    pub fn instantiate(
        &mut self,
        name: &str,
        components: &IndexMap<String, ComponentDecl>,
        macros: &Macros,
        prefix: &str,
    ) -> Result<Instantiated<F::Widget>, InstantiateError> {
        let full_name = add_prefix(prefix, name);
        let decl = components
            .get(name)
            .ok_or_else(|| InstantiateError::UnknownComponent {
                name: full_name.clone(),
            })?;

        let macros = combine_macros([macros, &decl.macros]);
        debug!("Instantiate {} ({}) (macros={:?})", full_name, name, macros);

        match &decl.kind {
            ComponentKind::Group(group) => self.instantiate_group(&full_name, group, &macros),
            ComponentKind::Class(class) => {
                self.instantiate_component(&full_name, class, &decl.properties, &macros)
            }
        }
    }

    fn instantiate_group(
        &mut self,
        full_name: &str,
        group_ref: &str,
        component_macros: &Macros,
    ) -> Result<Instantiated<F::Widget>, InstantiateError> {
        let group_name = self.resolve(full_name, group_ref, component_macros);
        let groups = self.groups;
        let group = groups
            .get(&group_name)
            .ok_or_else(|| InstantiateError::UnknownGroup {
                component: full_name.to_string(),
                group: group_name.clone(),
            })?;

        if self.resolving.contains(&group_name) {
            let mut chain = self.resolving.clone();
            chain.push(group_name.clone());
            return Err(InstantiateError::CircularGroup {
                group: group_name,
                chain,
            });
        }

        let macros = combine_macros([&group.macros, component_macros]);
        self.resolving.push(group_name.clone());
        let members = self.instantiate_members(full_name, group, &macros);
        self.resolving.pop();

        Ok(Instantiated::Group(InstantiatedGroup {
            name: full_name.to_string(),
            group: group_name,
            components: members?,
            layout: prefixed_layout(&group.layout, full_name),
            anchors: group
                .anchors
                .iter()
                .map(|(side, member)| (*side, add_prefix(full_name, member)))
                .collect(),
        }))
    }

    fn instantiate_members(
        &mut self,
        full_name: &str,
        group: &GroupDecl,
        macros: &Macros,
    ) -> Result<IndexMap<String, Instantiated<F::Widget>>, InstantiateError> {
        let mut members = IndexMap::new();
        for member in group.components.keys() {
            debug!("Instantiating component {} of group {}", member, group.name);
            let result = self.instantiate(member, &group.components, macros, full_name)?;
            members.insert(add_prefix(full_name, member), result);
        }
        Ok(members)
    }

    fn instantiate_component(
        &mut self,
        full_name: &str,
        class: &str,
        properties: &IndexMap<String, String>,
        macros: &Macros,
    ) -> Result<Instantiated<F::Widget>, InstantiateError> {
        let class = self.resolve(full_name, class, macros);
        let mut resolved = IndexMap::new();
        for (prop, value) in properties {
            let prop = self.resolve(full_name, prop, macros);
            let value = self.resolve(full_name, value, macros);
            resolved.insert(prop, value);
        }

        let object_name = full_name.replace('*', "_");
        let mut widget = self
            .factory
            .create(&class, &object_name)
            .map_err(|e| InstantiateError::failed(full_name, e))?;

        for (prop, value) in &resolved {
            debug!("Setting property: {}.{} = {}", class, prop, value);
            self.factory
                .apply_property(&mut widget, prop, value)
                .map_err(|e| InstantiateError::failed(full_name, e))?;
        }

        debug!(
            "Instantiated class {} -> {} (properties={:?})",
            class, object_name, resolved
        );
        Ok(Instantiated::Component(InstantiatedComponent {
            name: full_name.to_string(),
            class,
            widget,
            properties: resolved,
        }))
    }

    /// Expand a template, recording runaway recursion
    fn resolve(&mut self, component: &str, text: &str, macros: &Macros) -> String {
        let expansion = expand(text, macros);
        if !expansion.converged {
            warn!(
                "Excessive macro recursion in '{}' of {}; using last value",
                text,
                component
            );
            self.macro_warnings.push(MacroRunaway {
                component: component.to_string(),
                text: text.to_string(),
            });
        }
        expansion.value
    }
}

/// Instantiate every top-level component of `document`
///
/// Group sub-layouts, nested ones included, are merged first and the
/// document's own layout last.
pub fn instantiate_document<F: WidgetFactory>(
    document: &Document,
    factory: &mut F,
    macros: &Macros,
    prefix: &str,
) -> Result<InstantiatedMap<F::Widget>, InstantiateError> {
    let mut instantiator = Instantiator::new(&document.groups, factory);
    let mut components = IndexMap::new();
    let mut merged_layout = Adjacency::new();

    for name in document.components.keys() {
        debug!("Instantiating top-level map component: {}", name);
        let result = instantiator.instantiate(name, &document.components, macros, prefix)?;
        merge_group_layouts(&mut merged_layout, &result)?;
        components.insert(add_prefix(prefix, name), result);
    }

    let layout = prefixed_layout(&document.layout, prefix);
    merge_layout(&mut merged_layout, &layout)?;

    Ok(InstantiatedMap {
        components,
        layout,
        merged_layout,
        macro_warnings: instantiator.into_macro_warnings(),
    })
}

fn merge_group_layouts<W>(
    merged: &mut Adjacency,
    result: &Instantiated<W>,
) -> Result<(), InstantiateError> {
    if let Instantiated::Group(group) = result {
        merge_layout(merged, &group.layout)?;
        for member in group.components.values() {
            merge_group_layouts(merged, member)?;
        }
    }
    Ok(())
}

/// Merge `other` into `layout`; a direction may not be assigned twice
pub fn merge_layout(layout: &mut Adjacency, other: &Adjacency) -> Result<(), InstantiateError> {
    for (item, targets) in other {
        let entry = layout.entry(item.clone()).or_default();
        for (direction, target) in targets {
            if entry.contains_key(direction) {
                return Err(InstantiateError::MergeConflict {
                    item: item.clone(),
                    direction: *direction,
                });
            }
            entry.insert(*direction, target.clone());
        }
    }
    Ok(())
}

pub fn add_prefix(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Prefix every item name in a layout
pub fn prefixed_layout(layout: &Adjacency, prefix: &str) -> Adjacency {
    layout
        .iter()
        .map(|(item, targets)| {
            let targets = targets
                .iter()
                .map(|(direction, target)| (*direction, add_prefix(prefix, target)))
                .collect();
            (add_prefix(prefix, item), targets)
        })
        .collect()
}
