//! Override groups: every declaration that fills the same polymorphic slot.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::entry::{ClassEntry, MemberEntry, MethodEntry};
use crate::jar_index::JarIndex;

impl JarIndex {
    /// Declarations related to `method` through overriding, interface
    /// implementation and bridging. The query is first normalized to its
    /// declaring class, so any member of a group returns the same group.
    /// Constructors, static initializers and unresolvable methods form a
    /// group of their own.
    pub fn related_method_implementations(&self, method: &MethodEntry) -> BTreeSet<MethodEntry> {
        if method.is_constructor() || method.is_static_initializer() {
            return BTreeSet::from([method.clone()]);
        }
        let Some(owner) = self.resolve_entry_class(method) else {
            return BTreeSet::from([method.clone()]);
        };

        let mut related = BTreeSet::new();
        let mut pending = vec![method.with_owner(owner)];
        while let Some(current) = pending.pop() {
            if related.contains(&current) {
                continue;
            }
            pending.extend(self.related_neighbours(&current));
            related.insert(current);
        }
        related
    }

    /// Declarations one step away from `method`. Every step has a way back,
    /// which keeps groups symmetric.
    fn related_neighbours(&self, method: &MethodEntry) -> Vec<MethodEntry> {
        let declared = |owner: &ClassEntry| {
            let candidate = method.with_owner(owner.clone());
            self.contains_behavior(&candidate).then_some(candidate)
        };
        let class = &method.class;
        let subclasses = self.subclasses_recursively(class);
        let mut neighbours = Vec::new();

        if self.is_interface(class) {
            for implementer in self.implementing_classes(class) {
                let inherited = method.with_owner(implementer);
                if let Some(owner) = self.translation_index().resolve_superclass(&inherited) {
                    neighbours.push(method.with_owner(owner));
                }
            }
            neighbours.extend(self.sub_interfaces(class).iter().filter_map(declared));
        } else {
            neighbours.extend(self.ancestry(class).iter().filter_map(declared));
            neighbours.extend(subclasses.iter().filter_map(declared));
        }

        for owner in std::iter::once(class).chain(subclasses.iter()) {
            neighbours.extend(self.interfaces(owner).iter().filter_map(declared));
        }

        if let Some(bridged) = self.bridged_method(method) {
            neighbours.push(bridged.clone());
        }
        neighbours.extend(
            self.bridges()
                .filter(|(_, bridged)| *bridged == method)
                .map(|(bridge, _)| bridge.clone()),
        );
        neighbours.retain(|candidate| self.contains_behavior(candidate));
        neighbours
    }

    /// Interfaces extending `interface`, directly or transitively.
    fn sub_interfaces(&self, interface: &ClassEntry) -> BTreeSet<ClassEntry> {
        let mut found = BTreeSet::new();
        let mut pending = vec![interface.clone()];
        while let Some(current) = pending.pop() {
            for implementer in self.translation_index().implementers(&current) {
                if self.is_interface(&implementer) && found.insert(implementer.clone()) {
                    pending.push(implementer);
                }
            }
        }
        found
    }
}

/// Methods of one override group that were given different names.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InconsistentGroup {
    pub methods: BTreeSet<MethodEntry>,
    pub names: BTreeMap<MethodEntry, String>,
}

/// Collects assigned method names and reports override groups whose members
/// disagree. Nothing is corrected.
pub struct RelatedMethodChecker<'a> {
    index: &'a JarIndex,
    group_of: BTreeMap<MethodEntry, usize>,
    groups: Vec<BTreeSet<MethodEntry>>,
    names: BTreeMap<usize, BTreeMap<MethodEntry, String>>,
}

impl<'a> RelatedMethodChecker<'a> {
    pub fn new(index: &'a JarIndex) -> Self {
        Self {
            index,
            group_of: BTreeMap::new(),
            groups: Vec::new(),
            names: BTreeMap::new(),
        }
    }

    /// Record that `method` was named `name`. Constructors are ignored.
    pub fn check_method(&mut self, method: &MethodEntry, name: impl Into<String>) {
        if method.is_constructor() || method.is_static_initializer() {
            return;
        }
        let group = match self.group_of.get(method) {
            Some(group) => *group,
            None => {
                let related = self.index.related_method_implementations(method);
                let group = self.groups.len();
                for member in &related {
                    self.group_of.insert(member.clone(), group);
                }
                self.group_of.insert(method.clone(), group);
                self.groups.push(related);
                group
            }
        };
        self.names
            .entry(group)
            .or_default()
            .insert(method.clone(), name.into());
    }

    pub fn inconsistent_groups(&self) -> Vec<InconsistentGroup> {
        self.names
            .iter()
            .filter(|(_, names)| names.values().collect::<BTreeSet<_>>().len() > 1)
            .filter_map(|(group, names)| {
                let methods = self.groups.get(*group)?.clone();
                Some(InconsistentGroup {
                    methods,
                    names: names.clone(),
                })
            })
            .collect()
    }

    pub fn has_problems(&self) -> bool {
        !self.inconsistent_groups().is_empty()
    }

    /// Human-readable listing of every inconsistent group.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for group in self.inconsistent_groups() {
            out.push_str("inconsistent names in related methods:\n");
            for (method, name) in &group.names {
                let _ = writeln!(out, "  {method} -> {name}");
            }
        }
        out
    }
}
