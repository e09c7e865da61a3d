use std::collections::{BTreeMap, BTreeSet};

use crate::entry::{ClassEntry, FieldEntry, MemberEntry, MethodEntry};
use crate::error::StructuralError;
use crate::renamer::{ClassRenames, MethodRenames, RenameClasses, RenameMethods};

/// Supertype edges and declared-member sets, enough to answer where an
/// inherited member is actually declared. Usable without the rest of the index.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TranslationIndex {
    superclasses: BTreeMap<ClassEntry, ClassEntry>,
    interfaces: BTreeMap<ClassEntry, BTreeSet<ClassEntry>>,
    fields: BTreeMap<ClassEntry, BTreeSet<FieldEntry>>,
    behaviors: BTreeMap<ClassEntry, BTreeSet<MethodEntry>>,
}

impl TranslationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `class`'s supertypes. Supertypes outside `known` (library
    /// types) are not recorded.
    pub fn index_class(
        &mut self,
        class: &ClassEntry,
        super_name: Option<&ClassEntry>,
        interfaces: &[ClassEntry],
        known: &BTreeSet<ClassEntry>,
    ) -> Result<(), StructuralError> {
        if let Some(superclass) = super_name {
            if superclass == class {
                return Err(StructuralError::SelfSuperclass(class.name().to_string()));
            }
            if known.contains(superclass) {
                self.superclasses.insert(class.clone(), superclass.clone());
            }
        }
        for interface in interfaces {
            if interface == class {
                return Err(StructuralError::SelfInterface(class.name().to_string()));
            }
            if known.contains(interface) {
                self.interfaces
                    .entry(class.clone())
                    .or_default()
                    .insert(interface.clone());
            }
        }
        Ok(())
    }

    pub fn index_field(&mut self, field: FieldEntry) {
        self.fields.entry(field.class.clone()).or_default().insert(field);
    }

    pub fn index_behavior(&mut self, behavior: MethodEntry) {
        self.behaviors
            .entry(behavior.class.clone())
            .or_default()
            .insert(behavior);
    }

    /// Walk every superclass and interface chain with a visited set.
    pub fn check_acyclic(&self) -> Result<(), StructuralError> {
        for class in self.superclasses.keys() {
            let mut seen = BTreeSet::new();
            let mut current = Some(class);
            while let Some(next) = current {
                if !seen.insert(next) {
                    return Err(StructuralError::InheritanceCycle(class.name().to_string()));
                }
                current = self.superclasses.get(next);
            }
        }
        let mut done = BTreeSet::new();
        for class in self.interfaces.keys() {
            self.check_interfaces_acyclic(class, &mut Vec::new(), &mut done)?;
        }
        Ok(())
    }

    fn check_interfaces_acyclic<'a>(
        &'a self,
        class: &'a ClassEntry,
        path: &mut Vec<&'a ClassEntry>,
        done: &mut BTreeSet<&'a ClassEntry>,
    ) -> Result<(), StructuralError> {
        if done.contains(class) {
            return Ok(());
        }
        if path.contains(&class) {
            return Err(StructuralError::InheritanceCycle(class.name().to_string()));
        }
        path.push(class);
        for interface in self.interfaces.get(class).into_iter().flatten() {
            self.check_interfaces_acyclic(interface, path, done)?;
        }
        path.pop();
        done.insert(class);
        Ok(())
    }

    pub fn superclass(&self, class: &ClassEntry) -> Option<&ClassEntry> {
        self.superclasses.get(class)
    }

    /// Superclasses from the direct parent upwards.
    pub fn ancestry(&self, class: &ClassEntry) -> Vec<ClassEntry> {
        let mut ancestors = Vec::new();
        let mut current = self.superclasses.get(class);
        while let Some(superclass) = current {
            ancestors.push(superclass.clone());
            current = self.superclasses.get(superclass);
        }
        ancestors
    }

    /// Direct subclasses, by linear scan.
    pub fn subclasses(&self, class: &ClassEntry) -> Vec<ClassEntry> {
        self.superclasses
            .iter()
            .filter(|(_, superclass)| *superclass == class)
            .map(|(subclass, _)| subclass.clone())
            .collect()
    }

    pub fn subclasses_recursively(&self, class: &ClassEntry) -> BTreeSet<ClassEntry> {
        let mut out = BTreeSet::new();
        let mut pending = self.subclasses(class);
        while let Some(subclass) = pending.pop() {
            if out.insert(subclass.clone()) {
                pending.extend(self.subclasses(&subclass));
            }
        }
        out
    }

    /// Interfaces `class` declares directly.
    pub fn direct_interfaces(&self, class: &ClassEntry) -> impl Iterator<Item = &ClassEntry> {
        self.interfaces.get(class).into_iter().flatten()
    }

    /// Classes (or interfaces) that declare `interface` directly.
    pub fn implementers(&self, interface: &ClassEntry) -> Vec<ClassEntry> {
        self.interfaces
            .iter()
            .filter(|(_, interfaces)| interfaces.contains(interface))
            .map(|(class, _)| class.clone())
            .collect()
    }

    /// Whether some indexed class lists `class` among its direct interfaces.
    /// Declared-but-unimplemented interfaces are not seen here; use the
    /// access flags in [`JarIndex::is_interface`](crate::JarIndex::is_interface).
    pub fn has_implementers(&self, class: &ClassEntry) -> bool {
        self.interfaces
            .values()
            .any(|interfaces| interfaces.contains(class))
    }

    pub fn field_exists(&self, field: &FieldEntry) -> bool {
        self.fields
            .get(&field.class)
            .is_some_and(|fields| fields.contains(field))
    }

    pub fn behavior_exists(&self, behavior: &MethodEntry) -> bool {
        self.behaviors
            .get(&behavior.class)
            .is_some_and(|behaviors| behaviors.contains(behavior))
    }

    pub fn fields_of(&self, class: &ClassEntry) -> impl Iterator<Item = &FieldEntry> {
        self.fields.get(class).into_iter().flatten()
    }

    pub fn behaviors_of(&self, class: &ClassEntry) -> impl Iterator<Item = &MethodEntry> {
        self.behaviors.get(class).into_iter().flatten()
    }

    /// First class on the superclass chain, starting at the entry's own
    /// owner, that declares the member.
    pub fn resolve_superclass<M>(&self, entry: &M) -> Option<ClassEntry>
    where
        M: MemberEntry + Declared,
    {
        let mut owner = entry.owner().clone();
        loop {
            let candidate = entry.with_owner(owner.clone());
            if candidate.is_declared_in(self) {
                return Some(owner);
            }
            owner = self.superclasses.get(&owner)?.clone();
        }
    }

    /// Retry the superclass walk against every interface reachable from the
    /// entry's class: its own interfaces, its ancestors' interfaces, and
    /// their super-interfaces.
    pub fn resolve_interface<M>(&self, entry: &M) -> Option<ClassEntry>
    where
        M: MemberEntry + Declared,
    {
        let mut classes = vec![entry.owner().clone()];
        classes.extend(self.ancestry(entry.owner()));
        let mut seen = BTreeSet::new();
        for class in classes {
            for interface in self.direct_interfaces(&class) {
                if let Some(found) = self.resolve_in_interface(entry, interface, &mut seen) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn resolve_in_interface<M>(
        &self,
        entry: &M,
        interface: &ClassEntry,
        seen: &mut BTreeSet<ClassEntry>,
    ) -> Option<ClassEntry>
    where
        M: MemberEntry + Declared,
    {
        if !seen.insert(interface.clone()) {
            return None;
        }
        if let Some(found) = self.resolve_superclass(&entry.with_owner(interface.clone())) {
            return Some(found);
        }
        let parents: Vec<ClassEntry> = self.direct_interfaces(interface).cloned().collect();
        parents
            .iter()
            .find_map(|parent| self.resolve_in_interface(entry, parent, seen))
    }

    /// Declaring class of a member: superclass chain first, then interfaces.
    /// `None` means the member comes from outside the archive.
    pub fn resolve_entry_class<M>(&self, entry: &M) -> Option<ClassEntry>
    where
        M: MemberEntry + Declared,
    {
        self.resolve_superclass(entry)
            .or_else(|| self.resolve_interface(entry))
    }

    /// The entry re-owned onto its declaring class, or unchanged when unresolved.
    pub fn resolve_entry<M>(&self, entry: &M) -> M
    where
        M: MemberEntry + Declared,
    {
        match self.resolve_entry_class(entry) {
            Some(owner) if &owner != entry.owner() => entry.with_owner(owner),
            _ => entry.clone(),
        }
    }
}

/// Member kinds the translation index keeps declaration sets for.
pub trait Declared {
    fn is_declared_in(&self, index: &TranslationIndex) -> bool;
}

impl Declared for FieldEntry {
    fn is_declared_in(&self, index: &TranslationIndex) -> bool {
        index.field_exists(self)
    }
}

impl Declared for MethodEntry {
    fn is_declared_in(&self, index: &TranslationIndex) -> bool {
        index.behavior_exists(self)
    }
}

impl RenameClasses for TranslationIndex {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        Self {
            superclasses: self.superclasses.rename_classes(renames),
            interfaces: self.interfaces.rename_classes(renames),
            fields: self.fields.rename_classes(renames),
            behaviors: self.behaviors.rename_classes(renames),
        }
    }
}

impl RenameMethods for TranslationIndex {
    fn rename_methods(&self, renames: &MethodRenames) -> Self {
        Self {
            superclasses: self.superclasses.clone(),
            interfaces: self.interfaces.clone(),
            fields: self.fields.clone(),
            behaviors: self.behaviors.rename_methods(renames),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{MethodDescriptor, TypeDescriptor};

    fn class(name: &str) -> ClassEntry {
        ClassEntry::new(name)
    }

    fn method(owner: &str, name: &str, descriptor: &str) -> MethodEntry {
        MethodEntry::new(
            class(owner),
            name,
            MethodDescriptor::parse(descriptor).expect("descriptor"),
        )
    }

    fn archive(names: &[&str]) -> BTreeSet<ClassEntry> {
        names.iter().map(|name| class(name)).collect()
    }

    #[test]
    fn inherited_method_resolves_to_declaring_ancestor() {
        let known = archive(&["A", "B"]);
        let mut index = TranslationIndex::new();
        index
            .index_class(&class("B"), Some(&class("A")), &[], &known)
            .expect("index B");
        index.index_behavior(method("A", "x", "()V"));

        assert_eq!(
            index.resolve_entry_class(&method("B", "x", "()V")),
            Some(class("A"))
        );
        assert_eq!(index.resolve_entry(&method("B", "x", "()V")), method("A", "x", "()V"));
        assert_eq!(index.resolve_entry_class(&method("B", "y", "()V")), None);
    }

    #[test]
    fn interface_declarations_are_found_through_ancestors() {
        let known = archive(&["A", "B", "I", "J"]);
        let mut index = TranslationIndex::new();
        index
            .index_class(&class("A"), None, &[class("I")], &known)
            .expect("index A");
        index
            .index_class(&class("B"), Some(&class("A")), &[], &known)
            .expect("index B");
        index
            .index_class(&class("I"), None, &[class("J")], &known)
            .expect("index I");
        index.index_behavior(method("J", "run", "()V"));

        assert_eq!(index.resolve_superclass(&method("B", "run", "()V")), None);
        assert_eq!(
            index.resolve_entry_class(&method("B", "run", "()V")),
            Some(class("J"))
        );
        assert!(index.has_implementers(&class("J")));
        assert!(!index.has_implementers(&class("B")));
        assert_eq!(index.implementers(&class("I")), vec![class("A")]);
    }

    #[test]
    fn fields_resolve_like_methods() {
        let known = archive(&["A", "B"]);
        let mut index = TranslationIndex::new();
        index
            .index_class(&class("B"), Some(&class("A")), &[], &known)
            .expect("index B");
        let ty = TypeDescriptor::parse("I").expect("type");
        index.index_field(FieldEntry::new(class("A"), "f", ty.clone()));

        assert_eq!(
            index.resolve_entry_class(&FieldEntry::new(class("B"), "f", ty)),
            Some(class("A"))
        );
    }

    #[test]
    fn self_supertypes_are_structural_errors() {
        let known = archive(&["X"]);
        let mut index = TranslationIndex::new();

        assert_eq!(
            index.index_class(&class("X"), Some(&class("X")), &[], &known),
            Err(StructuralError::SelfSuperclass("X".to_string()))
        );
        assert_eq!(
            index.index_class(&class("X"), None, &[class("X")], &known),
            Err(StructuralError::SelfInterface("X".to_string()))
        );
    }

    #[test]
    fn longer_cycles_are_detected() {
        let known = archive(&["X", "Y"]);
        let mut index = TranslationIndex::new();
        index
            .index_class(&class("X"), Some(&class("Y")), &[], &known)
            .expect("index X");
        index
            .index_class(&class("Y"), Some(&class("X")), &[], &known)
            .expect("index Y");

        assert!(matches!(
            index.check_acyclic(),
            Err(StructuralError::InheritanceCycle(_))
        ));
    }

    #[test]
    fn library_supertypes_are_not_recorded() {
        let known = archive(&["A"]);
        let mut index = TranslationIndex::new();
        index
            .index_class(&class("A"), Some(&class("java/lang/Object")), &[], &known)
            .expect("index A");

        assert_eq!(index.superclass(&class("A")), None);
        assert!(index.ancestry(&class("A")).is_empty());
    }

    #[test]
    fn subclass_queries_walk_down() {
        let known = archive(&["A", "B", "C", "D"]);
        let mut index = TranslationIndex::new();
        for (sub, sup) in [("B", "A"), ("C", "B"), ("D", "A")] {
            index
                .index_class(&class(sub), Some(&class(sup)), &[], &known)
                .expect("index");
        }

        assert_eq!(index.subclasses(&class("A")), vec![class("B"), class("D")]);
        assert_eq!(
            index.subclasses_recursively(&class("A")),
            archive(&["B", "C", "D"])
        );
        assert_eq!(index.ancestry(&class("C")), vec![class("B"), class("A")]);
    }
}
