//! The aggregate cross-reference index and its pass-ordered build.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::entry::{
    ACC_INTERFACE, ACC_SYNTHETIC, Access, CONSTRUCTOR_NAME, ClassEntry, Entry, FieldEntry,
    MemberEntry, MethodEntry, STATIC_INITIALIZER_NAME,
};
use crate::error::{IndexError, RenameError, StructuralError};
use crate::heuristics::{self, Detection};
use crate::ir::{Class, ClassVisitor, Field, InsnEvent, Method};
use crate::reference::{BehaviorReference, FieldReference};
use crate::renamer::{ClassRenames, MethodRenames, RenameClasses, RenameMethods};
use crate::report::IndexReport;
use crate::scan::{self, ClassSource};
use crate::translation_index::{Declared, TranslationIndex};

/// Build switches for [`JarIndex::build`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexOptions {
    /// Run outer/anonymous class detection and fold corrected `Outer$Inner`
    /// names through the index.
    pub build_inner_classes: bool,
    /// Decode and extract references on the rayon pool.
    pub parallel: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            build_inner_classes: true,
            parallel: true,
        }
    }
}

/// A built index with the non-fatal findings of its build.
#[derive(Clone, Debug)]
pub struct BuildOutput {
    pub index: JarIndex,
    pub report: IndexReport,
}

/// Declarations, references and structural relations of one archive, keyed
/// by obfuscated identity.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JarIndex {
    classes: BTreeSet<ClassEntry>,
    class_flags: BTreeMap<ClassEntry, u16>,
    fields_by_class: BTreeMap<ClassEntry, BTreeSet<FieldEntry>>,
    behaviors_by_class: BTreeMap<ClassEntry, BTreeSet<MethodEntry>>,
    access: BTreeMap<Entry, Access>,
    synthetic: BTreeSet<Entry>,
    behavior_references: BTreeMap<MethodEntry, BTreeSet<BehaviorReference>>,
    field_references: BTreeMap<FieldEntry, BTreeSet<FieldReference>>,
    inner_classes_by_outer: BTreeMap<ClassEntry, BTreeSet<ClassEntry>>,
    outer_classes_by_inner: BTreeMap<ClassEntry, ClassEntry>,
    anonymous_classes: BTreeMap<ClassEntry, MethodEntry>,
    bridged_methods: BTreeMap<MethodEntry, MethodEntry>,
    bridge_methods: BTreeMap<MethodEntry, MethodEntry>,
    translation_index: TranslationIndex,
}

impl JarIndex {
    /// Index `(entry name, bytes)` pairs. Entries that fail to decode are
    /// reported and skipped; broken hierarchy facts abort the build.
    pub fn build<I>(sources: I, options: IndexOptions) -> Result<BuildOutput, IndexError>
    where
        I: IntoIterator<Item = ClassSource>,
    {
        let sources: Vec<ClassSource> = sources
            .into_iter()
            .filter(ClassSource::is_class_file)
            .collect();
        let mut index = JarIndex::default();
        let mut report = IndexReport::default();

        let classes = {
            let _span = info_span!("classes").entered();
            let (decoded, failures) = scan::decode_all(&sources, options.parallel);
            for failure in &failures {
                let error = format!("{:#}", failure.source);
                warn!(entry = failure.entry.as_str(), error = %error, "skipping undecodable class");
                report.record_decode_failure(failure);
            }
            let classes = index.index_classes(decoded, &mut report);
            info!(
                entries = sources.len(),
                classes = classes.len(),
                failures = failures.len(),
                "enumerated classes"
            );
            classes
        };

        {
            let _span = info_span!("members").entered();
            let mut indexer = MemberIndexer { index: &mut index };
            for class in &classes {
                class.accept(&mut indexer);
            }
            info!(entries = index.access.len(), "indexed declarations");
        }

        {
            let _span = info_span!("hierarchy").entered();
            index.index_hierarchy(&classes)?;
            info!("indexed hierarchy");
        }

        {
            let _span = info_span!("references").entered();
            let translation = &index.translation_index;
            let partials = map_classes(&classes, options.parallel, |class| {
                let mut collector = ReferenceCollector::new(translation);
                class.accept(&mut collector);
                collector.references
            });
            for partial in partials {
                index.merge_references(partial);
            }
            index.index_bridges(&classes);
            info!(
                behavior_references = index.behavior_reference_count(),
                field_references = index.field_reference_count(),
                bridges = index.bridged_methods.len(),
                "indexed references"
            );
        }

        if options.build_inner_classes {
            {
                let _span = info_span!("inner_classes").entered();
                index.index_inner_classes(&classes, options.parallel, &mut report)?;
            }
            let _span = info_span!("inner_class_names").entered();
            index = index.fold_inner_class_names()?;
        }

        Ok(BuildOutput { index, report })
    }

    /// Record decoded classes, keeping the first of any duplicate names.
    fn index_classes(&mut self, decoded: Vec<Class>, report: &mut IndexReport) -> Vec<Class> {
        let mut kept = Vec::with_capacity(decoded.len());
        for class in decoded {
            let entry = class.entry();
            if ClassEntry::from_entry_name(&class.entry_name) != entry {
                debug!(
                    entry = class.entry_name.as_str(),
                    class = entry.name(),
                    "class name differs from its archive entry"
                );
            }
            if !self.classes.insert(entry.clone()) {
                warn!(
                    entry = class.entry_name.as_str(),
                    class = entry.name(),
                    "duplicate class, keeping the first definition"
                );
                continue;
            }
            self.access
                .insert(Entry::Class(entry.clone()), Access::from_flags(class.access_flags));
            self.class_flags.insert(entry, class.access_flags);
            if let Some(reason) = &class.members_skipped {
                report.record_partial_decode(&class.entry_name, reason);
            }
            kept.push(class);
        }
        kept
    }

    fn index_member(&mut self, entry: Entry, access_flags: u16) {
        if access_flags & ACC_SYNTHETIC != 0 {
            self.synthetic.insert(entry.clone());
        }
        self.access.insert(entry, Access::from_flags(access_flags));
    }

    fn index_hierarchy(&mut self, classes: &[Class]) -> Result<(), StructuralError> {
        for class in classes {
            let entry = class.entry();
            let superclass = class.super_name.as_deref().map(ClassEntry::new);
            let interfaces: Vec<ClassEntry> =
                class.interfaces.iter().map(ClassEntry::new).collect();
            self.translation_index.index_class(
                &entry,
                superclass.as_ref(),
                &interfaces,
                &self.classes,
            )?;
        }
        self.translation_index.check_acyclic()
    }

    fn merge_references(&mut self, references: ClassReferences) {
        for reference in references.behaviors {
            self.behavior_references
                .entry(reference.entry.clone())
                .or_default()
                .insert(reference);
        }
        for reference in references.fields {
            self.field_references
                .entry(reference.entry.clone())
                .or_default()
                .insert(reference);
        }
    }

    fn index_bridges(&mut self, classes: &[Class]) {
        for class in classes {
            let entry = class.entry();
            for method in &class.methods {
                let Detection::Resolved(target) =
                    heuristics::find_bridged_method(&self.translation_index, method)
                else {
                    continue;
                };
                let bridge = method.entry(&entry);
                debug!(bridge = %bridge, target = %target, "bridge method");
                self.bridge_methods.insert(target.clone(), bridge.clone());
                self.bridged_methods.insert(bridge, target);
            }
        }
    }

    fn index_inner_classes(
        &mut self,
        classes: &[Class],
        parallel: bool,
        report: &mut IndexReport,
    ) -> Result<(), StructuralError> {
        let index: &JarIndex = self;
        let detections = map_classes(classes, parallel, |class| {
            (class.entry(), heuristics::find_outer_class(index, class))
        });
        for (inner, detection) in detections {
            match detection {
                Detection::Resolved(outer) => self.index_inner_class(inner, outer)?,
                Detection::Ambiguous(candidates) => {
                    let names: Vec<&str> = candidates.iter().map(ClassEntry::name).collect();
                    warn!(
                        class = inner.name(),
                        candidates = ?names,
                        "cannot decide the outer class"
                    );
                    report.record_ambiguous_outer_class(&inner, &candidates);
                }
                Detection::NotApplicable => {}
            }
        }

        let nested: Vec<&Class> = classes
            .iter()
            .filter(|class| self.outer_classes_by_inner.contains_key(&class.entry()))
            .collect();
        let anonymous: Vec<(ClassEntry, MethodEntry)> = nested
            .into_iter()
            .filter_map(|class| {
                heuristics::find_anonymous_caller(self, class)
                    .resolved()
                    .map(|caller| (class.entry(), caller))
            })
            .collect();
        self.anonymous_classes.extend(anonymous);

        info!(
            inner_classes = self.outer_classes_by_inner.len(),
            anonymous_classes = self.anonymous_classes.len(),
            ambiguous = report.warnings.len(),
            "indexed inner classes"
        );
        Ok(())
    }

    /// Nest `inner` in `outer`. The outer-class relation stays a forest.
    pub(crate) fn index_inner_class(
        &mut self,
        inner: ClassEntry,
        outer: ClassEntry,
    ) -> Result<(), StructuralError> {
        if let Some(existing) = self.outer_classes_by_inner.get(&inner) {
            if existing == &outer {
                return Ok(());
            }
            return Err(StructuralError::DuplicateOuterClass {
                inner: inner.name().to_string(),
                existing: existing.name().to_string(),
                outer: outer.name().to_string(),
            });
        }
        let mut current = Some(&outer);
        while let Some(class) = current {
            if class == &inner {
                return Err(StructuralError::InnerClassCycle {
                    inner: inner.name().to_string(),
                    outer: outer.name().to_string(),
                });
            }
            current = self.outer_classes_by_inner.get(class);
        }
        self.inner_classes_by_outer
            .entry(outer.clone())
            .or_default()
            .insert(inner.clone());
        self.outer_classes_by_inner.insert(inner, outer);
        Ok(())
    }

    /// Rename every detected inner class to `Outer$Inner` in one batch.
    fn fold_inner_class_names(self) -> Result<JarIndex, RenameError> {
        let mut renames = ClassRenames::new();
        let mut targets = BTreeSet::new();
        for inner in self.outer_classes_by_inner.keys() {
            let Some(renamed) = ClassEntry::build_class_entry(&self.class_chain(inner)) else {
                continue;
            };
            if &renamed == inner {
                continue;
            }
            if self.classes.contains(&renamed) || !targets.insert(renamed.clone()) {
                warn!(
                    class = inner.name(),
                    name = renamed.name(),
                    "nested name is already taken, keeping the flat name"
                );
                continue;
            }
            renames.insert(inner.name(), renamed.name());
        }
        if renames.is_empty() {
            return Ok(self);
        }
        info!(renames = renames.len(), "renaming inner classes");
        self.rename_classes(&renames)
    }

    /// A copy of the index with `renames` applied everywhere. Unknown old
    /// names and renames that would merge two classes are rejected before
    /// anything is rewritten.
    pub fn rename_classes(&self, renames: &ClassRenames) -> Result<JarIndex, RenameError> {
        let renames = renames.without_identity();
        let mut targets = BTreeSet::new();
        for (old, new) in renames.iter() {
            if !self.classes.contains(&ClassEntry::new(old)) {
                return Err(RenameError::UnknownClass(old.to_string()));
            }
            let taken = self.classes.contains(&ClassEntry::new(new)) && renames.get(new).is_none();
            if taken || !targets.insert(new) {
                return Err(RenameError::NameCollision {
                    old: old.to_string(),
                    new: new.to_string(),
                });
            }
        }
        if renames.is_empty() {
            return Ok(self.clone());
        }
        debug!(renames = renames.len(), "renaming classes");
        Ok(self.renamed_classes(&renames))
    }

    fn renamed_classes(&self, renames: &ClassRenames) -> JarIndex {
        JarIndex {
            classes: self.classes.rename_classes(renames),
            class_flags: self.class_flags.rename_classes(renames),
            fields_by_class: self.fields_by_class.rename_classes(renames),
            behaviors_by_class: self.behaviors_by_class.rename_classes(renames),
            access: self.access.rename_classes(renames),
            synthetic: self.synthetic.rename_classes(renames),
            behavior_references: self.behavior_references.rename_classes(renames),
            field_references: self.field_references.rename_classes(renames),
            inner_classes_by_outer: self.inner_classes_by_outer.rename_classes(renames),
            outer_classes_by_inner: self.outer_classes_by_inner.rename_classes(renames),
            anonymous_classes: self.anonymous_classes.rename_classes(renames),
            bridged_methods: self.bridged_methods.rename_classes(renames),
            bridge_methods: self.bridge_methods.rename_classes(renames),
            translation_index: self.translation_index.rename_classes(renames),
        }
    }

    /// A copy of the index with the listed method identities renamed. Owner
    /// and descriptor are kept.
    pub fn rename_methods(&self, renames: &MethodRenames) -> Result<JarIndex, RenameError> {
        let renames: MethodRenames = renames
            .iter()
            .filter(|(method, name)| method.name != *name)
            .map(|(method, name)| (method.clone(), name.to_string()))
            .collect();
        let mut targets = BTreeSet::new();
        for (old, name) in renames.iter() {
            if old.is_constructor()
                || old.is_static_initializer()
                || name == CONSTRUCTOR_NAME
                || name == STATIC_INITIALIZER_NAME
            {
                return Err(RenameError::ReservedMethod(old.to_string()));
            }
            if !self.contains_behavior(old) {
                return Err(RenameError::UnknownMethod(old.to_string()));
            }
            let renamed = MethodEntry::new(old.class.clone(), name, old.descriptor.clone());
            let taken = self.contains_behavior(&renamed) && renames.get(&renamed).is_none();
            if taken || !targets.insert(renamed.clone()) {
                return Err(RenameError::NameCollision {
                    old: old.to_string(),
                    new: renamed.to_string(),
                });
            }
        }
        if renames.is_empty() {
            return Ok(self.clone());
        }
        Ok(JarIndex {
            classes: self.classes.clone(),
            class_flags: self.class_flags.clone(),
            fields_by_class: self.fields_by_class.clone(),
            behaviors_by_class: self.behaviors_by_class.rename_methods(&renames),
            access: self.access.rename_methods(&renames),
            synthetic: self.synthetic.rename_methods(&renames),
            behavior_references: self.behavior_references.rename_methods(&renames),
            field_references: self.field_references.rename_methods(&renames),
            inner_classes_by_outer: self.inner_classes_by_outer.clone(),
            outer_classes_by_inner: self.outer_classes_by_inner.clone(),
            anonymous_classes: self.anonymous_classes.rename_methods(&renames),
            bridged_methods: self.bridged_methods.rename_methods(&renames),
            bridge_methods: self.bridge_methods.rename_methods(&renames),
            translation_index: self.translation_index.rename_methods(&renames),
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.iter()
    }

    pub fn contains_class(&self, class: &ClassEntry) -> bool {
        self.classes.contains(class)
    }

    pub fn contains_field(&self, field: &FieldEntry) -> bool {
        self.fields_by_class
            .get(&field.class)
            .is_some_and(|fields| fields.contains(field))
    }

    pub fn contains_behavior(&self, behavior: &MethodEntry) -> bool {
        self.behaviors_by_class
            .get(&behavior.class)
            .is_some_and(|behaviors| behaviors.contains(behavior))
    }

    /// Arguments are contained when their behavior is and the index is in
    /// range of its parameters.
    pub fn contains_entry(&self, entry: &Entry) -> bool {
        match entry {
            Entry::Class(class) => self.contains_class(class),
            Entry::Field(field) => self.contains_field(field),
            Entry::Method(method) => self.contains_behavior(method),
            Entry::Argument(argument) => {
                self.contains_behavior(&argument.method)
                    && argument.index < argument.method.descriptor.parameter_count()
            }
        }
    }

    pub fn fields_of(&self, class: &ClassEntry) -> impl Iterator<Item = &FieldEntry> {
        self.fields_by_class.get(class).into_iter().flatten()
    }

    pub fn behaviors_of(&self, class: &ClassEntry) -> impl Iterator<Item = &MethodEntry> {
        self.behaviors_by_class.get(class).into_iter().flatten()
    }

    pub fn access(&self, entry: &Entry) -> Option<Access> {
        self.access.get(entry).copied()
    }

    pub fn is_synthetic(&self, entry: &Entry) -> bool {
        self.synthetic.contains(entry)
    }

    /// Every use of `behavior`, keyed by the resolved declaration.
    pub fn behavior_references(
        &self,
        behavior: &MethodEntry,
    ) -> impl Iterator<Item = &BehaviorReference> {
        self.behavior_references.get(behavior).into_iter().flatten()
    }

    pub fn field_references(&self, field: &FieldEntry) -> impl Iterator<Item = &FieldReference> {
        self.field_references.get(field).into_iter().flatten()
    }

    pub(crate) fn behavior_reference_count(&self) -> usize {
        self.behavior_references.values().map(BTreeSet::len).sum()
    }

    pub(crate) fn field_reference_count(&self) -> usize {
        self.field_references.values().map(BTreeSet::len).sum()
    }

    /// Fields used inside `behavior`.
    pub fn referenced_fields(&self, behavior: &MethodEntry) -> BTreeSet<FieldEntry> {
        self.field_references
            .values()
            .flatten()
            .filter(|reference| reference.context.as_ref() == Some(behavior))
            .map(|reference| reference.entry.clone())
            .collect()
    }

    /// Methods and constructors used inside `behavior`.
    pub fn referenced_behaviors(&self, behavior: &MethodEntry) -> BTreeSet<MethodEntry> {
        self.behavior_references
            .values()
            .flatten()
            .filter(|reference| reference.context.as_ref() == Some(behavior))
            .map(|reference| reference.entry.clone())
            .collect()
    }

    pub fn inner_classes(&self, outer: &ClassEntry) -> impl Iterator<Item = &ClassEntry> {
        self.inner_classes_by_outer.get(outer).into_iter().flatten()
    }

    pub fn outer_class(&self, inner: &ClassEntry) -> Option<&ClassEntry> {
        self.outer_classes_by_inner.get(inner)
    }

    /// `(inner, outer)` pairs.
    pub fn outer_classes(&self) -> impl Iterator<Item = (&ClassEntry, &ClassEntry)> {
        self.outer_classes_by_inner.iter()
    }

    pub fn is_anonymous_class(&self, class: &ClassEntry) -> bool {
        self.anonymous_classes.contains_key(class)
    }

    /// The behavior that instantiates an anonymous class.
    pub fn anonymous_class_caller(&self, class: &ClassEntry) -> Option<&MethodEntry> {
        self.anonymous_classes.get(class)
    }

    pub fn anonymous_classes(&self) -> impl Iterator<Item = (&ClassEntry, &MethodEntry)> {
        self.anonymous_classes.iter()
    }

    pub fn bridged_method(&self, bridge: &MethodEntry) -> Option<&MethodEntry> {
        self.bridged_methods.get(bridge)
    }

    pub fn bridge_method(&self, bridged: &MethodEntry) -> Option<&MethodEntry> {
        self.bridge_methods.get(bridged)
    }

    /// `(bridge, bridged)` pairs.
    pub fn bridges(&self) -> impl Iterator<Item = (&MethodEntry, &MethodEntry)> {
        self.bridged_methods.iter()
    }

    pub fn translation_index(&self) -> &TranslationIndex {
        &self.translation_index
    }

    pub fn resolve_entry_class<M>(&self, entry: &M) -> Option<ClassEntry>
    where
        M: MemberEntry + Declared,
    {
        self.translation_index.resolve_entry_class(entry)
    }

    pub fn ancestry(&self, class: &ClassEntry) -> Vec<ClassEntry> {
        self.translation_index.ancestry(class)
    }

    pub fn subclasses(&self, class: &ClassEntry) -> Vec<ClassEntry> {
        self.translation_index.subclasses(class)
    }

    pub fn subclasses_recursively(&self, class: &ClassEntry) -> BTreeSet<ClassEntry> {
        self.translation_index.subclasses_recursively(class)
    }

    /// Interfaces of the class and its ancestors, with their super-interfaces.
    pub fn interfaces(&self, class: &ClassEntry) -> BTreeSet<ClassEntry> {
        let mut pending: Vec<ClassEntry> = Vec::new();
        for owner in std::iter::once(class.clone()).chain(self.ancestry(class)) {
            pending.extend(self.translation_index.direct_interfaces(&owner).cloned());
        }
        let mut interfaces = BTreeSet::new();
        while let Some(interface) = pending.pop() {
            if interfaces.insert(interface.clone()) {
                pending.extend(self.translation_index.direct_interfaces(&interface).cloned());
            }
        }
        interfaces
    }

    /// Concrete classes implementing `interface` directly, through a
    /// sub-interface, or by inheriting from an implementer.
    pub fn implementing_classes(&self, interface: &ClassEntry) -> BTreeSet<ClassEntry> {
        let mut implementing = BTreeSet::new();
        let mut seen = BTreeSet::new();
        let mut pending = vec![interface.clone()];
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            for implementer in self.translation_index.implementers(&current) {
                if self.is_interface(&implementer) {
                    pending.push(implementer);
                } else {
                    implementing.extend(self.subclasses_recursively(&implementer));
                    implementing.insert(implementer);
                }
            }
        }
        implementing
    }

    pub fn is_interface(&self, class: &ClassEntry) -> bool {
        self.class_flags
            .get(class)
            .is_some_and(|flags| flags & ACC_INTERFACE != 0)
    }

    /// Outermost class first, ending with `class`.
    pub fn class_chain(&self, class: &ClassEntry) -> Vec<ClassEntry> {
        let mut chain = vec![class.clone()];
        let mut current = self.outer_classes_by_inner.get(class);
        while let Some(outer) = current {
            chain.push(outer.clone());
            current = self.outer_classes_by_inner.get(outer);
        }
        chain.reverse();
        chain
    }
}

fn map_classes<T, F>(classes: &[Class], parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&Class) -> T + Sync + Send,
{
    if parallel {
        classes.par_iter().map(f).collect()
    } else {
        classes.iter().map(f).collect()
    }
}

/// Fills the declaration tables.
struct MemberIndexer<'a> {
    index: &'a mut JarIndex,
}

impl ClassVisitor for MemberIndexer<'_> {
    fn visit_field(&mut self, class: &Class, field: &Field) {
        let entry = field.entry(&class.entry());
        self.index
            .fields_by_class
            .entry(entry.class.clone())
            .or_default()
            .insert(entry.clone());
        self.index.translation_index.index_field(entry.clone());
        self.index.index_member(Entry::Field(entry), field.access_flags);
    }

    fn visit_method(&mut self, class: &Class, method: &Method) {
        let entry = method.entry(&class.entry());
        self.index
            .behaviors_by_class
            .entry(entry.class.clone())
            .or_default()
            .insert(entry.clone());
        self.index.translation_index.index_behavior(entry.clone());
        self.index.index_member(Entry::Method(entry), method.access_flags);
    }
}

/// References found in one class.
#[derive(Default)]
struct ClassReferences {
    behaviors: Vec<BehaviorReference>,
    fields: Vec<FieldReference>,
}

/// Turns instruction events into references keyed by resolved targets.
struct ReferenceCollector<'a> {
    translation: &'a TranslationIndex,
    context: Option<MethodEntry>,
    references: ClassReferences,
}

impl<'a> ReferenceCollector<'a> {
    fn new(translation: &'a TranslationIndex) -> Self {
        Self {
            translation,
            context: None,
            references: ClassReferences::default(),
        }
    }
}

impl ClassVisitor for ReferenceCollector<'_> {
    fn visit_method(&mut self, class: &Class, method: &Method) {
        self.context = Some(method.entry(&class.entry()));
    }

    fn visit_event(&mut self, class: &Class, _method: &Method, event: &InsnEvent) {
        let context = self.context.clone();
        match event {
            InsnEvent::FieldRead(access) | InsnEvent::FieldWrite(access) => {
                let target = self.translation.resolve_entry(&access.entry());
                self.references
                    .fields
                    .push(FieldReference::new(target, &access.name, context));
            }
            InsnEvent::MethodCall(call) => {
                let target = self.translation.resolve_entry(&call.entry());
                self.references
                    .behaviors
                    .push(BehaviorReference::new(target, &call.name, context));
            }
            InsnEvent::ConstructorCall(site) => {
                let token = if site.owner == class.name { "this" } else { "super" };
                self.references
                    .behaviors
                    .push(BehaviorReference::new(site.entry(), token, context));
            }
            InsnEvent::ObjectCreation(site) => {
                let owner = ClassEntry::new(site.owner.as_str());
                self.references.behaviors.push(BehaviorReference::new(
                    site.entry(),
                    owner.simple_name(),
                    context,
                ));
            }
        }
    }
}
