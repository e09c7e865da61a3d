//! Pattern matches for compiler-generated structure. Each detector reads a
//! partially built index and reports what it found; the build pipeline
//! decides what to do with ambiguity.

use std::collections::BTreeSet;

use tracing::debug;

use crate::entry::{ClassEntry, MethodEntry};
use crate::ir::{Class, InsnEvent, Method};
use crate::jar_index::JarIndex;
use crate::translation_index::TranslationIndex;

/// Outcome of one detector run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Detection<T> {
    Resolved(T),
    /// The pattern matched but more than one (or no) answer fits.
    Ambiguous(Vec<T>),
    NotApplicable,
}

impl<T> Detection<T> {
    pub fn resolved(self) -> Option<T> {
        match self {
            Detection::Resolved(value) => Some(value),
            Detection::Ambiguous(_) | Detection::NotApplicable => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Detection::Resolved(_))
    }
}

/// A synthetic method whose body makes exactly one method call bridges to
/// that call's (resolved) target.
pub(crate) fn find_bridged_method(
    translation: &TranslationIndex,
    method: &Method,
) -> Detection<MethodEntry> {
    if !method.is_synthetic() {
        return Detection::NotApplicable;
    }
    let mut calls = method.method_calls();
    match (calls.next(), calls.next()) {
        (Some(call), None) => Detection::Resolved(translation.resolve_entry(&call.entry())),
        _ => Detection::NotApplicable,
    }
}

/// Infer the enclosing class of `class`.
///
/// Names that already carry `$` keep their written outer class when it is in
/// the archive. Otherwise each constructor that assigns only its own
/// synthetic fields before delegating to `super(...)`/`this(...)` is a
/// candidate: the field types and the classes calling the constructor vote
/// for the outer class.
pub(crate) fn find_outer_class(index: &JarIndex, class: &Class) -> Detection<ClassEntry> {
    let inner = class.entry();
    if let Some(outer) = inner.outer_class_entry() {
        if index.contains_class(&outer) {
            return Detection::Resolved(outer);
        }
    }

    let mut ambiguous = None;
    for constructor in class.constructors() {
        let Some(field_types) = illegally_set_field_types(class, constructor) else {
            continue;
        };
        let field_classes: BTreeSet<ClassEntry> = field_types
            .into_iter()
            .filter(|candidate| is_sane_outer_class(index, candidate, &inner))
            .collect();

        let constructor_entry = constructor.entry(&inner);
        let callers: BTreeSet<ClassEntry> = index
            .behavior_references(&constructor_entry)
            .filter_map(|reference| reference.context.as_ref())
            .filter(|caller| !is_subclass_super_call(index, caller, &inner))
            .map(|caller| caller.class.clone())
            .filter(|caller| is_sane_outer_class(index, caller, &inner))
            .collect();

        match decide_outer_class(&field_classes, &callers) {
            Detection::Resolved(outer) => return Detection::Resolved(outer),
            Detection::Ambiguous(candidates) => {
                debug!(
                    class = inner.name(),
                    constructor = %constructor.descriptor,
                    candidates = candidates.len(),
                    "constructor does not single out an outer class"
                );
                ambiguous.get_or_insert(candidates);
            }
            Detection::NotApplicable => {}
        }
    }
    match ambiguous {
        Some(candidates) => Detection::Ambiguous(candidates),
        None => Detection::NotApplicable,
    }
}

fn decide_outer_class(
    field_classes: &BTreeSet<ClassEntry>,
    callers: &BTreeSet<ClassEntry>,
) -> Detection<ClassEntry> {
    match callers.len() {
        0 => single_or_ambiguous(field_classes.iter().cloned().collect()),
        1 => callers
            .iter()
            .next()
            .cloned()
            .map_or(Detection::NotApplicable, Detection::Resolved),
        _ => {
            let intersection: Vec<ClassEntry> =
                callers.intersection(field_classes).cloned().collect();
            if intersection.len() == 1 {
                single_or_ambiguous(intersection)
            } else {
                Detection::Ambiguous(callers.iter().cloned().collect())
            }
        }
    }
}

fn single_or_ambiguous(mut candidates: Vec<ClassEntry>) -> Detection<ClassEntry> {
    if candidates.len() == 1 {
        candidates
            .pop()
            .map_or(Detection::NotApplicable, Detection::Resolved)
    } else {
        Detection::Ambiguous(candidates)
    }
}

/// The outer class must be another class of the archive.
fn is_sane_outer_class(index: &JarIndex, outer: &ClassEntry, inner: &ClassEntry) -> bool {
    outer != inner && index.contains_class(outer)
}

/// A subclass constructor calling `super(...)` into `inner` is not a use site.
fn is_subclass_super_call(index: &JarIndex, caller: &MethodEntry, inner: &ClassEntry) -> bool {
    caller.is_constructor()
        && index.translation_index().superclass(&caller.class) == Some(inner)
}

/// Types of the synthetic fields a constructor assigns before its first
/// `super(...)`/`this(...)` call. `None` when the constructor assigns nothing
/// early, or assigns a field that is not a synthetic field of its own class.
fn illegally_set_field_types(class: &Class, constructor: &Method) -> Option<BTreeSet<ClassEntry>> {
    let mut types = BTreeSet::new();
    let mut writes = 0usize;
    for event in &constructor.events {
        match event {
            InsnEvent::ConstructorCall(_) => break,
            InsnEvent::FieldWrite(write) => {
                writes += 1;
                if write.owner != class.name || write.is_static {
                    debug!(
                        class = class.name.as_str(),
                        field = write.name.as_str(),
                        owner = write.owner.as_str(),
                        "constructor writes a foreign field before super(), skipping"
                    );
                    return None;
                }
                let field = class.field(&write.name, &write.descriptor)?;
                if !field.is_synthetic() {
                    debug!(
                        class = class.name.as_str(),
                        field = write.name.as_str(),
                        "constructor writes a non-synthetic field before super(), skipping"
                    );
                    return None;
                }
                if let Some(name) = field.descriptor.class_name() {
                    if !field.descriptor.as_str().starts_with('[') {
                        types.insert(ClassEntry::new(name));
                    }
                }
            }
            InsnEvent::FieldRead(_) | InsnEvent::MethodCall(_) | InsnEvent::ObjectCreation(_) => {}
        }
    }
    (writes > 0).then_some(types)
}

/// Decide whether `class`, already nested somewhere, is an anonymous class,
/// and if so which behavior instantiates it.
pub(crate) fn find_anonymous_caller(index: &JarIndex, class: &Class) -> Detection<MethodEntry> {
    if class.has_inner_classes_attribute || class.is_abstract() {
        return Detection::NotApplicable;
    }
    let mut constructors = class.constructors();
    let (Some(constructor), None) = (constructors.next(), constructors.next()) else {
        return Detection::NotApplicable;
    };

    let inner = class.entry();
    let constructor_entry = constructor.entry(&inner);
    let mut references = index.behavior_references(&constructor_entry);
    let (Some(reference), None) = (references.next(), references.next()) else {
        return Detection::NotApplicable;
    };
    let Some(caller) = reference.context.clone() else {
        return Detection::NotApplicable;
    };

    let field_escape = index
        .referenced_fields(&caller)
        .iter()
        .any(|field| field.descriptor.is_class(inner.name()));
    let behavior_escape = index
        .referenced_behaviors(&caller)
        .iter()
        .any(|behavior| behavior.descriptor.mentions_class(inner.name()));
    if field_escape || behavior_escape {
        debug!(
            class = inner.name(),
            caller = %caller,
            "caller names the class type, not anonymous"
        );
        return Detection::NotApplicable;
    }
    Detection::Resolved(caller)
}
