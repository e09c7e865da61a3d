use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::entry::{ArgumentEntry, ClassEntry, Entry, FieldEntry, MethodEntry};

/// Source tokens that invoke a constructor without naming its class.
const UNNAMED_CONSTRUCTOR_TOKENS: [&str; 3] = ["this", "super", "static"];

/// Common view over entry kinds used as reference targets and contexts.
pub trait EntryLike: Clone {
    fn to_entry(&self) -> Entry;
    fn owner_class(&self) -> &ClassEntry;
    fn is_constructor(&self) -> bool {
        false
    }
}

impl EntryLike for ClassEntry {
    fn to_entry(&self) -> Entry {
        Entry::Class(self.clone())
    }

    fn owner_class(&self) -> &ClassEntry {
        self
    }
}

impl EntryLike for FieldEntry {
    fn to_entry(&self) -> Entry {
        Entry::Field(self.clone())
    }

    fn owner_class(&self) -> &ClassEntry {
        &self.class
    }
}

impl EntryLike for MethodEntry {
    fn to_entry(&self) -> Entry {
        Entry::Method(self.clone())
    }

    fn owner_class(&self) -> &ClassEntry {
        &self.class
    }

    fn is_constructor(&self) -> bool {
        MethodEntry::is_constructor(self)
    }
}

impl EntryLike for ArgumentEntry {
    fn to_entry(&self) -> Entry {
        Entry::Argument(self.clone())
    }

    fn owner_class(&self) -> &ClassEntry {
        &self.method.class
    }
}

impl EntryLike for Entry {
    fn to_entry(&self) -> Entry {
        self.clone()
    }

    fn owner_class(&self) -> &ClassEntry {
        self.class_entry()
    }

    fn is_constructor(&self) -> bool {
        matches!(self, Entry::Method(method) if method.is_constructor())
    }
}

/// A use of `entry` from inside `context`. A reference with no context is a
/// declaration site.
///
/// Equality, ordering and hashing consider only `(entry, context)`.
#[derive(Clone, Debug, Serialize)]
pub struct EntryReference<E, C> {
    pub entry: E,
    pub context: Option<C>,
    named: bool,
}

impl<E: EntryLike, C> EntryReference<E, C> {
    /// `source_name` is the token the reference was written with. A
    /// constructor invoked through `this`, `super` or a static initializer
    /// has no renamable name at the use site.
    pub fn new(entry: E, source_name: &str, context: Option<C>) -> Self {
        let named =
            !(entry.is_constructor() && UNNAMED_CONSTRUCTOR_TOKENS.contains(&source_name));
        Self {
            entry,
            context,
            named,
        }
    }

    /// Reference written with the entry's own name.
    pub fn with_context(entry: E, context: C) -> Self {
        Self {
            entry,
            context: Some(context),
            named: true,
        }
    }

    pub fn declaration(entry: E) -> Self {
        Self {
            entry,
            context: None,
            named: true,
        }
    }

    pub fn is_named(&self) -> bool {
        self.named
    }

    pub fn is_declaration(&self) -> bool {
        self.context.is_none()
    }

    /// The entry a user would rename at this site: a constructor's class
    /// rather than the constructor.
    pub fn nameable_entry(&self) -> Entry {
        if self.entry.is_constructor() {
            Entry::Class(self.entry.owner_class().clone())
        } else {
            self.entry.to_entry()
        }
    }

    pub(crate) fn with_parts<E2, C2>(&self, entry: E2, context: Option<C2>) -> EntryReference<E2, C2> {
        EntryReference {
            entry,
            context,
            named: self.named,
        }
    }
}

impl<E: EntryLike, C: EntryLike> EntryReference<E, C> {
    /// Class the reference sits in: the context's class, or the entry's own
    /// class for a declaration.
    pub fn location_class(&self) -> &ClassEntry {
        match &self.context {
            Some(context) => context.owner_class(),
            None => self.entry.owner_class(),
        }
    }
}

impl<E: PartialEq, C: PartialEq> PartialEq for EntryReference<E, C> {
    fn eq(&self, other: &Self) -> bool {
        self.entry == other.entry && self.context == other.context
    }
}

impl<E: Eq, C: Eq> Eq for EntryReference<E, C> {}

impl<E: Hash, C: Hash> Hash for EntryReference<E, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entry.hash(state);
        self.context.hash(state);
    }
}

impl<E: Ord, C: Ord> PartialOrd for EntryReference<E, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E: Ord, C: Ord> Ord for EntryReference<E, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.entry
            .cmp(&other.entry)
            .then_with(|| self.context.cmp(&other.context))
    }
}

impl<E: fmt::Display, C: fmt::Display> fmt::Display for EntryReference<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{} called from {}", self.entry, context),
            None => write!(f, "{}", self.entry),
        }
    }
}

/// A method or constructor used from inside a method.
pub type BehaviorReference = EntryReference<MethodEntry, MethodEntry>;
/// A field read or written from inside a method.
pub type FieldReference = EntryReference<FieldEntry, MethodEntry>;
