use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::descriptor::{MethodDescriptor, TypeDescriptor};

pub(crate) const ACC_PUBLIC: u16 = 0x0001;
pub(crate) const ACC_PRIVATE: u16 = 0x0002;
pub(crate) const ACC_PROTECTED: u16 = 0x0004;
pub(crate) const ACC_INTERFACE: u16 = 0x0200;
pub(crate) const ACC_ABSTRACT: u16 = 0x0400;
pub(crate) const ACC_SYNTHETIC: u16 = 0x1000;

pub const CONSTRUCTOR_NAME: &str = "<init>";
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";

/// A class named by its fully qualified internal name (`none/a$b`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct ClassEntry {
    name: String,
}

impl ClassEntry {
    /// Dotted names are accepted and normalized to internal form.
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.replace('.', "/"),
        }
    }

    /// Class name for an archive entry such as `none/a.class`.
    pub fn from_entry_name(entry_name: &str) -> Self {
        Self::new(entry_name.strip_suffix(".class").unwrap_or(entry_name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package_name(&self) -> Option<&str> {
        self.name.rsplit_once('/').map(|(package, _)| package)
    }

    /// Name without the package prefix.
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit_once('/')
            .map_or(self.name.as_str(), |(_, simple)| simple)
    }

    pub fn is_inner_class(&self) -> bool {
        self.simple_name().contains('$')
    }

    /// Everything before the last `$`, for nested names.
    pub fn outer_class_name(&self) -> Option<&str> {
        if !self.is_inner_class() {
            return None;
        }
        self.name.rsplit_once('$').map(|(outer, _)| outer)
    }

    pub fn outer_class_entry(&self) -> Option<ClassEntry> {
        self.outer_class_name().map(ClassEntry::new)
    }

    /// The segment after the last `$`, or the simple name for top-level classes.
    pub fn inner_class_name(&self) -> &str {
        let simple = self.simple_name();
        simple.rsplit_once('$').map_or(simple, |(_, inner)| inner)
    }

    /// Nested name for an outermost-first chain: the outermost class's full
    /// name followed by each inner class's own name, joined with `$`.
    pub fn build_class_entry(chain: &[ClassEntry]) -> Option<ClassEntry> {
        let (outermost, inner) = chain.split_first()?;
        let mut name = outermost.name.clone();
        for class in inner {
            name.push('$');
            name.push_str(class.inner_class_name());
        }
        Some(ClassEntry { name })
    }
}

impl fmt::Display for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct FieldEntry {
    pub class: ClassEntry,
    pub name: String,
    pub descriptor: TypeDescriptor,
}

impl FieldEntry {
    pub fn new(class: ClassEntry, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        Self {
            class,
            name: name.into(),
            descriptor,
        }
    }
}

impl fmt::Display for FieldEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.class, self.name, self.descriptor)
    }
}

/// A method, constructor (`<init>`) or static initializer (`<clinit>`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct MethodEntry {
    pub class: ClassEntry,
    pub name: String,
    pub descriptor: MethodDescriptor,
}

impl MethodEntry {
    pub fn new(
        class: ClassEntry,
        name: impl Into<String>,
        descriptor: MethodDescriptor,
    ) -> Self {
        Self {
            class,
            name: name.into(),
            descriptor,
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == STATIC_INITIALIZER_NAME
    }
}

impl fmt::Display for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class, self.name, self.descriptor)
    }
}

/// A method parameter. Identity is the method plus the index; the name is a label.
#[derive(Clone, Debug, Serialize)]
pub struct ArgumentEntry {
    pub method: MethodEntry,
    pub index: usize,
    pub name: String,
}

impl ArgumentEntry {
    pub fn new(method: MethodEntry, index: usize, name: impl Into<String>) -> Self {
        Self {
            method,
            index,
            name: name.into(),
        }
    }

    fn identity(&self) -> (&MethodEntry, usize) {
        (&self.method, self.index)
    }
}

impl PartialEq for ArgumentEntry {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for ArgumentEntry {}

impl Hash for ArgumentEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for ArgumentEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ArgumentEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for ArgumentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}({})", self.method, self.index, self.name)
    }
}

/// Any identity the index can store or rename.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entry {
    Class(ClassEntry),
    Field(FieldEntry),
    Method(MethodEntry),
    Argument(ArgumentEntry),
}

impl Entry {
    /// The class itself, or the class that owns the member.
    pub fn class_entry(&self) -> &ClassEntry {
        match self {
            Entry::Class(class) => class,
            Entry::Field(field) => &field.class,
            Entry::Method(method) => &method.class,
            Entry::Argument(argument) => &argument.method.class,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entry::Class(class) => class.name(),
            Entry::Field(field) => &field.name,
            Entry::Method(method) => &method.name,
            Entry::Argument(argument) => &argument.name,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Class(class) => fmt::Display::fmt(class, f),
            Entry::Field(field) => fmt::Display::fmt(field, f),
            Entry::Method(method) => fmt::Display::fmt(method, f),
            Entry::Argument(argument) => fmt::Display::fmt(argument, f),
        }
    }
}

impl From<ClassEntry> for Entry {
    fn from(value: ClassEntry) -> Self {
        Entry::Class(value)
    }
}

impl From<FieldEntry> for Entry {
    fn from(value: FieldEntry) -> Self {
        Entry::Field(value)
    }
}

impl From<MethodEntry> for Entry {
    fn from(value: MethodEntry) -> Self {
        Entry::Method(value)
    }
}

impl From<ArgumentEntry> for Entry {
    fn from(value: ArgumentEntry) -> Self {
        Entry::Argument(value)
    }
}

/// Fields and methods: entries that live on an owning class and can be re-owned
/// when a reference resolves to an ancestor.
pub trait MemberEntry: Clone + Ord + Into<Entry> {
    fn owner(&self) -> &ClassEntry;
    fn member_name(&self) -> &str;
    fn with_owner(&self, owner: ClassEntry) -> Self;
}

impl MemberEntry for FieldEntry {
    fn owner(&self) -> &ClassEntry {
        &self.class
    }

    fn member_name(&self) -> &str {
        &self.name
    }

    fn with_owner(&self, owner: ClassEntry) -> Self {
        FieldEntry::new(owner, self.name.clone(), self.descriptor.clone())
    }
}

impl MemberEntry for MethodEntry {
    fn owner(&self) -> &ClassEntry {
        &self.class
    }

    fn member_name(&self) -> &str {
        &self.name
    }

    fn with_owner(&self, owner: ClassEntry) -> Self {
        MethodEntry::new(owner, self.name.clone(), self.descriptor.clone())
    }
}

/// Visibility of a member, taken from its access flags at scan time.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Protected,
    Package,
    Private,
}

impl Access {
    pub fn from_flags(flags: u16) -> Self {
        if flags & ACC_PUBLIC != 0 {
            Access::Public
        } else if flags & ACC_PROTECTED != 0 {
            Access::Protected
        } else if flags & ACC_PRIVATE != 0 {
            Access::Private
        } else {
            Access::Package
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn method(class: &str, name: &str, descriptor: &str) -> MethodEntry {
        MethodEntry::new(
            ClassEntry::new(class),
            name,
            MethodDescriptor::parse(descriptor).expect("descriptor"),
        )
    }

    #[test]
    fn equal_components_are_one_identity() {
        let first = method("none/a", "m", "(I)V");
        let second = method("none/a", "m", "(I)V");
        let set: BTreeSet<Entry> = [first.clone().into(), second.into()].into_iter().collect();

        assert_eq!(set.len(), 1);
        assert_ne!(first, method("none/a", "m", "(J)V"));
        assert_ne!(first, method("none/b", "m", "(I)V"));
    }

    #[test]
    fn argument_identity_ignores_name() {
        let owner = method("none/a", "m", "(II)V");
        let first = ArgumentEntry::new(owner.clone(), 1, "count");
        let renamed = ArgumentEntry::new(owner.clone(), 1, "size");

        assert_eq!(first, renamed);
        assert_ne!(first, ArgumentEntry::new(owner, 2, "count"));
    }

    #[test]
    fn class_name_parts() {
        let class = ClassEntry::new("com.example.Outer$Inner");

        assert_eq!(class.name(), "com/example/Outer$Inner");
        assert_eq!(class.package_name(), Some("com/example"));
        assert_eq!(class.simple_name(), "Outer$Inner");
        assert!(class.is_inner_class());
        assert_eq!(class.outer_class_name(), Some("com/example/Outer"));
        assert_eq!(class.inner_class_name(), "Inner");

        let top = ClassEntry::new("none/a");
        assert!(!top.is_inner_class());
        assert_eq!(top.outer_class_name(), None);
        assert_eq!(top.inner_class_name(), "a");
    }

    #[test]
    fn build_class_entry_joins_chain() {
        let chain = [
            ClassEntry::new("none/a"),
            ClassEntry::new("none/b"),
            ClassEntry::new("none/c"),
        ];

        assert_eq!(
            ClassEntry::build_class_entry(&chain),
            Some(ClassEntry::new("none/a$b$c"))
        );
        assert_eq!(ClassEntry::build_class_entry(&[]), None);
    }

    #[test]
    fn access_from_flags() {
        assert_eq!(Access::from_flags(ACC_PUBLIC | 0x0008), Access::Public);
        assert_eq!(Access::from_flags(ACC_PROTECTED), Access::Protected);
        assert_eq!(Access::from_flags(ACC_PRIVATE), Access::Private);
        assert_eq!(Access::from_flags(ACC_SYNTHETIC), Access::Package);
    }
}
