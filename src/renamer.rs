use std::collections::{BTreeMap, BTreeSet};

use crate::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::entry::{Access, ArgumentEntry, ClassEntry, Entry, FieldEntry, MethodEntry};
use crate::reference::{EntryLike, EntryReference};

/// Old to new internal class names for one batch rename.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClassRenames(BTreeMap<String, String>);

impl ClassRenames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names may use `.` or `/` as the package separator.
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.0.insert(internal_name(old.into()), internal_name(new.into()));
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.0.get(old).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(old, new)| (old.as_str(), new.as_str()))
    }

    /// Drops identity pairs so the batch only carries real changes.
    pub(crate) fn without_identity(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(old, new)| old != new)
                .map(|(old, new)| (old.clone(), new.clone()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ClassRenames {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(old, new)| (internal_name(old.into()), internal_name(new.into())))
                .collect(),
        )
    }
}

fn internal_name(name: String) -> String {
    name.replace('.', "/")
}

/// Old method identity to new method name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MethodRenames(BTreeMap<MethodEntry, String>);

impl MethodRenames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: MethodEntry, new_name: impl Into<String>) {
        self.0.insert(method, new_name.into());
    }

    pub fn get(&self, method: &MethodEntry) -> Option<&str> {
        self.0.get(method).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MethodEntry, &str)> {
        self.0.iter().map(|(method, name)| (method, name.as_str()))
    }
}

impl FromIterator<(MethodEntry, String)> for MethodRenames {
    fn from_iter<T: IntoIterator<Item = (MethodEntry, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Rewrites every class name a value mentions, including names inside
/// descriptors.
pub trait RenameClasses {
    fn rename_classes(&self, renames: &ClassRenames) -> Self;
}

/// Rewrites method identities whose old entry appears in the batch.
pub trait RenameMethods {
    fn rename_methods(&self, renames: &MethodRenames) -> Self;
}

impl RenameClasses for String {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        renames.get(self).map_or_else(|| self.clone(), str::to_string)
    }
}

impl RenameClasses for ClassEntry {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        match renames.get(self.name()) {
            Some(new) => ClassEntry::new(new),
            None => self.clone(),
        }
    }
}

impl RenameClasses for TypeDescriptor {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        self.map_classes(|name| renames.get(name).map(str::to_string))
    }
}

impl RenameClasses for MethodDescriptor {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        self.map_classes(|name| renames.get(name).map(str::to_string))
    }
}

impl RenameClasses for FieldEntry {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        FieldEntry::new(
            self.class.rename_classes(renames),
            self.name.clone(),
            self.descriptor.rename_classes(renames),
        )
    }
}

impl RenameClasses for MethodEntry {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        MethodEntry::new(
            self.class.rename_classes(renames),
            self.name.clone(),
            self.descriptor.rename_classes(renames),
        )
    }
}

impl RenameClasses for ArgumentEntry {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        ArgumentEntry::new(
            self.method.rename_classes(renames),
            self.index,
            self.name.clone(),
        )
    }
}

impl RenameClasses for Entry {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        match self {
            Entry::Class(class) => Entry::Class(class.rename_classes(renames)),
            Entry::Field(field) => Entry::Field(field.rename_classes(renames)),
            Entry::Method(method) => Entry::Method(method.rename_classes(renames)),
            Entry::Argument(argument) => Entry::Argument(argument.rename_classes(renames)),
        }
    }
}

impl RenameMethods for MethodEntry {
    fn rename_methods(&self, renames: &MethodRenames) -> Self {
        match renames.get(self) {
            Some(name) => MethodEntry::new(self.class.clone(), name, self.descriptor.clone()),
            None => self.clone(),
        }
    }
}

impl RenameMethods for ArgumentEntry {
    fn rename_methods(&self, renames: &MethodRenames) -> Self {
        ArgumentEntry::new(
            self.method.rename_methods(renames),
            self.index,
            self.name.clone(),
        )
    }
}

impl RenameMethods for Entry {
    fn rename_methods(&self, renames: &MethodRenames) -> Self {
        match self {
            Entry::Method(method) => Entry::Method(method.rename_methods(renames)),
            Entry::Argument(argument) => Entry::Argument(argument.rename_methods(renames)),
            Entry::Class(_) | Entry::Field(_) => self.clone(),
        }
    }
}

/// Values with no method identity inside.
macro_rules! methods_unaffected {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RenameMethods for $ty {
                fn rename_methods(&self, _renames: &MethodRenames) -> Self {
                    self.clone()
                }
            }
        )*
    };
}

methods_unaffected!(String, ClassEntry, FieldEntry, TypeDescriptor, MethodDescriptor, Access, u16);

/// Values with no class name inside.
macro_rules! classes_unaffected {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RenameClasses for $ty {
                fn rename_classes(&self, _renames: &ClassRenames) -> Self {
                    self.clone()
                }
            }
        )*
    };
}

classes_unaffected!(Access, u16);

impl<E, C> RenameClasses for EntryReference<E, C>
where
    E: EntryLike + RenameClasses,
    C: RenameClasses,
{
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        self.with_parts(
            self.entry.rename_classes(renames),
            self.context.rename_classes(renames),
        )
    }
}

impl<E, C> RenameMethods for EntryReference<E, C>
where
    E: EntryLike + RenameMethods,
    C: RenameMethods,
{
    fn rename_methods(&self, renames: &MethodRenames) -> Self {
        self.with_parts(
            self.entry.rename_methods(renames),
            self.context.rename_methods(renames),
        )
    }
}

impl<T: RenameClasses> RenameClasses for Option<T> {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        self.as_ref().map(|value| value.rename_classes(renames))
    }
}

impl<T: RenameMethods> RenameMethods for Option<T> {
    fn rename_methods(&self, renames: &MethodRenames) -> Self {
        self.as_ref().map(|value| value.rename_methods(renames))
    }
}

impl<T: RenameClasses> RenameClasses for Vec<T> {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        self.iter().map(|value| value.rename_classes(renames)).collect()
    }
}

impl<T: RenameMethods> RenameMethods for Vec<T> {
    fn rename_methods(&self, renames: &MethodRenames) -> Self {
        self.iter().map(|value| value.rename_methods(renames)).collect()
    }
}

impl<T: RenameClasses + Ord> RenameClasses for BTreeSet<T> {
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        self.iter().map(|value| value.rename_classes(renames)).collect()
    }
}

impl<T: RenameMethods + Ord> RenameMethods for BTreeSet<T> {
    fn rename_methods(&self, renames: &MethodRenames) -> Self {
        self.iter().map(|value| value.rename_methods(renames)).collect()
    }
}

/// Keys and values are both rewritten. Entries whose rewritten keys collide
/// merge, with values from the later key winning.
impl<K, V> RenameClasses for BTreeMap<K, V>
where
    K: RenameClasses + Ord,
    V: RenameClasses,
{
    fn rename_classes(&self, renames: &ClassRenames) -> Self {
        self.iter()
            .map(|(key, value)| (key.rename_classes(renames), value.rename_classes(renames)))
            .collect()
    }
}

impl<K, V> RenameMethods for BTreeMap<K, V>
where
    K: RenameMethods + Ord,
    V: RenameMethods,
{
    fn rename_methods(&self, renames: &MethodRenames) -> Self {
        self.iter()
            .map(|(key, value)| (key.rename_methods(renames), value.rename_methods(renames)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::BehaviorReference;

    fn method(class: &str, name: &str, descriptor: &str) -> MethodEntry {
        MethodEntry::new(
            ClassEntry::new(class),
            name,
            MethodDescriptor::parse(descriptor).expect("descriptor"),
        )
    }

    #[test]
    fn class_rename_reaches_owner_and_descriptor() {
        let renames: ClassRenames = [("none/a", "none/b$a")].into_iter().collect();
        let renamed = method("none/a", "m", "(Lnone/a;)Lnone/a;").rename_classes(&renames);

        assert_eq!(renamed, method("none/b$a", "m", "(Lnone/b$a;)Lnone/b$a;"));
    }

    #[test]
    fn reference_keeps_named_flag_through_rename() {
        let renames: ClassRenames = [("none/a", "none/x")].into_iter().collect();
        let reference = BehaviorReference::new(
            method("none/a", "<init>", "()V"),
            "super",
            Some(method("none/c", "<init>", "(Lnone/a;)V")),
        );

        let renamed = reference.rename_classes(&renames);

        assert!(!renamed.is_named());
        assert_eq!(renamed.entry, method("none/x", "<init>", "()V"));
        assert_eq!(renamed.context, Some(method("none/c", "<init>", "(Lnone/x;)V")));
    }

    #[test]
    fn nested_collections_are_rewritten() {
        let renames: ClassRenames = [("none/a", "none/z")].into_iter().collect();
        let mut map: BTreeMap<ClassEntry, BTreeSet<Entry>> = BTreeMap::new();
        map.entry(ClassEntry::new("none/a")).or_default().insert(Entry::Method(method(
            "none/b",
            "m",
            "(Lnone/a;)V",
        )));

        let renamed = map.rename_classes(&renames);

        let values = renamed
            .get(&ClassEntry::new("none/z"))
            .expect("renamed key present");
        assert!(values.contains(&Entry::Method(method("none/b", "m", "(Lnone/z;)V"))));
        assert!(!renamed.contains_key(&ClassEntry::new("none/a")));
    }

    #[test]
    fn method_rename_only_touches_listed_identity() {
        let target = method("none/a", "m", "()V");
        let other = method("none/a", "m", "(I)V");
        let renames: MethodRenames = [(target.clone(), "run".to_string())].into_iter().collect();

        assert_eq!(target.rename_methods(&renames), method("none/a", "run", "()V"));
        assert_eq!(other.rename_methods(&renames), other);
    }
}
