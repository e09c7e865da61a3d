//! Cross-reference index for obfuscated JVM archives.
//!
//! [`JarIndex::build`] decodes every class in an archive and records
//! declarations, references, the class hierarchy, compiler-generated nesting
//! and bridge methods. The index can then be queried, renamed atomically and
//! rendered as a summary or a SARIF log.

pub mod archive;
pub mod descriptor;
pub mod entry;
pub mod error;
pub mod heuristics;
mod ir;
pub mod jar_index;
mod opcodes;
pub mod reference;
pub mod related;
pub mod renamer;
pub mod report;
pub mod scan;
pub mod shared;
pub mod telemetry;
pub mod translation_index;

#[cfg(test)]
mod test_support;

pub use archive::read_input;
pub use descriptor::{MethodDescriptor, TypeDescriptor};
pub use entry::{Access, ArgumentEntry, ClassEntry, Entry, FieldEntry, MemberEntry, MethodEntry};
pub use error::{DecodeError, DescriptorError, IndexError, RenameError, StructuralError};
pub use heuristics::Detection;
pub use jar_index::{BuildOutput, IndexOptions, JarIndex};
pub use reference::{BehaviorReference, EntryReference, FieldReference};
pub use related::{InconsistentGroup, RelatedMethodChecker};
pub use renamer::{ClassRenames, MethodRenames};
pub use report::{IndexReport, IndexSummary};
pub use scan::ClassSource;
pub use shared::SharedJarIndex;
pub use translation_index::TranslationIndex;
