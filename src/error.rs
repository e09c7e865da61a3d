use thiserror::Error;

/// A descriptor string that is not a well-formed JVM field or method descriptor.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DescriptorError {
    #[error("malformed type descriptor {descriptor:?}")]
    MalformedType { descriptor: String },
    #[error("malformed method descriptor {descriptor:?}")]
    MalformedMethod { descriptor: String },
}

/// Failure to decode a single class file. Fatal for that class only.
#[derive(Debug, Error)]
#[error("failed to decode {entry}")]
pub struct DecodeError {
    pub entry: String,
    #[source]
    pub source: anyhow::Error,
}

impl DecodeError {
    pub(crate) fn new(entry: &str, source: anyhow::Error) -> Self {
        Self {
            entry: entry.to_string(),
            source,
        }
    }
}

/// Broken hierarchy facts. These abort the whole build.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum StructuralError {
    #[error("class cannot be its own superclass: {0}")]
    SelfSuperclass(String),
    #[error("class cannot be its own interface: {0}")]
    SelfInterface(String),
    #[error("superclass chain of {0} contains a cycle")]
    InheritanceCycle(String),
    #[error("making {outer} the outer class of {inner} would create a cycle")]
    InnerClassCycle { inner: String, outer: String },
    #[error("{inner} already has outer class {existing}, cannot also nest it in {outer}")]
    DuplicateOuterClass {
        inner: String,
        existing: String,
        outer: String,
    },
}

/// Rejected rename batch. Nothing is rewritten when this is returned.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RenameError {
    #[error("cannot rename unknown class {0}")]
    UnknownClass(String),
    #[error("cannot rename unknown method {0}")]
    UnknownMethod(String),
    #[error("constructors and static initializers take their class name: {0}")]
    ReservedMethod(String),
    #[error("renaming {old} to {new} would merge it with an existing identity")]
    NameCollision { old: String, new: String },
}

/// Fatal index build failure.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error("failed to fold nested class names")]
    Rename(#[from] RenameError),
}
