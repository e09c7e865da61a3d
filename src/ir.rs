use crate::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::entry::{ACC_ABSTRACT, ACC_SYNTHETIC, ClassEntry, FieldEntry, MethodEntry};

/// Decoded class: header facts plus the member-level events the index needs.
#[derive(Clone, Debug)]
pub(crate) struct Class {
    pub(crate) name: String,
    pub(crate) entry_name: String,
    pub(crate) access_flags: u16,
    pub(crate) super_name: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) has_inner_classes_attribute: bool,
    pub(crate) fields: Vec<Field>,
    pub(crate) methods: Vec<Method>,
    /// Set when the member tables could not be decoded and were left empty.
    pub(crate) members_skipped: Option<String>,
}

impl Class {
    pub(crate) fn entry(&self) -> ClassEntry {
        ClassEntry::new(self.name.as_str())
    }

    pub(crate) fn is_abstract(&self) -> bool {
        self.access_flags & ACC_ABSTRACT != 0
    }

    pub(crate) fn constructors(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter().filter(|method| method.is_constructor())
    }

    pub(crate) fn field(&self, name: &str, descriptor: &TypeDescriptor) -> Option<&Field> {
        self.fields
            .iter()
            .find(|field| field.name == name && &field.descriptor == descriptor)
    }

    /// Push every member and instruction event to `visitor`, in declaration order.
    pub(crate) fn accept(&self, visitor: &mut dyn ClassVisitor) {
        visitor.visit_class(self);
        for field in &self.fields {
            visitor.visit_field(self, field);
        }
        for method in &self.methods {
            visitor.visit_method(self, method);
            for event in &method.events {
                visitor.visit_event(self, method, event);
            }
        }
        visitor.visit_end(self);
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Field {
    pub(crate) name: String,
    pub(crate) descriptor: TypeDescriptor,
    pub(crate) access_flags: u16,
}

impl Field {
    pub(crate) fn entry(&self, class: &ClassEntry) -> FieldEntry {
        FieldEntry::new(class.clone(), self.name.clone(), self.descriptor.clone())
    }

    pub(crate) fn is_synthetic(&self) -> bool {
        self.access_flags & ACC_SYNTHETIC != 0
    }
}

/// Method or constructor with the ordered events extracted from its body.
/// Abstract and native methods have no events.
#[derive(Clone, Debug)]
pub(crate) struct Method {
    pub(crate) name: String,
    pub(crate) descriptor: MethodDescriptor,
    pub(crate) access_flags: u16,
    pub(crate) events: Vec<InsnEvent>,
}

impl Method {
    pub(crate) fn entry(&self, class: &ClassEntry) -> MethodEntry {
        MethodEntry::new(class.clone(), self.name.clone(), self.descriptor.clone())
    }

    pub(crate) fn is_constructor(&self) -> bool {
        self.name == crate::entry::CONSTRUCTOR_NAME
    }

    pub(crate) fn is_synthetic(&self) -> bool {
        self.access_flags & ACC_SYNTHETIC != 0
    }

    /// Plain method calls, leaving out constructor invocations.
    pub(crate) fn method_calls(&self) -> impl Iterator<Item = &CallSite> {
        self.events.iter().filter_map(|event| match event {
            InsnEvent::MethodCall(call) => Some(call),
            _ => None,
        })
    }
}

/// Instruction-level facts in bytecode order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum InsnEvent {
    FieldRead(FieldAccess),
    FieldWrite(FieldAccess),
    MethodCall(CallSite),
    /// `this(...)` or `super(...)`: an `<init>` call with no matching `new`.
    ConstructorCall(ConstructorSite),
    /// `new T(...)`: an `<init>` call paired with a preceding `new`.
    ObjectCreation(ConstructorSite),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct FieldAccess {
    pub(crate) owner: String,
    pub(crate) name: String,
    pub(crate) descriptor: TypeDescriptor,
    pub(crate) is_static: bool,
}

impl FieldAccess {
    pub(crate) fn entry(&self) -> FieldEntry {
        FieldEntry::new(
            ClassEntry::new(self.owner.as_str()),
            self.name.clone(),
            self.descriptor.clone(),
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CallSite {
    pub(crate) owner: String,
    pub(crate) name: String,
    pub(crate) descriptor: MethodDescriptor,
}

impl CallSite {
    pub(crate) fn entry(&self) -> MethodEntry {
        MethodEntry::new(
            ClassEntry::new(self.owner.as_str()),
            self.name.clone(),
            self.descriptor.clone(),
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ConstructorSite {
    pub(crate) owner: String,
    pub(crate) descriptor: MethodDescriptor,
}

impl ConstructorSite {
    pub(crate) fn entry(&self) -> MethodEntry {
        MethodEntry::new(
            ClassEntry::new(self.owner.as_str()),
            crate::entry::CONSTRUCTOR_NAME,
            self.descriptor.clone(),
        )
    }
}

/// Receives a decoded class in declaration order. Every hook defaults to a
/// no-op so passes only override what they collect.
pub(crate) trait ClassVisitor {
    fn visit_class(&mut self, _class: &Class) {}

    fn visit_field(&mut self, _class: &Class, _field: &Field) {}

    fn visit_method(&mut self, _class: &Class, _method: &Method) {}

    fn visit_event(&mut self, _class: &Class, _method: &Method, _event: &InsnEvent) {}

    fn visit_end(&mut self, _class: &Class) {}
}
