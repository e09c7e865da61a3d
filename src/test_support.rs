//! Class file writer for building small archives in tests.

use crate::scan::ClassSource;

pub(crate) const PUBLIC_SUPER: u16 = 0x0021;
pub(crate) const PUBLIC: u16 = 0x0001;
pub(crate) const PRIVATE: u16 = 0x0002;
pub(crate) const SYNTHETIC: u16 = 0x1000;
pub(crate) const FINAL_SYNTHETIC: u16 = 0x1010;
pub(crate) const ABSTRACT: u16 = 0x0400;
pub(crate) const INTERFACE: u16 = 0x0601;

/// Minimal class file writer. Every `add_*` call appends fresh constant pool
/// entries; duplicates are legal in a class file.
pub(crate) struct ClassFileBuilder {
    name: String,
    cp: Vec<CpEntry>,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<MemberSpec>,
    methods: Vec<MemberSpec>,
    code_index: u16,
    inner_classes: bool,
}

impl ClassFileBuilder {
    pub(crate) fn new(class_name: &str, super_name: &str) -> Self {
        let mut builder = Self {
            name: class_name.to_string(),
            cp: Vec::new(),
            access_flags: PUBLIC_SUPER,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            code_index: 0,
            inner_classes: false,
        };
        builder.code_index = builder.add_utf8("Code");
        builder.this_class = builder.add_class(class_name);
        builder.super_class = builder.add_class(super_name);
        builder
    }

    pub(crate) fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    /// Emit an empty `InnerClasses` attribute.
    pub(crate) fn with_inner_classes_attribute(mut self) -> Self {
        self.inner_classes = true;
        self
    }

    pub(crate) fn add_interface(&mut self, name: &str) {
        let index = self.add_class(name);
        self.interfaces.push(index);
    }

    pub(crate) fn add_utf8(&mut self, value: &str) -> u16 {
        self.cp.push(CpEntry::Utf8(value.to_string()));
        self.cp.len() as u16
    }

    pub(crate) fn add_class(&mut self, name: &str) -> u16 {
        let name_index = self.add_utf8(name);
        self.cp.push(CpEntry::Class(name_index));
        self.cp.len() as u16
    }

    fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.add_utf8(name);
        let descriptor_index = self.add_utf8(descriptor);
        self.cp
            .push(CpEntry::NameAndType(name_index, descriptor_index));
        self.cp.len() as u16
    }

    pub(crate) fn add_field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.add_class(class);
        let name_and_type = self.add_name_and_type(name, descriptor);
        self.cp.push(CpEntry::FieldRef(class_index, name_and_type));
        self.cp.len() as u16
    }

    pub(crate) fn add_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.add_class(class);
        let name_and_type = self.add_name_and_type(name, descriptor);
        self.cp.push(CpEntry::MethodRef(class_index, name_and_type));
        self.cp.len() as u16
    }

    pub(crate) fn add_interface_method_ref(
        &mut self,
        class: &str,
        name: &str,
        descriptor: &str,
    ) -> u16 {
        let class_index = self.add_class(class);
        let name_and_type = self.add_name_and_type(name, descriptor);
        self.cp
            .push(CpEntry::InterfaceMethodRef(class_index, name_and_type));
        self.cp.len() as u16
    }

    pub(crate) fn add_field(&mut self, access_flags: u16, name: &str, descriptor: &str) {
        let name_index = self.add_utf8(name);
        let descriptor_index = self.add_utf8(descriptor);
        self.fields.push(MemberSpec {
            access_flags,
            name_index,
            descriptor_index,
            code: None,
        });
    }

    pub(crate) fn add_method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        code: Vec<u8>,
    ) {
        let name_index = self.add_utf8(name);
        let descriptor_index = self.add_utf8(descriptor);
        self.methods.push(MemberSpec {
            access_flags,
            name_index,
            descriptor_index,
            code: Some(code),
        });
    }

    /// Method without a `Code` attribute.
    pub(crate) fn add_abstract_method(&mut self, access_flags: u16, name: &str, descriptor: &str) {
        let name_index = self.add_utf8(name);
        let descriptor_index = self.add_utf8(descriptor);
        self.methods.push(MemberSpec {
            access_flags,
            name_index,
            descriptor_index,
            code: None,
        });
    }

    /// Default constructor calling `super_name.<init>()V`.
    pub(crate) fn add_default_constructor(&mut self, super_name: &str) {
        let super_init = self.add_method_ref(super_name, "<init>", "()V");
        let code = vec![0x2a, 0xb7, high(super_init), low(super_init), 0xb1];
        self.add_method(PUBLIC, "<init>", "()V", code);
    }

    pub(crate) fn finish(mut self) -> Vec<u8> {
        let inner_classes_index = if self.inner_classes {
            self.add_utf8("InnerClasses")
        } else {
            0
        };
        let mut bytes = Vec::new();
        write_u32(&mut bytes, 0xCAFEBABE);
        write_u16(&mut bytes, 0);
        write_u16(&mut bytes, 52);
        write_u16(&mut bytes, (self.cp.len() + 1) as u16);
        for entry in &self.cp {
            entry.write(&mut bytes);
        }
        write_u16(&mut bytes, self.access_flags);
        write_u16(&mut bytes, self.this_class);
        write_u16(&mut bytes, self.super_class);
        write_u16(&mut bytes, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            write_u16(&mut bytes, *interface);
        }
        write_u16(&mut bytes, self.fields.len() as u16);
        for field in &self.fields {
            field.write(&mut bytes, self.code_index);
        }
        write_u16(&mut bytes, self.methods.len() as u16);
        for method in &self.methods {
            method.write(&mut bytes, self.code_index);
        }
        if self.inner_classes {
            write_u16(&mut bytes, 1);
            write_u16(&mut bytes, inner_classes_index);
            write_u32(&mut bytes, 2);
            write_u16(&mut bytes, 0);
        } else {
            write_u16(&mut bytes, 0);
        }
        bytes
    }

    /// Finish into an archive entry named after the class.
    pub(crate) fn into_source(self) -> ClassSource {
        let name = format!("{}.class", self.name);
        ClassSource::new(name, self.finish())
    }
}

/// Field or method definition for generated class files.
struct MemberSpec {
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    code: Option<Vec<u8>>,
}

impl MemberSpec {
    fn write(&self, bytes: &mut Vec<u8>, code_index: u16) {
        write_u16(bytes, self.access_flags);
        write_u16(bytes, self.name_index);
        write_u16(bytes, self.descriptor_index);
        let Some(code) = &self.code else {
            write_u16(bytes, 0);
            return;
        };
        write_u16(bytes, 1);
        write_u16(bytes, code_index);
        write_u32(bytes, 12 + code.len() as u32);
        write_u16(bytes, 8);
        write_u16(bytes, 8);
        write_u32(bytes, code.len() as u32);
        bytes.extend_from_slice(code);
        write_u16(bytes, 0);
        write_u16(bytes, 0);
    }
}

/// Constant pool entries needed by generated class files.
enum CpEntry {
    Utf8(String),
    Class(u16),
    NameAndType(u16, u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
}

impl CpEntry {
    fn write(&self, bytes: &mut Vec<u8>) {
        match self {
            CpEntry::Utf8(value) => {
                bytes.push(1);
                write_u16(bytes, value.len() as u16);
                bytes.extend_from_slice(value.as_bytes());
            }
            CpEntry::Class(name_index) => {
                bytes.push(7);
                write_u16(bytes, *name_index);
            }
            CpEntry::NameAndType(name_index, descriptor_index) => {
                bytes.push(12);
                write_u16(bytes, *name_index);
                write_u16(bytes, *descriptor_index);
            }
            CpEntry::FieldRef(class_index, name_and_type) => {
                bytes.push(9);
                write_u16(bytes, *class_index);
                write_u16(bytes, *name_and_type);
            }
            CpEntry::MethodRef(class_index, name_and_type) => {
                bytes.push(10);
                write_u16(bytes, *class_index);
                write_u16(bytes, *name_and_type);
            }
            CpEntry::InterfaceMethodRef(class_index, name_and_type) => {
                bytes.push(11);
                write_u16(bytes, *class_index);
                write_u16(bytes, *name_and_type);
            }
        }
    }
}

/// Opcode followed by a two-byte constant pool index.
pub(crate) fn op_u16(opcode: u8, index: u16) -> [u8; 3] {
    [opcode, high(index), low(index)]
}

/// `invokeinterface` with its count and padding bytes.
pub(crate) fn invokeinterface(index: u16, arg_slots: u8) -> [u8; 5] {
    [0xb9, high(index), low(index), arg_slots + 1, 0]
}

fn write_u16(bytes: &mut Vec<u8>, value: u16) {
    bytes.extend_from_slice(&value.to_be_bytes());
}

fn write_u32(bytes: &mut Vec<u8>, value: u32) {
    bytes.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn high(value: u16) -> u8 {
    (value >> 8) as u8
}

pub(crate) fn low(value: u16) -> u8 {
    (value & 0xff) as u8
}
