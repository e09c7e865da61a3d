use anyhow::{Context, Result};
use jclassfile::class_file;
use jclassfile::constant_pool::ConstantPool;
use rayon::prelude::*;
use tracing::warn;

use crate::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::entry::CONSTRUCTOR_NAME;
use crate::error::DecodeError;
use crate::ir::{
    CallSite, Class, ConstructorSite, Field, FieldAccess, InsnEvent, Method,
};
use crate::opcodes;

const MIN_MAJOR_VERSION: u16 = 45;
const MAX_MAJOR_VERSION: u16 = 69;
const INNER_CLASSES_ATTRIBUTE: &str = "InnerClasses";

/// One archive entry: its path inside the archive and its raw bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ClassSource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Regular class entries. Module descriptors and multi-release overlays
    /// are not indexed.
    pub fn is_class_file(&self) -> bool {
        self.name.ends_with(".class")
            && !self.name.ends_with("module-info.class")
            && !self.name.starts_with("META-INF/versions/")
    }
}

/// Decode every source, keeping failures separate from decoded classes.
/// Output order follows input order in both modes.
pub(crate) fn decode_all(
    sources: &[ClassSource],
    parallel: bool,
) -> (Vec<Class>, Vec<DecodeError>) {
    let results: Vec<Result<Class, DecodeError>> = if parallel {
        sources.par_iter().map(decode_class).collect()
    } else {
        sources.iter().map(decode_class).collect()
    };
    let mut classes = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(class) => classes.push(class),
            Err(err) => failures.push(err),
        }
    }
    (classes, failures)
}

pub(crate) fn decode_class(source: &ClassSource) -> Result<Class, DecodeError> {
    parse_class_bytes(&source.name, &source.bytes)
        .map_err(|err| DecodeError::new(&source.name, err))
}

fn parse_class_bytes(entry_name: &str, data: &[u8]) -> Result<Class> {
    let header = parse_header(data).context("failed to read class header")?;
    let class_file = match class_file::parse(data) {
        Ok(parsed) => parsed,
        Err(err) => return header_only_class(header, entry_name, err.into()),
    };
    let constant_pool = class_file.constant_pool();
    let fields = parse_fields(constant_pool, class_file.fields()).context("parse fields")?;
    let methods = parse_methods(constant_pool, class_file.methods()).context("parse methods")?;
    Ok(header.into_class(entry_name, fields, methods))
}

/// An attribute the class file parser does not know still leaves a usable
/// header. Keep the class without members and record why.
fn header_only_class(header: ClassHeader, entry_name: &str, err: anyhow::Error) -> Result<Class> {
    let message = format!("{err}");
    if !message.contains("unmatched attribute") {
        return Err(err).context("failed to parse class file bytes");
    }
    warn!(
        entry = entry_name,
        class = header.name.as_str(),
        error = %message,
        "unrecognized attribute, indexing class without members"
    );
    let mut class = header.into_class(entry_name, Vec::new(), Vec::new());
    class.members_skipped = Some(message);
    Ok(class)
}

/// Class header read straight from the bytes: identity, flags, supertypes
/// and the names of class-level attributes.
struct ClassHeader {
    name: String,
    access_flags: u16,
    super_name: Option<String>,
    interfaces: Vec<String>,
    attribute_names: Vec<String>,
}

impl ClassHeader {
    fn into_class(self, entry_name: &str, fields: Vec<Field>, methods: Vec<Method>) -> Class {
        let has_inner_classes_attribute = self
            .attribute_names
            .iter()
            .any(|name| name == INNER_CLASSES_ATTRIBUTE);
        Class {
            name: self.name,
            entry_name: entry_name.to_string(),
            access_flags: self.access_flags,
            super_name: self.super_name,
            interfaces: self.interfaces,
            has_inner_classes_attribute,
            fields,
            methods,
            members_skipped: None,
        }
    }
}

fn parse_header(data: &[u8]) -> Result<ClassHeader> {
    let mut offset = 0usize;
    let magic = read_u32_class(data, &mut offset)?;
    if magic != 0xCAFEBABE {
        anyhow::bail!("invalid class file magic");
    }
    let _minor = read_u16_class(data, &mut offset)?;
    let major = read_u16_class(data, &mut offset)?;
    if !(MIN_MAJOR_VERSION..=MAX_MAJOR_VERSION).contains(&major) {
        anyhow::bail!("unsupported class file version {major}");
    }
    let (cp_entries, class_entries) = parse_constant_pool_minimal(data, &mut offset)?;
    let access_flags = read_u16_class(data, &mut offset)?;
    let this_class = read_u16_class(data, &mut offset)?;
    let super_class = read_u16_class(data, &mut offset)?;

    let name = resolve_class_name_minimal(&cp_entries, &class_entries, this_class)
        .context("resolve class name")?;
    let super_name = if super_class == 0 {
        None
    } else {
        Some(
            resolve_class_name_minimal(&cp_entries, &class_entries, super_class)
                .context("resolve super class name")?,
        )
    };

    let interfaces = parse_interfaces_minimal(data, &mut offset, &cp_entries, &class_entries)?;
    skip_members(data, &mut offset)?;
    skip_members(data, &mut offset)?;
    let attribute_names = read_attribute_names(data, &mut offset, &cp_entries)?;

    Ok(ClassHeader {
        name,
        access_flags,
        super_name,
        interfaces,
        attribute_names,
    })
}

#[derive(Clone)]
enum CpEntryMin {
    Utf8(String),
    Other,
}

fn parse_constant_pool_minimal(
    data: &[u8],
    offset: &mut usize,
) -> Result<(Vec<CpEntryMin>, Vec<Option<u16>>)> {
    let count = read_u16_class(data, offset)?;
    let mut entries = Vec::with_capacity(count as usize);
    entries.push(CpEntryMin::Other);
    let mut class_entries = vec![None; count as usize];
    let mut index = 1u16;
    while index < count {
        let tag = read_u8_class(data, offset)?;
        match tag {
            1 => {
                let len = read_u16_class(data, offset)? as usize;
                let bytes = read_bytes_class(data, offset, len)?;
                entries.push(CpEntryMin::Utf8(String::from_utf8_lossy(bytes).to_string()));
            }
            7 => {
                let name_index = read_u16_class(data, offset)?;
                entries.push(CpEntryMin::Other);
                class_entries[index as usize] = Some(name_index);
            }
            5 | 6 => {
                skip_class_bytes(data, offset, 8)?;
                entries.push(CpEntryMin::Other);
                entries.push(CpEntryMin::Other);
                index += 1;
            }
            3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                skip_class_bytes(data, offset, 4)?;
                entries.push(CpEntryMin::Other);
            }
            15 => {
                skip_class_bytes(data, offset, 3)?;
                entries.push(CpEntryMin::Other);
            }
            8 | 16 | 19 | 20 => {
                skip_class_bytes(data, offset, 2)?;
                entries.push(CpEntryMin::Other);
            }
            _ => anyhow::bail!("unsupported constant pool tag: {}", tag),
        }
        index += 1;
    }
    Ok((entries, class_entries))
}

fn resolve_utf8_minimal(entries: &[CpEntryMin], index: u16) -> Result<String> {
    match entries.get(index as usize) {
        Some(CpEntryMin::Utf8(value)) => Ok(value.clone()),
        _ => anyhow::bail!("missing utf8 entry {index}"),
    }
}

fn resolve_class_name_minimal(
    entries: &[CpEntryMin],
    class_entries: &[Option<u16>],
    class_index: u16,
) -> Result<String> {
    let entry = class_entries
        .get(class_index as usize)
        .context("missing class entry")?;
    let name_index = entry.context("missing class name index")?;
    resolve_utf8_minimal(entries, name_index).context("missing utf8 entry for class name")
}

fn parse_interfaces_minimal(
    data: &[u8],
    offset: &mut usize,
    entries: &[CpEntryMin],
    class_entries: &[Option<u16>],
) -> Result<Vec<String>> {
    let count = read_u16_class(data, offset)? as usize;
    let mut interfaces = Vec::with_capacity(count);
    for _ in 0..count {
        let index = read_u16_class(data, offset)?;
        interfaces.push(resolve_class_name_minimal(entries, class_entries, index)?);
    }
    Ok(interfaces)
}

/// Skip a field or method table.
fn skip_members(data: &[u8], offset: &mut usize) -> Result<()> {
    let count = read_u16_class(data, offset)?;
    for _ in 0..count {
        skip_class_bytes(data, offset, 6)?;
        read_attribute_names(data, offset, &[])?;
    }
    Ok(())
}

/// Walk an attribute table. Names are resolved only when `entries` is non-empty.
fn read_attribute_names(
    data: &[u8],
    offset: &mut usize,
    entries: &[CpEntryMin],
) -> Result<Vec<String>> {
    let count = read_u16_class(data, offset)?;
    let mut names = Vec::new();
    for _ in 0..count {
        let name_index = read_u16_class(data, offset)?;
        let length = read_u32_class(data, offset)? as usize;
        skip_class_bytes(data, offset, length)?;
        if !entries.is_empty() {
            names.push(resolve_utf8_minimal(entries, name_index).context("resolve attribute name")?);
        }
    }
    Ok(names)
}

fn read_u8_class(data: &[u8], offset: &mut usize) -> Result<u8> {
    let byte = *data.get(*offset).context("class file out of bounds")?;
    *offset += 1;
    Ok(byte)
}

fn read_u16_class(data: &[u8], offset: &mut usize) -> Result<u16> {
    let bytes = read_bytes_class(data, offset, 2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_u32_class(data: &[u8], offset: &mut usize) -> Result<u32> {
    let bytes = read_bytes_class(data, offset, 4)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_bytes_class<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    let start = *offset;
    let end = start.checked_add(len).context("class file out of bounds")?;
    let slice = data.get(start..end).context("class file out of bounds")?;
    *offset = end;
    Ok(slice)
}

fn skip_class_bytes(data: &[u8], offset: &mut usize, len: usize) -> Result<()> {
    read_bytes_class(data, offset, len)?;
    Ok(())
}

fn parse_fields(
    constant_pool: &[ConstantPool],
    fields: &[jclassfile::fields::FieldInfo],
) -> Result<Vec<Field>> {
    let mut parsed = Vec::with_capacity(fields.len());
    for field in fields {
        let name = resolve_utf8(constant_pool, field.name_index()).context("resolve field name")?;
        let raw = resolve_utf8(constant_pool, field.descriptor_index())
            .context("resolve field descriptor")?;
        let descriptor =
            TypeDescriptor::parse(&raw).with_context(|| format!("descriptor of field {name}"))?;
        parsed.push(Field {
            name,
            descriptor,
            access_flags: field.access_flags().bits(),
        });
    }
    Ok(parsed)
}

fn parse_methods(
    constant_pool: &[ConstantPool],
    methods: &[jclassfile::methods::MethodInfo],
) -> Result<Vec<Method>> {
    let mut parsed = Vec::with_capacity(methods.len());
    for method in methods {
        let name =
            resolve_utf8(constant_pool, method.name_index()).context("resolve method name")?;
        let raw = resolve_utf8(constant_pool, method.descriptor_index())
            .context("resolve method descriptor")?;
        let descriptor =
            MethodDescriptor::parse(&raw).with_context(|| format!("descriptor of {name}"))?;
        let code = method
            .attributes()
            .iter()
            .find_map(|attribute| match attribute {
                jclassfile::attributes::Attribute::Code { code, .. } => Some(code),
                _ => None,
            });
        let events = match code {
            Some(code) => parse_bytecode(code, constant_pool)
                .with_context(|| format!("parse bytecode of {name}{raw}"))?,
            None => Vec::new(),
        };
        parsed.push(Method {
            name,
            descriptor,
            access_flags: method.access_flags().bits(),
            events,
        });
    }
    Ok(parsed)
}

fn resolve_class_name(constant_pool: &[ConstantPool], class_index: u16) -> Result<String> {
    let entry = constant_pool
        .get(class_index as usize)
        .context("missing class entry")?;
    match entry {
        ConstantPool::Class { name_index } => resolve_utf8(constant_pool, *name_index),
        _ => anyhow::bail!("unexpected class entry"),
    }
}

fn resolve_utf8(constant_pool: &[ConstantPool], index: u16) -> Result<String> {
    let entry = constant_pool
        .get(index as usize)
        .context("missing utf8 entry")?;
    match entry {
        ConstantPool::Utf8 { value } => Ok(value.clone()),
        _ => anyhow::bail!("unexpected utf8 entry"),
    }
}

/// Walk the bytecode and emit field, call and construction events in order.
/// A `new` stays pending until an `<init>` on the same class consumes it;
/// any other `<init>` call is a `this(...)`/`super(...)` delegation.
fn parse_bytecode(code: &[u8], constant_pool: &[ConstantPool]) -> Result<Vec<InsnEvent>> {
    let mut events = Vec::new();
    let mut pending_new: Vec<String> = Vec::new();
    let mut offset = 0usize;
    while offset < code.len() {
        let opcode = code[offset];
        let length = opcode_length(code, offset)?;
        if length == 0 || offset + length > code.len() {
            anyhow::bail!("invalid bytecode length at offset {}", offset);
        }
        match opcode {
            opcodes::GETSTATIC | opcodes::PUTSTATIC | opcodes::GETFIELD | opcodes::PUTFIELD => {
                let index = read_u16(code, offset + 1)?;
                let member = resolve_member_ref(constant_pool, index).context("resolve field ref")?;
                let access = FieldAccess {
                    owner: member.owner,
                    descriptor: TypeDescriptor::parse(&member.descriptor)
                        .with_context(|| format!("descriptor of field {}", member.name))?,
                    name: member.name,
                    is_static: matches!(opcode, opcodes::GETSTATIC | opcodes::PUTSTATIC),
                };
                let event = if matches!(opcode, opcodes::GETSTATIC | opcodes::GETFIELD) {
                    InsnEvent::FieldRead(access)
                } else {
                    InsnEvent::FieldWrite(access)
                };
                events.push(event);
            }
            opcodes::NEW => {
                let index = read_u16(code, offset + 1)?;
                let class_name =
                    resolve_class_name(constant_pool, index).context("resolve new type")?;
                pending_new.push(class_name);
            }
            opcodes::INVOKEVIRTUAL
            | opcodes::INVOKESPECIAL
            | opcodes::INVOKESTATIC
            | opcodes::INVOKEINTERFACE => {
                let index = read_u16(code, offset + 1)?;
                let member =
                    resolve_member_ref(constant_pool, index).context("resolve method ref")?;
                let descriptor = MethodDescriptor::parse(&member.descriptor)
                    .with_context(|| format!("descriptor of call to {}", member.name))?;
                if member.name == CONSTRUCTOR_NAME {
                    let site = ConstructorSite {
                        owner: member.owner,
                        descriptor,
                    };
                    if pending_new.last() == Some(&site.owner) {
                        pending_new.pop();
                        events.push(InsnEvent::ObjectCreation(site));
                    } else {
                        events.push(InsnEvent::ConstructorCall(site));
                    }
                } else {
                    events.push(InsnEvent::MethodCall(CallSite {
                        owner: member.owner,
                        name: member.name,
                        descriptor,
                    }));
                }
            }
            _ => {}
        }
        offset += length;
    }
    Ok(events)
}

/// Resolved field or method reference from the constant pool.
struct MemberRef {
    owner: String,
    name: String,
    descriptor: String,
}

fn resolve_member_ref(constant_pool: &[ConstantPool], index: u16) -> Result<MemberRef> {
    let entry = constant_pool
        .get(index as usize)
        .context("missing member ref entry")?;
    let (class_index, name_and_type_index) = match entry {
        ConstantPool::Fieldref {
            class_index,
            name_and_type_index,
        }
        | ConstantPool::Methodref {
            class_index,
            name_and_type_index,
        }
        | ConstantPool::InterfaceMethodref {
            class_index,
            name_and_type_index,
        } => (*class_index, *name_and_type_index),
        _ => anyhow::bail!("unexpected member ref entry"),
    };
    let owner = resolve_class_name(constant_pool, class_index).context("resolve owner")?;
    let (name_index, descriptor_index) = resolve_name_and_type(constant_pool, name_and_type_index)?;
    let name = resolve_utf8(constant_pool, name_index).context("resolve member name")?;
    let descriptor =
        resolve_utf8(constant_pool, descriptor_index).context("resolve member descriptor")?;
    Ok(MemberRef {
        owner,
        name,
        descriptor,
    })
}

fn resolve_name_and_type(constant_pool: &[ConstantPool], index: u16) -> Result<(u16, u16)> {
    let entry = constant_pool
        .get(index as usize)
        .context("missing name and type entry")?;
    match entry {
        ConstantPool::NameAndType {
            name_index,
            descriptor_index,
        } => Ok((*name_index, *descriptor_index)),
        _ => anyhow::bail!("unexpected name and type entry"),
    }
}

fn opcode_length(code: &[u8], offset: usize) -> Result<usize> {
    let opcode = code[offset];
    let length = match opcode {
        0x00..=0x0f => 1,
        0x10 => 2,
        0x11 => 3,
        opcodes::LDC => 2,
        opcodes::LDC_W | opcodes::LDC2_W => 3,
        0x15..=0x19 => 2,
        0x1a..=0x35 => 1,
        0x36..=0x3a => 2,
        0x3b..=0x83 => 1,
        opcodes::IINC => 3,
        0x85..=0x98 => 1,
        0x99..=0xa6 => 3,
        opcodes::GOTO | opcodes::JSR => 3,
        opcodes::RET => 2,
        opcodes::TABLESWITCH => tableswitch_length(code, offset)?,
        opcodes::LOOKUPSWITCH => lookupswitch_length(code, offset)?,
        0xac..=0xb1 => 1,
        opcodes::GETSTATIC..=opcodes::PUTFIELD => 3,
        opcodes::INVOKEVIRTUAL | opcodes::INVOKESPECIAL | opcodes::INVOKESTATIC => 3,
        opcodes::INVOKEINTERFACE | opcodes::INVOKEDYNAMIC => 5,
        opcodes::NEW => 3,
        0xbc => 2,
        0xbd => 3,
        0xbe | 0xbf => 1,
        0xc0 | 0xc1 => 3,
        0xc2 | 0xc3 => 1,
        opcodes::WIDE => wide_length(code, offset)?,
        opcodes::MULTIANEWARRAY => 4,
        0xc6 | 0xc7 => 3,
        opcodes::GOTO_W | opcodes::JSR_W => 5,
        0xca => 1,
        0xfe | 0xff => 1,
        _ => anyhow::bail!("unsupported opcode 0x{:02x}", opcode),
    };
    Ok(length)
}

fn tableswitch_length(code: &[u8], offset: usize) -> Result<usize> {
    let padding = padding(offset);
    let base = offset + 1 + padding;
    let low = read_i32(code, base + 4)?;
    let high = read_i32(code, base + 8)?;
    let count = high
        .checked_sub(low)
        .and_then(|v| v.checked_add(1))
        .context("invalid tableswitch range")?;
    if count < 0 {
        anyhow::bail!("invalid tableswitch range");
    }
    Ok(1 + padding + 12 + (count as usize) * 4)
}

fn lookupswitch_length(code: &[u8], offset: usize) -> Result<usize> {
    let padding = padding(offset);
    let base = offset + 1 + padding;
    let npairs = read_i32(code, base + 4)?;
    if npairs < 0 {
        anyhow::bail!("invalid lookupswitch pairs");
    }
    Ok(1 + padding + 8 + (npairs as usize) * 8)
}

fn wide_length(code: &[u8], offset: usize) -> Result<usize> {
    let opcode = code
        .get(offset + 1)
        .copied()
        .context("missing wide opcode")?;
    if opcode == opcodes::IINC { Ok(6) } else { Ok(4) }
}

fn padding(offset: usize) -> usize {
    (4 - ((offset + 1) % 4)) % 4
}

fn read_u16(code: &[u8], offset: usize) -> Result<u16> {
    let slice = code
        .get(offset..offset + 2)
        .context("bytecode u16 out of bounds")?;
    Ok(u16::from_be_bytes([slice[0], slice[1]]))
}

fn read_i32(code: &[u8], offset: usize) -> Result<i32> {
    let slice = code
        .get(offset..offset + 4)
        .context("bytecode i32 out of bounds")?;
    Ok(i32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        ClassFileBuilder, FINAL_SYNTHETIC, PUBLIC, SYNTHETIC, high, low, op_u16,
    };

    fn build_inner_class() -> ClassSource {
        let mut builder = ClassFileBuilder::new("none/b", "java/lang/Object");
        builder.add_field(FINAL_SYNTHETIC, "a", "Lnone/a;");
        let outer_field = builder.add_field_ref("none/b", "a", "Lnone/a;");
        let object_init = builder.add_method_ref("java/lang/Object", "<init>", "()V");
        let mut code = vec![opcodes::ALOAD_0, opcodes::ALOAD_1];
        code.extend(op_u16(opcodes::PUTFIELD, outer_field));
        code.push(opcodes::ALOAD_0);
        code.extend(op_u16(opcodes::INVOKESPECIAL, object_init));
        code.push(opcodes::RETURN);
        builder.add_method(0, "<init>", "(Lnone/a;)V", code);
        builder.into_source()
    }

    #[test]
    fn decode_reads_header_members_and_events() {
        let class = decode_class(&build_inner_class()).expect("decode");

        assert_eq!(class.name, "none/b");
        assert_eq!(class.entry_name, "none/b.class");
        assert_eq!(class.super_name.as_deref(), Some("java/lang/Object"));
        assert!(!class.has_inner_classes_attribute);
        assert_eq!(class.fields.len(), 1);
        assert!(class.fields[0].is_synthetic());

        let constructor = &class.methods[0];
        assert!(constructor.is_constructor());
        assert!(matches!(
            &constructor.events[..],
            [InsnEvent::FieldWrite(write), InsnEvent::ConstructorCall(call)]
                if write.name == "a" && !write.is_static && call.owner == "java/lang/Object"
        ));
    }

    #[test]
    fn new_followed_by_init_is_object_creation() {
        let mut builder = ClassFileBuilder::new("none/a", "java/lang/Object");
        builder.add_default_constructor("java/lang/Object");
        let b_class = builder.add_class("none/b");
        let b_init = builder.add_method_ref("none/b", "<init>", "(Lnone/a;)V");
        let mut code = Vec::new();
        code.extend(op_u16(opcodes::NEW, b_class));
        code.push(opcodes::DUP);
        code.push(opcodes::ALOAD_0);
        code.extend(op_u16(opcodes::INVOKESPECIAL, b_init));
        code.push(opcodes::POP);
        code.push(opcodes::RETURN);
        builder.add_method(PUBLIC, "m", "()V", code);

        let class = decode_class(&builder.into_source()).expect("decode");
        let method = class
            .methods
            .iter()
            .find(|method| method.name == "m")
            .expect("method m");

        assert!(matches!(
            &method.events[..],
            [InsnEvent::ObjectCreation(site)] if site.owner == "none/b"
        ));
    }

    #[test]
    fn calls_carry_owner_and_descriptor() {
        let mut builder = ClassFileBuilder::new("none/c", "java/lang/Object");
        let target = builder.add_method_ref("none/c", "x", "(I)Ljava/lang/String;");
        let code = vec![
            opcodes::ALOAD_0,
            opcodes::ACONST_NULL,
            0xb6,
            high(target),
            low(target),
            opcodes::ARETURN,
        ];
        builder.add_method(SYNTHETIC, "y", "()Ljava/lang/Object;", code);
        builder.add_abstract_method(0x0401, "z", "()V");

        let class = decode_class(&builder.into_source()).expect("decode");
        let bridge = &class.methods[0];
        let calls: Vec<&CallSite> = bridge.method_calls().collect();

        assert!(bridge.is_synthetic());
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].owner, "none/c");
        assert_eq!(calls[0].descriptor.as_str(), "(I)Ljava/lang/String;");
        assert!(class.methods[1].events.is_empty());
    }

    #[test]
    fn unknown_attribute_keeps_header_and_records_skip() {
        let mut builder = ClassFileBuilder::new("none/d", "java/lang/Object");
        builder.add_interface("none/i");
        let bytes = builder.finish();
        let header = parse_header(&bytes).expect("header");

        let class = header_only_class(
            header,
            "none/d.class",
            anyhow::anyhow!("unmatched attribute: Custom"),
        )
        .expect("header-only class");

        assert_eq!(class.name, "none/d");
        assert_eq!(class.interfaces, vec!["none/i".to_string()]);
        assert!(class.fields.is_empty());
        assert!(class.methods.is_empty());
        assert_eq!(
            class.members_skipped.as_deref(),
            Some("unmatched attribute: Custom")
        );
    }

    #[test]
    fn other_parse_errors_are_not_recovered() {
        let bytes = ClassFileBuilder::new("none/d", "java/lang/Object").finish();
        let header = parse_header(&bytes).expect("header");

        let err = header_only_class(header, "none/d.class", anyhow::anyhow!("truncated"))
            .expect_err("not recoverable");

        assert!(format!("{err:#}").contains("truncated"));
    }

    #[test]
    fn fully_decoded_classes_skip_nothing() {
        let class = decode_class(&build_inner_class()).expect("decode");

        assert!(class.members_skipped.is_none());
    }

    #[test]
    fn inner_classes_attribute_is_detected() {
        let builder =
            ClassFileBuilder::new("none/d", "java/lang/Object").with_inner_classes_attribute();

        let class = decode_class(&builder.into_source()).expect("decode");

        assert!(class.has_inner_classes_attribute);
    }

    #[test]
    fn bad_magic_fails_only_that_entry() {
        let sources = vec![
            ClassSource::new("bad.class", b"nope".to_vec()),
            build_inner_class(),
        ];

        let (classes, failures) = decode_all(&sources, true);

        assert_eq!(classes.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].entry, "bad.class");
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut bytes = build_inner_class().bytes;
        bytes[6] = 0;
        bytes[7] = 99;

        let err = decode_class(&ClassSource::new("none/b.class", bytes)).expect_err("version");

        assert!(format!("{:#}", err.source).contains("unsupported class file version 99"));
    }

    #[test]
    fn class_file_filter_skips_module_info_and_overlays() {
        assert!(ClassSource::new("none/a.class", Vec::new()).is_class_file());
        assert!(!ClassSource::new("module-info.class", Vec::new()).is_class_file());
        assert!(!ClassSource::new("META-INF/versions/11/none/a.class", Vec::new()).is_class_file());
        assert!(!ClassSource::new("META-INF/MANIFEST.MF", Vec::new()).is_class_file());
    }
}
