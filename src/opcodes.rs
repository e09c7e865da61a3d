//! JVM opcodes the scanner decodes or needs to size.

pub(crate) const LDC: u8 = 0x12;
pub(crate) const LDC_W: u8 = 0x13;
pub(crate) const LDC2_W: u8 = 0x14;
pub(crate) const IINC: u8 = 0x84;
pub(crate) const GOTO: u8 = 0xa7;
pub(crate) const JSR: u8 = 0xa8;
pub(crate) const RET: u8 = 0xa9;
pub(crate) const TABLESWITCH: u8 = 0xaa;
pub(crate) const LOOKUPSWITCH: u8 = 0xab;
pub(crate) const GETSTATIC: u8 = 0xb2;
pub(crate) const PUTSTATIC: u8 = 0xb3;
pub(crate) const GETFIELD: u8 = 0xb4;
pub(crate) const PUTFIELD: u8 = 0xb5;
pub(crate) const INVOKEVIRTUAL: u8 = 0xb6;
pub(crate) const INVOKESPECIAL: u8 = 0xb7;
pub(crate) const INVOKESTATIC: u8 = 0xb8;
pub(crate) const INVOKEINTERFACE: u8 = 0xb9;
pub(crate) const INVOKEDYNAMIC: u8 = 0xba;
pub(crate) const NEW: u8 = 0xbb;
pub(crate) const WIDE: u8 = 0xc4;
pub(crate) const MULTIANEWARRAY: u8 = 0xc5;
pub(crate) const GOTO_W: u8 = 0xc8;
pub(crate) const JSR_W: u8 = 0xc9;

#[cfg(test)]
pub(crate) const ALOAD_0: u8 = 0x2a;
#[cfg(test)]
pub(crate) const ALOAD_1: u8 = 0x2b;
#[cfg(test)]
pub(crate) const DUP: u8 = 0x59;
#[cfg(test)]
pub(crate) const POP: u8 = 0x57;
#[cfg(test)]
pub(crate) const RETURN: u8 = 0xb1;
#[cfg(test)]
pub(crate) const ARETURN: u8 = 0xb0;
#[cfg(test)]
pub(crate) const ACONST_NULL: u8 = 0x01;
