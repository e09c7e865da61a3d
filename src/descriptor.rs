use std::fmt;
use std::str::FromStr;

use jdescriptor::MethodDescriptor as JvmMethodDescriptor;
use serde::Serialize;

use crate::error::DescriptorError;

/// Field or parameter type descriptor, e.g. `I` or `[Ljava/lang/String;`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct TypeDescriptor(String);

impl TypeDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        // A lone parameter list parses exactly one valid field type.
        let single = !descriptor.trim_start_matches('[').starts_with('V')
            && JvmMethodDescriptor::from_str(&format!("({descriptor})V"))
                .is_ok_and(|parsed| parsed.parameter_types().len() == 1);
        if single {
            Ok(Self(descriptor.to_string()))
        } else {
            Err(DescriptorError::MalformedType {
                descriptor: descriptor.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Class this type names, looking through array dimensions.
    pub fn class_name(&self) -> Option<&str> {
        let element = self.0.trim_start_matches('[');
        element
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.class_name() == Some(name)
    }

    pub(crate) fn map_classes(&self, rename: impl Fn(&str) -> Option<String>) -> Self {
        Self(map_class_names(&self.0, rename))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Method descriptor, e.g. `(ILjava/lang/String;)V`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct MethodDescriptor(String);

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        JvmMethodDescriptor::from_str(descriptor).map_err(|_| {
            DescriptorError::MalformedMethod {
                descriptor: descriptor.to_string(),
            }
        })?;
        Ok(Self(descriptor.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parameters(&self) -> Vec<TypeDescriptor> {
        let Some(params) = self
            .0
            .strip_prefix('(')
            .and_then(|rest| rest.split_once(')'))
            .map(|(params, _)| params)
        else {
            return Vec::new();
        };
        let mut result = Vec::new();
        let mut start = 0;
        let bytes = params.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    pos += 1;
                    continue;
                }
                b'L' => {
                    pos = params[pos..]
                        .find(';')
                        .map_or(bytes.len(), |end| pos + end + 1);
                }
                _ => pos += 1,
            }
            result.push(TypeDescriptor(params[start..pos].to_string()));
            start = pos;
        }
        result
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters().len()
    }

    /// Return type, or `None` for `void`.
    pub fn return_type(&self) -> Option<TypeDescriptor> {
        match self.0.rsplit_once(')') {
            Some((_, "V")) | None => None,
            Some((_, ret)) => Some(TypeDescriptor(ret.to_string())),
        }
    }

    /// Every class named in a parameter or the return type.
    pub fn referenced_classes(&self) -> Vec<String> {
        self.parameters()
            .into_iter()
            .chain(self.return_type())
            .filter_map(|ty| ty.class_name().map(str::to_string))
            .collect()
    }

    pub fn mentions_class(&self, name: &str) -> bool {
        self.referenced_classes().iter().any(|class| class == name)
    }

    pub(crate) fn map_classes(&self, rename: impl Fn(&str) -> Option<String>) -> Self {
        Self(map_class_names(&self.0, rename))
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rewrite each `L<name>;` segment whose name has a replacement.
fn map_class_names(descriptor: &str, rename: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(descriptor.len());
    let mut rest = descriptor;
    while let Some(start) = rest.find('L') {
        out.push_str(&rest[..=start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find(';') else {
            out.push_str(after);
            return out;
        };
        let name = &after[..end];
        match rename(name) {
            Some(renamed) => out.push_str(&renamed),
            None => out.push_str(name),
        }
        out.push(';');
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_split_arrays_and_objects() {
        let descriptor = MethodDescriptor::parse("(I[[JLa;[Lb;)Lc;").expect("descriptor");
        let params: Vec<String> = descriptor
            .parameters()
            .iter()
            .map(|ty| ty.as_str().to_string())
            .collect();

        assert_eq!(params, vec!["I", "[[J", "La;", "[Lb;"]);
        assert_eq!(descriptor.parameter_count(), 4);
        assert_eq!(
            descriptor.return_type().map(|ty| ty.as_str().to_string()),
            Some("Lc;".to_string())
        );
        assert_eq!(descriptor.referenced_classes(), vec!["a", "b", "c"]);
    }

    #[test]
    fn void_return_has_no_type() {
        let descriptor = MethodDescriptor::parse("()V").expect("descriptor");

        assert!(descriptor.return_type().is_none());
        assert!(descriptor.parameters().is_empty());
    }

    #[test]
    fn malformed_descriptors_are_rejected() {
        assert!(MethodDescriptor::parse("(I").is_err());
        assert!(TypeDescriptor::parse("V").is_err());
    }

    #[test]
    fn map_classes_rewrites_only_named_classes() {
        let descriptor = MethodDescriptor::parse("(La;ILab;[La;)La;").expect("descriptor");
        let mapped = descriptor.map_classes(|name| (name == "a").then(|| "x/Y".to_string()));

        assert_eq!(mapped.as_str(), "(Lx/Y;ILab;[Lx/Y;)Lx/Y;");
    }

    #[test]
    fn class_name_looks_through_arrays() {
        let ty = TypeDescriptor::parse("[[Lnone/a;").expect("type");

        assert_eq!(ty.class_name(), Some("none/a"));
        assert!(ty.is_class("none/a"));
        assert_eq!(TypeDescriptor::parse("I").expect("type").class_name(), None);
    }
}
