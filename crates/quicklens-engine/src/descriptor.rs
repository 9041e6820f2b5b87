//! The normalized, recursive type grammar the synthesizer consumes.

/// A parameter's type shape, normalized from annotation or JSDoc nodes.
///
/// `Reference` only exists between normalization and resolution: the
/// resolver replaces every reference with its referent's descriptor (or
/// `Unknown` when the name does not resolve), so the synthesizer never
/// sees one. The synthesizer still carries a fallback arm for it.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Array(Box<TypeDescriptor>),
    /// Ordered fields, mirroring source declaration order.
    Object(Vec<(String, TypeDescriptor)>),
    /// Non-empty alternatives, declaration order preserved.
    Union(Vec<TypeDescriptor>),
    /// An unresolved named reference.
    Reference(String),
    /// No usable type information.
    Unknown,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

impl TypeDescriptor {
    pub fn string() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::String)
    }

    pub fn number() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Number)
    }

    pub fn boolean() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Boolean)
    }

    pub fn array(element: TypeDescriptor) -> Self {
        TypeDescriptor::Array(Box::new(element))
    }

    /// True if any nested descriptor is an unresolved reference.
    pub fn has_unresolved_reference(&self) -> bool {
        match self {
            TypeDescriptor::Reference(_) => true,
            TypeDescriptor::Array(element) => element.has_unresolved_reference(),
            TypeDescriptor::Object(fields) => fields
                .iter()
                .any(|(_, field)| field.has_unresolved_reference()),
            TypeDescriptor::Union(alternatives) => alternatives
                .iter()
                .any(TypeDescriptor::has_unresolved_reference),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_detection_recurses() {
        let clean = TypeDescriptor::array(TypeDescriptor::number());
        assert!(!clean.has_unresolved_reference());

        let tainted = TypeDescriptor::Object(vec![
            ("a".to_string(), TypeDescriptor::string()),
            (
                "b".to_string(),
                TypeDescriptor::Union(vec![
                    TypeDescriptor::boolean(),
                    TypeDescriptor::Reference("Point".to_string()),
                ]),
            ),
        ]);
        assert!(tainted.has_unresolved_reference());
    }
}
