//! Type descriptor resolution.
//!
//! Converts annotation nodes (or their documentation-comment fallbacks)
//! into [`TypeDescriptor`]s, resolving named references through an
//! immutable per-file table of alias and interface declarations. The
//! table is built once per run and shared read-only across every
//! call-site in the file.
//!
//! Resolution never fails: unresolvable names, unsupported node shapes,
//! and over-deep recursive reference chains all degrade to
//! [`TypeDescriptor::Unknown`].

use rustc_hash::FxHashMap;

use quicklens_common::limits;
use quicklens_frontend::ast::{
    InterfaceDecl, Param, SourceFile, Stmt, TypeKeyword, TypeMember, TypeNode,
};
use quicklens_frontend::jsdoc::JsDoc;

use crate::descriptor::{PrimitiveKind, TypeDescriptor};

/// The file's name -> declaration mapping, built once per run.
pub struct ResolutionContext<'a> {
    aliases: FxHashMap<&'a str, &'a TypeNode>,
    interfaces: FxHashMap<&'a str, &'a InterfaceDecl>,
}

impl<'a> ResolutionContext<'a> {
    pub fn build(file: &'a SourceFile) -> Self {
        let mut aliases = FxHashMap::default();
        let mut interfaces = FxHashMap::default();
        for item in &file.items {
            match item {
                Stmt::TypeAlias(decl) => {
                    aliases.insert(decl.name.as_str(), &decl.ty);
                }
                Stmt::Interface(decl) => {
                    interfaces.insert(decl.name.as_str(), decl);
                }
                _ => {}
            }
        }
        ResolutionContext {
            aliases,
            interfaces,
        }
    }

    /// Resolve a parameter's descriptor.
    ///
    /// The explicit annotation wins when it carries information; an
    /// annotation that normalizes to `Unknown` (absent, `any`, an
    /// unmodeled shape) falls back to the declaration's documented
    /// `@param` type, and only then to `Unknown`.
    pub fn resolve_param(&self, param: &Param, doc: Option<&JsDoc>) -> TypeDescriptor {
        if let Some(annotation) = &param.ty {
            let resolved = self.resolve_type(annotation);
            if resolved != TypeDescriptor::Unknown {
                return resolved;
            }
        }
        if let Some(doc_type) = doc.and_then(|doc| doc.param_type(&param.name)) {
            return self.resolve_type(doc_type);
        }
        TypeDescriptor::Unknown
    }

    /// Normalize a type node into a descriptor with every reference
    /// resolved.
    pub fn resolve_type(&self, node: &TypeNode) -> TypeDescriptor {
        self.resolve_at(node, 0)
    }

    fn resolve_at(&self, node: &TypeNode, depth: u32) -> TypeDescriptor {
        if depth > limits::MAX_TYPE_RESOLUTION_DEPTH {
            return TypeDescriptor::Unknown;
        }
        match node {
            TypeNode::Keyword(keyword) => keyword_descriptor(*keyword),
            TypeNode::Array(element) => {
                TypeDescriptor::Array(Box::new(self.resolve_at(element, depth + 1)))
            }
            TypeNode::Literal(members) => {
                TypeDescriptor::Object(self.resolve_members(members, depth))
            }
            TypeNode::Union(alternatives) => {
                let resolved = alternatives
                    .iter()
                    .map(|alt| self.resolve_at(alt, depth + 1))
                    .collect::<Vec<_>>();
                if resolved.is_empty() {
                    TypeDescriptor::Unknown
                } else {
                    TypeDescriptor::Union(resolved)
                }
            }
            TypeNode::Named(name) => self.resolve_named(name, depth),
            TypeNode::Unsupported => TypeDescriptor::Unknown,
        }
    }

    /// Resolve a named reference: aliases expand to their underlying
    /// node, interfaces to an object built from their directly declared
    /// property signatures. Unknown names degrade silently.
    fn resolve_named(&self, name: &str, depth: u32) -> TypeDescriptor {
        if let Some(aliased) = self.aliases.get(name) {
            return self.resolve_at(aliased, depth + 1);
        }
        if let Some(interface) = self.interfaces.get(name) {
            return TypeDescriptor::Object(self.resolve_members(&interface.members, depth));
        }
        TypeDescriptor::Unknown
    }

    /// Property signatures become object fields in declaration order;
    /// methods, index signatures, and other members are skipped.
    fn resolve_members(&self, members: &[TypeMember], depth: u32) -> Vec<(String, TypeDescriptor)> {
        members
            .iter()
            .filter_map(|member| match member {
                TypeMember::Property(prop) => {
                    Some((prop.name.clone(), self.resolve_at(&prop.ty, depth + 1)))
                }
                TypeMember::Other => None,
            })
            .collect()
    }
}

fn keyword_descriptor(keyword: TypeKeyword) -> TypeDescriptor {
    match keyword {
        TypeKeyword::String => TypeDescriptor::Primitive(PrimitiveKind::String),
        TypeKeyword::Number => TypeDescriptor::Primitive(PrimitiveKind::Number),
        TypeKeyword::Boolean => TypeDescriptor::Primitive(PrimitiveKind::Boolean),
        // `any`, `unknown`, `void`, `null`, `undefined`, `never`,
        // `object`: no shape the synthesizer could honor.
        _ => TypeDescriptor::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicklens_frontend::{parse_source, parse_type_text};

    fn context(file: &SourceFile) -> ResolutionContext<'_> {
        ResolutionContext::build(file)
    }

    #[test]
    fn resolves_primitive_keywords() {
        let file = parse_source("").expect("parse failed");
        let ctx = context(&file);
        let ty = parse_type_text("number").expect("parse failed");
        assert_eq!(ctx.resolve_type(&ty), TypeDescriptor::number());
    }

    #[test]
    fn resolves_alias_to_underlying_descriptor() {
        let file = parse_source("type Id = string;").expect("parse failed");
        let ctx = context(&file);
        let ty = parse_type_text("Id").expect("parse failed");
        assert_eq!(ctx.resolve_type(&ty), TypeDescriptor::string());
    }

    #[test]
    fn resolves_interface_to_object_in_declaration_order() {
        let file = parse_source(
            "interface Point { x: number; y: number; dist(p: Point): number }",
        )
        .expect("parse failed");
        let ctx = context(&file);
        let ty = parse_type_text("Point").expect("parse failed");
        let TypeDescriptor::Object(fields) = ctx.resolve_type(&ty) else {
            panic!("expected object descriptor");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].0, "x");
        assert_eq!(fields[1].0, "y");
    }

    #[test]
    fn alias_chain_resolves_through_interface() {
        let file = parse_source(
            "interface Point { x: number }\ntype P = Point;\ntype Ps = P[];",
        )
        .expect("parse failed");
        let ctx = context(&file);
        let ty = parse_type_text("Ps").expect("parse failed");
        let TypeDescriptor::Array(element) = ctx.resolve_type(&ty) else {
            panic!("expected array descriptor");
        };
        assert!(matches!(*element, TypeDescriptor::Object(_)));
    }

    #[test]
    fn unresolvable_name_degrades_to_unknown() {
        let file = parse_source("").expect("parse failed");
        let ctx = context(&file);
        let ty = parse_type_text("Missing").expect("parse failed");
        assert_eq!(ctx.resolve_type(&ty), TypeDescriptor::Unknown);
    }

    #[test]
    fn non_type_declaration_with_same_name_is_not_a_referent() {
        let file = parse_source("const Point = 1;").expect("parse failed");
        let ctx = context(&file);
        let ty = parse_type_text("Point").expect("parse failed");
        assert_eq!(ctx.resolve_type(&ty), TypeDescriptor::Unknown);
    }

    #[test]
    fn cyclic_alias_terminates_as_unknown() {
        let file = parse_source("type T = T[];").expect("parse failed");
        let ctx = context(&file);
        let ty = parse_type_text("T").expect("parse failed");
        // Must terminate; the innermost reference bottoms out as Unknown.
        let resolved = ctx.resolve_type(&ty);
        assert!(!resolved.has_unresolved_reference());
    }

    #[test]
    fn resolution_is_idempotent() {
        let file = parse_source(
            "interface Shape { sides: number; name: string }\ntype S = Shape | Shape[];",
        )
        .expect("parse failed");
        let ctx = context(&file);
        let ty = parse_type_text("S").expect("parse failed");
        assert_eq!(ctx.resolve_type(&ty), ctx.resolve_type(&ty));
    }

    #[test]
    fn doc_type_beats_any_annotation() {
        let file = parse_source("/** @param {number} x */\nfunction f(x: any) { return x; }")
            .expect("parse failed");
        let ctx = context(&file);
        let Stmt::Function(func) = &file.items[0] else {
            panic!("expected function");
        };
        let descriptor = ctx.resolve_param(&func.params[0], func.doc.as_ref());
        assert_eq!(descriptor, TypeDescriptor::number());
    }

    #[test]
    fn explicit_annotation_beats_doc_type() {
        let file = parse_source("/** @param {number} x */\nfunction f(x: string) { return x; }")
            .expect("parse failed");
        let ctx = context(&file);
        let Stmt::Function(func) = &file.items[0] else {
            panic!("expected function");
        };
        let descriptor = ctx.resolve_param(&func.params[0], func.doc.as_ref());
        assert_eq!(descriptor, TypeDescriptor::string());
    }

    #[test]
    fn union_preserves_declaration_order() {
        let file = parse_source("").expect("parse failed");
        let ctx = context(&file);
        let ty = parse_type_text("boolean | string | number").expect("parse failed");
        assert_eq!(
            ctx.resolve_type(&ty),
            TypeDescriptor::Union(vec![
                TypeDescriptor::boolean(),
                TypeDescriptor::string(),
                TypeDescriptor::number(),
            ])
        );
    }
}
