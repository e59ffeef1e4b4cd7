//! Naming and shape engine.
//!
//! Decides what every exported type and member is called and how generic,
//! collection and map shapes are written.
//!
//! # Rules
//!
//! | Input | Output |
//! |-------|--------|
//! | `SearchRequest` | `search_request` |
//! | `IDate` (marker interface) | `date` |
//! | `Item` | `item` |
//! | `List<List<Hit>>` | `hit[][]` |
//! | `Dictionary<string, List<Hit>>` | `Map<string, hit[]>` |
//! | `DocValues` with wire name `doc_values` | `doc_values` |
//! | `DocValues` without wire name | `DocValues` |

use crate::context::GenerationContext;
use crate::filter::{CandidateMember, CandidateType};
use crate::registry::{strip_arity, type_key, TypeRef, TypeRegistry};
use std::fmt;

/// Base name of the map shape every dictionary renders as.
pub const MAP_SHAPE: &str = "Map";

/// A fully resolved exported type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTypeName {
    /// Name after rename, prefix strip and case conversion.
    pub base_name: String,

    /// Resolved generic arguments.
    pub generic_arguments: Vec<ExportedTypeName>,

    /// Number of `[]` markers.
    pub array_dimension: usize,

    /// Key/value shape; never arrayed.
    pub map_shaped: bool,
}

impl ExportedTypeName {
    /// A name with no arguments, such as a primitive or generic parameter.
    pub fn simple(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            generic_arguments: Vec::new(),
            array_dimension: 0,
            map_shaped: false,
        }
    }

    /// A generic name.
    pub fn generic(base_name: impl Into<String>, generic_arguments: Vec<ExportedTypeName>) -> Self {
        Self {
            generic_arguments,
            ..Self::simple(base_name)
        }
    }

    /// The map shape `Map<key, value>`.
    pub fn map(key: ExportedTypeName, value: ExportedTypeName) -> Self {
        Self {
            map_shaped: true,
            ..Self::generic(MAP_SHAPE, vec![key, value])
        }
    }

    /// Add `dimension` array levels. Map shapes are returned unchanged.
    pub fn arrayed(mut self, dimension: usize) -> Self {
        if !self.map_shaped {
            self.array_dimension += dimension;
        }
        self
    }
}

impl fmt::Display for ExportedTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_name)?;

        if !self.generic_arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.generic_arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }

        for _ in 0..self.array_dimension {
            f.write_str("[]")?;
        }

        Ok(())
    }
}

/// Convert PascalCase to snake_case.
///
/// An underscore goes before every uppercase letter except the first
/// character, then everything is lowercased. Already snake-cased input is
/// returned unchanged.
pub fn snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            result.push('_');
        }
        result.push(c.to_ascii_lowercase());
    }
    result
}

/// `I` followed by another uppercase letter, as in `IProperty`.
pub fn is_marker_interface_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('I') && chars.next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Map a source primitive to its output primitive.
///
/// Unknown names pass through unchanged.
pub fn map_primitive(name: &str) -> &str {
    match name {
        "string" | "String" | "char" | "Char" | "Guid" | "TimeSpan" | "Uri" => "string",
        "bool" | "Boolean" => "boolean",
        "byte" | "sbyte" | "short" | "ushort" | "int" | "uint" | "long" | "ulong" | "float"
        | "double" | "decimal" | "Byte" | "SByte" | "Int16" | "UInt16" | "Int32" | "UInt32"
        | "Int64" | "UInt64" | "Single" | "Double" | "Decimal" => "number",
        "DateTime" | "DateTimeOffset" => "Date",
        "object" | "Object" | "dynamic" => "any",
        other => other,
    }
}

/// Computes exported names and shapes.
#[derive(Debug, Clone, Copy)]
pub struct NamingEngine<'a> {
    ctx: &'a GenerationContext,
    registry: &'a TypeRegistry,
}

impl<'a> NamingEngine<'a> {
    /// Create an engine over a context and registry.
    pub fn new(ctx: &'a GenerationContext, registry: &'a TypeRegistry) -> Self {
        Self { ctx, registry }
    }

    /// Exported base name of a type.
    ///
    /// The rename table is consulted with the bare name. A renamed type keeps
    /// its replacement as written apart from case conversion; otherwise a
    /// marker-interface `I` prefix is dropped.
    pub fn type_base_name(&self, name: &str) -> String {
        let bare = strip_arity(name);

        let name = match self.ctx.renames.get(bare) {
            Some(renamed) => renamed.as_str(),
            None if is_marker_interface_name(bare) => &bare[1..],
            None => bare,
        };

        snake_case(name)
    }

    /// Resolve a property or generic argument type.
    pub fn export_type_ref(&self, ty: &TypeRef) -> ExportedTypeName {
        match ty {
            TypeRef::Primitive { name } => ExportedTypeName::simple(map_primitive(name)),
            TypeRef::Parameter { name } => ExportedTypeName::simple(name.clone()),
            TypeRef::Named { name, arguments } => ExportedTypeName::generic(
                self.type_base_name(name),
                arguments.iter().map(|a| self.export_type_ref(a)).collect(),
            ),
            TypeRef::Map { key, value } => {
                ExportedTypeName::map(self.export_type_ref(key), self.export_type_ref(value))
            }
            TypeRef::Collection { .. } => {
                let (element, dimension) = ty.collection_element();
                self.export_type_ref(element).arrayed(dimension)
            }
        }
    }

    /// Exported declaration name of a candidate, generic parameters included.
    pub fn declaration_name(&self, candidate: &CandidateType) -> ExportedTypeName {
        ExportedTypeName::generic(
            self.type_base_name(&candidate.name),
            candidate
                .generic_parameters
                .iter()
                .map(|p| ExportedTypeName::simple(p.clone()))
                .collect(),
        )
    }

    /// Exported name of a member.
    ///
    /// The companion interface `I{DeclaringType}` wins over the member's own
    /// wire name; without either the source name is kept as is.
    pub fn member_name(&self, member: &CandidateMember) -> String {
        let companion = self.companion_interface(&member.declaring_type);

        let wire_name = companion
            .as_deref()
            .and_then(|iface| self.registry.wire_name(iface, &member.property_name))
            .or_else(|| {
                self.registry
                    .wire_name(&member.declaring_type, &member.property_name)
            });

        match wire_name {
            Some(wire) if !wire.trim().is_empty() => wire.to_string(),
            _ => member.property_name.clone(),
        }
    }

    /// Rendered member type.
    pub fn member_type(&self, member: &CandidateMember) -> String {
        self.export_type_ref(&member.property_type).to_string()
    }

    /// Key of `I{Name}` when the declaring type implements it.
    fn companion_interface(&self, declaring_type: &str) -> Option<String> {
        let declaring = self.registry.get(declaring_type)?;
        let key = type_key(&format!("I{}", declaring.bare_name()), declaring.arity());

        self.registry
            .all_interfaces(declaring)
            .into_iter()
            .find(|i| *i == key)
    }
}
