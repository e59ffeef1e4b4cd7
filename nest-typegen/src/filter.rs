//! Selection of the model types worth exporting.
//!
//! A type is exported when it is a concrete class, implements one of the
//! capability interfaces, and its name is not excluded (descriptors and
//! attributes are construction helpers, not wire shapes).

use crate::context::GenerationContext;
use crate::registry::{strip_arity, TypeDescriptor, TypeRef, TypeRegistry};
use regex::Regex;
use tracing::{debug, info};

const COLLECTION_INTERFACES: [&str; 7] = [
    "IEnumerable",
    "ICollection",
    "IList",
    "IReadOnlyCollection",
    "IReadOnlyList",
    "IDictionary",
    "IReadOnlyDictionary",
];

/// A model type selected for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateType {
    /// Bare source name.
    pub name: String,

    /// Declared generic parameter names; the arity is their count.
    pub generic_parameters: Vec<String>,

    /// Generic type that is itself enumerable.
    ///
    /// Reported in the selection log only; rendering does not depend on it.
    pub is_generic_collection_like: bool,

    /// Every interface the type implements, transitively.
    pub declaring_interfaces: Vec<String>,

    /// Own and inherited properties, root-most base first.
    pub properties: Vec<CandidateMember>,
}

impl CandidateType {
    /// View a registry type as a candidate, resolving interfaces and
    /// inherited properties.
    pub fn from_descriptor(registry: &TypeRegistry, ty: &TypeDescriptor) -> Self {
        let declaring_interfaces = registry.all_interfaces(ty);
        let is_generic_collection_like = ty.arity() > 0
            && declaring_interfaces
                .iter()
                .any(|i| COLLECTION_INTERFACES.contains(&strip_arity(i)));

        let properties = registry
            .flattened_properties(ty)
            .into_iter()
            .map(|(declaring_type, p)| CandidateMember {
                declaring_type,
                property_name: p.name,
                property_type: p.ty,
            })
            .collect();

        Self {
            name: ty.bare_name().to_string(),
            generic_parameters: ty.generic_parameters.clone(),
            is_generic_collection_like,
            declaring_interfaces,
            properties,
        }
    }

    /// Number of generic parameters.
    pub fn generic_arity(&self) -> usize {
        self.generic_parameters.len()
    }

    /// Registry key of the type.
    pub fn key(&self) -> String {
        crate::registry::type_key(&self.name, self.generic_arity())
    }
}

/// A property of a candidate type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMember {
    /// Registry key of the type that declares the property.
    pub declaring_type: String,

    /// Source property name.
    pub property_name: String,

    /// Declared property type.
    pub property_type: TypeRef,
}

/// Select the exported types, in registry order.
pub fn select_exported_types(
    registry: &TypeRegistry,
    capability_interfaces: &[String],
    exclusion_pattern: &Regex,
) -> Vec<CandidateType> {
    let selected: Vec<CandidateType> = registry
        .model()
        .types()
        .iter()
        .filter(|ty| ty.is_concrete_class())
        .filter(|ty| {
            capability_interfaces
                .iter()
                .any(|iface| registry.is_assignable_to(ty, iface))
        })
        .filter(|ty| !exclusion_pattern.is_match(ty.bare_name()))
        .map(|ty| CandidateType::from_descriptor(registry, ty))
        .inspect(|c| {
            debug!(
                name = %c.name,
                members = c.properties.len(),
                collection_like = c.is_generic_collection_like,
                "selected type"
            )
        })
        .collect();

    info!(selected = selected.len(), "type selection complete");
    selected
}

/// Select the exported types using the context's capability set and pattern.
pub fn select_with_context(registry: &TypeRegistry, ctx: &GenerationContext) -> Vec<CandidateType> {
    select_exported_types(registry, &ctx.capability_interfaces, &ctx.exclusion_pattern)
}
