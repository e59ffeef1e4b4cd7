//! Explicit type registry.
//!
//! The client's two type universes (the high level `model` and the
//! `low_level` parameter types) are described in a JSON file and loaded once
//! at startup. After construction the registry is read-only: lookups,
//! assignability checks and wire-name overrides are all pure queries.
//!
//! # Format
//!
//! ```json
//! {
//!   "model": [
//!     {
//!       "name": "SearchRequest",
//!       "generic_parameters": ["T"],
//!       "base": "RequestBase",
//!       "interfaces": ["ISearchRequest`1"],
//!       "properties": [
//!         { "name": "Size", "type": { "kind": "primitive", "name": "int" } }
//!       ]
//!     }
//!   ],
//!   "low_level": []
//! }
//! ```
//!
//! Types are referenced by key: the bare name followed by a `` `N `` arity
//! marker when the type is generic (`ISearchRequest`1`).
//!
//! A `base` is either such a key or a full `named` type reference, which is
//! how a closed generic base (`ListResponseBase<Hit>`) carries its arguments.

use crate::error::RegistryError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// Kind of a registered type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Reference type; the only kind eligible for export.
    #[default]
    Class,
    /// Interface, including capability and companion interfaces.
    Interface,
    /// Value type.
    Struct,
    /// Enumeration.
    Enum,
}

/// Shape of a property type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// Built-in scalar such as `string`, `int` or `DateTime`.
    Primitive { name: String },

    /// Another named type, possibly generic.
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<TypeRef>,
    },

    /// Homogeneous collection; nesting adds dimensions.
    Collection { element: Box<TypeRef> },

    /// Key/value dictionary.
    Map { key: Box<TypeRef>, value: Box<TypeRef> },

    /// Open generic parameter of the declaring type.
    Parameter { name: String },
}

impl TypeRef {
    /// Primitive reference.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive { name: name.into() }
    }

    /// Non-generic named reference.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Generic named reference.
    pub fn generic(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            arguments,
        }
    }

    /// Collection of `element`.
    pub fn collection(element: TypeRef) -> Self {
        Self::Collection {
            element: Box::new(element),
        }
    }

    /// Dictionary from `key` to `value`.
    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Generic parameter reference.
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::Parameter { name: name.into() }
    }

    /// Innermost element type and the number of collection levels around it.
    pub fn collection_element(&self) -> (&TypeRef, usize) {
        let mut current = self;
        let mut dimension = 0;
        while let TypeRef::Collection { element } = current {
            current = element;
            dimension += 1;
        }
        (current, dimension)
    }

    /// Type arguments of a named reference; empty for every other shape.
    pub fn arguments(&self) -> &[TypeRef] {
        match self {
            Self::Named { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Registry key of a named reference.
    ///
    /// A name that already carries an arity marker is used as written.
    pub fn named_key(&self) -> Option<String> {
        match self {
            Self::Named { name, arguments } if arguments.is_empty() => Some(name.clone()),
            Self::Named { name, arguments } => Some(type_key(strip_arity(name), arguments.len())),
            _ => None,
        }
    }

    /// Replace generic parameters bound in `bindings`, at any depth.
    pub fn substitute(&self, bindings: &HashMap<String, TypeRef>) -> TypeRef {
        match self {
            Self::Parameter { name } => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Named { name, arguments } => Self::Named {
                name: name.clone(),
                arguments: arguments.iter().map(|a| a.substitute(bindings)).collect(),
            },
            Self::Collection { element } => Self::collection(element.substitute(bindings)),
            Self::Map { key, value } => {
                Self::map(key.substitute(bindings), value.substitute(bindings))
            }
            Self::Primitive { .. } => self.clone(),
        }
    }
}

/// A `base` entry: a plain key or a full reference.
#[derive(Deserialize)]
#[serde(untagged)]
enum BaseRef {
    Key(String),
    Type(TypeRef),
}

fn deserialize_base<'de, D>(deserializer: D) -> Result<Option<TypeRef>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BaseRef>::deserialize(deserializer)?.map(|base| match base {
        BaseRef::Key(key) => TypeRef::named(key),
        BaseRef::Type(ty) => ty,
    }))
}

/// A property as declared on one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Source property name.
    pub name: String,

    /// Declared property type.
    #[serde(rename = "type")]
    pub ty: TypeRef,

    /// Explicit wire name, used verbatim when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_name: Option<String>,
}

/// A registered type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type name; an arity marker, if present, is ignored.
    pub name: String,

    /// Kind of type.
    #[serde(default)]
    pub kind: TypeKind,

    /// Whether the type is abstract.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    /// Generic parameter names, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<String>,

    /// Base class, with type arguments when it is a closed generic.
    #[serde(
        default,
        deserialize_with = "deserialize_base",
        skip_serializing_if = "Option::is_none"
    )]
    pub base: Option<TypeRef>,

    /// Keys of directly implemented (or, for interfaces, extended) interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,

    /// Properties declared directly on this type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
    /// Create a concrete class with no members.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            is_abstract: false,
            generic_parameters: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Create an interface with no members.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::class(name)
        }
    }

    /// Set generic parameter names.
    pub fn with_generics<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generic_parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Set a non-generic base class.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(TypeRef::named(base));
        self
    }

    /// Set a closed generic base class, e.g. `ListResponseBase<Hit>`.
    pub fn with_generic_base(mut self, base: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        self.base = Some(TypeRef::generic(base, arguments));
        self
    }

    /// Add an implemented interface key.
    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Add a property.
    pub fn with_property(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            ty,
            wire_name: None,
        });
        self
    }

    /// Add a property carrying an explicit wire name.
    pub fn with_wire_property(
        mut self,
        name: impl Into<String>,
        ty: TypeRef,
        wire_name: impl Into<String>,
    ) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            ty,
            wire_name: Some(wire_name.into()),
        });
        self
    }

    /// Mark the type abstract.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Name without any arity marker.
    pub fn bare_name(&self) -> &str {
        strip_arity(&self.name)
    }

    /// Number of generic parameters.
    pub fn arity(&self) -> usize {
        self.generic_parameters.len()
    }

    /// Lookup key: bare name plus arity marker for generic types.
    pub fn key(&self) -> String {
        type_key(self.bare_name(), self.arity())
    }

    /// Whether this is a concrete (non-abstract) class.
    pub fn is_concrete_class(&self) -> bool {
        self.kind == TypeKind::Class && !self.is_abstract
    }

    /// Registry key of the base class.
    pub fn base_key(&self) -> Option<String> {
        self.base.as_ref().and_then(TypeRef::named_key)
    }

    /// Find a property declared directly on this type.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Strip a `` `N `` generic arity marker from a type name.
pub fn strip_arity(name: &str) -> &str {
    name.split_once('`').map_or(name, |(bare, _)| bare)
}

/// Build a lookup key from a bare name and arity.
pub fn type_key(bare_name: &str, arity: usize) -> String {
    if arity == 0 {
        bare_name.to_string()
    } else {
        format!("{bare_name}`{arity}")
    }
}

/// On-disk registry layout.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    /// High level model types.
    #[serde(default)]
    pub model: Vec<TypeDescriptor>,

    /// Low level parameter types.
    #[serde(default)]
    pub low_level: Vec<TypeDescriptor>,
}

/// One indexed type universe.
#[derive(Debug, Default)]
pub struct Universe {
    types: Vec<TypeDescriptor>,
    index: HashMap<String, usize>,
}

impl Universe {
    fn build(label: &str, types: Vec<TypeDescriptor>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(types.len());
        for (i, ty) in types.iter().enumerate() {
            if index.insert(ty.key(), i).is_some() {
                return Err(RegistryError::duplicate(label, ty.key()));
            }
        }

        let universe = Self { types, index };
        universe.check_bases()?;
        Ok(universe)
    }

    fn check_bases(&self) -> Result<(), RegistryError> {
        for ty in &self.types {
            let mut chain = vec![ty.key()];
            let mut current = ty;
            while let Some(base) = &current.base {
                let Some(next) = base.named_key().and_then(|key| self.get(&key)) else {
                    let base = base.named_key().unwrap_or_else(|| format!("{base:?}"));
                    return Err(RegistryError::unknown_base(current.key(), base));
                };
                if chain.contains(&next.key()) {
                    chain.push(next.key());
                    return Err(RegistryError::InheritanceCycle { cycle: chain });
                }
                chain.push(next.key());
                current = next;
            }
        }
        Ok(())
    }

    /// Types in declaration order.
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// Look up a type by key.
    pub fn get(&self, key: &str) -> Option<&TypeDescriptor> {
        self.index.get(key).map(|&i| &self.types[i])
    }
}

/// Both type universes plus the wire-name override map.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    model: Universe,
    low_level: Universe,
    overrides: HashMap<(String, String), String>,
}

impl TypeRegistry {
    /// Build and validate a registry.
    pub fn new(
        model: Vec<TypeDescriptor>,
        low_level: Vec<TypeDescriptor>,
    ) -> Result<Self, RegistryError> {
        let model = Universe::build("model", model)?;
        let low_level = Universe::build("low_level", low_level)?;

        let overrides = model
            .types()
            .iter()
            .flat_map(|ty| {
                let key = ty.key();
                ty.properties.iter().filter_map(move |p| {
                    p.wire_name
                        .as_ref()
                        .map(|wire| ((key.clone(), p.name.clone()), wire.clone()))
                })
            })
            .collect();

        Ok(Self {
            model,
            low_level,
            overrides,
        })
    }

    /// Parse a registry from JSON text.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = serde_json::from_str(json)?;
        Self::new(file.model, file.low_level)
    }

    /// Load a registry file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let registry = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            model = registry.model.types().len(),
            low_level = registry.low_level.types().len(),
            "type registry loaded"
        );
        Ok(registry)
    }

    /// The high level model universe.
    pub fn model(&self) -> &Universe {
        &self.model
    }

    /// The low level parameter universe.
    pub fn low_level(&self) -> &Universe {
        &self.low_level
    }

    /// Look up a model type by key.
    pub fn get(&self, key: &str) -> Option<&TypeDescriptor> {
        self.model.get(key)
    }

    /// Explicit wire name of `member` as declared on `type_key`.
    pub fn wire_name(&self, type_key: &str, member: &str) -> Option<&str> {
        self.overrides
            .get(&(type_key.to_string(), member.to_string()))
            .map(String::as_str)
    }

    /// Every interface key `ty` implements, directly or transitively,
    /// through its own interfaces, interface inheritance and base classes.
    ///
    /// Interfaces that are not registered still appear but contribute no
    /// further ancestors.
    pub fn all_interfaces(&self, ty: &TypeDescriptor) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        let mut current = Some(ty);
        while let Some(t) = current {
            pending.extend(t.interfaces.iter().rev().map(String::as_str));
            while let Some(key) = pending.pop() {
                if !seen.insert(key.to_string()) {
                    continue;
                }
                result.push(key.to_string());
                if let Some(iface) = self.model.get(key) {
                    pending.extend(iface.interfaces.iter().rev().map(String::as_str));
                }
            }
            current = t.base_key().and_then(|b| self.model.get(&b));
        }

        result
    }

    /// Whether `ty` is `interface` or implements it.
    pub fn is_assignable_to(&self, ty: &TypeDescriptor, interface: &str) -> bool {
        ty.key() == interface || self.all_interfaces(ty).iter().any(|i| i == interface)
    }

    /// Properties of `ty` including inherited ones, root-most base first,
    /// each paired with the key of its declaring type.
    ///
    /// Inherited property types have the base's generic parameters replaced
    /// by the arguments `ty` supplies, so `Items: TItem[]` declared on
    /// `ListResponseBase<TItem>` reads `Items: Hit[]` for a type deriving from
    /// `ListResponseBase<Hit>`. Parameters of `ty` itself stay open.
    pub fn flattened_properties(&self, ty: &TypeDescriptor) -> Vec<(String, PropertyDescriptor)> {
        let mut chain = vec![(ty, HashMap::new())];
        let mut bindings: HashMap<String, TypeRef> = HashMap::new();
        let mut current = ty;

        while let Some(base_ref) = &current.base {
            let Some(base) = base_ref.named_key().and_then(|key| self.model.get(&key)) else {
                break;
            };
            bindings = base
                .generic_parameters
                .iter()
                .zip(base_ref.arguments())
                .map(|(parameter, argument)| (parameter.clone(), argument.substitute(&bindings)))
                .collect();
            chain.push((base, bindings.clone()));
            current = base;
        }

        chain
            .into_iter()
            .rev()
            .flat_map(|(t, bindings)| {
                let key = t.key();
                t.properties.iter().map(move |p| {
                    (
                        key.clone(),
                        PropertyDescriptor {
                            ty: p.ty.substitute(&bindings),
                            ..p.clone()
                        },
                    )
                })
            })
            .collect()
    }
}
