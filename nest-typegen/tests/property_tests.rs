//! Property-based tests for nest-typegen.
//!
//! Properties tested:
//! - Snake-case conversion is idempotent
//! - A marker-interface `I` prefix is stripped exactly once
//! - A generic reference with `k` arguments renders `k` argument slots
//! - `d` nested collections render `d` array markers, maps render none
//! - Symbol table insertion never overwrites and is idempotent
//! - Descriptor and attribute names are always excluded

use proptest::prelude::*;
use regex::Regex;
use std::collections::HashMap;

use nest_typegen::{
    config::{Config, DEFAULT_EXCLUSION_PATTERN},
    naming::{snake_case, NamingEngine},
    parameters::ParameterIndex,
    registry::TypeRef,
    GenerationContext, SymbolTable, TypeRegistry,
};

// =============================================================================
// Generators for property tests
// =============================================================================

/// A PascalCase identifier.
fn arb_pascal_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,6}([A-Z][a-z]{1,6}){0,3}"
}

/// Any identifier-like text, including digits and underscores.
fn arb_identifier() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,20}"
}

/// A namespace such as `Nest.Cluster`.
fn arb_namespace() -> impl Strategy<Value = String> {
    "Nest(\\.[A-Z][a-z]{1,8}){0,2}"
}

fn with_engine<R>(f: impl FnOnce(NamingEngine<'_>) -> R) -> R {
    let ctx = GenerationContext::new(
        &Config::default(),
        SymbolTable::new(),
        ParameterIndex::default(),
    )
    .unwrap();
    let registry = TypeRegistry::new(Vec::new(), Vec::new()).unwrap();
    f(NamingEngine::new(&ctx, &registry))
}

// =============================================================================
// Naming properties
// =============================================================================

proptest! {
    #[test]
    fn prop_snake_case_is_idempotent(name in arb_identifier()) {
        let once = snake_case(&name);
        prop_assert_eq!(snake_case(&once), once);
    }

    #[test]
    fn prop_snake_case_has_no_uppercase(name in arb_identifier()) {
        prop_assert!(!snake_case(&name).chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn prop_marker_prefix_stripped_once(rest in arb_pascal_name()) {
        let marker = format!("I{rest}");
        let doubled = format!("II{rest}");

        with_engine(|engine| {
            prop_assert_eq!(engine.type_base_name(&marker), snake_case(&rest));
            prop_assert_eq!(
                engine.type_base_name(&doubled),
                snake_case(&format!("I{rest}"))
            );
            Ok(())
        })?;
    }

    #[test]
    fn prop_generic_arguments_have_k_slots(name in arb_pascal_name(), k in 1usize..6) {
        let ty = TypeRef::generic(name, vec![TypeRef::parameter("T"); k]);

        with_engine(|engine| {
            let exported = engine.export_type_ref(&ty);
            prop_assert_eq!(exported.generic_arguments.len(), k);

            let rendered = exported.to_string();
            let slots = format!("<{}>", vec!["T"; k].join(", "));
            prop_assert!(rendered.ends_with(&slots));
            Ok(())
        })?;
    }

    #[test]
    fn prop_collections_have_d_markers(name in arb_pascal_name(), d in 0usize..6) {
        let mut ty = TypeRef::named(name.clone());
        for _ in 0..d {
            ty = TypeRef::collection(ty);
        }

        with_engine(|engine| {
            let exported = engine.export_type_ref(&ty);
            prop_assert_eq!(exported.array_dimension, d);
            prop_assert_eq!(
                exported.to_string(),
                format!("{}{}", snake_case(&name), "[]".repeat(d))
            );
            Ok(())
        })?;
    }

    #[test]
    fn prop_maps_have_no_markers(d in 0usize..6) {
        let mut ty = TypeRef::map(TypeRef::primitive("string"), TypeRef::primitive("long"));
        for _ in 0..d {
            ty = TypeRef::collection(ty);
        }

        with_engine(|engine| {
            let exported = engine.export_type_ref(&ty);
            prop_assert_eq!(exported.array_dimension, 0);
            prop_assert_eq!(exported.to_string(), "Map<string, number>");
            Ok(())
        })?;
    }
}

// =============================================================================
// Symbol table properties
// =============================================================================

proptest! {
    #[test]
    fn prop_symbol_table_first_writer_wins(
        entries in prop::collection::vec(("[A-C][a-c]{0,2}", arb_namespace()), 0..40)
    ) {
        let mut table = SymbolTable::new();
        let mut first: HashMap<String, String> = HashMap::new();

        for (name, ns) in &entries {
            let inserted = table.insert(name, ns);
            prop_assert_eq!(inserted, !first.contains_key(name));
            first.entry(name.clone()).or_insert_with(|| ns.clone());
        }

        prop_assert_eq!(table.len(), first.len());
        for (name, ns) in &first {
            prop_assert_eq!(table.namespace_of(name), Some(ns.as_str()));
        }

        // Replaying every insertion changes nothing
        for (name, ns) in &entries {
            prop_assert!(!table.insert(name, ns));
        }
        prop_assert_eq!(table.len(), first.len());
    }
}

// =============================================================================
// Filter properties
// =============================================================================

proptest! {
    #[test]
    fn prop_descriptor_and_attribute_names_excluded(
        stem in arb_pascal_name(),
        suffix in prop::sample::select(vec![
            "Descriptor",
            "Attribute",
            "DescriptorBase",
            "AttributeBase",
            "Descriptor`1",
            "Attribute`2",
        ]),
    ) {
        let pattern = Regex::new(DEFAULT_EXCLUSION_PATTERN).unwrap();
        let name = format!("{stem}{suffix}");
        prop_assert!(pattern.is_match(&name));
    }

    #[test]
    fn prop_request_and_response_names_kept(
        stem in "[A-Z][a-z]{1,8}",
        suffix in prop::sample::select(vec!["Request", "Response", "Property", "Analyzer"]),
    ) {
        let pattern = Regex::new(DEFAULT_EXCLUSION_PATTERN).unwrap();
        let name = format!("{stem}{suffix}");
        prop_assert!(!pattern.is_match(&name));
    }
}
