//! Declaration emitter.
//!
//! Drives the naming engine over every selected type and serializes the
//! result into a single artifact. The whole text is built in memory; writing
//! it is the caller's job and happens once, after generation succeeded.
//!
//! Registered model types that the selected types refer to (hits, fields,
//! aggregates) are declared after the candidates, in first-reference order,
//! so that no emitted name dangles.

use crate::context::GenerationContext;
use crate::filter::CandidateType;
use crate::naming::{ExportedTypeName, NamingEngine, MAP_SHAPE};
use crate::registry::{TypeRef, TypeRegistry};
use std::collections::{HashSet, VecDeque};
use std::fmt::Write as _;
use tracing::{debug, info};

/// Name of the always-emitted date interval shape.
pub const DATE_INTERVAL: &str = "DateInterval";

/// Generated output containing all declarations.
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Complete declaration file content.
    pub content: String,

    /// Individual declarations, auxiliary shapes first.
    pub declarations: Vec<GeneratedDeclaration>,

    /// Summary counts.
    pub report: GenerationReport,
}

/// A single emitted declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDeclaration {
    /// Source type name.
    pub source_name: String,

    /// Exported header, e.g. `search_response<T>`.
    pub exported_name: String,

    /// Owning namespace, when the symbol table knows one.
    pub namespace: Option<String>,

    /// Members in emission order.
    pub members: Vec<GeneratedMember>,

    /// Low level parameter type matching this request, if any.
    pub parameter_type: Option<String>,
}

/// A single emitted member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMember {
    /// Exported member name.
    pub name: String,

    /// Rendered member type.
    pub type_name: String,
}

/// Counts describing one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Declarations emitted, auxiliary shapes included.
    pub declarations: usize,

    /// Members emitted across all declarations.
    pub members: usize,

    /// Requests with a matching low level parameter type.
    pub requests_with_parameters: usize,

    /// Declarations pulled in because another declaration refers to them.
    pub referenced: usize,
}

/// Serializes candidate types into declaration text.
#[derive(Debug)]
pub struct DeclarationEmitter<'a> {
    engine: NamingEngine<'a>,
    ctx: &'a GenerationContext,
    registry: &'a TypeRegistry,
}

impl<'a> DeclarationEmitter<'a> {
    /// Create an emitter over a context and registry.
    pub fn new(ctx: &'a GenerationContext, registry: &'a TypeRegistry) -> Self {
        Self {
            engine: NamingEngine::new(ctx, registry),
            ctx,
            registry,
        }
    }

    /// Emit the auxiliary shapes, every candidate in order, then the
    /// registered types they refer to.
    pub fn emit(&self, candidates: &[CandidateType]) -> GeneratedOutput {
        let mut pending = VecDeque::new();
        let mut declarations = self.auxiliary_declarations(&mut pending);
        let mut declared: HashSet<String> =
            HashSet::from([MAP_SHAPE.to_string(), DATE_INTERVAL.to_string()]);

        for candidate in candidates {
            if candidate.name == DATE_INTERVAL || candidate.name == MAP_SHAPE {
                continue;
            }
            declared.insert(candidate.key());
            queue_references(candidate, &mut pending);
            declarations.push(self.traced(self.declare(candidate)));
        }

        let mut referenced = 0;
        while let Some(key) = pending.pop_front() {
            if !declared.insert(key.clone()) {
                continue;
            }
            let Some(ty) = self.registry.get(&key) else {
                continue;
            };
            let candidate = CandidateType::from_descriptor(self.registry, ty);
            queue_references(&candidate, &mut pending);
            declarations.push(self.traced(self.declare(&candidate)));
            referenced += 1;
        }

        let report = GenerationReport {
            declarations: declarations.len(),
            members: declarations.iter().map(|d| d.members.len()).sum(),
            requests_with_parameters: declarations
                .iter()
                .filter(|d| d.parameter_type.is_some())
                .count(),
            referenced,
        };

        let content = self.render(&declarations);

        info!(
            declarations = report.declarations,
            members = report.members,
            requests_with_parameters = report.requests_with_parameters,
            referenced = report.referenced,
            "generation complete"
        );

        GeneratedOutput {
            content,
            declarations,
            report,
        }
    }

    /// Build the declaration for one candidate.
    pub fn declare(&self, candidate: &CandidateType) -> GeneratedDeclaration {
        let members = candidate
            .properties
            .iter()
            .map(|member| GeneratedMember {
                name: self.engine.member_name(member),
                type_name: self.engine.member_type(member),
            })
            .collect();

        let namespace = self
            .ctx
            .symbols
            .namespace_of(&candidate.name)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);

        let parameter_type = self
            .ctx
            .parameters
            .get(&candidate.name)
            .map(|p| p.bare_name().to_string());

        GeneratedDeclaration {
            source_name: candidate.name.clone(),
            exported_name: self.engine.declaration_name(candidate).to_string(),
            namespace,
            members,
            parameter_type,
        }
    }

    fn traced(&self, declaration: GeneratedDeclaration) -> GeneratedDeclaration {
        debug!(
            source = %declaration.source_name,
            exported = %declaration.exported_name,
            members = declaration.members.len(),
            "emitted declaration"
        );
        declaration
    }

    /// The map shape and the date interval shape, always present.
    fn auxiliary_declarations(&self, pending: &mut VecDeque<String>) -> Vec<GeneratedDeclaration> {
        let map = GeneratedDeclaration {
            source_name: MAP_SHAPE.to_string(),
            exported_name: ExportedTypeName::generic(
                MAP_SHAPE,
                vec![
                    ExportedTypeName::simple("TKey"),
                    ExportedTypeName::simple("TValue"),
                ],
            )
            .to_string(),
            namespace: None,
            members: Vec::new(),
            parameter_type: None,
        };

        // A registered DateInterval contributes its members; otherwise the
        // shape is emitted empty.
        let date_interval = match self.registry.get(DATE_INTERVAL) {
            Some(ty) => {
                let candidate = CandidateType::from_descriptor(self.registry, ty);
                queue_references(&candidate, pending);
                self.declare(&candidate)
            }
            None => GeneratedDeclaration {
                source_name: DATE_INTERVAL.to_string(),
                exported_name: self.engine.type_base_name(DATE_INTERVAL),
                namespace: None,
                members: Vec::new(),
                parameter_type: None,
            },
        };

        vec![map, date_interval]
    }

    fn render(&self, declarations: &[GeneratedDeclaration]) -> String {
        let mut output = String::new();

        output.push_str("// Auto-generated by nest-typegen\n");
        output.push_str("// Do not edit manually\n");

        for declaration in declarations {
            output.push('\n');

            if self.ctx.annotate_namespaces {
                if let Some(ns) = &declaration.namespace {
                    let _ = writeln!(output, "/** namespace: {ns} */");
                }
            }

            let _ = writeln!(output, "interface {} {{", declaration.exported_name);
            for member in &declaration.members {
                let _ = writeln!(output, "\t{}: {};", member.name, member.type_name);
            }
            output.push_str("}\n");
        }

        output
    }
}

/// Queue the registry key of every named type the candidate's members use.
fn queue_references(candidate: &CandidateType, pending: &mut VecDeque<String>) {
    for member in &candidate.properties {
        collect_named(&member.property_type, pending);
    }
}

fn collect_named(ty: &TypeRef, pending: &mut VecDeque<String>) {
    match ty {
        TypeRef::Named { arguments, .. } => {
            pending.extend(ty.named_key());
            for argument in arguments {
                collect_named(argument, pending);
            }
        }
        TypeRef::Collection { element } => collect_named(element, pending),
        TypeRef::Map { key, value } => {
            collect_named(key, pending);
            collect_named(value, pending);
        }
        TypeRef::Primitive { .. } | TypeRef::Parameter { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::filter::select_with_context;
    use crate::parameters::ParameterIndex;
    use crate::registry::{TypeDescriptor, TypeRef};
    use crate::symbols::SymbolTable;

    fn registry() -> TypeRegistry {
        TypeRegistry::new(
            vec![
                TypeDescriptor::interface("IRequest"),
                TypeDescriptor::interface("IResponse"),
                TypeDescriptor::class("PingResponse")
                    .implementing("IResponse")
                    .with_property("Took", TypeRef::primitive("long")),
                TypeDescriptor::class("SearchRequest")
                    .with_generics(["T"])
                    .implementing("IRequest")
                    .with_property("Size", TypeRef::primitive("int"))
                    .with_property(
                        "Sort",
                        TypeRef::collection(TypeRef::map(
                            TypeRef::primitive("string"),
                            TypeRef::named("SortOrder"),
                        )),
                    ),
            ],
            vec![TypeDescriptor::class("SearchRequestParameters")],
        )
        .unwrap()
    }

    fn context(registry: &TypeRegistry, annotate: bool) -> GenerationContext {
        let mut config = Config::default();
        config.output.annotate_namespaces = annotate;

        let mut symbols = SymbolTable::new();
        symbols.insert("SearchRequest", "Nest");
        symbols.insert("PingResponse", "");

        GenerationContext::new(&config, symbols, ParameterIndex::build(registry)).unwrap()
    }

    #[test]
    fn test_emit_content() {
        let registry = registry();
        let ctx = context(&registry, true);
        let candidates = select_with_context(&registry, &ctx);

        let output = DeclarationEmitter::new(&ctx, &registry).emit(&candidates);

        let expected = "// Auto-generated by nest-typegen\n\
// Do not edit manually\n\
\n\
interface Map<TKey, TValue> {\n\
}\n\
\n\
interface date_interval {\n\
}\n\
\n\
interface ping_response {\n\
\tTook: number;\n\
}\n\
\n\
/** namespace: Nest */\n\
interface search_request<T> {\n\
\tSize: number;\n\
\tSort: Map<string, sort_order>;\n\
}\n";
        assert_eq!(output.content, expected);
    }

    #[test]
    fn test_emit_without_namespace_annotations() {
        let registry = registry();
        let ctx = context(&registry, false);
        let candidates = select_with_context(&registry, &ctx);

        let output = DeclarationEmitter::new(&ctx, &registry).emit(&candidates);

        assert!(!output.content.contains("namespace"));
        assert_eq!(output.declarations[3].namespace.as_deref(), Some("Nest"));
    }

    #[test]
    fn test_auxiliary_declarations_always_present() {
        let registry = TypeRegistry::new(Vec::new(), Vec::new()).unwrap();
        let ctx = context(&registry, true);

        let output = DeclarationEmitter::new(&ctx, &registry).emit(&[]);

        let names: Vec<_> = output
            .declarations
            .iter()
            .map(|d| d.exported_name.as_str())
            .collect();
        assert_eq!(names, vec!["Map<TKey, TValue>", "date_interval"]);
        assert_eq!(output.report.declarations, 2);
    }

    #[test]
    fn test_registered_date_interval_contributes_members() {
        let registry = TypeRegistry::new(
            vec![TypeDescriptor::class(DATE_INTERVAL)
                .with_property("Factor", TypeRef::primitive("int"))],
            Vec::new(),
        )
        .unwrap();
        let ctx = context(&registry, true);

        let output = DeclarationEmitter::new(&ctx, &registry).emit(&[]);

        assert_eq!(
            output.declarations[1].members,
            vec![GeneratedMember {
                name: "Factor".to_string(),
                type_name: "number".to_string(),
            }]
        );
    }

    #[test]
    fn test_report_counts() {
        let registry = registry();
        let ctx = context(&registry, true);
        let candidates = select_with_context(&registry, &ctx);

        let output = DeclarationEmitter::new(&ctx, &registry).emit(&candidates);

        assert_eq!(
            output.report,
            GenerationReport {
                declarations: 4,
                members: 3,
                requests_with_parameters: 1,
                referenced: 0,
            }
        );
        assert_eq!(
            output.declarations[3].parameter_type.as_deref(),
            Some("SearchRequestParameters")
        );
    }

    #[test]
    fn test_referenced_types_are_declared() {
        let registry = TypeRegistry::new(
            vec![
                TypeDescriptor::interface("IResponse"),
                TypeDescriptor::class("SearchResponse")
                    .implementing("IResponse")
                    .with_property("Hits", TypeRef::collection(TypeRef::named("Hit")))
                    .with_property("Total", TypeRef::named("TotalHits")),
                TypeDescriptor::class("Hit")
                    .with_property("Score", TypeRef::primitive("double"))
                    .with_property("Explanation", TypeRef::named("Explanation")),
                TypeDescriptor::class("TotalHits").with_property("Value", TypeRef::primitive("long")),
                TypeDescriptor::class("Explanation")
                    .with_property("Details", TypeRef::collection(TypeRef::named("Explanation"))),
            ],
            Vec::new(),
        )
        .unwrap();
        let ctx = context(&registry, true);
        let candidates = select_with_context(&registry, &ctx);

        let output = DeclarationEmitter::new(&ctx, &registry).emit(&candidates);

        let names: Vec<_> = output
            .declarations
            .iter()
            .map(|d| d.exported_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "Map<TKey, TValue>",
                "date_interval",
                "search_response",
                "hit",
                "total_hits",
                "explanation",
            ]
        );
        assert!(output
            .content
            .contains("interface hit {\n\tScore: number;\n\tExplanation: explanation;\n}\n"));
        assert_eq!(output.report.referenced, 3);
    }

    #[test]
    fn test_referenced_generic_and_map_types_are_declared_once() {
        let registry = TypeRegistry::new(
            vec![
                TypeDescriptor::interface("IResponse"),
                TypeDescriptor::interface("IAggregate"),
                TypeDescriptor::class("Hit")
                    .with_generics(["T"])
                    .with_property("Source", TypeRef::parameter("T")),
                TypeDescriptor::class("SearchResponse")
                    .with_generics(["T"])
                    .implementing("IResponse")
                    .with_property(
                        "Hits",
                        TypeRef::collection(TypeRef::generic("Hit", vec![TypeRef::parameter("T")])),
                    )
                    .with_property(
                        "Aggregations",
                        TypeRef::map(TypeRef::primitive("string"), TypeRef::named("IAggregate")),
                    ),
                TypeDescriptor::class("MultiSearchResponse")
                    .implementing("IResponse")
                    .with_property(
                        "Responses",
                        TypeRef::collection(TypeRef::generic(
                            "SearchResponse",
                            vec![TypeRef::primitive("object")],
                        )),
                    ),
            ],
            Vec::new(),
        )
        .unwrap();
        let ctx = context(&registry, false);
        let candidates = select_with_context(&registry, &ctx);

        let output = DeclarationEmitter::new(&ctx, &registry).emit(&candidates);

        let names: Vec<_> = output
            .declarations
            .iter()
            .skip(2)
            .map(|d| d.exported_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["search_response<T>", "multi_search_response", "hit<T>", "aggregate"]
        );
        assert_eq!(output.content.matches("interface search_response<T> {").count(), 1);
    }

    #[test]
    fn test_closed_generic_base_renders_bound_members() {
        let registry = TypeRegistry::new(
            vec![
                TypeDescriptor::interface("IResponse"),
                TypeDescriptor::class("ListResponseBase")
                    .abstract_type()
                    .with_generics(["TItem"])
                    .implementing("IResponse")
                    .with_property("Items", TypeRef::collection(TypeRef::parameter("TItem"))),
                TypeDescriptor::class("Hit").with_property("Score", TypeRef::primitive("double")),
                TypeDescriptor::class("HitsResponse")
                    .with_generic_base("ListResponseBase", vec![TypeRef::named("Hit")]),
            ],
            Vec::new(),
        )
        .unwrap();
        let ctx = context(&registry, true);
        let candidates = select_with_context(&registry, &ctx);

        let output = DeclarationEmitter::new(&ctx, &registry).emit(&candidates);

        assert!(output
            .content
            .contains("\ninterface hits_response {\n\tItems: hit[];\n}\n"));
        assert!(output
            .content
            .contains("\ninterface hit {\n\tScore: number;\n}\n"));
        assert!(!output.content.contains("TItem"));
    }
}
