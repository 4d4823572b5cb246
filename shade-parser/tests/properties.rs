//! Property-based tests for the front end
//!
//! These generate small, well-formed programs and check the guarantees every compilation
//! gives: the tokenizer always terminates, compilation is deterministic, structure data
//! survives serialization, and type properties follow from the shape of the type.

use proptest::prelude::*;
use shade_parser::shade::building::to_structure_data;
use shade_parser::shade::formats::serialization::{from_json, from_yaml, to_json, to_yaml};
use shade_parser::shade::lexing::tokenize;
use shade_parser::shade::options::ParseOptions;
use shade_parser::shade::parsing::{analyze, parse};
use shade_parser::shade::types::TypeProperties;

const SCALARS: [&str; 5] = ["bool", "i32", "u32", "f32", "f16"];

/// A scalar type name with a literal of that type.
fn typed_literal() -> impl Strategy<Value = (&'static str, String)> {
    prop_oneof![
        any::<bool>().prop_map(|b| ("bool", b.to_string())),
        (0i32..10_000).prop_map(|n| ("i32", format!("{}i", n))),
        (0u32..10_000).prop_map(|n| ("u32", format!("{}u", n))),
        (0u32..1_000).prop_map(|n| ("f32", format!("{}.5", n))),
    ]
}

/// A program of uniquely named constant declarations.
fn constants_program() -> impl Strategy<Value = String> {
    prop::collection::vec(typed_literal(), 1..12).prop_map(|declarations| {
        declarations
            .iter()
            .enumerate()
            .map(|(index, (ty, literal))| format!("const c_{}: {} = {};", index, ty, literal))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn alias_properties(target: &str) -> TypeProperties {
    let module = parse(&format!("alias Subject = {};", target)).unwrap();
    let id = module.resolve_alias("Subject").unwrap();
    module.types().properties(module.type_of(id).unwrap())
}

proptest! {
    #[test]
    fn test_tokenizer_is_total(source in "[ -~\n\t]{0,80}") {
        let results: Vec<_> = tokenize(&source).collect();
        let errors = results.iter().filter(|r| r.is_err()).count();
        prop_assert!(errors <= 1);
        if errors == 1 {
            prop_assert!(results.last().unwrap().is_err());
        }
        let mut previous_end = 0;
        for token in results.iter().filter_map(|r| r.as_ref().ok()) {
            prop_assert!(token.span.start >= previous_end);
            prop_assert!(token.span.end <= source.len());
            prop_assert_eq!(&source[token.span.clone()], token.text.as_str());
            previous_end = token.span.end;
        }
    }

    #[test]
    fn test_parsing_is_deterministic(source in constants_program()) {
        let first = parse(&source).unwrap();
        let second = parse(&source).unwrap();
        prop_assert_eq!(
            to_structure_data(&first).unwrap(),
            to_structure_data(&second).unwrap()
        );
        prop_assert_eq!(first.len(), second.len());
        for id in first.ids() {
            let left = first.type_of(id).ok().map(|ty| first.types().identifier(ty).to_string());
            let right = second.type_of(id).ok().map(|ty| second.types().identifier(ty).to_string());
            prop_assert_eq!(left, right);
        }
    }

    #[test]
    fn test_structure_data_survives_serialization(source in constants_program()) {
        let data = analyze(&source, &ParseOptions::for_file("generated.shade")).unwrap();
        prop_assert_eq!(&from_json(&to_json(&data).unwrap()).unwrap(), &data);
        prop_assert_eq!(&from_yaml(&to_yaml(&data).unwrap()).unwrap(), &data);
    }

    #[test]
    fn test_rebuilt_module_matches_source(source in constants_program()) {
        let module = parse(&source).unwrap();
        let data = analyze(&source, &ParseOptions::default()).unwrap();
        prop_assert_eq!(to_structure_data(&module).unwrap(), data);
    }

    #[test]
    fn test_scalar_properties(scalar in prop::sample::select(SCALARS.to_vec())) {
        let properties = alias_properties(scalar);
        prop_assert!(!properties.composite);
        prop_assert!(!properties.indexable);
        prop_assert!(properties.constructible && properties.fixed && properties.plain);
        prop_assert!(properties.storable);
        prop_assert_eq!(properties.shareable, scalar != "bool");
    }

    #[test]
    fn test_vector_properties(
        scalar in prop::sample::select(SCALARS.to_vec()),
        size in 2u8..=4,
    ) {
        let properties = alias_properties(&format!("vec{}<{}>", size, scalar));
        prop_assert!(properties.composite && properties.indexable);
        prop_assert!(properties.constructible && properties.fixed && properties.plain);
        prop_assert_eq!(properties.shareable, scalar != "bool");
    }

    #[test]
    fn test_array_properties(
        scalar in prop::sample::select(SCALARS.to_vec()),
        length in prop::option::of(1u32..64),
    ) {
        let target = match length {
            Some(length) => format!("array<{}, {}>", scalar, length),
            None => format!("array<{}>", scalar),
        };
        let properties = alias_properties(&target);
        prop_assert!(properties.composite && properties.indexable);
        prop_assert_eq!(properties.fixed, length.is_some());
        prop_assert_eq!(properties.constructible, length.is_some());
        prop_assert_eq!(properties.shareable, length.is_some() && scalar != "bool");
    }

    #[test]
    fn test_struct_properties(
        members in prop::collection::vec(prop::sample::select(SCALARS.to_vec()), 1..6),
    ) {
        let body = members
            .iter()
            .enumerate()
            .map(|(index, ty)| format!("m_{}: {}", index, ty))
            .collect::<Vec<_>>()
            .join(", ");
        let module = parse(&format!("struct Subject {{ {} }}", body)).unwrap();
        let id = module.resolve_struct("Subject").unwrap();
        let properties = module.types().properties(module.type_of(id).unwrap());
        prop_assert!(properties.composite && !properties.indexable);
        prop_assert!(properties.constructible && properties.fixed);
        prop_assert_eq!(properties.shareable, !members.contains(&"bool"));
    }

    #[test]
    fn test_duplicate_globals_are_rejected(
        name in "v_[a-z]{1,6}",
        (first, second) in (typed_literal(), typed_literal()),
    ) {
        let source = format!(
            "const {}: {} = {};\nconst {}: {} = {};",
            name, first.0, first.1, name, second.0, second.1
        );
        let error = parse(&source).unwrap_err();
        prop_assert_eq!(error.kind(), "DuplicateDeclarationError");
        prop_assert!(error.to_string().contains(&name));
    }

    #[test]
    fn test_unknown_types_are_named(name in "Zz[a-z]{0,6}") {
        let error = parse(&format!("const x: {} = 1;", name)).unwrap_err();
        prop_assert_eq!(error.kind(), "UnknownTypeError");
        let quoted = format!("`{}`", name);
        prop_assert!(error.to_string().contains(&quoted));
    }
}

#[test]
fn test_pointer_properties() {
    let properties = alias_properties("ptr<f32>");
    assert!(properties.storable);
    assert!(!properties.constructible && !properties.fixed && !properties.plain);
    assert!(!properties.shareable && !properties.composite);
}

#[test]
fn test_typed_constant_end_to_end() {
    let module = parse("const myInt: i32 = 10;").unwrap();
    let id = module.resolve_global("myInt").unwrap();
    let ty = module.type_of(id).unwrap();
    assert_eq!(module.types().display(ty), "i32");
    assert_eq!(module.types().identifier(ty), "ID:NUMERIC->Integer");
    let properties = module.expression_properties(id).unwrap();
    assert!(properties.abstract_kind.is_none());
}

#[test]
fn test_alias_constant_end_to_end() {
    let module = parse("alias MyAlias = i32; const x: MyAlias = 1;").unwrap();
    let alias = module.resolve_alias("MyAlias").unwrap();
    let constant = module.resolve_global("x").unwrap();
    assert_eq!(module.type_of(alias).unwrap(), module.type_of(constant).unwrap());
    assert_eq!(module.types().display(module.type_of(constant).unwrap()), "i32");
}
