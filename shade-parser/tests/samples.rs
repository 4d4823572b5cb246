//! Whole-program checks over the curated sample library.

use rstest::rstest;
use shade_parser::shade::ast::{Module, NodeKind};
use shade_parser::shade::building::{from_structure_data, to_structure_data};
use shade_parser::shade::semantic::const_eval::{evaluate, ConstValue};
use shade_parser::shade::testing::samples::{SampleCategory, Samples};
use shade_parser::shade::testing::{assert_fully_validated, assert_parents};

fn global_type(module: &Module, name: &str) -> String {
    let id = module.resolve_global(name).unwrap();
    module.types().display(module.type_of(id).unwrap())
}

#[test]
fn test_every_valid_sample_is_fully_validated() {
    for sample in Samples::valid() {
        let module = sample.parse();
        assert_fully_validated(&module);
        assert_parents(&module);
    }
}

#[rstest]
#[case(SampleCategory::Program, 1)]
#[case(SampleCategory::Program, 2)]
#[case(SampleCategory::Declarations, 1)]
#[case(SampleCategory::Declarations, 2)]
#[case(SampleCategory::Statements, 1)]
fn test_structure_data_round_trip(#[case] category: SampleCategory, #[case] number: usize) {
    let sample = Samples::load(category, number);
    let analyzed = sample.analyze();
    let module = sample.parse();
    assert_eq!(to_structure_data(&module).unwrap(), analyzed, "{}", sample.name());

    let mut rebuilt = from_structure_data(&analyzed).unwrap();
    rebuilt
        .validate()
        .unwrap_or_else(|e| panic!("{}: {}", sample.name(), e));
    assert_fully_validated(&rebuilt);
    assert_eq!(to_structure_data(&rebuilt).unwrap(), analyzed, "{}", sample.name());
}

#[test]
fn test_round_trip_cases_cover_every_valid_sample() {
    let covered: Vec<_> = Samples::valid()
        .iter()
        .map(|sample| (sample.category, sample.number))
        .collect();
    assert_eq!(
        covered,
        vec![
            (SampleCategory::Program, 1),
            (SampleCategory::Program, 2),
            (SampleCategory::Declarations, 1),
            (SampleCategory::Declarations, 2),
            (SampleCategory::Statements, 1),
        ]
    );
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
#[case(5)]
fn test_error_samples(#[case] number: usize) {
    let sample = Samples::error(number);
    let expected = sample.expected_error().expect("error samples name their error");
    let error = sample.parse_error();
    assert_eq!(error.kind(), expected, "{}: {}", sample.name(), error);
    let location = error.location().expect("errors are located");
    assert_eq!(location.file, sample.name());
}

#[test]
fn test_unknown_type_is_named_and_located() {
    let error = Samples::error(1).parse_error();
    assert!(error.to_string().contains("unknown type `Mass`"), "{}", error);
    assert_eq!(error.location().unwrap().range.start.line, 3);
}

#[test]
fn test_lighting_program() {
    let module = Samples::program(1).parse();
    assert_eq!(global_type(&module, "lights"), "Lights");
    assert_eq!(global_type(&module, "albedo"), "texture_2d<f32>");
    assert_eq!(global_type(&module, "ambient"), "f32");

    let main = module.resolve_function("main").unwrap();
    assert_eq!(module.types().display(module.type_of(main).unwrap()), "vec4<f32>");

    // `length` inside `attenuate` is bound to the build-in.
    let length_call = module
        .ids()
        .find(|id| {
            matches!(module.kind(*id), NodeKind::FunctionCall { name, .. } if name == "length")
        })
        .unwrap();
    assert_eq!(module.types().display(module.type_of(length_call).unwrap()), "f32");
}

#[test]
fn test_reduce_program() {
    let module = Samples::program(2).parse();
    assert_eq!(global_type(&module, "partial"), "array<f32, 64>");
    assert_eq!(global_type(&module, "input"), "array<f32>");
    let partial = module.types().lookup("ID:ARRAY->ID:NUMERIC->Float->64");
    assert!(partial.is_some());
}

#[test]
fn test_declaration_samples() {
    let module = Samples::declarations(1).parse();
    let mesh = module.resolve_struct("Mesh").unwrap();
    let mesh_ty = module.type_of(mesh).unwrap();
    let properties = module.types().properties(mesh_ty);
    assert!(properties.fixed);
    assert!(properties.constructible);
    assert!(properties.shareable);

    let module = Samples::declarations(2).parse();
    let fold = |name: &str| {
        let id = module.resolve_global(name).unwrap();
        let NodeKind::VariableDeclaration {
            value: Some(value), ..
        } = module.kind(id)
        else {
            panic!("`{}` has no initializer", name);
        };
        evaluate(&module, *value).unwrap()
    };
    assert_eq!(fold("count"), ConstValue::Int(13));
    assert_eq!(fold("mask"), ConstValue::Int(u32::MAX as i64));
    assert_eq!(fold("table_size"), ConstValue::Int(26));
    assert_eq!(global_type(&module, "lookup"), "array<f32, 26>");
    let label = module.resolve_enum("Label").unwrap();
    assert_eq!(module.types().display(module.type_of(label).unwrap()), "string");
}

#[test]
fn test_statement_samples() {
    let module = Samples::statements(1).parse();
    let accumulate = module.resolve_function("accumulate").unwrap();
    assert_eq!(
        module.types().display(module.type_of(accumulate).unwrap()),
        "u32"
    );
}
