/* Service Generation Tests
 *
 * Service functions are generated as plain structs (arguments and a result
 * union) plus a helper value; these tests check the shapes and the glue.
 */

use assert_matches::assert_matches;
use idl_gen::{generate, GenError, Options};
use idl_types::{FieldSpec, FileId, FunctionSpec, Program, ProgramBuilder, StructKind, TypeSpec};

fn key_value() -> (Program, FileId) {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("kv.thrift", "example.com/gen/kv", "kv");
    let not_found = builder.add_struct(
        file,
        "NotFound",
        StructKind::Exception,
        vec![FieldSpec::optional(1, "message", TypeSpec::String)],
    );
    builder.add_service(
        file,
        "KeyValue",
        None,
        vec![
            FunctionSpec::new(
                "get",
                vec![FieldSpec::optional(5, "key", TypeSpec::String)],
                Some(TypeSpec::String),
                vec![FieldSpec::optional(1, "notFound", TypeSpec::Struct(not_found))],
            ),
            FunctionSpec::new("ping", vec![], None, vec![]),
            FunctionSpec::oneway("fire", vec![FieldSpec::required(1, "count", TypeSpec::I32)]),
        ],
    );
    (builder.build().unwrap(), file)
}

fn go_source(program: &Program, file: FileId) -> String {
    generate(program, file, &Options::default()).unwrap().contents
}

#[test]
fn test_arguments_become_a_required_struct() {
    let (program, file) = key_value();
    let source = go_source(&program, file);
    let flat = source.split_whitespace().collect::<Vec<_>>().join(" ");

    assert!(flat.contains("type KeyValue_Get_Args struct { Key string `json:\"key,required\"` }"));
    /* Parameters are renumbered from 1 */
    assert!(source.contains("\t\tcase 1:\n\t\t\tif field.Value.Type() == wire.TBinary {\n"));
    assert!(source.contains("func (v *KeyValue_Get_Args) MethodName() string {\n\treturn \"get\"\n}"));
    assert!(source.contains("func (v *KeyValue_Get_Args) EnvelopeType() wire.EnvelopeType {\n\treturn wire.Call\n}"));
    assert!(source.contains("errors.New(\"field Key of KeyValue_Get_Args is required\")"));
}

#[test]
fn test_result_is_a_union_with_success_first() {
    let (program, file) = key_value();
    let source = go_source(&program, file);
    let flat = source.split_whitespace().collect::<Vec<_>>().join(" ");

    assert!(flat.contains(
        "type KeyValue_Get_Result struct { Success *string `json:\"success,omitempty\"` NotFound *NotFound `json:\"notFound,omitempty\"` }"
    ));
    assert!(source.contains("KeyValue_Get_Result should have exactly one field: got %v fields"));
    assert!(source.contains("func (v *KeyValue_Get_Result) EnvelopeType() wire.EnvelopeType {\n\treturn wire.Reply\n}"));

    /* Void functions may reply with no field set */
    assert!(source.contains("KeyValue_Ping_Result should have at most one field: got %v fields"));
}

#[test]
fn test_oneway_functions_have_no_result() {
    let (program, file) = key_value();
    let source = go_source(&program, file);

    assert!(source.contains("type KeyValue_Fire_Args struct"));
    assert!(source.contains("func (v *KeyValue_Fire_Args) EnvelopeType() wire.EnvelopeType {\n\treturn wire.OneWay\n}"));
    assert!(!source.contains("KeyValue_Fire_Result"));
    assert!(source.contains("var KeyValue_Fire_Helper = struct {\n\tArgs func(int32) *KeyValue_Fire_Args\n}{}"));
}

#[test]
fn test_helper_wires_arguments_and_responses() {
    let (program, file) = key_value();
    let source = go_source(&program, file);

    /* `key` is a generated local, so the parameter moves aside */
    assert!(source.contains(
        "\tKeyValue_Get_Helper.Args = func(key2 string) *KeyValue_Get_Args {\n\t\treturn &KeyValue_Get_Args{Key: key2}\n\t}"
    ));
    assert!(source.contains("\t\tcase *NotFound:\n\t\t\treturn true\n"));
    assert!(source.contains("\t\t\treturn &KeyValue_Get_Result{Success: &success}, nil\n"));
    assert!(source.contains("\t\t\treturn &KeyValue_Get_Result{NotFound: e}, nil\n"));
    assert!(source.contains("\t\tif result.NotFound != nil {\n\t\t\terr = result.NotFound\n\t\t\treturn\n\t\t}"));
    assert!(source.contains("\t\t\tsuccess = *result.Success\n"));
    assert!(source.contains("\tUnwrapResponse func(*KeyValue_Get_Result) (string, error)\n"));
    assert!(source.contains("\tWrapResponse func(error) (*KeyValue_Ping_Result, error)\n"));
}

#[test]
fn test_exceptions_implement_error() {
    let (program, file) = key_value();
    let source = go_source(&program, file);

    assert!(source.contains("func (*NotFound) ErrorName() string {\n\treturn \"NotFound\"\n}"));
    assert!(source.contains("func (v *NotFound) Error() string {\n\treturn v.String()\n}"));
}

#[test]
fn test_synthesized_names_conflict_across_services() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("kv.thrift", "example.com/gen/kv", "kv");
    builder.add_service(file, "key_value", None, vec![FunctionSpec::new("get", vec![], None, vec![])]);
    builder.add_service(file, "KeyValue", None, vec![FunctionSpec::new("get", vec![], None, vec![])]);
    let program = builder.build().unwrap();

    assert_matches!(
        generate(&program, file, &Options::default()),
        Err(GenError::IdentifierConflict { ref identifier, ref entity, ref existing, .. })
            if identifier == "KeyValue_Get_Args"
                && entity == "arguments of function KeyValue.get"
                && existing == "arguments of function key_value.get"
    );
}

#[test]
fn test_upper_case_service_names_are_kept() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("kv.thrift", "example.com/gen/kv", "kv");
    builder.add_service(file, "KV", None, vec![FunctionSpec::new("get", vec![], Some(TypeSpec::I64), vec![])]);
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert!(source.contains("type KV_Get_Args struct"));
    assert!(source.contains("type KV_Get_Result struct"));
    assert!(source.contains("var KV_Get_Helper = struct {"));
    assert!(!source.contains("Kv_Get"));
}
