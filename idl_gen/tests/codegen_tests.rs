/* Go Code Generation Tests
 *
 * These tests build small programs with ProgramBuilder, generate the Go source of
 * one file and check the declarations, codecs and helpers that come out of it.
 */

use assert_matches::assert_matches;
use idl_gen::{generate, GenError, Options};
use idl_types::{
    Annotations, ConstantId, ConstantValue, FieldSpec, FileId, GraphError, Program, ProgramBuilder, StructKind,
    TypeSpec,
};

/* Helper to generate one file with default options */
fn go_source(program: &Program, file: FileId) -> String {
    generate(program, file, &Options::default()).expect("generation should succeed").contents
}

/* Helper to collapse whitespace so aligned struct fields can be matched */
fn squash(source: &str) -> String {
    source.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn annotations(pairs: &[(&str, &str)]) -> Annotations {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn shapes() -> (Program, FileId) {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("shapes.thrift", "example.com/gen/shapes", "shapes");
    builder.add_struct(
        file,
        "Point",
        StructKind::Struct,
        vec![
            FieldSpec::required(1, "x", TypeSpec::Double),
            FieldSpec::optional(2, "y", TypeSpec::Double),
        ],
    );
    (builder.build().unwrap(), file)
}

#[test]
fn test_output_is_deterministic() {
    let (program, file) = shapes();
    let first = go_source(&program, file);
    let second = go_source(&program, file);
    assert_eq!(first, second);
}

#[test]
fn test_file_header_and_package() {
    let (program, file) = shapes();
    let generated = generate(&program, file, &Options::default()).unwrap();
    assert_eq!(generated.package_name, "shapes");
    assert_eq!(generated.import_path, "example.com/gen/shapes");
    assert_eq!(generated.file_name, "shapes.go");
    assert!(generated
        .contents
        .starts_with("// Code generated by idlc from shapes.thrift. DO NOT EDIT.\n// @generated\n"));
    assert!(generated.contents.contains("\npackage shapes\n"));
    assert!(generated.contents.contains("\t\"go.uber.org/thriftrw/wire\"\n"));
}

#[test]
fn test_struct_fields_follow_requiredness() {
    let (program, file) = shapes();
    let source = go_source(&program, file);
    let flat = squash(&source);

    assert!(flat.contains("X float64 `json:\"x,required\"`"));
    assert!(flat.contains("Y *float64 `json:\"y,omitempty\"`"));
    assert!(source.contains("func (v *Point) ToWire() (wire.Value, error) {"));
    assert!(source.contains("func (v *Point) FromWire(w wire.Value) error {"));
    assert!(source.contains("func (v *Point) Equals(rhs *Point) bool {"));
    assert!(source.contains("func (v *Point) GetY() (o float64) {"));
    assert!(source.contains("func (v *Point) IsSetY() bool {"));
    /* Optional scalars compare through the shared pointer comparator */
    assert!(source.contains("func _Double_EqualsPtr(lhs, rhs *float64) bool {"));
}

#[test]
fn test_set_representations() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("bag.thrift", "example.com/gen/bag", "bag");
    let point = builder.add_struct(file, "Point", StructKind::Struct, vec![]);
    builder.add_struct(
        file,
        "Bag",
        StructKind::Struct,
        vec![
            FieldSpec::required(1, "ids", TypeSpec::set(TypeSpec::I32)),
            FieldSpec::optional(2, "points", TypeSpec::set(TypeSpec::Struct(point))),
            FieldSpec::optional(
                3,
                "tags",
                TypeSpec::set_with(TypeSpec::String, annotations(&[("go.type", "slice")])),
            ),
        ],
    );
    let program = builder.build().unwrap();
    let source = go_source(&program, file);
    let flat = squash(&source);

    assert!(flat.contains("Ids map[int32]struct{} `json:\"ids,required\"`"));
    assert!(flat.contains("Points []*Point `json:\"points,omitempty\"`"));
    assert!(flat.contains("Tags []string `json:\"tags,omitempty\"`"));

    assert!(source.contains("type _Set_I32_mapType_ValueList map[int32]struct{}"));
    assert!(source.contains("type _Set_Point_sliceType_ValueList []*Point"));
    assert!(source.contains("type _Set_String_sliceType_ValueList []string"));
    /* Keyed sets deduplicate on decode; sequences keep every element */
    assert!(source.contains("\t\to[i] = struct{}{}\n"));
    assert!(source.contains("func _Set_Point_sliceType_Read(s wire.ValueList) ([]*Point, error) {"));
    assert!(source.contains("invalid set '%T': contains nil value"));
}

/* Map fields keyed by a struct and by an enum, both holding structs */
fn atlas() -> (Program, FileId) {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("atlas.thrift", "example.com/gen/atlas", "atlas");
    let point = builder.add_struct(file, "Point", StructKind::Struct, vec![]);
    let place = builder.add_struct(file, "Place", StructKind::Struct, vec![]);
    let color = builder.add_enum(file, "Color", &[("Red", 0)]);
    builder.add_struct(
        file,
        "Atlas",
        StructKind::Struct,
        vec![
            FieldSpec::optional(1, "byPoint", TypeSpec::map(TypeSpec::Struct(point), TypeSpec::Struct(place))),
            FieldSpec::optional(2, "byColor", TypeSpec::map(TypeSpec::Enum(color), TypeSpec::Struct(place))),
        ],
    );
    (builder.build().unwrap(), file)
}

#[test]
fn test_unhashable_keys_make_pair_lists() {
    let (program, file) = atlas();
    let source = go_source(&program, file);
    let flat = squash(&source);

    assert!(flat.contains("ByPoint []struct{Key *Point; Value *Place} `json:\"byPoint,omitempty\"`"));
    assert!(flat.contains("ByColor map[Color]*Place `json:\"byColor,omitempty\"`"));

    /* Pairs are appended in wire order, duplicates included */
    assert!(source.contains(
        "func _Map_Point_Place_Read(m wire.MapItemList) ([]struct{Key *Point; Value *Place}, error) {"
    ));
    assert!(source.contains("\to := make([]struct{Key *Point; Value *Place}, 0, m.Size())\n"));
    assert!(source.contains("\t\to = append(o, struct{Key *Point; Value *Place}{Key: k, Value: v})\n"));
    assert!(source.contains("\t\to[k] = v\n"));

    /* Pair lists compare by searching rhs for each lhs key */
    assert!(source.contains("func _Map_Point_Place_Equals(lhs, rhs []struct{Key *Point; Value *Place}) bool {"));
    assert!(source.contains(
        "\t\tfor _, j := range rhs {\n\t\t\trk := j.Key\n\t\t\trv := j.Value\n\t\t\tif !lk.Equals(rk) {\n\t\t\t\tcontinue\n\t\t\t}\n\t\t\tif !lv.Equals(rv) {\n\t\t\t\treturn false\n\t\t\t}\n"
    ));
    assert!(source.contains("\t\trv, ok := rhs[lk]\n"));
}

#[test]
fn test_map_encoders_reject_nil_structs() {
    let (program, file) = atlas();
    let source = go_source(&program, file);

    assert!(source.contains(
        "\tfor _, i := range m {\n\t\tk := i.Key\n\t\tv := i.Value\n\
         \t\tif k == nil {\n\t\t\treturn fmt.Errorf(\"invalid map '%T': contains nil key\", m)\n\t\t}\n\
         \t\tif v == nil {\n\t\t\treturn fmt.Errorf(\"invalid map '%T': contains nil value\", m)\n\t\t}\n\
         \t\tkw, err := k.ToWire()\n"
    ));
    /* Enum keys are plain values; only the struct value is checked */
    assert!(source.contains(
        "\tfor k, v := range m {\n\
         \t\tif v == nil {\n\t\t\treturn fmt.Errorf(\"invalid map '%T': contains nil value\", m)\n\t\t}\n\
         \t\tkw, err := k.ToWire()\n"
    ));
    assert_eq!(source.matches("contains nil key").count(), 1);
}

#[test]
fn test_slice_sets_compare_by_membership_search() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("tags.thrift", "example.com/gen/tags", "tags");
    builder.add_struct(
        file,
        "Labels",
        StructKind::Struct,
        vec![FieldSpec::required(
            1,
            "tags",
            TypeSpec::set_with(TypeSpec::String, annotations(&[("go.type", "slice")])),
        )],
    );
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert!(source.contains("func _Set_String_sliceType_Equals(lhs, rhs []string) bool {"));
    assert!(source.contains(
        "\tfor _, x := range lhs {\n\t\tok := false\n\t\tfor _, y := range rhs {\n\
         \t\t\tif (x == y) {\n\t\t\t\tok = true\n\t\t\t\tbreak\n\t\t\t}\n\t\t}\n\
         \t\tif !ok {\n\t\t\treturn false\n\t\t}\n\t}"
    ));
    /* No dedup on decode */
    assert!(source.contains("\t\to = append(o, i)\n"));
}

#[test]
fn test_container_readers_check_element_wire_types() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("nums.thrift", "example.com/gen/nums", "nums");
    builder.add_struct(
        file,
        "Numbers",
        StructKind::Struct,
        vec![
            FieldSpec::required(1, "values", TypeSpec::list(TypeSpec::I32)),
            FieldSpec::optional(2, "weights", TypeSpec::map(TypeSpec::String, TypeSpec::Double)),
        ],
    );
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert!(source.contains(
        "\tif l.Size() > 0 && l.ValueType() != wire.TI32 {\n\
         \t\treturn nil, fmt.Errorf(\"unexpected wire type %v for list element, expected %v\", l.ValueType(), wire.TI32)\n\t}\n"
    ));
    assert!(source.contains(
        "return nil, fmt.Errorf(\"unexpected wire type %v for map key element, expected %v\", m.KeyType(), wire.TBinary)"
    ));
    assert!(source.contains(
        "return nil, fmt.Errorf(\"unexpected wire type %v for map value element, expected %v\", m.ValueType(), wire.TDouble)"
    ));
}

#[test]
fn test_shared_helpers_are_emitted_once() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("lists.thrift", "example.com/gen/lists", "lists");
    builder.add_struct(
        file,
        "First",
        StructKind::Struct,
        vec![FieldSpec::required(1, "values", TypeSpec::list(TypeSpec::I32))],
    );
    builder.add_struct(
        file,
        "Second",
        StructKind::Struct,
        vec![
            FieldSpec::optional(1, "a", TypeSpec::list(TypeSpec::I32)),
            FieldSpec::optional(2, "b", TypeSpec::list(TypeSpec::I32)),
        ],
    );
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert_eq!(source.matches("type _List_I32_ValueList []int32").count(), 1);
    assert_eq!(source.matches("func _List_I32_Read(").count(), 1);
    assert_eq!(source.matches("func _List_I32_Equals(").count(), 1);
    assert_eq!(source.matches("type _List_I32_Zapper []int32").count(), 1);
    /* Helpers come after every declaration */
    let last_struct = source.find("func (v *Second) IsSetB() bool").unwrap();
    assert!(source.find("type _List_I32_ValueList").unwrap() > last_struct);
}

#[test]
fn test_union_cardinality_messages() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("shape.thrift", "example.com/gen/shape", "shape");
    builder.add_struct(
        file,
        "Shape",
        StructKind::Union,
        vec![
            FieldSpec::optional(1, "circle", TypeSpec::Double),
            FieldSpec::optional(2, "square", TypeSpec::Double),
        ],
    );
    let maybe = builder.add_struct(
        file,
        "Maybe",
        StructKind::Union,
        vec![FieldSpec::optional(1, "value", TypeSpec::String)],
    );
    builder.allow_empty(maybe);
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert!(source.contains("Shape should have exactly one field: got %v fields"));
    assert!(source.contains("Maybe should have at most one field: got %v fields"));
    assert!(source.contains("\tif i != 1 {\n"));
    assert!(source.contains("\tif count > 1 {\n"));
    /* Union members are always optional */
    assert!(squash(&source).contains("Circle *float64 `json:\"circle,omitempty\"`"));
}

#[test]
fn test_required_fields_are_checked_both_ways() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("user.thrift", "example.com/gen/user", "user");
    let point = builder.add_struct(file, "Point", StructKind::Struct, vec![]);
    builder.add_struct(
        file,
        "User",
        StructKind::Struct,
        vec![
            FieldSpec::required(1, "user_name", TypeSpec::String),
            FieldSpec::required(2, "home", TypeSpec::Struct(point)),
        ],
    );
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert!(source.contains("\tuserNameIsSet := false\n"));
    assert!(source.contains("\thomeIsSet := false\n"));
    assert!(source.contains("errors.New(\"field UserName of User is required\")"));
    assert!(source.contains("\tif v.Home == nil {\n\t\treturn w, errors.New(\"field Home of User is required\")\n\t}"));
    assert!(source.contains("\t\"errors\"\n"));
}

#[test]
fn test_defaults_are_materialized_on_encode_and_decode() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("config.thrift", "example.com/gen/config", "config");
    builder.add_struct(
        file,
        "Config",
        StructKind::Struct,
        vec![
            FieldSpec::optional(1, "retries", TypeSpec::I32).with_default(ConstantValue::Int(3)),
            FieldSpec::optional(2, "name", TypeSpec::String).with_default(ConstantValue::string("main")),
        ],
    );
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    let retries = "\tif v.Retries == nil {\n\t\tv.Retries = _I32_ptr(3)\n\t}\n";
    assert_eq!(source.matches(retries).count(), 2);
    assert_eq!(source.matches("\t\tv.Name = _String_ptr(\"main\")\n").count(), 2);
    assert_eq!(source.matches("func _I32_ptr(v int32) *int32 {").count(), 1);
    assert!(source.contains("\to = 3\n\treturn\n"));
}

#[test]
fn test_field_collision_names_both_fields() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("event.thrift", "example.com/gen/event", "event");
    builder.add_struct(
        file,
        "Event",
        StructKind::Struct,
        vec![
            FieldSpec::optional(1, "user_id", TypeSpec::String),
            FieldSpec::optional(2, "userId", TypeSpec::String),
        ],
    );
    let program = builder.build().unwrap();
    let err = generate(&program, file, &Options::default()).unwrap_err();

    assert_matches!(
        err,
        GenError::IdentifierConflict { ref identifier, ref entity, ref existing, ref file }
            if identifier == "UserID"
                && entity == "field userId of Event"
                && existing == "field user_id of Event"
                && file == "event.thrift"
    );
}

#[test]
fn test_name_override_resolves_collision() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("event.thrift", "example.com/gen/event", "event");
    builder.add_struct(
        file,
        "Event",
        StructKind::Struct,
        vec![
            FieldSpec::optional(1, "user_id", TypeSpec::String),
            FieldSpec::optional(2, "userId", TypeSpec::String).with_annotation("go.name", "LegacyUserID"),
        ],
    );
    let program = builder.build().unwrap();
    let flat = squash(&go_source(&program, file));

    assert!(flat.contains("UserID *string `json:\"user_id,omitempty\"`"));
    assert!(flat.contains("LegacyUserID *string `json:\"userId,omitempty\"`"));
}

#[test]
fn test_invalid_name_override_is_rejected() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("bad.thrift", "example.com/gen/bad", "bad");
    let id = builder.add_struct(file, "Thing", StructKind::Struct, vec![]);
    builder.struct_annotation(id, "go.name", "thing");
    let program = builder.build().unwrap();

    assert_matches!(
        generate(&program, file, &Options::default()),
        Err(GenError::InvalidIdentifier { ref identifier, ref entity, .. })
            if identifier == "thing" && entity == "struct Thing"
    );
}

#[test]
fn test_invalid_set_override_is_rejected() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("bag.thrift", "example.com/gen/bag", "bag");
    builder.add_struct(
        file,
        "Bag",
        StructKind::Struct,
        vec![FieldSpec::optional(
            1,
            "tags",
            TypeSpec::set_with(TypeSpec::String, annotations(&[("go.type", "vector")])),
        )],
    );
    let program = builder.build().unwrap();

    assert_matches!(
        generate(&program, file, &Options::default()),
        Err(GenError::InvalidAnnotation { ref key, ref value, ref entity, .. })
            if key == "go.type" && value == "vector" && entity == "field tags of Bag"
    );
}

#[test]
fn test_struct_tags_merge_with_json() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("tag.thrift", "example.com/gen/tag", "tag");
    builder.add_struct(
        file,
        "Row",
        StructKind::Struct,
        vec![FieldSpec::required(1, "name", TypeSpec::String).with_annotation("go.tag", r#"json:"n" db:"name""#)],
    );
    let program = builder.build().unwrap();

    assert!(squash(&go_source(&program, file)).contains("Name string `json:\"n\" db:\"name\"`"));
}

#[test]
fn test_enum_with_duplicate_values() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("prio.thrift", "example.com/gen/prio", "prio");
    let prio = builder.add_enum(file, "Priority", &[("Low", 1), ("Medium", 2), ("Normal", 2)]);
    builder.enum_item_annotation(prio, 0, "go.label", "low");
    let program = builder.build().unwrap();
    let source = go_source(&program, file);
    let flat = squash(&source);

    assert!(flat.contains("PriorityLow Priority = 1"));
    assert!(flat.contains("PriorityMedium Priority = 2"));
    assert!(flat.contains("PriorityNormal Priority = 2"));
    assert!(source.contains("return []Priority{PriorityLow, PriorityMedium, PriorityNormal}"));

    /* Reverse lookups only know the first item declared for a value */
    assert!(source.contains("\tcase 2:\n\t\treturn []byte(\"Medium\"), nil\n"));
    assert!(!source.contains("return []byte(\"Normal\")"));
    assert!(source.contains("\tcase 1:\n\t\treturn \"low\"\n"));
    /* Every label still parses */
    assert!(source.contains("\tcase \"Normal\":\n\t\t*v = PriorityNormal\n"));
    assert!(source.contains("\tcase \"low\":\n\t\t*v = PriorityLow\n"));
    assert!(source.contains("Priority(%d)"));
}

#[test]
fn test_enum_reverse_lookups_use_first_declared_item() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("letters.thrift", "example.com/gen/letters", "letters");
    builder.add_enum(file, "Letter", &[("P", 0), ("Q", -1), ("R", 0)]);
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert!(squash(&source).contains("LetterR Letter = 0"));
    assert!(source.contains("\tcase 0:\n\t\treturn \"P\"\n"));
    assert!(source.contains("\tcase -1:\n\t\treturn \"Q\"\n"));
    assert!(!source.contains("return \"R\""));
    assert!(source.contains("\tcase 0:\n\t\treturn []byte(\"P\"), nil\n"));
    assert!(!source.contains("return []byte(\"R\")"));
    assert!(source.contains("\tcase 0:\n\t\treturn ([]byte)(\"\\\"P\\\"\"), nil\n"));
    assert!(!source.contains("([]byte)(\"\\\"R\\\"\")"));
    /* R still parses, and unknown values render numerically */
    assert!(source.contains("\tcase \"R\":\n\t\t*v = LetterR\n"));
    assert!(source.contains("\treturn fmt.Sprintf(\"Letter(%d)\", w)\n"));
    assert!(source.contains("func (v Letter) Equals(rhs Letter) bool {\n\treturn v == rhs\n}"));
}

#[test]
fn test_enum_labels_are_deduplicated_in_text_decoding() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("mode.thrift", "example.com/gen/mode", "mode");
    let mode = builder.add_enum(file, "Mode", &[("On", 1), ("Enabled", 2)]);
    builder.enum_item_annotation(mode, 1, "go.label", "On");
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert_eq!(source.matches("\tcase \"On\":\n").count(), 1);
    assert!(source.contains("\tcase \"On\":\n\t\t*v = ModeOn\n"));
}

#[test]
fn test_typedefs_delegate_to_their_target() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("td.thrift", "example.com/gen/td", "td");
    let point = builder.add_struct(file, "Point", StructKind::Struct, vec![]);
    builder.add_typedef(file, "Email", TypeSpec::String);
    builder.add_typedef(file, "Origin", TypeSpec::Struct(point));
    builder.add_typedef(file, "Tags", TypeSpec::list(TypeSpec::String));
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert!(source.contains("type Email string\n"));
    assert!(source.contains("// Ptr returns a pointer to this Email\nfunc (v Email) Ptr() *Email {"));
    assert!(source.contains("\tx := (string)(v)\n\treturn wire.NewValueString(x), error(nil)\n"));
    assert!(source.contains("\tx, err := w.GetString(), error(nil)\n\t*v = (Email)(x)\n\treturn err\n"));

    assert!(source.contains("type Origin Point\n"));
    assert!(source.contains("func (v *Origin) ToWire() (wire.Value, error) {"));
    assert!(source.contains("\treturn (*Point)(v).FromWire(w)\n"));
    assert!(source.contains("\treturn (*Point)(v).MarshalLogObject(enc)\n"));
    assert!(!source.contains("func (v Origin) Ptr()"));

    assert!(source.contains("type Tags []string\n"));
    assert!(source.contains("\treturn (_List_String_Zapper)(v).MarshalLogArray(enc)\n"));
}

#[test]
fn test_constants() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("consts.thrift", "example.com/gen/consts", "consts");
    let color = builder.add_enum(file, "Color", &[("Red", 0), ("Blue", 1)]);
    builder.add_constant(file, "max_retries", TypeSpec::I32, ConstantValue::Int(10));
    builder.add_constant(
        file,
        "names",
        TypeSpec::list(TypeSpec::String),
        ConstantValue::List(vec![ConstantValue::string("a"), ConstantValue::string("b")]),
    );
    builder.add_constant(file, "limit", TypeSpec::Double, ConstantValue::Double(f64::INFINITY));
    builder.add_constant(
        file,
        "favorite",
        TypeSpec::Enum(color),
        ConstantValue::EnumItem { enum_id: color, item: 1 },
    );
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert!(source.contains("const MaxRetries int32 = 10\n"));
    assert!(source.contains("var Names []string = []string{\"a\", \"b\"}\n"));
    assert!(source.contains("var Limit float64 = math.Inf(1)\n"));
    assert!(source.contains("const Favorite Color = ColorBlue\n"));
    assert!(source.contains("\t\"math\"\n"));
}

#[test]
fn test_out_of_range_constant_is_rejected() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("consts.thrift", "example.com/gen/consts", "consts");
    builder.add_constant(file, "tiny", TypeSpec::I8, ConstantValue::Int(300));
    let program = builder.build().unwrap();

    assert_matches!(
        generate(&program, file, &Options::default()),
        Err(GenError::InvalidConstant { ref entity, .. }) if entity == "constant tiny"
    );
}

#[test]
fn test_constant_reference_loop_is_rejected() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("consts.thrift", "example.com/gen/consts", "consts");
    let first = builder.add_constant(file, "first", TypeSpec::I32, ConstantValue::Int(1));
    builder.add_constant(file, "second", TypeSpec::I32, ConstantValue::Constant(first));
    let mut program = builder.build().unwrap();
    program.constants[0].value = ConstantValue::Constant(ConstantId(1));

    assert_matches!(
        generate(&program, file, &Options::default()),
        Err(GenError::InvalidGraph(GraphError::ConstantCycle { ref name, .. })) if name == "first"
    );
}

#[test]
fn test_unknown_file_is_rejected() {
    let (program, _) = shapes();

    assert_matches!(
        generate(&program, FileId(7), &Options::default()),
        Err(GenError::InvalidGraph(GraphError::DanglingReference { kind: "file", index: 7, len: 1, .. }))
    );
}

#[test]
fn test_struct_constant_wraps_optional_scalars() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("shapes.thrift", "example.com/gen/shapes", "shapes");
    let point = builder.add_struct(
        file,
        "Point",
        StructKind::Struct,
        vec![
            FieldSpec::required(1, "x", TypeSpec::Double),
            FieldSpec::optional(2, "y", TypeSpec::Double),
        ],
    );
    builder.add_constant(
        file,
        "origin",
        TypeSpec::Struct(point),
        ConstantValue::fields([("x", ConstantValue::Double(0.0)), ("y", ConstantValue::Double(1.5))]),
    );
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert!(source.contains("var Origin *Point = &Point{X: 0.0, Y: _Double_ptr(1.5)}\n"));
}

#[test]
fn test_logging_can_be_disabled() {
    let (program, file) = shapes();
    let options = Options { no_zap: true, ..Options::default() };
    let source = generate(&program, file, &options).unwrap().contents;

    assert!(!source.contains("zapcore"));
    assert!(!source.contains("MarshalLogObject"));
    assert!(!source.contains("multierr"));
}

#[test]
fn test_logging_respects_nolog_and_container_shapes() {
    let mut builder = ProgramBuilder::new();
    let file = builder.file("log.thrift", "example.com/gen/log", "log");
    builder.add_struct(
        file,
        "Login",
        StructKind::Struct,
        vec![
            FieldSpec::required(1, "user", TypeSpec::String),
            FieldSpec::optional(2, "secret", TypeSpec::String).with_annotation("go.nolog", ""),
            FieldSpec::optional(3, "tags", TypeSpec::list(TypeSpec::String)),
            FieldSpec::optional(4, "attrs", TypeSpec::map(TypeSpec::String, TypeSpec::I32)),
        ],
    );
    let program = builder.build().unwrap();
    let source = go_source(&program, file);

    assert!(source.contains("\tenc.AddString(\"user\", v.User)\n"));
    assert!(!source.contains("enc.AddString(\"secret\""));
    assert!(source.contains("err = multierr.Append(err, enc.AddArray(\"tags\", (_List_String_Zapper)(v.Tags)))"));
    assert!(source.contains("err = multierr.Append(err, enc.AddObject(\"attrs\", (_Map_String_I32_Zapper)(v.Attrs)))"));
    assert!(source.contains("func (m _Map_String_I32_Zapper) MarshalLogObject(enc zapcore.ObjectEncoder) (err error) {"));
}

#[test]
fn test_cross_file_references_are_imported_and_mangled_apart() {
    let mut builder = ProgramBuilder::new();
    let base = builder.file("base.thrift", "example.com/gen/base", "base");
    let shapes = builder.file("shapes.thrift", "example.com/gen/shapes", "shapes");
    let remote = builder.add_struct(base, "Point", StructKind::Struct, vec![]);
    let local = builder.add_struct(shapes, "Point", StructKind::Struct, vec![]);
    builder.add_struct(
        shapes,
        "Circle",
        StructKind::Struct,
        vec![
            FieldSpec::required(1, "center", TypeSpec::Struct(remote)),
            FieldSpec::required(2, "corner", TypeSpec::Struct(local)),
        ],
    );
    let program = builder.build().unwrap();
    let source = go_source(&program, shapes);
    let flat = squash(&source);

    assert!(source.contains("\t\"example.com/gen/base\"\n"));
    assert!(flat.contains("Center *base.Point `json:\"center,required\"`"));
    assert!(flat.contains("Corner *Point `json:\"corner,required\"`"));
    assert!(source.contains("func _Point_Read(w wire.Value) (*base.Point, error) {"));
    assert!(source.contains("func _Point_1_Read(w wire.Value) (*Point, error) {"));

    /* The base package never needs the shapes package */
    let base_source = go_source(&program, base);
    assert!(!base_source.contains("example.com/gen/shapes"));
}
