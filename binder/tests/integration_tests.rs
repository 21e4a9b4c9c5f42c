use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use argbind::{
    ArgumentPipeline, Binder, BinderConfig, BindingError, EnumSeedPolicy, InstantiationError,
};
use argbind_core::{
    CmdLineArg, ConversionError, DateFormat, DeclaredType, Equation, Factory, FactoryFault,
    ListRef, MemberDecl, Object, ObjectRef, ParsedArgument, TypeCatalog, TypeDecl, TypeRegistry, Value,
    ValueKind, validate_registry,
};
use chrono::NaiveDate;
use regex::Regex;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn int_array(boxed: bool) -> DeclaredType {
    DeclaredType::Array {
        element: ValueKind::Int,
        boxed,
    }
}

fn scalar(kind: ValueKind) -> DeclaredType {
    DeclaredType::Value(kind)
}

fn port(number: i32) -> Value {
    Value::Object(ObjectRef::new(Object::new("Port").with_field("number", number)))
}

fn shape(type_name: &str, label: &str) -> Value {
    Value::Object(ObjectRef::new(Object::new(type_name).with_field("label", label)))
}

/// Registry for every scenario, plus a counter of `Widget` constructions.
fn registry() -> (TypeRegistry, Rc<Cell<usize>>) {
    let constructed = Rc::new(Cell::new(0));
    let mut registry = TypeRegistry::new();

    registry.declare(TypeDecl::enumeration("Color", &["RED", "GREEN", "BLUE"]));
    registry.declare(TypeDecl::enumeration("Kind", &["CIRCLE", "SQUARE"]));

    let counter = Rc::clone(&constructed);
    registry
        .declare(
            TypeDecl::class("Widget")
                .with_member(MemberDecl::new("size", scalar(ValueKind::Int))),
        )
        .set_constructor(move |registry| {
            counter.set(counter.get() + 1);
            registry
                .default_instance("Widget")
                .map(Value::Object)
                .map_err(|e| FactoryFault::new(e.to_string()))
        });
    registry.declare(TypeDecl::class("Gadget"));

    let port_type = registry.declare(
        TypeDecl::class("Port").with_member(MemberDecl::new("number", scalar(ValueKind::Int))),
    );
    port_type.add_factory(Factory::new("of", &["int"], |args| match args.first() {
        Some(Value::Int(n)) if *n > 0 => Ok(port(*n)),
        _ => Err(FactoryFault::new("port must be positive")),
    }));
    port_type.add_factory(Factory::new("secret", &["int"], |_| Ok(port(1))).private());
    registry
        .declare(TypeDecl::abstract_class("Ports"))
        .add_factory(Factory::new("http", &["String"], |_| Ok(port(80))));

    let shape_type = registry.declare(
        TypeDecl::abstract_class("Shape")
            .with_member(MemberDecl::new("label", scalar(ValueKind::Str))),
    );
    shape_type.add_factory(Factory::new("create", &["String"], |args| {
        match args.first().and_then(Value::as_str) {
            Some("CIRCLE") => Ok(shape("Circle", "seeded")),
            Some("SQUARE") => Ok(shape("Square", "seeded")),
            Some(other) => Err(FactoryFault::new(format!("unknown shape {other}"))),
            None => Err(FactoryFault::new("missing seed")),
        }
    }));
    shape_type.add_factory(Factory::new("create", &[], |_| Ok(shape("Square", "blank"))));
    registry.declare(TypeDecl::class("Circle").extends("Shape"));
    registry.declare(TypeDecl::class("Square").extends("Shape"));

    registry.declare(
        TypeDecl::class("Base").with_member(MemberDecl::new("verbose", scalar(ValueKind::Bool))),
    );
    registry.declare(TypeDecl::class("Middle").extends("Base"));
    registry.declare(
        TypeDecl::class("Options")
            .extends("Middle")
            .with_member(MemberDecl::new("counts", int_array(false)))
            .with_member(MemberDecl::new("maybe_counts", int_array(true)))
            .with_member(MemberDecl::new(
                "names",
                DeclaredType::Array {
                    element: ValueKind::Str,
                    boxed: false,
                },
            ))
            .with_member(MemberDecl::new(
                "paths",
                DeclaredType::Array {
                    element: ValueKind::Path,
                    boxed: false,
                },
            ))
            .with_member(MemberDecl::new(
                "dates",
                DeclaredType::Array {
                    element: ValueKind::LocalDate,
                    boxed: false,
                },
            ))
            .with_member(MemberDecl::new("pattern", scalar(ValueKind::Regex)))
            .with_member(MemberDecl::new("formula", scalar(ValueKind::Equation)))
            .with_member(MemberDecl::new("stamp", scalar(ValueKind::DateFormat)))
            .with_member(MemberDecl::new("name", scalar(ValueKind::Str)))
            .with_member(MemberDecl::new("limit", scalar(ValueKind::Long)))
            .with_member(MemberDecl::new("tag", DeclaredType::Enum("Color".into())))
            .with_member(MemberDecl::new("tags", DeclaredType::EnumArray("Color".into())))
            .with_member(MemberDecl::new("items", DeclaredType::List))
            .with_member(MemberDecl::new("widget", DeclaredType::Object("Widget".into())))
            .with_member(MemberDecl::new("widgets", DeclaredType::ObjectArray("Widget".into())))
            .with_member(MemberDecl::new("widget_list", DeclaredType::List))
            .with_member(MemberDecl::new("port", DeclaredType::Object("Port".into())))
            .with_member(MemberDecl::new("ports", DeclaredType::ObjectArray("Port".into())))
            .with_member(MemberDecl::new("port_list", DeclaredType::List))
            .with_member(MemberDecl::new("shape", DeclaredType::Object("Shape".into()))),
    );

    (registry, constructed)
}

fn binder() -> (Binder, Rc<Cell<usize>>) {
    let (registry, constructed) = registry();
    (Binder::new(Rc::new(registry)), constructed)
}

fn options(binder: &Binder) -> ObjectRef {
    binder.registry().default_instance("Options").unwrap()
}

// ---------------------------------------------------------------------------
// Standard assignment
// ---------------------------------------------------------------------------

#[test]
fn test_int_array_grows_across_occurrences() {
    let (binder, _) = binder();
    let options = options(&binder);

    for n in [3, 7, 2] {
        binder
            .bind(&CmdLineArg::new("counts").multiple().with_value(n), &options)
            .unwrap();
    }

    assert_eq!(
        options.get("counts"),
        Some(Value::Array(vec![Value::Int(3), Value::Int(7), Value::Int(2)]))
    );
}

#[test]
fn test_single_occurrence_array_is_replaced() {
    let (binder, _) = binder();
    let options = options(&binder);

    binder
        .bind(&CmdLineArg::new("counts").with_values([1, 2]), &options)
        .unwrap();
    binder
        .bind(&CmdLineArg::new("counts").with_values([9]), &options)
        .unwrap();

    assert_eq!(options.get("counts"), Some(Value::Array(vec![Value::Int(9)])));
}

#[test]
fn test_boxed_array_keeps_nulls_and_primitive_array_rejects_them() {
    let (binder, _) = binder();
    let options = options(&binder);
    let values = [Value::Int(1), Value::Null, Value::Int(3)];

    binder
        .bind(&CmdLineArg::new("maybe_counts").with_values(values.clone()), &options)
        .unwrap();
    assert_eq!(
        options.get("maybe_counts"),
        Some(Value::Array(values.to_vec()))
    );

    let err = binder
        .bind(&CmdLineArg::new("counts").with_values(values), &options)
        .unwrap_err();
    assert!(matches!(
        err,
        BindingError::Conversion {
            source: ConversionError::NullNotAllowed(_),
            ..
        }
    ));
    assert_eq!(options.get("counts"), Some(Value::Null));
}

#[test]
fn test_reference_arrays_keep_input_order() {
    let (binder, _) = binder();
    let options = options(&binder);

    binder
        .bind(&CmdLineArg::new("names").with_values(["b", "a", "c"]), &options)
        .unwrap();
    binder
        .bind(
            &CmdLineArg::new("paths").with_values([PathBuf::from("/tmp"), PathBuf::from("src")]),
            &options,
        )
        .unwrap();
    let first = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let second = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    binder
        .bind(&CmdLineArg::new("dates").with_values([first, second]), &options)
        .unwrap();

    assert_eq!(
        options.get("names"),
        Some(Value::Array(vec!["b".into(), "a".into(), "c".into()]))
    );
    assert_eq!(
        options.get("paths"),
        Some(Value::Array(vec![
            Value::Path(PathBuf::from("/tmp")),
            Value::Path(PathBuf::from("src"))
        ]))
    );
    assert_eq!(
        options.get("dates"),
        Some(Value::Array(vec![Value::LocalDate(first), Value::LocalDate(second)]))
    );
}

#[test]
fn test_domain_scalars() {
    let (binder, _) = binder();
    let options = options(&binder);
    let pattern = Regex::new("^v[0-9]+$").unwrap();
    let formula = Equation::parse("x * 2 + 1").unwrap();
    let stamp = DateFormat::new("%Y-%m-%d").unwrap();

    binder
        .bind(&CmdLineArg::new("pattern").with_value(pattern.clone()), &options)
        .unwrap();
    binder
        .bind(&CmdLineArg::new("formula").with_value(formula.clone()), &options)
        .unwrap();
    binder
        .bind(&CmdLineArg::new("stamp").with_value(stamp.clone()), &options)
        .unwrap();

    assert_eq!(options.get("pattern"), Some(Value::Regex(pattern)));
    assert_eq!(options.get("formula"), Some(Value::Equation(formula)));
    assert_eq!(options.get("stamp"), Some(Value::DateFormat(stamp)));

    let err = binder
        .bind(&CmdLineArg::new("pattern").with_value("^v"), &options)
        .unwrap_err();
    assert!(matches!(err, BindingError::Conversion { .. }));
}

#[test]
fn test_scalar_widening_follows_config() {
    let (registry, _) = registry();
    let registry = Rc::new(registry);
    let widening = Binder::new(Rc::clone(&registry));
    let strict = Binder::with_config(
        Rc::clone(&registry),
        BinderConfig {
            numeric_widening: false,
            ..BinderConfig::default()
        },
    );
    let options = registry.default_instance("Options").unwrap();
    let arg = CmdLineArg::new("limit").with_value(5);

    widening.bind(&arg, &options).unwrap();
    assert_eq!(options.get("limit"), Some(Value::Long(5)));

    let err = strict.bind(&arg, &options).unwrap_err();
    assert_eq!(err.context().expected, "long");
}

#[test]
fn test_delegate_is_assigned_in_place_of_value() {
    let (binder, _) = binder();
    let options = options(&binder);

    binder
        .bind(
            &CmdLineArg::new("name").with_value(42).with_delegate(0, "forty-two"),
            &options,
        )
        .unwrap();

    assert_eq!(options.get("name"), Some(Value::from("forty-two")));
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[test]
fn test_enum_constant_lookup() {
    let (binder, _) = binder();
    let options = options(&binder);

    binder
        .bind(&CmdLineArg::new("tag").with_value("RED"), &options)
        .unwrap();
    let tag = options.get("tag").unwrap();
    assert_eq!(tag.as_enum().map(|c| c.name.as_str()), Some("RED"));

    let err = binder
        .bind(&CmdLineArg::new("tag").with_value("PURPLE"), &options)
        .unwrap_err();
    match err {
        BindingError::Conversion {
            source: ConversionError::UnknownConstant { candidates, .. },
            context,
        } => {
            assert_eq!(candidates, vec!["RED", "GREEN", "BLUE"]);
            assert_eq!(context.to_string(), "expected: Color tag on Options");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(options.get("tag"), Some(tag));
}

#[test]
fn test_enum_array_resolves_each_value() {
    let (binder, _) = binder();
    let options = options(&binder);

    binder
        .bind(
            &CmdLineArg::new("tags").multiple().with_values(["blue", "RED"]),
            &options,
        )
        .unwrap();

    let names: Vec<String> = options
        .get("tags")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_enum().map(|c| c.name.clone()))
        .collect();
    assert_eq!(names, vec!["BLUE", "RED"]);
}

// ---------------------------------------------------------------------------
// List accumulation
// ---------------------------------------------------------------------------

#[test]
fn test_list_created_lazily_and_kept() {
    let (binder, _) = binder();
    let options = options(&binder);
    assert_eq!(options.get("items"), Some(Value::Null));

    binder
        .bind(&CmdLineArg::new("items").multiple().with_value("a"), &options)
        .unwrap();
    let list = options.get("items").unwrap().as_list().cloned().unwrap();

    binder
        .bind(&CmdLineArg::new("items").multiple().with_value(2), &options)
        .unwrap();
    binder
        .bind(&CmdLineArg::new("items").multiple().with_value("c"), &options)
        .unwrap();

    let after = options.get("items").unwrap().as_list().cloned().unwrap();
    assert!(after.ptr_eq(&list));
    assert_eq!(after.to_vec(), vec![Value::from("a"), Value::Int(2), Value::from("c")]);
}

// ---------------------------------------------------------------------------
// Member resolution
// ---------------------------------------------------------------------------

#[test]
fn test_member_declared_on_grandparent() {
    let (binder, _) = binder();
    let options = options(&binder);

    binder
        .bind(&CmdLineArg::new("verbose").with_value(true), &options)
        .unwrap();

    assert_eq!(options.get("verbose"), Some(Value::Bool(true)));
}

#[test]
fn test_member_declared_nowhere() {
    let (binder, _) = binder();
    let options = options(&binder);

    let err = binder
        .bind(&CmdLineArg::new("quiet").with_value(true), &options)
        .unwrap_err();

    assert!(matches!(err, BindingError::MemberNotFound { .. }));
    assert_eq!(err.context().member, "quiet");
    assert_eq!(err.context().target, "Options");
}

// ---------------------------------------------------------------------------
// Factory assignment
// ---------------------------------------------------------------------------

#[test]
fn test_factory_single_value() {
    let (binder, _) = binder();
    let options = options(&binder);

    binder
        .bind(&CmdLineArg::new("port").with_value(8080).with_factory("of"), &options)
        .unwrap();

    let port = options.get("port").unwrap();
    assert_eq!(port.type_name(), "Port");
    assert_eq!(port.as_object().unwrap().get("number"), Some(Value::Int(8080)));
}

#[test]
fn test_factory_qualified_reference() {
    let (binder, _) = binder();
    let options = options(&binder);

    binder
        .bind(
            &CmdLineArg::new("port").with_value("web").with_factory("Ports.http"),
            &options,
        )
        .unwrap();

    let port = options.get("port").unwrap();
    assert_eq!(port.as_object().unwrap().get("number"), Some(Value::Int(80)));
}

#[test]
fn test_factory_grows_array_per_occurrence() {
    let (binder, _) = binder();
    let options = options(&binder);

    binder
        .bind(
            &CmdLineArg::new("ports").multiple().with_values([80, 443]).with_factory("of"),
            &options,
        )
        .unwrap();
    binder
        .bind(
            &CmdLineArg::new("ports").multiple().with_value(8443).with_factory("of"),
            &options,
        )
        .unwrap();

    let numbers: Vec<Value> = options
        .get("ports")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p.as_object().and_then(|o| o.get("number")))
        .collect();
    assert_eq!(numbers, vec![Value::Int(80), Value::Int(443), Value::Int(8443)]);
}

#[test]
fn test_factory_appends_to_list() {
    let (binder, _) = binder();
    let options = options(&binder);

    binder
        .bind(
            &CmdLineArg::new("port_list").multiple().with_values([22, 25]).with_factory("Port.of"),
            &options,
        )
        .unwrap();

    let list = options.get("port_list").unwrap().as_list().cloned().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list.get(1).unwrap().type_name(), "Port");
}

#[test]
fn test_factory_signature_mismatch() {
    let (binder, _) = binder();
    let options = options(&binder);

    let err = binder
        .bind(&CmdLineArg::new("port").with_value("80").with_factory("of"), &options)
        .unwrap_err();

    match err {
        BindingError::FactoryNotFound { signature, .. } => {
            assert_eq!(signature, "Port Port.of(String)");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_private_factory_is_rejected() {
    let (binder, _) = binder();
    let options = options(&binder);

    let err = binder
        .bind(&CmdLineArg::new("port").with_value(1).with_factory("secret"), &options)
        .unwrap_err();

    assert!(matches!(err, BindingError::FactoryInaccessible { .. }));
    assert_eq!(options.get("port"), Some(Value::Null));
}

#[test]
fn test_factory_unknown_owner() {
    let (binder, _) = binder();
    let options = options(&binder);

    let err = binder
        .bind(&CmdLineArg::new("port").with_value(1).with_factory("net.Sockets.of"), &options)
        .unwrap_err();

    assert!(matches!(err, BindingError::TypeNotFound { ref type_name, .. } if type_name == "net.Sockets"));
}

#[test]
fn test_multiple_factory_into_scalar_member() {
    let (binder, _) = binder();
    let options = options(&binder);

    let err = binder
        .bind(
            &CmdLineArg::new("port").multiple().with_values([1, 2]).with_factory("of"),
            &options,
        )
        .unwrap_err();

    assert!(matches!(err, BindingError::Incompatible { .. }));
}

// ---------------------------------------------------------------------------
// Group instantiation
// ---------------------------------------------------------------------------

#[test]
fn test_group_constructs_new_instance() {
    let (binder, constructed) = binder();
    let options = options(&binder);

    let widget = binder
        .instantiate_group(&CmdLineArg::group("widget").reusable(false), &options, None)
        .unwrap()
        .unwrap();

    assert_eq!(widget.type_name(), "Widget");
    assert_eq!(options.get("widget"), Some(widget));
    assert_eq!(constructed.get(), 1);
}

#[test]
fn test_group_reuse_returns_same_instance() {
    let (binder, constructed) = binder();
    let options = options(&binder);
    let group = CmdLineArg::group("widget");

    let first = binder.instantiate_group(&group, &options, None).unwrap().unwrap();
    let second = binder.instantiate_group(&group, &options, None).unwrap().unwrap();

    assert!(first.as_object().unwrap().ptr_eq(second.as_object().unwrap()));
    assert_eq!(constructed.get(), 1);
}

#[test]
fn test_group_without_reuse_replaces_instance() {
    let (binder, constructed) = binder();
    let options = options(&binder);
    let group = CmdLineArg::group("widget").reusable(false);

    let first = binder.instantiate_group(&group, &options, None).unwrap().unwrap();
    let second = binder.instantiate_group(&group, &options, None).unwrap().unwrap();

    assert_ne!(first, second);
    assert_eq!(options.get("widget"), Some(second));
    assert_eq!(constructed.get(), 2);
}

#[test]
fn test_group_reuse_type_mismatch() {
    let (binder, constructed) = binder();
    let options = options(&binder);
    let gadget = Value::Object(ObjectRef::new(Object::new("Gadget")));
    options.set("widget", gadget.clone());

    let err = binder
        .instantiate_group(&CmdLineArg::group("widget"), &options, None)
        .unwrap_err();

    match err {
        InstantiationError::ReuseMismatch {
            existing, expected, ..
        } => {
            assert_eq!(existing, "Gadget");
            assert_eq!(expected, "Widget");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(options.get("widget"), Some(gadget));
    assert_eq!(constructed.get(), 0);
}

#[test]
fn test_single_group_into_list_member_is_incompatible() {
    let (binder, constructed) = binder();
    let options = options(&binder);
    let list = ListRef::new();
    options.set("widget_list", Value::List(list.clone()));

    let err = binder
        .instantiate_group(&CmdLineArg::group("widget_list"), &options, None)
        .unwrap_err();

    assert!(matches!(err, InstantiationError::Incompatible { .. }));
    assert_eq!(options.get("widget_list"), Some(Value::List(list)));
    assert_eq!(constructed.get(), 0);
}

#[test]
fn test_single_group_into_array_member_is_incompatible() {
    let (binder, constructed) = binder();
    let options = options(&binder);
    let group = CmdLineArg::group("widgets").multiple();
    let existing = binder.instantiate_group(&group, &options, None).unwrap().unwrap();

    let err = binder
        .instantiate_group(&CmdLineArg::group("widgets"), &options, None)
        .unwrap_err();

    assert!(matches!(err, InstantiationError::Incompatible { .. }));
    assert_eq!(options.get("widgets"), Some(Value::Array(vec![existing])));
    assert_eq!(constructed.get(), 1);
}

#[test]
fn test_multiple_group_grows_array() {
    let (binder, _) = binder();
    let options = options(&binder);
    let group = CmdLineArg::group("widgets").multiple();

    let first = binder.instantiate_group(&group, &options, None).unwrap().unwrap();
    let second = binder.instantiate_group(&group, &options, None).unwrap().unwrap();

    assert_eq!(options.get("widgets"), Some(Value::Array(vec![first, second])));
}

#[test]
fn test_multiple_group_appends_to_list() {
    let (binder, constructed) = binder();
    let options = options(&binder);
    let group = CmdLineArg::group("widget_list")
        .multiple()
        .with_instance_type("Widget");

    for _ in 0..3 {
        binder.instantiate_group(&group, &options, None).unwrap();
    }

    let list = options.get("widget_list").unwrap().as_list().cloned().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(constructed.get(), 3);
}

#[test]
fn test_group_instance_type_override() {
    let (binder, _) = binder();
    let options = options(&binder);

    let shape = binder
        .instantiate_group(
            &CmdLineArg::group("shape").with_instance_type("Circle"),
            &options,
            None,
        )
        .unwrap()
        .unwrap();

    assert_eq!(shape.type_name(), "Circle");
}

#[test]
fn test_group_override_must_fit_member() {
    let (binder, _) = binder();
    let options = options(&binder);

    let err = binder
        .instantiate_group(
            &CmdLineArg::group("shape").with_instance_type("Gadget"),
            &options,
            None,
        )
        .unwrap_err();

    assert!(matches!(err, InstantiationError::Incompatible { .. }));
    assert_eq!(options.get("shape"), Some(Value::Null));
}

#[test]
fn test_group_factory_without_seed() {
    let (binder, _) = binder();
    let options = options(&binder);

    let shape = binder
        .instantiate_group(&CmdLineArg::group("shape").with_factory("create"), &options, None)
        .unwrap()
        .unwrap();

    assert_eq!(shape.type_name(), "Square");
    assert_eq!(shape.as_object().unwrap().get("label"), Some(Value::from("blank")));
}

#[test]
fn test_group_factory_with_text_seed() {
    let (binder, _) = binder();
    let options = options(&binder);
    let seed = CmdLineArg::new("kind").with_value("CIRCLE");

    let shape = binder
        .instantiate_group(
            &CmdLineArg::group("shape").with_factory("Shape.create"),
            &options,
            Some(&seed),
        )
        .unwrap()
        .unwrap();

    assert_eq!(shape.type_name(), "Circle");
}

#[test]
fn test_group_factory_with_enum_seed() {
    let (binder, _) = binder();
    let options = options(&binder);
    let seed = CmdLineArg::enumeration("kind", "Kind").with_value("square");

    let shape = binder
        .instantiate_group(&CmdLineArg::group("shape").with_factory("create"), &options, Some(&seed))
        .unwrap()
        .unwrap();

    assert_eq!(shape.type_name(), "Square");
    assert_eq!(shape.as_object().unwrap().get("label"), Some(Value::from("seeded")));
}

#[test]
fn test_unresolved_enum_seed_follows_policy() {
    let (registry, _) = registry();
    let registry = Rc::new(registry);
    let seed = CmdLineArg::enumeration("kind", "Kind").with_value("TRIANGLE");
    let group = CmdLineArg::group("shape").with_factory("create");

    // fallback hands the raw text to the factory, which rejects it
    let fallback = Binder::new(Rc::clone(&registry));
    let options = registry.default_instance("Options").unwrap();
    let err = fallback
        .instantiate_group(&group, &options, Some(&seed))
        .unwrap_err();
    match err {
        InstantiationError::FactoryFailed { signature, source, .. } => {
            assert_eq!(signature, "Shape Shape.create(String)");
            assert_eq!(source.to_string(), "unknown shape TRIANGLE");
        }
        other => panic!("unexpected error: {other}"),
    }

    let strict = Binder::with_config(
        Rc::clone(&registry),
        BinderConfig {
            enum_seed_policy: EnumSeedPolicy::Strict,
            ..BinderConfig::default()
        },
    );
    let err = strict
        .instantiate_group(&group, &options, Some(&seed))
        .unwrap_err();
    assert!(matches!(
        err,
        InstantiationError::SeedResolution {
            source: ConversionError::UnknownConstant { .. },
            ..
        }
    ));
}

#[test]
fn test_group_member_not_found() {
    let (binder, _) = binder();
    let options = options(&binder);

    let err = binder
        .instantiate_group(&CmdLineArg::group("gizmo"), &options, None)
        .unwrap_err();

    assert!(matches!(err, InstantiationError::MemberNotFound { .. }));
    assert_eq!(err.context().to_string(), "gizmo on Options");
}

#[test]
fn test_group_without_variable() {
    let (binder, _) = binder();
    let options = options(&binder);
    let group = CmdLineArg::unbound();

    assert_eq!(binder.instantiate_group(&group, &options, None).unwrap(), None);
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn test_apply_stops_at_first_error() {
    let (binder, _) = binder();
    let options = options(&binder);
    let pipeline = ArgumentPipeline::new(binder);

    let name = CmdLineArg::new("name").with_value("first");
    let bad = CmdLineArg::new("tag").with_value("PURPLE");
    let limit = CmdLineArg::new("limit").with_value(Value::Long(9));
    let args: Vec<&dyn ParsedArgument> = vec![&name, &bad, &limit];

    let err = pipeline.apply(args.clone(), &options).unwrap_err();
    assert_eq!(err.context().member, "tag");
    assert_eq!(options.get("name"), Some(Value::from("first")));
    assert_eq!(options.get("limit"), Some(Value::Long(0)));

    let errors = pipeline.apply_all(args, &options);
    assert_eq!(errors.len(), 1);
    assert_eq!(options.get("limit"), Some(Value::Long(9)));
}

#[test]
fn test_pipeline_group_then_bind_into_it() {
    let (binder, _) = binder();
    let options = options(&binder);
    let pipeline = ArgumentPipeline::new(binder);

    let widget = pipeline
        .instantiate_group(Some(&CmdLineArg::group("widget")), Some(&options), None)
        .unwrap()
        .unwrap();
    let widget = widget.as_object().unwrap();
    pipeline
        .bind(Some(&CmdLineArg::new("size").with_value(4)), Some(widget))
        .unwrap();

    assert_eq!(widget.get("size"), Some(Value::Int(4)));
}

// ---------------------------------------------------------------------------
// Catalog and configuration
// ---------------------------------------------------------------------------

#[test]
fn test_catalog_declared_types_bind() {
    let json = r#"{
        "version": "1.0.0",
        "name": "demo",
        "types": [
            { "name": "Level", "kind": "enum", "constants": ["LOW", "HIGH"] },
            { "name": "Settings", "members": [
                { "name": "level", "type": { "enum": "Level" } },
                { "name": "ids", "type": { "array": { "element": "long" } } },
                { "name": "extras", "type": "list" },
                { "name": "id", "type": { "value": "long" }, "read_only": true }
            ] }
        ]
    }"#;
    let catalog = TypeCatalog::from_json(json).unwrap();
    let registry = TypeRegistry::from_catalog(&catalog);
    assert!(validate_registry(&registry).is_empty());

    let binder = Binder::new(Rc::new(registry));
    let settings = binder.registry().default_instance("Settings").unwrap();

    binder
        .bind(&CmdLineArg::new("level").with_value("HIGH"), &settings)
        .unwrap();
    binder
        .bind(&CmdLineArg::new("ids").multiple().with_values([1, 2]), &settings)
        .unwrap();
    binder
        .bind(&CmdLineArg::new("extras").multiple().with_value("x"), &settings)
        .unwrap();
    let err = binder
        .bind(&CmdLineArg::new("id").with_value(Value::Long(7)), &settings)
        .unwrap_err();

    assert_eq!(
        settings.get("ids"),
        Some(Value::Array(vec![Value::Long(1), Value::Long(2)]))
    );
    assert_eq!(settings.get("extras").unwrap().as_list().unwrap().len(), 1);
    assert!(matches!(err, BindingError::ReadOnly { .. }));
}

#[test]
fn test_config_file_drives_binder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("argbind.yml");
    std::fs::write(&path, "version: \"1.0\"\nenum_seed_policy: strict\nnumeric_widening: false\n").unwrap();

    let config = BinderConfig::load(&path).unwrap();
    assert_eq!(config.enum_seed_policy, EnumSeedPolicy::Strict);

    let (registry, _) = registry();
    let binder = Binder::with_config(Rc::new(registry), config.clone());
    assert_eq!(binder.config(), &config);

    let options = options(&binder);
    assert!(
        binder
            .bind(&CmdLineArg::new("limit").with_value(5), &options)
            .is_err()
    );
}
