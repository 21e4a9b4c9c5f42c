use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use argbind::{ArgumentPipeline, Binder, BinderConfig};
use argbind_core::{
    CmdLineArg, DeclaredType, FactoryFault, MemberDecl, Object, ObjectRef, ParsedArgument,
    TypeCatalog, TypeDecl, TypeRegistry, Value, ValueKind, validate_catalog, validate_registry,
};
use clap::{Args, Parser, Subcommand};

/// Output format for the bound object.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argbind-demo")]
#[command(about = "Bind command-line options onto a typed target object")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bind the given options onto a fresh `Options` object and print it.
    Bind(BindArgs),
    /// Validate a JSON type catalog.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct BindArgs {
    /// Repeatable; collected into an int array.
    #[arg(long = "count")]
    counts: Vec<i32>,
    /// Color constant (RED, GREEN or BLUE).
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    name: Option<String>,
    /// Repeatable; appended to a list.
    #[arg(long = "item")]
    items: Vec<String>,
    /// Port number, built through the `Port.of` factory.
    #[arg(long)]
    port: Option<i32>,
    /// Creates the `widget` group and sets its size.
    #[arg(long)]
    widget_size: Option<i32>,
    /// Binder configuration YAML.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Type catalog JSON file.
    catalog: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Bind(args) => run_bind(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn demo_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.declare(TypeDecl::enumeration("Color", &["RED", "GREEN", "BLUE"]));
    registry.declare(
        TypeDecl::class("Widget")
            .with_member(MemberDecl::new("size", DeclaredType::Value(ValueKind::Int))),
    );
    registry
        .declare(
            TypeDecl::class("Port")
                .with_member(MemberDecl::new("number", DeclaredType::Value(ValueKind::Int))),
        )
        .add_factory(argbind_core::Factory::new("of", &["int"], |args| {
            match args.first() {
                Some(Value::Int(n)) if (1..=65535).contains(n) => Ok(Value::Object(ObjectRef::new(
                    Object::new("Port").with_field("number", *n),
                ))),
                Some(other) => Err(FactoryFault::new(format!("invalid port {other}"))),
                None => Err(FactoryFault::new("missing port")),
            }
        }));
    registry.declare(
        TypeDecl::class("Options")
            .with_member(MemberDecl::new(
                "counts",
                DeclaredType::Array {
                    element: ValueKind::Int,
                    boxed: false,
                },
            ))
            .with_member(MemberDecl::new("tag", DeclaredType::Enum("Color".into())))
            .with_member(MemberDecl::new("name", DeclaredType::Value(ValueKind::Str)))
            .with_member(MemberDecl::new("items", DeclaredType::List))
            .with_member(MemberDecl::new("port", DeclaredType::Object("Port".into())))
            .with_member(MemberDecl::new("widget", DeclaredType::Object("Widget".into()))),
    );
    registry
}

fn run_bind(args: BindArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => BinderConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => BinderConfig::default(),
    };

    let registry = Rc::new(demo_registry());
    let problems = validate_registry(&registry);
    if !problems.is_empty() {
        return Err(format!("demo registry is invalid: {problems:?}"));
    }
    let options = registry.default_instance("Options").map_err(|e| e.to_string())?;
    let pipeline = ArgumentPipeline::new(Binder::with_config(Rc::clone(&registry), config));

    let mut parsed: Vec<CmdLineArg> = Vec::new();
    if !args.counts.is_empty() {
        parsed.push(CmdLineArg::new("counts").multiple().with_values(args.counts));
    }
    if let Some(tag) = args.tag {
        parsed.push(CmdLineArg::enumeration("tag", "Color").with_value(tag));
    }
    if let Some(name) = args.name {
        parsed.push(CmdLineArg::new("name").with_value(name));
    }
    if !args.items.is_empty() {
        parsed.push(CmdLineArg::new("items").multiple().with_values(args.items));
    }
    if let Some(port) = args.port {
        parsed.push(CmdLineArg::new("port").with_value(port).with_factory("Port.of"));
    }

    let refs: Vec<&dyn ParsedArgument> = parsed.iter().map(|a| a as &dyn ParsedArgument).collect();
    pipeline.apply(refs, &options).map_err(|e| e.to_string())?;

    if let Some(size) = args.widget_size {
        let group = CmdLineArg::group("widget");
        let widget = pipeline
            .instantiate_group(Some(&group), Some(&options), None)
            .map_err(|e| e.to_string())?;
        let widget = widget
            .as_ref()
            .and_then(Value::as_object)
            .ok_or_else(|| "widget group produced no object".to_string())?;
        pipeline
            .bind(Some(&CmdLineArg::new("size").with_value(size)), Some(widget))
            .map_err(|e| e.to_string())?;
    }

    let document = to_json(&Value::Object(options));
    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&document)
            .map_err(|err| format!("Failed to serialize output: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&document)
            .map_err(|err| format!("Failed to serialize output: {err}"))?,
    };
    println!("{rendered}");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let raw = fs::read_to_string(&args.catalog)
        .map_err(|err| format!("Failed to read '{}': {err}", args.catalog.display()))?;
    let catalog = TypeCatalog::from_json(&raw)
        .map_err(|err| format!("Failed to parse '{}': {err}", args.catalog.display()))?;

    let errors = validate_catalog(&catalog);
    if errors.is_empty() {
        println!("Validated {} type(s).", catalog.type_count());
        return Ok(());
    }
    for error in &errors {
        eprintln!("  {error}");
    }
    Err(format!("{} validation error(s)", errors.len()))
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => (*b).into(),
        Value::Byte(n) => (*n).into(),
        Value::Short(n) => (*n).into(),
        Value::Int(n) => (*n).into(),
        Value::Long(n) => (*n).into(),
        Value::Float(n) => (*n).into(),
        Value::Double(n) => (*n).into(),
        Value::Str(s) => s.clone().into(),
        Value::Enum(constant) => constant.name.clone().into(),
        Value::Array(items) => items.iter().map(to_json).collect(),
        Value::List(list) => list.to_vec().iter().map(to_json).collect(),
        Value::Object(object) => {
            let object = object.borrow();
            let mut names: Vec<&str> = object.field_names().collect();
            names.sort_unstable();
            let mut fields = serde_json::Map::new();
            for name in names {
                let field = object.get(name).map(to_json).unwrap_or_default();
                fields.insert(name.to_string(), field);
            }
            serde_json::Value::Object(fields)
        }
        other => other.to_string().into(),
    }
}
