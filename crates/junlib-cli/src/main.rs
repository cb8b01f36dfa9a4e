use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use junlib::xml::writer::escape_attribute;
use junlib::{
    derive_schema, element_to_dict, element_to_json, json_to_element,
    to_json_string_with_options, to_xml_string, Element, JsonWriteOptions, Loader,
    SchemaOptions, SchemaSource, Value, WriteOptions,
};

#[derive(Debug, Parser)]
#[command(
    name = "junlib",
    version,
    about = "Convert XML to JSON and back, derive XSD schemas, search XML trees"
)]
struct Args {
    /// Directory relative paths resolve against (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,
    /// Log conversion steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert between XML and JSON
    Convert {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Output form
        #[arg(short, long, value_enum)]
        to: Target,
        /// Root element name for JSON input
        #[arg(long, default_value = "root")]
        root: String,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
        /// Write without indentation
        #[arg(long)]
        compact: bool,
        /// Order JSON object members by key
        #[arg(long)]
        sort_keys: bool,
    },
    /// Derive an XSD schema from an XML or JSON file
    Schema {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Root element name (JSON input; XML uses its root tag)
        #[arg(long)]
        root: Option<String>,
        /// Describe repeated elements by merging every occurrence
        #[arg(long)]
        merge_repeated: bool,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// List elements whose attribute equals a value
    Search {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(long)]
        tag: String,
        #[arg(long)]
        attr: String,
        #[arg(long)]
        value: String,
    },
    /// Print the text of the first (or every) element with a tag
    Query {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(long)]
        tag: String,
        #[arg(long)]
        all: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Target {
    /// JSON variant keeping attributes and text
    Json,
    /// Plain nested dict of leaf texts
    Dict,
    Xml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputFormat {
    Xml,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let loader = Loader::new(base_dir);
    debug!(base_dir = %loader.base_dir().display(), "loader ready");

    match args.command {
        Command::Convert {
            input,
            to,
            root,
            output,
            compact,
            sort_keys,
        } => {
            let json_options = JsonWriteOptions {
                pretty: !compact,
                sort_keys,
            };
            convert(&loader, &input, to, &root, output.as_deref(), &json_options)
        }
        Command::Schema {
            input,
            root,
            merge_repeated,
            output,
        } => schema(&loader, &input, root, merge_repeated, output.as_deref()),
        Command::Search {
            input,
            tag,
            attr,
            value,
        } => search(&loader, &input, &tag, &attr, &value),
        Command::Query { input, tag, all } => query(&loader, &input, &tag, all),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn convert(
    loader: &Loader,
    input: &Path,
    to: Target,
    root: &str,
    output: Option<&Path>,
    json_options: &JsonWriteOptions,
) -> Result<()> {
    let compact = !json_options.pretty;
    let text = match (infer_format(input)?, to) {
        (InputFormat::Xml, Target::Json) => {
            let element = load_element(loader, input)?;
            let value = element_to_json(&element)
                .with_context(|| format!("failed to convert {}", input.display()))?;
            to_json_string_with_options(&value, json_options)?
        }
        (InputFormat::Xml, Target::Dict) => {
            let element = load_element(loader, input)?;
            to_json_string_with_options(&element_to_dict(&element), json_options)?
        }
        (InputFormat::Xml, Target::Xml) => {
            to_xml_string(&load_element(loader, input)?, &write_options(compact))
        }
        (InputFormat::Json, Target::Xml) => {
            let value = load_value(loader, input)?;
            let element = json_to_element(&value, root)
                .with_context(|| format!("failed to convert {}", input.display()))?;
            to_xml_string(&element, &write_options(compact))
        }
        (InputFormat::Json, Target::Json) => {
            to_json_string_with_options(&load_value(loader, input)?, json_options)?
        }
        (InputFormat::Json, Target::Dict) => {
            bail!("dict output needs XML input; use --to xml for {}", input.display())
        }
    };
    info!(input = %input.display(), target = ?to, "converted");
    write_output(loader, output, &text)
}

fn schema(
    loader: &Loader,
    input: &Path,
    root: Option<String>,
    merge_repeated: bool,
    output: Option<&Path>,
) -> Result<()> {
    let options = SchemaOptions {
        merge_repeated,
        ..SchemaOptions::default()
    };
    let description = match infer_format(input)? {
        InputFormat::Xml => {
            let mut element = load_element(loader, input)?;
            if let Some(root) = root {
                element.name = root;
            }
            derive_schema(SchemaSource::Element(&element), &options)
        }
        InputFormat::Json => {
            let value = load_value(loader, input)?;
            let root_name = root.unwrap_or_else(|| "root".to_string());
            derive_schema(
                SchemaSource::Json {
                    value: &value,
                    root_name: &root_name,
                },
                &options,
            )
        }
    };

    match output {
        Some(path) => {
            loader
                .save_schema(path, &description)
                .with_context(|| format!("failed to write schema {}", path.display()))?;
            Ok(())
        }
        None => write_stdout(&description.to_document()),
    }
}

fn search(loader: &Loader, input: &Path, tag: &str, attr: &str, value: &str) -> Result<()> {
    let element = load_element(loader, input)?;
    let mut lines = String::new();
    for (name, attributes) in element.search_by_attribute(tag, attr, value) {
        lines.push_str(&name);
        for (key, value) in &attributes {
            lines.push_str(&format!(" {key}=\"{}\"", escape_attribute(value)));
        }
        lines.push('\n');
    }
    write_stdout(&lines)
}

fn query(loader: &Loader, input: &Path, tag: &str, all: bool) -> Result<()> {
    let element = load_element(loader, input)?;
    let texts = if all {
        element.tag_contents(tag)
    } else {
        element.tag_content(tag).into_iter().collect()
    };
    if texts.is_empty() {
        bail!("no <{tag}> with text in {}", input.display());
    }
    let mut lines = texts.join("\n");
    lines.push('\n');
    write_stdout(&lines)
}

fn load_element(loader: &Loader, input: &Path) -> Result<Element> {
    loader
        .load_xml(input)
        .map(|doc| doc.root)
        .with_context(|| format!("failed to read XML file {}", input.display()))
}

fn load_value(loader: &Loader, input: &Path) -> Result<Value> {
    loader
        .load_json(input)
        .with_context(|| format!("failed to read JSON file {}", input.display()))
}

fn write_options(compact: bool) -> WriteOptions {
    if compact {
        WriteOptions::compact()
    } else {
        WriteOptions::default()
    }
}

fn write_output(loader: &Loader, output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            let path = loader.resolve(path);
            std::fs::write(&path, text)
                .with_context(|| format!("failed to write output file {}", path.display()))
        }
        None => write_stdout(text),
    }
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout();
    stdout
        .write_all(text.as_bytes())
        .context("failed to write stdout")
}

fn infer_format(path: &Path) -> Result<InputFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("xml") => Ok(InputFormat::Xml),
        Some("json") => Ok(InputFormat::Json),
        _ => bail!(
            "could not infer input format of {}; expected .xml or .json",
            path.display()
        ),
    }
}
