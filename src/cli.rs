//! CLI: property bags / type text → mock props
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{SynthConfig, StringPolicy};
use crate::synth::UnionPolicy;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// synthesize mock component props from declared prop types
#[derive(Parser, Debug)]
#[command(name = "mock-props", version)]
pub struct CommandLineInterface {
    /// log debug output to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// synthesize mock props for one or more property bag documents
    Props(PropsOut),
    /// synthesize a sample value for a single type text
    Sample(SampleOut),
    /// print the parsed type description of a type text
    Describe(DescribeOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON), one property bag per line
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select the property bag in each document (e.g. /components/0/props)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is a property bag
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct SynthSettings {
    /// JSON config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// string generation policy
    #[arg(long, value_enum)]
    strings: Option<StringPolicy>,

    /// fixed text for the placeholder policy
    #[arg(long)]
    placeholder: Option<String>,

    /// seed for the faker policy
    #[arg(long)]
    seed: Option<u64>,

    /// what non-literal unions become
    #[arg(long, value_enum)]
    union_policy: Option<UnionPolicy>,

    /// nesting depth past which values become null
    #[arg(long)]
    max_depth: Option<usize>,
}

#[derive(clap::Parser, Debug)]
struct PropsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    synth_settings: SynthSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// single-line JSON output
    #[arg(long)]
    compact: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct SampleOut {
    /// type text, e.g. '{ name: string; tags: string[] }'
    type_text: String,

    /// field name the type is declared under (drives the faker policy)
    #[arg(long)]
    field: Option<String>,

    #[command(flatten)]
    synth_settings: SynthSettings,

    /// single-line JSON output
    #[arg(long)]
    compact: bool,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    /// type text, e.g. '"admin" | "guest"'
    type_text: String,

    /// fail on malformed type text instead of printing `unknown`
    #[arg(long)]
    strict: bool,

    /// single-line JSON output
    #[arg(long)]
    compact: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

/// One property bag document and where it came from.
#[derive(Debug, Clone, PartialEq)]
struct Document {
    source: String,
    value: Value,
}

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;
            for (index, json_value) in self.parse_source(&source, &source_path_str)?.into_iter().enumerate() {
                let label = if self.ndjson { format!("{source_path_str}:{}", index + 1) } else { source_path_str.clone() };
                documents.extend(self.select(json_value, &label)?);
            }
        }
        debug!(documents = documents.len(), "loaded property bag documents");
        Ok(documents)
    }

    fn parse_source(&self, source: &str, source_path_str: &str) -> Result<Vec<Value>> {
        if !self.ndjson {
            let value = serde_json::from_str::<Value>(source)
                .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
            return Ok(vec![value]);
        }
        source
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(ix, line)| {
                serde_json::from_str::<Value>(line)
                    .with_context(|| format!("failed to parse NDJSON line {} ({source_path_str})", ix + 1))
            })
            .collect()
    }

    fn select(&self, json_value: Value, label: &str) -> Result<Vec<Document>> {
        let json_value = match self.json_pointer.as_deref() {
            None => json_value,
            Some(pointer) => match json_value.pointer(pointer) {
                Some(x) => x.clone(),
                None => bail!("JSON pointer {pointer} matched nothing in {label}"),
            },
        };
        let values = match self.jq_expr.as_deref() {
            None => vec![json_value],
            Some(jq_expr) => crate::jq_exec::apply_filter(jq_expr, &json_value)
                .with_context(|| format!("failed to apply jq expression to {label}"))?,
        };
        Ok(values
            .into_iter()
            .map(|value| Document { source: label.to_string(), value })
            .collect())
    }
}

impl SynthSettings {
    fn resolve(&self) -> Result<SynthConfig> {
        let mut config = match self.config.as_deref() {
            Some(path) => SynthConfig::load(path)?,
            None => SynthConfig::default(),
        };
        if let Some(policy) = self.strings {
            config.strings.policy = policy;
        }
        if let Some(placeholder) = &self.placeholder {
            config.strings.placeholder = placeholder.clone();
        }
        if let Some(seed) = self.seed {
            config.strings.seed = seed;
        }
        if let Some(policy) = self.union_policy {
            config.union_policy = policy;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        Ok(config)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Props(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let config = target.synth_settings.resolve()?;
                let documents = target.input_settings.load_documents()?;
                let output = synthesize_documents(&config, documents)?;
                write_output(target.out.as_deref(), &output, target.compact)
            }
            Command::Sample(target) => {
                let synth = target.synth_settings.resolve()?.build();
                let ty = crate::typetext::parse(&target.type_text);
                let value = synth.synthesize(&ty, target.field.as_deref());
                write_output(None, &value, target.compact)
            }
            Command::Describe(target) => {
                let ty = if target.strict {
                    crate::typetext::try_parse(&target.type_text)
                        .with_context(|| format!("malformed type text `{}`", target.type_text))?
                } else {
                    crate::typetext::parse(&target.type_text)
                };
                write_output(None, &serde_json::to_value(&ty)?, target.compact)
            }
        }
    }
}

/// Synthesize every document in parallel; one document → one object,
/// several → an array in input order.
fn synthesize_documents(config: &SynthConfig, documents: Vec<Document>) -> Result<Value> {
    let synth = config.build();
    let mut outputs = documents
        .into_par_iter()
        .map(|Document { source, value }| {
            let props = crate::ir::bag_from_value(value)
                .with_context(|| format!("invalid property bag in {source}"))?;
            info!(source = %source, props = props.len(), "synthesizing mock props");
            Ok(Value::Object(synth.synthesize_props(&props)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(match outputs.len() {
        1 => outputs.remove(0),
        _ => Value::Array(outputs),
    })
}

fn write_output(out: Option<&Path>, value: &Value, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &rendered)
                .with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched = glob::glob(pattern)?
                .collect::<Result<Vec<_>, _>>()?;
            if matched.is_empty() {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
            matched.sort();
            out.append(&mut matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inputs<P: AsRef<Path>>(paths: &[P]) -> InputSettings {
        InputSettings {
            ndjson: false,
            json_pointer: None,
            jq_expr: None,
            input: paths.iter().map(|p| p.as_ref().to_string_lossy().to_string()).collect(),
        }
    }

    #[test]
    fn parses_command_line() {
        let cli = CommandLineInterface::try_parse_from([
            "mock-props", "props", "-i", "a.json", "b.json",
            "--strings", "faker", "--seed", "3", "--union-policy", "first-variant",
        ])
        .unwrap();
        let Command::Props(target) = &cli.cmd else { panic!("expected props") };
        assert_eq!(target.input_settings.input, ["a.json", "b.json"]);
        let config = target.synth_settings.resolve().unwrap();
        assert_eq!(config.strings.policy, StringPolicy::Faker);
        assert_eq!(config.strings.seed, 3);
        assert_eq!(config.union_policy, UnionPolicy::FirstVariant);
    }

    #[test]
    fn loads_globbed_documents_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{ "count": "number" }"#).unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{ "title": "string" }"#).unwrap();
        let pattern = dir.path().join("*.json");
        let docs = inputs(&[&pattern]).load_documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[0].source.ends_with("a.json"));
        assert_eq!(docs[1].value, json!({ "count": "number" }));
    }

    #[test]
    fn empty_glob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.json");
        let err = inputs(&[&pattern]).load_documents().unwrap_err();
        assert!(format!("{err:#}").contains("matched no files"), "{err:#}");
    }

    #[test]
    fn ndjson_and_pointer_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bags.ndjson");
        std::fs::write(
            &path,
            "{\"props\": {\"a\": \"string\"}}\n\n{\"props\": {\"b\": \"boolean\"}}\n",
        )
        .unwrap();
        let mut settings = inputs(&[&path]);
        settings.ndjson = true;
        settings.json_pointer = Some("/props".into());
        let docs = settings.load_documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[1].source.ends_with("bags.ndjson:2"));
        assert_eq!(docs[1].value, json!({ "b": "boolean" }));

        settings.json_pointer = Some("/missing".into());
        assert!(settings.load_documents().is_err());
    }

    #[test]
    fn jq_expr_fans_out_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        std::fs::write(&path, r#"{ "components": [ { "props": { "a": "number" } }, { "props": { "b": "string" } } ] }"#).unwrap();
        let mut settings = inputs(&[&path]);
        settings.jq_expr = Some(".components[].props".into());
        let docs = settings.load_documents().unwrap();
        assert_eq!(docs.iter().map(|d| d.value.clone()).collect::<Vec<_>>(), [json!({ "a": "number" }), json!({ "b": "string" })]);
    }

    #[test]
    fn single_document_yields_object_many_yield_array() {
        let config = SynthConfig::default();
        let one = vec![Document {
            source: "one".into(),
            value: json!({ "name": "string", "role": "\"admin\" | \"guest\"", "meta": "Meta" }),
        }];
        assert_eq!(
            synthesize_documents(&config, one).unwrap(),
            json!({ "name": "Sample text", "role": ["admin", "guest"], "meta": null })
        );

        let many = vec![
            Document { source: "a".into(), value: json!({ "n": { "kind": "number" } }) },
            Document { source: "b".into(), value: json!({ "tags": "string[]" }) },
        ];
        assert_eq!(
            synthesize_documents(&config, many).unwrap(),
            json!([{ "n": 123 }, { "tags": ["Sample text"] }])
        );
    }

    #[test]
    fn non_object_bag_is_reported_with_source() {
        let docs = vec![Document { source: "weird.json".into(), value: json!(42) }];
        let err = synthesize_documents(&SynthConfig::default(), docs).unwrap_err();
        assert!(format!("{err:#}").contains("weird.json"), "{err:#}");
    }

    #[test]
    fn writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/props.json");
        write_output(Some(&out), &json!({ "a": 1 }), true).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), r#"{"a":1}"#);
    }
}
