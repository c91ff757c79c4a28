// Build script generating the operation registry from the service model.
//
// Reads model/bedrock-agentcore-control.json, checks that every operation is
// internally consistent and writes static descriptor tables to
// $OUT_DIR/registry.rs, which src/registry.rs includes.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

#[path = "src/naming.rs"]
#[allow(dead_code)]
mod naming;

const MODEL: &str = "model/bedrock-agentcore-control.json";

/// Flags every command or the whole CLI carries; inputs must not collide.
const RESERVED_FLAGS: &[&str] = &[
    "select",
    "force",
    "no-auto-iteration",
    "help",
    "config",
    "region",
    "profile",
    "endpoint-url",
    "no-sign-request",
    "output",
    "log-level",
];

const VERBS: &[&str] = &["Get", "New", "Remove", "Update", "Sync", "Start", "Set", "Add"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Model {
    service: Service,
    operations: Vec<Operation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Service {
    name: String,
    signing_name: String,
    endpoint_prefix: String,
    api_version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Operation {
    name: String,
    verb: String,
    noun: String,
    summary: String,
    method: String,
    uri: String,
    #[serde(default)]
    mutating: bool,
    #[serde(default)]
    confirm: Vec<String>,
    #[serde(default)]
    idempotency_token: Option<String>,
    #[serde(default = "default_select")]
    select: String,
    #[serde(default)]
    paginated: Option<Paginated>,
    #[serde(default)]
    input: Vec<Input>,
    #[serde(default)]
    output: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paginated {
    input_token: String,
    output_token: String,
    #[serde(default)]
    page_size: Option<String>,
    items: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, rename = "enum")]
    values: Vec<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    wire_name: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    doc: String,
}

fn default_select() -> String {
    "*".to_string()
}

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=model/");
    println!("cargo:rerun-if-changed=src/naming.rs");

    let raw = std::fs::read_to_string(MODEL).with_context(|| format!("reading {MODEL}"))?;
    let model: Model = serde_json::from_str(&raw).with_context(|| format!("parsing {MODEL}"))?;

    validate(&model)?;

    let code = generate(&model)?;
    let out_dir = std::env::var("OUT_DIR").context("OUT_DIR not set")?;
    std::fs::write(Path::new(&out_dir).join("registry.rs"), code)
        .context("writing generated registry")?;
    Ok(())
}

fn uri_labels(uri: &str) -> Vec<&str> {
    uri.split('{')
        .skip(1)
        .filter_map(|rest| rest.split_once('}').map(|(label, _)| label))
        .collect()
}

fn validate(model: &Model) -> Result<()> {
    let mut commands = HashSet::new();
    let mut names = HashSet::new();

    for op in &model.operations {
        let ctx = &op.name;
        if !VERBS.contains(&op.verb.as_str()) {
            bail!("{ctx}: unknown verb {}", op.verb);
        }
        let command = naming::command_name(&op.verb, &op.noun);
        if !commands.insert(command.clone()) {
            bail!("{ctx}: duplicate command {command}");
        }
        if !names.insert(op.name.clone()) {
            bail!("duplicate operation {ctx}");
        }
        if !matches!(op.method.as_str(), "GET" | "PUT" | "POST" | "DELETE" | "PATCH") {
            bail!("{ctx}: unsupported method {}", op.method);
        }

        let mut flags = HashSet::new();
        for input in &op.input {
            let flag = naming::kebab_case(&input.name);
            if RESERVED_FLAGS.contains(&flag.as_str()) {
                bail!("{ctx}: input {} collides with a common flag", input.name);
            }
            if !flags.insert(flag) {
                bail!("{ctx}: duplicate input {}", input.name);
            }
            if !matches!(
                input.kind.as_str(),
                "string" | "integer" | "enum" | "string-list" | "document"
            ) {
                bail!("{ctx}: input {} has unknown type {}", input.name, input.kind);
            }
            if input.kind == "enum" && input.values.is_empty() {
                bail!("{ctx}: enum input {} lists no values", input.name);
            }
            if let Some(location) = &input.location {
                if !matches!(location.as_str(), "uri" | "query" | "body") {
                    bail!("{ctx}: input {} has unknown location {location}", input.name);
                }
            }
        }

        for label in uri_labels(&op.uri) {
            let bound = op.input.iter().find(|input| input.wire_name() == label);
            match bound {
                Some(input) if input.location() == "uri" && input.required => {}
                Some(input) => bail!(
                    "{ctx}: uri label {label} must bind a required uri input, found {}",
                    input.name
                ),
                None => bail!("{ctx}: uri label {label} has no input"),
            }
        }
        for input in op.input.iter().filter(|input| input.location() == "uri") {
            if !uri_labels(&op.uri).contains(&input.wire_name()) {
                bail!("{ctx}: uri input {} has no label in {}", input.name, op.uri);
            }
        }

        for field in &op.confirm {
            if !op.input.iter().any(|input| &input.name == field) {
                bail!("{ctx}: confirm field {field} is not an input");
            }
        }
        if op.mutating && op.confirm.is_empty() {
            bail!("{ctx}: mutating operation names no confirm fields");
        }
        if let Some(token) = &op.idempotency_token {
            if !op.input.iter().any(|input| &input.name == token && input.kind == "string") {
                bail!("{ctx}: idempotency token {token} is not a string input");
            }
        }

        if let Some(paging) = &op.paginated {
            if !op.input.iter().any(|input| input.name == paging.input_token) {
                bail!("{ctx}: pagination input token {} is not an input", paging.input_token);
            }
            if let Some(size) = &paging.page_size {
                if !op.input.iter().any(|input| &input.name == size && input.kind == "integer") {
                    bail!("{ctx}: page size {size} is not an integer input");
                }
            }
            for member in [&paging.output_token, &paging.items] {
                if !op.output.contains(member) {
                    bail!("{ctx}: pagination member {member} is not an output");
                }
            }
        }

        if op.select != "*" {
            let head = op.select.split('.').next().unwrap_or_default();
            if !op.output.iter().any(|member| member == head) {
                bail!("{ctx}: default selector {} is not an output", op.select);
            }
        }
    }
    Ok(())
}

impl Input {
    fn wire_name(&self) -> &str {
        self.wire_name.as_deref().unwrap_or(&self.name)
    }

    fn location(&self) -> &str {
        self.location.as_deref().unwrap_or("body")
    }

    fn kind_expr(&self) -> String {
        match self.kind.as_str() {
            "string" => "FieldKind::String".to_string(),
            "integer" => "FieldKind::Integer".to_string(),
            "enum" => format!("FieldKind::Enum(&{:?})", self.values),
            "string-list" => "FieldKind::StringList".to_string(),
            _ => "FieldKind::Document".to_string(),
        }
    }

    fn location_expr(&self) -> &'static str {
        match self.location() {
            "uri" => "Location::Uri",
            "query" => "Location::Query",
            _ => "Location::Body",
        }
    }
}

fn generate(model: &Model) -> Result<String> {
    let mut out = String::new();
    let service = &model.service;

    writeln!(out, "// @generated from {MODEL}; do not edit.")?;
    writeln!(out)?;
    writeln!(out, "pub static SERVICE: ServiceInfo = ServiceInfo {{")?;
    writeln!(out, "    name: {:?},", service.name)?;
    writeln!(out, "    signing_name: {:?},", service.signing_name)?;
    writeln!(out, "    endpoint_prefix: {:?},", service.endpoint_prefix)?;
    writeln!(out, "    api_version: {:?},", service.api_version)?;
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(out, "pub static OPERATIONS: &[OperationDescriptor] = &[")?;

    for op in &model.operations {
        writeln!(out, "    OperationDescriptor {{")?;
        writeln!(out, "        name: {:?},", op.name)?;
        writeln!(out, "        verb: Verb::{},", op.verb)?;
        writeln!(out, "        noun: {:?},", op.noun)?;
        writeln!(out, "        command: {:?},", naming::command_name(&op.verb, &op.noun))?;
        writeln!(out, "        summary: {:?},", op.summary)?;
        writeln!(
            out,
            "        http: HttpBinding {{ method: {:?}, uri: {:?} }},",
            op.method, op.uri
        )?;
        writeln!(out, "        inputs: &[")?;
        for input in &op.input {
            writeln!(out, "            FieldDescriptor {{")?;
            writeln!(out, "                name: {:?},", input.name)?;
            writeln!(out, "                wire_name: {:?},", input.wire_name())?;
            writeln!(out, "                kind: {},", input.kind_expr())?;
            writeln!(out, "                location: {},", input.location_expr())?;
            writeln!(out, "                required: {},", input.required)?;
            writeln!(out, "                doc: {:?},", input.doc)?;
            writeln!(out, "            }},")?;
        }
        writeln!(out, "        ],")?;
        writeln!(out, "        outputs: &{:?},", op.output)?;
        writeln!(out, "        default_select: {:?},", op.select)?;
        match &op.paginated {
            Some(paging) => writeln!(
                out,
                "        pagination: Some(Pagination {{ input_token: {:?}, output_token: {:?}, page_size: {:?}, items: {:?} }}),",
                paging.input_token, paging.output_token, paging.page_size, paging.items
            )?,
            None => writeln!(out, "        pagination: None,")?,
        }
        writeln!(out, "        mutating: {},", op.mutating)?;
        writeln!(out, "        confirm_fields: &{:?},", op.confirm)?;
        writeln!(out, "        idempotency_token: {:?},", op.idempotency_token)?;
        writeln!(out, "    }},")?;
    }

    writeln!(out, "];")?;
    Ok(out)
}
