//! Workspace file tools. Every path goes through the [`PathSandbox`].

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use capability_hub::{
    CapabilityDescriptor, CapabilityError, CapabilityResult, ParamSpec, ParamType, PathSandbox,
    Payload,
};

const MAX_JSON_INDENT: i64 = 16;

fn io_error(action: &str, shown: &str, err: io::Error) -> CapabilityError {
    match err.kind() {
        io::ErrorKind::NotFound => CapabilityError::missing_path(shown),
        _ => CapabilityError::handler(format!("Failed to {action} {shown}: {err}")),
    }
}

fn timestamp(time: io::Result<SystemTime>) -> Value {
    match time {
        Ok(time) => json!(DateTime::<Utc>::from(time).to_rfc3339()),
        Err(_) => Value::Null,
    }
}

fn line_count(content: &str) -> usize {
    content.split('\n').count()
}

fn existing_file(sandbox: &PathSandbox, file_path: &str) -> CapabilityResult<std::path::PathBuf> {
    let path = sandbox.resolve(file_path)?;
    if !path.exists() {
        return Err(CapabilityError::missing_path(file_path));
    }
    if !path.is_file() {
        return Err(CapabilityError::handler(format!("{file_path} is not a file")));
    }
    Ok(path)
}

fn write_new(path: &Path, shown: &str, bytes: &[u8]) -> CapabilityResult<u64> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create parent of", shown, e))?;
    }
    fs::write(path, bytes).map_err(|e| io_error("write", shown, e))?;
    Ok(bytes.len() as u64)
}

/// Serialize `value` as JSON indented by `indent` spaces.
pub fn to_json_with_indent(value: &Value, indent: usize) -> CapabilityResult<Vec<u8>> {
    let spaces = vec![b' '; indent];
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&spaces);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| CapabilityError::handler(format!("Failed to encode JSON: {e}")))?;
    Ok(buf)
}

fn file_path_param() -> ParamSpec {
    ParamSpec::required("file_path", ParamType::String)
        .describe("Path relative to the workspace directory")
}

fn overwrite_param() -> ParamSpec {
    ParamSpec::optional("overwrite", ParamType::Boolean)
        .with_default(false)
        .describe("Replace the file if it already exists")
}

pub fn file_tools(sandbox: Arc<PathSandbox>) -> CapabilityResult<Vec<CapabilityDescriptor>> {
    let mut tools = Vec::new();

    let sb = sandbox.clone();
    tools.push(
        CapabilityDescriptor::tool("list_directory", move |_, args| {
            let shown = args.str("directory_path")?;
            let path = sb.resolve(shown)?;
            if !path.exists() {
                return Err(CapabilityError::missing_path(shown));
            }
            if !path.is_dir() {
                return Err(CapabilityError::handler(format!("{shown} is not a directory")));
            }

            let mut files = Vec::new();
            let mut directories = Vec::new();
            for entry in fs::read_dir(&path).map_err(|e| io_error("list", shown, e))? {
                let entry = entry.map_err(|e| io_error("list", shown, e))?;
                let name = entry.file_name().to_string_lossy().into_owned();
                let path = entry.path();
                if path.is_file() {
                    files.push(name);
                } else if path.is_dir() {
                    directories.push(name);
                }
            }
            files.sort();
            directories.sort();

            Ok(Payload::Json(json!({
                "files": files,
                "directories": directories,
                "path": sb.relative(&path),
            })))
        })
        .title("List Directory")
        .description("List files and directories")
        .param(
            ParamSpec::optional("directory_path", ParamType::String)
                .with_default(".")
                .describe("Path relative to the workspace directory"),
        )
        .build()?,
    );

    let sb = sandbox.clone();
    tools.push(
        CapabilityDescriptor::tool("read_text_file", move |_, args| {
            let shown = args.str("file_path")?;
            let path = existing_file(&sb, shown)?;
            let bytes = fs::read(&path).map_err(|e| io_error("read", shown, e))?;
            let content = String::from_utf8(bytes).map_err(|_| {
                CapabilityError::handler(format!("File {shown} is not a valid text file"))
            })?;

            Ok(Payload::Json(json!({
                "content": content,
                "file_path": shown,
                "size_bytes": content.len(),
                "lines": line_count(&content),
            })))
        })
        .title("Read Text File")
        .description("Read content of a text file")
        .param(file_path_param())
        .build()?,
    );

    let sb = sandbox.clone();
    tools.push(
        CapabilityDescriptor::tool("write_text_file", move |_, args| {
            let shown = args.str("file_path")?;
            let content = args.str("content")?;
            let path = sb.ensure_writable(shown, args.bool("overwrite")?)?;
            let size = write_new(&path, shown, content.as_bytes())?;
            tracing::debug!("Wrote {size} bytes to {shown}");

            Ok(Payload::Json(json!({
                "message": format!("Successfully wrote to {shown}"),
                "file_path": shown,
                "size_bytes": size,
                "lines": line_count(content),
            })))
        })
        .title("Write Text File")
        .description("Write content to a text file")
        .param(file_path_param())
        .param(ParamSpec::required("content", ParamType::String).describe("Content to write"))
        .param(overwrite_param())
        .build()?,
    );

    let sb = sandbox.clone();
    tools.push(
        CapabilityDescriptor::tool("read_json_file", move |_, args| {
            let shown = args.str("file_path")?;
            let path = existing_file(&sb, shown)?;
            let bytes = fs::read(&path).map_err(|e| io_error("read", shown, e))?;
            let data: Value = serde_json::from_slice(&bytes).map_err(|e| {
                CapabilityError::handler(format!("Invalid JSON in file {shown}: {e}"))
            })?;

            Ok(Payload::Json(json!({
                "data": data,
                "file_path": shown,
                "size_bytes": bytes.len(),
            })))
        })
        .title("Read JSON File")
        .description("Read and parse a JSON file")
        .param(file_path_param())
        .build()?,
    );

    let sb = sandbox.clone();
    tools.push(
        CapabilityDescriptor::tool("write_json_file", move |_, args| {
            let shown = args.str("file_path")?;
            let indent = args.i64("indent")?;
            if !(0..=MAX_JSON_INDENT).contains(&indent) {
                return Err(CapabilityError::invalid(
                    "indent",
                    format!("must be between 0 and {MAX_JSON_INDENT}"),
                ));
            }

            let data = Value::Object(args.map("data")?.clone());
            let encoded = to_json_with_indent(&data, indent as usize)?;
            let path = sb.ensure_writable(shown, args.bool("overwrite")?)?;
            let size = write_new(&path, shown, &encoded)?;

            Ok(Payload::Json(json!({
                "message": format!("Successfully wrote JSON to {shown}"),
                "file_path": shown,
                "size_bytes": size,
            })))
        })
        .title("Write JSON File")
        .description("Write data to a JSON file")
        .param(file_path_param())
        .param(
            ParamSpec::required("data", ParamType::map_of(ParamType::Any))
                .describe("JSON object to write"),
        )
        .param(overwrite_param())
        .param(
            ParamSpec::optional("indent", ParamType::Integer)
                .with_default(2)
                .describe("Spaces per indentation level"),
        )
        .build()?,
    );

    let sb = sandbox.clone();
    tools.push(
        CapabilityDescriptor::tool("file_info", move |_, args| {
            let shown = args.str("file_path")?;
            let path = sb.resolve(shown)?;
            let meta = fs::metadata(&path).map_err(|e| io_error("stat", shown, e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let kind = if meta.is_file() { "file" } else { "directory" };

            Ok(Payload::Json(json!({
                "path": sb.relative(&path),
                "name": name,
                "type": kind,
                "size_bytes": meta.len(),
                "created": timestamp(meta.created()),
                "modified": timestamp(meta.modified()),
                "exists": true,
            })))
        })
        .title("File Info")
        .description("Get file information")
        .param(file_path_param())
        .build()?,
    );

    let sb = sandbox;
    tools.push(
        CapabilityDescriptor::tool("create_directory", move |_, args| {
            let shown = args.str("directory_path")?;
            let path = sb.resolve(shown)?;
            if path.is_file() {
                return Err(CapabilityError::handler(format!(
                    "{shown} exists and is not a directory"
                )));
            }
            fs::create_dir_all(&path).map_err(|e| io_error("create", shown, e))?;

            Ok(Payload::Json(json!({
                "message": format!("Directory {shown} created successfully"),
                "path": sb.relative(&path),
            })))
        })
        .title("Create Directory")
        .description("Create a new directory")
        .param(
            ParamSpec::required("directory_path", ParamType::String)
                .describe("Path of the new directory, relative to the workspace"),
        )
        .build()?,
    );

    Ok(tools)
}
