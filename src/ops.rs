//! Introspection: flatten a realized graph into dotted `path = value` entries.
//!
//! Provides the logic behind [`ConfigGraph::list`](crate::ConfigGraph::list)
//! and the [`Listing`] type callers use to display or serialize the result.

use std::fmt;

use serde::Serialize;
use toml::Value;

use crate::graph::ConfigView;
use crate::spec::{Spec, SpecKind};
use crate::types::SpecId;

/// One spec of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecEntry {
    /// Dotted path from the listed root.
    pub path: String,
    pub spec_id: SpecId,
    pub kind: &'static str,
    /// Object values are rendered as TOML, other kinds as `<label>`.
    pub value: String,
}

/// Every spec reachable from a config, in dotted-path order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub entries: Vec<SpecEntry>,
}

impl Listing {
    pub fn find(&self, path: &str) -> Option<&SpecEntry> {
        self.entries.iter().find(|e| e.path == path)
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} = {}", entry.path, entry.value)?;
        }
        Ok(())
    }
}

/// List every spec under `root`. Shared children appear once per path that
/// reaches them.
pub fn list_specs(root: ConfigView<'_>) -> Listing {
    let mut entries = Vec::new();
    collect(root, "", &mut entries);
    Listing { entries }
}

fn collect(view: ConfigView<'_>, prefix: &str, out: &mut Vec<SpecEntry>) {
    for name in view.names() {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        // Names come from the view itself, so the lookup cannot miss.
        if let Ok(spec) = view.spec(name) {
            out.push(entry(path, spec));
        } else if let Ok(child) = view.child(name) {
            collect(child, &path, out);
        }
    }
}

fn entry(path: String, spec: &Spec) -> SpecEntry {
    let value = match spec.kind() {
        SpecKind::Object(value) => format_value(value),
        SpecKind::Deferred { label, .. } => format!("<{label}>"),
        SpecKind::GlobalInput(_) | SpecKind::LocalInput(_) | SpecKind::Config(_) => {
            format!("<{}>", spec.kind_name())
        }
    };
    SpecEntry {
        path,
        spec_id: spec.id(),
        kind: spec.kind_name(),
        value,
    }
}

/// Format a TOML value for display. Strings are shown unquoted.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(_) | Value::Table(_) => value.to_string(),
    }
}
