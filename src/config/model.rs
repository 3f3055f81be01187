// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// Variable that doubles as usage text when the `usage:` section is absent.
pub const USAGE_VAR_KEY: &str = "USAGE";

/// Validated workflow configuration.
///
/// Only obtainable through `WorkflowFile::try_from(RawWorkflowFile)`, so the
/// rest of the crate can rely on the checks in `validate.rs`.
#[derive(Debug, Clone)]
pub struct WorkflowFile {
    vars: BTreeMap<String, String>,
    usage: String,
    modules: Vec<ModuleConfig>,
}

impl WorkflowFile {
    pub(crate) fn new_unchecked(
        vars: BTreeMap<String, String>,
        usage: String,
        modules: Vec<ModuleConfig>,
    ) -> Self {
        Self {
            vars,
            usage,
            modules,
        }
    }

    /// Variable defaults from the `vars:` section.
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Free-form usage text shown for `modrunner -w file.yaml usage`.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Usage text to print: the `usage:` section, else the `USAGE` variable.
    pub fn usage_text(&self) -> &str {
        if !self.usage.is_empty() {
            return &self.usage;
        }
        self.vars.get(USAGE_VAR_KEY).map(String::as_str).unwrap_or("")
    }

    /// Modules in document order.
    pub fn modules(&self) -> &[ModuleConfig] {
        &self.modules
    }
}

/// Top-level workflow document as read from YAML.
///
/// ```yaml
/// vars:
///   DOMAIN: example.com
/// usage: "modrunner -w recon.yaml DOMAIN=target.com"
/// modules:
///   - name: subdomains
///     cmds:
///       - subfinder -d {{DOMAIN}} -o subs.txt
///     silent: true
///     parallel: true
///     ctrlc:
///       - docker rm -f recon
/// ```
///
/// All sections are optional at the serde level; `validate.rs` enforces that
/// at least one module exists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWorkflowFile {
    /// Default variable bindings. Scalar values (numbers, booleans) are
    /// accepted and stored as their text form.
    #[serde(default, deserialize_with = "scalar_map")]
    pub vars: BTreeMap<String, String>,

    #[serde(default)]
    pub usage: String,

    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// One entry of `modules:`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleConfig {
    pub name: String,

    /// Shell command templates, run strictly in order.
    #[serde(rename = "cmds", default)]
    pub commands: Vec<String>,

    /// Discard stdout/stderr of the module's commands.
    #[serde(default)]
    pub silent: bool,

    /// Launch alongside the following modules instead of blocking the walk.
    #[serde(rename = "parallel", default)]
    pub run_concurrently: bool,

    /// Commands to run if the process is interrupted while this module is
    /// active.
    #[serde(rename = "ctrlc", default)]
    pub cleanup_actions: Vec<String>,
}

fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    let mut out = BTreeMap::new();

    for (key, value) in raw.unwrap_or_default() {
        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "variable '{key}' must be a scalar, got {other:?}"
                )));
            }
        };
        out.insert(key, text);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_keys_map_to_rust_fields() {
        let yaml = r#"
modules:
  - name: scan
    cmds: ["echo a", "echo b"]
    parallel: true
    ctrlc: ["echo stop"]
"#;
        let raw: RawWorkflowFile = serde_yaml::from_str(yaml).unwrap();
        let module = &raw.modules[0];

        assert_eq!(module.name, "scan");
        assert_eq!(module.commands, vec!["echo a", "echo b"]);
        assert!(module.run_concurrently);
        assert!(!module.silent);
        assert_eq!(module.cleanup_actions, vec!["echo stop"]);
    }

    #[test]
    fn scalar_vars_are_stringified() {
        let yaml = r#"
vars:
  THREADS: 10
  VERBOSE: true
  DOMAIN: example.com
  EMPTY:
"#;
        let raw: RawWorkflowFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(raw.vars["THREADS"], "10");
        assert_eq!(raw.vars["VERBOSE"], "true");
        assert_eq!(raw.vars["DOMAIN"], "example.com");
        assert_eq!(raw.vars["EMPTY"], "");
    }

    #[test]
    fn usage_text_falls_back_to_usage_var() {
        let vars = BTreeMap::from([(USAGE_VAR_KEY.to_string(), "from var".to_string())]);
        let wf = WorkflowFile::new_unchecked(vars.clone(), String::new(), Vec::new());
        assert_eq!(wf.usage_text(), "from var");

        let wf = WorkflowFile::new_unchecked(vars, "from section".to_string(), Vec::new());
        assert_eq!(wf.usage_text(), "from section");
    }

    #[test]
    fn nested_var_values_are_rejected() {
        let yaml = "vars:\n  LIST: [1, 2]\n";
        assert!(serde_yaml::from_str::<RawWorkflowFile>(yaml).is_err());
    }
}
