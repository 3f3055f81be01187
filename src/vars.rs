// src/vars.rs

//! Variable bindings and `{{KEY}}` placeholder rendering.
//!
//! Bindings are assembled once at startup:
//! 1. `vars:` defaults from the workflow file,
//! 2. overridden by `KEY=VALUE` tokens from the command line,
//! 3. plus the reserved `YamlName` key bound to the workflow path (unless the
//!    user bound it explicitly).
//!
//! After that they are read-only and shared between all modules.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

/// Placeholder bound to the path of the workflow file being run.
pub const WORKFLOW_PATH_KEY: &str = "YamlName";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder regex is valid"));

/// Result of interpreting the trailing CLI tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarTokens {
    /// A literal `usage` / `USAGE` token was present.
    UsageRequested,
    /// `KEY=VALUE` overrides, in order of appearance (later wins).
    Overrides(BTreeMap<String, String>),
}

/// Interpret the trailing CLI tokens.
///
/// A `usage` token short-circuits everything else. Tokens without `=` are
/// ignored with a warning; the value may itself contain `=`.
pub fn parse_var_tokens<S: AsRef<str>>(tokens: &[S]) -> VarTokens {
    let mut overrides = BTreeMap::new();

    for token in tokens {
        let token = token.as_ref();
        if token == "usage" || token == "USAGE" {
            return VarTokens::UsageRequested;
        }

        match token.split_once('=') {
            Some((key, value)) => {
                overrides.insert(key.to_string(), value.to_string());
            }
            None => warn!(token, "ignoring argument without `=`"),
        }
    }

    VarTokens::Overrides(overrides)
}

/// Resolved, read-only variable bindings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, String>,
}

impl Bindings {
    /// Merge `defaults` with `overrides` (overrides win) and bind
    /// [`WORKFLOW_PATH_KEY`] to `workflow_path`.
    pub fn resolve(
        defaults: &BTreeMap<String, String>,
        overrides: BTreeMap<String, String>,
        workflow_path: &Path,
    ) -> Self {
        let mut values = defaults.clone();
        values.extend(overrides);
        values
            .entry(WORKFLOW_PATH_KEY.to_string())
            .or_insert_with(|| workflow_path.display().to_string());

        Self { values }
    }

    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every `{{KEY}}` with its bound value.
    ///
    /// Unbound placeholders are left untouched so that the shell (or the
    /// user, in the output) can see what was missing.
    pub fn render<'a>(&self, template: &'a str) -> Cow<'a, str> {
        PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            match self.values.get(key) {
                Some(value) => value.clone(),
                None => {
                    debug!(placeholder = key, "no binding for placeholder; leaving as-is");
                    caps[0].to_string()
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("NAME".to_string(), "default-name".to_string()),
            ("OUT".to_string(), "out.txt".to_string()),
        ])
    }

    #[test]
    fn override_wins_over_default() {
        let overrides = match parse_var_tokens(&["NAME=cli"]) {
            VarTokens::Overrides(o) => o,
            other => panic!("unexpected {other:?}"),
        };
        let b = Bindings::resolve(&defaults(), overrides, Path::new("wf.yaml"));

        assert_eq!(b.render("echo {{NAME}} > {{OUT}}"), "echo cli > out.txt");
    }

    #[test]
    fn default_used_without_override() {
        let b = Bindings::resolve(&defaults(), BTreeMap::new(), Path::new("wf.yaml"));
        assert_eq!(b.render("hello {{NAME}}"), "hello default-name");
    }

    #[test]
    fn workflow_path_placeholder_is_bound() {
        let b = Bindings::resolve(&defaults(), BTreeMap::new(), Path::new("flows/recon.yaml"));
        assert_eq!(b.render("cat {{YamlName}}"), "cat flows/recon.yaml");
    }

    #[test]
    fn explicit_yaml_name_binding_is_kept() {
        let overrides = BTreeMap::from([(WORKFLOW_PATH_KEY.to_string(), "x".to_string())]);
        let b = Bindings::resolve(&defaults(), overrides, Path::new("wf.yaml"));
        assert_eq!(b.get(WORKFLOW_PATH_KEY), Some("x"));
    }

    #[test]
    fn unknown_placeholder_is_left_intact() {
        let b = Bindings::default();
        assert_eq!(b.render("echo {{MISSING}} {{ }}"), "echo {{MISSING}} {{ }}");
    }

    #[test]
    fn usage_token_short_circuits() {
        assert_eq!(parse_var_tokens(&["A=1", "USAGE", "B=2"]), VarTokens::UsageRequested);
        assert_eq!(parse_var_tokens(&["usage"]), VarTokens::UsageRequested);
    }

    #[test]
    fn value_may_contain_equals_and_bare_tokens_are_skipped() {
        let VarTokens::Overrides(o) = parse_var_tokens(&["Q=a=b", "bare"]) else {
            panic!("expected overrides");
        };
        assert_eq!(o.len(), 1);
        assert_eq!(o["Q"], "a=b");
    }
}
