//! Static per-tool argument schemas: required-argument presence,
//! alias resolution, and default injection.

use serde_json::Value;
use std::collections::BTreeMap;

/// A static schema for one tool's arguments.
#[derive(Debug, Clone, Default)]
pub struct ArgSchema {
    /// Argument names that must be present after alias resolution and
    /// default injection.
    pub required: Vec<String>,
    /// Alias name to canonical name, e.g. `language -> runtime`.
    pub aliases: BTreeMap<String, String>,
    /// Default values injected for arguments absent after alias
    /// resolution.
    pub defaults: BTreeMap<String, Value>,
}

/// The result of running a schema over a tool call's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Arguments are acceptable, already normalized.
    Ok,
    /// Arguments cannot be repaired; the call should be skipped and
    /// treated as a `syntax`-classified failure.
    Unfixable {
        /// Which required arguments remain missing.
        missing: Vec<String>,
    },
}

impl ArgSchema {
    /// Resolves aliases and injects defaults in place, then reports
    /// whether the result satisfies `required`.
    pub fn normalize(&self, args: &mut Value) -> ValidationResult {
        let Value::Object(map) = args else {
            return ValidationResult::Unfixable {
                missing: self.required.clone(),
            };
        };

        for (alias, canonical) in &self.aliases {
            if let Some(v) = map.remove(alias) {
                map.entry(canonical.clone()).or_insert(v);
            }
        }

        for (name, default) in &self.defaults {
            map.entry(name.clone()).or_insert_with(|| default.clone());
        }

        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !map.contains_key(name.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            ValidationResult::Ok
        } else {
            ValidationResult::Unfixable { missing }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn runtime_schema() -> ArgSchema {
        let mut aliases = BTreeMap::new();
        aliases.insert("language".to_string(), "runtime".to_string());
        let mut defaults = BTreeMap::new();
        defaults.insert("timeout_s".to_string(), json!(30));
        ArgSchema {
            required: vec!["runtime".into(), "code".into()],
            aliases,
            defaults,
        }
    }

    #[test]
    fn alias_resolves_to_canonical_name() {
        let schema = runtime_schema();
        let mut args = json!({"language": "python", "code": "print(1)"});
        assert_eq!(schema.normalize(&mut args), ValidationResult::Ok);
        assert_eq!(args["runtime"], json!("python"));
        assert!(args.get("language").is_none());
    }

    #[test]
    fn default_is_injected_when_absent() {
        let schema = runtime_schema();
        let mut args = json!({"runtime": "python", "code": "print(1)"});
        schema.normalize(&mut args);
        assert_eq!(args["timeout_s"], json!(30));
    }

    #[test]
    fn missing_required_is_unfixable() {
        let schema = runtime_schema();
        let mut args = json!({"runtime": "python"});
        let result = schema.normalize(&mut args);
        assert_eq!(
            result,
            ValidationResult::Unfixable {
                missing: vec!["code".to_string()]
            }
        );
    }

    #[test]
    fn non_object_args_are_unfixable() {
        let schema = runtime_schema();
        let mut args = json!("not an object");
        assert!(matches!(
            schema.normalize(&mut args),
            ValidationResult::Unfixable { .. }
        ));
    }
}
