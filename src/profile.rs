//! # Build Profiles
//!
//! A profile is a YAML document describing what to build:
//!
//! ```yaml
//! metadata:
//!   name: web
//!   description: Front-end web server
//! components:
//!   - application: nginx
//!     version: 1.0.5
//!     paths:
//!       prefix: /opt/nginx
//!     modules: [http, http-ssl]
//! ```
//!
//! Parsing validates everything up front: the metadata first, then each
//! component in the order listed, stopping at the first problem. Components
//! are validated by their application (see [`Application::validate`]), so
//! once a [`Profile`] exists every spec in it is buildable as far as static
//! data can tell.
//!
//! Parsing is pure; it never touches the host.

use std::fmt;
use std::path::Path;

use log::{debug, warn};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::apps::COMPONENT_KEYS;
use crate::component::ComponentSpec;
use crate::error::{Result, ValidationError};
use crate::registry::{Application, ApplicationRegistry};

const PROFILE_KEYS: &[&str] = &["metadata", "components"];
const METADATA_KEYS: &[&str] = &["name", "description"];

/// Options controlling how strictly a profile is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Reject unrecognized keys instead of warning about them
    pub strict: bool,
}

/// A validated build profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    name: String,
    description: String,
    components: Vec<ComponentSpec>,
}

impl Profile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Components in build order. Never empty.
    pub fn components(&self) -> &[ComponentSpec] {
        &self.components
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Profile: {}", self.name)?;
        writeln!(f, "Description: {}", self.description)?;
        write!(f, "Components: {}", self.components.len())?;
        for (index, component) in self.components.iter().enumerate() {
            write!(f, "\n\n[#{}]", index)?;
            for line in component.to_string().lines() {
                write!(f, "\n  {}", line)?;
            }
        }
        Ok(())
    }
}

/// Read a profile from a YAML file.
pub fn from_file(
    path: &Path,
    registry: &ApplicationRegistry,
    options: &ParseOptions,
) -> Result<Profile> {
    debug!("Loading profile from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    from_str(&content, registry, options)
}

/// Read a profile from YAML text.
pub fn from_str(
    yaml: &str,
    registry: &ApplicationRegistry,
    options: &ParseOptions,
) -> Result<Profile> {
    let raw: Value = serde_yaml::from_str(yaml)?;
    Ok(parse(&raw, registry, options)?)
}

/// Validate a raw profile tree.
pub fn parse(
    raw: &Value,
    registry: &ApplicationRegistry,
    options: &ParseOptions,
) -> std::result::Result<Profile, ValidationError> {
    let Value::Mapping(root) = raw else {
        return Err(ValidationError::MissingMetadata {
            key: "metadata".to_string(),
        });
    };
    check_keys(root, PROFILE_KEYS, "profile", options)?;

    let Some(Value::Mapping(metadata)) = root.get("metadata") else {
        return Err(ValidationError::MissingMetadata {
            key: "metadata".to_string(),
        });
    };
    check_keys(metadata, METADATA_KEYS, "metadata", options)?;
    let name = metadata_text(metadata, "name")?;
    let description = metadata_text(metadata, "description")?;

    let entries = match root.get("components") {
        Some(Value::Sequence(entries)) if !entries.is_empty() => entries,
        _ => return Err(ValidationError::NoComponents),
    };

    let components = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_component(index, entry, registry, options))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Profile {
        name,
        description,
        components,
    })
}

fn parse_component(
    index: usize,
    raw: &Value,
    registry: &ApplicationRegistry,
    options: &ParseOptions,
) -> std::result::Result<ComponentSpec, ValidationError> {
    let Value::Mapping(entry) = raw else {
        return Err(ValidationError::InvalidField {
            index,
            field: "component".to_string(),
            message: format!("expected a mapping, found {}", describe(raw)),
        });
    };
    check_keys(entry, COMPONENT_KEYS, &format!("component #{}", index), options)?;

    let id = raw
        .get("application")
        .and_then(scalar_text)
        .ok_or_else(|| ValidationError::MissingField {
            index,
            field: "application".to_string(),
        })?;
    let app: &dyn Application =
        registry
            .get(&id)
            .ok_or_else(|| ValidationError::UnknownApplication {
                index,
                application: id.clone(),
                known: registry.ids(),
            })?;

    let spec = app.validate(index, raw, options)?;
    debug!("Validated component #{}: {}", index, spec.label());
    Ok(spec)
}

fn metadata_text(metadata: &Mapping, key: &str) -> std::result::Result<String, ValidationError> {
    metadata
        .get(key)
        .and_then(scalar_text)
        .ok_or_else(|| ValidationError::MissingMetadata {
            key: key.to_string(),
        })
}

/// Warn about, or in strict mode reject, keys outside `known`.
pub(crate) fn check_keys(
    map: &Mapping,
    known: &[&str],
    location: &str,
    options: &ParseOptions,
) -> std::result::Result<(), ValidationError> {
    for key in map.keys() {
        let name = key.as_str().map_or_else(|| describe(key), str::to_string);
        if known.contains(&name.as_str()) {
            continue;
        }
        if options.strict {
            return Err(ValidationError::UnrecognizedKey {
                location: location.to_string(),
                key: name,
            });
        }
        warn!("Ignoring unrecognized key '{}' in {}", name, location);
    }
    Ok(())
}

/// The text of a scalar value. Numbers and booleans are read as written, so
/// an unquoted `version: 1.0` still compares as text.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Short description of a value for error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(_) => "a list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(tagged) => format!("a value tagged {}", tagged.tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn registry() -> ApplicationRegistry {
        ApplicationRegistry::builtin().unwrap()
    }

    fn parse_yaml(yaml: &str) -> std::result::Result<Profile, ValidationError> {
        parse_with(yaml, ParseOptions::default())
    }

    fn parse_with(
        yaml: &str,
        options: ParseOptions,
    ) -> std::result::Result<Profile, ValidationError> {
        let raw: Value = serde_yaml::from_str(yaml).unwrap();
        parse(&raw, &registry(), &options)
    }

    const VALID: &str = r#"
metadata:
  name: web
  description: Front-end web server
components:
  - application: nginx
    version: 1.0.5
    paths:
      prefix: /opt/nginx
    modules: [http, http-ssl]
  - application: nginx
    version: 0.8.55
    paths:
      prefix: /opt/nginx-old
"#;

    #[test]
    fn test_parse_valid_profile() {
        let profile = parse_yaml(VALID).unwrap();
        assert_eq!(profile.name(), "web");
        assert_eq!(profile.description(), "Front-end web server");
        assert_eq!(profile.components().len(), 2);
        assert_eq!(profile.components()[0].version(), "1.0.5");
        assert_eq!(profile.components()[1].version(), "0.8.55");
        assert!(profile.components()[1].modules().is_empty());
    }

    #[test]
    fn test_components_own_their_containers() {
        let profile = parse_yaml(VALID).unwrap();
        let [first, second] = profile.components() else {
            panic!("expected two components");
        };
        assert_ne!(first.prefix(), second.prefix());
        assert_ne!(first.dependencies(), second.dependencies());
        assert_eq!(
            second.path("conf"),
            Some(Path::new("/opt/nginx-old/etc/nginx.conf"))
        );
    }

    #[test]
    fn test_missing_metadata_block() {
        let err = parse_yaml("components: []").unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingMetadata {
                key: "metadata".to_string()
            }
        );
    }

    #[test]
    fn test_missing_metadata_key_checked_before_components() {
        // The component is invalid too, but metadata is validated first.
        let err = parse_yaml(
            "metadata: {name: web}\ncomponents: [{application: apache, version: 2.4}]",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingMetadata {
                key: "description".to_string()
            }
        );
    }

    #[test]
    fn test_empty_components() {
        for yaml in [
            "metadata: {name: a, description: b}",
            "metadata: {name: a, description: b}\ncomponents: []",
        ] {
            assert_eq!(parse_yaml(yaml).unwrap_err(), ValidationError::NoComponents);
        }
    }

    #[test]
    fn test_unknown_application_lists_known() {
        let err = parse_yaml(concat!(
            "metadata: {name: a, description: b}\n",
            "components: [{application: apache, version: '2.4'}]",
        ))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownApplication {
                index: 0,
                application: "apache".to_string(),
                known: vec!["nginx".to_string()],
            }
        );
    }

    #[test]
    fn test_first_invalid_component_wins() {
        let err = parse_yaml(
            r#"
metadata: {name: a, description: b}
components:
  - {application: nginx, version: 1.0.5, paths: {prefix: /opt/a}}
  - {application: nginx, version: 9.9.9, paths: {prefix: /opt/b}}
  - {application: apache, version: '2.4'}
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnsupportedVersion { ref version, .. } if version == "9.9.9"
        ));
    }

    #[test]
    fn test_missing_application_field() {
        let err = parse_yaml("metadata: {name: a, description: b}\ncomponents: [{version: 1.0.5}]")
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                index: 0,
                field: "application".to_string()
            }
        );
    }

    #[test]
    fn test_component_must_be_a_mapping() {
        let err =
            parse_yaml("metadata: {name: a, description: b}\ncomponents: [nginx]").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { index: 0, .. }));
    }

    #[test]
    fn test_unrecognized_keys_warned_by_default() {
        let yaml = r#"
metadata: {name: a, description: b, owner: ops}
components:
  - {application: nginx, version: 1.0.5, paths: {prefix: /opt/a}, user: www}
"#;
        assert!(parse_yaml(yaml).is_ok());
    }

    #[test]
    fn test_unrecognized_keys_rejected_in_strict_mode() {
        let yaml = r#"
metadata: {name: a, description: b}
components:
  - {application: nginx, version: 1.0.5, paths: {prefix: /opt/a}, user: www}
"#;
        let err = parse_with(yaml, ParseOptions { strict: true }).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnrecognizedKey {
                location: "component #0".to_string(),
                key: "user".to_string(),
            }
        );
    }

    #[test]
    fn test_from_str_reports_yaml_errors() {
        let err =
            from_str("metadata: [unclosed", &registry(), &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn test_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("web.yaml");
        std::fs::write(&path, VALID).unwrap();
        let profile = from_file(&path, &registry(), &ParseOptions::default()).unwrap();
        assert_eq!(profile.name(), "web");

        let missing = temp.path().join("missing.yaml");
        let err = from_file(&missing, &registry(), &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_display_summarises_components() {
        let display = parse_yaml(VALID).unwrap().to_string();
        assert!(display.contains("Profile: web"));
        assert!(display.contains("Components: 2"));
        assert!(display.contains("[#1]"));
        assert!(display.contains("Application: nginx 0.8.55"));
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&Value::from("1.0.5")), Some("1.0.5".to_string()));
        assert_eq!(scalar_text(&Value::from(2)), Some("2".to_string()));
        assert_eq!(scalar_text(&Value::Null), None);
    }

    proptest! {
        #[test]
        fn prop_default_paths_follow_prefix(
            segments in proptest::collection::vec("[a-z][a-z0-9_-]{0,8}", 1..4)
        ) {
            let prefix = format!("/{}", segments.join("/"));
            let yaml = format!(
                "metadata: {{name: a, description: b}}\ncomponents: \
                 [{{application: nginx, version: 1.0.5, paths: {{prefix: '{}'}}}}]",
                prefix
            );
            let profile = parse_yaml(&yaml).unwrap();
            let spec = &profile.components()[0];
            let expected = PathBuf::from(&prefix).join("etc/nginx.conf");
            prop_assert_eq!(spec.path("conf"), Some(expected.as_path()));
            prop_assert!(spec.paths().values().all(|p| p.is_absolute()));
        }

        #[test]
        fn prop_relative_overrides_are_rejected(relative in "[a-z][a-z0-9_/]{0,20}") {
            let yaml = format!(
                "metadata: {{name: a, description: b}}\ncomponents: \
                 [{{application: nginx, version: 1.0.5, paths: {{prefix: /opt/n, pid: '{}'}}}}]",
                relative
            );
            let is_invalid_path =
                matches!(parse_yaml(&yaml), Err(ValidationError::InvalidPath { .. }));
            prop_assert!(is_invalid_path);
        }
    }
}
