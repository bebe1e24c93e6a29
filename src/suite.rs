//! Check suite loading.
//!
//! A check suite is a YAML list whose entries are either an inventory of
//! named host groups or a check that applies a list of properties to one
//! group:
//!
//! ```yaml
//! - inventory:
//!     raspi: [heimbot.fritz.box]
//! - hosts: raspi
//!   properties:
//!     - name: Checking SSH
//!       ssh: { port: 22, version: 2.0, software: "OpenSSH.*" }
//! ```
//!
//! Every property is validated against the module registry while loading, so
//! a suite that loads successfully never fails with an invalid argument at run
//! time.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::checks::{validate, Checker, ModuleRegistry, Params, ProtocolTag};
use crate::error::{CheckError, SuiteError, SuiteResult};
use crate::types::{Endpoint, Port};

/// Named host groups.
pub type Inventory = BTreeMap<String, Vec<String>>;

/// One property: a named module invocation with its parameters.
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub name: String,
    pub module: String,
    pub protocol: ProtocolTag,
    pub port: Port,
    pub params: Params,
}

impl Property {
    /// Where this property is checked on `host`.
    pub fn endpoint(&self, host: &str) -> Endpoint {
        Endpoint::new(host, self.port)
    }

    /// Build the configured checker through `registry`.
    pub fn checker(&self, registry: &ModuleRegistry) -> SuiteResult<Box<dyn Checker>> {
        let entry = registry
            .get(&self.module)
            .ok_or_else(|| SuiteError::UnknownModule {
                property: self.name.clone(),
                module: self.module.clone(),
            })?;
        entry.build(&self.params).map_err(|source| SuiteError::InvalidProperty {
            property: self.name.clone(),
            source,
        })
    }
}

/// A list of properties applied to every host of one inventory group.
#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub hosts: String,
    pub properties: Vec<Property>,
}

/// A fully validated check suite.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckSuite {
    pub inventory: Inventory,
    pub checks: Vec<Check>,
}

impl CheckSuite {
    /// Parse and validate a suite from YAML text.
    pub fn parse(yaml: &str, registry: &ModuleRegistry) -> SuiteResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let document: Value = serde_yaml::from_str(yaml)?;
        let entries = match document {
            Value::Sequence(entries) => entries,
            Value::Null => Vec::new(),
            _ => return Err(SuiteError::UnknownEntry { index: 0 }),
        };

        let mut inventory = Inventory::new();
        let mut pending = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            let map = entry
                .as_mapping()
                .ok_or(SuiteError::UnknownEntry { index })?;

            if let Some(groups) = map.get("inventory") {
                parse_inventory(groups, index, &mut inventory)?;
            } else if let (Some(hosts), Some(properties)) = (map.get("hosts"), map.get("properties"))
            {
                let hosts = hosts
                    .as_str()
                    .ok_or(SuiteError::UnknownEntry { index })?
                    .to_string();
                pending.push((hosts, properties));
            } else {
                return Err(SuiteError::UnknownEntry { index });
            }
        }
        debug!(groups = inventory.len(), "Found inventory");

        let mut checks = Vec::with_capacity(pending.len());
        for (hosts, properties) in pending {
            if !inventory.contains_key(&hosts) {
                return Err(SuiteError::UnknownInventory(hosts));
            }

            let properties = properties
                .as_sequence()
                .ok_or_else(|| SuiteError::MalformedProperty {
                    property: hosts.clone(),
                    reason: "properties must be a list".to_string(),
                })?
                .iter()
                .enumerate()
                .map(|(index, value)| parse_property(value, index, registry))
                .collect::<SuiteResult<Vec<_>>>()?;

            debug!(hosts = %hosts, properties = properties.len(), "Created check");
            checks.push(Check { hosts, properties });
        }

        let suite = Self { inventory, checks };
        info!(
            groups = suite.inventory.len(),
            checks = suite.checks.len(),
            jobs = suite.job_count(),
            "Loaded check suite"
        );
        Ok(suite)
    }

    /// Read, parse and validate a suite file.
    pub fn from_file(path: impl AsRef<Path>, registry: &ModuleRegistry) -> SuiteResult<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| SuiteError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Reading check suite");
        Self::parse(&yaml, registry)
    }

    /// Hosts a check runs against.
    pub fn hosts(&self, check: &Check) -> &[String] {
        self.inventory
            .get(&check.hosts)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of (property, host) pairs in the suite.
    pub fn job_count(&self) -> usize {
        self.checks
            .iter()
            .map(|check| check.properties.len() * self.hosts(check).len())
            .sum()
    }
}

fn parse_inventory(groups: &Value, index: usize, inventory: &mut Inventory) -> SuiteResult<()> {
    let groups = groups
        .as_mapping()
        .ok_or(SuiteError::UnknownEntry { index })?;

    for (name, hosts) in groups {
        let name = scalar(name).ok_or(SuiteError::UnknownEntry { index })?;
        let hosts = match hosts {
            Value::Sequence(hosts) => hosts
                .iter()
                .map(|h| scalar(h).ok_or(SuiteError::UnknownEntry { index }))
                .collect::<SuiteResult<Vec<_>>>()?,
            Value::Null => Vec::new(),
            other => vec![scalar(other).ok_or(SuiteError::UnknownEntry { index })?],
        };
        debug!(group = %name, ?hosts, "Inventory group");
        inventory.entry(name).or_default().extend(hosts);
    }
    Ok(())
}

fn parse_property(value: &Value, index: usize, registry: &ModuleRegistry) -> SuiteResult<Property> {
    let map = value.as_mapping().ok_or_else(|| SuiteError::MalformedProperty {
        property: format!("#{}", index + 1),
        reason: "property must be a mapping".to_string(),
    })?;

    let name = map
        .get("name")
        .and_then(scalar)
        .ok_or_else(|| SuiteError::MalformedProperty {
            property: format!("#{}", index + 1),
            reason: "missing 'name'".to_string(),
        })?;

    let mut modules = map.iter().filter(|(key, _)| key.as_str() != Some("name"));
    let (module, params) = match (modules.next(), modules.next()) {
        (Some(first), None) => first,
        (None, _) => {
            return Err(SuiteError::MalformedProperty {
                property: name,
                reason: "no module given".to_string(),
            })
        }
        (Some(_), Some(_)) => {
            return Err(SuiteError::MalformedProperty {
                property: name,
                reason: "more than one module given".to_string(),
            })
        }
    };

    let module = scalar(module).ok_or_else(|| SuiteError::MalformedProperty {
        property: name.clone(),
        reason: "module name must be a string".to_string(),
    })?;
    let params = parse_params(params, &name)?;

    let entry = registry
        .get(&module)
        .ok_or_else(|| SuiteError::UnknownModule {
            property: name.clone(),
            module: module.clone(),
        })?;

    let invalid = |source: CheckError| SuiteError::InvalidProperty {
        property: name.clone(),
        source,
    };
    debug!(property = %name, %module, params = params.len(), "Validating property");
    entry.validate(&params).map_err(invalid)?;
    let port = validate::port_param(&params).map_err(invalid)?;

    Ok(Property {
        protocol: entry.protocol,
        name,
        module,
        port,
        params,
    })
}

fn parse_params(value: &Value, property: &str) -> SuiteResult<Params> {
    let map: &Mapping = match value {
        Value::Mapping(map) => map,
        Value::Null => return Ok(Params::new()),
        _ => {
            return Err(SuiteError::MalformedProperty {
                property: property.to_string(),
                reason: "module parameters must be a mapping".to_string(),
            })
        }
    };

    let mut params = Params::new();
    for (key, value) in map {
        let (Some(key), Some(value)) = (scalar(key), scalar(value)) else {
            return Err(SuiteError::MalformedProperty {
                property: property.to_string(),
                reason: format!("parameter {:?} must be a scalar", key),
            });
        };
        params.insert(key, value);
    }
    Ok(params)
}

/// Render a YAML scalar as the string a module sees.
///
/// Integral floats keep their decimal point so `version: 2.0` stays `"2.0"`.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.is_finite() && f.fract() == 0.0 {
                        format!("{:.1}", f)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        Value::Tagged(tagged) => scalar(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUITE: &str = r#"
- inventory:
    raspi:
      - heimbot.fritz.box
    web: [10.0.0.1, 10.0.0.2]
- hosts: raspi
  properties:
    - name: Checking SSH
      ssh:
        port: 22
        software: OpenSSH.*
        version: 2.0
- hosts: web
  properties:
    - name: HTTP
      http: { port: 80, verb: GET, uri: /, response_code: 200 }
    - name: Port open
      connect_tcp: { port: 443 }
"#;

    #[test]
    fn test_load_suite() {
        let suite = CheckSuite::parse(SUITE, &ModuleRegistry::builtin()).unwrap();
        assert_eq!(suite.inventory["raspi"], vec!["heimbot.fritz.box"]);
        assert_eq!(suite.checks.len(), 2);
        assert_eq!(suite.job_count(), 1 + 2 * 2);

        let ssh = &suite.checks[0].properties[0];
        assert_eq!(ssh.module, "ssh");
        assert_eq!(ssh.protocol, ProtocolTag::TextTcp);
        assert_eq!(ssh.port.as_u16(), 22);
        assert_eq!(ssh.params.get("version"), Some("2.0"));
        assert_eq!(ssh.endpoint("heimbot.fritz.box").to_string(), "heimbot.fritz.box/22");
    }

    #[test]
    fn test_scalar_normalization() {
        assert_eq!(scalar(&Value::from(2.0)), Some("2.0".to_string()));
        assert_eq!(scalar(&Value::from(1.5)), Some("1.5".to_string()));
        assert_eq!(scalar(&Value::from(22)), Some("22".to_string()));
        assert_eq!(scalar(&Value::from(true)), Some("true".to_string()));
        assert_eq!(scalar(&Value::Null), None);
    }

    #[test]
    fn test_unknown_module() {
        let yaml = "- inventory: { all: [a] }\n- hosts: all\n  properties:\n    - name: T\n      telnet: { port: 23 }\n";
        let err = CheckSuite::parse(yaml, &ModuleRegistry::builtin()).unwrap_err();
        assert!(matches!(err, SuiteError::UnknownModule { ref module, .. } if module == "telnet"));
    }

    #[test]
    fn test_unknown_inventory() {
        let yaml = "- hosts: nowhere\n  properties: []\n";
        let err = CheckSuite::parse(yaml, &ModuleRegistry::builtin()).unwrap_err();
        assert!(matches!(err, SuiteError::UnknownInventory(ref g) if g == "nowhere"));
    }

    #[test]
    fn test_invalid_argument_at_load() {
        let yaml = "- inventory: { all: [a] }\n- hosts: all\n  properties:\n    - name: FTP\n      ftp: { port: 70000, response_code: 220 }\n";
        let err = CheckSuite::parse(yaml, &ModuleRegistry::builtin()).unwrap_err();
        match err {
            SuiteError::InvalidProperty { property, source } => {
                assert_eq!(property, "FTP");
                assert_eq!(source.argument(), Some("port"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_property_needs_exactly_one_module() {
        let yaml = "- inventory: { all: [a] }\n- hosts: all\n  properties:\n    - name: Two\n      ftp: { port: 21, response_code: 220 }\n      raw_tcp: { port: 21 }\n";
        let err = CheckSuite::parse(yaml, &ModuleRegistry::builtin()).unwrap_err();
        assert!(matches!(err, SuiteError::MalformedProperty { .. }));

        let yaml = "- inventory: { all: [a] }\n- hosts: all\n  properties:\n    - name: None\n";
        let err = CheckSuite::parse(yaml, &ModuleRegistry::builtin()).unwrap_err();
        assert!(matches!(err, SuiteError::MalformedProperty { .. }));
    }

    #[test]
    fn test_inventory_after_checks() {
        let yaml = "- hosts: all\n  properties:\n    - name: Raw\n      raw_tcp: { port: 3306 }\n- inventory: { all: [db] }\n";
        let suite = CheckSuite::parse(yaml, &ModuleRegistry::builtin()).unwrap();
        assert_eq!(suite.hosts(&suite.checks[0]), ["db".to_string()]);
    }

    #[test]
    fn test_entry_shape() {
        let err = CheckSuite::parse("- 42\n", &ModuleRegistry::builtin()).unwrap_err();
        assert!(matches!(err, SuiteError::UnknownEntry { index: 0 }));
        assert!(CheckSuite::parse("", &ModuleRegistry::builtin()).unwrap().checks.is_empty());
    }
}
