//! Explicit dispatch table from module names to constructors.

use std::collections::BTreeMap;

use crate::checks::{
    CheckModule, Checker, ConnectTcpChecker, DnsUdpChecker, FtpChecker, HttpChecker,
    HttpsChecker, MysqlChecker, Params, ProtocolTag, RawTcpChecker, SmtpChecker, SshChecker,
};
use crate::error::CheckResult;

type ValidateFn = fn(&Params) -> CheckResult<()>;
type BuildFn = fn(&Params) -> CheckResult<Box<dyn Checker>>;

/// Type-erased handle on one [`CheckModule`].
#[derive(Clone, Copy)]
pub struct ModuleEntry {
    pub name: &'static str,
    pub protocol: ProtocolTag,
    validate: ValidateFn,
    build: BuildFn,
}

impl ModuleEntry {
    /// Create the entry for module `M`.
    pub fn of<M: CheckModule>() -> Self {
        Self {
            name: M::NAME,
            protocol: M::PROTOCOL,
            validate: validate_only::<M>,
            build: build_boxed::<M>,
        }
    }

    /// Validate parameters without building a checker.
    pub fn validate(&self, params: &Params) -> CheckResult<()> {
        (self.validate)(params)
    }

    /// Validate parameters and build the checker.
    pub fn build(&self, params: &Params) -> CheckResult<Box<dyn Checker>> {
        (self.build)(params)
    }
}

impl std::fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("protocol", &self.protocol)
            .finish()
    }
}

fn validate_only<M: CheckModule>(params: &Params) -> CheckResult<()> {
    M::validate_config(params).map(|_| ())
}

fn build_boxed<M: CheckModule>(params: &Params) -> CheckResult<Box<dyn Checker>> {
    let config = M::validate_config(params)?;
    Ok(Box::new(M::construct(config)))
}

/// Set of modules available to check suites.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<&'static str, ModuleEntry>,
}

impl ModuleRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in module.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<ConnectTcpChecker>();
        registry.register::<RawTcpChecker>();
        registry.register::<FtpChecker>();
        registry.register::<SmtpChecker>();
        registry.register::<SshChecker>();
        registry.register::<HttpChecker>();
        registry.register::<HttpsChecker>();
        registry.register::<DnsUdpChecker>();
        registry.register::<MysqlChecker>();
        registry
    }

    /// Add module `M`, replacing any module of the same name.
    pub fn register<M: CheckModule>(&mut self) {
        self.modules.insert(M::NAME, ModuleEntry::of::<M>());
    }

    pub fn get(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.get(name)
    }

    /// Module names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.modules.values()
    }

    /// Modules whose checkers travel over `protocol`.
    pub fn for_protocol(&self, protocol: ProtocolTag) -> impl Iterator<Item = &ModuleEntry> {
        self.modules.values().filter(move |m| m.protocol == protocol)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
