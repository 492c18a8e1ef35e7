//! `security_opt` entries.

use crate::error::{RenderError, RenderResult};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Security options the engine knows how to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecurityOptName {
    NoNewPrivileges,
    /// SELinux label, always with a sub-key (`label:type=...`).
    Label,
    Apparmor,
    Seccomp,
    Systempaths,
}

impl SecurityOptName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoNewPrivileges => "no-new-privileges",
            Self::Label => "label",
            Self::Apparmor => "apparmor",
            Self::Seccomp => "seccomp",
            Self::Systempaths => "systempaths",
        }
    }

    fn takes_sub_key(&self) -> bool {
        matches!(self, Self::Label)
    }
}

impl FromStr for SecurityOptName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no-new-privileges" => Ok(Self::NoNewPrivileges),
            "label" => Ok(Self::Label),
            "apparmor" => Ok(Self::Apparmor),
            "seccomp" => Ok(Self::Seccomp),
            "systempaths" => Ok(Self::Systempaths),
            other => Err(format!("unknown security opt [{other}]")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecurityOpts {
    container: String,
    // identity ("key" or "key:sub") -> value
    opts: BTreeMap<String, String>,
}

impl SecurityOpts {
    /// Starts with `no-new-privileges=true`.
    pub(crate) fn new(container: &str) -> Self {
        let mut opts = BTreeMap::new();
        opts.insert(
            SecurityOptName::NoNewPrivileges.as_str().to_string(),
            "true".to_string(),
        );
        Self {
            container: container.to_string(),
            opts,
        }
    }

    /// Add an option. Key, sub-key and value are passed separately;
    /// a key containing `=` or `:` is rejected.
    pub fn add_opt(
        &mut self,
        key: &str,
        value: impl ToString,
        sub_key: Option<&str>,
    ) -> RenderResult<()> {
        let identity = self.identity(key, sub_key)?;
        if self.opts.contains_key(&identity) {
            return Err(RenderError::duplicate("security opt", &self.container, identity));
        }

        let value = value.to_string();
        if value.is_empty() {
            return Err(RenderError::missing("security opt", &self.container, "value"));
        }
        self.opts.insert(identity, value);
        Ok(())
    }

    /// Remove an option, returning whether it was present.
    pub fn remove_opt(&mut self, key: &str, sub_key: Option<&str>) -> RenderResult<bool> {
        let identity = self.identity(key, sub_key)?;
        Ok(self.opts.remove(&identity).is_some())
    }

    fn identity(&self, key: &str, sub_key: Option<&str>) -> RenderResult<String> {
        check_component(&self.container, key, "opt")?;
        let name = key
            .parse::<SecurityOptName>()
            .map_err(|reason| RenderError::invalid("security opt", &self.container, reason))?;

        match (name.takes_sub_key(), sub_key) {
            (true, Some(sub)) => {
                check_component(&self.container, sub, "sub-key")?;
                Ok(format!("{key}:{sub}"))
            }
            (true, None) => Err(RenderError::missing("security opt", &self.container, "sub-key")),
            (false, Some(sub)) => Err(RenderError::invalid(
                "security opt",
                &self.container,
                format!("[{key}] does not take a sub-key, got [{sub}]"),
            )),
            (false, None) => Ok(key.to_string()),
        }
    }

    pub(crate) fn render(&self) -> Vec<String> {
        // BTreeMap iteration is already sorted by identity
        self.opts
            .iter()
            .map(|(identity, value)| format!("{identity}={value}"))
            .collect()
    }
}

fn check_component(container: &str, component: &str, field: &'static str) -> RenderResult<()> {
    if component.is_empty() {
        return Err(RenderError::missing("security opt", container, field));
    }
    if component.contains(['=', ':']) {
        return Err(RenderError::invalid(
            "security opt",
            container,
            format!(
                "{field} [{component}] must not contain [=] or [:], pass key and value separately"
            ),
        ));
    }
    Ok(())
}
