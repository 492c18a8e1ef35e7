//! Device cgroup rules (`<type> <major>:<minor> <permissions>`).

use crate::error::{RenderError, RenderResult};
use std::collections::BTreeMap;

/// Device class a rule applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeviceType {
    All,
    Block,
    Char,
}

impl DeviceType {
    fn parse(field: &str) -> Option<Self> {
        match field {
            "a" => Some(Self::All),
            "b" => Some(Self::Block),
            "c" => Some(Self::Char),
            _ => None,
        }
    }

    fn as_char(&self) -> char {
        match self {
            Self::All => 'a',
            Self::Block => 'b',
            Self::Char => 'c',
        }
    }
}

/// A parsed rule. Identity is type plus major:minor; permissions are not part of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceCgroupRule {
    pub device_type: DeviceType,
    pub major: Option<u32>,
    pub minor: Option<u32>,
    pub read: bool,
    pub write: bool,
    pub mknod: bool,
}

impl DeviceCgroupRule {
    /// Parse `"c 13:* rwm"`. Fields must be separated by single spaces.
    pub fn parse(rule: &str) -> Result<Self, String> {
        let fields: Vec<&str> = rule.split(' ').collect();
        let [device_type, numbers, permissions] = fields.as_slice() else {
            return Err(format!(
                "rule [{rule}] must have the form [<a|b|c> <major|*>:<minor|*> <rwm>]"
            ));
        };

        let device_type = DeviceType::parse(device_type)
            .ok_or_else(|| format!("device type [{device_type}] must be one of [a, b, c]"))?;

        let (major, minor) = numbers
            .split_once(':')
            .ok_or_else(|| format!("device numbers [{numbers}] must be <major>:<minor>"))?;
        let major = parse_device_number(major)?;
        let minor = parse_device_number(minor)?;

        let (mut read, mut write, mut mknod) = (false, false, false);
        if permissions.is_empty() || permissions.len() > 3 {
            return Err(format!("permissions [{permissions}] must be 1-3 of [r, w, m]"));
        }
        for flag in permissions.chars() {
            let seen = match flag {
                'r' => std::mem::replace(&mut read, true),
                'w' => std::mem::replace(&mut write, true),
                'm' => std::mem::replace(&mut mknod, true),
                other => return Err(format!("permission [{other}] must be one of [r, w, m]")),
            };
            if seen {
                return Err(format!("permission [{flag}] repeated in [{permissions}]"));
            }
        }

        Ok(Self {
            device_type,
            major,
            minor,
            read,
            write,
            mknod,
        })
    }

    fn identity(&self) -> String {
        format!("{} {}", self.device_type.as_char(), self.numbers())
    }

    fn numbers(&self) -> String {
        let show = |n: Option<u32>| n.map_or_else(|| "*".to_string(), |n| n.to_string());
        format!("{}:{}", show(self.major), show(self.minor))
    }

    /// Normalized form, permissions always in `rwm` order.
    pub fn render(&self) -> String {
        let mut permissions = String::with_capacity(3);
        for (set, flag) in [(self.read, 'r'), (self.write, 'w'), (self.mknod, 'm')] {
            if set {
                permissions.push(flag);
            }
        }
        format!("{} {}", self.identity(), permissions)
    }
}

fn parse_device_number(field: &str) -> Result<Option<u32>, String> {
    if field == "*" {
        return Ok(None);
    }
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("device number [{field}] must be a number or [*]"));
    }
    field
        .parse::<u32>()
        .map(Some)
        .map_err(|e| format!("device number [{field}]: {e}"))
}

#[derive(Debug, Clone)]
pub struct DeviceCgroupRules {
    container: String,
    rules: BTreeMap<String, DeviceCgroupRule>,
}

impl DeviceCgroupRules {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            rules: BTreeMap::new(),
        }
    }

    pub fn add_rule(&mut self, rule: &str) -> RenderResult<()> {
        let parsed = DeviceCgroupRule::parse(rule)
            .map_err(|reason| RenderError::invalid("device cgroup rule", &self.container, reason))?;
        let identity = parsed.identity();
        if self.rules.contains_key(&identity) {
            return Err(RenderError::duplicate(
                "device cgroup rule",
                &self.container,
                identity,
            ));
        }
        self.rules.insert(identity, parsed);
        Ok(())
    }

    pub(crate) fn render(&self) -> Vec<String> {
        let mut rendered: Vec<String> = self.rules.values().map(DeviceCgroupRule::render).collect();
        rendered.sort();
        rendered
    }
}
