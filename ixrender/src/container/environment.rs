//! Environment variables.

use crate::error::{RenderError, RenderResult};
use crate::util::escape_dollar;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Environment {
    container: String,
    variables: BTreeMap<String, String>,
}

impl Environment {
    pub(crate) fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            variables: BTreeMap::new(),
        }
    }

    pub fn add_env(&mut self, key: &str, value: impl ToString) -> RenderResult<()> {
        if key.is_empty() {
            return Err(RenderError::missing("environment variable", &self.container, "key"));
        }
        if key.contains('=') {
            return Err(RenderError::invalid(
                "environment variable",
                &self.container,
                format!("key [{key}] must not contain [=]"),
            ));
        }
        if self.variables.contains_key(key) {
            return Err(RenderError::duplicate("environment variable", &self.container, key));
        }
        self.variables.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Add user-supplied `(name, value)` pairs with the same rules as [`add_env`](Self::add_env).
    pub fn add_user_envs<I, K, V>(&mut self, envs: I) -> RenderResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        for (key, value) in envs {
            self.add_env(key.as_ref(), value)?;
        }
        Ok(())
    }

    pub(crate) fn render(&self) -> BTreeMap<String, String> {
        self.variables
            .iter()
            .map(|(key, value)| (key.clone(), escape_dollar(value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_escaped() {
        let mut env = Environment::new("web");
        env.add_env("PASSWORD", "pa$$word").unwrap();
        env.add_env("PORT", 8080).unwrap();

        let rendered = env.render();
        assert_eq!(rendered["PASSWORD"], "pa$$$$word");
        assert_eq!(rendered["PORT"], "8080");
    }

    #[test]
    fn test_invalid_keys() {
        let mut env = Environment::new("web");
        assert!(matches!(env.add_env("", "x").unwrap_err(), RenderError::Missing { .. }));
        assert!(matches!(env.add_env("A=B", "x").unwrap_err(), RenderError::Invalid { .. }));
    }

    #[test]
    fn test_user_envs_duplicate() {
        let mut env = Environment::new("web");
        env.add_env("TZ", "Etc/UTC").unwrap();
        let err = env
            .add_user_envs([("LANG", "C.UTF-8"), ("TZ", "Europe/Athens")])
            .unwrap_err();
        assert!(matches!(err, RenderError::Duplicate { .. }));
    }
}
