//! Parameter resolution.
//!
//! Layers, lowest to highest precedence:
//!
//! 1. built-in defaults ([`ParameterSet::defaults`])
//! 2. the parameters file
//! 3. explicit overrides (command-line flags)
//! 4. interactive prompts for credentials that are still missing
//!
//! The schema name falls back to the user name.

use std::io;

use tracing::info;
use tscore_model::{ParamKey, ParameterSet, Pseudocount};

use crate::error::ParameterError;

/// Source of credentials that are missing after all other layers.
pub trait CredentialPrompt {
    fn username(&mut self) -> io::Result<String>;
    fn password(&mut self) -> io::Result<String>;
}

/// Explicit values that beat the parameters file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub connection: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub schema: Option<String>,
}

/// Builds the parameter set for one scoring run.
#[derive(Debug, Clone)]
pub struct ParameterResolver {
    params: ParameterSet,
}

impl Default for ParameterResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterResolver {
    /// Start from the built-in defaults.
    pub fn new() -> Self {
        Self::from_base(ParameterSet::defaults())
    }

    /// Start from a caller-supplied base set.
    pub fn from_base(params: ParameterSet) -> Self {
        Self { params }
    }

    /// Layer parameters file settings over the current values.
    #[must_use]
    pub fn merge_config<I, K, V>(mut self, settings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.params.merge(settings);
        self
    }

    /// Layer explicit overrides over the current values.
    #[must_use]
    pub fn apply_overrides(mut self, overrides: &Overrides) -> Self {
        let layers = [
            (ParamKey::DbConnectionName, &overrides.connection),
            (ParamKey::DbUser, &overrides.user),
            (ParamKey::DbPass, &overrides.password),
            (ParamKey::DbSchemaName, &overrides.schema),
        ];
        for (key, value) in layers {
            if let Some(value) = value {
                self.params.set(key, value.as_str());
            }
        }
        self
    }

    /// Current values, before prompting and validation.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Prompt for missing credentials, derive defaults, and validate.
    pub fn resolve(
        mut self,
        prompt: &mut dyn CredentialPrompt,
    ) -> Result<ParameterSet, ParameterError> {
        if self.params.is_unset(ParamKey::DbUser) {
            let user = prompt.username().map_err(|source| ParameterError::Prompt {
                what: "username",
                source,
            })?;
            self.params.set(ParamKey::DbUser, user.trim());
        }
        if self.params.is_unset(ParamKey::DbPass) {
            let password = prompt.password().map_err(|source| ParameterError::Prompt {
                what: "password",
                source,
            })?;
            self.params.set(ParamKey::DbPass, password);
        }
        if self.params.is_unset(ParamKey::DbSchemaName)
            && let Some(user) = self.params.text(ParamKey::DbUser)
        {
            self.params.set(ParamKey::DbSchemaName, user);
        }

        validate(&self.params)?;
        info!("Parameters:\n{}", self.params);
        Ok(self.params)
    }
}

/// Check that numeric parameters parse.
pub fn validate(params: &ParameterSet) -> Result<(), ParameterError> {
    for key in ParamKey::INTEGER_KEYS {
        params.integer(key)?;
    }
    if let Some(text) = params.text(ParamKey::Pseudocount) {
        Pseudocount::parse(&text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct ScriptedPrompt {
        user: Option<String>,
        password: Option<String>,
        asked: Vec<&'static str>,
    }

    impl CredentialPrompt for ScriptedPrompt {
        fn username(&mut self) -> io::Result<String> {
            self.asked.push("username");
            self.user
                .clone()
                .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
        }

        fn password(&mut self) -> io::Result<String> {
            self.asked.push("password");
            self.password
                .clone()
                .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
        }
    }

    #[test]
    fn test_layers_apply_in_order() {
        let overrides = Overrides {
            connection: Some("cli_conn".to_string()),
            schema: Some("cli_schema".to_string()),
            ..Overrides::default()
        };
        let mut prompt = ScriptedPrompt::default();
        let params = ParameterResolver::new()
            .merge_config([
                ("dbConnectionName", "file_conn"),
                ("dbUser", "file_user"),
                ("dbPass", "file_pass"),
                ("pseudocount", "2"),
            ])
            .apply_overrides(&overrides)
            .resolve(&mut prompt)
            .unwrap();

        assert_eq!(params.text(ParamKey::DbConnectionName).as_deref(), Some("cli_conn"));
        assert_eq!(params.text(ParamKey::DbUser).as_deref(), Some("file_user"));
        assert_eq!(params.text(ParamKey::DbSchemaName).as_deref(), Some("cli_schema"));
        assert_eq!(params.text(ParamKey::Pseudocount).as_deref(), Some("2"));
        assert!(prompt.asked.is_empty());
    }

    #[test]
    fn test_prompts_only_for_missing_credentials() {
        let mut prompt = ScriptedPrompt {
            user: Some("  scott \n".to_string()),
            password: Some("tiger".to_string()),
            ..ScriptedPrompt::default()
        };
        let params = ParameterResolver::new().resolve(&mut prompt).unwrap();
        assert_eq!(prompt.asked, vec!["username", "password"]);
        assert_eq!(params.text(ParamKey::DbUser).as_deref(), Some("scott"));
        assert_eq!(params.secret().expose(), "tiger");
        assert_eq!(params.text(ParamKey::DbSchemaName).as_deref(), Some("scott"));
    }

    #[test]
    fn test_empty_password_override_is_not_prompted() {
        let overrides = Overrides {
            user: Some("scott".to_string()),
            password: Some(String::new()),
            ..Overrides::default()
        };
        let mut prompt = ScriptedPrompt::default();
        let params = ParameterResolver::new()
            .apply_overrides(&overrides)
            .resolve(&mut prompt)
            .unwrap();
        assert!(prompt.asked.is_empty());
        assert!(params.secret().is_empty());
    }

    #[test]
    fn test_prompt_failure_is_reported() {
        let mut prompt = ScriptedPrompt::default();
        let err = ParameterResolver::new().resolve(&mut prompt).unwrap_err();
        assert!(matches!(err, ParameterError::Prompt { what: "username", .. }));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let overrides = Overrides {
            user: Some("u".to_string()),
            password: Some("p".to_string()),
            ..Overrides::default()
        };
        let err = ParameterResolver::new()
            .merge_config([("conditionWindowStart", "-30 days")])
            .apply_overrides(&overrides)
            .resolve(&mut ScriptedPrompt::default())
            .unwrap_err();
        assert!(matches!(err, ParameterError::Invalid(_)));

        let err = ParameterResolver::new()
            .merge_config([("pseudocount", "0")])
            .apply_overrides(&overrides)
            .resolve(&mut ScriptedPrompt::default())
            .unwrap_err();
        assert!(matches!(err, ParameterError::Invalid(_)));
    }

    #[test]
    fn test_resolve_does_not_touch_the_base() {
        let base = ParameterSet::defaults();
        let overrides = Overrides {
            user: Some("u".to_string()),
            password: Some("p".to_string()),
            ..Overrides::default()
        };
        let resolved = ParameterResolver::from_base(base.clone())
            .apply_overrides(&overrides)
            .resolve(&mut ScriptedPrompt::default())
            .unwrap();
        assert!(base.is_unset(ParamKey::DbUser));
        assert_ne!(base, resolved);
    }
}
