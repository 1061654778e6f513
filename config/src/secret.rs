use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::ops::Deref;

/// Wrapper around [`Secret<String>`] that implements [`Deserialize`].
///
/// Lets secret values (passwords, keys) live in configuration structs while
/// staying redacted in debug output.
#[derive(Clone)]
pub struct DeserializableSecretString(Secret<String>);

impl Deref for DeserializableSecretString {
    type Target = Secret<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<String> for DeserializableSecretString {
    fn from(value: String) -> Self {
        Self(Secret::new(value))
    }
}

impl From<DeserializableSecretString> for Secret<String> {
    fn from(value: DeserializableSecretString) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for DeserializableSecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;

        Ok(Self(Secret::new(string)))
    }
}

impl fmt::Debug for DeserializableSecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_is_redacted() {
        let secret = DeserializableSecretString::from("hunter2".to_string());
        let debug = format!("{secret:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = DeserializableSecretString::from("hunter2".to_string());
        assert_eq!(secret.expose_secret(), "hunter2");
    }
}
