//! Bearer credential held in memory.

use crate::ServiceError;

#[derive(PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Reads the secret from environment variable `name`.
    pub fn from_env(name: &str) -> Result<Self, ServiceError> {
        let value = std::env::var(name).map_err(|_| {
            ServiceError::configuration(format!("environment variable {name} is not set"))
        })?;

        if value.trim().is_empty() {
            return Err(ServiceError::configuration(format!(
                "environment variable {name} is empty"
            )));
        }

        Ok(Self::new(value))
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8 and the string is not used again.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}
