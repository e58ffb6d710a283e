use eyre::WrapErr;
use serde::{Deserialize, Serialize};

/// A sensitive configuration value, either written straight into the config
/// file or looked up from an environment variable at use time.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Secret {
    Inline(String),
    FromEnvVar {
        #[serde(rename = "env-var", alias = "env_var")]
        env_var: String,
    },
}

pub struct SecretValue(pub String);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        SecretValue(value.into())
    }
}

#[derive(Debug)]
pub struct Secrets;

impl Secrets {
    pub fn get_secret(&self, secret: &Secret) -> eyre::Result<SecretValue> {
        match secret {
            Secret::Inline(value) => Ok(SecretValue::new(value.clone())),
            Secret::FromEnvVar { env_var } => {
                let value = std::env::var(env_var)
                    .wrap_err_with(|| format!("environment variable '{}' not set", env_var))?;
                Ok(SecretValue(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EnvGuard(String);

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            std::env::remove_var(&self.0);
        }
    }

    fn set_env(key: &str, value: &str) -> EnvGuard {
        std::env::set_var(key, value);
        EnvGuard(key.to_owned())
    }

    #[test]
    fn should_get_inline_secret() {
        let secret = Secret::Inline("hunter2".to_owned());

        let value = Secrets.get_secret(&secret).unwrap();

        assert_eq!(&value.0, "hunter2");
    }

    #[test]
    fn should_get_secret_from_env_var() {
        let secret = Secret::FromEnvVar {
            env_var: "TEST_DEVICE_SECRET1".to_owned(),
        };
        let _guard = set_env("TEST_DEVICE_SECRET1", "test-secret-value");

        let value = Secrets.get_secret(&secret).unwrap();

        assert_eq!(&value.0, "test-secret-value");
    }

    #[test]
    fn should_not_get_secret_if_missing_env_var() {
        let secret = Secret::FromEnvVar {
            env_var: "TEST_DEVICE_SECRET2".to_owned(),
        };
        std::env::remove_var("TEST_DEVICE_SECRET2");

        let result = Secrets.get_secret(&secret);

        assert!(result.is_err());
    }

    #[test]
    fn should_parse_inline_secret_from_plain_string() {
        let secret: Secret = toml::from_str::<toml::Value>(r#"v = "pwd""#)
            .unwrap()
            .get("v")
            .cloned()
            .unwrap()
            .try_into()
            .unwrap();

        assert_eq!(secret, Secret::Inline("pwd".to_owned()));
    }

    #[test]
    fn should_parse_env_var_secret_from_table() {
        let secret: Secret = toml::from_str::<toml::Value>(r#"v = { env-var = "PWD_VAR" }"#)
            .unwrap()
            .get("v")
            .cloned()
            .unwrap()
            .try_into()
            .unwrap();

        assert_eq!(
            secret,
            Secret::FromEnvVar {
                env_var: "PWD_VAR".to_owned()
            }
        );
    }
}
