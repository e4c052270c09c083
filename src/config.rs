//! Renderer configuration

use std::str::FromStr;

/// Which backend [`Renderer::init`](crate::Renderer::init) creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendType {
    /// Try wgpu, fall back to headless
    #[default]
    Auto,
    Wgpu,
    Headless,
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendType::Auto),
            "wgpu" => Ok(BackendType::Wgpu),
            "headless" | "none" => Ok(BackendType::Headless),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// GPU adapter preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerPreference {
    #[default]
    HighPerformance,
    LowPower,
}

/// Renderer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    pub backend: BackendType,
    /// Wait for vertical blank when presenting
    pub vsync: bool,
    pub power_preference: PowerPreference,
    /// Used for device labels and logs
    pub app_name: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::Auto,
            vsync: true,
            power_preference: PowerPreference::HighPerformance,
            app_name: "gfx-facade".to_string(),
        }
    }
}

impl RendererConfig {
    /// Default configuration overridden by `GFX_BACKEND` and `GFX_VSYNC`.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("GFX_BACKEND") {
            match value.parse() {
                Ok(backend) => config.backend = backend,
                Err(e) => log::warn!("GFX_BACKEND: {}", e),
            }
        }
        if let Some(vsync) = env_var_as_bool("GFX_VSYNC") {
            config.vsync = vsync;
        }

        config
    }

    pub fn with_backend(mut self, backend: BackendType) -> Self {
        self.backend = backend;
        self
    }
}

fn env_var_as_bool(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    parse_bool(&value).or_else(|| {
        log::warn!("{}: expected a boolean, got '{}'", name, value);
        None
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_parse() {
        assert_eq!("wgpu".parse(), Ok(BackendType::Wgpu));
        assert_eq!(" Headless ".parse(), Ok(BackendType::Headless));
        assert_eq!("AUTO".parse(), Ok(BackendType::Auto));
        assert!("vulkan".parse::<BackendType>().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_default_is_auto() {
        let config = RendererConfig::default();
        assert_eq!(config.backend, BackendType::Auto);
        assert!(config.vsync);
    }
}
