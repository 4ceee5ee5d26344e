//! Log filter construction
//!
//! Every component logs through `tracing` with structured fields; this module
//! only turns [`LoggingConfig`](crate::config::LoggingConfig) into an
//! `EnvFilter` directive string.

/// Build filter directives string from LoggingConfig
///
/// Component levels are appended in name order, so the result is stable.
///
/// # Examples
///
/// ```
/// use scaleit::config::{LogFormat, LoggingConfig};
/// use scaleit::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(HashMap::from([("engine".to_string(), "debug".to_string())])),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,scaleit::engine=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",scaleit::{}={}", component, level));
        }
    }

    filter_str
}
