//! Parsing of `NAME=VALUE` overrides given on the command line.

use confreg_rs_registry::ConfigValue;

/// Split `NAME=VALUE`, reading VALUE as a JSON5 literal when it parses.
///
/// Anything that is not valid JSON5 (e.g. `localhost`) is kept as a string.
pub fn parse_override(raw: &str) -> Result<(String, ConfigValue), String> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(format!("expected NAME=VALUE, got {raw:?}"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("override name must not be empty in {raw:?}"));
    }
    let value = json5::from_str::<ConfigValue>(value)
        .unwrap_or_else(|_| ConfigValue::String(value.to_string()));
    Ok((name.to_string(), value))
}
