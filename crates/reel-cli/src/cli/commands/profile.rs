//! Profile command handlers.

use anyhow::{Context, Result, bail};
use reel_core::config::Config;
use serde_json::{Map, Value};

use super::open_store;

pub async fn set(config: &Config, fields: &[String]) -> Result<()> {
    let fields = parse_fields(fields)?;
    let mut store = open_store(config)?;
    store.update_profile(&fields).await?;

    println!("Profile updated.");
    if let Some(identity) = store.current_identity() {
        let pretty = serde_json::to_string_pretty(identity).context("render identity")?;
        println!("{pretty}");
    }
    Ok(())
}

/// Parses `KEY=VALUE` pairs into a fields object.
///
/// Values that parse as JSON are kept typed (numbers, booleans, null);
/// anything else is treated as a plain string.
fn parse_fields(pairs: &[String]) -> Result<Value> {
    let mut fields = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid field '{pair}': expected KEY=VALUE");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid field '{pair}': empty key");
        }
        let value = serde_json::from_str::<Value>(value)
            .unwrap_or_else(|_| Value::String(value.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(Value::Object(fields))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Test: typed values survive, bare words become strings.
    #[test]
    fn test_parse_fields_types() {
        let fields = parse_fields(&[
            "username=alicia".to_string(),
            "age=30".to_string(),
            "verified=true".to_string(),
        ])
        .unwrap();
        assert_eq!(
            fields,
            json!({"username": "alicia", "age": 30, "verified": true})
        );
    }

    /// Test: missing '=' is rejected.
    #[test]
    fn test_parse_fields_rejects_bare_key() {
        assert!(parse_fields(&["username".to_string()]).is_err());
        assert!(parse_fields(&["=value".to_string()]).is_err());
    }
}
