use crate::{Error, Result};

/// Serialize a CRD or JSON Schema object to JSON or YAML, for the `export` subcommand.
pub fn serialize<T: serde::Serialize>(value: &T, output_format: &str) -> Result<String> {
    match output_format {
        "json" => serde_json::to_string_pretty(value)
            .map_err(Error::from)
            .map_err(|e| e.with_name("E_SERIALIZE_JSON")),
        "yaml" => serde_yml::to_string(value)
            .map_err(Error::from)
            .map_err(|e| e.with_name("E_SERIALIZE_YAML")),
        other => Err(Error::validation(format!("Unsupported output format: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MCPService;
    use kube::CustomResourceExt;

    #[test]
    fn test_serialize_crd_json() {
        let crd = MCPService::crd();
        let result = serialize(&crd, "json").unwrap();
        assert!(result.contains("\"kind\": \"MCPService\""));
    }

    #[test]
    fn test_serialize_crd_yaml() {
        let crd = MCPService::crd();
        let result = serialize(&crd, "yaml").unwrap();
        assert!(result.contains("kind: MCPService"));
    }

    #[test]
    fn test_serialize_crd_invalid_format() {
        let crd = MCPService::crd();
        let result = serialize(&crd, "xml");
        assert!(result.is_err());
    }
}
