//! Graph loader - JSON file loading and parsing
//!
//! This module handles loading action graphs from `.json` files.

use crate::engine::{ActionGraph, EngineError};
use std::fs;
use std::path::Path;

/// Loads action graphs from JSON files
pub struct GraphLoader;

impl GraphLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load an action graph from a `.json` file
    pub fn load_graph<P: AsRef<Path>>(&self, path: P) -> Result<ActionGraph, EngineError> {
        let path = path.as_ref();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            return Err(EngineError::NotJson(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse_json(&content)
    }

    /// Parse an action graph from a JSON string
    pub fn parse_json(content: &str) -> Result<ActionGraph, EngineError> {
        let graph: ActionGraph = serde_json::from_str(content)?;
        Ok(graph)
    }
}

impl Default for GraphLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    const GRAPH: &str = r#"
{
  "start_node": {"type": "start_node", "on_success": "check"},
  "check": {
    "type": "is_greater",
    "args": {"comparing": "{{amount}}", "compare_to": 100, "result": "big"},
    "on_success": "done",
    "on_failure": "done"
  }
}
"#;

    fn temp_file(extension: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("graph-{}.{}", Uuid::new_v4(), extension));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_graph() {
        let graph = GraphLoader::parse_json(GRAPH).unwrap();
        assert_eq!(graph.len(), 2);
        let check = graph.get("check").unwrap();
        assert_eq!(check.action_type, "is_greater");
        assert_eq!(check.args.get_int("compare_to", 0), 100);
    }

    #[test]
    fn test_load_file() {
        let path = temp_file("json", GRAPH);
        let graph = GraphLoader::new().load_graph(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(graph.start_node().is_some());
    }

    #[test]
    fn test_rejects_non_json_extension() {
        let path = temp_file("xml", GRAPH);
        let result = GraphLoader::new().load_graph(&path);
        fs::remove_file(&path).ok();

        assert!(matches!(result, Err(EngineError::NotJson(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = GraphLoader::new().load_graph("non_existing_json_file.json");
        assert!(matches!(result, Err(EngineError::Io(_))));
    }

    #[test]
    fn test_malformed_json() {
        let path = temp_file("json", "{\"start_node\": ");
        let result = GraphLoader::new().load_graph(&path);
        fs::remove_file(&path).ok();

        assert!(matches!(result, Err(EngineError::Json(_))));
    }

    #[test]
    fn test_wrong_shape() {
        let result = GraphLoader::parse_json(r#"{"start_node": {"type": 5}}"#);
        assert!(result.is_err());
    }
}
