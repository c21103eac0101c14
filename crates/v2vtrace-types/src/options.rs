use serde::{Deserialize, Serialize};

/// Tunables for a parse pass (the `[parser]` table of `config.toml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Lines inspected to guess the tool of an implicit run
    pub implicit_probe_lines: usize,
    /// Maximum stdout lines kept per guest command
    pub max_stdout_lines: usize,
    /// Maximum raw log lines kept per nbdkit connection
    pub max_connection_lines: usize,
    /// Decode written file content for text-like destinations
    pub decode_file_content: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            implicit_probe_lines: 20,
            max_stdout_lines: 200,
            max_connection_lines: 500,
            decode_file_content: true,
        }
    }
}
