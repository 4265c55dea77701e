use serde::{Deserialize, Serialize};

/// One input line: a file before and after a commit.
#[derive(Debug, Clone, Deserialize)]
pub struct RevisionEntry {
    pub id: String,
    pub prev_file: String,
    pub updated_file: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// One output line: an accepted change with its context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeRecord {
    /// `<revision id>_<n>`, `n` counting accepted changes of the revision from 0.
    pub id: String,
    pub prev_code_chunk: String,
    pub updated_code_chunk: String,
    pub prev_code_chunk_tokens: Vec<String>,
    pub updated_code_chunk_tokens: Vec<String>,
    #[serde(rename = "PrevCodeAST")]
    pub prev_code_ast: serde_json::Value,
    #[serde(rename = "UpdatedCodeAST")]
    pub updated_code_ast: serde_json::Value,
    pub preceding_context: Vec<String>,
    pub succeeding_context: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}
