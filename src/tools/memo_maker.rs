use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::docx::Document;
use super::registry::{Tool, ToolContext, ToolDefinition};
use crate::error::{DocumentError, ToolError};

/// MIME string reported with the download control.
pub const DOCX_MIME: &str = "docx";

/// A memo to be handed to the page for download. Never stored server-side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoArtifact {
    /// File name without extension. Used as given.
    pub file_name: String,
    pub body: String,
}

impl MemoArtifact {
    pub fn download_name(&self) -> String {
        format!("{}.docx", self.file_name)
    }

    /// A document holding exactly one paragraph: the body.
    pub fn to_docx(&self) -> Result<Vec<u8>, DocumentError> {
        let mut document = Document::new();
        document.add_paragraph(self.body.as_str());
        document.save()
    }
}

/// Used to make memorandums.
pub struct MemoMaker;

#[async_trait]
impl Tool for MemoMaker {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "memo_maker".to_string(),
            description: "Used to make memorandums.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "file_name": {
                        "type": "string",
                        "description": "The file name of the memo."
                    },
                    "body": {
                        "type": "string",
                        "description": "The body of the memo."
                    }
                },
                "required": ["file_name", "body"]
            }),
        }
    }

    async fn execute(&self, params: Value, context: &ToolContext) -> Result<String, ToolError> {
        let memo: MemoArtifact = serde_json::from_value(params)?;
        let data = memo.to_docx()?;
        let download_name = memo.download_name();
        info!("made memo '{}' ({} bytes)", download_name, data.len());

        context.ui.success("Done!").await;
        context
            .ui
            .download_button("Download", data, download_name.as_str(), DOCX_MIME)
            .await;

        Ok(format!("Created {}.", download_name))
    }
}
