//! Document generation pipeline.

use std::path::{Path, PathBuf};

use agentdoc_core::FileManifest;
use chrono::Utc;

use crate::client::TextGenerator;
use crate::config::PromptConfig;
use crate::error::GenerateError;
use crate::prompt::build_prompt;

/// File name of the generated document.
pub const AGENT_DOC_FILE_NAME: &str = "README.agent.md";

/// Default location of the generated document for a folder.
pub fn doc_path(folder_path: &Path) -> PathBuf {
    folder_path.join(AGENT_DOC_FILE_NAME)
}

/// Write a generated document to `path`.
pub async fn write_document(path: &Path, content: &str) -> Result<(), GenerateError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| GenerateError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Generates agent documentation for scanned folders.
#[derive(Debug, Clone)]
pub struct DocGenerator<G> {
    generator: G,
    prompt_config: PromptConfig,
}

impl<G: TextGenerator> DocGenerator<G> {
    /// Create a generator with the default prompt limits.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            prompt_config: PromptConfig::default(),
        }
    }

    /// Use custom prompt limits.
    pub fn with_prompt_config(mut self, prompt_config: PromptConfig) -> Self {
        self.prompt_config = prompt_config;
        self
    }

    /// The underlying text generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Build the prompt that would be sent for this folder.
    pub fn prompt_for(&self, folder_path: &Path, manifest: &FileManifest) -> String {
        build_prompt(folder_path, manifest, &self.prompt_config)
    }

    /// Generate the markdown document for a folder.
    pub async fn generate(
        &self,
        folder_path: &Path,
        manifest: &FileManifest,
    ) -> Result<String, GenerateError> {
        let prompt = self.prompt_for(folder_path, manifest);
        tracing::info!(
            folder = %folder_path.display(),
            files = manifest.total_files,
            directories = manifest.total_directories,
            prompt_len = prompt.len(),
            "Generating agent documentation"
        );

        let text = self.generator.generate(&prompt).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerateError::EmptyResponse);
        }

        Ok(format!(
            "{text}\n\n---\n\n_Generated by agentdoc on {}._\n",
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        ))
    }

    /// Generate the document and write it into the folder.
    ///
    /// Returns the path of the written file.
    pub async fn generate_and_write(
        &self,
        folder_path: &Path,
        manifest: &FileManifest,
    ) -> Result<PathBuf, GenerateError> {
        let content = self.generate(folder_path, manifest).await?;
        let path = doc_path(folder_path);
        write_document(&path, &content).await?;
        tracing::info!(path = %path.display(), "Wrote agent documentation");
        Ok(path)
    }
}
