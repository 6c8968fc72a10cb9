//! Document generation for agentdoc.
//!
//! Turns a [`FileManifest`] into a prompt, sends it to a hosted language
//! model, and writes the resulting `README.agent.md`.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use agentdoc_gen::{ChatClient, DocGenerator, ModelConfig};
//! # async fn run(manifest: agentdoc_core::FileManifest) -> Result<(), agentdoc_gen::GenerateError> {
//! let config = ModelConfig::builder().api_key("sk-...").build()?;
//! let generator = DocGenerator::new(ChatClient::new(config)?);
//!
//! let written = generator
//!     .generate_and_write(Path::new("/path/to/folder"), &manifest)
//!     .await?;
//! println!("Wrote {}", written.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod generator;
mod prompt;

pub use client::{ChatClient, TextGenerator};
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, ModelConfig, ModelConfigBuilder, PromptConfig,
    PromptConfigBuilder,
};
pub use error::GenerateError;
pub use generator::{AGENT_DOC_FILE_NAME, DocGenerator, doc_path, write_document};
pub use prompt::{build_prompt, folder_name};

pub use agentdoc_core::FileManifest;
