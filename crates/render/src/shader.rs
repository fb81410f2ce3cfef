//! Shader source acquisition and program compilation.

use crate::context::{ContextError, GraphicsContext};
use crate::registry::ProgramHandle;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Errors from loading or compiling shader programs.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("shader source not found: {0}")]
    NotFound(String),
    #[error("program {name}: {source}")]
    Compile {
        name: String,
        source: ContextError,
    },
}

/// Where a program's stages come from and which names it is driven through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSource {
    pub name: String,
    pub vertex: String,
    pub fragment: String,
    pub attributes: Vec<String>,
    pub uniforms: Vec<String>,
}

impl ProgramSource {
    /// Compile and link already fetched stage sources.
    pub fn compile(
        &self,
        ctx: &mut dyn GraphicsContext,
        vertex: &str,
        fragment: &str,
    ) -> Result<ProgramHandle, ShaderError> {
        let program = ctx
            .compile_program(vertex, fragment)
            .map_err(|source| ShaderError::Compile {
                name: self.name.clone(),
                source,
            })?;
        Ok(ProgramHandle::new(
            program,
            self.attributes.iter().cloned(),
            self.uniforms.iter().cloned(),
        ))
    }
}

/// Asynchronous source text provider.
pub trait ShaderLoader {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, ShaderError>>;
}

/// Reads shader files relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileShaderLoader {
    root: PathBuf,
}

impl FileShaderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ShaderLoader for FileShaderLoader {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, ShaderError>> {
        Box::pin(async move {
            let full = self.root.join(path);
            tracing::debug!("loading shader {}", full.display());
            std::fs::read_to_string(&full).map_err(|source| ShaderError::Io {
                path: full.display().to_string(),
                source,
            })
        })
    }
}

/// Serves sources from memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryShaderLoader {
    sources: BTreeMap<String, String>,
}

impl MemoryShaderLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, source: &str) -> Self {
        self.sources.insert(path.to_string(), source.to_string());
        self
    }

    pub fn insert(&mut self, path: &str, source: &str) {
        self.sources.insert(path.to_string(), source.to_string());
    }
}

impl ShaderLoader for MemoryShaderLoader {
    fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, ShaderError>> {
        Box::pin(async move {
            self.sources
                .get(path)
                .cloned()
                .ok_or_else(|| ShaderError::NotFound(path.to_string()))
        })
    }
}
