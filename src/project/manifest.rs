use crate::{definition::ResolverConfig, language::errors::DeclarationError};
use miette::Diagnostic;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ResolverManifest {
    pub path: PathBuf,
    root: PathBuf,
    resolver: ResolverSection,
    signatures: Vec<PathBuf>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    #[error("failed to read `{}`", .path.display())]
    #[diagnostic(code(manifest::io))]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("invalid manifest `{}`: {message}", .path.display())]
    #[diagnostic(
        code(manifest::parse),
        help("expected a `[resolver]` table and `[[signatures]]` entries")
    )]
    Parse { path: PathBuf, message: String },
    #[error("invalid signature file `{}`: {message}", .path.display())]
    #[diagnostic(code(manifest::signature))]
    Signature { path: PathBuf, message: String },
    #[error("rejected declaration in `{}`", .path.display())]
    #[diagnostic(code(manifest::declaration))]
    Declaration {
        path: PathBuf,
        #[source]
        error: DeclarationError,
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    resolver: ResolverSection,
    #[serde(default)]
    signatures: Vec<RawSignatureEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ResolverSection {
    implicit_superclass: Option<String>,
    root_classes: Vec<String>,
    class_root: Option<String>,
    module_root: Option<String>,
    cache: bool,
}

impl Default for ResolverSection {
    fn default() -> Self {
        Self {
            implicit_superclass: None,
            root_classes: Vec::new(),
            class_root: None,
            module_root: None,
            cache: true,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSignatureEntry {
    path: String,
}

impl ResolverManifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|error| ManifestError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(content).map_err(|error| ManifestError::Parse {
            path: path.to_path_buf(),
            message: error.message().to_string(),
        })?;
        let root = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let signatures = raw
            .signatures
            .into_iter()
            .map(|entry| root.join(entry.path))
            .collect();
        Ok(Self {
            path: path.to_path_buf(),
            root,
            resolver: raw.resolver,
            signatures,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn signature_paths(&self) -> Vec<PathBuf> {
        self.signatures.clone()
    }

    pub fn config(&self) -> ResolverConfig {
        ResolverConfig {
            implicit_superclass: self.resolver.implicit_superclass.clone(),
            root_classes: self.resolver.root_classes.clone(),
            class_root: self.resolver.class_root.clone(),
            module_root: self.resolver.module_root.clone(),
            disable_cache: !self.resolver.cache,
        }
    }
}
