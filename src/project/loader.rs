use super::manifest::ManifestError;
use crate::language::ast::Declaration;
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::debug;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclarationFile {
    #[serde(default)]
    declarations: Vec<Declaration>,
}

pub fn load_declarations(path: &Path) -> Result<Vec<Declaration>, ManifestError> {
    let content = fs::read_to_string(path).map_err(|error| ManifestError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    let file = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str::<DeclarationFile>(&content)
            .map_err(|error| error.message().to_string()),
        Some("json") => {
            serde_json::from_str::<DeclarationFile>(&content).map_err(|error| error.to_string())
        }
        other => Err(format!(
            "unsupported signature format `{}` (expected .toml or .json)",
            other.unwrap_or("")
        )),
    }
    .map_err(|message| ManifestError::Signature {
        path: path.to_path_buf(),
        message,
    })?;
    debug!(
        path = %path.display(),
        declarations = file.declarations.len(),
        "read signature file"
    );
    Ok(file.declarations)
}
