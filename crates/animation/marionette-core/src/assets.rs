//! Character asset loading: actions document, model manifest and
//! expression files, read through a host-provided [`AssetSource`].
//!
//! Paths are `/`-separated and relative to the source. A character's base
//! directory is its model manifest path minus the last segment; the actions
//! document and every expression file resolve against it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use indexmap::IndexMap;
use log::{info, warn};
use serde::Deserialize;

use crate::config::Config;
use crate::data::{ActionsDocument, ExpressionDefinition, ExpressionParam};
use crate::error::AssetError;
use crate::params::BlendMode;

const EXPRESSION_SUFFIX: &str = ".exp3.json";

/// Read-only access to character files.
pub trait AssetSource {
    fn read(&self, path: &str) -> Result<String, AssetError>;
}

/// Files under a directory on disk.
#[derive(Clone, Debug)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssetSource {
    fn read(&self, path: &str) -> Result<String, AssetError> {
        let full = self.root.join(path.trim_start_matches("./"));
        fs::read_to_string(&full).map_err(|source| AssetError::Read {
            path: path.to_string(),
            source,
        })
    }
}

/// In-memory files keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, String>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn with(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl AssetSource for MemoryAssetSource {
    fn read(&self, path: &str) -> Result<String, AssetError> {
        self.files.get(path).cloned().ok_or_else(|| AssetError::Read {
            path: path.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such asset"),
        })
    }
}

/// Everything the engine needs about one character.
#[derive(Clone, Debug, Default)]
pub struct CharacterAssets {
    pub actions: ActionsDocument,
    /// Loaded expressions in manifest order.
    pub expressions: IndexMap<String, ExpressionDefinition>,
}

impl CharacterAssets {
    /// Load the actions document (required) and the expressions listed by the
    /// model manifest (optional; failures are logged and skipped).
    pub fn load(
        source: &dyn AssetSource,
        model_path: &str,
        cfg: &Config,
    ) -> Result<Self, AssetError> {
        let base = base_path(model_path);
        let actions_path = join_path(base, &cfg.actions_file);
        let actions = parse_actions_document(&source.read(&actions_path)?, &actions_path)?;
        let expressions = load_expressions(source, model_path, cfg.emotion.default_fade_in_time);
        Ok(Self {
            actions,
            expressions,
        })
    }

    pub fn expression_names(&self) -> impl Iterator<Item = &str> {
        self.expressions.keys().map(String::as_str)
    }
}

/// Directory part of `model_path` (empty when there is none).
pub fn base_path(model_path: &str) -> &str {
    model_path.rsplit_once('/').map_or("", |(base, _)| base)
}

pub fn join_path(base: &str, file: &str) -> String {
    if base.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), file)
    }
}

/// Expression name from its file name: `expressions/happy.exp3.json` → `happy`.
pub fn expression_name(file: &str) -> &str {
    let name = file.rsplit('/').next().unwrap_or(file);
    name.strip_suffix(EXPRESSION_SUFFIX).unwrap_or(name)
}

pub fn parse_actions_document(text: &str, path: &str) -> Result<ActionsDocument, AssetError> {
    let doc: ActionsDocument = serde_json::from_str(text).map_err(|source| AssetError::Parse {
        path: path.to_string(),
        source,
    })?;
    doc.validate_basic().map_err(|reason| AssetError::Invalid {
        path: path.to_string(),
        reason,
    })?;
    Ok(doc)
}

pub fn parse_expression(
    name: &str,
    text: &str,
    path: &str,
    default_fade_in_time: f32,
) -> Result<ExpressionDefinition, AssetError> {
    let raw: Exp3File = serde_json::from_str(text).map_err(|source| AssetError::Parse {
        path: path.to_string(),
        source,
    })?;
    let fade_in_time = raw.fade_in_time.unwrap_or(default_fade_in_time);
    if !fade_in_time.is_finite() {
        return Err(AssetError::Invalid {
            path: path.to_string(),
            reason: "FadeInTime must be finite".into(),
        });
    }
    if let Some(p) = raw.parameters.iter().find(|p| !p.value.is_finite()) {
        return Err(AssetError::Invalid {
            path: path.to_string(),
            reason: format!("value for '{}' must be finite", p.id),
        });
    }
    Ok(ExpressionDefinition {
        name: name.to_string(),
        fade_in_time,
        params: raw
            .parameters
            .into_iter()
            .map(|p| ExpressionParam {
                id: p.id,
                value: p.value,
                blend: p.blend,
            })
            .collect(),
    })
}

/// Load every expression referenced by the model manifest. Never fails:
/// an unreadable manifest yields no expressions, a bad file is skipped.
pub fn load_expressions(
    source: &dyn AssetSource,
    model_path: &str,
    default_fade_in_time: f32,
) -> IndexMap<String, ExpressionDefinition> {
    let mut defs = IndexMap::new();
    let manifest = match source.read(model_path).and_then(|text| {
        serde_json::from_str::<ModelManifest>(&text).map_err(|source| AssetError::Parse {
            path: model_path.to_string(),
            source,
        })
    }) {
        Ok(m) => m,
        Err(e) => {
            warn!("failed to load model manifest for expressions: {e}");
            return defs;
        }
    };

    let base = base_path(model_path);
    for entry in manifest.file_references.expressions {
        let name = expression_name(&entry.file);
        let path = join_path(base, &entry.file);
        match source
            .read(&path)
            .and_then(|text| parse_expression(name, &text, &path, default_fade_in_time))
        {
            Ok(def) => {
                defs.insert(def.name.clone(), def);
            }
            Err(e) => warn!("failed to load expression {}: {e}", entry.file),
        }
    }
    info!(
        "loaded expressions: {:?}",
        defs.keys().map(String::as_str).collect::<Vec<_>>()
    );
    defs
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ModelManifest {
    #[serde(default)]
    file_references: FileReferences,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FileReferences {
    #[serde(default)]
    expressions: Vec<ExpressionRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExpressionRef {
    file: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Exp3File {
    #[serde(default)]
    fade_in_time: Option<f32>,
    #[serde(default)]
    parameters: Vec<Exp3Param>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Exp3Param {
    id: String,
    value: f32,
    #[serde(default)]
    blend: BlendMode,
}
