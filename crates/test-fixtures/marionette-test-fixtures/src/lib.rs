//! Shared access to the character fixtures under `fixtures/`.
//!
//! Every character is listed in `fixtures/manifest.json` by the path of its
//! model manifest, relative to the fixtures root. Asset sources in tests are
//! rooted at [`root`] and addressed with those relative paths.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    characters: HashMap<String, CharacterEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CharacterEntry {
    Model(String),
    Detailed { model: String },
}

impl CharacterEntry {
    fn model(&self) -> &str {
        match self {
            CharacterEntry::Model(path) => path,
            CharacterEntry::Detailed { model } => model,
        }
    }
}

/// Absolute path of the fixtures directory.
pub fn root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(name: &str) -> Result<&'a CharacterEntry> {
    MANIFEST
        .characters
        .get(name)
        .ok_or_else(|| anyhow!("unknown character fixture '{name}'"))
}

pub mod characters {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.characters.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Model manifest path relative to [`root`](super::root).
    pub fn model(name: &str) -> Result<String> {
        Ok(lookup(name)?.model().to_string())
    }

    /// Directory holding the character's assets, relative to the fixtures root.
    pub fn base(name: &str) -> Result<String> {
        let model = lookup(name)?.model();
        Ok(model
            .rsplit_once('/')
            .map(|(base, _)| base.to_string())
            .unwrap_or_default())
    }

    /// Raw text of a file inside the character's directory.
    pub fn file(name: &str, file: &str) -> Result<String> {
        let base = base(name)?;
        read_to_string(&format!("{base}/{file}"))
    }

    pub fn load<T: DeserializeOwned>(name: &str, file: &str) -> Result<T> {
        let base = base(name)?;
        load_json(&format!("{base}/{file}"))
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(name)?.model()))
    }
}
