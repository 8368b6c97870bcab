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
    rigs: HashMap<String, String>,
    captures: HashMap<String, CaptureEntry>,
    setups: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CaptureEntry {
    Dir(String),
    Detailed {
        dir: String,
        #[serde(default)]
        frame_interval_ms: Option<u64>,
    },
}

impl CaptureEntry {
    fn dir(&self) -> &str {
        match self {
            CaptureEntry::Dir(dir) => dir,
            CaptureEntry::Detailed { dir, .. } => dir,
        }
    }

    fn frame_interval_ms(&self) -> Option<u64> {
        match self {
            CaptureEntry::Dir(_) => None,
            CaptureEntry::Detailed {
                frame_interval_ms, ..
            } => *frame_interval_ms,
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
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

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Numeric part of a capture file stem (`frame_12.json` → 12).
fn frame_number(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits: String = stem.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Sort capture files by frame number; files without one go last, by name.
fn sort_frames(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| match (frame_number(a), frame_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    });
}

pub mod rigs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.rigs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.rigs, "rig", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.rigs, "rig", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.rigs, "rig", name)?;
        Ok(resolve_path(rel))
    }
}

/// Recorded tracker sessions: one JSON file per frame in a directory.
pub mod captures {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.captures.keys().cloned().collect()
    }

    pub fn dir(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.captures, "capture", name)?;
        Ok(resolve_path(entry.dir()))
    }

    /// Recorded interval between frames, if the manifest carries one.
    pub fn frame_interval_ms(name: &str) -> Result<Option<u64>> {
        let entry = lookup(&MANIFEST.captures, "capture", name)?;
        Ok(entry.frame_interval_ms())
    }

    /// Frame files in playback order.
    pub fn frame_paths(name: &str) -> Result<Vec<PathBuf>> {
        let dir = dir(name)?;
        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("failed to list capture dir {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        sort_frames(&mut paths);
        Ok(paths)
    }

    /// Raw JSON of every frame, in playback order.
    pub fn frames_json(name: &str) -> Result<Vec<String>> {
        frame_paths(name)?
            .into_iter()
            .map(|path| {
                fs::read_to_string(&path)
                    .with_context(|| format!("failed to read frame {}", path.display()))
            })
            .collect()
    }
}

pub mod setups {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.setups.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.setups, "setup", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.setups, "setup", name)?;
        super::load_json(rel)
    }
}
