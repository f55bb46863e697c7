//! Finds the shapes visible on a runtime classpath through model-discovery manifests

use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, trace};

use super::model::ModelIndex;
use crate::error::Result;
use crate::sources::archive::{ModelArchive, is_archive};
use crate::sources::artifact::{MODEL_RESOURCE_DIR, is_model_file};

/// Listing of bundled model files, relative to `META-INF/smithy/`
pub const DISCOVERY_MANIFEST: &str = "META-INF/smithy/manifest";

static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*namespace\s+([A-Za-z_][\w.]*)").expect("namespace pattern is valid")
});

static SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:@[\w.#]+(?:\([^)]*\))?\s+)*(?:structure|union|list|set|map|enum|intEnum|string|blob|boolean|byte|short|integer|long|float|double|bigInteger|bigDecimal|timestamp|document|service|operation|resource)\s+([A-Za-z_]\w*)",
    )
    .expect("shape pattern is valid")
});

fn manifest_entries(listing: &str) -> impl Iterator<Item = &str> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Model files an unpacked classpath entry makes visible
pub fn discover_model_files(entry: &Path) -> Result<Vec<PathBuf>> {
    if entry.is_file() {
        if is_model_file(entry) {
            return Ok(vec![entry.to_path_buf()]);
        }
        debug!("Skipping classpath entry that is not a model or artifact: {}", entry.display());
        return Ok(Vec::new());
    }

    let manifest = entry.join(DISCOVERY_MANIFEST);
    if !manifest.is_file() {
        trace!("No discovery manifest in {}", entry.display());
        return Ok(Vec::new());
    }

    let root = entry.join(MODEL_RESOURCE_DIR);
    Ok(manifest_entries(&fs::read_to_string(&manifest)?)
        .map(|line| root.join(line))
        .collect())
}

/// Shape ids defined in one model document; `name` decides between JSON AST and IDL
pub fn shapes_in(name: &str, contents: &str) -> Result<BTreeSet<String>> {
    if name.ends_with(".json") {
        let value = serde_json::from_str(contents)?;
        return Ok(ModelIndex::from_value(&value).defined);
    }
    Ok(idl_shapes(contents))
}

/// Shape ids defined in one model file
pub fn defined_shapes(model_file: &Path) -> Result<BTreeSet<String>> {
    let contents = fs::read_to_string(model_file)?;
    shapes_in(&model_file.to_string_lossy(), &contents)
}

/// Shape ids declared in IDL text
pub fn idl_shapes(contents: &str) -> BTreeSet<String> {
    let Some(namespace) = NAMESPACE_RE
        .captures(contents)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    else {
        return BTreeSet::new();
    };

    SHAPE_RE
        .captures_iter(contents)
        .filter_map(|c| c.get(1))
        .map(|name| format!("{namespace}#{}", name.as_str()))
        .collect()
}

/// Shape ids bundled in an archive's discovery manifest
pub fn archive_shapes(path: &Path) -> Result<BTreeSet<String>> {
    let mut archive = ModelArchive::open(path)?;
    let Some(listing) = archive.read_entry(DISCOVERY_MANIFEST)? else {
        trace!("No discovery manifest in {}", path.display());
        return Ok(BTreeSet::new());
    };

    let mut shapes = BTreeSet::new();
    for name in manifest_entries(&listing) {
        match archive.read_entry(&format!("{MODEL_RESOURCE_DIR}/{name}"))? {
            Some(contents) => shapes.extend(shapes_in(name, &contents)?),
            None => debug!("Manifest entry {} is missing from {}", name, path.display()),
        }
    }
    Ok(shapes)
}

/// Every shape id made visible by `classpath`
pub fn classpath_shapes(classpath: &[PathBuf]) -> Result<BTreeSet<String>> {
    let mut shapes = BTreeSet::new();
    for entry in classpath {
        if is_archive(entry) {
            let found = archive_shapes(entry)?;
            trace!("{} defines {} shape(s)", entry.display(), found.len());
            shapes.extend(found);
            continue;
        }
        for model in discover_model_files(entry)? {
            if !model.is_file() {
                debug!("Manifest entry {} does not exist", model.display());
                continue;
            }
            let found = defined_shapes(&model)?;
            trace!("{} defines {} shape(s)", model.display(), found.len());
            shapes.extend(found);
        }
    }
    debug!("Runtime classpath defines {} shape(s)", shapes.len());
    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_idl_shapes() {
        let idl = r#"$version: "2"
namespace com.example.traits

@trait(selector: "structure")
structure missingTrait {}

@trait
@documentation("docs")
string tag

/// Not a shape: structure Fake
operation GetThing {}
"#;
        let shapes: Vec<_> = idl_shapes(idl).into_iter().collect();
        assert_eq!(
            shapes,
            vec![
                "com.example.traits#GetThing",
                "com.example.traits#missingTrait",
                "com.example.traits#tag",
            ]
        );
    }

    #[test]
    fn test_manifest_lists_visible_models() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join(MODEL_RESOURCE_DIR);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("manifest"), "traits.smithy\n\n").unwrap();
        fs::write(root.join("traits.smithy"), "namespace ns\n@trait\nstructure x {}\n").unwrap();
        fs::write(root.join("unlisted.smithy"), "namespace ns\nstructure y {}\n").unwrap();

        let shapes = classpath_shapes(&[temp.path().to_path_buf()]).unwrap();
        assert!(shapes.contains("ns#x"));
        assert!(!shapes.contains("ns#y"));
    }

    #[test]
    fn test_jar_manifest_lists_visible_models() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("traits.jar");
        crate::sources::archive::write_archive(
            &jar,
            &[
                (DISCOVERY_MANIFEST, "traits.smithy\nmodel.json\nmissing.smithy\n"),
                ("META-INF/smithy/traits.smithy", "namespace dep\n@trait\nstructure known {}\n"),
                (
                    "META-INF/smithy/model.json",
                    r#"{"smithy": "2.0", "shapes": {"dep#Shared": {"type": "string"}}}"#,
                ),
                ("META-INF/smithy/unlisted.smithy", "namespace dep\nstructure hidden {}\n"),
            ],
        );

        let shapes = classpath_shapes(&[jar]).unwrap();
        assert_eq!(
            shapes,
            BTreeSet::from(["dep#Shared".to_string(), "dep#known".to_string()])
        );
    }

    #[test]
    fn test_plain_files_and_dirs_contribute_nothing() {
        let temp = TempDir::new().unwrap();
        let readme = temp.path().join("README.txt");
        fs::write(&readme, "not a model").unwrap();

        let shapes = classpath_shapes(&[readme, temp.path().to_path_buf()]).unwrap();
        assert!(shapes.is_empty());
    }
}
