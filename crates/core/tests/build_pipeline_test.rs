//! End-to-end builds driven through the projector with a stub engine

use projector_core::{
    BuildRequest, BuildStatus, ConfigDocument, DependencyArtifact, Error, ModelEngine, Projector,
    SelectQuery, Stager, TagFilter,
    engine::{EngineCommand, EngineExit},
};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Writes `model` into every projection named in the engine config and counts runs
struct StubEngine {
    calls: AtomicUsize,
    commands: Mutex<Vec<EngineCommand>>,
    model: Value,
    /// Projection-relative model path; `None` writes no model at all
    model_file: Option<(&'static str, String)>,
}

impl StubEngine {
    fn new(model: Value) -> Self {
        let contents = model.to_string();
        Self {
            calls: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
            model,
            model_file: Some(("model.json", contents)),
        }
    }

    fn with_model_file(mut self, file: Option<(&'static str, &str)>) -> Self {
        self.model_file = file.map(|(name, contents)| (name, contents.to_string()));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModelEngine for StubEngine {
    fn program(&self) -> &str {
        "stub-engine"
    }

    fn run(&self, command: &EngineCommand) -> projector_core::Result<EngineExit> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.commands.lock().unwrap().push(command.clone());
        let Some(output) = command.value_of("--output").map(PathBuf::from) else {
            return Ok(EngineExit::success());
        };
        let config: Value =
            serde_json::from_str(&fs::read_to_string(command.value_of("--config").unwrap_or_default())?)?;

        let mut names = vec![command.value_of("--projection-source").unwrap_or("source").to_string()];
        if let Some(projections) = config.get("projections").and_then(Value::as_object) {
            for (name, projection) in projections {
                if projection.get("abstract") != Some(&Value::Bool(true)) {
                    names.push(name.clone());
                }
            }
        }

        for name in names {
            let dir = output.join(&name);
            fs::create_dir_all(dir.join("sources"))?;
            if let Some((file, contents)) = &self.model_file {
                fs::write(dir.join(file), contents)?;
            }
            fs::write(dir.join("sources/model.json"), self.model.to_string())?;
            fs::write(dir.join("diagnostics.json"), "[]")?;
        }
        Ok(EngineExit::success())
    }
}

fn valid_model() -> Value {
    json!({
        "smithy": "2.0",
        "shapes": {
            "ns#Widget": {
                "type": "structure",
                "members": {"id": {"target": "smithy.api#String"}}
            }
        }
    })
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let model = temp.path().join("model");
    fs::create_dir_all(&model).unwrap();
    fs::write(model.join("main.smithy"), "namespace ns\nstructure Widget {}\n").unwrap();
    temp
}

fn config(value: Value) -> ConfigDocument {
    ConfigDocument::parse(&value.to_string(), "/").unwrap()
}

#[test]
fn test_single_engine_call_for_many_projections() {
    let temp = project();
    let engine = StubEngine::new(valid_model());
    let projector = Projector::new(engine);

    let mut request = BuildRequest::new(temp.path());
    request.configs = vec![config(json!({
        "projections": {
            "a": {"plugins": {"one": {}}},
            "b": {"plugins": {"two": {}}},
            "c": {},
            "base": {"abstract": true}
        }
    }))];

    let outcome = projector.build(&request).unwrap();
    assert_eq!(projector.engine().calls(), 1);
    assert!(outcome.is_success());
    assert_eq!(outcome.result.projections.len(), 4);
    assert!(outcome.result.projection("base").is_none());
}

#[test]
fn test_default_source_build_succeeds() {
    let temp = project();
    let projector = Projector::new(StubEngine::new(valid_model()));
    let request = BuildRequest::new(temp.path());

    let outcome = projector.build(&request).unwrap();

    assert_eq!(outcome.status, BuildStatus::Success);
    assert!(outcome.report.is_empty());
    let output_root = temp.path().join("build/smithyprojections");
    let source_model = outcome.result.source().unwrap().model.clone().unwrap();
    assert!(source_model.starts_with(&output_root));
    assert!(source_model.ends_with("source/model.json"));
    assert!(source_model.is_file());
}

#[test]
fn test_conflicting_output_directories_never_run_engine() {
    let temp = project();
    let projector = Projector::new(StubEngine::new(valid_model()));
    let out1 = temp.path().join("out1");
    let out2 = temp.path().join("out2");

    let mut request = BuildRequest::new(temp.path());
    request.configs = vec![
        config(json!({"outputDirectory": out1})),
        config(json!({"outputDirectory": out2})),
    ];

    let err = projector.build(&request).unwrap_err();
    assert!(matches!(err, Error::ConflictingConfig { .. }));
    assert!(err.is_configuration_error());
    assert_eq!(projector.engine().calls(), 0);
    assert!(!out1.exists());
    assert!(!out2.exists());
    assert!(!temp.path().join("build").exists());
}

#[test]
fn test_missing_runtime_trait_is_a_contract_violation() {
    let temp = project();
    let model = json!({
        "smithy": "2.0",
        "shapes": {
            "ns#Widget": {"type": "structure", "traits": {"ns#missingTrait": {}}}
        }
    });
    let projector = Projector::new(StubEngine::new(model));
    let request = BuildRequest::new(temp.path());

    let outcome = projector.build(&request).unwrap();

    assert!(outcome.result.is_success());
    assert_eq!(outcome.status, BuildStatus::ContractViolation);
    assert_eq!(
        outcome.report.identifiers().into_iter().collect::<Vec<_>>(),
        vec!["ns#missingTrait"]
    );

    let err = outcome.into_result().unwrap_err();
    assert!(matches!(err, Error::UnresolvedReferences(_)));
    assert!(err.to_string().contains("Unable to resolve trait `ns#missingTrait`"));
}

#[test]
fn test_runtime_classpath_resolves_trait() {
    let temp = project();
    let traits = temp.path().join("deps/traits");
    let resources = traits.join("META-INF/smithy");
    fs::create_dir_all(&resources).unwrap();
    fs::write(resources.join("manifest"), "traits.smithy\n").unwrap();
    fs::write(
        resources.join("traits.smithy"),
        "namespace dep\n@trait\nstructure known {}\n",
    )
    .unwrap();

    let model = json!({
        "smithy": "2.0",
        "shapes": {
            "ns#Widget": {"type": "structure", "traits": {"dep#known": {}, "dep#unknown": {}}}
        }
    });
    let projector = Projector::new(StubEngine::new(model));
    let mut request = BuildRequest::new(temp.path());
    request.runtime_classpath = vec![traits];

    let outcome = projector.build(&request).unwrap();
    assert_eq!(
        outcome.report.identifiers().into_iter().collect::<Vec<_>>(),
        vec!["dep#unknown"]
    );
}

#[test]
fn test_duplicate_source_projections_fail() {
    let temp = project();
    let projector = Projector::new(StubEngine::new(valid_model()));
    let mut request = BuildRequest::new(temp.path());
    request.configs = vec![
        config(json!({"projections": {"a": {"source": true}}})),
        config(json!({"projections": {"b": {"source": true}}})),
    ];

    assert!(matches!(
        projector.build(&request),
        Err(Error::DuplicateSourceProjection { .. })
    ));
    assert_eq!(projector.engine().calls(), 0);
}

#[test]
fn test_tag_filtered_artifacts_reach_the_engine() {
    let temp = project();
    let a = temp.path().join("deps/a");
    let b = temp.path().join("deps/b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();

    let projector = Projector::new(StubEngine::new(valid_model()));
    let mut request = BuildRequest::new(temp.path());
    request.artifacts = vec![
        DependencyArtifact::new(&a, ["shared"]),
        DependencyArtifact::new(&b, ["private"]),
    ];
    request.tag_filter = TagFilter::new(["shared"]);

    let outcome = projector.build(&request).unwrap();
    let paths: Vec<&Path> = outcome.sources.iter().map(|s| s.path()).collect();
    assert_eq!(paths.len(), 2);
    assert!(paths[1].ends_with("deps/a"));
}

#[test]
fn test_stage_after_build() {
    let temp = project();
    let projector = Projector::new(StubEngine::new(valid_model()));
    let mut request = BuildRequest::new(temp.path());
    request.configs = vec![config(json!({"projections": {"base": {"abstract": true}}}))];
    let outcome = projector.build(&request).unwrap();
    let stager = Stager::new(temp.path().join("build/staging"));

    let staged = projector.stage(&outcome, &stager, "source", None).unwrap();
    assert!(staged.join("META-INF/smithy/model.json").is_file());

    assert!(matches!(
        projector.stage(&outcome, &stager, "base", None),
        Err(Error::AbstractProjection(_))
    ));
    assert!(matches!(
        projector.stage(&outcome, &stager, "nope", None),
        Err(Error::ProjectionNotBuilt { .. })
    ));
}

#[test]
fn test_source_projection_without_model_is_an_error() {
    let temp = project();
    let projector = Projector::new(StubEngine::new(valid_model()).with_model_file(None));
    let request = BuildRequest::new(temp.path());

    let err = projector.build(&request).unwrap_err();
    assert!(matches!(err, Error::MissingSourceModel { ref projection, .. } if projection == "source"));
    assert!(!err.is_configuration_error());
}

#[test]
fn test_idl_source_model_is_not_reported_as_success() {
    let temp = project();
    let projector = Projector::new(
        StubEngine::new(valid_model())
            .with_model_file(Some(("model.smithy", "namespace ns\n@missingTrait\nstructure Widget {}\n"))),
    );
    let request = BuildRequest::new(temp.path());

    let err = projector.build(&request).unwrap_err();
    match err {
        Error::UnsupportedModelFormat(path) => assert!(path.ends_with("source/model.smithy")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_tagged_jar_dependency_reaches_the_engine() {
    let temp = project();
    let jar = temp.path().join("deps/traits.jar");
    fs::create_dir_all(jar.parent().unwrap()).unwrap();
    let mut writer = zip::ZipWriter::new(fs::File::create(&jar).unwrap());
    writer
        .start_file("META-INF/MANIFEST.MF", zip::write::SimpleFileOptions::default())
        .unwrap();
    std::io::Write::write_all(&mut writer, b"Smithy-Tags: shared\n").unwrap();
    writer.finish().unwrap();

    let projector = Projector::new(StubEngine::new(valid_model()));
    let mut request = BuildRequest::new(temp.path());
    request.artifacts = vec![DependencyArtifact::from_path(&jar).unwrap()];
    request.tag_filter = TagFilter::new(["shared"]);

    let outcome = projector.build(&request).unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.sources.len(), 2);
    assert!(outcome.sources[1].path().ends_with("deps/traits.jar"));
}

#[test]
fn test_select_runs_against_resolved_sources() {
    let temp = project();
    let projector = Projector::new(StubEngine::new(valid_model()));
    let request = BuildRequest::new(temp.path());

    projector
        .select(&request, &SelectQuery::new("structure"))
        .unwrap();

    let commands = projector.engine().commands.lock().unwrap();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].args[0], "select");
    assert_eq!(commands[0].value_of("--selector"), Some("structure"));
    assert!(commands[0].args.last().unwrap().ends_with("model"));
    assert!(!temp.path().join("build").exists());
}
