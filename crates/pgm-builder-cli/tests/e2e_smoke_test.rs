use std::{fs, path::PathBuf};

use tempfile::tempdir;

use pgm_builder_cli::{Args, CliError, run};

/// Collects all .toml files from a directory
fn collect_toml_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demo documents live at the workspace root.
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args_for(input: &std::path::Path, output: &std::path::Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_demos = collect_toml_files(demos_path());
    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_filename = format!(
            "{}.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        match run(&args_for(demo_path, &output_path)) {
            Ok(()) => {
                let written = fs::read_to_string(&output_path).unwrap();
                let json: serde_json::Value = serde_json::from_str(&written).unwrap();
                assert!(
                    json["nodes"].as_array().is_some_and(|nodes| !nodes.is_empty()),
                    "{} produced no nodes",
                    demo_path.display()
                );
            }
            Err(e) => failed_demos.push((demo_path.clone(), e)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_demos = collect_toml_files(demos_path().join("errors"));
    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        if run(&args_for(demo_path, &output_path)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
        assert!(
            !output_path.exists(),
            "{} wrote output despite failing",
            demo_path.display()
        );
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_lda_layout() {
    let temp_dir = tempdir().unwrap();
    let output_path = temp_dir.path().join("lda.json");

    run(&args_for(&demos_path().join("lda.toml"), &output_path)).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();

    let nodes = json["nodes"].as_array().unwrap();
    let names: Vec<_> = nodes.iter().map(|node| node["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["alpha", "beta", "w", "theta", "z", "phi"]);

    // theta sits one horizontal offset to the right of alpha.
    let theta = &nodes[3];
    assert!((theta["x"].as_f64().unwrap() - 1.3).abs() < 1e-4);
    assert!((theta["y"].as_f64().unwrap() - 2.0).abs() < 1e-4);

    assert_eq!(json["plates"].as_array().unwrap().len(), 3);
}

#[test]
fn e2e_document_error_has_span() {
    let temp_dir = tempdir().unwrap();
    let output_path = temp_dir.path().join("bad_key.json");

    let err = run(&args_for(
        &demos_path().join("errors").join("bad_key.toml"),
        &output_path,
    ))
    .unwrap_err();

    let CliError::Document { span, .. } = err else {
        panic!("Expected document error, got {err}");
    };
    assert!(span.is_some());
}

#[test]
fn e2e_missing_input() {
    let temp_dir = tempdir().unwrap();
    let input_path = temp_dir.path().join("absent.toml");
    let output_path = temp_dir.path().join("absent.json");

    let err = run(&args_for(&input_path, &output_path)).unwrap_err();
    assert!(matches!(err, CliError::Io(_)));
}
