mod common;

use common::*;
use image::{ColorType, GenericImageView};
use mockito::Matcher;
use std::fs;
use supplier_ingest::{IngestError, PipelineRunner, RunState, Stage};

#[test]
fn test_convert_outputs_target_dimensions_at_all_depths() {
    let temp_dir = create_temp_directory();
    let (images, _) = create_input_dirs(temp_dir.path());
    let nested = create_nested_directory_structure(&images);

    create_tiff(&images, "001.tif", 120, 90);
    create_tiff(&nested, "002.TIF", 30, 30);
    fs::write(images.join("003.tif"), b"").unwrap();
    fs::write(nested.join("004.tif"), b"garbage, not a tiff").unwrap();

    let config = test_config(temp_dir.path(), "http://127.0.0.1:1");
    let mut runner = PipelineRunner::new(config).unwrap();
    let summary = runner.run(&[Stage::Convert]).unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 2);
    assert!(summary.uploads.is_empty());

    for output in [images.join("001.jpeg"), nested.join("002.jpeg")] {
        let img = image::open(&output).unwrap();
        assert_eq!(img.dimensions(), (60, 40));
        assert_eq!(img.color(), ColorType::Rgb8);
    }
    assert!(!images.join("003.jpeg").exists());
    assert!(!nested.join("004.jpeg").exists());
    assert!(images.join("001.tif").exists());
}

#[test]
fn test_parallel_convert_matches_sequential_counts() {
    let temp_dir = create_temp_directory();
    let (images, _) = create_input_dirs(temp_dir.path());
    for i in 0..6 {
        create_tiff(&images, &format!("{:03}.tif", i), 20, 20);
    }
    fs::write(images.join("bad.tif"), b"nope").unwrap();

    let mut config = test_config(temp_dir.path(), "http://127.0.0.1:1");
    config.jobs = 3;
    let mut runner = PipelineRunner::new(config).unwrap();
    let summary = runner.convert_images().unwrap();

    assert_eq!(summary.processed, 6);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn test_batch_upload_sends_one_request_in_file_order() {
    let temp_dir = create_temp_directory();
    let (_, descriptions) = create_input_dirs(temp_dir.path());
    create_descriptor(&descriptions, "apple", "Apple", "500 lbs");
    create_descriptor(&descriptions, "banana", "Banana", "3.5 lbs");
    create_descriptor(&descriptions, "cherry", "Cherry", "abc lbs");
    fs::write(descriptions.join("date.txt"), "Date\n12\n").unwrap();
    create_descriptor(&descriptions, "elder", "Elderberry", "12");

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/fruits/")
        .match_body(Matcher::Json(serde_json::json!([
            {"name": "Apple", "weight": 500, "description": "A fine Apple.", "image-name": "apple.jpeg"},
            {"name": "Banana", "weight": 3.5, "description": "A fine Banana.", "image-name": "banana.jpeg"},
            {"name": "Elderberry", "weight": 12, "description": "A fine Elderberry.", "image-name": "elder.jpeg"}
        ])))
        .with_status(201)
        .expect(1)
        .create();

    let config = test_config(temp_dir.path(), &server.url());
    let mut runner = PipelineRunner::new(config).unwrap();
    let summary = runner.run(&[Stage::UploadDescriptions]).unwrap();

    mock.assert();
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(runner.state(), RunState::Done);
}

#[test]
fn test_batch_upload_rejection_aborts_run() {
    let temp_dir = create_temp_directory();
    let (_, descriptions) = create_input_dirs(temp_dir.path());
    create_descriptor(&descriptions, "apple", "Apple", "500 lbs");

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/fruits/")
        .with_status(500)
        .expect(1)
        .create();

    let config = test_config(temp_dir.path(), &server.url());
    let mut runner = PipelineRunner::new(config).unwrap();
    let result = runner.run(&[Stage::UploadDescriptions]);

    mock.assert();
    assert!(matches!(
        result,
        Err(IngestError::ServerRejected { status: 500, .. })
    ));
    assert_eq!(runner.state(), RunState::Failed);
}

#[test]
fn test_binary_upload_continues_past_server_error() {
    let temp_dir = create_temp_directory();
    let (images, _) = create_input_dirs(temp_dir.path());
    for name in ["a.jpeg", "b.jpeg", "c.jpeg"] {
        fs::write(images.join(name), format!("bytes of {}", name)).unwrap();
    }
    fs::write(images.join("a.tif"), b"source, not uploaded").unwrap();

    let mut server = mockito::Server::new();
    let mocks: Vec<_> = [("a", 201), ("b", 500), ("c", 200)]
        .iter()
        .map(|(name, status)| {
            server
                .mock("POST", "/upload/")
                .match_body(Matcher::Regex(format!(r#"filename="{}\.jpeg""#, name)))
                .with_status(*status)
                .expect(1)
                .create()
        })
        .collect();

    let config = test_config(temp_dir.path(), &server.url());
    let mut runner = PipelineRunner::new(config).unwrap();
    let summary = runner.run(&[Stage::UploadImages]).unwrap();

    for mock in &mocks {
        mock.assert();
    }
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);
    assert!(summary.to_string().contains("2 succeeded, 1 failed"));
    assert_eq!(runner.state(), RunState::Done);
}

#[test]
fn test_missing_root_performs_no_uploads() {
    let temp_dir = create_temp_directory();

    let mut server = mockito::Server::new();
    let mock = server.mock("POST", Matcher::Any).expect(0).create();

    let config = test_config(temp_dir.path(), &server.url());
    let mut runner = PipelineRunner::new(config).unwrap();
    let result = runner.run(&Stage::ALL);

    assert!(matches!(result, Err(IngestError::PathNotFound(_))));
    mock.assert();
}

#[test]
fn test_full_run_converts_then_uploads() {
    let temp_dir = create_temp_directory();
    let (images, descriptions) = create_input_dirs(temp_dir.path());
    create_tiff(&images, "apple.tif", 50, 50);
    create_tiff(&images, "banana.tif", 50, 50);
    create_descriptor(&descriptions, "apple", "Apple", "500 lbs");
    create_descriptor(&descriptions, "banana", "Banana", "300 lbs");

    let mut server = mockito::Server::new();
    let images_mock = server
        .mock("POST", "/upload/")
        .with_status(201)
        .expect(2)
        .create();
    let batch_mock = server
        .mock("POST", "/fruits/")
        .with_status(201)
        .expect(1)
        .create();

    let config = test_config(temp_dir.path(), &server.url());
    let mut runner = PipelineRunner::new(config).unwrap();
    let summary = runner.run(&Stage::ALL).unwrap();

    images_mock.assert();
    batch_mock.assert();
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.succeeded(), 3);
    assert_eq!(summary.failed(), 0);
}
