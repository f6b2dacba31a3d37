// Integration tests for session export
//
// These tests verify the on-disk formats written by the session exporter
// and the gaze filtering that decides what reaches the point cloud.

use anyhow::Result;
use artifact_recorder::export::{SessionExporter, MANIFEST_FILE, MODEL_FILE, POINT_CLOUD_FILE};
use artifact_recorder::geometry::{unapply_rotation, Bounds, MeshData, Vec2, Vec3};
use artifact_recorder::session::{PointCloud, QuestionnaireAnswer};
use artifact_recorder::tracking::{
    GazeFrame, GazeHit, GazeSampler, HeadPose, PointSample, ScriptedTracker, StaticArtifact,
};
use artifact_recorder::{AudioChunkSet, RecorderError};
use std::fs;
use tempfile::TempDir;

fn triangle() -> MeshData {
    MeshData {
        vertices: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        normals: Vec::new(),
        uvs: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        submeshes: vec![vec![0, 1, 2]],
    }
}

fn cube_bounds() -> Bounds {
    Bounds::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
}

#[test]
fn test_obj_mirrors_vertices_and_reverses_winding() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let exporter = SessionExporter::new(temp_dir.path());

    let path = exporter.export_mesh("bowl", &triangle(), &Vec3::zeros())?;
    assert_eq!(path, temp_dir.path().join("bowl").join(MODEL_FILE));

    let obj = fs::read_to_string(&path)?;
    let lines: Vec<&str> = obj.lines().collect();

    assert_eq!(lines[0], "# Exported Gaze Object");
    assert!(lines.contains(&"v 0.000000 0.000000 0.000000"));
    assert!(lines.contains(&"v -1.000000 0.000000 0.000000"));
    assert!(lines.contains(&"v 0.000000 1.000000 0.000000"));
    assert!(lines.contains(&"vt 1.000000 0.000000"));
    assert_eq!(lines.iter().filter(|l| l.starts_with("vn ")).count(), 3);
    assert_eq!(lines.last(), Some(&"f 3/3/3 2/2/2 1/1/1"));

    Ok(())
}

#[test]
fn test_obj_normals_computed_before_winding_swap() -> Result<()> {
    let authored = triangle().to_authoring_frame(&Vec3::zeros())?;

    // Mirrored triangle (0,0,0) (-1,0,0) (0,1,0) under its source winding 0,1,2 faces -Z
    for n in &authored.normals {
        assert!((n + Vec3::z()).norm() < 1e-6, "normal {:?}", n);
    }
    assert_eq!(authored.submeshes, vec![vec![2, 1, 0]]);

    let temp_dir = TempDir::new()?;
    let path = SessionExporter::new(temp_dir.path()).export_mesh("bowl", &triangle(), &Vec3::zeros())?;
    let obj = fs::read_to_string(path)?;
    assert_eq!(obj.lines().filter(|l| *l == "vn 0.000000 0.000000 -1.000000").count(), 3);

    Ok(())
}

#[test]
fn test_rotated_mesh_vertices_go_through_unapply() -> Result<()> {
    let euler = Vec3::new(30.0, 45.0, 60.0);
    let mesh = triangle();
    let authored = mesh.to_authoring_frame(&euler)?;

    for (original, exported) in mesh.vertices.iter().zip(&authored.vertices) {
        assert_eq!(*exported, unapply_rotation(original, &euler));
    }

    Ok(())
}

#[test]
fn test_malformed_mesh_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let exporter = SessionExporter::new(temp_dir.path());

    let mut mesh = triangle();
    mesh.submeshes = vec![vec![0, 1]];
    assert!(matches!(
        exporter.export_mesh("bowl", &mesh, &Vec3::zeros()),
        Err(RecorderError::InvalidInput(_))
    ));

    mesh.submeshes = vec![vec![0, 1, 7]];
    assert!(matches!(
        exporter.export_mesh("bowl", &mesh, &Vec3::zeros()),
        Err(RecorderError::InvalidInput(_))
    ));
}

#[test]
fn test_export_all_is_best_effort_per_kind() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let exporter = SessionExporter::new(temp_dir.path());

    let mut cloud = PointCloud::default();
    cloud.push(PointSample {
        position: Vec3::new(-0.0, 0.5, -1.25),
        timestamp: 0.25,
    });
    let answers = vec![QuestionnaireAnswer {
        timestamp: 3.0,
        answer: "Eerie, somehow".to_string(),
        estimated_position: Vec3::new(1.0, 0.0, 0.0),
    }];

    let report = exporter.export_all("bowl", &Vec3::zeros(), &cloud, None, &answers);

    assert!(!report.is_complete());
    assert!(matches!(report.mesh, Err(RecorderError::MissingDependency(_))));
    assert_eq!(report.errors().len(), 1);

    let cloud_csv = fs::read_to_string(report.point_cloud.as_ref().map_err(|e| anyhow::anyhow!("{}", e))?)?;
    assert_eq!(cloud_csv, "x,y,z,timestamp\n0.000000,0.500000,-1.250000,0.250000\n");

    let qa_path = report
        .questionnaire
        .as_ref()
        .map_err(|e| anyhow::anyhow!("{}", e))?
        .clone()
        .expect("answers should be written");
    assert_eq!(
        fs::read_to_string(qa_path)?,
        "estX,estY,estZ,answer,timestamp\n1.000000,0.000000,0.000000,\"Eerie, somehow\",3.000000\n"
    );

    Ok(())
}

#[test]
fn test_empty_session_writes_header_only_point_cloud() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let exporter = SessionExporter::new(temp_dir.path());

    let path = exporter.export_point_cloud("bowl", &PointCloud::default())?;
    assert_eq!(path, temp_dir.path().join("bowl").join(POINT_CLOUD_FILE));
    assert_eq!(fs::read_to_string(path)?, "x,y,z,timestamp\n");

    assert!(exporter.export_questionnaire("bowl", &[])?.is_none());
    let manifest = exporter.write_manifest("bowl", &AudioChunkSet::default())?;
    assert!(manifest.ends_with(MANIFEST_FILE));
    assert_eq!(fs::read_to_string(manifest)?, "");

    Ok(())
}

#[test]
fn test_unwritable_session_dir_reports_storage_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blocker = temp_dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way")?;

    let exporter = SessionExporter::new(&blocker);
    let result = exporter.export_point_cloud("bowl", &PointCloud::default());
    assert!(matches!(result, Err(RecorderError::Storage { .. })));

    Ok(())
}

#[test]
fn test_sampler_drops_off_target_and_out_of_bounds_hits() {
    let tracker = ScriptedTracker::new();
    let artifact = StaticArtifact::new(
        "bowl",
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::zeros(),
        cube_bounds(),
    );
    let bounds = cube_bounds();
    let mut sampler = GazeSampler::new();

    // Tracking invalid: not counted at all
    assert!(sampler.sample(&tracker, &artifact, &bounds, 0.0).is_none());
    assert_eq!(sampler.samples_taken(), 0);

    tracker.look_at("lamp", Vec3::new(10.0, 0.0, 0.0));
    assert!(sampler.sample(&tracker, &artifact, &bounds, 1.0).is_none());

    tracker.look_at("bowl", Vec3::new(12.0, 0.0, 0.0));
    assert!(sampler.sample(&tracker, &artifact, &bounds, 2.0).is_none());

    // Inclusive bounds: a hit on the face is kept
    tracker.look_at("bowl", Vec3::new(11.0, 0.5, 0.0));
    let point = sampler
        .sample(&tracker, &artifact, &bounds, 3.0)
        .expect("hit on the bounds face is accepted");
    assert_eq!(point.position, Vec3::new(-1.0, 0.5, 0.0));
    assert_eq!(point.timestamp, 3.0);

    assert_eq!(sampler.samples_taken(), 3);
    assert_eq!(sampler.samples_accepted(), 1);
    assert_eq!(sampler.last_local_hit(), Vec3::new(-1.0, 0.5, 0.0));
}

#[test]
fn test_sampler_keeps_last_tracker_reading() {
    let tracker = ScriptedTracker::new();
    let artifact = StaticArtifact::new("bowl", Vec3::new(10.0, 0.0, 0.0), Vec3::zeros(), cube_bounds());
    let mut sampler = GazeSampler::new();
    assert!(sampler.last_sample().is_none());

    tracker.set_frame(GazeFrame {
        valid: true,
        head: HeadPose {
            position: Vec3::new(0.0, 1.6, 0.0),
            ..HeadPose::default()
        },
        origin: Vec3::new(0.0, 1.6, 0.1),
        direction: Vec3::x(),
        hit: Some(GazeHit {
            target_id: "lamp".to_string(),
            world_position: Vec3::new(4.0, 1.6, 0.1),
        }),
    });
    assert!(sampler.sample(&tracker, &artifact, &cube_bounds(), 1.5).is_none());

    let rejected = sampler.last_sample().expect("valid tick is kept");
    assert_eq!(rejected.timestamp, 1.5);
    assert_eq!(rejected.head_position, Vec3::new(0.0, 1.6, 0.0));
    assert_eq!(rejected.head_forward, Vec3::z());
    assert_eq!(rejected.eye_origin, Vec3::new(0.0, 1.6, 0.1));
    assert_eq!(rejected.eye_direction, Vec3::x());
    assert_eq!(rejected.hit_target.as_deref(), Some("lamp"));
    assert!(rejected.local_hit_position.is_none());

    tracker.look_at("bowl", Vec3::new(10.5, 0.0, 0.0));
    assert!(sampler.sample(&tracker, &artifact, &cube_bounds(), 2.0).is_some());
    let accepted = sampler.last_sample().expect("accepted tick is kept");
    assert_eq!(accepted.local_hit_position, Some(Vec3::new(0.5, 0.0, 0.0)));
}

#[test]
fn test_sampler_maps_hits_through_artifact_transform() {
    let tracker = ScriptedTracker::new();
    let euler = Vec3::new(0.0, 90.0, 0.0);
    let artifact = StaticArtifact::new("bowl", Vec3::zeros(), euler, cube_bounds());
    let mut sampler = GazeSampler::new();

    // World +X on an artifact turned 90° about Y is local +Z
    tracker.look_at("bowl", Vec3::new(0.5, 0.0, 0.0));
    let point = sampler
        .sample(&tracker, &artifact, &cube_bounds(), 0.0)
        .expect("hit inside bounds");

    let local = Vec3::new(0.0, 0.0, 0.5);
    assert!((point.position - unapply_rotation(&local, &euler)).norm() < 1e-5);
}
