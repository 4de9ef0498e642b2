use super::*;

use crate::foundation::core::Point;
use crate::points::correspondence::CorrespondencePoint;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "meshmorph_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn minimal_project_gets_defaults() {
    let p = MorphProject::from_reader(r#"{ "source": "a.png", "target": "b.png" }"#.as_bytes())
        .unwrap();
    assert_eq!(p.intermediate_frames, 5);
    assert_eq!(p.fps, Fps::new(5, 1).unwrap());
    assert_eq!(p.background, Rgb8::WHITE);
    assert_eq!(p.edge_rule, EdgeRule::Inclusive);
    assert!(p.points.is_empty());
    assert!(p.canvas.is_none());
    assert_eq!(p, MorphProject::new("a.png", "b.png"));
}

#[test]
fn points_may_contain_pending_rows() {
    let json = r#"{
        "source": "a.png",
        "target": "b.png",
        "points": [
            { "source": { "x": 1.0, "y": 2.0 }, "target": { "x": 3.0, "y": 4.0 } },
            { "source": { "x": 5.0, "y": 6.0 }, "target": null }
        ],
        "edge_rule": "top_left",
        "background": { "r": 0, "g": 0, "b": 0 }
    }"#;
    let p = MorphProject::from_reader(json.as_bytes()).unwrap();
    assert_eq!(p.points.len(), 2);
    assert_eq!(
        p.points.pairs()[0],
        CorrespondencePoint::new(Point::new(1.0, 2.0), Point::new(3.0, 4.0))
    );
    assert_eq!(p.points.pending_count(), 1);
    assert_eq!(p.edge_rule, EdgeRule::TopLeft);
    assert_eq!(p.background, Rgb8::BLACK);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = MorphProject::from_reader(
        r#"{ "source": "a.png", "target": "b.png", "frames": 3 }"#.as_bytes(),
    )
    .unwrap_err();
    assert!(matches!(err, MorphError::Validation(_)));
}

#[test]
fn validate_rejects_zero_frames_and_bad_canvas() {
    let mut p = MorphProject::new("a.png", "b.png");
    p.intermediate_frames = 0;
    assert!(matches!(p.validate(), Err(MorphError::InvalidParameter(_))));

    let mut p = MorphProject::new("a.png", "b.png");
    p.canvas = Some(Canvas {
        width: 0,
        height: 4,
    });
    assert!(p.validate().is_err());
}

#[test]
fn json_survives_a_save_and_reload() {
    let mut p = MorphProject::new("a.png", "b.png");
    p.points.push_pair(Point::new(3.0, 3.0), Point::new(4.0, 2.0));
    p.canvas = Some(Canvas {
        width: 32,
        height: 24,
    });
    let back = MorphProject::from_reader(p.to_json_pretty().unwrap().as_bytes()).unwrap();
    assert_eq!(back, p);
}

#[test]
fn from_path_resolves_images_and_normalizes_to_canvas() {
    let dir = temp_dir("project_from_path");
    std::fs::create_dir_all(&dir).unwrap();
    image::RgbImage::from_pixel(8, 6, image::Rgb([10, 20, 30]))
        .save(dir.join("a.png"))
        .unwrap();
    image::RgbImage::from_pixel(16, 12, image::Rgb([200, 100, 0]))
        .save(dir.join("b.png"))
        .unwrap();
    std::fs::write(
        dir.join("job.json"),
        r#"{ "source": "a.png", "target": "b.png", "intermediate_frames": 2 }"#,
    )
    .unwrap();

    let p = MorphProject::from_path(dir.join("job.json")).unwrap();
    assert_eq!(p.source, dir.join("a.png"));

    let (a, b) = p.load_images().unwrap();
    assert_eq!(a.canvas(), b.canvas());
    assert_eq!((a.width, a.height), (8, 6));
    assert_eq!(b.pixel(3, 3), Rgb8::new(200, 100, 0));

    let ctx = p.prepare().unwrap();
    assert_eq!(ctx.points().len(), 4);
    assert_eq!(p.request().unwrap().intermediate_frames(), 2);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_project_file_is_a_validation_error() {
    let err = MorphProject::from_path(temp_dir("nope").join("missing.json")).unwrap_err();
    assert!(matches!(err, MorphError::Validation(_)));
}
