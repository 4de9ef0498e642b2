use super::*;

use crate::foundation::core::Point;

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn solid(w: u32, h: u32, c: Rgb8) -> RasterImage {
    RasterImage::filled(w, h, c)
}

fn checker(w: u32, h: u32) -> RasterImage {
    RasterImage::from_rgb_image(image::RgbImage::from_fn(w, h, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            image::Rgb([230, 40, 10])
        } else {
            image::Rgb([5, 90, 200])
        }
    }))
}

fn corner_context(source: RasterImage, target: RasterImage) -> MorphContext {
    MorphContext::prepare(source, target, &CorrespondenceSet::new()).unwrap()
}

#[test]
fn request_rejects_zero_and_spaces_t_evenly() {
    assert!(matches!(
        MorphRequest::new(0),
        Err(MorphError::InvalidParameter(_))
    ));

    let req = MorphRequest::new(3).unwrap();
    let ts: Vec<f64> = req.t_values().collect();
    assert_eq!(ts, vec![0.25, 0.5, 0.75]);
    assert_eq!(req.t_at(1), 0.25);
}

#[test]
fn prepare_anchors_corners_and_builds_mesh() {
    let ctx = corner_context(solid(16, 12, Rgb8::BLACK), solid(16, 12, Rgb8::WHITE));
    assert_eq!(ctx.points().len(), 4);
    assert_eq!(ctx.mesh().len(), 2);
    assert!(ctx.points().source().contains(&p(16.0, 12.0)));
}

#[test]
fn prepare_rejects_mismatched_image_sizes() {
    let err = MorphContext::prepare(
        solid(8, 8, Rgb8::BLACK),
        solid(9, 8, Rgb8::BLACK),
        &CorrespondenceSet::new(),
    )
    .unwrap_err();
    assert!(matches!(err, MorphError::Validation(_)));
}

#[test]
fn prepare_surfaces_incomplete_point_errors() {
    let mut set = CorrespondenceSet::new();
    set.push_pair(p(2.0, 2.0), p(3.0, 3.0));
    let points = set.freeze();
    assert!(matches!(points, Err(MorphError::InsufficientPoints { found: 1 })));

    let err = MorphContext::new(
        solid(4, 4, Rgb8::BLACK),
        solid(4, 4, Rgb8::BLACK),
        MorphPoints::new(
            vec![p(0.0, 0.0), p(4.0, 0.0), p(0.0, 4.0)],
            vec![p(0.0, 0.0), p(4.0, 0.0), p(0.0, 4.0)],
        )
        .unwrap(),
        TriangleMesh::from_triangles(Vec::new()),
    )
    .unwrap_err();
    assert!(matches!(err, MorphError::Validation(_)));
}

#[test]
fn sequence_has_bookends_and_n_intermediates() {
    let source = checker(16, 16);
    let target = solid(16, 16, Rgb8::new(0, 0, 0));
    let ctx = corner_context(source.clone(), target.clone());
    let mut generator = FrameSequenceGenerator::new(ctx, MorphOptions::default());
    assert_eq!(generator.state(), GeneratorState::Idle);

    let seq = generator.generate(MorphRequest::new(4).unwrap()).unwrap();
    assert_eq!(seq.len(), 6);
    assert_eq!(seq.frames()[0], source);
    assert_eq!(seq.frames()[5], target);
    assert_eq!(generator.state(), GeneratorState::Complete);

    let stats = seq.stats();
    assert_eq!(stats.frames_total, 6);
    assert_eq!(stats.frames_rendered, 4);
    assert_eq!(stats.raster.triangles_drawn, 8);
    assert_eq!(stats.raster.triangles_degenerate, 0);
}

#[test]
fn corner_only_mesh_is_a_pure_cross_dissolve() {
    let source = solid(10, 10, Rgb8::new(0, 0, 0));
    let target = solid(10, 10, Rgb8::new(200, 100, 50));
    let ctx = corner_context(source, target);
    let generator = FrameSequenceGenerator::new(ctx, MorphOptions::default());

    let (frame, stats) = generator.render_frame(0.5).unwrap();
    assert_eq!(stats.triangles_drawn, 2);
    for y in 0..10 {
        for x in 0..10 {
            assert_eq!(frame.pixel(x, y), Rgb8::new(100, 50, 25));
        }
    }
}

#[test]
fn render_frame_validates_t() {
    let ctx = corner_context(solid(4, 4, Rgb8::BLACK), solid(4, 4, Rgb8::WHITE));
    let generator = FrameSequenceGenerator::new(ctx, MorphOptions::default());
    assert!(matches!(
        generator.render_frame(1.5),
        Err(MorphError::InvalidParameter(_))
    ));
    assert!(matches!(
        generator.render_frame(f64::NAN),
        Err(MorphError::InvalidParameter(_))
    ));
}

#[test]
fn progress_is_reported_once_per_intermediate_in_order() {
    let ctx = corner_context(checker(8, 8), solid(8, 8, Rgb8::WHITE));
    let mut generator = FrameSequenceGenerator::new(ctx, MorphOptions::default());

    let mut seen = Vec::new();
    let mut observer = |done: u32, total: u32| seen.push((done, total));
    generator
        .generate_with(MorphRequest::new(3).unwrap(), &mut observer, None)
        .unwrap();
    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn cancelled_render_fails_without_frames() {
    let ctx = corner_context(checker(8, 8), solid(8, 8, Rgb8::WHITE));
    let mut generator = FrameSequenceGenerator::new(ctx, MorphOptions::default());
    let token = CancelToken::new();

    let cancel_after_first = token.clone();
    let mut observer = move |done: u32, _total: u32| {
        if done == 1 {
            cancel_after_first.cancel();
        }
    };
    let err = generator
        .generate_with(MorphRequest::new(5).unwrap(), &mut observer, Some(&token))
        .unwrap_err();
    assert!(matches!(
        err,
        MorphError::Cancelled {
            completed: 1,
            total: 5
        }
    ));
    assert_eq!(generator.state(), GeneratorState::Failed);
}

#[test]
fn parallel_frames_and_row_bands_match_sequential_output() {
    let mut set = CorrespondenceSet::new();
    set.push_pair(p(8.0, 6.0), p(11.0, 9.0));
    set.push_pair(p(3.5, 12.0), p(5.0, 10.0));
    let source = checker(20, 16);
    let target = RasterImage::from_rgb_image(image::RgbImage::from_fn(20, 16, |x, y| {
        image::Rgb([(x * 12) as u8, (y * 15) as u8, 128])
    }));
    let ctx = MorphContext::prepare(source, target, &set).unwrap();
    let request = MorphRequest::new(7).unwrap();

    let mut sequential = FrameSequenceGenerator::new(ctx.clone(), MorphOptions::default());
    let expected = sequential.generate(request).unwrap();

    let opts = MorphOptions {
        threading: RenderThreading {
            parallel: true,
            chunk_size: 3,
            threads: Some(3),
            row_bands: 4,
        },
        ..MorphOptions::default()
    };
    let mut parallel = FrameSequenceGenerator::new(ctx, opts);
    let actual = parallel.generate(request).unwrap();

    assert_eq!(actual.fingerprint(), expected.fingerprint());
    assert_eq!(actual, expected);
}

#[test]
fn zero_threads_is_rejected_and_zero_chunk_is_normalized() {
    assert!(matches!(
        build_thread_pool(Some(0)),
        Err(MorphError::InvalidParameter(_))
    ));
    assert_eq!(normalized_chunk_size(0), 1);
    assert_eq!(normalized_chunk_size(12), 12);

    let ctx = corner_context(solid(4, 4, Rgb8::BLACK), solid(4, 4, Rgb8::WHITE));
    let opts = MorphOptions {
        threading: RenderThreading {
            parallel: true,
            threads: Some(0),
            ..RenderThreading::default()
        },
        ..MorphOptions::default()
    };
    let mut generator = FrameSequenceGenerator::new(ctx, opts);
    assert!(generator.generate(MorphRequest::new(2).unwrap()).is_err());
    assert_eq!(generator.state(), GeneratorState::Failed);
}

#[test]
fn zero_threads_is_rejected_on_the_sequential_path() {
    assert!(RenderThreading::default().validate().is_ok());

    let ctx = corner_context(solid(4, 4, Rgb8::BLACK), solid(4, 4, Rgb8::WHITE));
    let opts = MorphOptions {
        threading: RenderThreading {
            parallel: false,
            threads: Some(0),
            row_bands: 1,
            ..RenderThreading::default()
        },
        ..MorphOptions::default()
    };
    let mut generator = FrameSequenceGenerator::new(ctx, opts);
    assert!(matches!(
        generator.generate(MorphRequest::new(2).unwrap()),
        Err(MorphError::InvalidParameter(_))
    ));
    assert_eq!(generator.state(), GeneratorState::Failed);
}

#[test]
fn context_rejects_malformed_rasters() {
    let mut short = solid(4, 4, Rgb8::BLACK);
    short.data.truncate(10);
    let err = MorphContext::prepare(short, solid(4, 4, Rgb8::WHITE), &CorrespondenceSet::new())
        .unwrap_err();
    assert!(matches!(err, MorphError::Validation(_)));
}

#[test]
fn fingerprint_is_order_sensitive() {
    let ctx = corner_context(checker(6, 6), solid(6, 6, Rgb8::WHITE));
    let mut generator = FrameSequenceGenerator::new(ctx, MorphOptions::default());
    let seq = generator.generate(MorphRequest::new(2).unwrap()).unwrap();

    let mut reversed = seq.clone();
    reversed.frames.reverse();
    assert_ne!(seq.fingerprint(), reversed.fingerprint());
}
