use super::*;

fn cfg(width: u32, height: u32, fps: Fps) -> SinkConfig {
    SinkConfig { width, height, fps }
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(validate_config(&cfg(0, 10, Fps::default())).is_err());
    assert!(validate_config(&cfg(11, 10, Fps::default())).is_err());
    assert!(validate_config(&cfg(10, 10, Fps { num: 5, den: 0 })).is_err());
    assert!(validate_config(&cfg(10, 10, Fps::default())).is_ok());
}

#[test]
fn command_streams_rgb24_at_rational_rate() {
    let cmd = build_command(
        &cfg(640, 480, Fps::new(25, 2).unwrap()),
        &FfmpegSinkOpts::new("out/morph.mp4"),
    );
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    assert_eq!(args[0], "-y");
    let pix = args.iter().position(|a| a == "-pix_fmt").unwrap();
    assert_eq!(args[pix + 1], "rgb24");
    let r = args.iter().position(|a| a == "-r").unwrap();
    assert_eq!(args[r + 1], "25/2");
    assert!(r < args.iter().position(|a| a == "-i").unwrap());
    assert!(args.contains(&"640x480".to_string()));
    assert_eq!(args.last().unwrap(), "out/morph.mp4");
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("never.mp4"));
    let frame = RasterImage::filled(2, 2, crate::foundation::core::Rgb8::BLACK);
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame),
        Err(MorphError::Encode(_))
    ));
    assert!(sink.end().is_err());
}
