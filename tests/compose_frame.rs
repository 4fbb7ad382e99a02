use std::io::Cursor;

use audiogram::amplitude::extract_amplitudes;
use audiogram::{FrameComposer, FrameRgba, RenderRequest};

fn request_json(extra: serde_json::Value) -> RenderRequest {
    let mut base = serde_json::json!({
        "audio_path": "clip.mp3",
        "output_path": "out/clip.mp4",
        "duration": 2.0,
        "header_title_source": "none",
        "show_subtitles": false,
    });
    base.as_object_mut()
        .unwrap()
        .extend(extra.as_object().unwrap().clone());
    serde_json::from_value(base).unwrap()
}

fn px(frame: &FrameRgba, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn vertical_frame_has_three_bands() {
    let req = request_json(serde_json::json!({}));
    let samples = vec![0.2f32; 88_200];
    let amps = extract_amplitudes(&samples, 2.0, 24);
    let mut composer = FrameComposer::new(&req, amps).unwrap();
    let frame = composer.compose(1.0).unwrap();

    assert_eq!((frame.width, frame.height), (1080, 1920));
    assert!(frame.premultiplied);
    // Header and footer in primary, central band in background.
    assert_eq!(px(&frame, 10, 10), [242, 101, 34, 255]);
    assert_eq!(px(&frame, 10, 400), [235, 213, 197, 255]);
    assert_eq!(px(&frame, 10, 1900), [242, 101, 34, 255]);
}

#[test]
fn custom_colors_flow_through() {
    let req = request_json(serde_json::json!({
        "format": "square",
        "colors": {
            "primary": [10, 20, 30],
            "background": [200, 200, 200],
        }
    }));
    let amps = extract_amplitudes(&[], 2.0, 24);
    let mut composer = FrameComposer::new(&req, amps).unwrap();
    let frame = composer.compose(0.0).unwrap();

    assert_eq!((frame.width, frame.height), (1080, 1080));
    assert_eq!(px(&frame, 5, 5), [10, 20, 30, 255]);
    assert_eq!(px(&frame, 540, 540), [200, 200, 200, 255]);
}

#[test]
fn format_override_changes_canvas_size() {
    let req = request_json(serde_json::json!({
        "format": "square",
        "formats": {"square": {"width": 720, "height": 720}},
    }));
    let amps = extract_amplitudes(&[], 2.0, 24);
    let mut composer = FrameComposer::new(&req, amps).unwrap();
    let frame = composer.compose(0.0).unwrap();
    assert_eq!((frame.width, frame.height), (720, 720));
}

#[test]
fn same_request_renders_identical_frames() {
    let req = request_json(serde_json::json!({"format": "horizontal"}));
    let samples: Vec<f32> = (0..88_200).map(|i| (i as f32 * 0.002).sin()).collect();
    let amps = extract_amplitudes(&samples, 2.0, 24);

    let mut a = FrameComposer::new(&req, amps.clone()).unwrap();
    let mut b = FrameComposer::new(&req, amps).unwrap();
    for t in [0.0, 0.7, 1.9] {
        assert_eq!(a.compose(t).unwrap().data, b.compose(t).unwrap().data);
    }
}

#[test]
fn logo_replaces_the_waveform() {
    let dir = tempfile::tempdir().unwrap();
    let logo_path = dir.path().join("logo.png");
    let img = image::RgbaImage::from_pixel(32, 32, image::Rgba([0, 0, 255, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(&logo_path, buf).unwrap();

    let req = request_json(serde_json::json!({
        "logo_path": logo_path,
    }));
    let samples = vec![0.5f32; 88_200];
    let amps = extract_amplitudes(&samples, 2.0, 24);
    let mut composer = FrameComposer::new(&req, amps).unwrap();
    let geo = *composer.geometry();
    let frame = composer.compose(1.0).unwrap();

    let center_y = geo.central_top + geo.central_height / 2;
    assert_eq!(px(&frame, geo.width / 2, center_y), [0, 0, 255, 255]);
}

#[test]
fn missing_logo_file_falls_back_to_waveform() {
    let req = request_json(serde_json::json!({
        "logo_path": "no/such/logo.png",
    }));
    let samples = vec![0.5f32; 88_200];
    let amps = extract_amplitudes(&samples, 2.0, 24);
    let mut composer = FrameComposer::new(&req, amps).unwrap();
    let geo = *composer.geometry();
    let frame = composer.compose(1.0).unwrap();

    // A constant signal normalizes to full amplitude, so the center column
    // of the central band is covered by a primary-colored bar.
    let center_y = geo.central_top + geo.central_height / 2;
    let mut found_bar = false;
    for x in 0..geo.width {
        if px(&frame, x, center_y) == [242, 101, 34, 255] {
            found_bar = true;
            break;
        }
    }
    assert!(found_bar);
}

#[test]
fn subtitle_box_stays_inside_the_central_band() {
    let with_subs = request_json(serde_json::json!({
        "show_subtitles": true,
        "transcript_chunks": [{"start": 0.0, "end": 2.0, "text": "Hi"}],
    }));
    let plain = request_json(serde_json::json!({}));
    let amps = extract_amplitudes(&[], 2.0, 24);

    let mut a = FrameComposer::new(&with_subs, amps.clone()).unwrap();
    let geo = *a.geometry();
    let subtitled = a.compose(1.0).unwrap();
    let baseline = FrameComposer::new(&plain, amps).unwrap().compose(1.0).unwrap();

    let mut changed = 0u64;
    for y in 0..geo.height {
        for x in 0..geo.width {
            if px(&subtitled, x, y) != px(&baseline, x, y) {
                changed += 1;
                assert!(
                    y >= geo.central_top && y < geo.central_bottom,
                    "subtitle pixel at ({x}, {y}) outside the central band"
                );
            }
        }
    }
    assert!(changed > 0, "active chunk must draw a subtitle box");
}

#[test]
fn timestamp_outside_every_chunk_draws_no_subtitle() {
    let req = request_json(serde_json::json!({
        "show_subtitles": true,
        "transcript_chunks": [{"start": 0.0, "end": 0.5, "text": "Hi"}],
    }));
    let plain = request_json(serde_json::json!({}));
    let amps = extract_amplitudes(&[], 2.0, 24);

    let subtitled = FrameComposer::new(&req, amps.clone()).unwrap().compose(1.0).unwrap();
    let baseline = FrameComposer::new(&plain, amps).unwrap().compose(1.0).unwrap();
    assert_eq!(subtitled.data, baseline.data);
}

#[test]
fn request_round_trips_with_transcript_chunks() {
    let req = request_json(serde_json::json!({
        "transcript_chunks": [
            {"start": 0.0, "end": 1.0, "text": "Hello, world!"},
            {"start": 1.0, "end": 2.0, "text": "Goodbye."},
        ],
    }));
    req.validate().unwrap();
    assert_eq!(req.transcript_chunks.len(), 2);
    assert!(req.transcript_chunks[0].contains(0.5));
    assert!(!req.transcript_chunks[0].contains(1.0));

    let json = serde_json::to_string(&req).unwrap();
    let back: RenderRequest = serde_json::from_str(&json).unwrap();
    assert_eq!(back.transcript_chunks[1].text, "Goodbye.");
}
