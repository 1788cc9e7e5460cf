//! End-to-end frame scenarios: flat frames, ramps, minimal containers.

use sx_capture::archive::{read_container, CardValue, BLOCK_SIZE, CARD_LEN};
use sx_capture::{encode, normalize, ArchivalMetadata, FramePipeline, RawFrame};

fn ramp(width: u32, height: u32) -> RawFrame {
    RawFrame::new(width, height, 16, (0..(width * height) as u16).collect())
}

#[test]
fn test_all_zero_frame() {
    let frame = RawFrame::new(10, 10, 16, vec![0; 100]);

    for stretch in [true, false] {
        let raster = normalize(&frame, stretch).unwrap();
        let stats = raster.statistics();

        assert_eq!(stats.min_value, 0);
        assert_eq!(stats.max_value, 0);
        assert!(raster.samples().iter().all(|&b| b == 0));
    }
}

#[test]
fn test_linear_ramp_stretched() {
    let frame = ramp(10, 10);
    let raster = normalize(&frame, true).unwrap();
    let bytes = raster.samples();

    assert_eq!(bytes.len(), 100);
    assert_eq!(bytes[0], 0);
    assert_eq!(bytes[99], 255);
    assert!(bytes.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_two_by_two_container_size() {
    let frame = RawFrame::new(2, 2, 16, vec![10, 20, 30, 40]);
    let raster = normalize(&frame, true).unwrap();
    let container = encode(&frame, &raster.statistics(), &ArchivalMetadata::default()).unwrap();

    assert_eq!(container.header().len(), BLOCK_SIZE);
    assert_eq!(container.data().len(), BLOCK_SIZE);
    assert_eq!(container.len(), 5760);
    assert!(container.data()[16..].iter().all(|&b| b == 0));
}

#[test]
fn test_extremes_independent_of_stretch() {
    let frame = RawFrame::new(3, 3, 16, vec![512, 9, 700, 65000, 18, 300, 44, 9, 1024]);

    for stretch in [true, false] {
        let raster = normalize(&frame, stretch).unwrap();
        let container =
            encode(&frame, &raster.statistics(), &ArchivalMetadata::default()).unwrap();
        let parsed = read_container(container.as_bytes()).unwrap();

        assert_eq!(parsed.value("DATAMAX"), Some(&CardValue::Integer(65000)));
        assert_eq!(parsed.value("DATAMIN"), Some(&CardValue::Integer(9)));
    }
}

#[test]
fn test_end_card_at_boundary() {
    let frame = ramp(5, 4);
    let processed = FramePipeline::default().process(&frame).unwrap();
    let header = processed.container.header();

    let end = header
        .chunks_exact(CARD_LEN)
        .position(|card| card.starts_with(b"END "))
        .unwrap();
    let card = &header[end * CARD_LEN..(end + 1) * CARD_LEN];
    assert_eq!(card, format!("END{}", " ".repeat(77)).as_bytes());
}

#[test]
fn test_large_frame_spans_multiple_blocks() {
    // 1000 samples * 4 bytes = 4000 bytes of pixels -> two data blocks.
    let frame = RawFrame::new(40, 25, 16, vec![1234; 1000]);
    let processed = FramePipeline::default().process(&frame).unwrap();

    assert_eq!(processed.container.header().len(), BLOCK_SIZE);
    assert_eq!(processed.container.data().len(), 2 * BLOCK_SIZE);

    let parsed = read_container(processed.container.as_bytes()).unwrap();
    assert!(parsed.pixels.iter().all(|&p| p == 1234.0));
}
