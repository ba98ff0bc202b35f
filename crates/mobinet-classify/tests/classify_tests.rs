use mobinet_classify::{
    check_input, decode, tile_to_bgr_tensor, Classification, Classifier, ClassifyError, Result, MOBILENET_MEAN_BGR,
};
use mobinet_model::LabelTable;
use mobinet_preprocess::Tile;

/// Scores every class by how much of the tile is bright.
struct Brightness {
    labels: LabelTable,
    calls: usize,
}

impl Classifier for Brightness {
    fn infer(&mut self, tile: &Tile) -> Result<Classification> {
        check_input(tile, 2)?;
        self.calls += 1;
        let bright = tile.pixels().iter().filter(|&&p| p & 0xff > 0x80).count() as f32;
        let n = tile.pixels().len() as f32;
        decode(&[1.0 - bright / n, bright / n], &self.labels)
    }
}

fn tile(pixels: Vec<u32>) -> Tile {
    Tile::from_pixels(2, 2, pixels).unwrap()
}

#[test]
fn tensor_is_bgr_nchw_with_means_subtracted() {
    let t = tile(vec![0xff10_2030, 0xff00_0000, 0xffff_ffff, 0x0001_0203]);
    let arr = tile_to_bgr_tensor(&t, MOBILENET_MEAN_BGR);
    assert_eq!(arr.shape(), &[1, 3, 2, 2]);

    // pixel (0,0): r=0x10 g=0x20 b=0x30
    assert!((arr[(0, 0, 0, 0)] - (48.0 - 103.94)).abs() < 1e-4);
    assert!((arr[(0, 1, 0, 0)] - (32.0 - 116.78)).abs() < 1e-4);
    assert!((arr[(0, 2, 0, 0)] - (16.0 - 123.68)).abs() < 1e-4);

    // white pixel at (0,1), no scaling applied
    assert!((arr[(0, 0, 1, 0)] - (255.0 - 103.94)).abs() < 1e-4);

    // alpha ignored
    assert!((arr[(0, 0, 1, 1)] - (3.0 - 103.94)).abs() < 1e-4);
}

#[test]
fn zero_mean_keeps_raw_values() {
    let t = tile(vec![0xff01_0203; 4]);
    let arr = tile_to_bgr_tensor(&t, [0.0; 3]);
    assert_eq!(arr[(0, 0, 1, 1)], 3.0);
    assert_eq!(arr[(0, 2, 1, 1)], 1.0);
}

#[test]
fn wrong_tile_size_is_rejected() {
    let t = Tile::new(3, 2);
    let err = check_input(&t, 224).unwrap_err();
    assert!(matches!(err, ClassifyError::InputSize { expected: 224, width: 3, height: 2 }));
}

#[test]
fn boxed_classifier_dispatches() {
    let labels: LabelTable = ["dark", "bright"].into_iter().collect();
    let mut c: Box<dyn Classifier> = Box::new(Brightness { labels, calls: 0 });

    let r = c.infer(&tile(vec![0xffff_ffff, 0xffff_ffff, 0xffff_ffff, 0xff00_0000])).unwrap();
    assert_eq!(r.label, "bright");
    assert_eq!(r.label_text(), "bright = 0.750");
    assert_eq!(c.describe(), "mobinet classifier");

    assert!(c.infer(&Tile::new(4, 4)).is_err());
}
