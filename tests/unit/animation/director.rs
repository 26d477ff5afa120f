use super::*;
use crate::assets::loader::SizeTarget;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::SawcutError;
use rand::SeedableRng;

const GREEN: [u8; 4] = [0, 128, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const MAGENTA: [u8; 4] = [200, 0, 200, 255];
const YELLOW: [u8; 4] = [255, 255, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn solid(w: u32, h: u32, c: [u8; 4]) -> Layer {
    Layer::solid(w, h, Rgba8Premul::opaque(c[0], c[1], c[2])).unwrap()
}

// 80x60 canvas, 20 frames: approach [0,4), profile approach [4,8), cut [8,12), split [12,20).
fn tiny_config() -> AnimationConfig {
    let mut cfg = AnimationConfig::standard("bg.png", "tool.png");
    cfg.canvas = CanvasSize {
        width: 80,
        height: 60,
    };
    cfg.duration_secs = 1.0;
    cfg.fps = Fps { num: 20, den: 1 };
    cfg.assets.subject.size = SizeTarget::Exact {
        width: 20,
        height: 20,
    };
    cfg.layout.actor = Anchor::BottomRight {
        margin_x: 2,
        margin_y: 2,
    };
    cfg.layout.subject_start = Anchor::TopLeft { x: 55, y: 10 };
    cfg.layout.subject_rest = Anchor::TopLeft { x: 30, y: 10 };
    cfg.motion.shake_px = 0;
    cfg
}

fn tiny_director(cfg: &AnimationConfig) -> SceneDirector {
    let scene = Scene::from_layers(
        cfg,
        solid(40, 30, GREEN),
        Some(solid(10, 10, BLUE)),
        solid(6, 6, YELLOW),
        solid(20, 20, MAGENTA),
    );
    SceneDirector::new(cfg, scene).unwrap()
}

fn compose(d: &SceneDirector, frame: u64, seed: u64) -> Canvas {
    let mut rng = StdRng::seed_from_u64(seed);
    d.compose(FrameIndex(frame), &mut rng).unwrap()
}

fn px(c: &Canvas, x: u32, y: u32) -> [u8; 4] {
    c.pixel(x, y).unwrap()
}

#[test]
fn scene_layout_resolves_anchors() {
    let cfg = tiny_config();
    let d = tiny_director(&cfg);
    let scene = d.scene();
    assert_eq!(scene.background.anchor(), PixelPos::new(20, 15));
    assert_eq!(
        scene.actor.as_ref().map(|a| a.anchor()),
        Some(PixelPos::new(68, 48))
    );
    assert_eq!(scene.subject_start, PixelPos::new(55, 10));
    assert_eq!(scene.subject_rest, PixelPos::new(30, 10));
    assert_eq!(
        scene.rest_rect(),
        PixelRect {
            x: 30,
            y: 10,
            width: 20,
            height: 20
        }
    );
    assert_eq!(d.total_frames(), 20);
    assert_eq!(d.size(), cfg.canvas);
}

#[test]
fn approach_draws_actor_tool_and_subject_at_start() {
    let d = tiny_director(&tiny_config());
    let c = compose(&d, 0, 1);
    assert_eq!((c.width(), c.height()), (80, 60));
    assert_eq!(px(&c, 0, 0), WHITE);
    assert_eq!(px(&c, 25, 40), GREEN);
    assert_eq!(px(&c, 70, 50), BLUE);
    assert_eq!(px(&c, 60, 12), MAGENTA);
    // Tool rests over the centre of the subject's rest rect.
    assert_eq!(px(&c, 40, 20), YELLOW);
    assert_eq!(px(&c, 36, 20), GREEN);
}

#[test]
fn actor_leaves_after_its_share_of_the_approach() {
    let d = tiny_director(&tiny_config());
    // Approach frames 0..4 sit at local progress 0, 0.25, 0.5, 0.75.
    assert_eq!(px(&compose(&d, 1, 1), 70, 50), BLUE);
    for frame in [2, 3] {
        let c = compose(&d, frame, 1);
        assert_eq!(px(&c, 70, 50), WHITE, "{frame}");
        assert_eq!(px(&c, 60, 12), MAGENTA, "{frame}");
        assert_eq!(px(&c, 40, 20), YELLOW, "{frame}");
    }

    let mut cfg = tiny_config();
    cfg.motion.actor_share = 1.0;
    let always = tiny_director(&cfg);
    assert_eq!(px(&compose(&always, 3, 1), 70, 50), BLUE);
}

#[test]
fn approach_shake_moves_whole_frame() {
    let mut cfg = tiny_config();
    cfg.motion.shake_px = 5;
    let d = tiny_director(&cfg);
    let still = {
        let mut cfg = cfg.clone();
        cfg.motion.shake_px = 0;
        compose(&tiny_director(&cfg), 0, 0)
    };
    let shaken: Vec<_> = (0..16).map(|seed| compose(&d, 0, seed)).collect();
    assert!(shaken.iter().any(|c| c.data() != still.data()));
}

#[test]
fn profile_approach_moves_toward_rest_without_actor() {
    let d = tiny_director(&tiny_config());
    let first = compose(&d, 4, 1);
    assert_eq!(px(&first, 60, 12), MAGENTA);
    assert_eq!(px(&first, 70, 50), WHITE);

    let later = compose(&d, 7, 1);
    assert_eq!(px(&later, 45, 12), MAGENTA);
    assert_eq!(px(&later, 74, 12), WHITE);
    // The subject never reaches its rest position during this phase.
    assert_ne!(px(&later, 31, 12), MAGENTA);
}

#[test]
fn cut_centres_tool_on_subject() {
    let d = tiny_director(&tiny_config());
    let c = compose(&d, 8, 1);
    assert_eq!(px(&c, 31, 11), MAGENTA);
    assert_eq!(px(&c, 40, 20), YELLOW);
    assert_eq!(px(&c, 36, 20), MAGENTA);

    // Half-way through, the tool has drifted right and down by five pixels.
    let mid = compose(&d, 10, 1);
    let p = px(&mid, 45, 25);
    assert!(p[0] > 245 && p[1] > 245 && p[2] < 10, "{p:?}");
    assert_eq!(px(&mid, 38, 18), MAGENTA);
}

#[test]
fn split_adds_droplets_below_rest_rect() {
    let d = tiny_director(&tiny_config());
    let c = compose(&d, 12, 3);
    let mut reddish = 0;
    for y in 20..60 {
        for x in 28..52 {
            let [r, g, b, _] = px(&c, x, y);
            if r > 150 && g < 100 && b < 100 {
                reddish += 1;
            }
        }
    }
    assert!(reddish > 0);
}

#[test]
fn split_halves_leave_rest_rect() {
    let d = tiny_director(&tiny_config());
    let rest = compose(&d, 8, 1);
    assert_eq!(px(&rest, 32, 12), MAGENTA);

    let late = compose(&d, 19, 1);
    let [r, g, b, a] = px(&late, 32, 12);
    assert!(r > 200 && g > 200 && b > 200 && a == 255, "{:?}", [r, g, b, a]);
}

#[test]
fn compose_is_deterministic_per_seed() {
    let d = tiny_director(&tiny_config());
    for frame in [0, 5, 9, 13, 19] {
        assert_eq!(
            compose(&d, frame, 42).data(),
            compose(&d, frame, 42).data(),
            "{frame}"
        );
    }
}

#[test]
fn out_of_range_frame_fails() {
    let d = tiny_director(&tiny_config());
    let mut rng = StdRng::seed_from_u64(0);
    assert!(d.compose(FrameIndex(20), &mut rng).is_err());
}

#[test]
fn invalid_config_is_rejected() {
    let mut cfg = tiny_config();
    cfg.phases.cut = 0.5;
    let scene = Scene::from_layers(
        &cfg,
        solid(1, 1, GREEN),
        None,
        solid(1, 1, YELLOW),
        solid(1, 1, MAGENTA),
    );
    assert!(matches!(
        SceneDirector::new(&cfg, scene),
        Err(SawcutError::Validation(_))
    ));
}

#[test]
fn scene_load_reads_assets_and_substitutes_missing_subject() {
    let dir = tempfile::tempdir().unwrap();
    let bg = dir.path().join("bg.png");
    let tool = dir.path().join("tool.png");
    image::RgbaImage::from_pixel(64, 32, image::Rgba([0, 128, 0, 255]))
        .save(&bg)
        .unwrap();
    image::RgbaImage::from_pixel(12, 12, image::Rgba([255, 255, 0, 255]))
        .save(&tool)
        .unwrap();

    let mut cfg = tiny_config();
    cfg.assets.background.source = bg.clone();
    cfg.assets.background.size = SizeTarget::Width { px: 40 };
    cfg.assets.actor = None;
    cfg.assets.tool.source = tool;
    cfg.assets.tool.size = SizeTarget::Width { px: 6 };

    let subject = SubjectSource::Path(dir.path().join("nobody.png"));
    let d = SceneDirector::load(&cfg, &subject).unwrap();
    assert_eq!(
        (d.scene().background.width(), d.scene().background.height()),
        (40, 20)
    );
    assert_eq!((d.scene().tool.width(), d.scene().tool.height()), (6, 6));
    assert_eq!(
        (d.scene().subject.width(), d.scene().subject.height()),
        (20, 20)
    );
    assert!(d.scene().actor.is_none());
}

#[test]
fn scene_load_fails_on_unreadable_background() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = tiny_config();
    let missing = dir.path().join("missing-bg.png");
    cfg.assets.background.source = missing.clone();

    let err = Scene::load(&cfg, &cfg.default_subject()).unwrap_err();
    match err {
        SawcutError::AssetLoad { source_id, .. } => {
            assert_eq!(source_id, missing.display().to_string());
        }
        other => panic!("unexpected error: {other}"),
    }
}
