//! Paper Toss entry point
//!
//! Native builds run a stage headless: load a level, fire every launcher,
//! simulate a few seconds and log what happened. Rendering and audio go to
//! recorders.
//!
//! Usage: `paper-toss [level.json] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = headless::run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web build drives `Stage` from its own frame callback
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::Context;

    use paper_toss::actor::ActorKey;
    use paper_toss::assets::PreloadedAssets;
    use paper_toss::audio::AudioLog;
    use paper_toss::camera::CameraController;
    use paper_toss::consts::FIXED_STEP;
    use paper_toss::level::PropRegistry;
    use paper_toss::render::CommandRecorder;
    use paper_toss::{Settings, Stage};

    const SETTINGS_FILE: &str = "settings.json";
    const DEFAULT_LEVEL: &str = "demo.json";
    const DEFAULT_SECONDS: f32 = 5.0;

    pub fn run() -> anyhow::Result<()> {
        log::info!("Paper Toss (headless) starting...");
        let settings = Settings::load_from(SETTINGS_FILE);

        let mut args = std::env::args().skip(1);
        let level = args
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| settings.level_path(DEFAULT_LEVEL));
        let seconds = match args.next() {
            Some(arg) => arg
                .parse::<f32>()
                .with_context(|| format!("invalid duration `{arg}`"))?,
            None => DEFAULT_SECONDS,
        };

        let registry = PropRegistry::default();
        let mut assets = PreloadedAssets::new();
        registry.preload(&mut assets);
        log::info!("Preloaded {} assets", assets.len());

        let mut stage = Stage::new(settings);
        stage.load(&level, &registry, &assets)?;

        let launchers: Vec<ActorKey> = stage
            .scene()
            .iter()
            .map(|(_, key)| key)
            .filter(|&key| {
                stage
                    .actor(key)
                    .is_some_and(|a| a.launch(stage.world()).is_some())
            })
            .collect();

        let mut camera = CameraController::default();
        for launcher in launchers {
            if let Some(ball) = stage.fire(launcher, &assets)? {
                camera.follow(ball);
            }
        }

        let mut audio = AudioLog::new();
        let mut recorder = CommandRecorder::new();
        let frames = (seconds / FIXED_STEP).ceil() as usize;
        let mut steps = 0;
        for _ in 0..frames {
            steps += stage.frame(FIXED_STEP, &mut audio);
            camera.update(&stage, FIXED_STEP);
            recorder.clear();
            stage.draw(&mut recorder, camera.position, camera.zoom);
        }

        log::info!(
            "Simulated {seconds:.1}s: {steps} steps, {} contact callbacks, {} sounds",
            stage.contacts_delivered(),
            audio.played.len()
        );
        log::info!(
            "Last frame: {} sprites, {} lines; {} actors alive, camera at {}",
            recorder.sprites().count(),
            recorder.line_count(),
            stage.actors().len(),
            camera.position
        );

        stage.unload();
        Ok(())
    }
}
