//! Endless Marble Run entry point
//!
//! Headless runner: loads a JSON config (first argument, optional), steps the
//! world for the configured number of frames and logs progress.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use endless_marble_run::WorldConfig;
    use endless_marble_run::sim::World;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    env_logger::init();
    log::info!("Endless Marble Run (native) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => match WorldConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{}", err);
                std::process::exit(1);
            }
        },
        None => {
            log::info!("No config given, using defaults");
            WorldConfig::default()
        }
    };

    let mut rng = Pcg32::seed_from_u64(config.seed);
    let mut world = World::new(&config, &mut rng);

    let mut collisions = 0;
    for frame in 0..config.frames {
        match world.frame(&config.sim, &config.allowed_kinds, &mut rng) {
            Ok(report) => {
                collisions += report.collisions;
                if !report.terminal.is_empty() {
                    log::debug!("Frame {}: balls {:?} reached an end", frame, report.terminal);
                }
            }
            Err(err) => {
                log::warn!("Stopped at frame {}: {}", frame, err);
                break;
            }
        }

        if frame % 600 == 0 {
            let lowest = world
                .balls()
                .iter()
                .map(|ball| ball.position().z)
                .fold(f32::INFINITY, f32::min);
            log::info!(
                "Frame {}: {} pieces, lowest ball at z = {:.2}",
                frame,
                world.chain().len(),
                lowest
            );
        }
    }

    log::info!(
        "Finished after {} frames, {} collisions, {} pieces live",
        world.frames(),
        collisions,
        world.chain().len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; the renderer drives `World` directly
}
