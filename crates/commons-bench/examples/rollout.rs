//! Random-policy rollout on the reference map.
//!
//! ```text
//! RUST_LOG=commons_engine=debug cargo run -p commons-bench --example rollout -- \
//!     [STEPS] [--frames DIR] [--every N] [--replay FILE]
//! ```
//!
//! Prints per-episode totals, optionally dumps PPM frames every `N` steps
//! and records a replay log, which is verified at the end.

use std::error::Error;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use commons_bench::{random_actions, reference_profile};
use commons_core::EnvKey;
use commons_engine::HarvestEnv;
use commons_render::Renderer;
use commons_replay::{verify_replay, ReplayReader, ReplayWriter};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Args {
    steps: usize,
    frames: Option<PathBuf>,
    every: usize,
    replay: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        steps: 1000,
        frames: None,
        every: 50,
        replay: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--frames" => args.frames = Some(it.next().ok_or("--frames needs a directory")?.into()),
            "--replay" => args.replay = Some(it.next().ok_or("--replay needs a path")?.into()),
            "--every" => {
                let v = it.next().ok_or("--every needs a number")?;
                args.every = v.parse().map_err(|e| format!("--every {v}: {e}"))?;
            }
            other => {
                args.steps = other
                    .parse()
                    .map_err(|e| format!("unexpected argument {other:?}: {e}"))?;
            }
        }
    }
    args.every = args.every.max(1);
    Ok(args)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;
    let env = HarvestEnv::new(reference_profile())?;
    let reset_key = EnvKey(42);
    let (_, mut state) = env.reset(reset_key);

    let mut renderer = args
        .frames
        .as_ref()
        .map(|dir| -> Result<Renderer, Box<dyn Error>> {
            fs::create_dir_all(dir)?;
            Ok(Renderer::new(env.num_agents(), env.config().obs_size))
        })
        .transpose()?;

    let mut writer = match &args.replay {
        Some(path) => Some(ReplayWriter::for_env(
            BufWriter::new(File::create(path)?),
            &env,
            reset_key,
        )?),
        None => None,
    };

    let mut episode_reward = vec![0.0f32; env.num_agents()];
    let mut episode = 0;
    for t in 0..args.steps {
        let [step_key, policy_key] = reset_key.fold_in(t as u64 + 1).split_n::<2>();
        let actions = random_actions(policy_key, env.num_agents());
        let result = env.step(step_key, &state, &actions);

        if let Some(w) = writer.as_mut() {
            w.write_step(step_key, &actions, &result.state)?;
        }
        for (acc, r) in episode_reward.iter_mut().zip(&result.info.original_rewards) {
            *acc += r;
        }
        if let (Some(renderer), Some(dir)) = (renderer.as_mut(), args.frames.as_ref()) {
            if t % args.every == 0 {
                renderer
                    .render(&result.state)
                    .save_ppm(dir.join(format!("frame_{t:06}.ppm")))?;
            }
        }

        if result.state.inner_t == 0 {
            episode += 1;
            let total: f32 = episode_reward.iter().sum();
            println!(
                "episode {episode:>3}: total reward {total:>8.1}, per agent {:?}, apples left {}",
                episode_reward.iter().map(|r| r.round() as i64).collect::<Vec<_>>(),
                result.info.apple_count,
            );
            episode_reward.iter_mut().for_each(|r| *r = 0.0);
        }
        let done = result.done.all;
        state = result.state;
        if done {
            info!(step = t + 1, "outer episode finished");
            break;
        }
    }

    if let (Some(mut w), Some(path)) = (writer, args.replay.as_ref()) {
        w.flush()?;
        drop(w);
        let reader = ReplayReader::open(BufReader::new(File::open(path)?))?;
        let frames = verify_replay(reader, &env)?;
        println!("replay {} verified: {frames} frames", path.display());
    }
    Ok(())
}
