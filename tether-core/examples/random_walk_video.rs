//! Records videos of a random walk on a small grid.
//!
//! ```bash
//! cargo run --example random_walk_video -- --dir /tmp/random_walk --single-video=false --save-interval 2
//! ```
use anyhow::Result;
use clap::Parser;
use image::{Rgb, RgbImage};
use log::info;
use tether_core::{
    record::{Record, RecordValue},
    video::{ImageSequenceRecorder, ImageSequenceRecorderConfig, VideoWrapper, VideoWrapperConfig},
    Act, Env, Obs, Render, Step,
};

const SIZE: u32 = 16;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Output directory, must not exist.
    #[arg(long)]
    dir: String,

    /// Concatenate all episodes into one video.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    single_video: bool,

    /// Number of episodes between saved videos.
    #[arg(long)]
    save_interval: Option<usize>,

    /// Number of episodes.
    #[arg(long, default_value_t = 4)]
    n_episodes: usize,
}

#[derive(Clone, Debug)]
struct GridObs([u32; 2]);

impl Obs for GridObs {}

#[derive(Clone, Debug)]
struct GridAct(u8);

impl Act for GridAct {}

struct RandomWalk {
    pos: [u32; 2],
    t: usize,
    rng: u64,
}

impl RandomWalk {
    // xorshift, enough for picking moves
    fn next_act(&mut self) -> GridAct {
        self.rng ^= self.rng << 13;
        self.rng ^= self.rng >> 7;
        self.rng ^= self.rng << 17;
        GridAct((self.rng % 4) as u8)
    }
}

impl Env for RandomWalk {
    type Config = ();
    type Obs = GridObs;
    type Act = GridAct;
    type Info = ();

    fn build(_config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            pos: [SIZE / 2, SIZE / 2],
            t: 0,
            rng: seed as u64 | 1,
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.pos = [SIZE / 2, SIZE / 2];
        self.t = 0;
        Ok(GridObs(self.pos))
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
        let [x, y] = self.pos;
        self.pos = match a.0 {
            0 => [x.saturating_sub(1), y],
            1 => [(x + 1).min(SIZE - 1), y],
            2 => [x, y.saturating_sub(1)],
            _ => [x, (y + 1).min(SIZE - 1)],
        };
        self.t += 1;
        let record = Record::from_slice(&[("t", RecordValue::Scalar(self.t as f32))]);
        let step = Step::new(GridObs(self.pos), a.clone(), 0.0, false, self.t >= 50, ());
        Ok((step, record))
    }
}

impl Render for RandomWalk {
    fn render(&self) -> Result<RgbImage> {
        let mut img = RgbImage::from_pixel(SIZE, SIZE, Rgb([32, 32, 32]));
        img.put_pixel(self.pos[0], self.pos[1], Rgb([255, 200, 0]));
        Ok(img)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = VideoWrapperConfig::new((), ImageSequenceRecorderConfig::default(), &args.dir)
        .single_video(args.single_video)
        .save_interval(args.save_interval);
    let mut env = VideoWrapper::<RandomWalk, ImageSequenceRecorder>::build(&config, 42)?;

    for _ in 0..args.n_episodes {
        env.reset()?;
        loop {
            let act = env.env_mut().next_act();
            let (step, _) = env.step(&act)?;
            if step.is_done() {
                break;
            }
        }
        info!("Finished episode {}", env.episode_id() - 1);
    }
    env.close()?;

    Ok(())
}
