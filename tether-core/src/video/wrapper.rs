use super::{FrameRecorder, RecorderMetadata, VideoWrapperConfig};
use crate::{error::TetherError, record::Record, Env, Render, Step};
use anyhow::Result;
use image::RgbImage;
use log::{debug, info, warn};
use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

/// Records videos of a wrapped environment by capturing a frame after each step.
///
/// See the [module documentation](super) for the recording policy.
pub struct VideoWrapper<E, R>
where
    E: Env + Render,
    R: FrameRecorder<E>,
{
    env: E,
    recorder_config: R::Config,
    directory: PathBuf,
    single_video: bool,
    save_interval: Option<usize>,
    episode_id: usize,
    video_recorder: Option<R>,
    closed: bool,
}

impl<E, R> VideoWrapper<E, R>
where
    E: Env + Render,
    R: FrameRecorder<E>,
{
    /// Wraps `env`, writing videos into `directory`.
    ///
    /// `single_video == true` produces one video with the episodes concatenated.
    /// Otherwise a new video is opened for every episode, or for every
    /// `save_interval`-th episode when `save_interval` is given.
    ///
    /// # Errors
    ///
    /// * [`TetherError::ConfigurationError`] if `save_interval` is given together
    ///   with `single_video == true`, or is not positive.
    /// * [`TetherError::FilesystemError`] if `directory` already exists.
    pub fn new(
        env: E,
        recorder_config: R::Config,
        directory: impl AsRef<Path>,
        single_video: bool,
        save_interval: Option<usize>,
    ) -> Result<Self> {
        if let Some(save_interval) = save_interval {
            if single_video {
                return Err(TetherError::ConfigurationError(
                    "save_interval not working for single video".to_string(),
                )
                .into());
            }
            if save_interval < 1 {
                return Err(TetherError::ConfigurationError(format!(
                    "save_interval {} must be positive int",
                    save_interval
                ))
                .into());
            }
        }

        let directory = normalize(&std::path::absolute(directory.as_ref())?);
        create_new_dir(&directory)?;
        info!("Created video directory {:?}", &directory);

        Ok(Self {
            env,
            recorder_config,
            directory,
            single_video,
            save_interval,
            episode_id: 0,
            video_recorder: None,
            closed: false,
        })
    }

    /// Number of calls to [`Env::reset`] so far.
    pub fn episode_id(&self) -> usize {
        self.episode_id
    }

    /// Absolute path of the output directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether a single video spans all episodes.
    pub fn single_video(&self) -> bool {
        self.single_video
    }

    /// Number of episodes between saved videos.
    pub fn save_interval(&self) -> Option<usize> {
        self.save_interval
    }

    /// Returns `true` while a recorder is open.
    pub fn is_recording(&self) -> bool {
        self.video_recorder.is_some()
    }

    /// The wrapped environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The wrapped environment.
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// An unset save interval samples every episode.
    fn is_sampled(&self) -> bool {
        match self.save_interval {
            None => true,
            Some(save_interval) => self.episode_id % save_interval == 0,
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(TetherError::InvariantError(format!(
                "video wrapper for {:?} is closed",
                self.directory
            ))
            .into());
        }
        Ok(())
    }

    /// Opens a recorder if none is open.
    ///
    /// In per-episode mode, the open recorder is closed first so that every
    /// call opens a new one.
    fn reset_video_recorder(&mut self) -> Result<()> {
        if !self.single_video {
            if let Some(mut recorder) = self.video_recorder.take() {
                recorder.close()?;
            }
        }

        if self.video_recorder.is_none() {
            let base_path = self
                .directory
                .join(format!("video.{:06}", self.episode_id));
            debug!("Open recorder at {:?}", &base_path);
            let metadata = RecorderMetadata {
                episode_id: self.episode_id,
            };
            let recorder = R::build(&self.recorder_config, &self.env, &base_path, metadata)?;
            self.video_recorder = Some(recorder);
        }

        Ok(())
    }
}

impl<E, R> Env for VideoWrapper<E, R>
where
    E: Env + Render,
    R: FrameRecorder<E>,
{
    type Config = VideoWrapperConfig<E::Config, R::Config>;
    type Obs = E::Obs;
    type Act = E::Act;
    type Info = E::Info;

    /// Builds the wrapped environment with `seed`, then wraps it.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized,
    {
        let env = E::build(&config.env_config, seed)?;
        Self::new(
            env,
            config.recorder_config.clone(),
            &config.directory,
            config.single_video,
            config.save_interval,
        )
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.check_open()?;
        if self.is_sampled() {
            self.reset_video_recorder()?;
        }
        self.episode_id += 1;
        self.env.reset()
    }

    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized,
    {
        self.check_open()?;
        let (step, record) = self.env.step(a)?;

        if self.is_sampled() {
            match self.video_recorder.as_mut() {
                Some(recorder) => recorder.capture_frame(&self.env)?,
                None => {
                    return Err(TetherError::InvariantError(format!(
                        "no video recorder is open in episode {}",
                        self.episode_id
                    ))
                    .into())
                }
            }
        }

        Ok((step.cast(), record))
    }

    /// Closes the open recorder, then the wrapped environment.
    ///
    /// Calling this method again does nothing.
    /// The wrapped environment is closed even if closing the recorder fails;
    /// the first error is returned.
    fn close(&mut self) -> Result<()> {
        let recorder_result = match self.video_recorder.take() {
            Some(mut recorder) => recorder.close(),
            None => Ok(()),
        };
        let env_result = if self.closed {
            Ok(())
        } else {
            self.closed = true;
            self.env.close()
        };
        recorder_result.and(env_result)
    }
}

impl<E, R> Render for VideoWrapper<E, R>
where
    E: Env + Render,
    R: FrameRecorder<E>,
{
    fn render(&self) -> Result<RgbImage> {
        self.env.render()
    }
}

impl<E, R> Drop for VideoWrapper<E, R>
where
    E: Env + Render,
    R: FrameRecorder<E>,
{
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close video wrapper {:?}: {}", self.directory, e);
        }
    }
}

/// Removes `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = normalized.components().next_back() {
                    normalized.pop();
                }
            }
            c => normalized.push(c),
        }
    }
    normalized
}

/// Creates `path` and its missing parents, failing if `path` itself exists.
fn create_new_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(TetherError::FilesystemError(path.to_path_buf()).into())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Act, Obs};
    use std::{cell::RefCell, rc::Rc};
    use tempdir::TempDir;

    #[derive(Clone, Debug)]
    struct CountObs(usize);

    impl Obs for CountObs {}

    #[derive(Clone, Debug)]
    struct NoopAct;

    impl Act for NoopAct {}

    #[derive(Default)]
    struct CountingEnv {
        steps: usize,
        closes: usize,
    }

    impl Env for CountingEnv {
        type Config = ();
        type Obs = CountObs;
        type Act = NoopAct;
        type Info = ();

        fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self::default())
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            self.steps = 0;
            Ok(CountObs(0))
        }

        fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)> {
            self.steps += 1;
            let step = Step::new(CountObs(self.steps), a.clone(), 1.0, false, false, ());
            Ok((step, Record::empty()))
        }

        fn close(&mut self) -> Result<()> {
            self.closes += 1;
            Ok(())
        }
    }

    impl Render for CountingEnv {
        fn render(&self) -> Result<RgbImage> {
            Ok(RgbImage::new(2, 2))
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Open(usize, PathBuf),
        Capture(usize),
        Close(usize),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct SpyRecorder {
        log: Log,
        episode_id: usize,
    }

    impl FrameRecorder<CountingEnv> for SpyRecorder {
        type Config = Log;

        fn build(
            config: &Self::Config,
            _env: &CountingEnv,
            base_path: &Path,
            metadata: RecorderMetadata,
        ) -> Result<Self> {
            config
                .borrow_mut()
                .push(Event::Open(metadata.episode_id, base_path.to_path_buf()));
            Ok(Self {
                log: config.clone(),
                episode_id: metadata.episode_id,
            })
        }

        fn capture_frame(&mut self, _env: &CountingEnv) -> Result<()> {
            self.log.borrow_mut().push(Event::Capture(self.episode_id));
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.log.borrow_mut().push(Event::Close(self.episode_id));
            Ok(())
        }
    }

    /// Fails to flush on close.
    struct BrokenRecorder;

    impl FrameRecorder<CountingEnv> for BrokenRecorder {
        type Config = ();

        fn build(
            _config: &Self::Config,
            _env: &CountingEnv,
            _base_path: &Path,
            _metadata: RecorderMetadata,
        ) -> Result<Self> {
            Ok(Self)
        }

        fn capture_frame(&mut self, _env: &CountingEnv) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    type Wrapper = VideoWrapper<CountingEnv, SpyRecorder>;

    fn opened(log: &Log) -> Vec<usize> {
        log.borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Open(id, _) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn opened_paths(log: &Log) -> Vec<PathBuf> {
        log.borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Open(_, path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    fn build_wrapper(
        dir: &TempDir,
        single_video: bool,
        save_interval: Option<usize>,
    ) -> Result<(Wrapper, Log)> {
        let log = Log::default();
        let wrapper = Wrapper::new(
            CountingEnv::default(),
            log.clone(),
            dir.path().join("videos"),
            single_video,
            save_interval,
        )?;
        Ok((wrapper, log))
    }

    #[test]
    fn test_save_interval_rejected_for_single_video() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let err = build_wrapper(&dir, true, Some(2)).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<TetherError>(),
            Some(TetherError::ConfigurationError(_))
        ));
        assert!(!dir.path().join("videos").exists());
        Ok(())
    }

    #[test]
    fn test_zero_save_interval_rejected() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let err = build_wrapper(&dir, false, Some(0)).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<TetherError>(),
            Some(TetherError::ConfigurationError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_existing_directory_rejected() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        fs::create_dir(dir.path().join("videos"))?;
        let err = build_wrapper(&dir, true, None).err().unwrap();
        match err.downcast_ref::<TetherError>() {
            Some(TetherError::FilesystemError(path)) => {
                assert_eq!(path, &dir.path().join("videos"))
            }
            _ => panic!("unexpected error: {}", err),
        }
        Ok(())
    }

    #[test]
    fn test_directory_is_created_and_absolute() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (wrapper, _) = build_wrapper(&dir, true, None)?;
        assert!(wrapper.directory().is_absolute());
        assert!(wrapper.directory().is_dir());
        Ok(())
    }

    #[test]
    fn test_episode_counter() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (mut wrapper, _) = build_wrapper(&dir, false, Some(3))?;
        assert_eq!(wrapper.episode_id(), 0);
        for n in 1..=7 {
            wrapper.reset()?;
            assert_eq!(wrapper.episode_id(), n);
        }
        Ok(())
    }

    #[test]
    fn test_single_video_opens_one_recorder() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (mut wrapper, log) = build_wrapper(&dir, true, None)?;
        for _ in 0..5 {
            wrapper.reset()?;
            wrapper.step(&NoopAct)?;
            wrapper.step(&NoopAct)?;
        }
        assert_eq!(opened(&log), vec![0]);
        assert!(!log.borrow().iter().any(|e| matches!(e, Event::Close(_))));
        assert_eq!(
            log.borrow()
                .iter()
                .filter(|e| matches!(e, Event::Capture(_)))
                .count(),
            10
        );
        wrapper.close()?;
        assert_eq!(log.borrow().last(), Some(&Event::Close(0)));
        Ok(())
    }

    #[test]
    fn test_per_episode_recorders_with_save_interval() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (mut wrapper, log) = build_wrapper(&dir, false, Some(2))?;
        for _ in 0..4 {
            wrapper.reset()?;
        }
        assert_eq!(wrapper.episode_id(), 4);
        let videos = wrapper.directory().to_path_buf();
        assert_eq!(
            *log.borrow(),
            vec![
                Event::Open(0, videos.join("video.000000")),
                Event::Close(0),
                Event::Open(2, videos.join("video.000002")),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_per_episode_recorder_count() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (mut wrapper, log) = build_wrapper(&dir, false, Some(3))?;
        for _ in 0..10 {
            wrapper.reset()?;
        }
        assert_eq!(opened(&log), vec![0, 3, 6, 9]);
        Ok(())
    }

    #[test]
    fn test_every_episode_sampled_without_interval() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (mut wrapper, log) = build_wrapper(&dir, false, None)?;
        for _ in 0..3 {
            wrapper.reset()?;
            wrapper.step(&NoopAct)?;
        }
        assert_eq!(opened(&log), vec![0, 1, 2]);
        assert_eq!(
            log.borrow()
                .iter()
                .filter(|e| matches!(e, Event::Capture(_)))
                .count(),
            3
        );
        Ok(())
    }

    #[test]
    fn test_step_uses_episode_id_set_by_reset() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (mut wrapper, log) = build_wrapper(&dir, false, Some(2))?;

        // After the first reset the counter is 1, which is not sampled.
        wrapper.reset()?;
        wrapper.step(&NoopAct)?;
        // After the second reset the counter is 2, which is sampled.
        wrapper.reset()?;
        wrapper.step(&NoopAct)?;

        assert_eq!(
            *log.borrow(),
            vec![
                Event::Open(0, wrapper.directory().join("video.000000")),
                Event::Capture(0),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_step_without_recorder_is_invariant_error() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (mut wrapper, _) = build_wrapper(&dir, true, None)?;
        let err = wrapper.step(&NoopAct).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<TetherError>(),
            Some(TetherError::InvariantError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_step_returns_inner_result() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (mut wrapper, _) = build_wrapper(&dir, true, None)?;
        wrapper.reset()?;
        let (step, _) = wrapper.step(&NoopAct)?;
        let (step2, _) = wrapper.step(&NoopAct)?;
        assert_eq!(step.obs.0, 1);
        assert_eq!(step2.obs.0, 2);
        assert_eq!(step.reward, 1.0);
        assert!(!step.is_done());
        Ok(())
    }

    #[test]
    fn test_close_twice() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (mut wrapper, log) = build_wrapper(&dir, false, None)?;
        wrapper.reset()?;
        wrapper.close()?;
        wrapper.close()?;
        assert_eq!(wrapper.env().closes, 1);
        assert!(!wrapper.is_recording());
        assert_eq!(
            log.borrow()
                .iter()
                .filter(|e| matches!(e, Event::Close(_)))
                .count(),
            1
        );
        assert!(wrapper.reset().is_err());
        Ok(())
    }

    #[test]
    fn test_env_closed_when_recorder_close_fails() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let mut wrapper: VideoWrapper<CountingEnv, BrokenRecorder> = VideoWrapper::new(
            CountingEnv::default(),
            (),
            dir.path().join("videos"),
            true,
            None,
        )?;
        wrapper.reset()?;
        let err = wrapper.close().err().unwrap();
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(wrapper.env().closes, 1);
        assert!(!wrapper.is_recording());

        wrapper.close()?;
        assert_eq!(wrapper.env().closes, 1);
        Ok(())
    }

    #[test]
    fn test_directory_is_normalized() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let log = Log::default();
        let mut wrapper = Wrapper::new(
            CountingEnv::default(),
            log.clone(),
            dir.path().join("a").join("..").join(".").join("videos"),
            true,
            None,
        )?;
        let expected = std::path::absolute(dir.path().join("videos"))?;
        assert_eq!(wrapper.directory(), expected.as_path());
        assert!(expected.is_dir());

        wrapper.reset()?;
        assert_eq!(opened_paths(&log), vec![expected.join("video.000000")]);
        Ok(())
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_drop_closes_recorder() -> Result<()> {
        let dir = TempDir::new("video_wrapper")?;
        let (mut wrapper, log) = build_wrapper(&dir, true, None)?;
        wrapper.reset()?;
        drop(wrapper);
        assert_eq!(log.borrow().last(), Some(&Event::Close(0)));
        Ok(())
    }
}
