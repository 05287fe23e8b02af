//! Audio context (control side) and renderer (audio thread side)

use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, TrySendError};

use super::analyser::{Analyser, AnalyserHandle};
use super::{AudioGraph, GraphState, Route};
use crate::error::GraphError;
use crate::synth::Voice;

/// Voices that can wait in the queue before the renderer picks them up
const QUEUE_CAPACITY: usize = 256;

/// Live voices the renderer reserves room for up front
const VOICE_CAPACITY: usize = 64;

const RUNNING: u8 = 0;
const SUSPENDED: u8 = 1;
const CLOSED: u8 = 2;

struct Shared {
    sample_rate: u32,
    frames: AtomicU64,
    state: AtomicU8,
    live_nodes: AtomicUsize,
    analyser: AnalyserHandle,
}

impl Shared {
    fn state(&self) -> GraphState {
        match self.state.load(Ordering::Acquire) {
            RUNNING => GraphState::Running,
            SUSPENDED => GraphState::Suspended,
            _ => GraphState::Closed,
        }
    }
}

struct Scheduled {
    voice: Box<dyn Voice>,
    route: Route,
    nodes: usize,
}

/// Control-side handle to the output graph. Cheap to clone.
#[derive(Clone)]
pub struct AudioContext {
    shared: Arc<Shared>,
    tx: Sender<Scheduled>,
}

impl AudioContext {
    /// Create a suspended context and the renderer that will play it
    pub fn new(sample_rate: u32, volume: f32) -> (Self, Renderer) {
        let (tx, rx) = crossbeam_channel::bounded(QUEUE_CAPACITY);
        let shared = Arc::new(Shared {
            sample_rate,
            frames: AtomicU64::new(0),
            state: AtomicU8::new(SUSPENDED),
            live_nodes: AtomicUsize::new(0),
            analyser: Arc::new(Mutex::new(Analyser::new())),
        });

        let renderer = Renderer {
            shared: shared.clone(),
            rx,
            voices: Vec::with_capacity(VOICE_CAPACITY),
            tap: Vec::new(),
            volume: volume.clamp(0.0, 1.0),
        };

        (Self { shared, tx }, renderer)
    }

    /// Stop the clock and render silence until resumed
    pub fn suspend(&self) {
        let _ = self.shared.state.compare_exchange(
            RUNNING,
            SUSPENDED,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Permanently shut the context down
    pub fn close(&self) {
        self.shared.state.store(CLOSED, Ordering::Release);
    }

    /// Graph nodes held by voices that have not finished yet
    pub fn live_nodes(&self) -> usize {
        self.shared.live_nodes.load(Ordering::Acquire)
    }

    /// The shared analysis tap
    pub fn analyser(&self) -> AnalyserHandle {
        self.shared.analyser.clone()
    }
}

impl AudioGraph for AudioContext {
    fn sample_rate(&self) -> u32 {
        self.shared.sample_rate
    }

    fn current_time(&self) -> f64 {
        self.shared.frames.load(Ordering::Acquire) as f64 / self.shared.sample_rate as f64
    }

    fn state(&self) -> GraphState {
        self.shared.state()
    }

    fn resume(&self) -> Result<(), GraphError> {
        match self.shared.state.compare_exchange(
            SUSPENDED,
            RUNNING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) | Err(RUNNING) => Ok(()),
            Err(_) => Err(GraphError::Closed),
        }
    }

    fn connect(&self, voice: Box<dyn Voice>, route: Route) -> Result<(), GraphError> {
        if self.state() == GraphState::Closed {
            return Err(GraphError::Closed);
        }

        let nodes = voice.node_count();
        self.shared.live_nodes.fetch_add(nodes, Ordering::AcqRel);

        match self.tx.try_send(Scheduled {
            voice,
            route,
            nodes,
        }) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.shared.live_nodes.fetch_sub(nodes, Ordering::AcqRel);
                match err {
                    TrySendError::Full(_) => Err(GraphError::QueueFull),
                    TrySendError::Disconnected(_) => Err(GraphError::Closed),
                }
            }
        }
    }
}

/// Owns every live voice and renders the mono mix.
///
/// Lives on the audio thread (or in the offline render loop). Dropping it
/// closes the context.
pub struct Renderer {
    shared: Arc<Shared>,
    rx: Receiver<Scheduled>,
    voices: Vec<Scheduled>,
    tap: Vec<f32>,
    volume: f32,
}

impl Renderer {
    pub fn sample_rate(&self) -> u32 {
        self.shared.sample_rate
    }

    /// Number of voices currently owned by the renderer
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Render one block of mono samples and advance the clock
    pub fn render(&mut self, out: &mut [f32]) {
        while let Ok(scheduled) = self.rx.try_recv() {
            self.voices.push(scheduled);
        }

        if self.shared.state() != GraphState::Running {
            out.fill(0.0);
            return;
        }

        let sample_rate = self.shared.sample_rate as f64;
        let mut frame = self.shared.frames.load(Ordering::Acquire);
        self.tap.clear();

        for sample in out.iter_mut() {
            let now = frame as f64 / sample_rate;
            let mut mix = 0.0;
            let mut tap = 0.0;
            for scheduled in &mut self.voices {
                let value = scheduled.voice.render(now);
                mix += value;
                if scheduled.route == Route::Tapped {
                    tap += value;
                }
            }
            *sample = (mix as f32 * self.volume).clamp(-1.0, 1.0);
            self.tap.push(tap as f32);
            frame += 1;
        }

        self.shared.frames.store(frame, Ordering::Release);

        let now = frame as f64 / sample_rate;
        let live_nodes = &self.shared.live_nodes;
        self.voices.retain(|scheduled| {
            let finished = scheduled.voice.is_finished(now);
            if finished {
                live_nodes.fetch_sub(scheduled.nodes, Ordering::AcqRel);
            }
            !finished
        });

        // Never block the audio thread on a reader.
        if let Ok(mut analyser) = self.shared.analyser.try_lock() {
            analyser.push_block(&self.tap);
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.shared.state.store(CLOSED, Ordering::Release);
        let pending = self.voices.drain(..).chain(self.rx.try_iter());
        let released: usize = pending.map(|scheduled| scheduled.nodes).sum();
        self.shared.live_nodes.fetch_sub(released, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::PulseParams;
    use crate::synth::PulseVoice;

    /// Constant level between start and stop
    struct Dc {
        level: f64,
        start: f64,
        stop: f64,
    }

    impl Voice for Dc {
        fn render(&mut self, now: f64) -> f64 {
            if now >= self.start && now < self.stop {
                self.level
            } else {
                0.0
            }
        }

        fn is_finished(&self, now: f64) -> bool {
            now >= self.stop
        }

        fn node_count(&self) -> usize {
            1
        }
    }

    fn dc(level: f64, start: f64, stop: f64) -> Box<dyn Voice> {
        Box::new(Dc { level, start, stop })
    }

    #[test]
    fn test_starts_suspended_with_frozen_clock() {
        let (ctx, mut renderer) = AudioContext::new(1000, 1.0);
        assert_eq!(ctx.state(), GraphState::Suspended);

        let mut block = [1.0f32; 100];
        renderer.render(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
        assert_eq!(ctx.current_time(), 0.0);
    }

    #[test]
    fn test_clock_follows_rendered_frames() {
        let (ctx, mut renderer) = AudioContext::new(1000, 1.0);
        ctx.resume().unwrap();
        assert_eq!(ctx.state(), GraphState::Running);

        let mut block = [0.0f32; 250];
        renderer.render(&mut block);
        renderer.render(&mut block);
        assert!((ctx.current_time() - 0.5).abs() < 1e-12);

        ctx.suspend();
        renderer.render(&mut block);
        assert!((ctx.current_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_voice_starts_at_scheduled_time() {
        let (ctx, mut renderer) = AudioContext::new(100, 1.0);
        ctx.resume().unwrap();
        ctx.connect(dc(0.5, 0.1, 1.0), Route::Mix).unwrap();

        let mut block = [0.0f32; 20];
        renderer.render(&mut block);
        assert!(block[..10].iter().all(|&s| s == 0.0));
        assert!(block[10..].iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_finished_voices_release_nodes() {
        let (ctx, mut renderer) = AudioContext::new(1000, 1.0);
        ctx.resume().unwrap();
        assert_eq!(ctx.live_nodes(), 0);

        let params = PulseParams {
            frequency: 880.0,
            lfo_rate: 30.0,
        };
        ctx.connect(Box::new(PulseVoice::new(&params, 0.0, 1000)), Route::Mix)
            .unwrap();
        assert_eq!(ctx.live_nodes(), 3);

        let mut block = [0.0f32; 500];
        renderer.render(&mut block);
        assert_eq!(ctx.live_nodes(), 3);
        assert_eq!(renderer.voice_count(), 1);

        renderer.render(&mut block);
        assert_eq!(ctx.live_nodes(), 0);
        assert_eq!(renderer.voice_count(), 0);
    }

    #[test]
    fn test_only_tapped_voices_reach_analyser() {
        let (ctx, mut renderer) = AudioContext::new(1000, 1.0);
        ctx.resume().unwrap();
        ctx.connect(dc(0.5, 0.0, 10.0), Route::Mix).unwrap();

        let mut block = [0.0f32; 64];
        renderer.render(&mut block);
        assert!(block.iter().all(|&s| s == 0.5));
        let bytes = ctx.analyser().lock().unwrap().time_domain_bytes();
        assert!(bytes.iter().all(|&b| b == 128));

        ctx.connect(dc(-0.25, 0.0, 10.0), Route::Tapped).unwrap();
        renderer.render(&mut block);
        assert!(block.iter().all(|&s| s == 0.25));
        let bytes = ctx.analyser().lock().unwrap().time_domain_bytes();
        assert_eq!(*bytes.last().unwrap(), 96);
    }

    #[test]
    fn test_volume_and_clipping() {
        let (ctx, mut renderer) = AudioContext::new(1000, 0.5);
        ctx.resume().unwrap();
        ctx.connect(dc(1.0, 0.0, 1.0), Route::Mix).unwrap();
        ctx.connect(dc(1.0, 0.0, 1.0), Route::Mix).unwrap();
        ctx.connect(dc(1.0, 0.0, 1.0), Route::Mix).unwrap();

        let mut block = [0.0f32; 4];
        renderer.render(&mut block);
        assert!(block.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_closed_context_refuses_work() {
        let (ctx, _renderer) = AudioContext::new(1000, 1.0);
        ctx.close();
        assert_eq!(ctx.resume(), Err(GraphError::Closed));
        assert_eq!(
            ctx.connect(dc(1.0, 0.0, 1.0), Route::Mix),
            Err(GraphError::Closed)
        );
        assert_eq!(ctx.live_nodes(), 0);
    }

    #[test]
    fn test_dropping_renderer_closes_context() {
        let (ctx, renderer) = AudioContext::new(1000, 1.0);
        ctx.resume().unwrap();
        ctx.connect(dc(1.0, 0.0, 1.0), Route::Mix).unwrap();
        assert_eq!(ctx.live_nodes(), 1);

        drop(renderer);
        assert_eq!(ctx.state(), GraphState::Closed);
        assert_eq!(ctx.live_nodes(), 0);
        assert_eq!(ctx.resume(), Err(GraphError::Closed));
    }

    #[test]
    fn test_full_queue_is_reported() {
        let (ctx, _renderer) = AudioContext::new(1000, 1.0);
        for _ in 0..QUEUE_CAPACITY {
            ctx.connect(dc(0.0, 0.0, 1.0), Route::Mix).unwrap();
        }
        assert_eq!(
            ctx.connect(dc(0.0, 0.0, 1.0), Route::Mix),
            Err(GraphError::QueueFull)
        );
        assert_eq!(ctx.live_nodes(), QUEUE_CAPACITY);
    }
}
