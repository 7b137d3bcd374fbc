//! Per-system frame timings.

use std::fmt::Display;
use std::time::{Duration, Instant};

use bevy_ecs::{
    resource::Resource,
    system::{IntoSystem, System},
    world::World,
};
use circular_buffer::CircularBuffer;
use num_width::NumberWidth;
use parking_lot::Mutex;
use smallvec::SmallVec;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount, EnumIter, IntoStaticStr};
use thousands::Separable;

/// Number of frames each system's statistics are computed over.
const WINDOW: usize = 60;

#[derive(EnumCount, EnumIter, IntoStaticStr, Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum SystemId {
    Total,
    Controls,
    Commands,
    LevelLoad,
    Ambient,
    Obstacles,
    Movement,
    Pursuit,
    Level,
    ProximityAudio,
    Hud,
    Audio,
}

impl Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Into::<&'static str>::into(self).to_ascii_lowercase())
    }
}

/// Recent durations of one system, oldest first.
#[derive(Debug, Default)]
pub struct TimingWindow {
    samples: CircularBuffer<WINDOW, Duration>,
}

impl TimingWindow {
    pub fn push(&mut self, duration: Duration) {
        self.samples.push_back(duration);
    }

    pub fn latest(&self) -> Duration {
        self.samples.back().copied().unwrap_or(Duration::ZERO)
    }

    /// Mean and standard deviation over the window.
    pub fn stats(&self) -> (Duration, Duration) {
        let count = self.samples.len();
        if count == 0 {
            return (Duration::ZERO, Duration::ZERO);
        }

        let secs = || self.samples.iter().map(Duration::as_secs_f64);
        let mean = secs().sum::<f64>() / count as f64;
        let variance = if count > 1 {
            secs().map(|s| (s - mean).powi(2)).sum::<f64>() / (count - 1) as f64
        } else {
            0.0
        };

        (Duration::from_secs_f64(mean), Duration::from_secs_f64(variance.sqrt()))
    }
}

#[derive(Resource, Debug)]
pub struct SystemTimings {
    windows: micromap::Map<SystemId, Mutex<TimingWindow>, { SystemId::COUNT }>,
}

impl Default for SystemTimings {
    fn default() -> Self {
        let mut windows = micromap::Map::new();
        for id in SystemId::iter() {
            windows.insert(id, Mutex::new(TimingWindow::default()));
        }
        Self { windows }
    }
}

impl SystemTimings {
    pub fn record(&self, id: SystemId, duration: Duration) {
        if let Some(window) = self.windows.get(&id) {
            window.lock().push(duration);
        }
    }

    pub fn stats(&self, id: SystemId) -> (Duration, Duration) {
        self.windows
            .get(&id)
            .map_or((Duration::ZERO, Duration::ZERO), |w| w.lock().stats())
    }

    /// Systems whose latest run took the longest, slowest first, excluding the frame total.
    pub fn slowest(&self, limit: usize) -> SmallVec<[(SystemId, Duration); 4]> {
        let mut latest: SmallVec<[(SystemId, Duration); SystemId::COUNT]> = SystemId::iter()
            .filter(|id| *id != SystemId::Total)
            .filter_map(|id| self.windows.get(&id).map(|w| (id, w.lock().latest())))
            .collect();
        latest.sort_by(|a, b| b.1.cmp(&a.1));
        latest.into_iter().take(limit).collect()
    }

    /// One aligned line per system: name, mean and deviation in microseconds.
    pub fn summary(&self) -> SmallVec<[String; SystemId::COUNT]> {
        let rows: SmallVec<[(SystemId, u64, u64); SystemId::COUNT]> = SystemId::iter()
            .map(|id| {
                let (mean, deviation) = self.stats(id);
                (id, mean.as_micros() as u64, deviation.as_micros() as u64)
            })
            .collect();

        let name_width = SystemId::iter().map(|id| id.to_string().len()).max().unwrap_or(0);
        let mean_width = rows.iter().map(|r| r.1.width() as usize).max().unwrap_or(1);
        let fps = match self.stats(SystemId::Total).0.as_secs_f64() {
            s if s > 0.0 => (1.0 / s) as u64,
            _ => 0,
        };

        let mut lines: SmallVec<[String; SystemId::COUNT]> = rows
            .iter()
            .map(|(id, mean, deviation)| {
                format!(
                    "{name:name_width$} : {mean:>mean_width$}µs ± {deviation}µs",
                    name = id.to_string(),
                    mean = mean.separate_with_commas(),
                    mean_width = mean_width + mean_width / 3,
                )
            })
            .collect();
        lines.insert(0, format!("{} frames/s possible", fps.separate_with_commas()));
        lines
    }
}

/// Wraps a system so each run is timed into [`SystemTimings`].
pub fn profile<S, M>(id: SystemId, system: S) -> impl FnMut(&mut World)
where
    S: IntoSystem<(), (), M> + 'static,
{
    let mut system: S::System = IntoSystem::into_system(system);
    let mut initialized = false;
    move |world: &mut World| {
        if !initialized {
            system.initialize(world);
            initialized = true;
        }

        let start = Instant::now();
        system.run((), world);
        let elapsed = start.elapsed();

        if let Some(timings) = world.get_resource::<SystemTimings>() {
            timings.record(id, elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_stats() {
        let mut window = TimingWindow::default();
        window.push(Duration::from_micros(100));
        window.push(Duration::from_micros(300));
        let (mean, deviation) = window.stats();
        assert!((mean.as_nanos() as i64 - 200_000).abs() <= 1);
        assert_eq!(deviation.as_micros(), 141);
    }

    #[test]
    fn test_slowest_orders_descending() {
        let timings = SystemTimings::default();
        timings.record(SystemId::Movement, Duration::from_micros(50));
        timings.record(SystemId::Pursuit, Duration::from_micros(80));
        timings.record(SystemId::Total, Duration::from_millis(5));

        let slowest = timings.slowest(2);
        assert_eq!(slowest[0].0, SystemId::Pursuit);
        assert_eq!(slowest[1].0, SystemId::Movement);
    }

    #[test]
    fn test_summary_has_header_and_one_line_per_system() {
        let timings = SystemTimings::default();
        assert_eq!(timings.summary().len(), SystemId::COUNT + 1);
    }
}
