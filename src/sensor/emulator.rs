use std::time::Duration;

use rand::{SeedableRng, rngs::StdRng};
use tokio::{select, sync::mpsc::UnboundedSender, task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::sensor::{Reading, SensorKind};

pub const DEFAULT_SENSOR_INTERVAL: Duration = Duration::from_secs(20);

/// Simulated sensor that pushes one random reading per interval.
///
/// Each emulator listens on a child of the token it was created with, so
/// [`SensorEmulator::stop`] only stops this emulator while cancelling the
/// parent stops all of them.
#[derive(Debug)]
pub struct SensorEmulator {
    kind: SensorKind,
    interval: Duration,
    seed: Option<u64>,
    cancel_token: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl SensorEmulator {
    pub fn new(kind: SensorKind, cancel_token: &CancellationToken) -> Self {
        Self {
            kind,
            interval: DEFAULT_SENSOR_INTERVAL,
            seed: None,
            cancel_token: cancel_token.child_token(),
            task_handle: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn start(&mut self, tx: UnboundedSender<Reading>) {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let handle = tokio::spawn(run(
            self.kind,
            self.interval,
            rng,
            tx,
            self.cancel_token.clone(),
        ));
        self.task_handle = Some(handle);
    }

    /// Cancels the emulator and waits for its task to finish.
    pub async fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.task_handle.take()
            && let Err(err) = handle.await
        {
            error!(sensor = %self.kind, error = %err, "sensor emulator task failed");
        }
    }
}

async fn run(
    kind: SensorKind,
    interval: Duration,
    mut rng: StdRng,
    tx: UnboundedSender<Reading>,
    cancel_token: CancellationToken,
) {
    debug!(sensor = %kind, "sensor emulator started");

    loop {
        let reading = Reading {
            kind,
            value: kind.sample(&mut rng),
        };

        if tx.send(reading).is_err() {
            debug!(sensor = %kind, "reading channel closed");
            break;
        }
        info!(sensor = %kind, value = reading.value, "generated reading");

        select! {
            _ = sleep(interval) => {}
            _ = cancel_token.cancelled() => break,
        }
    }

    debug!(sensor = %kind, "sensor emulator stopped");
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;

    #[tokio::test]
    async fn emits_readings_of_its_kind_until_stopped() {
        let cancel_token = CancellationToken::new();
        let (tx, mut rx) = unbounded_channel();

        let mut emulator = SensorEmulator::new(SensorKind::Temperature, &cancel_token)
            .with_interval(Duration::from_millis(5))
            .with_seed(42);
        emulator.start(tx);

        sleep(Duration::from_millis(60)).await;
        emulator.stop().await;
        assert!(!emulator.is_running());

        let mut received = Vec::new();
        while let Ok(reading) = rx.try_recv() {
            received.push(reading);
        }

        assert!(received.len() >= 2, "got {} readings", received.len());
        for reading in received {
            assert_eq!(reading.kind, SensorKind::Temperature);
            assert!((15.0..=35.0).contains(&reading.value));
        }
    }

    #[tokio::test]
    async fn stopping_one_emulator_leaves_the_other_running() {
        let cancel_token = CancellationToken::new();
        let (h_tx, _h_rx) = unbounded_channel();
        let (t_tx, _t_rx) = unbounded_channel();

        let mut humidity = SensorEmulator::new(SensorKind::Humidity, &cancel_token)
            .with_interval(Duration::from_millis(5));
        let mut temperature = SensorEmulator::new(SensorKind::Temperature, &cancel_token)
            .with_interval(Duration::from_millis(5));
        humidity.start(h_tx);
        temperature.start(t_tx);

        humidity.stop().await;
        assert!(!humidity.is_running());
        assert!(temperature.is_running());

        cancel_token.cancel();
        temperature.stop().await;
        assert!(!temperature.is_running());
    }

    #[tokio::test]
    async fn stop_survives_a_task_that_did_not_finish_cleanly() {
        let cancel_token = CancellationToken::new();
        let (tx, _rx) = unbounded_channel();

        let mut emulator = SensorEmulator::new(SensorKind::Humidity, &cancel_token)
            .with_interval(Duration::from_millis(5));
        emulator.start(tx);
        emulator.task_handle.as_ref().unwrap().abort();

        emulator.stop().await;
        assert!(!emulator.is_running());
        assert_eq!(emulator.kind(), SensorKind::Humidity);
    }

    #[tokio::test]
    async fn stops_when_receiver_is_dropped() {
        let cancel_token = CancellationToken::new();
        let (tx, rx) = unbounded_channel();
        drop(rx);

        let mut emulator = SensorEmulator::new(SensorKind::Humidity, &cancel_token);
        emulator.start(tx);

        let handle = emulator.task_handle.take().unwrap();
        handle.await.unwrap();
    }
}
