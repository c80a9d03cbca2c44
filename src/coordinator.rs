use std::{error::Error, time::Duration};

use tokio::{
    select,
    sync::mpsc::{UnboundedReceiver, error::TryRecvError},
    time::sleep,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    clock::{Clock, SystemClock},
    config::DEFAULT_SAMPLE_INTERVAL,
    db::LocalStore,
    record::MergedRecord,
    sensor::{Reading, SensorEmulator},
    telemetry::TelemetrySink,
};

/// Sampling loop that pairs one humidity and one temperature reading per tick,
/// persists the pair, then forwards it.
///
/// A reading whose counterpart did not arrive in the same tick is dropped.
pub struct Coordinator {
    humidity_rx: UnboundedReceiver<Reading>,
    temperature_rx: UnboundedReceiver<Reading>,
    store: LocalStore,
    sink: TelemetrySink,
    clock: Box<dyn Clock>,
    interval: Duration,
}

impl Coordinator {
    pub fn new(
        humidity_rx: UnboundedReceiver<Reading>,
        temperature_rx: UnboundedReceiver<Reading>,
        store: LocalStore,
        sink: TelemetrySink,
    ) -> Self {
        Self {
            humidity_rx,
            temperature_rx,
            store,
            sink,
            clock: Box::new(SystemClock::default()),
            interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs one sampling tick and returns the record it produced, if any.
    pub async fn tick(&mut self) -> Option<MergedRecord> {
        let humidity = poll(&mut self.humidity_rx);
        let temperature = poll(&mut self.temperature_rx);

        let record = MergedRecord::merge(self.clock.device_time(), humidity, temperature)?;

        if let Err(err) = self.store.append(&record).await {
            error!(error = &err as &dyn Error, ?record, "failed to save record locally");
        }

        self.sink.send(&record).await;

        info!(
            device_time = %record.device_time,
            humidity = record.humidity,
            temperature = record.temperature,
            "combined sensor data"
        );

        Some(record)
    }

    /// Ticks until `cancel_token` fires, then stops the emulators, waits for
    /// them and closes the local store before returning.
    pub async fn run(
        mut self,
        cancel_token: CancellationToken,
        emulators: &mut [SensorEmulator],
    ) {
        loop {
            self.tick().await;

            select! {
                _ = sleep(self.interval) => {}
                _ = cancel_token.cancelled() => break,
            }
        }

        info!("stopping sensor emulators");
        for emulator in emulators.iter_mut() {
            emulator.stop().await;
            debug!(sensor = %emulator.kind(), "sensor emulator reaped");
        }
        info!("sensor emulators stopped cleanly");

        self.store.close().await;
    }
}

fn poll(rx: &mut UnboundedReceiver<Reading>) -> Option<Reading> {
    match rx.try_recv() {
        Ok(reading) => {
            debug!(sensor = %reading.kind, value = reading.value, "received reading");
            Some(reading)
        }
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            debug!("reading channel disconnected");
            None
        }
    }
}
