use crate::noise::UniformNoise;
use crate::report;
use crate::topology::{self, Stage, Traversal};
use crate::trace::SimulationReport;
use netlat_abstract::{ClientId, ConfigError, NoiseSource, ResultRecord, SimConfig};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, info};

#[derive(Debug)]
pub enum EventType {
    /// Driver wakes up to spawn the client at `client` of wave `wave`.
    Spawn { wave: usize, client: u32 },
    /// Client finished its pre-send delay and hands its packet to the switch.
    ClientSend { traversal: Traversal },
    /// A hop releases the packet after holding it for half the latency.
    HopDone { stage: Stage, traversal: Traversal },
}

#[derive(Debug)]
struct Event {
    time: f64,
    event_type: EventType,
    id: u64, // Unique ID to differentiate events at same time
}

// Custom Ord for Min-Heap (smallest time pops first)
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse comparison for time: smallest time is Greater in BinaryHeap
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.id.cmp(&self.id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    Spawn,
    Send,
    SwitchDone,
    RouterDone,
}

/// A compact record of what happened when, for visualization and traces.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub time: f64,
    pub kind: TimelineKind,
    pub client: ClientId,
    pub latency: f64,
}

pub struct Simulator {
    time: f64,
    event_queue: BinaryHeap<Event>,
    event_id_counter: u64,
    started: bool,

    config: SimConfig,
    noise: Box<dyn NoiseSource>,

    /// Records in the order their packets reached the router.
    records: Vec<ResultRecord>,
    timeline: Vec<TimelineEntry>,
}

impl Simulator {
    pub fn new(config: SimConfig, noise: Box<dyn NoiseSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            time: 0.0,
            event_queue: BinaryHeap::new(),
            event_id_counter: 0,
            started: false,
            records: Vec::with_capacity(config.total_clients()),
            timeline: Vec::new(),
            config,
            noise,
        })
    }

    /// Build a simulator whose noise comes from an RNG seeded with `config.seed`.
    pub fn from_config(config: SimConfig) -> Result<Self, ConfigError> {
        let noise = UniformNoise::seeded(config.seed);
        Self::new(config, Box::new(noise))
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    fn push_event(&mut self, time: f64, event_type: EventType) {
        self.event_queue.push(Event {
            time,
            event_type,
            id: self.event_id_counter,
        });
        self.event_id_counter += 1;
    }

    fn note(&mut self, kind: TimelineKind, traversal: Traversal) {
        self.timeline.push(TimelineEntry {
            time: self.time,
            kind,
            client: traversal.client,
            latency: traversal.latency,
        });
    }

    /// Schedule the driver's first spawn. Calling it again is a no-op.
    pub fn init(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(
            "Simulating {} latency levels x {} clients",
            self.config.latency_levels.len(),
            self.config.clients_per_level
        );
        if let Some((wave, client)) = self.spawn_slot(0, 0) {
            self.push_event(self.time, EventType::Spawn { wave, client });
        }
    }

    /// First valid (wave, client) position at or after the given one.
    fn spawn_slot(&self, wave: usize, client: u32) -> Option<(usize, u32)> {
        if self.config.clients_per_level == 0 {
            return None;
        }
        let (wave, client) = if client >= self.config.clients_per_level {
            (wave + 1, 0)
        } else {
            (wave, client)
        };
        (wave < self.config.latency_levels.len()).then_some((wave, client))
    }

    pub fn peek_next_event_time(&self) -> Option<f64> {
        self.event_queue.peek().map(|e| e.time)
    }

    pub fn current_time(&self) -> f64 {
        self.time
    }

    pub fn remaining_events(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_finished(&self) -> bool {
        self.started && self.event_queue.is_empty()
    }

    /// Process the next event. Returns true if an event was processed, false if queue is empty.
    pub fn step(&mut self) -> bool {
        let event = match self.event_queue.pop() {
            Some(e) => e,
            None => return false,
        };

        self.time = event.time;
        debug!("Processing event at {}: {:?}", self.time, event.event_type);

        match event.event_type {
            EventType::Spawn { wave, client } => {
                let traversal = Traversal {
                    client: ClientId(client),
                    latency: self.config.latency_levels[wave],
                };
                self.note(TimelineKind::Spawn, traversal);
                self.push_event(
                    self.time + self.config.pre_send_delay,
                    EventType::ClientSend { traversal },
                );
                if let Some((wave, client)) = self.spawn_slot(wave, client + 1) {
                    self.push_event(
                        self.time + self.config.spawn_interval,
                        EventType::Spawn { wave, client },
                    );
                }
            }
            EventType::ClientSend { traversal } => {
                self.note(TimelineKind::Send, traversal);
                self.enter(Stage::Switch, traversal);
            }
            EventType::HopDone { stage, traversal } => match stage.next() {
                Some(next) => {
                    self.note(TimelineKind::SwitchDone, traversal);
                    self.enter(next, traversal);
                }
                None => {
                    self.note(TimelineKind::RouterDone, traversal);
                    let record = topology::complete(traversal, self.time, self.noise.as_mut());
                    info!(
                        "[{}] latency={}ms response={:.2}ms throughput={:.2}Mbps loss={:.2}%",
                        record.client,
                        record.latency_ms,
                        record.response_time_ms,
                        record.throughput_mbps,
                        record.packet_loss_pct
                    );
                    self.records.push(record);
                }
            },
        }
        true
    }

    fn enter(&mut self, stage: Stage, traversal: Traversal) {
        let release = self.time + stage.hold_time(traversal.latency);
        self.push_event(release, EventType::HopDone { stage, traversal });
    }

    /// Produce a serializable snapshot of the current simulation state.
    pub fn export_report(&self) -> SimulationReport {
        SimulationReport {
            config: self.config.clone(),
            duration_ms: self.time,
            records: self.records.clone(),
            summary: report::summarize(&self.records),
            timeline: self.timeline.clone(),
        }
    }

    pub fn run_until_complete(&mut self) {
        self.init();
        while self.step() {}
        info!(
            "Simulation complete at {}ms with {} records",
            self.time,
            self.records.len()
        );
    }
}
