//! Time-ordered event queue with per-kind handlers.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use anyhow::Result;
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::models::Location;

/// What happened at an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// An order enters the system.
    OrderArrival,
    /// A vehicle reaches a pickup.
    PickupStart,
    /// Pickup service finished.
    PickupEnd,
    /// A vehicle reaches a delivery.
    DeliveryStart,
    /// Delivery service finished.
    DeliveryEnd,
    /// A vehicle finished its route.
    VehicleAvailable,
    /// Request to re-plan routes.
    OptimizationTrigger,
    /// Horizon reached.
    SimulationEnd,
}

/// Data attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    /// No data.
    None,
    /// A new order.
    Order {
        /// Delivery location.
        location: Location,
        /// Order weight.
        weight_kg: f64,
        /// Order volume.
        volume_m3: f64,
    },
    /// A vehicle at a pickup or delivery. Only start events carry the
    /// location.
    Visit {
        /// Vehicle serving the stop.
        vehicle_id: String,
        /// Stop location.
        location: Option<Location>,
    },
}

/// A simulation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Simulation time in minutes.
    pub time: f64,
    /// What happens.
    pub kind: EventKind,
    /// Order id, vehicle id or `"system"`.
    pub entity_id: String,
    /// Kind-specific data.
    pub payload: EventPayload,
}

impl Event {
    /// Creates an event without payload.
    pub fn new(time: f64, kind: EventKind, entity_id: impl Into<String>) -> Self {
        Self {
            time,
            kind,
            entity_id: entity_id.into(),
            payload: EventPayload::None,
        }
    }

    /// Attaches a payload.
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Vehicle of a pickup or delivery event.
    pub fn vehicle_id(&self) -> Option<&str> {
        match &self.payload {
            EventPayload::Visit { vehicle_id, .. } => Some(vehicle_id),
            _ => None,
        }
    }
}

/// Counters and aggregates maintained by event handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Time of the last processed event.
    pub current_time: f64,
    /// Events popped from the queue, across runs.
    pub events_processed: usize,
    /// Orders that entered the system.
    pub orders_created: usize,
    /// Orders delivered.
    pub orders_completed: usize,
    /// Orders that could not be delivered.
    pub orders_failed: usize,
    /// Distance of finished routes.
    pub total_distance_km: f64,
    /// Duration of finished routes.
    pub total_vehicle_hours: f64,
    /// Minutes vehicles spent waiting for windows to open.
    pub total_wait_minutes: f64,
    /// Vehicle id to utilization percentage.
    pub vehicle_utilization: BTreeMap<String, f64>,
    /// Lateness of each completed delivery in minutes, zero when on time.
    pub order_delays: Vec<f64>,
}

/// What a handler may touch while processing an event.
pub struct EventContext<'a> {
    /// State of the running simulation.
    pub state: &'a mut SimulationState,
    /// The engine's seeded generator.
    pub rng: &'a mut StdRng,
}

type Handler = Box<dyn FnMut(&Event, &mut EventContext<'_>) -> Result<()>>;

// Earliest time first; equal times keep scheduling order.
struct Scheduled {
    time: f64,
    seq: u64,
    event: Event,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Discrete-event engine: events are popped in time order and passed to
/// every handler subscribed to their kind.
///
/// Handlers run in subscription order. A handler error is logged and does
/// not stop the run. Randomness available to handlers comes from one
/// `StdRng` seeded at construction, so a run is reproducible from its seed.
///
/// # Examples
///
/// ```
/// use u_dispatch::simulation::{Event, EventKind, SimulationEngine};
///
/// let mut engine = SimulationEngine::new(42);
/// engine.subscribe(EventKind::OrderArrival, |_, ctx| {
///     ctx.state.orders_created += 1;
///     Ok(())
/// });
/// engine.schedule(Event::new(30.0, EventKind::OrderArrival, "o1"));
/// engine.schedule(Event::new(90.0, EventKind::OrderArrival, "o2"));
///
/// let state = engine.run(60.0);
/// assert_eq!(state.orders_created, 1);
/// assert_eq!(state.current_time, 30.0);
/// ```
pub struct SimulationEngine {
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
    handlers: HashMap<EventKind, Vec<Handler>>,
    state: SimulationState,
    rng: StdRng,
    seed: u64,
    pickup_service_minutes: f64,
    delivery_service_minutes: f64,
}

impl SimulationEngine {
    /// Creates an engine with 15-minute pickups and 30-minute deliveries.
    pub fn new(seed: u64) -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
            handlers: HashMap::new(),
            state: SimulationState::default(),
            rng: StdRng::seed_from_u64(seed),
            seed,
            pickup_service_minutes: 15.0,
            delivery_service_minutes: 30.0,
        }
    }

    /// Sets the service times used by [`Self::add_pickup_event`] and
    /// [`Self::add_delivery_event`].
    pub fn with_service_minutes(mut self, pickup: f64, delivery: f64) -> Self {
        self.pickup_service_minutes = pickup;
        self.delivery_service_minutes = delivery;
        self
    }

    /// Queues an event. Events with a non-finite time are dropped.
    pub fn schedule(&mut self, event: Event) {
        if !event.time.is_finite() {
            warn!("dropping {:?} for {} at non-finite time", event.kind, event.entity_id);
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            time: event.time,
            seq,
            event,
        }));
    }

    /// Registers a handler for one event kind.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: FnMut(&Event, &mut EventContext<'_>) -> Result<()> + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    /// Processes events up to and including `end_time`.
    ///
    /// The clock restarts at zero. If nothing is queued a
    /// [`EventKind::SimulationEnd`] event is placed at `end_time`. Events
    /// later than `end_time` stay queued.
    pub fn run(&mut self, end_time: f64) -> &SimulationState {
        self.state.current_time = 0.0;
        if self.queue.is_empty() {
            self.schedule(Event::new(end_time, EventKind::SimulationEnd, "system"));
        }

        while let Some(Reverse(next)) = self.queue.peek() {
            if next.time > end_time {
                break;
            }
            let Some(Reverse(scheduled)) = self.queue.pop() else {
                break;
            };
            self.state.current_time = scheduled.time;
            self.state.events_processed += 1;
            self.dispatch(&scheduled.event);
        }

        debug!(
            "simulation stopped at {:.1} min: {} events processed, {} pending",
            self.state.current_time,
            self.state.events_processed,
            self.queue.len()
        );
        &self.state
    }

    fn dispatch(&mut self, event: &Event) {
        trace!("{:.1} min: {:?} {}", event.time, event.kind, event.entity_id);
        let Some(handlers) = self.handlers.get_mut(&event.kind) else {
            return;
        };
        let mut ctx = EventContext {
            state: &mut self.state,
            rng: &mut self.rng,
        };
        for handler in handlers.iter_mut() {
            if let Err(e) = handler(event, &mut ctx) {
                warn!("handler for {:?} {} failed: {:#}", event.kind, event.entity_id, e);
            }
        }
    }

    /// Queues the arrival of a new order.
    pub fn add_order_arrival(
        &mut self,
        time: f64,
        order_id: &str,
        location: Location,
        weight_kg: f64,
        volume_m3: f64,
    ) {
        self.schedule(
            Event::new(time, EventKind::OrderArrival, order_id).with_payload(EventPayload::Order {
                location,
                weight_kg,
                volume_m3,
            }),
        );
    }

    /// Queues a pickup start at `time` and its end one pickup service later.
    pub fn add_pickup_event(
        &mut self,
        time: f64,
        order_id: &str,
        vehicle_id: &str,
        location: Location,
    ) {
        let span = (time, time + self.pickup_service_minutes);
        let kinds = (EventKind::PickupStart, EventKind::PickupEnd);
        self.add_visit(span, kinds, order_id, vehicle_id, location);
    }

    /// Queues a delivery start at `time` and its end one delivery service
    /// later.
    pub fn add_delivery_event(
        &mut self,
        time: f64,
        order_id: &str,
        vehicle_id: &str,
        location: Location,
    ) {
        let span = (time, time + self.delivery_service_minutes);
        let kinds = (EventKind::DeliveryStart, EventKind::DeliveryEnd);
        self.add_visit(span, kinds, order_id, vehicle_id, location);
    }

    fn add_visit(
        &mut self,
        (start, end): (f64, f64),
        (start_kind, end_kind): (EventKind, EventKind),
        order_id: &str,
        vehicle_id: &str,
        location: Location,
    ) {
        self.schedule(Event::new(start, start_kind, order_id).with_payload(EventPayload::Visit {
            vehicle_id: vehicle_id.to_string(),
            location: Some(location),
        }));
        self.schedule(Event::new(end, end_kind, order_id).with_payload(EventPayload::Visit {
            vehicle_id: vehicle_id.to_string(),
            location: None,
        }));
    }

    /// Current state.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Clears the queue and the state and reseeds the generator. Handlers
    /// stay subscribed.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.next_seq = 0;
        self.state = SimulationState::default();
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}
