use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use super::{
    config::NavigationConfig,
    error::NavigationError,
    events::{
        ArrivalEvent, FallbackReason, GuidanceHint, NavigationEvent, PositionErrorReport,
        RouteSource, UpdateOutcome,
    },
    guidance::{DisplayDistance, RelativeDirection, relative_bearing},
    heading::HeadingFilter,
    instructions::{Instruction, generate_instructions},
    position::{PositionError, PositionSample, PositionSource},
};
use crate::{
    Meters,
    geodesy::{distance_meters, project_onto_segment},
    model::{Coordinate, StreetGraph},
    routing::{Route, shortest_path},
};

/// Guidance points closer than this are merged
const MIN_GUIDANCE_SPACING_M: Meters = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    /// Following the position without a target
    Tracking,
    /// Guiding toward a target along the cached route
    Targeting,
    /// Position has left the guidance line; waiting for confirmation
    Rerouting,
    Arrived,
}

/// Destination plus opaque caller data handed back on arrival
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationTarget<M> {
    pub coordinate: Coordinate,
    pub metadata: M,
}

impl<M> NavigationTarget<M> {
    pub fn new(coordinate: Coordinate, metadata: M) -> Self {
        Self {
            coordinate,
            metadata,
        }
    }
}

/// Route to the current target with its derived guidance
#[derive(Debug, Clone)]
struct RoutePlan {
    source: RouteSource,
    route: Route,
    /// Position, route nodes and target, with near-duplicates merged
    guidance: Vec<Coordinate>,
    instructions: Vec<Instruction>,
}

/// Live navigation state machine.
///
/// Owned by exactly one logical host session. The street graph is shared
/// read-only; [`Self::replace_graph`] swaps in a rebuilt one.
#[derive(Debug)]
pub struct NavigationSession<M> {
    config: NavigationConfig,
    graph: Arc<StreetGraph>,
    state: SessionState,
    position: Option<PositionSample>,
    heading: HeadingFilter,
    target: Option<NavigationTarget<M>>,
    plan: Option<RoutePlan>,
    samples: u64,
    last_accepted: Option<DateTime<Utc>>,
    arrived_at: Option<DateTime<Utc>>,
    off_route_streak: u32,
}

impl<M: Clone> NavigationSession<M> {
    pub fn new(graph: Arc<StreetGraph>, config: NavigationConfig) -> Self {
        Self {
            config,
            graph,
            state: SessionState::Idle,
            position: None,
            heading: HeadingFilter::new(),
            target: None,
            plan: None,
            samples: 0,
            last_accepted: None,
            arrived_at: None,
            off_route_streak: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn graph(&self) -> &Arc<StreetGraph> {
        &self.graph
    }

    pub fn position(&self) -> Option<&PositionSample> {
        self.position.as_ref()
    }

    /// Smoothed heading in degrees
    pub fn heading(&self) -> Option<f64> {
        self.heading.value()
    }

    pub fn target(&self) -> Option<&NavigationTarget<M>> {
        self.target.as_ref()
    }

    pub fn route(&self) -> Option<&Route> {
        self.plan.as_ref().map(|plan| &plan.route)
    }

    pub fn route_source(&self) -> Option<RouteSource> {
        self.plan.as_ref().map(|plan| plan.source)
    }

    /// Polyline the instructions were generated from
    pub fn guidance(&self) -> &[Coordinate] {
        self.plan.as_ref().map_or(&[], |plan| &plan.guidance)
    }

    pub fn instructions(&self) -> &[Instruction] {
        self.plan.as_ref().map_or(&[], |plan| &plan.instructions)
    }

    /// Number of position samples accepted so far
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// Begins tracking from the first position `source` can provide.
    ///
    /// The source is asked up to `start_attempts` times.
    ///
    /// # Errors
    ///
    /// [`NavigationError::AlreadyStarted`] unless idle, and
    /// [`NavigationError::PositionUnavailable`] with the last failure when
    /// every attempt failed.
    pub fn start<S>(&mut self, source: &mut S) -> Result<(), NavigationError>
    where
        S: PositionSource + ?Sized,
    {
        if self.state != SessionState::Idle {
            return Err(NavigationError::AlreadyStarted);
        }

        let mut last_error = PositionError::Unavailable;
        for attempt in 1..=self.config.start_attempts {
            match source.current_position() {
                Ok(sample) => {
                    self.accept(sample, None);
                    self.state = SessionState::Tracking;
                    info!(
                        "Navigation started at ({:.6}, {:.6})",
                        sample.coordinate.lat, sample.coordinate.lng
                    );
                    return Ok(());
                }
                Err(error) => {
                    warn!(
                        "Position attempt {attempt}/{} failed: {error}",
                        self.config.start_attempts
                    );
                    last_error = error;
                }
            }
        }

        Err(NavigationError::PositionUnavailable(last_error))
    }

    /// Sets a new destination and computes the route to it.
    ///
    /// Replaces any previous target, including after arrival. When the graph
    /// cannot provide a route, the session falls back to a direct line and
    /// reports it through the returned [`RouteSource`].
    ///
    /// # Errors
    ///
    /// [`NavigationError::NotStarted`] while idle.
    pub fn set_target(
        &mut self,
        target: NavigationTarget<M>,
    ) -> Result<RouteSource, NavigationError> {
        let Some(position) = self.active_position() else {
            return Err(NavigationError::NotStarted);
        };

        let plan = self.plan_route(position, target.coordinate);
        let source = plan.source;
        info!(
            "Navigating to ({:.6}, {:.6}): {:.1} m, {} instructions",
            target.coordinate.lat,
            target.coordinate.lng,
            plan.route.distance(),
            plan.instructions.len()
        );

        self.plan = Some(plan);
        self.target = Some(target);
        self.state = SessionState::Targeting;
        self.arrived_at = None;
        self.off_route_streak = 0;
        Ok(source)
    }

    /// Processes one position sample, with an optional compass heading.
    ///
    /// # Errors
    ///
    /// [`NavigationError::NotStarted`] while idle.
    pub fn on_position_update(
        &mut self,
        sample: PositionSample,
        compass_heading: Option<f64>,
    ) -> Result<UpdateOutcome<M>, NavigationError> {
        if self.state == SessionState::Idle {
            return Err(NavigationError::NotStarted);
        }
        if self.grace_elapsed(sample.timestamp) {
            self.stop();
            return Ok(UpdateOutcome::Ended);
        }

        if let Some(last) = self.last_accepted {
            if sample.timestamp < last {
                // Clock went back: restart the throttle and grace windows from here
                debug!("Position clock moved back from {last} to {}", sample.timestamp);
                if self.arrived_at.is_some_and(|arrived| sample.timestamp < arrived) {
                    self.arrived_at = Some(sample.timestamp);
                }
            } else if sample.timestamp - last < self.config.throttle_interval() {
                trace!("Throttled position sample at {}", sample.timestamp);
                return Ok(UpdateOutcome::Throttled);
            }
        }

        self.accept(sample, compass_heading);

        let Some(target) = self.target.clone() else {
            return Ok(UpdateOutcome::Tracked {
                sequence: self.samples,
                heading: self.heading.value(),
            });
        };

        let position = sample.coordinate;
        let distance_remaining = distance_meters(position, target.coordinate);
        let mut arrival = None;
        let mut rerouted = false;

        if self.state != SessionState::Arrived {
            if distance_remaining < self.config.arrival_radius_m {
                self.state = SessionState::Arrived;
                self.arrived_at = Some(sample.timestamp);
                info!("Arrived at target, {distance_remaining:.1} m away");
                arrival = Some(ArrivalEvent {
                    metadata: target.metadata.clone(),
                    target: target.coordinate,
                    arrived_at: sample.timestamp,
                });
            } else {
                rerouted = self.check_route(position, target.coordinate);
            }
        }

        let heading = self.heading.value();
        let direction = RelativeDirection::from_relative_bearing(relative_bearing(
            position,
            target.coordinate,
            heading.unwrap_or(0.0),
        ));
        let arrived = self.state == SessionState::Arrived;
        let hint = if arrived {
            GuidanceHint::Continue
        } else {
            self.next_instruction(position)
        };
        let instruction_text = match (arrived, hint) {
            (true, _) => "You have arrived".to_string(),
            (false, GuidanceHint::Upcoming(instruction)) => format!(
                "{} in {}",
                instruction.action.text(),
                DisplayDistance::from(distance_meters(position, instruction.end))
            ),
            (false, GuidanceHint::Continue) => direction.text().to_string(),
        };

        Ok(UpdateOutcome::Guidance(NavigationEvent {
            sequence: self.samples,
            position,
            heading,
            distance_remaining,
            display_distance: DisplayDistance::from(distance_remaining),
            direction,
            hint,
            instruction_text,
            route_source: self.route_source().unwrap_or(RouteSource::Graph),
            rerouted,
            arrived,
            arrival,
            state: self.state,
        }))
    }

    /// Stops the session after the arrival grace period without waiting for
    /// another position sample. Returns [`UpdateOutcome::Ended`] if it did.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<UpdateOutcome<M>> {
        if self.grace_elapsed(now) {
            self.stop();
            Some(UpdateOutcome::Ended)
        } else {
            None
        }
    }

    /// Records a position-source failure. The session keeps its last good
    /// state.
    pub fn on_position_error(&self, error: PositionError) -> PositionErrorReport {
        warn!("Position source error: {error}");
        PositionErrorReport {
            error,
            reason: error.to_string(),
            state: self.state,
        }
    }

    /// Returns to idle, dropping position, target and route. Idempotent.
    pub fn stop(&mut self) {
        if self.state != SessionState::Idle {
            info!("Navigation stopped after {} samples", self.samples);
        }
        self.state = SessionState::Idle;
        self.position = None;
        self.heading.reset();
        self.target = None;
        self.plan = None;
        self.last_accepted = None;
        self.arrived_at = None;
        self.off_route_streak = 0;
    }

    /// Swaps in a rebuilt graph. An active target is re-routed over it and the
    /// new route source returned.
    pub fn replace_graph(&mut self, graph: Arc<StreetGraph>) -> Option<RouteSource> {
        self.graph = graph;
        let position = self.active_position()?;
        if self.state == SessionState::Arrived {
            return None;
        }
        let destination = self.target.as_ref()?.coordinate;

        let plan = self.plan_route(position, destination);
        let source = plan.source;
        self.plan = Some(plan);
        self.off_route_streak = 0;
        if self.state == SessionState::Rerouting {
            self.state = SessionState::Targeting;
        }
        debug!("Re-planned route over replaced graph");
        Some(source)
    }

    fn active_position(&self) -> Option<Coordinate> {
        if self.state == SessionState::Idle {
            return None;
        }
        self.position.map(|sample| sample.coordinate)
    }

    fn accept(&mut self, sample: PositionSample, compass_heading: Option<f64>) {
        self.samples += 1;
        self.last_accepted = Some(sample.timestamp);
        self.position = Some(sample);

        if let Some(compass) = compass_heading {
            self.heading.update(compass, self.config.compass_smoothing);
        }
        if let (Some(speed), Some(course)) = (sample.speed_mps, sample.heading_deg) {
            if speed > self.config.course_min_speed_mps {
                self.heading.update(course, self.config.course_smoothing);
            }
        }
    }

    fn grace_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.state == SessionState::Arrived
            && self
                .arrived_at
                .is_some_and(|arrived| now - arrived >= self.config.arrival_grace())
    }

    /// Tracks off-route samples and recomputes the route once confirmed.
    /// Returns whether a new route was computed.
    fn check_route(&mut self, position: Coordinate, destination: Coordinate) -> bool {
        let off_route = self
            .distance_to_guidance(position)
            .is_some_and(|distance| distance > self.config.off_route_distance_m);

        if !off_route {
            self.off_route_streak = 0;
            if self.state == SessionState::Rerouting {
                self.state = SessionState::Targeting;
            }
            return false;
        }

        self.off_route_streak += 1;
        if self.off_route_streak < self.config.off_route_confirmations {
            self.state = SessionState::Rerouting;
            return false;
        }

        debug!(
            "Off route for {} samples, recomputing",
            self.off_route_streak
        );
        self.plan = Some(self.plan_route(position, destination));
        self.off_route_streak = 0;
        self.state = SessionState::Targeting;
        true
    }

    fn distance_to_guidance(&self, position: Coordinate) -> Option<Meters> {
        self.guidance()
            .windows(2)
            .map(|w| project_onto_segment(position, w[0], w[1]).distance)
            .min_by(f64::total_cmp)
    }

    /// Instruction whose end point is nearest, if within announcing range
    fn next_instruction(&self, position: Coordinate) -> GuidanceHint {
        self.instructions()
            .iter()
            .map(|instruction| (instruction, distance_meters(position, instruction.end)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .filter(|(_, distance)| *distance < self.config.instruction_proximity_m)
            .map_or(GuidanceHint::Continue, |(instruction, _)| {
                GuidanceHint::Upcoming(*instruction)
            })
    }

    fn plan_route(&self, from: Coordinate, to: Coordinate) -> RoutePlan {
        let graph = &self.graph;
        let (route, source) = match (graph.nearest_node(from), graph.nearest_node(to)) {
            (Some((start, _)), Some((end, _))) => {
                let route = shortest_path(graph, start, end);
                if route.is_reachable() {
                    (route, RouteSource::Graph)
                } else {
                    (
                        direct_route(from, to),
                        RouteSource::DirectFallback(FallbackReason::Unreachable),
                    )
                }
            }
            _ => (
                direct_route(from, to),
                RouteSource::DirectFallback(FallbackReason::EmptyGraph),
            ),
        };

        if let RouteSource::DirectFallback(reason) = source {
            warn!("No graph route available ({reason:?}), guiding along a direct line");
        }

        let guidance = guidance_line(from, route.coordinates(), to);
        let instructions = generate_instructions(&guidance, &self.config.turn_classifier());

        RoutePlan {
            source,
            route,
            guidance,
            instructions,
        }
    }
}

fn direct_route(from: Coordinate, to: Coordinate) -> Route {
    Route::new(Vec::new(), vec![from, to], distance_meters(from, to))
}

/// `from`, the route and `to` as one polyline, merging points closer than
/// [`MIN_GUIDANCE_SPACING_M`]. Always ends exactly at `to`.
fn guidance_line(from: Coordinate, route: &[Coordinate], to: Coordinate) -> Vec<Coordinate> {
    let mut line: Vec<Coordinate> = Vec::with_capacity(route.len() + 2);
    for &point in std::iter::once(&from).chain(route).chain(std::iter::once(&to)) {
        match line.last() {
            Some(&last) if distance_meters(last, point) < MIN_GUIDANCE_SPACING_M => {}
            _ => line.push(point),
        }
    }

    if line.len() > 1 {
        if let Some(last) = line.last_mut() {
            *last = to;
        }
    } else {
        line.push(to);
    }
    line
}
