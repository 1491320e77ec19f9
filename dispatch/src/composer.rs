use itertools::Itertools;
use schema::{route_distance_km, FleetConfig, Order};

/// A visiting order over some candidate orders, given as indices into the candidate slice
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub stops: Vec<usize>,
    pub distance_km: f64,
}

/// Outcome of packing candidate resupply orders into a single flight
#[derive(Clone, Debug, PartialEq)]
pub enum Composition {
    /// Fly this route now
    Launch(Route),
    /// A lone order whose trip is too short to be worth a zip yet
    Defer(Route),
    /// Nothing fits within range
    Nothing,
}

/// Route for an emergency, optionally picking up one resupply stop on the way back
#[derive(Clone, Debug, PartialEq)]
pub struct EmergencyRoute {
    /// Index of the resupply order merged after the emergency stop
    pub resupply: Option<usize>,
    pub distance_km: f64,
}

/// Builds flight routes out of pending orders
pub trait RouteComposer {
    /// Picks the best flight that can be made out of `candidates` (oldest first) at `current_time`
    fn compose(&self, candidates: &[Order], current_time: u64) -> Composition;

    /// Decides whether one of `resupplies` should ride along with `emergency`
    fn merge_with_emergency(&self, emergency: &Order, resupplies: &[Order]) -> EmergencyRoute;
}

/// Exhaustive search over every visiting order of a small pool of candidates.
/// The pool never holds more than `max_deliveries` orders, which keeps the
/// factorial blow-up bounded.
#[derive(Clone, Debug)]
pub struct PermutationComposer {
    config: FleetConfig,
}

impl PermutationComposer {
    pub fn new(config: FleetConfig) -> Self {
        Self { config }
    }

    /// Narrows `candidates` down to the oldest order plus its nearest neighbours
    fn candidate_pool(&self, candidates: &[Order]) -> Vec<usize> {
        if candidates.len() <= self.config.max_deliveries {
            return (0..candidates.len()).collect();
        }

        let anchor = &candidates[0].hospital;
        std::iter::once(0)
            .chain(
                (1..candidates.len())
                    .sorted_by(|&a, &b| {
                        let a = anchor.distance_km(&candidates[a].hospital);
                        let b = anchor.distance_km(&candidates[b].hospital);
                        a.total_cmp(&b)
                    })
                    .take(self.config.max_deliveries.saturating_sub(1)),
            )
            .collect()
    }

    /// Shortest depot -> stops -> depot ordering of `pool`, first found wins ties
    fn shortest_route(candidates: &[Order], pool: &[usize]) -> Option<Route> {
        pool.iter()
            .copied()
            .permutations(pool.len())
            .map(|stops| {
                let distance_km = route_distance_km(stops.iter().map(|&i| &candidates[i].hospital));
                Route { stops, distance_km }
            })
            .fold(None, |best: Option<Route>, route| match best {
                Some(best) if best.distance_km <= route.distance_km => Some(best),
                _ => Some(route),
            })
    }
}

impl RouteComposer for PermutationComposer {
    fn compose(&self, candidates: &[Order], current_time: u64) -> Composition {
        let mut pool = self.candidate_pool(candidates);

        let route = loop {
            if pool.is_empty() {
                return Composition::Nothing;
            }

            match Self::shortest_route(candidates, &pool) {
                Some(route) if route.distance_km <= self.config.max_range_km => break route,
                _ => {
                    pool.pop();
                }
            }
        };

        if let [only] = route.stops[..] {
            let stale = candidates[only].age(current_time) >= self.config.max_time_order;
            if route.distance_km < self.config.min_range_km() && !stale {
                return Composition::Defer(route);
            }
        }

        Composition::Launch(route)
    }

    fn merge_with_emergency(&self, emergency: &Order, resupplies: &[Order]) -> EmergencyRoute {
        let solo = EmergencyRoute {
            resupply: None,
            distance_km: 2.0 * emergency.hospital.distance_from_depot_km(),
        };

        resupplies
            .iter()
            .enumerate()
            .map(|(i, resupply)| EmergencyRoute {
                resupply: Some(i),
                distance_km: route_distance_km([&emergency.hospital, &resupply.hospital]),
            })
            .min_by(|a, b| a.distance_km.total_cmp(&b.distance_km))
            .filter(|merged| merged.distance_km <= self.config.max_range_km)
            .unwrap_or(solo)
    }
}
