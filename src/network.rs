use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use log::info;

use crate::{
    EngineConfig, Error,
    geojson::{CoordinateOrder, read_roads},
};
use plotnav_core::{
    BuildStats, Coordinate, StreetGraph, build_graph_with_stats,
    navigation::{NavigationError, NavigationSession, PositionSource},
};

/// The current street graph, rebuilt and swapped as road data changes.
///
/// Sessions hold their own [`Arc`] of the graph they were started with, so a
/// rebuild never disturbs a route in progress. Hosts that want a running
/// session to follow the new graph pass [`Self::snapshot`] to
/// [`NavigationSession::replace_graph`].
#[derive(Debug)]
pub struct RoadNetwork {
    config: EngineConfig,
    current: RwLock<Built>,
}

/// Graph in service together with the counters of the build that made it
#[derive(Debug, Clone)]
struct Built {
    graph: Arc<StreetGraph>,
    stats: BuildStats,
}

impl RoadNetwork {
    /// Network with an empty graph
    ///
    /// # Errors
    ///
    /// Returns [`Error::Core`] if `config` does not validate
    pub fn new(config: EngineConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            current: RwLock::new(Built {
                graph: Arc::new(StreetGraph::default()),
                stats: BuildStats::default(),
            }),
        })
    }

    /// Network built from road polylines
    ///
    /// # Errors
    ///
    /// Returns [`Error::Core`] if `config` does not validate
    pub fn from_roads<R>(roads: &[R], config: EngineConfig) -> Result<Self, Error>
    where
        R: AsRef<[Coordinate]>,
    {
        let network = Self::new(config)?;
        network.rebuild(roads);
        Ok(network)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Graph currently in service
    pub fn snapshot(&self) -> Arc<StreetGraph> {
        Arc::clone(&self.read().graph)
    }

    /// Counters from the build of the graph in service
    pub fn stats(&self) -> BuildStats {
        self.read().stats
    }

    /// Graph in service and its build counters, read together
    pub fn current(&self) -> (Arc<StreetGraph>, BuildStats) {
        let built = self.read();
        (Arc::clone(&built.graph), built.stats)
    }

    /// Builds a new graph from `roads` and puts it in service
    pub fn rebuild<R>(&self, roads: &[R]) -> BuildStats
    where
        R: AsRef<[Coordinate]>,
    {
        // Built outside the lock; readers keep the old graph meanwhile
        let (graph, stats) = build_graph_with_stats(roads, &self.config.graph);
        let (nodes, edges) = (graph.node_count(), graph.edge_count());

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Built {
            graph: Arc::new(graph),
            stats,
        };

        info!("Road network swapped in: {nodes} nodes, {edges} edges");
        stats
    }

    /// Reads roads from a GeoJSON `FeatureCollection` and rebuilds.
    /// The graph in service is left as is if the document is rejected.
    ///
    /// # Errors
    ///
    /// See [`read_roads`]
    pub fn rebuild_from_geojson(
        &self,
        text: &str,
        order: CoordinateOrder,
    ) -> Result<BuildStats, Error> {
        let roads = read_roads(text, order)?;
        Ok(self.rebuild(&roads))
    }

    /// Starts a navigation session on the current graph
    ///
    /// # Errors
    ///
    /// Whatever [`NavigationSession::start`] reports
    pub fn start_session<M, S>(
        &self,
        source: &mut S,
    ) -> Result<NavigationSession<M>, NavigationError>
    where
        M: Clone,
        S: PositionSource + ?Sized,
    {
        let mut session = NavigationSession::new(self.snapshot(), self.config.navigation);
        session.start(source)?;
        Ok(session)
    }

    fn read(&self) -> RwLockReadGuard<'_, Built> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }
}
