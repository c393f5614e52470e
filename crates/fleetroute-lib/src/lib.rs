//! Routing core for automated guided vehicle fleets.
//!
//! This crate turns a plant topology (named points connected by paths) into
//! weighted graphs and answers "cheapest route between two points for this
//! vehicle" queries. Dispatch logic should go through
//! [`PointRouterProvider`], which caches one router per routing group and
//! builds uncached routers when an order asks to avoid resources.
//!
//! # Crate layout
//!
//! | Module              | Contents                                              |
//! |---------------------|-------------------------------------------------------|
//! | [`model`]           | `Point`, `Path`, `Vehicle`, `TransportOrder`, `PlantModel` |
//! | [`service`]         | Object service, routing group and avoidance traits    |
//! | [`evaluator`]       | Edge cost evaluators and `CompositeEvaluator`         |
//! | [`graph`]           | Owned routing `Graph` and `GraphResult`               |
//! | [`mapper`]          | `ModelGraphMapper`: topology to graph, incremental updates |
//! | [`provider`]        | `GraphProvider`: per-group graph cache and derivation |
//! | [`algorithm`]       | Dijkstra, Bellman-Ford and Floyd-Warshall strategies  |
//! | [`router`]          | `PointRouter`, `Route`, `RouteStep`                   |
//! | [`router_provider`] | `PointRouterProvider`: per-group router cache         |
//! | [`config`]          | `RoutingConfig`                                       |
//! | [`error`]           | `Error`, `Result<T>`                                  |

pub mod algorithm;
mod cache;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod mapper;
pub mod model;
pub mod provider;
pub mod router;
pub mod router_provider;
pub mod service;

pub use algorithm::{instantiate, GraphPath, RouteAlgorithm, ShortestPathAlgorithm};
pub use config::RoutingConfig;
pub use error::{Error, Result};
pub use evaluator::{
    CompositeEvaluator, DistanceEvaluator, EdgeEvaluator, EvaluatorKind, ExplicitCostEvaluator,
    ExplicitPropertiesEvaluator, HopsEvaluator, TravelTimeEvaluator, HIGH_COSTS,
};
pub use graph::{Edge, EdgeId, Graph, GraphEdge, GraphResult, VertexId};
pub use mapper::ModelGraphMapper;
pub use model::{Path, PlantModel, Point, Properties, TransportOrder, Vehicle, VehicleOrientation};
pub use provider::{derive_graph_result, GraphProvider};
pub use router::{PointRouter, PointRouterFactory, Route, RouteStep, INFINITE_COSTS};
pub use router_provider::PointRouterProvider;
pub use service::{
    AvoidanceRequest, ModelObjectService, ObjectService, OrderPropertyAvoidanceExtractor,
    PropertyRoutingGroupMapper, ResourceAvoidanceExtractor, ResourcesToAvoid, RoutingGroupMapper,
};
