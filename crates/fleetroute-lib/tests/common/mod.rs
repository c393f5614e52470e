#![allow(dead_code)]

use std::sync::Arc;

use fleetroute_lib::{
    EvaluatorKind, ModelObjectService, Path, PlantModel, Point, PointRouterProvider,
    RouteAlgorithm, RoutingConfig, Vehicle,
};

pub const VEHICLE: &str = "Vehicle-01";

pub fn vehicle() -> Vehicle {
    Vehicle::new(VEHICLE, 1000.0, 1000.0)
}

/// A -> B (one way, 10 long at 10), B <-> C (5 long at 5 both ways).
pub fn scenario_model() -> PlantModel {
    PlantModel {
        points: vec![Point::new("A"), Point::new("B"), Point::new("C")],
        paths: vec![
            Path::new("A--B", "A", "B", 10.0, 10.0),
            Path::new("B--C", "B", "C", 5.0, 5.0).with_reverse_velocity(5.0),
        ],
        vehicles: vec![vehicle()],
    }
}

/// `size × size` grid of two-way paths, 1000 long at 1000, named `P-r-c`.
pub fn grid_model(size: usize) -> PlantModel {
    let name = |row: usize, col: usize| format!("P-{row}-{col}");
    let mut points = Vec::new();
    let mut paths = Vec::new();
    for row in 0..size {
        for col in 0..size {
            points.push(Point::new(name(row, col)));
            if col + 1 < size {
                let (from, to) = (name(row, col), name(row, col + 1));
                paths.push(
                    Path::new(format!("{from}--{to}"), from, to, 1000.0, 1000.0)
                        .with_reverse_velocity(1000.0),
                );
            }
            if row + 1 < size {
                let (from, to) = (name(row, col), name(row + 1, col));
                paths.push(
                    Path::new(format!("{from}--{to}"), from, to, 1000.0, 1000.0)
                        .with_reverse_velocity(1000.0),
                );
            }
        }
    }
    PlantModel {
        points,
        paths,
        vehicles: vec![vehicle()],
    }
}

pub fn config(algorithm: RouteAlgorithm, evaluators: &[EvaluatorKind]) -> RoutingConfig {
    RoutingConfig {
        algorithm,
        edge_evaluators: evaluators.to_vec(),
    }
}

pub fn provider(
    model: PlantModel,
    config: &RoutingConfig,
) -> (Arc<ModelObjectService>, PointRouterProvider) {
    let objects = Arc::new(ModelObjectService::new(model));
    let provider =
        PointRouterProvider::from_config(objects.clone(), config).expect("valid routing config");
    (objects, provider)
}
