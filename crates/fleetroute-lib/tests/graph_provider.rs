mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use fleetroute_lib::service::PROPKEY_ROUTING_GROUP;
use fleetroute_lib::{
    AvoidanceRequest, EvaluatorKind, Path, RouteAlgorithm, Vehicle, HIGH_COSTS,
};

use common::{config, grid_model, provider, scenario_model, vehicle};

fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn locking_removes_edges_from_group_graph_but_not_general_graph() {
    let (objects, provider) = provider(
        scenario_model(),
        &config(RouteAlgorithm::Dijkstra, &[EvaluatorKind::Distance]),
    );
    let graphs = provider.graph_provider();

    objects.modify_path("B--C", |path| path.locked = true);
    provider.invalidate();

    let group = graphs.get_graph_result(&vehicle());
    assert_eq!(group.graph.edges_of_path("B--C").count(), 0);
    assert!(group.is_consistent());

    let general = graphs.get_general_graph_result();
    assert_eq!(general.graph.edges_of_path("B--C").count(), 2);
    assert!(general.is_consistent());
}

#[test]
fn zero_velocity_removes_only_that_direction() {
    let (objects, provider) = provider(
        scenario_model(),
        &config(RouteAlgorithm::Dijkstra, &[EvaluatorKind::Distance]),
    );
    let changed = objects
        .modify_path("B--C", |path| path.max_reverse_velocity = 0.0)
        .expect("path exists");
    provider.update_routing_topology(&[changed]);

    let graph = provider.graph_provider().get_graph_result(&vehicle());
    assert_eq!(graph.graph.edge_weight("B--C", false), Some(5.0));
    assert_eq!(graph.graph.edge_weight("B--C", true), None);
}

#[test]
fn invalidate_carries_nothing_over() {
    let (objects, provider) = provider(
        scenario_model(),
        &config(RouteAlgorithm::FloydWarshall, &[EvaluatorKind::Distance]),
    );
    let before = provider.get_point_router_for_vehicle(&vehicle(), AvoidanceRequest::Nothing);
    assert_eq!(before.get_costs("A", "C"), 15);

    objects.modify_path("A--B", |path| path.length = 100.0);
    objects.update_path(Path::new("A--C", "A", "C", 50.0, 1000.0));
    provider.invalidate();

    let after = provider.get_point_router_for_vehicle(&vehicle(), AvoidanceRequest::Nothing);
    assert!(!Arc::ptr_eq(before.graph_result(), after.graph_result()));
    assert_eq!(after.graph().edge_weight("A--B", false), Some(100.0));
    assert_eq!(after.get_costs("A", "C"), 50);
    // Over the new A--C and back along B--C beats the lengthened A--B.
    assert_eq!(after.get_costs("A", "B"), 55);
    let steps = after.get_route_steps("A", "B").expect("route exists");
    assert_eq!(
        steps.iter().map(|step| step.path.as_deref()).collect::<Vec<_>>(),
        vec![Some("A--C"), Some("B--C")]
    );
}

#[test]
fn cost_property_update_only_changes_that_paths_weights() {
    let mut model = grid_model(3);
    for path in &mut model.paths {
        for group in ["", "heavy"] {
            path.properties
                .insert(format!("tcs:routingCostForward{group}"), "10".to_string());
            path.properties
                .insert(format!("tcs:routingCostReverse{group}"), "10".to_string());
        }
    }
    let (objects, provider) = provider(
        model,
        &config(RouteAlgorithm::Dijkstra, &[EvaluatorKind::ExplicitProperties]),
    );
    let graphs = provider.graph_provider();
    let light = vehicle();
    let heavy = Vehicle::new("Vehicle-02", 500.0, 500.0).with_property(PROPKEY_ROUTING_GROUP, "heavy");

    let light_before = graphs.get_graph_result(&light);
    let heavy_before = graphs.get_graph_result(&heavy);

    let target = "P-0-0--P-0-1";
    let changed = objects
        .modify_path(target, |path| {
            path.properties
                .insert("tcs:routingCostForwardheavy".to_string(), "99".to_string());
        })
        .expect("path exists");
    graphs.update_graph_results(&[changed]);

    let light_after = graphs.get_graph_result(&light);
    let heavy_after = graphs.get_graph_result(&heavy);

    assert_eq!(heavy_after.graph.edge_weight(target, false), Some(99.0));
    assert_eq!(heavy_after.graph.edge_weight(target, true), Some(10.0));
    assert_eq!(light_after.graph.edge_weight(target, false), Some(10.0));

    for (before, after) in [(&light_before, &light_after), (&heavy_before, &heavy_after)] {
        assert_eq!(before.graph.vertex_count(), after.graph.vertex_count());
        assert_eq!(before.graph.edge_count(), after.graph.edge_count());
        for edge in before.graph.edges() {
            let path = &edge.edge.path.name;
            if path == target {
                continue;
            }
            assert_eq!(
                after.graph.edge_weight(path, edge.edge.reverse),
                Some(edge.weight)
            );
        }
        assert!(after.is_consistent());
    }
}

#[test]
fn missing_cost_property_falls_back_to_high_costs() {
    let (_, provider) = provider(
        scenario_model(),
        &config(RouteAlgorithm::Dijkstra, &[EvaluatorKind::ExplicitProperties]),
    );
    let graph = provider.graph_provider().get_graph_result(&vehicle());
    assert_eq!(graph.graph.edge_weight("A--B", false), Some(HIGH_COSTS));

    let router = provider.get_point_router_for_vehicle(&vehicle(), AvoidanceRequest::Nothing);
    assert_eq!(router.get_costs("A", "B"), HIGH_COSTS as i64);
}

#[test]
fn derived_graph_excludes_points_and_their_edges() {
    let (_, provider) = provider(grid_model(3), &config(RouteAlgorithm::Dijkstra, &[EvaluatorKind::Distance]));
    let graphs = provider.graph_provider();
    let excluded = names(&["P-1-1", "P-0-2"]);

    let derived = graphs.get_derived_graph_result(&vehicle(), &excluded, &BTreeSet::new());

    for point in &excluded {
        assert!(!derived.graph.contains_vertex(point));
        assert!(!derived.point_base.contains_key(point));
    }
    for edge in derived.graph.edges() {
        assert!(!excluded.contains(edge.edge.source_point()));
        assert!(!excluded.contains(edge.edge.target_point()));
    }
    assert!(derived.is_consistent());
    assert_eq!(derived.graph.vertex_count(), 7);
}

#[test]
fn derived_graph_keeps_original_weights_and_leaves_cache_alone() {
    let mut model = grid_model(2);
    model.paths[0].length = 1234.0;
    let (_, provider) = provider(model, &config(RouteAlgorithm::Dijkstra, &[EvaluatorKind::Distance]));
    let graphs = provider.graph_provider();
    let base = graphs.get_graph_result(&vehicle());
    let kept = base.graph.edges()[0].edge.path.name.clone();
    let dropped = base
        .graph
        .edges()
        .iter()
        .map(|edge| edge.edge.path.name.clone())
        .find(|name| *name != kept)
        .expect("second path");

    let derived = graphs.get_derived_graph_result(&vehicle(), &BTreeSet::new(), &names(&[&dropped]));

    assert_eq!(derived.graph.edges_of_path(&dropped).count(), 0);
    assert_eq!(
        derived.graph.edge_weight(&kept, false),
        base.graph.edge_weight(&kept, false)
    );
    assert!(Arc::ptr_eq(&base, &graphs.get_graph_result(&vehicle())));
    assert_eq!(base.graph.edges_of_path(&dropped).count(), 2);
}

#[test]
fn derived_general_graph_ignores_locks() {
    let mut model = scenario_model();
    model.paths[1].locked = true;
    let (_, provider) = provider(model, &config(RouteAlgorithm::Dijkstra, &[EvaluatorKind::Hops]));

    let derived = provider
        .graph_provider()
        .get_derived_general_graph_result(&names(&["A"]), &BTreeSet::new());

    assert!(!derived.graph.contains_vertex("A"));
    assert_eq!(derived.graph.edges_of_path("B--C").count(), 2);
    assert_eq!(derived.graph.edges_of_path("A--B").count(), 0);
}
