//! Performance tests for repograph
//!
//! These tests verify that graph building stays fast on generated trees and
//! that the parallel pipeline does not change results.


use repograph::config::GraphConfig;
use std::fs;
use std::time::Instant;
use tempfile::TempDir;
use test_helpers::*;

/// `modules` folders of `per_module` files, each importing its neighbour,
/// a shared util and an npm package
fn generate_project(root: &std::path::Path, modules: usize, per_module: usize) {
    fs::create_dir_all(root.join("src/shared")).unwrap();
    fs::write(root.join("src/shared/index.ts"), "export const util = 1;\n").unwrap();

    for m in 0..modules {
        let dir = root.join(format!("src/module_{:03}", m));
        fs::create_dir_all(&dir).unwrap();

        for f in 0..per_module {
            let next = (f + 1) % per_module;
            let content = format!(
                "import React from 'react';\n\
                 import {{ util }} from '../shared';\n\
                 const next = require('./file_{:03}');\n\
                 export const value_{} = () => import('./file_{:03}').then(() => util + next);\n",
                next, f, next
            );
            fs::write(dir.join(format!("file_{:03}.ts", f)), content).unwrap();
        }
    }
}

#[test]
fn test_build_medium_project_performance() {
    let temp = TempDir::new().unwrap();
    generate_project(temp.path(), 20, 25);

    let start = Instant::now();
    let graph = build(temp.path(), None);
    let duration = start.elapsed();

    assert_eq!(graph.nodes.len(), 501);
    // Three local imports per generated file
    assert_eq!(graph.edges.len(), 1500);
    assert_sequential_ids(&graph);

    // Generous bound: debug builds on shared CI machines
    assert!(
        duration.as_secs() < 20,
        "Building a 500 file graph took {}ms, expected < 20s",
        duration.as_millis()
    );

    println!("✓ Built graph of {} files / {} edges in {}ms", graph.nodes.len(), graph.edges.len(), duration.as_millis());
}

#[test]
fn test_thread_count_does_not_change_graph() {
    let temp = TempDir::new().unwrap();
    generate_project(temp.path(), 8, 12);

    let sequential = builder_for(temp.path())
        .with_config(&GraphConfig { parallel_threads: 1, ..Default::default() })
        .build_graph("fixture", "repo", None)
        .unwrap();
    let parallel = builder_for(temp.path())
        .with_config(&GraphConfig { parallel_threads: 8, ..Default::default() })
        .build_graph("fixture", "repo", None)
        .unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(edge_triples(&sequential), edge_triples(&parallel));
}

#[test]
fn test_scoped_build_on_large_tree() {
    let temp = TempDir::new().unwrap();
    generate_project(temp.path(), 10, 10);

    let graph = build(temp.path(), Some("src/module_003"));
    assert_eq!(graph.nodes.len(), 10);
    // The shared util lives outside the scope and is not resolved
    assert_eq!(graph.edges.len(), 20);
    assert!(graph.nodes.iter().all(|n| n.path.starts_with("src/module_003/")));
}
