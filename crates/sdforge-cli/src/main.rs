//! sdforge CLI - inspect, sample and generate SDF scene files.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use sdforge::shapes::{Box3, Cylinder, Sphere};
use sdforge::smooth::SmoothUnion;
use sdforge::{NodeId, Registry, SceneDocument, SdfGraph, EMPTY_DISTANCE};
use sdforge_math::grid::{block_center, block_corners, to_block_pos};
use sdforge_math::{Tolerance, Vec3};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "sdforge")]
#[command(about = "Inspect and sample signed-distance-field scenes", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display information about a .sdf.json file
    Info {
        /// Path to the scene file
        file: PathBuf,
    },
    /// Evaluate the scene's distance at one or more points
    Sample {
        /// Path to the scene file
        file: PathBuf,
        /// Query point as `x,y,z` (repeatable)
        #[arg(short, long = "point", value_parser = parse_point, allow_hyphen_values = true, required = true)]
        points: Vec<Vec3>,
        /// Treat each point as lying in a grid cell and sample that cell
        #[arg(long)]
        block: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the registered node type keys
    Keys,
    /// Write a small demo scene
    Demo {
        /// Output .sdf.json file
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    sdforge::register_all();

    match cli.command {
        Commands::Info { file } => show_info(&file)?,
        Commands::Sample {
            file,
            points,
            block,
            json,
        } => sample(&file, &points, block, json)?,
        Commands::Keys => list_keys(),
        Commands::Demo { output } => write_demo(&output)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_point(s: &str) -> std::result::Result<Vec3, String> {
    let coords = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|e| format!("{c:?}: {e}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match coords.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got {} values", coords.len())),
    }
}

fn load_scene(file: &Path) -> Result<(SdfGraph, NodeId, SceneDocument)> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc = SceneDocument::from_json(&json)
        .with_context(|| format!("{} is not a scene document", file.display()))?;

    let registry = sdforge::registry::global()
        .read()
        .map_err(|_| anyhow::anyhow!("type registry lock poisoned"))?;
    let mut graph = SdfGraph::new();
    let root = doc
        .load(&registry, &mut graph)
        .with_context(|| format!("failed to decode scene in {}", file.display()))?;
    tracing::info!(nodes = graph.len(), "scene loaded");
    Ok((graph, root, doc))
}

fn show_info(file: &Path) -> Result<()> {
    let (graph, root, doc) = load_scene(file)?;

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    count_kinds(&graph, root, &mut kinds)?;

    println!("sdforge scene: {}", file.display());
    println!("  Version: {}", doc.version);
    println!("  Nodes: {}", graph.len());
    if !kinds.is_empty() {
        println!("\nNode kinds:");
        for (key, count) in &kinds {
            println!("  {key}: {count}");
        }
    }
    println!("\nTree:");
    print!("{}", graph.display(root));

    Ok(())
}

fn count_kinds(graph: &SdfGraph, id: NodeId, kinds: &mut BTreeMap<&'static str, usize>) -> Result<()> {
    if graph.is_sentinel(id) {
        return Ok(());
    }
    *kinds.entry(graph.type_key(id)?).or_default() += 1;
    for &child in graph.slots(id)? {
        count_kinds(graph, child, kinds)?;
    }
    Ok(())
}

fn classify(distance: f64) -> &'static str {
    if distance == EMPTY_DISTANCE {
        "empty"
    } else if Tolerance::DEFAULT.values_equal(distance, 0.0) {
        "surface"
    } else if distance < 0.0 {
        "inside"
    } else {
        "outside"
    }
}

fn sample(file: &Path, points: &[Vec3], block: bool, json: bool) -> Result<()> {
    let (graph, root, _) = load_scene(file)?;

    let mut results = Vec::with_capacity(points.len());
    for p in points {
        if block {
            let cell = to_block_pos(p);
            let center = block_center(&cell);
            let corners_inside = block_corners(&cell)
                .iter()
                .filter(|corner| graph.distance(root, corner) <= 0.0)
                .count();
            let distance = graph.distance(root, &center);
            results.push(serde_json::json!({
                "block": [cell.x, cell.y, cell.z],
                "center": [center.x, center.y, center.z],
                "distance": distance,
                "corners_inside": corners_inside,
                "class": classify(distance),
            }));
            if !json {
                println!(
                    "block ({}, {}, {}): {distance} ({}, {corners_inside}/8 corners inside)",
                    cell.x,
                    cell.y,
                    cell.z,
                    classify(distance)
                );
            }
        } else {
            let distance = graph.distance(root, p);
            results.push(serde_json::json!({
                "point": [p.x, p.y, p.z],
                "distance": distance,
                "class": classify(distance),
            }));
            if !json {
                println!("({}, {}, {}): {distance} ({})", p.x, p.y, p.z, classify(distance));
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    Ok(())
}

fn list_keys() {
    let registry = sdforge::registry::global()
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    for key in registry.keys() {
        println!("{key}");
    }
}

/// A rounded capsule-like body with a hole bored through it.
fn demo_scene(graph: &mut SdfGraph) -> Result<NodeId> {
    let left = graph.insert(Sphere::new(Vec3::new(-1.5, 0.0, 0.0), 1.25));
    let right = graph.insert(Sphere::new(Vec3::new(1.5, 0.0, 0.0), 1.25));
    let body = graph.build(SmoothUnion::new(0.75), &[left, right])?;
    let slab = graph.insert(Box3::new(Vec3::zeros(), Vec3::new(3.0, 0.5, 0.5)));
    let solid = graph.union(body, slab)?;
    let bore = graph.insert(Cylinder::new(Vec3::zeros(), 0.4, 4.0));
    Ok(graph.difference(solid, bore)?)
}

fn write_demo(output: &Path) -> Result<()> {
    let mut graph = SdfGraph::new();
    let root = demo_scene(&mut graph)?;

    let registry = Registry::with_builtins();
    let doc = SceneDocument::from_graph(&registry, &graph, root)?;
    fs::write(output, doc.to_json()?)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Wrote demo scene ({} nodes) to {}", graph.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point_accepts_three_coordinates() {
        assert_eq!(parse_point("1, -2.5,3").unwrap(), Vec3::new(1.0, -2.5, 3.0));
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("1,2,z").is_err());
    }

    #[test]
    fn test_demo_scene_has_bore_through_center() {
        let mut graph = SdfGraph::new();
        let root = demo_scene(&mut graph).unwrap();
        assert_eq!(graph.len(), 7);
        // On the axis of the bore, outside the solid.
        assert!(graph.distance(root, &Vec3::zeros()) > 0.0);
        // Inside the left lobe.
        assert!(graph.distance(root, &Vec3::new(-1.5, 0.0, 0.9)) < 0.0);
    }

    #[test]
    fn test_classify_distances() {
        assert_eq!(classify(-0.5), "inside");
        assert_eq!(classify(0.0), "surface");
        assert_eq!(classify(2.0), "outside");
        assert_eq!(classify(EMPTY_DISTANCE), "empty");
    }
}
