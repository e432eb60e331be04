use clap::Parser;
use elicit::pathway::{NodeId, NodeType, PathwayGraph};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;

/// A CLI tool to generate random diagnostic pathways for manual testing
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated pathway JSON file to
    #[arg(short, long, default_value = "generated_pathway.json")]
    output: String,

    /// The minimum number of nodes to generate per layer
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// The maximum number of nodes to generate per layer
    #[arg(long, default_value_t = 3)]
    max: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

const PROBLEMS: &[&str] = &[
    "Machine overheating",
    "Conveyor belt stalls",
    "Pressure drops during cycle",
    "Unusual vibration at startup",
    "Display shows error E42",
];

const CHECKS: &[(&str, &str)] = &[
    ("Visual Inspection", "Coolant level"),
    ("Measurement", "Motor current"),
    ("Visual Inspection", "Belt tension"),
    ("Measurement", "Line pressure"),
    ("Listening", "Bearing noise"),
    ("Log Review", "Controller fault log"),
];

const CONDITIONS: &[(&str, &str)] = &[
    ("Normal", "Temperature above 90"),
    ("Critical", "Current exceeds rated value"),
    ("Normal", "Tension below spec"),
    ("Warning", "Pressure under 4 bar"),
    ("Critical", "Grinding sound present"),
];

const ACTIONS: &[(&str, &str)] = &[
    ("Adjustment", "Top up coolant"),
    ("Replacement", "Replace drive belt"),
    ("Adjustment", "Re-tension belt"),
    ("Repair", "Reseat pressure valve"),
    ("Replacement", "Replace bearing"),
    ("Escalation", "Contact maintenance supervisor"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    // Add validation to ensure min is not greater than max
    if cli.min > cli.max || cli.min == 0 {
        eprintln!(
            "Error: --min ({}) must be at least 1 and not greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    println!(
        "Generating new pathway (nodes per layer: {} to {})...",
        cli.min, cli.max
    );

    let pathway = generate_pathway(&mut rng, cli.min, cli.max);
    let json_output = pathway.to_json()?;
    fs::write(&cli.output, json_output)?;

    info!("Pathway {} has {} edge(s)", pathway.id(), pathway.edges().len());
    println!(
        "Successfully generated a pathway with {} node(s) and saved it to '{}'",
        pathway.len(),
        cli.output
    );
    println!("\n{}", pathway.convert_to_rule_text());

    Ok(())
}

/// Builds one problem followed by layers of checks, conditions and actions.
/// Every node of a layer is connected to a random node of the previous one.
fn generate_pathway(rng: &mut StdRng, min: usize, max: usize) -> PathwayGraph {
    let problem = pick(rng, PROBLEMS);
    let mut pathway = PathwayGraph::new(format!("Generated: {}", problem));
    pathway.set_description("Randomly generated pathway");

    let root = pathway.add_node(NodeType::Problem, None);
    if let Some(node) = pathway.node_mut(root.as_str()) {
        node.set_content(problem);
    }

    let mut previous = vec![root];
    for (node_type, pool) in [
        (NodeType::Check, CHECKS),
        (NodeType::Condition, CONDITIONS),
        (NodeType::Action, ACTIONS),
    ] {
        let count = rng.random_range(min..=max);
        let mut layer: Vec<NodeId> = Vec::with_capacity(count);
        for _ in 0..count {
            let id = pathway.add_node(node_type, None);
            let (property, content) = pick(rng, pool);
            if let Some(node) = pathway.node_mut(id.as_str()) {
                node.set_content(content);
                match node_type {
                    NodeType::Check => node.set_check_type(Some(property.to_string())),
                    NodeType::Condition => node.set_severity(Some(property.to_string())),
                    NodeType::Action => {
                        node.set_effectiveness(Some(rng.random_range(1..=5)));
                        node.set_impact(Some(property.to_string()))
                    }
                    NodeType::Problem => false,
                };
            }
            let parent = &previous[rng.random_range(0..previous.len())];
            pathway.connect(parent.as_str(), id.as_str());
            layer.push(id);
        }
        println!("-> Generated {} {} node(s).", count, node_type);
        previous = layer;
    }

    pathway
}

fn pick<T: Copy>(rng: &mut StdRng, pool: &[T]) -> T {
    pool[rng.random_range(0..pool.len())]
}
