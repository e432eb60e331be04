use clap::{Parser, Subcommand, ValueEnum};
use elicit::collection::UsageFilter;
use elicit::prelude::*;
use log::debug;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Diagnostic rule and pathway tool
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the application config JSON file
    #[arg(short, long, default_value = "elicit.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the rule text a pathway flattens into
    Render { pathway: PathBuf },
    /// Print a pathway as structured rule JSON
    Structure { pathway: PathBuf },
    /// List the issues found in a pathway
    Validate { pathway: PathBuf },
    /// Re-position every node of a pathway into its column
    Layout {
        pathway: PathBuf,
        /// Where to write the laid out pathway (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a pathway as a tree
    Outline { pathway: PathBuf },
    /// Parse rule text into conditions and actions ("-" reads stdin)
    Parse { text: String },
    /// Generate rule text from a JSON file with `conditions` and `actions`
    Generate { rule: PathBuf },
    /// List the rules in the rules file
    List {
        /// Rules file (defaults to the configured one)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Search the rules file
    Search {
        query: String,
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Match case exactly
        #[arg(long)]
        case_sensitive: bool,
        /// Limit the search to part of each rule
        #[arg(long, value_enum, default_value_t = FieldsCli::All)]
        fields: FieldsCli,
        /// Only rules of this type
        #[arg(long, value_enum)]
        rule_type: Option<RuleTypeCli>,
        /// Only rules with this usage pattern
        #[arg(long, value_enum)]
        usage: Option<UsageCli>,
    },
}

/// Define CLI-specific enums for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FieldsCli {
    All,
    Text,
    Conditions,
    Actions,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RuleTypeCli {
    Pathway,
    Capture,
    Rule,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UsageCli {
    Never,
    Used,
    Frequent,
    Recent,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config);
    debug!("Using config {:?}", config);

    match cli.command {
        Command::Render { pathway } => {
            println!("{}", load_pathway(&pathway).convert_to_rule_text());
        }
        Command::Structure { pathway } => {
            let structured = load_pathway(&pathway).convert_to_structured_data();
            let json = serde_json::to_string_pretty(&structured)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize rule: {}", e)));
            println!("{}", json);
        }
        Command::Validate { pathway } => run_validate(&pathway),
        Command::Layout { pathway, output } => run_layout(&pathway, output, config.layout),
        Command::Outline { pathway } => {
            print!("{}", PathwayOutline::new(&load_pathway(&pathway)));
        }
        Command::Parse { text } => run_parse(&text),
        Command::Generate { rule } => run_generate(&rule),
        Command::List { rules } => {
            let collection = load_collection(&rules.unwrap_or(config.rules_file));
            print_rules(collection.rules().iter());
        }
        Command::Search {
            query,
            rules,
            case_sensitive,
            fields,
            rule_type,
            usage,
        } => {
            let collection = load_collection(&rules.unwrap_or(config.rules_file));
            let options = SearchOptions {
                case_sensitive,
                fields: match fields {
                    FieldsCli::All => SearchFields::All,
                    FieldsCli::Text => SearchFields::Text,
                    FieldsCli::Conditions => SearchFields::Conditions,
                    FieldsCli::Actions => SearchFields::Actions,
                },
                rule_type: rule_type.map(|t| match t {
                    RuleTypeCli::Pathway => RuleType::Pathway,
                    RuleTypeCli::Capture => RuleType::Capture,
                    RuleTypeCli::Rule => RuleType::Rule,
                }),
                usage: usage.map(|u| match u {
                    UsageCli::Never => UsageFilter::NeverUsed,
                    UsageCli::Used => UsageFilter::UsedAtLeastOnce,
                    UsageCli::Frequent => UsageFilter::Frequent,
                    UsageCli::Recent => UsageFilter::RecentlyUsed,
                }),
                ..SearchOptions::default()
            };
            let results = collection.search(&query, &options);
            println!("{} of {} rule(s) match", results.len(), collection.len());
            print_rules(results.into_iter());
        }
    }
}

fn load_pathway(path: &Path) -> PathwayGraph {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read pathway file '{}': {}",
            path.display(),
            e
        ))
    });
    PathwayGraph::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load pathway: {}", e)))
}

fn load_collection(path: &Path) -> Collection {
    Collection::load_from_file(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load rules: {}", e)))
}

fn run_validate(path: &Path) {
    let pathway = load_pathway(path);
    let issues = pathway.validate();
    if issues.is_empty() {
        println!("No issues found in '{}'", pathway.name());
        return;
    }

    for (category, list) in [
        ("Nodes", &issues.nodes),
        ("Connections", &issues.connections),
        ("Structure", &issues.structure),
    ] {
        if list.is_empty() {
            continue;
        }
        println!("{}:", category);
        for issue in list {
            println!("  - {}", issue);
        }
    }
    println!("\n{} issue(s) found", issues.total());
}

fn run_layout(path: &Path, output: Option<PathBuf>, layout: LayoutSettings) {
    let mut pathway = load_pathway(path);
    pathway.set_layout(layout);
    pathway.auto_layout();

    let output = output.unwrap_or_else(|| path.to_path_buf());
    let json = pathway
        .to_json()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize pathway: {}", e)));
    fs::write(&output, json).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to write pathway file '{}': {}",
            output.display(),
            e
        ))
    });
    println!(
        "Laid out {} node(s) and saved to '{}'",
        pathway.len(),
        output.display()
    );
}

fn run_parse(text: &str) {
    let text = if text == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to read stdin: {}", e)));
        buffer
    } else {
        text.to_string()
    };

    let parsed =
        RuleTextEngine::parse_text(&text).unwrap_or_else(|e| exit_with_error(&e.to_string()));
    println!("Conditions:");
    for condition in &parsed.conditions {
        println!(
            "  {} [{}] {} {}",
            condition.param, condition.operator, condition.value, condition.connector
        );
    }
    println!("Actions:");
    for action in &parsed.actions {
        println!("  {}. {}", action.sequence, action);
    }
    println!(
        "\nCanonical text:\n{}",
        RuleTextEngine::generate_text(&parsed.conditions, &parsed.actions)
    );
}

fn run_generate(path: &Path) {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read rule file '{}': {}", path.display(), e))
    });
    let rule = Rule::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load rule: {}", e)));
    println!(
        "{}",
        RuleTextEngine::generate_text(rule.conditions(), rule.actions())
    );
}

fn print_rules<'a>(rules: impl Iterator<Item = &'a Rule>) {
    for rule in rules {
        let short_id: String = rule.id().chars().take(8).collect();
        println!(
            "{:<10} {:<8} used {:>3}x (last: {})  {}",
            rule.rule_type().as_str(),
            short_id,
            rule.use_count(),
            rule.formatted_last_used(),
            rule.describe(60)
        );
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
