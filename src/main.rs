use clap::Parser;
use lca_datastore::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("lca-datastore - versioned LCA data stores");
    println!("=========================================");
    println!();
    println!("Inspect, update and reprocess life-cycle inventory databases and");
    println!("impact assessment methods, weightings and normalizations.");
    println!();
    println!("USAGE:");
    println!("    lca-datastore [OPTIONS] <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    status      Show which data updates still need to be applied");
    println!("    update      Apply one named update, or every pending update with --all");
    println!("    list        List registered stores, optionally of one kind");
    println!("    process     Recompile one store from its intermediate data");
    println!("    backup      Write a timestamped backup of one store");
    println!();
    println!("OPTIONS:");
    println!("    --data-dir <PATH>  Data directory (default: $LCA_DATASTORE_DIR)");
    println!("    -v, --verbose      Increase logging verbosity");
    println!("    -q, --quiet        Only log errors");
    println!("    -h, --help         Show help information");
    println!("    -V, --version      Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    lca-datastore status");
    println!("    lca-datastore update --all");
    println!("    lca-datastore list method");
    println!("    lca-datastore process database \"ecoinvent 3.9\"");
}
