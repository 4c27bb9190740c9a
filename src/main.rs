use clap::Parser;
use datem_processor::DatemError;
use datem_processor::cli::Args;
use datem_processor::commands;
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            match error.downcast_ref::<DatemError>() {
                // Print the merged-file diagnostic as is: file name, then the row sample
                Some(fatal) if fatal.is_fatal() => eprintln!("{}", fatal),
                _ => eprintln!("Error: {:#}", error),
            }
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("datem - HYSPLIT c2datem file utilities");
    println!("======================================");
    println!();
    println!("Write observation/model pairs as datem text, generate the c2datem");
    println!("extraction script, and parse c2datem output back into tables.");
    println!();
    println!("USAGE:");
    println!("    datem <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    script      Generate datem.sh to run c2datem over cdump files");
    println!("    stations    Write a dummy station file for c2datem");
    println!("    write       Convert a CSV table to datem text");
    println!("    read        Parse c2datem output into CSV or Parquet");
    println!("    merged      Parse a merged observation/model file");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Script c2datem over every cdump file, two levels, concatenated:");
    println!("    datem script 'cdump.*' --levels 1,-1 --sizes 1,2 --mdl /opt/hysplit/exec");
    println!();
    println!("    # Declare two stations sampled every 3 hours:");
    println!("    datem stations --station 64.1,-21.9,3 --station 63.5,-19.3,3 \\");
    println!("                   --start '2010-04-14 00:00' --end '2010-04-16 00:00'");
    println!();
    println!("    # Parse c2datem output into Parquet:");
    println!("    datem read model.txt --output model.parquet");
    println!();
    println!("For detailed help on any command, use:");
    println!("    datem <COMMAND> --help");
}
