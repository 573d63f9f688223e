//! QGS CLI
//!
//! Command-line interface driving the rig tool against a session file

use clap::{Parser, Subcommand};

mod commands;

use commands::SessionArgs;

#[derive(Debug, Parser)]
#[command(name = "qgs")]
#[command(about = "QGS - reversible rigging and partitioning of scene meshes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create an empty session file
    Init(commands::init::InitArgs),
    /// Select objects and set the active one
    Select(commands::selection::SelectArgs),
    /// Select bones of an armature and set the active bone
    SelectBones(commands::selection::SelectBonesArgs),
    /// Switch interaction mode
    Mode(commands::selection::ModeArgs),
    /// Rig every selected mesh with one bone each
    CreateRig,
    /// Back up a mesh and split it by vertex group
    Separate(commands::operator::SeparateArgs),
    /// Parent selected bones to the active bone
    Reparent(commands::operator::ArmatureArgs),
    /// Clear the parent of selected bones
    Unparent(commands::operator::ArmatureArgs),
    /// Undo the last reparent or unparent of selected bones
    ReverseParent(commands::operator::ArmatureArgs),
    /// Undo every change made by the tool
    Revert,
    /// Count tool-owned entities in the scene
    Count,
    /// Check scene invariants
    Validate,
    /// Check for and install a newer release
    Update,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, &cli.session),
        Commands::Select(args) => commands::selection::execute_select(args, &cli.session),
        Commands::SelectBones(args) => commands::selection::execute_select_bones(args, &cli.session),
        Commands::Mode(args) => commands::selection::execute_mode(args, &cli.session),
        Commands::CreateRig => commands::operator::execute(qgs_core::Command::CreateRig, &cli.session),
        Commands::Separate(args) => commands::operator::execute(
            qgs_core::Command::Separate {
                object: args.object,
            },
            &cli.session,
        ),
        Commands::Reparent(args) => commands::operator::execute(
            qgs_core::Command::Reparent {
                armature: args.armature,
            },
            &cli.session,
        ),
        Commands::Unparent(args) => commands::operator::execute(
            qgs_core::Command::Unparent {
                armature: args.armature,
            },
            &cli.session,
        ),
        Commands::ReverseParent(args) => commands::operator::execute(
            qgs_core::Command::ReverseParent {
                armature: args.armature,
            },
            &cli.session,
        ),
        Commands::Revert => commands::operator::execute(qgs_core::Command::RevertAll, &cli.session),
        Commands::Count => commands::inspect::execute_count(&cli.session),
        Commands::Validate => commands::inspect::execute_validate(&cli.session),
        Commands::Update => commands::update::execute(&cli.session),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
