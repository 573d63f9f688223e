//! Selection and mode commands
//!
//! Usage:
//!   qgs select <OBJECT>... [--active <OBJECT>]
//!   qgs select-bones <ARMATURE> <BONE>... [--active <BONE>]
//!   qgs mode <object|edit|pose>

use clap::{Args, ValueEnum};
use qgs_core::Mode;

use super::{open, save, CliResult, SessionArgs};

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Objects to select; everything else is deselected
    pub objects: Vec<String>,

    /// Active object (default: first selected)
    #[arg(short, long)]
    pub active: Option<String>,
}

#[derive(Debug, Args)]
pub struct SelectBonesArgs {
    /// Armature object holding the bones
    pub armature: String,

    /// Bones to select; every other bone is deselected
    pub bones: Vec<String>,

    /// Active bone
    #[arg(short, long)]
    pub active: Option<String>,
}

#[derive(Debug, Args)]
pub struct ModeArgs {
    pub mode: ModeArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Object,
    Edit,
    Pose,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Object => Mode::Object,
            ModeArg::Edit => Mode::Edit,
            ModeArg::Pose => Mode::Pose,
        }
    }
}

pub fn execute_select(args: SelectArgs, session_args: &SessionArgs) -> CliResult {
    let (mut session, _) = open(session_args)?;
    let scene = &mut session.scene;

    scene.select_only(&args.objects)?;
    match args.active.as_deref().or(args.objects.first().map(String::as_str)) {
        Some(active) => scene.set_active(active)?,
        None => scene.clear_active(),
    }

    println!(
        "Selected {} object(s), active: {}",
        args.objects.len(),
        scene.active().unwrap_or("none")
    );
    save(&session, session_args)
}

pub fn execute_select_bones(args: SelectBonesArgs, session_args: &SessionArgs) -> CliResult {
    let (mut session, _) = open(session_args)?;

    session
        .scene
        .select_bones(&args.armature, &args.bones, args.active.as_deref())?;

    println!(
        "Selected {} bone(s) on {}, active: {}",
        args.bones.len(),
        args.armature,
        args.active.as_deref().unwrap_or("none")
    );
    save(&session, session_args)
}

pub fn execute_mode(args: ModeArgs, session_args: &SessionArgs) -> CliResult {
    let (mut session, _) = open(session_args)?;

    session.scene.set_mode(args.mode.into())?;

    println!("Mode: {}", session.scene.mode());
    save(&session, session_args)
}
