//! # Drive executable
//!
//! Runs a scripted routine against the simulated robot and archives what happened: the per-tick
//! telemetry as CSV, the pose trace and the outcome of every command as JSON.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use structopt::StructOpt;

use drive_lib::{
    cmd::{Completion, Routine, Trace},
    drive_loop::DriveLoop,
    params::SimParams,
    telem::TelemArchive,
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CLI
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "drive_exec", about = "Run a driving routine in simulation")]
struct Opt {
    /// Path to the routine TOML file.
    #[structopt(parse(from_os_str))]
    routine: PathBuf,

    /// Simulation parameter file, relative to `$DRIVE_SIM_ROOT/params`.
    #[structopt(short, long, default_value = "drive_sim.toml")]
    params: String,

    /// Log at debug level.
    #[structopt(short, long)]
    verbose: bool,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("drive_exec", "sessions").wrap_err("Failed to create the session")?;

    let level = if opt.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    info!("Drive Exec\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: SimParams =
        util::params::load(&opt.params).wrap_err("Could not load simulation params")?;

    info!(
        "Robot: {:?} x{} per side, gear ratio {:.4}, tick {:.3} s",
        params.robot.motor, params.robot.motors_per_side, params.robot.gear_ratio, params.dt
    );

    // ---- LOAD ROUTINE ----

    info!("Loading routine from {:?}", opt.routine);

    let routine = Routine::load(&opt.routine).wrap_err("Failed to load the routine")?;
    let mut commands = routine
        .build(&params)
        .wrap_err("Failed to build the routine")?;

    info!("Routine contains {} steps\n", commands.len());

    // ---- RUN ----

    let mut drive = DriveLoop::new(&params);
    let mut trace = Trace::new();

    let outcomes = commands.run_all(&mut drive, &mut trace);

    // ---- SUMMARY ----

    info!("Routine complete\n");
    for (i, outcome) in outcomes.iter().enumerate() {
        let secs = outcome.iterations as f64 * params.dt;
        match outcome.completion {
            Completion::Finished => info!(
                "  {}: {} finished in {} ticks ({:.3} s)",
                i, outcome.name, outcome.iterations, secs
            ),
            Completion::TimedOut => warn!(
                "  {}: {} timed out after {} ticks ({:.3} s)",
                i, outcome.name, outcome.iterations, secs
            ),
        }
    }

    let end = drive.robot().pose();
    info!(
        "Final pose: ({:.2}, {:.2}) in, heading {:.2} deg",
        end.point.x,
        end.point.y,
        end.heading_rad.to_degrees()
    );

    // ---- ARCHIVE ----

    let mut telem_archive =
        TelemArchive::new(&session, "telem.csv").wrap_err("Failed to open the telemetry archive")?;
    telem_archive.extend(trace.telemetry.iter().cloned());
    telem_archive
        .write()
        .wrap_err("Failed to write the telemetry archive")?;

    session
        .save_json("poses.json", &trace.poses)
        .wrap_err("Failed to save the pose trace")?;
    session
        .save_json("outcomes.json", &outcomes)
        .wrap_err("Failed to save the command outcomes")?;

    info!("Archived {} ticks of telemetry", trace.len());

    Ok(())
}
