//! Main drive executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Connect the frame client, inference client and command server
//!     - Main loop, once per camera frame:
//!         - Receive the latest frame
//!         - Step the navigation manager, which consults the inference server
//!         - Publish the velocity demand and any plate records
//!     - Once the run is done keep publishing the end record for a short time, then exit

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use comms_if::net::NetParams;
use log::{info, warn};
use structopt::StructOpt;

// Internal
use drive_lib::{
    cmd_server::CmdServer, frame_client::FrameClient, inference_client::InferenceClient,
    nav_mgr::NavMgr, params::DriveExecParams,
};
use util::{
    logger::{logger_init, parse_level},
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Drives the robot around the track, reading the parking plates.
#[derive(Debug, StructOpt)]
#[structopt(name = "drive_exec")]
struct Args {
    /// Minimum log level, one of info, debug or trace
    #[structopt(short, long, default_value = "debug")]
    log_level: String,

    /// Executable parameters file, in the params directory
    #[structopt(long, default_value = "drive_exec.toml")]
    exec_params: String,

    /// Navigation manager parameters file, in the params directory
    #[structopt(long, default_value = "nav_mgr.toml")]
    nav_params: String,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    let min_level = parse_level(&args.log_level)
        .ok_or_else(|| eyre!("Unknown log level \"{}\"", args.log_level))?;

    let session = Session::new("drive_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(min_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Plate Runner Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    let exec_params: DriveExecParams =
        util::params::load(&args.exec_params).wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let mut nav_mgr = NavMgr::init(
        &args.nav_params,
        exec_params.result_tags(),
        exec_params.frame_rate_hz,
        Some(session.clone()),
    )
    .wrap_err("Failed to initialise NavMgr")?;
    info!("NavMgr init complete");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut frame_client = FrameClient::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to initialise FrameClient")?;
    info!("FrameClient initialised");

    let mut inference_client = InferenceClient::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to initialise InferenceClient")?;
    info!("InferenceClient initialised");

    let mut cmd_server =
        CmdServer::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise CmdServer")?;
    info!("CmdServer initialised");

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut done_time_s: Option<f64> = None;
    let mut frame_source_up = false;

    loop {
        if frame_client.is_connected() != frame_source_up {
            frame_source_up = !frame_source_up;
            if frame_source_up {
                info!("Frame source connected");
            } else {
                warn!("Frame source lost");
            }
        }

        // The frame client waits a short time for each frame so this loop doesn't spin
        let cam_image = match frame_client.recv_frame() {
            Ok(Some(i)) => i,
            Ok(None) => continue,
            Err(e) => {
                warn!("Could not get a frame: {}", e);
                continue;
            }
        };

        let now_s = session::get_elapsed_seconds();

        let output = nav_mgr.step(&cam_image.image, now_s, &mut inference_client);

        if let Some(cmd) = output.cmd {
            if let Err(e) = cmd_server.send_cmd(&cmd) {
                warn!("Could not send velocity demand: {}", e);
            }
        }

        for record in output.records.iter() {
            if let Err(e) = cmd_server.send_record(record) {
                warn!("Could not send plate record: {}", e);
            }
        }

        if nav_mgr.is_done() {
            let done_s = *done_time_s.get_or_insert(now_s);
            if now_s - done_s > exec_params.done_linger_s {
                info!("Run complete");
                break;
            }
        }
    }

    info!("Results: {:#?}", nav_mgr.persistant.evidence.results());

    session.exit();

    Ok(())
}
