//! Responder side of a two-process conversation: accepts one peer on
//! `PARLEY_ADDR` and replies until STOP.

use parley_conversation::{
    ConversationConfig, LoopState, Participant, ParticipantError, ParticipantLoop, Role,
};
use parley_rt::tasks as rt;
use parley_transport::socket;
use std::{process::ExitCode, sync::Arc};

fn main() -> ExitCode {
    rt::run(async {
        match serve().await {
            Ok(LoopState::Stopped(reason)) if reason.is_failure() => ExitCode::FAILURE,
            Ok(_) => ExitCode::SUCCESS,
            Err(error) => {
                tracing::error!(%error, "Setup failed");
                ExitCode::FAILURE
            }
        }
    })
}

async fn serve() -> Result<LoopState, ParticipantError> {
    let config = ConversationConfig::from_env()?;
    let responder = Arc::new(Participant::with_capacity(
        config.responder_name.as_str(),
        Role::Responder,
        0,
        config.mailbox_capacity,
    ));

    let stream = socket::listen(config.address.as_str()).await?;
    let _pump = socket::attach(&responder, stream)?;

    let responder_loop = ParticipantLoop::new(responder)?;
    responder_loop.start();
    let state = responder_loop.join().await;
    tracing::info!(?state, "Responder finished");
    Ok(state)
}
