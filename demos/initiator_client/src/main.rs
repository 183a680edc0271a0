//! Initiator side of a two-process conversation. Start `responder_server`
//! first; this dials `PARLEY_ADDR` and opens with the configured message.

use parley_conversation::{
    ConversationConfig, LoopState, Participant, ParticipantError, ParticipantLoop,
    ReplyStrategy, Role,
};
use parley_rt::tasks as rt;
use parley_transport::socket;
use std::{process::ExitCode, sync::Arc};

fn main() -> ExitCode {
    rt::run(async {
        match converse().await {
            Ok(LoopState::Stopped(reason)) if reason.is_failure() => ExitCode::FAILURE,
            Ok(_) => ExitCode::SUCCESS,
            Err(error) => {
                tracing::error!(%error, "Setup failed");
                ExitCode::FAILURE
            }
        }
    })
}

async fn converse() -> Result<LoopState, ParticipantError> {
    let config = ConversationConfig::from_env()?;
    let initiator = Arc::new(Participant::with_capacity(
        config.initiator_name.as_str(),
        Role::Initiator,
        config.quota,
        config.mailbox_capacity,
    ));

    let stream = socket::dial(config.address.as_str()).await?;
    let _pump = socket::attach(&initiator, stream)?;

    let initiator_loop = ParticipantLoop::new(initiator.clone())?;
    initiator_loop.start();
    ReplyStrategy::Initiator
        .open(&initiator, &config.opening_message)
        .await?;

    let state = initiator_loop.join().await;
    tracing::info!(
        ?state,
        sent = initiator.sent_count(),
        received = initiator.received_count(),
        "Initiator finished"
    );
    Ok(state)
}
