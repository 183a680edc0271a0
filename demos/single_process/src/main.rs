//! Both participants in one process, linked through each other's mailbox.

use parley_conversation::{
    ConversationConfig, LoopState, ParticipantError, ParticipantLoop, ReplyStrategy,
};
use parley_rt::tasks as rt;
use parley_transport::in_memory;
use std::process::ExitCode;

fn main() -> ExitCode {
    rt::run(async {
        match converse().await {
            Ok(states) if states.iter().all(|state| !failed(state)) => ExitCode::SUCCESS,
            Ok(_) => ExitCode::FAILURE,
            Err(error) => {
                tracing::error!(%error, "Setup failed");
                ExitCode::FAILURE
            }
        }
    })
}

async fn converse() -> Result<[LoopState; 2], ParticipantError> {
    let config = ConversationConfig::from_env()?
        .with_names("Player1", "Player2")
        .with_opening_message("Hello Player2!");
    let (initiator, responder) = in_memory::pair(&config)?;

    let initiator_loop = ParticipantLoop::new(initiator.clone())?;
    let responder_loop = ParticipantLoop::new(responder)?;
    initiator_loop.start();
    responder_loop.start();

    ReplyStrategy::Initiator
        .open(&initiator, &config.opening_message)
        .await?;

    let initiator_state = initiator_loop.join().await;
    let responder_state = responder_loop.join().await;
    tracing::info!(?initiator_state, ?responder_state, "Conversation finished");
    Ok([initiator_state, responder_state])
}

fn failed(state: &LoopState) -> bool {
    matches!(state, LoopState::Stopped(reason) if reason.is_failure())
}
