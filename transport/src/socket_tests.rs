use crate::socket::{self, attach, spawn_pump, split};
use parley_conversation::{
    mailbox, LoopState, Message, MessageSender, Participant, ParticipantLoop, ReplyStrategy,
    StopReason,
};
use parley_rt::tasks::{self as rt, io::AsyncWriteExt as _, Runtime};
use std::sync::Arc;

#[test]
pub fn conversation_over_loopback() {
    let runtime = Runtime::new().unwrap();
    runtime.block_on(async move {
        let listener = socket::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = rt::spawn(async move {
            let stream = socket::accept(&listener).await.unwrap();
            let responder = Arc::new(Participant::responder("Responder"));
            let _pump = attach(&responder, stream).unwrap();
            let responder_loop = ParticipantLoop::new(responder.clone()).unwrap();
            responder_loop.start();
            let state = responder_loop.join().await;
            (state, responder.received_count())
        });

        let stream = socket::dial(addr).await.unwrap();
        let initiator = Arc::new(Participant::initiator("Initiator", 3));
        let _pump = attach(&initiator, stream).unwrap();
        let initiator_loop = ParticipantLoop::new(initiator.clone()).unwrap();
        initiator_loop.start();
        ReplyStrategy::Initiator
            .open(&initiator, "Hello Responder!")
            .await
            .unwrap();

        assert_eq!(
            initiator_loop.join().await,
            LoopState::Stopped(StopReason::StopReceived)
        );
        assert_eq!(initiator.sent_count(), 3);
        assert_eq!(initiator.received_count(), 3);

        let (responder_state, responder_received) = server.await.unwrap();
        assert_eq!(responder_state, LoopState::Stopped(StopReason::StopReceived));
        assert_eq!(responder_received, 3);
    });
}

#[test]
pub fn peer_hanging_up_closes_the_loop() {
    let runtime = Runtime::new().unwrap();
    runtime.block_on(async move {
        let listener = socket::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let peer = rt::spawn(async move {
            let stream = socket::dial(addr).await.unwrap();
            let (sender, mut receiver) = split(stream);
            sender
                .send(Message::normal("Initiator", "only one [sent#1]"))
                .await
                .unwrap();
            // Both halves are dropped once the reply is in.
            receiver.recv().await.unwrap().unwrap()
        });

        let stream = socket::accept(&listener).await.unwrap();
        let responder = Arc::new(Participant::responder("Responder"));
        let _pump = attach(&responder, stream).unwrap();
        let responder_loop = ParticipantLoop::new(responder.clone()).unwrap();
        responder_loop.start();

        let reply = peer.await.unwrap();
        assert_eq!(reply.sender(), "Responder");
        assert_eq!(reply.content(), "only one [sent#1] | reply-from-Responder [sent#1]");

        assert_eq!(
            responder_loop.join().await,
            LoopState::Stopped(StopReason::Closed)
        );
        assert_eq!(responder.received_count(), 1);
        assert_eq!(responder.sent_count(), 1);
    });
}

#[test]
pub fn garbage_on_the_wire_fails_the_loop() {
    let runtime = Runtime::new().unwrap();
    runtime.block_on(async move {
        let listener = socket::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let peer = rt::spawn(async move {
            let mut stream = socket::dial(addr).await.unwrap();
            // Well-formed length prefix, unknown version byte.
            stream.write_all(&[0, 0, 0, 4, 9, 9, 9, 9]).await.unwrap();
            stream.flush().await.unwrap();
            stream
        });

        let stream = socket::accept(&listener).await.unwrap();
        let responder = Arc::new(Participant::responder("Responder"));
        let _pump = attach(&responder, stream).unwrap();
        let responder_loop = ParticipantLoop::new(responder.clone()).unwrap();
        responder_loop.start();

        let state = responder_loop.join().await;
        assert!(matches!(
            state,
            LoopState::Stopped(StopReason::TransportFailed(_))
        ));
        assert_eq!(responder.received_count(), 0);
        drop(peer.await.unwrap());
    });
}

#[test]
pub fn zero_quota_over_loopback_opens_cleanly() {
    let runtime = Runtime::new().unwrap();
    runtime.block_on(async move {
        for round in 0..25 {
            let listener = socket::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();

            let server = rt::spawn(async move {
                let stream = socket::accept(&listener).await.unwrap();
                let responder = Arc::new(Participant::responder("Responder"));
                let _pump = attach(&responder, stream).unwrap();
                let responder_loop = ParticipantLoop::new(responder).unwrap();
                responder_loop.start();
                responder_loop.join().await
            });

            let stream = socket::dial(addr).await.unwrap();
            let initiator = Arc::new(Participant::initiator("Initiator", 0));
            let _pump = attach(&initiator, stream).unwrap();
            let initiator_loop = ParticipantLoop::new(initiator.clone()).unwrap();
            initiator_loop.start();

            let opened = ReplyStrategy::Initiator.open(&initiator, "Hello Responder!").await;
            assert!(opened.is_ok(), "round {round}: {opened:?}");
            assert_eq!(
                initiator_loop.join().await,
                LoopState::Stopped(StopReason::StopReceived)
            );
            assert_eq!(
                server.await.unwrap(),
                LoopState::Stopped(StopReason::StopReceived)
            );
            assert_eq!(initiator.sent_count(), 0);
        }
    });
}

#[test]
pub fn pump_exits_when_nobody_reads_the_mailbox() {
    let runtime = Runtime::new().unwrap();
    runtime.block_on(async move {
        let listener = socket::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let peer = rt::spawn(async move { socket::dial(addr).await.unwrap() });
        let stream = socket::accept(&listener).await.unwrap();
        let (_sender, receiver) = split(stream);

        let (tx, rx) = mailbox(1);
        drop(rx);
        let pump = spawn_pump(receiver, tx);

        // Hanging up ends the stream; the end marker has nowhere to go.
        drop(peer.await.unwrap());
        pump.await.unwrap();
    });
}
