//! Simulates both seats of one session against a single coordinator.
//!
//! Two "clients" share nothing but the session key and their own last
//! known move count, exactly like two browsers polling a backend. The
//! script plays a short opening, negotiates a reset, plays again, and
//! ends with a resignation.

use std::sync::Arc;

use tesuji::prelude::*;
use tesuji::testing::SimpleRules;
use tesuji::MoveDescriptor;
use tracing_subscriber::EnvFilter;

/// One simulated client: a seat plus its last known move count.
struct Seat {
    side: Side,
    known: i64,
}

impl Seat {
    fn new(side: Side) -> Self {
        Self { side, known: 0 }
    }

    /// Polls once and updates the local move count from the reply.
    async fn poll(
        &mut self,
        coordinator: &Coordinator<SimpleRules>,
        key: &SessionKey,
    ) -> Result<(), TesujiError> {
        let reply = coordinator.poll(key, self.side, self.known).await?;
        match &reply {
            PollReply::Moved { record, sync, .. } => {
                tracing::info!(seat = %self.side, notation = %record.notation, "saw new move");
                self.known = sync.move_count as i64;
            }
            PollReply::Pending {
                requested_by,
                comment,
                ..
            } => {
                tracing::info!(seat = %self.side, %requested_by, comment = %comment, "reset pending");
            }
            PollReply::Resynced { epoch, sync } => {
                tracing::info!(seat = %self.side, epoch = %epoch, "resynced; rebuilding local view");
                self.known = sync.move_count as i64;
            }
            PollReply::Ended { winner, reason, .. } => {
                tracing::info!(seat = %self.side, %winner, %reason, "game over");
            }
            PollReply::Waiting { .. } => {
                tracing::debug!(seat = %self.side, "nothing new");
            }
        }
        Ok(())
    }

    /// Submits a move in canonical notation and syncs the local count.
    async fn submit(
        &mut self,
        coordinator: &Coordinator<SimpleRules>,
        key: &SessionKey,
        notation: &str,
    ) -> Result<(), TesujiError> {
        let descriptor: MoveDescriptor = notation.parse()?;
        let parts = match descriptor {
            MoveDescriptor::Board { from, to, promote } => MoveParts::board(from, to, promote),
            MoveDescriptor::Drop { piece, to } => MoveParts::drop(piece, to),
        };
        match coordinator.submit_move(key, self.side, parts, None).await? {
            SubmitReply::Applied { record, sync, .. } => {
                tracing::info!(seat = %self.side, notation = %record.notation, "played");
                self.known = sync.move_count as i64;
            }
            SubmitReply::AlreadyEnded { .. } => {
                tracing::info!(seat = %self.side, "game already over");
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), TesujiError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let coordinator: Coordinator<SimpleRules> = Coordinator::new(
        Arc::new(SessionStore::new()),
        SnapshotStore::new("demo-snapshots")?,
        CoordinatorConfig::default(),
    );

    let key = SessionKey::new("alice", "bob");
    let mut alice = Seat::new(Side::Host);
    let mut bob = Seat::new(Side::Guest);

    coordinator.create_session(key.clone(), Side::Host).await?;
    coordinator.start(&key).await?;
    tracing::info!(%key, "session started");

    // A short opening; each move is observed through the other seat's poll.
    alice.submit(&coordinator, &key, "7g7f").await?;
    bob.poll(&coordinator, &key).await?;
    bob.submit(&coordinator, &key, "3c3d").await?;
    alice.poll(&coordinator, &key).await?;
    alice.submit(&coordinator, &key, "2h3h").await?;
    bob.poll(&coordinator, &key).await?;

    // Alice asks for a fresh board; Bob sees the request and accepts.
    coordinator
        .request_reset(&key, Side::Host, "let's start over")
        .await?;
    bob.poll(&coordinator, &key).await?;
    coordinator.accept_reset(&key).await?;
    // Alice's poll delivers the one-time resync notice; Bob's count is
    // now ahead of the fresh board, so his poll resyncs too.
    alice.poll(&coordinator, &key).await?;
    bob.poll(&coordinator, &key).await?;

    // One more move on the fresh board, then Bob resigns.
    alice.submit(&coordinator, &key, "5g5f").await?;
    bob.poll(&coordinator, &key).await?;
    let reply = coordinator.resign(&key, Side::Guest).await?;
    tracing::info!(winner = %reply.winner, reason = %reply.reason, "resignation");

    // Both seats converge on the terminal result however often they ask.
    alice.poll(&coordinator, &key).await?;
    bob.poll(&coordinator, &key).await?;

    coordinator.leave(&key).await?;
    tracing::info!("session closed");
    Ok(())
}
