use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::WrapperFoot;

/// Public API for the wrapper backend - owns the task
pub struct WrapperBackend
{   hand: crate::WrapperHand
  , names: Vec<String>
  , _task_handle: tokio::task::JoinHandle<()>
}

impl WrapperBackend
{   /// Create and spawn a new backend around a coordinator
    /// Returns immediately - spawns background task
    pub fn new(coordinator: crate::Coordinator) -> Self
    {   debug!("Creating WrapperBackend with task ownership");

        let (query_all_tx, query_all_rx)
          = mpsc::unbounded_channel();
        let (regenerate_tx, regenerate_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::WrapperHand
        {   query_all_tx
          , regenerate_tx
          , kill_process_tx
        };

        let foot = crate::WrapperFoot
        {   query_all_rx
          , regenerate_rx
          , kill_process_rx
        };

        let names = coordinator.names();
        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, coordinator).await
        });

        WrapperBackend
        {   hand
          , names
          , _task_handle
        }
    }

    /// Provider display names, in result order
    pub fn names(&self) -> &[String]
    {   &self.names
    }

    /// Query every provider - returns almost immediately
    pub fn query_all(
      &self
    , request: crate::QueryRequest
    ) -> Result<
        mpsc::UnboundedReceiver<crate::QueryAllReply>,
        crate::error::Error
      >
    {   debug!("query_all queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::QueryAllArgs
        {   request
          , reply: reply_tx
        };

        self.hand.query_all_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Regenerate one provider - returns almost immediately
    pub fn regenerate(
      &self
    , index: usize
    , request: crate::QueryRequest
    ) -> Result<
        mpsc::UnboundedReceiver<crate::RegenerateReply>,
        crate::error::Error
      >
    {   debug!("regenerate queuing command for position {}", index);
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::RegenerateArgs
        {   index
          , request
          , reply: reply_tx
        };

        self.hand.regenerate_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel closed");
            crate::error::Error::Other(
              "Backend disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down WrapperBackend");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::KillProcessArgs
        {   reply: reply_tx
        };

        self.hand.kill_process_tx
          .send(cmd)
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::Other(
              "Backend already shutdown".to_string()
            )
          })?;

        // Wait for shutdown confirmation
        if let Some(result) = reply_rx.recv().await
        {   debug!("Backend shutdown confirmed");
            result
        } else
        {   error!("Backend shutdown timeout");
            Err(crate::error::Error::Timeout)
        }
    }
}

/// Main backend event loop
///
/// tokio::select! only routes: each query is spawned onto its own
/// task so a regenerate never waits behind a running query_all.
async fn run_backend_loop(
  foot: crate::WrapperFoot
, coordinator: crate::Coordinator
)
{   debug!("Starting WrapperBackend event loop");
    let WrapperFoot
    {   mut query_all_rx
      , mut regenerate_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = query_all_rx.recv() => {
          debug!("Received QueryAll");
          let coordinator = coordinator.clone();
          tokio::spawn(async move {
            let results = coordinator.query_all(&cmd.request).await;
            let _ = cmd.reply.send(results);
          });
        }
      , Some(cmd) = regenerate_rx.recv() => {
          debug!("Received Regenerate for position {}", cmd.index);
          let coordinator = coordinator.clone();
          tokio::spawn(async move {
            let result = coordinator
              .regenerate(cmd.index, &cmd.request)
              .await
              .map(|r| (cmd.index, r));
            let _ = cmd.reply.send(result);
          });
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          let _ = cmd.reply.send(Ok(()));
          info!("WrapperBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
