use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::control::intents::{parse_command, ControlIntent, COMMANDS};
use crate::control::state::SharedState;

/// Spawn the stdin control console on `runtime`
pub fn spawn_console(
    runtime: &Handle,
    intents: UnboundedSender<ControlIntent>,
    shared: Arc<SharedState>,
) -> JoinHandle<()> {
    info!("Control console ready on stdin: {}", COMMANDS);
    runtime.spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        run_console(stdin, intents, shared).await;
    })
}

/// Forward parsed lines from `reader` as intents until quit, end of input or
/// the render loop going away.
///
/// `quit` also clears the running flag directly so shutdown is observed even
/// if the intent queue is not drained again.
pub async fn run_console<R>(reader: R, intents: UnboundedSender<ControlIntent>, shared: Arc<SharedState>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while shared.is_running() {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Control console input closed");
                break;
            }
            Err(e) => {
                warn!("Control console read failed: {}", e);
                break;
            }
        };

        let intent = match parse_command(&line) {
            Ok(Some(intent)) => intent,
            Ok(None) => continue,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        debug!("Console intent: {:?}", intent);
        if intent == ControlIntent::Quit {
            shared.request_shutdown();
        }
        if intents.send(intent).is_err() {
            debug!("Render loop gone, stopping control console");
            break;
        }
        if intent == ControlIntent::Quit {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_console_forwards_intents_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shared = Arc::new(SharedState::default());
        let input: &[u8] = b"info\n\nbogus\ntolerance 12\nnext\n";

        run_console(input, tx, Arc::clone(&shared)).await;

        let mut received = Vec::new();
        while let Ok(intent) = rx.try_recv() {
            received.push(intent);
        }
        assert_eq!(
            received,
            vec![ControlIntent::ShowInfo, ControlIntent::SetTolerance(12), ControlIntent::Next]
        );
        assert!(shared.is_running());
    }

    #[tokio::test]
    async fn test_quit_stops_console_and_clears_running() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shared = Arc::new(SharedState::default());
        let input: &[u8] = b"pause\nquit\nnext\n";

        run_console(input, tx, Arc::clone(&shared)).await;

        assert_eq!(rx.recv().await, Some(ControlIntent::TogglePlayback));
        assert_eq!(rx.recv().await, Some(ControlIntent::Quit));
        assert_eq!(rx.recv().await, None);
        assert!(!shared.is_running());
    }

    #[tokio::test]
    async fn test_console_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let shared = Arc::new(SharedState::default());
        let input: &[u8] = b"info\ninfo\n";

        run_console(input, tx, Arc::clone(&shared)).await;
        assert!(shared.is_running());
    }
}
