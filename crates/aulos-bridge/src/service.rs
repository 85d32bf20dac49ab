//! Single-task owner of the playback controller.

use std::pin::pin;

use aulos_events::{EventListener, EventSink, PlaybackEvent};
use aulos_play::{
    Command, CommandError, MediaBackend, Notification, PlaybackController, PlayerState,
    RemoteCommand, RemoteCommandStatus, SessionSnapshot,
};
use serde_json::Value;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, trace, warn};

use crate::{
    call::{INVALID_ARGUMENTS, MethodCall, MethodResult, encode_event},
    config::{BridgeConfig, InvalidArgumentPolicy},
    error::BridgeError,
};

enum Request {
    Call {
        call: MethodCall,
        reply: oneshot::Sender<MethodResult>,
    },
    Remote {
        command: RemoteCommand,
        reply: oneshot::Sender<RemoteCommandStatus>,
    },
    Inspect {
        reply: oneshot::Sender<(PlayerState, Option<SessionSnapshot>)>,
    },
    Shutdown,
}

/// Serializes host calls, remote commands and engine notifications onto one
/// task that owns the [`PlaybackController`].
pub struct PlayerService<B: MediaBackend> {
    config: BridgeConfig,
    controller: PlaybackController<B>,
    notifications: kanal::AsyncReceiver<Notification>,
    requests: mpsc::Receiver<Request>,
}

impl<B: MediaBackend> PlayerService<B> {
    pub fn new(controller: PlaybackController<B>, config: BridgeConfig) -> (Self, PlayerHandle) {
        let (tx, rx) = mpsc::channel(config.call_capacity.max(1));
        let handle = PlayerHandle {
            events: controller.events().clone(),
            requests: tx,
        };
        let service = Self {
            config,
            notifications: controller.notifications(),
            controller,
            requests: rx,
        };
        (service, handle)
    }

    /// Start the service on the current tokio runtime.
    pub fn spawn(
        controller: PlaybackController<B>,
        config: BridgeConfig,
    ) -> (PlayerHandle, JoinHandle<()>) {
        let (service, handle) = Self::new(controller, config);
        (handle, tokio::spawn(service.run()))
    }

    /// Run until shut down or until every [`PlayerHandle`] is dropped.
    /// The live session is stopped on exit.
    ///
    /// Host requests are taken before notifications that become ready in the
    /// same wakeup. The notification receive stays pinned across iterations:
    /// dropping a parked kanal receive can lose the value already handed to it.
    pub async fn run(mut self) {
        debug!("player service started");
        let notifications = self.notifications.clone();
        let mut next_notification = pin!(notifications.recv());
        loop {
            tokio::select! {
                biased;
                request = self.requests.recv() => match request {
                    Some(Request::Shutdown) | None => break,
                    Some(request) => self.handle(request),
                },
                notification = &mut next_notification => {
                    next_notification.set(notifications.recv());
                    match notification {
                        Ok(notification) => self.controller.handle_notification(notification),
                        Err(e) => {
                            warn!(?e, "notification channel closed");
                            break;
                        }
                    }
                }
            }
        }
        self.controller.stop();
        debug!("player service stopped");
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Call { call, reply } => {
                let result = self.call(&call);
                let _ = reply.send(result);
            }
            Request::Remote { command, reply } => {
                let status = self.controller.handle_remote(command);
                let _ = reply.send(status);
            }
            Request::Inspect { reply } => {
                let _ = reply.send((self.controller.state(), self.controller.session()));
            }
            Request::Shutdown => {}
        }
    }

    fn call(&mut self, call: &MethodCall) -> MethodResult {
        let command = match Command::decode(&call.method, &call.arguments) {
            Ok(command) => command,
            Err(CommandError::NotImplemented { method }) => {
                debug!(%method, "method not implemented");
                return MethodResult::NotImplemented;
            }
            Err(e) => return self.reject(&e),
        };
        debug!(method = command.method(), "method call");
        self.controller.execute(command);
        MethodResult::ack()
    }

    fn reject(&self, error: &CommandError) -> MethodResult {
        match self.config.invalid_arguments {
            InvalidArgumentPolicy::Acknowledge => {
                warn!(%error, "invalid arguments, call dropped");
                MethodResult::ack()
            }
            InvalidArgumentPolicy::Reject => {
                warn!(%error, "invalid arguments, call rejected");
                let message = error.to_string();
                self.controller
                    .events()
                    .emit(PlaybackEvent::error(message.clone()));
                MethodResult::Error {
                    code: INVALID_ARGUMENTS.to_owned(),
                    message,
                }
            }
        }
    }
}

/// Cloneable host-side handle to a running [`PlayerService`].
#[derive(Clone)]
pub struct PlayerHandle {
    events: EventSink,
    requests: mpsc::Sender<Request>,
}

impl PlayerHandle {
    /// Apply a method-channel call and wait for its acknowledgment.
    ///
    /// The reply only confirms the command was accepted; its effects arrive
    /// later as events.
    pub async fn invoke(&self, call: MethodCall) -> Result<MethodResult, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Call { call, reply }).await?;
        rx.await.map_err(|_| BridgeError::Closed)
    }

    /// Forward a trigger from the system remote-command source.
    pub async fn remote(&self, command: RemoteCommand) -> Result<RemoteCommandStatus, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Remote { command, reply }).await?;
        rx.await.map_err(|_| BridgeError::Closed)
    }

    pub async fn state(&self) -> Result<PlayerState, BridgeError> {
        self.inspect().await.map(|(state, _)| state)
    }

    pub async fn session(&self) -> Result<Option<SessionSnapshot>, BridgeError> {
        self.inspect().await.map(|(_, session)| session)
    }

    /// Register the single event listener, replacing any previous one.
    pub fn listen<L: EventListener>(&self, listener: L) {
        self.events.attach(listener);
    }

    /// Register a listener receiving events as flat JSON records.
    pub fn listen_json<F>(&self, on_record: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.events.attach(move |event: &PlaybackEvent| match encode_event(event) {
            Ok(record) => on_record(record),
            Err(e) => warn!(?e, name = event.name(), "event not encoded"),
        });
    }

    /// Drop the event listener. Returns `true` if one was registered.
    pub fn cancel(&self) -> bool {
        self.events.detach()
    }

    /// Stop the session and end the service task.
    pub async fn shutdown(&self) -> Result<(), BridgeError> {
        self.send(Request::Shutdown).await
    }

    async fn inspect(&self) -> Result<(PlayerState, Option<SessionSnapshot>), BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Inspect { reply }).await?;
        rx.await.map_err(|_| BridgeError::Closed)
    }

    async fn send(&self, request: Request) -> Result<(), BridgeError> {
        trace!("request queued");
        self.requests
            .send(request)
            .await
            .map_err(|_| BridgeError::Closed)
    }
}
