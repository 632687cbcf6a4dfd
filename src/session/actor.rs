//! Actor runtime that serialises explorer operations.
//!
//! Every command touching the node cache runs on one task, so the cache is
//! never mutated concurrently. Uploads only need the CLI, so they run on
//! their own task and send a refresh back when they finish. The tree stays
//! browsable while they run.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;
use url::Url;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{Result, SpaceFsError};
use crate::fs::node::RemoteNode;
use crate::fs::operations::delete::DeleteSummary;
use crate::fs::operations::drop::{DropOutcome, DropPayload};
use crate::fs::operations::upload::UploadOutcome;
use crate::fs::tree::TreeEvent;
use crate::progress::ProgressCallback;
use crate::session::Explorer;
use crate::space::{Space, SpaceInfo};

/// Cloneable front end to an [`Explorer`] running on its own task.
#[derive(Clone)]
pub struct ExplorerHandle {
    tx: mpsc::Sender<ExplorerCommand>,
}

type Reply<T> = oneshot::Sender<Result<T>>;

enum ExplorerCommand {
    ListChildren {
        parent: Option<Arc<RemoteNode>>,
        reply: Reply<Vec<Arc<RemoteNode>>>,
    },
    GetParent {
        node: Arc<RemoteNode>,
        reply: Reply<Option<Arc<RemoteNode>>>,
    },
    Refresh {
        reply: Reply<()>,
    },
    Subscribe {
        reply: Reply<broadcast::Receiver<TreeEvent>>,
    },
    SwitchSpace {
        space: Space,
        reply: Reply<()>,
    },
    ListSpaces {
        reply: Reply<Vec<SpaceInfo>>,
    },
    CreateSpace {
        name: String,
        reply: Reply<SpaceInfo>,
    },
    Mkdir {
        parent: Option<Arc<RemoteNode>>,
        name: String,
        reply: Reply<()>,
    },
    RemoveFile {
        node: Arc<RemoteNode>,
        reply: Reply<bool>,
    },
    RemoveFolder {
        node: Arc<RemoteNode>,
        progress: ProgressCallback,
        cancel: CancelToken,
        reply: Reply<Option<DeleteSummary>>,
    },
    Move {
        source: Arc<RemoteNode>,
        target: Option<Arc<RemoteNode>>,
        reply: Reply<String>,
    },
    Rename {
        node: Arc<RemoteNode>,
        new_name: String,
        reply: Reply<String>,
    },
    Cat {
        node: Arc<RemoteNode>,
        reply: Reply<String>,
    },
    Head {
        node: Arc<RemoteNode>,
        lines: Option<u32>,
        reply: Reply<String>,
    },
    Download {
        node: Arc<RemoteNode>,
        output_dir: PathBuf,
        cancel: CancelToken,
        reply: Reply<()>,
    },
    Upload {
        paths: Vec<PathBuf>,
        target: Option<Arc<RemoteNode>>,
        progress: ProgressCallback,
        cancel: CancelToken,
        reply: Reply<UploadOutcome>,
    },
    UploadFinished {
        result: Result<UploadOutcome>,
        reply: Reply<UploadOutcome>,
    },
    Drop {
        target: Option<Arc<RemoteNode>>,
        payload: DropPayload,
        progress: ProgressCallback,
        cancel: CancelToken,
        reply: Reply<DropOutcome>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

struct ExplorerActor {
    explorer: Explorer,
    rx: mpsc::Receiver<ExplorerCommand>,
    /// Lets detached uploads report back without keeping the actor alive.
    tx: mpsc::WeakSender<ExplorerCommand>,
}

impl ExplorerHandle {
    /// Locate the CLI and start an explorer on the home space.
    pub fn start(config: Config) -> Result<Self> {
        Ok(ExplorerActor::spawn(Explorer::new(config)?))
    }

    /// Run an already configured explorer.
    pub fn spawn(explorer: Explorer) -> Self {
        ExplorerActor::spawn(explorer)
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R>>) -> ExplorerCommand,
    ) -> Result<R> {
        let (tx, rx) = oneshot::channel();
        let cmd = build(tx);
        self.tx
            .send(cmd)
            .await
            .map_err(|_| SpaceFsError::Custom("Explorer actor stopped".to_string()))?;
        rx.await
            .map_err(|_| SpaceFsError::Custom("Explorer actor stopped".to_string()))?
    }

    pub async fn list_children(
        &self,
        parent: Option<Arc<RemoteNode>>,
    ) -> Result<Vec<Arc<RemoteNode>>> {
        self.request(|reply| ExplorerCommand::ListChildren { parent, reply })
            .await
    }

    pub async fn get_parent(&self, node: Arc<RemoteNode>) -> Result<Option<Arc<RemoteNode>>> {
        self.request(|reply| ExplorerCommand::GetParent { node, reply })
            .await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.request(|reply| ExplorerCommand::Refresh { reply })
            .await
    }

    pub async fn subscribe(&self) -> Result<broadcast::Receiver<TreeEvent>> {
        self.request(|reply| ExplorerCommand::Subscribe { reply })
            .await
    }

    pub async fn switch_space(&self, space: Space) -> Result<()> {
        self.request(|reply| ExplorerCommand::SwitchSpace { space, reply })
            .await
    }

    pub async fn list_spaces(&self) -> Result<Vec<SpaceInfo>> {
        self.request(|reply| ExplorerCommand::ListSpaces { reply })
            .await
    }

    pub async fn create_space(&self, name: &str) -> Result<SpaceInfo> {
        self.request(|reply| ExplorerCommand::CreateSpace {
            name: name.to_string(),
            reply,
        })
        .await
    }

    pub async fn mkdir(&self, parent: Option<Arc<RemoteNode>>, name: &str) -> Result<()> {
        self.request(|reply| ExplorerCommand::Mkdir {
            parent,
            name: name.to_string(),
            reply,
        })
        .await
    }

    pub async fn remove_file(&self, node: Arc<RemoteNode>) -> Result<bool> {
        self.request(|reply| ExplorerCommand::RemoveFile { node, reply })
            .await
    }

    pub async fn remove_folder(
        &self,
        node: Arc<RemoteNode>,
        progress: ProgressCallback,
        cancel: CancelToken,
    ) -> Result<Option<DeleteSummary>> {
        self.request(|reply| ExplorerCommand::RemoveFolder {
            node,
            progress,
            cancel,
            reply,
        })
        .await
    }

    pub async fn move_node(
        &self,
        source: Arc<RemoteNode>,
        target: Option<Arc<RemoteNode>>,
    ) -> Result<String> {
        self.request(|reply| ExplorerCommand::Move {
            source,
            target,
            reply,
        })
        .await
    }

    pub async fn rename(&self, node: Arc<RemoteNode>, new_name: &str) -> Result<String> {
        self.request(|reply| ExplorerCommand::Rename {
            node,
            new_name: new_name.to_string(),
            reply,
        })
        .await
    }

    pub async fn cat(&self, node: Arc<RemoteNode>) -> Result<String> {
        self.request(|reply| ExplorerCommand::Cat { node, reply }).await
    }

    pub async fn head(&self, node: Arc<RemoteNode>, lines: Option<u32>) -> Result<String> {
        self.request(|reply| ExplorerCommand::Head { node, lines, reply })
            .await
    }

    pub async fn download<P: Into<PathBuf>>(
        &self,
        node: Arc<RemoteNode>,
        output_dir: P,
        cancel: CancelToken,
    ) -> Result<()> {
        let output_dir = output_dir.into();
        self.request(|reply| ExplorerCommand::Download {
            node,
            output_dir,
            cancel,
            reply,
        })
        .await
    }

    /// Upload into `target` (see [`Explorer::upload_to`]). Other commands keep
    /// being served while the upload runs.
    pub async fn upload(
        &self,
        paths: Vec<PathBuf>,
        target: Option<Arc<RemoteNode>>,
        progress: ProgressCallback,
        cancel: CancelToken,
    ) -> Result<UploadOutcome> {
        self.request(|reply| ExplorerCommand::Upload {
            paths,
            target,
            progress,
            cancel,
            reply,
        })
        .await
    }

    pub async fn handle_drop(
        &self,
        target: Option<Arc<RemoteNode>>,
        payload: DropPayload,
        progress: ProgressCallback,
        cancel: CancelToken,
    ) -> Result<DropOutcome> {
        self.request(|reply| ExplorerCommand::Drop {
            target,
            payload,
            progress,
            cancel,
            reply,
        })
        .await
    }

    pub async fn shutdown(&self) {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(ExplorerCommand::Shutdown { reply: tx }).await;
        let _ = rx.await;
    }
}

impl ExplorerActor {
    fn spawn(explorer: Explorer) -> ExplorerHandle {
        let (tx, rx) = mpsc::channel(64);
        let actor = ExplorerActor {
            explorer,
            rx,
            tx: tx.downgrade(),
        };
        tokio::spawn(actor.run());
        ExplorerHandle { tx }
    }

    async fn run(mut self) {
        while let Some(cmd) = self.rx.recv().await {
            if self.handle_command(cmd).await {
                break;
            }
        }
        debug!("explorer actor stopped");
    }

    /// Run an upload on its own task. The result comes back through the
    /// actor so the refresh and notifications happen on the actor.
    fn spawn_upload(
        &self,
        paths: Vec<PathBuf>,
        destination: Option<String>,
        progress: ProgressCallback,
        cancel: CancelToken,
        reply: Reply<UploadOutcome>,
    ) {
        let pipeline = self.explorer.upload_pipeline();
        let space = self.explorer.space().clone();
        let back = self.tx.clone();
        tokio::spawn(async move {
            let result = pipeline
                .run(paths, space, destination, progress, cancel)
                .await;
            match back.upgrade() {
                Some(tx) => {
                    let _ = tx
                        .send(ExplorerCommand::UploadFinished { result, reply })
                        .await;
                }
                None => {
                    let _ = reply.send(result);
                }
            }
        });
    }

    async fn handle_command(&mut self, cmd: ExplorerCommand) -> bool {
        match cmd {
            ExplorerCommand::ListChildren { parent, reply } => {
                let res = self.explorer.list_children(parent.as_ref()).await;
                let _ = reply.send(res);
            }
            ExplorerCommand::GetParent { node, reply } => {
                let _ = reply.send(Ok(self.explorer.get_parent(&node)));
            }
            ExplorerCommand::Refresh { reply } => {
                self.explorer.refresh();
                let _ = reply.send(Ok(()));
            }
            ExplorerCommand::Subscribe { reply } => {
                let _ = reply.send(Ok(self.explorer.subscribe()));
            }
            ExplorerCommand::SwitchSpace { space, reply } => {
                self.explorer.switch_space(space);
                let _ = reply.send(Ok(()));
            }
            ExplorerCommand::ListSpaces { reply } => {
                let res = self.explorer.list_spaces().await;
                let _ = reply.send(res);
            }
            ExplorerCommand::CreateSpace { name, reply } => {
                let res = self.explorer.create_space(&name).await;
                let _ = reply.send(res);
            }
            ExplorerCommand::Mkdir {
                parent,
                name,
                reply,
            } => {
                let res = self.explorer.mkdir(parent.as_ref(), &name).await;
                let _ = reply.send(res);
            }
            ExplorerCommand::RemoveFile { node, reply } => {
                let res = self.explorer.remove_file(&node).await;
                let _ = reply.send(res);
            }
            ExplorerCommand::RemoveFolder {
                node,
                progress,
                cancel,
                reply,
            } => {
                let res = self.explorer.remove_folder(&node, progress, &cancel).await;
                let _ = reply.send(res);
            }
            ExplorerCommand::Move {
                source,
                target,
                reply,
            } => {
                let res = self.explorer.move_node(&source, target.as_deref()).await;
                let _ = reply.send(res);
            }
            ExplorerCommand::Rename {
                node,
                new_name,
                reply,
            } => {
                let res = self.explorer.rename(&node, &new_name).await;
                let _ = reply.send(res);
            }
            ExplorerCommand::Cat { node, reply } => {
                let res = self.explorer.cat(&node).await;
                let _ = reply.send(res);
            }
            ExplorerCommand::Head { node, lines, reply } => {
                let res = self.explorer.head(&node, lines).await;
                let _ = reply.send(res);
            }
            ExplorerCommand::Download {
                node,
                output_dir,
                cancel,
                reply,
            } => {
                let res = self.explorer.download(&node, &output_dir, &cancel).await;
                let _ = reply.send(res);
            }
            ExplorerCommand::Upload {
                paths,
                target,
                progress,
                cancel,
                reply,
            } => {
                let destination = self.explorer.destination_folder(target.as_deref());
                self.spawn_upload(paths, destination, progress, cancel, reply);
            }
            ExplorerCommand::UploadFinished { result, reply } => {
                let res = self.explorer.finish_upload(result);
                let _ = reply.send(res);
            }
            ExplorerCommand::Drop {
                target,
                payload,
                progress,
                cancel,
                reply,
            } => {
                self.handle_drop(target, payload, progress, cancel, reply)
                    .await;
            }
            ExplorerCommand::Shutdown { reply } => {
                let _ = reply.send(());
                return true;
            }
        }
        false
    }

    /// Moves run inline; uploads are confirmed inline and then detached.
    async fn handle_drop(
        &mut self,
        target: Option<Arc<RemoteNode>>,
        payload: DropPayload,
        progress: ProgressCallback,
        cancel: CancelToken,
        reply: Reply<DropOutcome>,
    ) {
        let uris: Vec<Url> = match payload {
            DropPayload::External(uris) if !target.as_ref().is_some_and(|t| t.is_file()) => uris,
            payload => {
                let res = self
                    .explorer
                    .handle_drop(target.as_ref(), payload, progress, &cancel)
                    .await;
                let _ = reply.send(res);
                return;
            }
        };

        let Some((paths, destination)) = self
            .explorer
            .prepare_external_drop(target.as_ref(), &uris)
            .await
        else {
            let _ = reply.send(Ok(DropOutcome::Declined));
            return;
        };
        if paths.is_empty() {
            let _ = reply.send(Ok(DropOutcome::Ignored));
            return;
        }

        let (upload_tx, upload_rx) = oneshot::channel();
        self.spawn_upload(paths, destination, progress, cancel, upload_tx);
        tokio::spawn(async move {
            let res = match upload_rx.await {
                Ok(res) => res.map(DropOutcome::Uploaded),
                Err(_) => Err(SpaceFsError::Custom("Explorer actor stopped".to_string())),
            };
            let _ = reply.send(res);
        });
    }
}
