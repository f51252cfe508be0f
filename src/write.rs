use crate::memory::Memory;
use crate::node::{ChannelCommon, Mode, Node, ValueType};
use crate::options::Options;
use crate::store::StateStore;
use tracing::{debug, error};

/// Settings of one commit pass.
///
/// `channelName` and `deleteBeforeUpdate` apply until the first container
/// of the pass is created, then they are spent.
#[derive(Debug)]
pub struct CommitContext<'a> {
    options: &'a Options,
    spent: bool,
}

impl<'a> CommitContext<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self {
            options,
            spent: false,
        }
    }

    pub fn channel_name(&self) -> Option<&str> {
        if self.spent {
            return None;
        }
        self.options.channel_name.as_deref()
    }

    pub fn delete_before_update(&self) -> bool {
        !self.spent && self.options.delete_before_update
    }

    fn spend(&mut self) {
        self.spent = true;
    }
}

/// Commits a node tree, containers before their children.
pub async fn write_tree<S: StateStore>(
    store: &mut S,
    memory: &mut Memory,
    root: &Node,
    options: &Options,
) {
    let mut ctx = CommitContext::new(options);
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if !write_node(store, memory, node, &mut ctx).await {
            continue;
        }
        pending.extend(node.children.iter().rev());
    }
}

/// Writes one node. Returns whether its children should be visited.
async fn write_node<S: StateStore>(
    store: &mut S,
    memory: &mut Memory,
    node: &Node,
    ctx: &mut CommitContext<'_>,
) -> bool {
    let options = ctx.options;

    match node.mode {
        Mode::SkipEnding | Mode::SkipPassword | Mode::SkipFunction => {
            debug!("Skipping {} (Reason '{}')", node.path, node.mode);
            return false;
        }
        Mode::Create | Mode::Update | Mode::Array => {}
    }

    if ctx.delete_before_update() && memory.is_created(&node.path) {
        debug!("Deleting {} before update", node.path);
        if let Err(e) = store.delete_subtree(&node.path).await {
            error!("Cannot delete {}: {}", node.path, e);
        }
        memory.purge(&node.path);
    }

    let was_created = memory.is_created(&node.path);
    if !was_created {
        let name = node
            .description
            .as_deref()
            .or(ctx.channel_name())
            .unwrap_or_default();
        match store
            .create_container_if_absent(&node.path, &ChannelCommon::named(name))
            .await
        {
            Ok(()) => {
                if !options.dont_save_created_objects {
                    memory.mark_created(&node.path);
                }
                ctx.spend();
            }
            Err(e) => error!("Cannot create channel {}: {}", node.path, e),
        }
    }

    // Containers only need their channel.
    let (Some(state), Some(common)) = (&node.state, &node.common) else {
        return true;
    };

    if node.mode == Mode::Create || !was_created {
        if let Err(e) = store.create_or_extend_state(&node.path, common).await {
            error!("Cannot create state {}: {}", node.path, e);
            return true;
        }
        if !options.dont_save_created_objects {
            memory.mark_created(&node.path);
        }
        memory.remember_type(&node.path, ValueType::of(state));
        if let Some(labels) = &common.states {
            memory.remember_labels(&node.path, labels.clone());
        }
    }

    if let Err(e) = store.set_state_value(&node.path, state).await {
        error!("Cannot set state {}: {}", node.path, e);
    }
    true
}
