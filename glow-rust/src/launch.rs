use anyhow::anyhow;
use indexmap::IndexMap;
use std::thread::JoinHandle;

/// A launched graph.
///
/// It holds one completion handle per background node and the result of
/// the foreground node, if there was one. Dropping it detaches the
/// background threads. Nothing here stops or restarts a node. Supervision,
/// if wanted, is built on top of these handles.
#[derive(Debug)]
pub struct Launched {
    pub(crate) background: IndexMap<String, JoinHandle<anyhow::Result<()>>>,
    pub(crate) foreground: Option<(String, anyhow::Result<()>)>,
}

impl Launched {
    /// Names of the nodes started on their own threads.
    pub fn background(&self) -> impl Iterator<Item = &str> {
        self.background.keys().map(String::as_str)
    }

    /// The name of the node that ran on the launching thread.
    pub fn foreground(&self) -> Option<&str> {
        self.foreground.as_ref().map(|(name, _)| name.as_str())
    }

    /// The value returned by the foreground node.
    pub fn foreground_result(&self) -> Option<&anyhow::Result<()>> {
        self.foreground.as_ref().map(|(_, result)| result)
    }

    /// Return `Some(true)` if background node `name` has returned.
    pub fn is_finished(&self, name: &str) -> Option<bool> {
        self.background.get(name).map(JoinHandle::is_finished)
    }

    /// Take the raw thread handles of the background nodes.
    pub fn into_handles(self) -> IndexMap<String, JoinHandle<anyhow::Result<()>>> {
        self.background
    }

    /// Wait for every background node and collect all node results.
    ///
    /// A node that panicked yields an error. The foreground result, if
    /// any, comes last. This blocks forever if a node never returns.
    pub fn join(self) -> IndexMap<String, anyhow::Result<()>> {
        let Self {
            background,
            foreground,
        } = self;

        let mut results: IndexMap<_, _> = background
            .into_iter()
            .map(|(name, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("node `{}` panicked", name)));
                (name, result)
            })
            .collect();
        results.extend(foreground);
        results
    }
}
