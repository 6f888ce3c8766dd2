use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::model::{Block, BlockId, BlockKind, BlockModel};
use crate::parsing::fallback;
use crate::parsing::service::{BlockDescriptor, ParseService, ParseServiceError};

/// Turns buffer text into a [`BlockModel`].
///
/// Delegates to a [`ParseService`], validates the answer and falls back to
/// the local splitter when the service fails or answers nonsense. Never
/// fails itself.
#[derive(Clone)]
pub struct ParserBridge {
    service: Arc<dyn ParseService>,
}

impl ParserBridge {
    pub fn new(service: Arc<dyn ParseService>) -> Self {
        Self { service }
    }

    /// Parse `text`. `previous` is the model being replaced; blocks that
    /// reappear unchanged keep their ids.
    pub async fn parse(&self, text: &str, previous: &BlockModel) -> BlockModel {
        let descriptors = match self.service.parse(text).await {
            Ok(descriptors) => match validate(text, &descriptors) {
                Ok(()) => descriptors,
                Err(err) => {
                    log::warn!("{err}; using fallback splitter");
                    fallback::split(text)
                }
            },
            Err(err) => {
                log::warn!("{err}; using fallback splitter");
                fallback::split(text)
            }
        };

        log::debug!("parsed {} blocks from {} bytes", descriptors.len(), text.len());
        BlockModel::new(assign_ids(text, descriptors, previous))
    }
}

/// Check a service response against the contract: in bounds, on char
/// boundaries, ascending, non-overlapping and content-consistent.
pub fn validate(text: &str, descriptors: &[BlockDescriptor]) -> Result<(), ParseServiceError> {
    let mut prev_end = 0usize;
    for (idx, d) in descriptors.iter().enumerate() {
        if d.from > d.to || d.to > text.len() {
            return Err(ParseServiceError::Malformed(format!(
                "block {idx} span {}..{} outside buffer of {} bytes",
                d.from,
                d.to,
                text.len()
            )));
        }
        if !text.is_char_boundary(d.from) || !text.is_char_boundary(d.to) {
            return Err(ParseServiceError::Malformed(format!(
                "block {idx} span {}..{} splits a character",
                d.from, d.to
            )));
        }
        if d.from < prev_end {
            return Err(ParseServiceError::Malformed(format!(
                "block {idx} starts at {} before previous block end {prev_end}",
                d.from
            )));
        }
        if let Some(content) = &d.content
            && content != &text[d.from..d.to]
        {
            return Err(ParseServiceError::Malformed(format!(
                "block {idx} content disagrees with buffer"
            )));
        }
        prev_end = d.to;
    }
    Ok(())
}

/// Resolve ids: service id, then an unchanged block from `previous`, then
/// `"{type}-{from}"`, then a fresh uuid.
fn assign_ids(text: &str, descriptors: Vec<BlockDescriptor>, previous: &BlockModel) -> Vec<Block> {
    let mut carried: HashMap<(BlockKind, &str), VecDeque<&BlockId>> = HashMap::new();
    for block in previous.iter() {
        carried
            .entry((block.kind, block.content.as_str()))
            .or_default()
            .push_back(&block.id);
    }

    let mut used: HashSet<BlockId> = HashSet::with_capacity(descriptors.len());
    let mut blocks = Vec::with_capacity(descriptors.len());

    for d in descriptors {
        let kind = BlockKind::from_type_str(&d.kind);
        let span = d.span();
        let content = &text[span.range()];

        let supplied = d.id.map(BlockId).filter(|id| !used.contains(id));
        let id = supplied
            .or_else(|| {
                let queue = carried.get_mut(&(kind, content))?;
                while let Some(id) = queue.pop_front() {
                    if !used.contains(id) {
                        return Some(id.clone());
                    }
                }
                None
            })
            .unwrap_or_else(|| {
                let derived = BlockId::derived(kind, span.start);
                if used.contains(&derived) {
                    BlockId::fresh()
                } else {
                    derived
                }
            });

        used.insert(id.clone());
        blocks.push(Block {
            id,
            kind,
            span,
            content: content.to_string(),
            meta: d.meta,
        });
    }

    blocks
}
