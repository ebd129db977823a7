//! Packing encoded tags into size-bounded report batches.
//!
//! Each batch is a run of concatenated `TagReportData` parameters that will
//! travel as one `RO_ACCESS_REPORT`. A fixed framing overhead is reserved per
//! batch for the IP frame and report headers, so a batch conforms when
//!
//! ```text
//! batch.len() + framing_overhead <= pdu_budget
//! ```
//!
//! The fold is greedy and order-preserving: a parameter goes into the
//! current batch if it fits, otherwise the current batch is sealed and a new
//! one is opened. A single parameter that can never fit still gets its own
//! batch, flagged as oversized, and is never split.
//!
//! # Example
//!
//! ```
//! use tagreport::batch::{BatcherConfig, ReportBatcher};
//! use tagreport::tag::Tag;
//!
//! let tags: Vec<Tag> = (0u8..10)
//!     .map(|i| Tag::new(0x3000, 18, 96, vec![i; 12]))
//!     .collect();
//!
//! // Each tag encodes to 25 bytes; 200 - 100 leaves room for 4 per batch
//! let batcher = ReportBatcher::new(BatcherConfig::new(200));
//! let batches = batcher.batch(&tags).unwrap();
//!
//! let counts: Vec<usize> = batches.iter().map(|b| b.tag_count()).collect();
//! assert_eq!(counts, vec![4, 4, 2]);
//! assert_eq!(batches.total_tag_count(), 10);
//! ```

use bytes::{Bytes, BytesMut};

use crate::error::Result;
use crate::protocol::{LlrpEncoder, ParameterEncoder};
use crate::tag::Tag;

/// Default per-batch allowance for IP frame and report headers.
pub const DEFAULT_FRAMING_OVERHEAD: usize = 100;

/// Default PDU budget (Ethernet MTU).
pub const DEFAULT_PDU_BUDGET: usize = 1500;

/// What the batcher does when a tag cannot be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodeFailurePolicy {
    /// Stop and return the encoder error.
    #[default]
    Abort,
    /// Log the failure, leave the tag out, and keep going.
    Skip,
}

/// Configuration for the report batcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatcherConfig {
    /// Maximum bytes per transmitted PDU.
    pub pdu_budget: usize,
    /// Bytes reserved per batch for transport framing.
    pub framing_overhead: usize,
    /// Encoder failure handling.
    pub on_encode_failure: EncodeFailurePolicy,
}

impl BatcherConfig {
    /// Config with the given budget and default overhead.
    pub fn new(pdu_budget: usize) -> Self {
        Self {
            pdu_budget,
            ..Self::default()
        }
    }

    /// Set the framing overhead.
    pub fn framing_overhead(mut self, overhead: usize) -> Self {
        self.framing_overhead = overhead;
        self
    }

    /// Set the encoder failure policy.
    pub fn on_encode_failure(mut self, policy: EncodeFailurePolicy) -> Self {
        self.on_encode_failure = policy;
        self
    }

    /// Payload bytes available to a conforming batch.
    #[inline]
    pub fn payload_capacity(&self) -> usize {
        self.pdu_budget.saturating_sub(self.framing_overhead)
    }

    /// Check whether a batch of `len` payload bytes conforms.
    #[inline]
    pub fn fits(&self, len: usize) -> bool {
        len.saturating_add(self.framing_overhead) <= self.pdu_budget
    }
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            pdu_budget: DEFAULT_PDU_BUDGET,
            framing_overhead: DEFAULT_FRAMING_OVERHEAD,
            on_encode_failure: EncodeFailurePolicy::default(),
        }
    }
}

/// One sealed unit of transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportBatch {
    parameter: Bytes,
    tag_count: usize,
    oversized: bool,
}

impl ReportBatch {
    /// Concatenated `TagReportData` parameters.
    #[inline]
    pub fn parameter(&self) -> &[u8] {
        &self.parameter
    }

    /// Cheap clone of the parameter bytes.
    #[inline]
    pub fn parameter_bytes(&self) -> Bytes {
        self.parameter.clone()
    }

    /// Payload length in bytes (overhead not included).
    #[inline]
    pub fn len(&self) -> usize {
        self.parameter.len()
    }

    /// True if the batch carries no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parameter.is_empty()
    }

    /// Number of tags in this batch.
    #[inline]
    pub fn tag_count(&self) -> usize {
        self.tag_count
    }

    /// True for a single-tag batch whose parameter alone breaks the budget.
    #[inline]
    pub fn is_oversized(&self) -> bool {
        self.oversized
    }
}

/// Ordered batches, in transmission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSequence {
    batches: Vec<ReportBatch>,
    skipped_tags: usize,
}

impl BatchSequence {
    /// Sum of `tag_count` over all batches.
    pub fn total_tag_count(&self) -> usize {
        self.batches.iter().map(ReportBatch::tag_count).sum()
    }

    /// Number of batches.
    #[inline]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// True if there are no batches.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Batch at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&ReportBatch> {
        self.batches.get(index)
    }

    /// Iterate batches in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ReportBatch> {
        self.batches.iter()
    }

    /// Batches that break the budget, with their positions.
    pub fn oversized(&self) -> impl Iterator<Item = (usize, &ReportBatch)> {
        self.batches
            .iter()
            .enumerate()
            .filter(|(_, batch)| batch.is_oversized())
    }

    /// Tags left out because they failed to encode.
    #[inline]
    pub fn skipped_tags(&self) -> usize {
        self.skipped_tags
    }

    /// Total payload bytes across all batches.
    pub fn total_len(&self) -> usize {
        self.batches.iter().map(ReportBatch::len).sum()
    }

    /// Take ownership of the batches.
    pub fn into_batches(self) -> Vec<ReportBatch> {
        self.batches
    }
}

impl<'a> IntoIterator for &'a BatchSequence {
    type Item = &'a ReportBatch;
    type IntoIter = std::slice::Iter<'a, ReportBatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches.iter()
    }
}

impl IntoIterator for BatchSequence {
    type Item = ReportBatch;
    type IntoIter = std::vec::IntoIter<ReportBatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches.into_iter()
    }
}

/// The batch currently being filled.
#[derive(Debug)]
struct OpenBatch {
    buffer: BytesMut,
    tag_count: usize,
}

/// Step-by-step batch fold over already-encoded parameters.
///
/// Sealed batches are never touched again; only the open batch grows.
#[derive(Debug)]
pub struct BatchFold {
    config: BatcherConfig,
    sealed: Vec<ReportBatch>,
    open: Option<OpenBatch>,
    skipped_tags: usize,
}

impl BatchFold {
    /// Start an empty fold.
    pub fn new(config: &BatcherConfig) -> Self {
        Self {
            config: config.clone(),
            sealed: Vec::new(),
            open: None,
            skipped_tags: 0,
        }
    }

    /// Add one tag's parameter.
    pub fn push_parameter(&mut self, param: &[u8]) {
        if let Some(open) = self.open.as_mut() {
            if self.config.fits(open.buffer.len().saturating_add(param.len())) {
                open.buffer.extend_from_slice(param);
                open.tag_count += 1;
                return;
            }
        }

        self.seal();
        self.open = Some(OpenBatch {
            buffer: BytesMut::from(param),
            tag_count: 1,
        });
    }

    /// Record a tag that was left out.
    pub fn note_skipped(&mut self) {
        self.skipped_tags += 1;
    }

    /// Number of batches so far, the open one included.
    pub fn batch_count(&self) -> usize {
        self.sealed.len() + usize::from(self.open.is_some())
    }

    fn seal(&mut self) {
        if let Some(open) = self.open.take() {
            let oversized = !self.config.fits(open.buffer.len());
            if oversized {
                tracing::warn!(
                    "Batch {} holds a {}-byte parameter that exceeds PDU budget {}",
                    self.sealed.len(),
                    open.buffer.len(),
                    self.config.pdu_budget
                );
            }
            self.sealed.push(ReportBatch {
                parameter: open.buffer.freeze(),
                tag_count: open.tag_count,
                oversized,
            });
        }
    }

    /// Seal the open batch and return the sequence.
    pub fn finish(mut self) -> BatchSequence {
        self.seal();
        BatchSequence {
            batches: self.sealed,
            skipped_tags: self.skipped_tags,
        }
    }
}

/// Encodes tags and folds them into a [`BatchSequence`].
#[derive(Debug, Clone)]
pub struct ReportBatcher<E = LlrpEncoder> {
    config: BatcherConfig,
    encoder: E,
}

impl ReportBatcher<LlrpEncoder> {
    /// Create a batcher that uses the LLRP encoder.
    pub fn new(config: BatcherConfig) -> Self {
        Self::with_encoder(config, LlrpEncoder)
    }
}

impl<E: ParameterEncoder> ReportBatcher<E> {
    /// Create a batcher with a custom encoder.
    pub fn with_encoder(config: BatcherConfig, encoder: E) -> Self {
        Self { config, encoder }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    /// Encode every tag in order and pack the results.
    ///
    /// # Errors
    ///
    /// Returns the encoder error if a tag fails to encode and the policy is
    /// [`EncodeFailurePolicy::Abort`].
    pub fn batch<'a, I>(&self, tags: I) -> Result<BatchSequence>
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        let mut fold = BatchFold::new(&self.config);

        for tag in tags {
            match self.encoder.encode(tag) {
                Ok(param) => fold.push_parameter(&param),
                Err(e) => match self.config.on_encode_failure {
                    EncodeFailurePolicy::Abort => return Err(e),
                    EncodeFailurePolicy::Skip => {
                        tracing::warn!("Skipping tag {}: {}", tag, e);
                        fold.note_skipped();
                    }
                },
            }
        }

        let batches = fold.finish();
        tracing::debug!(
            "Packed {} tags into {} batches ({} skipped)",
            batches.total_tag_count(),
            batches.len(),
            batches.skipped_tags()
        );
        Ok(batches)
    }

    /// Pack parameters that were already encoded, in order.
    pub fn batch_parameters<I, P>(&self, params: I) -> BatchSequence
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut fold = BatchFold::new(&self.config);
        for param in params {
            fold.push_parameter(param.as_ref());
        }
        fold.finish()
    }
}
