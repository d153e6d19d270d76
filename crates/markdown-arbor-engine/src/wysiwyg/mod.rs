pub mod events;

pub use events::{ProcessError, ProcessorEvent, ProcessorMetrics, SubscriberId};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::content::{ContentProcessor, RenderOptions};
use crate::patterns::{MarkdownPattern, PatternDetector};

use events::Subscribers;

/// Options recognized by the live pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// When false, `process` skips all work and returns the input
    /// pass-through.
    pub enable_real_time: bool,
    /// Trade fidelity for speed: skip inline-pattern decoration once content
    /// grows past a length threshold.
    pub performance_mode: bool,
    /// Soft wall-clock budget per call; overruns warn, they never drop the
    /// keystroke.
    pub max_processing_time: Duration,
    /// Identical input arriving again within this window returns the cached
    /// result instead of reprocessing. Zero disables coalescing.
    pub debounce_delay: Duration,
    /// Hide markdown markers in the rendered markup.
    pub hide_syntax: bool,
    /// When false, render escaped plain text instead of formatted markup.
    pub enable_formatting: bool,
    /// Namespace for emitted markup classes.
    pub css_prefix: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            enable_real_time: true,
            performance_mode: false,
            max_processing_time: Duration::from_millis(50),
            debounce_delay: Duration::ZERO,
            hide_syntax: true,
            enable_formatting: true,
            css_prefix: "md".to_string(),
        }
    }
}

/// One keystroke's worth of output: markup, decoration patterns and
/// diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedContent {
    pub html: String,
    pub patterns: Vec<MarkdownPattern>,
    pub processing_time: Duration,
    pub warnings: Vec<String>,
    /// Monotonic call counter. A host dispatching calls concurrently applies
    /// results in generation order and drops stale ones (last-call-wins).
    pub generation: u64,
}

/// Content length above which performance mode skips inline decoration.
pub const PERFORMANCE_CONTENT_THRESHOLD: usize = 10_000;

const RESULT_CACHE_CAPACITY: usize = 8;

#[derive(Debug)]
struct CacheEntry {
    key: u64,
    stored_at: Instant,
    result: ProcessedContent,
}

/// Top-level orchestrator of the live-formatting pipeline.
///
/// On each edit it runs pattern detection and AST rendering under a
/// time/debounce budget, publishes `Processed`/`Error` events to its
/// subscribers and keeps a small recent-result cache for coalescing and
/// graceful degradation. One instance per editor surface.
#[derive(Debug)]
pub struct WysiwygProcessor {
    config: ProcessorConfig,
    detector: PatternDetector,
    content: ContentProcessor,
    subscribers: Subscribers,
    metrics: ProcessorMetrics,
    generation: u64,
    cache: Vec<CacheEntry>,
}

impl Default for WysiwygProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl WysiwygProcessor {
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            config,
            detector: PatternDetector::new(),
            content: ContentProcessor::new(),
            subscribers: Subscribers::default(),
            metrics: ProcessorMetrics::default(),
            generation: 0,
            cache: Vec::new(),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &ProcessorMetrics {
        &self.metrics
    }

    pub fn subscribe(
        &mut self,
        subscriber: impl Fn(&ProcessorEvent) + 'static,
    ) -> SubscriberId {
        self.subscribers.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Most recent successful result, kept for graceful degradation.
    pub fn last_known_good(&self) -> Option<&ProcessedContent> {
        self.cache.first().map(|entry| &entry.result)
    }

    /// Processes one edit. Never fails and never drops the keystroke: a
    /// budget overrun or clamped cursor degrades to warnings on a
    /// best-effort result.
    pub fn process(&mut self, content: &str, cursor_position: usize) -> ProcessedContent {
        self.generation += 1;
        let generation = self.generation;

        if !self.config.enable_real_time {
            return ProcessedContent {
                html: html_escape::encode_text(content).into_owned(),
                patterns: Vec::new(),
                processing_time: Duration::ZERO,
                warnings: Vec::new(),
                generation,
            };
        }

        let mut warnings = Vec::new();
        let cursor = cursor_position.min(content.len());
        if cursor_position > content.len() {
            let error = ProcessError::CursorOutOfBounds {
                cursor: cursor_position,
                len: content.len(),
            };
            log::warn!("clamped cursor: {error}");
            warnings.push(error.to_string());
            self.subscribers
                .emit(&ProcessorEvent::Error { generation, error });
        }

        let key = cache_key(content, cursor);
        if !self.config.debounce_delay.is_zero()
            && let Some(entry) = self.cache.iter().find(|e| e.key == key)
            && entry.stored_at.elapsed() <= self.config.debounce_delay
        {
            let mut result = entry.result.clone();
            result.generation = generation;
            return result;
        }

        self.metrics.is_processing = true;
        let started = Instant::now();

        let skip_decoration =
            self.config.performance_mode && content.len() > PERFORMANCE_CONTENT_THRESHOLD;
        let patterns = if skip_decoration {
            warnings.push(format!(
                "inline decoration skipped: content is {} bytes, over the {} byte \
                 performance-mode threshold",
                content.len(),
                PERFORMANCE_CONTENT_THRESHOLD
            ));
            Vec::new()
        } else {
            self.detector.detect(content, cursor)
        };

        let html = if self.config.enable_formatting {
            let ast = self.content.parse_markdown(content);
            self.content.render_ast_with(
                &ast,
                &RenderOptions {
                    css_prefix: self.config.css_prefix.clone(),
                    hide_syntax: self.config.hide_syntax,
                },
            )
        } else {
            format!(
                "<div class=\"{}-plain\">{}</div>",
                self.config.css_prefix,
                html_escape::encode_text(content)
            )
        };

        let processing_time = started.elapsed();
        if processing_time > self.config.max_processing_time {
            let budget = self.config.max_processing_time;
            log::warn!(
                "processing took {processing_time:?}, over the {budget:?} budget"
            );
            warnings.push(format!(
                "processing took {}ms, over the {}ms budget",
                processing_time.as_millis(),
                budget.as_millis()
            ));
        }

        let result = ProcessedContent {
            html,
            patterns,
            processing_time,
            warnings,
            generation,
        };

        self.metrics.is_processing = false;
        self.metrics.last_processing_time = Some(processing_time);
        self.metrics.processed_count += 1;

        self.remember(key, result.clone());
        self.subscribers.emit(&ProcessorEvent::Processed {
            generation,
            processing_time,
            warning_count: result.warnings.len(),
        });

        result
    }

    fn remember(&mut self, key: u64, result: ProcessedContent) {
        self.cache.retain(|entry| entry.key != key);
        self.cache.insert(
            0,
            CacheEntry {
                key,
                stored_at: Instant::now(),
                result,
            },
        );
        self.cache.truncate(RESULT_CACHE_CAPACITY);
    }
}

fn cache_key(content: &str, cursor: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    cursor.hash(&mut hasher);
    hasher.finish()
}
