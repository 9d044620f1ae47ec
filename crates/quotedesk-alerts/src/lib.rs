#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quotedesk/quotedesk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Interval evaluation and notification.
pub mod evaluator;
/// Persisted alert list with CRUD operations.
pub mod store;

pub use evaluator::{AlertEvaluator, EVALUATION_INTERVAL, Notifier, PriceSource, is_triggered};
pub use store::{AlertCondition, AlertStore, AlertUpdate, NewAlert, PriceAlert};
