//! The generic request/response orchestration every feature is built on.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tower_lsp::lsp_types::Url;
use tracing::{debug, error};

use super::context::FeatureContext;
use super::plugin::{PluginEntry, ServicePlugin};
use crate::document::TextBuffer;
use crate::error::{PluginError, PluginResult};
use crate::projection::DocumentsAndMap;
use crate::walker::embedded_documents;

/// Run one feature request against every candidate (document, parameters,
/// plugin) triple of `uri`.
///
/// - `real_params` builds the parameters for a host-authored document.
/// - `virtual_params` projects the request into a generated document; it may
///   yield zero, one or many parameter sets.
/// - `worker` asks one plugin. Failures and panics are logged and count as
///   "no result" from that plugin.
/// - `transform` brings a plugin's answer back into source coordinates; the
///   map is `None` for host-authored documents. `None` drops the answer.
/// - Without `combine` the first accepted answer ends the whole walk. With
///   `combine` every triple is tried and all answers are merged.
///
/// Generated documents are visited deepest first and plugins in registration
/// order, one call at a time.
pub async fn language_feature_worker<K, T, R, I, Fut>(
    context: FeatureContext<'_>,
    uri: &Url,
    real_params: impl FnOnce() -> K,
    virtual_params: impl Fn(&DocumentsAndMap) -> I,
    worker: impl Fn(Arc<dyn ServicePlugin>, Arc<TextBuffer>, K) -> Fut,
    transform: impl Fn(T, Option<&DocumentsAndMap>) -> Option<R>,
    combine: Option<fn(Vec<R>) -> R>,
) -> Option<R>
where
    K: Clone,
    I: IntoIterator<Item = K>,
    Fut: Future<Output = PluginResult<Option<T>>>,
{
    let Some(script) = context.scripts.get(uri) else {
        debug!(uri = %uri, "no source script for request");
        return None;
    };

    let mut results = Vec::new();

    match &script.generated {
        None => {
            let document = context
                .documents
                .get(&script.uri, &script.language_id, &script.snapshot);
            let params = real_params();

            for (index, entry) in enabled_plugins(context) {
                let call =
                    || worker(Arc::clone(&entry.instance), Arc::clone(&document), params.clone());
                let Some(result) = safe_call(entry, index, uri, call).await else {
                    continue;
                };
                let Some(result) = transform(result, None) else {
                    continue;
                };
                results.push(result);
                if combine.is_none() {
                    break;
                }
            }
        }
        Some(root) => {
            'documents: for docs in embedded_documents(context, &script, root) {
                for params in virtual_params(&docs) {
                    for (index, entry) in enabled_plugins(context) {
                        let call = || {
                            worker(
                                Arc::clone(&entry.instance),
                                Arc::clone(&docs.generated),
                                params.clone(),
                            )
                        };
                        let Some(result) = safe_call(entry, index, uri, call).await else {
                            continue;
                        };
                        let Some(result) = transform(result, Some(&docs)) else {
                            debug!(
                                plugin = %entry.name(),
                                document = %docs.generated.uri(),
                                "result could not be mapped back to the source document"
                            );
                            continue;
                        };
                        results.push(result);
                        if combine.is_none() {
                            break 'documents;
                        }
                    }
                }
            }
        }
    }

    if results.is_empty() {
        return None;
    }
    match combine {
        Some(combine) => Some(combine(results)),
        None => results.into_iter().next(),
    }
}

/// `language_feature_worker` for whole-document features.
///
/// Each generated document for which `valid` holds is offered once, with no
/// parameters.
pub async fn document_feature_worker<T, R, Fut>(
    context: FeatureContext<'_>,
    uri: &Url,
    valid: impl Fn(&DocumentsAndMap) -> bool,
    worker: impl Fn(Arc<dyn ServicePlugin>, Arc<TextBuffer>) -> Fut,
    transform: impl Fn(T, Option<&DocumentsAndMap>) -> Option<R>,
    combine: Option<fn(Vec<R>) -> R>,
) -> Option<R>
where
    Fut: Future<Output = PluginResult<Option<T>>>,
{
    language_feature_worker(
        context,
        uri,
        || (),
        |docs| valid(docs).then_some(()),
        |plugin, document, ()| worker(plugin, document),
        transform,
        combine,
    )
    .await
}

fn enabled_plugins<'a>(
    context: FeatureContext<'a>,
) -> impl Iterator<Item = (usize, &'a PluginEntry)> + 'a {
    context
        .plugins
        .iter()
        .enumerate()
        .filter(move |(_, entry)| !context.disabled.is_plugin_disabled(entry))
}

/// Invoke a plugin, turning errors and panics into "no result".
async fn safe_call<T, Fut>(
    entry: &PluginEntry,
    index: usize,
    uri: &Url,
    call: impl FnOnce() -> Fut,
) -> Option<T>
where
    Fut: Future<Output = PluginResult<Option<T>>>,
{
    let outcome = match std::panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
        Err(payload) => Err(payload),
    };

    let error = match outcome {
        Ok(Ok(result)) => return result,
        Ok(Err(error)) => error,
        Err(payload) => PluginError::Panicked(panic_message(payload.as_ref())),
    };

    if matches!(error, PluginError::Cancelled) {
        debug!(plugin = %entry.name(), index, uri = %uri, "plugin request cancelled");
    } else {
        error!(
            plugin = %entry.name(),
            index,
            uri = %uri,
            error = %error,
            "plugin request failed"
        );
    }
    None
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
