use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use lexsum_core::{SessionState, TabKind};
use lexsum_engine::{
    resolve_all_tabs, resolve_tab, BackendApi, ChatSession, Clock, RecentDocumentStore,
    RecentList, ReqwestBackend, SessionController, UploadFile,
};
use lexsum_logging::{lexsum_info, lexsum_warn};
use serde_json::Value;

use crate::config::AppConfig;
use crate::render;

fn clock() -> Clock {
    Arc::new(|| Utc::now().to_rfc3339())
}

fn backend(config: &AppConfig) -> anyhow::Result<Arc<ReqwestBackend>> {
    let backend = ReqwestBackend::new(config.api_settings())
        .with_context(|| format!("cannot use backend at {}", config.api_base_url))?;
    Ok(Arc::new(backend))
}

fn recent_store(config: &AppConfig) -> RecentDocumentStore {
    RecentDocumentStore::new(config.data_dir.clone()).with_clock(clock())
}

pub async fn summarize(
    config: &AppConfig,
    file: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let api = backend(config)?;
    let mut controller = SessionController::new(api.clone(), config.poll_settings())
        .with_recent_store(recent_store(config));
    controller.submit(UploadFile::new(file_name, bytes));

    loop {
        if controller.consume_dirty() {
            println!("{}", render::progress_line(&controller.view()));
        }
        if !controller.is_live() {
            break;
        }
        tokio::select! {
            alive = controller.next_event() => {
                if !alive {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                controller.navigate_away();
                bail!("interrupted; the session was abandoned");
            }
        }
    }

    let view = controller.view();
    if view.state != SessionState::Results {
        bail!(render::failure_line(&view));
    }
    let (Some(payload), Some(request_id)) = (view.result.as_ref(), view.request_id.as_deref())
    else {
        bail!("session finished without a result payload");
    };

    let slices = resolve_all_tabs(api.as_ref(), Some(payload), request_id).await;
    println!("{}", render::results_report(&slices));

    if let Some(output) = output {
        let text = serde_json::to_string_pretty(&payload.to_value())?;
        fs::write(output, text)
            .with_context(|| format!("failed to write {}", output.display()))?;
        lexsum_info!("wrote result payload to {}", output.display());
        println!("result written to {}", output.display());
    }
    Ok(())
}

pub fn recent(config: &AppConfig, documents: bool) -> anyhow::Result<()> {
    let list = if documents {
        RecentList::Documents
    } else {
        RecentList::Summaries
    };
    let records = recent_store(config)
        .list(list)
        .with_context(|| format!("failed to read recent documents in {}", config.data_dir.display()))?;
    println!("{}", render::recent_list(&records).trim_end());
    Ok(())
}

pub async fn tab(config: &AppConfig, request_id: &str, tab: TabKind) -> anyhow::Result<()> {
    let api = backend(config)?;
    let slice = resolve_tab(api.as_ref(), None, request_id, tab)
        .await
        .with_context(|| format!("failed to fetch {} for {}", tab.label(), request_id))?;
    println!("{}", render::tab_slice(&slice));
    Ok(())
}

pub async fn chat(config: &AppConfig, request_id: &str, message: &str) -> anyhow::Result<()> {
    let api = backend(config)?;
    // The analysis is sent along as context when it can still be fetched.
    let context = match api.complete_summary(request_id).await {
        Ok(payload) => payload.to_value(),
        Err(err) => {
            lexsum_warn!("chatting about {} without context: {}", request_id, err);
            Value::Null
        }
    };

    let mut session = ChatSession::new(request_id).with_clock(clock());
    let reply = session
        .send(api.as_ref(), message, &context)
        .await
        .with_context(|| format!("chat about {request_id} failed"))?;
    match reply {
        Some(reply) => println!("{}", reply.content),
        None => bail!("message is empty"),
    }
    Ok(())
}
